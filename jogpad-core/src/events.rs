//! Input events emitted by the scanners

/// Debounced state of a momentary contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyState {
    #[default]
    Released,
    Pressed,
}

impl KeyState {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }

    pub fn is_pressed(self) -> bool {
        self == KeyState::Pressed
    }
}

/// Edge or position change reported by a scanner
///
/// `index` is scanner-local: a keypad button number for the matrix scanner,
/// a button or selector number for the switch scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// A button changed state
    Key { index: u8, state: KeyState },
    /// A rotary selector moved to a new position
    Rotary { index: u8, position: u8 },
}
