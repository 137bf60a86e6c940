//! Aggregate-register switch scanner
//!
//! The rotary selectors and the estop/feedhold buttons all land on one
//! 16-bit expander register. Interrupts from either expander port only bump
//! an [`IrqCounter`]; [`SwitchScanner::poll`] compares the counter with its
//! watermark and reads the register once, however many interrupts arrived.
//!
//! ```text
//!  bit  15 14 13 12 11 10  9  8  7  6  5 ..  0
//!      [mult ][   axis selector  ][es][fh][ ... ]
//! ```
//!
//! Pins are pulled up, so an open contact reads `1`. Each selector grounds
//! one pin per position and is decoded with [`thermometer_index`]; buttons
//! are taken raw with `1` meaning pressed.

use jogpad_hal::{BusError, IrqCounter};

use crate::bits::{get_field, thermometer_index};
use crate::events::{InputEvent, KeyState};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rotary event index of the axis selector
pub const AXIS_SELECTOR: u8 = 0;
/// Rotary event index of the multiplier selector
pub const MULTIPLIER_SELECTOR: u8 = 1;
/// Key event index of the emergency stop
pub const ESTOP_BUTTON: u8 = 0;
/// Key event index of the feed hold button
pub const FEEDHOLD_BUTTON: u8 = 1;

/// Single-read access to the aggregate switch register
pub trait SwitchPort {
    fn read_mask(&mut self) -> Result<u16, BusError>;
}

impl<T: SwitchPort + ?Sized> SwitchPort for &mut T {
    fn read_mask(&mut self) -> Result<u16, BusError> {
        (**self).read_mask()
    }
}

/// Location of a selector field in the aggregate register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldSpec {
    pub width: u8,
    pub offset: u8,
}

impl FieldSpec {
    pub const fn new(width: u8, offset: u8) -> Self {
        Self { width, offset }
    }

    /// Whether the field lies inside a 16-bit register
    pub const fn fits(&self) -> bool {
        self.width >= 1 && self.width as u16 + self.offset as u16 <= 16
    }

    /// Register bits covered by the field
    pub const fn mask(&self) -> u16 {
        (crate::bits::make_field(u32::MAX, self.width as u32, self.offset as u32) & 0xFFFF) as u16
    }

    fn decode(&self, mask: u16) -> u8 {
        let field = get_field(u32::from(mask), u32::from(self.width), u32::from(self.offset));
        thermometer_index(field, u32::from(self.width)) as u8
    }
}

/// Wiring of the aggregate register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwitchLayout {
    pub axis: FieldSpec,
    pub multiplier: FieldSpec,
    pub estop_bit: u8,
    pub feedhold_bit: u8,
}

impl Default for SwitchLayout {
    fn default() -> Self {
        Self {
            axis: FieldSpec::new(6, 8),
            multiplier: FieldSpec::new(2, 14),
            estop_bit: 7,
            feedhold_bit: 6,
        }
    }
}

impl SwitchLayout {
    /// Register bits that carry switch inputs
    pub fn input_mask(&self) -> u16 {
        self.axis.mask()
            | self.multiplier.mask()
            | (1 << (self.estop_bit & 15))
            | (1 << (self.feedhold_bit & 15))
    }

    /// Whether every field fits the register without overlapping another
    pub fn is_valid(&self) -> bool {
        if !self.axis.fits() || !self.multiplier.fits() {
            return false;
        }
        if self.estop_bit > 15 || self.feedhold_bit > 15 {
            return false;
        }
        let parts = [
            self.axis.mask(),
            self.multiplier.mask(),
            1 << self.estop_bit,
            1 << self.feedhold_bit,
        ];
        let total: u32 = parts.iter().map(|p| p.count_ones()).sum();
        total == self.input_mask().count_ones()
    }
}

/// Result of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchPoll {
    /// No interrupt since the last read
    Idle,
    /// Register read and decoded
    Read { mask: u16 },
    /// Register read failed; the next poll retries
    Failed(BusError),
}

/// Interrupt-coalescing decoder for the aggregate switch register
pub struct SwitchScanner<'a, P> {
    port: P,
    irq: &'a IrqCounter,
    layout: SwitchLayout,
    processed: u8,
    refresh: bool,
    positions: [u8; 2],
    buttons: [KeyState; 2],
}

impl<'a, P: SwitchPort> SwitchScanner<'a, P> {
    /// Create a scanner with both selectors at position 0 and both buttons
    /// released
    pub fn new(port: P, irq: &'a IrqCounter, layout: SwitchLayout) -> Self {
        Self {
            port,
            irq,
            layout,
            processed: irq.load(),
            refresh: false,
            positions: [0; 2],
            buttons: [KeyState::Released; 2],
        }
    }

    /// Read the register on the next poll even without an interrupt, and
    /// report every selector and button from that read whether or not it
    /// changed
    pub fn request_refresh(&mut self) {
        self.refresh = true;
    }

    /// Last decoded position of selector `index`
    pub fn position(&self, index: u8) -> Option<u8> {
        self.positions.get(usize::from(index)).copied()
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Read and decode the register if an interrupt arrived since the last
    /// successful read
    ///
    /// Emits at most one event per selector and per button. After
    /// [`request_refresh`](Self::request_refresh) the next successful read
    /// emits all of them.
    pub fn poll(&mut self, on_event: &mut impl FnMut(InputEvent)) -> SwitchPoll {
        let triggered = self.irq.load();
        if triggered == self.processed && !self.refresh {
            return SwitchPoll::Idle;
        }

        let mask = match self.port.read_mask() {
            Ok(mask) => mask,
            Err(error) => {
                warn!("switch read failed: {}", error);
                return SwitchPoll::Failed(error);
            }
        };

        let resync = self.refresh;
        let selectors = [
            (AXIS_SELECTOR, self.layout.axis.decode(mask)),
            (MULTIPLIER_SELECTOR, self.layout.multiplier.decode(mask)),
        ];
        for (index, position) in selectors {
            let stored = &mut self.positions[usize::from(index)];
            if resync || *stored != position {
                *stored = position;
                debug!("selector {} -> {}", index, position);
                on_event(InputEvent::Rotary { index, position });
            }
        }

        let buttons = [
            (ESTOP_BUTTON, self.layout.estop_bit),
            (FEEDHOLD_BUTTON, self.layout.feedhold_bit),
        ];
        for (index, bit) in buttons {
            let pressed = get_field(u32::from(mask), 1, u32::from(bit)) != 0;
            let state = KeyState::from_pressed(pressed);
            let stored = &mut self.buttons[usize::from(index)];
            if resync || *stored != state {
                *stored = state;
                debug!("button {} {}", index, state);
                on_event(InputEvent::Key { index, state });
            }
        }

        self.processed = triggered;
        self.refresh = false;
        SwitchPoll::Read { mask }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jogpad_hal::IrqContext;

    struct MockRegister {
        mask: u16,
        reads: usize,
        fail: Option<BusError>,
    }

    impl MockRegister {
        fn new(mask: u16) -> Self {
            Self {
                mask,
                reads: 0,
                fail: None,
            }
        }
    }

    impl SwitchPort for MockRegister {
        fn read_mask(&mut self) -> Result<u16, BusError> {
            self.reads += 1;
            match self.fail {
                Some(error) => Err(error),
                None => Ok(self.mask),
            }
        }
    }

    fn collect<P: SwitchPort>(
        scanner: &mut SwitchScanner<'_, P>,
    ) -> (SwitchPoll, heapless::Vec<InputEvent, 8>) {
        let mut events = heapless::Vec::new();
        let outcome = scanner.poll(&mut |event| {
            let _ = events.push(event);
        });
        (outcome, events)
    }

    #[test]
    fn test_default_layout_is_valid() {
        let layout = SwitchLayout::default();
        assert!(layout.is_valid());
        assert_eq!(layout.input_mask(), 0xFFC0);
    }

    #[test]
    fn test_overlapping_layout_is_invalid() {
        let layout = SwitchLayout {
            estop_bit: 9,
            ..SwitchLayout::default()
        };
        assert!(!layout.is_valid());

        let layout = SwitchLayout {
            multiplier: FieldSpec::new(4, 14),
            ..SwitchLayout::default()
        };
        assert!(!layout.is_valid());
    }

    #[test]
    fn test_idle_without_interrupt() {
        let irq = IrqCounter::new();
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0), &irq, SwitchLayout::default());

        let (outcome, events) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Idle);
        assert!(events.is_empty());
        assert_eq!(scanner.port_mut().reads, 0);
    }

    #[test]
    fn test_interrupts_coalesce_into_one_read() {
        let irq = IrqCounter::new();
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0x4340), &irq, SwitchLayout::default());

        irq.fire();
        irq.fire();
        irq.fire();
        let (outcome, events) = collect(&mut scanner);

        assert_eq!(outcome, SwitchPoll::Read { mask: 0x4340 });
        assert_eq!(scanner.port_mut().reads, 1);
        assert_eq!(
            events.as_slice(),
            &[
                InputEvent::Rotary {
                    index: AXIS_SELECTOR,
                    position: 3
                },
                InputEvent::Rotary {
                    index: MULTIPLIER_SELECTOR,
                    position: 2
                },
                InputEvent::Key {
                    index: FEEDHOLD_BUTTON,
                    state: KeyState::Pressed
                },
            ]
        );

        // watermark caught up with all three interrupts
        let (outcome, _) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Idle);
        assert_eq!(scanner.port_mut().reads, 1);
    }

    #[test]
    fn test_unchanged_register_emits_nothing() {
        let irq = IrqCounter::new();
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0x4340), &irq, SwitchLayout::default());

        irq.fire();
        let _ = collect(&mut scanner);
        irq.fire();
        let (outcome, events) = collect(&mut scanner);

        assert_eq!(outcome, SwitchPoll::Read { mask: 0x4340 });
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_contact_maps_to_position_zero() {
        let irq = IrqCounter::new();
        // both selectors open, estop pressed
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0xFF80), &irq, SwitchLayout::default());

        irq.fire();
        let (_, events) = collect(&mut scanner);
        assert_eq!(
            events.as_slice(),
            &[InputEvent::Key {
                index: ESTOP_BUTTON,
                state: KeyState::Pressed
            }]
        );
        assert_eq!(scanner.position(AXIS_SELECTOR), Some(0));
        assert_eq!(scanner.position(MULTIPLIER_SELECTOR), Some(0));
    }

    #[test]
    fn test_button_release_edge() {
        let irq = IrqCounter::new();
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0xFF40), &irq, SwitchLayout::default());

        irq.fire();
        let _ = collect(&mut scanner);

        scanner.port_mut().mask = 0xFF00;
        irq.fire();
        let (_, events) = collect(&mut scanner);
        assert_eq!(
            events.as_slice(),
            &[InputEvent::Key {
                index: FEEDHOLD_BUTTON,
                state: KeyState::Released
            }]
        );
    }

    #[test]
    fn test_failed_read_is_retried() {
        let irq = IrqCounter::new();
        let mut register = MockRegister::new(0x4340);
        register.fail = Some(BusError::Nack);
        let mut scanner = SwitchScanner::new(register, &irq, SwitchLayout::default());

        irq.fire();
        let (outcome, events) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Failed(BusError::Nack));
        assert!(events.is_empty());

        scanner.port_mut().fail = None;
        let (outcome, events) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Read { mask: 0x4340 });
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_refresh_reads_without_interrupt() {
        let irq = IrqCounter::new();
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0xFFFF), &irq, SwitchLayout::default());

        scanner.request_refresh();
        let (outcome, _) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Read { mask: 0xFFFF });

        let (outcome, _) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Idle);
    }

    #[test]
    fn test_refresh_reports_unchanged_state() {
        let irq = IrqCounter::new();
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0x4340), &irq, SwitchLayout::default());

        irq.fire();
        let (_, events) = collect(&mut scanner);
        assert_eq!(events.len(), 3);

        // a failed refresh read is retried and still reports everything
        scanner.request_refresh();
        scanner.port_mut().fail = Some(BusError::Nack);
        let (outcome, events) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Failed(BusError::Nack));
        assert!(events.is_empty());

        scanner.port_mut().fail = None;
        let (outcome, events) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Read { mask: 0x4340 });
        assert_eq!(
            events.as_slice(),
            &[
                InputEvent::Rotary {
                    index: AXIS_SELECTOR,
                    position: 3
                },
                InputEvent::Rotary {
                    index: MULTIPLIER_SELECTOR,
                    position: 2
                },
                InputEvent::Key {
                    index: ESTOP_BUTTON,
                    state: KeyState::Released
                },
                InputEvent::Key {
                    index: FEEDHOLD_BUTTON,
                    state: KeyState::Pressed
                },
            ]
        );

        // only that one read is a full report
        irq.fire();
        let (_, events) = collect(&mut scanner);
        assert!(events.is_empty());
    }

    #[test]
    fn test_counter_wraparound() {
        let irq = IrqCounter::new();
        for _ in 0..255 {
            irq.fire();
        }
        let mut scanner =
            SwitchScanner::new(MockRegister::new(0xFFFF), &irq, SwitchLayout::default());

        irq.fire(); // wraps to 0
        let (outcome, _) = collect(&mut scanner);
        assert_eq!(outcome, SwitchPoll::Read { mask: 0xFFFF });
    }
}
