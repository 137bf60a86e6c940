//! Per-cycle control state assembly
//!
//! Each loop iteration starts from an empty [`ControlState`] holding only
//! the encoder count, then lets each scanner apply its events onto it. Fields
//! end up present only when something changed during this cycle.

use jogpad_hal::EncoderCount;
use jogpad_protocol::{Axis, ControlState, Multiplier};

use crate::events::{InputEvent, KeyState};
use crate::keypad::{KeypadPort, MatrixScanner, ScanOutcome};
use crate::switches::{
    SwitchPoll, SwitchPort, SwitchScanner, AXIS_SELECTOR, ESTOP_BUTTON, FEEDHOLD_BUTTON,
    MULTIPLIER_SELECTOR,
};

/// Apply a keypad event to the in-progress record
pub fn apply_keypad_event(state: &mut ControlState, event: InputEvent) {
    if let InputEvent::Key { index, state: key } = event {
        match key {
            KeyState::Pressed => state.record_key_pressed(index),
            KeyState::Released => state.record_key_released(index),
        }
    }
}

/// Apply a switch-register event to the in-progress record
pub fn apply_switch_event(state: &mut ControlState, event: InputEvent) {
    match event {
        InputEvent::Rotary {
            index: AXIS_SELECTOR,
            position,
        } => state.axis = Some(Axis::from_index(position)),
        InputEvent::Rotary {
            index: MULTIPLIER_SELECTOR,
            position,
        } => state.multiplier = Some(Multiplier::from_index(position)),
        InputEvent::Key {
            index: ESTOP_BUTTON,
            state: key,
        } => state.estop = Some(key.is_pressed()),
        InputEvent::Key {
            index: FEEDHOLD_BUTTON,
            state: key,
        } => state.feedhold = Some(key.is_pressed()),
        _ => {}
    }
}

/// What happened during one collection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cycle {
    pub state: ControlState,
    pub keypad: ScanOutcome,
    pub switches: SwitchPoll,
}

/// Owns both scanners and the encoder source
pub struct Aggregator<'a, K, S, E, const ROWS: usize, const COLS: usize> {
    keypad: MatrixScanner<'a, K, ROWS, COLS>,
    switches: SwitchScanner<'a, S>,
    encoder: E,
    report_raw_mask: bool,
    last_raw_mask: Option<u16>,
}

impl<'a, K, S, E, const ROWS: usize, const COLS: usize> Aggregator<'a, K, S, E, ROWS, COLS>
where
    K: KeypadPort,
    S: SwitchPort,
    E: EncoderCount,
{
    pub fn new(
        keypad: MatrixScanner<'a, K, ROWS, COLS>,
        switches: SwitchScanner<'a, S>,
        encoder: E,
    ) -> Self {
        Self {
            keypad,
            switches,
            encoder,
            report_raw_mask: false,
            last_raw_mask: None,
        }
    }

    /// Report the raw switch register whenever a read returns a new value
    pub fn with_raw_mask_reporting(mut self, enabled: bool) -> Self {
        self.report_raw_mask = enabled;
        self
    }

    pub fn keypad_mut(&mut self) -> &mut MatrixScanner<'a, K, ROWS, COLS> {
        &mut self.keypad
    }

    pub fn switches_mut(&mut self) -> &mut SwitchScanner<'a, S> {
        &mut self.switches
    }

    /// Build this cycle's record
    pub fn collect(&mut self) -> Cycle {
        let mut state = ControlState::new(self.encoder.count());

        let keypad = self
            .keypad
            .poll(&mut |event| apply_keypad_event(&mut state, event));
        let switches = self
            .switches
            .poll(&mut |event| apply_switch_event(&mut state, event));

        if let SwitchPoll::Read { mask } = switches {
            if self.report_raw_mask && self.last_raw_mask != Some(mask) {
                state.raw_port_mask = Some(mask);
            }
            self.last_raw_mask = Some(mask);
        }

        Cycle {
            state,
            keypad,
            switches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keypad_event() {
        let mut state = ControlState::new(0);
        apply_keypad_event(
            &mut state,
            InputEvent::Key {
                index: 6,
                state: KeyState::Pressed,
            },
        );
        apply_keypad_event(
            &mut state,
            InputEvent::Key {
                index: 1,
                state: KeyState::Released,
            },
        );
        assert_eq!(state.keys_pressed, Some(1 << 6));
        assert_eq!(state.keys_released, Some(1 << 1));
        assert_eq!(state.estop, None);
    }

    #[test]
    fn test_apply_switch_event() {
        let mut state = ControlState::new(0);
        apply_switch_event(
            &mut state,
            InputEvent::Rotary {
                index: AXIS_SELECTOR,
                position: 9,
            },
        );
        apply_switch_event(
            &mut state,
            InputEvent::Rotary {
                index: MULTIPLIER_SELECTOR,
                position: 1,
            },
        );
        apply_switch_event(
            &mut state,
            InputEvent::Key {
                index: ESTOP_BUTTON,
                state: KeyState::Released,
            },
        );

        // out-of-range position resolves to no axis
        assert_eq!(state.axis, Some(Axis::Off));
        assert_eq!(state.multiplier, Some(Multiplier::X10));
        assert_eq!(state.estop, Some(false));
        assert_eq!(state.feedhold, None);
        assert_eq!(state.keys_pressed, None);
    }
}
