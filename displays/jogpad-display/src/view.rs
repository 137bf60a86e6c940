//! Pendant status view
//!
//! ```text
//!   row 0   Jog X: 1234      or   <NAV>
//!   row 1   x10
//!   row 2   ESTOP HOLD       (inverted while estop is pressed)
//! ```
//!
//! Records only carry the fields that changed this cycle, so the view keeps
//! the last value it saw for each one.

use core::fmt::Write as _;

use heapless::String;
use jogpad_core::DisplaySink;
use jogpad_protocol::{Axis, ControlState, Multiplier};

use crate::backend::{DisplayBackend, DisplayError};
use crate::screen::{Screen, LINE_LEN};

const ROW_JOG: usize = 0;
const ROW_MULTIPLIER: usize = 1;
const ROW_STATUS: usize = 2;

/// Renders control states onto a display backend
pub struct PendantView<B> {
    backend: B,
    screen: Screen,
    axis: Option<Axis>,
    multiplier: Option<Multiplier>,
    value: i32,
    estop: bool,
    feedhold: bool,
    last_error: Option<DisplayError>,
}

impl<B: DisplayBackend> PendantView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            screen: Screen::new(),
            axis: None,
            multiplier: None,
            value: 0,
            estop: false,
            feedhold: false,
            last_error: None,
        }
    }

    /// Most recent render failure, cleared by the next successful render
    pub fn last_error(&self) -> Option<DisplayError> {
        self.last_error
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn latch(&mut self, state: &ControlState) {
        self.value = state.encoder_value;
        if let Some(axis) = state.axis {
            self.axis = Some(axis);
        }
        if let Some(multiplier) = state.multiplier {
            self.multiplier = Some(multiplier);
        }
        if let Some(estop) = state.estop {
            self.estop = estop;
        }
        if let Some(feedhold) = state.feedhold {
            self.feedhold = feedhold;
        }
    }

    fn compose(&mut self) {
        let mut line: String<LINE_LEN> = String::new();
        match self.axis {
            Some(axis) if axis != Axis::Off => {
                let _ = write!(line, "Jog {}: {}", axis.label(), self.value);
            }
            _ => {
                let _ = line.push_str("<NAV>");
            }
        }
        self.screen.set_line(ROW_JOG, &line);

        self.screen
            .set_line(ROW_MULTIPLIER, self.multiplier.map_or("", Multiplier::label));

        line.clear();
        if self.estop {
            let _ = line.push_str("ESTOP");
        }
        if self.feedhold {
            if !line.is_empty() {
                let _ = line.push(' ');
            }
            let _ = line.push_str("HOLD");
        }
        self.screen.set_line(ROW_STATUS, &line);
        let highlight = self.estop.then_some((0, 5));
        self.screen.set_highlight(ROW_STATUS, highlight);
    }

    /// Latch `state` and redraw whatever changed
    pub fn update(&mut self, state: &ControlState) -> Result<usize, DisplayError> {
        self.latch(state);
        self.compose();
        self.screen.render(&mut self.backend)
    }
}

impl<B: DisplayBackend> DisplaySink for PendantView<B> {
    fn show(&mut self, state: &ControlState) {
        match self.update(state) {
            Ok(_) => self.last_error = None,
            Err(err) => {
                if self.last_error.is_none() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("display render failed: {}", err);
                }
                self.last_error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::tests::MockBackend;

    #[test]
    fn test_nav_mode_until_axis_selected() {
        let mut view = PendantView::new(MockBackend::new());
        view.show(&ControlState::new(12));

        assert_eq!(view.backend_mut().row(ROW_JOG), "<NAV>");
        assert_eq!(view.backend_mut().row(ROW_MULTIPLIER), "");
        assert_eq!(view.last_error(), None);
    }

    #[test]
    fn test_jog_row_tracks_encoder() {
        let mut view = PendantView::new(MockBackend::new());
        view.show(&ControlState {
            axis: Some(Axis::Y),
            multiplier: Some(Multiplier::X10),
            ..ControlState::new(-40)
        });
        assert_eq!(view.backend_mut().row(ROW_JOG), "Jog Y: -40");
        assert_eq!(view.backend_mut().row(ROW_MULTIPLIER), "x10");

        // later records omit the axis; the view keeps it
        let draws = view.backend_mut().draws;
        view.show(&ControlState::new(-39));
        assert_eq!(view.backend_mut().row(ROW_JOG), "Jog Y: -39");
        assert_eq!(view.backend_mut().row(ROW_MULTIPLIER), "x10");
        assert_eq!(view.backend_mut().draws, draws + 1);
    }

    #[test]
    fn test_unchanged_state_draws_nothing() {
        let mut view = PendantView::new(MockBackend::new());
        view.show(&ControlState::new(1));
        let flushes = view.backend_mut().flushes;

        view.show(&ControlState::new(1));
        assert_eq!(view.backend_mut().flushes, flushes);
    }

    #[test]
    fn test_status_row() {
        let mut view = PendantView::new(MockBackend::new());
        view.show(&ControlState {
            estop: Some(true),
            feedhold: Some(true),
            ..ControlState::new(0)
        });
        assert_eq!(view.backend_mut().row(ROW_STATUS), "ESTOP HOLD");
        assert_eq!(view.backend_mut().inverted[ROW_STATUS], Some((0, 5)));

        view.show(&ControlState {
            estop: Some(false),
            ..ControlState::new(0)
        });
        assert_eq!(view.backend_mut().row(ROW_STATUS), "HOLD");
        assert_eq!(view.backend_mut().inverted[ROW_STATUS], None);
    }

    #[test]
    fn test_axis_off_returns_to_nav() {
        let mut view = PendantView::new(MockBackend::new());
        view.show(&ControlState {
            axis: Some(Axis::Z),
            ..ControlState::new(3)
        });
        view.show(&ControlState {
            axis: Some(Axis::Off),
            ..ControlState::new(3)
        });
        assert_eq!(view.backend_mut().row(ROW_JOG), "<NAV>");
    }

    #[test]
    fn test_render_error_is_recorded() {
        let mut backend = MockBackend::new();
        backend.fail = true;
        let mut view = PendantView::new(backend);

        view.show(&ControlState::new(0));
        assert_eq!(view.last_error(), Some(DisplayError::Communication));

        view.backend_mut().fail = false;
        view.show(&ControlState::new(0));
        assert_eq!(view.last_error(), None);
    }
}
