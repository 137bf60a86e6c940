//! Display sink trait for the local pendant screen

use jogpad_protocol::ControlState;

/// Receives every cycle's control state for local display
///
/// Rendering is fire-and-forget: the loop never waits on or reacts to the
/// display. Implementations keep whatever they need to redraw only what
/// changed, since most records carry nothing but the encoder count.
pub trait DisplaySink {
    fn show(&mut self, state: &ControlState);
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn show(&mut self, state: &ControlState) {
        (**self).show(state)
    }
}

/// Sink that discards everything, for boards without a screen
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl DisplaySink for NoDisplay {
    fn show(&mut self, _state: &ControlState) {}
}
