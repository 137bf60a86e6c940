//! Quadrature decoder
//!
//! Full-quadrature decoding: every valid edge on A or B counts, so one
//! detent of a typical jog wheel yields four counts. Transitions that skip
//! a state (both lines changed between samples) are treated as noise.
//!
//! ```text
//!   CW:   00 -> 01 -> 11 -> 10 -> 00     (+1 per step)
//!   CCW:  00 -> 10 -> 11 -> 01 -> 00     (-1 per step)
//! ```
//!
//! States are `(a << 1) | b`.

/// Count delta indexed by `(previous << 2) | current`
const TRANSITIONS: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0, //
];

/// Edge-driven quadrature state machine
#[derive(Debug, Clone, Copy)]
pub struct QuadratureDecoder {
    state: u8,
    invalid: u32,
}

impl QuadratureDecoder {
    /// Create a decoder starting from the current line levels
    pub const fn new(a: bool, b: bool) -> Self {
        Self {
            state: Self::encode(a, b),
            invalid: 0,
        }
    }

    const fn encode(a: bool, b: bool) -> u8 {
        ((a as u8) << 1) | b as u8
    }

    /// Feed the current line levels, returning the count delta
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        let next = Self::encode(a, b);
        if next == self.state {
            return 0;
        }
        let delta = TRANSITIONS[usize::from((self.state << 2) | next)];
        if delta == 0 {
            self.invalid = self.invalid.wrapping_add(1);
        }
        self.state = next;
        delta
    }

    /// Number of skipped-state transitions seen so far
    pub fn invalid_transitions(&self) -> u32 {
        self.invalid
    }
}
