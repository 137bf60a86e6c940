//! Matrix keypad scanner
//!
//! The keypad is an `ROWS × COLS` grid behind an I/O expander. Any key edge
//! raises the expander interrupt, which only sets an [`IrqLatch`]. The loop
//! then calls [`MatrixScanner::poll`], which scans the matrix row by row and
//! reports debounced edges.
//!
//! ```text
//!   irq ──▶ latch ──▶ poll ──▶ drive row i ──▶ read columns ──▶ diff ──▶ event
//!                       ▲                                        │
//!                       └──────────── next row ◀─────────────────┘
//! ```
//!
//! Button `j + i·COLS` sits on row `i`, column `j`. Rows are left all active
//! between scans so that any key press pulls a column and fires the
//! interrupt.

use jogpad_hal::{BusError, IrqLatch};

use crate::events::{InputEvent, KeyState};

/// Row/column access to the keypad matrix
pub trait KeypadPort {
    /// Drive the rows whose bits are set in `active_rows` active, the rest
    /// inactive
    fn drive_rows(&mut self, active_rows: u8) -> Result<(), BusError>;

    /// Read the column lines, bit `j` set when column `j` sees a closed key
    fn read_columns(&mut self) -> Result<u8, BusError>;
}

impl<T: KeypadPort + ?Sized> KeypadPort for &mut T {
    fn drive_rows(&mut self, active_rows: u8) -> Result<(), BusError> {
        (**self).drive_rows(active_rows)
    }

    fn read_columns(&mut self) -> Result<u8, BusError> {
        (**self).read_columns()
    }
}

/// Result of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome {
    /// No interrupt since the last complete scan
    Idle,
    /// All rows scanned, dirty flag cleared
    Complete,
    /// Bus failure on `row`; rows from `row` on were not scanned this cycle
    Aborted { row: u8, error: BusError },
}

/// Debounced edge detector over a keypad matrix
pub struct MatrixScanner<'a, P, const ROWS: usize, const COLS: usize> {
    port: P,
    irq: &'a IrqLatch,
    keys: [[KeyState; COLS]; ROWS],
}

impl<'a, P: KeypadPort, const ROWS: usize, const COLS: usize> MatrixScanner<'a, P, ROWS, COLS> {
    const LAYOUT_FITS: () = assert!(
        ROWS >= 1 && ROWS <= 8 && COLS <= 8 && ROWS * COLS <= 32,
        "keypad must fit an 8-bit port and a 32-bit key mask"
    );

    /// Idle pattern: every row active
    const ALL_ROWS: u8 = ((1u16 << ROWS) - 1) as u8;

    /// Create a scanner with every key released
    ///
    /// The latch starts however the caller left it; set it once to force an
    /// initial scan.
    pub fn new(port: P, irq: &'a IrqLatch) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_FITS;
        Self {
            port,
            irq,
            keys: [[KeyState::Released; COLS]; ROWS],
        }
    }

    /// Put the rows in their idle pattern
    pub fn idle(&mut self) -> Result<(), BusError> {
        self.port.drive_rows(Self::ALL_ROWS)
    }

    /// Debounced state of button `index`
    pub fn key_state(&self, index: usize) -> Option<KeyState> {
        if COLS == 0 {
            return None;
        }
        self.keys.get(index / COLS)?.get(index % COLS).copied()
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Scan the matrix if an interrupt arrived since the last complete scan
    ///
    /// `on_event` is called once per changed key, in button order. On a bus
    /// failure the remaining rows are skipped, the rows are returned to idle
    /// where possible and the dirty flag stays set so the next poll rescans.
    pub fn poll(&mut self, on_event: &mut impl FnMut(InputEvent)) -> ScanOutcome {
        if !self.irq.is_pending() {
            return ScanOutcome::Idle;
        }

        for row in 0..ROWS {
            let columns = match self
                .port
                .drive_rows(1 << row)
                .and_then(|_| self.port.read_columns())
            {
                Ok(columns) => columns,
                Err(error) => {
                    warn!("keypad scan aborted at row {}: {}", row, error);
                    let _ = self.idle();
                    return ScanOutcome::Aborted {
                        row: row as u8,
                        error,
                    };
                }
            };

            for (col, key) in self.keys[row].iter_mut().enumerate() {
                let state = KeyState::from_pressed(columns & (1 << col) != 0);
                if state != *key {
                    *key = state;
                    let index = (col + row * COLS) as u8;
                    debug!("key {} {}", index, state);
                    on_event(InputEvent::Key { index, state });
                }
            }
        }

        if let Err(error) = self.idle() {
            warn!("keypad idle restore failed: {}", error);
            return ScanOutcome::Aborted {
                row: ROWS as u8,
                error,
            };
        }

        self.irq.clear();
        ScanOutcome::Complete
    }
}
