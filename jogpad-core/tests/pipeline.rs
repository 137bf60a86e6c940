//! Full-cycle scenarios: scanners -> aggregator -> transmitter -> frame

use core::cell::Cell;

use jogpad_core::switches::{FEEDHOLD_BUTTON, MULTIPLIER_SELECTOR};
use jogpad_core::{
    Aggregator, InputEvent, KeypadPort, MatrixScanner, ScanOutcome, SwitchLayout, SwitchPoll,
    SwitchPort, SwitchScanner, Transmission, Transmitter,
};
use jogpad_hal::{BusError, IrqContext, IrqCounter, IrqLatch, SharedCount};
use jogpad_protocol::{Axis, ControlState, FrameParser, Multiplier};

struct Keypad {
    closed: [[bool; 4]; 4],
    driven: u8,
}

impl KeypadPort for Keypad {
    fn drive_rows(&mut self, active_rows: u8) -> Result<(), BusError> {
        self.driven = active_rows;
        Ok(())
    }

    fn read_columns(&mut self) -> Result<u8, BusError> {
        let mut columns = 0;
        for (row, keys) in self.closed.iter().enumerate() {
            if self.driven & (1 << row) != 0 {
                for (col, &closed) in keys.iter().enumerate() {
                    if closed {
                        columns |= 1 << col;
                    }
                }
            }
        }
        Ok(columns)
    }
}

struct Register<'r> {
    mask: u16,
    reads: &'r Cell<usize>,
}

impl SwitchPort for Register<'_> {
    fn read_mask(&mut self) -> Result<u16, BusError> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.mask)
    }
}

struct Link {
    written: Vec<u8>,
    writes: usize,
}

impl embedded_io::ErrorType for Link {
    type Error = core::convert::Infallible;
}

impl embedded_io::Write for Link {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.writes += 1;
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn link() -> Link {
    Link {
        written: Vec::new(),
        writes: 0,
    }
}

fn empty_keypad() -> Keypad {
    Keypad {
        closed: [[false; 4]; 4],
        driven: 0x0F,
    }
}

#[test]
fn end_to_end_frame_decodes_to_selected_inputs() {
    let key_irq = IrqLatch::new();
    let switch_irq = IrqCounter::new();
    let encoder = SharedCount::new();
    let reads = Cell::new(0);

    // axis: run of 2 in the 6-bit field, multiplier: run of 1 in the 2-bit
    // field, estop bit clear, feedhold bit set
    let register = Register {
        mask: 0x4340,
        reads: &reads,
    };
    let mut aggregator: Aggregator<'_, _, _, _, 4, 4> = Aggregator::new(
        MatrixScanner::new(empty_keypad(), &key_irq),
        SwitchScanner::new(register, &switch_irq, SwitchLayout::default()),
        &encoder,
    );
    let mut tx = Transmitter::new();
    let mut out = link();

    encoder.add(42);
    switch_irq.fire();
    let cycle = aggregator.collect();

    assert_eq!(cycle.keypad, ScanOutcome::Idle);
    assert_eq!(cycle.switches, SwitchPoll::Read { mask: 0x4340 });
    let sent = tx.transmit(&cycle.state, &mut out);
    assert!(matches!(sent, Ok(Transmission::Sent(_))));

    let mut parser = FrameParser::new();
    let decoded = parser.feed_bytes(&out.written).unwrap().unwrap();
    assert_eq!(decoded.axis, Some(Axis::Z));
    assert_eq!(decoded.axis.map(Axis::index), Some(3));
    assert_eq!(decoded.multiplier, Some(Multiplier::X100));
    assert_eq!(decoded.multiplier.map(Multiplier::index), Some(2));
    assert_eq!(decoded.estop, None);
    assert_eq!(decoded.feedhold, Some(true));
    assert_eq!(decoded.encoder_value, 42);
    assert_eq!(decoded.raw_port_mask, None);
}

#[test]
fn identical_records_produce_one_frame() {
    let mut tx = Transmitter::new();
    let mut out = link();

    let state = ControlState::new(10);
    assert!(matches!(tx.transmit(&state, &mut out), Ok(Transmission::Sent(_))));
    assert_eq!(tx.transmit(&state, &mut out), Ok(Transmission::Skipped));
    assert_eq!(out.writes, 1);

    let moved = ControlState::new(11);
    assert!(matches!(tx.transmit(&moved, &mut out), Ok(Transmission::Sent(_))));
    assert_eq!(out.writes, 2);
    assert_eq!(out.written.iter().filter(|&&b| b == b'^').count(), 2);
}

#[test]
fn interrupt_burst_is_one_read() {
    let key_irq = IrqLatch::new();
    let switch_irq = IrqCounter::new();
    let reads = Cell::new(0);
    let register = Register {
        mask: 0x8340,
        reads: &reads,
    };
    let mut switches = SwitchScanner::new(register, &switch_irq, SwitchLayout::default());
    let mut keypad: MatrixScanner<'_, _, 4, 4> = MatrixScanner::new(empty_keypad(), &key_irq);

    switch_irq.fire();
    switch_irq.fire();
    switch_irq.fire();

    let mut events = Vec::new();
    let _ = keypad.poll(&mut |e| events.push(e));
    let _ = switches.poll(&mut |e| events.push(e));
    let _ = switches.poll(&mut |e| events.push(e));

    assert_eq!(reads.get(), 1);
    // axis moved, multiplier moved, feedhold pressed: one event each
    assert_eq!(events.len(), 3);
    assert!(events.contains(&InputEvent::Rotary {
        index: MULTIPLIER_SELECTOR,
        position: 1
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        InputEvent::Key {
            index: FEEDHOLD_BUTTON,
            ..
        }
    )));
}

#[test]
fn held_key_is_reported_once_and_stays_quiet() {
    let key_irq = IrqLatch::new();
    let switch_irq = IrqCounter::new();
    let encoder = SharedCount::new();
    let reads = Cell::new(0);
    let mut keypad = empty_keypad();
    keypad.closed[1][2] = true;

    let mut aggregator: Aggregator<'_, _, _, _, 4, 4> = Aggregator::new(
        MatrixScanner::new(keypad, &key_irq),
        SwitchScanner::new(
            Register {
                mask: 0xFF00,
                reads: &reads,
            },
            &switch_irq,
            SwitchLayout::default(),
        ),
        &encoder,
    );
    let mut tx = Transmitter::new();
    let mut out = link();

    for cycle in 0..5 {
        key_irq.fire();
        let state = aggregator.collect().state;
        if cycle == 0 {
            assert_eq!(state.keys_pressed, Some(1 << 6));
        } else {
            assert_eq!(state.keys_pressed, None);
        }
        let _ = tx.transmit(&state, &mut out);
    }
    // the press, then the return to an empty record
    assert_eq!(out.writes, 2);

    aggregator.keypad_mut().port_mut().closed[1][2] = false;
    key_irq.fire();
    let state = aggregator.collect().state;
    assert_eq!(state.keys_released, Some(1 << 6));
    assert_eq!(state.keys_pressed, None);
}

#[test]
fn raw_mask_reported_only_on_change() {
    let key_irq = IrqLatch::new();
    let switch_irq = IrqCounter::new();
    let encoder = SharedCount::new();
    let reads = Cell::new(0);

    let mut aggregator: Aggregator<'_, _, _, _, 4, 4> = Aggregator::new(
        MatrixScanner::new(empty_keypad(), &key_irq),
        SwitchScanner::new(
            Register {
                mask: 0xFFC0,
                reads: &reads,
            },
            &switch_irq,
            SwitchLayout::default(),
        ),
        &encoder,
    )
    .with_raw_mask_reporting(true);

    switch_irq.fire();
    assert_eq!(aggregator.collect().state.raw_port_mask, Some(0xFFC0));

    switch_irq.fire();
    assert_eq!(aggregator.collect().state.raw_port_mask, None);

    aggregator.switches_mut().port_mut().mask = 0xFF80;
    switch_irq.fire();
    let state = aggregator.collect().state;
    assert_eq!(state.raw_port_mask, Some(0xFF80));
    assert_eq!(state.feedhold, Some(false));
}
