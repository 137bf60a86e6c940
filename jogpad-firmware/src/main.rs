//! Jogpad - Machine Jog Pendant Firmware
//!
//! Main firmware binary for RP2040-based jog pendants. Scans a 4×4 keypad
//! behind a PCF8574, two rotary selectors and two buttons behind an
//! MCP23017, and a quadrature jog wheel, and streams the resulting control
//! state to the machine controller through an ESP-AT Wi-Fi modem.
//!
//! Pin assignments:
//!
//! | Signal               | GPIO |
//! |----------------------|------|
//! | UART0 TX/RX (modem)  | 0, 1 |
//! | I2C0 SDA/SCL         | 4, 5 |
//! | Keypad INT           | 6    |
//! | Switch INTA / INTB   | 7, 8 |
//! | Jog wheel A / B      | 10, 11 |

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, UART0};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Instant;
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use jogpad_core::{Aggregator, MatrixScanner, SwitchScanner};
use jogpad_display::PendantView;
use jogpad_drivers::display::Sh1106;
use jogpad_drivers::expander::pcf8574::ReadDeadline;
use jogpad_drivers::expander::{Mcp23017Switches, Pcf8574Keypad};
use jogpad_drivers::link::EspAtLink;
use jogpad_hal::I2cConfig;

use crate::channels::{JOG_COUNT, KEYPAD_IRQ, SWITCH_IRQ};
use crate::controller::Pendant;

mod channels;
mod config;
mod controller;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Keypad matrix geometry
const KEYPAD_ROWS: usize = 4;
const KEYPAD_COLS: usize = 4;

type I2cBus = RefCell<I2c<'static, I2C0, i2c::Blocking>>;

// Static cells (must live forever)
static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Microsecond clock for bus read deadlines
fn now_us() -> u64 {
    Instant::now().as_micros()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Jogpad firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();
    let bus_config = I2cConfig {
        frequency: config.bus.frequency,
        read_timeout_us: config.bus.read_timeout_us,
    };

    // Shared I2C bus: keypad expander, switch expander, display
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = bus_config.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let bus: &'static I2cBus = I2C_BUS.init(RefCell::new(i2c));
    info!("I2C initialized at {} Hz", bus_config.frequency);

    // Keypad matrix
    let keypad_port = Pcf8574Keypad::new(RefCellDevice::new(bus), config.bus.keypad_address)
        .with_deadline(ReadDeadline {
            now_us,
            budget_us: bus_config.read_timeout_us,
        });
    let mut keypad = MatrixScanner::<_, KEYPAD_ROWS, KEYPAD_COLS>::new(keypad_port, &KEYPAD_IRQ);
    if let Err(e) = keypad.idle() {
        warn!("Keypad expander not responding: {}", e);
    }

    // Selectors and buttons
    let layout = config.switches.layout;
    let mut switch_port = Mcp23017Switches::new(
        RefCellDevice::new(bus),
        config.bus.switches_address,
        config.switches.led_pin,
    );
    if let Err(e) = switch_port.init(&layout) {
        warn!("Switch expander init failed: {}", e);
    }
    let switches = SwitchScanner::new(switch_port, &SWITCH_IRQ, layout);

    // Display
    let mut display = Sh1106::new(RefCellDevice::new(bus), config.bus.display_address);
    if let Err(e) = display.init() {
        warn!("Display init failed: {}", e);
    }
    let view = PendantView::new(display);

    // Wi-Fi modem
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let link = EspAtLink::new(uart);
    info!("UART initialized for modem");

    // Interrupt lines and jog wheel
    let keypad_int = Input::new(p.PIN_6, Pull::Up);
    let switch_int_a = Input::new(p.PIN_7, Pull::Up);
    let switch_int_b = Input::new(p.PIN_8, Pull::Up);
    let jog_a = Input::new(p.PIN_10, Pull::Up);
    let jog_b = Input::new(p.PIN_11, Pull::Up);

    unwrap!(spawner.spawn(tasks::irq_line_task(keypad_int, &KEYPAD_IRQ)));
    unwrap!(spawner.spawn(tasks::irq_line_task(switch_int_a, &SWITCH_IRQ)));
    unwrap!(spawner.spawn(tasks::irq_line_task(switch_int_b, &SWITCH_IRQ)));
    unwrap!(spawner.spawn(tasks::encoder_task(jog_a, jog_b)));
    info!("Tasks spawned");

    let aggregator = Aggregator::new(keypad, switches, &JOG_COUNT)
        .with_raw_mask_reporting(config.diagnostics.report_raw_mask);
    let mut pendant = Pendant::new(aggregator, view, link, &config);
    pendant.run().await
}
