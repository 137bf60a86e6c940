//! MCP23017 switch register port
//!
//! Selectors and buttons occupy pins 6..15; pin 0 drives the status LED.
//! GPIOA and GPIOB are read together as one little-endian 16-bit mask
//! (GPIOB in the high byte), which is the aggregate register the switch
//! scanner decodes.
//!
//! Registers are addressed with IOCON.BANK = 0, so each A/B pair is
//! adjacent and written with one sequential transaction.

use embedded_hal::i2c::I2c;
use jogpad_core::{SwitchLayout, SwitchPort};
use jogpad_hal::BusError;

/// Default I2C address on the pendant board
pub const DEFAULT_ADDRESS: u8 = 0x20;

#[allow(dead_code)]
mod reg {
    pub const IODIRA: u8 = 0x00;
    pub const IPOLA: u8 = 0x02;
    pub const GPINTENA: u8 = 0x04;
    pub const DEFVALA: u8 = 0x06;
    pub const INTCONA: u8 = 0x08;
    pub const IOCON: u8 = 0x0A;
    pub const GPPUA: u8 = 0x0C;
    pub const INTFA: u8 = 0x0E;
    pub const INTCAPA: u8 = 0x10;
    pub const GPIOA: u8 = 0x12;
    pub const OLATA: u8 = 0x14;
}

/// IOCON bits
mod iocon {
    /// INTA/INTB mirrored
    pub const MIRROR: u8 = 1 << 6;
    /// Open-drain interrupt outputs
    pub const ODR: u8 = 1 << 2;
}

/// Switch expander
pub struct Mcp23017Switches<I2C> {
    i2c: I2C,
    address: u8,
    led_pin: u8,
    /// Shadow of OLATA/OLATB
    latch: u16,
}

impl<I2C: I2c> Mcp23017Switches<I2C> {
    pub fn new(i2c: I2C, address: u8, led_pin: u8) -> Self {
        Self {
            i2c,
            address,
            led_pin: led_pin & 15,
            latch: 0xFFFF,
        }
    }

    /// Configure the expander for `layout`
    ///
    /// Switch pins become pulled-up inputs with interrupt-on-change,
    /// interrupts are open-drain and not mirrored, the LED pin becomes an
    /// output and is switched on. Ends with a port read so no interrupt is
    /// left pending from before the configuration.
    pub fn init(&mut self, layout: &SwitchLayout) -> Result<(), BusError> {
        let inputs = layout.input_mask();
        let led = 1u16 << self.led_pin;

        self.write_reg(reg::IOCON, iocon::ODR & !iocon::MIRROR)?;
        self.write_pair(reg::IODIRA, !led)?;
        self.write_pair(reg::IPOLA, 0)?;
        self.write_pair(reg::GPPUA, inputs)?;
        self.write_pair(reg::INTCONA, 0)?;
        self.write_pair(reg::GPINTENA, inputs)?;
        self.set_led(true)?;
        self.read_mask().map(|_| ())
    }

    /// Switch the status LED (active-low)
    pub fn set_led(&mut self, on: bool) -> Result<(), BusError> {
        let led = 1u16 << self.led_pin;
        if on {
            self.latch &= !led;
        } else {
            self.latch |= led;
        }
        self.write_pair(reg::OLATA, self.latch)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|e| BusError::from_i2c(&e))
    }

    fn write_pair(&mut self, register_a: u8, value: u16) -> Result<(), BusError> {
        let [a, b] = value.to_le_bytes();
        self.i2c
            .write(self.address, &[register_a, a, b])
            .map_err(|e| BusError::from_i2c(&e))
    }
}

impl<I2C: I2c> SwitchPort for Mcp23017Switches<I2C> {
    fn read_mask(&mut self) -> Result<u16, BusError> {
        let mut port = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::GPIOA], &mut port)
            .map_err(|e| BusError::from_i2c(&e))?;
        Ok(u16::from_le_bytes(port))
    }
}
