//! SH1106 OLED Display Driver
//!
//! Driver for 128x64 SH1106-based OLED displays via I2C.
//! Text is rendered with the embedded-graphics 6x10 mono font into a page
//! buffer (21 chars x 6 rows) and pushed to the panel on `flush`.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use jogpad_display::{DisplayBackend, DisplayError};

/// SH1106 I2C address (typically 0x3C or 0x3D)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Character cell size of FONT_6X10
const CHAR_WIDTH: usize = 6;
const CHAR_HEIGHT: usize = 10;

const COLS: u8 = (WIDTH / CHAR_WIDTH) as u8;
const ROWS: u8 = (HEIGHT / CHAR_HEIGHT) as u8;

/// The SH1106 RAM is 132 columns wide; the visible area starts at 2
const COLUMN_OFFSET: u8 = 2;

/// SH1106 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Control byte prefixes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// 1bpp page-organized frame buffer
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl FrameBuffer {
    const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    fn set(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let bit = 1 << (y % 8);
        if on {
            self.pages[y / 8][x] |= bit;
        } else {
            self.pages[y / 8][x] &= !bit;
        }
    }

    fn toggle(&mut self, x: usize, y: usize) {
        if x < WIDTH && y < HEIGHT {
            self.pages[y / 8][x] ^= 1 << (y % 8);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set(coord.x as usize, coord.y as usize, color.is_on());
            }
        }
        Ok(())
    }
}

/// SH1106 OLED driver
pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
    buffer: FrameBuffer,
    ready: bool,
}

impl<I2C: I2c> Sh1106<I2C> {
    /// Create a new SH1106 driver
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: FrameBuffer::new(),
            ready: false,
        }
    }

    /// Initialize the display
    pub fn init(&mut self) -> Result<(), DisplayError> {
        // Initialization sequence for SH1106
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,                  // Enable charge pump
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            0x12, // Alternative COM config
            cmd::SET_CONTRAST,
            0xCF, // High contrast
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c)?;
        }

        self.ready = true;
        self.clear_buffer();
        self.flush()
    }

    /// Send a command to the display
    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, cmd])
            .map_err(|_| DisplayError::Communication)
    }

    fn clear_buffer(&mut self) {
        for page in self.buffer.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Frame buffer, for drawing with embedded-graphics directly
    pub fn frame_buffer(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.command(cmd::SET_CONTRAST)?;
        self.command(contrast)
    }

    fn cell_origin(row: u8, col: u8) -> Point {
        Point::new(
            i32::from(col) * CHAR_WIDTH as i32,
            i32::from(row) * CHAR_HEIGHT as i32,
        )
    }
}

impl<I2C: I2c> DisplayBackend for Sh1106<I2C> {
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        if row >= ROWS || col >= COLS {
            return Err(DisplayError::InvalidCoordinates);
        }

        let origin = Self::cell_origin(row, col);
        let cells = text.chars().count().min(usize::from(COLS - col));
        let area = Rectangle::new(
            origin,
            Size::new((cells * CHAR_WIDTH) as u32, CHAR_HEIGHT as u32),
        );
        let _ = self.buffer.fill_solid(&area, BinaryColor::Off);

        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.buffer);
        Ok(())
    }

    fn invert_region(
        &mut self,
        row: u8,
        start_col: u8,
        end_col: u8,
    ) -> Result<(), DisplayError> {
        if row >= ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }

        let y0 = usize::from(row) * CHAR_HEIGHT;
        let x0 = usize::from(start_col) * CHAR_WIDTH;
        let x1 = (usize::from(end_col) * CHAR_WIDTH).min(WIDTH);
        for y in y0..y0 + CHAR_HEIGHT {
            for x in x0..x1 {
                self.buffer.toggle(x, y);
            }
        }
        Ok(())
    }

    /// Flush the frame buffer to the display
    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotInitialized);
        }

        for page in 0..PAGES {
            self.command(cmd::SET_PAGE_ADDR | page as u8)?;
            self.command(cmd::SET_LOW_COLUMN | (COLUMN_OFFSET & 0x0F))?;
            self.command(cmd::SET_HIGH_COLUMN | (COLUMN_OFFSET >> 4))?;

            // Send page data
            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(&self.buffer.pages[page]);
            self.i2c
                .write(self.address, &data)
                .map_err(|_| DisplayError::Communication)?;
        }

        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
