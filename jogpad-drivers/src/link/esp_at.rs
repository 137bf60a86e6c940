//! ESP-AT Wi-Fi modem link
//!
//! Drives an ESP8266/ESP32 running the stock AT firmware over a UART. After
//! [`EspAtLink::connect`] succeeds the modem is in transparent mode, so the
//! link becomes a raw byte pipe to the TCP peer and implements
//! [`embedded_io_async::Write`] for the transmitter.
//!
//! ```text
//!   AT+CWMODE=1                    station mode
//!   AT+CWJAP="ssid","password"     join access point
//!   AT+CIPSTART="TCP","host",port  open socket
//!   AT+CIPMODE=1                   transparent mode
//!   AT+CIPSEND                     wait for '>' then pass-through
//! ```
//!
//! Replies are read one byte at a time so nothing after the terminating
//! line is consumed. None of the calls time out on their own; wrap them
//! with the executor's timeout when the modem may stay silent.

use core::fmt::Write as _;

use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use heapless::{String, Vec};

/// Longest reply line kept; longer lines are truncated
const LINE_LEN: usize = 64;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// UART error
    Io(E),
    /// The modem stopped sending before a reply completed
    Closed,
    /// Pass-through write attempted without an open connection
    NotConnected,
}

impl<E: embedded_io_async::Error> embedded_io_async::Error for LinkError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            LinkError::Io(e) => e.kind(),
            LinkError::Closed => ErrorKind::ConnectionReset,
            LinkError::NotConnected => ErrorKind::NotConnected,
        }
    }
}

/// Final line of an AT reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Ok,
    Error,
}

/// TCP client on an ESP-AT modem
pub struct EspAtLink<T> {
    io: T,
    line: Vec<u8, LINE_LEN>,
    connected: bool,
}

type Result<T, IO> = core::result::Result<T, LinkError<<IO as ErrorType>::Error>>;

impl<T: Read + Write> EspAtLink<T> {
    pub fn new(io: T) -> Self {
        Self {
            io,
            line: Vec::new(),
            connected: false,
        }
    }

    /// Whether the modem is in pass-through mode
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn release(self) -> T {
        self.io
    }

    /// Join a Wi-Fi access point
    ///
    /// Returns `Ok(false)` when the modem reports the join failed.
    pub async fn join(&mut self, ssid: &str, password: &str) -> Result<bool, T> {
        self.send(b"AT+CWMODE=1\r\n").await?;
        if self.reply().await? != Reply::Ok {
            return Ok(false);
        }

        self.send(b"AT+CWJAP=").await?;
        self.send_quoted(ssid).await?;
        self.send(b",").await?;
        self.send_quoted(password).await?;
        self.send(b"\r\n").await?;
        Ok(self.reply().await? == Reply::Ok)
    }

    /// Open a TCP connection and enter transparent mode
    ///
    /// Returns `Ok(false)` when the modem refuses any step.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<bool, T> {
        self.connected = false;

        let mut port_text: String<6> = String::new();
        let _ = write!(port_text, "{}", port);

        self.send(b"AT+CIPSTART=\"TCP\",").await?;
        self.send_quoted(host).await?;
        self.send(b",").await?;
        self.send(port_text.as_bytes()).await?;
        self.send(b"\r\n").await?;
        if self.reply().await? != Reply::Ok {
            return Ok(false);
        }

        self.send(b"AT+CIPMODE=1\r\n").await?;
        if self.reply().await? != Reply::Ok {
            return Ok(false);
        }

        self.send(b"AT+CIPSEND\r\n").await?;
        if self.reply().await? != Reply::Ok {
            return Ok(false);
        }
        self.wait_for(b'>').await?;

        self.connected = true;
        Ok(true)
    }

    /// Leave transparent mode
    ///
    /// The modem needs about a second of silence after this before it
    /// accepts AT commands again.
    pub async fn close(&mut self) -> Result<(), T> {
        self.connected = false;
        self.send(b"+++").await?;
        self.io.flush().await.map_err(LinkError::Io)
    }

    /// Read one chunk of inbound bytes and throw it away
    ///
    /// Returns the number of bytes discarded.
    pub async fn drain(&mut self) -> Result<usize, T> {
        let mut scratch = [0u8; 32];
        self.io.read(&mut scratch).await.map_err(LinkError::Io)
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), T> {
        self.io.write_all(bytes).await.map_err(LinkError::Io)
    }

    /// Send `text` as an AT string argument
    async fn send_quoted(&mut self, text: &str) -> Result<(), T> {
        self.send(b"\"").await?;
        let bytes = text.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if matches!(b, b'"' | b',' | b'\\') {
                self.send(&bytes[start..i]).await?;
                self.send(&[b'\\', b]).await?;
                start = i + 1;
            }
        }
        self.send(&bytes[start..]).await?;
        self.send(b"\"").await
    }

    async fn read_byte(&mut self) -> Result<u8, T> {
        let mut byte = [0u8];
        match self.io.read(&mut byte).await {
            Ok(0) => Err(LinkError::Closed),
            Ok(_) => Ok(byte[0]),
            Err(e) => Err(LinkError::Io(e)),
        }
    }

    async fn wait_for(&mut self, wanted: u8) -> Result<(), T> {
        while self.read_byte().await? != wanted {}
        Ok(())
    }

    /// Read lines until a final status line
    ///
    /// Command echo and informational lines are skipped. A socket that is
    /// already open reports `ALREADY CONNECTED` followed by `ERROR`, which
    /// counts as success.
    async fn reply(&mut self) -> Result<Reply, T> {
        let mut already_connected = false;
        loop {
            self.line.clear();
            loop {
                match self.read_byte().await? {
                    b'\n' => break,
                    b'\r' => {}
                    byte => {
                        let _ = self.line.push(byte);
                    }
                }
            }

            match self.line.as_slice() {
                b"OK" => return Ok(Reply::Ok),
                b"ERROR" | b"FAIL" if already_connected => return Ok(Reply::Ok),
                b"ERROR" | b"FAIL" => return Ok(Reply::Error),
                b"ALREADY CONNECTED" => already_connected = true,
                _ => {}
            }
        }
    }
}

impl<T: Read + Write> ErrorType for EspAtLink<T> {
    type Error = LinkError<<T as ErrorType>::Error>;
}

impl<T: Read + Write> Write for EspAtLink<T> {
    async fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Self::Error> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        self.io.write(buf).await.map_err(|e| {
            self.connected = false;
            LinkError::Io(e)
        })
    }

    async fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        self.io.flush().await.map_err(LinkError::Io)
    }
}
