//! Byte transport to the display.
//!
//! The display only needs two primitives: write a command in one go, and read
//! whatever key bytes arrived within a short timeout.

use crate::{Error, Result};
use std::io::{self, Read, Write};
use std::time::Duration;
use tokio_serial::{DataBits, Parity, SerialPort, StopBits};
use tracing::{debug, info};

/// Default baud rate of the display.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read timeout used when polling for keys.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A byte link to the display.
pub trait Transport {
    /// Writes the whole buffer as a single operation.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads up to `buf.len()` bytes, returning `Ok(0)` when the read timed
    /// out with nothing received.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }
}

/// Serial line settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    /// Baud rate; must match the rate configured on the display.
    pub baud_rate: u32,
    /// How long a key poll waits for a byte.
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Serial port transport (8N1, no flow control).
///
/// The port is closed when this value is dropped.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    port_path: String,
}

impl SerialTransport {
    /// Opens and configures the serial port.
    pub fn open(port_path: &str, settings: SerialSettings) -> Result<Self> {
        if port_path.trim().is_empty() {
            return Err(Error::Configuration("no serial port given".to_string()));
        }

        let port = tokio_serial::new(port_path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| {
                debug!("Failed to open serial port {}: {}", port_path, e);
                if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                    if (*kind == io::ErrorKind::NotFound
                        || *kind == io::ErrorKind::PermissionDenied)
                        && !std::path::Path::new(port_path).exists()
                    {
                        return Error::PortNotFound(port_path.to_string());
                    }
                }
                Error::Connection {
                    port: port_path.to_string(),
                    source: e,
                }
            })?;

        info!(
            "Serial port opened: {} ({} baud, {:?} read timeout)",
            port_path, settings.baud_rate, settings.read_timeout
        );

        Ok(Self {
            port,
            port_path: port_path.to_string(),
        })
    }

    /// Returns the port path.
    pub fn port_path(&self) -> &str {
        &self.port_path
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        debug!("Closing serial port {}", self.port_path);
    }
}
