//! Display handle: validates operations, encodes them, and writes them to the
//! transport.

use crate::protocol::{
    decode_key, BarGraphStyle, Command, CursorMove, CursorStyle, KeyEvent, ScrollDirection,
};
use crate::transport::{SerialSettings, SerialTransport, Transport};
use crate::Result;
use tracing::{debug, warn};

/// TextStar display controller.
///
/// Owns the transport exclusively. The display keeps all state itself, so
/// the handle holds nothing else besides the diagnostics switch.
pub struct Display<T: Transport = SerialTransport> {
    transport: T,
    diagnostics: bool,
}

impl Display<SerialTransport> {
    /// Opens the display on a serial port and resets it.
    pub fn open(port_path: &str, settings: SerialSettings) -> Result<Self> {
        let transport = SerialTransport::open(port_path, settings)?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> Display<T> {
    /// Wraps an open transport and resets the display (no cursor, cleared).
    ///
    /// The reset is best effort: failures are logged and construction
    /// still succeeds.
    pub fn new(transport: T) -> Self {
        let mut display = Self {
            transport,
            diagnostics: false,
        };
        display.reset();
        display
    }

    /// Enables or disables warning diagnostics for rejected commands and
    /// transport failures.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    fn reset(&mut self) {
        for command in [Command::CursorStyle(CursorStyle::None), Command::Clear] {
            if let Err(e) = self.send(&command) {
                warn!("Display reset failed on {:?}: {}", command, e);
            }
        }
    }

    /// Encodes a command and writes it in a single transport call.
    ///
    /// Nothing is written if the command fails validation.
    pub fn send(&mut self, command: &Command<'_>) -> Result<()> {
        let bytes = command.encode().inspect_err(|e| {
            if self.diagnostics {
                warn!("Rejected {:?}: {}", command, e);
            }
        })?;

        self.transport.write(&bytes).inspect_err(|e| {
            if self.diagnostics {
                warn!("Error writing to display: {}", e);
            }
        })?;

        debug!("Sent {:02X?}", bytes);
        Ok(())
    }

    /// Writes text at the cursor position.
    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.send(&Command::Text(text))
    }

    /// Clears the display.
    pub fn clear(&mut self) -> Result<()> {
        self.send(&Command::Clear)
    }

    /// Sets the cursor style.
    pub fn set_cursor_style(&mut self, style: CursorStyle) -> Result<()> {
        self.send(&Command::CursorStyle(style))
    }

    /// Positions the cursor on a virtual line (1-16), optionally at a
    /// column (1-16). Without a column the cursor goes to the line start.
    pub fn set_cursor_position(&mut self, line: u8, column: Option<u8>) -> Result<()> {
        self.send(&Command::CursorPosition { line, column })
    }

    /// Moves the visible window one line.
    pub fn scroll(&mut self, direction: ScrollDirection) -> Result<()> {
        self.send(&Command::Scroll(direction))
    }

    /// Draws a bar graph `length` characters wide, filled to `percent`.
    pub fn draw_bar_graph(&mut self, style: BarGraphStyle, length: u8, percent: u8) -> Result<()> {
        self.send(&Command::BarGraph {
            style,
            length,
            percent,
        })
    }

    /// Returns the cursor to the top left of the window.
    pub fn cursor_home(&mut self) -> Result<()> {
        self.send(&Command::CursorHome)
    }

    /// Moves the cursor one step.
    pub fn move_cursor(&mut self, direction: CursorMove) -> Result<()> {
        self.send(&Command::CursorMove(direction))
    }

    /// Deletes the character before the cursor.
    pub fn delete_last(&mut self) -> Result<()> {
        self.send(&Command::DeleteLast)
    }

    /// Returns the cursor to the start of the current line.
    pub fn carriage_return(&mut self) -> Result<()> {
        self.send(&Command::CarriageReturn)
    }

    /// Waits up to the transport's read timeout for a key transition.
    ///
    /// Returns `None` when no key changed state in that window.
    pub fn poll_key(&mut self) -> Result<Option<KeyEvent>> {
        let mut buf = [0u8; 1];
        let n = self.transport.read(&mut buf).inspect_err(|e| {
            if self.diagnostics {
                warn!("Error reading from display: {}", e);
            }
        })?;

        let event = decode_key(&buf[..n]);
        if let Some(event) = event {
            debug!("Key event: {}", event);
        }
        Ok(event)
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Releases the transport without closing it.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Closes the display, releasing the transport.
    pub fn close(self) {
        drop(self.transport);
    }
}
