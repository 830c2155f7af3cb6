//! Error types for the TextStar display library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the display.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid construction argument.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serial device node does not exist.
    #[error("Serial port not found at {0}")]
    PortNotFound(String),

    /// Serial port could not be opened or configured.
    #[error("Could not open serial port {port}: {source}")]
    Connection {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// Serial I/O error.
    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cursor line outside 1-16.
    #[error("Invalid line (must be 1-16): {0}")]
    InvalidLine(u8),

    /// Cursor column outside 1-16.
    #[error("Invalid column (must be 1-16): {0}")]
    InvalidColumn(u8),

    /// Cursor style code outside 0-4.
    #[error("Invalid cursor style (must be 0-4): {0}")]
    InvalidCursorStyle(u8),

    /// Bar graph style other than 'b' or 'B'.
    #[error("Invalid bar graph style (must be 'b' or 'B'): {0:?}")]
    InvalidBarGraphStyle(char),

    /// Bar graph length outside 1-16.
    #[error("Invalid bar graph length (must be 1-16): {0}")]
    InvalidBarGraphLength(u8),

    /// Bar graph fill outside 0-100.
    #[error("Invalid bar graph percentage (must be 0-100): {0}")]
    InvalidPercent(u8),

    /// Scroll direction other than 0 (down) or 1 (up).
    #[error("Invalid scroll direction (must be 0 or 1): {0}")]
    InvalidScrollDirection(u8),

    /// Unknown cursor movement name.
    #[error("Invalid cursor movement: {0}")]
    InvalidCursorMove(String),

    /// Text payload was empty.
    #[error("Refusing to send empty text")]
    EmptyText,

    /// Character has no single-byte representation.
    #[error("Character {0:?} cannot be encoded for the display")]
    Unencodable(char),
}

impl Error {
    /// Returns true if the error was raised while validating arguments,
    /// before anything was written to the display.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Error::Configuration(_)
                | Error::PortNotFound(_)
                | Error::Connection { .. }
                | Error::Io(_)
        )
    }
}
