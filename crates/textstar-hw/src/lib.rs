//! TextStar Display Hardware Library
//!
//! Provides a driver for the TextStar CW-LCD-02 serial character display:
//! a 16x2 window onto 16 virtual lines, with a native bar graph widget and
//! four configurable keys.

pub mod display;
pub mod error;
pub mod protocol;
pub mod transport;

pub use display::Display;
pub use error::{Error, Result};
pub use protocol::{BarGraphStyle, Command, CursorMove, CursorStyle, KeyEvent, ScrollDirection};
pub use transport::{SerialSettings, SerialTransport, Transport};

/// Number of virtual lines held by the display.
pub const VIRTUAL_LINES: u8 = 16;

/// Number of lines visible through the window at any time.
pub const VISIBLE_LINES: u8 = 2;

/// Characters per line.
pub const COLUMNS: u8 = 16;
