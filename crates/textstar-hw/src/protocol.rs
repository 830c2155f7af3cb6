//! TextStar command protocol definitions and encoding.
//!
//! Protocol structure:
//! - Plain text is prefixed with a NUL byte and sent as single-byte characters
//! - Command sequences start with 0xFE followed by an ASCII command letter
//! - Numeric arguments are raw bytes, not ASCII digits
//! - A few operations (clear, cursor movement) are bare control bytes
//! - Keys report a single byte back: uppercase on press, lowercase on release

use crate::{Error, Result, COLUMNS, VIRTUAL_LINES};
use std::str::FromStr;

/// Start of a command sequence.
pub const CMD: u8 = 0xFE;

/// Prefix for plain text.
pub const NUL: u8 = 0x00;

/// Clear display control byte.
pub const CLEAR: u8 = 0x0C;

/// Delete last character control byte.
pub const DELETE: u8 = 0x7F;

/// Carriage return control byte.
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// Highest addressable line.
pub const MAX_LINE: u8 = VIRTUAL_LINES;

/// Highest addressable column.
pub const MAX_COLUMN: u8 = COLUMNS;

/// Longest bar graph, in characters.
pub const MAX_BAR_LENGTH: u8 = COLUMNS;

/// Largest bar graph fill.
pub const MAX_PERCENT: u8 = 100;

/// Font ROM substitutions applied to text before Latin-1 encoding.
///
/// The display has no uppercase umlauts, so those share the lowercase glyphs.
const CHARSET_MAP: [(char, u8); 7] = [
    ('Ä', 0xE1),
    ('Ö', 0xEF),
    ('Ü', 0xF5),
    ('ä', 0xE1),
    ('ö', 0xEF),
    ('ü', 0xF5),
    ('°', 0xDF),
];

/// Cursor styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CursorStyle {
    /// No cursor.
    #[default]
    None = 0,
    /// Solid block.
    SolidBlock = 1,
    /// Flashing block.
    FlashingBlock = 2,
    /// Solid underline.
    SolidUnderline = 3,
    /// Flashing underline.
    FlashingUnderline = 4,
}

impl CursorStyle {
    /// Converts a style code to CursorStyle.
    pub fn from_byte(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CursorStyle::None),
            1 => Ok(CursorStyle::SolidBlock),
            2 => Ok(CursorStyle::FlashingBlock),
            3 => Ok(CursorStyle::SolidUnderline),
            4 => Ok(CursorStyle::FlashingUnderline),
            _ => Err(Error::InvalidCursorStyle(value)),
        }
    }
}

impl FromStr for CursorStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(CursorStyle::None),
            "block" => Ok(CursorStyle::SolidBlock),
            "block-flash" | "block_flash" => Ok(CursorStyle::FlashingBlock),
            "underline" => Ok(CursorStyle::SolidUnderline),
            "underline-flash" | "underline_flash" => Ok(CursorStyle::FlashingUnderline),
            other => match other.parse::<u8>() {
                Ok(code) => Self::from_byte(code),
                Err(_) => Err(Error::InvalidCursorStyle(u8::MAX)),
            },
        }
    }
}

impl std::fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorStyle::None => write!(f, "none"),
            CursorStyle::SolidBlock => write!(f, "block"),
            CursorStyle::FlashingBlock => write!(f, "block-flash"),
            CursorStyle::SolidUnderline => write!(f, "underline"),
            CursorStyle::FlashingUnderline => write!(f, "underline-flash"),
        }
    }
}

/// Bar graph styles, sent as the command letter itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BarGraphStyle {
    /// Terminated with a cap glyph.
    #[default]
    Capped = b'b',
    /// No terminating cap.
    Uncapped = b'B',
}

impl BarGraphStyle {
    /// Converts a command letter to BarGraphStyle.
    pub fn from_char(value: char) -> Result<Self> {
        match value {
            'b' => Ok(BarGraphStyle::Capped),
            'B' => Ok(BarGraphStyle::Uncapped),
            _ => Err(Error::InvalidBarGraphStyle(value)),
        }
    }
}

impl FromStr for BarGraphStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Single letters are case sensitive, names are not.
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_char(c);
        }
        match s.to_lowercase().as_str() {
            "capped" => Ok(BarGraphStyle::Capped),
            "uncapped" => Ok(BarGraphStyle::Uncapped),
            _ => Err(Error::InvalidBarGraphStyle(s.chars().next().unwrap_or('\0'))),
        }
    }
}

impl std::fmt::Display for BarGraphStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarGraphStyle::Capped => write!(f, "capped"),
            BarGraphStyle::Uncapped => write!(f, "uncapped"),
        }
    }
}

/// Direction to move the 2-line window over the virtual lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScrollDirection {
    /// Move the window down one line.
    Down = 0,
    /// Move the window up one line.
    Up = 1,
}

impl ScrollDirection {
    /// Converts a direction code to ScrollDirection.
    pub fn from_byte(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ScrollDirection::Down),
            1 => Ok(ScrollDirection::Up),
            _ => Err(Error::InvalidScrollDirection(value)),
        }
    }
}

impl FromStr for ScrollDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "down" | "0" => Ok(ScrollDirection::Down),
            "up" | "1" => Ok(ScrollDirection::Up),
            _ => Err(Error::InvalidScrollDirection(u8::MAX)),
        }
    }
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollDirection::Down => write!(f, "down"),
            ScrollDirection::Up => write!(f, "up"),
        }
    }
}

/// Single-step cursor movements, each a bare control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CursorMove {
    Back = 0x08,
    Forward = 0x09,
    Down = 0x0A,
    Up = 0x0B,
}

impl FromStr for CursorMove {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "back" | "left" => Ok(CursorMove::Back),
            "forward" | "right" => Ok(CursorMove::Forward),
            "down" => Ok(CursorMove::Down),
            "up" => Ok(CursorMove::Up),
            _ => Err(Error::InvalidCursorMove(s.to_string())),
        }
    }
}

impl std::fmt::Display for CursorMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorMove::Back => write!(f, "back"),
            CursorMove::Forward => write!(f, "forward"),
            CursorMove::Down => write!(f, "down"),
            CursorMove::Up => write!(f, "up"),
        }
    }
}

/// A single display operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Text written at the cursor position.
    Text(&'a str),
    /// Clear the display.
    Clear,
    /// Change the cursor style.
    CursorStyle(CursorStyle),
    /// Move the cursor to a line, and optionally a column.
    CursorPosition { line: u8, column: Option<u8> },
    /// Move the visible window.
    Scroll(ScrollDirection),
    /// Draw a bar graph at the cursor position.
    BarGraph {
        style: BarGraphStyle,
        length: u8,
        percent: u8,
    },
    /// Return the cursor to the top left.
    CursorHome,
    /// Move the cursor one step.
    CursorMove(CursorMove),
    /// Delete the character before the cursor.
    DeleteLast,
    /// Return the cursor to the start of the line.
    CarriageReturn,
}

impl Command<'_> {
    /// Validates the command and builds the exact bytes the display expects.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match *self {
            Command::Text(text) => {
                if text.is_empty() {
                    return Err(Error::EmptyText);
                }
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.push(NUL);
                bytes.extend(encode_text(text)?);
                Ok(bytes)
            }
            Command::Clear => Ok(vec![CLEAR]),
            Command::CursorStyle(style) => Ok(vec![NUL, CMD, b'C', style as u8]),
            Command::CursorPosition { line, column } => {
                if !(1..=MAX_LINE).contains(&line) {
                    return Err(Error::InvalidLine(line));
                }
                match column {
                    None => Ok(vec![CMD, b'L', line]),
                    Some(column) if (1..=MAX_COLUMN).contains(&column) => {
                        Ok(vec![CMD, b'P', line, column])
                    }
                    Some(column) => Err(Error::InvalidColumn(column)),
                }
            }
            Command::Scroll(direction) => Ok(vec![CMD, b'O', direction as u8]),
            Command::BarGraph {
                style,
                length,
                percent,
            } => {
                if !(1..=MAX_BAR_LENGTH).contains(&length) {
                    return Err(Error::InvalidBarGraphLength(length));
                }
                if percent > MAX_PERCENT {
                    return Err(Error::InvalidPercent(percent));
                }
                Ok(vec![CMD, style as u8, length, percent])
            }
            Command::CursorHome => Ok(vec![CMD, b'H']),
            Command::CursorMove(direction) => Ok(vec![direction as u8]),
            Command::DeleteLast => Ok(vec![DELETE]),
            Command::CarriageReturn => Ok(vec![CARRIAGE_RETURN]),
        }
    }
}

/// Translates a character to the display's font ROM and encodes it as one byte.
pub fn encode_char(c: char) -> Result<u8> {
    if let Some(&(_, byte)) = CHARSET_MAP.iter().find(|(from, _)| *from == c) {
        return Ok(byte);
    }
    u8::try_from(u32::from(c)).map_err(|_| Error::Unencodable(c))
}

/// Encodes text for the display, one byte per character.
pub fn encode_text(text: &str) -> Result<Vec<u8>> {
    text.chars().map(encode_char).collect()
}

/// A key transition reported by the display.
///
/// The key letters are configured on the device (A-D by default); the case
/// carries the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent(char);

impl KeyEvent {
    /// Wraps a received character.
    pub fn new(key: char) -> Self {
        Self(key)
    }

    /// Returns the character exactly as received.
    pub fn key(&self) -> char {
        self.0
    }

    /// Returns true for a key press (uppercase).
    pub fn is_down(&self) -> bool {
        self.0.is_uppercase()
    }

    /// Returns true for a key release (lowercase).
    pub fn is_up(&self) -> bool {
        self.0.is_lowercase()
    }
}

impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decodes bytes read from the display into a key event.
///
/// An empty read (timeout) means no key was pressed. Bytes are Latin-1, so
/// every value maps to a character.
pub fn decode_key(bytes: &[u8]) -> Option<KeyEvent> {
    bytes.first().map(|&b| KeyEvent(char::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position_packet() {
        for line in 1..=16u8 {
            for column in 1..=16u8 {
                let bytes = Command::CursorPosition {
                    line,
                    column: Some(column),
                }
                .encode()
                .unwrap();
                assert_eq!(bytes, vec![0xFE, b'P', line, column]);
            }
            let bytes = Command::CursorPosition { line, column: None }
                .encode()
                .unwrap();
            assert_eq!(bytes, vec![0xFE, b'L', line]);
        }
    }

    #[test]
    fn test_cursor_position_out_of_range() {
        for line in [0u8, 17, 255] {
            let result = Command::CursorPosition { line, column: None }.encode();
            assert!(matches!(result, Err(Error::InvalidLine(l)) if l == line));
        }
        for column in [0u8, 17] {
            let result = Command::CursorPosition {
                line: 1,
                column: Some(column),
            }
            .encode();
            assert!(matches!(result, Err(Error::InvalidColumn(c)) if c == column));
        }
    }

    #[test]
    fn test_cursor_style_packet() {
        let bytes = Command::CursorStyle(CursorStyle::FlashingBlock)
            .encode()
            .unwrap();
        assert_eq!(bytes, vec![0x00, 0xFE, b'C', 2]);

        let bytes = Command::CursorStyle(CursorStyle::FlashingUnderline)
            .encode()
            .unwrap();
        assert_eq!(bytes, vec![0x00, 0xFE, b'C', 4]);
    }

    #[test]
    fn test_cursor_style_from_byte() {
        assert_eq!(CursorStyle::from_byte(0).unwrap(), CursorStyle::None);
        assert_eq!(
            CursorStyle::from_byte(4).unwrap(),
            CursorStyle::FlashingUnderline
        );
        assert!(matches!(
            CursorStyle::from_byte(5),
            Err(Error::InvalidCursorStyle(5))
        ));
    }

    #[test]
    fn test_cursor_style_from_str() {
        assert_eq!("none".parse::<CursorStyle>().unwrap(), CursorStyle::None);
        assert_eq!(
            "block-flash".parse::<CursorStyle>().unwrap(),
            CursorStyle::FlashingBlock
        );
        assert_eq!(
            "3".parse::<CursorStyle>().unwrap(),
            CursorStyle::SolidUnderline
        );
        assert!("7".parse::<CursorStyle>().is_err());
        assert!("bogus".parse::<CursorStyle>().is_err());
    }

    #[test]
    fn test_bar_graph_packet() {
        let bytes = Command::BarGraph {
            style: BarGraphStyle::Capped,
            length: 8,
            percent: 65,
        }
        .encode()
        .unwrap();
        assert_eq!(bytes, vec![0xFE, b'b', 8, 65]);

        let bytes = Command::BarGraph {
            style: BarGraphStyle::Uncapped,
            length: 16,
            percent: 100,
        }
        .encode()
        .unwrap();
        assert_eq!(bytes, vec![0xFE, b'B', 16, 100]);

        let bytes = Command::BarGraph {
            style: BarGraphStyle::Capped,
            length: 1,
            percent: 0,
        }
        .encode()
        .unwrap();
        assert_eq!(bytes, vec![0xFE, b'b', 1, 0]);
    }

    #[test]
    fn test_bar_graph_out_of_range() {
        let bar = |length, percent| Command::BarGraph {
            style: BarGraphStyle::Capped,
            length,
            percent,
        };
        assert!(matches!(
            bar(0, 50).encode(),
            Err(Error::InvalidBarGraphLength(0))
        ));
        assert!(matches!(
            bar(17, 50).encode(),
            Err(Error::InvalidBarGraphLength(17))
        ));
        assert!(matches!(bar(8, 101).encode(), Err(Error::InvalidPercent(101))));
    }

    #[test]
    fn test_bar_graph_style_from_char() {
        assert_eq!(BarGraphStyle::from_char('b').unwrap(), BarGraphStyle::Capped);
        assert_eq!(
            BarGraphStyle::from_char('B').unwrap(),
            BarGraphStyle::Uncapped
        );
        assert!(matches!(
            BarGraphStyle::from_char('x'),
            Err(Error::InvalidBarGraphStyle('x'))
        ));
    }

    #[test]
    fn test_bar_graph_style_from_str() {
        assert_eq!("b".parse::<BarGraphStyle>().unwrap(), BarGraphStyle::Capped);
        assert_eq!(
            "B".parse::<BarGraphStyle>().unwrap(),
            BarGraphStyle::Uncapped
        );
        assert_eq!(
            "Uncapped".parse::<BarGraphStyle>().unwrap(),
            BarGraphStyle::Uncapped
        );
        assert!("x".parse::<BarGraphStyle>().is_err());
    }

    #[test]
    fn test_scroll_packet() {
        assert_eq!(
            Command::Scroll(ScrollDirection::Down).encode().unwrap(),
            vec![0xFE, b'O', 0]
        );
        assert_eq!(
            Command::Scroll(ScrollDirection::Up).encode().unwrap(),
            vec![0xFE, b'O', 1]
        );
        assert!(matches!(
            ScrollDirection::from_byte(2),
            Err(Error::InvalidScrollDirection(2))
        ));
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(Command::Clear.encode().unwrap(), vec![0x0C]);
        assert_eq!(Command::CursorHome.encode().unwrap(), vec![0xFE, b'H']);
        assert_eq!(
            Command::CursorMove(CursorMove::Up).encode().unwrap(),
            vec![0x0B]
        );
        assert_eq!(
            Command::CursorMove(CursorMove::Back).encode().unwrap(),
            vec![0x08]
        );
        assert_eq!(Command::DeleteLast.encode().unwrap(), vec![0x7F]);
        assert_eq!(Command::CarriageReturn.encode().unwrap(), vec![0x0D]);
    }

    #[test]
    fn test_text_translation() {
        let bytes = Command::Text("Müller°").encode().unwrap();
        assert_eq!(bytes, vec![0x00, b'M', 0xF5, b'l', b'l', b'e', b'r', 0xDF]);

        let bytes = encode_text("ÄÖÜäöü").unwrap();
        assert_eq!(bytes, vec![0xE1, 0xEF, 0xF5, 0xE1, 0xEF, 0xF5]);

        // Other Latin-1 characters pass through untouched
        assert_eq!(encode_text("é").unwrap(), vec![0xE9]);
    }

    #[test]
    fn test_text_errors() {
        assert!(matches!(Command::Text("").encode(), Err(Error::EmptyText)));
        assert!(matches!(
            Command::Text("5€").encode(),
            Err(Error::Unencodable('€'))
        ));
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key(&[]), None);

        let event = decode_key(&[0x61]).unwrap();
        assert_eq!(event.key(), 'a');
        assert!(event.is_up());
        assert!(!event.is_down());

        let event = decode_key(b"C").unwrap();
        assert_eq!(event.key(), 'C');
        assert!(event.is_down());
    }
}
