//! Offset ⇄ line/column conversion.

use text_size::{TextRange, TextSize};

use super::{Position, Span};

/// Line start table for a single text buffer.
///
/// The index does not own the text; every query takes the buffer it was
/// built from. Columns are UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(i as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Text of a line without its terminator.
    pub fn line_text<'a>(&self, text: &'a str, line: u32) -> Option<&'a str> {
        let start = usize::from(*self.line_starts.get(line as usize)?);
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|next| usize::from(*next) - 1)
            .unwrap_or(usize::from(self.len));
        let raw = text.get(start..end)?;
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Convert a byte offset into a line/column position.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        let start = usize::from(self.line_starts[line]);
        let column = text
            .get(start..usize::from(offset))
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or(usize::from(offset) - start);
        Position::new(line as u32, column as u32)
    }

    /// Convert a line/column position into a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end. Returns `None`
    /// when the line does not exist.
    pub fn offset(&self, text: &str, position: Position) -> Option<TextSize> {
        let line_text = self.line_text(text, position.line)?;
        let start = self.line_starts[position.line as usize];
        let mut utf16 = 0u32;
        for (i, c) in line_text.char_indices() {
            if utf16 >= position.column {
                return Some(start + TextSize::new(i as u32));
            }
            utf16 += c.len_utf16() as u32;
        }
        Some(start + TextSize::of(line_text))
    }

    pub fn span(&self, text: &str, range: TextRange) -> Span {
        Span::new(
            self.position(text, range.start()),
            self.position(text, range.end()),
        )
    }
}
