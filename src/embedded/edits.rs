//! Position-preserving edits against a blanked template of a document.
//!
//! The template has the shape of the original: every line is kept and every
//! character is replaced by spaces of the same UTF-16 width. Copied regions
//! put the original text back, and edits inside them substitute tokens the
//! embedded language would reject.

use rowan::TextRange;

/// How a replacement relates to the text it replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Same UTF-16 width, so every later column on the line is unchanged
    Substitute,
    /// Same number of lines, the rest of the line may shift
    Rewrite,
}

/// Replace `range` of the original with `replacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
    pub kind: EditKind,
}

impl TextEdit {
    pub fn substitute(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
            kind: EditKind::Substitute,
        }
    }

    pub fn rewrite(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
            kind: EditKind::Rewrite,
        }
    }

    /// Spaces covering `range` of `source`
    pub fn blank(source: &str, range: TextRange) -> Self {
        Self::substitute(range, blank(&source[range]))
    }
}

/// Collects copied regions and edits, then renders the synthetic text.
#[derive(Debug)]
pub struct EmbeddedBuffer<'a> {
    source: &'a str,
    copies: Vec<TextRange>,
    edits: Vec<TextEdit>,
}

impl<'a> EmbeddedBuffer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            copies: Vec::new(),
            edits: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Put the original text of `range` back at its own position
    pub fn copy(&mut self, range: TextRange) {
        self.copies.push(range);
    }

    /// Edits only take effect inside copied regions
    pub fn edit(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn blank(&mut self, range: TextRange) {
        self.edit(TextEdit::blank(self.source, range));
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Render the buffer with `preamble` in front.
    pub fn finish(mut self, preamble: &str) -> String {
        self.copies.sort_by_key(|r| r.start());
        self.edits.sort_by_key(|e| e.range.start());

        let mut out = String::with_capacity(preamble.len() + self.source.len());
        out.push_str(preamble);

        let mut cursor = 0usize;
        let mut edits = self.edits.iter().peekable();
        for copy in merge(&self.copies) {
            let (start, end) = (usize::from(copy.start()), usize::from(copy.end()));
            out.push_str(&blank(&self.source[cursor.min(start)..start]));

            let mut inner = start;
            while let Some(&edit) = edits.peek() {
                let (edit_start, edit_end) = (usize::from(edit.range.start()), usize::from(edit.range.end()));
                if edit_start >= end {
                    break;
                }
                edits.next();
                if edit_start < inner || edit_end > end {
                    // Overlaps an earlier edit or leaves the copied region.
                    continue;
                }
                debug_assert!(
                    preserves_shape(&self.source[edit_start..edit_end], edit),
                    "edit {edit:?} changes the shape of {:?}",
                    &self.source[edit_start..edit_end]
                );
                out.push_str(&self.source[inner..edit_start]);
                out.push_str(&edit.replacement);
                inner = edit_end;
            }
            out.push_str(&self.source[inner..end]);
            cursor = end;
        }
        out.push_str(&blank(&self.source[cursor.min(self.source.len())..]));
        out
    }
}

fn preserves_shape(original: &str, edit: &TextEdit) -> bool {
    let lines = |s: &str| s.matches('\n').count();
    match edit.kind {
        EditKind::Substitute => {
            original.encode_utf16().count() == edit.replacement.encode_utf16().count()
                && lines(original) == lines(&edit.replacement)
        }
        EditKind::Rewrite => lines(original) == lines(&edit.replacement),
    }
}

/// Sorted ranges with overlaps folded together
fn merge(ranges: &[TextRange]) -> Vec<TextRange> {
    let mut merged: Vec<TextRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start() <= last.end() => *last = last.cover(*range),
            _ => merged.push(*range),
        }
    }
    merged
}

/// Same shape as `text`: line breaks kept, everything else spaces.
fn blank(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' | '\r' => out.push(c),
            _ => (0..c.len_utf16()).for_each(|_| out.push(' ')),
        }
    }
    out
}
