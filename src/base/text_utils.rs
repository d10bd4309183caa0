//! Text manipulation utilities for working with raw recipe lines.

/// Characters that end a symbol when scanning right from the cursor.
const RIGHT_BOUNDARIES: &[char] = &[' ', '=', '/', '$', '+', '}', '\'', '"', ']', '['];

/// Characters that start a symbol when scanning left from the cursor.
///
/// Unlike [`RIGHT_BOUNDARIES`] this set has no `$`, so `${FOO}` yields `FOO`
/// through the `{` boundary while a bare `$FOO` keeps its marker.
const LEFT_BOUNDARIES: &[char] = &[' ', '=', '/', '+', '{', '\'', '"', '[', ']'];

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Find the boundaries of a word at the given position.
///
/// Returns `Some((start, end))` where `start` is the character index of the word start
/// and `end` is the character index after the last word character.
/// Returns `None` if there is no word at the position.
pub fn find_word_boundaries(chars: &[char], position: usize) -> Option<(usize, usize)> {
    if position >= chars.len() || !is_word_character(chars[position]) {
        return None;
    }

    let mut start = position;
    while start > 0 && is_word_character(chars[start - 1]) {
        start -= 1;
    }

    let mut end = position;
    while end < chars.len() && is_word_character(chars[end]) {
        end += 1;
    }

    Some((start, end))
}

/// Extract the word (identifier) at the cursor position in a line of text.
///
/// # Example
/// ```
/// use bitbake_ls::base::text_utils::extract_word_at_cursor;
///
/// let line = "DEPENDS += \"zlib\"";
/// assert_eq!(extract_word_at_cursor(line, 2), Some("DEPENDS".to_string()));
/// assert_eq!(extract_word_at_cursor(line, 8), None);
/// ```
pub fn extract_word_at_cursor(line: &str, position: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let (start, end) = find_word_boundaries(&chars, position)?;
    Some(chars[start..end].iter().collect())
}

/// Index of the `char` that starts at UTF-16 `column` of `line`. Columns
/// past the end clamp to the char count.
///
/// # Example
/// ```
/// use bitbake_ls::base::text_utils::char_index_at_utf16;
///
/// assert_eq!(char_index_at_utf16("a\u{1F600}b", 3), 2);
/// ```
pub fn char_index_at_utf16(line: &str, column: u32) -> usize {
    let mut utf16 = 0u32;
    for (index, c) in line.chars().enumerate() {
        if utf16 >= column {
            return index;
        }
        utf16 += c.len_utf16() as u32;
    }
    line.chars().count()
}

/// Extract the symbol under the cursor for go-to-definition.
///
/// Scans right to the nearest [`RIGHT_BOUNDARIES`] character, then left
/// (within the right-trimmed prefix) to the nearest [`LEFT_BOUNDARIES`]
/// character, and finally strips one leading boundary character or hyphen.
///
/// # Example
/// ```
/// use bitbake_ls::base::text_utils::extract_symbol_from_line;
///
/// assert_eq!(extract_symbol_from_line("FOO = \"${BAR}/x\"", 10), "BAR");
/// assert_eq!(extract_symbol_from_line("do_install:append() {", 3), "do_install:append()");
/// ```
pub fn extract_symbol_from_line(line: &str, character: usize) -> String {
    let chars: Vec<char> = line.chars().collect();

    let end = RIGHT_BOUNDARIES
        .iter()
        .map(|boundary| index_of(&chars, *boundary, character).unwrap_or(chars.len()))
        .min()
        .unwrap_or(chars.len());
    let right_trimmed = &chars[..end];

    let start = LEFT_BOUNDARIES
        .iter()
        .map(|boundary| last_index_of(right_trimmed, *boundary, character).unwrap_or(0))
        .max()
        .unwrap_or(0);

    let mut symbol = &right_trimmed[start.min(right_trimmed.len())..];
    if let Some(first) = symbol.first() {
        if LEFT_BOUNDARIES.contains(first) || *first == '-' {
            symbol = &symbol[1..];
        }
    }
    symbol.iter().collect()
}

fn index_of(chars: &[char], needle: char, from: usize) -> Option<usize> {
    chars
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, c)| **c == needle)
        .map(|(i, _)| i)
}

fn last_index_of(chars: &[char], needle: char, from: usize) -> Option<usize> {
    if chars.is_empty() {
        return None;
    }
    let upto = from.min(chars.len() - 1);
    chars[..=upto].iter().rposition(|c| *c == needle)
}
