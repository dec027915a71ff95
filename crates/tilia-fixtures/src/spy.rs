//! A text source that records exactly which byte ranges the parser read.
//!
//! Incremental tests assert reuse by looking at what was served, not at tree
//! internals: if only the dirty region was re-read, only the dirty region
//! was re-parsed.

use std::cell::RefCell;
use std::rc::Rc;

use line_index::LineIndex;
use text_size::TextSize;
use tilia_text::{Input, InputError, Point, TextEdit, TextRead};

struct Shared {
    text: String,
    /// Merged `[start, end)` byte ranges served so far.
    ranges: Vec<(u32, u32)>,
}

impl Shared {
    fn record(&mut self, start: u32, end: u32) {
        for range in &mut self.ranges {
            if range.0 <= start && start <= range.1 {
                range.1 = range.1.max(end);
                return;
            }
        }
        self.ranges.push((start, end));
    }
}

/// Owns the document text, hands out reading [`Input`]s, and tracks reads.
pub struct SpyInput {
    shared: Rc<RefCell<Shared>>,
    chunk_chars: usize,
}

struct SpyReader {
    shared: Rc<RefCell<Shared>>,
    chunk_chars: usize,
}

impl TextRead for SpyReader {
    fn read(&mut self, byte_offset: TextSize) -> Result<Vec<u8>, InputError> {
        let mut shared = self.shared.borrow_mut();
        let start = usize::from(byte_offset);
        if start >= shared.text.len() {
            return Ok(Vec::new());
        }
        // Chunks are measured in characters, like the original harness; a
        // request landing inside a scalar still makes progress byte-wise.
        let mut end = start;
        for _ in 0..self.chunk_chars {
            if end >= shared.text.len() {
                break;
            }
            end += 1;
            while end < shared.text.len() && !shared.text.is_char_boundary(end) {
                end += 1;
            }
        }
        shared.record(start as u32, end as u32);
        Ok(shared.text.as_bytes()[start..end].to_vec())
    }
}

impl SpyInput {
    pub fn new(text: impl Into<String>, chunk_chars: usize) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared { text: text.into(), ranges: Vec::new() })),
            chunk_chars,
        }
    }

    /// A fresh reader over the shared text; all readers feed one range log.
    pub fn input(&self) -> Input {
        Input::new(SpyReader { shared: self.shared.clone(), chunk_chars: self.chunk_chars })
    }

    pub fn text(&self) -> String {
        self.shared.borrow().text.clone()
    }

    /// Forgets recorded ranges; typically called right after the initial
    /// parse so that only the reparse traffic remains visible.
    pub fn clear(&self) {
        self.shared.borrow_mut().ranges.clear();
    }

    /// The distinct text fragments served since the last [`clear`](Self::clear).
    pub fn strings_read(&self) -> Vec<String> {
        let shared = self.shared.borrow();
        shared
            .ranges
            .iter()
            .map(|&(start, end)| {
                shared.text[start as usize..(end as usize).min(shared.text.len())].to_string()
            })
            .collect()
    }

    pub fn insert(&self, byte_offset: u32, text: &str) -> TextEdit {
        self.replace(byte_offset, 0, text)
    }

    pub fn delete(&self, byte_offset: u32, len: u32) -> TextEdit {
        self.replace(byte_offset, len, "")
    }

    pub fn replace(&self, byte_offset: u32, bytes_removed: u32, text: &str) -> TextEdit {
        let mut shared = self.shared.borrow_mut();
        let start = byte_offset as usize;
        shared.text.replace_range(start..start + bytes_removed as usize, text);
        TextEdit::new(byte_offset, bytes_removed, text.len() as u32)
    }

    /// Line/column of a byte offset, per the input's column convention.
    pub fn point_at(&self, byte_offset: u32, columns_in_bytes: bool) -> Point {
        let shared = self.shared.borrow();
        let index = LineIndex::new(&shared.text);
        let line_col = index.line_col(TextSize::new(byte_offset));
        if columns_in_bytes {
            return Point::new(line_col.line, line_col.col);
        }
        let line_start = byte_offset - line_col.col;
        let column =
            shared.text[line_start as usize..byte_offset as usize].chars().count() as u32;
        Point::new(line_col.line, column)
    }
}

#[cfg(test)]
mod tests {
    use tilia_text::InputCursor;

    use super::*;

    #[test]
    fn records_and_merges_ranges() {
        let spy = SpyInput::new("abcdefgh", 3);
        let mut cursor = InputCursor::new(spy.input());
        for _ in 0..5 {
            cursor.decode_next();
        }
        assert_eq!(spy.strings_read(), vec!["abcdef".to_string()]);

        spy.clear();
        assert!(spy.strings_read().is_empty());
    }

    #[test]
    fn edits_produce_descriptors() {
        let spy = SpyInput::new("abc * 123", 3);
        let edit = spy.insert(2, "XYZ");
        assert_eq!(spy.text(), "abXYZc * 123");
        assert_eq!(edit, TextEdit::new(2, 0, 3));

        let edit = spy.delete(2, 3);
        assert_eq!(spy.text(), "abc * 123");
        assert_eq!(edit, TextEdit::new(2, 3, 0));
    }

    #[test]
    fn points_in_both_conventions() {
        let spy = SpyInput::new("a\u{3b2}c\nxyz", 4);
        // Offset of `z`: line 1, byte column 2, char column 2.
        assert_eq!(spy.point_at(7, true), Point::new(1, 2));
        // Offset of `c`: the two-byte beta widens the byte column only.
        assert_eq!(spy.point_at(3, true), Point::new(0, 3));
        assert_eq!(spy.point_at(3, false), Point::new(0, 2));
    }
}
