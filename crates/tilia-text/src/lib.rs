//! Text positions and the reader interface the parser pulls its input from.

mod cursor;

pub use cursor::{DecodedChar, InputCursor};
pub use text_size::{TextRange, TextSize};

/// A two-dimensional length: UTF-8 code units and Unicode scalar values.
///
/// Every public offset and length in the tree carries both counts, so callers
/// never have to re-scan text to convert between them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Extent {
    pub bytes: TextSize,
    pub chars: TextSize,
}

impl Extent {
    pub const ZERO: Extent = Extent { bytes: TextSize::new(0), chars: TextSize::new(0) };

    pub fn new(bytes: u32, chars: u32) -> Self {
        Self { bytes: TextSize::new(bytes), chars: TextSize::new(chars) }
    }

    pub fn of(text: &str) -> Self {
        Self::new(text.len() as u32, text.chars().count() as u32)
    }

    pub fn is_empty(self) -> bool {
        self.bytes == TextSize::new(0)
    }
}

impl std::ops::Add for Extent {
    type Output = Extent;

    fn add(self, rhs: Extent) -> Extent {
        Extent { bytes: self.bytes + rhs.bytes, chars: self.chars + rhs.chars }
    }
}

impl std::ops::AddAssign for Extent {
    fn add_assign(&mut self, rhs: Extent) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Extent {
    type Output = Extent;

    fn sub(self, rhs: Extent) -> Extent {
        Extent { bytes: self.bytes - rhs.bytes, chars: self.chars - rhs.chars }
    }
}

impl std::ops::SubAssign for Extent {
    fn sub_assign(&mut self, rhs: Extent) {
        *self = *self - rhs;
    }
}

impl std::iter::Sum for Extent {
    fn sum<I: Iterator<Item = Extent>>(iter: I) -> Extent {
        iter.fold(Extent::ZERO, std::ops::Add::add)
    }
}

/// A line/column pair.
///
/// Whether `column` counts bytes or scalar values is decided by the input's
/// `measure_columns_in_bytes` flag; both interpretations are supported by
/// [`Point::measure`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// The row/column extent of `text` itself: rows crossed and the column
    /// length of its final line.
    pub fn measure(text: &str, columns_in_bytes: bool) -> Self {
        let mut point = Point::default();
        for ch in text.chars() {
            if ch == '\n' {
                point.row += 1;
                point.column = 0;
            } else if columns_in_bytes {
                point.column += ch.len_utf8() as u32;
            } else {
                point.column += 1;
            }
        }
        point
    }
}

/// An edit to the underlying text, expressed in bytes of the source encoding.
///
/// Line/column bookkeeping is the caller's concern; see [`Point`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub start_byte: TextSize,
    pub bytes_removed: TextSize,
    pub bytes_added: TextSize,
}

impl TextEdit {
    pub fn new(start_byte: u32, bytes_removed: u32, bytes_added: u32) -> Self {
        Self {
            start_byte: TextSize::new(start_byte),
            bytes_removed: TextSize::new(bytes_removed),
            bytes_added: TextSize::new(bytes_added),
        }
    }

    pub fn is_noop(self) -> bool {
        self.bytes_removed == TextSize::new(0) && self.bytes_added == TextSize::new(0)
    }

    /// The removed range, in pre-edit byte offsets.
    pub fn old_range(self) -> TextRange {
        TextRange::at(self.start_byte, self.bytes_removed)
    }

    /// The end of the inserted range, in post-edit byte offsets.
    pub fn new_end(self) -> TextSize {
        self.start_byte + self.bytes_added
    }
}

/// Encoding of the bytes served by a [`TextRead`] implementation.
///
/// UTF-16 input is interpreted little-endian; positions still count bytes of
/// the source encoding, while `chars` counts scalar values either way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16,
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input read failed at byte {offset:?}")]
    Read { offset: TextSize },
    #[error("input seek to byte {offset:?} failed")]
    Seek { offset: TextSize },
}

/// The caller-supplied text source.
///
/// `read` returns a chunk of bytes starting at `byte_offset`; an empty chunk
/// means end of input. Chunks may be of any non-zero size below EOF, and the
/// same offset may be requested more than once. A failing read is treated by
/// the cursor as premature end of input, never as a parse abort.
pub trait TextRead {
    fn read(&mut self, byte_offset: TextSize) -> Result<Vec<u8>, InputError>;

    /// Notification that the consumer repositioned; sources that stream
    /// forward can use it to reset internal state.
    fn seek(&mut self, _byte: TextSize, _chars: TextSize) -> Result<(), InputError> {
        Ok(())
    }
}

/// A [`TextRead`] bundled with its declared encoding and column convention.
pub struct Input {
    reader: Box<dyn TextRead>,
    encoding: Encoding,
    measure_columns_in_bytes: bool,
}

impl Input {
    pub fn new(reader: impl TextRead + 'static) -> Self {
        Self { reader: Box::new(reader), encoding: Encoding::Utf8, measure_columns_in_bytes: true }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_columns_in_chars(mut self) -> Self {
        self.measure_columns_in_bytes = false;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn measure_columns_in_bytes(&self) -> bool {
        self.measure_columns_in_bytes
    }

    pub(crate) fn reader(&mut self) -> &mut dyn TextRead {
        &mut *self.reader
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input").field("encoding", &self.encoding).finish_non_exhaustive()
    }
}

impl<F> TextRead for F
where
    F: FnMut(TextSize) -> Result<Vec<u8>, InputError>,
{
    fn read(&mut self, byte_offset: TextSize) -> Result<Vec<u8>, InputError> {
        self(byte_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_of_counts_scalars() {
        let extent = Extent::of("x # \u{03A9}\u{03A9}\u{03A9} \u{2014} \u{0394}\u{0394}");
        assert_eq!(extent.bytes, TextSize::new(19));
        assert_eq!(extent.chars, TextSize::new(12));
    }

    #[test]
    fn point_measure_modes() {
        let text = "a\u{03b2}\nc\u{03b4}";
        assert_eq!(Point::measure(text, true), Point::new(1, 3));
        assert_eq!(Point::measure(text, false), Point::new(1, 2));
    }

    #[test]
    fn input_carries_encoding_and_column_convention() {
        let read = |_: TextSize| -> Result<Vec<u8>, InputError> { Ok(Vec::new()) };
        let input = Input::new(read).with_encoding(Encoding::Utf16).with_columns_in_chars();
        assert_eq!(input.encoding(), Encoding::Utf16);
        assert!(!input.measure_columns_in_bytes());

        let input = Input::new(read);
        assert_eq!(input.encoding(), Encoding::Utf8);
        assert!(input.measure_columns_in_bytes());
    }

    #[test]
    fn edit_ranges() {
        let edit = TextEdit::new(4, 2, 5);
        assert!(!edit.is_noop());
        assert_eq!(edit.old_range(), TextRange::new(TextSize::new(4), TextSize::new(6)));
        assert_eq!(edit.new_end(), TextSize::new(9));
        assert!(TextEdit::new(4, 0, 0).is_noop());
    }
}
