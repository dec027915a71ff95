//! Chunked, decoding cursor over a [`TextRead`] source.

use text_size::TextSize;

use crate::{Encoding, Extent, Input};

/// One decoded scalar value together with its length in *source* bytes.
///
/// For UTF-8 input the byte length is `ch.len_utf8()`; for UTF-16 it is the
/// number of code-unit bytes consumed (2 or 4). Malformed sequences decode as
/// one replacement character per offending unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedChar {
    pub ch: char,
    pub bytes: TextSize,
}

impl DecodedChar {
    pub fn extent(self) -> Extent {
        Extent { bytes: self.bytes, chars: TextSize::new(1) }
    }
}

/// Reads scalar values forward from an [`Input`], one cached chunk at a time.
///
/// The cursor is the only component that touches the read callback. It keeps
/// a single chunk resident and re-issues a read whenever decoding needs a
/// byte outside of it; seeking within the cached chunk costs nothing. Reader
/// failures are folded into premature end of input and flagged on
/// [`InputCursor::failed`].
pub struct InputCursor {
    input: Input,
    chunk: Vec<u8>,
    chunk_start: TextSize,
    offset: Extent,
    failed: bool,
}

impl InputCursor {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            chunk: Vec::new(),
            chunk_start: TextSize::new(0),
            offset: Extent::ZERO,
            failed: false,
        }
    }

    pub fn offset(&self) -> Extent {
        self.offset
    }

    pub fn byte_offset(&self) -> TextSize {
        self.offset.bytes
    }

    /// True once a read or seek callback has reported an error; the stream
    /// behaves as if it ended at the failure point.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn into_input(self) -> Input {
        self.input
    }

    /// Drops the cached chunk. Must be called when the underlying text has
    /// changed, or later reads may be served stale bytes.
    pub fn invalidate(&mut self) {
        self.chunk.clear();
    }

    /// Repositions the cursor. The target must be a scalar-value boundary of
    /// the source; the cached chunk is kept when it still covers the target.
    pub fn seek(&mut self, to: Extent) {
        if to != self.offset
            && self.input.reader().seek(to.bytes, to.chars).is_err()
        {
            self.failed = true;
        }
        self.offset = to;
    }

    /// Decodes the scalar at the current position and advances past it.
    /// Returns `None` at end of input.
    pub fn decode_next(&mut self) -> Option<DecodedChar> {
        let decoded = match self.input.encoding() {
            Encoding::Utf8 => self.decode_utf8()?,
            Encoding::Utf16 => self.decode_utf16()?,
        };
        self.offset += decoded.extent();
        Some(decoded)
    }

    fn byte_at(&mut self, offset: TextSize) -> Option<u8> {
        let in_chunk = offset >= self.chunk_start
            && usize::from(offset - self.chunk_start) < self.chunk.len();
        if !in_chunk {
            match self.input.reader().read(offset) {
                Ok(chunk) if chunk.is_empty() => return None,
                Ok(chunk) => {
                    self.chunk = chunk;
                    self.chunk_start = offset;
                }
                Err(_) => {
                    self.failed = true;
                    return None;
                }
            }
        }
        Some(self.chunk[usize::from(offset - self.chunk_start)])
    }

    fn decode_utf8(&mut self) -> Option<DecodedChar> {
        let start = self.offset.bytes;
        let lead = self.byte_at(start)?;
        let len = match lead {
            0x00..=0x7F => return Some(DecodedChar { ch: lead as char, bytes: TextSize::new(1) }),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            // Continuation or invalid lead byte.
            _ => return Some(REPLACEMENT),
        };

        let mut buf = [lead, 0, 0, 0];
        for i in 1..len {
            match self.byte_at(start + TextSize::new(i as u32)) {
                Some(byte) if byte & 0xC0 == 0x80 => buf[i] = byte,
                // Truncated sequence: consume the lead byte alone.
                _ => return Some(REPLACEMENT),
            }
        }

        match std::str::from_utf8(&buf[..len]) {
            Ok(s) => {
                let ch = s.chars().next().expect("validated sequence is non-empty");
                Some(DecodedChar { ch, bytes: TextSize::new(len as u32) })
            }
            Err(_) => Some(REPLACEMENT),
        }
    }

    fn decode_utf16(&mut self) -> Option<DecodedChar> {
        let start = self.offset.bytes;
        let unit = match self.unit_at(start) {
            Some(unit) => unit,
            // A trailing odd byte decodes as a one-byte replacement so the
            // leaf partition of the input stays exact.
            None => {
                self.byte_at(start)?;
                return Some(DecodedChar { ch: char::REPLACEMENT_CHARACTER, bytes: TextSize::new(1) });
            }
        };

        match unit {
            0xD800..=0xDBFF => match self.unit_at(start + TextSize::new(2)) {
                Some(low @ 0xDC00..=0xDFFF) => {
                    let value =
                        0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    let ch = char::from_u32(value).expect("surrogate pair decodes to a scalar");
                    Some(DecodedChar { ch, bytes: TextSize::new(4) })
                }
                _ => Some(DecodedChar { ch: char::REPLACEMENT_CHARACTER, bytes: TextSize::new(2) }),
            },
            0xDC00..=0xDFFF => {
                Some(DecodedChar { ch: char::REPLACEMENT_CHARACTER, bytes: TextSize::new(2) })
            }
            _ => {
                let ch = char::from_u32(u32::from(unit)).expect("non-surrogate unit is a scalar");
                Some(DecodedChar { ch, bytes: TextSize::new(2) })
            }
        }
    }

    fn unit_at(&mut self, offset: TextSize) -> Option<u16> {
        let lo = self.byte_at(offset)?;
        let hi = self.byte_at(offset + TextSize::new(1))?;
        Some(u16::from_le_bytes([lo, hi]))
    }
}

const REPLACEMENT: DecodedChar =
    DecodedChar { ch: char::REPLACEMENT_CHARACTER, bytes: TextSize::new(1) };

impl std::fmt::Debug for InputCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputCursor")
            .field("offset", &self.offset)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}
