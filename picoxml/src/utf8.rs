// SPDX-License-Identifier: Apache-2.0

//! UTF-8 codec used by the parsing buffer.
//!
//! The decoder is fed one byte at a time so that a multi-byte sequence may be
//! split across any number of `write()` calls. Encoded surrogates, overlong
//! forms and values above U+10FFFF are rejected, so every completed code
//! point is a valid `char`.

use alloc::vec::Vec;
use core::ops::Range;

/// Highest valid Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Outcome of feeding a single byte to [`Utf8Decoder::decode_byte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeResult {
    /// The byte completed a code point.
    Complete(char),
    /// The byte was accepted but the sequence needs more bytes.
    Incomplete,
    /// The byte cannot appear here. The decoder has been reset.
    Invalid,
}

/// Errors from whole-string conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Error {
    /// The byte at `offset` is not valid at its position.
    InvalidByte { offset: usize },
    /// The input ended in the middle of a multi-byte sequence.
    Incomplete,
    /// The value is not an encodable code point.
    InvalidCodePoint(u32),
}

impl core::fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Utf8Error::InvalidByte { offset } => write!(f, "invalid UTF-8 byte at offset {offset}"),
            Utf8Error::Incomplete => write!(f, "incomplete UTF-8 sequence at end of input"),
            Utf8Error::InvalidCodePoint(cp) => write!(f, "invalid code point U+{cp:X}"),
        }
    }
}

impl core::error::Error for Utf8Error {}

/// Stateful, byte-at-a-time UTF-8 decoder.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    /// Code point bits accumulated so far
    code_point: u32,
    /// Continuation bytes still expected
    remaining: u8,
    /// Total length of the sequence being decoded
    sequence_len: u8,
}

impl Utf8Decoder {
    pub const fn new() -> Self {
        Self {
            code_point: 0,
            remaining: 0,
            sequence_len: 0,
        }
    }

    /// True when no multi-byte sequence is in progress.
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    /// Drops any partially decoded sequence.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds one byte.
    ///
    /// After [`DecodeResult::Invalid`] the next byte is interpreted as a fresh
    /// lead byte.
    pub fn decode_byte(&mut self, byte: u8) -> DecodeResult {
        if self.remaining == 0 {
            return self.decode_lead_byte(byte);
        }

        if byte & 0xC0 != 0x80 {
            self.reset();
            return DecodeResult::Invalid;
        }

        self.code_point = (self.code_point << 6) | u32::from(byte & 0x3F);
        self.remaining -= 1;

        // Reject overlong three and four byte forms as early as possible
        if self.remaining + 2 == self.sequence_len {
            let too_small = match self.sequence_len {
                3 => self.code_point < 0x20,
                4 => self.code_point < 0x10,
                _ => false,
            };
            if too_small {
                self.reset();
                return DecodeResult::Invalid;
            }
        }

        if self.remaining > 0 {
            return DecodeResult::Incomplete;
        }

        let code_point = self.code_point;
        self.reset();
        match char::from_u32(code_point) {
            Some(c) => DecodeResult::Complete(c),
            None => DecodeResult::Invalid,
        }
    }

    fn decode_lead_byte(&mut self, byte: u8) -> DecodeResult {
        let (bits, len) = match byte {
            0x00..=0x7F => return DecodeResult::Complete(char::from(byte)),
            // 0xC0 and 0xC1 can only start overlong two byte forms
            0xC2..=0xDF => (byte & 0x1F, 2),
            0xE0..=0xEF => (byte & 0x0F, 3),
            0xF0..=0xF4 => (byte & 0x07, 4),
            _ => return DecodeResult::Invalid,
        };
        self.code_point = u32::from(bits);
        self.sequence_len = len;
        self.remaining = len - 1;
        DecodeResult::Incomplete
    }
}

/// A UTF-8 encoded code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedChar {
    bytes: [u8; 4],
    len: u8,
}

impl EncodedChar {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Encodes a single code point into its 1 to 4 byte UTF-8 form.
pub fn encode(code_point: u32) -> Result<EncodedChar, Utf8Error> {
    let mut bytes = [0u8; 4];
    let len = match code_point {
        0..=0x7F => {
            bytes[0] = code_point as u8;
            1
        }
        0x80..=0x7FF => {
            bytes[0] = 0xC0 | (code_point >> 6) as u8;
            bytes[1] = 0x80 | (code_point & 0x3F) as u8;
            2
        }
        0xD800..=0xDFFF => return Err(Utf8Error::InvalidCodePoint(code_point)),
        0x800..=0xFFFF => {
            bytes[0] = 0xE0 | (code_point >> 12) as u8;
            bytes[1] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            bytes[2] = 0x80 | (code_point & 0x3F) as u8;
            3
        }
        0x1_0000..=MAX_CODE_POINT => {
            bytes[0] = 0xF0 | (code_point >> 18) as u8;
            bytes[1] = 0x80 | ((code_point >> 12) & 0x3F) as u8;
            bytes[2] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            bytes[3] = 0x80 | (code_point & 0x3F) as u8;
            4
        }
        _ => return Err(Utf8Error::InvalidCodePoint(code_point)),
    };
    Ok(EncodedChar { bytes, len })
}

/// Decodes a complete byte string into code points.
pub fn decode_whole(bytes: &[u8]) -> Result<Vec<char>, Utf8Error> {
    let mut decoder = Utf8Decoder::new();
    let mut chars = Vec::with_capacity(bytes.len());
    for (offset, &byte) in bytes.iter().enumerate() {
        match decoder.decode_byte(byte) {
            DecodeResult::Complete(c) => chars.push(c),
            DecodeResult::Incomplete => {}
            DecodeResult::Invalid => return Err(Utf8Error::InvalidByte { offset }),
        }
    }
    if !decoder.is_idle() {
        return Err(Utf8Error::Incomplete);
    }
    Ok(chars)
}

/// Number of UTF-8 bytes needed for `chars[range]`.
///
/// Maps a code point offset back to a byte offset. Out of range bounds are
/// clamped to the slice.
pub fn encoded_length(chars: &[char], range: Range<usize>) -> usize {
    let end = range.end.min(chars.len());
    let start = range.start.min(end);
    chars[start..end].iter().map(|c| c.len_utf8()).sum()
}
