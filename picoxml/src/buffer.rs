// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;
use alloc::vec::Vec;

use crate::utf8::{DecodeResult, Utf8Decoder};

/// Append-only, compactable sequence of decoded code points with a cursor.
///
/// Key design principles:
/// - Raw bytes are decoded on `write()`, token parsers only ever see `char`s
/// - The cursor only moves forward while a token is being parsed
/// - Consumed code points are discarded with `erase_to_current_position()`
///   once a token parser reaches a stable point (success or failure)
///
/// Invariant: `position <= data.len()`. More data is needed exactly when the
/// cursor has reached the end.
///
/// Memory is bounded only by compaction. An unterminated construct (e.g. a
/// comment that is never closed) keeps growing the buffer; callers that need
/// a bound should set [`crate::ReaderConfig::max_token_len`].
#[derive(Debug, Clone, Default)]
pub struct ParsingBuffer {
    /// Decoded, not yet discarded code points
    data: Vec<char>,
    /// Cursor into `data`
    position: usize,
    /// Code points discarded by compaction so far
    erased: usize,
    decoder: Utf8Decoder,
}

impl ParsingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with room for `capacity` code points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Feed raw bytes through the UTF-8 decoder.
    ///
    /// Returns the number of bytes consumed. Bytes that only start a
    /// multi-byte sequence count as consumed. An invalid byte stops
    /// processing, so a short count means the input was not valid UTF-8.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        self.data.reserve(bytes.len());
        for (consumed, &byte) in bytes.iter().enumerate() {
            match self.decoder.decode_byte(byte) {
                DecodeResult::Complete(c) => self.data.push(c),
                DecodeResult::Incomplete => {}
                DecodeResult::Invalid => return consumed,
            }
        }
        bytes.len()
    }

    /// Code point under the cursor, `None` when more data is needed
    pub fn current(&self) -> Option<char> {
        self.data.get(self.position).copied()
    }

    /// Code point at index `i` relative to the start of the buffer
    pub fn at(&self, i: usize) -> Option<char> {
        self.data.get(i).copied()
    }

    pub fn first(&self) -> Option<char> {
        self.data.first().copied()
    }

    pub fn is_more_data_needed(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Move the cursor one code point forward. Returns false at the end.
    pub fn increment_position(&mut self) -> bool {
        if self.is_more_data_needed() {
            return false;
        }
        self.position += 1;
        true
    }

    /// Move the cursor to `position`. Returns false if it is out of range.
    pub fn set_position(&mut self, position: usize) -> bool {
        if position > self.data.len() {
            return false;
        }
        self.position = position;
        true
    }

    /// Cursor position relative to the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Cursor position counted from the first code point ever written
    pub fn absolute_position(&self) -> usize {
        self.erased + self.position
    }

    /// Number of code points currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Code points after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Copy `[start, end)` out as a string. Bounds are clamped.
    pub fn substring(&self, start: usize, end: usize) -> String {
        let end = end.min(self.data.len());
        let start = start.min(end);
        self.data[start..end].iter().collect()
    }

    /// True while the decoder holds part of a multi-byte sequence
    pub fn has_partial_code_point(&self) -> bool {
        !self.decoder.is_idle()
    }

    /// Discard everything before the cursor and move the cursor to 0.
    ///
    /// Must only be called at a token boundary: anything a parser still
    /// wanted to look back at is gone afterwards.
    pub fn erase_to_current_position(&mut self) {
        if self.position == 0 {
            return;
        }
        log::trace!(
            "Compacting parsing buffer: dropping {} of {} code points",
            self.position,
            self.data.len()
        );
        self.data.drain(..self.position);
        self.erased += self.position;
        self.position = 0;
    }

    /// Drop all data, the cursor and any partial UTF-8 sequence
    pub fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
        self.erased = 0;
        self.decoder.reset();
    }
}
