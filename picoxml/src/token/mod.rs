// SPDX-License-Identifier: Apache-2.0

//! Incremental token parsers.
//!
//! Every parser consumes code points from a [`ParsingBuffer`] it borrows for
//! the duration of one `parse()` call and produces one grammar construct.
//! `parse()` returns:
//!
//! - `Ok(Status::NeedMoreData)` when the buffer ran dry mid-token. The
//!   parser keeps its progress and the buffer is left untouched; call again
//!   after writing more bytes.
//! - `Ok(Status::Success)` when the construct is complete. The payload
//!   accessors are valid from here on.
//! - `Err(Error)` on a grammar violation.
//!
//! On success and on error the buffer is compacted with
//! [`ParsingBuffer::erase_to_current_position`]. Parsers never move the
//! cursor backwards, so compaction at those points cannot lose lookahead.

mod attribute_value;
mod cdata;
mod comment;
mod document_type;
mod end_of_element;
mod name;
mod processing_instruction;
mod reference;
mod start_of_element;
mod text_node;
mod token_type;

pub use attribute_value::AttributeValueParser;
pub use cdata::CDataParser;
pub use comment::CommentParser;
pub use document_type::DocumentTypeParser;
pub use end_of_element::EndOfElementParser;
pub use name::NameParser;
pub use processing_instruction::{PiKind, ProcessingInstructionParser};
pub use reference::{Reference, ReferenceParser};
pub use start_of_element::StartOfElementParser;
pub use text_node::TextNodeParser;
pub use token_type::{TokenType, TokenTypeParser};

use crate::buffer::ParsingBuffer;

/// Progress of a token parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The buffer ran out before the token was complete.
    NeedMoreData,
    /// The token is complete.
    Success,
}

/// Behaviour switches accepted by token parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenOption {
    #[default]
    None,
    /// Skip whitespace before the token starts.
    IgnoreLeadingWhitespace,
    /// Token type classifier only: discard everything up to the next `<`.
    Synchronization,
}

/// Grammar violation raised by a token parser.
#[derive(Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrKind,
    character: Option<char>,
    position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrKind {
    /// A name did not start with a NameStartChar.
    InvalidNameStartChar,
    /// A code point outside the XML Char production.
    InvalidChar,
    /// Character after `<`, `<!` or `<!D` does not start any markup.
    InvalidMarkup,
    ExpectedQuote,
    ExpectedEquals,
    ExpectedWhitespace,
    ExpectedGreaterThan,
    /// Unescaped `<` inside an attribute value.
    LessThanInAttributeValue,
    /// Malformed `&...;` reference.
    InvalidReference,
    /// Character reference above U+10FFFF.
    CharRefOutOfRange,
    /// Character reference to a code point that is not a Char.
    InvalidCharRef,
    /// `--` inside a comment not followed by `>`.
    DoubleHyphenInComment,
    /// `]]>` inside character data.
    CDataEndInText,
    /// Unbalanced `]` in a document type declaration.
    UnbalancedBracket,
}

impl Error {
    pub fn new<T>(kind: ErrKind, character: Option<char>, position: usize) -> Result<T, Self> {
        Err(Self {
            kind,
            character,
            position,
        })
    }

    /// Error at the buffer's cursor, blamed on the character under it
    pub(crate) fn at<T>(kind: ErrKind, buffer: &ParsingBuffer) -> Result<T, Self> {
        Self::new(kind, buffer.current(), buffer.absolute_position())
    }

    pub fn kind(&self) -> ErrKind {
        self.kind
    }

    /// The character that terminated the production, if any
    pub fn character(&self) -> Option<char> {
        self.character
    }

    /// Absolute code point offset in the document
    pub fn position(&self) -> usize {
        self.position
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.character {
            Some(c) => write!(f, "{:?}({:?}) at {}", self.kind, c, self.position),
            None => write!(f, "{:?} at {}", self.kind, self.position),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl core::error::Error for Error {}

/// Compact the buffer unless the parser is suspended.
pub(crate) fn settle(
    buffer: &mut ParsingBuffer,
    result: Result<Status, Error>,
) -> Result<Status, Error> {
    if !matches!(result, Ok(Status::NeedMoreData)) {
        buffer.erase_to_current_position();
    }
    result
}
