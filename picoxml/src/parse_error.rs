// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use crate::declaration::XmlDeclaration;
use crate::reader::{DocumentState, ParsingResult};
use crate::token;

/// Errors that end a document in [`crate::XmlReader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token parser hit a grammar violation.
    Token(token::Error),
    /// The input was not valid UTF-8. `offset` counts bytes from the start
    /// of the document.
    InvalidUtf8 { offset: usize },
    /// A well-formed token appeared where the document structure does not
    /// allow it, e.g. CDATA in the prolog or a second root element.
    UnexpectedToken {
        token: ParsingResult,
        state: DocumentState,
    },
    /// End tag does not close the innermost open element.
    MismatchedEndTag { expected: String, found: String },
    /// The XML declaration was recognised but is not a valid 1.0 declaration.
    InvalidXmlDeclaration(XmlDeclaration),
    /// An unfinished token grew past [`crate::ReaderConfig::max_token_len`].
    TokenTooLarge { token_size: usize, limit: usize },
    /// The reader is in its error state; start a new document.
    ErrorState,
}

impl From<token::Error> for ParseError {
    fn from(err: token::Error) -> Self {
        ParseError::Token(err)
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::Token(e) => write!(f, "{e}"),
            ParseError::InvalidUtf8 { offset } => write!(f, "Invalid UTF-8 at byte {offset}"),
            ParseError::UnexpectedToken { token, state } => {
                write!(f, "Unexpected {token:?} in state {state:?}")
            }
            ParseError::MismatchedEndTag { expected, found } => {
                write!(f, "Expected </{expected}>, found </{found}>")
            }
            _ => write!(f, "{self:?}"),
        }
    }
}

impl core::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use test_log::test;

    #[test]
    fn test_token_error_converts() {
        let err: Result<(), token::Error> =
            token::Error::new(token::ErrKind::InvalidChar, Some('\u{1}'), 7);
        let err: ParseError = err.unwrap_err().into();
        match &err {
            ParseError::Token(e) => assert_eq!(e.position(), 7),
            _ => panic!("Expected token error"),
        }
        assert_eq!(err.to_string(), "InvalidChar('\\u{1}') at 7");
    }

    #[test]
    fn test_display() {
        let err = ParseError::MismatchedEndTag {
            expected: "root".into(),
            found: "child".into(),
        };
        assert_eq!(err.to_string(), "Expected </root>, found </child>");
        assert_eq!(
            ParseError::InvalidUtf8 { offset: 3 }.to_string(),
            "Invalid UTF-8 at byte 3"
        );
        assert_eq!(ParseError::ErrorState.to_string(), "ErrorState");
    }
}
