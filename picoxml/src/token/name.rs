// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, Status, TokenOption};
use crate::buffer::ParsingBuffer;
use crate::chars::{is_name_char, is_name_start_char, is_whitespace};

/// `Name ::= NameStartChar (NameChar)*`
///
/// The character that ends the name is left in the buffer and recorded as the
/// termination character, so callers can tell "ended at `>`" from "ended at
/// `=`". A name is only complete once that character has been seen.
#[derive(Debug, Clone, Default)]
pub struct NameParser {
    option: TokenOption,
    name: String,
    termination: Option<char>,
}

impl NameParser {
    pub fn new(option: TokenOption) -> Self {
        Self {
            option,
            ..Self::default()
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        while let Some(c) = buffer.current() {
            if self.name.is_empty() {
                if is_name_start_char(c) {
                    self.name.push(c);
                } else if self.option == TokenOption::IgnoreLeadingWhitespace && is_whitespace(c)
                {
                    // skip
                } else {
                    self.termination = Some(c);
                    return Error::at(ErrKind::InvalidNameStartChar, buffer);
                }
            } else if is_name_char(c) {
                self.name.push(c);
            } else {
                self.termination = Some(c);
                return Ok(Status::Success);
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Moves the parsed name out, leaving the parser empty
    pub fn take_name(&mut self) -> String {
        core::mem::take(&mut self.name)
    }

    /// Character that ended the name (or caused the failure)
    pub fn termination_char(&self) -> Option<char> {
        self.termination
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.termination = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run_chunked;
    use super::*;
    use test_log::test;

    #[test]
    fn test_name_ends_at_non_name_char() {
        let mut parser = NameParser::new(TokenOption::None);
        let (buffer, result) = run_chunked("root>", 64, |b| parser.parse(b));
        assert_eq!(result, Ok(Status::Success));
        assert_eq!(parser.name(), "root");
        assert_eq!(parser.termination_char(), Some('>'));
        // The terminator stays for the next parser
        assert_eq!(buffer.current(), Some('>'));
    }

    #[test]
    fn test_name_needs_terminator() {
        let mut parser = NameParser::new(TokenOption::None);
        let (_, result) = run_chunked("root", 64, |b| parser.parse(b));
        assert_eq!(result, Ok(Status::NeedMoreData));
    }

    #[test]
    fn test_name_byte_by_byte() {
        let mut parser = NameParser::new(TokenOption::None);
        let (_, result) = run_chunked("ns:élément-1 ", 1, |b| parser.parse(b));
        assert_eq!(result, Ok(Status::Success));
        assert_eq!(parser.name(), "ns:élément-1");
        assert_eq!(parser.termination_char(), Some(' '));
    }

    #[test]
    fn test_invalid_start_char() {
        let mut parser = NameParser::new(TokenOption::None);
        let (_, result) = run_chunked("1abc ", 64, |b| parser.parse(b));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrKind::InvalidNameStartChar);
        assert_eq!(err.character(), Some('1'));
        assert_eq!(parser.termination_char(), Some('1'));
    }

    #[test]
    fn test_leading_whitespace() {
        let mut strict = NameParser::new(TokenOption::None);
        let (_, result) = run_chunked("  abc>", 64, |b| strict.parse(b));
        assert_eq!(result.unwrap_err().character(), Some(' '));

        let mut lenient = NameParser::new(TokenOption::IgnoreLeadingWhitespace);
        let (_, result) = run_chunked("  abc>", 1, |b| lenient.parse(b));
        assert_eq!(result, Ok(Status::Success));
        assert_eq!(lenient.take_name(), "abc");
        assert_eq!(lenient.name(), "");
    }
}
