// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, NameParser, Status, TokenOption};
use crate::buffer::ParsingBuffer;
use crate::chars::{is_char, is_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Name,
    /// External ID and internal subset, skipped
    Tail {
        quote: Option<char>,
        depth: usize,
    },
    Done,
}

/// `doctypedecl ::= '<!DOCTYPE' S Name (S ExternalID)? S? ('[' intSubset ']' S?)? '>'`
///
/// Starts after `<!DOCTYPE`. Only the root element name is kept; the external
/// ID and internal subset are skipped, honouring quotes and bracket nesting.
#[derive(Debug, Clone)]
pub struct DocumentTypeParser {
    state: State,
    name: NameParser,
}

impl Default for DocumentTypeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTypeParser {
    pub fn new() -> Self {
        Self {
            state: State::Name,
            name: NameParser::new(TokenOption::IgnoreLeadingWhitespace),
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        if self.state == State::Done {
            return Ok(Status::Success);
        }
        if self.state == State::Name {
            if self.name.parse(buffer)? == Status::NeedMoreData {
                return Ok(Status::NeedMoreData);
            }
            match self.name.termination_char() {
                Some(c) if is_whitespace(c) || c == '>' || c == '[' => {}
                _ => return Error::at(ErrKind::ExpectedWhitespace, buffer),
            }
            self.state = State::Tail {
                quote: None,
                depth: 0,
            };
        }
        while let Some(c) = buffer.current() {
            let State::Tail { quote, depth } = self.state else {
                return Ok(Status::Success);
            };
            if !is_char(c) {
                return Error::at(ErrKind::InvalidChar, buffer);
            }
            self.state = match (quote, c) {
                (Some(q), c) if c == q => State::Tail { quote: None, depth },
                (Some(_), _) => self.state,
                (None, '"' | '\'') => State::Tail {
                    quote: Some(c),
                    depth,
                },
                (None, '[') => State::Tail {
                    quote,
                    depth: depth + 1,
                },
                (None, ']') if depth == 0 => {
                    return Error::at(ErrKind::UnbalancedBracket, buffer);
                }
                (None, ']') => State::Tail {
                    quote,
                    depth: depth - 1,
                },
                (None, '>') if depth == 0 => {
                    self.state = State::Done;
                    buffer.increment_position();
                    return Ok(Status::Success);
                }
                _ => self.state,
            };
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    /// Root element name
    pub fn name(&self) -> &str {
        self.name.name()
    }

    pub fn take_name(&mut self) -> String {
        self.name.take_name()
    }
}
