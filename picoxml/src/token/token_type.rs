// SPDX-License-Identifier: Apache-2.0

use super::{settle, ErrKind, Error, Status, TokenOption};
use crate::buffer::ParsingBuffer;
use crate::chars::{is_name_start_char, is_whitespace};

/// Rest of `<!--` after `<!`
const COMMENT_OPEN: [char; 2] = ['-', '-'];
/// Rest of `<![CDATA[` after `<!`
const CDATA_OPEN: [char; 7] = ['[', 'C', 'D', 'A', 'T', 'A', '['];
/// Rest of `<!DOCTYPE` after `<!`
const DOCTYPE_OPEN: [char; 7] = ['D', 'O', 'C', 'T', 'Y', 'P', 'E'];

/// Kind of the next construct in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Whitespace outside of any element
    Whitespace,
    /// `<?`, consumed. May turn out to be the XML declaration.
    ProcessingInstruction,
    /// `<!DOCTYPE`, consumed; the whitespace after it is not
    DocumentType,
    /// `<!--`, consumed
    Comment,
    /// `<![CDATA[`, consumed
    CData,
    /// `<`, consumed; the name is not
    StartOfElement,
    /// `</`, consumed
    EndOfElement,
    /// Nothing consumed
    TextNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start { whitespace: bool },
    AfterLessThan,
    AfterBang,
    Literal { kind: TokenType, matched: usize },
    AfterDoctype,
    Done(TokenType),
}

/// Classifies the upcoming construct by its opening characters so the reader
/// can hand over to the matching token parser.
///
/// A run of whitespace before `<` becomes its own [`TokenType::Whitespace`],
/// reported once the first non-whitespace character shows up. With
/// [`TokenOption::Synchronization`] everything up to the next `<` is dropped.
#[derive(Debug, Clone)]
pub struct TokenTypeParser {
    option: TokenOption,
    state: State,
}

impl Default for TokenTypeParser {
    fn default() -> Self {
        Self::new(TokenOption::None)
    }
}

impl TokenTypeParser {
    pub fn new(option: TokenOption) -> Self {
        Self {
            option,
            state: State::Start { whitespace: false },
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        if let State::Done(_) = self.state {
            return Ok(Status::Success);
        }
        while let Some(c) = buffer.current() {
            match self.state {
                State::Start { whitespace } => match c {
                    '<' if whitespace => return Ok(self.found(TokenType::Whitespace)),
                    '<' => self.state = State::AfterLessThan,
                    _ if self.option == TokenOption::Synchronization => {}
                    c if is_whitespace(c) => {
                        if self.option != TokenOption::IgnoreLeadingWhitespace {
                            self.state = State::Start { whitespace: true };
                        }
                    }
                    _ if whitespace => return Ok(self.found(TokenType::Whitespace)),
                    _ => return Ok(self.found(TokenType::TextNode)),
                },
                State::AfterLessThan => match c {
                    '?' => {
                        buffer.increment_position();
                        return Ok(self.found(TokenType::ProcessingInstruction));
                    }
                    '/' => {
                        buffer.increment_position();
                        return Ok(self.found(TokenType::EndOfElement));
                    }
                    '!' => self.state = State::AfterBang,
                    c if is_name_start_char(c) => return Ok(self.found(TokenType::StartOfElement)),
                    _ => return Error::at(ErrKind::InvalidMarkup, buffer),
                },
                State::AfterBang => {
                    let kind = match c {
                        '-' => TokenType::Comment,
                        '[' => TokenType::CData,
                        'D' => TokenType::DocumentType,
                        _ => return Error::at(ErrKind::InvalidMarkup, buffer),
                    };
                    self.state = State::Literal { kind, matched: 1 };
                }
                State::Literal { kind, matched } => {
                    let literal: &[char] = match kind {
                        TokenType::Comment => &COMMENT_OPEN,
                        TokenType::CData => &CDATA_OPEN,
                        _ => &DOCTYPE_OPEN,
                    };
                    if literal.get(matched) != Some(&c) {
                        return Error::at(ErrKind::InvalidMarkup, buffer);
                    }
                    if matched + 1 < literal.len() {
                        self.state = State::Literal {
                            kind,
                            matched: matched + 1,
                        };
                    } else if kind == TokenType::DocumentType {
                        self.state = State::AfterDoctype;
                    } else {
                        buffer.increment_position();
                        return Ok(self.found(kind));
                    }
                }
                State::AfterDoctype => {
                    if !is_whitespace(c) {
                        return Error::at(ErrKind::ExpectedWhitespace, buffer);
                    }
                    return Ok(self.found(TokenType::DocumentType));
                }
                State::Done(_) => return Ok(Status::Success),
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    fn found(&mut self, token_type: TokenType) -> Status {
        log::trace!("Next token is {token_type:?}");
        self.state = State::Done(token_type);
        Status::Success
    }

    /// The classified token, after success
    pub fn token_type(&self) -> Option<TokenType> {
        match self.state {
            State::Done(token_type) => Some(token_type),
            _ => None,
        }
    }
}
