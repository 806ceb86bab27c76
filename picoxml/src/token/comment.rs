// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, Status};
use crate::buffer::ParsingBuffer;
use crate::chars::is_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Dash,
    DoubleDash,
    Done,
}

/// `Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'`
///
/// Starts after `<!--`. A `--` anywhere other than right before the closing
/// `>` is an error, which also rules out `<!----->`.
#[derive(Debug, Clone)]
pub struct CommentParser {
    state: State,
    text: String,
}

impl Default for CommentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentParser {
    pub fn new() -> Self {
        Self {
            state: State::Text,
            text: String::new(),
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
        while let Some(c) = buffer.current() {
            match (self.state, c) {
                (State::DoubleDash, '>') => {
                    self.state = State::Done;
                    buffer.increment_position();
                    return Ok(Status::Success);
                }
                (State::DoubleDash, _) => {
                    return Error::at(ErrKind::DoubleHyphenInComment, buffer);
                }
                (State::Text, '-') => self.state = State::Dash,
                (State::Dash, '-') => self.state = State::DoubleDash,
                (_, c) if !is_char(c) => return Error::at(ErrKind::InvalidChar, buffer),
                (State::Dash, c) => {
                    self.text.push('-');
                    self.text.push(c);
                    self.state = State::Text;
                }
                (_, c) => self.text.push(c),
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    /// Comment text without the delimiters
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn take_text(&mut self) -> String {
        core::mem::take(&mut self.text)
    }
}
