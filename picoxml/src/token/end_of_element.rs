// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, NameParser, Status, TokenOption};
use crate::buffer::ParsingBuffer;
use crate::chars::is_whitespace;

/// `ETag ::= '</' Name S? '>'`
///
/// Starts after `</`. Matching the name against the open element is left to
/// the reader.
#[derive(Debug, Clone)]
pub struct EndOfElementParser {
    name: NameParser,
    name_done: bool,
    done: bool,
}

impl Default for EndOfElementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EndOfElementParser {
    pub fn new() -> Self {
        Self {
            name: NameParser::new(TokenOption::None),
            name_done: false,
            done: false,
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        if self.done {
            return Ok(Status::Success);
        }
        if !self.name_done {
            if self.name.parse(buffer)? == Status::NeedMoreData {
                return Ok(Status::NeedMoreData);
            }
            self.name_done = true;
        }
        while let Some(c) = buffer.current() {
            if c == '>' {
                self.done = true;
                buffer.increment_position();
                return Ok(Status::Success);
            }
            if !is_whitespace(c) {
                return Error::at(ErrKind::ExpectedGreaterThan, buffer);
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    pub fn take_name(&mut self) -> String {
        self.name.take_name()
    }
}
