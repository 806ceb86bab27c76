// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, Status};
use crate::buffer::ParsingBuffer;
use crate::chars::is_char;

/// `CDSect ::= '<![CDATA[' (Char* - (Char* ']]>' Char*)) ']]>'`
///
/// Starts after `<![CDATA[`. A run of `]` is held back until it is known
/// whether it closes the section, so `a]]]>` yields `a]`.
#[derive(Debug, Clone, Default)]
pub struct CDataParser {
    text: String,
    brackets: usize,
    done: bool,
}

impl CDataParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        if self.done {
            return Ok(Status::Success);
        }
        while let Some(c) = buffer.current() {
            match c {
                ']' => self.brackets += 1,
                '>' if self.brackets >= 2 => {
                    self.push_brackets(self.brackets - 2);
                    self.done = true;
                    buffer.increment_position();
                    return Ok(Status::Success);
                }
                c if !is_char(c) => return Error::at(ErrKind::InvalidChar, buffer),
                c => {
                    self.push_brackets(self.brackets);
                    self.text.push(c);
                }
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    fn push_brackets(&mut self, count: usize) {
        self.text.extend(core::iter::repeat(']').take(count));
        self.brackets = 0;
    }

    /// Section content without the delimiters
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn take_text(&mut self) -> String {
        core::mem::take(&mut self.text)
    }
}
