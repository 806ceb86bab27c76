// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, ReferenceParser, Status};
use crate::buffer::ParsingBuffer;
use crate::chars::is_char;

/// `CharData ::= [^<&]* - ([^<&]* ']]>' [^<&]*)`, with references mixed in.
///
/// Runs up to the next `<`, which is left in the buffer; the text is only
/// complete once that `<` has arrived. References are expanded as they are
/// read.
#[derive(Debug, Clone, Default)]
pub struct TextNodeParser {
    text: String,
    reference: Option<ReferenceParser>,
    /// Consecutive `]` just read
    brackets: usize,
}

impl TextNodeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        loop {
            if let Some(reference) = &mut self.reference {
                if reference.parse(buffer)? == Status::NeedMoreData {
                    return Ok(Status::NeedMoreData);
                }
                if let Some(r) = reference.reference() {
                    r.expand_into(&mut self.text);
                }
                self.reference = None;
            }
            let Some(c) = buffer.current() else {
                return Ok(Status::NeedMoreData);
            };
            match c {
                '<' => return Ok(Status::Success),
                '&' => {
                    self.brackets = 0;
                    self.reference = Some(ReferenceParser::new());
                    continue;
                }
                '>' if self.brackets >= 2 => {
                    return Error::at(ErrKind::CDataEndInText, buffer);
                }
                ']' => self.brackets += 1,
                c if !is_char(c) => return Error::at(ErrKind::InvalidChar, buffer),
                _ => self.brackets = 0,
            }
            self.text.push(c);
            buffer.increment_position();
        }
    }

    /// Text with references expanded
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn take_text(&mut self) -> String {
        core::mem::take(&mut self.text)
    }
}
