// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, NameParser, Status, TokenOption};
use crate::buffer::ParsingBuffer;
use crate::chars::{is_char, is_whitespace};
use crate::declaration::XmlDeclaration;

/// What a `<?...?>` construct turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiKind {
    ProcessingInstruction,
    /// Target is `xml` in any letter case
    XmlDeclaration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Target,
    AfterTarget,
    /// `?` right after the target
    EmptyEnd,
    Data,
    Question,
    Done,
}

/// `PI ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'`
///
/// Starts after `<?`. Leading whitespace of the data is dropped. When the
/// target is `xml`, the data is also parsed as an [`XmlDeclaration`].
#[derive(Debug, Clone)]
pub struct ProcessingInstructionParser {
    state: State,
    target: NameParser,
    data: String,
    kind: PiKind,
    declaration: Option<XmlDeclaration>,
}

impl Default for ProcessingInstructionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingInstructionParser {
    pub fn new() -> Self {
        Self {
            state: State::Target,
            target: NameParser::new(TokenOption::None),
            data: String::new(),
            kind: PiKind::ProcessingInstruction,
            declaration: None,
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        if self.state == State::Target {
            if self.target.parse(buffer)? == Status::NeedMoreData {
                return Ok(Status::NeedMoreData);
            }
            if self.target.name().eq_ignore_ascii_case("xml") {
                self.kind = PiKind::XmlDeclaration;
            }
            self.state = State::AfterTarget;
        }
        if self.state == State::Done {
            return Ok(Status::Success);
        }
        while let Some(c) = buffer.current() {
            match (self.state, c) {
                (State::AfterTarget, '?') => self.state = State::EmptyEnd,
                (State::AfterTarget, c) if is_whitespace(c) => self.state = State::Data,
                (State::AfterTarget, _) => {
                    return Error::at(ErrKind::ExpectedWhitespace, buffer);
                }
                (State::EmptyEnd | State::Question, '>') => {
                    self.finish();
                    buffer.increment_position();
                    return Ok(Status::Success);
                }
                (State::EmptyEnd, _) => return Error::at(ErrKind::ExpectedGreaterThan, buffer),
                (State::Data, '?') => self.state = State::Question,
                (State::Question, '?') => self.data.push('?'),
                (_, c) if !is_char(c) => return Error::at(ErrKind::InvalidChar, buffer),
                (State::Data, c) if self.data.is_empty() && is_whitespace(c) => {}
                (State::Question, c) => {
                    self.data.push('?');
                    self.data.push(c);
                    self.state = State::Data;
                }
                (_, c) => self.data.push(c),
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    fn finish(&mut self) {
        self.state = State::Done;
        if self.kind == PiKind::XmlDeclaration {
            let mut body = String::new();
            if !self.data.is_empty() {
                body.push(' ');
                body.push_str(&self.data);
            }
            self.declaration = Some(XmlDeclaration::parse(&body));
        }
        log::trace!("Processing instruction {:?} complete", self.target.name());
    }

    pub fn kind(&self) -> PiKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        self.target.name()
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Moves target and data out
    pub fn take(&mut self) -> (String, String) {
        (self.target.take_name(), core::mem::take(&mut self.data))
    }

    /// The declaration, when the target was `xml`
    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }
}
