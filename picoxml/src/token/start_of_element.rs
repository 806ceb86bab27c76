// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, AttributeValueParser, ErrKind, Error, NameParser, Status, TokenOption};
use crate::attribute::{Attribute, AttributeList};
use crate::buffer::ParsingBuffer;
use crate::chars::{is_name_start_char, is_whitespace};

#[derive(Debug, Clone)]
enum State {
    ElementName(NameParser),
    /// Between attributes; `separated` is true once whitespace was seen
    Attributes { separated: bool },
    AttributeName(NameParser),
    Equals(String),
    Value(String, AttributeValueParser),
    /// `/` seen, `>` must follow
    Slash,
    Done,
}

/// `STag ::= '<' Name (S Attribute)* S? '>'` and
/// `EmptyElemTag ::= '<' Name (S Attribute)* S? '/>'`
///
/// Starts after `<`. Attributes are collected in document order with their
/// values expanded.
#[derive(Debug, Clone)]
pub struct StartOfElementParser {
    state: State,
    name: String,
    attributes: AttributeList,
    empty: bool,
}

impl Default for StartOfElementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StartOfElementParser {
    pub fn new() -> Self {
        Self {
            state: State::ElementName(NameParser::new(TokenOption::None)),
            name: String::new(),
            attributes: AttributeList::new(),
            empty: false,
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        loop {
            match &mut self.state {
                State::Done => return Ok(Status::Success),
                State::ElementName(parser) => {
                    if parser.parse(buffer)? == Status::NeedMoreData {
                        return Ok(Status::NeedMoreData);
                    }
                    self.name = parser.take_name();
                    self.state = State::Attributes { separated: false };
                }
                State::AttributeName(parser) => {
                    if parser.parse(buffer)? == Status::NeedMoreData {
                        return Ok(Status::NeedMoreData);
                    }
                    self.state = State::Equals(parser.take_name());
                }
                State::Value(name, parser) => {
                    if parser.parse(buffer)? == Status::NeedMoreData {
                        return Ok(Status::NeedMoreData);
                    }
                    let attribute = Attribute::with_quote(
                        core::mem::take(name),
                        parser.take_value(),
                        parser.quote(),
                    );
                    log::trace!("Attribute {:?}={:?}", attribute.name(), attribute.value());
                    self.attributes.push(attribute);
                    self.state = State::Attributes { separated: false };
                }
                State::Attributes { separated } => {
                    let Some(c) = buffer.current() else {
                        return Ok(Status::NeedMoreData);
                    };
                    match c {
                        '>' => return Ok(self.finish(buffer, false)),
                        '/' => self.state = State::Slash,
                        c if is_whitespace(c) => *separated = true,
                        c if is_name_start_char(c) => {
                            if !*separated {
                                return Error::at(ErrKind::ExpectedWhitespace, buffer);
                            }
                            // The name parser takes this character
                            self.state = State::AttributeName(NameParser::new(TokenOption::None));
                            continue;
                        }
                        _ => return Error::at(ErrKind::ExpectedGreaterThan, buffer),
                    }
                    buffer.increment_position();
                }
                State::Equals(name) => {
                    let Some(c) = buffer.current() else {
                        return Ok(Status::NeedMoreData);
                    };
                    if c == '=' {
                        let name = core::mem::take(name);
                        self.state = State::Value(
                            name,
                            AttributeValueParser::new(TokenOption::IgnoreLeadingWhitespace),
                        );
                    } else if !is_whitespace(c) {
                        return Error::at(ErrKind::ExpectedEquals, buffer);
                    }
                    buffer.increment_position();
                }
                State::Slash => {
                    if buffer.is_more_data_needed() {
                        return Ok(Status::NeedMoreData);
                    }
                    if buffer.current() != Some('>') {
                        return Error::at(ErrKind::ExpectedGreaterThan, buffer);
                    }
                    return Ok(self.finish(buffer, true));
                }
            }
        }
    }

    fn finish(&mut self, buffer: &mut ParsingBuffer, empty: bool) -> Status {
        buffer.increment_position();
        self.empty = empty;
        self.state = State::Done;
        Status::Success
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    /// True for `<name/>`
    pub fn is_empty_element(&self) -> bool {
        self.empty
    }

    /// Moves name and attributes out
    pub fn take(&mut self) -> (String, AttributeList) {
        (
            core::mem::take(&mut self.name),
            core::mem::take(&mut self.attributes),
        )
    }
}
