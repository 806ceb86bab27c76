// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, Status};
use crate::buffer::ParsingBuffer;
use crate::chars::{accumulate_digit, digit_value, is_char, is_name_char, is_name_start_char};

/// The five entities every XML processor knows without a DTD
const PREDEFINED_ENTITIES: [(&str, char); 5] = [
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("apos", '\''),
    ("quot", '"'),
];

/// A parsed reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `&#65;` or `&#x41;`, already decoded
    Char(char),
    /// `&name;`, the name only
    Entity(String),
}

impl Reference {
    /// Appends the replacement text to `out`.
    ///
    /// Predefined entities are replaced. Other entity names cannot be
    /// resolved without a DTD and are passed through verbatim as `&name;`.
    pub fn expand_into(&self, out: &mut String) {
        match self {
            Reference::Char(c) => out.push(*c),
            Reference::Entity(name) => {
                match PREDEFINED_ENTITIES.iter().find(|(n, _)| *n == name.as_str()) {
                    Some((_, c)) => out.push(*c),
                    None => {
                        log::trace!("Passing through unknown entity reference &{name};");
                        out.push('&');
                        out.push_str(name);
                        out.push(';');
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ampersand,
    AfterAmpersand,
    AfterHash,
    Digits { hex: bool, value: u32, count: usize },
    EntityName,
    Done,
}

/// `Reference ::= EntityRef | CharRef`
///
/// Consumes the leading `&` itself. The running value of a character
/// reference is checked against U+10FFFF after every digit, so an overlong
/// reference fails as soon as it is out of range.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    state: State,
    name: String,
    reference: Option<Reference>,
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceParser {
    pub fn new() -> Self {
        Self {
            state: State::Ampersand,
            name: String::new(),
            reference: None,
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
            match self.state {
                State::Ampersand => {
                    if c != '&' {
                        return Error::at(ErrKind::InvalidReference, buffer);
                    }
                    self.state = State::AfterAmpersand;
                }
                State::AfterAmpersand => {
                    if c == '#' {
                        self.state = State::AfterHash;
                    } else if is_name_start_char(c) {
                        self.name.push(c);
                        self.state = State::EntityName;
                    } else {
                        return Error::at(ErrKind::InvalidReference, buffer);
                    }
                }
                State::AfterHash => {
                    if c == 'x' {
                        self.state = State::Digits {
                            hex: true,
                            value: 0,
                            count: 0,
                        };
                    } else {
                        // Decimal; the digit itself is handled on the next turn
                        self.state = State::Digits {
                            hex: false,
                            value: 0,
                            count: 0,
                        };
                        continue;
                    }
                }
                State::Digits { hex, value, count } => {
                    if c == ';' && count > 0 {
                        let decoded = char::from_u32(value).filter(|&c| is_char(c));
                        let Some(decoded) = decoded else {
                            return Error::new(
                                ErrKind::InvalidCharRef,
                                Some(';'),
                                buffer.absolute_position(),
                            );
                        };
                        self.reference = Some(Reference::Char(decoded));
                        self.state = State::Done;
                        buffer.increment_position();
                        return Ok(Status::Success);
                    }
                    let Some(digit) = digit_value(c, hex) else {
                        return Error::at(ErrKind::InvalidReference, buffer);
                    };
                    let Some(value) = accumulate_digit(value, digit, hex) else {
                        return Error::at(ErrKind::CharRefOutOfRange, buffer);
                    };
                    self.state = State::Digits {
                        hex,
                        value,
                        count: count + 1,
                    };
                }
                State::EntityName => {
                    if c == ';' {
                        self.reference = Some(Reference::Entity(core::mem::take(&mut self.name)));
                        self.state = State::Done;
                        buffer.increment_position();
                        return Ok(Status::Success);
                    } else if is_name_char(c) {
                        self.name.push(c);
                    } else {
                        return Error::at(ErrKind::InvalidReference, buffer);
                    }
                }
                State::Done => {}
            }
            buffer.increment_position();
        }
        Ok(Status::NeedMoreData)
    }

    /// The parsed reference, after success
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub fn take_reference(&mut self) -> Option<Reference> {
        self.reference.take()
    }
}
