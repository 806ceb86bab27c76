// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;

use super::{settle, ErrKind, Error, ReferenceParser, Status, TokenOption};
use crate::attribute::Quote;
use crate::buffer::ParsingBuffer;
use crate::chars::{is_char, is_whitespace};

#[derive(Debug, Clone)]
enum State {
    BeforeQuote,
    Value,
    Reference(ReferenceParser),
    Done,
}

/// `AttValue ::= '"' ([^<&"] | Reference)* '"' | "'" ([^<&'] | Reference)* "'"`
///
/// References are expanded as they are read, so `value()` holds the
/// replacement text. The quote that was used is kept alongside.
#[derive(Debug, Clone)]
pub struct AttributeValueParser {
    option: TokenOption,
    state: State,
    quote: Quote,
    value: String,
}

impl AttributeValueParser {
    pub fn new(option: TokenOption) -> Self {
        Self {
            option,
            state: State::BeforeQuote,
            quote: Quote::default(),
            value: String::new(),
        }
    }

    pub fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        let result = self.run(buffer);
        settle(buffer, result)
    }

    fn run(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, Error> {
        loop {
            let c = match &mut self.state {
                State::Reference(reference) => {
                    if reference.parse(buffer)? == Status::NeedMoreData {
                        return Ok(Status::NeedMoreData);
                    }
                    if let Some(r) = reference.reference() {
                        r.expand_into(&mut self.value);
                    }
                    self.state = State::Value;
                    continue;
                }
                State::Done => return Ok(Status::Success),
                State::BeforeQuote | State::Value => match buffer.current() {
                    Some(c) => c,
                    None => return Ok(Status::NeedMoreData),
                },
            };
            if matches!(self.state, State::BeforeQuote) {
                if let Some(quote) = Quote::from_char(c) {
                    self.quote = quote;
                    self.state = State::Value;
                } else if !(self.option == TokenOption::IgnoreLeadingWhitespace && is_whitespace(c))
                {
                    return Error::at(ErrKind::ExpectedQuote, buffer);
                }
            } else if c == self.quote.as_char() {
                self.state = State::Done;
                buffer.increment_position();
                return Ok(Status::Success);
            } else {
                match c {
                    '&' => {
                        // The reference parser consumes the `&` itself
                        self.state = State::Reference(ReferenceParser::new());
                        continue;
                    }
                    '<' => return Error::at(ErrKind::LessThanInAttributeValue, buffer),
                    c if !is_char(c) => return Error::at(ErrKind::InvalidChar, buffer),
                    c => self.value.push(c),
                }
            }
            buffer.increment_position();
        }
    }

    /// Value with references expanded
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn take_value(&mut self) -> String {
        core::mem::take(&mut self.value)
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }
}
