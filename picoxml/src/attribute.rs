// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;
use alloc::vec::Vec;

/// Quotation mark delimiting an attribute value.
///
/// Kept with the value because the value may contain the other quote
/// character unescaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    /// `"`
    #[default]
    Double,
    /// `'`
    Apostrophe,
}

impl Quote {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Quote::Double),
            '\'' => Some(Quote::Apostrophe),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Apostrophe => '\'',
        }
    }
}

/// A name/value pair from a start tag.
///
/// When produced by the reader, `value` has its references expanded. When
/// handed to the writer, `value` is raw attribute text and may contain
/// references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: String,
    quote: Quote,
}

impl Attribute {
    /// Attribute quoted with `"`
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_quote(name, value, Quote::Double)
    }

    pub fn with_quote(name: impl Into<String>, value: impl Into<String>, quote: Quote) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            quote,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }
}

/// Attributes in document order.
///
/// Duplicate names are kept; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// First attribute called `name`
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Value of the first attribute called `name`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(Attribute::value)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn clear(&mut self) {
        self.attributes.clear();
    }
}

impl From<Vec<Attribute>> for AttributeList {
    fn from(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = core::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}
