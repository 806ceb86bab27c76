// SPDX-License-Identifier: Apache-2.0

//! Forward-only XML document builder.

use alloc::string::String;
use alloc::vec::Vec;

use crate::attribute::Attribute;
use crate::chars::{
    check_att_value, check_cdata, check_comment_text, check_name, check_pi_target,
    check_pi_value, check_text_node, is_whitespace,
};

/// Where the writer is in the document structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing written
    Empty,
    /// Prolog content written, no root element yet
    DocumentStarted,
    /// Inside the root element
    Element,
    /// Root element closed
    DocumentEnded,
    /// Absorbing; every call fails with [`WriteError::ErrorState`]
    Error,
}

/// Why a writer call was refused. Byte offsets point at the first offending
/// character of the argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    InvalidName { offset: usize },
    InvalidPiTarget { offset: usize },
    InvalidPiData { offset: usize },
    InvalidComment { offset: usize },
    InvalidText { offset: usize },
    InvalidCData { offset: usize },
    InvalidAttributeName { name: String, offset: usize },
    InvalidAttributeValue { name: String, offset: usize },
    /// Root element name differs from the declared document type
    DocumentTypeMismatch { expected: String, found: String },
    /// The call is not allowed in this state, e.g. text outside the root
    UnexpectedCall { state: WriterState },
    /// An earlier call failed
    ErrorState,
}

impl core::fmt::Display for WriteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WriteError::DocumentTypeMismatch { expected, found } => {
                write!(f, "Root element {found:?} does not match document type {expected:?}")
            }
            WriteError::UnexpectedCall { state } => write!(f, "Call not allowed in {state:?}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

impl core::error::Error for WriteError {}

/// Builds a well-formed document from structured calls.
///
/// Every argument is validated against the XML grammar before anything is
/// written. Text arguments are raw markup-ready text: references such as
/// `&amp;` are allowed and a bare `&` or `<` is an error; use
/// [`crate::escape`] to prepare arbitrary strings. A refused call leaves the
/// output untouched and puts the writer in [`WriterState::Error`] for good.
///
/// ```rust
/// use picoxml::{Attribute, XmlWriter};
///
/// let mut writer = XmlWriter::new();
/// writer.write_xml_declaration()?;
/// writer.write_start_of_element("note", &[Attribute::new("id", "1")])?;
/// writer.write_text_node("hi &amp; bye")?;
/// writer.write_end_of_element()?;
/// assert_eq!(
///     writer.xml_string(),
///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?><note id=\"1\">hi &amp; bye</note>"
/// );
/// # Ok::<(), picoxml::WriteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct XmlWriter {
    state: WriterState,
    output: String,
    /// Open elements, innermost last
    open_elements: Vec<String>,
    document_type: Option<String>,
    /// `]` characters ending the output when the last call wrote text
    text_brackets: usize,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            state: WriterState::Empty,
            output: String::new(),
            open_elements: Vec::new(),
            document_type: None,
            text_brackets: 0,
        }
    }

    /// `<?xml version="1.0" encoding="UTF-8"?>`, only as the very first call
    pub fn write_xml_declaration(&mut self) -> Result<(), WriteError> {
        self.run(|w| {
            w.expect_state(&[WriterState::Empty])?;
            w.output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
            w.state = WriterState::DocumentStarted;
            Ok(())
        })
    }

    /// `<!DOCTYPE name>`. The root element must then be called `name`.
    pub fn write_document_type(&mut self, name: &str) -> Result<(), WriteError> {
        self.run(|w| {
            w.expect_state(&[WriterState::Empty, WriterState::DocumentStarted])?;
            if w.document_type.is_some() {
                return Err(WriteError::UnexpectedCall { state: w.state });
            }
            check_name(name).map_err(|offset| WriteError::InvalidName { offset })?;
            w.output.push_str("<!DOCTYPE ");
            w.output.push_str(name);
            w.output.push('>');
            w.document_type = Some(name.into());
            w.state = WriterState::DocumentStarted;
            Ok(())
        })
    }

    pub fn write_comment(&mut self, text: &str) -> Result<(), WriteError> {
        self.run(|w| {
            check_comment_text(text).map_err(|offset| WriteError::InvalidComment { offset })?;
            w.output.push_str("<!--");
            w.output.push_str(text);
            w.output.push_str("-->");
            w.mark_started();
            Ok(())
        })
    }

    /// `<?target data?>`, or `<?target?>` when `data` is empty.
    ///
    /// `data` must not start with whitespace; the separator after the target
    /// would swallow it.
    pub fn write_processing_instruction(
        &mut self,
        target: &str,
        data: &str,
    ) -> Result<(), WriteError> {
        self.run(|w| {
            check_pi_target(target).map_err(|offset| WriteError::InvalidPiTarget { offset })?;
            check_pi_value(data).map_err(|offset| WriteError::InvalidPiData { offset })?;
            if data.starts_with(is_whitespace) {
                return Err(WriteError::InvalidPiData { offset: 0 });
            }
            w.output.push_str("<?");
            w.output.push_str(target);
            if !data.is_empty() {
                w.output.push(' ');
                w.output.push_str(data);
            }
            w.output.push_str("?>");
            w.mark_started();
            Ok(())
        })
    }

    pub fn write_start_of_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
    ) -> Result<(), WriteError> {
        self.run(|w| {
            w.start_tag(name, attributes)?;
            w.output.push('>');
            w.open_elements.push(name.into());
            w.state = WriterState::Element;
            Ok(())
        })
    }

    /// `<name/>`; an empty root element ends the document
    pub fn write_empty_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
    ) -> Result<(), WriteError> {
        self.run(|w| {
            w.start_tag(name, attributes)?;
            w.output.push_str("/>");
            if w.open_elements.is_empty() {
                w.state = WriterState::DocumentEnded;
            }
            Ok(())
        })
    }

    /// Appends character data. Consecutive calls form one text run, so
    /// `]]` at the end of one and `>` at the start of the next is refused.
    pub fn write_text_node(&mut self, text: &str) -> Result<(), WriteError> {
        let brackets = self.text_brackets;
        self.run(|w| {
            w.expect_state(&[WriterState::Element])?;
            check_text_node(text).map_err(|offset| WriteError::InvalidText { offset })?;
            w.text_brackets = trailing_brackets(brackets, text)
                .map_err(|offset| WriteError::InvalidText { offset })?;
            w.output.push_str(text);
            Ok(())
        })
    }

    pub fn write_cdata_section(&mut self, text: &str) -> Result<(), WriteError> {
        self.run(|w| {
            w.expect_state(&[WriterState::Element])?;
            check_cdata(text).map_err(|offset| WriteError::InvalidCData { offset })?;
            w.output.push_str("<![CDATA[");
            w.output.push_str(text);
            w.output.push_str("]]>");
            Ok(())
        })
    }

    /// Closes the innermost open element
    pub fn write_end_of_element(&mut self) -> Result<(), WriteError> {
        self.run(|w| {
            w.expect_state(&[WriterState::Element])?;
            let Some(name) = w.open_elements.pop() else {
                return Err(WriteError::UnexpectedCall { state: w.state });
            };
            w.output.push_str("</");
            w.output.push_str(&name);
            w.output.push('>');
            if w.open_elements.is_empty() {
                w.state = WriterState::DocumentEnded;
            }
            Ok(())
        })
    }

    /// Everything written so far
    pub fn xml_string(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Back to an empty document
    pub fn clear(&mut self) {
        self.state = WriterState::Empty;
        self.output.clear();
        self.open_elements.clear();
        self.document_type = None;
        self.text_brackets = 0;
    }

    /// Validates and writes `<name attr="value"...`, leaving the tag open
    fn start_tag(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), WriteError> {
        self.expect_state(&[
            WriterState::Empty,
            WriterState::DocumentStarted,
            WriterState::Element,
        ])?;
        check_name(name).map_err(|offset| WriteError::InvalidName { offset })?;
        if self.open_elements.is_empty() {
            if let Some(expected) = &self.document_type {
                if expected != name {
                    return Err(WriteError::DocumentTypeMismatch {
                        expected: expected.clone(),
                        found: name.into(),
                    });
                }
            }
        }
        for attribute in attributes {
            check_name(attribute.name()).map_err(|offset| WriteError::InvalidAttributeName {
                name: attribute.name().into(),
                offset,
            })?;
            check_att_value(attribute.value(), attribute.quote()).map_err(|offset| {
                WriteError::InvalidAttributeValue {
                    name: attribute.name().into(),
                    offset,
                }
            })?;
        }
        self.output.push('<');
        self.output.push_str(name);
        for attribute in attributes {
            let quote = attribute.quote().as_char();
            self.output.push(' ');
            self.output.push_str(attribute.name());
            self.output.push('=');
            self.output.push(quote);
            self.output.push_str(attribute.value());
            self.output.push(quote);
        }
        Ok(())
    }

    fn expect_state(&self, allowed: &[WriterState]) -> Result<(), WriteError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(WriteError::UnexpectedCall { state: self.state })
        }
    }

    fn mark_started(&mut self) {
        if self.state == WriterState::Empty {
            self.state = WriterState::DocumentStarted;
        }
    }

    /// Runs one call, moving to the error state if it fails
    fn run<F>(&mut self, call: F) -> Result<(), WriteError>
    where
        F: FnOnce(&mut Self) -> Result<(), WriteError>,
    {
        if self.state == WriterState::Error {
            return Err(WriteError::ErrorState);
        }
        self.text_brackets = 0;
        let result = call(self);
        if let Err(err) = &result {
            log::debug!("Writer failed in {:?}: {}", self.state, err);
            self.state = WriterState::Error;
        }
        result
    }
}

/// Continues a text run that ended in `brackets` `]` characters. Returns
/// the count for the end of `text`, or the byte offset of a `>` that would
/// complete `]]>`.
fn trailing_brackets(brackets: usize, text: &str) -> Result<usize, usize> {
    let mut run = brackets;
    for (offset, c) in text.char_indices() {
        match c {
            ']' => run += 1,
            '>' if run >= 2 => return Err(offset),
            _ => run = 0,
        }
    }
    Ok(run)
}
