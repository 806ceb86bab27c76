// SPDX-License-Identifier: Apache-2.0

//! A pull-style XML reader fed with arbitrary byte chunks.

use alloc::string::String;
use alloc::vec::Vec;

use crate::attribute::AttributeList;
use crate::buffer::ParsingBuffer;
use crate::config::ReaderConfig;
use crate::declaration::XmlDeclaration;
use crate::parse_error::ParseError;
use crate::token::{
    self, CDataParser, CommentParser, DocumentTypeParser, EndOfElementParser, PiKind,
    ProcessingInstructionParser, StartOfElementParser, Status, TextNodeParser, TokenOption,
    TokenType, TokenTypeParser,
};

/// Where the reader is in the document structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Nothing read yet; the XML declaration is still allowed
    PrologWaitForXmlDeclaration,
    /// Before the root element; a document type is still allowed
    PrologWaitForDocumentType,
    /// Before the root element, after the document type
    PrologWaitForMisc,
    /// Inside the root element
    Element,
    /// Root element closed; only comments, PIs and whitespace may follow
    EndOfDocument,
    /// Absorbing; see [`XmlReader::error`]
    Error,
}

/// Outcome of one [`XmlReader::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsingResult {
    NeedMoreData,
    Error,
    XmlDeclaration,
    ProcessingInstruction,
    DocumentType,
    Comment,
    StartOfElement,
    /// `<name/>`; no matching `EndOfElement` follows
    EmptyElement,
    EndOfElement,
    TextNode,
    CData,
}

/// One parsed construct, borrowing its payload from the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    XmlDeclaration(XmlDeclaration),
    ProcessingInstruction { target: &'a str, data: &'a str },
    DocumentType(&'a str),
    Comment(&'a str),
    StartElement {
        name: &'a str,
        attributes: &'a AttributeList,
    },
    EmptyElement {
        name: &'a str,
        attributes: &'a AttributeList,
    },
    EndElement(&'a str),
    Text(&'a str),
    CData(&'a str),
}

/// Target and data of the last processing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingInstruction<'a> {
    pub target: &'a str,
    pub data: &'a str,
}

/// The token parser currently running
#[derive(Debug, Clone)]
enum TokenParser {
    ProcessingInstruction(ProcessingInstructionParser),
    DocumentType(DocumentTypeParser),
    Comment(CommentParser),
    CData(CDataParser),
    StartOfElement(StartOfElementParser),
    EndOfElement(EndOfElementParser),
    TextNode(TextNodeParser),
}

impl TokenParser {
    /// Parser for a classified token, `None` for whitespace
    fn for_type(token_type: TokenType) -> Option<Self> {
        Some(match token_type {
            TokenType::Whitespace => return None,
            TokenType::ProcessingInstruction => {
                Self::ProcessingInstruction(ProcessingInstructionParser::new())
            }
            TokenType::DocumentType => Self::DocumentType(DocumentTypeParser::new()),
            TokenType::Comment => Self::Comment(CommentParser::new()),
            TokenType::CData => Self::CData(CDataParser::new()),
            TokenType::StartOfElement => Self::StartOfElement(StartOfElementParser::new()),
            TokenType::EndOfElement => Self::EndOfElement(EndOfElementParser::new()),
            TokenType::TextNode => Self::TextNode(TextNodeParser::new()),
        })
    }

    fn parse(&mut self, buffer: &mut ParsingBuffer) -> Result<Status, token::Error> {
        match self {
            Self::ProcessingInstruction(p) => p.parse(buffer),
            Self::DocumentType(p) => p.parse(buffer),
            Self::Comment(p) => p.parse(buffer),
            Self::CData(p) => p.parse(buffer),
            Self::StartOfElement(p) => p.parse(buffer),
            Self::EndOfElement(p) => p.parse(buffer),
            Self::TextNode(p) => p.parse(buffer),
        }
    }

    /// Result kind used for structural checks before the token is read.
    /// Processing instructions are only told apart from the declaration
    /// once complete.
    fn kind(&self) -> ParsingResult {
        match self {
            Self::ProcessingInstruction(_) => ParsingResult::ProcessingInstruction,
            Self::DocumentType(_) => ParsingResult::DocumentType,
            Self::Comment(_) => ParsingResult::Comment,
            Self::CData(_) => ParsingResult::CData,
            Self::StartOfElement(_) => ParsingResult::StartOfElement,
            Self::EndOfElement(_) => ParsingResult::EndOfElement,
            Self::TextNode(_) => ParsingResult::TextNode,
        }
    }
}

#[derive(Debug, Clone)]
enum ParsingState {
    Idle,
    ReadingTokenType(TokenTypeParser),
    Reading(TokenParser),
}

/// Incremental, non-blocking XML reader.
///
/// Bytes go in through [`write`](Self::write) in whatever pieces they arrive;
/// [`parse`](Self::parse) is called in a loop and returns one construct per
/// call until it reports [`ParsingResult::NeedMoreData`]. Payload accessors
/// describe the construct returned last and are only updated when a token
/// completes.
///
/// ```rust
/// use picoxml::{ParsingResult, XmlReader};
///
/// let mut reader = XmlReader::new();
/// reader.write(b"<greeting lang='en'>Hel");
/// assert_eq!(reader.parse(), ParsingResult::StartOfElement);
/// assert_eq!(reader.attributes().value("lang"), Some("en"));
/// assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
///
/// reader.write(b"lo</greeting>");
/// assert_eq!(reader.parse(), ParsingResult::TextNode);
/// assert_eq!(reader.text(), "Hello");
/// assert_eq!(reader.parse(), ParsingResult::EndOfElement);
/// ```
///
/// Any error is terminal for the document; call
/// [`start_new_document`](Self::start_new_document) or
/// [`clear`](Self::clear) to go again.
#[derive(Debug, Clone)]
pub struct XmlReader {
    config: ReaderConfig,
    buffer: ParsingBuffer,
    document_state: DocumentState,
    parsing_state: ParsingState,
    /// Names of the open elements, innermost last
    open_elements: Vec<String>,
    /// Bytes accepted by `write()` so far
    bytes_written: usize,
    /// Byte offset of an invalid UTF-8 byte, reported once the buffer drains
    utf8_error: Option<usize>,
    /// Absolute code point position where the current token started
    token_start: usize,
    /// Set once the first character of the document was looked at
    bom_checked: bool,
    xml_declaration: Option<XmlDeclaration>,
    document_type: String,
    name: String,
    text: String,
    attributes: AttributeList,
    error: Option<ParseError>,
}

impl Default for XmlReader {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlReader {
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            config,
            buffer: ParsingBuffer::with_capacity(config.initial_capacity),
            document_state: DocumentState::PrologWaitForXmlDeclaration,
            parsing_state: ParsingState::Idle,
            open_elements: Vec::new(),
            bytes_written: 0,
            utf8_error: None,
            token_start: 0,
            bom_checked: false,
            xml_declaration: None,
            document_type: String::new(),
            name: String::new(),
            text: String::new(),
            attributes: AttributeList::new(),
            error: None,
        }
    }

    /// Feeds more input.
    ///
    /// Returns the number of bytes taken. A count below `bytes.len()` means
    /// an invalid UTF-8 byte was found; everything before it is still parsed
    /// and `parse()` reports the error once it runs out of data.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        if self.utf8_error.is_some() {
            return 0;
        }
        let consumed = self.buffer.write(bytes);
        self.bytes_written += consumed;
        if consumed < bytes.len() {
            log::debug!("Invalid UTF-8 byte at offset {}", self.bytes_written);
            self.utf8_error = Some(self.bytes_written);
        }
        consumed
    }

    /// Parses up to the end of the next construct.
    pub fn parse(&mut self) -> ParsingResult {
        if self.document_state == DocumentState::Error {
            return ParsingResult::Error;
        }
        match self.step() {
            Ok(result) => result,
            Err(err) => {
                log::debug!("Document failed in {:?}: {}", self.document_state, err);
                self.document_state = DocumentState::Error;
                self.parsing_state = ParsingState::Idle;
                self.error = Some(err);
                ParsingResult::Error
            }
        }
    }

    /// [`parse`](Self::parse) with the payload attached. `Ok(None)` means
    /// more data is needed.
    pub fn next_event(&mut self) -> Result<Option<Event<'_>>, ParseError> {
        if self.document_state == DocumentState::Error {
            return Err(ParseError::ErrorState);
        }
        let event = match self.parse() {
            ParsingResult::NeedMoreData => return Ok(None),
            ParsingResult::Error => {
                return Err(self.error.clone().unwrap_or(ParseError::ErrorState));
            }
            ParsingResult::XmlDeclaration => {
                Event::XmlDeclaration(self.xml_declaration.unwrap_or_default())
            }
            ParsingResult::ProcessingInstruction => Event::ProcessingInstruction {
                target: &self.name,
                data: &self.text,
            },
            ParsingResult::DocumentType => Event::DocumentType(&self.document_type),
            ParsingResult::Comment => Event::Comment(&self.text),
            ParsingResult::StartOfElement => Event::StartElement {
                name: &self.name,
                attributes: &self.attributes,
            },
            ParsingResult::EmptyElement => Event::EmptyElement {
                name: &self.name,
                attributes: &self.attributes,
            },
            ParsingResult::EndOfElement => Event::EndElement(&self.name),
            ParsingResult::TextNode => Event::Text(&self.text),
            ParsingResult::CData => Event::CData(&self.text),
        };
        Ok(Some(event))
    }

    fn step(&mut self) -> Result<ParsingResult, ParseError> {
        loop {
            match &mut self.parsing_state {
                ParsingState::Idle => {
                    let Some(c) = self.buffer.current() else {
                        return self.need_more_data();
                    };
                    if !self.bom_checked {
                        self.bom_checked = true;
                        // One byte order mark may precede the document
                        if c == '\u{FEFF}' {
                            log::trace!("Skipping byte order mark");
                            self.buffer.increment_position();
                            self.buffer.erase_to_current_position();
                            continue;
                        }
                    }
                    self.token_start = self.buffer.absolute_position();
                    self.parsing_state =
                        if self.document_state == DocumentState::Element && c != '<' {
                            let parser = TokenParser::TextNode(TextNodeParser::new());
                            self.check_allowed(parser.kind())?;
                            ParsingState::Reading(parser)
                        } else {
                            ParsingState::ReadingTokenType(TokenTypeParser::new(TokenOption::None))
                        };
                }
                ParsingState::ReadingTokenType(classifier) => {
                    if classifier.parse(&mut self.buffer)? == Status::NeedMoreData {
                        return self.need_more_data();
                    }
                    let token_type = classifier.token_type().unwrap_or(TokenType::Whitespace);
                    match TokenParser::for_type(token_type) {
                        Some(parser) => {
                            self.check_allowed(parser.kind())?;
                            self.parsing_state = ParsingState::Reading(parser);
                        }
                        None => {
                            self.leave_declaration_state();
                            self.parsing_state = ParsingState::Idle;
                        }
                    }
                }
                ParsingState::Reading(parser) => {
                    if parser.parse(&mut self.buffer)? == Status::NeedMoreData {
                        return self.need_more_data();
                    }
                    let ParsingState::Reading(parser) =
                        core::mem::replace(&mut self.parsing_state, ParsingState::Idle)
                    else {
                        continue;
                    };
                    let result = self.complete(parser)?;
                    log::trace!("Token complete: {result:?}");
                    return Ok(result);
                }
            }
        }
    }

    /// Moves a finished token's payload into the reader and applies the
    /// document state transition.
    fn complete(&mut self, parser: TokenParser) -> Result<ParsingResult, ParseError> {
        match parser {
            TokenParser::ProcessingInstruction(mut pi) => {
                if pi.kind() == PiKind::XmlDeclaration {
                    let declaration = pi.declaration().copied().unwrap_or_default();
                    self.check_allowed(ParsingResult::XmlDeclaration)?;
                    if !declaration.is_valid() {
                        return Err(ParseError::InvalidXmlDeclaration(declaration));
                    }
                    self.xml_declaration = Some(declaration);
                    self.set_document_state(DocumentState::PrologWaitForDocumentType);
                    return Ok(ParsingResult::XmlDeclaration);
                }
                self.leave_declaration_state();
                (self.name, self.text) = pi.take();
                Ok(ParsingResult::ProcessingInstruction)
            }
            TokenParser::DocumentType(mut doctype) => {
                self.document_type = doctype.take_name();
                self.set_document_state(DocumentState::PrologWaitForMisc);
                Ok(ParsingResult::DocumentType)
            }
            TokenParser::Comment(mut comment) => {
                self.leave_declaration_state();
                self.text = comment.take_text();
                Ok(ParsingResult::Comment)
            }
            TokenParser::CData(mut cdata) => {
                self.text = cdata.take_text();
                Ok(ParsingResult::CData)
            }
            TokenParser::TextNode(mut text) => {
                self.text = text.take_text();
                Ok(ParsingResult::TextNode)
            }
            TokenParser::StartOfElement(mut tag) => {
                let empty = tag.is_empty_element();
                (self.name, self.attributes) = tag.take();
                if empty {
                    if self.open_elements.is_empty() {
                        self.set_document_state(DocumentState::EndOfDocument);
                    }
                    return Ok(ParsingResult::EmptyElement);
                }
                self.open_elements.push(self.name.clone());
                self.set_document_state(DocumentState::Element);
                Ok(ParsingResult::StartOfElement)
            }
            TokenParser::EndOfElement(mut tag) => {
                let found = tag.take_name();
                match self.open_elements.pop() {
                    Some(expected) if expected == found => {}
                    Some(expected) => {
                        return Err(ParseError::MismatchedEndTag { expected, found });
                    }
                    None => {
                        return Err(ParseError::UnexpectedToken {
                            token: ParsingResult::EndOfElement,
                            state: self.document_state,
                        });
                    }
                }
                self.name = found;
                if self.open_elements.is_empty() {
                    self.set_document_state(DocumentState::EndOfDocument);
                }
                Ok(ParsingResult::EndOfElement)
            }
        }
    }

    /// Structural check: may `token` appear in the current document state?
    fn check_allowed(&self, token: ParsingResult) -> Result<(), ParseError> {
        use DocumentState::*;
        let state = self.document_state;
        let allowed = match token {
            ParsingResult::XmlDeclaration => state == PrologWaitForXmlDeclaration,
            ParsingResult::DocumentType => {
                matches!(state, PrologWaitForXmlDeclaration | PrologWaitForDocumentType)
            }
            ParsingResult::StartOfElement | ParsingResult::EmptyElement => {
                !matches!(state, EndOfDocument | Error)
            }
            ParsingResult::EndOfElement | ParsingResult::TextNode | ParsingResult::CData => {
                state == Element
            }
            _ => state != Error,
        };
        if allowed {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken { token, state })
        }
    }

    /// Anything but the declaration itself closes the window for it
    fn leave_declaration_state(&mut self) {
        if self.document_state == DocumentState::PrologWaitForXmlDeclaration {
            self.set_document_state(DocumentState::PrologWaitForDocumentType);
        }
    }

    fn set_document_state(&mut self, state: DocumentState) {
        if self.document_state != state {
            log::debug!("Document state {:?} -> {:?}", self.document_state, state);
            self.document_state = state;
        }
    }

    fn need_more_data(&self) -> Result<ParsingResult, ParseError> {
        if let Some(offset) = self.utf8_error {
            return Err(ParseError::InvalidUtf8 { offset });
        }
        let reading = !matches!(self.parsing_state, ParsingState::Idle);
        if let Some(limit) = self.config.max_token_len.filter(|_| reading) {
            let token_size = self.buffer.absolute_position() - self.token_start;
            if token_size > limit {
                return Err(ParseError::TokenTooLarge { token_size, limit });
            }
        }
        Ok(ParsingResult::NeedMoreData)
    }

    /// Resets the document and parsing state for a new document.
    ///
    /// Input that was written but not parsed yet is kept, so a stream of
    /// concatenated documents can be read one after the other.
    pub fn start_new_document(&mut self) {
        log::debug!("Starting new document");
        self.buffer.erase_to_current_position();
        self.document_state = DocumentState::PrologWaitForXmlDeclaration;
        self.parsing_state = ParsingState::Idle;
        self.open_elements.clear();
        self.utf8_error = None;
        self.bom_checked = false;
        self.xml_declaration = None;
        self.document_type.clear();
        self.name.clear();
        self.text.clear();
        self.attributes.clear();
        self.error = None;
    }

    /// Like [`start_new_document`](Self::start_new_document), but also drops
    /// all buffered input.
    pub fn clear(&mut self) {
        self.start_new_document();
        self.buffer.clear();
        self.bytes_written = 0;
        self.token_start = 0;
    }

    pub fn document_state(&self) -> DocumentState {
        self.document_state
    }

    /// The declaration, once [`ParsingResult::XmlDeclaration`] was returned
    pub fn xml_declaration(&self) -> Option<&XmlDeclaration> {
        self.xml_declaration.as_ref()
    }

    /// After [`ParsingResult::ProcessingInstruction`]
    pub fn processing_instruction(&self) -> ProcessingInstruction<'_> {
        ProcessingInstruction {
            target: &self.name,
            data: &self.text,
        }
    }

    /// Root element name from the document type declaration
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// Element name, or target of a processing instruction
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text of a text node, comment or CDATA section, or data of a
    /// processing instruction
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attributes of the last start tag or empty element
    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    /// Why the reader is in [`DocumentState::Error`]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Names of the currently open elements, outermost first
    pub fn open_elements(&self) -> &[String] {
        &self.open_elements
    }
}
