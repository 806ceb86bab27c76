// SPDX-License-Identifier: Apache-2.0

//! End-to-end reader tests over complete documents fed in one piece.

use picoxml::token::ErrKind;
use picoxml::{
    DocumentState, Encoding, Event, ParseError, ParsingResult, Standalone, Version,
    XmlDeclaration, XmlReader,
};
use test_log::test;

/// Owned event representation for comparison
#[derive(Debug, Clone, PartialEq)]
enum OwnedEvent {
    Declaration(XmlDeclaration),
    Pi(String, String),
    DocType(String),
    Comment(String),
    Start(String, Vec<(String, String)>),
    Empty(String, Vec<(String, String)>),
    End(String),
    Text(String),
    CData(String),
}

impl OwnedEvent {
    fn from_event(event: &Event) -> Self {
        let attributes = |list: &picoxml::AttributeList| {
            list.iter()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect()
        };
        match event {
            Event::XmlDeclaration(d) => OwnedEvent::Declaration(*d),
            Event::ProcessingInstruction { target, data } => {
                OwnedEvent::Pi(target.to_string(), data.to_string())
            }
            Event::DocumentType(name) => OwnedEvent::DocType(name.to_string()),
            Event::Comment(text) => OwnedEvent::Comment(text.to_string()),
            Event::StartElement { name, attributes: a } => {
                OwnedEvent::Start(name.to_string(), attributes(a))
            }
            Event::EmptyElement { name, attributes: a } => {
                OwnedEvent::Empty(name.to_string(), attributes(a))
            }
            Event::EndElement(name) => OwnedEvent::End(name.to_string()),
            Event::Text(text) => OwnedEvent::Text(text.to_string()),
            Event::CData(text) => OwnedEvent::CData(text.to_string()),
        }
    }
}

fn read_all(input: &str) -> Result<Vec<OwnedEvent>, ParseError> {
    let mut reader = XmlReader::new();
    reader.write(input.as_bytes());
    let mut events = Vec::new();
    while let Some(event) = reader.next_event()? {
        events.push(OwnedEvent::from_event(&event));
    }
    Ok(events)
}

fn start(name: &str, attributes: &[(&str, &str)]) -> OwnedEvent {
    OwnedEvent::Start(
        name.into(),
        attributes
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
    )
}

fn empty(name: &str) -> OwnedEvent {
    OwnedEvent::Empty(name.into(), Vec::new())
}

fn end(name: &str) -> OwnedEvent {
    OwnedEvent::End(name.into())
}

fn text(s: &str) -> OwnedEvent {
    OwnedEvent::Text(s.into())
}

#[test]
fn test_basic_document() {
    let mut reader = XmlReader::new();
    reader.write(
        b"<?xml version='1.0' encoding='UTF-8' standalone='yes'?><root a='1'>text<child/></root>",
    );

    assert_eq!(reader.parse(), ParsingResult::XmlDeclaration);
    let declaration = reader.xml_declaration().copied().unwrap_or_default();
    assert_eq!(declaration.version, Version::V1_0);
    assert_eq!(declaration.encoding, Encoding::Utf8);
    assert_eq!(declaration.standalone, Standalone::Yes);

    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    assert_eq!(reader.name(), "root");
    assert_eq!(reader.attributes().len(), 1);
    assert_eq!(reader.attributes().value("a"), Some("1"));
    assert_eq!(reader.document_state(), DocumentState::Element);

    assert_eq!(reader.parse(), ParsingResult::TextNode);
    assert_eq!(reader.text(), "text");

    assert_eq!(reader.parse(), ParsingResult::EmptyElement);
    assert_eq!(reader.name(), "child");
    assert!(reader.attributes().is_empty());
    assert_eq!(reader.open_elements(), ["root"]);

    assert_eq!(reader.parse(), ParsingResult::EndOfElement);
    assert_eq!(reader.name(), "root");
    assert_eq!(reader.document_state(), DocumentState::EndOfDocument);

    assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
}

#[test]
fn test_full_prolog() {
    let events = read_all(
        "<?xml version=\"1.0\"?>\n\
         <!DOCTYPE note SYSTEM \"note.dtd\" [<!ELEMENT note (#PCDATA)>]>\n\
         <?xml-stylesheet href='style.css'?>\n\
         <!-- hello -->\n\
         <note/>\n\
         <!-- bye -->",
    )
    .unwrap();
    assert_eq!(events.len(), 6);
    assert!(matches!(&events[0], OwnedEvent::Declaration(d) if d.is_valid()));
    assert_eq!(
        events[1..],
        [
            OwnedEvent::DocType("note".into()),
            OwnedEvent::Pi("xml-stylesheet".into(), "href='style.css'".into()),
            OwnedEvent::Comment(" hello ".into()),
            empty("note"),
            OwnedEvent::Comment(" bye ".into()),
        ]
    );
}

#[test]
fn test_reference_expansion() {
    let events = read_all(
        "<r t=\"&lt;&#65;&#x42;&quot;&apos;\">a &amp; b &gt; c&#x10000;</r>",
    )
    .unwrap();
    assert_eq!(
        events,
        [
            start("r", &[("t", "<AB\"'")]),
            text("a & b > c\u{10000}"),
            end("r"),
        ]
    );
}

#[test]
fn test_unknown_entity_passes_through() {
    let events = read_all("<r a='&nbsp;x'>&copy; 2024</r>").unwrap();
    assert_eq!(
        events,
        [start("r", &[("a", "&nbsp;x")]), text("&copy; 2024"), end("r")]
    );
}

#[test]
fn test_mixed_content() {
    let events = read_all(
        "<doc>\n  <p class='x' id=\"1\">one<![CDATA[<two>]]>three</p>\n  <br/>\n</doc>",
    )
    .unwrap();
    assert_eq!(
        events,
        [
            start("doc", &[]),
            text("\n  "),
            start("p", &[("class", "x"), ("id", "1")]),
            text("one"),
            OwnedEvent::CData("<two>".into()),
            text("three"),
            end("p"),
            text("\n  "),
            empty("br"),
            text("\n"),
            end("doc"),
        ]
    );
}

#[test]
fn test_whitespace_inside_tags() {
    let events = read_all("<a  x = '1'\n\ty=\"2\" ><b\n/></a >").unwrap();
    assert_eq!(
        events,
        [start("a", &[("x", "1"), ("y", "2")]), empty("b"), end("a")]
    );
}

#[test]
fn test_quotes_inside_attribute_values() {
    let events = read_all(r#"<a x="it's" y='say "hi"'/>"#).unwrap();
    assert_eq!(
        events,
        [OwnedEvent::Empty(
            "a".into(),
            vec![
                ("x".into(), "it's".into()),
                ("y".into(), "say \"hi\"".into())
            ]
        )]
    );
}

#[test]
fn test_multibyte_names_and_text() {
    let events = read_all("<données clé='é'>日本語</données>").unwrap();
    assert_eq!(
        events,
        [
            start("données", &[("clé", "é")]),
            text("日本語"),
            end("données"),
        ]
    );
}

#[test]
fn test_token_errors_carry_kind() {
    let cases = [
        ("<a>x &foo</a>", ErrKind::InvalidReference),
        ("<a>&#xZZ;</a>", ErrKind::InvalidReference),
        ("<a>&#1;</a>", ErrKind::InvalidCharRef),
        ("<a>&#x110000;</a>", ErrKind::CharRefOutOfRange),
        ("<a b='<'/>", ErrKind::LessThanInAttributeValue),
        ("<a b=1/>", ErrKind::ExpectedQuote),
        ("<a b/>", ErrKind::ExpectedEquals),
        ("<a b='1'c='2'/>", ErrKind::ExpectedWhitespace),
        ("<!-- a -- b -->", ErrKind::DoubleHyphenInComment),
        ("<a>]]></a>", ErrKind::CDataEndInText),
        ("<1a/>", ErrKind::InvalidMarkup),
        ("<a></1>", ErrKind::InvalidNameStartChar),
        ("<!DOCTYPE a ]>", ErrKind::UnbalancedBracket),
    ];
    for (input, kind) in cases {
        match read_all(input) {
            Err(ParseError::Token(e)) => assert_eq!(e.kind(), kind, "{input:?}"),
            other => panic!("{input:?}: expected token error, got {other:?}"),
        }
    }
}

#[test]
fn test_error_position_is_absolute() {
    let mut reader = XmlReader::new();
    reader.write(b"<a>");
    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    reader.write(b"ok\x01");
    assert_eq!(reader.parse(), ParsingResult::Error);
    match reader.error() {
        Some(ParseError::Token(e)) => {
            assert_eq!(e.kind(), ErrKind::InvalidChar);
            assert_eq!(e.character(), Some('\u{1}'));
            assert_eq!(e.position(), 5);
        }
        other => panic!("Unexpected {other:?}"),
    }
}

#[test]
fn test_structure_errors() {
    assert_eq!(
        read_all("<a/><b/>"),
        Err(ParseError::UnexpectedToken {
            token: ParsingResult::StartOfElement,
            state: DocumentState::EndOfDocument
        })
    );
    assert_eq!(
        read_all("<a></b>"),
        Err(ParseError::MismatchedEndTag {
            expected: "a".into(),
            found: "b".into()
        })
    );
    assert_eq!(
        read_all("</a>"),
        Err(ParseError::UnexpectedToken {
            token: ParsingResult::EndOfElement,
            state: DocumentState::PrologWaitForXmlDeclaration
        })
    );
    assert!(matches!(
        read_all("<?xml version='1.0' encoding='latin1'?><a/>"),
        Err(ParseError::InvalidXmlDeclaration(d)) if d.encoding == Encoding::Invalid
    ));
}

#[test]
fn test_concatenated_documents() {
    let mut reader = XmlReader::new();
    reader.write(b"<?xml version='1.0'?><first/><?xml version='1.0'?><second>x</second>");
    assert_eq!(reader.parse(), ParsingResult::XmlDeclaration);
    assert_eq!(reader.parse(), ParsingResult::EmptyElement);
    assert_eq!(reader.name(), "first");

    reader.start_new_document();
    assert_eq!(reader.document_state(), DocumentState::PrologWaitForXmlDeclaration);
    assert_eq!(reader.xml_declaration(), None);
    assert_eq!(reader.parse(), ParsingResult::XmlDeclaration);
    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    assert_eq!(reader.name(), "second");
    assert_eq!(reader.parse(), ParsingResult::TextNode);
    assert_eq!(reader.parse(), ParsingResult::EndOfElement);
    assert_eq!(reader.document_state(), DocumentState::EndOfDocument);
}

#[test]
fn test_recovery_after_error() {
    let mut reader = XmlReader::new();
    reader.write(b"<a><<");
    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    assert_eq!(reader.parse(), ParsingResult::Error);
    assert_eq!(reader.document_state(), DocumentState::Error);

    reader.clear();
    reader.write(b"<b/>");
    assert_eq!(reader.parse(), ParsingResult::EmptyElement);
    assert_eq!(reader.name(), "b");
}
