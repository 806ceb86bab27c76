// SPDX-License-Identifier: Apache-2.0

//! Stress tests for chunked input
//!
//! Every document is fed with several delivery patterns, split at every
//! possible byte position and byte by byte. The event sequence must not
//! depend on where the chunk boundaries fall.

use picoxml::{Event, ParseError, ParsingResult, XmlReader};
use test_log::test;

/// Owned event representation for comparison
#[derive(Debug, Clone, PartialEq)]
enum OwnedEvent {
    Declaration,
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
            Event::XmlDeclaration(_) => OwnedEvent::Declaration,
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

/// Delivers data to the reader in controlled chunks
struct ChunkedWriter<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_pattern: &'a [usize],
    pattern_idx: usize,
}

impl<'a> ChunkedWriter<'a> {
    fn new(data: &'a [u8], chunk_pattern: &'a [usize]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_pattern,
            pattern_idx: 0,
        }
    }

    fn run(&mut self, reader: &mut XmlReader) -> Result<Vec<OwnedEvent>, ParseError> {
        let mut events = Vec::new();
        while self.pos < self.data.len() {
            let chunk_size = if self.chunk_pattern.is_empty() {
                self.data.len() - self.pos
            } else {
                let size = self.chunk_pattern[self.pattern_idx].max(1);
                self.pattern_idx = (self.pattern_idx + 1) % self.chunk_pattern.len();
                size
            };
            let end_pos = (self.pos + chunk_size).min(self.data.len());
            reader.write(&self.data[self.pos..end_pos]);
            self.pos = end_pos;

            while let Some(event) = reader.next_event()? {
                events.push(OwnedEvent::from_event(&event));
            }
        }
        Ok(events)
    }
}

fn read_with_pattern(data: &[u8], pattern: &[usize]) -> Result<Vec<OwnedEvent>, ParseError> {
    let mut reader = XmlReader::new();
    ChunkedWriter::new(data, pattern).run(&mut reader)
}

/// Reads `data` as two chunks split at `split`
fn read_split(data: &[u8], split: usize) -> Result<Vec<OwnedEvent>, ParseError> {
    let mut reader = XmlReader::new();
    let mut events = Vec::new();
    for chunk in [&data[..split], &data[split..]] {
        reader.write(chunk);
        while let Some(event) = reader.next_event()? {
            events.push(OwnedEvent::from_event(&event));
        }
    }
    Ok(events)
}

/// Test scenario configuration
struct TestScenario {
    name: &'static str,
    xml: &'static str,
    expected_events: Vec<OwnedEvent>,
}

fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

fn get_test_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario {
            name: "Declaration And Root",
            xml: "<?xml version='1.0' encoding='UTF-8' standalone='yes'?><root a='1'>text<child/></root>",
            expected_events: vec![
                OwnedEvent::Declaration,
                OwnedEvent::Start("root".into(), attrs(&[("a", "1")])),
                OwnedEvent::Text("text".into()),
                OwnedEvent::Empty("child".into(), Vec::new()),
                OwnedEvent::End("root".into()),
            ],
        },
        TestScenario {
            name: "Prolog Constructs",
            xml: "<!DOCTYPE r [<!ENTITY e 'x>y'>]>\n<?pi some data?>\n<!-- c -->\n<r/>\n<!--after-->",
            expected_events: vec![
                OwnedEvent::DocType("r".into()),
                OwnedEvent::Pi("pi".into(), "some data".into()),
                OwnedEvent::Comment(" c ".into()),
                OwnedEvent::Empty("r".into(), Vec::new()),
                OwnedEvent::Comment("after".into()),
            ],
        },
        TestScenario {
            name: "References",
            xml: "<r v=\"&amp;&#x3C;&#62;&unknown;\">&lt;&#169;&gt;&amp;amp;</r>",
            expected_events: vec![
                OwnedEvent::Start("r".into(), attrs(&[("v", "&<>&unknown;")])),
                OwnedEvent::Text("<\u{a9}>&amp;".into()),
                OwnedEvent::End("r".into()),
            ],
        },
        TestScenario {
            name: "CDATA With Brackets",
            xml: "<r><![CDATA[a]]]]><![CDATA[]]>x]]y</r>",
            expected_events: vec![
                OwnedEvent::Start("r".into(), Vec::new()),
                OwnedEvent::CData("a]]".into()),
                OwnedEvent::CData("".into()),
                OwnedEvent::Text("x]]y".into()),
                OwnedEvent::End("r".into()),
            ],
        },
        TestScenario {
            name: "Nested Elements",
            xml: "<a><b><c><d x='1' y=\"2\"/></c></b></a>",
            expected_events: vec![
                OwnedEvent::Start("a".into(), Vec::new()),
                OwnedEvent::Start("b".into(), Vec::new()),
                OwnedEvent::Start("c".into(), Vec::new()),
                OwnedEvent::Empty("d".into(), attrs(&[("x", "1"), ("y", "2")])),
                OwnedEvent::End("c".into()),
                OwnedEvent::End("b".into()),
                OwnedEvent::End("a".into()),
            ],
        },
        TestScenario {
            name: "Multi-byte UTF-8",
            xml: "<ü ä='€'>日本語 🎉</ü>",
            expected_events: vec![
                OwnedEvent::Start("ü".into(), attrs(&[("ä", "€")])),
                OwnedEvent::Text("日本語 🎉".into()),
                OwnedEvent::End("ü".into()),
            ],
        },
        TestScenario {
            name: "Question Marks And Dashes",
            xml: "<r><?t a?b??><!-- - a-b - --></r>",
            expected_events: vec![
                OwnedEvent::Start("r".into(), Vec::new()),
                OwnedEvent::Pi("t".into(), "a?b?".into()),
                OwnedEvent::Comment(" - a-b - ".into()),
                OwnedEvent::End("r".into()),
            ],
        },
    ]
}

#[test]
fn test_scenarios_with_chunk_patterns() {
    let patterns: [&[usize]; 7] = [
        &[],
        &[1],
        &[2],
        &[3],
        &[1, 2, 3, 5, 7, 11],
        &[13, 1],
        &[64],
    ];
    for scenario in get_test_scenarios() {
        for pattern in patterns {
            let events = read_with_pattern(scenario.xml.as_bytes(), pattern)
                .unwrap_or_else(|e| panic!("{} {pattern:?}: {e}", scenario.name));
            assert_eq!(
                events, scenario.expected_events,
                "{} with pattern {pattern:?}",
                scenario.name
            );
        }
    }
}

#[test]
fn test_scenarios_at_every_split_point() {
    for scenario in get_test_scenarios() {
        let data = scenario.xml.as_bytes();
        for split in 0..=data.len() {
            let events = read_split(data, split)
                .unwrap_or_else(|e| panic!("{} split at {split}: {e}", scenario.name));
            assert_eq!(
                events, scenario.expected_events,
                "{} split at {split}",
                scenario.name
            );
        }
    }
}

#[test]
fn test_errors_independent_of_chunking() {
    let inputs = [
        "<a><b></a>",
        "<a>x]]>y</a>",
        "<a b='1' b2=\"<\"/>",
        "<a><!-- x -- y --></a>",
        "<a>&#xFFFFFFFF;</a>",
        "<?xml version='1.1'?><a/>",
        "<a/><b/>",
    ];
    let patterns: [&[usize]; 3] = [&[1], &[2, 5], &[3]];
    for input in inputs {
        let whole = read_with_pattern(input.as_bytes(), &[]).unwrap_err();
        for pattern in patterns {
            let chunked = read_with_pattern(input.as_bytes(), pattern).unwrap_err();
            assert_eq!(chunked, whole, "{input:?} with pattern {pattern:?}");
        }
    }
}

#[test]
fn test_suspension_is_idempotent() {
    let data = "<r attr='va&amp;lue'><!-- comment --><![CDATA[raw]]>tail</r>".as_bytes();
    let mut reader = XmlReader::new();
    let mut results = Vec::new();
    for &byte in data {
        reader.write(&[byte]);
        loop {
            let result = reader.parse();
            if result == ParsingResult::NeedMoreData {
                // Repeated calls without new data change nothing
                assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
                assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
                break;
            }
            assert_ne!(result, ParsingResult::Error, "{:?}", reader.error());
            results.push(result);
        }
    }
    assert_eq!(
        results,
        [
            ParsingResult::StartOfElement,
            ParsingResult::Comment,
            ParsingResult::CData,
            ParsingResult::TextNode,
            ParsingResult::EndOfElement,
        ]
    );
}

#[test]
fn test_payload_survives_suspension() {
    let mut reader = XmlReader::new();
    reader.write(b"<item id='7'>");
    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    reader.write(b"<sub");
    assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
    // Still describes the last completed token
    assert_eq!(reader.name(), "item");
    assert_eq!(reader.attributes().value("id"), Some("7"));
    reader.write(b"/>");
    assert_eq!(reader.parse(), ParsingResult::EmptyElement);
    assert_eq!(reader.name(), "sub");
    assert!(reader.attributes().is_empty());
}

#[test]
fn test_utf8_sequence_split_across_writes() {
    // U+1F389 is F0 9F 8E 89
    let data = "<r>🎉</r>".as_bytes();
    let mut reader = XmlReader::new();
    for &byte in &data[..4] {
        assert_eq!(reader.write(&[byte]), 1);
    }
    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
    for &byte in &data[4..] {
        assert_eq!(reader.write(&[byte]), 1);
    }
    assert_eq!(reader.parse(), ParsingResult::TextNode);
    assert_eq!(reader.text(), "🎉");
    assert_eq!(reader.parse(), ParsingResult::EndOfElement);
}

#[test]
fn test_invalid_utf8_in_later_chunk() {
    let mut reader = XmlReader::new();
    reader.write(b"<r>ab");
    assert_eq!(reader.parse(), ParsingResult::StartOfElement);
    assert_eq!(reader.parse(), ParsingResult::NeedMoreData);
    // A lone continuation byte
    assert_eq!(reader.write(b"c\x80d"), 1);
    assert_eq!(reader.parse(), ParsingResult::Error);
    assert_eq!(
        reader.error(),
        Some(&ParseError::InvalidUtf8 { offset: 6 })
    );
}
