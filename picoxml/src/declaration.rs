// SPDX-License-Identifier: Apache-2.0

//! The XML declaration, `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`.

use alloc::string::String;
use alloc::vec::Vec;

use crate::chars::is_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    None,
    Invalid,
    V1_0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    None,
    Invalid,
    Utf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Standalone {
    #[default]
    None,
    Invalid,
    Yes,
    No,
}

/// Parsed XML declaration.
///
/// Each pseudo-attribute keeps its own state, so an unknown `standalone`
/// value shows up as `Standalone::Invalid` while `version` may still be fine.
/// Use [`XmlDeclaration::is_valid`] for the overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlDeclaration {
    pub version: Version,
    pub encoding: Encoding,
    pub standalone: Standalone,
    /// False when something other than the three pseudo-attributes, in
    /// order, was found
    well_formed: bool,
}

/// Order in which pseudo-attributes may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Version,
    Encoding,
    Standalone,
    Finished,
}

/// Minimal cursor over the declaration body
struct Cursor {
    chars: Vec<char>,
    index: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    /// Skips whitespace, returns whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(is_whitespace) {
            self.index += 1;
        }
        self.index > start
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, f: F) -> &[char] {
        let start = self.index;
        while self.peek().is_some_and(&f) {
            self.index += 1;
        }
        &self.chars[start..self.index]
    }

    /// `S? '=' S? quoted-value`
    fn pseudo_attribute_value(&mut self) -> Option<Vec<char>> {
        self.skip_whitespace();
        if !self.eat('=') {
            return None;
        }
        self.skip_whitespace();
        let quote = self.peek().filter(|&c| c == '"' || c == '\'')?;
        self.index += 1;
        let value = self.take_while(|c| c != quote).to_vec();
        self.eat(quote).then_some(value)
    }
}

fn is_literal(value: &[char], expected: &str) -> bool {
    value.iter().copied().eq(expected.chars())
}

impl XmlDeclaration {
    /// Version 1.0, UTF-8, no standalone declaration
    pub fn new() -> Self {
        Self {
            version: Version::V1_0,
            encoding: Encoding::Utf8,
            standalone: Standalone::None,
            well_formed: true,
        }
    }

    /// Parses the text between `<?xml` and `?>`, leading whitespace included.
    pub fn parse(body: &str) -> Self {
        let mut declaration = Self {
            well_formed: true,
            ..Self::default()
        };
        let mut cursor = Cursor {
            chars: body.chars().collect(),
            index: 0,
        };
        // Next pseudo-attribute allowed; version is mandatory and first
        let mut stage = Stage::Version;
        loop {
            let separated = cursor.skip_whitespace();
            if cursor.peek().is_none() {
                break;
            }
            let name: String = cursor.take_while(|c| c.is_ascii_alphabetic()).iter().collect();
            let field = match name.as_str() {
                "version" => Stage::Version,
                "encoding" => Stage::Encoding,
                "standalone" => Stage::Standalone,
                _ => Stage::Finished,
            };
            let in_order = field != Stage::Finished
                && field >= stage
                && (stage != Stage::Version || field == Stage::Version);
            if !in_order {
                log::debug!("Unexpected {name:?} in XML declaration");
                declaration.well_formed = false;
                break;
            }
            let Some(value) = cursor.pseudo_attribute_value().filter(|_| separated) else {
                declaration.well_formed = false;
                break;
            };
            match field {
                Stage::Version => {
                    declaration.version = if is_literal(&value, "1.0") {
                        Version::V1_0
                    } else {
                        Version::Invalid
                    };
                    stage = Stage::Encoding;
                }
                Stage::Encoding => {
                    let value: String = value.iter().collect();
                    declaration.encoding = if value.eq_ignore_ascii_case("utf-8") {
                        Encoding::Utf8
                    } else {
                        Encoding::Invalid
                    };
                    stage = Stage::Standalone;
                }
                _ => {
                    declaration.standalone = if is_literal(&value, "yes") {
                        Standalone::Yes
                    } else if is_literal(&value, "no") {
                        Standalone::No
                    } else {
                        Standalone::Invalid
                    };
                    stage = Stage::Finished;
                }
            }
        }
        declaration
    }

    /// Version 1.0, no invalid field and nothing unrecognised.
    pub fn is_valid(&self) -> bool {
        self.well_formed
            && self.version == Version::V1_0
            && self.encoding != Encoding::Invalid
            && self.standalone != Standalone::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_full_declaration() {
        let decl = XmlDeclaration::parse(" version='1.0' encoding='UTF-8' standalone='yes'");
        assert_eq!(decl.version, Version::V1_0);
        assert_eq!(decl.encoding, Encoding::Utf8);
        assert_eq!(decl.standalone, Standalone::Yes);
        assert!(decl.is_valid());
    }

    #[test]
    fn test_optional_parts() {
        let decl = XmlDeclaration::parse(" version=\"1.0\" ");
        assert_eq!(decl.encoding, Encoding::None);
        assert_eq!(decl.standalone, Standalone::None);
        assert!(decl.is_valid());

        let decl = XmlDeclaration::parse(" version = '1.0'\n standalone=\"no\"");
        assert_eq!(decl.standalone, Standalone::No);
        assert!(decl.is_valid());

        assert!(XmlDeclaration::parse(" version='1.0' encoding='utf-8'").is_valid());
        assert_eq!(XmlDeclaration::new(), XmlDeclaration::parse(" version='1.0' encoding='UTF-8'"));
    }

    #[test]
    fn test_field_granularity() {
        let decl = XmlDeclaration::parse(" version='1.0' standalone='maybe'");
        assert_eq!(decl.version, Version::V1_0);
        assert_eq!(decl.standalone, Standalone::Invalid);
        assert!(!decl.is_valid());

        let decl = XmlDeclaration::parse(" version='1.1' encoding='latin1'");
        assert_eq!(decl.version, Version::Invalid);
        assert_eq!(decl.encoding, Encoding::Invalid);
        assert!(!decl.is_valid());
    }

    #[test]
    fn test_malformed_declarations() {
        for body in [
            "",
            " encoding='UTF-8'",
            " version='1.0' standalone='yes' encoding='UTF-8'",
            " version='1.0' version='1.0'",
            " version='1.0'encoding='UTF-8'",
            " version='1.0\"",
            " version=1.0",
            " version='1.0' foo='bar'",
            "version='1.0'",
        ] {
            assert!(!XmlDeclaration::parse(body).is_valid(), "{body:?}");
        }
    }
}
