// SPDX-License-Identifier: Apache-2.0

//! An incremental, non-blocking XML reader and a matching writer.
//!
//! The reader accepts input in arbitrary byte chunks, as it arrives from a
//! socket or serial link, and never blocks: when a construct is incomplete
//! it reports [`ParsingResult::NeedMoreData`] and picks up where it left off
//! after the next [`XmlReader::write`].
//!
//! ```rust
//! use picoxml::{Event, XmlReader};
//!
//! let mut reader = XmlReader::new();
//! let mut names = Vec::new();
//! for chunk in ["<?xml version='1.0'?><li", "st><item/><it", "em/></list>"] {
//!     reader.write(chunk.as_bytes());
//!     while let Some(event) = reader.next_event()? {
//!         if let Event::EmptyElement { name, .. } = event {
//!             names.push(name.to_string());
//!         }
//!     }
//! }
//! assert_eq!(names, ["item", "item"]);
//! # Ok::<(), picoxml::ParseError>(())
//! ```
//!
//! The layers underneath are public for callers that need them: [`utf8`]
//! (incremental decoding), [`buffer`] (the compactable code point buffer),
//! [`token`] (single-construct parsers) and [`chars`] (XML character classes
//! and string validators).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod buffer;
pub mod chars;
pub mod escape;
pub mod token;
pub mod utf8;

mod attribute;
mod config;
mod declaration;
mod parse_error;
mod reader;
mod writer;

pub use attribute::{Attribute, AttributeList, Quote};
pub use config::ReaderConfig;
pub use declaration::{Encoding, Standalone, Version, XmlDeclaration};
pub use parse_error::ParseError;
pub use reader::{DocumentState, Event, ParsingResult, ProcessingInstruction, XmlReader};
pub use writer::{WriteError, WriterState, XmlWriter};
