// SPDX-License-Identifier: Apache-2.0

//! Streams XML through the incremental reader in fixed-size chunks and
//! prints the constructs as they complete.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use picoxml::{
    Attribute, DocumentState, Event, ParseError, ReaderConfig, WriteError, XmlReader, XmlWriter,
};

#[derive(Parser, Debug)]
#[command(name = "picoxml-demo", about = "Incremental XML reader demo")]
struct Args {
    /// Bytes handed to the reader per write
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Fail on any unfinished token longer than this many characters
    #[arg(long)]
    max_token_len: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the events of an XML file
    Dump { file: PathBuf },
    /// Build a small document with the writer and read it back byte by byte
    Sample,
}

/// Prints events with indentation following the element depth
struct EventPrinter {
    depth: usize,
    count: usize,
}

impl EventPrinter {
    fn print(&mut self, event: &Event) {
        self.count += 1;
        if let Event::EndElement(_) = event {
            self.depth = self.depth.saturating_sub(1);
        }
        let indent = "  ".repeat(self.depth);
        match event {
            Event::XmlDeclaration(d) => println!(
                "{indent}XmlDeclaration {:?} {:?} {:?}",
                d.version, d.encoding, d.standalone
            ),
            Event::ProcessingInstruction { target, data } => {
                println!("{indent}ProcessingInstruction {target:?} {data:?}")
            }
            Event::DocumentType(name) => println!("{indent}DocumentType {name:?}"),
            Event::Comment(text) => println!("{indent}Comment {text:?}"),
            Event::StartElement { name, attributes } | Event::EmptyElement { name, attributes } => {
                let kind = if matches!(event, Event::StartElement { .. }) {
                    "StartElement"
                } else {
                    "EmptyElement"
                };
                println!("{indent}{kind} {name:?}");
                for attribute in attributes.iter() {
                    println!("{indent}  @{}={:?}", attribute.name(), attribute.value());
                }
            }
            Event::EndElement(name) => println!("{indent}EndElement {name:?}"),
            Event::Text(text) => println!("{indent}Text {text:?}"),
            Event::CData(text) => println!("{indent}CData {text:?}"),
        }
        if let Event::StartElement { .. } = event {
            self.depth += 1;
        }
    }
}

#[derive(Debug)]
enum DemoError {
    Io(io::Error),
    Parse(ParseError),
    /// Input ran out before the root element was closed
    Unfinished(DocumentState),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoError::Io(e) => write!(f, "read failed: {e}"),
            DemoError::Parse(e) => write!(f, "XML parsing failed: {e}"),
            DemoError::Unfinished(state) => write!(f, "input ended in {state:?}"),
        }
    }
}

impl From<io::Error> for DemoError {
    fn from(e: io::Error) -> Self {
        DemoError::Io(e)
    }
}

impl From<ParseError> for DemoError {
    fn from(e: ParseError) -> Self {
        DemoError::Parse(e)
    }
}

fn read_stream<R: Read>(
    mut source: R,
    chunk_size: usize,
    config: ReaderConfig,
    printer: &mut EventPrinter,
) -> Result<(), DemoError> {
    let mut reader = XmlReader::with_config(config);
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        log::debug!("Writing {n} bytes");
        reader.write(&chunk[..n]);
        while let Some(event) = reader.next_event()? {
            printer.print(&event);
        }
    }
    log::info!(
        "Input ended in {:?} with {} open element(s)",
        reader.document_state(),
        reader.open_elements().len()
    );
    match reader.document_state() {
        DocumentState::EndOfDocument => Ok(()),
        state => Err(DemoError::Unfinished(state)),
    }
}

fn build_sample() -> Result<String, WriteError> {
    let mut writer = XmlWriter::new();
    writer.write_xml_declaration()?;
    writer.write_document_type("inventory")?;
    writer.write_comment(" stock levels ")?;
    writer.write_start_of_element("inventory", &[Attribute::new("site", "north")])?;
    for (sku, qty) in [("A-100", "12"), ("B-205", "0")] {
        writer.write_empty_element(
            "item",
            &[Attribute::new("sku", sku), Attribute::new("qty", qty)],
        )?;
    }
    writer.write_start_of_element("note", &[])?;
    writer.write_text_node("Reorder &lt; 5 &amp; check ")?;
    writer.write_cdata_section("<supplier/>")?;
    writer.write_end_of_element()?;
    writer.write_end_of_element()?;
    Ok(writer.into_string())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let mut printer = EventPrinter { depth: 0, count: 0 };
    let config = ReaderConfig {
        max_token_len: args.max_token_len,
        ..Default::default()
    };

    let result = match &args.command {
        Command::Dump { file } => match File::open(file) {
            Ok(f) => read_stream(f, args.chunk_size, config, &mut printer),
            Err(e) => {
                eprintln!("Error: Unable to open file '{}': {}", file.display(), e);
                return ExitCode::FAILURE;
            }
        },
        Command::Sample => match build_sample() {
            Ok(xml) => {
                println!("{xml}");
                println!();
                // Byte by byte, regardless of --chunk-size
                read_stream(xml.as_bytes(), 1, config, &mut printer)
            }
            Err(e) => {
                eprintln!("Error: Writer refused sample document: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(()) => {
            println!("{} events", printer.count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e} after {} events", printer.count);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl Read for FailingSource {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    fn printer() -> EventPrinter {
        EventPrinter { depth: 0, count: 0 }
    }

    #[test]
    fn test_complete_document_succeeds() {
        let mut printer = printer();
        let result = read_stream(&b"<a><b/></a>"[..], 3, ReaderConfig::default(), &mut printer);
        assert!(result.is_ok());
        assert_eq!(printer.count, 3);
    }

    #[test]
    fn test_truncated_document_fails() {
        let result = read_stream(&b"<a><b/>"[..], 4, ReaderConfig::default(), &mut printer());
        assert!(matches!(
            result,
            Err(DemoError::Unfinished(DocumentState::Element))
        ));
        let result = read_stream(&b""[..], 4, ReaderConfig::default(), &mut printer());
        assert!(matches!(result, Err(DemoError::Unfinished(_))));
    }

    #[test]
    fn test_read_error_fails() {
        let result = read_stream(FailingSource, 4, ReaderConfig::default(), &mut printer());
        assert!(matches!(result, Err(DemoError::Io(_))));
    }

    #[test]
    fn test_sample_reads_back() {
        let xml = build_sample().unwrap();
        assert!(read_stream(xml.as_bytes(), 1, ReaderConfig::default(), &mut printer()).is_ok());
    }
}
