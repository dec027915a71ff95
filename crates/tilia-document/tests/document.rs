//! Document lifecycle: wiring inputs and languages, diagnostics, and
//! non-UTF-8 input encodings.

use text_size::TextSize;
use tilia_document::Document;
use tilia_fixtures::{SpyInput, grammars};
use tilia_text::{Encoding, Input, InputError, TextRead};
use triomphe::Arc;

#[test]
fn no_tree_before_language_and_input() {
    let mut document = Document::new();
    assert!(document.root_node().is_none());

    document.set_language(Arc::new(grammars::json())).expect("tables validate");
    assert!(document.root_node().is_none());

    let spy = SpyInput::new("[1]", 3);
    document.set_input(spy.input()).expect("parse succeeds");
    let root = document.root_node().expect("tree exists");
    assert_eq!(root.to_string(), "(DOCUMENT (array (number)))");
}

#[test]
fn input_before_language_parses_on_language() {
    let mut document = Document::new();
    let spy = SpyInput::new("[1]", 3);
    document.set_input(spy.input()).expect("nothing to parse yet");
    assert!(document.root_node().is_none());

    document.set_language(Arc::new(grammars::json())).expect("tables validate");
    assert!(document.root_node().is_some());
}

#[test]
fn recovery_surfaces_diagnostics() {
    let mut document = Document::new();
    document.set_language(Arc::new(grammars::json())).expect("tables validate");
    let spy = SpyInput::new("  [123, , true]", 3);
    document.set_input(spy.input()).expect("parse succeeds");

    let diagnostics = document.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "unexpected `,`");

    let rendered = diagnostics[0]
        .render(&tilia_errors::Renderer::plain(), "sample.json", &spy.text())
        .to_string();
    assert!(rendered.contains("unexpected `,`"));
}

struct TruncatedText {
    bytes: &'static [u8],
}

impl TextRead for TruncatedText {
    fn read(&mut self, byte_offset: TextSize) -> Result<Vec<u8>, InputError> {
        let start = usize::from(byte_offset);
        if start >= self.bytes.len() {
            return Err(InputError::Read { offset: byte_offset });
        }
        Ok(self.bytes[start..(start + 2).min(self.bytes.len())].to_vec())
    }
}

#[test]
fn read_failure_truncates_into_an_error() {
    let mut document = Document::new();
    document.set_language(Arc::new(grammars::json())).expect("tables validate");
    document
        .set_input(Input::new(TruncatedText { bytes: b"[tru" }))
        .expect("parse treats the failure as end of input");

    let root = document.root_node().expect("tree exists");
    assert_eq!(root.to_string(), "(DOCUMENT (ERROR 't'))");
    assert_eq!(root.size().bytes, TextSize::new(4));
}

struct Utf16Text {
    bytes: Vec<u8>,
}

impl Utf16Text {
    fn new(text: &str) -> Self {
        Self { bytes: text.encode_utf16().flat_map(u16::to_le_bytes).collect() }
    }
}

impl TextRead for Utf16Text {
    fn read(&mut self, byte_offset: TextSize) -> Result<Vec<u8>, InputError> {
        let start = usize::from(byte_offset).min(self.bytes.len());
        let end = (start + 4).min(self.bytes.len());
        Ok(self.bytes[start..end].to_vec())
    }
}

#[test]
fn utf16_input_counts_source_bytes() {
    let mut document = Document::new();
    document.set_language(Arc::new(grammars::json())).expect("tables validate");
    document
        .set_input(Input::new(Utf16Text::new("[12, true]")).with_encoding(Encoding::Utf16))
        .expect("parse succeeds");

    let root = document.root_node().expect("tree exists");
    assert_eq!(root.to_string(), "(DOCUMENT (array (number) (true)))");
    // Ten characters, two bytes each in the source encoding.
    assert_eq!(root.size().bytes, TextSize::new(20));
    assert_eq!(root.size().chars, TextSize::new(10));
}
