//! The document: one language, one input, one current tree.
//!
//! A `Document` owns the node arena and coordinates the parser. Readers take
//! refcounted [`SyntaxNode`] handles from [`Document::root_node`]; a handle
//! stays valid across any number of later edits because published nodes are
//! immutable and shared.

use tilia_errors::Diagnostic;
use tilia_language::Language;
use tilia_text::{Input, InputCursor, TextEdit};
use tilia_tree::{GreenNode, NodeArena, SyntaxNode};
use triomphe::Arc;

pub use tilia_parser::TableFault;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("language tables are malformed: {0}")]
    MalformedLanguage(String),
    /// A fatal table fault poisoned the input stream; the previous tree and
    /// diagnostics are still available, but further parsing needs fresh
    /// input.
    #[error(transparent)]
    Tables(#[from] TableFault),
}

#[derive(Default)]
pub struct Document {
    language: Option<Arc<Language>>,
    cursor: Option<InputCursor>,
    arena: NodeArena,
    root: Option<GreenNode>,
    diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the language and re-parses if input is present. The tables
    /// are bounds-checked once here; a malformed language is rejected
    /// without touching the current tree.
    pub fn set_language(&mut self, language: Arc<Language>) -> Result<(), DocumentError> {
        language.validate().map_err(DocumentError::MalformedLanguage)?;
        self.language = Some(language);
        self.root = None;
        self.diagnostics.clear();
        self.parse_if_ready()
    }

    /// Installs a new input and parses it from scratch.
    pub fn set_input(&mut self, input: Input) -> Result<(), DocumentError> {
        self.cursor = Some(InputCursor::new(input));
        self.root = None;
        self.diagnostics.clear();
        self.parse_if_ready()
    }

    /// Applies an edit descriptor after the caller has changed the
    /// underlying text, re-parsing incrementally. A no-op edit publishes the
    /// identical root.
    pub fn edit(&mut self, edit: TextEdit) -> Result<(), DocumentError> {
        if edit.is_noop() {
            return Ok(());
        }
        let (Some(language), Some(root)) = (self.language.clone(), self.root.clone()) else {
            return Ok(());
        };
        let Some(mut cursor) = self.cursor.take() else {
            return Ok(());
        };
        cursor.invalidate();
        match tilia_parser::reparse(&language, &mut self.arena, &root, edit, cursor) {
            Ok((parsed, cursor)) => {
                self.cursor = Some(cursor);
                let (root, diagnostics) = parsed.into_parts();
                self.root = Some(root);
                self.diagnostics = diagnostics;
                Ok(())
            }
            Err(fault) => Err(fault.into()),
        }
    }

    /// A refcounted handle to the current root, or `None` before the first
    /// successful parse.
    pub fn root_node(&self) -> Option<SyntaxNode> {
        let root = self.root.clone()?;
        let language = self.language.clone()?;
        Some(SyntaxNode::new_root(root, language))
    }

    /// Diagnostics recorded by error recovery during the last parse.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn language(&self) -> Option<&Arc<Language>> {
        self.language.as_ref()
    }

    fn parse_if_ready(&mut self) -> Result<(), DocumentError> {
        let Some(language) = self.language.clone() else { return Ok(()) };
        let Some(cursor) = self.cursor.take() else { return Ok(()) };
        match tilia_parser::parse(&language, &mut self.arena, cursor) {
            Ok((parsed, cursor)) => {
                self.cursor = Some(cursor);
                let (root, diagnostics) = parsed.into_parts();
                self.root = Some(root);
                self.diagnostics = diagnostics;
                Ok(())
            }
            Err(fault) => Err(fault.into()),
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("language", &self.language.as_ref().map(|language| language.name()))
            .field("has_tree", &self.root.is_some())
            .finish_non_exhaustive()
    }
}
