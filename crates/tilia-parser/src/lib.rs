//! The parsing engine: a table-driven lexer, an LR parser with panic-mode
//! error recovery, and the incremental reparser that reuses subtrees of the
//! previous tree across edits.

mod incremental;
mod lexer;
mod parser;

use tilia_errors::Diagnostic;
use tilia_language::{Language, StateId};
use tilia_text::{Extent, InputCursor, TextEdit};
use tilia_tree::{GreenNode, NodeArena};

/// A finished parse: the new root plus the diagnostics recovery recorded.
#[derive(Debug)]
pub struct Parsed {
    pub(crate) root: GreenNode,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    pub fn root(&self) -> &GreenNode {
        &self.root
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (GreenNode, Vec<Diagnostic>) {
        (self.root, self.diagnostics)
    }
}

/// Fatal table faults. Parse errors in the *input* never surface here — they
/// become ERROR nodes — but a language whose tables dead-end mid-reduction
/// aborts the operation and leaves the caller's previous tree intact.
#[derive(Debug, thiserror::Error)]
pub enum TableFault {
    #[error("parse table corruption: no goto from state {state} on `{symbol}`")]
    MissingGoto { state: StateId, symbol: String },
    #[error("parse table corruption: reduction in state {state} pops past the stack bottom")]
    BadReduce { state: StateId },
}

/// Parses the input from the beginning.
pub fn parse(
    language: &Language,
    arena: &mut NodeArena,
    cursor: InputCursor,
) -> Result<(Parsed, InputCursor), TableFault> {
    let mut parser = parser::Parser::new(language, arena, cursor);
    parser.seek(Extent::ZERO);
    parser.run()
}

/// Re-parses after `edit`, reusing unchanged subtrees of `old_root` by
/// reference wherever the parse states line up.
pub fn reparse(
    language: &Language,
    arena: &mut NodeArena,
    old_root: &GreenNode,
    edit: TextEdit,
    cursor: InputCursor,
) -> Result<(Parsed, InputCursor), TableFault> {
    incremental::reparse(language, arena, old_root, edit, cursor)
}
