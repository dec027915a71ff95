//! Precompiled language descriptions: symbols, parse actions, goto states
//! and the lexical automaton. The parser treats all of this as plain data.

mod symbol;
mod symbol_set;
mod tables;

use rustc_hash::FxHashMap;

pub use symbol::{Symbol, SymbolInfo, Visibility};
pub use symbol_set::SymbolSet;
pub use tables::{Action, LexEdge, LexState, LexTable, Production, StateId};

/// A complete language: everything the lexer and parser dispatch on.
///
/// The table layout mirrors what a grammar compiler would emit; this crate
/// only defines the runtime format and bounds-checks it once up front.
pub struct Language {
    name: Box<str>,
    symbols: Box<[SymbolInfo]>,
    names: FxHashMap<Box<str>, Symbol>,
    ubiquitous: SymbolSet,
    productions: Box<[Production]>,
    /// Per parse state, indexed by symbol: the action for terminals.
    actions: Box<[Box<[Action]>]>,
    /// Per parse state, indexed by symbol: the successor for nonterminals.
    gotos: Box<[Box<[Option<StateId>]>]>,
    /// Per parse state: where the built-in error symbol goes, for states
    /// that can accept a synthesized ERROR in place of a real subtree.
    error_goto: Box<[Option<StateId>]>,
    /// Per parse state: the lexical DFA start state.
    lex_modes: Box<[u16]>,
    lex: LexTable,
    root: Symbol,
    error: Symbol,
}

impl Language {
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<Box<str>>,
        symbols: Vec<SymbolInfo>,
        ubiquitous: SymbolSet,
        productions: Vec<Production>,
        actions: Vec<Box<[Action]>>,
        gotos: Vec<Box<[Option<StateId>]>>,
        error_goto: Vec<Option<StateId>>,
        lex_modes: Vec<u16>,
        lex: LexTable,
        root: Symbol,
        error: Symbol,
    ) -> Self {
        let names = symbols
            .iter()
            .enumerate()
            .map(|(index, info)| (info.name.clone(), Symbol::new(index as u16)))
            .collect();
        Self {
            name: name.into(),
            symbols: symbols.into_boxed_slice(),
            names,
            ubiquitous,
            productions: productions.into_boxed_slice(),
            actions: actions.into_boxed_slice(),
            gotos: gotos.into_boxed_slice(),
            error_goto: error_goto.into_boxed_slice(),
            lex_modes: lex_modes.into_boxed_slice(),
            lex,
            root,
            error,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        &self.symbols[symbol.index()].name
    }

    pub fn symbol_named(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).copied()
    }

    pub fn visibility(&self, symbol: Symbol) -> Visibility {
        self.symbols[symbol.index()].visibility
    }

    pub fn is_ubiquitous(&self, symbol: Symbol) -> bool {
        self.ubiquitous.contains(symbol)
    }

    pub fn root_symbol(&self) -> Symbol {
        self.root
    }

    pub fn error_symbol(&self) -> Symbol {
        self.error
    }

    pub fn production(&self, id: u16) -> Production {
        self.productions[id as usize]
    }

    pub fn action(&self, state: StateId, symbol: Symbol) -> Action {
        self.actions[state as usize][symbol.index()]
    }

    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.gotos[state as usize][symbol.index()]
    }

    pub fn error_goto(&self, state: StateId) -> Option<StateId> {
        self.error_goto[state as usize]
    }

    pub fn lex_mode(&self, state: StateId) -> u16 {
        self.lex_modes[state as usize]
    }

    pub fn lex(&self) -> &LexTable {
        &self.lex
    }

    /// Bounds-checks every table entry once, so the hot paths can index
    /// without further checks. A language failing validation must not be
    /// handed to a parser.
    pub fn validate(&self) -> Result<(), String> {
        let states = self.actions.len();
        let symbols = self.symbols.len();

        if self.gotos.len() != states || self.error_goto.len() != states {
            return Err("action/goto tables disagree on state count".into());
        }
        if self.lex_modes.len() != states {
            return Err("missing lexical mode for some parse state".into());
        }
        if self.root.index() >= symbols || self.error.index() >= symbols {
            return Err("root or error symbol out of range".into());
        }

        for (state, row) in self.actions.iter().enumerate() {
            if row.len() != symbols {
                return Err(format!("action row {state} has wrong width"));
            }
            for action in row {
                match *action {
                    Action::Shift(next) if (next as usize) >= states => {
                        return Err(format!("shift out of range in state {state}"));
                    }
                    Action::Reduce(production)
                        if (production as usize) >= self.productions.len() =>
                    {
                        return Err(format!("reduce out of range in state {state}"));
                    }
                    _ => {}
                }
            }
        }
        for (state, row) in self.gotos.iter().enumerate() {
            if row.len() != symbols {
                return Err(format!("goto row {state} has wrong width"));
            }
            for target in row.iter().chain([&self.error_goto[state]]) {
                if let Some(target) = target
                    && (*target as usize) >= states
                {
                    return Err(format!("goto out of range in state {state}"));
                }
            }
        }
        for production in &self.productions {
            if production.lhs.index() >= symbols {
                return Err("production lhs out of range".into());
            }
        }
        for mode in &self.lex_modes {
            if (*mode as usize) >= self.lex.state_count() {
                return Err("lexical mode out of range".into());
            }
        }
        for state in 0..self.lex.state_count() {
            for edge in self.lex.edges(state as u16) {
                if (edge.target as usize) >= self.lex.state_count() {
                    return Err("lexical transition out of range".into());
                }
            }
            if let Some(accept) = self.lex.accept(state as u16)
                && accept.index() >= symbols
            {
                return Err("lexical accept symbol out of range".into());
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name)
            .field("symbols", &self.symbols.len())
            .field("states", &self.actions.len())
            .finish_non_exhaustive()
    }
}
