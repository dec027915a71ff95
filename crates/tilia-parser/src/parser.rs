use tilia_errors::Diagnostic;
use tilia_language::{Action, Language, StateId, Symbol, Visibility};
use tilia_text::{Extent, InputCursor, TextRange, TextSize};
use tilia_tree::{GreenNode, NodeArena};

use crate::lexer::{Lexer, ScanKind, Scanned};
use crate::{Parsed, TableFault};

/// A subtree from the previous tree that may be pushed wholesale once the
/// cursor reaches its post-edit position.
#[derive(Clone, Debug)]
pub(crate) struct SpliceCandidate {
    pub(crate) new_start: TextSize,
    pub(crate) node: GreenNode,
}

#[derive(Clone)]
struct Entry {
    state: StateId,
    item: Item,
    /// Absolute position where the item's padding begins.
    start: Extent,
}

#[derive(Clone)]
enum Item {
    Sentinel,
    One(GreenNode),
    /// Children of a hidden rule, awaiting splice into the consuming parent.
    Many(Box<[GreenNode]>),
}

enum Recovered {
    Resume(Scanned),
    Finished(GreenNode),
}

/// The table-driven LR driver.
///
/// The stack holds `(state, subtree)` pairs above a sentinel carrying the
/// start state. Ubiquitous tokens the current state has no action for are
/// held pending and become the padding of the next shifted leaf; reductions
/// performed under end-of-input lookahead absorb whatever is still pending
/// as trailing children.
pub(crate) struct Parser<'a> {
    language: &'a Language,
    lexer: Lexer<'a>,
    arena: &'a mut NodeArena,
    stack: Vec<Entry>,
    pending: Vec<GreenNode>,
    pending_start: Extent,
    diagnostics: Vec<Diagnostic>,
    splices: Vec<SpliceCandidate>,
    next_splice: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        language: &'a Language,
        arena: &'a mut NodeArena,
        cursor: InputCursor,
    ) -> Self {
        Self {
            language,
            lexer: Lexer::new(language, cursor),
            arena,
            stack: vec![Entry { state: 0, item: Item::Sentinel, start: Extent::ZERO }],
            pending: Vec::new(),
            pending_start: Extent::ZERO,
            diagnostics: Vec::new(),
            splices: Vec::new(),
            next_splice: 0,
        }
    }

    pub(crate) fn set_splices(&mut self, splices: Vec<SpliceCandidate>) {
        self.splices = splices;
        self.next_splice = 0;
    }

    pub(crate) fn seek(&mut self, to: Extent) {
        self.lexer.seek(to);
    }

    /// Gives the cursor back without producing a tree; used when incremental
    /// seeding decides to start over from scratch.
    pub(crate) fn abandon(self) -> InputCursor {
        self.lexer.into_cursor()
    }

    fn state(&self) -> StateId {
        self.stack.last().expect("stack holds at least the sentinel").state
    }

    pub(crate) fn run(mut self) -> Result<(Parsed, InputCursor), TableFault> {
        let mut lookahead: Option<Scanned> = None;
        loop {
            let scanned = match lookahead.take() {
                Some(scanned) => scanned,
                None => {
                    self.try_splices()?;
                    self.next_terminal()
                }
            };

            let Some(symbol) = scanned.symbol() else {
                lookahead = Some(match self.recover(scanned)? {
                    Recovered::Resume(next) => next,
                    Recovered::Finished(root) => return Ok(self.finish_with(root)),
                });
                continue;
            };

            match self.language.action(self.state(), symbol) {
                Action::Shift(next) => self.shift(scanned, next),
                Action::Reduce(production) => {
                    self.reduce(production, scanned.kind == ScanKind::End)?;
                    lookahead = Some(scanned);
                }
                Action::Accept => return Ok(self.accept()),
                Action::Error => {
                    lookahead = Some(match self.recover(scanned)? {
                        Recovered::Resume(next) => next,
                        Recovered::Finished(root) => return Ok(self.finish_with(root)),
                    });
                }
            }
        }
    }

    /// Scans forward to the next token the parser will act on, banking
    /// ubiquitous tokens the current state cannot consume.
    fn next_terminal(&mut self) -> Scanned {
        loop {
            let scanned = self.lexer.scan(self.state());
            if let ScanKind::Token(symbol) = scanned.kind
                && self.language.is_ubiquitous(symbol)
                && self.language.action(self.state(), symbol) == Action::Error
            {
                let leaf = self.arena.token(symbol, Vec::new(), scanned.size);
                self.push_pending(leaf, scanned.start);
                continue;
            }
            return scanned;
        }
    }

    fn push_pending(&mut self, leaf: GreenNode, start: Extent) {
        if self.pending.is_empty() {
            self.pending_start = start;
        }
        self.pending.push(leaf);
    }

    fn shift(&mut self, scanned: Scanned, next: StateId) {
        let symbol = match scanned.kind {
            ScanKind::Token(symbol) => symbol,
            _ => unreachable!("only tokens are shifted"),
        };
        let padding = std::mem::take(&mut self.pending);
        let start = if padding.is_empty() { scanned.start } else { self.pending_start };
        let leaf = self.arena.token(symbol, padding, scanned.size);
        self.stack.push(Entry { state: next, item: Item::One(leaf), start });
    }

    fn reduce(&mut self, production: u16, at_eof: bool) -> Result<(), TableFault> {
        let production = self.language.production(production);
        let split = self
            .stack
            .len()
            .checked_sub(production.len as usize)
            .filter(|&split| split >= 1)
            .ok_or(TableFault::BadReduce { state: self.state() })?;
        let popped = self.stack.split_off(split);
        let start = popped.first().map_or_else(|| self.lexer.offset(), |entry| entry.start);

        let mut children = Vec::with_capacity(popped.len());
        for entry in popped {
            match entry.item {
                Item::One(node) => children.push(node),
                Item::Many(nodes) => children.extend(nodes),
                Item::Sentinel => unreachable!("sentinel below the reduction window"),
            }
        }
        if at_eof && !self.pending.is_empty() {
            children.append(&mut self.pending);
        }

        let item = match self.language.visibility(production.lhs) {
            Visibility::Auxiliary | Visibility::Hidden if children.len() == 1 => {
                Item::One(children.pop().expect("one child"))
            }
            Visibility::Hidden => Item::Many(children.into_boxed_slice()),
            _ => Item::One(self.arena.rule(production.lhs, children)),
        };

        let state = self.state();
        let Some(next) = self.language.goto(state, production.lhs) else {
            return Err(TableFault::MissingGoto {
                state,
                symbol: self.language.symbol_name(production.lhs).to_string(),
            });
        };
        self.stack.push(Entry { state: next, item, start });
        Ok(())
    }

    fn accept(mut self) -> (Parsed, InputCursor) {
        let entry = self.stack.pop().expect("accepting state has a result entry");
        let root = match entry.item {
            Item::One(node) => node,
            Item::Many(nodes) => self.arena.rule(self.language.root_symbol(), nodes.into_vec()),
            Item::Sentinel => unreachable!("accept with an empty stack"),
        };
        self.finish_with(root)
    }

    fn finish_with(mut self, mut root: GreenNode) -> (Parsed, InputCursor) {
        debug_assert_eq!(root.symbol(), self.language.root_symbol());
        if !self.pending.is_empty() {
            let mut children = root.children().to_vec();
            children.append(&mut self.pending);
            root = self.arena.rule(root.symbol(), children);
        }
        (Parsed { root, diagnostics: self.diagnostics }, self.lexer.into_cursor())
    }

    // ---- subtree replay (incremental seeding and splicing) ----

    /// Pushes an already-parsed subtree as if its tokens had just been read,
    /// performing whatever reductions the tables require first. Returns
    /// `false` — with the stack possibly advanced by those reductions — when
    /// the subtree cannot be placed; callers snapshot the stack if they need
    /// to retry lexically.
    pub(crate) fn replay(&mut self, node: &GreenNode, start: Extent) -> Result<bool, TableFault> {
        let symbol = node.symbol();
        if node.is_error() {
            return Ok(false);
        }
        if node.is_leaf()
            && self.language.is_ubiquitous(symbol)
            && self.language.action(self.state(), symbol) == Action::Error
        {
            self.push_pending(node.clone(), start);
            return Ok(true);
        }

        let lookahead = node.leftmost_terminal();
        // Unit-production cycles in a malformed table could spin; bail out.
        for _ in 0..64 {
            match self.language.action(self.state(), lookahead) {
                Action::Reduce(production) => self.reduce(production, false)?,
                Action::Shift(next) => {
                    if !self.pending.is_empty() {
                        // A reused subtree carries its own padding.
                        return Ok(false);
                    }
                    if node.is_leaf() {
                        self.stack.push(Entry { state: next, item: Item::One(node.clone()), start });
                        return Ok(true);
                    }
                    let Some(target) = self.language.goto(self.state(), symbol) else {
                        return Ok(false);
                    };
                    self.stack
                        .push(Entry { state: target, item: Item::One(node.clone()), start });
                    return Ok(true);
                }
                Action::Accept | Action::Error => return Ok(false),
            }
        }
        Ok(false)
    }

    fn try_splices(&mut self) -> Result<(), TableFault> {
        while let Some(candidate) = self.splices.get(self.next_splice).cloned() {
            let at = self.lexer.offset();
            if candidate.new_start < at.bytes {
                // The reparse consumed past this subtree; it no longer exists.
                self.next_splice += 1;
                continue;
            }
            if candidate.new_start > at.bytes {
                break;
            }
            self.next_splice += 1;
            debug_assert!(self.pending.is_empty(), "splice point inside a pending run");
            let snapshot = self.stack.clone();
            if self.replay(&candidate.node, at)? {
                self.lexer.seek(at + candidate.node.total());
            } else {
                self.stack = snapshot;
            }
        }
        Ok(())
    }

    // ---- error recovery ----

    /// Handles an Error action (or invalid token) at `first`.
    ///
    /// The strategy: find a stack state that can accept a synthesized ERROR
    /// in place of a subtree *and* then consume the current token; until one
    /// exists, absorb tokens into the error region. Stack entries above the
    /// recovery state are folded into the ERROR node.
    fn recover(&mut self, first: Scanned) -> Result<Recovered, TableFault> {
        let display = match first.kind {
            ScanKind::Invalid { failing } => failing.or(first.first_char),
            _ => first.first_char,
        };
        let entry_padding = std::mem::take(&mut self.pending);
        let content_start = first.start;

        let mut lookahead = first;
        loop {
            if let ScanKind::Token(symbol) = lookahead.kind
                && let Some(depth) = self.find_recovery(symbol)
            {
                let resume =
                    self.apply_recovery(depth, lookahead, content_start, entry_padding, display)?;
                return Ok(Recovered::Resume(resume));
            }

            if lookahead.kind == ScanKind::End {
                let root = self.forced_finish(content_start, entry_padding, display);
                return Ok(Recovered::Finished(root));
            }

            // The token joins the error region; ubiquitous leaves collected
            // on the way dissolve into it as well.
            self.pending.clear();
            lookahead = self.next_terminal();
        }
    }

    /// Deepest-first search for a state whose error goto can consume
    /// `symbol` after the reductions it triggers.
    fn find_recovery(&self, symbol: Symbol) -> Option<usize> {
        (0..self.stack.len()).rev().find(|&depth| {
            match self.language.error_goto(self.stack[depth].state) {
                Some(target) => self.can_consume(depth, target, symbol),
                None => false,
            }
        })
    }

    fn can_consume(&self, depth: usize, pushed: StateId, symbol: Symbol) -> bool {
        let mut states: Vec<StateId> =
            self.stack[..=depth].iter().map(|entry| entry.state).collect();
        states.push(pushed);
        for _ in 0..64 {
            match self.language.action(*states.last().expect("non-empty"), symbol) {
                Action::Shift(_) | Action::Accept => return true,
                Action::Reduce(production) => {
                    let production = self.language.production(production);
                    let keep = states.len().wrapping_sub(production.len as usize);
                    if keep < 1 || keep > states.len() {
                        return false;
                    }
                    states.truncate(keep);
                    match self.language.goto(*states.last().expect("non-empty"), production.lhs) {
                        Some(next) => states.push(next),
                        None => return false,
                    }
                }
                Action::Error => return false,
            }
        }
        false
    }

    fn apply_recovery(
        &mut self,
        depth: usize,
        lookahead: Scanned,
        content_start: Extent,
        entry_padding: Vec<GreenNode>,
        display: Option<char>,
    ) -> Result<Scanned, TableFault> {
        let popped = self.stack.split_off(depth + 1);
        let (content_start, padding) = match popped.first() {
            Some(entry) => {
                let node = match &entry.item {
                    Item::One(node) => node,
                    Item::Many(nodes) => &nodes[0],
                    Item::Sentinel => unreachable!("sentinel is never popped"),
                };
                // The first absorbed subtree donates its padding to the
                // ERROR; everything else dissolves into the error extent.
                (entry.start + node.padding(), node.padding_children().to_vec())
            }
            None => (content_start, entry_padding),
        };
        let end = if self.pending.is_empty() { lookahead.start } else { self.pending_start };

        let error =
            self.arena.error(self.language.error_symbol(), padding, end - content_start, display);
        self.push_diagnostic(display, content_start.bytes, end.bytes);

        let state = self.state();
        let target = self.language.error_goto(state).expect("found by find_recovery");
        let start = content_start - error.padding();
        self.stack.push(Entry { state: target, item: Item::One(error), start });
        Ok(lookahead)
    }

    /// No recovery point existed before end of input: the error runs to EOF
    /// and whatever is on the stack becomes the root's children.
    fn forced_finish(
        &mut self,
        content_start: Extent,
        entry_padding: Vec<GreenNode>,
        display: Option<char>,
    ) -> GreenNode {
        let end = if self.pending.is_empty() { self.lexer.offset() } else { self.pending_start };
        let error = self.arena.error(
            self.language.error_symbol(),
            entry_padding,
            end - content_start,
            display,
        );
        self.push_diagnostic(display, content_start.bytes, end.bytes);

        let mut children = Vec::new();
        for entry in self.stack.drain(1..) {
            match entry.item {
                Item::One(node) => children.push(node),
                Item::Many(nodes) => children.extend(nodes),
                Item::Sentinel => {}
            }
        }
        children.push(error);
        children.append(&mut self.pending);
        self.arena.rule(self.language.root_symbol(), children)
    }

    fn push_diagnostic(&mut self, display: Option<char>, start: TextSize, end: TextSize) {
        let message = match display {
            Some(ch) => format!("unexpected `{ch}`"),
            None => String::from("unexpected end of input"),
        };
        self.diagnostics.push(Diagnostic::error(message, TextRange::new(start, end)));
    }
}
