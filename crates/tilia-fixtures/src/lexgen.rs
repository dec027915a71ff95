//! Builds lexical DFA tables from a list of token patterns.
//!
//! The pattern language covers what the fixture grammars need: literals,
//! repeated character classes, identifier-shaped tokens, line comments and
//! quoted strings. Patterns compile to one NFA, which subset construction
//! turns into the byte-driven [`LexTable`] the runtime consumes. Earlier
//! rules win when two accept the same text at the same length.

use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;
use tilia_language::{LexEdge, LexState, LexTable, Symbol};

#[derive(Clone)]
pub struct TokenRule {
    pub symbol: Symbol,
    pub pattern: Pattern,
}

impl TokenRule {
    pub fn new(symbol: Symbol, pattern: Pattern) -> Self {
        Self { symbol, pattern }
    }
}

#[derive(Clone)]
pub enum Pattern {
    /// The exact byte sequence.
    Literal(&'static str),
    /// One or more bytes of the class.
    Repeat(Class),
    /// One `first` byte run, then any number of `rest` runs. Multi-byte
    /// scalars enter through their lead/continuation ranges.
    Ident { first: Class, rest: Class },
    /// The prefix, then anything up to (not including) the next newline.
    /// Terminates at end of input as well.
    LineComment(&'static str),
    /// A `"`-delimited string with backslash escapes.
    Quoted,
}

/// A set of byte ranges, inclusive on both ends.
#[derive(Clone, Default)]
pub struct Class {
    ranges: Vec<(u8, u8)>,
}

impl Class {
    pub fn new(ranges: &[(u8, u8)]) -> Self {
        Self { ranges: ranges.to_vec() }
    }

    pub fn union(mut self, other: &Class) -> Self {
        self.ranges.extend_from_slice(&other.ranges);
        self
    }

    pub fn digits() -> Self {
        Self::new(&[(b'0', b'9')])
    }

    /// ASCII letters plus every UTF-8 lead/continuation byte, so any
    /// non-ASCII scalar counts as a letter.
    pub fn letters() -> Self {
        Self::new(&[(b'A', b'Z'), (b'a', b'z'), (b'_', b'_'), (0x80, 0xF4)])
    }

    pub fn whitespace() -> Self {
        Self::new(&[(b'\t', b'\t'), (b' ', b' ')])
    }

    pub fn newlines() -> Self {
        Self::new(&[(b'\n', b'\n'), (b'\r', b'\r')])
    }

    pub fn blank() -> Self {
        Self::whitespace().union(&Self::newlines())
    }
}

struct NfaState {
    edges: Vec<(u8, u8, Idx<NfaState>)>,
    /// `(rule_priority, symbol)`; lower priority wins on ties.
    accept: Option<(usize, Symbol)>,
}

fn nfa_state(nfa: &mut Arena<NfaState>) -> Idx<NfaState> {
    nfa.alloc(NfaState { edges: Vec::new(), accept: None })
}

/// Any byte except `\n`.
fn not_newline() -> Vec<(u8, u8)> {
    vec![(0x00, 0x09), (0x0B, 0xFF)]
}

pub fn build_lexer(rules: &[TokenRule]) -> LexTable {
    let mut nfa: Arena<NfaState> = Arena::default();
    let start = nfa_state(&mut nfa);

    for (priority, rule) in rules.iter().enumerate() {
        let accept = Some((priority, rule.symbol));
        match &rule.pattern {
            Pattern::Literal(text) => {
                let mut at = start;
                for &byte in text.as_bytes() {
                    let next = nfa_state(&mut nfa);
                    nfa[at].edges.push((byte, byte, next));
                    at = next;
                }
                nfa[at].accept = accept;
            }
            Pattern::Repeat(class) => {
                let body = nfa_state(&mut nfa);
                for &(lo, hi) in &class.ranges {
                    nfa[start].edges.push((lo, hi, body));
                    nfa[body].edges.push((lo, hi, body));
                }
                nfa[body].accept = accept;
            }
            Pattern::Ident { first, rest } => {
                let body = nfa_state(&mut nfa);
                for &(lo, hi) in &first.ranges {
                    nfa[start].edges.push((lo, hi, body));
                }
                for &(lo, hi) in &rest.ranges {
                    nfa[body].edges.push((lo, hi, body));
                }
                nfa[body].accept = accept;
            }
            Pattern::LineComment(prefix) => {
                let mut at = start;
                for &byte in prefix.as_bytes() {
                    let next = nfa_state(&mut nfa);
                    nfa[at].edges.push((byte, byte, next));
                    at = next;
                }
                nfa[at].accept = accept;
                for (lo, hi) in not_newline() {
                    nfa[at].edges.push((lo, hi, at));
                }
            }
            Pattern::Quoted => {
                let body = nfa_state(&mut nfa);
                let escape = nfa_state(&mut nfa);
                let done = nfa_state(&mut nfa);
                nfa[start].edges.push((b'"', b'"', body));
                // Anything except the quote and the backslash stays in the
                // body; the backslash escapes one arbitrary byte.
                for (lo, hi) in [(0x00, 0x21), (0x23, 0x5B), (0x5D, 0xFF)] {
                    nfa[body].edges.push((lo, hi, body));
                }
                nfa[body].edges.push((b'\\', b'\\', escape));
                nfa[escape].edges.push((0x00, 0xFF, body));
                nfa[body].edges.push((b'"', b'"', done));
                nfa[done].accept = accept;
            }
        }
    }

    subset_construction(&nfa, start)
}

fn subset_construction(nfa: &Arena<NfaState>, start: Idx<NfaState>) -> LexTable {
    let mut ids: FxHashMap<Vec<Idx<NfaState>>, u16> = FxHashMap::default();
    let mut sets: Vec<Vec<Idx<NfaState>>> = Vec::new();
    let mut states: Vec<LexState> = Vec::new();

    ids.insert(vec![start], 0);
    sets.push(vec![start]);
    states.push(LexState::default());

    let mut pending = 0;
    while pending < sets.len() {
        let set = sets[pending].clone();

        let accept = set
            .iter()
            .filter_map(|&idx| nfa[idx].accept)
            .min_by_key(|&(priority, _)| priority)
            .map(|(_, symbol)| symbol);

        // Split the byte space at every edge boundary, then resolve each
        // elementary interval to its successor set.
        let mut bounds = vec![0u16, 256];
        for &idx in &set {
            for &(lo, hi, _) in &nfa[idx].edges {
                bounds.push(lo as u16);
                bounds.push(hi as u16 + 1);
            }
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut edges = Vec::new();
        for pair in bounds.windows(2) {
            let (lo, hi) = (pair[0] as u8, (pair[1] - 1) as u8);
            let mut target: Vec<Idx<NfaState>> = set
                .iter()
                .flat_map(|&idx| nfa[idx].edges.iter())
                .filter(|&&(elo, ehi, _)| elo <= lo && hi <= ehi)
                .map(|&(_, _, to)| to)
                .collect();
            if target.is_empty() {
                continue;
            }
            target.sort_unstable_by_key(|idx| u32::from(idx.into_raw()));
            target.dedup();

            let next = *ids.entry(target.clone()).or_insert_with(|| {
                sets.push(target);
                states.push(LexState::default());
                (sets.len() - 1) as u16
            });

            match edges.last_mut() {
                Some(LexEdge { hi: prev_hi, target: prev_target, .. })
                    if *prev_target == next && *prev_hi as u16 + 1 == lo as u16 =>
                {
                    *prev_hi = hi;
                }
                _ => edges.push(LexEdge { lo, hi, target: next }),
            }
        }

        states[pending] = LexState { accept, edges: edges.into_boxed_slice() };
        pending += 1;
    }

    LexTable::new(states)
}
