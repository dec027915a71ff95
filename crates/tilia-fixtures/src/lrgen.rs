//! Builds SLR(1) action/goto tables from a grammar description.
//!
//! Fixture grammars are tiny, so the construction favors clarity: LR(0) item
//! sets with FOLLOW-based reductions, shift preferred over reduce, and a
//! panic on any remaining conflict — a fixture grammar that is not SLR(1) is
//! a bug in the fixture, not something to paper over at runtime.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tilia_language::{
    Action, Language, Production, StateId, Symbol, SymbolInfo, SymbolSet, Visibility,
};

use crate::lexgen::{TokenRule, build_lexer};

pub struct GrammarSpec {
    pub name: &'static str,
    /// Index 0 must be the end-of-input marker.
    pub symbols: Vec<SymbolInfo>,
    pub root: Symbol,
    pub error: Symbol,
    /// The nonterminal a synthesized ERROR node stands in for.
    pub recovery: Symbol,
    pub ubiquitous: Vec<Symbol>,
    pub rules: Vec<(Symbol, Vec<Symbol>)>,
    pub tokens: Vec<TokenRule>,
}

/// One LR(0) item: a production index and a dot position. The augmented
/// start production lives at index `rules.len()`.
type Item = (usize, usize);

pub fn build(spec: GrammarSpec) -> Language {
    let GrammarSpec { name, symbols, root, error, recovery, ubiquitous, rules, tokens } = spec;

    let symbol_count = symbols.len();
    let nonterminal = |symbol: Symbol| rules.iter().any(|(lhs, _)| *lhs == symbol);

    for (lhs, rhs) in &rules {
        assert!(!rhs.is_empty(), "empty production for {:?}", symbols[lhs.index()].name);
    }

    // FIRST sets; no epsilon productions, so FIRST of a string is FIRST of
    // its head.
    let mut first: Vec<BTreeSet<Symbol>> = vec![BTreeSet::new(); symbol_count];
    for index in 0..symbol_count {
        let symbol = Symbol::new(index as u16);
        if !nonterminal(symbol) {
            first[index].insert(symbol);
        }
    }
    loop {
        let mut changed = false;
        for (lhs, rhs) in &rules {
            let head = first[rhs[0].index()].clone();
            let target = &mut first[lhs.index()];
            for symbol in head {
                changed |= target.insert(symbol);
            }
        }
        if !changed {
            break;
        }
    }

    let mut follow: Vec<BTreeSet<Symbol>> = vec![BTreeSet::new(); symbol_count];
    follow[root.index()].insert(Symbol::END);
    loop {
        let mut changed = false;
        for (lhs, rhs) in &rules {
            for (position, symbol) in rhs.iter().enumerate() {
                if !nonterminal(*symbol) {
                    continue;
                }
                let additions: BTreeSet<Symbol> = match rhs.get(position + 1) {
                    Some(next) => first[next.index()].clone(),
                    None => follow[lhs.index()].clone(),
                };
                let target = &mut follow[symbol.index()];
                for addition in additions {
                    changed |= target.insert(addition);
                }
            }
        }
        if !changed {
            break;
        }
    }

    // Canonical LR(0) collection. The closure adds every production of a
    // nonterminal after the dot.
    let augmented = rules.len();
    let rhs_of = |production: usize| {
        if production == augmented { std::slice::from_ref(&root) } else { rules[production].1.as_slice() }
    };
    let closure = |kernel: BTreeSet<Item>| -> BTreeSet<Item> {
        let mut set = kernel;
        loop {
            let mut additions = BTreeSet::new();
            for &(production, dot) in &set {
                if let Some(&symbol) = rhs_of(production).get(dot)
                    && nonterminal(symbol)
                {
                    for (candidate, (lhs, _)) in rules.iter().enumerate() {
                        if *lhs == symbol && !set.contains(&(candidate, 0)) {
                            additions.insert((candidate, 0));
                        }
                    }
                }
            }
            if additions.is_empty() {
                break set;
            }
            set.extend(additions);
        }
    };

    let mut states: Vec<BTreeSet<Item>> = vec![closure(BTreeSet::from([(augmented, 0)]))];
    let mut ids: FxHashMap<BTreeSet<Item>, StateId> = FxHashMap::default();
    ids.insert(states[0].clone(), 0);
    let mut transitions: Vec<FxHashMap<Symbol, StateId>> = vec![FxHashMap::default()];

    let mut pending = 0;
    while pending < states.len() {
        let state = states[pending].clone();
        let mut by_symbol: FxHashMap<Symbol, BTreeSet<Item>> = FxHashMap::default();
        for &(production, dot) in &state {
            if let Some(&symbol) = rhs_of(production).get(dot) {
                by_symbol.entry(symbol).or_default().insert((production, dot + 1));
            }
        }
        for (symbol, kernel) in by_symbol {
            let successor = closure(kernel);
            let id = *ids.entry(successor.clone()).or_insert_with(|| {
                states.push(successor);
                transitions.push(FxHashMap::default());
                (states.len() - 1) as StateId
            });
            transitions[pending].insert(symbol, id);
        }
        pending += 1;
    }

    // Tables.
    let state_count = states.len();
    let mut actions: Vec<Box<[Action]>> = Vec::with_capacity(state_count);
    let mut gotos: Vec<Box<[Option<StateId>]>> = Vec::with_capacity(state_count);
    let mut error_goto: Vec<Option<StateId>> = Vec::with_capacity(state_count);

    for (id, state) in states.iter().enumerate() {
        let mut action_row = vec![Action::Error; symbol_count].into_boxed_slice();
        let mut goto_row = vec![None; symbol_count].into_boxed_slice();

        for (&symbol, &target) in &transitions[id] {
            if nonterminal(symbol) {
                goto_row[symbol.index()] = Some(target);
            } else {
                action_row[symbol.index()] = Action::Shift(target);
            }
        }

        for &(production, dot) in state {
            if dot != rhs_of(production).len() {
                continue;
            }
            if production == augmented {
                action_row[Symbol::END.index()] = Action::Accept;
                continue;
            }
            let lhs = rules[production].0;
            for &lookahead in &follow[lhs.index()] {
                match action_row[lookahead.index()] {
                    Action::Error => action_row[lookahead.index()] = Action::Reduce(production as u16),
                    // Shift preference resolves the optional-terminator
                    // style of ambiguity.
                    Action::Shift(_) | Action::Accept => {}
                    Action::Reduce(existing) => panic!(
                        "{name}: reduce/reduce conflict in state {id} on `{}` \
                         between productions {existing} and {production}",
                        symbols[lookahead.index()].name
                    ),
                }
            }
        }

        error_goto.push(goto_row[recovery.index()]);
        actions.push(action_row);
        gotos.push(goto_row);
    }

    let productions =
        rules.iter().map(|(lhs, rhs)| Production::new(*lhs, rhs.len() as u8)).collect();

    let language = Language::new(
        name,
        symbols,
        ubiquitous.into_iter().collect::<SymbolSet>(),
        productions,
        actions,
        gotos,
        error_goto,
        vec![0; state_count],
        build_lexer(&tokens),
        root,
        error,
    );
    if let Err(fault) = language.validate() {
        panic!("{name}: generated tables failed validation: {fault}");
    }
    language
}

/// Convenience for declaring symbol tables alongside their constants.
pub fn end_symbol() -> SymbolInfo {
    SymbolInfo::new("end", Visibility::Hidden)
}
