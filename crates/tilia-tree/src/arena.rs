use rustc_hash::FxHashMap;
use tilia_language::Symbol;
use tilia_text::Extent;

use crate::GreenNode;

/// Allocates green nodes for one document.
///
/// Allocation is a single refcounted allocation per node. Plain tokens — no
/// leading ubiquitous material — are interned, so the many identical
/// punctuation and whitespace leaves of a document share storage across the
/// whole edit history. Nodes the current tree no longer reaches are freed by
/// the refcount once the last external handle drops.
pub struct NodeArena {
    tokens: FxHashMap<(Symbol, Extent), GreenNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { tokens: FxHashMap::default() }
    }

    /// A token leaf carrying the ubiquitous leaves that preceded it.
    pub fn token(
        &mut self,
        symbol: Symbol,
        padding_children: Vec<GreenNode>,
        size: Extent,
    ) -> GreenNode {
        if padding_children.is_empty() {
            return self
                .tokens
                .entry((symbol, size))
                .or_insert_with(|| GreenNode::token(symbol, Vec::new(), size))
                .clone();
        }
        GreenNode::token(symbol, padding_children, size)
    }

    pub fn rule(&mut self, symbol: Symbol, children: Vec<GreenNode>) -> GreenNode {
        GreenNode::rule(symbol, children)
    }

    pub fn error(
        &mut self,
        symbol: Symbol,
        padding_children: Vec<GreenNode>,
        size: Extent,
        display: Option<char>,
    ) -> GreenNode {
        GreenNode::error(symbol, padding_children, size, display)
    }

    /// Number of distinct interned tokens, exposed for tests.
    pub fn interned_tokens(&self) -> usize {
        self.tokens.len()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tokens_are_interned() {
        let mut arena = NodeArena::new();
        let comma = Symbol::new(5);
        let a = arena.token(comma, Vec::new(), Extent::new(1, 1));
        let b = arena.token(comma, Vec::new(), Extent::new(1, 1));
        assert!(a.ptr_eq(&b));
        assert_eq!(arena.interned_tokens(), 1);
    }

    #[test]
    fn padded_tokens_are_fresh() {
        let mut arena = NodeArena::new();
        let ws = arena.token(Symbol::new(1), Vec::new(), Extent::new(1, 1));
        let a = arena.token(Symbol::new(2), vec![ws.clone()], Extent::new(3, 3));
        let b = arena.token(Symbol::new(2), vec![ws], Extent::new(3, 3));
        assert!(!a.ptr_eq(&b));
    }
}
