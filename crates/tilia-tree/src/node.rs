use tilia_language::{Language, Visibility};
use tilia_text::{Extent, TextRange, TextSize};
use triomphe::Arc;

use crate::GreenNode;

/// An external, refcounted view of a tree node.
///
/// Handles pair a green node with the absolute position derived on the way
/// down from the root, and keep both the subtree and the language alive
/// independently of the owning document — a reader may hold a handle across
/// any number of edits.
///
/// Child access, [`find_for_pos`](SyntaxNode::find_for_pos) and the
/// S-expression `Display` all operate on the *visible* view: hidden
/// punctuation and whitespace leaves are skipped, while visible ubiquitous
/// leaves (comments) surface as children of the enclosing rule.
#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

struct NodeData {
    green: GreenNode,
    parent: Option<SyntaxNode>,
    /// Absolute position of the content start (past the padding).
    pos: Extent,
    language: Arc<Language>,
}

impl SyntaxNode {
    pub fn new_root(green: GreenNode, language: Arc<Language>) -> Self {
        let pos = green.padding();
        Self { data: Arc::new(NodeData { green, parent: None, pos, language }) }
    }

    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.data.language
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        self.data.parent.clone()
    }

    /// The grammar's name for this node's symbol (`"number"`, `"error"`, …).
    pub fn name(&self) -> &str {
        self.data.language.symbol_name(self.data.green.symbol())
    }

    /// Absolute position of the node's content.
    pub fn pos(&self) -> Extent {
        self.data.pos
    }

    pub fn size(&self) -> Extent {
        self.data.green.size()
    }

    pub fn padding(&self) -> Extent {
        self.data.green.padding()
    }

    pub fn is_error(&self) -> bool {
        self.data.green.is_error()
    }

    /// Same underlying green node: the identity relation reuse guarantees
    /// are expressed in.
    pub fn ptr_eq(&self, other: &SyntaxNode) -> bool {
        self.data.green.ptr_eq(&other.data.green)
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode> {
        self.children().nth(index)
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.visible_children().into_iter()
    }

    /// The deepest node whose content span contains `byte`.
    pub fn find_for_pos(&self, byte: TextSize) -> Option<SyntaxNode> {
        if !self.byte_range().contains(byte) {
            return None;
        }
        let mut node = self.clone();
        'descend: loop {
            for child in node.children() {
                if child.byte_range().contains(byte) {
                    node = child;
                    continue 'descend;
                }
            }
            return Some(node);
        }
    }

    fn byte_range(&self) -> TextRange {
        TextRange::at(self.data.pos.bytes, self.data.green.size().bytes)
    }

    fn visible_children(&self) -> Vec<SyntaxNode> {
        let language = &self.data.language;
        let mut out = Vec::new();
        let mut at = self.data.pos;
        for child in self.data.green.children() {
            let mut padding_at = at;
            for piece in child.padding_children() {
                if language.visibility(piece.symbol()) != Visibility::Hidden {
                    out.push(self.make_child(piece, padding_at));
                }
                padding_at += piece.total();
            }
            if language.visibility(child.symbol()) != Visibility::Hidden {
                out.push(self.make_child(child, at + child.padding()));
            }
            at += child.total();
        }
        out
    }

    fn make_child(&self, green: &GreenNode, pos: Extent) -> SyntaxNode {
        Self {
            data: Arc::new(NodeData {
                green: green.clone(),
                parent: Some(self.clone()),
                pos,
                language: self.data.language.clone(),
            }),
        }
    }
}

impl std::fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.data.green.is_error() {
            return match self.data.green.error_display() {
                Some(ch) => write!(f, "(ERROR '{ch}')"),
                None => write!(f, "(ERROR)"),
            };
        }
        write!(f, "({}", self.name())?;
        for child in self.children() {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}

impl std::fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("name", &self.name())
            .field("pos", &self.pos())
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tilia_language::{LexTable, Symbol, SymbolInfo, SymbolSet};

    use super::*;
    use crate::NodeArena;

    const WS: Symbol = Symbol::new(1);
    const NUMBER: Symbol = Symbol::new(2);
    const PLUS: Symbol = Symbol::new(3);
    const COMMENT: Symbol = Symbol::new(4);
    const SUM: Symbol = Symbol::new(5);
    const DOCUMENT: Symbol = Symbol::new(6);
    const ERROR: Symbol = Symbol::new(7);

    fn language() -> Arc<Language> {
        Arc::new(Language::new(
            "toy",
            vec![
                SymbolInfo::hidden("end"),
                SymbolInfo::hidden("whitespace"),
                SymbolInfo::visible("number"),
                SymbolInfo::hidden("+"),
                SymbolInfo::visible("comment"),
                SymbolInfo::visible("sum"),
                SymbolInfo::visible("DOCUMENT"),
                SymbolInfo::visible("error"),
            ],
            SymbolSet::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            LexTable::default(),
            DOCUMENT,
            ERROR,
        ))
    }

    /// `12 + # c\n34` as a sum with a comment hiding in the padding of `34`.
    fn sample() -> SyntaxNode {
        let mut arena = NodeArena::new();
        let ws = arena.token(WS, Vec::new(), Extent::new(1, 1));
        let lhs = arena.token(NUMBER, Vec::new(), Extent::new(2, 2));
        let plus = arena.token(PLUS, vec![ws.clone()], Extent::new(1, 1));
        let comment = arena.token(COMMENT, Vec::new(), Extent::new(3, 3));
        let newline = arena.token(WS, Vec::new(), Extent::new(1, 1));
        let rhs = arena.token(NUMBER, vec![ws.clone(), comment, newline], Extent::new(2, 2));
        let sum = arena.rule(SUM, vec![lhs, plus, rhs]);
        let document = arena.rule(DOCUMENT, vec![sum]);
        SyntaxNode::new_root(document, language())
    }

    #[test]
    fn stringify_shows_visible_view() {
        assert_eq!(sample().to_string(), "(DOCUMENT (sum (number) (comment) (number)))");
    }

    #[test]
    fn positions_are_derived() {
        let root = sample();
        assert_eq!(root.pos(), Extent::ZERO);
        assert_eq!(root.size(), Extent::new(11, 11));

        let sum = root.child(0).expect("sum");
        let comment = sum.child(1).expect("comment");
        let rhs = sum.child(2).expect("rhs");
        assert_eq!(comment.name(), "comment");
        assert_eq!(comment.pos(), Extent::new(5, 5));
        assert_eq!(rhs.pos(), Extent::new(9, 9));
        assert_eq!(sum.child_count(), 3);
    }

    #[test]
    fn find_for_pos_descends_to_leaves() {
        let root = sample();
        let hit = root.find_for_pos(TextSize::new(10)).expect("inside rhs");
        assert_eq!(hit.name(), "number");
        assert_eq!(hit.pos().bytes, TextSize::new(9));

        let comment = root.find_for_pos(TextSize::new(6)).expect("inside comment");
        assert_eq!(comment.name(), "comment");

        // Padding bytes that belong to no visible leaf resolve to the rule.
        let rule = root.find_for_pos(TextSize::new(2)).expect("ws under sum");
        assert_eq!(rule.name(), "sum");
    }

    #[test]
    fn error_display_forms() {
        let mut arena = NodeArena::new();
        let error = arena.error(ERROR, Vec::new(), Extent::new(5, 5), Some('@'));
        let document = arena.rule(DOCUMENT, vec![error]);
        let root = SyntaxNode::new_root(document, language());
        assert_eq!(root.to_string(), "(DOCUMENT (ERROR '@'))");
        assert_eq!(root.child(0).expect("error").name(), "error");

        let eof_error = arena.error(ERROR, Vec::new(), Extent::ZERO, None);
        let document = arena.rule(DOCUMENT, vec![eof_error]);
        let root = SyntaxNode::new_root(document, language());
        assert_eq!(root.to_string(), "(DOCUMENT (ERROR))");
    }
}
