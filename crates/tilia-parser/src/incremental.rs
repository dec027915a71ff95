use tilia_language::Language;
use tilia_text::{Extent, InputCursor, TextEdit};
use tilia_tree::{GreenNode, NodeArena};

use crate::parser::{Parser, SpliceCandidate};
use crate::{Parsed, TableFault};

/// Re-parses after an edit, reusing as much of `old_root` as the tables
/// allow.
///
/// The dirty range is located in the old tree; everything structurally
/// before the affected subtree is replayed onto a fresh parse stack without
/// touching the input, the cursor is seeded at the affected subtree's
/// padding start, and old siblings past the dirty range become splice
/// candidates picked up as the cursor reaches them. Any shape the replay
/// machinery declines falls back to a full parse — reuse is an optimization,
/// never a semantics change.
pub(crate) fn reparse(
    language: &Language,
    arena: &mut NodeArena,
    old_root: &GreenNode,
    edit: TextEdit,
    cursor: InputCursor,
) -> Result<(Parsed, InputCursor), TableFault> {
    let Some(plan) = Plan::locate(old_root, edit) else {
        return full(language, arena, cursor);
    };

    let mut parser = Parser::new(language, &mut *arena, cursor);
    for (node, start) in &plan.prefix {
        if !parser.replay(node, *start)? {
            let cursor = parser.abandon();
            return full(language, arena, cursor);
        }
    }
    parser.seek(plan.reparse_start);
    parser.set_splices(plan.candidates);
    parser.run()
}

fn full(
    language: &Language,
    arena: &mut NodeArena,
    cursor: InputCursor,
) -> Result<(Parsed, InputCursor), TableFault> {
    let mut parser = Parser::new(language, arena, cursor);
    parser.seek(Extent::ZERO);
    parser.run()
}

struct Plan {
    /// Structural children preceding the affected subtree, outermost level
    /// first, with their absolute padding-start positions.
    prefix: Vec<(GreenNode, Extent)>,
    /// Padding start of the affected subtree; old and new positions agree
    /// here because the whole prefix lies before the edit.
    reparse_start: Extent,
    /// Old siblings past the dirty range, in ascending post-edit position.
    candidates: Vec<SpliceCandidate>,
}

impl Plan {
    fn locate(old_root: &GreenNode, edit: TextEdit) -> Option<Plan> {
        // Closed on both ends: an insertion touching a token's boundary must
        // re-lex that token.
        let lo = edit.start_byte;
        let hi = edit.start_byte + edit.bytes_removed;

        let mut prefix = Vec::new();
        let mut following: Vec<Vec<(Extent, GreenNode)>> = Vec::new();
        let mut node = old_root.clone();
        let mut base = Extent::ZERO;

        loop {
            if node.is_leaf() {
                break;
            }
            let content_start = base + node.padding();

            let mut chosen = None;
            let mut at = content_start;
            for (index, child) in node.children().iter().enumerate() {
                let total = child.total().bytes;
                if at.bytes <= lo && hi <= at.bytes + total {
                    chosen = Some((index, at));
                    break;
                }
                at += child.total();
            }
            // The dirty range straddles siblings: this node is the affected
            // subtree.
            let Some((index, child_start)) = chosen else { break };

            let mut prefix_at = content_start;
            for child in &node.children()[..index] {
                if child.is_error() {
                    // An ERROR in the prefix has no parse state to replay.
                    return None;
                }
                prefix.push((child.clone(), prefix_at));
                prefix_at += child.total();
            }

            let child = node.children()[index].clone();
            let mut level = Vec::new();
            let mut follow_at = child_start + child.total();
            for sibling in &node.children()[index + 1..] {
                level.push((follow_at, sibling.clone()));
                follow_at += sibling.total();
            }
            following.push(level);

            node = child;
            base = child_start;
        }

        if following.is_empty() {
            // Never left the root (or the root is a leaf): a full reparse is
            // both simplest and correct, including for edits that precede
            // the first real token.
            return None;
        }

        let candidates = following
            .into_iter()
            .rev()
            .flatten()
            .filter(|(old_start, node)| old_start.bytes >= hi && !node.is_error())
            .map(|(old_start, node)| SpliceCandidate {
                new_start: old_start.bytes - edit.bytes_removed + edit.bytes_added,
                node,
            })
            .collect();

        Some(Plan { prefix, reparse_start: base, candidates })
    }
}
