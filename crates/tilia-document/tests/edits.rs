//! Editing scenarios: the tree after each edit, and — through the spying
//! reader — how much of the input the reparse actually touched.

use expect_test::{Expect, expect};
use text_size::TextSize;
use tilia_document::Document;
use tilia_fixtures::{SpyInput, grammars};
use tilia_language::Language;
use tilia_text::TextEdit;
use triomphe::Arc;

fn document(language: Language, spy: &SpyInput) -> Document {
    let mut document = Document::new();
    document.set_language(Arc::new(language)).expect("fixture tables validate");
    document.set_input(spy.input()).expect("initial parse succeeds");
    spy.clear();
    document
}

fn check_root(document: &Document, expected: Expect) {
    expected.assert_eq(&document.root_node().expect("tree exists").to_string());
}

mod inserting {
    use super::*;

    #[test]
    fn new_tokens_near_the_end() {
        let spy = SpyInput::new("x ^ (100 + abc)", 3);
        let mut document = document(grammars::arithmetic(), &spy);
        check_root(
            &document,
            expect!["(DOCUMENT (exponent (variable) (group (sum (number) (variable)))))"],
        );
        spy.clear();

        let edit = spy.insert("x ^ (100 + abc".len() as u32, " * 5");
        document.edit(edit).expect("reparse succeeds");

        check_root(
            &document,
            expect![
                "(DOCUMENT (exponent (variable) (group (sum (number) (product (variable) (number))))))"
            ],
        );
    }

    #[test]
    fn only_the_changed_region_is_reread() {
        let spy = SpyInput::new("x ^ (100 + abc)", 3);
        let mut document = document(grammars::arithmetic(), &spy);
        spy.clear();

        let edit = spy.insert("x ^ (100 + abc".len() as u32, " * 5");
        document.edit(edit).expect("reparse succeeds");

        assert_eq!(spy.strings_read(), vec![" abc * 5)".to_string()]);
    }

    #[test]
    fn new_tokens_near_the_beginning() {
        let spy = SpyInput::new("123 * 456", 3);
        let mut document = document(grammars::arithmetic(), &spy);
        check_root(&document, expect!["(DOCUMENT (product (number) (number)))"]);

        let edit = spy.insert("123".len() as u32, " + 5 ");
        document.edit(edit).expect("reparse succeeds");

        check_root(&document, expect!["(DOCUMENT (sum (number) (product (number) (number))))"]);
    }

    #[test]
    fn into_the_middle_of_an_existing_token() {
        let spy = SpyInput::new("abc * 123", 3);
        let mut document = document(grammars::arithmetic(), &spy);
        check_root(&document, expect!["(DOCUMENT (product (variable) (number)))"]);
        spy.clear();

        let edit = spy.insert("ab".len() as u32, "XYZ");
        document.edit(edit).expect("reparse succeeds");

        check_root(&document, expect!["(DOCUMENT (product (variable) (number)))"]);
        let root = document.root_node().expect("tree exists");
        let node = root.find_for_pos(TextSize::new(1)).expect("inside the variable");
        assert_eq!(node.name(), "variable");
        assert_eq!(node.size().bytes, TextSize::new("abXYZc".len() as u32));

        // The trailing ` * 123` was spliced from the old tree, not re-read.
        assert_eq!(spy.strings_read(), vec!["abXYZc * ".to_string()]);
    }

    #[test]
    fn at_the_end_of_an_existing_token() {
        let spy = SpyInput::new("abc * 123", 3);
        let mut document = document(grammars::arithmetic(), &spy);

        let edit = spy.insert("abc".len() as u32, "XYZ");
        document.edit(edit).expect("reparse succeeds");

        check_root(&document, expect!["(DOCUMENT (product (variable) (number)))"]);
        let root = document.root_node().expect("tree exists");
        let node = root.find_for_pos(TextSize::new(1)).expect("inside the variable");
        assert_eq!(node.name(), "variable");
        assert_eq!(node.size().bytes, TextSize::new("abcXYZ".len() as u32));
    }

    #[test]
    fn with_non_ascii_characters() {
        let text = "\u{3b1}\u{3b2}\u{3b4} + 1";
        let spy = SpyInput::new(text, 3);
        let mut document = document(grammars::arithmetic(), &spy);
        check_root(&document, expect!["(DOCUMENT (sum (variable) (number)))"]);

        // Char offset 6 is just before the `1`; in bytes that is 9.
        let edit = spy.insert(9, "\u{3c8}");
        document.edit(edit).expect("reparse succeeds");

        check_root(&document, expect!["(DOCUMENT (sum (variable) (variable)))"]);
        let root = document.root_node().expect("tree exists");
        assert_eq!(usize::from(root.size().bytes), "\u{3b1}\u{3b2}\u{3b4} + \u{3c8}1".len());
        assert_eq!(root.size().chars, TextSize::new(8));
    }
}

mod deleting {
    use super::*;

    #[test]
    fn removing_a_critical_token_creates_an_error() {
        let spy = SpyInput::new("123 * 456", 3);
        let mut document = document(grammars::arithmetic(), &spy);
        check_root(&document, expect!["(DOCUMENT (product (number) (number)))"]);

        let edit = spy.delete("123 ".len() as u32, 2);
        document.edit(edit).expect("reparse succeeds");

        check_root(&document, expect!["(DOCUMENT (number) (ERROR '4'))"]);
        assert_eq!(document.diagnostics().len(), 1);
    }
}

mod ubiquitous_tokens {
    use super::*;

    #[test]
    fn editing_inside_a_node_with_a_comment() {
        let text = "123 *\n# a-comment\nabc";
        let spy = SpyInput::new(text, 3);
        let mut document = document(grammars::arithmetic(), &spy);
        check_root(&document, expect!["(DOCUMENT (product (number) (comment) (variable)))"]);

        let edit = spy.insert(text.len() as u32, "XYZ");
        document.edit(edit).expect("reparse succeeds");

        check_root(&document, expect!["(DOCUMENT (product (number) (comment) (variable)))"]);
        let root = document.root_node().expect("tree exists");
        let variable = root.child(0).and_then(|product| product.child(2)).expect("variable");
        assert_eq!(variable.size().bytes, TextSize::new("abcXYZ".len() as u32));
    }
}

mod reuse {
    use super::*;

    #[test]
    fn noop_edit_returns_the_identical_root() {
        let spy = SpyInput::new("x ^ (100 + abc)", 3);
        let mut document = document(grammars::arithmetic(), &spy);

        let before = document.root_node().expect("tree exists");
        document.edit(TextEdit::new(7, 0, 0)).expect("noop edit");
        let after = document.root_node().expect("tree exists");

        assert!(before.ptr_eq(&after));
    }

    #[test]
    fn suffix_subtrees_survive_by_identity() {
        let spy = SpyInput::new("abc * 123", 3);
        let mut document = document(grammars::arithmetic(), &spy);

        // The `123` leaf owns its leading space, so it is a distinct
        // allocation; after an edit inside `abc` it must be spliced back
        // rather than rebuilt.
        let before = document.root_node().expect("tree exists");
        let old_number = before.child(0).and_then(|product| product.child(1)).expect("123");

        let edit = spy.insert("ab".len() as u32, "XYZ");
        document.edit(edit).expect("reparse succeeds");

        let after = document.root_node().expect("tree exists");
        let new_number = after.child(0).and_then(|product| product.child(1)).expect("123");
        assert!(old_number.ptr_eq(&new_number));
    }

    #[test]
    fn handles_outlive_edits() {
        let spy = SpyInput::new("abc * 123", 3);
        let mut document = document(grammars::arithmetic(), &spy);

        let before = document.root_node().expect("tree exists");
        let edit = spy.delete(0, 6);
        document.edit(edit).expect("reparse succeeds");

        // The old handle still describes the old tree.
        assert_eq!(before.to_string(), "(DOCUMENT (product (variable) (number)))");
        assert_eq!(
            document.root_node().expect("tree exists").to_string(),
            "(DOCUMENT (number))"
        );
    }
}

mod languages {
    use super::*;

    #[test]
    fn switching_the_language_reparses() {
        let spy = SpyInput::new("fn()\n", 3);
        let mut document = document(grammars::javascript(), &spy);
        check_root(
            &document,
            expect!["(DOCUMENT (expression_statement (function_call (identifier))))"],
        );

        document.set_language(Arc::new(grammars::arithmetic())).expect("tables validate");
        check_root(&document, expect!["(DOCUMENT (variable) (ERROR '('))"]);
    }
}
