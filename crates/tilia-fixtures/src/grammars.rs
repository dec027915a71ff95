//! The three fixture languages: JSON, a JavaScript sliver large enough for
//! call/property chains, and infix arithmetic. Each is compiled to runtime
//! tables on first request; the parser core never sees grammar rules.

use tilia_language::{Language, Symbol, SymbolInfo};

use crate::lexgen::{Class, Pattern, TokenRule};
use crate::lrgen::{GrammarSpec, build, end_symbol};

pub fn json() -> Language {
    const ERROR: Symbol = Symbol::new(1);
    const WHITESPACE: Symbol = Symbol::new(2);
    const LBRACKET: Symbol = Symbol::new(3);
    const RBRACKET: Symbol = Symbol::new(4);
    const LBRACE: Symbol = Symbol::new(5);
    const RBRACE: Symbol = Symbol::new(6);
    const COMMA: Symbol = Symbol::new(7);
    const COLON: Symbol = Symbol::new(8);
    const NUMBER: Symbol = Symbol::new(9);
    const STRING: Symbol = Symbol::new(10);
    const TRUE: Symbol = Symbol::new(11);
    const FALSE: Symbol = Symbol::new(12);
    const NULL: Symbol = Symbol::new(13);
    const DOCUMENT: Symbol = Symbol::new(14);
    const VALUE: Symbol = Symbol::new(15);
    const ELEMENTS: Symbol = Symbol::new(16);
    const ARRAY: Symbol = Symbol::new(17);
    const OBJECT: Symbol = Symbol::new(18);
    const PAIR: Symbol = Symbol::new(19);
    const MEMBERS: Symbol = Symbol::new(20);

    build(GrammarSpec {
        name: "json",
        symbols: vec![
            end_symbol(),
            SymbolInfo::visible("error"),
            SymbolInfo::hidden("whitespace"),
            SymbolInfo::hidden("["),
            SymbolInfo::hidden("]"),
            SymbolInfo::hidden("{"),
            SymbolInfo::hidden("}"),
            SymbolInfo::hidden(","),
            SymbolInfo::hidden(":"),
            SymbolInfo::visible("number"),
            SymbolInfo::visible("string"),
            SymbolInfo::visible("true"),
            SymbolInfo::visible("false"),
            SymbolInfo::visible("null"),
            SymbolInfo::visible("DOCUMENT"),
            SymbolInfo::hidden("value"),
            SymbolInfo::hidden("elements"),
            SymbolInfo::visible("array"),
            SymbolInfo::visible("object"),
            SymbolInfo::visible("pair"),
            SymbolInfo::hidden("members"),
        ],
        root: DOCUMENT,
        error: ERROR,
        recovery: VALUE,
        ubiquitous: vec![WHITESPACE],
        rules: vec![
            (DOCUMENT, vec![VALUE]),
            (VALUE, vec![ARRAY]),
            (VALUE, vec![OBJECT]),
            (VALUE, vec![NUMBER]),
            (VALUE, vec![STRING]),
            (VALUE, vec![TRUE]),
            (VALUE, vec![FALSE]),
            (VALUE, vec![NULL]),
            (ARRAY, vec![LBRACKET, ELEMENTS, RBRACKET]),
            (ARRAY, vec![LBRACKET, RBRACKET]),
            (ELEMENTS, vec![VALUE]),
            (ELEMENTS, vec![ELEMENTS, COMMA, VALUE]),
            (OBJECT, vec![LBRACE, MEMBERS, RBRACE]),
            (OBJECT, vec![LBRACE, RBRACE]),
            (MEMBERS, vec![PAIR]),
            (MEMBERS, vec![MEMBERS, COMMA, PAIR]),
            (PAIR, vec![STRING, COLON, VALUE]),
        ],
        tokens: vec![
            TokenRule::new(WHITESPACE, Pattern::Repeat(Class::blank())),
            TokenRule::new(LBRACKET, Pattern::Literal("[")),
            TokenRule::new(RBRACKET, Pattern::Literal("]")),
            TokenRule::new(LBRACE, Pattern::Literal("{")),
            TokenRule::new(RBRACE, Pattern::Literal("}")),
            TokenRule::new(COMMA, Pattern::Literal(",")),
            TokenRule::new(COLON, Pattern::Literal(":")),
            TokenRule::new(TRUE, Pattern::Literal("true")),
            TokenRule::new(FALSE, Pattern::Literal("false")),
            TokenRule::new(NULL, Pattern::Literal("null")),
            TokenRule::new(NUMBER, Pattern::Repeat(Class::digits())),
            TokenRule::new(STRING, Pattern::Quoted),
        ],
    })
}

pub fn javascript() -> Language {
    const ERROR: Symbol = Symbol::new(1);
    const WHITESPACE: Symbol = Symbol::new(2);
    const NEWLINE: Symbol = Symbol::new(3);
    const COMMENT: Symbol = Symbol::new(4);
    const IDENTIFIER: Symbol = Symbol::new(5);
    const LPAREN: Symbol = Symbol::new(6);
    const RPAREN: Symbol = Symbol::new(7);
    const DOT: Symbol = Symbol::new(8);
    const SEMICOLON: Symbol = Symbol::new(9);
    const DOCUMENT: Symbol = Symbol::new(10);
    const STATEMENTS: Symbol = Symbol::new(11);
    const EXPRESSION_STATEMENT: Symbol = Symbol::new(12);
    const EXPRESSION: Symbol = Symbol::new(13);
    const FUNCTION_CALL: Symbol = Symbol::new(14);
    const PROPERTY_ACCESS: Symbol = Symbol::new(15);

    build(GrammarSpec {
        name: "javascript",
        symbols: vec![
            end_symbol(),
            SymbolInfo::visible("error"),
            SymbolInfo::hidden("whitespace"),
            SymbolInfo::hidden("newline"),
            SymbolInfo::visible("comment"),
            SymbolInfo::visible("identifier"),
            SymbolInfo::hidden("("),
            SymbolInfo::hidden(")"),
            SymbolInfo::hidden("."),
            SymbolInfo::hidden(";"),
            SymbolInfo::visible("DOCUMENT"),
            SymbolInfo::hidden("statements"),
            SymbolInfo::visible("expression_statement"),
            SymbolInfo::hidden("expression"),
            SymbolInfo::visible("function_call"),
            SymbolInfo::visible("property_access"),
        ],
        root: DOCUMENT,
        error: ERROR,
        recovery: EXPRESSION,
        ubiquitous: vec![WHITESPACE, NEWLINE, COMMENT],
        rules: vec![
            (DOCUMENT, vec![STATEMENTS]),
            (STATEMENTS, vec![EXPRESSION_STATEMENT]),
            (STATEMENTS, vec![STATEMENTS, EXPRESSION_STATEMENT]),
            (EXPRESSION_STATEMENT, vec![EXPRESSION, SEMICOLON]),
            (EXPRESSION_STATEMENT, vec![EXPRESSION]),
            (EXPRESSION, vec![FUNCTION_CALL]),
            (EXPRESSION, vec![PROPERTY_ACCESS]),
            (EXPRESSION, vec![IDENTIFIER]),
            (FUNCTION_CALL, vec![EXPRESSION, LPAREN, RPAREN]),
            (PROPERTY_ACCESS, vec![EXPRESSION, DOT, IDENTIFIER]),
        ],
        tokens: vec![
            TokenRule::new(WHITESPACE, Pattern::Repeat(Class::whitespace())),
            TokenRule::new(NEWLINE, Pattern::Repeat(Class::newlines())),
            TokenRule::new(COMMENT, Pattern::LineComment("//")),
            TokenRule::new(
                IDENTIFIER,
                Pattern::Ident {
                    first: Class::letters(),
                    rest: Class::letters().union(&Class::digits()),
                },
            ),
            TokenRule::new(LPAREN, Pattern::Literal("(")),
            TokenRule::new(RPAREN, Pattern::Literal(")")),
            TokenRule::new(DOT, Pattern::Literal(".")),
            TokenRule::new(SEMICOLON, Pattern::Literal(";")),
        ],
    })
}

pub fn arithmetic() -> Language {
    const ERROR: Symbol = Symbol::new(1);
    const WHITESPACE: Symbol = Symbol::new(2);
    const COMMENT: Symbol = Symbol::new(3);
    const NUMBER: Symbol = Symbol::new(4);
    const VARIABLE: Symbol = Symbol::new(5);
    const PLUS: Symbol = Symbol::new(6);
    const STAR: Symbol = Symbol::new(7);
    const CARET: Symbol = Symbol::new(8);
    const LPAREN: Symbol = Symbol::new(9);
    const RPAREN: Symbol = Symbol::new(10);
    const DOCUMENT: Symbol = Symbol::new(11);
    const EXPR_ADD: Symbol = Symbol::new(12);
    const EXPR_MUL: Symbol = Symbol::new(13);
    const EXPR_POW: Symbol = Symbol::new(14);
    const PRIMARY: Symbol = Symbol::new(15);
    const SUM: Symbol = Symbol::new(16);
    const PRODUCT: Symbol = Symbol::new(17);
    const EXPONENT: Symbol = Symbol::new(18);
    const GROUP: Symbol = Symbol::new(19);

    build(GrammarSpec {
        name: "arithmetic",
        symbols: vec![
            end_symbol(),
            SymbolInfo::visible("error"),
            SymbolInfo::hidden("whitespace"),
            SymbolInfo::visible("comment"),
            SymbolInfo::visible("number"),
            SymbolInfo::visible("variable"),
            SymbolInfo::hidden("+"),
            SymbolInfo::hidden("*"),
            SymbolInfo::hidden("^"),
            SymbolInfo::hidden("("),
            SymbolInfo::hidden(")"),
            SymbolInfo::visible("DOCUMENT"),
            // The precedence tiers share one display name; they only
            // materialize when trailing ubiquitous tokens widen them.
            SymbolInfo::auxiliary("expression"),
            SymbolInfo::auxiliary("expression"),
            SymbolInfo::auxiliary("expression"),
            SymbolInfo::auxiliary("expression"),
            SymbolInfo::visible("sum"),
            SymbolInfo::visible("product"),
            SymbolInfo::visible("exponent"),
            SymbolInfo::visible("group"),
        ],
        root: DOCUMENT,
        error: ERROR,
        recovery: EXPR_ADD,
        ubiquitous: vec![WHITESPACE, COMMENT],
        rules: vec![
            (DOCUMENT, vec![EXPR_ADD]),
            (EXPR_ADD, vec![SUM]),
            (EXPR_ADD, vec![EXPR_MUL]),
            (SUM, vec![EXPR_ADD, PLUS, EXPR_MUL]),
            (EXPR_MUL, vec![PRODUCT]),
            (EXPR_MUL, vec![EXPR_POW]),
            (PRODUCT, vec![EXPR_MUL, STAR, EXPR_POW]),
            (EXPR_POW, vec![EXPONENT]),
            (EXPR_POW, vec![PRIMARY]),
            (EXPONENT, vec![PRIMARY, CARET, EXPR_POW]),
            (PRIMARY, vec![GROUP]),
            (PRIMARY, vec![NUMBER]),
            (PRIMARY, vec![VARIABLE]),
            (GROUP, vec![LPAREN, EXPR_ADD, RPAREN]),
        ],
        tokens: vec![
            TokenRule::new(WHITESPACE, Pattern::Repeat(Class::blank())),
            TokenRule::new(COMMENT, Pattern::LineComment("#")),
            TokenRule::new(NUMBER, Pattern::Repeat(Class::digits())),
            TokenRule::new(
                VARIABLE,
                Pattern::Ident {
                    first: Class::letters(),
                    rest: Class::letters().union(&Class::digits()),
                },
            ),
            TokenRule::new(PLUS, Pattern::Literal("+")),
            TokenRule::new(STAR, Pattern::Literal("*")),
            TokenRule::new(CARET, Pattern::Literal("^")),
            TokenRule::new(LPAREN, Pattern::Literal("(")),
            TokenRule::new(RPAREN, Pattern::Literal(")")),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_tables_build_and_validate() {
        for language in [json(), javascript(), arithmetic()] {
            assert!(language.validate().is_ok(), "{} failed validation", language.name());
            assert!(language.state_count() > 4);
            assert_eq!(language.symbol_name(language.error_symbol()), "error");
            assert_eq!(language.symbol_name(language.root_symbol()), "DOCUMENT");
        }
    }

    #[test]
    fn symbol_lookup_by_name() {
        let json = json();
        let number = json.symbol_named("number").expect("number exists");
        assert_eq!(json.symbol_name(number), "number");
        assert!(json.symbol_named("nonsense").is_none());
    }
}
