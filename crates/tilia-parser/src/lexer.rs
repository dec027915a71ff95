use tilia_language::{Language, StateId, Symbol};
use tilia_text::{Extent, InputCursor};

/// One scan result: a token, an invalid-input signal, or end of input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Scanned {
    /// Absolute position of the content start.
    pub(crate) start: Extent,
    /// Content extent; one scalar for invalid signals, zero at end of input.
    pub(crate) size: Extent,
    /// First scalar of the content, if any.
    pub(crate) first_char: Option<char>,
    pub(crate) kind: ScanKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScanKind {
    Token(Symbol),
    /// No accepting state was ever reached. `failing` is the scalar the DFA
    /// died on (`None` when it died at end of input); exactly one scalar has
    /// been consumed so the error machinery can resynchronize step by step.
    Invalid { failing: Option<char> },
    End,
}

impl Scanned {
    pub(crate) fn end(self) -> Extent {
        self.start + self.size
    }

    pub(crate) fn symbol(self) -> Option<Symbol> {
        match self.kind {
            ScanKind::Token(symbol) => Some(symbol),
            ScanKind::Invalid { .. } => None,
            ScanKind::End => Some(Symbol::END),
        }
    }
}

/// Runs the language's lexical DFA over the input cursor.
///
/// The automaton is stepped byte-by-byte over the UTF-8 encoding of each
/// decoded scalar, so a multi-byte character either fully enters the token
/// or is not consumed at all, and char counts stay exact for any input
/// encoding. Longest match: the cursor is rewound to the last accepting
/// position once the automaton has no further transition.
pub(crate) struct Lexer<'l> {
    language: &'l Language,
    cursor: InputCursor,
}

impl<'l> Lexer<'l> {
    pub(crate) fn new(language: &'l Language, cursor: InputCursor) -> Self {
        Self { language, cursor }
    }

    pub(crate) fn offset(&self) -> Extent {
        self.cursor.offset()
    }

    pub(crate) fn seek(&mut self, to: Extent) {
        self.cursor.seek(to);
    }

    pub(crate) fn into_cursor(self) -> InputCursor {
        self.cursor
    }

    /// Scans one token in the lexical mode of the given parse state.
    pub(crate) fn scan(&mut self, parse_state: StateId) -> Scanned {
        let table = self.language.lex();
        let start = self.cursor.offset();
        let mut state = self.language.lex_mode(parse_state);
        let mut first_char = None;
        let mut last_accept: Option<(Symbol, Extent)> = None;
        let mut failing = None;

        loop {
            let mark = self.cursor.offset();
            let Some(decoded) = self.cursor.decode_next() else { break };
            if first_char.is_none() {
                first_char = Some(decoded.ch);
            }

            let mut next = Some(state);
            let mut utf8 = [0u8; 4];
            for &byte in decoded.ch.encode_utf8(&mut utf8).as_bytes() {
                next = next.and_then(|state| table.step(state, byte));
                if next.is_none() {
                    break;
                }
            }

            match next {
                Some(next) => {
                    state = next;
                    if let Some(symbol) = table.accept(state) {
                        last_accept = Some((symbol, self.cursor.offset()));
                    }
                }
                None => {
                    failing = Some(decoded.ch);
                    self.cursor.seek(mark);
                    break;
                }
            }
        }

        match last_accept {
            Some((symbol, end)) => {
                self.cursor.seek(end);
                Scanned { start, size: end - start, first_char, kind: ScanKind::Token(symbol) }
            }
            None if first_char.is_none() => {
                Scanned { start, size: Extent::ZERO, first_char: None, kind: ScanKind::End }
            }
            None => {
                // Resynchronize one scalar at a time.
                self.cursor.seek(start);
                let decoded = self.cursor.decode_next().expect("a scalar was decoded above");
                Scanned {
                    start,
                    size: decoded.extent(),
                    first_char,
                    kind: ScanKind::Invalid { failing },
                }
            }
        }
    }
}
