//! Per-line resumable tokenizer
//!
//! `tokenize` takes one line and the state the previous line ended in, and
//! returns the line's tokens plus the state the next line starts from. It is
//! a pure function of its inputs; everything incremental lives in the cache.

use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

use crate::error::LexError;

/// Where tokenization left off: the parser's context stack and the scopes
/// open at the end of the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineState {
    parse: ParseState,
    scopes: ScopeStack,
}

impl LineState {
    /// State at the start of the document
    pub fn initial(syntax: &SyntaxReference) -> Self {
        Self {
            parse: ParseState::new(syntax),
            scopes: ScopeStack::new(),
        }
    }

    /// Scopes open at the end of the line
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }
}

/// A scoped byte range within one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub scope: ScopeStack,
    pub start: usize,
    pub len: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Collects tokens, dropping empty ranges and merging neighbours with equal scope
#[derive(Default)]
struct TokenBuilder {
    tokens: Vec<Token>,
}

impl TokenBuilder {
    fn push(&mut self, scope: &ScopeStack, start: usize, end: usize) {
        if end <= start {
            return;
        }
        if let Some(last) = self.tokens.last_mut() {
            if last.end() == start && &last.scope == scope {
                last.len += end - start;
                return;
            }
        }
        self.tokens.push(Token {
            scope: scope.clone(),
            start,
            len: end - start,
        });
    }
}

/// Tokenizer bound to one syntax
pub struct Lexer<'s> {
    syntaxes: &'s SyntaxSet,
    syntax: &'s SyntaxReference,
    max_line_length: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(syntaxes: &'s SyntaxSet, syntax: &'s SyntaxReference, max_line_length: usize) -> Self {
        Self {
            syntaxes,
            syntax,
            max_line_length: max_line_length.max(1),
        }
    }

    pub fn syntax(&self) -> &'s SyntaxReference {
        self.syntax
    }

    pub fn initial_state(&self) -> LineState {
        LineState::initial(self.syntax)
    }

    /// Tokenize one line (without its terminator) starting in `entry`.
    ///
    /// Never fails: malformed input degrades to coarser tokens, and the
    /// returned tokens always cover `0..line.len()` without gaps.
    pub fn tokenize(&self, line: &str, entry: &LineState) -> (Vec<Token>, LineState) {
        let cap = self.cap(line);
        let body = &line[..cap];
        // Syntaxes are loaded expecting the terminator. Every full line gets
        // one, the last line of the document included, so a line's exit state
        // doesn't change when text is appended after it.
        let input = if cap == line.len() {
            format!("{}\n", body)
        } else {
            body.to_string()
        };

        let mut state = entry.clone();
        let mut builder = TokenBuilder::default();
        let mut pos = 0;

        match state.parse.parse_line(&input, self.syntaxes) {
            Ok(ops) => {
                for (offset, op) in ops {
                    let offset = offset.min(body.len());
                    builder.push(&state.scopes, pos, offset);
                    pos = pos.max(offset);
                    if let Err(err) = state.scopes.apply(&op) {
                        let err = LexError::Scope {
                            reason: format!("{:?}", err),
                        };
                        tracing::trace!(error = %err, "ignoring scope operation");
                    }
                }
            }
            Err(err) => {
                let err = LexError::Parse {
                    reason: err.to_string(),
                };
                tracing::trace!(error = %err, "line left unparsed");
                state = entry.clone();
            }
        }

        // Text past the length cap keeps whatever scope was open there
        builder.push(&state.scopes, pos, line.len());

        (builder.tokens, state)
    }

    /// Byte length to tokenize, at most `max_line_length`, on a char boundary
    fn cap(&self, line: &str) -> usize {
        if line.len() <= self.max_line_length {
            return line.len();
        }
        let mut cut = self.max_line_length;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        let err = LexError::LineTooLong {
            len: line.len(),
            limit: self.max_line_length,
        };
        tracing::trace!(error = %err, "tokenizing prefix only");
        cut
    }
}
