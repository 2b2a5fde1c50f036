//! Syntaxes and tokenization
//!
//! Syntaxes are Sublime `.sublime-syntax` definitions parsed by syntect.
//! The lexer works one line at a time and hands back a [`LineState`] so the
//! next line can resume where it left off.

mod lexer;
mod store;

pub use lexer::{Lexer, LineState, Token};
pub use store::GrammarStore;
pub use syntect::parsing::{Scope, ScopeStack, SyntaxReference, SyntaxSet};
