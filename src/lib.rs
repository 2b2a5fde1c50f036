//! Incremental, line-windowed syntax highlighting
//!
//! A [`HighlightEngine`] is built from a folder of `.sublime-syntax` and
//! `.tmTheme` definitions and turns any window of a document's lines into
//! styled byte ranges. Lexer state is cached per line, so scrolling and small
//! edits only re-lex what actually changed. The [`ffi`] module exposes the
//! same operations over a C ABI.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod syntax;
pub mod theme;

#[cfg(test)]
mod test_support;

pub use engine::HighlightEngine;
pub use error::{BoundsWarning, LexError, LoadError};
pub use theme::{Color, StyleSpan};
