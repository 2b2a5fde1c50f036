//! Per-line memo of lexer results
//!
//! Entries are keyed by line index. An entry records the hash of the text it
//! was computed from, the state the line ended in and, unless the theme has
//! changed since, the resolved spans. Entries are marked stale rather than
//! dropped when an earlier line changes, so `len` keeps counting them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::syntax::LineState;
use crate::theme::StyleSpan;

/// Content hash used to notice edits without a document version
pub fn hash_line(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// What was computed for one line
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub line_index: usize,
    pub text_hash: u64,
    pub exit_state: LineState,
    /// `None` once the theme changed; the exit state stays valid
    pub spans: Option<Vec<StyleSpan>>,
    pub stale: bool,
}

impl CacheEntry {
    pub fn new(line_index: usize, text_hash: u64, exit_state: LineState, spans: Vec<StyleSpan>) -> Self {
        Self {
            line_index,
            text_hash,
            exit_state,
            spans: Some(spans),
            stale: false,
        }
    }

    /// Valid for a line whose text hashes to `text_hash`
    pub fn matches(&self, text_hash: u64) -> bool {
        !self.stale && self.text_hash == text_hash
    }
}

#[derive(Debug, Default)]
pub struct LineCache {
    lines: Vec<Option<CacheEntry>>,
}

impl LineCache {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Non-stale entry for a line
    pub fn get(&self, line: usize) -> Option<&CacheEntry> {
        self.lines
            .get(line)
            .and_then(|opt| opt.as_ref())
            .filter(|e| !e.stale)
    }

    pub fn get_mut(&mut self, line: usize) -> Option<&mut CacheEntry> {
        self.lines
            .get_mut(line)
            .and_then(|opt| opt.as_mut())
            .filter(|e| !e.stale)
    }

    /// Store an entry at `line`, growing the cache as needed. The stored
    /// entry is valid and keyed by `line`.
    pub fn put(&mut self, line: usize, mut entry: CacheEntry) {
        if line >= self.lines.len() {
            self.lines.resize(line + 1, None);
        }
        entry.line_index = line;
        entry.stale = false;
        self.lines[line] = Some(entry);
    }

    /// Mark `line` and everything after it stale
    pub fn invalidate_from(&mut self, line: usize) {
        if line < self.lines.len() {
            for entry in self.lines[line..].iter_mut().flatten() {
                entry.stale = true;
            }
        }
    }

    pub fn invalidate_all(&mut self) {
        self.lines.clear();
    }

    /// Forget resolved styles but keep exit states
    pub fn invalidate_spans(&mut self) {
        for entry in self.lines.iter_mut().flatten() {
            entry.spans = None;
        }
    }

    /// Drop entries at or past `len`
    pub fn truncate(&mut self, len: usize) {
        self.lines.truncate(len);
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.lines.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries that are not stale
    pub fn valid_len(&self) -> usize {
        self.lines.iter().flatten().filter(|e| !e.stale).count()
    }
}
