//! The highlighting facade
//!
//! [`HighlightEngine`] owns the grammar store, the themes and the line cache.
//! Every `highlight` call gets the document text from line 0; the engine keeps
//! only per-line hashes and lexer states between calls.

mod snapshot;

use std::path::Path;

pub use snapshot::DocumentSnapshot;

use crate::cache::{CacheEntry, LineCache, hash_line};
use crate::config::Settings;
use crate::error::{BoundsWarning, LoadError};
use crate::syntax::{GrammarStore, Lexer, LineState};
use crate::theme::{Color, NamedTheme, StyleResolver, StyleSpan, ThemeKind};

pub struct HighlightEngine {
    store: GrammarStore,
    cache: LineCache,
    dark_mode: bool,
    max_line_length: usize,
    propagation_limit: Option<usize>,
}

impl HighlightEngine {
    /// Load every definition in `folder`
    pub fn construct(folder: &Path) -> Result<Self, LoadError> {
        let store = GrammarStore::load(folder)?;
        Ok(Self::from_store(store))
    }

    /// Engine that styles everything with the built-in themes' defaults
    pub fn plain_text() -> Self {
        Self::from_store(GrammarStore::plain_text())
    }

    pub fn from_store(store: GrammarStore) -> Self {
        let Settings {
            dark_mode,
            max_line_length,
            ..
        } = *store.settings();
        let propagation_limit = store.settings().propagation_bound();

        tracing::debug!(
            grammar = %store.grammar().name,
            dark_mode,
            "highlight engine ready"
        );

        Self {
            store,
            cache: LineCache::new(),
            dark_mode,
            max_line_length,
            propagation_limit,
        }
    }

    /// Spans for lines `start_line..start_line + line_count`, sorted by line and offset.
    ///
    /// `text` holds the document from its first line on; `total_lines` is the
    /// caller's line count. Requests past either are clamped, never rejected.
    ///
    /// Cost: every call builds a line index over all of `text` and hashes each
    /// line before `start_line` to verify the cached prefix, so a warm call is
    /// still linear in the document size. Lexing, the expensive part, only
    /// covers lines whose text or entry state changed.
    pub fn highlight(
        &mut self,
        text: &str,
        start_line: usize,
        line_count: usize,
        total_lines: usize,
    ) -> Vec<StyleSpan> {
        let snapshot = DocumentSnapshot::new(text);
        let available = total_lines.min(snapshot.line_count());
        let requested_end = start_line.saturating_add(line_count);
        let end = requested_end.min(available);

        self.cache.truncate(total_lines);

        if end < requested_end {
            let warning = BoundsWarning {
                start: start_line,
                requested_end,
                clamped_end: end.max(start_line),
                available,
            };
            tracing::debug!(%warning, "clamped highlight request");
        }
        if start_line >= end {
            return Vec::new();
        }

        let theme = self.store.theme(ThemeKind::from_dark_mode(self.dark_mode));
        let mut pass = HighlightPass {
            snapshot: &snapshot,
            lexer: Lexer::new(
                self.store.syntax_set(),
                self.store.grammar(),
                self.max_line_length,
            ),
            resolver: StyleResolver::new(&theme.theme),
            cache: &mut self.cache,
        };

        let (resume, state) = pass.resume_point(start_line);
        let (spans, dirty) = pass.lex_window(resume, start_line, end, state);
        if dirty {
            pass.propagate(end, available, self.propagation_limit);
        }
        spans
    }

    /// Forget everything. The next request lexes from line 0.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate_all();
    }

    /// Background of the active theme
    pub fn background_color(&self) -> Color {
        self.theme().background()
    }

    /// Switch between the light and dark theme. Token boundaries and lexer
    /// states are kept; only resolved styles are dropped.
    pub fn set_dark_mode(&mut self, dark: bool) {
        if self.dark_mode == dark {
            return;
        }
        self.dark_mode = dark;
        self.cache.invalidate_spans();
        tracing::debug!(dark, theme = %self.theme().name, "theme switched");
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn theme(&self) -> &NamedTheme {
        self.store.theme(ThemeKind::from_dark_mode(self.dark_mode))
    }

    pub fn theme_name(&self) -> &str {
        &self.theme().name
    }

    pub fn grammar_name(&self) -> &str {
        &self.store.grammar().name
    }

    pub fn store(&self) -> &GrammarStore {
        &self.store
    }

    /// Cached lines, stale ones included
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cached lines that are still trusted
    pub fn valid_cache_len(&self) -> usize {
        self.cache.valid_len()
    }

    /// Release the engine and everything it owns
    pub fn dispose(self) {
        tracing::debug!(cached = self.cache.len(), "highlight engine disposed");
    }
}

/// State for a single `highlight` call
struct HighlightPass<'a> {
    snapshot: &'a DocumentSnapshot,
    lexer: Lexer<'a>,
    resolver: StyleResolver<'a>,
    cache: &'a mut LineCache,
}

impl HighlightPass<'_> {
    /// First line to lex and the state to lex it from: the end of the longest
    /// run of cached lines before `start` that are valid and still match the
    /// text. Checking from line 0 catches edits anywhere above the window.
    fn resume_point(&self, start: usize) -> (usize, LineState) {
        let mut state = self.lexer.initial_state();
        for i in 0..start {
            let verified = match (self.cache.get(i), self.snapshot.line(i)) {
                (Some(entry), Some(text)) if entry.matches(hash_line(&text)) => entry,
                _ => return (i, state),
            };
            state = verified.exit_state.clone();
        }
        (start, state)
    }

    /// Lex `resume..end`, serving cache hits while the chain is intact.
    /// Returns the spans of `start..end` and whether the last line's exit
    /// state differs from what was cached before.
    fn lex_window(
        &mut self,
        resume: usize,
        start: usize,
        end: usize,
        mut state: LineState,
    ) -> (Vec<StyleSpan>, bool) {
        let mut out = Vec::new();
        let mut dirty = false;

        for idx in resume..end {
            let Some(text) = self.snapshot.line(idx) else {
                break;
            };
            let hash = hash_line(&text);

            let hit = if dirty {
                None
            } else {
                self.cache.get_mut(idx).filter(|e| e.matches(hash))
            };

            let spans = match hit {
                Some(entry) => {
                    if entry.spans.is_none() {
                        // Theme changed: same tokens, new styles
                        let (tokens, _) = self.lexer.tokenize(&text, &state);
                        entry.spans = Some(self.resolver.resolve(idx, &tokens));
                    }
                    state = entry.exit_state.clone();
                    entry.spans.as_deref().unwrap_or_default().to_vec()
                }
                None => {
                    let (spans, exit, changed) = self.relex(idx, &text, hash, &state);
                    dirty = changed;
                    state = exit;
                    spans
                }
            };

            if idx >= start {
                out.extend(spans);
            }
        }

        (out, dirty)
    }

    /// Keep lexing past the window until an exit state matches the cache
    /// again. Whatever is left unverified when the limit is hit is marked stale.
    fn propagate(&mut self, from: usize, available: usize, limit: Option<usize>) {
        let Some(mut state) = from
            .checked_sub(1)
            .and_then(|prev| self.cache.get(prev))
            .map(|e| e.exit_state.clone())
        else {
            return;
        };

        let mut idx = from;
        let mut relexed = 0;
        let mut dirty = true;

        while dirty && idx < available && limit.is_none_or(|max| relexed < max) {
            if self.cache.get(idx).is_none() {
                // Nothing cached downstream to keep consistent
                dirty = false;
                break;
            }
            let Some(text) = self.snapshot.line(idx) else {
                break;
            };
            let hash = hash_line(&text);
            let (_, exit, changed) = self.relex(idx, &text, hash, &state);
            dirty = changed;
            state = exit;
            idx += 1;
            relexed += 1;
        }

        if dirty {
            tracing::debug!(line = idx, relexed, "propagation stopped, marking rest stale");
            self.cache.invalidate_from(idx);
        } else {
            tracing::trace!(relexed, "propagation settled");
        }
    }

    /// Lex and resolve one line, store it, and report whether its exit state
    /// differs from the previously cached one
    fn relex(
        &mut self,
        idx: usize,
        text: &str,
        hash: u64,
        state: &LineState,
    ) -> (Vec<StyleSpan>, LineState, bool) {
        let (tokens, exit) = self.lexer.tokenize(text, state);
        let spans = self.resolver.resolve(idx, &tokens);
        let changed = self.cache.get(idx).is_none_or(|old| old.exit_state != exit);
        self.cache
            .put(idx, CacheEntry::new(idx, hash, exit.clone(), spans.clone()));
        (spans, exit, changed)
    }
}
