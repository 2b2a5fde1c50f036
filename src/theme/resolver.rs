//! Maps token scopes to concrete styles using a theme's selector rules

use serde::Serialize;
use syntect::highlighting::{FontStyle, Highlighter, Style, Theme};
use syntect::parsing::ScopeStack;

use super::Color;
use crate::syntax::Token;

/// A styled byte range of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StyleSpan {
    pub line: usize,
    pub offset: usize,
    pub length: usize,
    pub foreground: Color,
    pub background: Color,
    pub bold: bool,
    pub underline: bool,
    pub italic: bool,
}

impl StyleSpan {
    fn new(line: usize, token: &Token, style: Style) -> Self {
        Self {
            line,
            offset: token.start,
            length: token.len,
            foreground: style.foreground.into(),
            background: style.background.into(),
            bold: style.font_style.contains(FontStyle::BOLD),
            underline: style.font_style.contains(FontStyle::UNDERLINE),
            italic: style.font_style.contains(FontStyle::ITALIC),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Resolves styles against one theme
pub struct StyleResolver<'t> {
    highlighter: Highlighter<'t>,
}

impl<'t> StyleResolver<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self {
            highlighter: Highlighter::new(theme),
        }
    }

    /// Style for a scope stack. The most specific matching selector wins
    /// per attribute; unmatched attributes fall back to the theme globals.
    pub fn style_for(&self, scopes: &ScopeStack) -> Style {
        self.highlighter.style_for_stack(scopes.as_slice())
    }

    /// One span per token. Boundaries come from the tokens alone, so every
    /// theme splits a line the same way.
    pub fn resolve(&self, line: usize, tokens: &[Token]) -> Vec<StyleSpan> {
        tokens
            .iter()
            .filter(|token| token.len > 0)
            .map(|token| StyleSpan::new(line, token, self.style_for(&token.scope)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::NamedTheme;
    use crate::test_support::{folder, tm_theme};

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const GREY: Color = Color::rgb(0x80, 0x80, 0x80);

    fn theme() -> Theme {
        let source = tm_theme(
            "Test",
            "#ffffff",
            "#000000",
            &[
                ("string", "#00ff00", "italic"),
                ("constant.character", "#ff0000", ""),
                ("keyword", "#0000ff", "bold"),
                ("keyword.control", "#808080", "bold"),
            ],
        );
        let dir = folder(&[("Test.tmTheme", &source)]);
        NamedTheme::load(&dir.path().join("Test.tmTheme")).unwrap().theme
    }

    fn stack(scopes: &str) -> ScopeStack {
        scopes.parse().unwrap()
    }

    fn token(scopes: &str, start: usize, len: usize) -> Token {
        Token {
            scope: stack(scopes),
            start,
            len,
        }
    }

    #[test]
    fn unmatched_scope_uses_theme_defaults() {
        let theme = theme();
        let style = StyleResolver::new(&theme).style_for(&stack("source.js"));
        assert_eq!(Color::from(style.foreground), Color::BLACK);
        assert_eq!(Color::from(style.background), Color::WHITE);
        assert!(style.font_style.is_empty());
    }

    #[test]
    fn deeper_scope_overrides_ancestor() {
        let theme = theme();
        let resolver = StyleResolver::new(&theme);
        let style = resolver.style_for(&stack("source.js string.quoted constant.character.escape"));
        assert_eq!(Color::from(style.foreground), RED);
        assert_eq!(Color::from(style.background), Color::WHITE);

        let plain = resolver.style_for(&stack("source.js string.quoted"));
        assert_eq!(Color::from(plain.foreground), GREEN);
        assert!(plain.font_style.contains(FontStyle::ITALIC));
    }

    #[test]
    fn longer_selector_wins() {
        let theme = theme();
        let resolver = StyleResolver::new(&theme);
        let style = resolver.style_for(&stack("source.js keyword.control.flow"));
        assert_eq!(Color::from(style.foreground), GREY);
    }

    #[test]
    fn resolve_keeps_token_boundaries() {
        let theme = theme();
        let resolver = StyleResolver::new(&theme);
        let tokens = vec![
            token("source.js keyword", 0, 3),
            token("source.js", 3, 1),
            token("source.js meta.unstyled", 4, 2),
            token("source.js string.quoted", 6, 4),
            token("source.js", 10, 0),
        ];
        let spans = resolver.resolve(7, &tokens);
        let ranges: Vec<(usize, usize)> = spans.iter().map(|s| (s.offset, s.length)).collect();
        // Neighbours styled alike stay separate
        assert_eq!(ranges, vec![(0, 3), (3, 1), (4, 2), (6, 4)]);
        assert_eq!(spans[1].foreground, spans[2].foreground);
        assert!(spans.iter().all(|s| s.line == 7));
        assert!(spans[0].bold);
        assert!(spans[3].italic);
    }

    #[test]
    fn resolve_empty_line() {
        let theme = theme();
        assert!(StyleResolver::new(&theme).resolve(0, &[]).is_empty());
    }
}
