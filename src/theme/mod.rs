mod colors;
mod resolver;
mod theme;

use syntect::highlighting::ThemeSet;

pub use colors::Color;
pub use resolver::{StyleResolver, StyleSpan};
pub use theme::{NamedTheme, ThemeKind, background};

/// Built-in theme for a mode, used when a folder has none of that kind
pub fn default_theme(kind: ThemeKind) -> NamedTheme {
    let name = match kind {
        ThemeKind::Light => "InspiredGitHub",
        ThemeKind::Dark => "base16-ocean.dark",
    };
    let mut builtin = ThemeSet::load_defaults();
    let theme = builtin.themes.remove(name).unwrap_or_default();
    NamedTheme {
        name: name.to_string(),
        kind,
        theme,
    }
}

/// A theme bundled with syntect, looked up by name ignoring case
pub fn get_builtin_theme(name: &str) -> Option<NamedTheme> {
    ThemeSet::load_defaults()
        .themes
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(key, theme)| NamedTheme::new(key, theme))
}
