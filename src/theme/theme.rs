use std::path::Path;

use syntect::LoadingError;
use syntect::highlighting::{Theme, ThemeSet};

use super::Color;
use crate::error::LoadError;

/// Whether a theme is meant for light or dark appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    Light,
    Dark,
}

impl ThemeKind {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark { ThemeKind::Dark } else { ThemeKind::Light }
    }

    /// tmTheme files don't say which appearance they target, so go by
    /// how bright the background is
    pub fn of(theme: &Theme) -> Self {
        if background(theme).luma() < 128 {
            ThemeKind::Dark
        } else {
            ThemeKind::Light
        }
    }
}

/// Global background, white when the theme leaves it unset
pub fn background(theme: &Theme) -> Color {
    theme.settings.background.map(Color::from).unwrap_or(Color::WHITE)
}

/// A loaded theme under the name it is selected by
#[derive(Debug, Clone)]
pub struct NamedTheme {
    /// File stem for themes from a folder, as with `ThemeSet::load_from_folder`
    pub name: String,
    pub kind: ThemeKind,
    pub theme: Theme,
}

impl NamedTheme {
    pub fn new(name: impl Into<String>, theme: Theme) -> Self {
        Self {
            name: name.into(),
            kind: ThemeKind::of(&theme),
            theme,
        }
    }

    /// Load a `.tmTheme` file, named after its file stem
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let theme = ThemeSet::get_theme(path).map_err(|err| match err {
            LoadingError::Io(source) => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => LoadError::malformed(path, other),
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, theme))
    }

    /// Matches the file stem or the name inside the theme, ignoring case
    pub fn is_named(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
            || self
                .theme
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(query))
    }

    pub fn background(&self) -> Color {
        background(&self.theme)
    }
}
