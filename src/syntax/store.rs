//! Syntax and theme registry loaded from a definitions folder

use std::fs;
use std::path::{Path, PathBuf};

use syntect::parsing::{SyntaxDefinition, SyntaxReference, SyntaxSet, SyntaxSetBuilder};

use crate::config::{CONFIG_FILE_NAME, ConfigEngine, Settings};
use crate::error::LoadError;
use crate::theme::{NamedTheme, ThemeKind, default_theme, get_builtin_theme};

const SYNTAX_EXTENSION: &str = "sublime-syntax";
const THEME_EXTENSION: &str = "tmTheme";

/// Every syntax and theme found in a folder, plus the active selection
pub struct GrammarStore {
    syntaxes: SyntaxSet,
    themes: Vec<NamedTheme>,
    settings: Settings,
    syntax: usize,
    light_theme: usize,
    dark_theme: usize,
}

impl GrammarStore {
    /// Scan `folder` recursively for `*.sublime-syntax` and `*.tmTheme`
    /// files and run its `highlighter.rhai`, if any.
    pub fn load(folder: &Path) -> Result<Self, LoadError> {
        if !folder.is_dir() {
            return Err(LoadError::Missing(folder.to_path_buf()));
        }

        let mut files = Vec::new();
        collect_definition_files(folder, &mut files)?;

        let mut builder = SyntaxSetBuilder::new();
        let mut syntax_count = 0;
        let mut themes = Vec::new();
        for path in &files {
            match extension(path) {
                Some(SYNTAX_EXTENSION) => {
                    builder.add(load_syntax(path)?);
                    syntax_count += 1;
                }
                Some(THEME_EXTENSION) => themes.push(NamedTheme::load(path)?),
                _ => {}
            }
        }

        if syntax_count == 0 && themes.is_empty() {
            return Err(LoadError::Missing(folder.to_path_buf()));
        }

        let mut config = ConfigEngine::new();
        config.load_from_folder(folder)?;

        tracing::info!(
            folder = %folder.display(),
            syntaxes = syntax_count,
            themes = themes.len(),
            "loaded definitions"
        );

        Ok(Self::assemble(builder, themes, config.settings()))
    }

    /// Plain-text syntax with the built-in themes. Never fails.
    pub fn plain_text() -> Self {
        Self::assemble(SyntaxSetBuilder::new(), Vec::new(), Settings::default())
    }

    /// Fill the gaps of a partial folder and resolve the selection
    fn assemble(mut builder: SyntaxSetBuilder, mut themes: Vec<NamedTheme>, settings: Settings) -> Self {
        // Added last, so a folder's first syntax stays at index 0
        builder.add_plain_text_syntax();
        let syntaxes = builder.build();

        if themes.is_empty() {
            themes.push(default_theme(ThemeKind::Light));
            themes.push(default_theme(ThemeKind::Dark));
        }

        let syntax = match &settings.grammar {
            Some(query) => find_syntax(&syntaxes, query).unwrap_or_else(|| {
                tracing::warn!(
                    grammar = %query,
                    "unknown grammar, using {}",
                    syntaxes.syntaxes()[0].name
                );
                0
            }),
            None => 0,
        };

        let light_theme = select_theme(&mut themes, settings.light_theme.as_deref(), ThemeKind::Light);
        let dark_theme = select_theme(&mut themes, settings.dark_theme.as_deref(), ThemeKind::Dark);

        Self {
            syntaxes,
            themes,
            settings,
            syntax,
            light_theme,
            dark_theme,
        }
    }

    /// The syntax used for highlighting
    pub fn grammar(&self) -> &SyntaxReference {
        &self.syntaxes.syntaxes()[self.syntax]
    }

    pub fn grammar_by_name_or_extension(&self, query: &str) -> Option<&SyntaxReference> {
        find_syntax(&self.syntaxes, query).map(|i| &self.syntaxes.syntaxes()[i])
    }

    pub fn grammars(&self) -> &[SyntaxReference] {
        self.syntaxes.syntaxes()
    }

    /// The linked set the selected syntax belongs to
    pub fn syntax_set(&self) -> &SyntaxSet {
        &self.syntaxes
    }

    /// The theme serving the given appearance
    pub fn theme(&self, kind: ThemeKind) -> &NamedTheme {
        match kind {
            ThemeKind::Light => &self.themes[self.light_theme],
            ThemeKind::Dark => &self.themes[self.dark_theme],
        }
    }

    pub fn themes(&self) -> &[NamedTheme] {
        &self.themes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn load_syntax(path: &Path) -> Result<SyntaxDefinition, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback_name = path.file_stem().and_then(|s| s.to_str());
    SyntaxDefinition::load_from_str(&content, true, fallback_name)
        .map_err(|err| LoadError::malformed(path, err))
}

/// Index of the syntax with this name or file extension, ignoring case
/// and a leading dot
fn find_syntax(syntaxes: &SyntaxSet, query: &str) -> Option<usize> {
    let query = query.trim_start_matches('.');
    syntaxes.syntaxes().iter().position(|s| {
        s.name.eq_ignore_ascii_case(query)
            || s.file_extensions.iter().any(|e| e.eq_ignore_ascii_case(query))
    })
}

/// Theme named by the config (from the folder, or a built-in by that name),
/// else the first of the wanted kind, else the first theme at all.
/// A folder with a single kind uses it for both modes.
fn select_theme(themes: &mut Vec<NamedTheme>, name: Option<&str>, kind: ThemeKind) -> usize {
    if let Some(name) = name {
        if let Some(i) = themes.iter().position(|t| t.is_named(name)) {
            return i;
        }
        if let Some(theme) = get_builtin_theme(name) {
            themes.push(theme);
            return themes.len() - 1;
        }
        tracing::warn!(theme = %name, ?kind, "unknown theme, using default");
    }
    themes.iter().position(|t| t.kind == kind).unwrap_or(0)
}

/// Recursive, sorted walk. Hidden entries and the config script are skipped.
fn collect_definition_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let read_dir = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut entries: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !file_name(p).starts_with('.'))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_definition_files(&path, files)?;
        } else if matches!(extension(&path), Some(SYNTAX_EXTENSION | THEME_EXTENSION)) {
            files.push(path);
        } else if file_name(&path) != CONFIG_FILE_NAME {
            tracing::debug!(file = %path.display(), "ignoring unrelated file");
        }
    }
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
