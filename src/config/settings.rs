/// Engine settings that can be customized via `highlighter.rhai`
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // Selection (by name, or by file extension for grammars)
    pub grammar: Option<String>,
    pub light_theme: Option<String>,
    pub dark_theme: Option<String>,
    pub dark_mode: bool,

    // Lexing
    pub max_line_length: usize,

    // Incremental cache: lines re-lexed past the requested window, 0 = unlimited
    pub propagation_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grammar: None,
            light_theme: None,
            dark_theme: None,
            dark_mode: false,

            max_line_length: 500,

            propagation_limit: 1024,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagation limit as an optional bound
    pub fn propagation_bound(&self) -> Option<usize> {
        match self.propagation_limit {
            0 => None,
            n => Some(n),
        }
    }
}
