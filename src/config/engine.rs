use std::path::Path;
use std::sync::{Arc, RwLock};

use rhai::{Engine, Scope};

use super::Settings;
use crate::error::LoadError;

/// Name of the optional config script at the top of a definitions folder
pub const CONFIG_FILE_NAME: &str = "highlighter.rhai";

/// The Rhai scripting engine for configuration
pub struct ConfigEngine {
    engine: Engine,
    settings: Arc<RwLock<Settings>>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        let settings = Arc::new(RwLock::new(Settings::default()));
        let engine = Self::create_engine(Arc::clone(&settings));

        Self { engine, settings }
    }

    fn create_engine(settings: Arc<RwLock<Settings>>) -> Engine {
        let mut engine = Engine::new();

        // Limit script execution for safety
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_grammar", move |name: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.grammar = Some(name.to_string());
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_light_theme", move |name: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.light_theme = Some(name.to_string());
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_dark_theme", move |name: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.dark_theme = Some(name.to_string());
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_dark_mode", move |enabled: bool| {
                if let Ok(mut settings) = s.write() {
                    settings.dark_mode = enabled;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_line_length", move |len: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_line_length = len.clamp(16, 1 << 20) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_propagation_limit", move |lines: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.propagation_limit = lines.max(0) as usize;
                }
            });
        }

        engine.on_print(|msg| {
            tracing::info!(target: "linelight::config", "{}", msg);
        });

        engine
    }

    /// Load and execute a config file
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.eval(&content)
            .map_err(|reason| LoadError::malformed(path, reason))
    }

    /// Evaluate a Rhai script string
    pub fn eval(&mut self, script: &str) -> Result<(), String> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| format!("Config parse error: {}", e))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| format!("Config error: {}", e))?;

        Ok(())
    }

    /// Get the current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Load `highlighter.rhai` from a definitions folder if it exists
    pub fn load_from_folder(&mut self, folder: &Path) -> Result<(), LoadError> {
        let config_file = folder.join(CONFIG_FILE_NAME);
        if config_file.is_file() {
            return self.load_file(&config_file);
        }
        Ok(()) // No config file is fine
    }
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}
