//! Configuration - `Settings` filled in by an optional Rhai script
//! (`highlighter.rhai`) living next to the grammar and theme definitions.

mod engine;
mod settings;

pub use engine::{CONFIG_FILE_NAME, ConfigEngine};
pub use settings::Settings;
