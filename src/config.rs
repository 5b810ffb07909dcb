//! Runtime configuration. There is no global state: `main` builds one `Config`
//! and hands it to [`crate::Database::open`].

use std::path::{Path, PathBuf};

/// SQLite file created in the working directory when no path is given.
pub const DEFAULT_DB_FILE: &str = "hospital.db";

/// Settings passed explicitly into the persistence and console layers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the SQLite database file.
    pub db_path: PathBuf,
    /// Whether status lines are coloured with ANSI escapes.
    pub color: bool,
}

impl Config {
    /// Build a configuration for the given database file with colour enabled.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            color: true,
        }
    }

    /// Toggle colour output, typically off when stdout is not a terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Path of the SQLite file to open.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE)
    }
}
