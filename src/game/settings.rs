use crate::errors::ConfigError;
use crate::model::{Difficulty, DifficultyTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Fixed seed for every match; `None` draws a fresh one per match.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Alternate difficulty table in the same shape as the built-in one.
    #[serde(default)]
    pub profiles_path: Option<PathBuf>,

    /// Reveal planted keys in the front end.
    #[serde(default)]
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            difficulty: Difficulty::default(),
            seed: None,
            profiles_path: None,
            debug_mode: false,
        }
    }
}

impl Settings {
    /// Defaults, overridden by the file at `path` if given, then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => {
                let contents = fs::read_to_string(path)?;
                serde_json::from_str::<Settings>(&contents)?
            }
            None => Settings::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Some(seed) = Self::seed_from_env() {
            self.seed = Some(seed);
        }
        if Self::is_debug_mode() {
            self.debug_mode = true;
        }
    }

    pub fn difficulty_table(&self) -> Result<DifficultyTable, ConfigError> {
        match &self.profiles_path {
            Some(path) => DifficultyTable::load(path),
            None => DifficultyTable::embedded(),
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    /// `SEED` if it is set and parses as an integer.
    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}
