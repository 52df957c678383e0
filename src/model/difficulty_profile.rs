use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Difficulty, MAX_ATTRIBUTES};
use crate::errors::{ConfigError, GenerationError};

const EMBEDDED_TABLE: &str = include_str!("../../resources/difficulty.json");

/// Shape constraints handed to the dependency generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    #[serde(default)]
    pub name: String,
    pub min_attributes: usize,
    pub max_attributes: usize,
    #[serde(alias = "min_FDs")]
    pub min_fds: usize,
    #[serde(alias = "max_FDs")]
    pub max_fds: usize,
    pub candidate_keys: usize,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub redundant: bool,
    #[serde(default)]
    pub cyclic: bool,
}

fn default_rounds() -> u32 {
    3
}

impl DifficultyProfile {
    pub fn attribute_range(&self) -> RangeInclusive<usize> {
        self.min_attributes..=self.max_attributes
    }

    pub fn dependency_range(&self) -> RangeInclusive<usize> {
        self.min_fds..=self.max_fds
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.min_attributes == 0 || self.min_attributes > self.max_attributes {
            return Err(GenerationError::InvalidProfile(format!(
                "attribute bounds {}..={} are empty",
                self.min_attributes, self.max_attributes
            )));
        }
        if self.max_attributes > MAX_ATTRIBUTES {
            return Err(GenerationError::InvalidProfile(format!(
                "at most {} attributes are supported, got {}",
                MAX_ATTRIBUTES, self.max_attributes
            )));
        }
        if self.min_fds == 0 || self.min_fds > self.max_fds {
            return Err(GenerationError::InvalidProfile(format!(
                "dependency bounds {}..={} are empty",
                self.min_fds, self.max_fds
            )));
        }
        if self.candidate_keys == 0 {
            return Err(GenerationError::InvalidProfile(
                "at least one candidate key is required".to_string(),
            ));
        }
        if self.rounds == 0 {
            return Err(GenerationError::InvalidProfile(
                "at least one round is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// One profile per `Difficulty`, in `Difficulty::index` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    difficulty_levels: Vec<DifficultyProfile>,
}

impl DifficultyTable {
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_TABLE)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let table: DifficultyTable = serde_json::from_str(contents)?;
        let expected = Difficulty::all().len();
        if table.difficulty_levels.len() != expected {
            return Err(ConfigError::Invalid(format!(
                "expected {} difficulty levels, found {}",
                expected,
                table.difficulty_levels.len()
            )));
        }
        for (idx, profile) in table.difficulty_levels.iter().enumerate() {
            profile
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("level {}: {}", idx, e)))?;
        }
        Ok(table)
    }

    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        // from_json guarantees one entry per level
        &self.difficulty_levels[difficulty.index()]
    }

    pub fn profiles(&self) -> impl Iterator<Item = (Difficulty, &DifficultyProfile)> + '_ {
        Difficulty::all()
            .into_iter()
            .zip(self.difficulty_levels.iter())
    }
}
