use thiserror::Error;

use crate::model::AttributeSet;

/// Failures of dependency generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Not enough mutually incomparable keys could be planted; retry with a
    /// different seed or profile.
    #[error("could only plant {planted} of {requested} candidate keys after {attempts} attempts")]
    InfeasibleProfile {
        requested: usize,
        planted: usize,
        attempts: usize,
    },
    #[error("universe size {size} is outside {min}..={max}")]
    UniverseOutOfBounds { size: usize, min: usize, max: usize },
    #[error("malformed dependency: {0}")]
    MalformedDependency(String),
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

impl GenerationError {
    pub fn is_infeasible(&self) -> bool {
        matches!(self, GenerationError::InfeasibleProfile { .. })
    }
}

/// Failures surfaced by a match session.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("unknown difficulty level {0}")]
    UnknownDifficulty(usize),
    #[error("a team needs at least one monster")]
    EmptyTeam,
    #[error("{0} is not part of this match")]
    AttributeOutOfUniverse(AttributeSet),
    #[error("the match is already over")]
    MatchOver,
    #[error("no match has been started")]
    NoMatch,
}

/// Failures loading settings or difficulty tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid difficulty table: {0}")]
    Invalid(String),
}
