pub mod errors;
pub mod game;
pub mod model;

pub use errors::{ConfigError, GenerationError, MatchError};
pub use game::{closure, generate_dependencies, MatchState, Settings};
