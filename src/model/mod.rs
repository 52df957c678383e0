mod attribute;
pub(crate) mod attribute_set;
mod closure_record;
mod dependency_set;
mod difficulty;
mod difficulty_profile;
mod functional_dependency;
mod match_command;
mod match_event;
mod match_stats;
mod match_view;

pub use attribute::{Attribute, MAX_ATTRIBUTES};
pub use attribute_set::{AttributeSet, ParseAttributeError};
pub use closure_record::{ClosureEntry, ClosureRecord};
pub use dependency_set::DependencySet;
pub use difficulty::Difficulty;
pub use difficulty_profile::{DifficultyProfile, DifficultyTable};
pub use functional_dependency::FunctionalDependency;
pub use match_command::MatchCommand;
pub use match_event::{MatchCompletionState, MatchEvent};
pub use match_stats::MatchStats;
pub use match_view::{MatchView, Submission};

/// A minimal attribute set whose closure is the whole universe.
pub type CandidateKey = AttributeSet;
