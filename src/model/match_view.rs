use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttributeSet, ClosureEntry, DependencySet, Difficulty};

/// Everything a front end needs to draw the current match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchView {
    pub match_id: Uuid,
    pub difficulty: Difficulty,
    pub attributes: AttributeSet,
    pub dependencies: DependencySet,
    pub total_keys: usize,
    pub keys_found: usize,
    pub monsters_used: usize,
    pub round: u32,
    pub total_rounds: u32,
    pub history: Vec<ClosureEntry>,
}

impl MatchView {
    pub fn n_attributes(&self) -> usize {
        self.attributes.len()
    }
}

/// Result of sending a team into battle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    pub team: AttributeSet,
    pub closure: AttributeSet,
    /// The closure covers every attribute.
    pub is_superkey: bool,
    /// A superkey with no redundant member.
    pub is_candidate_key: bool,
    /// Counted towards the goal by this submission.
    pub newly_found: bool,
    pub was_submitted_before: bool,
}

impl Submission {
    /// Opponents left standing.
    pub fn survivors(&self, attributes: &AttributeSet) -> AttributeSet {
        attributes.difference(&self.closure)
    }
}
