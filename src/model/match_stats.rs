use crate::model::Difficulty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct MatchStats {
    pub difficulty: Difficulty,
    pub monsters_used: usize,
    pub rounds_used: u32,
    pub keys_found: usize,
    pub total_keys: usize,
    pub teams_submitted: usize,
    pub timestamp: i64,
    pub match_id: Uuid,
}

impl MatchStats {
    pub fn keys_missing(&self) -> usize {
        self.total_keys.saturating_sub(self.keys_found)
    }
}
