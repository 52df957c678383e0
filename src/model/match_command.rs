use super::{AttributeSet, Difficulty};

#[derive(Debug, Clone)]
pub enum MatchCommand {
    NewMatch(Difficulty, Option<u64>), // difficulty, seed
    SubmitTeam(AttributeSet),
    NewRound,
}
