use super::{MatchStats, MatchView, Submission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCompletionState {
    InProgress,
    Won(MatchStats),
    Lost(MatchStats),
}

impl MatchCompletionState {
    pub fn is_over(&self) -> bool {
        !matches!(self, MatchCompletionState::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    MatchStarted(MatchView),
    TeamResolved(Submission),
    RoundAdvanced { round: u32, total_rounds: u32 },
    MatchCompleted(MatchCompletionState),
    CommandRejected(String),
}
