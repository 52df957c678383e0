use chrono::Utc;
use log::{info, trace, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use uuid::Uuid;

use super::closure::{closure, is_candidate_key};
use super::dependency_generator::{generate_dependencies, pick_universe_size, GeneratorResult};
use crate::errors::{ConfigError, GenerationError, MatchError};
use crate::model::{
    AttributeSet, ClosureRecord, DependencySet, Difficulty, DifficultyProfile, DifficultyTable,
    MatchCommand, MatchCompletionState, MatchEvent, MatchStats, MatchView, Submission,
};

/// Fresh seeds tried when a profile cannot plant its keys.
const GENERATION_RETRIES: usize = 5;

struct MatchInfo {
    match_id: Uuid,
    difficulty: Difficulty,
    profile: DifficultyProfile,
    attributes: AttributeSet,
    candidate_keys: Vec<AttributeSet>,
    dependencies: DependencySet,
    keys_found: usize,
    monsters_used: usize,
    round: u32,
    history: ClosureRecord,
    seed: u64,
    started_at: i64,
}

/// One player's session. Owns the current match and hands closure and
/// generation work to the pure functions in this module's siblings.
pub struct MatchState {
    table: DifficultyTable,
    current: Option<MatchInfo>,
}

impl MatchState {
    pub fn new(table: DifficultyTable) -> Self {
        Self {
            table,
            current: None,
        }
    }

    pub fn with_embedded_table() -> Result<Self, ConfigError> {
        Ok(Self::new(DifficultyTable::embedded()?))
    }

    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        self.table.profile(difficulty)
    }

    pub fn start_match_at_level(
        &mut self,
        level: usize,
        seed: Option<u64>,
    ) -> Result<MatchView, MatchError> {
        let difficulty = Difficulty::from_index(level).ok_or(MatchError::UnknownDifficulty(level))?;
        self.start_match(difficulty, seed)
    }

    /// Generates a new dependency set and resets every counter. An
    /// infeasible draw is retried with fresh seeds a few times before the
    /// error is handed back.
    pub fn start_match(
        &mut self,
        difficulty: Difficulty,
        seed: Option<u64>,
    ) -> Result<MatchView, MatchError> {
        let profile = self.table.profile(difficulty).clone();
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        let mut rng = StdRng::seed_from_u64(seed);

        let mut attempt = 0;
        let result = loop {
            attempt += 1;
            let universe_size = pick_universe_size(&profile, &mut rng);
            match generate_dependencies(universe_size, &profile, Some(rng.next_u64())) {
                Ok(result) => break result,
                Err(e @ GenerationError::InfeasibleProfile { .. }) if attempt < GENERATION_RETRIES => {
                    warn!(
                        target: "match_state",
                        "Generation attempt {} for {} failed: {}; retrying",
                        attempt,
                        difficulty,
                        e
                    );
                }
                Err(e) => return Err(e.into()),
            }
        };

        Ok(self.start_prepared_match(difficulty, result, seed))
    }

    /// Starts a match over an already generated dependency set.
    pub fn start_prepared_match(
        &mut self,
        difficulty: Difficulty,
        result: GeneratorResult,
        seed: u64,
    ) -> MatchView {
        let profile = self.table.profile(difficulty).clone();
        let info = MatchInfo {
            match_id: Uuid::new_v4(),
            difficulty,
            profile,
            attributes: result.attributes,
            candidate_keys: result.candidate_keys,
            dependencies: result.dependencies,
            keys_found: 0,
            monsters_used: 0,
            round: 1,
            history: ClosureRecord::new(),
            seed,
            started_at: Utc::now().timestamp(),
        };
        info!(
            target: "match_state",
            "New match {}; difficulty: {}; attributes: {}; dependencies: {}; seed: {}",
            info.match_id,
            info.difficulty,
            info.attributes,
            info.dependencies.len(),
            info.seed
        );
        let view = Self::build_view(&info);
        self.current = Some(info);
        view
    }

    pub fn view(&self) -> Option<MatchView> {
        self.current.as_ref().map(Self::build_view)
    }

    fn build_view(info: &MatchInfo) -> MatchView {
        MatchView {
            match_id: info.match_id,
            difficulty: info.difficulty,
            attributes: info.attributes.clone(),
            dependencies: info.dependencies.clone(),
            total_keys: info.profile.candidate_keys,
            keys_found: info.keys_found,
            monsters_used: info.monsters_used,
            round: info.round,
            total_rounds: info.profile.rounds,
            history: info.history.entries().to_vec(),
        }
    }

    /// The keys planted by the generator, for debug display.
    pub fn planted_keys(&self) -> Option<&[AttributeSet]> {
        self.current.as_ref().map(|info| info.candidate_keys.as_slice())
    }

    pub fn seed(&self) -> Option<u64> {
        self.current.as_ref().map(|info| info.seed)
    }

    pub fn was_submitted_before(&self, team: &AttributeSet) -> bool {
        self.current
            .as_ref()
            .map(|info| info.history.contains(team))
            .unwrap_or(false)
    }

    /// Sends `team` into battle and returns what it defeats.
    pub fn submit_team(&mut self, team: &AttributeSet) -> Result<Submission, MatchError> {
        if self.completion_state()?.is_over() {
            return Err(MatchError::MatchOver);
        }
        let info = self.current.as_mut().ok_or(MatchError::NoMatch)?;
        if team.is_empty() {
            return Err(MatchError::EmptyTeam);
        }
        if !team.is_subset(&info.attributes) {
            return Err(MatchError::AttributeOutOfUniverse(team.difference(&info.attributes)));
        }

        let fds = info.dependencies.as_slice();
        if let Some(recorded) = info.history.get(team) {
            trace!(target: "match_state", "Team {} was submitted before", team);
            return Ok(Submission {
                team: team.clone(),
                closure: recorded.clone(),
                is_superkey: recorded.is_superset(&info.attributes),
                is_candidate_key: is_candidate_key(fds, team, &info.attributes),
                newly_found: false,
                was_submitted_before: true,
            });
        }

        let team_closure = closure(fds, team);
        let is_superkey = team_closure.is_superset(&info.attributes);
        let is_key = is_superkey && is_candidate_key(fds, team, &info.attributes);

        info.history.record(team.clone(), team_closure.clone());
        info.monsters_used += team.len();
        if is_key {
            info.keys_found += 1;
        }
        info!(
            target: "match_state",
            "Team {} defeats {}; candidate key: {}; keys found: {}/{}",
            team,
            team_closure,
            is_key,
            info.keys_found,
            info.profile.candidate_keys
        );

        Ok(Submission {
            team: team.clone(),
            closure: team_closure,
            is_superkey,
            is_candidate_key: is_key,
            newly_found: is_key,
            was_submitted_before: false,
        })
    }

    pub fn advance_round(&mut self) -> Result<u32, MatchError> {
        if self.completion_state()?.is_over() {
            return Err(MatchError::MatchOver);
        }
        let info = self.current.as_mut().ok_or(MatchError::NoMatch)?;
        info.round += 1;
        trace!(target: "match_state", "Round {}/{}", info.round, info.profile.rounds);
        Ok(info.round)
    }

    pub fn completion_state(&self) -> Result<MatchCompletionState, MatchError> {
        let info = self.current.as_ref().ok_or(MatchError::NoMatch)?;
        if info.keys_found >= info.profile.candidate_keys {
            Ok(MatchCompletionState::Won(self.stats_for(info)))
        } else if info.round > info.profile.rounds {
            Ok(MatchCompletionState::Lost(self.stats_for(info)))
        } else {
            Ok(MatchCompletionState::InProgress)
        }
    }

    fn stats_for(&self, info: &MatchInfo) -> MatchStats {
        MatchStats {
            difficulty: info.difficulty,
            monsters_used: info.monsters_used,
            rounds_used: info.round.min(info.profile.rounds),
            keys_found: info.keys_found,
            total_keys: info.profile.candidate_keys,
            teams_submitted: info.history.len(),
            timestamp: info.started_at,
            match_id: info.match_id,
        }
    }

    pub fn handle_command(&mut self, command: MatchCommand) -> Vec<MatchEvent> {
        trace!(target: "match_state", "Handling command {:?}", command);
        let result = match command {
            MatchCommand::NewMatch(difficulty, seed) => self
                .start_match(difficulty, seed)
                .map(|view| vec![MatchEvent::MatchStarted(view)]),
            MatchCommand::SubmitTeam(team) => self
                .submit_team(&team)
                .map(|submission| vec![MatchEvent::TeamResolved(submission)]),
            MatchCommand::NewRound => self.advance_round().map(|round| {
                vec![MatchEvent::RoundAdvanced {
                    round,
                    total_rounds: self.current.as_ref().map(|i| i.profile.rounds).unwrap_or(0),
                }]
            }),
        };

        match result {
            Ok(mut events) => {
                if let Ok(state) = self.completion_state() {
                    if state.is_over() && !matches!(events.first(), Some(MatchEvent::MatchStarted(_))) {
                        events.push(MatchEvent::MatchCompleted(state));
                    }
                }
                events
            }
            Err(e) => {
                warn!(target: "match_state", "Command rejected: {}", e);
                vec![MatchEvent::CommandRejected(e.to_string())]
            }
        }
    }
}
