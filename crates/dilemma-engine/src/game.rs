//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::bot::{Bot, HistoryView};
use crate::config::{GameConfig, PayoffTable, DEFAULT_ROUNDS};
use crate::error::{ConfigError, MatchError};
use crate::standings::{disambiguate_names, BehaviorStats, RoundOutcome};
use crate::strategy::Move;
use crate::transcript;

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// 1-based round index
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: i32,
    pub score_b: i32,
    pub cumulative_a: i64,
    pub cumulative_b: i64,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Display label of seat A
    pub bot_a: String,
    /// Display label of seat B, disambiguated if it collided with A
    pub bot_b: String,
    pub round_count: u32,
    pub rounds: Vec<RoundResult>,
    pub total_score_a: i64,
    pub total_score_b: i64,
    pub stats: BehaviorStats,
}

impl MatchResult {
    /// Human-readable round-by-round record
    pub fn transcript(&self) -> String {
        transcript::render_match(self)
    }
}

/// Per-match history table, one row per seat
///
/// Owned by the runner for the duration of a single match; bots only ever
/// see borrowed views of it.
struct MatchHistory {
    seats: [Vec<Move>; 2],
}

impl MatchHistory {
    fn with_capacity(rounds: u32) -> Self {
        let cap = rounds as usize;
        Self {
            seats: [Vec::with_capacity(cap), Vec::with_capacity(cap)],
        }
    }

    fn view<'a>(&'a self, seat: usize, round: u32, total_rounds: u32, payoff: &'a PayoffTable) -> HistoryView<'a> {
        HistoryView {
            my_history: &self.seats[seat],
            opponent_history: &self.seats[1 - seat],
            round,
            total_rounds,
            payoff,
        }
    }

    fn push(&mut self, move_a: Move, move_b: Move) {
        self.seats[0].push(move_a);
        self.seats[1].push(move_b);
    }
}

/// Plays fixed-length matches between two bots
#[derive(Clone, Debug)]
pub struct MatchRunner {
    rounds: u32,
    payoff: PayoffTable,
}

impl Default for MatchRunner {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            payoff: PayoffTable::default(),
        }
    }
}

impl MatchRunner {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rounds: config.rounds,
            payoff: config.payoff,
        })
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn payoff(&self) -> &PayoffTable {
        &self.payoff
    }

    /// Run a match between two bot instances
    ///
    /// If both bots report the same name, seat B is reported as a copy so
    /// the two never share an aggregate key.
    pub fn run_match(&self, bot_a: &mut dyn Bot, bot_b: &mut dyn Bot) -> Result<MatchResult, MatchError> {
        let labels = disambiguate_names(&[bot_a.name(), bot_b.name()]);
        self.run_labeled(&labels[0], bot_a, &labels[1], bot_b)
    }

    /// Run a match with display labels chosen by the caller
    pub fn run_labeled(
        &self,
        label_a: &str,
        bot_a: &mut dyn Bot,
        label_b: &str,
        bot_b: &mut dyn Bot,
    ) -> Result<MatchResult, MatchError> {
        // Whatever a bot learned in a previous match must not leak into this one
        bot_a.reset();
        bot_b.reset();

        let mut history = MatchHistory::with_capacity(self.rounds);
        let mut rounds: Vec<RoundResult> = Vec::with_capacity(self.rounds as usize);
        let mut stats = BehaviorStats::default();
        let mut total_a = 0i64;
        let mut total_b = 0i64;

        for round in 1..=self.rounds {
            // Both moves are chosen before either is recorded
            let move_a = decide(bot_a, label_a, &history.view(0, round, self.rounds, &self.payoff))?;
            let move_b = decide(bot_b, label_b, &history.view(1, round, self.rounds, &self.payoff))?;

            let (score_a, score_b) = self.payoff.score(move_a, move_b);
            total_a += score_a as i64;
            total_b += score_b as i64;

            history.push(move_a, move_b);
            stats.record(RoundOutcome::classify(move_a, move_b));

            rounds.push(RoundResult {
                round,
                move_a,
                move_b,
                score_a,
                score_b,
                cumulative_a: total_a,
                cumulative_b: total_b,
            });
        }

        tracing::debug!(
            bot_a = label_a,
            bot_b = label_b,
            score_a = total_a,
            score_b = total_b,
            "match finished"
        );

        Ok(MatchResult {
            bot_a: label_a.to_string(),
            bot_b: label_b.to_string(),
            round_count: self.rounds,
            rounds,
            total_score_a: total_a,
            total_score_b: total_b,
            stats,
        })
    }
}

fn decide(bot: &mut dyn Bot, label: &str, view: &HistoryView<'_>) -> Result<Move, MatchError> {
    bot.decide(view).map_err(|source| MatchError::ContractViolation {
        bot: label.to_string(),
        round: view.round,
        source,
    })
}
