//! Iterated Prisoner's Dilemma engine
//!
//! Pluggable bots play fixed-length matches under a configurable payoff
//! table. On top of the match runner sit a multi-opponent session runner
//! and a round-robin tournament scheduler, both of which aggregate scores
//! and behavioural statistics into standings.

mod bot;
mod config;
mod error;
mod game;
mod loader;
mod pairing;
mod random;
mod registry;
mod schedule;
mod session;
mod standings;
mod strategy;
mod tournament;
mod transcript;

pub use bot::{Bot, HistoryView, StrategyBot};
pub use config::{GameConfig, PayoffTable, DEFAULT_ROUNDS};
pub use error::{ConfigError, LoadCause, LoadError, MatchError, SessionError, StrategyError, TournamentError};
pub use game::{MatchResult, MatchRunner, RoundResult};
pub use loader::{BotDescriptor, DescriptorFile};
pub use pairing::{all_pairings, pairing_for_match, round_robin_match_count};
pub use random::SeededRng;
pub use registry::{BotFactory, BotRegistry, CatalogEntry, FnFactory, StrategyFactory};
pub use session::{FailureKind, SessionReport, SessionRunner, SkippedPairing};
pub use standings::{disambiguate_names, percent, BehaviorStats, RoundOutcome, StandingEntry, Standings};
pub use strategy::{describe_strategy, execute_strategy, Move, Strategy, StrategyBase, StrategyParams};
pub use tournament::{TournamentReport, TournamentRunner};
pub use transcript::{render_match, render_session, render_tournament};

/// Score one round under the classic 3/5/0/1 table
/// Returns (score_a, score_b)
pub fn payoff(a: Move, b: Move) -> (i32, i32) {
    PayoffTable::default().score(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoff_matrix() {
        assert_eq!(payoff(Move::Cooperate, Move::Cooperate), (3, 3));
        assert_eq!(payoff(Move::Cooperate, Move::Defect), (0, 5));
        assert_eq!(payoff(Move::Defect, Move::Cooperate), (5, 0));
        assert_eq!(payoff(Move::Defect, Move::Defect), (1, 1));
    }
}
