//! The contract every bot implements

use crate::config::PayoffTable;
use crate::error::StrategyError;
use crate::random::SeededRng;
use crate::strategy::{describe_strategy, execute_strategy, Move, Strategy};

/// What a bot is allowed to see when choosing its next move
///
/// Histories are borrowed from the match runner, so a bot can read them
/// but never alter the runner's record.
#[derive(Clone, Copy, Debug)]
pub struct HistoryView<'a> {
    /// This bot's own moves so far, oldest first
    pub my_history: &'a [Move],
    /// The opponent's moves so far, oldest first
    pub opponent_history: &'a [Move],
    /// Current round, starting at 1
    pub round: u32,
    /// Rounds in this match
    pub total_rounds: u32,
    pub payoff: &'a PayoffTable,
}

/// A pluggable Prisoner's Dilemma strategy
///
/// Instances may keep state within a match. The runner calls [`Bot::reset`]
/// before the first round of every match, so anything remembered about a
/// previous opponent must be cleared there.
pub trait Bot: Send {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Forget everything learned in a previous match
    fn reset(&mut self) {}

    fn decide(&mut self, view: &HistoryView<'_>) -> Result<Move, StrategyError>;
}

/// A bot driven by one of the built-in [`Strategy`] descriptors
#[derive(Clone, Debug)]
pub struct StrategyBot {
    name: String,
    description: String,
    strategy: Strategy,
    seed: u64,
    rng: SeededRng,
}

impl StrategyBot {
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            description: describe_strategy(&strategy),
            strategy,
            seed: 0,
            rng: SeededRng::new(0, 0),
        }
    }

    /// Bot named after its strategy
    pub fn from_strategy(strategy: Strategy) -> Self {
        Self::new(strategy.base.display_name(), strategy)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SeededRng::new(seed, 0);
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }
}

impl Bot for StrategyBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn reset(&mut self) {
        self.rng = SeededRng::new(self.seed, 0);
    }

    fn decide(&mut self, view: &HistoryView<'_>) -> Result<Move, StrategyError> {
        Ok(execute_strategy(&self.strategy, view, &mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{StrategyBase, StrategyParams};

    fn first_round(payoff: &PayoffTable) -> HistoryView<'_> {
        HistoryView {
            my_history: &[],
            opponent_history: &[],
            round: 1,
            total_rounds: 10,
            payoff,
        }
    }

    #[test]
    fn test_strategy_bot_defaults() {
        let bot = StrategyBot::from_strategy(Strategy::new(StrategyBase::GrimTrigger));
        assert_eq!(bot.name(), "Grudge Bot");
        assert_eq!(bot.description(), "Cooperates until betrayed, then never forgives.");
    }

    #[test]
    fn test_custom_description() {
        let bot = StrategyBot::new("Mine", Strategy::default()).with_description("hand written");
        assert_eq!(bot.name(), "Mine");
        assert_eq!(bot.description(), "hand written");
    }

    #[test]
    fn test_reset_replays_random_stream() {
        let payoff = PayoffTable::default();
        let mut bot = StrategyBot::new(
            "Coin",
            Strategy::with_params(StrategyBase::Random, StrategyParams::default()),
        )
        .with_seed(7);

        let view = first_round(&payoff);
        let first: Vec<Move> = (0..32).map(|_| bot.decide(&view).unwrap()).collect();
        bot.reset();
        let second: Vec<Move> = (0..32).map(|_| bot.decide(&view).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let payoff = PayoffTable::default();
        let view = first_round(&payoff);
        let strategy = Strategy::new(StrategyBase::Random);
        let mut a = StrategyBot::new("a", strategy).with_seed(1);
        let mut b = StrategyBot::new("b", strategy).with_seed(2);

        let moves_a: Vec<Move> = (0..64).map(|_| a.decide(&view).unwrap()).collect();
        let moves_b: Vec<Move> = (0..64).map(|_| b.decide(&view).unwrap()).collect();
        assert_ne!(moves_a, moves_b);
    }
}
