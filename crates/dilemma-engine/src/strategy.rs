//! Built-in strategy definitions and execution

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bot::HistoryView;
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    pub fn opposite(self) -> Move {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Move::Cooperate => "COOPERATE",
            Move::Defect => "DEFECT",
        };
        f.pad(label)
    }
}

/// Base strategy type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyBase {
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Cooperate until opponent defects once, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch. Repeat move if good outcome.
    Pavlov,
    /// Tit-for-Tat but start with defect.
    SuspiciousTitForTat,
    /// Random choice each round.
    Random,
    /// Defect only if opponent defected twice in a row.
    TitForTwoTats,
    /// Retaliate with increasing defection streaks, then forgive.
    Gradual,
}

impl StrategyBase {
    pub const ALL: [StrategyBase; 9] = [
        StrategyBase::AlwaysCooperate,
        StrategyBase::AlwaysDefect,
        StrategyBase::TitForTat,
        StrategyBase::GrimTrigger,
        StrategyBase::Pavlov,
        StrategyBase::SuspiciousTitForTat,
        StrategyBase::Random,
        StrategyBase::TitForTwoTats,
        StrategyBase::Gradual,
    ];

    /// Display name used when a descriptor does not provide one
    pub fn display_name(self) -> &'static str {
        match self {
            StrategyBase::TitForTat => "Tit for Tat",
            StrategyBase::AlwaysDefect => "Always Defect Bot",
            StrategyBase::AlwaysCooperate => "Always Cooperate Bot",
            StrategyBase::GrimTrigger => "Grudge Bot",
            StrategyBase::Pavlov => "Pavlov",
            StrategyBase::SuspiciousTitForTat => "Suspicious Tit for Tat",
            StrategyBase::Random => "Random",
            StrategyBase::TitForTwoTats => "Tit for Two Tats",
            StrategyBase::Gradual => "Gradual",
        }
    }

    /// Registry identifier, e.g. `tit-for-tat`
    pub fn id(self) -> &'static str {
        match self {
            StrategyBase::TitForTat => "tit-for-tat",
            StrategyBase::AlwaysDefect => "always-defect",
            StrategyBase::AlwaysCooperate => "always-cooperate",
            StrategyBase::GrimTrigger => "grudge",
            StrategyBase::Pavlov => "pavlov",
            StrategyBase::SuspiciousTitForTat => "suspicious-tit-for-tat",
            StrategyBase::Random => "random",
            StrategyBase::TitForTwoTats => "tit-for-two-tats",
            StrategyBase::Gradual => "gradual",
        }
    }
}

/// Strategy parameters for fine-tuning behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Percentage chance to cooperate after opponent defects (0-100)
    pub forgiveness: u8,
    /// Rounds to wait before retaliating (0-10)
    pub retaliation_delay: u8,
    /// Number of defections to ignore before retaliating (0-5)
    pub noise_tolerance: u8,
    /// Bitmask of first 8 moves (1 = defect, 0 = use strategy)
    pub initial_moves: u8,
    /// Bias toward cooperation for Random strategy (0-100)
    pub cooperate_bias: u8,
    /// Defect unconditionally in the final N rounds of a match
    pub endgame_defections: u8,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            forgiveness: 0,
            retaliation_delay: 0,
            noise_tolerance: 0,
            initial_moves: 0,
            cooperate_bias: 50,
            endgame_defections: 0,
        }
    }
}

impl StrategyParams {
    /// Check the documented ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.forgiveness > 100 {
            return Err(format!("forgiveness {} exceeds 100", self.forgiveness));
        }
        if self.cooperate_bias > 100 {
            return Err(format!("cooperate_bias {} exceeds 100", self.cooperate_bias));
        }
        if self.retaliation_delay > 10 {
            return Err(format!("retaliation_delay {} exceeds 10", self.retaliation_delay));
        }
        if self.noise_tolerance > 5 {
            return Err(format!("noise_tolerance {} exceeds 5", self.noise_tolerance));
        }
        Ok(())
    }
}

/// Complete strategy with base type and parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub base: StrategyBase,
    #[serde(default)]
    pub params: StrategyParams,
}

impl Strategy {
    /// Create a new strategy with default parameters
    pub fn new(base: StrategyBase) -> Self {
        Self {
            base,
            params: StrategyParams::default(),
        }
    }

    /// Create with custom parameters
    pub fn with_params(base: StrategyBase, params: StrategyParams) -> Self {
        Self { base, params }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyBase::TitForTat)
    }
}

/// Execute a strategy for one round
///
/// # Arguments
/// * `strategy` - The strategy to execute
/// * `view` - Read-only histories plus round position (round is 1-based)
/// * `rng` - Random stream owned by the bot for this match
pub fn execute_strategy(strategy: &Strategy, view: &HistoryView<'_>, rng: &mut SeededRng) -> Move {
    // Endgame override takes precedence over everything else
    let remaining = view.total_rounds.saturating_sub(view.round) + 1;
    if remaining <= strategy.params.endgame_defections as u32 {
        return Move::Defect;
    }

    // Check initial_moves override (first 8 rounds)
    if (1..=8).contains(&view.round) {
        let bit = (strategy.params.initial_moves >> (view.round - 1)) & 1;
        if bit == 1 {
            return Move::Defect;
        }
    }

    let opponent_history = view.opponent_history;
    match strategy.base {
        StrategyBase::TitForTat => execute_tit_for_tat(opponent_history, &strategy.params, rng),
        StrategyBase::AlwaysDefect => Move::Defect,
        StrategyBase::AlwaysCooperate => Move::Cooperate,
        StrategyBase::GrimTrigger => execute_grim_trigger(opponent_history, &strategy.params),
        StrategyBase::Pavlov => execute_pavlov(view),
        StrategyBase::SuspiciousTitForTat => {
            if opponent_history.is_empty() {
                Move::Defect
            } else {
                execute_tit_for_tat(opponent_history, &strategy.params, rng)
            }
        }
        StrategyBase::Random => execute_random(&strategy.params, rng),
        StrategyBase::TitForTwoTats => execute_tit_for_two_tats(opponent_history),
        StrategyBase::Gradual => execute_gradual(opponent_history, view.my_history),
    }
}

/// Tit-for-Tat: Copy opponent's last move, start with cooperate
fn execute_tit_for_tat(
    opponent_history: &[Move],
    params: &StrategyParams,
    rng: &mut SeededRng,
) -> Move {
    match opponent_history.last() {
        None | Some(Move::Cooperate) => Move::Cooperate,
        Some(Move::Defect) => {
            // Retaliation delay: wait N rounds after seeing defection
            if params.retaliation_delay > 0 {
                if let Some(pos) = opponent_history.iter().rposition(|m| *m == Move::Defect) {
                    let rounds_since = opponent_history.len() - 1 - pos;
                    if rounds_since < params.retaliation_delay as usize {
                        return Move::Cooperate;
                    }
                }
            }
            if params.forgiveness > 0 && rng.next_percent() < params.forgiveness {
                Move::Cooperate
            } else {
                Move::Defect
            }
        }
    }
}

/// Grim Trigger: Cooperate until opponent defects, then always defect
fn execute_grim_trigger(opponent_history: &[Move], params: &StrategyParams) -> Move {
    let defection_count = opponent_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();

    if defection_count > params.noise_tolerance as usize {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Pavlov: Win-stay, lose-switch
///
/// A round counts as a win when it paid at least the mutual-cooperation reward.
fn execute_pavlov(view: &HistoryView<'_>) -> Move {
    let (Some(my_last), Some(opp_last)) = (view.my_history.last(), view.opponent_history.last())
    else {
        return Move::Cooperate;
    };

    let (my_score, _) = view.payoff.score(*my_last, *opp_last);
    if my_score >= view.payoff.mutual_cooperation {
        *my_last
    } else {
        my_last.opposite()
    }
}

/// Random: Random choice with configurable bias
fn execute_random(params: &StrategyParams, rng: &mut SeededRng) -> Move {
    if rng.next_percent() < params.cooperate_bias {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Tit-for-Two-Tats: Only defect if opponent defected twice in a row
fn execute_tit_for_two_tats(opponent_history: &[Move]) -> Move {
    match opponent_history {
        [.., Move::Defect, Move::Defect] => Move::Defect,
        _ => Move::Cooperate,
    }
}

/// Gradual: Escalating retaliation
/// After N opponent defections, player should have made N(N+1)/2 total defections
fn execute_gradual(opponent_history: &[Move], my_history: &[Move]) -> Move {
    let their_defections = opponent_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();
    let my_defections = my_history.iter().filter(|m| **m == Move::Defect).count();

    let expected = their_defections * (their_defections + 1) / 2;
    if my_defections < expected {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Human-readable description of a strategy
pub fn describe_strategy(strategy: &Strategy) -> String {
    let base_desc = match strategy.base {
        StrategyBase::TitForTat => "Copies opponent's last move. Starts by cooperating.",
        StrategyBase::AlwaysDefect => "Never cooperates. Always defects.",
        StrategyBase::AlwaysCooperate => "Never defects. Always cooperates.",
        StrategyBase::GrimTrigger => "Cooperates until betrayed, then never forgives.",
        StrategyBase::Pavlov => "Repeats move if outcome was good, switches if bad.",
        StrategyBase::SuspiciousTitForTat => "Like Tit for Tat, but starts with defect.",
        StrategyBase::Random => "Randomly cooperates or defects each round.",
        StrategyBase::TitForTwoTats => "Only retaliates after two consecutive defections.",
        StrategyBase::Gradual => "Retaliates with increasing severity, then forgives.",
    };

    let mut desc = base_desc.to_string();
    let params = &strategy.params;

    if params.forgiveness > 0 {
        desc.push_str(&format!(" {}% chance to forgive.", params.forgiveness));
    }
    if params.noise_tolerance > 0 {
        desc.push_str(&format!(" Tolerates {} accidental defections.", params.noise_tolerance));
    }
    if params.endgame_defections > 0 {
        desc.push_str(&format!(" Defects in the last {} rounds.", params.endgame_defections));
    }
    if strategy.base == StrategyBase::Random && params.cooperate_bias != 50 {
        desc.push_str(&format!(" Cooperates {}% of the time.", params.cooperate_bias));
    }

    desc
}
