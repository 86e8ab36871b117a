//! Game configuration: payoff values and match length
//!
//! Loaded from TOML; every field has a default so partial files are valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::strategy::Move;

/// Default number of rounds per match
pub const DEFAULT_ROUNDS: u32 = 100;

/// Payoff matrix for the Prisoner's Dilemma
///
/// Field names follow the classic R/T/S/P naming:
/// reward (`mutual_cooperation`), temptation (`betrayal`),
/// sucker (`betrayed`) and punishment (`mutual_defection`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffTable {
    /// Points each player gets when both cooperate
    pub mutual_cooperation: i32,
    /// Points for the defector when the other cooperates
    pub betrayal: i32,
    /// Points for the cooperator when the other defects
    pub betrayed: i32,
    /// Points each player gets when both defect
    pub mutual_defection: i32,
}

impl Default for PayoffTable {
    fn default() -> Self {
        Self {
            mutual_cooperation: 3,
            betrayal: 5,
            betrayed: 0,
            mutual_defection: 1,
        }
    }
}

impl PayoffTable {
    /// Score a round. Returns (score_a, score_b)
    pub fn score(&self, a: Move, b: Move) -> (i32, i32) {
        match (a, b) {
            (Move::Cooperate, Move::Cooperate) => (self.mutual_cooperation, self.mutual_cooperation),
            (Move::Cooperate, Move::Defect) => (self.betrayed, self.betrayal),
            (Move::Defect, Move::Cooperate) => (self.betrayal, self.betrayed),
            (Move::Defect, Move::Defect) => (self.mutual_defection, self.mutual_defection),
        }
    }

    /// Whether the values still describe a dilemma: T > R > P > S and 2R > T + S
    pub fn is_dilemma(&self) -> bool {
        self.betrayal > self.mutual_cooperation
            && self.mutual_cooperation > self.mutual_defection
            && self.mutual_defection > self.betrayed
            && 2 * self.mutual_cooperation > self.betrayal + self.betrayed
    }
}

/// Settings shared by every match of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Rounds played in every match
    pub rounds: u32,
    pub payoff: PayoffTable,
    /// Run independent matches on the rayon pool
    pub parallel: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            payoff: PayoffTable::default(),
            parallel: false,
        }
    }
}

impl GameConfig {
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_payoff(mut self, payoff: PayoffTable) -> Self {
        self.payoff = payoff;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if !self.payoff.is_dilemma() {
            tracing::warn!(
                payoff = ?self.payoff,
                "payoff table does not satisfy T > R > P > S and 2R > T + S"
            );
        }
        Ok(())
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), rounds = config.rounds, "loaded game config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payoff_matrix() {
        let table = PayoffTable::default();
        assert_eq!(table.score(Move::Cooperate, Move::Cooperate), (3, 3));
        assert_eq!(table.score(Move::Cooperate, Move::Defect), (0, 5));
        assert_eq!(table.score(Move::Defect, Move::Cooperate), (5, 0));
        assert_eq!(table.score(Move::Defect, Move::Defect), (1, 1));
    }

    #[test]
    fn test_custom_payoff_values() {
        let table = PayoffTable {
            mutual_cooperation: 2,
            betrayal: 3,
            betrayed: -1,
            mutual_defection: 0,
        };
        assert_eq!(table.score(Move::Cooperate, Move::Defect), (-1, 3));
        assert!(table.is_dilemma());
    }

    #[test]
    fn test_is_dilemma_rejects_flat_table() {
        let table = PayoffTable {
            mutual_cooperation: 1,
            betrayal: 1,
            betrayed: 1,
            mutual_defection: 1,
        };
        assert!(!table.is_dilemma());
        assert!(PayoffTable::default().is_dilemma());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GameConfig::from_toml_str("rounds = 25\n[payoff]\nbetrayal = 7\n").unwrap();
        assert_eq!(config.rounds, 25);
        assert_eq!(config.payoff.betrayal, 7);
        assert_eq!(config.payoff.mutual_cooperation, 3);
        assert!(!config.parallel);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.rounds, DEFAULT_ROUNDS);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = GameConfig::from_toml_str("rounds = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroRounds));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = GameConfig::from_toml_str("rounds = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
