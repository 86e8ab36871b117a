//! Error types for loading bots, running matches and scheduling sessions

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rounds per match must be at least 1")]
    ZeroRounds,
}

/// A bot identifier that could not be turned into a bot instance
#[derive(Debug, Error)]
#[error("failed to load bot `{id}`: {cause}")]
pub struct LoadError {
    pub id: String,
    #[source]
    pub cause: LoadCause,
}

impl LoadError {
    pub fn new(id: impl Into<String>, cause: impl Into<LoadCause>) -> Self {
        Self {
            id: id.into(),
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadCause {
    #[error("not a registered bot id and not a descriptor file")]
    Unknown,

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML descriptor: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported descriptor format `{0}` (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Invalid(String),
}

/// Raised by a strategy that cannot produce a move
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StrategyError {
    message: String,
}

impl StrategyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("bot `{bot}` violated the strategy contract in round {round}: {source}")]
    ContractViolation {
        bot: String,
        round: u32,
        #[source]
        source: StrategyError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("protagonist could not be loaded: {0}")]
    Protagonist(#[source] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("tournament setup aborted: {0}")]
    Load(#[from] LoadError),

    #[error("roster of {0} bots is larger than a tournament can schedule")]
    RosterTooLarge(usize),

    #[error("tournament aborted in {bot_a} vs {bot_b}: {source}")]
    Match {
        bot_a: String,
        bot_b: String,
        #[source]
        source: MatchError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
