//! One protagonist against a list of opponents

use std::sync::Arc;

use serde::Serialize;

use crate::bot::Bot;
use crate::config::GameConfig;
use crate::error::{ConfigError, LoadError, MatchError, SessionError};
use crate::game::{MatchResult, MatchRunner};
use crate::registry::BotFactory;
use crate::schedule::map_in_order;
use crate::standings::{disambiguate_names, StandingEntry, Standings};
use crate::transcript;

/// Why a pairing produced no result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A bot for the pairing could not be built
    LoadFailure,
    /// A bot returned an error mid-match
    ContractViolation,
}

/// A pairing that was attempted but has no score
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedPairing {
    /// Opponent label, or its identifier if it never loaded
    pub opponent: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Everything a session produced
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub protagonist: String,
    pub round_count: u32,
    /// Completed matches in opponent order; the protagonist is always seat A
    pub matches: Vec<MatchResult>,
    pub skipped: Vec<SkippedPairing>,
    pub standings: Standings,
}

impl SessionReport {
    pub fn protagonist_entry(&self) -> Option<&StandingEntry> {
        self.standings.get(&self.protagonist)
    }

    pub fn protagonist_total(&self) -> i64 {
        self.protagonist_entry().map_or(0, |entry| entry.total_score)
    }

    /// Mean protagonist score per completed match
    pub fn protagonist_average(&self) -> Option<f64> {
        self.protagonist_entry().and_then(StandingEntry::average_score)
    }

    pub fn summary(&self) -> String {
        transcript::render_session(self)
    }
}

enum Outcome {
    Played(MatchResult),
    Failed(MatchError),
    Unloaded(LoadError),
}

/// Runs a protagonist against each opponent in turn
#[derive(Clone, Debug)]
pub struct SessionRunner {
    runner: MatchRunner,
    parallel: bool,
}

impl SessionRunner {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            runner: MatchRunner::new(config)?,
            parallel: config.parallel,
        })
    }

    /// Play one match per opponent
    ///
    /// The protagonist is snapshotted once, and every match builds its own
    /// instance from that snapshot. Opponents that fail to load, or that
    /// break the strategy contract mid-match, are listed in
    /// [`SessionReport::skipped`] and the session moves on. A protagonist
    /// build that fails for one pairing is skipped the same way. Only a
    /// protagonist that cannot be loaded at all fails the session.
    pub fn run(
        &self,
        protagonist: &dyn BotFactory,
        opponents: &[Arc<dyn BotFactory>],
    ) -> Result<SessionReport, SessionError> {
        let hero = protagonist.snapshot().map_err(SessionError::Protagonist)?;
        let first = hero.build().map_err(SessionError::Protagonist)?;
        tracing::info!(
            protagonist = first.name(),
            opponents = opponents.len(),
            rounds = self.runner.rounds(),
            parallel = self.parallel,
            "starting session"
        );

        let mut skipped = Vec::new();
        let mut loaded: Vec<Box<dyn Bot>> = Vec::with_capacity(opponents.len());
        for factory in opponents {
            match factory.build() {
                Ok(bot) => loaded.push(bot),
                Err(err) => {
                    tracing::warn!(opponent = factory.id(), error = %err, "skipping opponent that failed to load");
                    skipped.push(SkippedPairing {
                        opponent: factory.id().to_string(),
                        kind: FailureKind::LoadFailure,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let labels = {
            let mut names = vec![first.name()];
            names.extend(loaded.iter().map(|bot| bot.name()));
            disambiguate_names(&names)
        };

        let mut standings = Standings::new();
        for label in &labels {
            standings.add(label.clone());
        }

        let protagonist_label = labels[0].as_str();
        let jobs: Vec<(usize, String, Box<dyn Bot>)> = loaded
            .into_iter()
            .zip(labels.iter().skip(1).cloned())
            .enumerate()
            .map(|(i, (bot, label))| (i + 1, label, bot))
            .collect();

        let outcomes = map_in_order(jobs, self.parallel, |(index, label, mut opponent)| {
            let outcome = match hero.build() {
                Ok(mut instance) => match self.runner.run_labeled(
                    protagonist_label,
                    instance.as_mut(),
                    &label,
                    opponent.as_mut(),
                ) {
                    Ok(result) => Outcome::Played(result),
                    Err(err) => Outcome::Failed(err),
                },
                Err(err) => Outcome::Unloaded(err),
            };
            (index, label, outcome)
        });

        let mut matches = Vec::with_capacity(outcomes.len());
        for (index, label, outcome) in outcomes {
            match outcome {
                Outcome::Played(result) => {
                    standings.record(0, index, &result);
                    matches.push(result);
                }
                Outcome::Failed(err) => {
                    tracing::warn!(opponent = %label, error = %err, "pairing aborted");
                    skipped.push(SkippedPairing {
                        opponent: label,
                        kind: FailureKind::ContractViolation,
                        reason: err.to_string(),
                    });
                }
                Outcome::Unloaded(err) => {
                    tracing::warn!(opponent = %label, error = %err, "protagonist failed to load for pairing");
                    skipped.push(SkippedPairing {
                        opponent: label,
                        kind: FailureKind::LoadFailure,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let report = SessionReport {
            protagonist: protagonist_label.to_string(),
            round_count: self.runner.rounds(),
            matches,
            skipped,
            standings,
        };
        tracing::info!(
            protagonist = %report.protagonist,
            played = report.matches.len(),
            skipped = report.skipped.len(),
            total = report.protagonist_total(),
            "session finished"
        );
        Ok(report)
    }
}
