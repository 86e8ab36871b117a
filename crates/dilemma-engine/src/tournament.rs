//! Round-robin tournament scheduling

use std::sync::Arc;

use serde::Serialize;

use crate::config::GameConfig;
use crate::error::{ConfigError, TournamentError};
use crate::game::{MatchResult, MatchRunner};
use crate::pairing::all_pairings;
use crate::registry::BotFactory;
use crate::schedule::try_map_in_order;
use crate::standings::{disambiguate_names, Standings};
use crate::transcript;

/// Everything a tournament produced
#[derive(Clone, Debug, Serialize)]
pub struct TournamentReport {
    /// Participant labels in roster order
    pub participants: Vec<String>,
    /// Label of the featured bot, when the tournament was run around one
    pub protagonist: Option<String>,
    pub round_count: u32,
    /// Matches in schedule order; the lower roster index is seat A
    pub matches: Vec<MatchResult>,
    pub standings: Standings,
}

impl TournamentReport {
    /// Whether the featured bot took part in `result`
    pub fn features_protagonist(&self, result: &MatchResult) -> bool {
        self.protagonist
            .as_deref()
            .is_some_and(|label| result.bot_a == label || result.bot_b == label)
    }

    pub fn summary(&self) -> String {
        transcript::render_tournament(self)
    }
}

/// Plays every unordered pair of a roster exactly once
#[derive(Clone, Debug)]
pub struct TournamentRunner {
    runner: MatchRunner,
    parallel: bool,
}

impl TournamentRunner {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            runner: MatchRunner::new(config)?,
            parallel: config.parallel,
        })
    }

    /// Run the full round robin
    ///
    /// Every participant is snapshotted once up front, so a bot that cannot
    /// load aborts before any match is played and later matches never go
    /// back to disk. A contract violation aborts the whole tournament: no
    /// further match is started and results are only returned for a
    /// complete schedule.
    pub fn run(&self, roster: &[Arc<dyn BotFactory>]) -> Result<TournamentReport, TournamentError> {
        self.run_roster(roster, false)
    }

    /// Round robin with `protagonist` seated first and marked in the report
    pub fn run_with_protagonist(
        &self,
        protagonist: &Arc<dyn BotFactory>,
        others: &[Arc<dyn BotFactory>],
    ) -> Result<TournamentReport, TournamentError> {
        let mut roster = Vec::with_capacity(others.len() + 1);
        roster.push(Arc::clone(protagonist));
        roster.extend(others.iter().cloned());
        self.run_roster(&roster, true)
    }

    fn run_roster(&self, roster: &[Arc<dyn BotFactory>], featured: bool) -> Result<TournamentReport, TournamentError> {
        let participant_count = schedule_size(roster.len())?;

        let mut frozen = Vec::with_capacity(roster.len());
        let mut names = Vec::with_capacity(roster.len());
        for factory in roster {
            let snapshot = factory.snapshot()?;
            names.push(snapshot.build()?.name().to_string());
            frozen.push(snapshot);
        }
        let labels = disambiguate_names(&names);

        let pairings = all_pairings(participant_count);
        tracing::info!(
            participants = roster.len(),
            matches = pairings.len(),
            rounds = self.runner.rounds(),
            parallel = self.parallel,
            "starting tournament"
        );

        let played = try_map_in_order(pairings, self.parallel, |(a, b)| -> Result<_, TournamentError> {
            let (a, b) = (a as usize, b as usize);
            let mut bot_a = frozen[a].build()?;
            let mut bot_b = frozen[b].build()?;
            let result = self
                .runner
                .run_labeled(&labels[a], bot_a.as_mut(), &labels[b], bot_b.as_mut())
                .map_err(|source| TournamentError::Match {
                    bot_a: labels[a].clone(),
                    bot_b: labels[b].clone(),
                    source,
                })?;
            Ok((a, b, result))
        })?;

        let mut standings = Standings::new();
        for label in &labels {
            standings.add(label.clone());
        }

        let mut matches = Vec::with_capacity(played.len());
        for (a, b, result) in played {
            standings.record(a, b, &result);
            matches.push(result);
        }

        if let Some(leader) = standings.leaderboard().first() {
            tracing::info!(leader = %leader.name, score = leader.total_score, "tournament finished");
        }

        Ok(TournamentReport {
            protagonist: featured.then(|| labels[0].clone()),
            participants: labels,
            round_count: self.runner.rounds(),
            matches,
            standings,
        })
    }
}

/// Roster length as a schedulable participant count
fn schedule_size(len: usize) -> Result<u32, TournamentError> {
    u32::try_from(len).map_err(|_| TournamentError::RosterTooLarge(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{Bot, HistoryView};
    use crate::error::{MatchError, StrategyError};
    use crate::bot::StrategyBot;
    use crate::registry::{BotRegistry, FnFactory};
    use crate::strategy::{Move, Strategy, StrategyBase};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Broken;

    impl Bot for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn decide(&mut self, _view: &HistoryView<'_>) -> Result<Move, StrategyError> {
            Err(StrategyError::new("no move"))
        }
    }

    /// Always cooperates and counts the matches it was reset for
    struct Counter {
        started: Arc<AtomicUsize>,
    }

    impl Bot for Counter {
        fn name(&self) -> &str {
            "Counter"
        }

        fn reset(&mut self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn decide(&mut self, _view: &HistoryView<'_>) -> Result<Move, StrategyError> {
            Ok(Move::Cooperate)
        }
    }

    fn tournament(rounds: u32) -> TournamentRunner {
        TournamentRunner::new(&GameConfig::default().with_rounds(rounds)).unwrap()
    }

    #[test]
    fn test_four_bot_round_robin() {
        let registry = BotRegistry::with_builtins();
        let roster = registry.resolve_all(&["tit-for-tat", "always-defect", "always-cooperate", "grudge"]);
        let report = tournament(20).run(&roster).unwrap();

        assert_eq!(report.matches.len(), 6);
        assert_eq!(report.standings.match_count(), 6);
        let played: u32 = report.standings.entries().iter().map(|e| e.matches_played).sum();
        assert_eq!(played, 12);
        for entry in report.standings.entries() {
            assert_eq!(entry.matches_played, 3);
        }
        assert_eq!(report.standings.stats().total(), 6 * 20);
    }

    #[test]
    fn test_leaderboard_scores() {
        let registry = BotRegistry::with_builtins();
        let roster = registry.resolve_all(&["always-cooperate", "always-defect", "tit-for-tat"]);
        let report = tournament(10).run(&roster).unwrap();

        // AC: 0 + 30, AD: 50 + 14, TFT: 30 + 9
        let board: Vec<(&str, i64)> = report
            .standings
            .leaderboard()
            .iter()
            .map(|e| (e.name.as_str(), e.total_score))
            .collect();
        assert_eq!(
            board,
            vec![("Always Defect Bot", 64), ("Tit for Tat", 39), ("Always Cooperate Bot", 30)]
        );
    }

    #[test]
    fn test_ties_follow_roster_order() {
        let registry = BotRegistry::with_builtins();
        let roster = registry.resolve_all(&["tit-for-two-tats", "always-cooperate", "tit-for-tat"]);
        let report = tournament(10).run(&roster).unwrap();

        let names: Vec<&str> = report.standings.leaderboard().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Tit for Two Tats", "Always Cooperate Bot", "Tit for Tat"]);
    }

    #[test]
    fn test_single_bot_has_no_average() {
        let registry = BotRegistry::with_builtins();
        let roster = registry.resolve_all(&["pavlov"]);
        let report = tournament(10).run(&roster).unwrap();

        assert!(report.matches.is_empty());
        assert_eq!(report.standings.entries()[0].average_score(), None);
    }

    #[test]
    fn test_duplicate_roster_entries_disambiguated() {
        let registry = BotRegistry::with_builtins();
        let roster = registry.resolve_all(&["grudge", "grudge"]);
        let report = tournament(5).run(&roster).unwrap();
        assert_eq!(report.participants, vec!["Grudge Bot", "Grudge Bot (copy)"]);
        assert_eq!(report.matches[0].bot_b, "Grudge Bot (copy)");
    }

    #[test]
    fn test_load_failure_fails_fast() {
        let registry = BotRegistry::with_builtins();
        let roster = registry.resolve_all(&["tit-for-tat", "ghost.toml", "always-defect"]);
        let err = tournament(5).run(&roster).unwrap_err();
        assert!(matches!(err, TournamentError::Load(ref e) if e.id == "ghost.toml"));
    }

    #[test]
    fn test_contract_violation_aborts() {
        let mut registry = BotRegistry::with_builtins();
        registry.register_fn("broken", || Box::new(Broken) as Box<dyn Bot>);
        let roster = registry.resolve_all(&["tit-for-tat", "always-defect", "broken"]);
        let err = tournament(5).run(&roster).unwrap_err();

        match err {
            TournamentError::Match { bot_a, bot_b, source } => {
                assert_eq!(bot_a, "Tit for Tat");
                assert_eq!(bot_b, "Broken");
                assert!(matches!(source, MatchError::ContractViolation { round: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_match_starts_after_abort() {
        let started = Arc::new(AtomicUsize::new(0));
        let mut registry = BotRegistry::with_builtins();
        registry.register_fn("broken", || Box::new(Broken) as Box<dyn Bot>);
        let seen = Arc::clone(&started);
        registry.register_fn("counter", move || {
            Box::new(Counter {
                started: Arc::clone(&seen),
            }) as Box<dyn Bot>
        });

        // Broken vs Counter is the first pairing of the schedule
        let roster = registry.resolve_all(&["broken", "counter", "tit-for-tat", "pavlov", "grudge"]);
        let err = tournament(10).run(&roster).unwrap_err();

        assert!(matches!(err, TournamentError::Match { ref bot_a, ref bot_b, .. } if bot_a == "Broken" && bot_b == "Counter"));
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_roster_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.toml");
        std::fs::write(&path, "name = \"Mine\"\n[strategy]\nbase = \"GrimTrigger\"\n").unwrap();

        let registry = BotRegistry::with_builtins();
        let mine = registry.resolve(path.to_str().unwrap());
        let builds = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&builds);
        let watcher: Arc<dyn BotFactory> = Arc::new(FnFactory::new("watcher", move || {
            // The descriptor disappears while the first match is being set up
            if counted.fetch_add(1, Ordering::SeqCst) == 1 {
                let _ = std::fs::remove_file(&path);
            }
            Box::new(StrategyBot::from_strategy(Strategy::new(StrategyBase::TitForTat))) as Box<dyn Bot>
        }));
        let roster = vec![watcher, mine, registry.resolve("always-defect")];

        let report = tournament(5).run(&roster).unwrap();
        assert_eq!(report.matches.len(), 3);
        assert_eq!(report.participants[1], "Mine");
        assert_eq!(builds.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_protagonist_seated_first() {
        let registry = BotRegistry::with_builtins();
        let hero = registry.resolve("grudge");
        let others = registry.resolve_all(&["always-cooperate", "always-defect", "pavlov"]);
        let report = tournament(5).run_with_protagonist(&hero, &others).unwrap();

        assert_eq!(report.protagonist.as_deref(), Some("Grudge Bot"));
        assert_eq!(report.participants[0], "Grudge Bot");
        let featured = report.matches.iter().filter(|m| report.features_protagonist(m)).count();
        assert_eq!(featured, 3);
        assert_eq!(report.matches.len(), 6);

        let plain = tournament(5).run(&others).unwrap();
        assert_eq!(plain.protagonist, None);
        assert!(plain.matches.iter().all(|m| !plain.features_protagonist(m)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_roster_rejected() {
        assert_eq!(schedule_size(5).unwrap(), 5);
        assert_eq!(schedule_size(u32::MAX as usize).unwrap(), u32::MAX);
        let too_many = u32::MAX as usize + 1;
        assert!(matches!(schedule_size(too_many), Err(TournamentError::RosterTooLarge(n)) if n == too_many));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let registry = BotRegistry::with_builtins();
        let ids: Vec<&str> = registry.list_ids();
        let roster = registry.resolve_all(&ids);
        let config = GameConfig::default().with_rounds(30);

        let sequential = TournamentRunner::new(&config).unwrap().run(&roster).unwrap();
        let parallel = TournamentRunner::new(&config.with_parallel(true)).unwrap().run(&roster).unwrap();
        assert_eq!(sequential.matches, parallel.matches);
        assert_eq!(sequential.standings, parallel.standings);
    }
}
