//! Behavioral counters, per-bot standings and leaderboards

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::game::MatchResult;
use crate::strategy::Move;

/// How a single round played out, from seat A's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    MutualCooperation,
    MutualDefection,
    /// A defected while B cooperated
    BetrayalByA,
    /// B defected while A cooperated
    BetrayalByB,
}

impl RoundOutcome {
    pub fn classify(move_a: Move, move_b: Move) -> Self {
        match (move_a, move_b) {
            (Move::Cooperate, Move::Cooperate) => RoundOutcome::MutualCooperation,
            (Move::Defect, Move::Defect) => RoundOutcome::MutualDefection,
            (Move::Defect, Move::Cooperate) => RoundOutcome::BetrayalByA,
            (Move::Cooperate, Move::Defect) => RoundOutcome::BetrayalByB,
        }
    }
}

/// The four behavioral buckets. Every round lands in exactly one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorStats {
    pub mutual_cooperation: u32,
    pub mutual_defection: u32,
    pub betrayals_by_a: u32,
    pub betrayals_by_b: u32,
}

impl BehaviorStats {
    pub fn record(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::MutualCooperation => self.mutual_cooperation += 1,
            RoundOutcome::MutualDefection => self.mutual_defection += 1,
            RoundOutcome::BetrayalByA => self.betrayals_by_a += 1,
            RoundOutcome::BetrayalByB => self.betrayals_by_b += 1,
        }
    }

    pub fn merge(&mut self, other: &BehaviorStats) {
        self.mutual_cooperation += other.mutual_cooperation;
        self.mutual_defection += other.mutual_defection;
        self.betrayals_by_a += other.betrayals_by_a;
        self.betrayals_by_b += other.betrayals_by_b;
    }

    /// Rounds counted across all buckets
    pub fn total(&self) -> u32 {
        self.mutual_cooperation + self.mutual_defection + self.betrayals_by_a + self.betrayals_by_b
    }
}

/// Share of `count` in `rounds`, in percent
pub fn percent(count: u32, rounds: u32) -> f64 {
    if rounds == 0 {
        return 0.0;
    }
    count as f64 / rounds as f64 * 100.0
}

/// Give every bot a unique display label
///
/// The first bot with a given name keeps it; later ones become
/// `"<name> (copy)"`, `"<name> (copy 2)"`, ... skipping any label that is
/// already in use or that another bot reports as its own name.
pub fn disambiguate_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let reported: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut labels = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        if taken.insert(name.to_string()) {
            labels.push(name.to_string());
            continue;
        }

        let mut copy = 1u32;
        loop {
            let candidate = if copy == 1 {
                format!("{name} (copy)")
            } else {
                format!("{name} (copy {copy})")
            };
            if !taken.contains(&candidate) && !reported.contains(candidate.as_str()) {
                taken.insert(candidate.clone());
                labels.push(candidate);
                break;
            }
            copy += 1;
        }
    }

    labels
}

/// One bot's line in the standings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub name: String,
    pub total_score: i64,
    pub matches_played: u32,
}

impl StandingEntry {
    /// Mean score per match, absent for a bot that never played
    pub fn average_score(&self) -> Option<f64> {
        if self.matches_played == 0 {
            None
        } else {
            Some(self.total_score as f64 / self.matches_played as f64)
        }
    }
}

/// Aggregate over every match of a session or tournament
///
/// Entries keep insertion order; that order is also the leaderboard
/// tie-break.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    entries: Vec<StandingEntry>,
    stats: BehaviorStats,
    matches: u32,
}

impl Standings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant and return its index. Labels must already be unique.
    pub fn add(&mut self, name: impl Into<String>) -> usize {
        self.entries.push(StandingEntry {
            name: name.into(),
            total_score: 0,
            matches_played: 0,
        });
        self.entries.len() - 1
    }

    /// Fold one finished match into the totals
    pub fn record(&mut self, index_a: usize, index_b: usize, result: &MatchResult) {
        debug_assert_ne!(index_a, index_b, "a bot cannot play itself");

        let a = &mut self.entries[index_a];
        a.total_score += result.total_score_a;
        a.matches_played += 1;

        let b = &mut self.entries[index_b];
        b.total_score += result.total_score_b;
        b.matches_played += 1;

        self.stats.merge(&result.stats);
        self.matches += 1;
    }

    pub fn entries(&self) -> &[StandingEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&StandingEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn stats(&self) -> &BehaviorStats {
        &self.stats
    }

    /// Number of matches folded in
    pub fn match_count(&self) -> u32 {
        self.matches
    }

    /// Entries by descending total score; ties keep insertion order
    pub fn leaderboard(&self) -> Vec<&StandingEntry> {
        let mut ranked: Vec<&StandingEntry> = self.entries.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        ranked
    }

    /// Average of each behavioral counter per match
    pub fn average_stats(&self) -> Option<[f64; 4]> {
        if self.matches == 0 {
            return None;
        }
        let m = self.matches as f64;
        Some([
            self.stats.mutual_cooperation as f64 / m,
            self.stats.mutual_defection as f64 / m,
            self.stats.betrayals_by_a as f64 / m,
            self.stats.betrayals_by_b as f64 / m,
        ])
    }
}
