//! Plain-text reports for matches, sessions and tournaments

use crate::game::MatchResult;
use crate::session::{FailureKind, SessionReport};
use crate::standings::{percent, Standings};
use crate::tournament::TournamentReport;

const WIDE: usize = 50;
const TABLE: usize = 42;

fn rule(c: char, width: usize) -> String {
    std::iter::repeat(c).take(width).collect()
}

/// Round-by-round record of one match with scores and behaviour counts
pub fn render_match(result: &MatchResult) -> String {
    let mut lines = vec![
        rule('=', WIDE),
        "MATCH RESULTS".to_string(),
        format!("Bot 1: {}", result.bot_a),
        format!("Bot 2: {}", result.bot_b),
        rule('=', WIDE),
        String::new(),
        "SCORES:".to_string(),
        rule('-', WIDE),
        format!("{}: {}", result.bot_a, result.total_score_a),
        format!("{}: {}", result.bot_b, result.total_score_b),
        rule('-', WIDE),
        String::new(),
        "ROUND HISTORY:".to_string(),
        format!("{:^6} | {:^10} | {:^10} | {:^12}", "Round", "Bot 1", "Bot 2", "Score"),
        rule('-', TABLE),
    ];

    for round in &result.rounds {
        lines.push(format!(
            "{:^6} | {:^10} | {:^10} | {:^5}-{:^5}",
            round.round, round.move_a, round.move_b, round.score_a, round.score_b
        ));
    }

    let stats = &result.stats;
    let rounds = result.round_count;
    lines.extend([
        String::new(),
        "MATCH STATISTICS:".to_string(),
        rule('-', WIDE),
        format!("Total Rounds: {rounds}"),
        counted("Mutual Cooperation", stats.mutual_cooperation, rounds),
        counted("Mutual Defection", stats.mutual_defection, rounds),
        counted(&format!("{} Betrayals", result.bot_a), stats.betrayals_by_a, rounds),
        counted(&format!("{} Betrayals", result.bot_b), stats.betrayals_by_b, rounds),
        String::new(),
        "FINAL SCORES:".to_string(),
        rule('-', WIDE),
        format!("{}: {}", result.bot_a, result.total_score_a),
        format!("{}: {}", result.bot_b, result.total_score_b),
        rule('=', WIDE),
    ]);

    lines.join("\n") + "\n"
}

fn counted(label: &str, count: u32, rounds: u32) -> String {
    format!("{label}: {count} ({:.1}%)", percent(count, rounds))
}

/// Summary of a protagonist's session
pub fn render_session(report: &SessionReport) -> String {
    let mut lines = header("GAMES SUMMARY");
    lines.push(format!("Protagonist: {}", report.protagonist));
    lines.push(format!("Rounds per match: {}", report.round_count));
    lines.push(String::new());

    lines.push("FINAL RESULTS PER BOT".to_string());
    lines.push(rule('-', WIDE));
    leaderboard(&mut lines, &report.standings, "avg points per match", 2);
    lines.push(String::new());

    lines.push("OPPONENT BREAKDOWN".to_string());
    lines.push(rule('-', WIDE));
    for result in &report.matches {
        let s = &result.stats;
        lines.push(format!(
            "vs {}: {}-{} (C/C {}, D/D {}, betrayed them {}, betrayed by them {})",
            result.bot_b,
            result.total_score_a,
            result.total_score_b,
            s.mutual_cooperation,
            s.mutual_defection,
            s.betrayals_by_a,
            s.betrayals_by_b
        ));
    }
    lines.push(String::new());

    aggregate(&mut lines, &report.standings);

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("SKIPPED PAIRINGS".to_string());
        lines.push(rule('-', WIDE));
        for skipped in &report.skipped {
            let kind = match skipped.kind {
                FailureKind::LoadFailure => "load failure",
                FailureKind::ContractViolation => "contract violation",
            };
            lines.push(format!("{} [{kind}]: {}", skipped.opponent, skipped.reason));
        }
    }

    lines.join("\n") + "\n"
}

/// Leaderboard and aggregate statistics of a round robin
pub fn render_tournament(report: &TournamentReport) -> String {
    let mut lines = header("TOURNAMENT SUMMARY");
    lines.push(format!("Participants: {}", report.participants.len()));
    lines.push(format!("Rounds per match: {}", report.round_count));
    lines.push(String::new());

    lines.push("LEADERBOARD".to_string());
    lines.push(rule('-', WIDE));
    leaderboard(&mut lines, &report.standings, "avg per match", 1);
    lines.push(String::new());

    aggregate(&mut lines, &report.standings);
    lines.join("\n") + "\n"
}

fn header(title: &str) -> Vec<String> {
    vec![rule('=', WIDE), title.to_string(), rule('=', WIDE), String::new()]
}

fn leaderboard(lines: &mut Vec<String>, standings: &Standings, avg_label: &str, precision: usize) {
    for (rank, entry) in standings.leaderboard().into_iter().enumerate() {
        let average = match entry.average_score() {
            Some(avg) => format!("{avg:.precision$}"),
            None => "n/a".to_string(),
        };
        lines.push(format!(
            "{}. {}: {} ({avg_label}: {average})",
            rank + 1,
            entry.name,
            entry.total_score
        ));
    }
}

fn aggregate(lines: &mut Vec<String>, standings: &Standings) {
    let stats = standings.stats();
    lines.push("AGGREGATE STATISTICS".to_string());
    lines.push(rule('-', WIDE));
    lines.push(format!("Total Matches: {}", standings.match_count()));
    lines.push(format!("Total Mutual Cooperation: {}", stats.mutual_cooperation));
    lines.push(format!("Total Mutual Defection: {}", stats.mutual_defection));
    lines.push(format!("Total Bot 1 Betrayals: {}", stats.betrayals_by_a));
    lines.push(format!("Total Bot 2 Betrayals: {}", stats.betrayals_by_b));

    if let Some([cc, dd, ba, bb]) = standings.average_stats() {
        lines.push(format!("Average Mutual Cooperation: {cc:.1} per match"));
        lines.push(format!("Average Mutual Defection: {dd:.1} per match"));
        lines.push(format!("Average Bot 1 Betrayals: {ba:.1} per match"));
        lines.push(format!("Average Bot 2 Betrayals: {bb:.1} per match"));
    }
}
