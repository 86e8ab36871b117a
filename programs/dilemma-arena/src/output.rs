//! Per-run log directories

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use dilemma_engine::{MatchResult, TournamentReport};
use serde::Serialize;

/// Directory holding every file written by one run
#[derive(Debug)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    /// Create `<out>/<unix-seconds>_<label>`, adding a counter if it exists
    pub fn create(out: &Path, label: &str) -> Result<Self> {
        fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let base = format!("{stamp}_{}", slug(label));

        let mut attempt = 1u32;
        loop {
            let name = if attempt == 1 {
                base.clone()
            } else {
                format!("{base}_{attempt}")
            };
            let root = out.join(name);
            match fs::create_dir(&root) {
                Ok(()) => return Ok(Self { root }),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to create {}", root.display()));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn write_text(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(value).context("failed to serialize summary")?;
        self.write_text(name, &json)
    }

    /// One transcript file per match, numbered in schedule order
    pub fn write_matches(&self, subdir: &str, matches: &[MatchResult]) -> Result<()> {
        let dir = self.subdir(subdir)?;
        for (index, result) in matches.iter().enumerate() {
            write_transcript(&dir, index, result)?;
        }
        Ok(())
    }

    /// Tournament transcripts
    ///
    /// With a protagonist, its games go to `player_games/` and the rest to
    /// `other_games/`; numbering follows the schedule across both.
    pub fn write_tournament(&self, report: &TournamentReport) -> Result<()> {
        if report.protagonist.is_none() {
            return self.write_matches("matches", &report.matches);
        }

        let player = self.subdir("player_games")?;
        let others = self.subdir("other_games")?;
        for (index, result) in report.matches.iter().enumerate() {
            let dir = if report.features_protagonist(result) {
                &player
            } else {
                &others
            };
            write_transcript(dir, index, result)?;
        }
        Ok(())
    }

    fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(dir)
    }
}

fn write_transcript(dir: &Path, index: usize, result: &MatchResult) -> Result<()> {
    let name = format!(
        "{:03}_{}_vs_{}.txt",
        index + 1,
        slug(&result.bot_a),
        slug(&result.bot_b)
    );
    let path = dir.join(name);
    fs::write(&path, result.transcript()).with_context(|| format!("failed to write {}", path.display()))
}

/// Filesystem-safe form of a bot label
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "bot".to_string()
    } else {
        trimmed.to_string()
    }
}
