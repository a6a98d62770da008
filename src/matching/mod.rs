pub mod classify;
pub mod sequential;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::model::{MatchReport, MatchResult};

pub use classify::{classify, classify_identifier};
pub use sequential::{dice_match, normalize, sequential_character_match};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scorer {
    #[default]
    Sequential,
    Dice,
}

impl Scorer {
    pub fn score(&self, query: &str, candidate: &str) -> f32 {
        match self {
            Scorer::Sequential => sequential_character_match(query, candidate),
            Scorer::Dice => dice_match(query, candidate),
        }
    }
}

/// Known-valid identifiers for the current document. Read-only during a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    rows: Vec<LookupRow>,
}

#[derive(Debug, Deserialize)]
struct LookupRow {
    #[serde(rename = "drawingNumber", default)]
    drawing_number: Option<String>,
}

impl ReferenceSet {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// One identifier per line; blank lines are skipped.
    pub fn from_lines(raw: &str) -> Self {
        let entries = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    /// `{"rows": [{"drawingNumber": "..."}]}` with percent-encoded identifiers.
    pub fn from_lookup_json(raw: &str) -> Result<Self> {
        let response: LookupResponse =
            serde_json::from_str(raw).with_context(|| "failed to parse reference lookup JSON")?;
        let entries = response
            .rows
            .into_iter()
            .filter_map(|row| row.drawing_number)
            .map(|encoded| match urlencoding::decode(&encoded) {
                Ok(decoded) => decoded.into_owned(),
                Err(err) => {
                    tracing::warn!("keeping undecodable reference {encoded:?}: {err}");
                    encoded
                }
            })
            .filter(|entry| !entry.trim().is_empty())
            .collect();
        Ok(Self { entries })
    }

    pub fn load_lines(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read references {}", path.display()))?;
        Ok(Self::from_lines(&raw))
    }

    pub fn load_lookup_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read references {}", path.display()))?;
        Self::from_lookup_json(&raw)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranks every entry against `query`, best first. Ties keep reference order.
    pub fn rank(&self, query: &str, scorer: Scorer) -> MatchReport {
        if query.trim().is_empty() || self.entries.is_empty() {
            return MatchReport::default();
        }

        let mut matches: Vec<MatchResult> = self
            .entries
            .iter()
            .map(|target| MatchResult {
                target: target.clone(),
                rating: scorer.score(query, target),
            })
            .collect();
        matches.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        tracing::debug!(
            query,
            best = %matches[0].target,
            rating = matches[0].rating,
            "ranked {} references",
            matches.len()
        );
        MatchReport {
            best_match: matches[0].clone(),
            all_matches: matches,
        }
    }
}

/// Sequential scoring over a plain list of references.
pub fn find_best_sequential_match<S: AsRef<str>>(query: &str, references: &[S]) -> MatchReport {
    let set = ReferenceSet::new(references.iter().map(|r| r.as_ref().to_string()).collect());
    set.rank(query, Scorer::Sequential)
}
