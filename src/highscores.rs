//! High score leaderboard table
//!
//! Tracks the top 10 `{initials, score}` entries, sorted descending.
//! Equal scores keep arrival order: a new entry goes below existing ties.

use serde::{Deserialize, Serialize};

use crate::leaderboard::Initials;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub initials: Initials,
    pub score: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a table from unordered entries (sorted, truncated to 10)
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, initials: Initials, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry { initials, score };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ini(s: &str) -> Initials {
        Initials::parse(s).unwrap()
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(ini("AAA"), 100), Some(1));
        assert_eq!(scores.add_score(ini("BBB"), 300), Some(1));
        assert_eq!(scores.add_score(ini("CCC"), 200), Some(2));
        let order: Vec<u64> = scores.entries().iter().map(|e| e.score).collect();
        assert_eq!(order, vec![300, 200, 100]);
        assert_eq!(scores.top_score(), Some(300));
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut scores = HighScores::new();
        scores.add_score(ini("OLD"), 500);
        assert_eq!(scores.add_score(ini("NEW"), 500), Some(2));
        assert_eq!(scores.entries()[0].initials.as_str(), "OLD");
    }

    #[test]
    fn test_full_table_rejects_low_scores() {
        let mut scores = HighScores::new();
        for i in 1..=10 {
            scores.add_score(ini("AAA"), i * 100);
        }
        assert_eq!(scores.entries().len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(100));
        assert_eq!(scores.add_score(ini("LOW"), 50), None);
        assert_eq!(scores.potential_rank(150), Some(10));
        assert_eq!(scores.add_score(ini("MID"), 550), Some(6));
        assert_eq!(scores.entries().len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries().last().map(|e| e.score), Some(200));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_from_entries_sorts_and_truncates() {
        let entries = (0..15)
            .map(|i| ScoreEntry {
                initials: ini("ZZ"),
                score: i,
            })
            .collect();
        let scores = HighScores::from_entries(entries);
        assert_eq!(scores.entries().len(), 10);
        assert_eq!(scores.top_score(), Some(14));
        assert_eq!(scores.entries().last().map(|e| e.score), Some(5));
    }
}
