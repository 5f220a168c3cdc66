use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::storage::{KeyValueStore, StoreResult};

/// Key the whole leaderboard record lives under
pub const LEADERBOARD_KEY: &str = "emoji-tap-leaderboard";
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub score: u32,
    pub max_combo: u32,
    pub date: DateTime<Utc>,
}

/// Top scores, highest first, persisted through an injected backend
pub struct Leaderboard {
    store: Box<dyn KeyValueStore>,
    entries: Vec<LeaderboardEntry>,
    last_added_id: Option<String>,
}

impl std::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard")
            .field("entries", &self.entries)
            .field("last_added_id", &self.last_added_id)
            .finish_non_exhaustive()
    }
}

impl Leaderboard {
    /// Wrap `store` and load whatever it already holds
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let mut leaderboard = Self {
            store,
            entries: Vec::new(),
            last_added_id: None,
        };
        leaderboard.load();
        leaderboard
    }

    /// Re-read the persisted list. Unreadable or corrupted data yields an empty board.
    pub fn load(&mut self) -> Vec<LeaderboardEntry> {
        self.entries = match read_entries(self.store.as_ref()) {
            Ok(entries) => rank(entries),
            Err(e) => {
                log::warn!("discarding unreadable leaderboard: {e}");
                Vec::new()
            }
        };
        self.entries.clone()
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn add_entry(&mut self, name: &str, score: u32, max_combo: u32) -> Vec<LeaderboardEntry> {
        self.add_entry_at(name, score, max_combo, Utc::now())
    }

    /// Same as `add_entry` with an explicit creation time
    pub fn add_entry_at(
        &mut self,
        name: &str,
        score: u32,
        max_combo: u32,
        now: DateTime<Utc>,
    ) -> Vec<LeaderboardEntry> {
        let entry = LeaderboardEntry {
            id: self.fresh_id(now),
            name: name.to_string(),
            score,
            max_combo,
            date: now,
        };
        self.last_added_id = Some(entry.id.clone());

        let mut entries = std::mem::take(&mut self.entries);
        entries.push(entry);
        self.entries = rank(entries);

        if let Err(e) = self.persist() {
            log::error!("failed to save leaderboard: {e}");
        }
        self.entries.clone()
    }

    /// Whether `score` would make it onto the board right now
    pub fn is_high_score(&self, score: u32) -> bool {
        self.entries.len() < MAX_ENTRIES
            || self.entries.last().is_some_and(|lowest| score > lowest.score)
    }

    /// 1-based position of the entry with `id`
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    /// Rank of the most recently added entry, `None` once it has been pushed off
    pub fn last_added_rank(&self) -> Option<usize> {
        self.last_added_id.as_deref().and_then(|id| self.rank_of(id))
    }

    fn fresh_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        while self.entries.iter().any(|e| e.id == millis.to_string()) {
            millis += 1;
        }
        millis.to_string()
    }

    fn persist(&self) -> StoreResult<()> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(LEADERBOARD_KEY, &json)
    }
}

fn read_entries(store: &dyn KeyValueStore) -> StoreResult<Vec<LeaderboardEntry>> {
    match store.get(LEADERBOARD_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

/// Stable sort by score, highest first, cut to the board size
fn rank(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries
        .into_iter()
        .sorted_by_key(|e| Reverse(e.score))
        .take(MAX_ENTRIES)
        .collect()
}

/// Trimmed name, or `None` when nothing is left to save under
pub fn validate_player_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
