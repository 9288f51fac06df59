use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::Skill;
use crate::engine::scoring::ScoreResult;
use crate::session::writing::WritingDraft;

pub const SCHEMA_VERSION: u32 = 1;

/// Oldest entries are dropped beyond this many attempts.
pub const HISTORY_LIMIT: usize = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedTestsData {
    pub schema_version: u32,
    pub skills: BTreeSet<Skill>,
}

impl Default for CompletedTestsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            skills: BTreeSet::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WritingDraftsData {
    pub schema_version: u32,
    /// Keyed by writing test id.
    pub drafts: BTreeMap<String, WritingDraft>,
}

impl Default for WritingDraftsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            drafts: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub skill: Skill,
    pub test_id: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub score: Option<ScoreResult>,
    #[serde(default)]
    pub time_used_secs: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptHistoryData {
    pub schema_version: u32,
    pub attempts: Vec<AttemptRecord>,
}

impl Default for AttemptHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attempts: Vec::new(),
        }
    }
}

impl AttemptHistoryData {
    pub fn push(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
        if self.attempts.len() > HISTORY_LIMIT {
            let excess = self.attempts.len() - HISTORY_LIMIT;
            self.attempts.drain(..excess);
        }
    }
}
