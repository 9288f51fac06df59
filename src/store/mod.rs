pub mod json_store;
pub mod schema;

use std::cell::RefCell;
use std::collections::BTreeSet;

use anyhow::Result;

use crate::bank::Skill;
use crate::session::writing::WritingDraft;
use schema::{AttemptHistoryData, AttemptRecord, CompletedTestsData, WritingDraftsData};

pub use json_store::JsonStore;

/// Per-user persistence injected into attempts and the catalog.
///
/// Reads happen at init and never fail (missing or corrupt data reads as
/// empty); writes happen on every change.
pub trait ProgressStore {
    fn load_completed(&self) -> BTreeSet<Skill>;
    fn save_completed(&self, skills: &BTreeSet<Skill>) -> Result<()>;

    fn load_draft(&self, test_id: &str) -> Option<WritingDraft>;
    fn save_draft(&self, test_id: &str, draft: &WritingDraft) -> Result<()>;
    fn clear_draft(&self, test_id: &str) -> Result<()>;

    fn load_history(&self) -> Vec<AttemptRecord>;
    fn append_attempt(&self, record: AttemptRecord) -> Result<()>;

    fn mark_completed(&self, skill: Skill) -> Result<()> {
        let mut skills = self.load_completed();
        if skills.insert(skill) {
            self.save_completed(&skills)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and for running without a writable data dir.
#[derive(Default)]
pub struct MemoryStore {
    completed: RefCell<CompletedTestsData>,
    drafts: RefCell<WritingDraftsData>,
    history: RefCell<AttemptHistoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load_completed(&self) -> BTreeSet<Skill> {
        self.completed.borrow().skills.clone()
    }

    fn save_completed(&self, skills: &BTreeSet<Skill>) -> Result<()> {
        self.completed.borrow_mut().skills = skills.clone();
        Ok(())
    }

    fn load_draft(&self, test_id: &str) -> Option<WritingDraft> {
        self.drafts.borrow().drafts.get(test_id).cloned()
    }

    fn save_draft(&self, test_id: &str, draft: &WritingDraft) -> Result<()> {
        self.drafts
            .borrow_mut()
            .drafts
            .insert(test_id.to_string(), draft.clone());
        Ok(())
    }

    fn clear_draft(&self, test_id: &str) -> Result<()> {
        self.drafts.borrow_mut().drafts.remove(test_id);
        Ok(())
    }

    fn load_history(&self) -> Vec<AttemptRecord> {
        self.history.borrow().attempts.clone()
    }

    fn append_attempt(&self, record: AttemptRecord) -> Result<()> {
        self.history.borrow_mut().push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn mark_completed_is_idempotent() {
        let store = MemoryStore::new();
        store.mark_completed(Skill::Reading).unwrap();
        store.mark_completed(Skill::Reading).unwrap();
        store.mark_completed(Skill::Listening).unwrap();
        let completed: Vec<Skill> = store.load_completed().into_iter().collect();
        assert_eq!(completed, vec![Skill::Listening, Skill::Reading]);
    }

    #[test]
    fn drafts_are_per_test() {
        let store = MemoryStore::new();
        let draft = WritingDraft {
            text: "In conclusion".to_string(),
            images: Vec::new(),
        };
        store.save_draft("w1", &draft).unwrap();
        assert_eq!(store.load_draft("w1"), Some(draft));
        assert_eq!(store.load_draft("w2"), None);
        store.clear_draft("w1").unwrap();
        assert_eq!(store.load_draft("w1"), None);
    }

    #[test]
    fn history_is_capped() {
        let store = MemoryStore::new();
        for i in 0..(schema::HISTORY_LIMIT + 3) {
            store
                .append_attempt(AttemptRecord {
                    skill: Skill::Listening,
                    test_id: format!("t{i}"),
                    submitted_at: Utc::now(),
                    score: None,
                    time_used_secs: 0,
                })
                .unwrap();
        }
        let history = store.load_history();
        assert_eq!(history.len(), schema::HISTORY_LIMIT);
        assert_eq!(history[0].test_id, "t3");
    }
}
