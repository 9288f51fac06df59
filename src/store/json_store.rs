use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::bank::Skill;
use crate::session::writing::WritingDraft;
use crate::store::ProgressStore;
use crate::store::schema::{
    AttemptHistoryData, AttemptRecord, CompletedTestsData, WritingDraftsData,
};

const COMPLETED_FILE: &str = "completed_tests.json";
const DRAFTS_FILE: &str = "writing_drafts.json";
const HISTORY_FILE: &str = "attempt_history.json";

/// File-backed progress under the platform data dir, one JSON file per concern.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ielts-mock");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable store file");
                    T::default()
                }
            },
            Err(_) => T::default(),
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl ProgressStore for JsonStore {
    fn load_completed(&self) -> BTreeSet<Skill> {
        self.load::<CompletedTestsData>(COMPLETED_FILE).skills
    }

    fn save_completed(&self, skills: &BTreeSet<Skill>) -> Result<()> {
        let data = CompletedTestsData {
            skills: skills.clone(),
            ..CompletedTestsData::default()
        };
        self.save(COMPLETED_FILE, &data)
    }

    fn load_draft(&self, test_id: &str) -> Option<WritingDraft> {
        self.load::<WritingDraftsData>(DRAFTS_FILE)
            .drafts
            .remove(test_id)
    }

    fn save_draft(&self, test_id: &str, draft: &WritingDraft) -> Result<()> {
        let mut data: WritingDraftsData = self.load(DRAFTS_FILE);
        data.drafts.insert(test_id.to_string(), draft.clone());
        self.save(DRAFTS_FILE, &data)
    }

    fn clear_draft(&self, test_id: &str) -> Result<()> {
        let mut data: WritingDraftsData = self.load(DRAFTS_FILE);
        if data.drafts.remove(test_id).is_some() {
            self.save(DRAFTS_FILE, &data)?;
        }
        Ok(())
    }

    fn load_history(&self) -> Vec<AttemptRecord> {
        self.load::<AttemptHistoryData>(HISTORY_FILE).attempts
    }

    fn append_attempt(&self, record: AttemptRecord) -> Result<()> {
        let mut data: AttemptHistoryData = self.load(HISTORY_FILE);
        data.push(record);
        self.save(HISTORY_FILE, &data)
    }
}
