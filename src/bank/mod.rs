pub mod schema;
pub mod source;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use schema::{ReadingPassage, TestDefinition};
pub use source::{DirSource, QuestionSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Listening,
    Reading,
    Writing,
    Speaking,
}

impl Skill {
    pub const ALL: [Skill; 4] = [
        Skill::Listening,
        Skill::Reading,
        Skill::Writing,
        Skill::Speaking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Skill::Listening => "listening",
            Skill::Reading => "reading",
            Skill::Writing => "writing",
            Skill::Speaking => "speaking",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Skill::Listening => "Listening",
            Skill::Reading => "Reading",
            Skill::Writing => "Writing",
            Skill::Speaking => "Speaking",
        }
    }

    pub fn default_minutes(self) -> u32 {
        match self {
            Skill::Listening => 30,
            Skill::Reading | Skill::Writing => 60,
            // Real speaking lasts 11-14 minutes.
            Skill::Speaking => 14,
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Skill::Listening => "4 recorded sections, 40 questions",
            Skill::Reading => "3 long texts, 40 questions",
            Skill::Writing => "Task 1 report and Task 2 essay",
            Skill::Speaking => "3-part interview, recorded answers",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Skill::ALL
            .into_iter()
            .find(|skill| skill.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown skill `{s}`"))
    }
}

pub fn index_path(skill: Skill) -> String {
    format!("questions/{}/index.json", skill.as_str())
}

pub fn test_path(skill: Skill, test_id: &str) -> String {
    format!("questions/{}/{}.json", skill.as_str(), test_id)
}

/// Thin I/O wrapper over a [`QuestionSource`]: one fetch per call, no retries, no cache.
pub struct QuestionBank<S> {
    source: S,
}

impl<S: QuestionSource> QuestionBank<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn list_available(&self, skill: Skill) -> Result<Vec<String>, LoadError> {
        let path = index_path(skill);
        let body = self.source.fetch_text(&path)?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|source| LoadError::Parse {
                path: path.clone(),
                source,
            })?;

        // A body that is valid JSON but not an array is treated as an empty index.
        let Some(entries) = value.as_array() else {
            tracing::warn!(%skill, "question index is not an array");
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .filter_map(|v| v.as_str())
            .map(|id| id.strip_suffix(".json").unwrap_or(id).to_string())
            .collect())
    }

    pub fn load(&self, skill: Skill, test_id: &str) -> Result<TestDefinition, LoadError> {
        let path = test_path(skill, test_id);
        let body = self.source.fetch_text(&path)?;
        let def = match skill {
            Skill::Listening => TestDefinition::Listening(parse(&path, &body)?),
            Skill::Reading => TestDefinition::Reading(parse(&path, &body)?),
            Skill::Writing => TestDefinition::Writing(parse(&path, &body)?),
            Skill::Speaking => TestDefinition::Speaking(parse(&path, &body)?),
        };
        tracing::info!(%skill, test_id, "loaded test");
        Ok(def)
    }

    pub fn load_first_available(&self, skill: Skill) -> Result<TestDefinition, LoadError> {
        let ids = self.list_available(skill)?;
        let first = ids.first().ok_or(LoadError::NoTests { skill })?;
        self.load(skill, first)
    }

    pub fn load_passage_text(&self, passage: &ReadingPassage) -> Result<String, LoadError> {
        self.source.fetch_text(&passage.text_file)
    }
}

fn parse<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, LoadError> {
    serde_json::from_str(body).map_err(|source| LoadError::Parse {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FakeSource(HashMap<String, String>);

    impl QuestionSource for FakeSource {
        fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
            self.0.get(path).cloned().ok_or_else(|| LoadError::Status {
                path: path.to_string(),
                status: 404,
            })
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn bank(files: &[(&str, &str)]) -> QuestionBank<FakeSource> {
        QuestionBank::new(FakeSource(
            files
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn skill_parses_case_insensitively() {
        assert_eq!("Reading".parse::<Skill>().unwrap(), Skill::Reading);
        assert!("maths".parse::<Skill>().is_err());
    }

    #[test]
    fn list_available_strips_json_suffix() {
        let bank = bank(&[(
            "questions/listening/index.json",
            r#"["cambridge-08-test-1.json", "cambridge-08-test-2"]"#,
        )]);
        let ids = bank.list_available(Skill::Listening).unwrap();
        assert_eq!(ids, vec!["cambridge-08-test-1", "cambridge-08-test-2"]);
    }

    #[test]
    fn non_array_index_is_empty() {
        let bank = bank(&[("questions/reading/index.json", r#"{"tests": []}"#)]);
        assert!(bank.list_available(Skill::Reading).unwrap().is_empty());
    }

    #[test]
    fn missing_test_surfaces_status() {
        let bank = bank(&[]);
        let err = bank.load(Skill::Writing, "w9").unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[test]
    fn unparseable_body_is_parse_error() {
        let bank = bank(&[("questions/speaking/s1.json", "{ not json")]);
        let err = bank.load(Skill::Speaking, "s1").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn empty_index_has_no_first_test() {
        let bank = bank(&[("questions/writing/index.json", "[]")]);
        let err = bank.load_first_available(Skill::Writing).unwrap_err();
        assert!(matches!(err, LoadError::NoTests { skill: Skill::Writing }));
    }

    #[test]
    fn load_first_available_follows_index() {
        let bank = bank(&[
            ("questions/writing/index.json", r#"["w2"]"#),
            (
                "questions/writing/w2.json",
                r#"{"testId":"w2","task1":{"type":"visual-report","prompt":"Chart"},"task2":{"type":"essay","prompt":"Essay"}}"#,
            ),
        ]);
        let def = bank.load_first_available(Skill::Writing).unwrap();
        assert_eq!(def.test_id(), "w2");
    }
}
