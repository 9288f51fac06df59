use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::engine::question::Verdict;
use crate::session::recording::AudioClip;

/// A learner's response; the variant follows the question type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Choice(usize),
    Selection(BTreeSet<usize>),
    Verdict(Verdict),
    Heading(usize),
    Text(String),
    Pairs(BTreeMap<usize, usize>),
    Audio(AudioClip),
}

/// Question id to answer. Mutations never validate; see submit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    answers: BTreeMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_id: &str, value: AnswerValue) {
        self.answers.insert(question_id.to_string(), value);
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn clear(&mut self, question_id: &str) -> Option<AnswerValue> {
        self.answers.remove(question_id)
    }

    pub fn clear_all(&mut self) {
        self.answers.clear();
    }

    /// Checkbox semantics for multi-select: add the option if absent, remove it if present.
    /// A non-selection answer under the same id is replaced.
    pub fn toggle_selection(&mut self, question_id: &str, option: usize) {
        let entry = self
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| AnswerValue::Selection(BTreeSet::new()));
        if !matches!(entry, AnswerValue::Selection(_)) {
            *entry = AnswerValue::Selection(BTreeSet::new());
        }
        if let AnswerValue::Selection(set) = entry
            && !set.remove(&option)
        {
            set.insert(option);
        }
    }

    pub fn set_pair(&mut self, question_id: &str, pair: usize, option: usize) {
        let entry = self
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| AnswerValue::Pairs(BTreeMap::new()));
        if !matches!(entry, AnswerValue::Pairs(_)) {
            *entry = AnswerValue::Pairs(BTreeMap::new());
        }
        if let AnswerValue::Pairs(map) = entry {
            map.insert(pair, option);
        }
    }

    /// Append to a free-text answer (terminal typing), creating it if needed.
    pub fn push_char(&mut self, question_id: &str, ch: char) {
        match self.answers.get_mut(question_id) {
            Some(AnswerValue::Text(text)) => text.push(ch),
            _ => self.set(question_id, AnswerValue::Text(ch.to_string())),
        }
    }

    pub fn pop_char(&mut self, question_id: &str) {
        if let Some(AnswerValue::Text(text)) = self.answers.get_mut(question_id) {
            text.pop();
            if text.is_empty() {
                self.answers.remove(question_id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v))
    }
}
