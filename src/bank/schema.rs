use serde::{Deserialize, Serialize};

use crate::bank::Skill;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListeningQuestionType {
    MultipleChoice,
    FormCompletion,
    Matching,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerLength {
    #[default]
    Short,
    Medium,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPair {
    pub left: String,
    pub right_options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ListeningQuestionType,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    /// Older banks key single-choice items by index instead of letter.
    #[serde(default)]
    pub correct_option_index: Option<usize>,
    #[serde(default)]
    pub answer_length: Option<AnswerLength>,
    #[serde(default)]
    pub multiple_select: bool,
    #[serde(default)]
    pub pairs: Option<Vec<MatchingPair>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningSection {
    pub section_number: u32,
    pub audio_url: String,
    pub questions: Vec<ListeningQuestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningTest {
    pub test_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub sections: Vec<ListeningSection>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingQuestionType {
    MultipleChoice,
    TrueFalseNotgiven,
    MatchingHeadings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReadingQuestionType,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub headings: Option<Vec<String>>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_option_index: Option<usize>,
    /// `T`, `F` or `NG` for true/false/not-given items.
    #[serde(default)]
    pub correct_answer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPassage {
    pub id: String,
    pub title: String,
    pub text_file: String,
    pub questions: Vec<ReadingQuestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingTest {
    pub test_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub passages: Vec<ReadingPassage>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingTask1 {
    #[serde(rename = "type", default = "default_task1_type")]
    pub kind: String,
    pub prompt: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_task1_type() -> String {
    "visual-report".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WritingTask2 {
    #[serde(rename = "type", default = "default_task2_type")]
    pub kind: String,
    pub prompt: String,
}

fn default_task2_type() -> String {
    "essay".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingTest {
    pub test_id: String,
    pub task1: WritingTask1,
    pub task2: WritingTask2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CueCard {
    pub topic: String,
    pub points: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeakingPart1 {
    pub topic: String,
    pub questions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingPart2 {
    pub cue_card: CueCard,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeakingPart3 {
    pub discussion: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakingTest {
    pub test_id: String,
    pub part1: SpeakingPart1,
    pub part2: SpeakingPart2,
    pub part3: SpeakingPart3,
}

/// A loaded test of any skill.
#[derive(Clone, Debug, PartialEq)]
pub enum TestDefinition {
    Listening(ListeningTest),
    Reading(ReadingTest),
    Writing(WritingTest),
    Speaking(SpeakingTest),
}

impl TestDefinition {
    pub fn skill(&self) -> Skill {
        match self {
            TestDefinition::Listening(_) => Skill::Listening,
            TestDefinition::Reading(_) => Skill::Reading,
            TestDefinition::Writing(_) => Skill::Writing,
            TestDefinition::Speaking(_) => Skill::Speaking,
        }
    }

    pub fn test_id(&self) -> &str {
        match self {
            TestDefinition::Listening(t) => &t.test_id,
            TestDefinition::Reading(t) => &t.test_id,
            TestDefinition::Writing(t) => &t.test_id,
            TestDefinition::Speaking(t) => &t.test_id,
        }
    }

    pub fn title(&self) -> String {
        let explicit = match self {
            TestDefinition::Listening(t) => t.title.clone(),
            TestDefinition::Reading(t) => t.title.clone(),
            _ => None,
        };
        explicit.unwrap_or_else(|| format!("{} Test", self.skill().label()))
    }
}
