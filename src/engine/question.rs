use std::collections::BTreeMap;
use std::fmt;

use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

use crate::bank::schema::{
    AnswerLength, ListeningQuestion, ListeningQuestionType, MatchingPair, ReadingQuestion,
    ReadingQuestionType, TestDefinition,
};
use crate::session::answers::AnswerValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "T")]
    True,
    #[serde(rename = "F")]
    False,
    #[serde(rename = "NG")]
    NotGiven,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::True, Verdict::False, Verdict::NotGiven];

    pub fn token(self) -> &'static str {
        match self {
            Verdict::True => "T",
            Verdict::False => "F",
            Verdict::NotGiven => "NG",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::True => "True",
            Verdict::False => "False",
            Verdict::NotGiven => "Not Given",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "T" | "TRUE" => Some(Verdict::True),
            "F" | "FALSE" => Some(Verdict::False),
            "NG" | "NOT GIVEN" => Some(Verdict::NotGiven),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One variant per question type; comparators and renderers dispatch on this.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<String>,
        correct: Option<usize>,
    },
    MultiSelect {
        options: Vec<String>,
        /// Canonical letters as written in the bank, e.g. `"A,C"`.
        correct: Option<String>,
    },
    TrueFalseNotGiven {
        statement: String,
        correct: Option<Verdict>,
    },
    MatchingHeadings {
        headings: Vec<String>,
        correct: Option<usize>,
    },
    FormCompletion {
        length: AnswerLength,
        correct: Option<String>,
    },
    Matching {
        pairs: Vec<MatchingPair>,
        /// One letter per pair, comma separated.
        correct: Option<String>,
    },
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice { .. } => "multiple choice",
            QuestionKind::MultiSelect { .. } => "multiple select",
            QuestionKind::TrueFalseNotGiven { .. } => "true / false / not given",
            QuestionKind::MatchingHeadings { .. } => "matching headings",
            QuestionKind::FormCompletion { .. } => "form completion",
            QuestionKind::Matching { .. } => "matching",
        }
    }

    pub fn has_canonical(&self) -> bool {
        match self {
            QuestionKind::SingleChoice { correct, .. }
            | QuestionKind::MatchingHeadings { correct, .. } => correct.is_some(),
            QuestionKind::MultiSelect { correct, .. }
            | QuestionKind::FormCompletion { correct, .. }
            | QuestionKind::Matching { correct, .. } => correct.is_some(),
            QuestionKind::TrueFalseNotGiven { correct, .. } => correct.is_some(),
        }
    }

    /// Whether a value has the shape this question type takes.
    pub fn accepts(&self, value: &AnswerValue) -> bool {
        match (self, value) {
            (QuestionKind::SingleChoice { options, .. }, AnswerValue::Choice(i)) => {
                *i < options.len()
            }
            (QuestionKind::MultiSelect { options, .. }, AnswerValue::Selection(set)) => {
                set.iter().all(|i| *i < options.len())
            }
            (QuestionKind::TrueFalseNotGiven { .. }, AnswerValue::Verdict(_)) => true,
            (QuestionKind::MatchingHeadings { headings, .. }, AnswerValue::Heading(i)) => {
                *i < headings.len()
            }
            (QuestionKind::FormCompletion { .. }, AnswerValue::Text(_)) => true,
            (QuestionKind::Matching { pairs, .. }, AnswerValue::Pairs(map)) => map
                .iter()
                .all(|(p, o)| pairs.get(*p).is_some_and(|pair| *o < pair.right_options.len())),
            _ => false,
        }
    }

    /// `None` when there is no canonical answer to compare against.
    /// Unanswered or wrongly shaped answers are incorrect.
    pub fn is_correct(&self, answer: Option<&AnswerValue>) -> Option<bool> {
        if !self.has_canonical() {
            return None;
        }
        let Some(answer) = answer else {
            return Some(false);
        };
        let correct = match (self, answer) {
            (QuestionKind::SingleChoice { correct, .. }, AnswerValue::Choice(i)) => {
                *correct == Some(*i)
            }
            (QuestionKind::MultiSelect { correct, .. }, AnswerValue::Selection(set)) => {
                let canonical = split_letters(correct.as_deref().unwrap_or_default());
                set.len() == canonical.len()
                    && set
                        .iter()
                        .all(|i| canonical.iter().any(|c| *c == option_letter(*i).to_string()))
            }
            (QuestionKind::TrueFalseNotGiven { correct, .. }, AnswerValue::Verdict(v)) => {
                *correct == Some(*v)
            }
            (QuestionKind::MatchingHeadings { correct, .. }, AnswerValue::Heading(i)) => {
                *correct == Some(*i)
            }
            (QuestionKind::FormCompletion { correct, .. }, AnswerValue::Text(text)) => {
                normalize_text(text) == normalize_text(correct.as_deref().unwrap_or_default())
            }
            (QuestionKind::Matching { correct, .. }, AnswerValue::Pairs(map)) => {
                pairs_match(correct.as_deref().unwrap_or_default(), map)
            }
            _ => false,
        };
        Some(correct)
    }

    /// Canonical answer formatted for the "show answers" overlay.
    pub fn canonical_display(&self) -> Option<String> {
        match self {
            QuestionKind::SingleChoice { options, correct } => correct.map(|i| {
                let text = options.get(i).map(String::as_str).unwrap_or_default();
                format!("{}. {}", option_letter(i), text)
            }),
            QuestionKind::MatchingHeadings { headings, correct } => {
                correct.map(|i| headings.get(i).cloned().unwrap_or_else(|| i.to_string()))
            }
            QuestionKind::TrueFalseNotGiven { correct, .. } => correct.map(|v| v.label().to_string()),
            QuestionKind::MultiSelect { correct, .. }
            | QuestionKind::FormCompletion { correct, .. }
            | QuestionKind::Matching { correct, .. } => correct.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub id: String,
    /// Section or passage heading the question is shown under.
    pub group: String,
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn from_listening(q: &ListeningQuestion, group: &str) -> Self {
        let options = q.options.clone().unwrap_or_default();
        let kind = match q.kind {
            ListeningQuestionType::MultipleChoice if !options.is_empty() && q.multiple_select => {
                QuestionKind::MultiSelect {
                    options,
                    correct: q.correct_answer.clone(),
                }
            }
            ListeningQuestionType::MultipleChoice if !options.is_empty() => {
                let correct = match q.correct_answer.as_deref() {
                    Some(c) => choice_index(c, &options),
                    None => q.correct_option_index.filter(|i| *i < options.len()),
                };
                if (q.correct_answer.is_some() || q.correct_option_index.is_some())
                    && correct.is_none()
                {
                    tracing::warn!(question = %q.id, "canonical answer matches no option");
                }
                QuestionKind::SingleChoice { options, correct }
            }
            ListeningQuestionType::Matching => QuestionKind::Matching {
                pairs: q.pairs.clone().unwrap_or_default(),
                correct: q.correct_answer.clone(),
            },
            _ => QuestionKind::FormCompletion {
                length: q.answer_length.unwrap_or_default(),
                correct: q.correct_answer.clone(),
            },
        };
        Self {
            id: q.id.clone(),
            group: group.to_string(),
            prompt: q.question.clone(),
            kind,
        }
    }

    pub fn from_reading(q: &ReadingQuestion, group: &str) -> Self {
        let kind = match q.kind {
            ReadingQuestionType::MultipleChoice => QuestionKind::SingleChoice {
                options: q.options.clone().unwrap_or_default(),
                correct: q.correct_option_index,
            },
            ReadingQuestionType::TrueFalseNotgiven => QuestionKind::TrueFalseNotGiven {
                statement: q.statement.clone().unwrap_or_default(),
                correct: q.correct_answer.as_deref().and_then(Verdict::from_token),
            },
            ReadingQuestionType::MatchingHeadings => QuestionKind::MatchingHeadings {
                headings: q.headings.clone().unwrap_or_default(),
                correct: q.correct_option_index,
            },
        };
        let prompt = q
            .question
            .clone()
            .or_else(|| q.statement.clone())
            .unwrap_or_default();
        Self {
            id: q.id.clone(),
            group: group.to_string(),
            prompt,
            kind,
        }
    }
}

/// Flatten a test into presentation order. Writing and speaking have no
/// discrete questions.
pub fn questions_for(def: &TestDefinition) -> Vec<Question> {
    match def {
        TestDefinition::Listening(t) => t
            .sections
            .iter()
            .flat_map(|sec| {
                let group = format!("Section {}", sec.section_number);
                sec.questions
                    .iter()
                    .map(move |q| Question::from_listening(q, &group))
            })
            .collect(),
        TestDefinition::Reading(t) => t
            .passages
            .iter()
            .flat_map(|p| p.questions.iter().map(|q| Question::from_reading(q, &p.title)))
            .collect(),
        TestDefinition::Writing(_) | TestDefinition::Speaking(_) => Vec::new(),
    }
}

pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

pub fn letter_index(letter: &str) -> Option<usize> {
    let mut chars = letter.trim().chars();
    let ch = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !ch.is_ascii_uppercase() {
        return None;
    }
    Some((ch as u8 - b'A') as usize)
}

/// Letter (`B`) or option text (`the library`) to option index.
fn choice_index(canonical: &str, options: &[String]) -> Option<usize> {
    letter_index(canonical)
        .filter(|i| *i < options.len())
        .or_else(|| {
            let wanted = normalize_text(canonical);
            options.iter().position(|o| normalize_text(o) == wanted)
        })
}

fn split_letters(canonical: &str) -> Vec<String> {
    canonical
        .split(',')
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn pairs_match(canonical: &str, map: &BTreeMap<usize, usize>) -> bool {
    let expected = split_letters(canonical);
    map.len() == expected.len()
        && expected.iter().enumerate().all(|(pair, letter)| {
            map.get(&pair)
                .is_some_and(|o| option_letter(*o).to_string() == *letter)
        })
}

/// Comparison form for free-text answers: NFC, trimmed, lowercased.
pub fn normalize_text(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(text.trim()).to_lowercase()
}
