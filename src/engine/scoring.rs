use serde::{Deserialize, Serialize};

use crate::engine::band::{Band, BandTable};
use crate::engine::question::Question;
use crate::session::answers::AnswerStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct_count: u32,
    pub total_questions: u32,
    pub band: Band,
    /// Incorrect or unanswered ids, in question order.
    pub wrong_question_ids: Vec<String>,
}

impl ScoreResult {
    pub fn percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.total_questions) * 100.0
    }
}

/// Score every question that has a canonical answer.
pub fn score(questions: &[Question], answers: &AnswerStore) -> ScoreResult {
    score_with(&BandTable::listening(), questions, answers)
}

pub fn score_with(table: &BandTable, questions: &[Question], answers: &AnswerStore) -> ScoreResult {
    let mut correct_count = 0;
    let mut total_questions = 0;
    let mut wrong_question_ids = Vec::new();

    for q in questions {
        let Some(correct) = q.kind.is_correct(answers.get(&q.id)) else {
            continue;
        };
        total_questions += 1;
        if correct {
            correct_count += 1;
        } else {
            wrong_question_ids.push(q.id.clone());
        }
    }

    ScoreResult {
        correct_count,
        total_questions,
        band: table.band_for(correct_count, total_questions),
        wrong_question_ids,
    }
}
