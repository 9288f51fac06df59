use std::collections::{BTreeMap, BTreeSet};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ielts_mock::bank::schema::{AnswerLength, MatchingPair};
use ielts_mock::engine::band::BandTable;
use ielts_mock::engine::question::{Question, QuestionKind, normalize_text};
use ielts_mock::engine::scoring::score;
use ielts_mock::session::answers::{AnswerStore, AnswerValue};

/// A 40-question listening paper cycling through every question type.
fn make_paper() -> (Vec<Question>, AnswerStore) {
    let options: Vec<String> = ["Pool", "Gym", "Spa", "Bar"].map(String::from).to_vec();
    let pairs = vec![
        MatchingPair {
            left: "Monday".to_string(),
            right_options: options.clone(),
        },
        MatchingPair {
            left: "Friday".to_string(),
            right_options: options.clone(),
        },
    ];

    let mut questions = Vec::new();
    let mut answers = AnswerStore::new();
    for i in 0..40 {
        let id = (i + 1).to_string();
        let (kind, answer) = match i % 4 {
            0 => (
                QuestionKind::FormCompletion {
                    length: AnswerLength::Short,
                    correct: Some("  Café Nero ".to_string()),
                },
                AnswerValue::Text("cafe\u{301} nero".to_string()),
            ),
            1 => (
                QuestionKind::SingleChoice {
                    options: options.clone(),
                    correct: Some(2),
                },
                AnswerValue::Choice(i % 3),
            ),
            2 => (
                QuestionKind::MultiSelect {
                    options: options.clone(),
                    correct: Some("A, C".to_string()),
                },
                AnswerValue::Selection(BTreeSet::from([0, 2])),
            ),
            _ => (
                QuestionKind::Matching {
                    pairs: pairs.clone(),
                    correct: Some("B,D".to_string()),
                },
                AnswerValue::Pairs(BTreeMap::from([(0, 1), (1, 3)])),
            ),
        };
        questions.push(Question {
            id: id.clone(),
            group: format!("Section {}", i / 10 + 1),
            prompt: String::new(),
            kind,
        });
        answers.set(&id, answer);
    }
    (questions, answers)
}

fn bench_score(c: &mut Criterion) {
    let (questions, answers) = make_paper();

    c.bench_function("score (40 mixed questions)", |b| {
        b.iter(|| score(black_box(&questions), black_box(&answers)))
    });
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_text (decomposed accents)", |b| {
        b.iter(|| normalize_text(black_box("  Cafe\u{301} on the Rue de l'E\u{301}glise  ")))
    });
}

fn bench_band_rescale(c: &mut Criterion) {
    let table = BandTable::listening();

    c.bench_function("band_for (all raw scores out of 13)", |b| {
        b.iter(|| {
            for correct in 0..=13 {
                black_box(table.band_for(black_box(correct), 13));
            }
        })
    });
}

criterion_group!(benches, bench_score, bench_normalize, bench_band_rescale);
criterion_main!(benches);
