//! End-to-end attempts against the bundled `questions/` bank.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use ielts_mock::bank::schema::TestDefinition;
use ielts_mock::bank::{DirSource, QuestionBank, Skill};
use ielts_mock::engine::Verdict;
use ielts_mock::error::{CaptureError, ValidationError};
use ielts_mock::session::answers::AnswerValue;
use ielts_mock::session::attempt::Attempt;
use ielts_mock::session::recording::{ActiveCapture, AudioCapture, AudioClip, SpeakingPart};
use ielts_mock::store::{JsonStore, MemoryStore, ProgressStore};
use tempfile::TempDir;

fn bank() -> QuestionBank<DirSource> {
    QuestionBank::new(DirSource::new(env!("CARGO_MANIFEST_DIR")))
}

fn load(skill: Skill) -> TestDefinition {
    bank()
        .load_first_available(skill)
        .unwrap_or_else(|e| panic!("bundled {skill} test: {e}"))
}

struct SilentCapture {
    dir: PathBuf,
}

struct SilentHandle {
    part: SpeakingPart,
    path: PathBuf,
}

impl AudioCapture for SilentCapture {
    fn start(&mut self, part: SpeakingPart) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        Ok(Box::new(SilentHandle {
            part,
            path: self.dir.join(format!("{}.wav", part.key())),
        }))
    }
}

impl ActiveCapture for SilentHandle {
    fn finish(self: Box<Self>) -> Result<AudioClip, CaptureError> {
        std::fs::write(&self.path, [0u8; 64]).map_err(CaptureError::Io)?;
        Ok(AudioClip::new(self.part, self.path.clone(), "audio/wav", 64))
    }

    fn abort(self: Box<Self>) {}
}

#[test]
fn every_skill_has_a_bundled_test() {
    let bank = bank();
    for skill in Skill::ALL {
        let ids = bank.list_available(skill).unwrap();
        assert!(!ids.is_empty(), "{skill} index is empty");
        assert!(ids.iter().all(|id| !id.ends_with(".json")));
        for id in ids {
            let def = bank.load(skill, &id).unwrap();
            assert_eq!(def.skill(), skill);
            assert_eq!(def.test_id(), id);
        }
    }
}

#[test]
fn reading_passages_resolve() {
    let bank = bank();
    let TestDefinition::Reading(test) = load(Skill::Reading) else {
        panic!("not a reading test");
    };
    for passage in &test.passages {
        let text = bank.load_passage_text(passage).unwrap();
        assert!(!text.trim().is_empty(), "{} is empty", passage.title);
    }
}

#[test]
fn listening_full_marks() {
    let store = MemoryStore::new();
    let mut attempt = Attempt::new(load(Skill::Listening), 30);
    attempt.begin();
    attempt.set_answer("1", AnswerValue::Text("harper".to_string()));
    attempt.set_answer("2", AnswerValue::Text(" BT7 2LP ".to_string()));
    attempt.set_answer("3", AnswerValue::Text("Thursday".to_string()));
    attempt.set_answer("4", AnswerValue::Choice(1));
    attempt.set_answer("5", AnswerValue::Selection(BTreeSet::from([0, 4])));
    attempt.set_answer("6", AnswerValue::Pairs(BTreeMap::from([(0, 2), (1, 0), (2, 1)])));
    attempt.set_answer("7", AnswerValue::Text("18".to_string()));

    let submission = attempt.submit(&store).unwrap();
    let score = submission.score.unwrap();
    // Question 8 has no key and is not counted.
    assert_eq!(score.total_questions, 7);
    assert_eq!(score.correct_count, 7);
    assert_eq!(score.band.to_string(), "9.0");
    assert!(score.wrong_question_ids.is_empty());
    assert!(store.load_completed().contains(&Skill::Listening));
}

#[test]
fn listening_partial_lists_wrong_ids_in_order() {
    let store = MemoryStore::new();
    let mut attempt = Attempt::new(load(Skill::Listening), 30);
    attempt.set_answer("1", AnswerValue::Text("Harper".to_string()));
    attempt.set_answer("4", AnswerValue::Choice(0));
    attempt.set_answer("5", AnswerValue::Selection(BTreeSet::from([0])));

    let score = attempt.submit(&store).unwrap().score.unwrap();
    assert_eq!(score.correct_count, 1);
    assert_eq!(score.wrong_question_ids, vec!["2", "3", "4", "5", "6", "7"]);
}

#[test]
fn reading_refuses_until_every_question_is_answered() {
    let store = MemoryStore::new();
    let mut attempt = Attempt::new(load(Skill::Reading), 60);
    attempt.set_answer("r1", AnswerValue::Heading(0));

    let err = attempt.submit(&store).unwrap_err();
    assert_eq!(err.to_string(), "Please mark True / False / Not Given for r2.");
    assert_eq!(err.question_id(), Some("r2"));
    assert!(!attempt.is_submitted());
    assert!(store.load_completed().is_empty());

    attempt.set_answer("r2", AnswerValue::Verdict(Verdict::False));
    attempt.set_answer("r3", AnswerValue::Verdict(Verdict::True));
    attempt.set_answer("r4", AnswerValue::Choice(1));
    attempt.set_answer("r5", AnswerValue::Verdict(Verdict::True));
    attempt.set_answer("r6", AnswerValue::Verdict(Verdict::False));
    attempt.set_answer("r7", AnswerValue::Choice(1));

    let score = attempt.submit(&store).unwrap().score.unwrap();
    assert_eq!(score.correct_count, 6);
    assert_eq!(score.total_questions, 7);
    assert_eq!(score.wrong_question_ids, vec!["r6"]);
}

#[test]
fn redo_restores_a_fresh_attempt() {
    let store = MemoryStore::new();
    let mut attempt = Attempt::new(load(Skill::Listening), 30);
    attempt.begin();
    attempt.set_answer("4", AnswerValue::Choice(1));
    attempt.submit(&store).unwrap();
    attempt.toggle_show_answers();

    attempt.redo(&store);
    assert!(!attempt.is_submitted());
    assert!(!attempt.show_answers());
    assert!(attempt.score().is_none());
    assert!(attempt.answers().is_empty());
    assert!(!attempt.session().started());
    assert_eq!(attempt.session().time_left_secs(), 30 * 60);
}

#[test]
fn writing_draft_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let def = load(Skill::Writing);
    let test_id = def.test_id().to_string();

    {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut attempt = Attempt::new(def.clone(), 60);
        attempt.set_draft_text("Car ownership rose steadily.", &store);
    }

    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut attempt = Attempt::new(def, 60);
    attempt.restore_draft(&store);
    assert_eq!(attempt.draft().text, "Car ownership rose steadily.");

    let submission = attempt.submit(&store).unwrap();
    assert!(submission.score.is_none());
    let json = submission.payload.to_json().unwrap();
    assert!(json.contains("\"testId\": \"writing-sample-1\""));
    assert!(json.contains("Car ownership rose steadily."));

    assert!(store.load_draft(&test_id).is_none());
    let history = store.load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].skill, Skill::Writing);
}

#[test]
fn empty_writing_is_refused() {
    let store = MemoryStore::new();
    let mut attempt = Attempt::new(load(Skill::Writing), 60);
    attempt.set_draft_text("   \n", &store);
    assert!(matches!(
        attempt.submit(&store),
        Err(ValidationError::EmptyWriting)
    ));
}

#[test]
fn speaking_needs_all_three_parts() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let capture = SilentCapture {
        dir: dir.path().to_path_buf(),
    };
    let mut attempt = Attempt::new(load(Skill::Speaking), 14).with_capture(Box::new(capture));

    attempt.start_recording(SpeakingPart::Part1).unwrap();
    assert!(attempt.session().started());
    assert!(matches!(
        attempt.start_recording(SpeakingPart::Part2),
        Err(CaptureError::Busy {
            active: SpeakingPart::Part1
        })
    ));
    attempt.stop_recording(SpeakingPart::Part1).unwrap();

    let err = attempt.submit(&store).unwrap_err();
    assert_eq!(err.to_string(), "Please record: Part 2 audio, Part 3 audio");

    for part in [SpeakingPart::Part2, SpeakingPart::Part3] {
        attempt.start_recording(part).unwrap();
        attempt.stop_recording(part).unwrap();
    }
    let submission = attempt.submit(&store).unwrap();
    assert!(submission.score.is_none());
    for part in SpeakingPart::ALL {
        match submission.payload.answers.get(part.key()) {
            Some(AnswerValue::Audio(clip)) => assert!(Path::new(&clip.path).exists()),
            other => panic!("{part}: {other:?}"),
        }
    }
}

#[test]
fn progress_persists_across_store_instances() {
    let dir = TempDir::new().unwrap();
    {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut attempt = Attempt::new(load(Skill::Listening), 30);
        attempt.submit(&store).unwrap();
    }
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert_eq!(store.load_completed(), BTreeSet::from([Skill::Listening]));
}
