use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bank::Skill;
use crate::bank::schema::TestDefinition;
use crate::engine::question::{Question, QuestionKind, questions_for};
use crate::engine::scoring::{ScoreResult, score};
use crate::error::{CaptureError, ValidationError};
use crate::session::answers::{AnswerStore, AnswerValue};
use crate::session::recording::{AudioCapture, RecordingDeck, SpeakingPart};
use crate::session::test_session::{Navigation, TestSession};
use crate::session::writing::WritingDraft;
use crate::store::ProgressStore;
use crate::store::schema::AttemptRecord;

/// How strictly answers are checked before a submission is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Every choice, verdict and heading question must be answered.
    RequireAnswers,
    /// Unanswered questions are simply scored as wrong.
    AllowPartial,
}

impl ValidationPolicy {
    pub fn for_skill(skill: Skill) -> Self {
        match skill {
            Skill::Reading => ValidationPolicy::RequireAnswers,
            _ => ValidationPolicy::AllowPartial,
        }
    }
}

/// First question that blocks submission under `policy`, in question order.
pub fn validate_answers(
    questions: &[Question],
    answers: &AnswerStore,
    policy: ValidationPolicy,
) -> Result<(), ValidationError> {
    if policy == ValidationPolicy::AllowPartial {
        return Ok(());
    }
    for q in questions {
        match answers.get(&q.id) {
            None => {
                return Err(ValidationError::MissingAnswer {
                    question_id: q.id.clone(),
                    message: missing_message(q),
                });
            }
            Some(value) if !q.kind.accepts(value) => {
                return Err(ValidationError::MalformedAnswer {
                    question_id: q.id.clone(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn missing_message(q: &Question) -> String {
    match q.kind {
        QuestionKind::SingleChoice { .. } | QuestionKind::MultiSelect { .. } => {
            format!("Please answer {} (multiple choice).", q.id)
        }
        QuestionKind::TrueFalseNotGiven { .. } => {
            format!("Please mark True / False / Not Given for {}.", q.id)
        }
        QuestionKind::MatchingHeadings { .. } => format!("Please select a heading for {}.", q.id),
        QuestionKind::FormCompletion { .. } | QuestionKind::Matching { .. } => {
            format!("Please answer {}.", q.id)
        }
    }
}

/// The record that would be uploaded for grading.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub test_id: String,
    pub skill: Skill,
    pub answers: AnswerStore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing: Option<WritingDraft>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub payload: SubmissionPayload,
    /// Present for auto-scored skills.
    pub score: Option<ScoreResult>,
}

/// One learner's run through one test: timer, answers, drafts, recordings
/// and the eventual score.
pub struct Attempt {
    test: TestDefinition,
    questions: Vec<Question>,
    session: TestSession,
    answers: AnswerStore,
    score: Option<ScoreResult>,
    submitted: bool,
    show_answers: bool,
    draft: WritingDraft,
    deck: Option<RecordingDeck<Box<dyn AudioCapture>>>,
}

impl Attempt {
    pub fn new(test: TestDefinition, duration_minutes: u32) -> Self {
        let questions = questions_for(&test);
        Self {
            test,
            questions,
            session: TestSession::new(duration_minutes),
            answers: AnswerStore::new(),
            score: None,
            submitted: false,
            show_answers: false,
            draft: WritingDraft::default(),
            deck: None,
        }
    }

    /// Attach the microphone used by speaking parts.
    pub fn with_capture(mut self, capture: Box<dyn AudioCapture>) -> Self {
        self.deck = Some(RecordingDeck::new(capture));
        self
    }

    /// Pick up the autosaved writing draft for this test, if any.
    pub fn restore_draft(&mut self, store: &dyn ProgressStore) {
        if self.skill() != Skill::Writing {
            return;
        }
        if let Some(draft) = store.load_draft(self.test.test_id()) {
            tracing::debug!(test_id = self.test.test_id(), "restored writing draft");
            self.draft = draft;
        }
    }

    pub fn test(&self) -> &TestDefinition {
        &self.test
    }

    pub fn skill(&self) -> Skill {
        self.test.skill()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn session(&self) -> &TestSession {
        &self.session
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn score(&self) -> Option<&ScoreResult> {
        self.score.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn show_answers(&self) -> bool {
        self.show_answers
    }

    pub fn draft(&self) -> &WritingDraft {
        &self.draft
    }

    pub fn deck(&self) -> Option<&RecordingDeck<Box<dyn AudioCapture>>> {
        self.deck.as_ref()
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    pub fn begin_at(&mut self, now: Instant) {
        self.session.begin_at(now);
    }

    /// Advance the countdown; returns the seconds applied.
    pub fn poll(&mut self, now: Instant) -> u32 {
        self.session.poll(now)
    }

    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) {
        if !self.submitted {
            self.answers.set(question_id, value);
        }
    }

    pub fn clear_answer(&mut self, question_id: &str) {
        if !self.submitted {
            self.answers.clear(question_id);
        }
    }

    pub fn toggle_selection(&mut self, question_id: &str, option: usize) {
        if !self.submitted {
            self.answers.toggle_selection(question_id, option);
        }
    }

    pub fn set_pair(&mut self, question_id: &str, pair: usize, option: usize) {
        if !self.submitted {
            self.answers.set_pair(question_id, pair, option);
        }
    }

    pub fn push_char(&mut self, question_id: &str, ch: char) {
        if !self.submitted {
            self.answers.push_char(question_id, ch);
        }
    }

    pub fn pop_char(&mut self, question_id: &str) {
        if !self.submitted {
            self.answers.pop_char(question_id);
        }
    }

    pub fn toggle_show_answers(&mut self) {
        self.show_answers = !self.show_answers;
    }

    /// Whether the learner got `question_id` right. Only known after submit.
    pub fn review(&self, question_id: &str) -> Option<bool> {
        if !self.submitted {
            return None;
        }
        let q = self.questions.iter().find(|q| q.id == question_id)?;
        q.kind.is_correct(self.answers.get(question_id))
    }

    pub fn set_draft_text(&mut self, text: &str, store: &dyn ProgressStore) {
        if self.submitted {
            return;
        }
        self.draft.text = text.to_string();
        self.autosave(store);
    }

    pub fn push_draft_char(&mut self, ch: char, store: &dyn ProgressStore) {
        if self.submitted {
            return;
        }
        self.draft.text.push(ch);
        self.autosave(store);
    }

    pub fn pop_draft_char(&mut self, store: &dyn ProgressStore) {
        if !self.submitted && self.draft.text.pop().is_some() {
            self.autosave(store);
        }
    }

    pub fn attach_image(&mut self, path: &Path, store: &dyn ProgressStore) -> anyhow::Result<()> {
        if self.submitted {
            anyhow::bail!("the essay is locked once the attempt is submitted");
        }
        let name = self.draft.attach_image(path)?.file_name.clone();
        tracing::info!(file = %name, "attached handwritten answer");
        self.autosave(store);
        Ok(())
    }

    fn autosave(&self, store: &dyn ProgressStore) {
        if self.submitted {
            return;
        }
        if let Err(e) = store.save_draft(self.test.test_id(), &self.draft) {
            tracing::warn!(error = %e, "failed to autosave writing draft");
        }
    }

    /// Starting any part's recording also starts the test clock.
    pub fn start_recording(&mut self, part: SpeakingPart) -> Result<(), CaptureError> {
        if self.submitted {
            return Err(CaptureError::Submitted);
        }
        let Some(deck) = self.deck.as_mut() else {
            return Err(CaptureError::Unavailable("no microphone configured".to_string()));
        };
        deck.start_recording(part)?;
        self.session.begin();
        Ok(())
    }

    pub fn stop_recording(&mut self, part: SpeakingPart) -> Result<(), CaptureError> {
        if self.submitted {
            return Err(CaptureError::Submitted);
        }
        let Some(deck) = self.deck.as_mut() else {
            return Err(CaptureError::NotRecording(part));
        };
        let clip = deck.stop_recording(part)?;
        self.answers.set(part.key(), AnswerValue::Audio(clip));
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self.skill() {
            Skill::Listening | Skill::Reading => validate_answers(
                &self.questions,
                &self.answers,
                ValidationPolicy::for_skill(self.skill()),
            ),
            Skill::Writing => {
                if self.draft.is_empty() {
                    Err(ValidationError::EmptyWriting)
                } else {
                    Ok(())
                }
            }
            Skill::Speaking => {
                let parts: Vec<SpeakingPart> = SpeakingPart::ALL
                    .into_iter()
                    .filter(|p| !matches!(self.answers.get(p.key()), Some(AnswerValue::Audio(_))))
                    .collect();
                if parts.is_empty() {
                    Ok(())
                } else {
                    Err(ValidationError::MissingRecordings { parts })
                }
            }
        }
    }

    pub fn submit(&mut self, store: &dyn ProgressStore) -> Result<Submission, ValidationError> {
        if self.submitted {
            return Err(ValidationError::AlreadySubmitted);
        }
        if let Err(e) = self.validate() {
            tracing::info!(test_id = self.test.test_id(), reason = %e, "submission refused");
            return Err(e);
        }

        let skill = self.skill();
        let test_id = self.test.test_id().to_string();
        let auto_scored = self.questions.iter().any(|q| q.kind.has_canonical());
        self.score = auto_scored.then(|| score(&self.questions, &self.answers));
        self.submitted = true;
        // A re-take still recording at submit time is dropped; the earlier clip was submitted.
        if let Some(deck) = self.deck.as_mut()
            && deck.active_part().is_some()
        {
            deck.discard_all();
        }

        let payload = SubmissionPayload {
            test_id: test_id.clone(),
            skill,
            answers: self.answers.clone(),
            writing: (skill == Skill::Writing).then(|| self.draft.clone()),
            submitted_at: Utc::now(),
        };

        match &self.score {
            Some(s) => tracing::info!(
                test_id = %test_id,
                correct = s.correct_count,
                total = s.total_questions,
                band = %s.band,
                "attempt submitted"
            ),
            None => tracing::info!(test_id = %test_id, skill = %skill, "attempt submitted"),
        }

        if let Err(e) = store.mark_completed(skill) {
            tracing::warn!(error = %e, "failed to record completed skill");
        }
        let record = AttemptRecord {
            skill,
            test_id: test_id.clone(),
            submitted_at: payload.submitted_at,
            score: self.score.clone(),
            time_used_secs: self.session.duration_secs() - self.session.time_left_secs(),
        };
        if let Err(e) = store.append_attempt(record) {
            tracing::warn!(error = %e, "failed to append attempt history");
        }
        if skill == Skill::Writing
            && let Err(e) = store.clear_draft(&test_id)
        {
            tracing::warn!(error = %e, "failed to clear writing draft");
        }

        Ok(Submission {
            payload,
            score: self.score.clone(),
        })
    }

    /// Throw the attempt away and start over at full time.
    pub fn redo(&mut self, store: &dyn ProgressStore) {
        self.discard(store);
        self.session.reset();
        tracing::info!(test_id = self.test.test_id(), "attempt reset");
    }

    pub fn request_exit(&mut self) {
        self.session.request_exit();
    }

    pub fn cancel_exit(&mut self) {
        self.session.cancel_exit();
    }

    pub fn confirm_exit(&mut self, store: &dyn ProgressStore) -> Navigation {
        let mut state = Discardable {
            answers: &mut self.answers,
            score: &mut self.score,
            submitted: &mut self.submitted,
            show_answers: &mut self.show_answers,
            draft: &mut self.draft,
            deck: &mut self.deck,
        };
        let test_id = self.test.test_id();
        self.session
            .confirm_exit_with(|| state.discard(test_id, store))
    }

    fn discard(&mut self, store: &dyn ProgressStore) {
        let mut state = Discardable {
            answers: &mut self.answers,
            score: &mut self.score,
            submitted: &mut self.submitted,
            show_answers: &mut self.show_answers,
            draft: &mut self.draft,
            deck: &mut self.deck,
        };
        state.discard(self.test.test_id(), store);
    }
}

/// Everything an attempt throws away on redo or exit, borrowed apart from
/// the session so the two can be reset together.
struct Discardable<'a> {
    answers: &'a mut AnswerStore,
    score: &'a mut Option<ScoreResult>,
    submitted: &'a mut bool,
    show_answers: &'a mut bool,
    draft: &'a mut WritingDraft,
    deck: &'a mut Option<RecordingDeck<Box<dyn AudioCapture>>>,
}

impl Discardable<'_> {
    fn discard(&mut self, test_id: &str, store: &dyn ProgressStore) {
        self.answers.clear_all();
        *self.score = None;
        *self.submitted = false;
        *self.show_answers = false;
        if let Some(deck) = self.deck.as_mut() {
            deck.discard_all();
        }
        *self.draft = WritingDraft::default();
        if let Err(e) = store.clear_draft(test_id) {
            tracing::warn!(error = %e, "failed to clear writing draft");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use super::*;
    use crate::engine::question::Verdict;
    use crate::session::recording::fake::FakeCapture;
    use crate::store::MemoryStore;

    fn listening() -> TestDefinition {
        let json = r#"{
            "testId": "listening-t",
            "sections": [{
                "sectionNumber": 1,
                "audioUrl": "/audio/s1.mp3",
                "questions": [
                    {"id": "1", "type": "form-completion", "question": "Surname", "correctAnswer": "Smith"},
                    {"id": "2", "type": "multiple-choice", "question": "Day?", "options": ["Mon", "Tue", "Wed"], "correctAnswer": "B"},
                    {"id": "3", "type": "multiple-choice", "question": "Two facilities", "options": ["Pool", "Gym", "Spa", "Bar"], "multipleSelect": true, "correctAnswer": "A, C"}
                ]
            }]
        }"#;
        TestDefinition::Listening(serde_json::from_str(json).unwrap())
    }

    fn reading() -> TestDefinition {
        let json = r#"{
            "testId": "reading-t",
            "passages": [{
                "id": "p1",
                "title": "Bees",
                "textFile": "/texts/bees.txt",
                "questions": [
                    {"id": "r1", "type": "multiple-choice", "question": "Main idea?", "options": ["A", "B"], "correctOptionIndex": 1},
                    {"id": "r2", "type": "true-false-notgiven", "statement": "Bees sleep.", "correctAnswer": "T"},
                    {"id": "r3", "type": "matching-headings", "headings": ["i", "ii"], "correctOptionIndex": 0}
                ]
            }]
        }"#;
        TestDefinition::Reading(serde_json::from_str(json).unwrap())
    }

    fn writing() -> TestDefinition {
        let json = r#"{
            "testId": "writing-t",
            "task1": {"prompt": "Describe the graph"},
            "task2": {"prompt": "Discuss both views"}
        }"#;
        TestDefinition::Writing(serde_json::from_str(json).unwrap())
    }

    fn speaking() -> TestDefinition {
        let json = r#"{
            "testId": "speaking-t",
            "part1": {"topic": "Home", "questions": ["Where do you live?"]},
            "part2": {"cueCard": {"topic": "A journey", "points": ["where"]}},
            "part3": {"discussion": ["Why travel?"]}
        }"#;
        TestDefinition::Speaking(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn listening_submit_scores_partial_answers() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(listening(), 30);
        attempt.set_answer("1", AnswerValue::Text("  smith ".to_string()));
        attempt.set_answer("3", AnswerValue::Selection(BTreeSet::from([2, 0])));

        let submission = attempt.submit(&store).unwrap();
        let score = submission.score.unwrap();
        assert_eq!(score.correct_count, 2);
        assert_eq!(score.total_questions, 3);
        assert_eq!(score.wrong_question_ids, vec!["2"]);
        assert!(store.load_completed().contains(&Skill::Listening));
        assert_eq!(store.load_history().len(), 1);
    }

    #[test]
    fn reading_blocks_on_first_missing_answer() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(reading(), 60);
        attempt.set_answer("r1", AnswerValue::Choice(1));
        attempt.set_answer("r3", AnswerValue::Heading(0));

        let err = attempt.submit(&store).unwrap_err();
        assert_eq!(err.question_id(), Some("r2"));
        assert_eq!(err.to_string(), "Please mark True / False / Not Given for r2.");
        assert!(!attempt.is_submitted());
        assert!(store.load_completed().is_empty());

        attempt.set_answer("r2", AnswerValue::Verdict(Verdict::NotGiven));
        let score = attempt.submit(&store).unwrap().score.unwrap();
        assert_eq!(score.correct_count, 2);
        assert_eq!(attempt.review("r2"), Some(false));
        assert_eq!(attempt.review("r1"), Some(true));
    }

    #[test]
    fn reading_rejects_out_of_range_choice() {
        let mut attempt = Attempt::new(reading(), 60);
        attempt.set_answer("r1", AnswerValue::Choice(5));
        attempt.set_answer("r2", AnswerValue::Verdict(Verdict::True));
        attempt.set_answer("r3", AnswerValue::Heading(0));
        let err = attempt.submit(&MemoryStore::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedAnswer {
                question_id: "r1".to_string()
            }
        );
    }

    #[test]
    fn second_submit_is_refused() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(listening(), 30);
        attempt.submit(&store).unwrap();
        assert_eq!(
            attempt.submit(&store).unwrap_err(),
            ValidationError::AlreadySubmitted
        );
        assert_eq!(store.load_history().len(), 1);
    }

    #[test]
    fn answers_are_frozen_after_submit() {
        let mut attempt = Attempt::new(listening(), 30);
        attempt.submit(&MemoryStore::new()).unwrap();
        attempt.set_answer("1", AnswerValue::Text("Smith".to_string()));
        assert!(attempt.answers().is_empty());
    }

    #[test]
    fn essay_is_frozen_after_submit() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(writing(), 60);
        attempt.set_draft_text("Final answer", &store);
        attempt.submit(&store).unwrap();

        attempt.set_draft_text("rewritten", &store);
        attempt.push_draft_char('!', &store);
        attempt.pop_draft_char(&store);
        assert_eq!(attempt.draft().text, "Final answer");
        assert!(attempt.attach_image(Path::new("scan.png"), &store).is_err());
        assert!(attempt.draft().images.is_empty());
        assert_eq!(store.load_draft("writing-t"), None);
    }

    #[test]
    fn recordings_are_frozen_after_submit() {
        let capture = FakeCapture::default();
        let mut attempt = Attempt::new(speaking(), 14).with_capture(Box::new(capture.clone()));
        for part in SpeakingPart::ALL {
            attempt.start_recording(part).unwrap();
            attempt.stop_recording(part).unwrap();
        }
        let submission = attempt.submit(&MemoryStore::new()).unwrap();

        assert!(matches!(
            attempt.start_recording(SpeakingPart::Part1),
            Err(CaptureError::Submitted)
        ));
        assert!(matches!(
            attempt.stop_recording(SpeakingPart::Part1),
            Err(CaptureError::Submitted)
        ));
        assert_eq!(capture.open.get(), 0);
        assert_eq!(attempt.answers().get("part1"), submission.payload.answers.get("part1"));
    }

    #[test]
    fn review_is_hidden_before_submit() {
        let mut attempt = Attempt::new(listening(), 30);
        attempt.set_answer("2", AnswerValue::Choice(1));
        assert_eq!(attempt.review("2"), None);
    }

    #[test]
    fn redo_resets_everything() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(listening(), 30);
        let t0 = Instant::now();
        attempt.begin_at(t0);
        attempt.poll(t0 + Duration::from_secs(90));
        attempt.set_answer("2", AnswerValue::Choice(1));
        attempt.toggle_show_answers();
        attempt.submit(&store).unwrap();

        attempt.redo(&store);
        assert!(!attempt.is_submitted());
        assert!(attempt.score().is_none());
        assert!(attempt.answers().is_empty());
        assert!(!attempt.show_answers());
        assert!(!attempt.session().started());
        assert_eq!(attempt.session().time_left_secs(), 30 * 60);
    }

    #[test]
    fn writing_requires_text_or_image_and_autosaves() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(writing(), 60);
        assert_eq!(
            attempt.submit(&store).unwrap_err(),
            ValidationError::EmptyWriting
        );

        attempt.set_draft_text("The graph", &store);
        attempt.push_draft_char('s', &store);
        assert_eq!(store.load_draft("writing-t").unwrap().text, "The graphs");

        let mut reopened = Attempt::new(writing(), 60);
        reopened.restore_draft(&store);
        assert_eq!(reopened.draft().text, "The graphs");

        let submission = reopened.submit(&store).unwrap();
        assert!(submission.score.is_none());
        assert_eq!(submission.payload.writing.unwrap().text, "The graphs");
        assert_eq!(store.load_draft("writing-t"), None);
    }

    #[test]
    fn exit_confirm_clears_draft_and_returns_to_catalog() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(writing(), 60);
        attempt.begin();
        attempt.set_draft_text("half an essay", &store);
        attempt.request_exit();
        assert!(attempt.session().show_exit_confirm());
        attempt.cancel_exit();
        assert!(!attempt.session().show_exit_confirm());

        attempt.request_exit();
        assert_eq!(attempt.confirm_exit(&store), Navigation::Catalog);
        assert!(attempt.draft().is_empty());
        assert_eq!(store.load_draft("writing-t"), None);
        assert!(!attempt.session().started());
    }

    #[test]
    fn speaking_requires_every_part() {
        let store = MemoryStore::new();
        let mut attempt = Attempt::new(speaking(), 14).with_capture(Box::new(FakeCapture::default()));

        attempt.start_recording(SpeakingPart::Part1).unwrap();
        assert!(attempt.session().started());
        attempt.stop_recording(SpeakingPart::Part1).unwrap();

        let err = attempt.submit(&store).unwrap_err();
        assert_eq!(err.to_string(), "Please record: Part 2 audio, Part 3 audio");

        for part in [SpeakingPart::Part2, SpeakingPart::Part3] {
            attempt.start_recording(part).unwrap();
            attempt.stop_recording(part).unwrap();
        }
        let submission = attempt.submit(&store).unwrap();
        assert!(submission.score.is_none());
        assert!(matches!(
            submission.payload.answers.get("part2"),
            Some(AnswerValue::Audio(_))
        ));
    }

    #[test]
    fn exit_aborts_active_recording() {
        let capture = FakeCapture::default();
        let mut attempt = Attempt::new(speaking(), 14).with_capture(Box::new(capture.clone()));
        attempt.start_recording(SpeakingPart::Part2).unwrap();
        attempt.request_exit();
        attempt.confirm_exit(&MemoryStore::new());
        assert_eq!(capture.open.get(), 0);
    }

    #[test]
    fn submit_releases_a_retake_in_progress() {
        let capture = FakeCapture::default();
        let mut attempt = Attempt::new(speaking(), 14).with_capture(Box::new(capture.clone()));
        for part in SpeakingPart::ALL {
            attempt.start_recording(part).unwrap();
            attempt.stop_recording(part).unwrap();
        }
        attempt.start_recording(SpeakingPart::Part1).unwrap();
        let submission = attempt.submit(&MemoryStore::new()).unwrap();
        assert_eq!(capture.open.get(), 0);
        assert!(matches!(
            submission.payload.answers.get("part1"),
            Some(AnswerValue::Audio(_))
        ));
    }

    #[test]
    fn recording_without_microphone_is_unavailable() {
        let mut attempt = Attempt::new(speaking(), 14);
        let err = attempt.start_recording(SpeakingPart::Part1).unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable(_)));
        assert!(!attempt.session().started());
    }

    #[test]
    fn payload_serializes_camel_case() {
        let mut attempt = Attempt::new(listening(), 30);
        attempt.set_answer("2", AnswerValue::Choice(1));
        let json = attempt.submit(&MemoryStore::new()).unwrap().payload.to_json().unwrap();
        assert!(json.contains("\"testId\": \"listening-t\""));
        assert!(json.contains("\"skill\": \"listening\""));
        assert!(json.contains("\"submittedAt\""));
        assert!(!json.contains("writing"));
    }
}
