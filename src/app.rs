use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use crate::bank::schema::TestDefinition;
use crate::bank::{QuestionBank, QuestionSource, Skill};
use crate::config::Config;
use crate::engine::question::{Question, QuestionKind, Verdict, letter_index};
use crate::session::answers::AnswerValue;
use crate::session::attempt::{Attempt, Submission};
use crate::session::capture::FfmpegCapture;
use crate::session::recording::{AudioCapture, SpeakingPart};
use crate::session::test_session::Navigation;
use crate::store::ProgressStore;
use crate::route::Route;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Catalog,
    TestList,
    Test,
    Result,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// A reading passage as shown next to its questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassageView {
    pub title: String,
    pub text: String,
}

/// Builds the microphone backend for a speaking attempt.
pub type CaptureFactory = Box<dyn Fn(&Config) -> Box<dyn AudioCapture>>;

fn ffmpeg_capture(config: &Config) -> Box<dyn AudioCapture> {
    Box::new(
        FfmpegCapture::new(PathBuf::from(&config.recordings_dir))
            .with_device(config.mic_device.clone())
            .with_input(config.mic_ffmpeg_format.clone(), config.mic_ffmpeg_source.clone()),
    )
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub completed: BTreeSet<Skill>,
    pub list_skill: Skill,
    pub attempt: Option<Attempt>,
    pub passages: Vec<PassageView>,
    pub passage_scroll: u16,
    pub selected: usize,
    pub pair_cursor: usize,
    pub speaking_part: SpeakingPart,
    pub image_prompt: Option<String>,
    pub submission: Option<Submission>,
    pub status: Option<StatusMessage>,
    pub time_up_announced: bool,
    pub should_quit: bool,
    bank: QuestionBank<Box<dyn QuestionSource>>,
    store: Box<dyn ProgressStore>,
    capture_factory: CaptureFactory,
}

impl App {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        bank: QuestionBank<Box<dyn QuestionSource>>,
        store: Box<dyn ProgressStore>,
    ) -> Self {
        let completed = store.load_completed();
        let menu = Menu::catalog(theme, &completed);
        Self {
            screen: AppScreen::Catalog,
            config,
            theme,
            menu,
            completed,
            list_skill: Skill::Listening,
            attempt: None,
            passages: Vec::new(),
            passage_scroll: 0,
            selected: 0,
            pair_cursor: 0,
            speaking_part: SpeakingPart::Part1,
            image_prompt: None,
            submission: None,
            status: None,
            time_up_announced: false,
            should_quit: false,
            bank,
            store,
            capture_factory: Box::new(ffmpeg_capture),
        }
    }

    pub fn with_capture_factory(mut self, factory: CaptureFactory) -> Self {
        self.capture_factory = factory;
        self
    }

    pub fn bank_description(&self) -> String {
        self.bank.source().describe()
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Info,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(message = %text, "shown to learner");
        self.status = Some(StatusMessage {
            text,
            kind: StatusKind::Error,
        });
    }

    pub fn open_route(&mut self, route: Route) {
        match route {
            Route::Catalog => self.go_to_catalog(),
            Route::TestList(skill) => self.open_skill(skill),
            Route::Test { skill, test_id } => self.start_test(skill, &test_id),
        }
    }

    pub fn go_to_catalog(&mut self) {
        self.completed = self.store.load_completed();
        self.menu = Menu::catalog(self.theme, &self.completed);
        self.attempt = None;
        self.submission = None;
        self.passages.clear();
        self.image_prompt = None;
        self.screen = AppScreen::Catalog;
    }

    pub fn open_skill(&mut self, skill: Skill) {
        self.list_skill = skill;
        let ids = match self.bank.list_available(skill) {
            Ok(ids) => ids,
            Err(e) => {
                self.error(e.to_string());
                Vec::new()
            }
        };
        self.menu = Menu::test_list(self.theme, skill, &ids);
        self.screen = AppScreen::TestList;
    }

    /// Enter on the catalog or a test list.
    pub fn open_selected(&mut self) {
        match self.screen {
            AppScreen::Catalog => {
                if let Some(skill) = Skill::ALL.get(self.menu.selected).copied() {
                    self.open_skill(skill);
                }
            }
            AppScreen::TestList => {
                if let Some(item) = self.menu.items.get(self.menu.selected) {
                    let id = item.label.clone();
                    self.start_test(self.list_skill, &id);
                }
            }
            _ => {}
        }
    }

    pub fn start_test(&mut self, skill: Skill, test_id: &str) {
        let def = match self.bank.load(skill, test_id) {
            Ok(def) => def,
            Err(e) => {
                self.error(e.to_string());
                if self.screen != AppScreen::TestList {
                    self.open_skill(skill);
                }
                return;
            }
        };

        self.passages = match &def {
            TestDefinition::Reading(t) => t
                .passages
                .iter()
                .map(|p| PassageView {
                    title: p.title.clone(),
                    text: self
                        .bank
                        .load_passage_text(p)
                        .unwrap_or_else(|e| format!("Could not load passage: {e}")),
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut attempt = Attempt::new(def, self.config.duration_minutes(skill));
        match skill {
            Skill::Writing => attempt.restore_draft(self.store.as_ref()),
            Skill::Speaking => attempt = attempt.with_capture((self.capture_factory)(&self.config)),
            _ => {}
        }
        self.attempt = Some(attempt);
        self.list_skill = skill;
        self.reset_cursors();
        self.submission = None;
        self.status = None;
        self.screen = AppScreen::Test;
    }

    fn reset_cursors(&mut self) {
        self.selected = 0;
        self.pair_cursor = 0;
        self.passage_scroll = 0;
        self.speaking_part = SpeakingPart::Part1;
        self.image_prompt = None;
        self.time_up_announced = false;
    }

    pub fn tick(&mut self, now: Instant) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        attempt.poll(now);
        if attempt.session().is_expired() && !attempt.is_submitted() && !self.time_up_announced {
            self.time_up_announced = true;
            self.info("Time is up. Submit when you are ready.");
        }
    }

    pub fn is_started(&self) -> bool {
        self.attempt.as_ref().is_some_and(|a| a.session().started())
    }

    pub fn is_submitted(&self) -> bool {
        self.attempt.as_ref().is_some_and(|a| a.is_submitted())
    }

    pub fn begin(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.begin();
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.attempt.as_ref()?.questions().get(self.selected)
    }

    pub fn next_question(&mut self) {
        let count = self.attempt.as_ref().map_or(0, |a| a.questions().len());
        if self.selected + 1 < count {
            self.selected += 1;
            self.pair_cursor = 0;
        }
    }

    pub fn prev_question(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.pair_cursor = 0;
        }
    }

    pub fn next_pair(&mut self) {
        if let Some(QuestionKind::Matching { pairs, .. }) = self.current_question().map(|q| &q.kind)
            && self.pair_cursor + 1 < pairs.len()
        {
            self.pair_cursor += 1;
        }
    }

    pub fn prev_pair(&mut self) {
        self.pair_cursor = self.pair_cursor.saturating_sub(1);
    }

    /// Printable key while a listening or reading question is selected.
    pub fn answer_key(&mut self, ch: char) {
        let Some(q) = self.current_question() else {
            return;
        };
        let id = q.id.clone();
        let kind = q.kind.clone();
        let pair = self.pair_cursor;
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.is_submitted() {
            return;
        }
        let letter = letter_index(&ch.to_string());
        match kind {
            QuestionKind::SingleChoice { options, .. } => {
                if let Some(i) = letter.filter(|i| *i < options.len()) {
                    attempt.set_answer(&id, AnswerValue::Choice(i));
                }
            }
            QuestionKind::MultiSelect { options, .. } => {
                if let Some(i) = letter.filter(|i| *i < options.len()) {
                    attempt.toggle_selection(&id, i);
                }
            }
            QuestionKind::MatchingHeadings { headings, .. } => {
                if let Some(i) = letter.filter(|i| *i < headings.len()) {
                    attempt.set_answer(&id, AnswerValue::Heading(i));
                }
            }
            QuestionKind::TrueFalseNotGiven { .. } => {
                let verdict = match ch.to_ascii_lowercase() {
                    't' => Some(Verdict::True),
                    'f' => Some(Verdict::False),
                    'n' => Some(Verdict::NotGiven),
                    _ => None,
                };
                if let Some(v) = verdict {
                    attempt.set_answer(&id, AnswerValue::Verdict(v));
                }
            }
            QuestionKind::FormCompletion { .. } => attempt.push_char(&id, ch),
            QuestionKind::Matching { pairs, .. } => {
                let options = pairs.get(pair).map_or(0, |p| p.right_options.len());
                if let Some(i) = letter.filter(|i| *i < options) {
                    attempt.set_pair(&id, pair, i);
                    self.next_pair();
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(path) = self.image_prompt.as_mut() {
            path.pop();
            return;
        }
        let id = self.current_question().map(|q| q.id.clone());
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        match attempt.skill() {
            Skill::Writing => attempt.pop_draft_char(self.store.as_ref()),
            Skill::Listening | Skill::Reading => {
                if let Some(id) = id {
                    attempt.pop_char(&id);
                }
            }
            Skill::Speaking => {}
        }
    }

    /// Remove the answer to the selected question.
    pub fn clear_answer(&mut self) {
        let id = self.current_question().map(|q| q.id.clone());
        if let (Some(attempt), Some(id)) = (self.attempt.as_mut(), id) {
            attempt.clear_answer(&id);
        }
    }

    pub fn writing_key(&mut self, ch: char) {
        if let Some(path) = self.image_prompt.as_mut() {
            path.push(ch);
            return;
        }
        if let Some(attempt) = self.attempt.as_mut()
            && !attempt.is_submitted()
        {
            attempt.push_draft_char(ch, self.store.as_ref());
        }
    }

    /// Bracketed paste: goes to whatever text field currently has focus.
    pub fn paste(&mut self, text: &str) {
        if let Some(path) = self.image_prompt.as_mut() {
            path.push_str(text.trim_end_matches(['\r', '\n']));
            return;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.is_submitted() {
            return;
        }
        match attempt.skill() {
            Skill::Writing => {
                let text = text.replace("\r\n", "\n");
                let joined = format!("{}{text}", attempt.draft().text);
                attempt.set_draft_text(&joined, self.store.as_ref());
            }
            Skill::Listening | Skill::Reading => {
                if matches!(
                    self.current_question().map(|q| &q.kind),
                    Some(QuestionKind::FormCompletion { .. })
                ) {
                    for ch in text.chars().filter(|c| !c.is_control()) {
                        self.answer_key(ch);
                    }
                }
            }
            Skill::Speaking => {}
        }
    }

    pub fn time_used_secs(&self) -> u32 {
        self.attempt.as_ref().map_or(0, |a| {
            a.session()
                .duration_secs()
                .saturating_sub(a.session().time_left_secs())
        })
    }

    pub fn open_image_prompt(&mut self) {
        if !self.is_submitted() {
            self.image_prompt = Some(String::new());
        }
    }

    pub fn cancel_image_prompt(&mut self) {
        self.image_prompt = None;
    }

    pub fn confirm_image_prompt(&mut self) {
        let Some(path) = self.image_prompt.take() else {
            return;
        };
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        match attempt.attach_image(&PathBuf::from(path), self.store.as_ref()) {
            Ok(()) => self.info(format!("Attached {path}")),
            Err(e) => self.error(format!("{e:#}")),
        }
    }

    pub fn next_part(&mut self) {
        self.speaking_part = match self.speaking_part {
            SpeakingPart::Part1 => SpeakingPart::Part2,
            _ => SpeakingPart::Part3,
        };
    }

    pub fn prev_part(&mut self) {
        self.speaking_part = match self.speaking_part {
            SpeakingPart::Part3 => SpeakingPart::Part2,
            _ => SpeakingPart::Part1,
        };
    }

    /// Start recording the selected part, or stop it if it is the one recording.
    pub fn toggle_recording(&mut self) {
        let part = self.speaking_part;
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.is_submitted() {
            return;
        }
        let recording = attempt.deck().and_then(|d| d.active_part()) == Some(part);
        let result = if recording {
            attempt.stop_recording(part).map(|()| format!("{part} saved"))
        } else {
            attempt.start_recording(part).map(|()| format!("Recording {part}..."))
        };
        match result {
            Ok(msg) => self.info(msg),
            Err(e) => self.error(e.to_string()),
        }
    }

    pub fn submit(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        match attempt.submit(self.store.as_ref()) {
            Ok(submission) => {
                self.completed.insert(submission.payload.skill);
                self.submission = Some(submission);
                self.image_prompt = None;
                self.status = None;
                self.screen = AppScreen::Result;
            }
            Err(e) => {
                if let Some(id) = e.question_id()
                    && let Some(i) = attempt.questions().iter().position(|q| q.id == id)
                {
                    self.selected = i;
                    self.pair_cursor = 0;
                }
                self.error(e.to_string());
            }
        }
    }

    pub fn review(&mut self) {
        if self.is_submitted() {
            self.screen = AppScreen::Test;
        }
    }

    pub fn show_result(&mut self) {
        if self.submission.is_some() {
            self.screen = AppScreen::Result;
        }
    }

    pub fn toggle_show_answers(&mut self) {
        if let Some(attempt) = self.attempt.as_mut()
            && attempt.is_submitted()
        {
            attempt.toggle_show_answers();
        }
    }

    pub fn redo(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        attempt.redo(self.store.as_ref());
        self.submission = None;
        self.reset_cursors();
        self.info("Attempt reset.");
        self.screen = AppScreen::Test;
    }

    pub fn request_exit(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.request_exit();
        }
    }

    pub fn cancel_exit(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.cancel_exit();
        }
    }

    pub fn exit_confirm_shown(&self) -> bool {
        self.attempt
            .as_ref()
            .is_some_and(|a| a.session().show_exit_confirm())
    }

    pub fn confirm_exit(&mut self) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        match attempt.confirm_exit(self.store.as_ref()) {
            Navigation::Catalog => self.go_to_catalog(),
        }
    }

    pub fn scroll_passage(&mut self, delta: i32) {
        let next = i32::from(self.passage_scroll) + delta;
        self.passage_scroll = next.clamp(0, i32::from(u16::MAX)) as u16;
    }
}
