use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::schema::SpeakingTest;
use crate::session::answers::AnswerValue;
use crate::session::attempt::Attempt;
use crate::session::recording::{RecordingSlot, SpeakingPart};
use crate::ui::theme::Theme;

/// One box per interview part: prompts plus the state of its recording.
pub struct SpeakingPanel<'a> {
    pub test: &'a SpeakingTest,
    pub attempt: &'a Attempt,
    pub selected: SpeakingPart,
    pub theme: &'a Theme,
}

impl<'a> SpeakingPanel<'a> {
    pub fn new(
        test: &'a SpeakingTest,
        attempt: &'a Attempt,
        selected: SpeakingPart,
        theme: &'a Theme,
    ) -> Self {
        Self {
            test,
            attempt,
            selected,
            theme,
        }
    }

    fn prompts(&self, part: SpeakingPart) -> Vec<String> {
        match part {
            SpeakingPart::Part1 => {
                let mut lines = vec![format!("Topic: {}", self.test.part1.topic)];
                lines.extend(self.test.part1.questions.iter().map(|q| format!("\u{2022} {q}")));
                lines
            }
            SpeakingPart::Part2 => {
                let card = &self.test.part2.cue_card;
                let mut lines = vec![format!("Describe {}", card.topic), "You should say:".to_string()];
                lines.extend(card.points.iter().map(|p| format!("\u{2022} {p}")));
                lines
            }
            SpeakingPart::Part3 => self
                .test
                .part3
                .discussion
                .iter()
                .map(|q| format!("\u{2022} {q}"))
                .collect(),
        }
    }

    fn status(&self, part: SpeakingPart) -> (String, ratatui::style::Color) {
        let colors = &self.theme.colors;
        let slot = match self.attempt.deck() {
            Some(deck) => deck.slot(part),
            None => RecordingSlot::Empty,
        };
        match slot {
            RecordingSlot::Recording => {
                let secs = self
                    .attempt
                    .deck()
                    .and_then(|d| d.active_elapsed_secs())
                    .unwrap_or(0);
                (
                    format!("\u{25cf} recording {:02}:{:02}", secs / 60, secs % 60),
                    colors.recording(),
                )
            }
            RecordingSlot::Finished(clip) => (
                format!("\u{2713} recorded ({} KiB) {}", clip.bytes / 1024, clip.url),
                colors.success(),
            ),
            RecordingSlot::Empty => {
                // The answer survives in the store even without a deck, e.g. after submit.
                match self.attempt.answers().get(part.key()) {
                    Some(AnswerValue::Audio(clip)) => {
                        (format!("\u{2713} recorded {}", clip.url), colors.success())
                    }
                    _ => ("not recorded".to_string(), colors.text_muted()),
                }
            }
        }
    }
}

impl Widget for SpeakingPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for (i, part) in SpeakingPart::ALL.into_iter().enumerate() {
            let is_selected = part == self.selected;
            let (status, status_color) = self.status(part);

            let block = Block::bordered()
                .title(Line::from(vec![
                    Span::styled(
                        format!(" {} ", part.label()),
                        Style::default().add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                    ),
                    Span::styled(format!("{status} "), Style::default().fg(status_color)),
                ]))
                .border_style(Style::default().fg(if is_selected {
                    colors.border_focused()
                } else {
                    colors.border()
                }));

            let lines: Vec<Line> = self
                .prompts(part)
                .into_iter()
                .map(|p| Line::from(Span::styled(p, Style::default().fg(colors.fg()))))
                .collect();
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(block)
                .render(layout[i], buf);
        }
    }
}
