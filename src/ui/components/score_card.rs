use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::Skill;
use crate::engine::band::Band;
use crate::session::attempt::Submission;
use crate::session::test_session::format_clock;
use crate::ui::theme::Theme;

/// Post-submit summary: band, raw score and wrong questions for auto-scored
/// skills, a confirmation for the rest.
pub struct ScoreCard<'a> {
    pub submission: &'a Submission,
    pub time_used_secs: u32,
    pub theme: &'a Theme,
}

impl<'a> ScoreCard<'a> {
    pub fn new(submission: &'a Submission, time_used_secs: u32, theme: &'a Theme) -> Self {
        Self {
            submission,
            time_used_secs,
            theme,
        }
    }
}

fn band_color(band: Band, theme: &Theme) -> ratatui::style::Color {
    let colors = &theme.colors;
    if band.as_f32() >= 7.0 {
        colors.success()
    } else if band.as_f32() >= 5.5 {
        colors.warning()
    } else {
        colors.error()
    }
}

impl Widget for ScoreCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let skill = self.submission.payload.skill;

        let block = Block::bordered()
            .title(format!(" {} Submitted ", skill.label()))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            &*self.submission.payload.test_id,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let time_line = Line::from(vec![
            Span::styled("  Time used: ", Style::default().fg(colors.fg())),
            Span::styled(format_clock(self.time_used_secs), Style::default().fg(colors.fg())),
        ]);
        Paragraph::new(time_line).render(layout[3], buf);

        match &self.submission.score {
            Some(score) => {
                let band_line = Line::from(vec![
                    Span::styled("  Band:      ", Style::default().fg(colors.fg())),
                    Span::styled(
                        score.band.to_string(),
                        Style::default()
                            .fg(band_color(score.band, self.theme))
                            .add_modifier(Modifier::BOLD),
                    ),
                ]);
                Paragraph::new(band_line).render(layout[1], buf);

                let raw_line = Line::from(vec![
                    Span::styled("  Score:     ", Style::default().fg(colors.fg())),
                    Span::styled(
                        format!("{}/{}", score.correct_count, score.total_questions),
                        Style::default()
                            .fg(colors.accent())
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  ({:.0}%)", score.percent()),
                        Style::default().fg(colors.text_muted()),
                    ),
                ]);
                Paragraph::new(raw_line).render(layout[2], buf);

                let wrong = if score.wrong_question_ids.is_empty() {
                    Line::from(Span::styled(
                        "  Every question correct.",
                        Style::default().fg(colors.success()),
                    ))
                } else {
                    Line::from(vec![
                        Span::styled("  Review:    ", Style::default().fg(colors.fg())),
                        Span::styled(
                            score.wrong_question_ids.join(", "),
                            Style::default().fg(colors.error()),
                        ),
                    ])
                };
                Paragraph::new(wrong)
                    .wrap(Wrap { trim: false })
                    .render(layout[4], buf);
            }
            None => {
                let note = match skill {
                    Skill::Writing => "  Your essay is saved for marking by an examiner.",
                    Skill::Speaking => "  Your recordings are saved for marking by an examiner.",
                    _ => "  This test has no answer key.",
                };
                Paragraph::new(Line::from(Span::styled(
                    note,
                    Style::default().fg(colors.fg()),
                )))
                .wrap(Wrap { trim: false })
                .render(layout[1], buf);
            }
        }

        let mut hints = vec![
            Span::styled("  [Enter] Review  ", Style::default().fg(colors.accent())),
            Span::styled("[r] Redo  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Mock tests", Style::default().fg(colors.accent())),
        ];
        if self.submission.score.is_none() {
            hints.remove(0);
        }
        Paragraph::new(Line::from(hints)).render(layout[5], buf);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::engine::scoring::ScoreResult;
    use crate::session::answers::AnswerStore;
    use crate::session::attempt::SubmissionPayload;

    fn rendered(submission: &Submission) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 16);
        let mut buf = Buffer::empty(area);
        ScoreCard::new(submission, 125, &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn submission(skill: Skill, score: Option<ScoreResult>) -> Submission {
        Submission {
            payload: SubmissionPayload {
                test_id: "sample-1".to_string(),
                skill,
                answers: AnswerStore::new(),
                writing: None,
                submitted_at: Utc::now(),
            },
            score,
        }
    }

    #[test]
    fn scored_card_shows_band_and_wrong_ids() {
        let score = ScoreResult {
            correct_count: 30,
            total_questions: 40,
            band: Band::from_half_steps(14).unwrap(),
            wrong_question_ids: vec!["4".to_string(), "17".to_string()],
        };
        let text = rendered(&submission(Skill::Listening, Some(score)));
        assert!(text.contains("7.0"));
        assert!(text.contains("30/40"));
        assert!(text.contains("4, 17"));
        assert!(text.contains("02:05"));
    }

    #[test]
    fn unscored_card_explains_manual_marking() {
        let text = rendered(&submission(Skill::Speaking, None));
        assert!(text.contains("recordings are saved"));
        assert!(!text.contains("[Enter] Review"));
    }
}
