use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::question::{Question, QuestionKind, Verdict, option_letter};
use crate::session::answers::AnswerValue;
use crate::session::attempt::Attempt;
use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// Scrollable list of listening or reading questions with the learner's
/// answers, review marks after submit and the key when answers are shown.
pub struct QuestionList<'a> {
    pub attempt: &'a Attempt,
    pub selected: usize,
    pub pair_cursor: usize,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<'a> QuestionList<'a> {
    pub fn new(attempt: &'a Attempt, selected: usize, pair_cursor: usize, theme: &'a Theme) -> Self {
        Self {
            attempt,
            selected,
            pair_cursor,
            focused: true,
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn question_lines(&self, index: usize, q: &Question) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let is_selected = index == self.selected;
        let answer = self.attempt.answers().get(&q.id);
        let editable = !self.attempt.is_submitted() && is_selected;

        let mark = match self.attempt.review(&q.id) {
            Some(true) => Span::styled(" \u{2713}", Style::default().fg(colors.success())),
            Some(false) => Span::styled(" \u{2717}", Style::default().fg(colors.error())),
            None => Span::raw(""),
        };
        let head_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let indicator = if is_selected { ">" } else { " " };
        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{indicator} {}. {}", q.id, q.prompt), head_style),
            mark,
        ])];

        let picked = Style::default()
            .fg(colors.answer())
            .add_modifier(Modifier::BOLD);
        let plain = Style::default().fg(colors.fg());

        match &q.kind {
            QuestionKind::SingleChoice { options, .. } => {
                for (i, option) in options.iter().enumerate() {
                    let on = matches!(answer, Some(AnswerValue::Choice(c)) if *c == i);
                    let bullet = if on { "(\u{2022})" } else { "( )" };
                    lines.push(Line::from(Span::styled(
                        format!("    {bullet} {}. {option}", option_letter(i)),
                        if on { picked } else { plain },
                    )));
                }
            }
            QuestionKind::MultiSelect { options, .. } => {
                for (i, option) in options.iter().enumerate() {
                    let on = matches!(answer, Some(AnswerValue::Selection(s)) if s.contains(&i));
                    let bullet = if on { "[x]" } else { "[ ]" };
                    lines.push(Line::from(Span::styled(
                        format!("    {bullet} {}. {option}", option_letter(i)),
                        if on { picked } else { plain },
                    )));
                }
            }
            QuestionKind::MatchingHeadings { headings, .. } => {
                for (i, heading) in headings.iter().enumerate() {
                    let on = matches!(answer, Some(AnswerValue::Heading(h)) if *h == i);
                    let bullet = if on { "(\u{2022})" } else { "( )" };
                    lines.push(Line::from(Span::styled(
                        format!("    {bullet} {}. {heading}", option_letter(i)),
                        if on { picked } else { plain },
                    )));
                }
            }
            QuestionKind::TrueFalseNotGiven { .. } => {
                let mut spans = vec![Span::raw("    ")];
                for verdict in Verdict::ALL {
                    let on = matches!(answer, Some(AnswerValue::Verdict(v)) if *v == verdict);
                    spans.push(Span::styled(
                        format!("[{}] {}  ", verdict_key(verdict), verdict.label()),
                        if on { picked } else { plain },
                    ));
                }
                lines.push(Line::from(spans));
            }
            QuestionKind::FormCompletion { .. } => {
                let text = match answer {
                    Some(AnswerValue::Text(t)) => t.as_str(),
                    _ => "",
                };
                let cursor = if editable && self.focused { "_" } else { "" };
                lines.push(Line::from(vec![
                    Span::styled("    > ", Style::default().fg(colors.text_muted())),
                    Span::styled(format!("{text}{cursor}"), picked),
                ]));
            }
            QuestionKind::Matching { pairs, .. } => {
                for (p, pair) in pairs.iter().enumerate() {
                    let chosen = match answer {
                        Some(AnswerValue::Pairs(map)) => map.get(&p).copied(),
                        _ => None,
                    };
                    let slot = chosen
                        .map(|o| option_letter(o).to_string())
                        .unwrap_or_else(|| " ".to_string());
                    let on_pair = editable && p == self.pair_cursor;
                    let style = if on_pair {
                        picked.bg(colors.selection_bg())
                    } else {
                        plain
                    };
                    lines.push(Line::from(Span::styled(
                        format!("    {}: [{slot}]", pair.left),
                        style,
                    )));
                }
                if let Some(first) = pairs.first() {
                    let legend = first
                        .right_options
                        .iter()
                        .enumerate()
                        .map(|(i, o)| format!("{}. {o}", option_letter(i)))
                        .collect::<Vec<_>>()
                        .join("  ");
                    lines.push(Line::from(Span::styled(
                        format!("    {legend}"),
                        Style::default().fg(colors.text_muted()),
                    )));
                }
            }
        }

        if self.attempt.show_answers()
            && let Some(key) = q.kind.canonical_display()
        {
            lines.push(Line::from(Span::styled(
                format!("    Answer: {key}"),
                Style::default().fg(colors.success()),
            )));
        }
        lines.push(Line::from(""));
        lines
    }
}

pub fn verdict_key(verdict: Verdict) -> char {
    match verdict {
        Verdict::True => 't',
        Verdict::False => 'f',
        Verdict::NotGiven => 'n',
    }
}

impl Widget for QuestionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let answered = self.attempt.answers().len();
        let total = self.attempt.questions().len();
        let block = Block::bordered()
            .title(format!(" Questions ({answered}/{total} answered) "))
            .border_style(Style::default().fg(if self.focused {
                colors.border_focused()
            } else {
                colors.border()
            }));
        let inner = block.inner(area);
        block.render(area, buf);

        let width = inner.width as usize;
        let mut lines: Vec<Line> = Vec::new();
        let mut selected_row = 0usize;
        let mut rows = 0usize;
        let mut group: Option<&str> = None;

        for (i, q) in self.attempt.questions().iter().enumerate() {
            if group != Some(q.group.as_str()) {
                group = Some(q.group.as_str());
                let header = Line::from(Span::styled(
                    format!("\u{2500}\u{2500} {} \u{2500}\u{2500}", q.group),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ));
                rows += 1;
                lines.push(header);
            }
            if i == self.selected {
                selected_row = rows;
            }
            for line in self.question_lines(i, q) {
                let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
                rows += wrapped_line_count(&text, width);
                lines.push(line);
            }
        }

        let height = inner.height as usize;
        let scroll = selected_row.saturating_sub(height / 3);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::schema::TestDefinition;
    use crate::store::MemoryStore;

    fn attempt() -> Attempt {
        let json = r#"{
            "testId": "l1",
            "sections": [{
                "sectionNumber": 1,
                "audioUrl": "/a.mp3",
                "questions": [
                    {"id": "1", "type": "form-completion", "question": "Surname", "correctAnswer": "Smith"},
                    {"id": "2", "type": "multiple-choice", "question": "Day?", "options": ["Mon", "Tue"], "correctAnswer": "B"}
                ]
            }]
        }"#;
        Attempt::new(TestDefinition::Listening(serde_json::from_str(json).unwrap()), 30)
    }

    fn render(attempt: &Attempt) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 50, 20);
        let mut buf = Buffer::empty(area);
        QuestionList::new(attempt, 0, 0, &theme).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn shows_group_answers_and_cursor() {
        let mut attempt = attempt();
        attempt.push_char("1", 'S');
        attempt.set_answer("2", AnswerValue::Choice(1));
        let text = render(&attempt);
        assert!(text.contains("Section 1"));
        assert!(text.contains("> S_"));
        assert!(text.contains("(\u{2022}) B. Tue"));
        assert!(text.contains("2/2 answered"));
    }

    #[test]
    fn review_marks_and_key_after_submit() {
        let mut attempt = attempt();
        attempt.set_answer("2", AnswerValue::Choice(0));
        attempt.submit(&MemoryStore::new()).unwrap();
        attempt.toggle_show_answers();
        let text = render(&attempt);
        assert!(text.contains("\u{2717}"));
        assert!(text.contains("Answer: Smith"));
        assert!(text.contains("Answer: B. Tue"));
    }
}
