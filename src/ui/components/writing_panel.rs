use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::schema::WritingTest;
use crate::session::writing::{TASK1_MIN_WORDS, TASK2_MIN_WORDS, WritingDraft};
use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// Both task prompts above a free-text editor with a live word count.
pub struct WritingPanel<'a> {
    pub test: &'a WritingTest,
    pub draft: &'a WritingDraft,
    pub editable: bool,
    /// Path being typed for an image upload, if the prompt is open.
    pub image_prompt: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> WritingPanel<'a> {
    pub fn new(test: &'a WritingTest, draft: &'a WritingDraft, theme: &'a Theme) -> Self {
        Self {
            test,
            draft,
            editable: true,
            image_prompt: None,
            theme,
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn image_prompt(mut self, prompt: Option<&'a str>) -> Self {
        self.image_prompt = prompt;
        self
    }
}

impl Widget for WritingPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Min(5),
                Constraint::Length(if self.image_prompt.is_some() { 3 } else { 0 }),
            ])
            .split(area);

        let title_style = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let mut prompt_lines = vec![
            Line::from(Span::styled(
                format!("Task 1 ({TASK1_MIN_WORDS}+ words)"),
                title_style,
            )),
            Line::from(Span::styled(&*self.test.task1.prompt, Style::default().fg(colors.fg()))),
        ];
        if let Some(url) = &self.test.task1.image_url {
            prompt_lines.push(Line::from(Span::styled(
                format!("Figure: {url}"),
                Style::default().fg(colors.text_muted()),
            )));
        }
        prompt_lines.push(Line::from(""));
        prompt_lines.push(Line::from(Span::styled(
            format!("Task 2 ({TASK2_MIN_WORDS}+ words)"),
            title_style,
        )));
        prompt_lines.push(Line::from(Span::styled(
            &*self.test.task2.prompt,
            Style::default().fg(colors.fg()),
        )));
        let prompts = Paragraph::new(prompt_lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(" Tasks ")
                    .border_style(Style::default().fg(colors.border())),
            );
        prompts.render(layout[0], buf);

        let words = self.draft.word_count();
        let word_color = if words >= TASK1_MIN_WORDS + TASK2_MIN_WORDS {
            colors.success()
        } else {
            colors.text_muted()
        };
        let images = if self.draft.images.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = self.draft.images.iter().map(|i| i.file_name.as_str()).collect();
            format!(" | photos: {}", names.join(", "))
        };
        let editor_block = Block::bordered()
            .title(Line::from(vec![
                Span::raw(" Your answer "),
                Span::styled(format!("({words} words{images}) "), Style::default().fg(word_color)),
            ]))
            .border_style(Style::default().fg(if self.editable && self.image_prompt.is_none() {
                colors.border_focused()
            } else {
                colors.border()
            }));
        let editor_inner = editor_block.inner(layout[1]);
        editor_block.render(layout[1], buf);

        let cursor = if self.editable && self.image_prompt.is_none() {
            "_"
        } else {
            ""
        };
        let text = format!("{}{cursor}", self.draft.text);
        // Keep the end of the text (where typing happens) in view.
        let width = editor_inner.width as usize;
        let rows: usize = text
            .split('\n')
            .map(|line| wrapped_line_count(line, width))
            .sum();
        let scroll = rows.saturating_sub(editor_inner.height as usize);
        Paragraph::new(text)
            .style(Style::default().fg(colors.answer()))
            .wrap(Wrap { trim: false })
            .scroll((scroll.min(u16::MAX as usize) as u16, 0))
            .render(editor_inner, buf);

        if let Some(path) = self.image_prompt {
            let prompt = Paragraph::new(Line::from(vec![
                Span::styled("Image path: ", Style::default().fg(colors.fg())),
                Span::styled(format!("{path}_"), Style::default().fg(colors.answer())),
            ]))
            .block(
                Block::bordered()
                    .title(" Upload handwritten answer ")
                    .border_style(Style::default().fg(colors.border_focused())),
            );
            prompt.render(layout[2], buf);
        }
    }
}
