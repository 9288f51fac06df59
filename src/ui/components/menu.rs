use std::collections::BTreeSet;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::bank::Skill;
use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    /// Shown as a check mark next to the label.
    pub done: bool,
}

pub struct Menu<'a> {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    /// The four skills, with the ones already submitted ticked.
    pub fn catalog(theme: &'a Theme, completed: &BTreeSet<Skill>) -> Self {
        let items = Skill::ALL
            .iter()
            .enumerate()
            .map(|(i, skill)| MenuItem {
                key: (i + 1).to_string(),
                label: skill.label().to_string(),
                description: format!("{} min | {}", skill.default_minutes(), skill.summary()),
                done: completed.contains(skill),
            })
            .collect();
        Self {
            title: "IELTS Mock Tests".to_string(),
            subtitle: format!("{}/{} skills completed", completed.len(), Skill::ALL.len()),
            items,
            selected: 0,
            theme,
        }
    }

    pub fn test_list(theme: &'a Theme, skill: Skill, test_ids: &[String]) -> Self {
        let items = test_ids
            .iter()
            .enumerate()
            .map(|(i, id)| MenuItem {
                key: (i + 1).to_string(),
                label: id.clone(),
                description: String::new(),
                done: false,
            })
            .collect();
        Self {
            title: format!("{} Tests", skill.label()),
            subtitle: skill.summary().to_string(),
            items,
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    /// Jump to the item whose key is `key`.
    pub fn select_key(&mut self, key: char) -> bool {
        match self.items.iter().position(|item| item.key == key.to_string()) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                &*self.title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(&*self.subtitle, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if self.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  Nothing here yet.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(layout[2], buf);
            return;
        }

        let row_height = if self.items.iter().any(|i| !i.description.is_empty()) {
            3
        } else {
            1
        };
        let visible = (layout[2].height / row_height).max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                (0..visible.min(self.items.len()))
                    .map(|_| Constraint::Length(row_height))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (slot, (i, item)) in self.items.iter().enumerate().skip(first).enumerate() {
            if slot >= menu_layout.len() {
                break;
            }
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let check = if item.done { " \u{2713}" } else { "" };

            let label_text = format!(" {indicator} [{}] {}{check}", item.key, item.label);
            let mut lines = vec![Line::from(Span::styled(
                label_text,
                Style::default()
                    .fg(if is_selected { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
            ))];
            if !item.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_muted()),
                )));
            }
            Paragraph::new(lines).render(menu_layout[slot], buf);
        }
    }
}
