use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::session::test_session::TestSession;
use crate::ui::theme::Theme;

/// Remaining time as a draining bar with the `MM:SS` clock centered on it.
pub struct TimerBar<'a> {
    pub label: String,
    pub clock: String,
    /// Fraction of the test already used.
    pub ratio: f64,
    pub running: bool,
    pub theme: &'a Theme,
}

impl<'a> TimerBar<'a> {
    pub fn new(session: &TestSession, theme: &'a Theme) -> Self {
        let label = if session.is_expired() {
            "Time is up"
        } else if session.started() {
            "Time left"
        } else {
            "Not started"
        };
        Self {
            label: label.to_string(),
            clock: session.format_clock(),
            ratio: session.elapsed_ratio().clamp(0.0, 1.0),
            running: session.started() && !session.is_expired(),
            theme,
        }
    }
}

impl Widget for TimerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.running {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Filled part is the time still available.
        let left = 1.0 - self.ratio;
        let filled_width = (left * inner.width as f64) as u16;
        let fill = if left < 0.1 {
            colors.warning()
        } else {
            colors.bar_filled()
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(self.clock.len() as u16)) / 2;
        buf.set_string(
            label_x,
            inner.y,
            &self.clock,
            Style::default().add_modifier(Modifier::BOLD),
        );
    }
}
