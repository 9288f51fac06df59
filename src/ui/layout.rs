use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥110 cols: passage and questions side by side
    Narrow, // passage stacked above questions
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 110 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }
}

/// Screen split for a running test: header, clock, body (optionally with a
/// side pane for reading passages) and a key-hint footer.
pub struct TestLayout {
    pub header: Rect,
    pub clock: Rect,
    pub main: Rect,
    pub side: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl TestLayout {
    pub fn new(area: Rect, with_side: bool, footer_lines: u16) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        let (main, side) = match (with_side, tier) {
            (false, _) => (vertical[2], None),
            (true, LayoutTier::Wide) => {
                let horizontal = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(vertical[2]);
                (horizontal[1], Some(horizontal[0]))
            }
            (true, LayoutTier::Narrow) => {
                let stacked = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(vertical[2]);
                (stacked[1], Some(stacked[0]))
            }
        };

        Self {
            header: vertical[0],
            clock: vertical[1],
            main,
            side,
            footer: vertical[3],
            tier,
        }
    }
}

pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let chars = text.chars().count().max(1);
    chars.div_ceil(width)
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 7;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_wrap_at_width() {
        let lines = pack_hint_lines(&["[Esc] Exit", "[Ctrl+S] Submit", "[Tab] Next"], 28);
        assert_eq!(lines, vec![" [Esc] Exit  [Ctrl+S] Submit", " [Tab] Next"]);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(50, 50, area);
        assert!(popup.width <= area.width && popup.height <= area.height);
        assert_eq!(popup.x, 0);
    }

    #[test]
    fn narrow_screen_stacks_passage() {
        let layout = TestLayout::new(Rect::new(0, 0, 80, 40), true, 1);
        let side = layout.side.unwrap();
        assert_eq!(layout.tier, LayoutTier::Narrow);
        assert!(side.y < layout.main.y);

        let wide = TestLayout::new(Rect::new(0, 0, 140, 40), true, 1);
        assert!(wide.side.unwrap().x < wide.main.x);
    }

    #[test]
    fn wrapped_line_count_rounds_up() {
        assert_eq!(wrapped_line_count("abcdef", 4), 2);
        assert_eq!(wrapped_line_count("", 4), 1);
        assert_eq!(wrapped_line_count("abc", 0), 0);
    }
}
