mod app;
mod bank;
mod config;
mod engine;
mod error;
mod event;
mod logging;
mod route;
mod session;
mod store;
mod ui;

use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use app::{App, AppScreen, StatusKind};
use bank::schema::TestDefinition;
use bank::{QuestionBank, Skill};
use config::Config;
use event::{AppEvent, EventHandler, TICK_RATE};
use route::Route;
use store::{JsonStore, MemoryStore, ProgressStore};
use ui::components::confirm_dialog::ConfirmDialog;
use ui::components::question_list::QuestionList;
use ui::components::score_card::ScoreCard;
use ui::components::speaking_panel::SpeakingPanel;
use ui::components::timer_bar::TimerBar;
use ui::components::writing_panel::WritingPanel;
use ui::layout::{TestLayout, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "ielts-mock", version, about = "IELTS mock tests in the terminal")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Question bank directory or http(s) URL")]
    bank: Option<String>,

    #[arg(
        short,
        long,
        help = "Page to open, e.g. /mock-tests/reading or /test/reading/reading-sample-1"
    )]
    route: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init(&logging::log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e:#}");
            None
        }
    };

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(bank) = cli.bank {
        config.bank_location = bank;
    }
    config.validate(&Theme::available_themes());

    let route = match cli.route.as_deref() {
        Some(path) => Route::parse(path).map_err(anyhow::Error::msg)?,
        None => Route::Catalog,
    };

    let source = bank::source::source_for(&config.bank_location)
        .with_context(|| format!("cannot open question bank `{}`", config.bank_location))?;
    let store: Box<dyn ProgressStore> = match JsonStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "progress will not be saved this session");
            Box::new(MemoryStore::new())
        }
    };
    let theme: &'static Theme = Box::leak(Box::new(Theme::load(&config.theme).unwrap_or_default()));

    tracing::info!(bank = %config.bank_location, %route, "starting");
    let mut app = App::new(config, theme, QuestionBank::new(source), store);
    app.open_route(route);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                if app.screen == AppScreen::Test && !app.exit_confirm_shown() {
                    app.paste(&text);
                }
            }
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Repeat and Release would double-type characters on some terminals.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Catalog => handle_catalog_key(app, key),
        AppScreen::TestList => handle_test_list_key(app, key),
        AppScreen::Test => handle_test_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
    }
}

fn handle_catalog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char(ch) => {
            if app.menu.select_key(ch) {
                app.open_selected();
            }
        }
        _ => {}
    }
}

fn handle_test_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_catalog(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char(ch) => {
            if app.menu.select_key(ch) {
                app.open_selected();
            }
        }
        _ => {}
    }
}

fn handle_test_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.exit_confirm_shown() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_exit(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_exit(),
            _ => {}
        }
        return;
    }

    if app.image_prompt.is_some() {
        match key.code {
            KeyCode::Enter => app.confirm_image_prompt(),
            KeyCode::Esc => app.cancel_image_prompt(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(ch) => app.writing_key(ch),
            _ => {}
        }
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let Some(skill) = app.attempt.as_ref().map(|a| a.skill()) else {
        app.go_to_catalog();
        return;
    };

    if app.is_submitted() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('s') => app.show_result(),
            KeyCode::Char('a') => app.toggle_show_answers(),
            KeyCode::Char('r') => app.redo(),
            KeyCode::Up | KeyCode::Char('k') => app.prev_question(),
            KeyCode::Down | KeyCode::Char('j') => app.next_question(),
            KeyCode::PageUp => app.scroll_passage(-5),
            KeyCode::PageDown => app.scroll_passage(5),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.request_exit();
            return;
        }
        KeyCode::Char('s') if ctrl => {
            app.submit();
            return;
        }
        _ => {}
    }

    // Speaking starts its clock with the first recording instead.
    if !app.is_started() && skill != Skill::Speaking {
        if key.code == KeyCode::Enter {
            app.begin();
        }
        return;
    }

    match skill {
        Skill::Listening | Skill::Reading => match key.code {
            KeyCode::Up | KeyCode::BackTab => app.prev_question(),
            KeyCode::Down | KeyCode::Tab => app.next_question(),
            KeyCode::Left => app.prev_pair(),
            KeyCode::Right => app.next_pair(),
            KeyCode::PageUp => app.scroll_passage(-5),
            KeyCode::PageDown => app.scroll_passage(5),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.clear_answer(),
            KeyCode::Char(ch) if !ctrl => app.answer_key(ch),
            _ => {}
        },
        Skill::Writing => match key.code {
            KeyCode::Char('o') if ctrl => app.open_image_prompt(),
            KeyCode::Enter => app.writing_key('\n'),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(ch) if !ctrl => app.writing_key(ch),
            _ => {}
        },
        Skill::Speaking => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.prev_part(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.next_part(),
            KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter => app.toggle_recording(),
            _ => {}
        },
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if app.submission.as_ref().is_some_and(|s| s.score.is_some()) {
                app.review();
            }
        }
        KeyCode::Char('r') => app.redo(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_catalog(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Catalog | AppScreen::TestList => render_menu(frame, app),
        AppScreen::Test => render_test(frame, app),
        AppScreen::Result => render_result(frame, app),
    }
}

fn status_line(app: &App) -> Line<'_> {
    let colors = &app.theme.colors;
    match &app.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => colors.accent(),
                StatusKind::Error => colors.error(),
            };
            Line::from(Span::styled(
                format!(" {}", status.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(""),
    }
}

fn header_line<'a>(app: &'a App, title: &'a str, info: String) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_muted())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, hints: &[&str], area: Rect) {
    let colors = &app.theme.colors;
    let mut lines = vec![status_line(app)];
    lines.extend(
        pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_muted())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn footer_height(hints: &[&str], width: u16) -> u16 {
    1 + pack_hint_lines(hints, width as usize).len() as u16
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let hints: &[&str] = match app.screen {
        AppScreen::Catalog => &["[1-4] Choose", "[Enter] Open", "[q] Quit"],
        _ => &["[1-9] Choose", "[Enter] Start", "[Esc] Mock tests"],
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(footer_height(hints, area.width)),
        ])
        .split(area);

    let info = format!(" | bank: {}", app.bank_description());
    frame.render_widget(header_line(app, " IELTS Mock ", info), layout[0]);

    let menu_area = ui::layout::centered_rect(60, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    render_footer(frame, app, hints, layout[2]);
}

fn intro_text(app: &App, def: &TestDefinition) -> Vec<String> {
    let skill = def.skill();
    let minutes = app.config.duration_minutes(skill);
    let mut lines = vec![
        format!("{} | {}", skill.label(), def.test_id()),
        String::new(),
        format!("You have {minutes} minutes. The clock starts when you press Enter."),
        skill.summary().to_string(),
    ];
    if let TestDefinition::Listening(t) = def {
        lines.push(String::new());
        lines.push("Play each section's recording while you answer:".to_string());
        lines.extend(
            t.sections
                .iter()
                .map(|s| format!("  Section {}: {}", s.section_number, s.audio_url)),
        );
    }
    lines
}

fn test_hints(app: &App, skill: Skill) -> Vec<&'static str> {
    if app.is_submitted() {
        return vec!["[a] Show answers", "[r] Redo", "[s] Score", "[Up/Down] Move"];
    }
    if !app.is_started() && skill != Skill::Speaking {
        return vec!["[Enter] Start", "[Esc] Leave"];
    }
    let mut hints = match skill {
        Skill::Listening | Skill::Reading => vec![
            "[Up/Down] Question",
            "[a-z] Answer",
            "[t/f/n] True/False/Not Given",
            "[Left/Right] Pair",
            "[Del] Clear",
        ],
        Skill::Writing => vec!["[Enter] New line", "[Ctrl+O] Attach photo"],
        Skill::Speaking => vec!["[Up/Down] Part", "[r/Space] Record/Stop"],
    };
    if skill == Skill::Reading {
        hints.push("[PgUp/PgDn] Passage");
    }
    hints.extend(["[Ctrl+S] Submit", "[Esc] Leave"]);
    hints
}

fn render_test(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(attempt) = app.attempt.as_ref() else {
        return;
    };
    let def = attempt.test();
    let skill = attempt.skill();
    let show_intro = !attempt.session().started() && skill != Skill::Speaking;

    let hints = test_hints(app, skill);
    let with_side = skill == Skill::Reading && !show_intro;
    let layout = TestLayout::new(area, with_side, footer_height(&hints, area.width));

    let title = format!(" {} Test ", skill.label());
    let info = format!(" | {}", def.test_id());
    frame.render_widget(header_line(app, &title, info), layout.header);
    frame.render_widget(TimerBar::new(attempt.session(), app.theme), layout.clock);

    if show_intro {
        let lines: Vec<Line> = intro_text(app, def)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.fg()))))
            .collect();
        let intro = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::bordered()
                .title(" Instructions ")
                .border_style(Style::default().fg(colors.border_focused())),
        );
        frame.render_widget(intro, layout.main);
    } else {
        match def {
            TestDefinition::Listening(_) => {
                let list = QuestionList::new(attempt, app.selected, app.pair_cursor, app.theme);
                frame.render_widget(list, layout.main);
            }
            TestDefinition::Reading(_) => {
                if let Some(side) = layout.side {
                    render_passages(frame, app, side);
                }
                let list = QuestionList::new(attempt, app.selected, app.pair_cursor, app.theme);
                frame.render_widget(list, layout.main);
            }
            TestDefinition::Writing(t) => {
                let panel = WritingPanel::new(t, attempt.draft(), app.theme)
                    .editable(!attempt.is_submitted())
                    .image_prompt(app.image_prompt.as_deref());
                frame.render_widget(panel, layout.main);
            }
            TestDefinition::Speaking(t) => {
                let panel = SpeakingPanel::new(t, attempt, app.speaking_part, app.theme);
                frame.render_widget(panel, layout.main);
            }
        }
    }

    render_footer(frame, app, &hints, layout.footer);

    if app.exit_confirm_shown() {
        frame.render_widget(ConfirmDialog::exit_test(app.theme), area);
    }
}

fn render_passages(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    for passage in &app.passages {
        lines.push(Line::from(Span::styled(
            passage.title.as_str(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for paragraph in passage.text.lines() {
            lines.push(Line::from(Span::styled(
                paragraph,
                Style::default().fg(colors.fg()),
            )));
        }
        lines.push(Line::from(""));
    }
    let passages = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.passage_scroll, 0))
        .block(
            Block::bordered()
                .title(" Passage ")
                .border_style(Style::default().fg(colors.border())),
        );
    frame.render_widget(passages, area);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref submission) = app.submission {
        let centered = ui::layout::centered_rect(60, 60, area);
        let card = ScoreCard::new(submission, app.time_used_secs(), app.theme);
        frame.render_widget(card, centered);
    }

    if app.status.is_some() {
        let bottom = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);
        frame.render_widget(Paragraph::new(status_line(app)), bottom);
    }
}
