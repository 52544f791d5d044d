use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use student_registry::{App, FormField, Mode, NotificationKind, SortKey, StudentForm};

const TICK: Duration = Duration::from_millis(250);

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.notifications.expire(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        // Poll so notifications disappear without a key press.
        if !event::poll(TICK)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !handle_key(app, key) {
                return Ok(());
            }
        }
    }
}

/// Dispatch a key press. Returns `false` when the app should exit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Raw mode swallows SIGINT, so Ctrl-C quits from anywhere.
    if is_ctrl(&key) && key.code == KeyCode::Char('c') {
        return false;
    }

    match app.mode {
        Mode::Browse => return handle_browse_key(app, key),
        Mode::Search => match key.code {
            KeyCode::Enter | KeyCode::Esc => app.mode = Mode::Browse,
            KeyCode::Tab => app.toggle_search_mode(),
            KeyCode::Backspace => app.pop_query_char(),
            KeyCode::Char(c) if !is_ctrl(&key) => app.push_query_char(c),
            _ => {}
        },
        Mode::Form(_) => match key.code {
            KeyCode::Esc => app.close_form(),
            KeyCode::Enter => {
                app.submit_form();
            }
            _ => {
                if let Some(form) = app.form_mut() {
                    handle_form_key(form, key);
                }
            }
        },
        Mode::ConfirmDelete { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.answer_delete(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.answer_delete(false);
            }
            _ => {}
        },
    }
    true
}

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_browse_key(app: &mut App, key: KeyEvent) -> bool {
    if is_ctrl(&key) {
        return true;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Tab => app.toggle_search_mode(),
        KeyCode::Char('c') => app.set_query(""),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('1') => app.sort_by(SortKey::Name),
        KeyCode::Char('2') => app.sort_by(SortKey::Class),
        KeyCode::Char('3') => app.sort_by(SortKey::Grade),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Home => app.first(),
        KeyCode::End => app.last(),
        _ => {}
    }
    true
}

fn handle_form_key(form: &mut StudentForm, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.previous(),
        KeyCode::Left => form.cycle(false),
        KeyCode::Right => form.cycle(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(' ') if form.focus != FormField::Name => form.cycle(true),
        KeyCode::Char(c) if !is_ctrl(&key) => form.input(c),
        _ => {}
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + search box
            Constraint::Min(0),    // Student table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);

    match &app.mode {
        Mode::Form(form) => render_form(f, form),
        Mode::ConfirmDelete { .. } => render_confirm(f, app),
        _ => {}
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let searching = app.mode == Mode::Search;

    let mut spans = vec![
        Span::styled(
            "Student Management System",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled("Search: ", Style::default().fg(Color::White)),
        Span::styled(
            if app.query.is_empty() && !searching {
                "Search students...".to_string()
            } else {
                app.query.clone()
            },
            if searching {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ),
    ];
    if searching {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::raw("  ["));
    spans.push(Span::styled(
        app.search_mode.label(),
        Style::default().fg(Color::Green),
    ));
    spans.push(Span::raw("]"));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" Students ({}) ", app.total_visible()));

    if app.visible.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No students found",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(ratatui::layout::Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header_cells = [SortKey::Name, SortKey::Class, SortKey::Grade]
        .iter()
        .map(|key| {
            let label = match app.sort.key {
                Some(k) if k == *key => format!("{} {}", key.label(), app.sort.direction.arrow()),
                _ => key.label().to_string(),
            };
            Cell::from(label).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible.iter().map(|student| {
        let cells = vec![
            Cell::from(truncate(&student.name, 30)),
            Cell::from(student.class.clone()),
            Cell::from(student.grade.clone()).style(grade_style(&student.grade)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    let mut state = TableState::default();
    state.select(app.selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn grade_style(grade: &str) -> Style {
    let style = Style::default();
    match grade {
        "A+" => style.fg(Color::Green).add_modifier(Modifier::BOLD),
        "A" => style.fg(Color::Green),
        "B+" => style.fg(Color::Blue).add_modifier(Modifier::BOLD),
        "B" => style.fg(Color::Blue),
        "C" => style.fg(Color::Yellow),
        "D" => style.fg(Color::LightRed),
        "E" => style.fg(Color::Magenta),
        "F" => style.fg(Color::Red),
        _ => style.fg(Color::Gray),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.notifications.latest() {
        Some(notification) => {
            let color = match notification.kind {
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {} ", notification.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(key_hints(&app.mode)),
    };

    let status_bar = Paragraph::new(vec![line]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn key_hints(mode: &Mode) -> Vec<Span<'static>> {
    let hints: &[(&str, &str)] = match mode {
        Mode::Browse => &[
            ("/", "Search"),
            ("Tab", "Name/Class"),
            ("1-3", "Sort"),
            ("a", "Add"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("q", "Quit"),
        ],
        Mode::Search => &[("Enter", "Done"), ("Tab", "Name/Class")],
        Mode::Form(_) => &[
            ("Tab", "Field"),
            ("←/→", "Choose"),
            ("Enter", "Save"),
            ("Esc", "Cancel"),
        ],
        Mode::ConfirmDelete { .. } => &[("y", "Delete"), ("n", "Cancel")],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        spans.push(Span::raw(if i == 0 { " " } else { " | " }));
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}", action)));
    }
    spans
}

fn render_form(f: &mut Frame, form: &StudentForm) {
    let area = centered_rect(50, 11, f.size());

    let field = |label: &'static str, value: &str, placeholder: &'static str, focused: bool| {
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let value_span = if value.is_empty() {
            Span::styled(placeholder, Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(value.to_string())
        };
        Line::from(vec![
            Span::styled(if focused { "→ " } else { "  " }, label_style),
            Span::styled(format!("{:<7}", label), label_style),
            value_span,
        ])
    };

    let content = vec![
        Line::from(""),
        field("Name", &form.name, "", form.focus == FormField::Name),
        Line::from(""),
        field("Class", &form.class, "Select Class", form.focus == FormField::Class),
        Line::from(""),
        field("Grade", &form.grade, "Select Grade", form.focus == FormField::Grade),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter to save, Esc to cancel",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", form.title())),
    );

    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

fn render_confirm(f: &mut Frame, app: &App) {
    let Some(prompt) = app.confirmation_prompt() else {
        return;
    };
    let area = centered_rect(60, 5, f.size());

    let content = vec![
        Line::from(format!(" {}", prompt)),
        Line::from(vec![
            Span::raw(" "),
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" delete   "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(" cancel"),
        ]),
    ];

    let dialog = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

/// Rect of `percent_x` width and `height` rows centered in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use student_registry::{Config, Student, StudentRegistry};

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let registry = StudentRegistry::from_seed(vec![
            Student::new("1", "Ann", "5th", "A"),
            Student::new("2", "Bo", "5th", "B"),
        ])
        .unwrap();
        App::new(registry, &Config::default())
    }

    #[test]
    fn test_keys_drive_search() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.query, "b");
        assert_eq!(app.total_visible(), 1);
    }

    #[test]
    fn test_keys_drive_delete_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.mode, Mode::ConfirmDelete { .. }));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.registry().len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.registry().len(), 1);
    }

    #[test]
    fn test_keys_drive_add_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        for c in "Cy".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Browse);
        let added = app.registry().students().last().unwrap();
        assert_eq!((added.name.as_str(), added.class.as_str(), added.grade.as_str()), ("Cy", "1st", "A+"));
    }

    #[test]
    fn test_quit_only_from_browse() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
        assert!(!press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_ctrl_chords_are_not_typed() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('a'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(app.query, "a");

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.form_mut().unwrap().name, "");

        // Ctrl-D in the table must not open the delete prompt.
        press(&mut app, KeyCode::Esc);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.mode, Mode::Browse);
    }

    #[test]
    fn test_ctrl_c_quits_from_search() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));

        let keep_running =
            handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert!(!keep_running);
        assert_eq!(app.query, "");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Lucas Müller", 30), "Lucas Müller");
        assert_eq!(truncate("Müüüüüüller", 6), "Müü...");
    }
}
