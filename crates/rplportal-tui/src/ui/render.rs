use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use rplportal_core::dashboard::Dashboard;

use crate::app::{App, AppState, LoginFocus};

use super::styles;
use super::tabs::{assessor, enroll, management, student_home, students};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Enrolling => enroll::render(frame, app),
        AppState::PickingOrganization => management::render_picker(frame, app),
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  RPL Portal";
    let right = match app.signed_in_as() {
        Some(user) => format!("{}  [?] Help", user),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.chars().count() + 4),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, dashboard) in app.tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, dashboard.title());
        if i == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_dashboard() {
        Dashboard::Portfolio => students::render(frame, app, area),
        Dashboard::AssessorQueue => assessor::render(frame, app, area),
        Dashboard::StudentHome => student_home::render(frame, app, area),
        Dashboard::Management => management::render(frame, app, area),
        Dashboard::SignIn => render_notice(
            frame,
            area,
            "Sign in to continue.",
            "Press [Enter] to open the sign-in form.",
        ),
        Dashboard::Unavailable => render_notice(
            frame,
            area,
            "There is no dashboard for your role yet.",
            "Ask an administrator to set your role, or press [o] to sign out.",
        ),
    }
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str, hint: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", message), styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled(format!("  {}", hint), styles::muted_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_dashboard() {
        Dashboard::Portfolio => "[n]ew | [e]ndorse | [/]search | [f]ilter | [r]efresh | [q]uit",
        Dashboard::Management => "[Tab] view | [Enter] assign | [/]filter | [r]efresh | [q]uit",
        Dashboard::AssessorQueue | Dashboard::StudentHome => "[r]efresh | [o] sign out | [q]uit",
        Dashboard::SignIn | Dashboard::Unavailable => "[o] sign out | [q]uit",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => match app.session.data {
            Some(ref data) if app.profile.is_some() => {
                format!(" Session expires in {} min ", data.minutes_until_expiry())
            }
            _ => " Not signed in ".to_string(),
        },
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(56, 28, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  RPL Portal", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-9", "Switch dashboards"),
        help_line("←/→", "Prev/next dashboard"),
        help_line("↑/↓", "Navigate list"),
        help_line("Esc", "Go back / clear search"),
        Line::from(""),
        Line::from(Span::styled(" Students", styles::highlight_style())),
        help_line("n", "Invite a new student"),
        help_line("e", "Endorse selected student to RTO"),
        help_line("/", "Search by name or qualification"),
        help_line("f", "Cycle status filter"),
        help_line("[ / ]", "Previous/next page"),
        Line::from(""),
        Line::from(Span::styled(" Management", styles::highlight_style())),
        help_line("Tab", "Switch assessors/students"),
        help_line("Enter", "Assign an RTO"),
        Line::from(""),
        Line::from(Span::styled(" General", styles::highlight_style())),
        help_line("r", "Refresh current dashboard"),
        help_line("o", "Sign out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// A `label: [value▌]` input line
pub fn input_line<'a>(label: &'a str, value: &str, width: usize, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    let shown: String = {
        let count = value.chars().count();
        value.chars().skip(count.saturating_sub(width)).collect()
    };
    Line::from(vec![
        Span::styled(format!("{}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = width), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(52, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  RPL Portal sign in", styles::title_style())),
        Line::from(""),
    ];

    let mut email = input_line(
        "Email:    ",
        &app.login_email,
        28,
        app.login_focus == LoginFocus::Email,
    );
    email.spans.insert(0, Span::raw("  "));
    lines.push(email);

    let masked = "*".repeat(app.login_password.chars().count().min(28));
    let mut password = input_line(
        "Password: ",
        &masked,
        28,
        app.login_focus == LoginFocus::Password,
    );
    password.spans.insert(0, Span::raw("  "));
    lines.push(password);

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    let label = if button_focused { " ▶ Sign in ◀ " } else { "   Sign in   " };
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
