use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
    Frame,
};

use rplportal_core::models::{StudentSummary, ENDORSE_PROGRESS_THRESHOLD};
use rplportal_core::students::{page_window, PageItem};
use rplportal_core::utils::{format_date, or_placeholder, truncate};

use crate::app::{App, AppState};
use crate::ui::styles;

/// Render the Students tab: search bar, paged table, detail panel and pager
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search and filter
            Constraint::Min(6),    // Table and detail
            Constraint::Length(1), // Pager
        ])
        .split(area);

    render_search_bar(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_table(frame, app, body[0]);
    render_detail(frame, app.selected_student(), body[1]);
    render_pager(frame, app, chunks[2]);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let searching = app.state == AppState::Searching;
    let search_text = if searching {
        format!("{}▌", app.search_input)
    } else if app.student_query.search.is_empty() {
        "press / to search".to_string()
    } else {
        app.student_query.search.clone()
    };
    let search_style = if searching || !app.student_query.search.is_empty() {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let line = Line::from(vec![
        Span::styled(" Search: ", styles::muted_style()),
        Span::styled(search_text, search_style),
        Span::styled("   Status: ", styles::muted_style()),
        Span::styled(app.student_query.status.label(), styles::highlight_style()),
        Span::styled(" [f]", styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Qualification"),
        Cell::from("Status"),
        Cell::from("Prog"),
        Cell::from("Assigned"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .students
        .iter()
        .map(|student| {
            Row::new(vec![
                Cell::from(student.name.clone()),
                Cell::from(student.course.clone()),
                Cell::from(Span::styled(
                    student.status.display_name(),
                    styles::status_style(student.status),
                )),
                Cell::from(format!("{:>3}%", student.progress_percent())),
                Cell::from(student.assigned_to.clone()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(26),
        Constraint::Fill(3),
        Constraint::Length(10),
        Constraint::Length(5),
        Constraint::Fill(2),
    ];

    let title = if app.students_loading {
        " Students (loading...) ".to_string()
    } else {
        format!(" Students ({}) ", app.students_total)
    };

    let mut table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    if app.students.is_empty() && !app.students_loading {
        let message = if app.student_query.search_term().is_some() {
            "No students match your search."
        } else {
            "No students found."
        };
        table = table.footer(Row::new(vec![Cell::from(Span::styled(
            message,
            styles::muted_style(),
        ))]));
    }

    let mut state = TableState::default();
    if !app.students.is_empty() {
        state.select(Some(app.student_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, selected: Option<&StudentSummary>, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(student) = selected else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No student selected",
                styles::muted_style(),
            )))
            .block(block),
            area,
        );
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1), Constraint::Length(2)])
        .split(inner);

    let width = inner.width.saturating_sub(12) as usize;
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, styles::muted_style()),
            Span::raw(truncate(&value, width)),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(student.name.clone(), styles::title_style())),
        Line::from(""),
        field("Email:     ", student.email.clone()),
        field("Course:    ", student.course.clone()),
        field("Enrolled:  ", format_date(student.enrolled_at.as_ref())),
        field("Evidence:  ", student.evidence_count.to_string()),
        field("Assigned:  ", student.assigned_to.clone()),
        field("Company:   ", or_placeholder(student.company_id.as_deref())),
    ];
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    let percent = student.progress_percent();
    let gauge = Gauge::default()
        .gauge_style(styles::progress_style(percent, ENDORSE_PROGRESS_THRESHOLD))
        .percent(percent)
        .label(format!("{}% complete", percent));
    frame.render_widget(gauge, chunks[1]);

    let hint = if student.can_endorse() {
        Span::styled(" Ready to endorse: press [e]", styles::success_style())
    } else {
        Span::styled(
            format!(" {}", student.status.display_name()),
            styles::status_style(student.status),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), chunks[2]);
}

fn render_pager(frame: &mut Frame, app: &App, area: Rect) {
    let pages = app.total_student_pages();
    if pages == 0 {
        return;
    }
    let current = app.student_query.page;

    let mut spans = vec![Span::styled(" ‹ [ ", styles::muted_style())];
    for item in page_window(current, pages) {
        match item {
            PageItem::Page(p) if p == current => {
                spans.push(Span::styled(format!("[{}]", p), styles::tab_style(true)));
            }
            PageItem::Page(p) => spans.push(Span::raw(format!(" {} ", p))),
            PageItem::Ellipsis => spans.push(Span::styled(" … ", styles::muted_style())),
        }
    }
    spans.push(Span::styled(" ] ›", styles::muted_style()));

    let (from, to) = app.student_query.range();
    let shown_to = (to + 1).min(app.students_total);
    spans.push(Span::styled(
        format!(
            "   Showing {}-{} of {}",
            (from + 1).min(shown_to),
            shown_to,
            app.students_total
        ),
        styles::muted_style(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
