use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use rplportal_core::models::ENDORSE_PROGRESS_THRESHOLD;
use rplportal_core::utils::format_date;

use crate::app::App;
use crate::ui::styles;

/// Render the My Enrollments tab for a signed-in student
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let items: Vec<ListItem> = app
        .my_enrollments
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(e.course.clone(), styles::list_item_style()),
                Span::styled(
                    format!("  {}", e.status.display_name()),
                    styles::status_style(e.status),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" My enrollments ({}) ", app.my_enrollments.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if !app.my_enrollments.is_empty() {
        state.select(Some(app.my_enrollment_selection));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let block = Block::default()
        .title(" Progress ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(enrollment) = app.my_enrollments.get(app.my_enrollment_selection) else {
        let text = Line::from(Span::styled(
            "You are not enrolled in any qualification yet.",
            styles::muted_style(),
        ));
        frame.render_widget(Paragraph::new(text).block(block), chunks[1]);
        return;
    };

    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let lines = vec![
        Line::from(Span::styled(enrollment.course.clone(), styles::title_style())),
        Line::from(vec![
            Span::styled("Enrolled:  ", styles::muted_style()),
            Span::raw(format_date(enrollment.enrolled_at.as_ref())),
        ]),
        Line::from(vec![
            Span::styled("Evidence:  ", styles::muted_style()),
            Span::raw(enrollment.evidence_count.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Assessor:  ", styles::muted_style()),
            Span::raw(enrollment.assigned_to.clone()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), rows[0]);

    let percent = enrollment.progress_percent();
    let gauge = Gauge::default()
        .gauge_style(styles::progress_style(percent, ENDORSE_PROGRESS_THRESHOLD))
        .percent(percent)
        .label(format!("{}%", percent));
    frame.render_widget(gauge, rows[1]);
}
