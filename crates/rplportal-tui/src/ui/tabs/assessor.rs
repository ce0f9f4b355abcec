use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use rplportal_core::utils::format_date;

use crate::app::App;
use crate::ui::styles;

/// Render the Assessment Queue tab: endorsed students at the assessor's RTO
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Qualification"),
        Cell::from("Evidence"),
        Cell::from("Enrolled"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .assessor_queue
        .iter()
        .map(|student| {
            Row::new(vec![
                Cell::from(student.name.clone()),
                Cell::from(student.email.clone()),
                Cell::from(student.course.clone()),
                Cell::from(format!("{:>4}", student.evidence_count)),
                Cell::from(format_date(student.enrolled_at.as_ref())),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(22),
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Length(9),
        Constraint::Length(13),
    ];

    let mut table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Endorsed students ({}) ", app.assessor_queue.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    if app.assessor_queue.is_empty() {
        table = table.footer(Row::new(vec![Cell::from(Span::styled(
            "No students waiting for assessment.",
            styles::muted_style(),
        ))]));
    }

    let mut state = TableState::default();
    if !app.assessor_queue.is_empty() {
        state.select(Some(app.assessor_selection));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
