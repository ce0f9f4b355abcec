use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use rplportal_core::utils::or_placeholder;

use crate::app::{App, AppState, ManagementView};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

/// Render the Management tab: assessors or students with their RTO
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let mut spans = vec![Span::raw(" ")];
    for (i, view) in [ManagementView::Assessors, ManagementView::Students]
        .iter()
        .enumerate()
    {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            view.title(),
            styles::tab_style(*view == app.management_view),
        ));
    }
    let filtering = app.state == AppState::Searching;
    if filtering || !app.management_filter.is_empty() {
        let cursor = if filtering { "▌" } else { "" };
        spans.push(Span::styled("   Filter: ", styles::muted_style()));
        spans.push(Span::styled(
            format!("{}{}", app.management_filter, cursor),
            styles::search_style(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let rows_data = app.management_rows();
    let header = Row::new(vec![Cell::from("Name"), Cell::from("Email"), Cell::from("RTO")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|row| {
            let org = match row.organization_name() {
                Some(name) => Span::styled(name.to_string(), styles::list_item_style()),
                None => Span::styled("Unassigned", styles::muted_style()),
            };
            Row::new(vec![
                Cell::from(or_placeholder(row.person_name())),
                Cell::from(or_placeholder(row.person_email())),
                Cell::from(org),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(35),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    " {} ({}) ",
                    app.management_view.title(),
                    rows_data.len()
                ))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !rows_data.is_empty() {
        state.select(Some(app.management_selection));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);
}

/// RTO picker overlay. The first row clears the assignment.
pub fn render_picker(frame: &mut Frame, app: &App) {
    let height = (app.management_orgs.len() as u16 + 5).min(20);
    let area = centered_rect_fixed(50, height, frame.area());
    frame.render_widget(Clear, area);

    let person = app
        .management_rows()
        .get(app.management_selection)
        .map(|row| or_placeholder(row.person_name()))
        .unwrap_or_default();

    let mut items = vec![ListItem::new(Line::from(Span::styled(
        "Unassigned",
        styles::muted_style(),
    )))];
    items.extend(app.management_orgs.iter().map(|org| {
        ListItem::new(Line::from(Span::styled(
            org.display_name().to_string(),
            styles::list_item_style(),
        )))
    }));

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Assign RTO: {} ", person))
                .title_style(styles::title_style())
                .title_bottom(Line::from(Span::styled(
                    " [Enter] assign  [Esc] cancel ",
                    styles::muted_style(),
                )))
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    state.select(Some(app.org_picker_selection));
    frame.render_stateful_widget(list, area, &mut state);
}
