//! Invite-student overlay: contact fields, the RTO -> qualification -> stream
//! lists and the unit preview for the chosen offer.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use rplportal_core::enrollment::UnitPreview;

use crate::app::{App, EnrollFocus};
use crate::ui::render::{centered_rect_fixed, input_line};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let area = centered_rect_fixed(
        screen.width.saturating_sub(4).min(120),
        screen.height.saturating_sub(2).min(36),
        screen,
    );
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Invite student ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Contact
            Constraint::Min(4),    // RTOs
            Constraint::Min(4),    // Qualifications
            Constraint::Length(5), // Streams
            Constraint::Length(4), // Submit and errors
        ])
        .split(columns[0]);

    render_contact(frame, app, rows[0]);
    render_organizations(frame, app, rows[1]);
    render_offers(frame, app, rows[2]);
    render_streams(frame, app, rows[3]);
    render_submit(frame, app, rows[4]);
    render_preview(frame, &app.enrollment_form.selector.preview(), app, columns[1]);
}

fn render_contact(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.enrollment_form;
    let width = area.width.saturating_sub(18) as usize;
    let lines = vec![
        input_line(
            " Email:     ",
            &form.email,
            width,
            app.enroll_focus == EnrollFocus::Email,
        ),
        input_line(
            " Full name: ",
            &form.full_name,
            width,
            app.enroll_focus == EnrollFocus::FullName,
        ),
    ];
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// A selector list: the chosen entry marked, the cursor highlighted when
/// focused, or a single placeholder line.
fn render_choice_list(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    field: EnrollFocus,
    labels: Vec<(String, bool)>,
    placeholder: Option<Line<'static>>,
) {
    let focused = app.enroll_focus == field;
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(if focused {
            styles::highlight_style()
        } else {
            styles::muted_style()
        })
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if let Some(line) = placeholder {
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let items: Vec<ListItem> = labels
        .into_iter()
        .map(|(label, chosen)| {
            let marker = if chosen { "● " } else { "  " };
            let style = if chosen {
                styles::success_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(Span::styled(format!("{}{}", marker, label), style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.enroll_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn muted(text: &str) -> Option<Line<'static>> {
    Some(Line::from(Span::styled(format!(" {}", text), styles::muted_style())))
}

fn render_organizations(frame: &mut Frame, app: &App, area: Rect) {
    let selector = &app.enrollment_form.selector;
    let placeholder = if selector.organizations_loading() {
        muted("Loading RTOs...")
    } else if let Some(error) = selector
        .error()
        .filter(|_| selector.organizations().is_empty())
    {
        Some(Line::from(Span::styled(format!(" {}", error), styles::error_style())))
    } else if selector.organizations().is_empty() {
        muted("No RTOs available.")
    } else {
        None
    };

    let selected = selector.selected_org_id();
    let labels = selector
        .organizations()
        .iter()
        .map(|org| {
            let label = match org.code.as_deref() {
                Some(code) if org.name.is_some() => format!("{} ({})", org.display_name(), code),
                _ => org.display_name().to_string(),
            };
            (label, Some(org.id.as_str()) == selected)
        })
        .collect();

    render_choice_list(
        frame,
        app,
        area,
        "RTO",
        EnrollFocus::Organization,
        labels,
        placeholder,
    );
}

fn render_offers(frame: &mut Frame, app: &App, area: Rect) {
    let selector = &app.enrollment_form.selector;
    let placeholder = if selector.selected_org_id().is_none() {
        muted("Choose an RTO first.")
    } else if selector.is_loading_offers() {
        muted("Loading qualifications...")
    } else if selector.offers().is_empty() {
        match selector.error() {
            Some(error) => Some(Line::from(Span::styled(
                format!(" {}", error),
                styles::error_style(),
            ))),
            None => muted("No active offers for this RTO."),
        }
    } else {
        None
    };

    let selected = selector.selected_offer_id();
    let labels = selector
        .offers()
        .iter()
        .map(|offer| (offer.display_name(), Some(offer.id.as_str()) == selected))
        .collect();

    let title = match selector.selected_organization() {
        Some(org) => format!("Qualification at {}", org.display_name()),
        None => "Qualification".to_string(),
    };

    render_choice_list(
        frame,
        app,
        area,
        &title,
        EnrollFocus::Offer,
        labels,
        placeholder,
    );
}

fn render_streams(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.enrollment_form;
    let selector = &form.selector;
    let placeholder = if selector.selected_offer_id().is_none() {
        muted("Choose a qualification first.")
    } else if selector.is_loading_details() {
        muted("Loading streams...")
    } else if selector.streams().is_empty() {
        muted("This offer has no streams.")
    } else if !form.streams_supported {
        muted("Streams are not recorded on enrollments.")
    } else {
        None
    };

    let selected = selector.selected_stream_id();
    let labels = selector
        .streams()
        .iter()
        .map(|stream| (stream.name.clone(), Some(stream.id.as_str()) == selected))
        .collect();

    render_choice_list(
        frame,
        app,
        area,
        "Stream",
        EnrollFocus::Stream,
        labels,
        placeholder,
    );
}

fn render_submit(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.enrollment_form;
    let focused = app.enroll_focus == EnrollFocus::Submit;

    let label = if form.is_submitting() {
        "  Submitting...  "
    } else if focused {
        " ▶ Invite & enroll ◀ "
    } else {
        "   Invite & enroll   "
    };
    let style = if !form.can_submit() {
        styles::muted_style()
    } else if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(" ["),
        Span::styled(label, style),
        Span::raw("]"),
        Span::styled("   [Tab] next field  [Esc] close", styles::muted_style()),
    ])];

    // Selector load errors already show in their list
    if let Some(error) = form.error().filter(|e| Some(*e) != form.selector.error()) {
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_preview(frame: &mut Frame, preview: &UnitPreview, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Units ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let selector = &app.enrollment_form.selector;
    let mut lines = Vec::new();

    if selector.selected_offer_id().is_none() {
        lines.push(Line::from(Span::styled(
            "Choose a qualification to preview its units.",
            styles::muted_style(),
        )));
    } else if selector.is_loading_details() {
        lines.push(Line::from(Span::styled("Loading units...", styles::muted_style())));
    } else if preview.is_empty() {
        lines.push(Line::from(Span::styled(
            "No units listed for this offer.",
            styles::muted_style(),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled(format!("{} units", preview.total), styles::title_style()),
            Span::styled(
                format!("  {} core  {} elective", preview.core, preview.elective),
                styles::muted_style(),
            ),
        ]));

        for group in &preview.groups {
            lines.push(Line::from(""));
            let heading = if group.is_ungrouped() {
                "Ungrouped".to_string()
            } else {
                format!("Group {}", group.key)
            };
            lines.push(Line::from(Span::styled(heading, styles::highlight_style())));

            for unit in &group.units {
                let kind = if unit.is_core() {
                    "C"
                } else if unit.is_elective() {
                    "E"
                } else {
                    "-"
                };
                lines.push(Line::from(vec![
                    Span::styled(format!(" {} ", kind), styles::muted_style()),
                    Span::styled(format!("{:<11}", unit.unit_code()), styles::list_item_style()),
                    Span::raw(unit.unit_name().to_string()),
                ]));
                if let Some(notes) = unit.application_notes.as_deref().filter(|n| !n.is_empty()) {
                    lines.push(Line::from(Span::styled(
                        format!("     {}", notes),
                        styles::muted_style(),
                    )));
                }
            }
        }
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
