use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::app::App;

/// Label/entry pairs per row of the field grid; the grid wraps after this
/// many columns.
const FIELD_COLUMNS: usize = 3;
/// Height of one bordered entry block.
const FIELD_ROW_HEIGHT: u16 = 3;
/// Footer space reserved for the status line and the action bar.
const FOOTER_HEIGHT: u16 = 3;

/// Render the whole form: title, field grid, record list, footer. Pure
/// presentation; every mutation goes through the controller.
pub(crate) fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let field_rows = app.form.len().div_ceil(FIELD_COLUMNS).max(1);
    let fields_height = (field_rows as u16).saturating_mul(FIELD_ROW_HEIGHT);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(fields_height),
            Constraint::Min(3),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    draw_title(frame, chunks[0], app);
    draw_fields(frame, chunks[1], app);
    draw_record_list(frame, chunks[2], app);
    draw_footer(frame, chunks[3], app);
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = Paragraph::new(Line::from(Span::styled(
        app.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

/// One bordered block per column, laid out left to right and wrapping after
/// `FIELD_COLUMNS` pairs. The focused entry gets a yellow border.
fn draw_fields(frame: &mut Frame, area: Rect, app: &App) {
    let field_rows = app.form.len().div_ceil(FIELD_COLUMNS).max(1);
    let row_constraints = vec![Constraint::Length(FIELD_ROW_HEIGHT); field_rows];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    let column_constraints =
        vec![Constraint::Ratio(1, FIELD_COLUMNS as u32); FIELD_COLUMNS];

    for (row_idx, row_area) in rows.iter().enumerate() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(column_constraints.clone())
            .split(*row_area);
        for (col_idx, column_area) in columns.iter().enumerate() {
            let field_idx = row_idx * FIELD_COLUMNS + col_idx;
            if field_idx >= app.form.len() {
                continue;
            }
            let mut block = Block::default()
                .borders(Borders::ALL)
                .title(app.form.label(field_idx).to_string());
            if field_idx == app.form.active() {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }
            let entry = Paragraph::new(app.form.value_line(field_idx)).block(block);
            frame.render_widget(entry, *column_area);
        }
    }
}

fn draw_record_list(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.selection {
        Some(id) => format!("Records: {} (selected id {})", app.records.len(), id),
        None => format!("Records: {}", app.records.len()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.records.is_empty() {
        let message = Paragraph::new("No records to display.")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let items: Vec<ListItem> = app
        .records
        .iter()
        .map(|record| ListItem::new(record.summary()))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.cursor);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::TOP);
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let status_line = if let Some(status) = &app.status {
        Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
    } else {
        Line::from("")
    };

    let paragraph =
        Paragraph::new(vec![status_line, action_bar()]).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

/// The fixed action row, rendered as keyboard hints.
fn action_bar() -> Line<'static> {
    let actions = [
        ("^L", "View All"),
        ("^F", "Search"),
        ("^N", "Add New"),
        ("^U", "Update"),
        ("^D", "Delete"),
        ("Esc", "Clear"),
        ("^Q", "Close"),
    ];

    let mut spans = Vec::with_capacity(actions.len() * 3 + 2);
    for (key, label) in actions {
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {label}  ")));
    }
    spans.push(Span::styled(
        "[Tab]",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" Next Field"));
    Line::from(spans)
}
