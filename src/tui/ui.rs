use ratatui::prelude::*;
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Cell, Clear, List, ListItem, Paragraph, Row, Table,
};
use crate::tui::app::{App, Focus, InputMode};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 16 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Weights/Table(fill) + Charts(12) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Title bar
        Constraint::Fill(1),    // Weights panel + score table
        Constraint::Length(12), // Charts
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    let body = Layout::horizontal([Constraint::Length(38), Constraint::Fill(1)]).split(chunks[1]);
    let charts =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(chunks[2]);

    render_title(frame, chunks[0], app);
    render_weights(frame, body[0], app);
    render_table(frame, body[1], app);
    render_rating_chart(frame, charts[0], app);
    render_industry_chart(frame, charts[1], app);
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::Help => render_help_popup(frame, app),
        InputMode::ModelPicker => render_model_picker(frame, app),
        InputMode::Normal => {}
    }

    // Loading overlay appears on top of everything
    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn panel(title: &str, focused: bool, app: &App) -> Block<'static> {
    let style = if focused {
        app.theme.panel_focused
    } else {
        app.theme.panel_unfocused
    };
    Block::bordered()
        .title(format!(" {} ", title))
        .border_style(style)
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let left = format!("Ethics Grade: {}", app.session.model_name());
    let mut spans = vec![Span::styled(
        left.clone(),
        Style::default().fg(app.theme.title_color).bold(),
    )];

    let mut right_len = 0;
    let mut right = Vec::new();
    if app.session.is_read_only() {
        let text = " [read-only]";
        right_len += text.len();
        right.push(Span::styled(text, Style::default().fg(app.theme.read_only)));
    } else if app.session.is_modified() {
        let text = " [modified]";
        right_len += text.len();
        right.push(Span::styled(text, Style::default().fg(app.theme.gauge_modified)));
    }
    let fetched = format!(
        "  data {}",
        app.fetched_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
    );
    right_len += fetched.len();
    right.push(Span::styled(fetched, Style::default().fg(app.theme.muted)));

    let padding_len = (area.width as usize).saturating_sub(left.chars().count() + right_len);
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.extend(right);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn weight_gauge(weight: f64, width: usize, color: Color, empty: Color) -> Vec<Span<'static>> {
    let filled = ((weight / 100.0).clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(color)));
    }
    if width > filled {
        spans.push(Span::styled("░".repeat(width - filled), Style::default().fg(empty)));
    }
    spans
}

fn render_weights(frame: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .session
        .rubric()
        .sections()
        .iter()
        .map(|section| {
            let weight = app.session.weights().get(&section.name).unwrap_or(section.weight);
            let color = if weight != section.weight {
                app.theme.gauge_modified
            } else {
                app.theme.gauge_filled
            };
            let mut spans = vec![Span::raw(format!("{:<14} ", truncate(&section.name, 14)))];
            spans.extend(weight_gauge(weight, 10, color, app.theme.gauge_empty));
            spans.push(Span::styled(
                format!(" {:>5.1}", weight),
                Style::default().fg(color),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(panel("Section weights", app.focus == Focus::Weights, app))
        .highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(list, area, &mut app.weights_state);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let title = format!("Scores ({})", app.table_sort.label());
    let block = panel(&title, app.focus == Focus::Table, app);

    if app.table.is_empty() {
        let empty_msg = Paragraph::new("No companies to score")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty_msg, area);
        return;
    }

    let section_widths: Vec<u16> = app
        .table
        .section_names()
        .iter()
        .map(|name| name.chars().count().clamp(8, 12) as u16)
        .collect();

    let mut header = vec![
        Cell::from("#"),
        Cell::from("Company"),
        Cell::from("Industry"),
    ];
    for (name, width) in app.table.section_names().iter().zip(&section_widths) {
        header.push(Cell::from(
            Line::from(truncate(name, *width as usize)).alignment(Alignment::Right),
        ));
    }
    header.push(Cell::from(Line::from("Total").alignment(Alignment::Right)));
    header.push(Cell::from("Rating"));

    let rows: Vec<Row> = app
        .table
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(app.theme.index_color)),
                Cell::from(row.company.clone()),
                Cell::from(row.industry.clone()),
            ];
            for score in &row.sections {
                cells.push(Cell::from(
                    Line::from(format!("{:.4}", score)).alignment(Alignment::Right),
                ));
            }
            cells.push(Cell::from(
                Line::from(format!("{:.4}", row.total)).alignment(Alignment::Right).bold(),
            ));
            cells.push(Cell::from(Span::styled(
                row.rating.label(),
                Style::default().fg(app.theme.rating_color(row.rating)).bold(),
            )));

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(app.theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let mut widths = vec![
        Constraint::Length(4),
        Constraint::Fill(2),
        Constraint::Fill(1),
    ];
    widths.extend(section_widths.iter().map(|w| Constraint::Length(*w)));
    widths.push(Constraint::Length(8));
    widths.push(Constraint::Length(6));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(app.theme.header_style).bottom_margin(1))
        .block(block)
        .row_highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_rating_chart(frame: &mut Frame, area: Rect, app: &App) {
    let bars: Vec<Bar> = app
        .table
        .rating_distribution()
        .into_iter()
        .map(|(rating, count)| {
            let color = app.theme.rating_color(rating);
            Bar::default()
                .value(count as u64)
                .label(Line::from(rating.label()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::bordered().title(" Companies per rating "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

fn render_industry_chart(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered().title(" Average total per industry ");
    let averages = app.table.industry_averages();
    if averages.is_empty() {
        frame.render_widget(Paragraph::new("No data").block(block), area);
        return;
    }

    let bars: Vec<Bar> = averages
        .iter()
        .map(|(industry, average)| {
            Bar::default()
                .value((average * 100.0).round() as u64)
                .text_value(format!("{:.4}", average))
                .label(Line::from(truncate(industry, 16)))
                .style(Style::default().fg(app.theme.industry_bar))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0);

    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Error") {
            app.theme.flash_error
        } else if msg.starts_with("Saved")
            || msg.starts_with("Refreshed")
            || msg.starts_with("Switched")
        {
            app.theme.flash_success
        } else {
            Color::White
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else if let Some(ref error) = app.score_error {
        Line::from(Span::styled(
            format!("Scoring failed: {}", error),
            Style::default().fg(app.theme.flash_error),
        ))
    } else {
        let diagnostics = &app.diagnostics;
        let mut summary = format!("{} companies", app.table.len());
        if diagnostics.unknown_question_refs > 0 {
            summary.push_str(&format!(", {} unknown refs", diagnostics.unknown_question_refs));
        }
        if !diagnostics.name_collisions.is_empty() {
            summary.push_str(&format!(", {} name collisions", diagnostics.name_collisions.len()));
        }

        // Build hints with colored shortcut keys
        let hints = [
            ("h/l", ":±1 "),
            ("H/L", ":±5 "),
            ("0", ":reset "),
            ("Tab", ":focus "),
            ("m", ":model "),
            ("o", ":sort "),
            ("s", ":save "),
            ("r", ":refresh "),
            ("?", ":help "),
            ("q", ":quit"),
        ];
        let mut spans = vec![
            Span::styled(summary, Style::default().fg(app.theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(app.theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(app.theme.status_bar_bg)),
        area,
    );
}

fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 1 {
        format!("{}…", chars[..max_width - 1].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(52, 18, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(Span::styled(" Keyboard Shortcuts ", app.theme.popup_title));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(Color::Cyan).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("Tab           ", "Switch weights / table focus"),
        ("l / Right     ", "Raise selected weight by 1"),
        ("h / Left      ", "Lower selected weight by 1"),
        ("L / H         ", "Raise / lower by 5"),
        ("0             ", "Reset weights to model defaults"),
        ("m             ", "Choose another model"),
        ("o             ", "Sort by total / industry, rating"),
        ("s             ", "Save weights to this model"),
        ("r             ", "Refresh data"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];
    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, action)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*action)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

fn render_model_picker(frame: &mut Frame, app: &mut App) {
    let height = (app.models.len() as u16).saturating_add(4).min(18);
    let popup_area = centered_rect_fixed(44, height, frame.area());
    frame.render_widget(Clear, popup_area);

    let current = app.session.model_name().to_string();
    let items: Vec<ListItem> = app
        .models
        .iter()
        .map(|model| {
            if *model == current {
                ListItem::new(Line::from(vec![
                    Span::raw(truncate(model, 30)),
                    Span::styled(" (current)", Style::default().fg(app.theme.muted)),
                ]))
            } else {
                ListItem::new(truncate(model, 40))
            }
        })
        .collect();

    let block = Block::bordered()
        .title(Span::styled(" Rating model ", app.theme.popup_title))
        .title_bottom(Line::from(" Enter: load  Esc: cancel ").centered());
    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(list, popup_area, &mut app.model_state);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let loading_text = Paragraph::new(format!("{} Loading...", spinner))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(loading_text, inner);
}
