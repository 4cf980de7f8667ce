//! TUI rendering.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::app::{App, Mode};
use super::select::{MenuRow, SelectionMenu};
use super::theme::Theme;
use crate::text::truncate;

/// Below this width the command column is dropped.
const NARROW_WIDTH: u16 = 70;

pub fn draw(f: &mut Frame, app: &App, theme: &Theme) {
    let show_filter = *app.mode() == Mode::Filtering || !app.filter().is_empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                               // Title
            Constraint::Length(if show_filter { 1 } else { 0 }), // Filter
            Constraint::Length(1),                               // Status
            Constraint::Min(3),                                  // Table
            Constraint::Length(1),                               // Help
        ])
        .split(f.area());

    draw_title(f, app, theme, chunks[0]);
    if show_filter {
        draw_filter(f, app, theme, chunks[1]);
    }
    draw_status(f, app, theme, chunks[2]);
    draw_table(f, app, theme, chunks[3]);
    draw_help(f, app, theme, chunks[4]);
}

fn draw_title(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let freshness = if app.is_scanning() {
        "scanning…".to_string()
    } else {
        match app.last_scan() {
            Some(at) => format!("last scan {}", at.format("%H:%M:%S")),
            None => "never scanned".to_string(),
        }
    };

    let title = Line::from(vec![
        Span::styled(" 🚢 PORTMAN - Port Manager ", theme.title),
        Span::styled(format!(" {}", freshness), theme.muted),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn draw_filter(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let cursor = if *app.mode() == Mode::Filtering { "_" } else { "" };
    let line = Line::from(vec![
        Span::styled(" Filter: ", theme.filter),
        Span::raw(format!("{}{}", app.filter(), cursor)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_status(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(status) = app.status() else {
        return;
    };
    let line = Span::styled(format!(" {}", status.text), theme.status(status.is_error));
    f.render_widget(Paragraph::new(line), area);
}

fn draw_table(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let view = app.view();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(format!(" {} of {} ports ", view.len(), app.ports().len()));

    if view.is_empty() {
        let empty = Paragraph::new(Span::styled("No ports found", theme.muted)).block(block);
        f.render_widget(empty, area);
        return;
    }

    let (width, _) = app.size();
    let with_command = width == 0 || width >= NARROW_WIDTH;

    let mut titles = vec!["PORT", "PROTOCOL", "PID", "PROCESS"];
    let mut widths = vec![
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(20),
    ];
    if with_command {
        titles.push("COMMAND");
        widths.push(Constraint::Min(10));
    }

    let header = Row::new(titles.into_iter().map(|t| Cell::from(t).style(theme.header)))
        .height(1);

    let rows = view.iter().map(|port| {
        let mut cells = vec![
            Cell::from(port.port.to_string()),
            Cell::from(port.protocol.clone()),
            Cell::from(port.pid.to_string()),
            Cell::from(truncate(&port.process_name, 20)),
        ];
        if with_command {
            cells.push(Cell::from(port.command.clone()));
        }
        Row::new(cells).style(theme.row)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme.selected_row)
        .highlight_symbol("▸ ");

    let mut state = TableState::default().with_selected(Some(app.selected()));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_help(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let help = match app.mode() {
        Mode::Filtering => "Enter: apply filter • Esc: cancel",
        Mode::ConfirmingKill { .. } => "y: confirm kill • n: cancel",
        Mode::Browsing => "↑/↓ j/k: navigate • Enter: kill • r: refresh • /: filter • q: quit",
    };
    f.render_widget(Paragraph::new(Span::styled(format!(" {}", help), theme.help)), area);
}

// ============================================================================
// Selection menu
// ============================================================================

/// Lines the inline chooser needs: title, gap, header, candidates, gap,
/// two action rows, gap, help.
pub fn selection_height(menu: &SelectionMenu) -> u16 {
    u16::try_from(menu.row_count() + 6).unwrap_or(u16::MAX)
}

pub fn draw_selection(f: &mut Frame, menu: &SelectionMenu, theme: &Theme) {
    let mut lines = vec![
        Line::styled(
            format!(" 🔍 Select processes to kill on port {}", menu.port()),
            theme.title,
        ),
        Line::default(),
        Line::styled(
            format!("  {:<8} {:<10} {:<8} {:<20}", "SELECT", "PORT", "PID", "PROCESS"),
            theme.header,
        ),
    ];

    for row in 0..menu.row_count() {
        let focused = row == menu.cursor();
        let marker = if focused { "▸ " } else { "  " };
        let style = if focused { theme.selected_row } else { theme.row };

        let line = match menu.row_at(row) {
            MenuRow::Candidate(i) => {
                let candidate = &menu.candidates()[i];
                let checkbox = if menu.is_checked(i) {
                    Span::styled("[✓]", theme.check)
                } else {
                    Span::raw("[ ]")
                };
                Line::from(vec![
                    Span::styled(marker, style),
                    checkbox,
                    Span::styled(
                        format!(
                            "      {:<10} {:<8} {:<20}",
                            candidate.port,
                            candidate.pid,
                            truncate(&candidate.process_name, 20)
                        ),
                        style,
                    ),
                ])
            }
            MenuRow::KillAll => Line::styled(format!("{}Kill all selected", marker), style),
            MenuRow::Cancel => Line::styled(format!("{}Cancel", marker), style),
        };

        if row == menu.candidates().len() {
            lines.push(Line::default());
        }
        lines.push(line);
    }

    lines.push(Line::default());
    lines.push(Line::styled(
        " ↑/↓ j/k: navigate • Space: toggle • Enter: confirm • q/Esc: cancel",
        theme.help,
    ));

    f.render_widget(Paragraph::new(lines), f.area());
}
