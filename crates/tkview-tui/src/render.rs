//! Drawing the dashboard from a session snapshot.
//!
//! Rendering is a pure function of [`Snapshot`]: nothing here mutates state
//! or triggers fetches.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::session::Snapshot;
use crate::view::Pane;

/// Height of the environments/agents row.
const TOP_PANE_HEIGHT: u16 = 10;

const HEADER_COLOR: Color = Color::Cyan;
const BORDER_DIM: Color = Color::DarkGray;
const TEXT: Color = Color::White;
const TEXT_DIM: Color = Color::Gray;
const HOTKEY: Color = Color::Yellow;
const ERROR: Color = Color::Red;

/// Format a timestamp for display relative to `now`.
///
/// Today's timestamps show only the time; older ones include the date.
/// A missing timestamp renders as `-`.
pub fn format_time<Tz>(timestamp: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };

    let local = timestamp.with_timezone(&now.timezone());
    let pattern = if local.date_naive() == now.date_naive() {
        "%H:%M %Z"
    } else {
        "%d %b %y %H:%M %Z"
    };
    local.format(pattern).to_string()
}

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, snapshot: &Snapshot<'_>) {
    let area = frame.area();
    let now = Local::now();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TOP_PANE_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_environments(frame, top[0], snapshot);
    draw_agents(frame, top[1], snapshot, &now);
    draw_workflows(frame, chunks[1], snapshot, &now);
    draw_footer(frame, chunks[2], snapshot);

    if snapshot.show_help {
        draw_help_overlay(frame, area);
    }
}

fn pane_block(pane: Pane, focus: Pane) -> Block<'static> {
    let focused = pane == focus;
    let (border_style, border_type) = if focused {
        (Style::default().fg(HEADER_COLOR), BorderType::Double)
    } else {
        (Style::default().fg(BORDER_DIM), BorderType::Plain)
    };
    let title_style = if focused {
        Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", pane.hotkey_title()), title_style))
}

fn placeholder(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(TEXT_DIM)))
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Black).bg(HEADER_COLOR)
    } else {
        Style::default().fg(TEXT)
    }
}

/// Scroll offset that keeps `selected` within a pane of `height` lines.
fn scroll_offset(selected: Option<usize>, height: u16) -> u16 {
    let height = usize::from(height.max(1));
    let offset = selected.map_or(0, |line| (line + 1).saturating_sub(height));
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn draw_environments(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>) {
    let mut lines = Vec::new();
    let mut selected_line = None;

    if snapshot.organisations.is_empty() && snapshot.loading.organisations {
        lines.push(placeholder("Loading organisations..."));
    } else if snapshot.is_tree_empty() {
        lines.push(placeholder("No environments found"));
    }

    for node in snapshot.organisations {
        lines.push(Line::from(Span::styled(
            node.organisation.name.clone(),
            Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD),
        )));

        let count = node.environments.len();
        for (idx, env) in node.environments.iter().enumerate() {
            let branch = if idx + 1 == count { "└─ " } else { "├─ " };
            let selected = snapshot.current_environment == Some(&env.id);
            if selected {
                selected_line = Some(lines.len());
            }
            lines.push(Line::from(vec![
                Span::styled(branch, Style::default().fg(BORDER_DIM)),
                Span::styled(env.name.clone(), selected_style(selected)),
            ]));
        }
    }

    let offset = scroll_offset(selected_line, area.height.saturating_sub(2));
    let pane = Paragraph::new(lines)
        .block(pane_block(Pane::Environments, snapshot.focus))
        .scroll((offset, 0));
    frame.render_widget(pane, area);
}

fn draw_agents<Tz>(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let block = pane_block(Pane::Agents, snapshot.focus);

    if snapshot.agents.is_empty() {
        let text = if snapshot.loading.agents {
            "Loading agents..."
        } else {
            "No agents"
        };
        frame.render_widget(Paragraph::new(placeholder(text)).block(block), area);
        return;
    }

    let header = Row::new(["Name", "Type", "Version", "Last seen"])
        .style(Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD));
    let rows = snapshot.agents.iter().map(|agent| {
        Row::new(vec![
            Cell::from(agent.name.clone()),
            Cell::from(agent.agent_type.clone()),
            Cell::from(agent.version.clone()),
            Cell::from(format_time(agent.last_seen, now)),
        ])
        .style(Style::default().fg(TEXT))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(35),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn draw_workflows<Tz>(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>, now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = Vec::new();
    let mut selected_line = None;

    if snapshot.workflows.is_empty() {
        let text = if snapshot.current_environment.is_none() {
            "Select an environment"
        } else if snapshot.loading.workflows {
            "Loading workflows..."
        } else {
            "No workflows"
        };
        lines.push(placeholder(text));
    }

    for node in snapshot.workflows {
        let workflow = &node.workflow;
        let expanded = snapshot.is_expanded(&workflow.id);
        let selected = snapshot.current_workflow == Some(&workflow.id);
        if selected {
            selected_line = Some(lines.len());
        }

        let marker = if expanded { "▾ " } else { "▸ " };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(BORDER_DIM)),
            Span::raw(format!("{} ", workflow.last_execution_status.glyph())),
            Span::styled(
                format!("{:<20} ", format_time(workflow.last_execution_at, now)),
                Style::default().fg(TEXT_DIM),
            ),
            Span::styled(workflow.name.clone(), selected_style(selected)),
        ]));

        if !expanded {
            continue;
        }
        if node.executions.is_empty() {
            lines.push(Line::from(Span::styled(
                "    └─ no executions",
                Style::default().fg(TEXT_DIM),
            )));
            continue;
        }
        let count = node.executions.len();
        for (idx, execution) in node.executions.iter().enumerate() {
            let branch = if idx + 1 == count { "    └─ " } else { "    ├─ " };
            lines.push(Line::from(vec![
                Span::styled(branch, Style::default().fg(BORDER_DIM)),
                Span::raw(format!("{} ", execution.status.glyph())),
                Span::styled(
                    format!("{:<20} ", format_time(execution.started_at, now)),
                    Style::default().fg(TEXT_DIM),
                ),
                Span::styled(execution.name.clone(), Style::default().fg(TEXT)),
            ]));
        }
    }

    let offset = scroll_offset(selected_line, area.height.saturating_sub(2));
    let pane = Paragraph::new(lines)
        .block(pane_block(Pane::Workflows, snapshot.focus))
        .scroll((offset, 0));
    frame.render_widget(pane, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, snapshot: &Snapshot<'_>) {
    let hotkey_style = Style::default().fg(HOTKEY);
    let hints = Line::from(vec![
        Span::styled("[e/a/w]", hotkey_style),
        Span::raw("Focus "),
        Span::styled("[↑↓]", hotkey_style),
        Span::raw("Move "),
        Span::styled("[Enter]", hotkey_style),
        Span::raw("Expand "),
        Span::styled("[r]", hotkey_style),
        Span::raw("Refresh "),
        Span::styled("[?]", hotkey_style),
        Span::raw("Help "),
        Span::styled("[q]", hotkey_style),
        Span::raw("Quit"),
    ]);

    let status = match snapshot.last_error {
        Some(notice) => {
            let mut text = notice.message.clone();
            if let Some(guidance) = notice.guidance {
                text.push_str(" - ");
                text.push_str(guidance);
            }
            Line::from(Span::styled(text, Style::default().fg(ERROR)))
        }
        None if snapshot.loading.any() => placeholder("Loading..."),
        None => Line::default(),
    };

    let (width, height) = snapshot.size;
    let dims_text = format!("{width}x{height}");
    let footer = Paragraph::new(vec![status, hints])
        .style(Style::default().fg(TEXT_DIM))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(Span::styled(dims_text, Style::default().fg(BORDER_DIM)))
                .title_alignment(Alignment::Right),
        );

    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay_width = 52.min(area.width.saturating_sub(4));
    let overlay_height = 18.min(area.height.saturating_sub(4));
    let overlay_x = (area.width - overlay_width) / 2;
    let overlay_y = (area.height - overlay_height) / 2;

    let overlay_area = Rect::new(overlay_x, overlay_y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let help_text = "\
TKView Key Reference

Panes:
  e        Environments
  a        Agents
  w        Workflows
  Tab      Next pane
  Shift+Tab Previous pane

Navigation:
  ↓ j      Next item
  ↑ k      Previous item
  Enter    Expand / collapse workflow

General:
  r        Refresh
  Esc      Dismiss error
  q Ctrl+C Quit

Press any key to close this help.";

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(TEXT))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(HEADER_COLOR))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(HEADER_COLOR).add_modifier(Modifier::BOLD),
                ))
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, overlay_area);
}
