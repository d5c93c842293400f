use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use super::app::{App, Overlay, Tab};
use crate::assistant::Role;
use crate::dashboard::DashboardSummary;
use crate::error::Field;
use crate::form::{CandidateForm, FIELDS};
use crate::models::Status;
use crate::storage::KeyValueStorage;

pub fn draw<S: KeyValueStorage>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" VertexHire · AI-Powered Consultancy Agent "),
        )
        .select(app.tab.index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    match app.tab {
        Tab::Dashboard => draw_dashboard(frame, app, chunks[1]),
        Tab::Candidates => draw_candidates(frame, app, chunks[1]),
        Tab::Assistant => draw_assistant(frame, app, chunks[1]),
    }

    let help = match (&app.overlay, app.tab) {
        (Overlay::Form(_), _) => " tab/↑↓:field  ←→:status  enter:save  esc:cancel",
        (Overlay::StatusPicker { .. }, _) => " ↑↓:choose  enter:apply  esc:cancel",
        (Overlay::ConfirmDelete, _) => " y:delete  any other key:cancel",
        (Overlay::None, Tab::Candidates) => {
            " j/k:navigate  s:status  a:add  e:edit  d:delete  tab:switch view  q:quit"
        }
        (Overlay::None, Tab::Assistant) => " enter:send  tab:switch view  esc:quit",
        (Overlay::None, Tab::Dashboard) => " 1/2/3 or tab:switch view  q:quit",
    };
    let footer = match &app.flash {
        Some(msg) => format!("{}  | {}", help, msg),
        None => help.to_string(),
    };
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );

    match &app.overlay {
        Overlay::None => {}
        Overlay::StatusPicker { selected } => draw_status_picker(frame, *selected),
        Overlay::ConfirmDelete => draw_confirm(frame, app),
        Overlay::Form(form) => draw_form(frame, form),
    }
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::New => Color::Blue,
        Status::Screening => Color::Yellow,
        Status::Interview => Color::Magenta,
        Status::Offer => Color::LightRed,
        Status::Hired => Color::Green,
        Status::Rejected => Color::DarkGray,
    }
}

fn draw_dashboard<S: KeyValueStorage>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let summary = DashboardSummary::build(app.store.candidates(), app.store.now());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(2 + 3 * summary.pipeline.len() as u16),
            Constraint::Min(0),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    let figures = [
        ("Total Candidates", summary.counts.total, Color::Blue),
        ("New Applications", summary.counts.new, Color::Yellow),
        ("In Interview", summary.counts.interview, Color::Magenta),
        ("Hired", summary.counts.hired, Color::Green),
    ];
    for ((label, value, color), card) in figures.into_iter().zip(cards.iter()) {
        let text = Text::from(vec![Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))]);
        let widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", label)));
        frame.render_widget(widget, *card);
    }

    let pipeline_block = Block::default().borders(Borders::ALL).title(" Pipeline Overview ");
    let inner = pipeline_block.inner(rows[1]);
    frame.render_widget(pipeline_block, rows[1]);
    let bars = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); summary.pipeline.len()])
        .split(inner);
    for (share, bar) in summary.pipeline.iter().zip(bars.iter()) {
        let gauge = Gauge::default()
            .block(Block::default().title(format!("{} ({})", share.status.label(), share.count)))
            .gauge_style(Style::default().fg(status_color(share.status)))
            .ratio((share.percentage / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.0}%", share.percentage));
        frame.render_widget(gauge, *bar);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let recent: Vec<ListItem> = if summary.recent.is_empty() {
        vec![ListItem::new("No recent candidates")]
    } else {
        summary
            .recent
            .iter()
            .map(|c| {
                ListItem::new(Line::from(vec![
                    Span::styled(c.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("  {}  ", c.position)),
                    Span::styled(c.status.to_string(), Style::default().fg(status_color(c.status))),
                    Span::styled(
                        format!("  {}", c.applied_local().format("%b %-d")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect()
    };
    frame.render_widget(
        List::new(recent).block(Block::default().borders(Borders::ALL).title(" Recent Applications ")),
        columns[0],
    );

    let attention: Vec<ListItem> = if summary.attention.is_empty() {
        vec![ListItem::new("All caught up! No candidates need attention.")]
    } else {
        summary
            .attention
            .iter()
            .map(|item| {
                ListItem::new(Line::from(vec![
                    Span::styled(item.candidate.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("  {}  ", item.candidate.position)),
                    Span::styled(
                        format!("{}d ago", item.days_since_contact),
                        Style::default().fg(Color::LightRed),
                    ),
                ]))
            })
            .collect()
    };
    frame.render_widget(
        List::new(attention).block(Block::default().borders(Borders::ALL).title(" Needs Attention ")),
        columns[1],
    );
}

fn draw_candidates<S: KeyValueStorage>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let candidates = app.store.candidates();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Candidate Management ({}) ", candidates.len()));

    if candidates.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled("No candidates yet", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("Get started by adding your first candidate (press a)"),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["", "CANDIDATE", "POSITION", "STATUS", "SKILLS", "APPLIED"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = candidates
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(Span::styled(c.initials(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
                Cell::from(Text::from(vec![
                    Line::from(c.name.clone()),
                    Line::from(Span::styled(
                        format!("{} · {}", c.email, c.phone),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])),
                Cell::from(Text::from(vec![
                    Line::from(c.position.clone()),
                    Line::from(Span::styled(
                        format!("{} experience", c.experience),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])),
                Cell::from(Span::styled(c.status.label(), Style::default().fg(status_color(c.status)))),
                Cell::from(c.skills_summary().join(", ")),
                Cell::from(c.applied_local().format("%b %-d, %Y").to_string()),
            ])
            .height(2)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(30),
            Constraint::Percentage(22),
            Constraint::Length(11),
            Constraint::Percentage(28),
            Constraint::Length(13),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_assistant<S: KeyValueStorage>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let width = chunks[0].width.saturating_sub(4).max(20) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in app.chat.messages() {
        let (who, style) = match message.role {
            Role::User => ("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Role::Agent => ("Assistant", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        };
        lines.push(Line::from(vec![
            Span::styled(who, style),
            Span::styled(format!("  {}", message.time_label()), Style::default().fg(Color::DarkGray)),
        ]));
        for paragraph in message.content.lines() {
            if paragraph.is_empty() {
                lines.push(Line::from(""));
                continue;
            }
            for wrapped in textwrap::wrap(paragraph, width) {
                lines.push(Line::from(format!("  {}", wrapped)));
            }
        }
        lines.push(Line::from(""));
    }
    if app.chat.is_typing() {
        lines.push(Line::from(Span::styled(
            "Assistant is typing...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // keep the newest message in view
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;
    let transcript = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" VertexHire AI Assistant · Your intelligent recruitment companion "),
        )
        .scroll((scroll, 0));
    frame.render_widget(transcript, chunks[0]);

    let input_style = if app.chat.is_typing() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let input = if app.chat_input.is_empty() {
        Paragraph::new(Span::styled(
            "Ask me anything about your candidates...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(app.chat_input.as_str()).style(input_style)
    };
    frame.render_widget(input.block(Block::default().borders(Borders::ALL).title(" Message ")), chunks[1]);
}

fn draw_status_picker(frame: &mut Frame, selected: usize) {
    let area = centered(frame.area(), 30, Status::ALL.len() as u16 + 2);
    let items: Vec<ListItem> = Status::ALL
        .iter()
        .map(|s| ListItem::new(Span::styled(s.label(), Style::default().fg(status_color(*s)))))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Set Status "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_confirm<S: KeyValueStorage>(frame: &mut Frame, app: &App<S>) {
    let name = app.current().map(|c| c.name.as_str()).unwrap_or("?");
    let area = centered(frame.area(), 50, 5);
    let prompt = Paragraph::new(vec![
        Line::from(format!("Are you sure you want to delete {}?", name)),
        Line::from(""),
        Line::from(Span::styled("y: delete   any other key: cancel", Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(" Delete Candidate "));
    frame.render_widget(Clear, area);
    frame.render_widget(prompt, area);
}

fn draw_form(frame: &mut Frame, form: &CandidateForm) {
    let area = centered(frame.area(), 70, FIELDS.len() as u16 * 2 + 2);
    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in FIELDS.iter().enumerate() {
        let focused = i == form.focus;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let required = matches!(field, Field::Name | Field::Email | Field::Position);
        let label = format!("{}{}{}: ", marker, field.label(), if required { " *" } else { "" });
        let value = match field {
            Field::Status => format!("< {} >", form.value(*field)),
            Field::Skills if form.skills.is_empty() => "comma separated".to_string(),
            _ => form.value(*field).to_string(),
        };
        let value_style = match field {
            Field::Status => Style::default().fg(status_color(form.status)),
            Field::Skills if form.skills.is_empty() => Style::default().fg(Color::DarkGray),
            _ => Style::default(),
        };
        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, value_style),
        ]));
        match form.errors.for_field(*field) {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("    {}", err),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from("")),
        }
    }

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(form.title()));
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
