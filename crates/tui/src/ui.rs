use courtside_core::{
    view::{GameRow, Section, TeamRow, ViewBody, ViewModel},
    DateTab, GameStatus,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

#[derive(Debug, Clone)]
pub struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

/// Per-frame UI state that is not part of the view model.
pub struct DrawState<'a> {
    pub cursor: usize,
    pub status: &'a str,
    pub source: &'a str,
    pub refreshing: bool,
    pub updated: Option<&'a str>,
}

pub fn draw(frame: &mut Frame, view: &ViewModel, state: &DrawState<'_>, theme: &Theme) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(area);

    render_tabs(frame, chunks[0], view, theme);
    render_body(frame, chunks[1], view, state.cursor, theme);
    render_status(frame, chunks[2], state, theme);
}

fn render_tabs(frame: &mut Frame, area: Rect, view: &ViewModel, theme: &Theme) {
    let titles: Vec<Line> = DateTab::ALL
        .iter()
        .enumerate()
        .map(|(idx, tab)| Line::from(format!("{} {}", idx + 1, tab.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("NBA Scores · {}", view.date)),
        )
        .select(view.tab.index())
        .style(Style::default().fg(theme.muted))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

fn render_body(frame: &mut Frame, area: Rect, view: &ViewModel, cursor: usize, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title(view.tab.label());
    let (lines, focused_line) = body_lines(view, cursor, theme);

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = match focused_line {
        Some(line) if visible > 0 && line + 3 > visible => line + 3 - visible,
        _ => 0,
    };

    let alignment = match view.body {
        ViewBody::Sections(_) => Alignment::Left,
        _ => Alignment::Center,
    };
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(alignment)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

/// Lines for the body, plus the index of the focused row's first line.
pub fn body_lines(
    view: &ViewModel,
    cursor: usize,
    theme: &Theme,
) -> (Vec<Line<'static>>, Option<usize>) {
    match &view.body {
        ViewBody::Loading => (
            vec![
                Line::default(),
                Line::from(Span::styled(
                    "Loading scores…",
                    Style::default().fg(theme.accent),
                )),
            ],
            None,
        ),
        ViewBody::Failed { message } => (
            vec![
                Line::default(),
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(theme.danger),
                )),
                Line::from(Span::styled(
                    "Retrying on the next refresh. Press r to retry now.",
                    Style::default().fg(theme.muted),
                )),
            ],
            None,
        ),
        ViewBody::Empty { message } => (
            vec![
                Line::default(),
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(theme.muted),
                )),
            ],
            None,
        ),
        ViewBody::Sections(sections) => section_lines(sections, cursor, theme),
    }
}

fn section_lines(
    sections: &[Section],
    cursor: usize,
    theme: &Theme,
) -> (Vec<Line<'static>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut focused_line = None;
    let mut index = 0;

    for section in sections {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            format!("{} ({})", section.bucket.title().to_uppercase(), section.rows.len()),
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::BOLD),
        )));
        for row in &section.rows {
            let focused = index == cursor;
            if focused {
                focused_line = Some(lines.len());
            }
            lines.extend(row_lines(row, focused, theme));
            index += 1;
        }
    }

    (lines, focused_line)
}

fn row_lines(row: &GameRow, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
    let marker = if focused {
        Span::styled(
            "▶ ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("  ")
    };
    let status_color = match row.status {
        GameStatus::Live => theme.danger,
        GameStatus::Upcoming => theme.warning,
        GameStatus::Finished => theme.muted,
    };
    let arrow = match (row.expandable, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };

    let mut header = vec![
        marker,
        Span::styled(arrow, Style::default().fg(theme.accent)),
        Span::styled(
            row.status_text.clone(),
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(tip_off) = &row.tip_off {
        header.push(Span::styled(
            format!(" ({tip_off} local)"),
            Style::default().fg(theme.muted),
        ));
    }
    header.push(Span::styled(
        format!("  · {}", row.broadcaster),
        Style::default().fg(theme.muted),
    ));

    let (away_style, home_style) = score_styles(row, theme);
    let score_line = Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("{:<4}", row.away.tricode), away_style),
        Span::styled(format!("{:>4}", row.away.score), away_style),
        Span::styled("   @   ", Style::default().fg(theme.muted)),
        Span::styled(format!("{:<4}", row.home.tricode), home_style),
        Span::styled(format!("{:>4}", row.home.score), home_style),
    ]);

    let mut lines = vec![Line::from(header), score_line];
    if focused {
        for span in lines.iter_mut().flat_map(|line| line.spans.iter_mut()) {
            span.style = highlight(span.style, theme);
        }
    }
    if row.expanded {
        lines.extend(leader_lines(&row.away, theme));
        lines.extend(leader_lines(&row.home, theme));
    }
    lines
}

// Muted text would vanish on the selection background.
fn highlight(style: Style, theme: &Theme) -> Style {
    let style = style.bg(theme.selection_bg);
    match style.fg {
        None => style.fg(theme.selection_fg),
        Some(fg) if fg == theme.muted || fg == theme.selection_bg => style.fg(theme.selection_fg),
        Some(_) => style,
    }
}

fn score_styles(row: &GameRow, theme: &Theme) -> (Style, Style) {
    let base = Style::default().fg(theme.primary_fg);
    if row.status != GameStatus::Finished {
        return (base, base);
    }
    let winner = base.fg(theme.success).add_modifier(Modifier::BOLD);
    let away: Option<u32> = row.away.score.parse().ok();
    let home: Option<u32> = row.home.score.parse().ok();
    match (away, home) {
        (Some(a), Some(h)) if a > h => (winner, base),
        (Some(a), Some(h)) if h > a => (base, winner),
        _ => (base, base),
    }
}

fn leader_lines(team: &TeamRow, theme: &Theme) -> Vec<Line<'static>> {
    if team.leaders.is_empty() {
        return vec![Line::from(Span::styled(
            format!("      {:<4} no stats yet", team.tricode),
            Style::default().fg(theme.muted),
        ))];
    }
    team.leaders
        .iter()
        .map(|leader| {
            Line::from(vec![
                Span::styled(
                    format!("      {:<4}", team.tricode),
                    Style::default().fg(theme.muted),
                ),
                Span::styled(
                    format!("{:<18}", leader.name),
                    Style::default().fg(theme.primary_fg),
                ),
                Span::styled(
                    format!("{:<3}", leader.position),
                    Style::default().fg(theme.muted),
                ),
                Span::styled(leader.stats.clone(), Style::default().fg(theme.accent)),
            ])
        })
        .collect()
}

fn render_status(frame: &mut Frame, area: Rect, state: &DrawState<'_>, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Status");
    let mut primary = vec![Span::raw(state.status.to_string())];
    if state.refreshing {
        primary.push(Span::styled(
            "  ⟳ refreshing",
            Style::default().fg(theme.warning),
        ));
    }
    let updated = state.updated.unwrap_or("never");
    let secondary = Line::from(Span::styled(
        format!(
            "Source: {} · last update {updated} · 1-3/←→ tabs  ↑↓ move  enter expand  r refresh  q quit",
            state.source
        ),
        Style::default().fg(theme.muted),
    ));
    let paragraph = Paragraph::new(vec![Line::from(primary), secondary])
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
