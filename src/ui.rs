pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    app::{App, Focus},
    classification::Verdict,
    time_series::SamplePoint,
    view::{StatusCard, Trigger, View},
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

#[derive(Debug, Clone, Copy)]
enum Section {
    Header,
    Controls,
    /// Error banner holding this many wrapped text lines
    Banner(u16),
    Card,
    Chart,
    Spacer,
    Legend,
}

impl Section {
    fn constraint(self) -> Constraint {
        match self {
            Section::Header => Constraint::Length(1),
            Section::Controls => Constraint::Length(5),
            Section::Banner(lines) => Constraint::Length(lines + 2),
            Section::Card => Constraint::Length(4),
            Section::Chart => Constraint::Min(6),
            Section::Spacer => Constraint::Min(0),
            Section::Legend => Constraint::Length(1),
        }
    }
}

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.view();

        let mut sections = vec![Section::Header, Section::Controls];
        if let Some(message) = view.error_banner {
            let text_width = area.width.saturating_sub(2 * HORIZONTAL_MARGIN + 2);
            sections.push(Section::Banner(wrapped_line_count(message, text_width)));
        }
        if view.status_card.is_some() {
            sections.push(Section::Card);
        }
        if view.chart.is_some() {
            sections.push(Section::Chart);
        } else {
            sections.push(Section::Spacer);
        }
        sections.push(Section::Legend);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(sections.iter().map(|s| s.constraint()))
            .split(area);

        for (section, chunk) in sections.iter().zip(chunks.iter()) {
            let chunk = *chunk;
            match section {
                Section::Header => render_header(chunk, buf),
                Section::Controls => render_controls(self, &view, chunk, buf),
                Section::Banner(_) => {
                    if let Some(message) = view.error_banner {
                        render_banner(message, chunk, buf);
                    }
                }
                Section::Card => {
                    if let Some(card) = &view.status_card {
                        render_status_card(card, chunk, buf);
                    }
                }
                Section::Chart => {
                    if let Some(series) = view.chart {
                        render_chart(series, chunk, buf);
                    }
                }
                Section::Spacer => {}
                Section::Legend => render_legend(self.focus, chunk, buf),
            }
        }
    }
}

fn render_header(area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        "Exoplanet Finder",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_controls(app: &App, view: &View, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.endpoint));
    let inner = block.inner(area);
    block.render(area, buf);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let input_focused = app.focus == Focus::FileInput;

    let prefix = "File: ";
    let room = (inner.width as usize).saturating_sub(prefix.len() + 1);
    let mut shown = tail_to_width(&app.path_input, room);
    if input_focused {
        shown.push('▏');
    }
    let input_style = if input_focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };

    let status_line = match (&app.notice, view.file_name) {
        (Some(notice), _) => Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )),
        (None, Some(name)) => Line::from(vec![
            Span::raw("Selected: "),
            Span::styled(name.to_string(), bold),
        ]),
        (None, None) => Line::from(Span::styled(
            "No file selected",
            Style::default().add_modifier(Modifier::DIM),
        )),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(prefix, bold),
            Span::styled(shown, input_style),
        ]),
        status_line,
        trigger_line(view.trigger, app.focus == Focus::Analyze),
    ];

    Paragraph::new(lines).render(inner, buf);
}

fn trigger_line(trigger: Trigger, focused: bool) -> Line<'static> {
    let style = match (trigger.enabled, focused) {
        (false, _) => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        (true, true) => Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    };
    Line::from(Span::styled(format!("[ {} ]", trigger.label), style))
}

fn render_banner(message: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: true })
    .render(area, buf);
}

fn render_status_card(card: &StatusCard, area: Rect, buf: &mut Buffer) {
    let color = match card.verdict {
        Verdict::Positive => Color::Green,
        Verdict::Negative => Color::Red,
    };
    let accent = Style::default().fg(color).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(Span::styled(card.label.to_string(), accent)),
        Line::from(vec![
            Span::raw("Confidence: "),
            Span::styled(format!("{}%", card.confidence), accent),
        ]),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", card.verdict.to_string().to_lowercase())),
        )
        .render(area, buf);
}

fn render_chart(series: &[SamplePoint], area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let tuples: Vec<(f64, f64)> = series.iter().copied().map(Into::into).collect();
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Blue))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let flux_bounds = charting::flux_bounds(series);
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Light Curve Analysis "),
        )
        .x_axis(
            Axis::default()
                .title("index")
                .bounds(charting::index_bounds(series))
                .labels(
                    charting::index_ticks(series)
                        .into_iter()
                        .map(|t| Span::styled(t.to_string(), bold_style)),
                ),
        )
        .y_axis(
            Axis::default()
                .title("flux")
                .bounds(flux_bounds)
                .labels(
                    charting::flux_labels(flux_bounds)
                        .into_iter()
                        .map(|l| Span::styled(l, bold_style)),
                ),
        );

    chart.render(area, buf);
}

fn render_legend(focus: Focus, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        format!("[{focus}] (tab) focus / (enter) select or analyze / (ctrl+r) analyze / (esc)ape"),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(area, buf);
}

/// Rows `text` occupies when word-wrapped into `width` columns
fn wrapped_line_count(text: &str, width: u16) -> u16 {
    let width = width as usize;
    if width == 0 {
        return 1;
    }
    let mut lines = 1;
    let mut used = 0;
    for word in text.split_whitespace() {
        let w = word.width();
        let needed = if used == 0 { w } else { used + 1 + w };
        if needed <= width {
            used = needed;
            continue;
        }
        if used > 0 {
            lines += 1;
        }
        used = w;
        while used > width {
            lines += 1;
            used -= width;
        }
    }
    lines
}

/// Keep the end of `text`, which is the informative part of a path
fn tail_to_width(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut kept: Vec<char> = Vec::new();
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        kept.push(c);
    }
    kept.into_iter().rev().collect()
}
