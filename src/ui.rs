use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use hotkey_drill::{challenge::Challenge, session::Phase};

use crate::{App, Verdict};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Widest a summary text column is allowed to get
const MAX_COLUMN_WIDTH: usize = 48;

fn format_secs(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase() {
            Phase::Finished => render_summary(self, area, buf),
            Phase::Idle => {
                Paragraph::new(Span::styled(
                    "nothing to play",
                    Style::default().add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center)
                .render(area, buf);
            }
            Phase::Playing | Phase::Paused { .. } => render_challenge(self, area, buf),
        }
    }
}

fn render_challenge(app: &App, area: Rect, buf: &mut Buffer) {
    let view = app.view();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(0),
            Constraint::Length(2), // description
            Constraint::Length(2), // input
            Constraint::Length(1), // verdict
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let mut header = vec![
        Span::styled(app.catalog_name.clone(), dim_style),
        Span::raw("  "),
        Span::styled(view.category.clone(), bold_style),
        Span::raw("  "),
        Span::raw(format!("{}/{}", view.index, view.count)),
    ];
    if let Some(attempt) = view.attempt.filter(|a| *a > 1) {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            format!("attempt {attempt}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    header.push(Span::raw("  "));
    header.push(Span::styled(format_secs(view.seconds), dim_style));
    Paragraph::new(Line::from(header)).render(chunks[0], buf);

    Paragraph::new(Span::styled(view.description.clone(), bold_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let input_style = match view.verdict {
        Some(Verdict::Correct) => green_bold_style,
        Some(Verdict::Failed { .. }) => red_bold_style,
        None => bold_style,
    };
    let input = if view.input.is_empty() {
        Span::styled("press the shortcut", dim_style.patch(italic_style))
    } else {
        Span::styled(view.input.clone(), input_style)
    };
    Paragraph::new(input)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let verdict = match &view.verdict {
        Some(Verdict::Correct) => Line::from(Span::styled("correct", green_bold_style)),
        Some(Verdict::Failed { solution }) => Line::from(vec![
            Span::styled("expected ", red_bold_style),
            Span::styled(solution.clone(), bold_style),
        ]),
        None => Line::default(),
    };
    Paragraph::new(verdict)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let legend = if app.enhanced {
        "(esc)ape"
    } else {
        "(esc)ape  ·  no key release reporting, combos are read from single presses"
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[6], buf);
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> u16 {
    values
        .map(|v| v.width())
        .chain(std::iter::once(header.width()))
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH) as u16
}

fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let challenges = app.session.challenges();
    let first_try = challenges.iter().filter(|c| c.attempt == 1).count();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "finished in {}   {}/{} on the first attempt",
            format_secs(app.session.elapsed_secs()),
            first_try,
            challenges.len()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let solutions: Vec<String> = challenges.iter().map(|c| c.solutions.canonical()).collect();
    let widths = [
        Constraint::Length(column_width(
            "category",
            challenges.iter().map(|c| c.category.as_str()),
        )),
        Constraint::Length(column_width(
            "challenge",
            challenges.iter().map(|c| c.description.as_str()),
        )),
        Constraint::Length(column_width("shortcut", solutions.iter().map(String::as_str))),
        Constraint::Length(8),
        Constraint::Length(6),
    ];

    let rows = challenges
        .iter()
        .zip(&solutions)
        .map(|(c, solution)| summary_row(c, solution));

    let table = Table::new(rows, widths)
        .header(
            Row::new(["category", "challenge", "shortcut", "attempts", "time"])
                .style(bold_style.add_modifier(Modifier::UNDERLINED)),
        )
        .column_spacing(2);
    Widget::render(table, chunks[2], buf);

    Paragraph::new(Span::styled("(r)estart / (esc)ape", italic_style)).render(chunks[3], buf);
}

fn summary_row<'a>(challenge: &'a Challenge, solution: &'a str) -> Row<'a> {
    let attempts_style = match challenge.attempt {
        1 => Style::default().fg(Color::Green),
        2 => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red),
    };
    Row::new(vec![
        Cell::from(challenge.category.as_str()),
        Cell::from(challenge.description.as_str()),
        Cell::from(solution),
        Cell::from(challenge.attempt.to_string()).style(attempts_style),
        Cell::from(format_secs(challenge.seconds_spent)),
    ])
}
