use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::grading::QuizResult;
use crate::timer::format_clock;

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(result) = app.result() else {
        return;
    };
    let can_retry = app.attempt().is_some_and(|attempt| attempt.can_retry());

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], result);
    render_question_breakdown(frame, chunks[2], app, result);
    render_controls(frame, chunks[3], can_retry);
}

fn get_grade_color(result: &QuizResult) -> Color {
    if !result.passed {
        return Color::Red;
    }
    match result.percentage {
        90.. => Color::Green,
        _ => Color::Cyan,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, result: &QuizResult) {
    let grade_color = get_grade_color(result);
    let verdict = if result.passed { "PASSED" } else { "FAILED" };

    let mut timing = format!("time {}", format_clock(result.time_spent));
    if result.timed_out {
        timing.push_str("  ·  time limit reached");
    }

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {} pts  ({}%)  {}",
                result.earned_points, result.total_points, result.percentage, verdict
            ),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(Span::styled(
            format!("pass mark {}%  ·  {}", result.passing_threshold, timing),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, app: &App, result: &QuizResult) {
    let mut lines: Vec<Line> = Vec::new();

    for (index, (question, outcome)) in app.questions().iter().zip(&result.outcomes).enumerate() {
        let (symbol, color) = match (outcome.correct, outcome.answered) {
            (true, _) => ("+", Color::Green),
            (false, true) => ("-", Color::Red),
            (false, false) => ("?", Color::Yellow),
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
            Span::styled(
                format!("{:2}. ", index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                truncate_question(&question.text),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format!("  {}/{}", outcome.points_awarded, outcome.points_possible),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        if let Some(explanation) = question.explanation.as_deref() {
            lines.push(Line::from(Span::styled(
                format!("       {}", explanation),
                Style::default().fg(Color::DarkGray).italic(),
            )));
        }
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll_offset(app.result_scroll()), 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect, can_retry: bool) {
    let hint = if can_retry {
        "j/k scroll  ·  r retry  ·  q quit"
    } else {
        "j/k scroll  ·  q quit"
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

/// Paragraph scroll offset, saturating at the widest row ratatui can address.
fn scroll_offset(scroll: usize) -> u16 {
    u16::try_from(scroll).unwrap_or(u16::MAX)
}
