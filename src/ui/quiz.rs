use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::attempt::Attempt;
use crate::models::{Question, QuestionKind};
use crate::timer::format_clock;

const OPTION_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
const LOW_TIME_SECS: u64 = 30;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(attempt), Some(question)) = (app.attempt(), app.current_question()) else {
        return;
    };
    let has_code = question.code.is_some();
    let chunks = create_layout(area, has_code);

    render_progress(frame, chunks[0], attempt);
    render_question_text(frame, chunks[1], question);

    let answer_chunk = match question.code.as_deref() {
        Some(code) => {
            render_code_block(frame, chunks[2], code);
            chunks[3]
        }
        None => chunks[2],
    };

    if question.kind.is_choice() {
        render_options(frame, answer_chunk, question, attempt, app.cursor());
    } else {
        render_text_input(frame, answer_chunk, app.text_input());
    }

    let controls_chunk = if has_code { chunks[4] } else { chunks[3] };
    render_controls(frame, controls_chunk, question.kind);
}

fn create_layout(area: Rect, has_code: bool) -> std::rc::Rc<[Rect]> {
    if has_code {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(10),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area)
    } else {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .margin(2)
        .split(area)
    }
}

fn render_progress(frame: &mut Frame, area: Rect, attempt: &Attempt) {
    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(16)]).areas(area);

    let index = attempt.current_index().unwrap_or(0);
    let progress = format!(
        "{}/{}  ·  {} answered",
        index + 1,
        attempt.total_questions(),
        attempt.answered_count()
    );
    frame.render_widget(Paragraph::new(progress).fg(Color::DarkGray), left);

    if let Some(remaining) = attempt.remaining() {
        let color = if remaining.as_secs() <= LOW_TIME_SECS {
            Color::Red
        } else {
            Color::DarkGray
        };
        let widget = Paragraph::new(format!("⏱ {}", format_clock(remaining)))
            .alignment(Alignment::Right)
            .fg(color);
        frame.render_widget(widget, right);
    }
}

fn render_question_text(frame: &mut Frame, area: Rect, question: &Question) {
    let lines = vec![
        Line::from(Span::styled(
            format!("{} · {} pt", question.kind.label(), question.points),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            question.text.as_str(),
            Style::default().fg(Color::White).bold(),
        )),
    ];
    let widget = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_code_block(frame: &mut Frame, area: Rect, code: &str) {
    let code_lines: Vec<Line> = code
        .lines()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(Color::Yellow))))
        .collect();

    let widget = Paragraph::new(code_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    attempt: &Attempt,
    cursor: usize,
) {
    let stored = attempt.answer_for(&question.id);
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let is_cursor = index == cursor;
        let is_selected = stored.is_some_and(|answer| answer.contains(&option.id));

        let style = match (is_cursor, is_selected) {
            (true, _) => Style::default().fg(Color::Cyan).bold(),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let check = match (question.kind, is_selected) {
            (QuestionKind::MultipleChoice, true) => "[x]",
            (QuestionKind::MultipleChoice, false) => "[ ]",
            (_, true) => "(•)",
            (_, false) => "( )",
        };
        let label = OPTION_LABELS.get(index).copied().unwrap_or('·');

        lines.push(Line::from(vec![
            Span::styled(format!(" {} {} ", marker, check), style),
            Span::styled(format!("{}. ", label), style),
            Span::styled(option.text.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_text_input(frame: &mut Frame, area: Rect, input: &str) {
    let [input_area, _] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);
    let widget = Paragraph::new(Line::from(vec![
        Span::styled(input, Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .title(" Your answer ")
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, input_area);
}

fn render_controls(frame: &mut Frame, area: Rect, kind: QuestionKind) {
    let hint = if kind.is_choice() {
        "j/k move  ·  space select  ·  h/l question  ·  s submit  ·  q quit"
    } else {
        "type to answer  ·  ←/→ question  ·  ctrl+s submit  ·  esc quit"
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
