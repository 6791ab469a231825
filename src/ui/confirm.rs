use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;
use crate::attempt::AttemptState;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(AttemptState::AwaitingConfirmation { unanswered, .. }) =
        app.attempt().map(|attempt| attempt.state())
    else {
        return;
    };

    let popup = centered(area, 46, 8);
    let warning = match *unanswered {
        0 => Line::from("All questions answered.".fg(Color::Green)),
        1 => Line::from("1 question unanswered.".fg(Color::Yellow)),
        n => Line::from(Span::styled(
            format!("{n} questions unanswered."),
            Style::default().fg(Color::Yellow),
        )),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Submit your answers?",
            Style::default().fg(Color::White).bold(),
        )),
        warning,
        Line::from(""),
        Line::from("y submit  ·  n keep answering".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::Cyan),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    popup
}
