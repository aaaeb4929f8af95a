use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{session::CharState, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        if !session.has_finished() {
            let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
            let mut prompt_occupied_lines =
                ((session.prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;

            if session.prompt.width() <= max_chars_per_line as usize {
                prompt_occupied_lines = 1;
            }

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .horizontal_margin(HORIZONTAL_MARGIN)
                .constraints(
                    [
                        Constraint::Length(
                            (area.height.saturating_sub(prompt_occupied_lines + 3) / 2).max(1),
                        ),
                        Constraint::Length(1), // countdown
                        Constraint::Length(1), // live metrics
                        Constraint::Length(1), // padding
                        Constraint::Length(prompt_occupied_lines),
                        Constraint::Min(1),
                    ]
                    .as_ref(),
                )
                .split(area);

            // Classified characters behind the cursor, then the active
            // cursor char, then the untyped remainder.
            let mut spans = session
                .char_states
                .iter()
                .take(session.cursor)
                .enumerate()
                .map(|(idx, state)| {
                    let expected = session.get_expected_char(idx);
                    match state {
                        CharState::Incorrect => Span::styled(
                            match expected {
                                ' ' => "·".to_owned(),
                                c => c.to_string(),
                            },
                            red_bold_style,
                        ),
                        _ => Span::styled(expected.to_string(), green_bold_style),
                    }
                })
                .collect::<Vec<Span>>();

            if session.cursor < session.char_count() {
                spans.push(Span::styled(
                    session.get_expected_char(session.cursor).to_string(),
                    underlined_dim_bold_style,
                ));
                let rest: String = session.prompt.chars().skip(session.cursor + 1).collect();
                spans.push(Span::styled(rest, dim_bold_style));
            }

            let widget = Paragraph::new(Line::from(spans))
                .alignment(if prompt_occupied_lines == 1 {
                    // when the prompt is small enough to fit on one line
                    // centering the text gives a nice zen feeling
                    Alignment::Center
                } else {
                    Alignment::Left
                })
                .wrap(Wrap { trim: true });

            widget.render(chunks[4], buf);

            let timer = Paragraph::new(Span::styled(
                format!("{}s", session.seconds_remaining),
                dim_bold_style,
            ))
            .alignment(Alignment::Center);

            timer.render(chunks[1], buf);

            let metrics = Paragraph::new(Span::styled(
                format!(
                    "{} wpm   {:.2}% acc   {} mistakes   {} chars",
                    session.wpm,
                    session.accuracy,
                    session.mistakes(),
                    session.total_typed
                ),
                dim_bold_style,
            ))
            .alignment(Alignment::Center);

            metrics.render(chunks[2], buf);
        } else {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .horizontal_margin(HORIZONTAL_MARGIN)
                .vertical_margin(VERTICAL_MARGIN)
                .constraints(
                    [
                        Constraint::Min(1),    // padding
                        Constraint::Length(1), // headline stats
                        Constraint::Length(1), // secondary stats
                        Constraint::Min(1),    // padding
                        Constraint::Length(1), // legend
                    ]
                    .as_ref(),
                )
                .split(area);

            let stats = Paragraph::new(Span::styled(
                format!("{} wpm   {:.2}% acc", session.wpm, session.accuracy),
                bold_style,
            ))
            .alignment(Alignment::Center);

            stats.render(chunks[1], buf);

            let detail = Paragraph::new(Span::styled(
                format!(
                    "{} mistakes   {} chars typed   {}s used",
                    session.mistakes(),
                    session.total_typed,
                    session.duration_secs - session.seconds_remaining
                ),
                dim_bold_style,
            ))
            .alignment(Alignment::Center);

            detail.render(chunks[2], buf);

            let legend = Paragraph::new(Span::styled(
                "(r)etry / (n)ew / (esc)ape",
                italic_style,
            ));

            legend.render(chunks[4], buf);
        }
    }
}

/// Shown while a fresh paragraph is being fetched; keystroke intake is
/// disabled for the duration.
pub fn render_loading(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(50),
                Constraint::Length(1),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(f.area());

    let message = Paragraph::new(Span::styled(
        "fetching a new paragraph...",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(message, chunks[1]);
}
