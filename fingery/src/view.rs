//! Screens, drawn with ratatui.

use cadence::config::Configuration;
use cadence::{AnalyticsRecord, Bin, CharState, Millis, Session};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span, ToLine, ToSpan},
    widgets::{
        Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, LegendPosition, Padding,
        Paragraph, Wrap,
    },
};

use crate::app::{Results, Screen};

/// A block with a rounded border
const ROUNDED_BLOCK: Block = Block::bordered().border_type(BorderType::Rounded);

type PlotData = Vec<(f64, f64)>;

/// What a screen needs besides itself
pub struct ViewContext<'a> {
    pub now_ms: Millis,
    pub user: &'a str,
    pub analytics: Configuration,
}

/// Draws the next frame
pub fn draw(frame: &mut Frame, screen: &Screen, ctx: &ViewContext) {
    let help = match screen {
        Screen::Typing(_) => "<ESC> new passage  <CTRL-Q> exit",
        Screen::Results(_) => "<N> next  <Q> exit",
        Screen::Error(_) => "<R> try again  <Q> exit",
    };

    let block = ROUNDED_BLOCK
        .padding(Padding::horizontal(1))
        .title_top(ctx.user.to_line().dark_gray())
        .title_top("FINGERY".to_line().bold().centered())
        .title_top(help.to_line().right_aligned());

    let area = frame.area();
    let content = block.inner(area);
    frame.render_widget(block, area);

    match screen {
        Screen::Typing(session) => typing(frame, content, session, ctx),
        Screen::Results(results) => summary(frame, content, results),
        Screen::Error(message) => error(frame, content, message),
    }
}

fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

fn typing(frame: &mut Frame, area: Rect, session: &Session, ctx: &ViewContext) {
    let area = center(area, Constraint::Percentage(80), Constraint::Percentage(80));
    let [passage, stats] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(passage_line(session))
            .wrap(Wrap { trim: false })
            .centered(),
        passage,
    );

    let live = session.snapshot(ctx.now_ms, &ctx.analytics).map_or_else(
        || Line::from("start typing").dark_gray(),
        |record| {
            Line::from(format!(
                "W: {} | A: {}% | T: {:.1}s | {:.0}%",
                record.wpm,
                record.accuracy,
                record.time_taken_seconds,
                session.completion_percentage()
            ))
        },
    );
    frame.render_widget(Paragraph::new(live).centered(), stats);
}

/// The passage with every character coloured by its state
fn passage_line(session: &Session) -> Line<'static> {
    let cursor = session.input().chars().count();
    let target_len = session.target_text().chars().count();

    let mut spans: Vec<Span> = session
        .target_text()
        .chars()
        .zip(session.char_states())
        .enumerate()
        .map(|(index, (expected, state))| {
            let style = match state {
                CharState::Correct => Style::new().fg(Color::Green),
                // Mistyped spaces would be invisible
                CharState::Incorrect if expected == ' ' => Style::new().bg(Color::Red),
                CharState::Incorrect => Style::new().fg(Color::Red).underlined(),
                CharState::Untyped if index == cursor => {
                    Style::new().add_modifier(Modifier::REVERSED)
                }
                CharState::Untyped => Style::new().fg(Color::DarkGray),
            };
            Span::styled(expected.to_string(), style.add_modifier(Modifier::BOLD))
        })
        .collect();

    // Overrun past the end of the passage
    spans.extend(
        session
            .input()
            .chars()
            .skip(target_len)
            .map(|typed| Span::styled(typed.to_string(), Style::new().red().crossed_out())),
    );

    Line::from(spans)
}

/// Chart data of a binned series, one point per bin at its midpoint
#[derive(Debug, Default, Clone, PartialEq)]
struct DataSets {
    wpm: PlotData,
    accuracy: PlotData,
    errors: PlotData,
    wpm_high: f64,
    duration: f64,
}

impl From<&[Bin]> for DataSets {
    fn from(bins: &[Bin]) -> Self {
        let mut sets = Self::default();

        for bin in bins {
            let middle = (bin.start_seconds + bin.end_seconds) / 2.0;

            if let Some(wpm) = bin.avg_wpm {
                sets.wpm.push((middle, wpm));
                sets.wpm_high = sets.wpm_high.max(wpm);
            }
            if let Some(accuracy) = bin.avg_accuracy {
                sets.accuracy.push((middle, accuracy));
            }
            if !bin.errors_in_bin.is_empty() {
                sets.errors.push((middle, bin.errors_in_bin.len() as f64));
            }
            sets.duration = sets.duration.max(bin.end_seconds);
        }

        sets
    }
}

fn summary(frame: &mut Frame, area: Rect, results: &Results) {
    let notice_height = if results.notice.is_some() { 2 } else { 0 };
    let [notice, body] =
        Layout::vertical([Constraint::Length(notice_height), Constraint::Fill(1)]).areas(area);

    if let Some(message) = &results.notice {
        let lines = vec![
            Line::from(vec![
                "! ".yellow().bold(),
                message.to_span().yellow(),
            ]),
            Line::from("<R> retry  <D> dismiss").dark_gray(),
        ];
        frame.render_widget(Paragraph::new(lines), notice);
    }

    let [text, charts] =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)]).areas(body);
    let [wpm, accuracy] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(charts);

    let source = if results.is_remote() {
        "service"
    } else {
        "local"
    };
    let mut lines = summary_lines(&results.analysis.record);
    lines.push(Line::from(format!("Computed      : {source}")).dark_gray());

    frame.render_widget(
        Paragraph::new(lines).block(
            ROUNDED_BLOCK
                .borders(Borders::TOP)
                .padding(Padding::right(1))
                .title("Summary".to_span().bold()),
        ),
        text,
    );

    let sets = DataSets::from(&results.analysis.series[..]);
    let x_axis = |duration: f64| {
        Axis::default()
            .title("Time")
            .style(Style::default().fg(Color::Gray))
            .labels([Span::raw("0"), Span::raw(format!("{duration:.1}s"))])
            .bounds([0.0, duration.max(f64::EPSILON)])
    };

    let wpm_high = sets.wpm_high.max(1.0);
    let wpm_chart = Chart::new(vec![
        Dataset::default()
            .name("Wpm")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&sets.wpm),
    ])
    .block(ROUNDED_BLOCK.title("Words/min".to_span().bold()))
    .x_axis(x_axis(sets.duration))
    .y_axis(
        Axis::default()
            .style(Style::default().fg(Color::Gray))
            .labels([
                Span::raw("0"),
                Span::raw((wpm_high / 2.0).trunc().to_string()),
                Span::raw(wpm_high.trunc().to_string()),
            ])
            .bounds([0.0, wpm_high]),
    )
    .legend_position(Some(LegendPosition::BottomRight));

    frame.render_widget(wpm_chart, wpm);

    let accuracy_chart = Chart::new(vec![
        Dataset::default()
            .name("Accuracy")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&sets.accuracy),
        Dataset::default()
            .name("Errors")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&sets.errors),
    ])
    .block(ROUNDED_BLOCK.title("Accuracy".to_span().bold()))
    .x_axis(x_axis(sets.duration))
    .y_axis(
        Axis::default()
            .style(Style::default().fg(Color::Gray))
            .labels([Span::raw("0%"), Span::raw("50%"), Span::raw("100%")])
            .bounds([0.0, 100.0]),
    )
    .legend_position(Some(LegendPosition::BottomRight));

    frame.render_widget(accuracy_chart, accuracy);
}

fn summary_lines(record: &AnalyticsRecord) -> Vec<Line<'static>> {
    vec![
        Line::from(format!("Wpm           : {}", record.wpm)),
        Line::from(format!("Wpm (Raw)     : {}", record.raw_wpm)),
        Line::from(format!("Accuracy      : {}%", record.accuracy)),
        Line::from(format!("Time          : {:.1}s", record.time_taken_seconds)),
        Line::from(format!("Correct       : {}", record.correct_chars)),
        Line::from(format!("Errors        : {}", record.incorrect_chars)),
        Line::from(format!("Consistency   : {}%", record.consistency)),
        Line::from(format!("Burst         : {}", record.burst_wpm)),
    ]
}

fn error(frame: &mut Frame, area: Rect, message: &str) {
    let area = center(area, Constraint::Percentage(80), Constraint::Length(1));
    let text = Paragraph::new(Line::from(vec![
        Span::styled("Error: ", Style::new().bold().fg(Color::Red)),
        Span::raw(message.to_string()),
    ]))
    .centered();

    frame.render_widget(text, area);
}

#[cfg(test)]
mod tests {
    use cadence::{CharError, Event, provider};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn ctx() -> ViewContext<'static> {
        ViewContext {
            now_ms: 3000,
            user: "Ada",
            analytics: Configuration::default(),
        }
    }

    fn render(screen: &Screen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, screen, &ctx())).unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn results(notice: Option<&str>) -> Results {
        let session = Session::new(["cat", "dog"])
            .unwrap()
            .apply(Event::input("c", 0))
            .apply(Event::input("cat dxg", 3000))
            .apply(Event::input("cat dog", 6000));
        let request = session.completion().unwrap();
        let analysis = provider::analyze(&request, None, 3, &Configuration::default());

        Results {
            request,
            analysis,
            notice: notice.map(ToString::to_string),
        }
    }

    #[test]
    fn test_typing_before_start() {
        let session = Session::new(["cat", "dog"]).unwrap();
        let output = render(&Screen::Typing(session));

        assert!(output.contains("Ada"));
        assert!(output.contains("FINGERY"));
        assert!(output.contains("cat dog"));
        assert!(output.contains("start typing"));
    }

    #[test]
    fn test_typing_live_stats() {
        let session = Session::new(["cat", "dog"])
            .unwrap()
            .apply(Event::input("c", 0))
            .apply(Event::input("cat", 1500));
        let output = render(&Screen::Typing(session));

        // Two words over three seconds
        assert!(output.contains("W: 40 | A: 100%"));
    }

    #[test]
    fn test_passage_styles() {
        let session = Session::new(["cat"]).unwrap().apply(Event::input("cxtab", 0));
        let line = passage_line(&session);

        assert_eq!(line.spans.len(), 5);
        assert_eq!(line.spans[0].style.fg, Some(Color::Green));
        assert_eq!(line.spans[1].style.fg, Some(Color::Red));
        // Overrun
        assert_eq!(line.spans[3].content, "a");
        assert!(line.spans[4].style.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn test_results() {
        let output = render(&Screen::Results(Box::new(results(Some(
            "Analytics service unavailable: timed out",
        )))));

        assert!(output.contains("Summary"));
        assert!(output.contains("Wpm           : 20"));
        assert!(output.contains("Accuracy      : 100%"));
        assert!(output.contains("Computed      : local"));
        assert!(output.contains("Words/min"));
        assert!(output.contains("Analytics service unavailable: timed out"));
        assert!(output.contains("<R> retry"));
    }

    #[test]
    fn test_results_without_notice() {
        let output = render(&Screen::Results(Box::new(results(None))));
        assert!(!output.contains("<R> retry"));
    }

    #[test]
    fn test_error_screen() {
        let output = render(&Screen::Error("No words returned from source".into()));
        assert!(output.contains("Error: No words returned from source"));
    }

    #[test]
    fn test_datasets_skip_empty_bins() {
        let error = CharError {
            position: 1,
            expected: 'a',
            typed: 'x',
        };
        let bins = vec![
            Bin {
                start_seconds: 0.0,
                end_seconds: 1.0,
                avg_wpm: Some(30.0),
                avg_accuracy: Some(50.0),
                errors_in_bin: vec![error, error],
            },
            Bin {
                start_seconds: 1.0,
                end_seconds: 2.0,
                avg_wpm: None,
                avg_accuracy: None,
                errors_in_bin: Vec::new(),
            },
            Bin {
                start_seconds: 2.0,
                end_seconds: 3.0,
                avg_wpm: Some(60.0),
                avg_accuracy: Some(100.0),
                errors_in_bin: Vec::new(),
            },
        ];
        let sets = DataSets::from(bins.as_slice());
        assert_eq!(sets.wpm, vec![(0.5, 30.0), (2.5, 60.0)]);
        assert_eq!(sets.accuracy, vec![(0.5, 50.0), (2.5, 100.0)]);
        assert_eq!(sets.errors, vec![(0.5, 2.0)]);
        assert_eq!(sets.wpm_high, 60.0);
        assert_eq!(sets.duration, 3.0);
    }
}
