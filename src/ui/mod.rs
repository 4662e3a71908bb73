pub mod chart;
pub mod formatters;
pub mod ticker;

use crate::app::{App, InputMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(ticker::TICKER_CARD_HEIGHT),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    ticker::draw_ticker(frame, chunks[1], app);
    chart::draw_chart(frame, chunks[2], app);
    draw_footer(frame, chunks[3], app);

    if app.input_mode == InputMode::Help {
        draw_help(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.loading {
        "[Loading...]".to_string()
    } else {
        match &app.last_updated {
            Some(time) => format!("[Updated {}]", time),
            None => "[Waiting for price]".to_string(),
        }
    };

    let feed_color = match app.feed_label() {
        "Live" => Color::Green,
        _ => Color::Yellow,
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Token Dash ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.feed_label(), Style::default().fg(feed_color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" every {}s ", app.config.refresh_interval_secs),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(status, Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Normal => {
            let help = " [r] Refresh [c] Chart type [v] Volume [n] Navigator [←→] Pan [+/-] Zoom [?] Help [q] Quit ";
            if let Some(msg) = &app.status_message {
                Line::from(vec![
                    Span::styled(msg, Style::default().fg(Color::Yellow)),
                    Span::raw(" | "),
                    Span::styled(help, Style::default().fg(Color::DarkGray)),
                ])
            } else {
                Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))
            }
        }
        InputMode::Help => Line::from(Span::styled(
            " [?/Enter/Esc] Close help ",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let footer = Paragraph::new(content).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn help_section(title: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("─── {} ", title),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            "───────────────────────────",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn help_binding(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:12}", key), Style::default().fg(Color::Cyan)),
        Span::raw(desc.to_string()),
    ])
}

fn help_content() -> Vec<Line<'static>> {
    vec![
        help_section("General"),
        help_binding("q", "Quit"),
        help_binding("r", "Refresh price and chart now"),
        help_binding("?", "Show this help"),
        Line::from(""),
        help_section("Chart"),
        help_binding("c", "Cycle chart type"),
        help_binding("v", "Toggle volume"),
        help_binding("n", "Toggle navigator"),
        help_binding("h / ←", "Pan left"),
        help_binding("l / →", "Pan right"),
        help_binding("+", "Zoom in"),
        help_binding("-", "Zoom out"),
        Line::from(""),
        Line::from(Span::styled(
            "  [?/Enter/Esc] Close",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let outer_block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner_area = outer_block.inner(area);
    frame.render_widget(outer_block, area);

    frame.render_widget(
        Paragraph::new(help_content()).alignment(Alignment::Left),
        inner_area,
    );
}
