use crate::app::App;
use crate::app::ticker::PriceDirection;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use super::formatters::*;

/// Social links shown on the card.
const SHOWN_SOCIAL_LINKS: usize = 2;

/// Rows the card needs, borders included.
pub const TICKER_CARD_HEIGHT: u16 = 7;

fn flash_color(direction: PriceDirection) -> Color {
    match direction {
        PriceDirection::Up => Color::Green,
        PriceDirection::Down => Color::Red,
        PriceDirection::Neutral => Color::White,
    }
}

const CURRENCY_SIGN: &str = "$";

/// Price as spans, with the zero count set apart from the digits. `max_len`
/// includes the currency sign.
pub fn price_spans(value: f64, max_len: usize, color: Color) -> Vec<Span<'static>> {
    let style = Style::default().fg(color).add_modifier(Modifier::BOLD);

    let price = match format_token_price(value) {
        Ok(price) => price,
        Err(_) => return vec![Span::styled("—", style)],
    };

    match fit_price(&price, max_len.saturating_sub(CURRENCY_SIGN.len())) {
        FittedPrice::Plain(text) => vec![Span::styled(format!("{}{}", CURRENCY_SIGN, text), style)],
        FittedPrice::Subscript { zeros, digits } => vec![
            Span::styled(format!("{}0.0", CURRENCY_SIGN), style),
            Span::styled(
                subscript_digits(zeros),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(digits, style),
        ],
    }
}

fn stat(label: &str, value: String) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
        Span::raw("   "),
    ]
}

fn identity_line(app: &App) -> Line<'static> {
    let data = app.ticker.data();
    Line::from(vec![
        Span::styled(
            format!("{}/{}", data.token_primary.token_symbol, data.token_pair.token_symbol),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(data.token_primary.token_name.clone(), Style::default().fg(Color::White)),
        Span::styled(
            format!("  {}", data.chain_name),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn price_line(app: &App) -> Line<'static> {
    let direction = app.flash.state();
    let mut spans = price_spans(
        app.ticker.data().token_price,
        app.config.max_price_length,
        flash_color(direction),
    );
    spans.push(Span::styled(
        format!(" {}", direction.arrow()),
        Style::default().fg(flash_color(direction)),
    ));
    Line::from(spans)
}

fn wallet_line(app: &App) -> Option<Line<'static>> {
    let data = app.ticker.data();
    if !app.config.show_wallet_balance || data.user_token_balance <= 0.0 {
        return None;
    }

    Some(Line::from(vec![
        Span::styled("Wallet: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            display_amount(data.user_token_balance),
            Style::default().fg(Color::White),
        ),
        Span::styled(" / ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("${}", display_amount(app.ticker.wallet_value())),
            Style::default().fg(Color::Green),
        ),
    ]))
}

fn stats_line(app: &App) -> Line<'static> {
    let data = app.ticker.data();
    let mut spans = Vec::new();
    spans.extend(stat("Liquidity", format!("${}", display_amount(data.liquidity))));
    spans.extend(stat("M Cap", format!("${}", display_amount(data.market_cap))));
    spans.extend(stat("Circ. M Cap", format!("${}", display_amount(data.circulating_market_cap))));
    spans.extend(stat("Total Supply", display_amount(data.total_supply)));
    Line::from(spans)
}

fn links_line(app: &App) -> Line<'static> {
    let data = app.ticker.data();
    let mut spans = vec![
        Span::styled("Pair: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            shorten_address(&data.token_pair_contract),
            Style::default().fg(Color::White),
        ),
    ];

    for (network, url) in data.social_links.entries().into_iter().take(SHOWN_SOCIAL_LINKS) {
        spans.push(Span::styled(format!("   {}: ", network), Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(truncate_str(url, 32), Style::default().fg(Color::Blue)));
    }

    Line::from(spans)
}

pub fn draw_ticker(frame: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![identity_line(app), price_line(app)];
    if let Some(wallet) = wallet_line(app) {
        content.push(wallet);
    }
    content.push(stats_line(app));
    content.push(links_line(app));

    let title = format!(" {} ", app.ticker.data().token_primary.token_name);
    let card = Paragraph::new(content)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(flash_color(app.flash.state()))),
        );

    frame.render_widget(card, area);
}
