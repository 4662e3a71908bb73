use crate::api::Candle;
use crate::app::App;
use crate::config::ChartType;
use chrono::DateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as Segment, Points, Rectangle},
        Block, Borders, Paragraph, Sparkline,
    },
    Frame,
};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;
use super::formatters::display_price;

const Y_AXIS_WIDTH: u16 = 12;
const Y_LABEL_LENGTH: usize = 10;
const CANDLE_HALF_WIDTH: f64 = 0.3;

/// What a series renderer draws: the visible candles plus the bottom of the
/// y axis, which area fills extend down to.
pub struct Plot<'a> {
    pub candles: &'a [Candle],
    pub floor: f64,
}

type Renderer = fn(&mut Context<'_>, &Plot<'_>);

/// Registry of the series kinds the chart panel can draw.
pub struct ChartEngine {
    renderers: HashMap<ChartType, Renderer>,
}

static CHART_ENGINE: OnceLock<ChartEngine> = OnceLock::new();

/// Register the built-in series kinds. Only the first call does any work and
/// the registration is never torn down.
pub fn ensure_chart_engine_initialized() -> &'static ChartEngine {
    CHART_ENGINE.get_or_init(|| {
        let engine = ChartEngine::with_builtin_series();
        debug!(kinds = engine.renderers.len(), "chart engine initialized");
        engine
    })
}

pub fn is_chart_engine_initialized() -> bool {
    CHART_ENGINE.get().is_some()
}

impl ChartEngine {
    fn with_builtin_series() -> Self {
        let mut renderers: HashMap<ChartType, Renderer> = HashMap::new();
        renderers.insert(ChartType::Line, render_line);
        renderers.insert(ChartType::Area, render_area);
        renderers.insert(ChartType::Candlestick, render_candles);
        renderers.insert(ChartType::HollowCandlestick, render_hollow_candles);
        // Smoothing happens in ChartState; the bars draw like candles.
        renderers.insert(ChartType::HeikinAshi, render_candles);
        Self { renderers }
    }

    pub fn supports(&self, chart_type: ChartType) -> bool {
        self.renderers.contains_key(&chart_type)
    }

    fn renderer(&self, chart_type: ChartType) -> Option<Renderer> {
        self.renderers.get(&chart_type).copied()
    }
}

fn render_line(ctx: &mut Context<'_>, plot: &Plot<'_>) {
    let candles = plot.candles;
    if let [only] = candles {
        ctx.draw(&Points {
            coords: &[(0.0, only.close)],
            color: Color::Cyan,
        });
        return;
    }
    for (i, pair) in candles.windows(2).enumerate() {
        let x = i as f64;
        ctx.draw(&Segment::new(x, pair[0].close, x + 1.0, pair[1].close, Color::Cyan));
    }
}

fn render_area(ctx: &mut Context<'_>, plot: &Plot<'_>) {
    for (i, c) in plot.candles.iter().enumerate() {
        let x = i as f64;
        ctx.draw(&Segment::new(x, plot.floor, x, c.close, Color::Blue));
        if let Some(next) = plot.candles.get(i + 1) {
            let mid = (c.close + next.close) / 2.0;
            ctx.draw(&Segment::new(x + 0.5, plot.floor, x + 0.5, mid, Color::Blue));
        }
    }
    ctx.layer();
    render_line(ctx, plot);
}

fn candle_color(c: &Candle) -> Color {
    if c.close >= c.open {
        Color::Green
    } else {
        Color::Red
    }
}

fn render_candles(ctx: &mut Context<'_>, plot: &Plot<'_>) {
    for (i, c) in plot.candles.iter().enumerate() {
        let x = i as f64;
        let color = candle_color(c);
        ctx.draw(&Segment::new(x, c.low, x, c.high, color));
        for offset in [-CANDLE_HALF_WIDTH, -CANDLE_HALF_WIDTH / 2.0, CANDLE_HALF_WIDTH / 2.0, CANDLE_HALF_WIDTH] {
            ctx.draw(&Segment::new(x + offset, c.open, x + offset, c.close, color));
        }
    }
}

/// Rising bars are drawn as outlines, falling bars filled. Colour follows the
/// previous close.
fn render_hollow_candles(ctx: &mut Context<'_>, plot: &Plot<'_>) {
    let mut prev_close: Option<f64> = None;
    for (i, c) in plot.candles.iter().enumerate() {
        let x = i as f64;
        let color = match prev_close {
            Some(p) if c.close < p => Color::Red,
            _ => Color::Green,
        };
        let (body_lo, body_hi) = (c.open.min(c.close), c.open.max(c.close));

        ctx.draw(&Segment::new(x, body_hi, x, c.high, color));
        ctx.draw(&Segment::new(x, c.low, x, body_lo, color));
        if c.close >= c.open {
            ctx.draw(&Rectangle {
                x: x - CANDLE_HALF_WIDTH,
                y: body_lo,
                width: CANDLE_HALF_WIDTH * 2.0,
                height: body_hi - body_lo,
                color,
            });
        } else {
            for offset in [-CANDLE_HALF_WIDTH, 0.0, CANDLE_HALF_WIDTH] {
                ctx.draw(&Segment::new(x + offset, body_lo, x + offset, body_hi, color));
            }
        }
        prev_close = Some(c.close);
    }
}

/// Unix milliseconds as a calendar date.
pub fn date_label(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Pad the price bounds so flat series and extreme bars stay visible.
fn padded_bounds((lo, hi): (f64, f64)) -> (f64, f64) {
    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        (hi.abs() * 0.01).max(f64::MIN_POSITIVE)
    };
    (lo - pad, hi + pad)
}

/// Scale values into 0..=100 for a sparkline.
fn normalize(values: impl Iterator<Item = f64> + Clone) -> Vec<u64> {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range > 0.0 {
        values.map(|v| ((v - min) / range * 100.0) as u64).collect()
    } else {
        values.map(|_| 50u64).collect()
    }
}

pub fn draw_chart(frame: &mut Frame, area: Rect, app: &App) {
    let config = app.chart.config();
    let (max_width, max_height) = config.max_size();
    let area = Rect {
        width: area.width.min(max_width),
        height: area.height.min(max_height),
        ..area
    };

    let source = if app.chart_is_remote() { "remote" } else { "synthetic" };
    let outer_block = Block::default()
        .title(format!(" Chart · {} ({}) ", config.chart_type().label(), source))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner_area = outer_block.inner(area);
    frame.render_widget(outer_block, area);

    if app.chart.is_empty() {
        let message = if app.chart_loading {
            "Loading chart..."
        } else {
            "Chart data unavailable"
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
            inner_area,
        );
        return;
    }

    let engine = ensure_chart_engine_initialized();
    let Some(renderer) = engine.renderer(config.chart_type()) else {
        frame.render_widget(
            Paragraph::new("Chart type unavailable").style(Style::default().fg(Color::Red)),
            inner_area,
        );
        return;
    };

    let mut constraints = Vec::new();
    if config.show_token_header() {
        constraints.push(Constraint::Length(1));
    }
    if config.show_range_selector() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(5));
    constraints.push(Constraint::Length(1));
    if config.show_volume() {
        constraints.push(Constraint::Length(4));
    }
    if config.show_navigator() {
        constraints.push(Constraint::Length(3));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner_area);
    let mut rows = chunks.iter().copied();

    if config.show_token_header()
        && let Some(row) = rows.next()
    {
        draw_token_header(frame, row, app);
    }
    if config.show_range_selector()
        && let Some(row) = rows.next()
    {
        draw_range_selector(frame, row, app);
    }
    if let Some(row) = rows.next() {
        draw_plot(frame, row, app, renderer);
    }
    if let Some(row) = rows.next() {
        draw_x_axis(frame, row, app);
    }
    if config.show_volume()
        && let Some(row) = rows.next()
    {
        draw_volume(frame, row, app);
    }
    if config.show_navigator()
        && let Some(row) = rows.next()
    {
        draw_navigator(frame, row, app);
    }
}

fn draw_plot(frame: &mut Frame, area: Rect, app: &App, renderer: Renderer) {
    let visible = app.chart.visible();
    let Some(bounds) = app.chart.price_bounds() else {
        return;
    };
    let (lo, hi) = padded_bounds(bounds);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(Y_AXIS_WIDTH), Constraint::Min(10)])
        .split(area);

    let mut y_axis = vec![Line::from(Span::styled(
        display_price(bounds.1, Y_LABEL_LENGTH),
        Style::default().fg(Color::Green),
    ))];
    for _ in 2..chunks[0].height {
        y_axis.push(Line::from(""));
    }
    y_axis.push(Line::from(Span::styled(
        display_price(bounds.0, Y_LABEL_LENGTH),
        Style::default().fg(Color::Red),
    )));
    frame.render_widget(Paragraph::new(y_axis).alignment(Alignment::Right), chunks[0]);

    let plot = Plot {
        candles: visible,
        floor: lo,
    };
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-0.5, visible.len() as f64 - 0.5])
        .y_bounds([lo, hi])
        .paint(|ctx| renderer(ctx, &plot));
    frame.render_widget(canvas, chunks[1]);
}

fn draw_x_axis(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.chart.visible();
    let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(Y_AXIS_WIDTH), Constraint::Min(10)])
        .split(area);
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let style = Style::default().fg(Color::DarkGray);
    frame.render_widget(
        Paragraph::new(Span::styled(date_label(first.timestamp), style)),
        halves[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(date_label(last.timestamp), style)).alignment(Alignment::Right),
        halves[1],
    );
}

fn draw_token_header(frame: &mut Frame, area: Rect, app: &App) {
    let data = app.ticker.data();
    let line = Line::from(vec![
        Span::styled(
            format!("{}/{} ", data.token_primary.token_symbol, data.token_pair.token_symbol),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            display_price(data.token_price, app.config.max_price_length),
            Style::default().fg(Color::White),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_range_selector(frame: &mut Frame, area: Rect, app: &App) {
    let visible = app.chart.visible();
    let (start, end) = app.chart.range();
    let span = match (visible.first(), visible.last()) {
        (Some(first), Some(last)) => format!("{} → {}", date_label(first.timestamp), date_label(last.timestamp)),
        _ => String::new(),
    };

    let line = Line::from(vec![
        Span::styled("Range: ", Style::default().fg(Color::DarkGray)),
        Span::styled(span, Style::default().fg(Color::White)),
        Span::styled(
            format!("  ({} of {} candles, {}-{})", end - start, app.chart.series().len(), start + 1, end),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("  [←→] Pan [+/-] Zoom", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_volume(frame: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .chart
        .visible()
        .iter()
        .map(|c| c.volume.max(0.0) as u64)
        .collect();

    let sparkline = Sparkline::default()
        .block(Block::default().title(" Volume ").borders(Borders::TOP))
        .data(&data)
        .style(Style::default().fg(Color::Magenta));
    frame.render_widget(sparkline, area);
}

fn draw_navigator(frame: &mut Frame, area: Rect, app: &App) {
    let series = app.chart.series();
    let (start, end) = app.chart.range();
    let data = normalize(series.iter().map(|c| c.close));

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(format!(" Navigator {}-{}/{} ", start + 1, end, series.len()))
                .borders(Borders::TOP),
        )
        .data(&data)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(sparkline, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_registers_every_chart_type() {
        let engine = ensure_chart_engine_initialized();
        for chart_type in ChartType::ALL {
            assert!(engine.supports(chart_type), "{:?} missing", chart_type);
        }
    }

    #[test]
    fn engine_initialization_is_idempotent() {
        let first = ensure_chart_engine_initialized();
        let second = ensure_chart_engine_initialized();
        assert!(std::ptr::eq(first, second));
        assert!(is_chart_engine_initialized());
    }

    #[test]
    fn date_label_formats_utc_day() {
        assert_eq!(date_label(0), "1970-01-01");
        assert_eq!(date_label(1_700_000_000_000), "2023-11-14");
    }

    #[test]
    fn flat_bounds_still_get_padding() {
        let (lo, hi) = padded_bounds((2.0, 2.0));
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn normalize_spans_zero_to_hundred() {
        let data = normalize([1.0, 3.0, 2.0].into_iter());
        assert_eq!(data, vec![0, 100, 50]);
        assert_eq!(normalize([4.0, 4.0].into_iter()), vec![50, 50]);
    }
}
