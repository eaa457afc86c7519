//! Inline SVG charts for the dashboard.
//!
//! Dates map linearly onto the x axis by day number, so series with different
//! trading calendars stay aligned. Undefined values split a line into segments
//! instead of being interpolated.

use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 320.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 20.0;
const PAD_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 5;

pub const UP_COLOR: &str = "#26a69a";
pub const DOWN_COLOR: &str = "#ef5350";

pub const PALETTE: &[&str] = &[
    "#00e5ff", "#ff4081", "#ffd740", "#69f0ae", "#b388ff", "#ff6e40", "#40c4ff", "#eeff41",
];

pub fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// How y-axis tick labels are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Price,
    /// Value is already a percentage.
    Percent,
    /// Value is a fraction; printed ×100 with a `%` suffix.
    Fraction,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Price => format!("{:.2}", value),
            ValueFormat::Percent => format!("{:.1}%", value),
            ValueFormat::Fraction => format!("{:.1}%", value * 100.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

/// One OHLC bar for [`candlestick_svg`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

struct Bounds {
    first: NaiveDate,
    last: NaiveDate,
    day_span: f64,
    min: f64,
    max: f64,
}

impl Bounds {
    fn of(series: &[LineSeries]) -> Option<Self> {
        let dates = series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d));
        let values = series
            .iter()
            .flat_map(|s| s.points.iter().filter_map(|(_, v)| *v));
        Self::span(dates, values)
    }

    fn of_candles(candles: &[Candle]) -> Option<Self> {
        let dates = candles.iter().map(|c| c.date);
        let values = candles.iter().flat_map(|c| [c.low, c.high]);
        Self::span(dates, values)
    }

    fn span<D, V>(dates: D, values: V) -> Option<Self>
    where
        D: Iterator<Item = NaiveDate> + Clone,
        V: Iterator<Item = f64>,
    {
        let first = dates.clone().min()?;
        let last = dates.max()?;

        let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        if max - min < f64::EPSILON {
            let pad = if min.abs() > f64::EPSILON { min.abs() * 0.05 } else { 1.0 };
            min -= pad;
            max += pad;
        }

        Some(Self {
            first,
            last,
            day_span: (day_number(last) - day_number(first)).max(1) as f64,
            min,
            max,
        })
    }

    fn x(&self, date: NaiveDate) -> f64 {
        let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
        PAD_LEFT + (day_number(date) - day_number(self.first)) as f64 / self.day_span * plot_width
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
        HEIGHT - PAD_BOTTOM - (value - self.min) / (self.max - self.min) * plot_height
    }
}

fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Runs of consecutive defined values.
fn segments(points: &[(NaiveDate, Option<f64>)]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for &(date, value) in points {
        match value {
            Some(v) => current.push((date, v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn open_svg(out: &mut String, aria_label: &str) {
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="100%" role="img" aria-label="{label}">"#,
        w = WIDTH,
        h = HEIGHT,
        label = aria_label,
    );
}

fn no_data(aria_label: &str) -> String {
    let mut out = String::new();
    open_svg(&mut out, aria_label);
    let _ = write!(
        out,
        r#"<text x="{:.0}" y="{:.0}" text-anchor="middle" class="empty">No data in range</text></svg>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0
    );
    out
}

/// Multi-series line chart. `aria_label` must already be HTML-escaped.
pub fn line_chart_svg(aria_label: &str, series: &[LineSeries], format: ValueFormat) -> String {
    let Some(bounds) = Bounds::of(series) else {
        return no_data(aria_label);
    };

    let mut out = String::new();
    open_svg(&mut out, aria_label);
    axes(&mut out, &bounds, format);

    for (index, s) in series.iter().enumerate() {
        for segment in segments(&s.points) {
            let points: Vec<String> = segment
                .iter()
                .map(|&(date, value)| format!("{:.1},{:.1}", bounds.x(date), bounds.y(value)))
                .collect();
            let _ = write!(
                out,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"><title>{}</title></polyline>"#,
                color(index),
                points.join(" "),
                s.label,
            );
        }
    }

    out.push_str("</svg>");
    out
}

/// OHLC chart: a wick from low to high and a body from open to close per bar.
pub fn candlestick_svg(aria_label: &str, candles: &[Candle]) -> String {
    let Some(bounds) = Bounds::of_candles(candles) else {
        return no_data(aria_label);
    };

    let mut out = String::new();
    open_svg(&mut out, aria_label);
    axes(&mut out, &bounds, ValueFormat::Price);

    let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
    let slots = (bounds.day_span + 1.0).max(candles.len() as f64);
    let body_width = (plot_width / slots * 0.6).clamp(1.0, 24.0);

    for candle in candles {
        let x = bounds.x(candle.date);
        let (class, fill) = if candle.is_up() {
            ("up", UP_COLOR)
        } else {
            ("down", DOWN_COLOR)
        };
        let body_top = bounds.y(candle.open.max(candle.close));
        let body_height = (bounds.y(candle.open.min(candle.close)) - body_top).max(1.0);
        let _ = write!(
            out,
            r#"<g class="candle {class}"><title>{date} O {o:.2} H {h:.2} L {l:.2} C {c:.2}</title><line x1="{x:.1}" y1="{hy:.1}" x2="{x:.1}" y2="{ly:.1}" stroke="{fill}"/><rect x="{bx:.1}" y="{by:.1}" width="{bw:.1}" height="{bh:.1}" fill="{fill}"/></g>"#,
            class = class,
            date = candle.date,
            o = candle.open,
            h = candle.high,
            l = candle.low,
            c = candle.close,
            x = x,
            hy = bounds.y(candle.high),
            ly = bounds.y(candle.low),
            fill = fill,
            bx = x - body_width / 2.0,
            by = body_top,
            bw = body_width,
            bh = body_height,
        );
    }

    out.push_str("</svg>");
    out
}

/// Grid lines with value ticks, a zero line when the range crosses it, and the
/// first and last date under the x axis.
fn axes(out: &mut String, bounds: &Bounds, format: ValueFormat) {
    for tick in 0..=Y_TICKS {
        let value = bounds.min + (bounds.max - bounds.min) * tick as f64 / Y_TICKS as f64;
        let y = bounds.y(value);
        let _ = write!(
            out,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" class="grid"/><text x="{:.1}" y="{:.1}" text-anchor="end" class="tick">{}</text>"#,
            PAD_LEFT,
            WIDTH - PAD_RIGHT,
            PAD_LEFT - 6.0,
            y + 4.0,
            format.format(value),
            y = y,
        );
    }

    if bounds.min < 0.0 && bounds.max > 0.0 {
        let y = bounds.y(0.0);
        let _ = write!(
            out,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" class="zero"/>"#,
            PAD_LEFT,
            WIDTH - PAD_RIGHT,
            y = y,
        );
    }

    let _ = write!(
        out,
        r#"<text x="{:.1}" y="{:.1}" class="tick">{}</text><text x="{:.1}" y="{:.1}" text-anchor="end" class="tick">{}</text>"#,
        PAD_LEFT,
        HEIGHT - 12.0,
        bounds.first,
        WIDTH - PAD_RIGHT,
        HEIGHT - 12.0,
        bounds.last,
    );
}

/// Horizontal-baseline bar chart of fractions (e.g. cumulative returns).
pub fn bar_chart_svg(aria_label: &str, bars: &[(String, f64)]) -> String {
    if bars.is_empty() {
        return no_data(aria_label);
    }

    let min = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let span = if max - min > f64::EPSILON { max - min } else { 1.0 };

    let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
    let slot = plot_width / bars.len() as f64;
    let bar_width = slot * 0.7;
    let y_of = |v: f64| HEIGHT - PAD_BOTTOM - (v - min) / span * plot_height;
    let baseline = y_of(0.0);

    let mut out = String::new();
    open_svg(&mut out, aria_label);
    let _ = write!(
        out,
        r#"<line x1="{:.1}" y1="{b:.1}" x2="{:.1}" y2="{b:.1}" class="zero"/>"#,
        PAD_LEFT,
        WIDTH - PAD_RIGHT,
        b = baseline,
    );

    for (index, (label, value)) in bars.iter().enumerate() {
        let x = PAD_LEFT + slot * index as f64 + (slot - bar_width) / 2.0;
        let top = y_of(*value).min(baseline);
        let height = (y_of(*value) - baseline).abs();
        let _ = write!(
            out,
            r#"<rect x="{x:.1}" y="{top:.1}" width="{bw:.1}" height="{height:.1}" fill="{c}"><title>{label}: {v}</title></rect><text x="{cx:.1}" y="{ly:.1}" text-anchor="middle" class="tick">{label}</text><text x="{cx:.1}" y="{vy:.1}" text-anchor="middle" class="value">{v}</text>"#,
            x = x,
            top = top,
            bw = bar_width,
            height = height,
            c = color(index),
            label = label,
            v = ValueFormat::Fraction.format(*value),
            cx = x + bar_width / 2.0,
            ly = HEIGHT - 12.0,
            vy = top - 4.0,
        );
    }

    out.push_str("</svg>");
    out
}
