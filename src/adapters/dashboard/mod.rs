//! Self-contained HTML dashboard implementing [`ReportPort`].
//!
//! One page per filter pass: price comparison, a candlestick chart and moving
//! averages for a focus asset, daily and cumulative return comparisons, final
//! race standings, a per-asset summary and the combined data table (newest
//! first). Charts are inline SVG from [`chart_svg`]; tables come from
//! [`tables`].

pub mod chart_svg;
pub mod tables;

use std::fmt::Write;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::error::StockscopeError;
use crate::domain::indicator::engine::{MA_FAST_PERIOD, MA_SLOW_PERIOD};
use crate::domain::indicator::{IndicatorRow, IndicatorSeries, IndicatorType};
use crate::domain::race::{AssetSummary, final_standings};
use crate::ports::report_port::{ReportContext, ReportPort};
use chart_svg::{Candle, LineSeries, ValueFormat, bar_chart_svg, candlestick_svg, line_chart_svg};
use tables::escape_html;

pub const DEFAULT_TABLE_ROWS: usize = 500;

const STYLE: &str = r#"
body { background: #0e1117; color: #e6e6e6; font-family: system-ui, sans-serif; margin: 2rem; }
h1 { margin-bottom: 0.2rem; }
h2 { margin-top: 2.5rem; border-bottom: 1px solid #333; padding-bottom: 0.3rem; }
.meta { color: #9aa0a6; }
.legend span { margin-right: 1.2rem; }
.legend i { display: inline-block; width: 0.9rem; height: 0.9rem; margin-right: 0.3rem; vertical-align: middle; }
svg .grid { stroke: #2a2f3a; }
svg .zero { stroke: #777; stroke-dasharray: 4 3; }
svg .tick, svg .value { fill: #9aa0a6; font-size: 11px; }
svg .empty { fill: #9aa0a6; font-size: 16px; }
table { border-collapse: collapse; font-size: 0.85rem; }
th, td { border: 1px solid #2a2f3a; padding: 0.25rem 0.6rem; text-align: right; }
th { background: #1a1f2b; }
.empty, .note { color: #9aa0a6; }
"#;

#[derive(Debug, Clone)]
pub struct HtmlReportAdapter {
    table_rows: usize,
}

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self {
            table_rows: DEFAULT_TABLE_ROWS,
        }
    }

    /// Cap on data table rows; 0 shows every row.
    pub fn with_table_rows(mut self, table_rows: usize) -> Self {
        self.table_rows = table_rows;
        self
    }

    pub fn render(&self, ctx: &ReportContext<'_, '_>) -> String {
        let series = ctx.series;
        let assets = series.asset_ids();
        let title = escape_html(ctx.title);

        let mut page = String::new();
        let _ = write!(
            page,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n<p class=\"meta\">{} to {} &middot; {} asset(s) &middot; {} row(s)</p>\n",
            ctx.range.start,
            ctx.range.end,
            assets.len(),
            series.len(),
        );

        let closes = per_asset(series, &assets, |r| Some(r.close()));
        section(
            &mut page,
            "Closing Price Comparison",
            &closes,
            line_chart_svg("Closing Price Comparison", &closes, ValueFormat::Price),
        );

        let focus = ctx.focus_asset.or_else(|| assets.first().copied());
        match focus {
            Some(asset) if assets.contains(&asset) => {
                let heading = format!("Candlestick: {}", escape_html(asset));
                let _ = writeln!(page, "<h2>{}</h2>", heading);
                page.push_str(&candlestick_svg(&heading, &candles(series, asset)));
                page.push('\n');

                let heading = format!("Moving Averages: {}", escape_html(asset));
                let lines = focus_lines(series, asset);
                section(
                    &mut page,
                    &heading,
                    &lines,
                    line_chart_svg(&heading, &lines, ValueFormat::Price),
                );
            }
            _ => {
                page.push_str("<h2>Candlestick</h2>\n<p class=\"empty\">No focus asset in range.</p>\n");
                page.push_str("<h2>Moving Averages</h2>\n<p class=\"empty\">No focus asset in range.</p>\n");
            }
        }

        let daily = per_asset(series, &assets, |r| r.daily_return_pct);
        section(
            &mut page,
            "Daily Return %",
            &daily,
            line_chart_svg("Daily Return %", &daily, ValueFormat::Percent),
        );

        let cumulative = per_asset(series, &assets, |r| r.cumulative_return);
        section(
            &mut page,
            "Cumulative Performance",
            &cumulative,
            line_chart_svg("Cumulative Performance", &cumulative, ValueFormat::Fraction),
        );

        let standings = final_standings(series);
        let bars: Vec<(String, f64)> = standings
            .iter()
            .map(|e| (escape_html(&e.asset_id), e.cumulative_return))
            .collect();
        page.push_str("<h2>Growth Race: Final Standings</h2>\n");
        page.push_str(&bar_chart_svg("Growth Race", &bars));
        page.push('\n');
        page.push_str(&tables::render_standings_table(&standings));

        page.push_str("<h2>Asset Summary</h2>\n");
        page.push_str(&tables::render_summary_table(&AssetSummary::compute_per_asset(series)));

        page.push_str("<h2>Data</h2>\n");
        page.push_str(&tables::render_data_table(
            &series.newest_first(),
            &series.extra_columns(),
            self.table_rows,
        ));

        page.push_str("</body>\n</html>\n");
        page
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn per_asset<F>(series: &IndicatorSeries<'_>, assets: &[&str], value: F) -> Vec<LineSeries>
where
    F: Fn(&IndicatorRow<'_>) -> Option<f64>,
{
    assets
        .iter()
        .map(|asset| LineSeries {
            label: escape_html(asset),
            points: series.rows_for(asset).map(|r| (r.date(), value(r))).collect(),
        })
        .collect()
}

fn focus_lines(series: &IndicatorSeries<'_>, asset: &str) -> Vec<LineSeries> {
    let rows: Vec<_> = series.rows_for(asset).collect();
    let line = |label: String, value: fn(&IndicatorRow<'_>) -> Option<f64>| LineSeries {
        label,
        points: rows.iter().map(|r| (r.date(), value(r))).collect(),
    };
    vec![
        line("Close".to_string(), |r| Some(r.close())),
        line(IndicatorType::Sma(MA_FAST_PERIOD).to_string(), |r| r.ma20),
        line(IndicatorType::Sma(MA_SLOW_PERIOD).to_string(), |r| r.ma50),
    ]
}

fn candles(series: &IndicatorSeries<'_>, asset: &str) -> Vec<Candle> {
    series
        .rows_for(asset)
        .map(|r| Candle {
            date: r.record.date,
            open: r.record.open,
            high: r.record.high,
            low: r.record.low,
            close: r.record.close,
        })
        .collect()
}

fn section(page: &mut String, heading: &str, lines: &[LineSeries], svg: String) {
    let _ = writeln!(page, "<h2>{}</h2>", heading);
    page.push_str("<div class=\"legend\">");
    for (index, line) in lines.iter().enumerate() {
        let _ = write!(
            page,
            "<span><i style=\"background:{}\"></i>{}</span>",
            chart_svg::color(index),
            line.label
        );
    }
    page.push_str("</div>\n");
    page.push_str(&svg);
    page.push('\n');
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, ctx: &ReportContext<'_, '_>, output_path: &Path) -> Result<(), StockscopeError> {
        let html = self.render(ctx);

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;

        info!(
            path = %output_path.display(),
            rows = ctx.series.len(),
            "dashboard written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{self, DateRange};
    use crate::domain::indicator::IndicatorEngine;
    use crate::domain::price_record::PriceRecord;
    use crate::domain::series_table::SeriesTable;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_table() -> SeriesTable {
        let mut records = Vec::new();
        for (i, close) in [10.0, 20.0, 30.0, 40.0].into_iter().enumerate() {
            records.push(PriceRecord::new("AAA", d(i as u32 + 1), close, close, close, close));
            records.push(PriceRecord::new("BBB", d(i as u32 + 1), 5.0, 5.0, 5.0, 5.0));
        }
        SeriesTable::from_records(records).unwrap()
    }

    fn render_with<F: FnOnce(&ReportContext<'_, '_>)>(table: &SeriesTable, focus: Option<&str>, f: F) {
        let assets: BTreeSet<String> = table.asset_ids().map(str::to_string).collect();
        let range = DateRange::full(table).unwrap();
        let view = filter::apply(table, &assets, range).unwrap();
        let series = IndicatorEngine::compute(&view);
        let ctx = ReportContext {
            title: "Prices <&> Returns",
            series: &series,
            range,
            focus_asset: focus,
        };
        f(&ctx);
    }

    #[test]
    fn render_contains_every_section() {
        let table = sample_table();
        render_with(&table, None, |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            for heading in [
                "Closing Price Comparison",
                "Candlestick: AAA",
                "Moving Averages: AAA",
                "Daily Return %",
                "Cumulative Performance",
                "Growth Race: Final Standings",
                "Asset Summary",
                "<h2>Data</h2>",
            ] {
                assert!(html.contains(heading), "missing {heading}");
            }
            assert!(html.contains("2024-01-01 to 2024-01-04"));
            assert!(html.contains("2 asset(s) &middot; 8 row(s)"));
        });
    }

    #[test]
    fn title_is_escaped() {
        let table = sample_table();
        render_with(&table, None, |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            assert!(html.contains("<h1>Prices &lt;&amp;&gt; Returns</h1>"));
        });
    }

    #[test]
    fn focus_asset_selects_ma_chart() {
        let table = sample_table();
        render_with(&table, Some("BBB"), |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            assert!(html.contains("Moving Averages: BBB"));
            assert!(!html.contains("Moving Averages: AAA"));
            assert!(html.contains("Candlestick: BBB"));
            assert!(html.contains(">MA20</span>"));
            assert!(html.contains(">MA50</span>"));
        });
    }

    #[test]
    fn candlestick_covers_focus_rows_only() {
        let table = sample_table();
        render_with(&table, Some("AAA"), |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            assert_eq!(html.matches(r#"<g class="candle "#).count(), 4);
            assert!(html.contains("2024-01-04 O 40.00 H 40.00 L 40.00 C 40.00"));
            assert!(!html.contains("O 5.00 H 5.00"));
        });
    }

    #[test]
    fn extra_columns_reach_data_table() {
        let table = SeriesTable::from_records(vec![
            PriceRecord::new("AAA", d(1), 1.0, 1.0, 1.0, 1.0).with_extra("Volume", "777"),
            PriceRecord::new("AAA", d(2), 2.0, 2.0, 2.0, 2.0).with_extra("Volume", "888"),
        ])
        .unwrap();
        render_with(&table, None, |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            assert!(html.contains("<th>Volume</th>"));
            assert!(html.contains("<td>888</td></tr>"));
        });
    }

    #[test]
    fn missing_focus_asset_renders_placeholder() {
        let table = sample_table();
        render_with(&table, Some("ZZZ"), |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            assert!(html.contains("No focus asset in range."));
        });
    }

    #[test]
    fn data_table_is_newest_first() {
        let table = sample_table();
        render_with(&table, None, |ctx| {
            let html = HtmlReportAdapter::new().render(ctx);
            let newest = html.find("<tr><td>2024-01-04</td><td>AAA</td>").unwrap();
            let oldest = html.find("<tr><td>2024-01-01</td><td>AAA</td>").unwrap();
            assert!(newest < oldest);
        });
    }

    #[test]
    fn table_row_cap_applies() {
        let table = sample_table();
        render_with(&table, None, |ctx| {
            let html = HtmlReportAdapter::new().with_table_rows(3).render(ctx);
            assert!(html.contains("Showing the latest 3 of 8 rows."));
        });
    }

    #[test]
    fn empty_series_still_renders() {
        let series = IndicatorSeries::default();
        let ctx = ReportContext {
            title: "Empty",
            series: &series,
            range: DateRange::new(d(1), d(2)).unwrap(),
            focus_asset: None,
        };
        let html = HtmlReportAdapter::new().render(&ctx);
        assert!(html.contains("No data in range"));
        assert_eq!(html.matches("No focus asset in range.").count(), 2);
        assert!(html.contains("No rows in range."));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/dashboard.html");
        let table = sample_table();
        render_with(&table, None, |ctx| {
            HtmlReportAdapter::new().write(ctx, &path).unwrap();
        });
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
