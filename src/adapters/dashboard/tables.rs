//! HTML table fragments for the dashboard.

use crate::domain::indicator::IndicatorRow;
use crate::domain::race::{AssetSummary, RaceEntry};
use std::fmt::Write;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Blank cell for undefined values.
fn cell(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

fn pct_cell(fraction: Option<f64>) -> String {
    fraction
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_default()
}

pub fn render_summary_table(summaries: &[AssetSummary]) -> String {
    if summaries.is_empty() {
        return "<p class=\"empty\">No assets in range.</p>\n".to_string();
    }

    let mut out = String::from(
        "<table class=\"summary\">\n<thead><tr><th>Asset</th><th>From</th><th>To</th><th>Rows</th>\
         <th>First close</th><th>Last close</th><th>Cumulative</th><th>MA20</th><th>MA50</th>\
         <th>Mean daily %</th><th>Best day %</th><th>Worst day %</th></tr></thead>\n<tbody>\n",
    );
    for s in summaries {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&s.asset_id),
            s.first_date,
            s.last_date,
            s.rows,
            s.first_close,
            s.last_close,
            pct_cell(s.cumulative_return),
            cell(s.latest_ma20, 2),
            cell(s.latest_ma50, 2),
            cell(s.mean_daily_return_pct, 2),
            cell(s.best_daily_return_pct, 2),
            cell(s.worst_daily_return_pct, 2),
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

pub fn render_standings_table(standings: &[RaceEntry]) -> String {
    if standings.is_empty() {
        return String::new();
    }

    let mut out = String::from(
        "<table class=\"standings\">\n<thead><tr><th>#</th><th>Asset</th><th>Cumulative return</th></tr></thead>\n<tbody>\n",
    );
    for (place, entry) in standings.iter().enumerate() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            place + 1,
            escape_html(&entry.asset_id),
            pct_cell(Some(entry.cumulative_return)),
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

/// Combined data table. `rows` are expected newest first; `limit` of 0 means
/// every row. `extra_columns` are appended verbatim, blank where a row lacks
/// them.
pub fn render_data_table(rows: &[&IndicatorRow<'_>], extra_columns: &[&str], limit: usize) -> String {
    if rows.is_empty() {
        return "<p class=\"empty\">No rows in range.</p>\n".to_string();
    }

    let shown = if limit == 0 { rows.len() } else { rows.len().min(limit) };

    let mut out = String::from(
        "<table class=\"data\">\n<thead><tr><th>Date</th><th>Asset</th><th>Open</th><th>High</th>\
         <th>Low</th><th>Close</th><th>MA20</th><th>MA50</th><th>Daily Return %</th>\
         <th>Cumulative Return</th>",
    );
    for name in extra_columns {
        let _ = write!(out, "<th>{}</th>", escape_html(name));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &rows[..shown] {
        let r = row.record;
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            r.date,
            escape_html(&r.asset_id),
            r.open,
            r.high,
            r.low,
            r.close,
            cell(row.ma20, 2),
            cell(row.ma50, 2),
            cell(row.daily_return_pct, 2),
            pct_cell(row.cumulative_return),
        );
        for name in extra_columns {
            let _ = write!(
                out,
                "<td>{}</td>",
                escape_html(r.extra_field(name).unwrap_or_default())
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");

    if shown < rows.len() {
        let _ = writeln!(
            out,
            "<p class=\"note\">Showing the latest {} of {} rows.</p>",
            shown,
            rows.len()
        );
    }
    out
}
