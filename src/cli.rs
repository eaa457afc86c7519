//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvDirectoryAdapter;
use crate::adapters::dashboard::{DEFAULT_TABLE_ROWS, HtmlReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::StockscopeError;
use crate::domain::filter::{self, DateRange, FilteredView};
use crate::domain::indicator::{IndicatorEngine, IndicatorRow, IndicatorSeries};
use crate::domain::race::{final_standings, race_frames};
use crate::domain::selection::AssetSelection;
use crate::domain::series_table::SeriesTable;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportContext, ReportPort};

pub const DEFAULT_OUTPUT: &str = "dashboard.html";
pub const DEFAULT_TITLE: &str = "Multi-Asset Dashboard";

#[derive(Parser, Debug)]
#[command(
    name = "stockscope",
    version,
    about = "Explore daily price history and return indicators across assets"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// INI config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory of per-asset CSV files (overrides [data] dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// chrono format for the date column (overrides [data] date_format)
    #[arg(long)]
    pub date_format: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Comma-separated asset ids, or `all`
    #[arg(long)]
    pub assets: Option<String>,
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List assets with row count and date range
    Assets {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write the indicator table as CSV to stdout
    Indicators {
        #[command(flatten)]
        filter: FilterArgs,
        /// Sort rows latest date first
        #[arg(long)]
        newest_first: bool,
    },
    /// Print the cumulative return ranking
    Race {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the ranking for every date instead of the final standings
        #[arg(long)]
        frames: bool,
    },
    /// Write the HTML dashboard
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        /// Asset shown in the moving average chart
        #[arg(long)]
        focus: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Log filter directive for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Assets { source } => run_assets(&source),
        Command::Indicators {
            filter,
            newest_first,
        } => run_indicators(&filter, newest_first),
        Command::Race { filter, frames } => run_race(&filter, frames),
        Command::Report {
            filter,
            focus,
            output,
        } => run_report(&filter, focus.as_deref(), output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Config file when given, otherwise an empty config so every value comes
/// from flags or defaults.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, StockscopeError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_data_source(
    args: &SourceArgs,
    config: &dyn ConfigPort,
) -> Result<CsvDirectoryAdapter, StockscopeError> {
    let dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => config
            .get_value("data", "dir")
            .map(PathBuf::from)
            .ok_or_else(|| StockscopeError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            })?,
    };

    let date_format = args
        .date_format
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| config.get_value("data", "date_format"));

    let adapter = CsvDirectoryAdapter::new(dir);
    Ok(match date_format {
        Some(format) => adapter.with_date_format(format),
        None => adapter,
    })
}

/// Filter parameters after merging flags over `[filter]` config values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub selection: AssetSelection,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

fn config_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, StockscopeError> {
    match config.get_date("filter", key) {
        None => Ok(None),
        Some(Ok(date)) => Ok(Some(date)),
        Some(Err(raw)) => Err(StockscopeError::ConfigInvalid {
            section: "filter".into(),
            key: key.into(),
            reason: format!("invalid date '{raw}' (expected YYYY-MM-DD)"),
        }),
    }
}

pub fn build_query(args: &FilterArgs, config: &dyn ConfigPort) -> Result<Query, StockscopeError> {
    let selection = match args.assets.as_deref() {
        Some(flag) => {
            AssetSelection::parse(Some(flag)).map_err(|e| StockscopeError::InvalidArgument {
                flag: "assets".into(),
                reason: e.to_string(),
            })?
        }
        None => AssetSelection::parse(config.get_string("filter", "assets").as_deref()).map_err(
            |e| StockscopeError::ConfigInvalid {
                section: "filter".into(),
                key: "assets".into(),
                reason: e.to_string(),
            },
        )?,
    };

    let start = match args.start {
        Some(date) => Some(date),
        None => config_date(config, "start_date")?,
    };
    let end = match args.end {
        Some(date) => Some(date),
        None => config_date(config, "end_date")?,
    };

    Ok(Query {
        selection,
        start,
        end,
    })
}

/// Open bounds fall back to the table's overall date bounds.
pub fn resolve_range(query: &Query, table: &SeriesTable) -> Result<DateRange, StockscopeError> {
    let bounds = table.date_bounds();
    let start = query.start.or(bounds.map(|(lo, _)| lo));
    let end = query.end.or(bounds.map(|(_, hi)| hi));

    match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        _ => Err(StockscopeError::data_load(
            "table",
            "no price rows loaded and no date range given",
        )),
    }
}

/// Validates the query against the table and applies the filter.
pub fn prepare<'t>(
    table: &'t SeriesTable,
    query: &Query,
) -> Result<(FilteredView<'t>, DateRange), StockscopeError> {
    if let Some(asset) = query.selection.unknown(table).into_iter().next() {
        return Err(StockscopeError::UnknownAsset { asset });
    }
    let range = resolve_range(query, table)?;
    let selected = query.selection.resolve(table);
    let view = filter::apply(table, &selected, range)?;
    if view.is_empty() {
        warn!(start = %range.start, end = %range.end, "no rows match the current filter");
    }
    Ok((view, range))
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Indicator fields followed by one field per `extras` column, blank where
/// the row's file lacks it.
fn indicator_record(row: &IndicatorRow<'_>, extras: &[&str]) -> Vec<String> {
    let r = row.record;
    let mut fields = vec![
        r.date.to_string(),
        r.asset_id.clone(),
        r.open.to_string(),
        r.high.to_string(),
        r.low.to_string(),
        r.close.to_string(),
        opt(row.ma20),
        opt(row.ma50),
        opt(row.daily_return_pct),
        opt(row.cumulative_return),
    ];
    fields.extend(
        extras
            .iter()
            .map(|name| r.extra_field(name).unwrap_or_default().to_string()),
    );
    fields
}

pub const INDICATOR_HEADER: [&str; 10] = [
    "date",
    "asset_id",
    "open",
    "high",
    "low",
    "close",
    "ma20",
    "ma50",
    "daily_return_pct",
    "cumulative_return",
];

/// Undefined indicator values are written as empty fields. Pass-through
/// columns from the source files follow the indicator columns.
pub fn write_indicator_csv<W: Write>(
    series: &IndicatorSeries<'_>,
    newest_first: bool,
    out: W,
) -> Result<(), StockscopeError> {
    let extras = series.extra_columns();
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(INDICATOR_HEADER.iter().chain(&extras))
        .map_err(io::Error::from)?;

    if newest_first {
        for row in series.newest_first() {
            writer
                .write_record(indicator_record(row, &extras))
                .map_err(io::Error::from)?;
        }
    } else {
        for row in series.rows() {
            writer
                .write_record(indicator_record(row, &extras))
                .map_err(io::Error::from)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_race_csv<W: Write>(
    series: &IndicatorSeries<'_>,
    frames: bool,
    out: W,
) -> Result<(), StockscopeError> {
    let mut writer = csv::Writer::from_writer(out);
    if frames {
        writer
            .write_record(["date", "rank", "asset_id", "cumulative_return_pct"])
            .map_err(io::Error::from)?;
        for frame in race_frames(series) {
            for (place, entry) in frame.entries.iter().enumerate() {
                writer
                    .write_record([
                        frame.date.to_string(),
                        (place + 1).to_string(),
                        entry.asset_id.clone(),
                        format!("{:.4}", entry.cumulative_return * 100.0),
                    ])
                    .map_err(io::Error::from)?;
            }
        }
    } else {
        writer
            .write_record(["rank", "asset_id", "cumulative_return_pct"])
            .map_err(io::Error::from)?;
        for (place, entry) in final_standings(series).iter().enumerate() {
            writer
                .write_record([
                    (place + 1).to_string(),
                    entry.asset_id.clone(),
                    format!("{:.4}", entry.cumulative_return * 100.0),
                ])
                .map_err(io::Error::from)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_asset_list<W: Write>(table: &SeriesTable, mut out: W) -> Result<(), StockscopeError> {
    writeln!(out, "{:<16} {:>8}  {:<10}  {:<10}", "ASSET", "ROWS", "FIRST", "LAST")?;
    for series in table.partitions() {
        match series.data_range() {
            Some((first, last, rows)) => writeln!(
                out,
                "{:<16} {:>8}  {:<10}  {:<10}",
                series.asset_id(),
                rows,
                first,
                last
            )?,
            None => writeln!(out, "{:<16} {:>8}  {:<10}  {:<10}", series.asset_id(), 0, "-", "-")?,
        }
    }
    Ok(())
}

pub fn indicators_pipeline<W: Write>(
    data_port: &dyn DataPort,
    query: &Query,
    newest_first: bool,
    out: W,
) -> Result<(), StockscopeError> {
    let table = data_port.load_table()?;
    let (view, _) = prepare(&table, query)?;
    let series = IndicatorEngine::compute(&view);
    write_indicator_csv(&series, newest_first, out)
}

pub fn race_pipeline<W: Write>(
    data_port: &dyn DataPort,
    query: &Query,
    frames: bool,
    out: W,
) -> Result<(), StockscopeError> {
    let table = data_port.load_table()?;
    let (view, _) = prepare(&table, query)?;
    let series = IndicatorEngine::compute(&view);
    write_race_csv(&series, frames, out)
}

/// Report settings after merging flags over `[report]` config values.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub output: PathBuf,
    pub title: String,
    pub focus_asset: Option<String>,
    pub table_rows: usize,
}

pub fn build_report_settings(
    focus: Option<&str>,
    output: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<ReportSettings, StockscopeError> {
    let output = output
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let title = config
        .get_value("report", "title")
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let focus_asset = focus
        .map(str::to_string)
        .or_else(|| config.get_string("report", "focus_asset"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let table_rows = match config.get_int("report", "table_rows") {
        None => DEFAULT_TABLE_ROWS,
        Some(parsed) => parsed
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| StockscopeError::ConfigInvalid {
                section: "report".into(),
                key: "table_rows".into(),
                reason: "must be a whole number, zero or greater".into(),
            })?,
    };

    Ok(ReportSettings {
        output,
        title,
        focus_asset,
        table_rows,
    })
}

pub fn report_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    query: &Query,
    settings: &ReportSettings,
) -> Result<(), StockscopeError> {
    let table = data_port.load_table()?;
    if let Some(focus) = settings.focus_asset.as_deref() {
        if !table.contains_asset(focus) {
            return Err(StockscopeError::UnknownAsset {
                asset: focus.to_string(),
            });
        }
    }

    let (view, range) = prepare(&table, query)?;
    let series = IndicatorEngine::compute(&view);

    if let Some(focus) = settings.focus_asset.as_deref() {
        if view.partition(focus).is_none() {
            warn!(asset = focus, "focus asset has no rows in the current filter");
        }
    }

    let ctx = ReportContext {
        title: &settings.title,
        series: &series,
        range,
        focus_asset: settings.focus_asset.as_deref(),
    };
    report_port.write(&ctx, &settings.output)
}

fn run_assets(source: &SourceArgs) -> Result<(), StockscopeError> {
    let config = load_config(source.config.as_deref())?;
    let data_port = build_data_source(source, &config)?;
    let table = data_port.load_table()?;
    write_asset_list(&table, io::stdout().lock())
}

fn run_indicators(args: &FilterArgs, newest_first: bool) -> Result<(), StockscopeError> {
    let config = load_config(args.source.config.as_deref())?;
    let data_port = build_data_source(&args.source, &config)?;
    let query = build_query(args, &config)?;
    indicators_pipeline(&data_port, &query, newest_first, io::stdout().lock())
}

fn run_race(args: &FilterArgs, frames: bool) -> Result<(), StockscopeError> {
    let config = load_config(args.source.config.as_deref())?;
    let data_port = build_data_source(&args.source, &config)?;
    let query = build_query(args, &config)?;
    race_pipeline(&data_port, &query, frames, io::stdout().lock())
}

fn run_report(
    args: &FilterArgs,
    focus: Option<&str>,
    output: Option<&Path>,
) -> Result<(), StockscopeError> {
    let config = load_config(args.source.config.as_deref())?;
    let data_port = build_data_source(&args.source, &config)?;
    let query = build_query(args, &config)?;
    let settings = build_report_settings(focus, output, &config)?;
    let report_port = HtmlReportAdapter::new().with_table_rows(settings.table_rows);

    report_pipeline(&data_port, &report_port, &query, &settings)?;
    eprintln!("Report written to: {}", settings.output.display());
    Ok(())
}
