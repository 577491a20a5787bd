use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use perfscope::{
    chart::ChartModel,
    config::{ConfigStore, FileConfigStore},
    interval::TIMESTAMP_FORMAT,
    search::{self, RoomCatalog, SearchQuery, SearchResponse, SessionDetailResponse},
    Aggregate, Dashboard, SessionId,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// replay recorded telemetry responses through the session analytics core
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Feeds saved search and session-detail responses through the dashboard core and prints what the dashboard would show: result totals, selection averages, table rows, room segments and event markers."
)]
pub struct Cli {
    /// search response JSON; repeat to merge further page windows in order
    #[clap(short = 's', long = "search")]
    searches: Vec<PathBuf>,

    /// search constraints JSON the responses were produced for
    #[clap(short = 'q', long)]
    query: Option<PathBuf>,

    /// session-detail response JSON to segment into rooms
    #[clap(short = 'd', long, requires_all = ["session", "user"])]
    detail: Option<PathBuf>,

    /// id of the session in --detail
    #[clap(long)]
    session: Option<String>,

    /// user who recorded the session in --detail
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// room-list response JSON used to name rooms in the legend
    #[clap(short = 'r', long)]
    rooms: Option<PathBuf>,

    /// selected session id; repeat to select several
    #[clap(long = "select")]
    selected: Vec<String>,

    /// output format
    #[clap(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// config file to use instead of the per-user one
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// log merges and segmentation to stderr
    #[clap(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Serialize)]
struct Report {
    results: Aggregate,
    selection: Aggregate,
    rows: Vec<perfscope::session::TableRow>,
    chart: ChartModel,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    search::decode(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    log::debug!("config from {}", store.path().display());
    let mut dashboard = Dashboard::new(store.load());

    if let Some(path) = &cli.rooms {
        let catalog: RoomCatalog = read_json(path)?;
        dashboard.load_rooms(catalog);
    }

    let query: SearchQuery = match &cli.query {
        Some(path) => read_json(path)?,
        None => SearchQuery::default(),
    };
    for path in &cli.searches {
        let response: SearchResponse = read_json(path)?;
        dashboard
            .apply_search(query.clone(), &response)
            .with_context(|| format!("merging {}", path.display()))?;
    }

    if let Some(path) = &cli.detail {
        let session = cli.session.as_deref().context("--detail needs --session")?;
        let user = cli.user.as_deref().context("--detail needs --user")?;
        let detail: SessionDetailResponse = read_json(path)?;
        dashboard
            .load_session_detail(SessionId::from(session), user, detail)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    for id in &cli.selected {
        dashboard.select(SessionId::from(id.as_str()));
    }

    log::debug!("rendering {} report", cli.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => write_text(&mut out, &dashboard)?,
        OutputFormat::Json => {
            let report = Report {
                results: dashboard.whole_set_aggregate(),
                selection: dashboard.selected_aggregate(),
                rows: dashboard.table_rows(),
                chart: dashboard.chart(),
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            for row in dashboard.table_rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn write_text<W: Write>(out: &mut W, dashboard: &Dashboard) -> Result<()> {
    let results = dashboard.whole_set_aggregate();
    writeln!(
        out,
        "Results: {} sessions, avg fps {:.2}, avg mem {:.2}",
        results.count, results.avg_fps, results.avg_mem
    )?;

    let selection = dashboard.selected_aggregate();
    write!(
        out,
        "Selected: {} sessions, avg fps {}, avg mem {}",
        selection.count, selection.avg_fps, selection.avg_mem
    )?;
    if selection.unresolved > 0 {
        write!(out, " ({} not fetched)", selection.unresolved)?;
    }
    writeln!(out)?;

    let cache = dashboard.cache();
    writeln!(
        out,
        "Sessions ({}/{} fetched):",
        cache.fetched_count(),
        cache.full_count()
    )?;
    for (i, row) in dashboard.table_rows().iter().enumerate() {
        if row.is_blank() {
            writeln!(out, "{i:>5}")?;
        } else {
            writeln!(
                out,
                "{i:>5}  {}  {}  {}  {}  {}  {}  {}",
                row.user, row.device, row.platform, row.start_time, row.session, row.room, row.build
            )?;
        }
    }

    let chart = dashboard.chart();
    writeln!(out, "Timeline: {}", chart.title)?;
    for segment in &chart.segments {
        writeln!(
            out,
            "  room {}: {} -> {} ({} samples)",
            segment.room(),
            segment.enter.ts.format(TIMESTAMP_FORMAT),
            segment.exit.format(TIMESTAMP_FORMAT),
            segment.interval_count()
        )?;
    }
    let rooms: Vec<_> = chart.legend.iter().map(|e| e.label.as_str()).collect();
    writeln!(out, "Rooms: {}", rooms.join(", "))?;
    for marker in &chart.markers {
        for line in marker.tooltip.lines() {
            writeln!(out, "  {}  {}", marker.interval.ts.format(TIMESTAMP_FORMAT), line)?;
        }
    }
    Ok(())
}
