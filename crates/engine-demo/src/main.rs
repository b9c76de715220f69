// File: crates/engine-demo/src/main.rs
// Summary: Demo loads water-withdrawal CSVs, prepares the chart model and writes it as JSON.

use anyhow::{bail, Context, Result};
use chart_engine::{
    prepare_chart, DaySlider, EngineOptions, Sample, SampleMeta, SeriesDescriptor, Threshold, ViewParams,
};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    inputs: Vec<PathBuf>,
    width_px: u32,
    frequency: Option<String>,
    threshold: Option<f64>,
    day: Option<String>,
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let opts = load_options()?;
    tracing::debug!(?opts, "engine options");

    let mut series = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let samples = load_samples_csv(path)
            .with_context(|| format!("failed to load CSV '{}'", path.display()))?;
        tracing::info!(path = %path.display(), samples = samples.len(), "loaded series");
        let id = path.file_stem().map_or_else(|| "series".to_string(), |s| s.to_string_lossy().into_owned());
        let mut descriptor = SeriesDescriptor::new(id, samples);
        if let Some(f) = &args.frequency {
            descriptor = descriptor.with_frequency(f.clone());
        }
        if let Some(t) = args.threshold {
            descriptor = descriptor
                .with_threshold(Threshold::Static(t))
                .with_threshold_colors("#d62728", "#2ca02c");
        }
        series.push(descriptor);
    }
    if series.iter().all(|s| s.samples.is_empty()) {
        bail!("no samples loaded; check the timestamp,value columns");
    }

    // Optional calendar click narrows the view, as the dashboard's date picker does
    let slider = DaySlider::from_series(&series, &Local);
    let range = match &args.day {
        Some(click) => {
            let selection = slider
                .resolve_click(click)
                .with_context(|| format!("'{click}' does not match any loaded day"))?;
            slider.time_range(selection, &Local)
        }
        None => None,
    };
    tracing::info!(days = slider.len(), ?range, "day slider");

    let view = ViewParams::new(range, args.width_px);
    let model = prepare_chart(&series, &view, &opts, &Local);
    tracing::info!(
        timeline = model.timeline.len(),
        display = %model.display_resolution,
        did_decimate = model.did_decimate,
        markers = model.markers.len(),
        "chart prepared"
    );

    let json = serde_json::to_string_pretty(&model)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(path = %out.display(), "wrote chart model");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args { inputs: Vec::new(), width_px: 1200, frequency: None, threshold: None, day: None, out: None };
    while let Some(arg) = argv.next() {
        let mut value = |name: &str| argv.next().with_context(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--width" => args.width_px = value("--width")?.parse().context("--width must be a pixel count")?,
            "--frequency" => args.frequency = Some(value("--frequency")?),
            "--threshold" => args.threshold = Some(value("--threshold")?.parse().context("--threshold must be a number")?),
            "--day" => args.day = Some(value("--day")?),
            "--out" => args.out = Some(PathBuf::from(value("--out")?)),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path => args.inputs.push(PathBuf::from(path)),
        }
    }
    if args.inputs.is_empty() {
        bail!("usage: engine-demo <csv>... [--width N] [--frequency \"1 day\"] [--threshold N] [--day YYYY[-MM[-DD]]] [--out path]");
    }
    Ok(args)
}

/// `config/engine.{toml,json,...}` when present, then `ENGINE_*` variables
/// (`ENGINE_GAP_MULTIPLIER=2`, `ENGINE_DECIMATION__MIN_POINTS=200`).
fn load_options() -> Result<EngineOptions> {
    options_from(engine_env())
}

fn engine_env() -> config::Environment {
    config::Environment::with_prefix("ENGINE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn options_from(env: config::Environment) -> Result<EngineOptions> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/engine").required(false))
        .add_source(env)
        .build()?;
    Ok(settings.try_deserialize()?)
}

fn load_samples_csv(path: &Path) -> Result<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_time = idx(&["timestamp", "time", "date", "datetime"]).unwrap_or(0);
    let i_value = idx(&["value", "volume", "level", "flow"]).unwrap_or(1);
    let i_comment = idx(&["comment", "note"]);
    let i_alert = idx(&["alert"]);

    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let Some(timestamp) = rec.get(i_time).and_then(parse_timestamp) else {
            tracing::warn!(line = line + 2, "skipping row with unreadable timestamp");
            continue;
        };
        let value = match rec.get(i_value).map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(line = line + 2, raw, "unreadable value, kept as missing");
                    None
                }
            },
        };
        let field = |i: Option<usize>| {
            i.and_then(|i| rec.get(i)).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };
        let meta = SampleMeta { comment: field(i_comment), alert: field(i_alert), ..SampleMeta::default() };
        let sample = Sample::new(timestamp, value);
        out.push(if meta == SampleMeta::default() { sample } else { sample.with_meta(meta) });
    }
    Ok(out)
}

/// Epoch milliseconds, RFC 3339, or a local `YYYY-MM-DD[ HH:MM[:SS]]`.
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))?;
    Local.from_local_datetime(&naive).earliest().map(|dt| dt.timestamp_millis())
}
