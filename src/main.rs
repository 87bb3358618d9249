use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use treemap_flip::config::EngineConfig;
use treemap_flip::data::{Dataset, DatasetSources};
use treemap_flip::normalize::{EntityKind, Facet};
use treemap_flip::ui::dashboard::{self, Dashboard, Frame, RenderRequest};

/// Render treemap frames for one or more selections and print them as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "treemap-flip", version)]
struct Args {
    /// Nested state records (JSON)
    #[arg(long, value_name = "FILE")]
    states: Option<PathBuf>,

    /// Nested country records (JSON)
    #[arg(long, value_name = "FILE")]
    countries: Option<PathBuf>,

    /// Flat facet/variable rows (JSON or .csv), merged into the countries
    #[arg(long, value_name = "FILE")]
    rows: Option<PathBuf>,

    /// Engine config overrides (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Viewport as WxH
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    size: Option<(f32, f32)>,

    /// Bank shown first: states or countries
    #[arg(long, value_parser = parse_mode)]
    mode: Option<EntityKind>,

    /// Breakdown to draw: job_groups, topics, collaboration or onet_task
    #[arg(long, value_parser = parse_facet)]
    facet: Option<Facet>,

    /// Entity codes, in order; the first is the initial selection
    #[arg(long, value_name = "CODE")]
    select: Vec<String>,
}

impl Args {
    fn sources(&self) -> DatasetSources {
        DatasetSources {
            states: self.states.clone(),
            countries: self.countries.clone(),
            rows: self.rows.clone(),
        }
    }

    /// Selections after the first, as requests for the worker.
    fn follow_ups(&self) -> Vec<RenderRequest> {
        self.select
            .iter()
            .skip(1)
            .map(|code| RenderRequest::Select(code.as_str().into()))
            .collect()
    }
}

fn parse_size(text: &str) -> Result<(f32, f32), String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("bad size '{}', expected WxH", text))?;
    let dim = |v: &str| v.trim().parse::<f32>().map_err(|e| format!("bad size '{}': {}", text, e));
    Ok((dim(w)?, dim(h)?))
}

fn parse_mode(text: &str) -> Result<EntityKind, String> {
    match text {
        "states" | "state" => Ok(EntityKind::State),
        "countries" | "country" => Ok(EntityKind::Country),
        other => Err(format!("unknown mode '{}'", other)),
    }
}

fn parse_facet(text: &str) -> Result<Facet, String> {
    [Facet::JobGroups, Facet::Topics, Facet::Collaboration, Facet::OnetTask]
        .into_iter()
        .find(|f| f.name() == text)
        .ok_or_else(|| format!("unknown facet '{}'", text))
}

fn print_frame(frame: &Frame) -> Result<()> {
    println!(
        "# pass {} | {} [{}] | observations {} | usage {} | {} tiles, {} topics",
        frame.pass,
        frame.title,
        frame.code.as_deref().unwrap_or("-"),
        frame.usage_count,
        frame.usage_pct,
        frame.tiles.len(),
        frame.topics.len()
    );
    for tile in &frame.tiles {
        println!("{}", serde_json::to_string(tile)?);
    }
    for topic in &frame.topics {
        println!("{}", serde_json::to_string(topic)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("treemap_flip=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    tracing::info!("treemap-flip starting");

    let dataset = Dataset::load(&args.sources(), config.topic_limit);
    let mut dashboard = Dashboard::new(config, dataset);
    if dashboard.used_fallback() {
        eprintln!("note: no data could be loaded; showing built-in sample data");
    }
    if let Some(kind) = args.mode {
        dashboard = dashboard.with_mode(kind);
    }
    dashboard = dashboard
        .with_selection(args.select.first().map(String::as_str))
        .with_facet(args.facet);
    if let Some((width, height)) = args.size {
        dashboard = dashboard.with_viewport(width, height);
    }

    print_frame(&dashboard.render_current())?;

    let (tx, frames, worker) = dashboard::spawn(dashboard);
    for request in args.follow_ups() {
        tx.send(request)?;
    }
    drop(tx);

    for frame in frames.iter() {
        print_frame(&frame)?;
    }

    let dashboard = worker
        .join()
        .map_err(|_| anyhow::anyhow!("dashboard worker panicked"))?;
    tracing::info!("Done after {} render passes", dashboard.engine().passes());
    Ok(())
}
