use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use rewind_core::{
    ComparisonService, Config, LocationQuery, ProviderId, RewindError, build_frame,
    chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Padding},
    compare::DEFAULT_SUGGESTION_LIMIT,
    config::MAX_YEARS_BACK,
    hover,
    provider::openweather::MIN_QUERY_LEN,
};
use std::{fs, path::PathBuf};

use crate::render;

/// Rows shown in the recent-history table.
const RECENT_YEARS: usize = 10;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "rewind",
    version,
    about = "Compare today's weather with the same day over the past 20 years"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider.
    Configure {
        /// Provider short name: "openweather" or "gemini".
        provider: String,
    },

    /// List cities matching a name.
    Search {
        /// City name, at least 3 characters.
        query: String,

        #[arg(long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },

    /// Compare today's weather in a city with the same day in past years.
    Compare {
        /// City name, at least 3 characters.
        city: String,

        /// Take the N-th search match (1-based) instead of asking.
        #[arg(long)]
        pick: Option<usize>,

        /// How many past years to fetch (1 to 20); overrides the config file.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_YEARS_BACK)))]
        years: Option<u32>,

        /// Write the temperature trend chart to this SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Inspect the year under this chart x coordinate (in chart pixels).
        #[arg(long)]
        hover_x: Option<f64>,

        /// Skip the AI trend analysis.
        #[arg(long)]
        no_summary: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Search { query, limit } => search(&query, limit).await,
            Command::Compare {
                city,
                pick,
                years,
                svg,
                hover_x,
                no_summary,
            } => compare(&city, pick, years, svg, hover_x, no_summary).await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    // Not `Config::load`: keys from the environment must not end up in the file.
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    cfg.upsert_provider_api_key(id, api_key.to_string());
    cfg.save_to(&path)?;

    println!("Saved {id} API key to {}", path.display());
    Ok(())
}

async fn search(query: &str, limit: usize) -> anyhow::Result<()> {
    ensure_query_len(query)?;

    let cfg = Config::load()?;
    let svc = ComparisonService::from_config(&cfg)?;

    let found = svc.search(query, limit).await?;
    if found.is_empty() {
        println!("No cities found for that query.");
        return Ok(());
    }

    for (i, loc) in found.iter().enumerate() {
        println!(
            "{:>2}. {} ({:.2}, {:.2})",
            i + 1,
            loc.display_name(),
            loc.lat,
            loc.lon
        );
    }
    Ok(())
}

async fn compare(
    city: &str,
    pick: Option<usize>,
    years: Option<u32>,
    svg: Option<PathBuf>,
    hover_x: Option<f64>,
    no_summary: bool,
) -> anyhow::Result<()> {
    ensure_query_len(city)?;

    let mut cfg = Config::load()?;
    if let Some(years) = years {
        cfg.history.years_back = years;
    }
    let svc = ComparisonService::from_config(&cfg)?;

    let location = choose_location(&svc, city, pick).await?;
    tracing::info!(city = %location.display_name(), "comparing");

    let comparison = svc.compare(svc.begin(), &location).await?;

    println!("{}", render::today_card(&comparison.today));
    print!("{}", render::history_table(&comparison.history, RECENT_YEARS));

    let frame = build_frame(
        &comparison.history,
        DEFAULT_WIDTH,
        DEFAULT_HEIGHT,
        Padding::default(),
    );
    let hovered = hover_x.and_then(|x| hover(&comparison.history, &frame, x));

    if hover_x.is_some() {
        match &hovered {
            Some(point) => println!("\n{}", render::hover_readout(point)),
            None => println!("\nNo data point to inspect."),
        }
    }

    if let Some(path) = svg {
        let doc = render::chart_svg(&comparison.history, &frame, hovered.as_ref());
        fs::write(&path, doc)
            .with_context(|| format!("Failed to write chart: {}", path.display()))?;
        println!("\nChart written to {}", path.display());
    }

    if !no_summary {
        match svc.summarize(&comparison).await {
            Ok(text) => println!("\n{}", render::summary(&text)),
            Err(err) => eprintln!("\nWarning: {err}"),
        }
    }

    Ok(())
}

fn ensure_query_len(query: &str) -> anyhow::Result<()> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        bail!("Please type at least {MIN_QUERY_LEN} characters of the city name.");
    }
    Ok(())
}

async fn choose_location(
    svc: &ComparisonService,
    city: &str,
    pick: Option<usize>,
) -> anyhow::Result<LocationQuery> {
    let mut matches = svc.search(city, DEFAULT_SUGGESTION_LIMIT).await?;
    if matches.is_empty() {
        return Err(RewindError::LocationNotFound(city.to_string()).into());
    }

    match pick {
        Some(n) => {
            let len = matches.len();
            n.checked_sub(1)
                .filter(|&i| i < len)
                .map(|i| matches.swap_remove(i))
                .ok_or_else(|| anyhow!("--pick {n} is out of range, {len} cities matched"))
        }
        None if matches.len() == 1 => Ok(matches.swap_remove(0)),
        None => {
            let labels: Vec<String> = matches
                .iter()
                .map(LocationQuery::display_name)
                .collect();
            let choice = Select::new("Which city did you mean?", labels)
                .raw_prompt()
                .context("No city selected")?;
            Ok(matches.swap_remove(choice.index))
        }
    }
}
