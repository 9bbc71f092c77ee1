//! rostermatch — which of this week's arXiv preprints were written by department members.
//! Entry point for the batch binary.

mod config;
mod pipeline;
mod report;

use anyhow::Context;
use rostermatch_ingestion::sources::arxiv::ArxivOaiClient;
use rostermatch_ingestion::sources::roster::{DepartmentPageScraper, NamesFile};
use rostermatch_ingestion::sources::RosterSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn build_roster_source(config: &config::RosterConfig) -> anyhow::Result<Box<dyn RosterSource>> {
    match &config.names_file {
        Some(path) => {
            info!("Reading department members from {}", path.display());
            Ok(Box::new(NamesFile::new(path)))
        }
        None => {
            let scraper = DepartmentPageScraper::new(&config.url, &config.selector)
                .context("Invalid roster configuration")?;
            Ok(Box::new(scraper))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rostermatch=debug,info")),
        )
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load()?;
    info!(
        "Configuration loaded. Categories: {}, window: {} days",
        config.arxiv.categories.join(", "),
        config.arxiv.window_days
    );

    let roster = build_roster_source(&config.roster)?;
    let arxiv = ArxivOaiClient::new()?
        .with_base_url(&config.arxiv.base_url)?
        .with_max_retry_after(config.arxiv.max_retry_after);

    let today = chrono::Local::now().date_naive();
    let plan = pipeline::RunPlan {
        categories: &config.arxiv.categories,
        window_days: config.arxiv.window_days,
        today,
    };

    let matches = pipeline::run(roster.as_ref(), &arxiv, &plan).await?;

    let path = report::write_report(&matches, &config.output.dir, today)
        .context("Failed to write report")?;
    info!("Data saved to {}", path.display());

    Ok(())
}
