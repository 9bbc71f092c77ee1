//! Paper set assembly: harvest each category over a trailing day window,
//! concatenate in category order, then drop repeated identifiers.

use chrono::{Duration, NaiveDate};
use rostermatch_common::Result;
use tracing::{info, instrument};

use crate::dedup::dedup_by_id;
use crate::models::{CategoryQuery, Paper};
use crate::sources::PaperSource;

/// Categories harvested when none are configured. Order matters: on a
/// cross-listed paper the astro-ph row is the one kept.
pub const DEFAULT_CATEGORIES: [&str; 2] = ["physics:astro-ph", "physics:gr-qc"];

/// Build the per-category queries for the window `[today - days, today]`.
pub fn category_queries(categories: &[String], days: u32, today: NaiveDate) -> Vec<CategoryQuery> {
    let date_from = today - Duration::days(i64::from(days));
    categories
        .iter()
        .map(|category| CategoryQuery {
            category: category.clone(),
            date_from,
            date_until: today,
        })
        .collect()
}

/// Fetch every category one after the other and return the deduplicated set.
#[instrument(skip(source))]
pub async fn build_paper_set(
    source: &dyn PaperSource,
    categories: &[String],
    days: u32,
    today: NaiveDate,
) -> Result<Vec<Paper>> {
    let mut papers = Vec::new();
    for query in category_queries(categories, days, today) {
        let batch = source.fetch(&query).await?;
        info!(category = %query.category, papers = batch.len(), "Fetched category");
        papers.extend(batch);
    }

    let dropped = dedup_by_id(&mut papers);
    info!(papers = papers.len(), duplicates = dropped, "Paper set ready");
    Ok(papers)
}
