//! One batch run: roster, then papers, then matching.

use anyhow::Context;
use chrono::NaiveDate;
use rostermatch_ingestion::paper_set::build_paper_set;
use rostermatch_ingestion::sources::{PaperSource, RosterSource};
use rostermatch_matcher::{cross_match, normalize_names, MatchMapping};
use tracing::info;

pub struct RunPlan<'a> {
    pub categories: &'a [String],
    pub window_days: u32,
    pub today: NaiveDate,
}

pub async fn run(
    roster: &dyn RosterSource,
    papers: &dyn PaperSource,
    plan: &RunPlan<'_>,
) -> anyhow::Result<MatchMapping> {
    info!("Fetching department members...");
    let raw = roster
        .display_names()
        .await
        .context("Failed to fetch department members")?;
    let names = normalize_names(&raw);
    info!(members = names.len(), "Roster normalized");

    info!("Scraping arXiv for papers...");
    let paper_set = build_paper_set(papers, plan.categories, plan.window_days, plan.today)
        .await
        .context("Failed to fetch papers from arXiv")?;

    info!("Cross matching names and papers");
    let matches = cross_match(&paper_set, &names);
    info!(matched_members = matches.len(), "Cross match complete");

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rostermatch_test_utils::{paper, StaticPapers, StaticRoster, UnreachableRoster};

    fn plan(categories: &[String]) -> RunPlan<'_> {
        RunPlan {
            categories,
            window_days: 7,
            today: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        }
    }

    fn stock_categories() -> Vec<String> {
        vec!["physics:astro-ph".to_string(), "physics:gr-qc".to_string()]
    }

    #[tokio::test]
    async fn test_end_to_end_single_match() {
        let roster = StaticRoster::new(&["jane doe"]);
        let papers = StaticPapers::new().with_batch("physics:astro-ph", vec![paper("1", "X", &["j. doe"])]);
        let categories = stock_categories();

        let matches = run(&roster, &papers, &plan(&categories)).await.unwrap();

        let json = serde_json::to_value(&matches).unwrap();
        assert_eq!(json, serde_json::json!({ "jane doe": [{ "title": "X" }] }));
    }

    #[tokio::test]
    async fn test_display_names_are_normalized_before_matching() {
        let roster = StaticRoster::new(&["Prof. Dr. Angelika Schön", "Dr. Max Mustermann"]);
        let papers = StaticPapers::new()
            .with_batch("physics:astro-ph", vec![paper("1", "Jets", &["a. schoen"])]);
        let categories = stock_categories();

        let matches = run(&roster, &papers, &plan(&categories)).await.unwrap();

        assert_eq!(matches.names().collect::<Vec<_>>(), vec!["angelika schoen"]);
    }

    #[tokio::test]
    async fn test_cross_listed_paper_reported_once() {
        let roster = StaticRoster::new(&["jane doe"]);
        let shared = paper("2401.00001", "Shared", &["jane doe"]);
        let papers = StaticPapers::new()
            .with_batch("physics:astro-ph", vec![shared.clone()])
            .with_batch("physics:gr-qc", vec![shared, paper("2401.00002", "Waves", &["doe, jane"])]);
        let categories = stock_categories();

        let matches = run(&roster, &papers, &plan(&categories)).await.unwrap();

        let titles: Vec<&str> = matches
            .get("jane doe")
            .unwrap()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Shared", "Waves"]);
    }

    #[tokio::test]
    async fn test_queries_cover_window_for_each_category() {
        let roster = StaticRoster::new(&[]);
        let papers = StaticPapers::new();
        let categories = stock_categories();

        run(&roster, &papers, &plan(&categories)).await.unwrap();

        let queries = papers.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].category, "physics:astro-ph");
        assert_eq!(queries[1].category, "physics:gr-qc");
        for q in &queries {
            assert_eq!(q.date_from, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
            assert_eq!(q.date_until, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        }
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_mapping() {
        let roster = StaticRoster::new(&["max mustermann"]);
        let papers = StaticPapers::new().with_batch("physics:gr-qc", vec![paper("1", "X", &["j. doe"])]);
        let categories = stock_categories();

        let matches = run(&roster, &papers, &plan(&categories)).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_roster_failure_aborts_before_harvest() {
        let papers = StaticPapers::new();
        let categories = stock_categories();

        let err = run(&UnreachableRoster, &papers, &plan(&categories)).await.unwrap_err();

        assert!(err.to_string().contains("department members"));
        assert!(papers.queries().is_empty());
    }
}
