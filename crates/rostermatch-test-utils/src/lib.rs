//! Fixtures and in-memory sources shared by the rostermatch test suites.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rostermatch_common::{Result, RosterMatchError};
use rostermatch_ingestion::models::{CategoryQuery, Paper};
use rostermatch_ingestion::sources::{PaperSource, RosterSource};

/// A paper with the given id, title and authors; every other field is filled
/// with plausible arXiv values.
pub fn paper(id: &str, title: &str, authors: &[&str]) -> Paper {
    Paper {
        title: title.to_string(),
        categories: "astro-ph.GA".to_string(),
        abstract_text: format!("Abstract of {title}."),
        created: NaiveDate::from_ymd_opt(2024, 1, 15),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        ..Paper::with_id(id)
    }
}

/// A roster that returns fixed display names.
pub struct StaticRoster(pub Vec<String>);

impl StaticRoster {
    pub fn new(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn display_names(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// A roster whose fetch always fails, standing in for a network outage.
pub struct UnreachableRoster;

#[async_trait]
impl RosterSource for UnreachableRoster {
    async fn display_names(&self) -> Result<Vec<String>> {
        Err(RosterMatchError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "roster page unreachable",
        )))
    }
}

/// A paper source serving fixed batches per category and recording every query.
#[derive(Default)]
pub struct StaticPapers {
    by_category: HashMap<String, Vec<Paper>>,
    queries: Mutex<Vec<CategoryQuery>>,
}

impl StaticPapers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(mut self, category: &str, papers: Vec<Paper>) -> Self {
        self.by_category.insert(category.to_string(), papers);
        self
    }

    /// Queries received so far, in call order.
    pub fn queries(&self) -> Vec<CategoryQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaperSource for StaticPapers {
    async fn fetch(&self, query: &CategoryQuery) -> Result<Vec<Paper>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        Ok(self.by_category.get(&query.category).cloned().unwrap_or_default())
    }
}
