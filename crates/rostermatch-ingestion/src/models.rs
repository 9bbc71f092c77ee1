//! Data models for the acquisition step.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One harvested preprint. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv identifier, unique within a paper set.
    pub id: String,
    pub title: String,
    /// Space-separated category list as reported by the repository.
    pub categories: String,
    pub abstract_text: String,
    pub doi: Option<String>,
    pub created: Option<NaiveDate>,
    pub updated: Option<NaiveDate>,
    /// Author names in listing order.
    pub authors: Vec<String>,
    pub affiliation: Vec<String>,
    pub url: String,
}

impl Paper {
    /// A record with only an identifier; the harvester fills in the rest.
    pub fn with_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: abs_url(&id),
            id,
            title: String::new(),
            categories: String::new(),
            abstract_text: String::new(),
            doi: None,
            created: None,
            updated: None,
            authors: Vec::new(),
            affiliation: Vec::new(),
        }
    }
}

/// Abstract page URL for an arXiv identifier.
pub fn abs_url(id: &str) -> String {
    format!("https://arxiv.org/abs/{}", id)
}

/// One category harvest request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    /// OAI-PMH set spec, e.g. `physics:astro-ph`.
    pub category: String,
    pub date_from: NaiveDate,
    pub date_until: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_id_sets_abs_url() {
        let p = Paper::with_id("2401.01234");
        assert_eq!(p.url, "https://arxiv.org/abs/2401.01234");
        assert!(p.authors.is_empty());
    }
}
