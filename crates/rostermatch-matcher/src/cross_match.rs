//! Cross-matching of roster names against paper author lists.
//!
//! Matching is exact and case-sensitive: an author string must be one of the
//! name's permutations byte for byte. Spellings outside the permutation set
//! are missed on purpose.

use rostermatch_ingestion::models::Paper;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::permute::permutations;

/// One matched paper in the report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MatchedPaper {
    pub title: String,
}

/// Roster name → matched papers, in roster order.
///
/// Only names with at least one match are present. Serializes as a JSON
/// object whose keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchMapping {
    entries: Vec<(String, Vec<MatchedPaper>)>,
}

impl MatchMapping {
    /// Insert or replace the papers for `name`. A replaced entry keeps its
    /// original position. Empty lists are never stored.
    pub fn insert(&mut self, name: String, papers: Vec<MatchedPaper>) {
        if papers.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = papers,
            None => self.entries.push((name, papers)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[MatchedPaper]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, papers)| papers.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MatchedPaper])> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MatchMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, papers) in &self.entries {
            map.serialize_entry(name, papers)?;
        }
        map.end()
    }
}

/// Papers in `papers` with at least one author spelled as a permutation of `name`.
/// Each paper is recorded at most once, on its first matching author.
pub fn papers_for_name(papers: &[Paper], name: &str) -> Vec<MatchedPaper> {
    let variants = permutations(name);
    papers
        .iter()
        .filter(|paper| paper.authors.iter().any(|author| variants.contains(author)))
        .map(|paper| MatchedPaper { title: paper.title.clone() })
        .collect()
}

/// Match every roster name against the paper set.
pub fn cross_match(papers: &[Paper], names: &[String]) -> MatchMapping {
    let mut matches = MatchMapping::default();
    for name in names {
        let found = papers_for_name(papers, name);
        if !found.is_empty() {
            debug!(name = %name, papers = found.len(), "Matched roster name");
        }
        matches.insert(name.clone(), found);
    }
    matches
}
