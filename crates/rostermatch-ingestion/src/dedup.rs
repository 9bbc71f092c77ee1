//! Identifier deduplication for concatenated category batches.

use std::collections::HashSet;

use crate::models::Paper;

/// Drop every paper whose identifier was already seen, keeping the first
/// occurrence and the original order. Returns how many rows were dropped.
pub fn dedup_by_id(papers: &mut Vec<Paper>) -> usize {
    let before = papers.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(before);
    papers.retain(|p| seen.insert(p.id.clone()));
    before - papers.len()
}
