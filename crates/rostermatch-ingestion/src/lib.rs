//! rostermatch-ingestion — Roster and paper acquisition.
//! - Department roster scraping (or a plain names file)
//! - arXiv OAI-PMH harvesting per subject category
//! - Paper set assembly and identifier deduplication

pub mod sources;
pub mod dedup;
pub mod models;
pub mod paper_set;
