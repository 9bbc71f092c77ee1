//! Roster and paper source clients.

pub mod arxiv;
pub mod roster;

use async_trait::async_trait;
use rostermatch_common::Result;

use crate::models::{CategoryQuery, Paper};

/// Anything that can list the raw display names of department members.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Raw display names, honorifics and umlauts still intact.
    async fn display_names(&self) -> Result<Vec<String>>;
}

/// Anything that can list the papers posted to one category in a date window.
#[async_trait]
pub trait PaperSource: Send + Sync {
    async fn fetch(&self, query: &CategoryQuery) -> Result<Vec<Paper>>;
}
