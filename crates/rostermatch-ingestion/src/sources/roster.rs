//! Department roster sources.
//!
//! The live source scrapes the group overview page: each member sits in a
//! contact-box header element whose nested `<h2>` carries the display name.
//! A plain names file (one display name per line) can stand in for the page.

use std::path::PathBuf;

use async_trait::async_trait;
use rostermatch_common::{Result, RosterMatchError, SandboxClient as Client};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use super::RosterSource;

pub const DEFAULT_ROSTER_URL: &str =
    "https://www.uni-potsdam.de/en/theoretical-astrophysics/group/overview-1";
pub const DEFAULT_MEMBER_SELECTOR: &str =
    "div.twentyfour.columns.up-content-contact-box-header";

pub struct DepartmentPageScraper {
    client: Client,
    url: String,
    member_selector: String,
}

impl DepartmentPageScraper {
    pub fn new(url: &str, member_selector: &str) -> Result<Self> {
        // Fail at start-up rather than after the page has been fetched.
        parse_selector(member_selector)?;

        let mut client = Client::new()?;
        client.allow_url(url)?;
        Ok(Self {
            client,
            url: url.to_string(),
            member_selector: member_selector.to_string(),
        })
    }
}

#[async_trait]
impl RosterSource for DepartmentPageScraper {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn display_names(&self) -> Result<Vec<String>> {
        let html = self
            .client
            .get(&self.url)?
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let names = parse_roster_html(&html, &self.member_selector)?;
        if names.is_empty() {
            warn!(selector = %self.member_selector, "No roster entries matched on the page");
        }
        info!(members = names.len(), "Scraped department roster");
        Ok(names)
    }
}

/// Extract the trimmed `<h2>` text of every element matching `member_selector`.
pub fn parse_roster_html(html: &str, member_selector: &str) -> Result<Vec<String>> {
    let member = parse_selector(member_selector)?;
    let heading = parse_selector("h2")?;
    let document = Html::parse_document(html);

    document
        .select(&member)
        .enumerate()
        .map(|(i, el)| {
            el.select(&heading)
                .next()
                .map(|h| h.text().collect::<String>().trim().to_string())
                .ok_or_else(|| {
                    RosterMatchError::HtmlStructure(format!(
                        "roster entry {} has no <h2> heading",
                        i + 1
                    ))
                })
        })
        .collect()
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| RosterMatchError::Config(format!("Invalid CSS selector {selector:?}: {e}")))
}

/// A local file with one display name per line.
pub struct NamesFile {
    path: PathBuf,
}

impl NamesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RosterSource for NamesFile {
    async fn display_names(&self) -> Result<Vec<String>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let names = parse_names(&contents);
        debug!(path = %self.path.display(), names = names.len(), "Loaded names file");
        Ok(names)
    }
}

/// One name per line, surrounding whitespace stripped, blank lines ignored.
pub fn parse_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
