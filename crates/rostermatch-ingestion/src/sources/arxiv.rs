//! arXiv OAI-PMH harvester.
//!
//! Endpoint used:
//!   http://export.arxiv.org/oai2?verb=ListRecords&metadataPrefix=arXiv&set={category}&from={date}&until={date}
//!
//! Large result sets are paged with `resumptionToken`. The service answers
//! `503` with a `Retry-After` header when it wants the harvester to slow down.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use rostermatch_common::{Result, RosterMatchError, SandboxClient as Client};
use tracing::{debug, info, instrument, warn};

use crate::models::{abs_url, CategoryQuery, Paper};
use super::PaperSource;

pub const ARXIV_OAI_URL: &str = "http://export.arxiv.org/oai2";
pub const DEFAULT_MAX_RETRY_AFTER: u32 = 5;

const NO_RECORDS_MATCH: &str = "noRecordsMatch";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct ArxivOaiClient {
    client: Client,
    base_url: String,
    /// How many `503 Retry-After` pauses a single request may sit through.
    max_retry_after: u32,
}

impl ArxivOaiClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::new()?,
            base_url: ARXIV_OAI_URL.to_string(),
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
        })
    }

    /// Point the harvester at another OAI-PMH endpoint (a mirror or a local fixture server).
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        self.client.allow_url(url)?;
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_max_retry_after(mut self, max_retry_after: u32) -> Self {
        self.max_retry_after = max_retry_after;
        self
    }

    /// Issue one ListRecords request and return the raw XML body.
    #[instrument(skip(self, params))]
    async fn list_records(&self, params: &[(&str, String)]) -> Result<String> {
        let mut pauses = 0;
        loop {
            let resp = self.client.get(&self.base_url)?.query(params).send().await?;

            if resp.status() == StatusCode::SERVICE_UNAVAILABLE && pauses < self.max_retry_after {
                if let Some(secs) = retry_after_secs(resp.headers()) {
                    pauses += 1;
                    info!(secs, pause = pauses, "arXiv asked for a pause before retrying");
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                    continue;
                }
            }

            let body = resp.error_for_status()?.text().await?;
            return Ok(body);
        }
    }
}

#[async_trait]
impl PaperSource for ArxivOaiClient {
    #[instrument(skip(self), fields(category = %query.category))]
    async fn fetch(&self, query: &CategoryQuery) -> Result<Vec<Paper>> {
        let mut params = vec![
            ("verb", "ListRecords".to_string()),
            ("metadataPrefix", "arXiv".to_string()),
            ("set", query.category.clone()),
            ("from", query.date_from.format(DATE_FORMAT).to_string()),
            ("until", query.date_until.format(DATE_FORMAT).to_string()),
        ];

        let mut papers = Vec::new();
        loop {
            let xml = self.list_records(&params).await?;
            let page = parse_list_records(&xml)?;
            debug!(fetched = page.papers.len(), more = page.resumption_token.is_some(), "OAI-PMH page");
            papers.extend(page.papers);

            match page.resumption_token {
                // A resumption request carries the token and nothing else.
                Some(token) => {
                    params = vec![
                        ("verb", "ListRecords".to_string()),
                        ("resumptionToken", token),
                    ];
                }
                None => break,
            }
        }

        info!(papers = papers.len(), "Harvested category");
        Ok(papers)
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

// ── Parsing ────────────────────────────────────────────────────────────────

/// One ListRecords response.
#[derive(Debug, Default)]
pub struct OaiPage {
    pub papers: Vec<Paper>,
    /// Present while more pages remain.
    pub resumption_token: Option<String>,
}

#[derive(Debug, Default)]
struct AuthorParts {
    keyname: String,
    forenames: String,
    affiliations: Vec<String>,
}

impl AuthorParts {
    /// Lowercase "forenames keyname", or just the keyname when no forenames are listed.
    fn display_name(&self) -> Option<String> {
        let name = match (self.forenames.is_empty(), self.keyname.is_empty()) {
            (true, true) => return None,
            (true, false) => self.keyname.clone(),
            (false, true) => self.forenames.clone(),
            (false, false) => format!("{} {}", self.forenames, self.keyname),
        };
        Some(name.to_lowercase())
    }
}

/// Parse an OAI-PMH ListRecords response carrying `arXiv` metadata.
///
/// Deleted records (header only, no metadata) are skipped. `noRecordsMatch`
/// yields an empty page; any other OAI error is returned as
/// [`RosterMatchError::OaiPmh`].
pub fn parse_list_records(xml: &str) -> Result<OaiPage> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = OaiPage::default();
    let mut current: Option<Paper> = None;
    let mut author: Option<AuthorParts> = None;
    let mut error_code: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                match e.local_name().as_ref() {
                    b"arXiv" => current = Some(Paper::with_id("")),
                    b"author" if current.is_some() => author = Some(AuthorParts::default()),
                    b"error" => error_code = Some(attribute(e, "code")?.unwrap_or_default()),
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"error" {
                    let code = attribute(e, "code")?.unwrap_or_default();
                    oai_error(code, String::new())?;
                }
            }
            Ok(Event::Text(ref e)) => {
                text.push_str(&e.unescape().map_err(xml_err)?);
            }
            Ok(Event::CData(ref e)) => {
                text.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::End(ref e)) => {
                let value = std::mem::take(&mut text);
                match e.local_name().as_ref() {
                    b"arXiv" => {
                        if let Some(mut paper) = current.take() {
                            if paper.id.is_empty() {
                                warn!("Skipping arXiv record without an id");
                            } else {
                                paper.url = abs_url(&paper.id);
                                page.papers.push(paper);
                            }
                        }
                    }
                    b"author" => {
                        if let (Some(parts), Some(paper)) = (author.take(), current.as_mut()) {
                            if let Some(name) = parts.display_name() {
                                paper.authors.push(name);
                            }
                            paper.affiliation.extend(parts.affiliations);
                        }
                    }
                    b"keyname" => {
                        if let Some(parts) = author.as_mut() {
                            parts.keyname = value;
                        }
                    }
                    b"forenames" => {
                        if let Some(parts) = author.as_mut() {
                            parts.forenames = value;
                        }
                    }
                    b"affiliation" => {
                        if let Some(parts) = author.as_mut() {
                            parts.affiliations.push(value);
                        }
                    }
                    b"resumptionToken" => {
                        page.resumption_token = Some(value).filter(|t| !t.is_empty());
                    }
                    b"error" => {
                        oai_error(error_code.take().unwrap_or_default(), value)?;
                    }
                    field => {
                        if let Some(paper) = current.as_mut() {
                            set_field(paper, field, value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(RosterMatchError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(page)
}

fn set_field(paper: &mut Paper, field: &[u8], value: String) {
    match field {
        b"id" => paper.id = value,
        b"title" => paper.title = collapse_whitespace(&value),
        b"abstract" => paper.abstract_text = collapse_whitespace(&value),
        b"categories" => paper.categories = value,
        b"doi" => paper.doi = Some(value).filter(|d| !d.is_empty()),
        b"created" => paper.created = parse_date(&value),
        b"updated" => paper.updated = parse_date(&value),
        _ => {}
    }
}

fn oai_error(code: String, message: String) -> Result<()> {
    if code == NO_RECORDS_MATCH {
        debug!("OAI-PMH reported no records in window");
        return Ok(());
    }
    Err(RosterMatchError::OaiPmh { code, message })
}

fn attribute(e: &BytesStart, key: &str) -> Result<Option<String>> {
    let Some(attr) = e.try_get_attribute(key).map_err(xml_err)? else {
        return Ok(None);
    };
    Ok(Some(attr.unescape_value().map_err(xml_err)?.into_owned()))
}

fn xml_err(e: impl std::fmt::Display) -> RosterMatchError {
    RosterMatchError::Xml(e.to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Titles and abstracts arrive hard-wrapped.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;

    const TWO_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2024-01-16T10:00:00Z</responseDate>
  <request verb="ListRecords" set="physics:astro-ph" metadataPrefix="arXiv">http://export.arxiv.org/oai2</request>
  <ListRecords>
    <record>
      <header>
        <identifier>oai:arXiv.org:2401.01234</identifier>
        <datestamp>2024-01-15</datestamp>
        <setSpec>physics:astro-ph</setSpec>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>2401.01234</id>
          <created>2024-01-03</created>
          <updated>2024-01-15</updated>
          <authors>
            <author><keyname>Schön</keyname><forenames>Angelika</forenames><affiliation>Potsdam</affiliation></author>
            <author><keyname>Doe</keyname><forenames>J.</forenames></author>
            <author><keyname>Collaboration</keyname></author>
          </authors>
          <title>Tidal disruption   events
            in &amp; around galactic nuclei</title>
          <categories>astro-ph.HE gr-qc</categories>
          <doi>10.1000/xyz</doi>
          <abstract>  We study
            things.
          </abstract>
        </arXiv>
      </metadata>
    </record>
    <record>
      <header status="deleted">
        <identifier>oai:arXiv.org:2401.09999</identifier>
        <datestamp>2024-01-15</datestamp>
      </header>
    </record>
    <record>
      <header>
        <identifier>oai:arXiv.org:2401.05678</identifier>
        <datestamp>2024-01-15</datestamp>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>2401.05678</id>
          <created>2024-01-14</created>
          <authors>
            <author><keyname>Public</keyname><forenames>John Q.</forenames></author>
          </authors>
          <title>Second paper</title>
          <categories>gr-qc</categories>
          <abstract>Short.</abstract>
        </arXiv>
      </metadata>
    </record>
    <resumptionToken cursor="0" completeListSize="1200">6960524|1001</resumptionToken>
  </ListRecords>
</OAI-PMH>"#;

    #[test]
    fn test_parse_records() {
        let page = parse_list_records(TWO_RECORDS).unwrap();
        assert_eq!(page.papers.len(), 2);

        let first = &page.papers[0];
        assert_eq!(first.id, "2401.01234");
        assert_eq!(first.title, "Tidal disruption events in & around galactic nuclei");
        assert_eq!(first.abstract_text, "We study things.");
        assert_eq!(first.categories, "astro-ph.HE gr-qc");
        assert_eq!(first.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(first.created, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(first.updated, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(first.url, "https://arxiv.org/abs/2401.01234");
        assert_eq!(first.affiliation, vec!["Potsdam".to_string()]);
    }

    #[test]
    fn test_author_names_are_lowercase_forenames_keyname() {
        let page = parse_list_records(TWO_RECORDS).unwrap();
        assert_eq!(
            page.papers[0].authors,
            vec!["angelika schön", "j. doe", "collaboration"]
        );
        assert_eq!(page.papers[1].authors, vec!["john q. public"]);
    }

    #[test]
    fn test_optional_fields_absent() {
        let page = parse_list_records(TWO_RECORDS).unwrap();
        let second = &page.papers[1];
        assert_eq!(second.doi, None);
        assert_eq!(second.updated, None);
        assert!(second.affiliation.is_empty());
    }

    #[test]
    fn test_resumption_token_extracted() {
        let page = parse_list_records(TWO_RECORDS).unwrap();
        assert_eq!(page.resumption_token.as_deref(), Some("6960524|1001"));
    }

    #[test]
    fn test_final_page_has_no_token() {
        let xml = r#"<OAI-PMH><ListRecords>
            <resumptionToken cursor="1000" completeListSize="1200"></resumptionToken>
        </ListRecords></OAI-PMH>"#;
        assert_eq!(parse_list_records(xml).unwrap().resumption_token, None);

        let xml = r#"<OAI-PMH><ListRecords>
            <resumptionToken cursor="1000" completeListSize="1200"/>
        </ListRecords></OAI-PMH>"#;
        assert_eq!(parse_list_records(xml).unwrap().resumption_token, None);
    }

    #[test]
    fn test_no_records_match_is_empty() {
        let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
            <request verb="ListRecords">http://export.arxiv.org/oai2</request>
            <error code="noRecordsMatch">No records</error>
        </OAI-PMH>"#;
        let page = parse_list_records(xml).unwrap();
        assert!(page.papers.is_empty());
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn test_other_oai_error_propagates() {
        let xml = r#"<OAI-PMH><error code="badArgument">Illegal set</error></OAI-PMH>"#;
        match parse_list_records(xml) {
            Err(RosterMatchError::OaiPmh { code, message }) => {
                assert_eq!(code, "badArgument");
                assert_eq!(message, "Illegal set");
            }
            other => panic!("expected OAI error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let xml = "<OAI-PMH><ListRecords></OAI-PMH>";
        assert!(matches!(parse_list_records(xml), Err(RosterMatchError::Xml(_))));
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("10"));
        assert_eq!(retry_after_secs(&headers), Some(10));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after_secs(&headers), None);
    }

    #[test]
    fn test_with_base_url_allows_host() {
        let client = ArxivOaiClient::new()
            .unwrap()
            .with_base_url("https://oai.example.org/oai2/")
            .unwrap();
        assert_eq!(client.base_url, "https://oai.example.org/oai2");
        assert!(client.client.is_allowed("https://oai.example.org/oai2"));
    }

    // ── Harvest loop against a loopback server ─────────────────────────────

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n{extra_headers}\r\n{body}",
            body.len()
        )
    }

    fn busy() -> String {
        http_response("503 Service Unavailable", "Retry-After: 0\r\n", "")
    }

    fn page(id: &str, token: &str) -> String {
        let body = format!(
            r#"<OAI-PMH><ListRecords><record><metadata><arXiv>
                <id>{id}</id><title>Paper {id}</title>
            </arXiv></metadata></record>
            <resumptionToken cursor="0">{token}</resumptionToken></ListRecords></OAI-PMH>"#
        );
        http_response("200 OK", "", &body)
    }

    /// Serve `responses` one connection each, returning the OAI URL and the
    /// request lines received.
    async fn serve(responses: Vec<String>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut request_lines = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                }
                let head = String::from_utf8_lossy(&head);
                request_lines.push(head.lines().next().unwrap_or_default().to_string());
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            request_lines
        });

        (format!("http://{addr}/oai2"), handle)
    }

    fn astro_ph_week() -> CategoryQuery {
        CategoryQuery {
            category: "physics:astro-ph".to_string(),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            date_until: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_fetch_pauses_then_follows_resumption_token() {
        let (url, server) = serve(vec![busy(), page("1", "tok|1"), page("2", "")]).await;
        let client = ArxivOaiClient::new().unwrap().with_base_url(&url).unwrap();

        let papers = client.fetch(&astro_ph_week()).await.unwrap();

        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 3);
        // The paused request is repeated unchanged.
        assert_eq!(requests[0], requests[1]);
        assert!(requests[0].contains("metadataPrefix=arXiv"));
        assert!(requests[0].contains("from=2024-01-09"));
        assert!(requests[0].contains("until=2024-01-16"));
        // A resumption request carries the token and nothing else.
        assert_eq!(
            requests[2],
            "GET /oai2?verb=ListRecords&resumptionToken=tok%7C1 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_fetch_fails_once_pauses_are_used_up() {
        let (url, server) = serve(vec![busy(), busy()]).await;
        let client = ArxivOaiClient::new()
            .unwrap()
            .with_base_url(&url)
            .unwrap()
            .with_max_retry_after(1);

        let result = client.fetch(&astro_ph_week()).await;

        assert!(matches!(result, Err(RosterMatchError::Http(_))));
        assert_eq!(server.await.unwrap().len(), 2);
    }
}
