//! Dated JSON report of the match mapping.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rostermatch_common::Result;
use rostermatch_matcher::MatchMapping;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

const INDENT: &[u8] = b"    ";

/// `matched_authors_and_papers-<YYYY-MM-DD>.json`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("matched_authors_and_papers-{}.json", date.format("%Y-%m-%d"))
}

/// The mapping pretty-printed with 4-space indentation.
pub fn render_report(matches: &MatchMapping) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    matches.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Render and write the report into `dir`, creating it if needed.
pub fn write_report(matches: &MatchMapping, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let body = render_report(matches)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(date));
    std::fs::write(&path, body)?;
    Ok(path)
}
