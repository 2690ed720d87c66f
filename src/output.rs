use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use colored::Colorize as _;
use jiff::Timestamp;
use regex::Regex;
use tracing::{debug, info};

use crate::config::{Layout, SortKey};
use crate::data::ReportRow;
use crate::error::Error;

pub const BIWEEKLY_HEADER: [&str; 7] = [
    "PR #",
    "Title",
    "Status",
    "Labels",
    "Link",
    "Description",
    "Date Merged",
];

pub const INDEX_HEADER: [&str; 7] = [
    "Date Opened",
    "Issue/PR URL",
    "Title",
    "Description",
    "Status",
    "Issue Type",
    "Author",
];

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:]([^/\s]+)/([^/\s]+?)(?:\.git)?(?:/|$)").expect("valid regex")
});

/// Extract owner and repo from URLs like `https://github.com/owner/repo/...`
pub fn parse_repo_url(url: &str) -> Result<(String, String), Error> {
    let captures = REPO_URL
        .captures(url.trim())
        .ok_or_else(|| Error::InvalidRepoUrl(url.to_owned()))?;
    Ok((captures[1].to_owned(), captures[2].to_owned()))
}

impl Layout {
    pub fn header(self) -> [&'static str; 7] {
        match self {
            Self::Biweekly => BIWEEKLY_HEADER,
            Self::Index => INDEX_HEADER,
        }
    }

    fn record(self, row: &ReportRow) -> [String; 7] {
        match self {
            Self::Biweekly => [
                row.number.to_string(),
                row.title.clone(),
                row.status.to_string(),
                row.labels.clone(),
                row.url.clone(),
                row.description.clone(),
                row.date_merged.clone(),
            ],
            Self::Index => [
                row.date_opened.clone(),
                row.url.clone(),
                row.title.clone(),
                row.description.clone(),
                row.status.to_string(),
                row.kind.to_string(),
                row.author.clone(),
            ],
        }
    }

    fn quote_style(self) -> csv::QuoteStyle {
        match self {
            Self::Biweekly => csv::QuoteStyle::Necessary,
            Self::Index => csv::QuoteStyle::Always,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Biweekly => "PRs",
            Self::Index => "issues or PRs",
        }
    }
}

/// Stable sort by the chosen column
pub fn sort_rows(rows: &mut [ReportRow], key: SortKey) {
    match key {
        SortKey::Labels => rows.sort_by(|a, b| a.labels.cmp(&b.labels)),
        SortKey::DateOpened => rows.sort_by_key(|row| row.date_opened.parse::<Timestamp>().ok()),
    }
}

/// Sort each section, then write them one after another to `path`.
///
/// Returns the number of rows written. Nothing is created when there are no
/// rows; an existing file is overwritten.
pub fn write_report(
    path: &Path,
    layout: Layout,
    key: SortKey,
    sections: Vec<Vec<ReportRow>>,
) -> Result<usize, Error> {
    let rows: Vec<ReportRow> = sections
        .into_iter()
        .flat_map(|mut section| {
            sort_rows(&mut section, key);
            section
        })
        .collect();
    if rows.is_empty() {
        return Ok(0);
    }

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    info!("Writing {} rows to {}", rows.len(), path.display());
    if let Some(first) = rows.first() {
        debug!(
            title = first.title.as_str(),
            description_len = first.description.len(),
            "First row"
        );
    }

    let csv_error = |source: csv::Error| Error::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .quote_style(layout.quote_style())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(layout.header()).map_err(csv_error)?;
    for row in &rows {
        writer.write_record(layout.record(row)).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(rows.len())
}

/// Print the outcome of a run
pub fn print_summary(path: &Path, layout: Layout, rows: usize) {
    if rows == 0 {
        println!(
            "{}",
            format!("No {} found in the specified time range.", layout.noun()).yellow()
        );
    } else {
        println!(
            "{} {} ({} rows)",
            "CSV file created:".cyan().bold(),
            path.display().to_string().bright_blue(),
            rows.to_string().green().bold()
        );
    }
}
