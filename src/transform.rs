use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::DescriptionMode;
use crate::data::{ItemKind, RawItem, ReportRow, Status};
use crate::github::Endpoint;

const SUMMARY_HEADER: &str = "### Detailed summary";

/// Placeholder in the Date Merged column for unmerged items
pub const NOT_MERGED: &str = "n/a";

/// A line starting with `>` ends the summary section
static QUOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>").expect("valid regex"));

/// Text under `### Detailed summary`, up to the first quoted line
pub fn extract_summary(body: &str) -> String {
    let Some((_, rest)) = body.split_once(SUMMARY_HEADER) else {
        return String::new();
    };
    let end = QUOTE_LINE.find(rest).map_or(rest.len(), |quote| quote.start());
    rest[..end].trim().to_owned()
}

/// Body with NUL characters removed and CRLF turned into LF
pub fn clean_body(body: &str) -> String {
    body.replace('\0', "").replace("\r\n", "\n")
}

fn description(body: Option<&str>, mode: DescriptionMode) -> String {
    let body = body.unwrap_or_default();
    match mode {
        DescriptionMode::Full => clean_body(body),
        DescriptionMode::Summary => extract_summary(body),
    }
}

fn derived_status(item: &RawItem) -> Status {
    if item.state.eq_ignore_ascii_case("closed") {
        if item.merged_at().is_some() {
            Status::Merged
        } else {
            Status::Closed
        }
    } else {
        Status::Open
    }
}

/// Turn an item fetched from `endpoint` into a report row
pub fn to_row(item: RawItem, endpoint: Endpoint, mode: DescriptionMode) -> ReportRow {
    let (status, kind) = match endpoint {
        Endpoint::MergedPulls => (Status::Merged, ItemKind::PullRequest),
        Endpoint::OpenPulls => (Status::Open, ItemKind::PullRequest),
        Endpoint::Issues => (derived_status(&item), item.kind()),
    };
    let labels = item
        .labels
        .iter()
        .map(|label| label.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let row = ReportRow {
        number: item.number,
        title: item.title.clone().unwrap_or_default(),
        status,
        labels,
        url: item.html_url.clone(),
        description: description(item.body.as_deref(), mode),
        date_merged: item.merged_at().unwrap_or(NOT_MERGED).to_owned(),
        date_opened: item.created_at.clone(),
        kind,
        author: item.author().to_owned(),
    };
    debug!(
        "Processed: {} ({kind}), description length {}",
        row.title,
        row.description.len()
    );
    row
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::{Label, PullRequestRef};
    use crate::github::fake::raw_item;

    #[test]
    fn summary_stops_at_quoted_line() {
        assert_eq!(extract_summary("### Detailed summary\nHello\n> quoted"), "Hello");
    }

    #[test]
    fn summary_without_header_is_empty() {
        assert_eq!(extract_summary("Just a body\n> with a quote"), "");
        assert_eq!(extract_summary(""), "");
    }

    #[test]
    fn summary_runs_to_end_without_quote() {
        let body = "## PR-Codex overview\nStuff\n\n### Detailed summary\n- Adds `foo`\n- Removes `bar`\n";
        assert_eq!(extract_summary(body), "- Adds `foo`\n- Removes `bar`");
    }

    #[test]
    fn summary_keeps_inline_arrows_and_indented_quotes() {
        let body = "### Detailed summary\n- maps a -> b\n  > indented\n> footer\nafter";
        assert_eq!(extract_summary(body), "- maps a -> b\n  > indented");
    }

    #[test]
    fn full_body_is_cleaned() {
        assert_eq!(clean_body("a\r\nb\0c\r\n"), "a\nbc\n");
    }

    #[test]
    fn merged_pull_row() {
        let mut item = raw_item(7, "alice", "closed");
        item.merged_at = Some("2024-06-02T00:00:00Z".to_owned());
        item.labels = vec![
            Label { name: "bug".to_owned() },
            Label { name: "ui".to_owned() },
        ];
        item.body = Some("### Detailed summary\nFixes it\n> PR-Codex".to_owned());
        let row = to_row(item, Endpoint::MergedPulls, DescriptionMode::Summary);
        assert_eq!(row.status, Status::Merged);
        assert_eq!(row.labels, "bug, ui");
        assert_eq!(row.description, "Fixes it");
        assert_eq!(row.date_merged, "2024-06-02T00:00:00Z");
        assert_eq!(row.url, "https://github.com/octo/hello/pull/7");
    }

    #[test]
    fn open_pull_row_has_no_merge_date() {
        let row = to_row(raw_item(8, "bob", "open"), Endpoint::OpenPulls, DescriptionMode::Full);
        assert_eq!(row.status, Status::Open);
        assert_eq!(row.date_merged, NOT_MERGED);
        assert_eq!(row.labels, "");
        assert_eq!(row.description, "");
    }

    #[test]
    fn issues_endpoint_derives_status_and_kind() {
        let mut merged = raw_item(1, "a", "closed");
        merged.pull_request = Some(PullRequestRef {
            merged_at: Some("2024-06-02T00:00:00Z".to_owned()),
        });
        let mut declined = raw_item(2, "a", "closed");
        declined.pull_request = Some(PullRequestRef::default());
        let issue = raw_item(3, "a", "closed");

        let merged = to_row(merged, Endpoint::Issues, DescriptionMode::Full);
        assert_eq!((merged.status, merged.kind), (Status::Merged, ItemKind::PullRequest));
        let declined = to_row(declined, Endpoint::Issues, DescriptionMode::Full);
        assert_eq!((declined.status, declined.kind), (Status::Closed, ItemKind::PullRequest));
        let issue = to_row(issue, Endpoint::Issues, DescriptionMode::Full);
        assert_eq!((issue.status, issue.kind), (Status::Closed, ItemKind::Issue));
    }

    proptest! {
        #[test]
        fn status_is_always_one_of_three(state in ".{0,10}", merged in proptest::option::of("[0-9TZ:-]{0,20}")) {
            let mut item = raw_item(1, "a", "open");
            item.state = state;
            item.merged_at = merged;
            for endpoint in [Endpoint::MergedPulls, Endpoint::OpenPulls, Endpoint::Issues] {
                let row = to_row(item.clone(), endpoint, DescriptionMode::Full);
                let status = row.status.to_string();
                prop_assert!(["Open", "Merged", "Closed"].contains(&status.as_str()));
            }
        }
    }
}
