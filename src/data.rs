use std::fmt;

use serde::Deserialize;

/// Author of an issue or pull request
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// A label attached to an issue or pull request
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Present on items from the issues endpoint that are really pull requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub merged_at: Option<String>,
}

/// An issue or pull request as returned by the GitHub REST API.
///
/// The same shape covers both `/pulls` and `/issues` listings; fields only one
/// of them returns are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: String,
    #[serde(default)]
    pub merged_at: Option<String>,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub html_url: String,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
}

impl RawItem {
    /// Merge timestamp, wherever the endpoint put it
    pub fn merged_at(&self) -> Option<&str> {
        self.merged_at
            .as_deref()
            .or_else(|| self.pull_request.as_ref()?.merged_at.as_deref())
    }

    pub fn author(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.login.as_str())
    }

    /// Issue vs pull request; only meaningful for items from the issues endpoint
    pub fn kind(&self) -> ItemKind {
        if self.pull_request.is_some() {
            ItemKind::PullRequest
        } else {
            ItemKind::Issue
        }
    }
}

/// Wrapper for one page of items from the GitHub API
#[derive(Deserialize)]
pub struct Page(pub Vec<RawItem>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    PullRequest,
    Issue,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PullRequest => "PR",
            Self::Issue => "Issue",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Merged,
    Closed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "Open",
            Self::Merged => "Merged",
            Self::Closed => "Closed",
        })
    }
}

/// One normalized line of the CSV report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub number: u64,
    pub title: String,
    pub status: Status,
    pub labels: String,
    pub url: String,
    pub description: String,
    /// Raw merge timestamp, or `n/a`
    pub date_merged: String,
    pub date_opened: String,
    pub kind: ItemKind,
    pub author: String,
}
