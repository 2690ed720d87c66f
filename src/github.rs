use std::io::Read as _;

use tracing::{debug, error, info};

use crate::data::{Page, RawItem};
use crate::error::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Items requested per page
pub const PER_PAGE: usize = 100;

/// Something that can GET a path relative to the GitHub API root
pub trait Transport {
    fn get(&self, path: &str) -> Result<String, Error>;
}

/// Blocking GitHub REST client
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: Option<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            api_url: api_url.trim_end_matches('/').to_owned(),
            token,
        }
    }
}

impl Transport for GitHubClient {
    fn get(&self, path: &str) -> Result<String, Error> {
        let url = format!("{}/{path}", self.api_url);
        let mut request = self
            .agent
            .get(&url)
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", concat!("gh-pr-report/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        let mut body = String::new();
        request
            .call()?
            .into_reader()
            .read_to_string(&mut body)
            .map_err(Error::Body)?;
        Ok(body)
    }
}

/// The listing endpoints a report is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Closed pull requests, of which only the merged ones are reported
    MergedPulls,
    OpenPulls,
    /// Issues and pull requests together, any state
    Issues,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Self::MergedPulls => "merged PRs",
            Self::OpenPulls => "open PRs",
            Self::Issues => "issues and PRs",
        }
    }

    /// Path and query without the paging parameters
    pub fn path(self, owner: &str, repo: &str) -> String {
        match self {
            Self::MergedPulls => {
                format!("repos/{owner}/{repo}/pulls?state=closed&sort=updated&direction=desc")
            }
            Self::OpenPulls => {
                format!("repos/{owner}/{repo}/pulls?state=open&sort=updated&direction=desc")
            }
            Self::Issues => format!("repos/{owner}/{repo}/issues?state=all&filter=all"),
        }
    }
}

fn page_path(base: &str, page: usize) -> String {
    format!("{base}&per_page={PER_PAGE}&page={page}")
}

fn fetch_page(transport: &impl Transport, path: &str) -> Result<Vec<RawItem>, Error> {
    let body = transport.get(path)?;
    let page: Page = serde_json::from_str(&body)?;
    Ok(page.0)
}

/// Fetch every page of an endpoint until an empty page comes back.
///
/// A failing request stops the fetch; whatever was collected before it is
/// returned.
pub fn fetch_all(
    transport: &impl Transport,
    owner: &str,
    repo: &str,
    endpoint: Endpoint,
) -> Vec<RawItem> {
    let base = endpoint.path(owner, repo);
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        debug!(endpoint = endpoint.name(), page, "Fetching page");
        match fetch_page(transport, &page_path(&base, page)) {
            Ok(items) if items.is_empty() => break,
            Ok(items) => {
                debug!(endpoint = endpoint.name(), page, count = items.len(), "Retrieved items");
                if page == 1 {
                    let first = &items[0];
                    debug!(
                        title = first.title.as_deref().unwrap_or_default(),
                        has_body = first.body.is_some(),
                        body_len = first.body.as_deref().map_or(0, str::len),
                        "First item sample"
                    );
                }
                all.extend(items);
                page += 1;
            }
            Err(err) => {
                error!(endpoint = endpoint.name(), page, "Error fetching {}: {err}", endpoint.name());
                break;
            }
        }
    }
    info!(endpoint = endpoint.name(), count = all.len(), "Retrieved {} items", all.len());
    all
}
