use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a report
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] Box<ureq::Transport>),

    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),

    #[error("failed to parse GitHub response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid GitHub repository URL: {0}")]
    InvalidRepoUrl(String),

    #[error("invalid date {input:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate { input: String },

    #[error("date arithmetic failed: {0}")]
    Time(#[from] jiff::Error),

    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => Self::Api {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => Self::Transport(Box::new(transport)),
        }
    }
}
