use std::path::PathBuf;
use std::str::FromStr;

use jiff::civil::{Date, Time};
use jiff::{Span, Timestamp, Zoned};

use crate::error::Error;
use crate::filter::{AuthorFilter, TimeWindow};

/// Days covered by a report when no dates are given
pub const DEFAULT_REPORT_DAYS: i64 = 14;

/// A date given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateArg {
    /// A calendar day in the local time zone
    Day(Date),
    /// An exact instant
    Instant(Timestamp),
}

impl FromStr for DateArg {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if let Ok(date) = input.parse::<Date>() {
            return Ok(Self::Day(date));
        }
        input
            .parse::<Timestamp>()
            .map(Self::Instant)
            .map_err(|_| Error::InvalidDate {
                input: input.to_owned(),
            })
    }
}

impl DateArg {
    /// First instant of the day, or the instant itself
    fn start(self, now: &Zoned) -> Result<Timestamp, Error> {
        match self {
            Self::Day(date) => Ok(date.to_zoned(now.time_zone().clone())?.timestamp()),
            Self::Instant(ts) => Ok(ts),
        }
    }

    /// Last instant of the day, or the instant itself
    fn end(self, now: &Zoned) -> Result<Timestamp, Error> {
        match self {
            Self::Day(date) => Ok(date
                .to_datetime(Time::MAX)
                .to_zoned(now.time_zone().clone())?
                .timestamp()),
            Self::Instant(ts) => Ok(ts),
        }
    }
}

/// How the reporting window is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    /// Both ends given explicitly
    FixedRange { start: DateArg, stop: DateArg },
    /// From a start date up to now
    FromOnly { start: DateArg },
    /// The last N days, starting at midnight
    RelativeDays(i64),
    /// The last [`DEFAULT_REPORT_DAYS`] days
    Default14Days,
    /// No date filtering at all
    Unbounded,
}

impl DateMode {
    /// Pick a mode from the command-line date options, most specific first.
    ///
    /// A stop date without a start date is ignored.
    pub fn from_args(start: Option<DateArg>, stop: Option<DateArg>, num_days: Option<i64>) -> Self {
        match (start, stop, num_days) {
            (Some(start), Some(stop), _) => Self::FixedRange { start, stop },
            (Some(start), None, _) => Self::FromOnly { start },
            (None, _, Some(days)) => Self::RelativeDays(days),
            (None, _, None) => Self::Default14Days,
        }
    }

    /// Turn the mode into a concrete window relative to `now`.
    ///
    /// Returns `None` for [`DateMode::Unbounded`].
    pub fn resolve(&self, now: &Zoned) -> Result<Option<TimeWindow>, Error> {
        let window = match *self {
            Self::FixedRange { start, stop } => TimeWindow::new(start.start(now)?, stop.end(now)?),
            Self::FromOnly { start } => TimeWindow::new(start.start(now)?, now.timestamp()),
            Self::RelativeDays(days) => last_days(now, days)?,
            Self::Default14Days => last_days(now, DEFAULT_REPORT_DAYS)?,
            Self::Unbounded => return Ok(None),
        };
        Ok(Some(window))
    }
}

fn last_days(now: &Zoned, days: i64) -> Result<TimeWindow, Error> {
    let start = now
        .date()
        .checked_sub(Span::new().try_days(days)?)?
        .to_zoned(now.time_zone().clone())?;
    Ok(TimeWindow::new(start.timestamp(), now.timestamp()))
}

/// Column used to order rows before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    /// Labels column, plain string order
    Labels,
    /// Creation timestamp, oldest first
    DateOpened,
}

/// What goes into the Description column
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DescriptionMode {
    /// The whole body, cleaned up
    Full,
    /// Only the `### Detailed summary` section
    Summary,
}

/// Which report is produced, and with it which endpoints and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Merged PRs in the window followed by all open PRs
    Biweekly,
    /// Every issue and PR of the repository
    Index,
}

/// Everything a pipeline run needs, built once in `main`
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub owner: String,
    pub repo: String,
    pub layout: Layout,
    pub date_mode: DateMode,
    pub sort_key: SortKey,
    pub description_mode: DescriptionMode,
    pub authors: Option<AuthorFilter>,
    pub output: PathBuf,
}

/// Where the biweekly report is written when no path is given
pub fn biweekly_report_path(output_dir: &std::path::Path, owner: &str, repo: &str) -> PathBuf {
    output_dir.join(format!("{owner}_{repo}_biweekly_pr_report.csv"))
}
