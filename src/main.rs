use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jiff::{Timestamp, Zoned};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod data;
mod error;
mod filter;
mod github;
mod output;
mod pipeline;
mod transform;

use config::{DateArg, DateMode, DescriptionMode, Layout, PipelineConfig, SortKey};
use filter::AuthorFilter;
use github::GitHubClient;

/// Export GitHub pull request and issue activity as CSV
#[derive(Parser)]
#[command(name = "gh-pr-report")]
#[command(about = "Export GitHub pull request and issue activity as CSV")]
#[command(long_about = r#"gh-pr-report - Export GitHub pull request and issue activity as CSV

AUTHENTICATION:
    Set GITHUB_AUTH_TOKEN (or GITHUB_TOKEN) to a personal access token,
    or pass --token. Without one, requests are unauthenticated and
    heavily rate limited."#)]
struct Cli {
    /// GitHub API token
    #[arg(long, global = true, env = "GITHUB_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, default_value = github::DEFAULT_API_URL)]
    api_url: String,

    /// Show per-page and per-item progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merged PRs in a date range followed by all open PRs
    Report(ReportArgs),

    /// Every issue and PR of a repository, oldest first
    Index(IndexArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Repository owner
    #[arg(short = 'u', long, alias = "github-username")]
    owner: String,

    /// Repository name
    #[arg(short, long, alias = "github-repo")]
    repo: String,

    /// First day of the report (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, alias = "from", value_name = "DATE", value_parser = parse_date)]
    start_date: Option<DateArg>,

    /// Last day of the report, inclusive (needs --start-date)
    #[arg(short = 't', long, alias = "to", value_name = "DATE", value_parser = parse_date)]
    stop_date: Option<DateArg>,

    /// Report the last N days instead of the last two weeks
    #[arg(short, long, value_name = "N")]
    num_days: Option<u32>,

    /// Only include these authors (comma-separated, case-insensitive)
    #[arg(short, long, value_name = "LOGINS")]
    authors: Option<String>,

    /// Description column content
    #[arg(long, value_enum, default_value_t = DescriptionMode::Summary)]
    description: DescriptionMode,

    /// Row order within the merged and open sections
    #[arg(long, value_enum, default_value_t = SortKey::Labels)]
    sort: SortKey,

    /// Directory the report is written to
    #[arg(short, long, default_value = "csv_output")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct IndexArgs {
    /// Repository URL, e.g. https://github.com/owner/repo
    repo_url: String,

    /// Where to write the CSV
    output: PathBuf,

    /// Only include these authors (comma-separated, case-insensitive)
    authors: Option<String>,

    /// Only include items created on or after this date
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    since: Option<DateArg>,

    /// Only include items created on or before this date
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    until: Option<DateArg>,

    /// Description column content
    #[arg(long, value_enum, default_value_t = DescriptionMode::Full)]
    description: DescriptionMode,

    /// Row order
    #[arg(long, value_enum, default_value_t = SortKey::DateOpened)]
    sort: SortKey,
}

fn parse_date(input: &str) -> Result<DateArg, String> {
    input.parse().map_err(|err: error::Error| err.to_string())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(command: Command) -> Result<PipelineConfig, error::Error> {
    match command {
        Command::Report(args) => Ok(PipelineConfig {
            output: config::biweekly_report_path(&args.output_dir, &args.owner, &args.repo),
            date_mode: DateMode::from_args(
                args.start_date,
                args.stop_date,
                args.num_days.map(i64::from),
            ),
            owner: args.owner,
            repo: args.repo,
            layout: Layout::Biweekly,
            sort_key: args.sort,
            description_mode: args.description,
            authors: args.authors.as_deref().and_then(AuthorFilter::parse),
        }),
        Command::Index(args) => {
            let (owner, repo) = output::parse_repo_url(&args.repo_url)?;
            let date_mode = match (args.since, args.until) {
                (None, None) => DateMode::Unbounded,
                (None, Some(stop)) => DateMode::FixedRange {
                    start: DateArg::Instant(Timestamp::MIN),
                    stop,
                },
                (since, until) => DateMode::from_args(since, until, None),
            };
            Ok(PipelineConfig {
                owner,
                repo,
                layout: Layout::Index,
                date_mode,
                sort_key: args.sort,
                description_mode: args.description,
                authors: args.authors.as_deref().and_then(AuthorFilter::parse),
                output: args.output,
            })
        }
    }
}

/// Run one report. Failures are logged; the process still exits normally.
fn run(cli: Cli, now: &Zoned) {
    let config = match build_config(cli.command) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return;
        }
    };
    info!("Processing repository: {}/{}", config.owner, config.repo);

    let token = cli
        .token
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .filter(|token| !token.is_empty());
    if token.is_none() {
        warn!("No GitHub token set; requests are unauthenticated and may be rate limited");
    }
    let client = GitHubClient::new(&cli.api_url, token);

    match pipeline::run(&config, &client, now) {
        Ok(rows) => output::print_summary(&config.output, config.layout, rows),
        Err(err) => error!("Report failed: {err}"),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli, &Zoned::now());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_repo_url_returns_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out/index.csv");
        let cli = Cli::try_parse_from([
            "gh-pr-report",
            "index",
            "https://gitlab.com/octo/hello",
            output.to_str().unwrap(),
        ])
        .unwrap();

        run(cli, &Zoned::now());
        assert!(!output.exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn index_without_dates_is_unbounded() {
        let cli = Cli::try_parse_from([
            "gh-pr-report",
            "index",
            "https://github.com/octo/hello",
            "out.csv",
            "alice, bob",
        ])
        .unwrap();
        let config = build_config(cli.command).unwrap();
        assert_eq!((config.owner.as_str(), config.repo.as_str()), ("octo", "hello"));
        assert_eq!(config.date_mode, DateMode::Unbounded);
        assert!(config.authors.is_some());
    }

    #[test]
    fn missing_positionals_are_usage_errors() {
        assert!(Cli::try_parse_from(["gh-pr-report", "index", "https://github.com/octo/hello"]).is_err());
    }
}
