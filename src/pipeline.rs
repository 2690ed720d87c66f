use jiff::Zoned;
use tracing::info;

use crate::config::{Layout, PipelineConfig};
use crate::data::ReportRow;
use crate::error::Error;
use crate::filter::{DateField, ItemFilter, TimeWindow};
use crate::github::{Endpoint, Transport, fetch_all};
use crate::output::write_report;
use crate::transform::to_row;

impl Endpoint {
    /// Timestamp the report window applies to, if any
    fn date_field(self) -> Option<DateField> {
        match self {
            Self::MergedPulls => Some(DateField::Merged),
            Self::OpenPulls => None,
            Self::Issues => Some(DateField::Created),
        }
    }
}

impl Layout {
    /// Endpoints whose rows make up the report, in output order
    pub fn endpoints(self) -> &'static [Endpoint] {
        match self {
            Self::Biweekly => &[Endpoint::MergedPulls, Endpoint::OpenPulls],
            Self::Index => &[Endpoint::Issues],
        }
    }
}

/// Fetch, filter and transform the rows coming from one endpoint
fn collect_section(
    config: &PipelineConfig,
    transport: &impl Transport,
    endpoint: Endpoint,
    window: Option<&TimeWindow>,
) -> Vec<ReportRow> {
    let items = fetch_all(transport, &config.owner, &config.repo, endpoint);
    let fetched = items.len();

    let date_field = endpoint.date_field();
    let filter = ItemFilter {
        date_field,
        window: date_field.and(window),
        authors: config.authors.as_ref(),
    };
    let items = filter.apply(items);
    match &config.authors {
        Some(authors) => info!(
            "Filtered {fetched} {} to {} for authors: {}",
            endpoint.name(),
            items.len(),
            authors.names().join(", ")
        ),
        None => info!("Filtered {fetched} {} to {}", endpoint.name(), items.len()),
    }

    items
        .into_iter()
        .map(|item| to_row(item, endpoint, config.description_mode))
        .collect()
}

/// Run the whole report and return the number of rows written
pub fn run(config: &PipelineConfig, transport: &impl Transport, now: &Zoned) -> Result<usize, Error> {
    let window = config.date_mode.resolve(now)?;
    if let Some(window) = &window {
        info!("Reporting window {} .. {}", window.start, window.end);
    }

    let sections = config
        .layout
        .endpoints()
        .iter()
        .map(|&endpoint| collect_section(config, transport, endpoint, window.as_ref()))
        .collect();

    write_report(&config.output, config.layout, config.sort_key, sections)
}
