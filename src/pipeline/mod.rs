// Lead response pipeline: classify -> anchor -> pre-anchor contact ->
// reply window -> projection. Each stage produces a fresh table; nothing
// is mutated in place once built.

pub mod anchor;
pub mod classify;
pub mod events;
pub mod pre_contact;
pub mod project;
pub mod reply_window;

use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::taxonomy::CodeTaxonomy;

pub use project::LeadSummary;

/// Run the full pipeline for one file and return its summary rows.
/// `as_of` is the freshness reference date (normally today).
pub fn summarize_file(
    path: &Path,
    taxonomy: &CodeTaxonomy,
    as_of: NaiveDate,
) -> Result<Vec<LeadSummary>> {
    let raw = events::read_events(path)?;
    let total = raw.len();
    let sorted = classify::classify_and_sort(raw, taxonomy);
    debug!(
        file = %path.display(),
        total_rows = total,
        classified_rows = sorted.len(),
        "classified activity events"
    );

    let anchors = anchor::detect_anchors(&sorted);
    let pre_contacts = pre_contact::detect_pre_anchor_contact(&sorted, &anchors);
    let window = reply_window::select_reply_window(&sorted, &anchors);
    Ok(project::project(
        &anchors,
        &pre_contacts,
        &window,
        taxonomy,
        as_of,
    ))
}
