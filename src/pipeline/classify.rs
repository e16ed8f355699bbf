use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};

use crate::pipeline::events::ActivityEvent;
use crate::taxonomy::CodeTaxonomy;

/// An event retained by the filter, tagged with its taxonomy roles.
#[derive(Debug, Clone)]
pub struct ClassifiedEvent {
    pub lead_id: String,
    pub code: u32,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub is_dealer_response: bool,
    pub is_customer_reply: bool,
}

/// Stage 1: restrict to activity codes of interest and establish the one
/// sort order every later stage's "first"/"last" refers to.
///
/// The sort is stable, ascending by parsed timestamp; rows with unparseable
/// timestamps go last and ties keep input order. Unparseable rows are kept
/// here (they drop out of later aggregates on their own).
pub fn classify_and_sort(
    events: Vec<ActivityEvent>,
    taxonomy: &CodeTaxonomy,
) -> Vec<ClassifiedEvent> {
    let mut classified: Vec<ClassifiedEvent> = events
        .into_iter()
        .filter(|event| taxonomy.is_of_interest(event.code))
        .map(|event| ClassifiedEvent {
            is_dealer_response: taxonomy.is_dealer_response(event.code),
            is_customer_reply: taxonomy.is_customer_reply(event.code),
            lead_id: event.lead_id,
            code: event.code,
            timestamp: event.timestamp,
        })
        .collect();

    classified.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(ta), Some(tb)) => ta.cmp(&tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    classified
}
