use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::pipeline::anchor::Anchor;
use crate::pipeline::pre_contact::PreAnchorContact;
use crate::pipeline::reply_window::ReplyWindow;
use crate::taxonomy::CodeTaxonomy;

/// One output row. Date columns are calendar dates; type columns are
/// activity codes; `method_counts` is aligned with
/// `CodeTaxonomy::store_contact_methods` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSummary {
    pub lead_id: String,
    pub cust_contact_b4_store_date: Option<NaiveDate>,
    pub cust_contact_method_if_b4_store: Option<u32>,
    pub cust_contact_b4_store_count: u32,
    pub first_response_date: NaiveDate,
    pub first_response_type: u32,
    pub response_date_before_reply: Option<NaiveDate>,
    pub response_type_before_reply: Option<u32>,
    pub customer_reply_date: Option<NaiveDate>,
    pub customer_reply_type: Option<u32>,
    pub method_counts: Vec<u32>,
}

/// Stage 5: left-join the per-lead tables onto the anchor lead set, apply
/// the freshness filter, count store-contact-method occurrences over the
/// window rows, and emit one row per surviving lead.
///
/// An anchor calendar date must be strictly earlier than `as_of - 1 day`;
/// anything at or past that boundary is presumed future-dated source data
/// and dropped. Rows come out sorted by lead id so repeat runs are
/// byte-identical.
pub fn project(
    anchors: &HashMap<String, Anchor>,
    pre_contacts: &HashMap<String, PreAnchorContact>,
    window: &ReplyWindow,
    taxonomy: &CodeTaxonomy,
    as_of: NaiveDate,
) -> Vec<LeadSummary> {
    let method_codes: Vec<u32> = taxonomy.store_contact_methods().map(|(code, _)| code).collect();

    // Per-lead occurrence counts of each store-contact-method code within
    // the reply window.
    let mut counts: HashMap<&str, Vec<u32>> = HashMap::new();
    for event in &window.window_rows {
        if let Some(slot) = method_codes.iter().position(|code| *code == event.code) {
            counts
                .entry(event.lead_id.as_str())
                .or_insert_with(|| vec![0; method_codes.len()])[slot] += 1;
        }
    }

    let yesterday = as_of - Days::new(1);
    let mut rows: Vec<LeadSummary> = Vec::with_capacity(anchors.len());
    for (lead_id, anchor) in anchors {
        let anchor_date = anchor.first_response_date.date_naive();
        if anchor_date >= yesterday {
            debug!(lead = %lead_id, %anchor_date, "dropping lead with anchor at or past freshness boundary");
            continue;
        }

        let pre_contact = pre_contacts.get(lead_id);
        let reply = window.replies.get(lead_id);
        let summary = window.summaries.get(lead_id);

        rows.push(LeadSummary {
            lead_id: lead_id.clone(),
            cust_contact_b4_store_date: pre_contact.map(|c| c.first_date.date_naive()),
            cust_contact_method_if_b4_store: pre_contact.map(|c| c.first_method),
            cust_contact_b4_store_count: pre_contact.map(|c| c.count).unwrap_or(0),
            first_response_date: anchor_date,
            first_response_type: anchor.first_response_type,
            response_date_before_reply: summary.map(|s| s.last_response_date.date_naive()),
            response_type_before_reply: summary.map(|s| s.last_response_type),
            customer_reply_date: reply.map(|r| r.date.date_naive()),
            customer_reply_type: reply.map(|r| r.reply_type),
            method_counts: counts
                .get(lead_id.as_str())
                .cloned()
                .unwrap_or_else(|| vec![0; method_codes.len()]),
        });
    }
    rows.sort_by(|a, b| a.lead_id.cmp(&b.lead_id));
    rows
}
