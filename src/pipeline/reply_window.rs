use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::pipeline::anchor::Anchor;
use crate::pipeline::classify::ClassifiedEvent;

/// The customer's first reply at or after the anchor.
#[derive(Debug, Clone, Copy)]
pub struct Reply {
    pub date: DateTime<FixedOffset>,
    pub reply_type: u32,
}

/// Dealer activity inside the reply window, collapsed per lead.
#[derive(Debug, Clone, Copy)]
pub struct WindowSummary {
    /// Latest dealer response at or before the reply (the closest-to-reply
    /// contact). Unbounded forward when the lead never replied.
    pub last_response_date: DateTime<FixedOffset>,
    pub last_response_type: u32,
}

/// Stage 4 output: per-lead reply and window aggregates, plus the window
/// rows themselves (stage 5 counts per-method occurrences over them).
#[derive(Debug)]
pub struct ReplyWindow {
    pub replies: HashMap<String, Reply>,
    pub summaries: HashMap<String, WindowSummary>,
    pub window_rows: Vec<ClassifiedEvent>,
}

/// Stage 4: restrict to events at/after the anchor, detect each lead's
/// first reply in that restriction, then clamp the window at the reply
/// (keeping everything post-anchor when no reply exists) and summarize the
/// dealer responses inside it.
pub fn select_reply_window(
    events: &[ClassifiedEvent],
    anchors: &HashMap<String, Anchor>,
) -> ReplyWindow {
    // Post-anchor restriction. Rows without a parseable timestamp cannot be
    // placed relative to the anchor and drop out here.
    let restricted: Vec<&ClassifiedEvent> = events
        .iter()
        .filter(|event| {
            let (Some(timestamp), Some(anchor)) =
                (event.timestamp, anchors.get(&event.lead_id))
            else {
                return false;
            };
            timestamp >= anchor.first_response_date
        })
        .collect();

    // Step 1: first customer reply per lead, in sort order.
    let mut replies: HashMap<String, Reply> = HashMap::new();
    for event in &restricted {
        if !event.is_customer_reply {
            continue;
        }
        let Some(timestamp) = event.timestamp else {
            continue;
        };
        replies.entry(event.lead_id.clone()).or_insert(Reply {
            date: timestamp,
            reply_type: event.code,
        });
    }

    // Step 2: clamp at the reply; no reply means the window stays open.
    let window_rows: Vec<ClassifiedEvent> = restricted
        .into_iter()
        .filter(|event| match replies.get(&event.lead_id) {
            Some(reply) => event.timestamp.is_some_and(|ts| ts <= reply.date),
            None => true,
        })
        .cloned()
        .collect();

    // Step 3: last dealer response in the window. Rows are still in the
    // global sort order, so overwriting per lead leaves the latest row,
    // which also bears the maximum timestamp.
    let mut summaries: HashMap<String, WindowSummary> = HashMap::new();
    for event in &window_rows {
        if !event.is_dealer_response {
            continue;
        }
        let Some(timestamp) = event.timestamp else {
            continue;
        };
        summaries.insert(
            event.lead_id.clone(),
            WindowSummary {
                last_response_date: timestamp,
                last_response_type: event.code,
            },
        );
    }

    ReplyWindow {
        replies,
        summaries,
        window_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::anchor::detect_anchors;
    use crate::pipeline::classify::classify_and_sort;
    use crate::pipeline::events::{parse_activity_date, ActivityEvent};
    use crate::taxonomy::CodeTaxonomy;

    fn sorted(events: Vec<(&str, u32, &str)>) -> Vec<ClassifiedEvent> {
        let events = events
            .into_iter()
            .map(|(lead, code, ts)| ActivityEvent {
                lead_id: lead.to_string(),
                code,
                timestamp: Some(parse_activity_date(ts).unwrap()),
            })
            .collect();
        classify_and_sort(events, &CodeTaxonomy::builtin())
    }

    #[test]
    fn window_runs_from_anchor_to_first_reply_inclusive() {
        let events = sorted(vec![
            ("L1", 5, "2024-03-01T08:00:00.000000+00:00"), // pre-anchor, excluded
            ("L1", 3, "2024-03-02T08:00:00.000000+00:00"), // anchor
            ("L1", 4, "2024-03-03T08:00:00.000000+00:00"), // in window
            ("L1", 5, "2024-03-04T08:00:00.000000+00:00"), // reply, closes window
            ("L1", 35, "2024-03-05T08:00:00.000000+00:00"), // after reply, excluded
        ]);
        let anchors = detect_anchors(&events);
        let window = select_reply_window(&events, &anchors);

        let reply = &window.replies["L1"];
        assert_eq!(reply.reply_type, 5);
        assert_eq!(
            reply.date,
            parse_activity_date("2024-03-04T08:00:00.000000+00:00").unwrap()
        );

        let summary = &window.summaries["L1"];
        assert_eq!(summary.last_response_type, 4);
        assert_eq!(
            summary.last_response_date,
            parse_activity_date("2024-03-03T08:00:00.000000+00:00").unwrap()
        );

        assert_eq!(window.window_rows.len(), 3);
    }

    #[test]
    fn no_reply_keeps_all_post_anchor_rows() {
        let events = sorted(vec![
            ("L1", 3, "2024-03-02T08:00:00.000000+00:00"),
            ("L1", 4, "2024-03-05T08:00:00.000000+00:00"),
            ("L1", 35, "2024-03-09T08:00:00.000000+00:00"),
        ]);
        let anchors = detect_anchors(&events);
        let window = select_reply_window(&events, &anchors);

        assert!(window.replies.is_empty());
        let summary = &window.summaries["L1"];
        assert_eq!(summary.last_response_type, 35);
        assert_eq!(window.window_rows.len(), 3);
    }

    #[test]
    fn last_response_is_between_anchor_and_reply() {
        let events = sorted(vec![
            ("L1", 3, "2024-03-02T08:00:00.000000+00:00"),
            ("L1", 4, "2024-03-02T12:00:00.000000+00:00"),
            ("L1", 5, "2024-03-03T08:00:00.000000+00:00"),
        ]);
        let anchors = detect_anchors(&events);
        let window = select_reply_window(&events, &anchors);

        let anchor = anchors["L1"].first_response_date;
        let summary = &window.summaries["L1"];
        let reply = &window.replies["L1"];
        assert!(summary.last_response_date >= anchor);
        assert!(summary.last_response_date <= reply.date);
    }

    #[test]
    fn leads_without_anchor_contribute_nothing() {
        let events = sorted(vec![("L1", 5, "2024-03-02T08:00:00.000000+00:00")]);
        let anchors = detect_anchors(&events);
        let window = select_reply_window(&events, &anchors);
        assert!(window.replies.is_empty());
        assert!(window.window_rows.is_empty());
    }
}
