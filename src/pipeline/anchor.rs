use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::pipeline::classify::ClassifiedEvent;

/// A lead's first dealer response: the temporal reference point for every
/// downstream computation.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub first_response_date: DateTime<FixedOffset>,
    pub first_response_type: u32,
}

/// Stage 2: per lead, the earliest dealer-response event with a parseable
/// timestamp. Events arrive in the global sort order, so the first
/// qualifying row per lead is the minimum; identical timestamps resolve to
/// the earliest row in that order. Leads with no qualifying event are
/// absent from the result and thereby excluded from the final output.
pub fn detect_anchors(events: &[ClassifiedEvent]) -> HashMap<String, Anchor> {
    let mut anchors: HashMap<String, Anchor> = HashMap::new();
    for event in events {
        if !event.is_dealer_response {
            continue;
        }
        let Some(timestamp) = event.timestamp else {
            continue;
        };
        anchors
            .entry(event.lead_id.clone())
            .or_insert(Anchor {
                first_response_date: timestamp,
                first_response_type: event.code,
            });
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::classify_and_sort;
    use crate::pipeline::events::{parse_activity_date, ActivityEvent};
    use crate::taxonomy::CodeTaxonomy;

    fn sorted(events: Vec<(&str, u32, Option<&str>)>) -> Vec<ClassifiedEvent> {
        let events = events
            .into_iter()
            .map(|(lead, code, ts)| ActivityEvent {
                lead_id: lead.to_string(),
                code,
                timestamp: ts.map(|raw| parse_activity_date(raw).unwrap()),
            })
            .collect();
        classify_and_sort(events, &CodeTaxonomy::builtin())
    }

    #[test]
    fn picks_minimum_dealer_response_timestamp() {
        let events = sorted(vec![
            ("L1", 4, Some("2024-03-03T09:00:00.000000+00:00")),
            ("L1", 3, Some("2024-03-01T09:00:00.000000+00:00")),
            ("L1", 5, Some("2024-02-28T09:00:00.000000+00:00")), // customer reply, ignored
        ]);
        let anchors = detect_anchors(&events);
        let anchor = &anchors["L1"];
        assert_eq!(anchor.first_response_type, 3);
        assert_eq!(
            anchor.first_response_date,
            parse_activity_date("2024-03-01T09:00:00.000000+00:00").unwrap()
        );
    }

    #[test]
    fn lead_without_dealer_response_is_absent() {
        let events = sorted(vec![
            ("L1", 5, Some("2024-03-01T09:00:00.000000+00:00")),
            ("L2", 3, Some("2024-03-01T09:00:00.000000+00:00")),
        ]);
        let anchors = detect_anchors(&events);
        assert!(!anchors.contains_key("L1"));
        assert!(anchors.contains_key("L2"));
    }

    #[test]
    fn unparseable_timestamps_never_anchor() {
        let events = sorted(vec![("L1", 3, None)]);
        assert!(detect_anchors(&events).is_empty());
    }

    #[test]
    fn identical_timestamps_take_first_in_sort_order() {
        let at = "2024-03-01T09:00:00.000000+00:00";
        let events = sorted(vec![("L1", 4, Some(at)), ("L1", 3, Some(at))]);
        assert_eq!(detect_anchors(&events)["L1"].first_response_type, 4);
    }
}
