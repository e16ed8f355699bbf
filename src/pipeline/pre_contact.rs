use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::pipeline::anchor::Anchor;
use crate::pipeline::classify::ClassifiedEvent;

/// Customer contact that happened strictly before the lead's anchor.
#[derive(Debug, Clone, Copy)]
pub struct PreAnchorContact {
    /// Earliest pre-anchor customer contact.
    pub first_date: DateTime<FixedOffset>,
    /// Activity code of that earliest contact.
    pub first_method: u32,
    /// How many customer-reply events preceded the anchor.
    pub count: u32,
}

/// Stage 3: per lead, summarize customer-reply events strictly before the
/// anchor. This is a separate pass over the full classified table, not a
/// destructive filter: a customer who reached out first and then also
/// replied after the dealer's response must still show up in the
/// reply-window analysis of stage 4.
///
/// Leads with no pre-anchor contact are absent here; joins against this
/// table read absence as "zero contacts".
pub fn detect_pre_anchor_contact(
    events: &[ClassifiedEvent],
    anchors: &HashMap<String, Anchor>,
) -> HashMap<String, PreAnchorContact> {
    let mut contacts: HashMap<String, PreAnchorContact> = HashMap::new();
    for event in events {
        if !event.is_customer_reply {
            continue;
        }
        let Some(timestamp) = event.timestamp else {
            continue;
        };
        let Some(anchor) = anchors.get(&event.lead_id) else {
            continue;
        };
        if timestamp >= anchor.first_response_date {
            continue;
        }
        contacts
            .entry(event.lead_id.clone())
            .and_modify(|contact| contact.count += 1)
            .or_insert(PreAnchorContact {
                first_date: timestamp,
                first_method: event.code,
                count: 1,
            });
    }
    contacts
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
    fn counts_only_strictly_pre_anchor_replies() {
        let events = sorted(vec![
            ("L2", 5, "2024-03-01T08:00:00.000000+00:00"), // before anchor
            ("L2", 7, "2024-03-01T09:00:00.000000+00:00"), // before anchor
            ("L2", 4, "2024-03-03T09:00:00.000000+00:00"), // anchor
            ("L2", 5, "2024-03-04T09:00:00.000000+00:00"), // after anchor
        ]);
        let anchors = detect_anchors(&events);
        let contacts = detect_pre_anchor_contact(&events, &anchors);

        let contact = &contacts["L2"];
        assert_eq!(contact.count, 2);
        assert_eq!(contact.first_method, 5);
        assert_eq!(
            contact.first_date,
            parse_activity_date("2024-03-01T08:00:00.000000+00:00").unwrap()
        );
    }

    #[test]
    fn reply_at_anchor_instant_does_not_count() {
        let at = "2024-03-03T09:00:00.000000+00:00";
        let events = sorted(vec![("L1", 5, at), ("L1", 4, at)]);
        let anchors = detect_anchors(&events);
        assert!(detect_pre_anchor_contact(&events, &anchors).is_empty());
    }

    #[test]
    fn lead_with_no_pre_anchor_contact_is_absent() {
        let events = sorted(vec![
            ("L1", 3, "2024-03-01T09:00:00.000000+00:00"),
            ("L1", 5, "2024-03-02T09:00:00.000000+00:00"),
        ]);
        let anchors = detect_anchors(&events);
        let contacts = detect_pre_anchor_contact(&events, &anchors);
        assert!(contacts.is_empty());
    }
}
