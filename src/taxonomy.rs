use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};

/// The three activity-code categories the pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    DealerResponse,
    CustomerReply,
    StoreContactMethod,
}

/// Mapping from activity code to a short channel label, per category.
///
/// Store-contact-method codes are a labeled subset of the dealer-response
/// codes; each one also gets its own count column in the output. The
/// taxonomy is injected into the pipeline rather than hardcoded inside it,
/// so alternate code sets can be loaded from a TOML file.
#[derive(Debug, Clone)]
pub struct CodeTaxonomy {
    dealer_response: BTreeMap<u32, String>,
    customer_reply: BTreeMap<u32, String>,
    store_contact_method: BTreeMap<u32, String>,
}

#[derive(Debug, Deserialize)]
struct CodeEntry {
    code: u32,
    label: String,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    dealer_response: Vec<CodeEntry>,
    customer_reply: Vec<CodeEntry>,
    store_contact_method: Vec<CodeEntry>,
}

impl CodeTaxonomy {
    /// The code sets shipped with the binary.
    ///
    /// Customer codes like 17 or 26 represent process states that imply a
    /// prior customer communication even when no reply event was captured
    /// directly, so they count as customer replies here.
    pub fn builtin() -> Self {
        let dealer_response = [
            (1, "Outbound Call"),
            (2, "Outbound Email"),
            (3, "Store Call"),
            (4, "Store Email"),
            (9, "Outbound Text"),
            (35, "Store Text"),
        ];
        let customer_reply = [
            (5, "Inbound Call"),
            (7, "Inbound Email"),
            (8, "Inbound Text"),
            (10, "Voicemail Left"),
            (11, "Callback Requested"),
            (17, "Appointment Set"),
            (18, "Appointment Confirmed"),
            (19, "Appointment Kept"),
            (26, "Showroom Visit"),
            (27, "Test Drive"),
            (32, "Quote Requested"),
            (33, "Trade-In Inquiry"),
            (34, "Credit Application"),
            (36, "Web Chat"),
        ];
        let store_contact_method = [(3, "Store Call"), (4, "Store Email"), (35, "Store Text")];

        let to_map = |entries: &[(u32, &str)]| {
            entries
                .iter()
                .map(|(code, label)| (*code, label.to_string()))
                .collect::<BTreeMap<u32, String>>()
        };

        Self {
            dealer_response: to_map(&dealer_response),
            customer_reply: to_map(&customer_reply),
            store_contact_method: to_map(&store_contact_method),
        }
    }

    /// Load a replacement taxonomy from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Taxonomy(format!(
                "failed to read taxonomy file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let parsed: TaxonomyFile = toml::from_str(&content)
            .map_err(|e| ReportError::Taxonomy(format!("invalid taxonomy file: {}", e)))?;

        let to_map = |entries: Vec<CodeEntry>| {
            entries
                .into_iter()
                .map(|e| (e.code, e.label))
                .collect::<BTreeMap<u32, String>>()
        };
        let taxonomy = Self {
            dealer_response: to_map(parsed.dealer_response),
            customer_reply: to_map(parsed.customer_reply),
            store_contact_method: to_map(parsed.store_contact_method),
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Every store-contact-method code must also be a dealer-response code.
    fn validate(&self) -> Result<()> {
        for code in self.store_contact_method.keys() {
            if !self.dealer_response.contains_key(code) {
                return Err(ReportError::Taxonomy(format!(
                    "store-contact-method code {} is not a dealer-response code",
                    code
                )));
            }
        }
        Ok(())
    }

    pub fn is_dealer_response(&self, code: u32) -> bool {
        self.dealer_response.contains_key(&code)
    }

    pub fn is_customer_reply(&self, code: u32) -> bool {
        self.customer_reply.contains_key(&code)
    }

    /// True when the code appears in any category.
    pub fn is_of_interest(&self, code: u32) -> bool {
        self.dealer_response.contains_key(&code)
            || self.customer_reply.contains_key(&code)
            || self.store_contact_method.contains_key(&code)
    }

    /// Store-contact-method codes with labels, ascending by code. The label
    /// order here fixes the order of the per-method count columns.
    pub fn store_contact_methods(&self) -> impl Iterator<Item = (u32, &str)> {
        self.store_contact_method
            .iter()
            .map(|(code, label)| (*code, label.as_str()))
    }

    pub fn label(&self, category: Category, code: u32) -> Option<&str> {
        let map = match category {
            Category::DealerResponse => &self.dealer_response,
            Category::CustomerReply => &self.customer_reply,
            Category::StoreContactMethod => &self.store_contact_method,
        };
        map.get(&code).map(String::as_str)
    }
}

impl Default for CodeTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}
