use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::LeadSummary;
use crate::taxonomy::CodeTaxonomy;

/// Fixed leading columns of the summary CSV; one count column per
/// store-contact-method label follows them.
const BASE_COLUMNS: [&str; 10] = [
    "Origin",
    "CustContactB4StoreDate",
    "CustContactMethodIfB4Store",
    "#CustContactB4Store",
    "FirstResponseDate",
    "FirstResponseType",
    "ResponseDateBeforeReply",
    "ResponseTypeBeforeReply",
    "CustomerReplyDate",
    "CustomerReplyType",
];

fn date_field(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn code_field(value: Option<u32>) -> String {
    value.map(|c| c.to_string()).unwrap_or_default()
}

/// Write the summary table atomically: the rows land in a sibling temp
/// file first and are renamed into place only once fully written, so a
/// failure mid-serialization never leaves a truncated artifact.
pub fn write_summary(path: &Path, rows: &[LeadSummary], taxonomy: &CodeTaxonomy) -> Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    let mut writer = csv::Writer::from_path(&tmp_path)?;

    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(taxonomy.store_contact_methods().map(|(_, label)| label.to_string()));
    writer.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = vec![
            row.lead_id.clone(),
            date_field(row.cust_contact_b4_store_date),
            code_field(row.cust_contact_method_if_b4_store),
            row.cust_contact_b4_store_count.to_string(),
            row.first_response_date.format("%Y-%m-%d").to_string(),
            row.first_response_type.to_string(),
            date_field(row.response_date_before_reply),
            code_field(row.response_type_before_reply),
            date_field(row.customer_reply_date),
            code_field(row.customer_reply_type),
        ];
        record.extend(row.method_counts.iter().map(|count| count.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, path)?;
    debug!(file = %path.display(), rows = rows.len(), "summary written");
    Ok(())
}
