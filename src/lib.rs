pub mod batch;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod taxonomy;

pub use batch::{run_batch, BatchSummary};
pub use error::{ReportError, Result};
pub use pipeline::LeadSummary;
pub use taxonomy::CodeTaxonomy;
