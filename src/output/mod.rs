//! Output module for exporting offers and reporting store statistics
//!
//! This module handles:
//! - Exporting the offer store to a CSV/TSV spreadsheet
//! - Writing the empty placeholder export after a failed run
//! - Summarizing what the store holds

mod spreadsheet;
pub mod stats;

pub use spreadsheet::{export_offers, write_empty_export, ExportFormat, EXPORT_HEADERS};
pub use stats::{load_statistics, print_statistics, OfferStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
