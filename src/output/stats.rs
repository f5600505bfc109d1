//! Statistics over the offer store
//!
//! This module provides functionality for summarizing what the store
//! holds and displaying it on the terminal.

use crate::storage::{Storage, StorageResult};

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferStatistics {
    /// Total number of stored offers
    pub total_offers: u64,

    /// Offer count per source, largest first
    pub offers_by_source: Vec<(String, u64)>,

    /// Smallest stored value, if any offer has one
    pub min_value: Option<f64>,

    /// Largest stored value, if any offer has one
    pub max_value: Option<f64>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<OfferStatistics> {
    let total_offers = storage.count_offers()?;
    let offers_by_source = storage.count_by_source()?;
    let range = storage.value_range()?;

    Ok(OfferStatistics {
        total_offers,
        offers_by_source,
        min_value: range.map(|(min, _)| min),
        max_value: range.map(|(_, max)| max),
    })
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &OfferStatistics) {
    println!("=== Offer Store Statistics ===\n");

    println!("Total offers: {}", stats.total_offers);

    match (stats.min_value, stats.max_value) {
        (Some(min), Some(max)) => println!("Value range: {} .. {}", min, max),
        _ => println!("Value range: n/a"),
    }

    if !stats.offers_by_source.is_empty() {
        println!("\nOffers by source:");
        for (source, count) in &stats.offers_by_source {
            println!("  {:30} {:>8}", source, count);
        }
    }
}
