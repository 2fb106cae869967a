//! Derivation of the summary fields stored on a dataset.
//!
//! The store persists whatever summary it is handed, so these must run
//! before a dataset is saved.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use netra_types::{Asset, Dataset, service_tokens};

/// Number of services kept in the summary.
pub const TOP_SERVICES: usize = 10;

/// Assets with at least one open port.
pub fn active_count(assets: &[Asset]) -> usize {
    assets.iter().filter(|a| a.is_active()).count()
}

/// Most frequent services across `assets`, joined with ", ".
///
/// Ranked by descending count; equal counts keep the order in which the
/// services were first seen.
pub fn services_summary(assets: &[Asset]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for token in assets.iter().flat_map(|a| service_tokens(&a.open_services)) {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order within a count.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(TOP_SERVICES);
    order.join(", ")
}

/// Build an unsaved dataset for one scan batch.
///
/// `files` are the source scan files; their count becomes `scans_processed`.
pub fn build_dataset<P: AsRef<Path>>(
    company_name: &str,
    scan_date: NaiveDate,
    assets: &[Asset],
    files: &[P],
) -> Dataset {
    let mut dataset = Dataset::new(company_name.trim(), scan_date);
    dataset.total_assets = assets.len();
    dataset.active_assets = active_count(assets);
    dataset.all_services = services_summary(assets);
    dataset.scans_processed = files.len();
    dataset.original_files = files
        .iter()
        .map(|f| f.as_ref().display().to_string())
        .collect();
    dataset
}
