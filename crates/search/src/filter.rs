//! Ordered views over a merged result set.

use std::cmp::Ordering;

use crate::models::{FilterMode, ProductRecord};

/// Derive the view for `mode`. The input is never modified.
///
/// Sorting is stable and keyed on `price_value`, so records with an unknown
/// price (the sentinel value) come last when ascending and first when
/// descending.
pub fn apply(results: &[ProductRecord], mode: FilterMode) -> Vec<ProductRecord> {
    let mut view = results.to_vec();
    match mode {
        FilterMode::All => {}
        FilterMode::Expensive => view.sort_by(|a, b| by_price(b, a)),
        FilterMode::Cheapest | FilterMode::Top3Cheap | FilterMode::Top5Cheap => {
            view.sort_by(by_price)
        }
    }
    if let Some(limit) = mode.limit() {
        view.truncate(limit);
    }
    view
}

fn by_price(a: &ProductRecord, b: &ProductRecord) -> Ordering {
    a.price_value.total_cmp(&b.price_value)
}
