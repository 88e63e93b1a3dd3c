use crate::model::{FilterSummary, Product};

/// Counts how much of `all` the derived view `filtered` shows.
///
/// Only lengths are compared. The calculator does not check that `filtered` is
/// actually drawn from `all`; on inconsistent input `hidden` goes negative and
/// `percentage` can exceed 100.
pub fn summarize(all: &[Product], filtered: &[Product]) -> FilterSummary {
    let total = all.len();
    let filtered_count = filtered.len();
    let hidden = total as isize - filtered_count as isize;
    let percentage = if total > 0 {
        round_half_up(filtered_count as f64 / total as f64 * 100.0) as u32
    } else {
        0
    };

    FilterSummary {
        total,
        filtered: filtered_count,
        hidden,
        percentage,
    }
}

/// Rounds halves towards positive infinity, like `Math.round`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
