use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::Rate;

/// Position of the lower-tail order statistic in a sorted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuantileIndex {
    pub index: usize,
    /// The raw `floor((1 - confidence) * n)` fell outside `[0, n - 1]`.
    pub clamped: bool,
}

/// `floor((1 - confidence) * n)`, clamped into `[0, n - 1]`.
///
/// `n` must be non-zero.
pub(crate) fn quantile_index(n: usize, confidence: Rate) -> QuantileIndex {
    debug_assert!(n > 0);
    let last = n - 1;
    let raw = ((Decimal::ONE - confidence) * Decimal::from(n)).floor();

    match raw.to_usize() {
        Some(index) if index <= last => QuantileIndex {
            index,
            clamped: false,
        },
        Some(_) => QuantileIndex {
            index: last,
            clamped: true,
        },
        None if raw.is_sign_negative() => QuantileIndex {
            index: 0,
            clamped: true,
        },
        None => QuantileIndex {
            index: last,
            clamped: true,
        },
    }
}

pub(crate) fn clamp_warning(q: QuantileIndex, n: usize) -> Option<String> {
    q.clamped.then(|| {
        format!(
            "Quantile index clamped to {} for a sample of {} observations",
            q.index, n
        )
    })
}
