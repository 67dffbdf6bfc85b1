pub mod order;
pub mod receipt;
pub mod report;

use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};

pub use order::{OrderInput, OrderLine, OrderOutcome};
pub use receipt::{
    brand_from_receipt_name, build_receipt_lines, ReceiptId, ReceiptLine, ReceiptRecord,
    ReceiptSource,
};
pub use report::{
    BrandSummary, OverConsumption, ReconciliationReport, SkipReason, SkippedReceipt,
};

fn strip_separators(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != ',').collect()
}

/// Lenient quantity: blank is 0, decimals are truncated, anything else
/// unreadable is `None`.
pub(crate) fn parse_quantity(raw: &str) -> Option<u32> {
    let cleaned = strip_separators(raw);
    if cleaned.is_empty() {
        return Some(0);
    }
    if let Ok(n) = cleaned.parse::<u32>() {
        return Some(n);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.trunc() as u32)
}

pub(crate) fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let cleaned = strip_separators(raw);
    if cleaned.is_empty() {
        return Some(BigDecimal::zero());
    }
    BigDecimal::from_str(&cleaned).ok()
}
