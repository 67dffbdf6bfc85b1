use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MatchStrategy;
use crate::models::{OrderLine, ReceiptId, ReceiptLine};

/// A commit that pushed a receipt line's found-count past its quantity.
/// The match is kept; the event is only recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverConsumption {
    pub receipt_id: ReceiptId,
    pub order_row: usize,
    pub brand: String,
    pub product: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub found_before: u64,
    pub ordered: u32,
}

impl OverConsumption {
    pub fn found_after(&self) -> u64 {
        self.found_before + u64::from(self.ordered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing left of the name once the numeric suffix is stripped.
    MalformedName,
    /// The receipt file had no records.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedReceipt {
    pub receipt: String,
    pub reason: SkipReason,
}

impl SkippedReceipt {
    pub fn new(receipt: &str, reason: SkipReason) -> Self {
        Self {
            receipt: receipt.to_string(),
            reason,
        }
    }
}

/// Per-brand-partition counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandSummary {
    pub brand: String,
    pub orders: usize,
    pub matched_orders: usize,
    pub receipts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub strategy: MatchStrategy,
    pub threshold: f64,
    pub total_orders: usize,
    pub matched_orders: usize,
    pub unmatched_orders: usize,
    pub total_receipts: usize,
    pub matched_receipts: usize,
    pub unmatched_receipts: usize,
    /// matched orders / receipt lines, as a percentage with one decimal.
    pub match_ratio: f64,
    pub brands: Vec<BrandSummary>,
    pub over_consumed: Vec<OverConsumption>,
    pub skipped_receipts: Vec<SkippedReceipt>,
    pub generated_at: DateTime<Utc>,
}

pub fn match_ratio(matched: usize, total_receipts: usize) -> f64 {
    if total_receipts == 0 {
        return 0.0;
    }
    let pct = matched as f64 / total_receipts as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

impl ReconciliationReport {
    pub fn build(
        strategy: MatchStrategy,
        threshold: f64,
        orders: &[OrderLine],
        receipts: &[ReceiptLine],
        brands: Vec<BrandSummary>,
        over_consumed: Vec<OverConsumption>,
        skipped_receipts: Vec<SkippedReceipt>,
    ) -> Self {
        let matched_orders = orders.iter().filter(|o| o.matched).count();
        let matched_receipts = receipts.iter().filter(|r| r.is_matched()).count();

        Self {
            strategy,
            threshold,
            total_orders: orders.len(),
            matched_orders,
            unmatched_orders: orders.len() - matched_orders,
            total_receipts: receipts.len(),
            matched_receipts,
            unmatched_receipts: receipts.len() - matched_receipts,
            match_ratio: match_ratio(matched_orders, receipts.len()),
            brands,
            over_consumed,
            skipped_receipts,
            generated_at: Utc::now(),
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Matched: {}, receipt lines: {}, match ratio: {:.1}%",
            self.matched_orders, self.total_receipts, self.match_ratio
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_rounds_to_one_decimal() {
        assert_eq!(match_ratio(1, 3), 33.3);
        assert_eq!(match_ratio(2, 3), 66.7);
        assert_eq!(match_ratio(3, 3), 100.0);
        assert_eq!(match_ratio(0, 0), 0.0);
    }

    #[test]
    fn summary_counts() {
        let mut order = OrderLine::new(0, "ABC", "맨투맨", "", "", 1);
        order.matched = true;
        let orders = vec![order, OrderLine::new(1, "ABC", "팬츠", "", "", 1)];
        let report = ReconciliationReport::build(
            MatchStrategy::Greedy,
            0.3,
            &orders,
            &[],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.matched_orders, 1);
        assert_eq!(report.unmatched_orders, 1);
        assert_eq!(report.match_ratio, 0.0);
        assert_eq!(
            report.summary_line(),
            "Matched: 1, receipt lines: 0, match ratio: 0.0%"
        );
    }
}
