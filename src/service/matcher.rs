use crate::config::MatchingConfig;
use crate::models::{OrderLine, OverConsumption, ReceiptLine};
use crate::service::partition::BrandPartition;
use crate::similarity::{weighted_levenshtein_ratio, EditCosts};

/// Pairs order lines with receipt lines inside one brand partition.
pub trait PartitionMatcher: Sync {
    /// Returns the over-consumption events raised while committing matches.
    fn match_partition(&self, partition: &mut BrandPartition) -> Vec<OverConsumption>;
}

/// Only lines with equal normalized color and size compete on product name.
pub fn is_candidate(order: &OrderLine, receipt: &ReceiptLine) -> bool {
    order.normalized.color == receipt.normalized.color
        && order.normalized.size == receipt.normalized.size
}

/// Credit `order` against `receipt`. Found-count may exceed the receipt
/// quantity; that case is logged and returned, and the match still stands.
pub fn commit(order: &mut OrderLine, receipt: &mut ReceiptLine) -> Option<OverConsumption> {
    let found_before = receipt.found_count;
    receipt.found_count += u64::from(order.quantity);
    order.matched = true;
    order.matched_receipt_id = Some(receipt.id.clone());
    order.not_sent = receipt.not_sent;

    if !receipt.is_over_consumed() {
        return None;
    }

    tracing::warn!(
        "Receipt line over-consumed: {} {} {} {} {} quantity {}, found {} + ordered {} (register row {})",
        receipt.id,
        receipt.brand,
        receipt.product,
        receipt.color,
        receipt.size,
        receipt.quantity,
        found_before,
        order.quantity,
        order.row
    );
    Some(OverConsumption {
        receipt_id: receipt.id.clone(),
        order_row: order.row,
        brand: receipt.brand.clone(),
        product: receipt.product.clone(),
        color: receipt.color.clone(),
        size: receipt.size.clone(),
        quantity: receipt.quantity,
        found_before,
        ordered: order.quantity,
    })
}

/// Register-order greedy matcher: each order line takes the candidate with
/// the highest product similarity, first candidate wins ties.
#[derive(Debug, Clone)]
pub struct GreedyMatcher {
    threshold: f64,
    costs: EditCosts,
}

impl GreedyMatcher {
    pub fn new(threshold: f64, costs: EditCosts) -> Self {
        Self { threshold, costs }
    }

    /// Index and ratio of the best candidate, threshold not applied.
    pub fn best_candidate(&self, order: &OrderLine, receipts: &[ReceiptLine]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, receipt) in receipts.iter().enumerate() {
            if !is_candidate(order, receipt) {
                continue;
            }
            let ratio = weighted_levenshtein_ratio(
                &order.normalized.product,
                &receipt.normalized.product,
                &self.costs,
            );
            let is_better = match best {
                None => true,
                Some((_, best_ratio)) => ratio > best_ratio,
            };
            if is_better {
                best = Some((idx, ratio));
            }
        }

        best
    }
}

impl From<&MatchingConfig> for GreedyMatcher {
    fn from(config: &MatchingConfig) -> Self {
        Self::new(config.threshold, config.costs)
    }
}

impl PartitionMatcher for GreedyMatcher {
    fn match_partition(&self, partition: &mut BrandPartition) -> Vec<OverConsumption> {
        let mut over_consumed = Vec::new();
        let total = partition.orders.len();
        let mut matched_count = 0;

        for (idx, order) in partition.orders.iter_mut().enumerate() {
            // 1. best color/size candidate by product ratio, then threshold
            match self.best_candidate(order, &partition.receipts) {
                Some((ri, ratio)) if ratio >= self.threshold => {
                    tracing::debug!(
                        "Row {} '{}' -> {} (ratio {:.3})",
                        order.row,
                        order.normalized.product,
                        partition.receipts[ri].id,
                        ratio
                    );
                    // 2. commit even past the receipt quantity
                    over_consumed.extend(commit(order, &mut partition.receipts[ri]));
                    matched_count += 1;
                }
                _ => {}
            }

            // 3. progress every 100 rows
            let current = idx + 1;
            if current % 100 == 0 {
                tracing::info!(
                    "Brand {} progress: {}/{}, matched: {}",
                    partition.brand,
                    current,
                    total,
                    matched_count
                );
            }
        }

        over_consumed
    }
}
