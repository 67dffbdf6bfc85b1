use rayon::prelude::*;

use crate::config::{MatchStrategy, MatchingConfig};
use crate::models::{BrandSummary, OrderLine, OverConsumption, ReceiptLine};
use crate::service::matcher::{GreedyMatcher, PartitionMatcher};
use crate::service::matcher_assignment::AssignmentMatcher;
use crate::service::partition::{merge_partitions, partition_by_brand, BrandPartition};

/// Lines after matching, back in input order, plus what happened per brand.
#[derive(Debug)]
pub struct MatchOutcome {
    pub orders: Vec<OrderLine>,
    pub receipts: Vec<ReceiptLine>,
    pub brands: Vec<BrandSummary>,
    pub over_consumed: Vec<OverConsumption>,
}

/// Runs the configured matcher over every brand partition.
///
/// Partitions share nothing and run in parallel; lines inside a partition
/// are always processed sequentially in input order.
pub struct MatchEngine {
    config: MatchingConfig,
}

impl MatchEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn run(&self, orders: Vec<OrderLine>, receipts: Vec<ReceiptLine>) -> MatchOutcome {
        // 1. brand partitions, first-seen order
        let partitions = partition_by_brand(orders, receipts);
        tracing::info!(
            "Matching {} brand partitions (strategy: {}, threshold: {})",
            partitions.len(),
            self.config.strategy,
            self.config.threshold
        );

        // 2. match partitions in parallel
        let results = match self.thread_pool() {
            Some(pool) => pool.install(|| self.match_all(partitions)),
            None => self.match_all(partitions),
        };

        // 3. per-brand summaries and the over-consumption ledger
        let mut brands = Vec::with_capacity(results.len());
        let mut over_consumed = Vec::new();
        let mut partitions = Vec::with_capacity(results.len());
        for (partition, over) in results {
            let summary = partition.summary();
            tracing::debug!(
                "Brand {}: orders {}, matched {}, receipts {}",
                summary.brand,
                summary.orders,
                summary.matched_orders,
                summary.receipts
            );
            brands.push(summary);
            over_consumed.extend(over);
            partitions.push(partition);
        }
        over_consumed.sort_by_key(|o| o.order_row);

        // 4. back to input order
        let (orders, receipts) = merge_partitions(partitions);
        MatchOutcome {
            orders,
            receipts,
            brands,
            over_consumed,
        }
    }

    fn match_all(&self, partitions: Vec<BrandPartition>) -> Vec<(BrandPartition, Vec<OverConsumption>)> {
        let greedy = GreedyMatcher::from(&self.config);
        let assignment = AssignmentMatcher::from(&self.config);
        let matcher: &dyn PartitionMatcher = match self.config.strategy {
            MatchStrategy::Greedy => &greedy,
            MatchStrategy::Assignment => &assignment,
        };

        partitions
            .into_par_iter()
            .map(|mut partition| {
                let over = matcher.match_partition(&mut partition);
                (partition, over)
            })
            .collect()
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if self.config.workers == 0 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("recon-worker-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!("Cannot build {} worker pool, using global pool: {}", self.config.workers, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{build_receipt_lines, ReceiptRecord, ReceiptSource};

    fn record(product: &str, color: &str, size: &str, qty: &str) -> ReceiptRecord {
        ReceiptRecord {
            product: product.into(),
            color: color.into(),
            size: size.into(),
            quantity: qty.into(),
            ..Default::default()
        }
    }

    fn fixture() -> (Vec<OrderLine>, Vec<ReceiptLine>) {
        let orders = vec![
            OrderLine::new(0, "ABC", "23SS맨투맨", "블랙", "L", 2),
            OrderLine::new(1, "XYZ", "기모PT", "회색", "M", 1),
            OrderLine::new(2, "ABC", "맨투맨", "블랙", "L", 4),
            OrderLine::new(3, "NOPE", "후드", "", "", 1),
            OrderLine::new(4, "XYZ", "기모 팬츠", "그레이", "M", 1),
        ];
        let sources = vec![
            ReceiptSource {
                name: "ABC1".into(),
                records: vec![record("맨투맨", "검정", "L", "5"), record("후드", "", "", "1")],
            },
            ReceiptSource {
                name: "XYZ".into(),
                records: vec![record("기모팬츠", "회", "M", "2")],
            },
        ];
        (orders, build_receipt_lines(&sources).0)
    }

    #[test]
    fn run_matches_within_brands() {
        let (orders, receipts) = fixture();
        let out = MatchEngine::new(MatchingConfig::default()).run(orders, receipts);

        let matched: Vec<bool> = out.orders.iter().map(|o| o.matched).collect();
        assert_eq!(matched, vec![true, true, true, false, true]);
        assert_eq!(out.receipts[0].found_count, 6);
        assert_eq!(out.receipts[1].found_count, 0);
        assert_eq!(out.receipts[2].found_count, 2);
        assert_eq!(out.over_consumed.len(), 1);
        assert_eq!(out.over_consumed[0].order_row, 2);

        let brands: Vec<&str> = out.brands.iter().map(|b| b.brand.as_str()).collect();
        assert_eq!(brands, vec!["ABC", "XYZ", "NOPE"]);
        assert_eq!(out.brands[2].receipts, 0);
    }

    #[test]
    fn runs_are_deterministic() {
        let config = MatchingConfig {
            workers: 3,
            ..MatchingConfig::default()
        };
        let ids = |out: MatchOutcome| -> Vec<Option<String>> {
            out.orders
                .iter()
                .map(|o| o.matched_receipt_id.as_ref().map(|id| id.0.clone()))
                .collect()
        };
        let (o1, r1) = fixture();
        let (o2, r2) = fixture();
        let first = ids(MatchEngine::new(config).run(o1, r1));
        let second = ids(MatchEngine::new(config).run(o2, r2));
        assert_eq!(first, second);
        assert_eq!(first[0].as_deref(), Some("ABC1#0"));
    }

    #[test]
    fn assignment_strategy_is_one_to_one() {
        let (orders, receipts) = fixture();
        let config = MatchingConfig {
            strategy: MatchStrategy::Assignment,
            ..MatchingConfig::default()
        };
        let out = MatchEngine::new(config).run(orders, receipts);
        assert!(out.receipts.iter().all(|r| r.found_count <= u64::from(r.quantity)));
        assert!(out.over_consumed.is_empty());
        assert_eq!(out.orders.iter().filter(|o| o.matched).count(), 2);
    }
}
