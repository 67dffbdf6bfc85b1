use std::path::{Path, PathBuf};

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::models::{
    build_receipt_lines, OrderLine, OrderOutcome, ReceiptLine, ReceiptSource,
    ReconciliationReport,
};
use crate::service::engine::MatchEngine;
use crate::store::{self, suffixed_path};

/// Result of one reconciliation pass, lines in input order.
#[derive(Debug)]
pub struct Reconciliation {
    pub orders: Vec<OrderLine>,
    pub receipts: Vec<ReceiptLine>,
    pub report: ReconciliationReport,
}

impl Reconciliation {
    /// Receipt lines credited by at least one order line.
    pub fn matched_receipts(&self) -> impl Iterator<Item = &ReceiptLine> {
        self.receipts.iter().filter(|r| r.is_matched())
    }

    pub fn unmatched_receipts(&self) -> impl Iterator<Item = &ReceiptLine> {
        self.receipts.iter().filter(|r| !r.is_matched())
    }

    pub fn order_outcomes(&self) -> Vec<OrderOutcome> {
        self.orders.iter().map(OrderOutcome::from).collect()
    }
}

/// Files written by [`Reconciler::run_files`].
#[derive(Debug)]
pub struct RunOutput {
    pub report: ReconciliationReport,
    pub register_path: PathBuf,
    pub receipt_path: PathBuf,
}

pub struct Reconciler {
    engine: MatchEngine,
}

impl Reconciler {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            engine: MatchEngine::new(config),
        }
    }

    /// Match in-memory order lines against receipt sources.
    pub fn reconcile(&self, orders: Vec<OrderLine>, sources: &[ReceiptSource]) -> Reconciliation {
        let (receipts, skipped) = build_receipt_lines(sources);
        tracing::info!(
            "Reconciling {} order lines against {} receipt lines ({} receipts skipped)",
            orders.len(),
            receipts.len(),
            skipped.len()
        );

        let outcome = self.engine.run(orders, receipts);
        let config = self.engine.config();
        let report = ReconciliationReport::build(
            config.strategy,
            config.threshold,
            &outcome.orders,
            &outcome.receipts,
            outcome.brands,
            outcome.over_consumed,
            skipped,
        );

        Reconciliation {
            orders: outcome.orders,
            receipts: outcome.receipts,
            report,
        }
    }

    /// Load the register and every receipt CSV in `receipt_dir`, reconcile,
    /// then write `<register>_matched` and `<register>_receipt` next to the
    /// register. Nothing is written if loading fails.
    pub fn run_files(&self, receipt_dir: &Path, register_path: &Path) -> Result<RunOutput> {
        // 1. load both inputs before anything is written
        let mut register = store::load_register(register_path)?;
        let sources = store::load_receipt_dir(receipt_dir)?;

        // 2. match
        let reconciliation = self.reconcile(register.order_lines(), &sources);

        // 3. annotated register
        register.annotate(&reconciliation.orders);
        let register_out = suffixed_path(register_path, "_matched");
        register.write(&register_out)?;
        tracing::info!("Saved annotated register: {}", register_out.display());

        // 4. receipt export, matched lines first
        let receipt_out = suffixed_path(register_path, "_receipt");
        store::write_receipt_export(&receipt_out, &reconciliation)?;
        tracing::info!("Saved receipt export: {}", receipt_out.display());

        // 5. summary
        let summary = reconciliation.report.summary_line();
        tracing::info!("{}", summary);
        println!("{}", summary);

        Ok(RunOutput {
            report: reconciliation.report,
            register_path: register_out,
            receipt_path: receipt_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReceiptRecord;

    #[test]
    fn reconcile_builds_report() {
        let orders = vec![
            OrderLine::new(0, "ABC", "맨투맨", "블랙", "L", 3),
            OrderLine::new(1, "ABC", "맨투맨", "블랙", "L", 4),
            OrderLine::new(2, "ABC", "팬츠", "블랙", "S", 1),
        ];
        let sources = vec![
            ReceiptSource {
                name: "ABC1".into(),
                records: vec![
                    ReceiptRecord {
                        product: "맨투맨".into(),
                        color: "블랙".into(),
                        size: "L".into(),
                        quantity: "5".into(),
                        ..Default::default()
                    },
                    ReceiptRecord {
                        product: "자켓".into(),
                        quantity: "1".into(),
                        ..Default::default()
                    },
                ],
            },
            ReceiptSource {
                name: "7".into(),
                records: vec![ReceiptRecord::default()],
            },
        ];

        let rec = Reconciler::new(MatchingConfig::default()).reconcile(orders, &sources);
        let report = &rec.report;
        assert_eq!(report.matched_orders, 2);
        assert_eq!(report.unmatched_orders, 1);
        assert_eq!(report.total_receipts, 2);
        assert_eq!(report.matched_receipts, 1);
        assert_eq!(report.unmatched_receipts, 1);
        assert_eq!(report.match_ratio, 100.0);
        assert_eq!(report.over_consumed.len(), 1);
        assert_eq!(report.skipped_receipts.len(), 1);
        assert_eq!(rec.matched_receipts().count(), 1);
        assert_eq!(rec.unmatched_receipts().next().map(|r| r.product.as_str()), Some("자켓"));
        assert_eq!(rec.order_outcomes().len(), 3);
    }
}
