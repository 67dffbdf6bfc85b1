use indexmap::IndexMap;

use crate::models::{BrandSummary, OrderLine, ReceiptLine};

/// Order and receipt lines sharing one normalized brand. Each partition owns
/// its lines, so a worker can mutate found-counts without sharing.
#[derive(Debug, Default)]
pub struct BrandPartition {
    pub brand: String,
    pub orders: Vec<OrderLine>,
    pub receipts: Vec<ReceiptLine>,
}

impl BrandPartition {
    pub fn summary(&self) -> BrandSummary {
        BrandSummary {
            brand: self.brand.clone(),
            orders: self.orders.len(),
            matched_orders: self.orders.iter().filter(|o| o.matched).count(),
            receipts: self.receipts.len(),
        }
    }
}

/// Group lines by normalized brand, keeping input order inside each group and
/// first-seen brand order across groups (orders first, then receipts).
pub fn partition_by_brand(orders: Vec<OrderLine>, receipts: Vec<ReceiptLine>) -> Vec<BrandPartition> {
    let mut groups: IndexMap<String, BrandPartition> = IndexMap::new();

    for order in orders {
        groups
            .entry(order.normalized.brand.clone())
            .or_insert_with_key(|brand| BrandPartition {
                brand: brand.clone(),
                ..Default::default()
            })
            .orders
            .push(order);
    }
    for receipt in receipts {
        groups
            .entry(receipt.normalized.brand.clone())
            .or_insert_with_key(|brand| BrandPartition {
                brand: brand.clone(),
                ..Default::default()
            })
            .receipts
            .push(receipt);
    }

    groups.into_values().collect()
}

/// Flatten partitions back to register order and receipt load order.
pub fn merge_partitions(partitions: Vec<BrandPartition>) -> (Vec<OrderLine>, Vec<ReceiptLine>) {
    let mut orders = Vec::new();
    let mut receipts = Vec::new();
    for partition in partitions {
        orders.extend(partition.orders);
        receipts.extend(partition.receipts);
    }
    orders.sort_by_key(|o| o.row);
    receipts.sort_by_key(|r| r.seq);
    (orders, receipts)
}
