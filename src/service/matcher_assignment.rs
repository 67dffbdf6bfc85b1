use crate::config::MatchingConfig;
use crate::models::OverConsumption;
use crate::service::matcher::{commit, is_candidate, PartitionMatcher};
use crate::service::partition::BrandPartition;
use crate::similarity::{weighted_levenshtein_ratio, EditCosts};

/// Cost of leaving a row or column unassigned (or of a forbidden pair).
const UNASSIGNED: f64 = 1.0;

/// One-to-one matcher: within a brand partition, choose the set of
/// (order, receipt) pairs with maximum total product similarity. Every
/// receipt line serves at most one order line; pairs below the threshold or
/// with differing color/size are never chosen.
#[derive(Debug, Clone)]
pub struct AssignmentMatcher {
    threshold: f64,
    costs: EditCosts,
}

impl AssignmentMatcher {
    pub fn new(threshold: f64, costs: EditCosts) -> Self {
        Self { threshold, costs }
    }

    /// Similarity for each admissible pair, `None` otherwise.
    fn weights(&self, partition: &BrandPartition) -> Vec<Vec<Option<f64>>> {
        partition
            .orders
            .iter()
            .map(|order| {
                partition
                    .receipts
                    .iter()
                    .map(|receipt| {
                        if !is_candidate(order, receipt) {
                            return None;
                        }
                        let ratio = weighted_levenshtein_ratio(
                            &order.normalized.product,
                            &receipt.normalized.product,
                            &self.costs,
                        );
                        (ratio >= self.threshold).then_some(ratio)
                    })
                    .collect()
            })
            .collect()
    }
}

impl From<&MatchingConfig> for AssignmentMatcher {
    fn from(config: &MatchingConfig) -> Self {
        Self::new(config.threshold, config.costs)
    }
}

impl PartitionMatcher for AssignmentMatcher {
    fn match_partition(&self, partition: &mut BrandPartition) -> Vec<OverConsumption> {
        if partition.orders.is_empty() || partition.receipts.is_empty() {
            return Vec::new();
        }

        let weights = self.weights(partition);
        let size = partition.orders.len().max(partition.receipts.len());
        let mut cost = vec![vec![UNASSIGNED; size]; size];
        for (i, row) in weights.iter().enumerate() {
            for (j, w) in row.iter().enumerate() {
                if let Some(ratio) = w {
                    cost[i][j] = UNASSIGNED - ratio;
                }
            }
        }

        let assignment = hungarian(&cost);
        let mut over_consumed = Vec::new();
        for (i, j) in assignment.into_iter().enumerate() {
            if i >= partition.orders.len() || j >= partition.receipts.len() {
                continue;
            }
            if weights[i][j].is_none() {
                continue;
            }
            over_consumed.extend(commit(&mut partition.orders[i], &mut partition.receipts[j]));
        }

        tracing::debug!(
            "Brand {}: assignment matched {}/{}",
            partition.brand,
            partition.orders.iter().filter(|o| o.matched).count(),
            partition.orders.len()
        );
        over_consumed
    }
}

/// Minimum-cost perfect assignment on a square matrix (Hungarian method with
/// potentials, O(n^3)). Returns the column assigned to each row.
pub fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }

    // 1-based rows/columns; column 0 is the virtual start.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=n {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = j - 1;
        }
    }
    assignment
}
