pub mod engine;
pub mod matcher;
pub mod matcher_assignment;
pub mod partition;
pub mod reconciler;

pub use engine::{MatchEngine, MatchOutcome};
pub use matcher::{GreedyMatcher, PartitionMatcher};
pub use matcher_assignment::AssignmentMatcher;
pub use reconciler::{Reconciler, Reconciliation, RunOutput};
