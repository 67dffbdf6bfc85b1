pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod service;
pub mod similarity;
pub mod store;

pub use config::{AppConfig, MatchStrategy, MatchingConfig};
pub use error::ReconError;
pub use service::{MatchEngine, Reconciler, Reconciliation};
