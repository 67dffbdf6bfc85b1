use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::similarity::EditCosts;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// How order lines are paired with receipt lines inside a brand partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Order lines in register order, each takes its best candidate.
    #[default]
    Greedy,
    /// One-to-one assignment maximizing total similarity.
    Assignment,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Greedy => write!(f, "greedy"),
            Self::Assignment => write!(f, "assignment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum product similarity ratio for a match to be committed.
    pub threshold: f64,
    pub strategy: MatchStrategy,
    /// Worker threads for brand partitions; 0 uses the global rayon pool.
    pub workers: usize,
    /// Edit costs used for the similarity ratio.
    pub costs: EditCosts,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            strategy: MatchStrategy::Greedy,
            workers: 0,
            costs: EditCosts::RATIO,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ReconError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        let EditCosts {
            delete,
            insert,
            substitute,
        } = self.costs;
        if [delete, insert, substitute]
            .iter()
            .any(|c| !c.is_finite() || *c < 0.0)
        {
            return Err(ReconError::InvalidConfig(format!(
                "edit costs must be finite and non-negative, got {:?}",
                self.costs
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            matching: MatchingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then `recon.toml` if present, then `RECON_*` environment
    /// variables (`__` separates nested keys, e.g. `RECON_MATCHING__THRESHOLD`).
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("recon").required(false))
            .add_source(
                config::Environment::with_prefix("RECON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.matching.threshold, 0.3);
        assert_eq!(cfg.matching.strategy, MatchStrategy::Greedy);
        assert_eq!(cfg.matching.costs, EditCosts::RATIO);
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let cfg = MatchingConfig {
            threshold: 1.5,
            ..MatchingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ReconError::InvalidConfig(_))));
    }

    #[test]
    fn negative_cost_rejected() {
        let cfg = MatchingConfig {
            costs: EditCosts {
                delete: -1.0,
                insert: 1.0,
                substitute: 1.0,
            },
            ..MatchingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn strategy_serde_names() {
        let json = serde_json::to_string(&MatchStrategy::Assignment).unwrap();
        assert_eq!(json, "\"assignment\"");
        let parsed: MatchStrategy = serde_json::from_str("\"greedy\"").unwrap();
        assert_eq!(parsed, MatchStrategy::Greedy);
    }
}
