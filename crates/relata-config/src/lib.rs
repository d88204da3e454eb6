//! Configuration system for Relata.
//!
//! Load query configuration from TOML or YAML to control termination,
//! randomness and the heuristic pipeline without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use relata_config::{HeuristicConfig, QueryConfig};
//! use std::time::Duration;
//!
//! let config = QueryConfig::from_toml_str(r#"
//!     environment_mode = "reproducible"
//!     occurs_check = true
//!
//!     [termination]
//!     solution_limit = 10
//!     seconds_spent_limit = 2
//!
//!     [[heuristics]]
//!     type = "relevance"
//!
//!     [[heuristics]]
//!     type = "randomize_order"
//!     seed = 7
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(2)));
//! assert_eq!(config.heuristics.as_ref().map(Vec::len), Some(2));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use relata_config::QueryConfig;
//!
//! let config = QueryConfig::load("relata.toml").unwrap_or_default();
//! assert!(config.heuristics.is_none());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed used in reproducible mode when none is configured.
pub const DEFAULT_RANDOM_SEED: u64 = 0;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main query configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct QueryConfig {
    /// Environment mode affecting reproducibility.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for reproducible row orders.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Reject binding a variable to a term that contains it.
    #[serde(default)]
    pub occurs_check: bool,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Heuristic passes, in order. `None` selects the default pipeline and
    /// an empty list disables planning.
    #[serde(default)]
    pub heuristics: Option<Vec<HeuristicConfig>>,
}

impl QueryConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot drive a query.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(termination) = &self.termination {
            if termination.solution_limit == Some(0) {
                return Err(ConfigError::Invalid(
                    "termination.solution_limit must be at least 1".to_string(),
                ));
            }
        }
        if let Some(heuristics) = &self.heuristics {
            for (i, pass) in heuristics.iter().enumerate() {
                if heuristics[..i].iter().any(|p| p.kind() == pass.kind()) {
                    return Err(ConfigError::Invalid(format!(
                        "heuristic `{}` is listed more than once",
                        pass.kind()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_occurs_check(mut self, enabled: bool) -> Self {
        self.occurs_check = enabled;
        self
    }

    /// Stops after this many solutions.
    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.termination = Some(TerminationConfig {
            solution_limit: Some(limit),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Stops after this many forced suspensions.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.termination = Some(TerminationConfig {
            step_limit: Some(limit),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    pub fn with_termination_millis(mut self, millis: u64) -> Self {
        self.termination = Some(TerminationConfig {
            millis_spent_limit: Some(millis),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Appends a heuristic pass, starting from an empty list if none was set.
    pub fn with_heuristic(mut self, heuristic: HeuristicConfig) -> Self {
        self.heuristics.get_or_insert_with(Vec::new).push(heuristic);
        self
    }

    /// Returns the termination time limit, if configured.
    ///
    /// Convenience method that delegates to `termination.time_limit()`.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// The seed to use for randomized passes, if runs must be reproducible.
    ///
    /// An explicit seed always wins; reproducible mode without one falls
    /// back to [`DEFAULT_RANDOM_SEED`].
    pub fn effective_seed(&self) -> Option<u64> {
        match (self.random_seed, self.environment_mode) {
            (Some(seed), _) => Some(seed),
            (None, EnvironmentMode::Reproducible) => Some(DEFAULT_RANDOM_SEED),
            (None, EnvironmentMode::NonReproducible) => None,
        }
    }
}

/// Environment mode affecting solver behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Row orders are seeded from entropy unless a seed is given.
    #[default]
    NonReproducible,

    /// Every randomized choice is seeded, so runs repeat exactly.
    Reproducible,
}

/// Termination configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum number of solutions to yield.
    pub solution_limit: Option<u64>,

    /// Maximum number of forced suspensions.
    pub step_limit: Option<u64>,

    /// Maximum seconds to spend searching.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum milliseconds to spend searching.
    pub millis_spent_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis = self
            .seconds_spent_limit
            .unwrap_or(0)
            .saturating_mul(1000)
            .saturating_add(self.millis_spent_limit.unwrap_or(0));
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }

    /// Returns true if no limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.solution_limit.is_none() && self.step_limit.is_none() && self.time_limit().is_none()
    }
}

/// Heuristic pass configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeuristicConfig {
    /// Chain conjuncts through shared variables, cheapest first.
    ChainSharedVars,

    /// Restrict variables shared by relations to their common values.
    Relevance,

    /// Guard runs of entangled conjuncts with a cardinality constraint.
    Cardinality,

    /// Visit relation rows in a seeded random order.
    RandomizeOrder(RandomizeOrderConfig),
}

impl HeuristicConfig {
    /// The `type` tag of this pass.
    pub fn kind(&self) -> &'static str {
        match self {
            HeuristicConfig::ChainSharedVars => "chain_shared_vars",
            HeuristicConfig::Relevance => "relevance",
            HeuristicConfig::Cardinality => "cardinality",
            HeuristicConfig::RandomizeOrder(_) => "randomize_order",
        }
    }

    /// The pipeline used when none is configured.
    pub fn default_pipeline() -> Vec<HeuristicConfig> {
        vec![
            HeuristicConfig::ChainSharedVars,
            HeuristicConfig::Relevance,
            HeuristicConfig::Cardinality,
            HeuristicConfig::RandomizeOrder(RandomizeOrderConfig::default()),
        ]
    }
}

/// Row order randomization configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RandomizeOrderConfig {
    /// Seed for this pass; falls back to the query seed.
    pub seed: Option<u64>,
}
