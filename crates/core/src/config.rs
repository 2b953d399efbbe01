use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BanditError, BanditResult};

/// Environment variable prefix, e.g. `BANDIT_SIM__EXPERIMENT__ITERATIONS=1000`.
pub const ENV_PREFIX: &str = "BANDIT_SIM";

/// Root application configuration. Loaded from an optional config file and
/// environment variables with the prefix `BANDIT_SIM__`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameters of a single epsilon-greedy experiment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExperimentConfig {
    /// Hidden success probability of each arm, in arm order.
    #[serde(default = "default_true_probabilities")]
    pub true_probabilities: Vec<f64>,
    /// Exploration rate at iteration zero.
    #[serde(default = "default_initial_epsilon")]
    pub initial_epsilon: f64,
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// RNG seed. `None` draws one from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Write the full JSON report (including every arm history) here.
    #[serde(default)]
    pub history_path: Option<String>,
    /// Write an SVG convergence chart (one line per arm) here.
    #[serde(default)]
    pub chart_path: Option<String>,
    /// Print the report as JSON instead of the text summary.
    #[serde(default)]
    pub json: bool,
    /// Convergence samples per arm in the text rendering.
    #[serde(default = "default_checkpoints")]
    pub checkpoints: usize,
}

// Default functions
fn default_true_probabilities() -> Vec<f64> {
    vec![0.2, 0.5, 0.75]
}
fn default_initial_epsilon() -> f64 {
    0.1
}
fn default_iterations() -> u64 {
    5000
}
fn default_checkpoints() -> usize {
    8
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            true_probabilities: default_true_probabilities(),
            initial_epsilon: default_initial_epsilon(),
            iterations: default_iterations(),
            seed: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            history_path: None,
            chart_path: None,
            json: false,
            checkpoints: default_checkpoints(),
        }
    }
}

impl ExperimentConfig {
    pub fn new(true_probabilities: Vec<f64>, initial_epsilon: f64, iterations: u64) -> Self {
        Self {
            true_probabilities,
            initial_epsilon,
            iterations,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject parameters that would make the run meaningless.
    ///
    /// Zero iterations is allowed: the run completes immediately with empty
    /// results.
    pub fn validate(&self) -> BanditResult<()> {
        if self.true_probabilities.is_empty() {
            return Err(BanditError::InvalidConfiguration(
                "at least one arm probability is required".to_string(),
            ));
        }
        for (index, p) in self.true_probabilities.iter().enumerate() {
            if !(0.0..=1.0).contains(p) {
                return Err(BanditError::InvalidConfiguration(format!(
                    "arm {index} probability {p} is outside [0, 1]"
                )));
            }
        }
        if self.initial_epsilon.is_nan() || self.initial_epsilon < 0.0 {
            return Err(BanditError::InvalidConfiguration(format!(
                "initial epsilon {} must be non-negative",
                self.initial_epsilon
            )));
        }
        Ok(())
    }

    pub fn arm_count(&self) -> usize {
        self.true_probabilities.len()
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment variables.
    pub fn load(path: Option<&str>) -> BanditResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!(path, "adding config file source");
            builder = builder.add_source(config::File::with_name(path));
        }
        Self::from_builder(builder.add_source(Self::environment()))
    }

    /// Like [`AppConfig::load`], but without a config file a broken
    /// environment falls back to defaults. A named file that cannot be read
    /// or deserialized is always an error.
    pub fn load_or_default(path: Option<&str>) -> BanditResult<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) if path.is_none() => {
                warn!(error = %e, "Failed to load config, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Environment source shared by [`AppConfig::load`] and tests.
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("experiment.true_probabilities")
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> BanditResult<Self> {
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
