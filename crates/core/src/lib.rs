//! Shared configuration and error types for the epsilon-greedy bandit simulator.

pub mod config;
pub mod error;

pub use config::{AppConfig, ExperimentConfig, OutputConfig};
pub use error::{BanditError, BanditResult};
