//! Post-run snapshot of an experiment, consumed by the summary printer and
//! by external plotting via JSON.

use std::path::Path;

use bandit_core::{BanditResult, ExperimentConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::arm::{Arm, HistorySample};
use crate::experiment::{Experiment, ExperimentStatus};

#[derive(Debug, Clone, Serialize)]
pub struct ArmReport {
    pub index: usize,
    pub true_probability: f64,
    pub final_estimate: f64,
    pub pull_count: u64,
    pub history: Vec<HistorySample>,
}

impl ArmReport {
    fn from_arm(index: usize, arm: &Arm) -> Self {
        Self {
            index,
            true_probability: arm.true_probability(),
            final_estimate: arm.estimate(),
            pull_count: arm.pull_count(),
            history: arm.history().to_vec(),
        }
    }

    /// Series label for convergence charts.
    pub fn label(&self) -> String {
        format!("Arm {} (true p={})", self.index + 1, self.true_probability)
    }

    /// Up to `count` samples at evenly spaced pull counts, always ending with
    /// the final update.
    pub fn checkpoints(&self, count: usize) -> Vec<HistorySample> {
        let len = self.history.len();
        if len == 0 || count == 0 {
            return Vec::new();
        }
        if len <= count {
            return self.history.clone();
        }
        let mut picked: Vec<HistorySample> = (1..=count)
            .map(|i| self.history[i * len / count - 1])
            .collect();
        picked.dedup_by_key(|s| s.pull_count);
        picked
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub run_id: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config: ExperimentConfig,
    pub status: ExperimentStatus,
    pub optimal_index: usize,
    pub iterations_completed: u64,
    pub explore_count: u64,
    pub exploit_count: u64,
    pub optimal_count: u64,
    /// NaN (serialized as `null`) when no iteration ran.
    pub mean_success_rate: f64,
    /// Share of completed iterations that selected the optimal arm; NaN
    /// (`null`) when no iteration ran.
    pub optimal_rate: f64,
    pub arms: Vec<ArmReport>,
}

impl ExperimentReport {
    pub fn from_experiment(experiment: &Experiment) -> Self {
        Self {
            run_id: experiment.run_id(),
            started_at: experiment.started_at(),
            finished_at: experiment.finished_at(),
            config: experiment.config().clone(),
            status: experiment.status(),
            optimal_index: experiment.optimal_index(),
            iterations_completed: experiment.iterations_completed(),
            explore_count: experiment.explore_count(),
            exploit_count: experiment.exploit_count(),
            optimal_count: experiment.optimal_count(),
            mean_success_rate: experiment.mean_success_rate(),
            optimal_rate: experiment.optimal_count() as f64
                / experiment.iterations_completed() as f64,
            arms: experiment
                .arms()
                .iter()
                .enumerate()
                .map(|(index, arm)| ArmReport::from_arm(index, arm))
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> BanditResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON report, replacing any existing file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> BanditResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
