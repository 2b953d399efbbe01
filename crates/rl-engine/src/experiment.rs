//! Epsilon-greedy experiment loop over a fixed set of arms.

use std::sync::atomic::{AtomicBool, Ordering};

use bandit_core::{BanditError, BanditResult, ExperimentConfig};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::arm::Arm;
use crate::report::ExperimentReport;
use crate::schedule::epsilon_schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Explore,
    Exploit,
}

/// Outcome of the selection step for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub iteration: u64,
    pub epsilon: f64,
    pub decision: Decision,
    pub arm: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ExperimentStatus {
    Pending,
    Completed,
    Cancelled { completed: u64 },
}

/// Index of the first maximal value, `None` for an empty input.
pub fn argmax_first<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.into_iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

pub struct Experiment {
    config: ExperimentConfig,
    optimal_index: usize,
    arms: Vec<Arm>,
    explore_count: u64,
    exploit_count: u64,
    optimal_count: u64,
    outcomes: Vec<bool>,
    status: ExperimentStatus,
    run_id: Uuid,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> BanditResult<Self> {
        config.validate()?;
        let optimal_index = argmax_first(config.true_probabilities.iter().copied())
            .ok_or_else(|| {
                BanditError::InvalidConfiguration("no arms to choose from".to_string())
            })?;
        let arms = Self::fresh_arms(&config);

        Ok(Self {
            config,
            optimal_index,
            arms,
            explore_count: 0,
            exploit_count: 0,
            optimal_count: 0,
            outcomes: Vec::new(),
            status: ExperimentStatus::Pending,
            run_id: Uuid::new_v4(),
            started_at: None,
            finished_at: None,
        })
    }

    fn fresh_arms(config: &ExperimentConfig) -> Vec<Arm> {
        config
            .true_probabilities
            .iter()
            .map(|&p| Arm::new(p))
            .collect()
    }

    /// Run every configured iteration.
    pub fn run(&mut self, rng: &mut impl Rng) -> ExperimentStatus {
        self.run_until(rng, |_| false)
    }

    /// Run until completion or until `cancel` is observed set. The flag is
    /// only checked between iterations.
    pub fn run_cancellable(&mut self, rng: &mut impl Rng, cancel: &AtomicBool) -> ExperimentStatus {
        self.run_until(rng, |_| cancel.load(Ordering::Relaxed))
    }

    /// Run until completion or until `should_stop(t)` returns true before
    /// iteration `t` begins.
    pub fn run_until<R, F>(&mut self, rng: &mut R, mut should_stop: F) -> ExperimentStatus
    where
        R: Rng,
        F: FnMut(u64) -> bool,
    {
        self.reset();
        info!(
            run_id = %self.run_id,
            arms = self.arms.len(),
            initial_epsilon = self.config.initial_epsilon,
            iterations = self.config.iterations,
            optimal_index = self.optimal_index,
            "starting epsilon-greedy experiment"
        );

        let mut status = ExperimentStatus::Completed;
        for t in 0..self.config.iterations {
            if should_stop(t) {
                warn!(run_id = %self.run_id, completed = t, "experiment cancelled");
                status = ExperimentStatus::Cancelled { completed: t };
                break;
            }
            self.step(rng, t);
        }

        self.status = status;
        self.finished_at = Some(Utc::now());
        info!(
            run_id = %self.run_id,
            explored = self.explore_count,
            exploited = self.exploit_count,
            optimal = self.optimal_count,
            success_rate = self.mean_success_rate(),
            ?status,
            "experiment finished"
        );
        status
    }

    fn reset(&mut self) {
        self.arms = Self::fresh_arms(&self.config);
        debug!(arms = self.arms.len(), "created arms");
        self.explore_count = 0;
        self.exploit_count = 0;
        self.optimal_count = 0;
        self.outcomes = Vec::with_capacity(self.config.iterations.min(1 << 20) as usize);
        self.status = ExperimentStatus::Pending;
        self.run_id = Uuid::new_v4();
        self.started_at = Some(Utc::now());
        self.finished_at = None;
    }

    /// Choose an arm for iteration `t` without touching any state.
    pub fn select<R: Rng>(&self, rng: &mut R, t: u64) -> Selection {
        let epsilon = epsilon_schedule(self.config.initial_epsilon, t);
        if rng.gen::<f64>() < epsilon {
            Selection {
                iteration: t,
                epsilon,
                decision: Decision::Explore,
                arm: rng.gen_range(0..self.arms.len()),
            }
        } else {
            // Arms are never empty after construction.
            let arm = argmax_first(self.arms.iter().map(Arm::estimate)).unwrap_or(0);
            Selection {
                iteration: t,
                epsilon,
                decision: Decision::Exploit,
                arm,
            }
        }
    }

    fn step<R: Rng>(&mut self, rng: &mut R, t: u64) {
        let selection = self.select(rng, t);
        match selection.decision {
            Decision::Explore => self.explore_count += 1,
            Decision::Exploit => self.exploit_count += 1,
        }
        if selection.arm == self.optimal_index {
            self.optimal_count += 1;
        }

        let arm = &mut self.arms[selection.arm];
        let outcome = arm.pull(rng);
        self.outcomes.push(outcome);
        arm.update(outcome);

        trace!(
            t,
            epsilon = selection.epsilon,
            decision = ?selection.decision,
            arm = selection.arm,
            outcome,
            "iteration"
        );
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn optimal_index(&self) -> usize {
        self.optimal_index
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn explore_count(&self) -> u64 {
        self.explore_count
    }

    pub fn exploit_count(&self) -> u64 {
        self.exploit_count
    }

    pub fn optimal_count(&self) -> u64 {
        self.optimal_count
    }

    /// Per-iteration outcomes of the last run, in iteration order.
    pub fn outcomes(&self) -> &[bool] {
        &self.outcomes
    }

    pub fn iterations_completed(&self) -> u64 {
        self.outcomes.len() as u64
    }

    /// Overall empirical success rate; NaN when no iteration ran.
    pub fn mean_success_rate(&self) -> f64 {
        let successes = self.outcomes.iter().filter(|o| **o).count();
        successes as f64 / self.outcomes.len() as f64
    }

    pub fn status(&self) -> ExperimentStatus {
        self.status
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn report(&self) -> ExperimentReport {
        ExperimentReport::from_experiment(self)
    }
}
