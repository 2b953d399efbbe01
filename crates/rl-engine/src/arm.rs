//! A single bandit arm: hidden success probability plus a running estimate.

use rand::Rng;
use serde::Serialize;

/// One `(pull_count, estimate)` observation, recorded after every update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistorySample {
    pub pull_count: u64,
    pub estimate: f64,
}

#[derive(Debug, Clone)]
pub struct Arm {
    true_probability: f64,
    estimate: f64,
    pull_count: u64,
    history: Vec<HistorySample>,
}

impl Arm {
    pub fn new(true_probability: f64) -> Self {
        Self {
            true_probability,
            estimate: 0.0,
            pull_count: 0,
            history: Vec::new(),
        }
    }

    /// Bernoulli trial with success probability `true_probability`.
    pub fn pull(&self, rng: &mut impl Rng) -> bool {
        rng.gen::<f64>() < self.true_probability
    }

    /// Fold one outcome into the running mean and record the new estimate.
    pub fn update(&mut self, outcome: bool) {
        let reward = if outcome { 1.0 } else { 0.0 };
        self.pull_count += 1;
        self.estimate += (reward - self.estimate) / self.pull_count as f64;
        self.history.push(HistorySample {
            pull_count: self.pull_count,
            estimate: self.estimate,
        });
    }

    pub fn true_probability(&self) -> f64 {
        self.true_probability
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn pull_count(&self) -> u64 {
        self.pull_count
    }

    /// Chronological history, one entry per update.
    pub fn history(&self) -> &[HistorySample] {
        &self.history
    }

    /// Restartable iterator over the history; each call starts from the first update.
    pub fn samples(&self) -> impl Iterator<Item = HistorySample> + '_ {
        self.history.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_arm_is_empty() {
        let arm = Arm::new(0.4);
        assert_eq!(arm.true_probability(), 0.4);
        assert_eq!(arm.estimate(), 0.0);
        assert_eq!(arm.pull_count(), 0);
        assert!(arm.history().is_empty());
    }

    #[test]
    fn test_update_records_history() {
        let mut arm = Arm::new(0.5);
        arm.update(true);
        arm.update(false);
        arm.update(true);
        arm.update(true);

        assert_eq!(arm.pull_count(), 4);
        assert!((arm.estimate() - 0.75).abs() < 1e-12);

        let counts: Vec<u64> = arm.samples().map(|s| s.pull_count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        let estimates: Vec<f64> = arm.samples().map(|s| s.estimate).collect();
        assert_eq!(estimates[0], 1.0);
        assert_eq!(estimates[1], 0.5);
        assert!((estimates[2] - 2.0 / 3.0).abs() < 1e-12);

        // Iterating twice yields the same sequence.
        assert_eq!(arm.samples().count(), arm.samples().count());
    }

    #[test]
    fn test_pull_degenerate_probabilities() {
        let mut rng = StdRng::seed_from_u64(11);
        let never = Arm::new(0.0);
        let always = Arm::new(1.0);
        for _ in 0..1000 {
            assert!(!never.pull(&mut rng));
            assert!(always.pull(&mut rng));
        }
    }

    #[test]
    fn test_pull_frequency_tracks_probability() {
        let mut rng = StdRng::seed_from_u64(3);
        let arm = Arm::new(0.3);
        let hits = (0..20_000).filter(|_| arm.pull(&mut rng)).count();
        let rate = hits as f64 / 20_000.0;
        assert!((rate - 0.3).abs() < 0.02, "rate {rate}");
    }

    proptest! {
        #[test]
        fn incremental_mean_equals_batch_mean(outcomes in prop::collection::vec(any::<bool>(), 1..400)) {
            let mut arm = Arm::new(0.5);
            for (n, outcome) in outcomes.iter().enumerate() {
                arm.update(*outcome);
                let prefix = &outcomes[..=n];
                let mean = prefix.iter().filter(|o| **o).count() as f64 / prefix.len() as f64;
                prop_assert!((arm.estimate() - mean).abs() < 1e-9);
            }
            prop_assert_eq!(arm.history().len(), outcomes.len());
        }
    }
}
