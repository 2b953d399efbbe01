//! Text rendering of an experiment report.

use std::fmt::Write;

use bandit_rl_engine::{ExperimentReport, ExperimentStatus};

pub fn render_summary(report: &ExperimentReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Explorations: {}, Exploitations: {}, Optimal Selections: {}",
        report.explore_count, report.exploit_count, report.optimal_count
    );
    let _ = writeln!(
        out,
        "Overall Success Rate: {:.2}",
        report.mean_success_rate
    );
    let _ = writeln!(
        out,
        "Optimal Selection Rate: {:.2}",
        report.optimal_rate
    );
    if let ExperimentStatus::Cancelled { completed } = report.status {
        let _ = writeln!(
            out,
            "Cancelled after {completed} of {} iterations",
            report.config.iterations
        );
    }
    out
}

/// One row per arm: label, pull count, then the estimate at each checkpoint.
pub fn render_convergence(report: &ExperimentReport, checkpoints: usize) -> String {
    let mut out = String::from("Estimated Win Rates Over Iterations\n");
    let label_width = report
        .arms
        .iter()
        .map(|arm| arm.label().len())
        .max()
        .unwrap_or(0);

    for arm in &report.arms {
        let _ = write!(
            out,
            "{:<width$}  pulls={:<6}",
            arm.label(),
            arm.pull_count,
            width = label_width
        );
        let samples = arm.checkpoints(checkpoints);
        if samples.is_empty() {
            out.push_str("  (never selected)");
        }
        for sample in samples {
            let _ = write!(out, "  {}:{:.3}", sample.pull_count, sample.estimate);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandit_core::ExperimentConfig;
    use bandit_rl_engine::Experiment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn report(probs: &[f64], iterations: u64) -> ExperimentReport {
        let config = ExperimentConfig::new(probs.to_vec(), 0.1, iterations);
        let mut experiment = Experiment::new(config).unwrap();
        experiment.run(&mut StdRng::seed_from_u64(6));
        experiment.report()
    }

    #[test]
    fn test_summary_format() {
        let report = report(&[0.5], 40);
        let summary = render_summary(&report);
        assert!(summary.starts_with("Explorations: "));
        assert!(summary.contains("Optimal Selections: 40"));
        assert!(summary.contains("Overall Success Rate: "));
        // A single arm is always the optimal one.
        assert!(summary.contains("Optimal Selection Rate: 1.00"));
        assert!(!summary.contains("Cancelled"));
    }

    #[test]
    fn test_convergence_one_row_per_arm() {
        let report = report(&[0.0, 1.0, 0.5], 300);
        let text = render_convergence(&report, 4);
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("Arm 1 (true p=0)"));
        assert!(rows[1].starts_with("Arm 2 (true p=1)"));
    }

    #[test]
    fn test_convergence_marks_unused_arm() {
        let report = report(&[0.5, 0.5], 0);
        let text = render_convergence(&report, 4);
        assert_eq!(text.matches("(never selected)").count(), 2);
    }
}
