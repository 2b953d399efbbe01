//! bandit-sim — epsilon-greedy multi-armed bandit simulator.
//!
//! Loads the experiment configuration, runs it, prints the summary and the
//! per-arm convergence table, and optionally writes the full JSON report and
//! an SVG convergence chart.

mod chart;
mod render;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bandit_core::config::AppConfig;
use bandit_rl_engine::Experiment;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bandit-sim")]
#[command(about = "Epsilon-greedy multi-armed bandit simulator")]
#[command(version)]
struct Cli {
    /// Config file (TOML, JSON, YAML); environment variables still apply
    #[arg(long, env = "BANDIT_SIM_CONFIG")]
    config: Option<String>,

    /// True success probability of each arm, comma separated (overrides config)
    #[arg(long, value_delimiter = ',')]
    probabilities: Option<Vec<f64>>,

    /// Initial exploration rate (overrides config)
    #[arg(long)]
    epsilon: Option<f64>,

    /// Number of iterations (overrides config)
    #[arg(long)]
    iterations: Option<u64>,

    /// RNG seed for a reproducible run (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the JSON report with full arm histories to this path
    #[arg(long)]
    history_out: Option<String>,

    /// Write an SVG convergence chart to this path
    #[arg(long)]
    chart_out: Option<String>,

    /// Print the JSON report instead of the text summary
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Convergence samples per arm in the text output
    #[arg(long)]
    checkpoints: Option<usize>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,

    /// Stop the run after this many milliseconds
    #[arg(long)]
    max_duration_ms: Option<u64>,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bandit_sim=info,bandit_rl_engine=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// A config file named on the command line must load; without one, a broken
/// environment falls back to defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => {
            AppConfig::load_or_default(Some(path)).with_context(|| format!("loading config {path}"))
        }
        None => Ok(AppConfig::load_or_default(None)?),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(probabilities) = cli.probabilities {
        config.experiment.true_probabilities = probabilities;
    }
    if let Some(epsilon) = cli.epsilon {
        config.experiment.initial_epsilon = epsilon;
    }
    if let Some(iterations) = cli.iterations {
        config.experiment.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.experiment.seed = Some(seed);
    }
    if let Some(path) = cli.history_out {
        config.output.history_path = Some(path);
    }
    if let Some(path) = cli.chart_out {
        config.output.chart_path = Some(path);
    }
    if let Some(checkpoints) = cli.checkpoints {
        config.output.checkpoints = checkpoints;
    }
    config.output.json |= cli.json;

    // Record the seed so every run can be replayed from its report.
    let seed = *config.experiment.seed.get_or_insert_with(rand::random);

    info!(
        arms = config.experiment.arm_count(),
        initial_epsilon = config.experiment.initial_epsilon,
        iterations = config.experiment.iterations,
        seed,
        "Configuration loaded"
    );

    let mut experiment =
        Experiment::new(config.experiment.clone()).context("invalid experiment configuration")?;
    let mut rng = StdRng::seed_from_u64(seed);

    let cancel = Arc::new(AtomicBool::new(false));
    if let Some(ms) = cli.max_duration_ms {
        let flag = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(ms));
            flag.store(true, Ordering::Relaxed);
        });
    }
    experiment.run_cancellable(&mut rng, &cancel);

    let report = experiment.report();
    if let Some(path) = &config.output.history_path {
        report
            .write_json(path)
            .with_context(|| format!("writing report to {path}"))?;
        info!(path = %path, "Report written");
    }
    if let Some(path) = &config.output.chart_path {
        chart::write_convergence_svg(&report, Path::new(path))
            .with_context(|| format!("writing chart to {path}"))?;
        info!(path = %path, "Chart written");
    }

    if config.output.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print!("{}", render::render_summary(&report));
        println!();
        print!(
            "{}",
            render::render_convergence(&report, config.output.checkpoints)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file_is_error() {
        let err = load_config(Some("/nonexistent/bandit-sim.toml")).unwrap_err();
        assert!(err.to_string().contains("loading config"), "{err}");
    }

    #[test]
    fn test_load_config_bad_file_does_not_run_defaults() {
        let path = std::env::temp_dir().join(format!(
            "bandit-sim-cli-bad-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[experiment]\ntrue_probabilities = [0.9, 0.1]\niterations = \"ten\"\n",
        )
        .unwrap();
        let result = load_config(path.to_str());
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "bandit-sim",
            "--probabilities",
            "0.1,0.9",
            "--epsilon",
            "0.2",
            "--chart-out",
            "chart.svg",
        ])
        .unwrap();
        assert_eq!(cli.probabilities, Some(vec![0.1, 0.9]));
        assert_eq!(cli.epsilon, Some(0.2));
        assert_eq!(cli.chart_out.as_deref(), Some("chart.svg"));
    }
}
