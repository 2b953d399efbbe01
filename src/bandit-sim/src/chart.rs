//! SVG convergence chart: one line per arm, estimate against pull count.

use std::path::Path;

use bandit_rl_engine::ExperimentReport;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (1200, 800);

pub fn write_convergence_svg(report: &ExperimentReport, path: &Path) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let max_pulls = report
        .arms
        .iter()
        .map(|arm| arm.pull_count)
        .max()
        .unwrap_or(0)
        .max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Estimated Win Rates Over Iterations", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0u64..max_pulls, 0f64..1f64)?;

    chart
        .configure_mesh()
        .x_desc("Iterations")
        .y_desc("Estimated Win Rate")
        .draw()?;

    for arm in &report.arms {
        let color = Palette99::pick(arm.index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                arm.history.iter().map(|s| (s.pull_count, s.estimate)),
                color.stroke_width(2),
            ))?
            .label(arm.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandit_core::ExperimentConfig;
    use bandit_rl_engine::Experiment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn report(probs: &[f64], iterations: u64) -> ExperimentReport {
        let config = ExperimentConfig::new(probs.to_vec(), 0.3, iterations);
        let mut experiment = Experiment::new(config).unwrap();
        experiment.run(&mut StdRng::seed_from_u64(10));
        experiment.report()
    }

    fn temp_svg(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("bandit-sim-{}-{name}.svg", std::process::id()))
    }

    #[test]
    fn test_svg_has_one_series_per_arm() {
        let report = report(&[0.2, 0.8], 400);
        let path = temp_svg("chart");
        write_convergence_svg(&report, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Estimated Win Rates Over Iterations"));
        assert!(svg.contains("Arm 1 (true p=0.2)"));
        assert!(svg.contains("Arm 2 (true p=0.8)"));
        assert!(svg.matches("<polyline").count() >= 2);
    }

    #[test]
    fn test_svg_for_empty_run() {
        let report = report(&[0.5], 0);
        let path = temp_svg("empty-chart");
        write_convergence_svg(&report, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(svg.contains("Arm 1 (true p=0.5)"));
    }
}
