//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed samples: `o`
//! - fitted model curve: `-`
//! - datasheet reference curve: `.`

use crate::domain::{FittedModel, ModelFile, Sample, SensorKind, VOLT_PLOT_RANGE};
use crate::models::reference_distance_cm;
use crate::plot::{CURVE_POINTS, sample_curve};

/// Render the comparison plot for an in-memory fit result.
pub fn render_ascii_plot(
    sensor: SensorKind,
    samples: &[Sample],
    model: &FittedModel,
    width: usize,
    height: usize,
) -> String {
    let fitted = sample_curve(VOLT_PLOT_RANGE, CURVE_POINTS, |v| model.distance_cm(v));
    let reference = sample_curve(VOLT_PLOT_RANGE, CURVE_POINTS, |v| {
        reference_distance_cm(sensor, v)
    });
    render_plot(sensor, samples, &fitted, &reference, width, height)
}

/// Render the comparison plot from a saved model JSON (no sample overlay).
pub fn render_ascii_plot_from_model_file(file: &ModelFile, width: usize, height: usize) -> String {
    let fitted: Vec<(f64, f64)> = file
        .grid
        .volts
        .iter()
        .zip(file.grid.distance_cm.iter())
        .map(|(&v, &x)| (v, x))
        .collect();
    let reference = sample_curve(VOLT_PLOT_RANGE, CURVE_POINTS, |v| {
        reference_distance_cm(file.sensor, v)
    });
    render_plot(file.sensor, &[], &fitted, &reference, width, height)
}

fn render_plot(
    sensor: SensorKind,
    samples: &[Sample],
    fitted: &[(f64, f64)],
    reference: &[(f64, f64)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (v_min, v_max) = VOLT_PLOT_RANGE;

    let (x_min, x_max) = distance_range(samples, fitted, reference).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = pad_range(x_min, x_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the reference first, then the fitted curve, then samples, so the
    // most important marks overlay the less important ones.
    draw_curve(&mut grid, reference, v_min, v_max, x_min, x_max, '.');
    draw_curve(&mut grid, fitted, v_min, v_max, x_min, x_max, '-');

    for s in samples {
        if s.volts < v_min || s.volts > v_max {
            continue;
        }
        let col = map_x(s.volts, v_min, v_max, width);
        let row = map_y(s.distance_cm, x_min, x_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!("{} transfer function\n", sensor.part_code()));
    out.push_str(&format!(
        "Plot: V=[{v_min:.2}, {v_max:.2}] | x=[{x_min:.1}, {x_max:.1}]cm\n"
    ));
    out.push_str("Legend: o datapoints | - estimated model | . model from datasheet\n");

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn distance_range(
    samples: &[Sample],
    fitted: &[(f64, f64)],
    reference: &[(f64, f64)],
) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;

    for x in samples
        .iter()
        .map(|s| s.distance_cm)
        .chain(fitted.iter().map(|p| p.1))
        .chain(reference.iter().map(|p| p.1))
    {
        if x.is_finite() {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
    }

    (min_x.is_finite() && max_x.is_finite() && max_x > min_x).then_some((min_x, max_x))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = (max - min) * frac;
    (min - pad, max + pad)
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    v_min: f64,
    v_max: f64,
    x_min: f64,
    x_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    for &(v, x) in curve {
        if !x.is_finite() || v < v_min || v > v_max || x < x_min || x > x_max {
            continue;
        }
        let col = map_x(v, v_min, v_max, width);
        let row = map_y(x, x_min, x_max, height);
        if grid[row][col] == ' ' || grid[row][col] == '.' {
            grid[row][col] = ch;
        }
    }
}

fn map_x(v: f64, v_min: f64, v_max: f64, width: usize) -> usize {
    let u = ((v - v_min) / (v_max - v_min)).clamp(0.0, 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_y(x: f64, x_min: f64, x_max: f64, height: usize) -> usize {
    // Row 0 is the top of the plot, so distance maps inverted.
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    let from_bottom = (u * (height as f64 - 1.0)).round() as usize;
    height - 1 - from_bottom.min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> FittedModel {
        FittedModel {
            a: 75.59,
            b: -3.877,
            c: 21.31,
            d: -0.6346,
        }
    }

    #[test]
    fn plot_has_expected_geometry_and_legend() {
        let samples = vec![
            Sample { distance_cm: 5.0, volts: 2.1 },
            Sample { distance_cm: 10.0, volts: 1.4 },
            Sample { distance_cm: 15.0, volts: 0.95 },
        ];
        let out = render_ascii_plot(SensorKind::Gp2d120xj00f, &samples, &sample_model(), 80, 20);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3 + 20);
        assert!(lines[0].starts_with("GP2D120XJ00F"));
        assert!(lines[2].contains("datapoints"));

        // Header text aside, the grid itself must carry all three marks.
        let grid = lines[3..].concat();
        assert!(grid.contains('o'));
        assert!(grid.contains('-'));
        assert!(grid.contains('.'));
    }

    #[test]
    fn plot_is_deterministic() {
        let samples = vec![Sample { distance_cm: 8.0, volts: 1.6 }];
        let a = render_ascii_plot(SensorKind::Gp2d120xj00f, &samples, &sample_model(), 60, 15);
        let b = render_ascii_plot(SensorKind::Gp2d120xj00f, &samples, &sample_model(), 60, 15);
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_samples_are_skipped() {
        let samples = vec![Sample { distance_cm: 5.0, volts: 4.9 }];
        let out = render_ascii_plot(SensorKind::Gp2d120xj00f, &samples, &sample_model(), 60, 15);
        let grid: String = out.lines().skip(3).collect();
        assert!(!grid.contains('o'));
    }
}
