//! SVG export of the comparison plot via Plotters.
//!
//! The SVG backend is pure Rust (no system font/raster dependencies), which
//! keeps the toolchain light while still producing a chart suitable for lab
//! notes: observed samples as points, fitted and datasheet curves as lines,
//! with axis labels, a legend, and a title naming the sensor.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{FittedModel, Sample, SensorKind, VOLT_PLOT_RANGE};
use crate::error::AppError;
use crate::models::reference_distance_cm;
use crate::plot::{CURVE_POINTS, sample_curve};

const CHART_SIZE: (u32, u32) = (900, 600);

/// Write the comparison plot as an SVG file.
pub fn write_svg_plot(
    path: &Path,
    sensor: SensorKind,
    samples: &[Sample],
    model: &FittedModel,
) -> Result<(), AppError> {
    draw(path, sensor, samples, model).map_err(|e| {
        AppError::new(2, format!("Failed to write plot SVG '{}': {e}", path.display()))
    })
}

fn draw(
    path: &Path,
    sensor: SensorKind,
    samples: &[Sample],
    model: &FittedModel,
) -> Result<(), Box<dyn std::error::Error>> {
    let fitted = sample_curve(VOLT_PLOT_RANGE, CURVE_POINTS, |v| model.distance_cm(v));
    let reference = sample_curve(VOLT_PLOT_RANGE, CURVE_POINTS, |v| {
        reference_distance_cm(sensor, v)
    });

    let (x_min, x_max) = distance_bounds(samples, &fitted, &reference);
    let (v_min, v_max) = VOLT_PLOT_RANGE;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!("{} Transfer Function", sensor.part_code()),
            ("sans-serif", 24),
        )
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(v_min..v_max, x_min..x_max)?;

    chart
        .configure_mesh()
        .x_desc("V [V]")
        .y_desc("x [cm]")
        .draw()?;

    let reference_color = RGBColor(200, 60, 60);
    let fitted_color = RGBColor(40, 90, 200);

    chart
        .draw_series(LineSeries::new(reference.iter().copied(), &reference_color))?
        .label("model from datasheet")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], reference_color)
        });

    chart
        .draw_series(LineSeries::new(fitted.iter().copied(), &fitted_color))?
        .label("estimated model")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fitted_color));

    chart
        .draw_series(
            samples
                .iter()
                .map(|s| Circle::new((s.volts, s.distance_cm), 3, BLACK.filled())),
        )?
        .label("datapoints")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn distance_bounds(samples: &[Sample], fitted: &[(f64, f64)], reference: &[(f64, f64)]) -> (f64, f64) {
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
    if !(min_x.is_finite() && max_x.is_finite() && max_x > min_x) {
        return (0.0, 1.0);
    }
    let pad = (max_x - min_x) * 0.05;
    (min_x - pad, max_x + pad)
}
