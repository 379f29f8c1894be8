//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the interactive acquisition session
//! - runs curve fitting and prints reports/plots
//! - writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::acquire::{DistancePlan, run_session};
use crate::cli::{AcquireArgs, Command, FitArgs, PlotArgs};
use crate::domain::{AcquireConfig, FitConfig};
use crate::error::AppError;
use crate::serial::SerialRangefinder;

/// Entry point for the `ircal` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Acquire(args) => handle_acquire(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_acquire(args: AcquireArgs) -> Result<(), AppError> {
    let config = acquire_config_from_args(&args);

    // Validate the plan before touching the port or the output file.
    let plan = DistancePlan::for_sensor(config.sensor, config.step_cm)?;

    let mut ranger = SerialRangefinder::open(&config.port, config.read_timeout)?;
    let mut writer = crate::io::samples::create_sample_file(&config.out)?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    let outcome = run_session(
        &config,
        &plan,
        &mut ranger,
        &mut writer,
        &mut input,
        &mut output,
    )?;

    println!("Process terminated!");
    if outcome.aborted {
        println!("Run stopped early by the operator.");
    }
    println!(
        "{} sample(s) written to '{}'.",
        outcome.samples_written,
        config.out.display()
    );
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);

    let samples = crate::io::samples::read_samples(&config.data_path)?;
    let fit = crate::fit::fit_exp_sum(&samples, &config)?;

    println!("{}", crate::report::format_fit_summary(&config, &samples, &fit));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            config.sensor,
            &samples,
            &fit.model,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_model {
        crate::io::model::write_model_json(path, config.sensor, &fit)?;
        println!("Model JSON written to '{}'.", path.display());
    }
    if let Some(path) = &config.export_plot {
        crate::plot::write_svg_plot(path, config.sensor, &samples, &fit.model)?;
        println!("Plot SVG written to '{}'.", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let model_file = crate::io::model::read_model_json(&args.model)?;
    let plot = crate::plot::render_ascii_plot_from_model_file(&model_file, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn acquire_config_from_args(args: &AcquireArgs) -> AcquireConfig {
    AcquireConfig {
        port: args.port.clone(),
        sensor: args.sensor,
        step_cm: args.step_cm,
        samples_per_point: args.samples_per_point as usize,
        a_ref: args.aref,
        out: args.out.clone(),
        read_timeout: Duration::from_millis(args.timeout_ms),
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        sensor: args.sensor,
        data_path: args.datafile.clone(),
        rate_min: args.rate_min,
        rate_max: args.rate_max,
        rate_steps: args.rate_steps,
        rate_min_ratio: args.rate_min_ratio,
        refine_rounds: args.refine_rounds,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_model: args.export_model.clone(),
        export_plot: args.export_plot.clone(),
    }
}
