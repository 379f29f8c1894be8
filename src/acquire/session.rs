//! The interactive measurement session.
//!
//! Control flow per target distance:
//!
//! 1. prompt the experimenter to position the obstacle and confirm
//!    (any input proceeds; `t` aborts the whole run at this boundary)
//! 2. take N raw readings from the device and convert each to volts
//! 3. sort ascending, keep the middle 50% (interquartile range), average
//! 4. append `"distance, volts"` to the dataset file and flush
//!
//! Abort and end-of-input are controlled exits: whatever rows were already
//! written stay in the file.

use std::io::{BufRead, Write};

use crate::acquire::plan::DistancePlan;
use crate::domain::{AcquireConfig, Sample};
use crate::error::AppError;
use crate::io::samples::SampleWriter;
use crate::serial::{ADC_MAX, Rangefinder};

/// Operator decision at a per-distance prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Proceed,
    Abort,
}

/// What a completed (or aborted) session did.
#[derive(Debug, Clone, Copy)]
pub struct SessionOutcome {
    pub samples_written: usize,
    pub aborted: bool,
}

/// Convert a raw ADC reading to volts.
pub fn raw_to_volts(raw: u16, a_ref: f64) -> f64 {
    a_ref * raw as f64 / ADC_MAX as f64
}

/// Mean of the interquartile subset of the readings.
///
/// After an ascending sort, the kept subset is `sorted[n/4 ..= 3n/4]`; for
/// n=40 that is indices 10..=30 (21 values). This suppresses outliers from
/// obstacle wobble and ADC glitches without discarding the whole burst.
pub fn iqr_mean(volts: &[f64]) -> Result<f64, AppError> {
    let n = volts.len();
    if n == 0 {
        return Err(AppError::new(3, "No readings to average."));
    }

    let mut sorted = volts.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let kept = &sorted[n / 4..3 * n / 4 + 1];
    Ok(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Prompt the experimenter to position the obstacle at `distance_cm`.
///
/// `t` (either case) aborts; end of input is treated as an abort too, so a
/// closed stdin cannot leave the run waiting forever. Anything else proceeds.
pub fn prompt_for_distance(
    distance_cm: f64,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<PromptOutcome, AppError> {
    write!(
        output,
        "Place the obstacle at {distance_cm:5.2}cm and press P and Enter to proceed "
    )
    .and_then(|()| output.flush())
    .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AppError::new(2, format!("Failed to read operator input: {e}")))?;

    if read == 0 || line.trim().eq_ignore_ascii_case("t") {
        return Ok(PromptOutcome::Abort);
    }
    Ok(PromptOutcome::Proceed)
}

/// Run the full acquisition session over the plan.
///
/// The header row is written before the first prompt; each averaged sample is
/// appended (and flushed) as soon as its burst completes.
pub fn run_session<W: Write>(
    config: &AcquireConfig,
    plan: &DistancePlan,
    ranger: &mut impl Rangefinder,
    writer: &mut SampleWriter<W>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<SessionOutcome, AppError> {
    writer.write_header()?;

    writeln!(
        output,
        "You can terminate the process prematurely at any step by pressing T and Enter"
    )
    .and_then(|()| writeln!(output, "Process initiated..."))
    .map_err(|e| AppError::new(2, format!("Failed to write status: {e}")))?;

    let mut samples_written = 0;
    for distance_cm in plan.iter() {
        if prompt_for_distance(distance_cm, input, output)? == PromptOutcome::Abort {
            return Ok(SessionOutcome {
                samples_written,
                aborted: true,
            });
        }

        let mut volts = Vec::with_capacity(config.samples_per_point);
        for _ in 0..config.samples_per_point {
            let raw = ranger.sample_raw()?;
            volts.push(raw_to_volts(raw, config.a_ref));
        }

        let averaged = iqr_mean(&volts)?;
        writer.append(Sample {
            distance_cm,
            volts: averaged,
        })?;
        samples_written += 1;
    }

    Ok(SessionOutcome {
        samples_written,
        aborted: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SensorKind;
    use std::io::Cursor;

    /// Scripted device: returns canned raw readings in order.
    struct FakeRangefinder {
        readings: Vec<u16>,
        next: usize,
    }

    impl FakeRangefinder {
        fn new(readings: Vec<u16>) -> Self {
            Self { readings, next: 0 }
        }
    }

    impl Rangefinder for FakeRangefinder {
        fn sample_raw(&mut self) -> Result<u16, AppError> {
            let raw = *self
                .readings
                .get(self.next)
                .ok_or_else(|| AppError::new(5, "Fake device exhausted."))?;
            self.next += 1;
            Ok(raw)
        }
    }

    fn test_config(samples_per_point: usize) -> AcquireConfig {
        AcquireConfig {
            port: "/dev/null".to_string(),
            sensor: SensorKind::Gp2d120xj00f,
            step_cm: 1.0,
            samples_per_point,
            a_ref: 5.0,
            out: "datapoints.csv".into(),
            read_timeout: std::time::Duration::from_millis(100),
        }
    }

    #[test]
    fn raw_to_volts_spans_adc_range() {
        assert_eq!(raw_to_volts(0, 5.0), 0.0);
        assert_eq!(raw_to_volts(1023, 5.0), 5.0);
        assert!((raw_to_volts(512, 5.0) - 5.0 * 512.0 / 1023.0).abs() < 1e-12);
    }

    #[test]
    fn iqr_mean_keeps_middle_fifty_percent() {
        // N=40: kept indices are 10..=30, i.e. 21 values.
        let volts: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let mean = iqr_mean(&volts).unwrap();
        let expected: f64 = (10..=30).map(|i| i as f64).sum::<f64>() / 21.0;
        assert!((mean - expected).abs() < 1e-12);
    }

    #[test]
    fn iqr_mean_sorts_before_trimming() {
        // An extreme outlier placed first must be discarded by the trim.
        let mut volts = vec![99.0];
        volts.extend(std::iter::repeat(2.0).take(11));
        let mean = iqr_mean(&volts).unwrap();
        assert!((mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn iqr_mean_of_single_reading_is_identity() {
        assert_eq!(iqr_mean(&[1.5]).unwrap(), 1.5);
    }

    #[test]
    fn session_writes_one_row_per_confirmed_distance() {
        let config = test_config(4);
        let plan = DistancePlan::from_range(3.0, 5.0, 1.0).unwrap();

        // 3 distances × 4 readings each; constant raw 512.
        let mut ranger = FakeRangefinder::new(vec![512; 12]);
        let mut buf = Vec::new();
        let mut writer = SampleWriter::new(&mut buf);
        let mut input = Cursor::new("p\np\np\n");
        let mut console = Vec::new();

        let outcome = run_session(
            &config,
            &plan,
            &mut ranger,
            &mut writer,
            &mut input,
            &mut console,
        )
        .unwrap();

        assert_eq!(outcome.samples_written, 3);
        assert!(!outcome.aborted);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cm, V");
        assert_eq!(lines.len(), 4);
        let volts_512 = 5.0 * 512.0 / 1023.0;
        assert_eq!(lines[1], format!("3.00, {volts_512:.2}"));
        assert_eq!(lines[3], format!("5.00, {volts_512:.2}"));
    }

    #[test]
    fn abort_keeps_rows_written_so_far() {
        let config = test_config(2);
        let plan = DistancePlan::from_range(3.0, 6.0, 1.0).unwrap();

        let mut ranger = FakeRangefinder::new(vec![400; 8]);
        let mut buf = Vec::new();
        let mut writer = SampleWriter::new(&mut buf);
        // Confirm two distances, then abort at the third prompt.
        let mut input = Cursor::new("p\np\nT\n");
        let mut console = Vec::new();

        let outcome = run_session(
            &config,
            &plan,
            &mut ranger,
            &mut writer,
            &mut input,
            &mut console,
        )
        .unwrap();

        assert!(outcome.aborted);
        assert_eq!(outcome.samples_written, 2);

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3); // header + 2 rows
    }

    #[test]
    fn end_of_input_aborts_cleanly() {
        let config = test_config(1);
        let plan = DistancePlan::from_range(3.0, 30.0, 1.0).unwrap();

        let mut ranger = FakeRangefinder::new(vec![300; 1]);
        let mut buf = Vec::new();
        let mut writer = SampleWriter::new(&mut buf);
        let mut input = Cursor::new("p\n"); // input ends after one confirmation
        let mut console = Vec::new();

        let outcome = run_session(
            &config,
            &plan,
            &mut ranger,
            &mut writer,
            &mut input,
            &mut console,
        )
        .unwrap();

        assert!(outcome.aborted);
        assert_eq!(outcome.samples_written, 1);
    }

    #[test]
    fn device_failure_is_fatal_mid_session() {
        let config = test_config(4);
        let plan = DistancePlan::from_range(3.0, 5.0, 1.0).unwrap();

        // Only enough readings for the first burst.
        let mut ranger = FakeRangefinder::new(vec![512; 4]);
        let mut buf = Vec::new();
        let mut writer = SampleWriter::new(&mut buf);
        let mut input = Cursor::new("p\np\np\n");
        let mut console = Vec::new();

        let err = run_session(
            &config,
            &plan,
            &mut ranger,
            &mut writer,
            &mut input,
            &mut console,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 5);

        // The first row survived.
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
