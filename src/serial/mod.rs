//! Serial transport to the acquisition device.
//!
//! The device side of the protocol is trivial: we send a single request byte
//! and the device answers with one ASCII line containing a raw ADC reading in
//! `[0, 1023]`. The device itself is out of scope; this module consumes it as
//! an opaque request/response channel.
//!
//! Reads are bounded by a deadline so a non-responding device becomes a
//! reported failure instead of an indefinite hang.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::AppError;

/// Fixed baud rate of the acquisition sketch.
pub const BAUD_RATE: u32 = 115_200;

/// Single-byte measurement request.
pub const REQUEST_BYTE: u8 = b'f';

/// Maximum value of the device's 10-bit A/D converter.
pub const ADC_MAX: u16 = 1023;

/// Interval at which the bounded read polls the port.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One raw reading per request. The seam exists so the acquisition session can
/// be tested against a scripted fake instead of real hardware.
pub trait Rangefinder {
    fn sample_raw(&mut self) -> Result<u16, AppError>;
}

/// Rangefinder backed by a real serial port.
pub struct SerialRangefinder {
    port: Box<dyn SerialPort>,
    read_timeout: Duration,
}

impl SerialRangefinder {
    /// Open a serial port at the fixed baud rate, 8N1, no flow control.
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM0")
    /// * `read_timeout` - Deadline for one request/response round-trip
    pub fn open(path: &str, read_timeout: Duration) -> Result<Self, AppError> {
        let port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|e| AppError::new(5, format!("Failed to open serial port '{path}': {e}")))?;

        Ok(Self { port, read_timeout })
    }

    /// Read one response line (up to `\n`), honoring the round-trip deadline.
    fn read_response_line(&mut self) -> Result<String, AppError> {
        let deadline = Instant::now() + self.read_timeout;
        let mut buf: Vec<u8> = Vec::with_capacity(8);
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte) {
                Ok(0) => {}
                Ok(_) => {
                    if byte[0] == b'\n' {
                        return Ok(String::from_utf8_lossy(&buf).into_owned());
                    }
                    buf.push(byte[0]);
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return Err(AppError::new(5, format!("Serial read failed: {e}"))),
            }

            if Instant::now() >= deadline {
                return Err(AppError::new(
                    5,
                    format!(
                        "Device response timed out after {}ms.",
                        self.read_timeout.as_millis()
                    ),
                ));
            }
        }
    }
}

impl Rangefinder for SerialRangefinder {
    fn sample_raw(&mut self) -> Result<u16, AppError> {
        self.port
            .write_all(&[REQUEST_BYTE])
            .map_err(|e| AppError::new(5, format!("Serial write failed: {e}")))?;
        self.port
            .flush()
            .map_err(|e| AppError::new(5, format!("Serial flush failed: {e}")))?;

        let line = self.read_response_line()?;
        parse_raw_reading(&line)
    }
}

/// Parse one device response line into a raw ADC reading.
pub fn parse_raw_reading(line: &str) -> Result<u16, AppError> {
    let trimmed = line.trim();
    let raw = trimmed.parse::<u16>().map_err(|_| {
        AppError::new(
            5,
            format!("Malformed device response '{trimmed}' (expected an integer)."),
        )
    })?;

    if raw > ADC_MAX {
        return Err(AppError::new(
            5,
            format!("Device reading {raw} outside ADC range 0..={ADC_MAX}."),
        ));
    }
    Ok(raw)
}
