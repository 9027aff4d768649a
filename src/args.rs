//! CLI argument types and parsing helpers.
use std::time::Duration;

use clap::Parser;

use crate::error::ValidationError;

pub(crate) const DEFAULT_DELAY_MS: u64 = 300;
pub(crate) const DEFAULT_TIMING_RUNS: usize = 3;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Scripted smoke tester for translation web APIs - sequential request scenarios, latency timing, and pass/fail reporting."
)]
pub struct ProbeArgs {
    /// Base URL of the translation API under test
    #[arg(long = "base-url", short = 'u', env = "LINGOCHECK_URL")]
    pub base_url: Option<String>,

    /// Pause between scenarios in milliseconds
    #[arg(long = "delay-ms", default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Per-request timeout (supports ms/s/m/h); no timeout when unset
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Number of performance-timing translate calls
    #[arg(long = "timing-runs", default_value_t = DEFAULT_TIMING_RUNS)]
    pub timing_runs: usize,

    /// Write the machine-readable run report to this path as JSON
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Parse durations like `250ms`, `10s`, `2m`, `1h`. A bare number means
/// seconds.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let trimmed = s.trim();

    let (digits, unit): (&str, fn(u64) -> Duration) =
        if let Some(rest) = trimmed.strip_suffix("ms") {
            (rest, Duration::from_millis)
        } else if let Some(rest) = trimmed.strip_suffix('s') {
            (rest, Duration::from_secs)
        } else if let Some(rest) = trimmed.strip_suffix('m') {
            (rest, |value| Duration::from_secs(value.saturating_mul(60)))
        } else if let Some(rest) = trimmed.strip_suffix('h') {
            (rest, |value| Duration::from_secs(value.saturating_mul(3600)))
        } else {
            (trimmed, Duration::from_secs)
        };

    let Ok(value) = digits.trim().parse::<u64>() else {
        return Err(ValidationError::InvalidDuration {
            value: s.to_owned(),
        });
    };
    Ok(unit(value))
}
