//! Human-readable run reporting and the optional JSON export.

use serde_json::{Value, json};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::http::Outcome;
use crate::scenario::{Scenario, Verdict};

/// One judged scenario, as it appears in the report.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub method: String,
    pub path: &'static str,
    pub expected: String,
    pub status: u16,
    pub elapsed_ms: u64,
    pub timed: bool,
    pub verdict: Verdict,
}

#[derive(Debug, Default)]
pub struct RunReport {
    results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Judge one outcome, print its report line, and record it.
    pub fn record(&mut self, scenario: &Scenario, outcome: &Outcome) {
        let verdict = scenario.judge(outcome);
        let result = ScenarioResult {
            name: scenario.name.clone(),
            method: scenario.method.to_string(),
            path: scenario.path,
            expected: scenario.expect.to_string(),
            status: outcome.status(),
            elapsed_ms: outcome.elapsed_ms(),
            timed: scenario.timed,
            verdict,
        };
        print_line(&result);
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.verdict.passed())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total().saturating_sub(self.passed())
    }

    pub fn transport_errors(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result.verdict, Verdict::TransportFailure { .. }))
            .count()
    }

    /// Average latency over passing timed runs, integer milliseconds.
    pub fn avg_timed_latency_ms(&self) -> Option<u64> {
        let timed: Vec<u64> = self
            .results
            .iter()
            .filter(|result| result.timed && result.verdict.passed())
            .map(|result| result.elapsed_ms)
            .collect();
        if timed.is_empty() {
            return None;
        }
        let sum: u64 = timed.iter().fold(0u64, |acc, ms| acc.saturating_add(*ms));
        sum.checked_div(timed.len() as u64)
    }

    pub fn print_summary(&self) {
        println!();
        println!("========== Run Summary ==========");
        println!("Scenarios: {}", self.total());
        println!("Passed: {}", self.passed());
        println!("Failed: {}", self.failed());
        println!("Transport Errors: {}", self.transport_errors());
        if let Some(avg) = self.avg_timed_latency_ms() {
            println!("Avg Timed Latency: {}ms", avg);
        }
    }

    pub fn to_json(&self) -> Value {
        let scenarios: Vec<Value> = self
            .results
            .iter()
            .map(|result| {
                json!({
                    "name": result.name,
                    "method": result.method,
                    "path": result.path,
                    "expected": result.expected,
                    "status": result.status,
                    "elapsed_ms": result.elapsed_ms,
                    "timed": result.timed,
                    "passed": result.verdict.passed(),
                    "reason": if result.verdict.passed() {
                        Value::Null
                    } else {
                        Value::String(result.verdict.to_string())
                    },
                })
            })
            .collect();

        json!({
            "summary": {
                "total": self.total(),
                "passed": self.passed(),
                "failed": self.failed(),
                "transport_errors": self.transport_errors(),
                "avg_timed_latency_ms": self.avg_timed_latency_ms(),
            },
            "scenarios": scenarios,
        })
    }
}

fn print_line(result: &ScenarioResult) {
    let label = if result.verdict.passed() {
        "PASS"
    } else {
        "FAIL"
    };
    let latency = if result.verdict.passed() {
        format!("  {}ms", result.elapsed_ms)
    } else {
        String::new()
    };
    let target = format!("{} {}", result.method, result.path);
    if result.verdict.passed() {
        println!(
            "{}  {:<36} {:<16} {} (expected {}){}",
            label, result.name, target, result.status, result.expected, latency
        );
    } else {
        println!(
            "{}  {:<36} {:<16} {} (expected {}): {}{}",
            label, result.name, target, result.status, result.expected, result.verdict, latency
        );
    }
}

/// Write the run report to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub async fn export_json(path: &str, report: &RunReport) -> Result<(), std::io::Error> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let rendered = serde_json::to_string_pretty(&report.to_json())?;
    writer.write_all(rendered.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
