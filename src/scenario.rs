//! The scripted scenario list and per-scenario verdicts.
//!
//! Scenarios mirror the public surface of the translation API: an info
//! endpoint, a languages endpoint, happy-path translations, two invalid
//! inputs that must be rejected, and a handful of timing runs.

use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{HttpMethod, Outcome, RequestSpec};

/// Expected response status: an exact code or the 4xx client-error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Status(u16),
    ClientError,
}

impl Expect {
    pub fn matches(self, status: u16) -> bool {
        match self {
            Expect::Status(code) => status == code,
            Expect::ClientError => (400..500).contains(&status),
        }
    }
}

impl std::fmt::Display for Expect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expect::Status(code) => write!(f, "{}", code),
            Expect::ClientError => write!(f, "4xx"),
        }
    }
}

/// One scripted request with its expectations.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub method: HttpMethod,
    pub path: &'static str,
    pub body: Option<Value>,
    pub expect: Expect,
    /// Body substring that must appear when the status matched.
    pub body_fragment: Option<&'static str>,
    /// Timing runs feed the average-latency line in the summary.
    pub timed: bool,
}

impl Scenario {
    /// Resolve this scenario against the base URL.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the endpoint path cannot be joined
    /// onto the base URL.
    pub fn request(&self, base: &Url) -> AppResult<RequestSpec> {
        let url = base.join(self.path).map_err(|source| {
            AppError::validation(ValidationError::JoinEndpointFailed {
                path: self.path.to_owned(),
                source,
            })
        })?;
        Ok(RequestSpec {
            method: self.method,
            url: url.into(),
            body: self.body.clone(),
        })
    }

    /// Classify one outcome against this scenario's expectations. A
    /// transport failure always fails the scenario; a status mismatch or a
    /// missing body fragment fails it without stopping the run.
    pub fn judge(&self, outcome: &Outcome) -> Verdict {
        match outcome {
            Outcome::Failure { error } => Verdict::TransportFailure {
                error: error.clone(),
            },
            Outcome::Success { status, body, .. } => {
                if !self.expect.matches(*status) {
                    return Verdict::WrongStatus { actual: *status };
                }
                if let Some(fragment) = self.body_fragment
                    && !body.contains(fragment)
                {
                    return Verdict::MissingFragment { fragment };
                }
                Verdict::Pass
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    WrongStatus { actual: u16 },
    MissingFragment { fragment: &'static str },
    TransportFailure { error: String },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "ok"),
            Verdict::WrongStatus { actual } => write!(f, "unexpected status {}", actual),
            Verdict::MissingFragment { fragment } => {
                write!(f, "body missing '{}'", fragment)
            }
            Verdict::TransportFailure { error } => write!(f, "transport error: {}", error),
        }
    }
}

const TIMING_TEXT: &str = "Hello world! How are you today?";

/// The fixed, read-only scenario list. `timing_runs` controls how many
/// latency-measurement calls are appended at the end.
pub fn scripted(timing_runs: usize) -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario {
            name: "api info".to_owned(),
            method: HttpMethod::Get,
            path: "/",
            body: None,
            expect: Expect::Status(200),
            body_fragment: Some("Translation API"),
            timed: false,
        },
        Scenario {
            name: "supported languages".to_owned(),
            method: HttpMethod::Get,
            path: "/languages",
            body: None,
            expect: Expect::Status(200),
            body_fragment: Some("languages"),
            timed: false,
        },
        Scenario {
            name: "translate en->es".to_owned(),
            method: HttpMethod::Post,
            path: "/translate",
            body: Some(json!({
                "text": TIMING_TEXT,
                "target_language": "es",
            })),
            expect: Expect::Status(200),
            body_fragment: Some("translated_text"),
            timed: false,
        },
        Scenario {
            name: "translate en->fr".to_owned(),
            method: HttpMethod::Post,
            path: "/translate",
            body: Some(json!({
                "text": "Thank you",
                "target_language": "fr",
            })),
            expect: Expect::Status(200),
            body_fragment: Some("translated_text"),
            timed: false,
        },
        Scenario {
            name: "translate en->de with explicit source".to_owned(),
            method: HttpMethod::Post,
            path: "/translate",
            body: Some(json!({
                "text": "Good morning",
                "target_language": "de",
                "source_language": "en",
            })),
            expect: Expect::Status(200),
            body_fragment: Some("translated_text"),
            timed: false,
        },
        Scenario {
            name: "rejects empty text".to_owned(),
            method: HttpMethod::Post,
            path: "/translate",
            body: Some(json!({
                "text": "",
                "target_language": "es",
            })),
            expect: Expect::ClientError,
            body_fragment: None,
            timed: false,
        },
        Scenario {
            name: "rejects unknown target code".to_owned(),
            method: HttpMethod::Post,
            path: "/translate",
            body: Some(json!({
                "text": "This should fail",
                "target_language": "invalid_code",
            })),
            expect: Expect::ClientError,
            body_fragment: None,
            timed: false,
        },
    ];

    for run in 1..=timing_runs {
        scenarios.push(Scenario {
            name: format!("timing run {}", run),
            method: HttpMethod::Post,
            path: "/translate",
            body: Some(json!({
                "text": TIMING_TEXT,
                "target_language": "es",
            })),
            expect: Expect::Status(200),
            body_fragment: None,
            timed: true,
        });
    }

    scenarios
}
