use std::collections::BTreeMap;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("lingocheck/", env!("CARGO_PKG_VERSION"));

/// Reserved status meaning "transport-level failure"; never a real HTTP
/// status.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// One scripted request: absolute URL, method, optional JSON body.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

/// Response body, parsed as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    pub(crate) fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    /// Substring check against the raw JSON rendering or the raw text.
    pub fn contains(&self, fragment: &str) -> bool {
        match self {
            Body::Json(value) => value.to_string().contains(fragment),
            Body::Text(text) => text.contains(fragment),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }
}

/// Uniform result of one request. Exactly one shape is produced per call:
/// a `Success` always has a real (non-zero) HTTP status and at least 1 ms
/// of elapsed time, and a `Failure` reports status 0 and zero elapsed
/// time, so zero elapsed uniquely marks a transport failure.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success {
        status: u16,
        body: Body,
        elapsed_ms: u64,
        headers: BTreeMap<String, String>,
    },
    Failure {
        error: String,
    },
}

impl Outcome {
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Success { status, .. } => *status,
            Outcome::Failure { .. } => TRANSPORT_FAILURE_STATUS,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            Outcome::Success { elapsed_ms, .. } => *elapsed_ms,
            Outcome::Failure { .. } => 0,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }
}

/// Build the shared HTTP client. No timeout is applied unless one was
/// requested; a hung connection then hangs the run.
///
/// # Errors
///
/// Returns an error when the underlying TLS backend cannot be initialized.
pub fn build_client(timeout: Option<std::time::Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Perform one HTTP exchange and resolve with an [`Outcome`]. This never
/// returns an error: transport failures (DNS, connect, TLS, truncated body)
/// map to `Outcome::Failure` so callers branch on status alone.
///
/// The timer covers the full exchange, including accumulation of the
/// complete response body. The body is serialized once up front so the
/// `Content-Length` reqwest derives matches the exact bytes sent.
pub async fn execute(client: &Client, spec: &RequestSpec) -> Outcome {
    let start = Instant::now();

    let mut request = match spec.method {
        HttpMethod::Get => client.get(&spec.url),
        HttpMethod::Post => client.post(&spec.url),
    }
    .header(CONTENT_TYPE, "application/json");

    if let Some(body) = spec.body.as_ref()
        && spec.method != HttpMethod::Get
    {
        request = request.body(body.to_string());
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            debug!("Transport failure for {} {}: {}", spec.method, spec.url, err);
            return Outcome::Failure {
                error: err.to_string(),
            };
        }
    };

    let status = response.status().as_u16();
    let headers = collect_headers(response.headers());

    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            debug!("Body read failure for {} {}: {}", spec.method, spec.url, err);
            return Outcome::Failure {
                error: err.to_string(),
            };
        }
    };

    // Clamp sub-millisecond exchanges to 1ms; zero is reserved for failures.
    let elapsed_ms = u64::try_from(start.elapsed().as_millis())
        .unwrap_or(u64::MAX)
        .max(1);

    Outcome::Success {
        status,
        body: Body::from_text(text),
        elapsed_ms,
        headers,
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_owned(), value.to_owned()))
        })
        .collect()
}
