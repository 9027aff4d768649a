//! HTTP request execution.
mod executor;

pub use executor::{
    Body, HttpMethod, Outcome, RequestSpec, TRANSPORT_FAILURE_STATUS, build_client, execute,
};
