//! Nextcloud serverinfo counter check
//!
//! Fetches the serverinfo document from a Nextcloud instance, picks one
//! counter out of it and compares it against warning/critical thresholds,
//! producing an OK/WARNING/CRITICAL/UNKNOWN result for a monitoring system.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod status;

use std::time::Instant;

pub use api::{ApiError, Request, Response, Transport, UreqTransport};
pub use config::{Config, ConfigError};
pub use metrics::{Counter, MetricResponse, MetricValue};
pub use status::{CheckResult, Severity};

/// Run one check: validate, fetch, extract, evaluate.
///
/// Every failure ends up as an UNKNOWN result; the transport is never
/// touched when the configuration is invalid.
pub fn run_check<T: Transport + ?Sized>(config: &Config, transport: &T) -> CheckResult {
    if let Err(e) = config.validate() {
        return CheckResult::unknown(e.to_string());
    }

    let started = Instant::now();
    let body = match api::fetch(config, transport) {
        Ok(body) => body,
        Err(e) => return CheckResult::unknown(e.to_string()),
    };
    let response = MetricResponse::parse(&body);
    let value = metrics::extract(&response, &config.counter);
    let runtime = started.elapsed();

    status::evaluate(config, value, runtime)
}
