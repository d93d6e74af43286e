//! Threshold evaluation and check result formatting

use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::metrics::MetricValue;

/// Check severity, ordered by exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

/// Final outcome of a check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub severity: Severity,
    pub message: String,
}

impl CheckResult {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        CheckResult {
            severity,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        CheckResult::new(Severity::Unknown, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.severity.exit_code()
    }
}

/// The single status line, e.g. `WARNING: share-count: 12`
impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.label(), self.message)
    }
}

/// Build `<metric>: <value>`, with the perfdata suffix when requested
pub fn format_message(config: &Config, value: i64, runtime: Duration) -> String {
    let mut message = format!("{}: {}", config.counter, value);
    if config.perfdata {
        message.push_str(&format!(
            " | {}={},runtime={:?}",
            config.counter, value, runtime
        ));
    }
    message
}

/// Compare a value against the configured thresholds.
///
/// Critical is tested before warning, so a value at or above the critical
/// threshold always reports CRITICAL.
pub fn evaluate(config: &Config, value: MetricValue, runtime: Duration) -> CheckResult {
    let value = match value {
        MetricValue::Value(v) => v,
        MetricValue::Unknown => {
            return CheckResult::unknown(format!("Unknown value for {}", config.counter))
        }
    };

    let severity = if value >= config.critical {
        Severity::Critical
    } else if value >= config.warning {
        Severity::Warning
    } else {
        Severity::Ok
    };
    CheckResult::new(severity, format_message(config, value, runtime))
}
