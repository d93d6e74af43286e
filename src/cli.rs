//! Command line flags
//!
//! Besides `--name value`, the single-dash `-name value` and `-name=value`
//! forms of the older Go plugin are accepted so existing service
//! definitions keep working.

use std::ffi::OsString;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, Parser};

use crate::config::{Config, DEFAULT_URI};

#[derive(Parser, Debug)]
#[command(
    name = "check-nextcloud-counters",
    version,
    about = "Check a Nextcloud serverinfo counter against thresholds",
    allow_negative_numbers = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Hostname of the Nextcloud instance
    #[arg(long, default_value = "")]
    pub hostname: String,

    /// URI containing the status info
    #[arg(long, default_value = DEFAULT_URI)]
    pub uri: String,

    /// Nextcloud user name (admin permission required)
    #[arg(long, env = "NEXTCLOUD_USERNAME", default_value = "")]
    pub username: String,

    /// Password to authenticate against Nextcloud
    #[arg(long, env = "NEXTCLOUD_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Counter to be monitored [update-count|free-space|share-count|active-users-5min]
    #[arg(long, default_value = "")]
    pub counter: String,

    /// Critical value
    #[arg(long, default_value_t = 0)]
    pub critical: i64,

    /// Warning value
    #[arg(long, default_value_t = 0)]
    pub warning: i64,

    /// Request timeout in seconds (none by default)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Show debugging output
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Output perfdata
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub perfdata: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    /// Parse process arguments, accepting single-dash long flags
    pub fn try_parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Cli::try_parse_from(normalize_args(args))
    }

    pub fn into_config(self) -> Config {
        Config {
            hostname: self.hostname,
            uri: self.uri,
            username: self.username,
            password: self.password,
            counter: self.counter,
            warning: self.warning,
            critical: self.critical,
            timeout: self.timeout.map(Duration::from_secs),
            debug: self.debug,
            perfdata: self.perfdata,
        }
    }
}

/// Rewrite `-name` and `-name=value` to `--name...` for known long flags.
///
/// Values of flags that take a separate argument are left alone, as is
/// everything after `--`. The first item is the program name.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let longs: Vec<&str> = command.get_arguments().filter_map(|a| a.get_long()).collect();
    let takes_value: Vec<&str> = command
        .get_arguments()
        .filter(|a| a.get_action().takes_values() && !a.is_require_equals_set())
        .filter_map(|a| a.get_long())
        .collect();

    let mut normalized = Vec::new();
    let mut expect_value = false;
    let mut passthrough = false;

    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || passthrough || expect_value {
            expect_value = false;
            normalized.push(arg);
            continue;
        }

        let text = match arg.to_str() {
            Some(text) => text.to_string(),
            None => {
                normalized.push(arg);
                continue;
            }
        };
        if text == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let flag = text
            .strip_prefix("--")
            .or_else(|| text.strip_prefix('-'));
        let Some(flag) = flag else {
            normalized.push(arg);
            continue;
        };
        let (name, value) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (flag, None),
        };
        if !longs.contains(&name) {
            normalized.push(arg);
            continue;
        }

        expect_value = value.is_none() && takes_value.contains(&name);
        normalized.push(match value {
            Some(value) => OsString::from(format!("--{}={}", name, value)),
            None => OsString::from(format!("--{}", name)),
        });
    }
    normalized
}

/// First line of a clap error without its `error: ` prefix
pub fn error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).trim().to_string()
}
