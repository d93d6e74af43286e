//! Diagnostic output setup

use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

fn builder(debug: bool) -> Builder {
    let mut builder = Builder::new();
    builder.format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()));

    if debug {
        // Only our own records; ureq and rustls are chatty at debug level
        builder
            .target(Target::Stdout)
            .filter_level(LevelFilter::Off)
            .filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Debug);
    } else {
        builder
            .target(Target::Stderr)
            .filter_level(LevelFilter::Off)
            .parse_default_env();
    }
    builder
}

/// Install the logger.
///
/// With `debug` set, this crate's debug records go to stdout as
/// `DEBUG: <message>`. Otherwise only `RUST_LOG` enables logging, and then
/// on stderr so the status line stays alone on stdout.
pub fn init(debug: bool) {
    // A logger may already be installed when embedded in another binary
    let _ = builder(debug).try_init();
}
