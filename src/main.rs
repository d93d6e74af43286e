use std::process;

use clap::error::ErrorKind;

use check_nextcloud_counters::cli::{self, Cli};
use check_nextcloud_counters::{logging, run_check, CheckResult, UreqTransport};

fn main() {
    let cli = match Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => report(CheckResult::unknown(cli::error_summary(&e))),
    };
    let config = cli.into_config();
    logging::init(config.debug);

    let transport = UreqTransport::new(config.timeout);
    report(run_check(&config, &transport))
}

fn report(result: CheckResult) -> ! {
    println!("{}", result);
    process::exit(result.exit_code())
}
