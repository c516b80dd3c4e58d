use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{arg, crate_name, crate_version, value_parser, Command};
use log::{debug, error, info, warn};

use crate::{
    error::Error,
    host::HostCounters,
    log::{config_default, config_to_file},
    probe::Probe,
    region::CounterRegion,
    registrar::REGISTRAR,
};

fn create_app() -> Command {
    Command::new(crate_name!())
        .version(crate::MAYBE_GIT_REF.unwrap_or(crate_version!()))
        .about("Prints the sanitizer-coverage 8-bit counters registered in this process")
        .after_long_help(crate::GIT_MSG)
        .arg(arg!(--"host-counters" <n> "Allocates and registers a host-owned table of n counters")
            .required(false)
            .value_parser(value_parser!(usize)))
        .arg(arg!(--hits <values> "Comma separated hit counts added to the host-owned table")
            .required(false)
            .value_delimiter(',')
            .value_parser(value_parser!(u8)))
        .arg(arg!(--"log-file" <path> "Writes the log to this file in addition to stderr")
            .required(false)
            .value_parser(value_parser!(PathBuf)))
        .arg(arg!(--summary "Logs how many counters were hit after printing them"))
        .arg(arg!([args] "Arguments counted towards argc, may start with a hyphen")
            .num_args(1..)
            .allow_hyphen_values(true)
            .trailing_var_arg(true))
}

pub fn main() -> ExitCode {
    let matches = create_app().get_matches();

    let config = match matches.get_one::<PathBuf>("log-file") {
        Some(path) => config_to_file(path),
        None => config_default(),
    };
    let logging = config.and_then(|config| {
        log4rs::init_config(config)
            .map(|_handle| ())
            .map_err(|err| Error::Logging(err.to_string()))
    });
    if let Err(err) = logging {
        eprintln!("Failed to init logging: {}", err);
        return ExitCode::FAILURE;
    }

    info!("Git Version: {}", crate::GIT_REF);
    debug!("Git Message: {}", crate::GIT_MSG);

    if let Some(len) = matches.get_one::<usize>("host-counters") {
        let hits: Vec<u8> = matches
            .get_many::<u8>("hits")
            .map(|hits| hits.copied().collect())
            .unwrap_or_default();
        install_host_counters(*len, &hits);
    } else if matches.contains_id("hits") {
        warn!("Ignoring --hits without --host-counters");
    }

    // Registration by the coverage runtime ran before the logger existed.
    REGISTRAR.report();

    // Counts the program name like a C main does.
    let argc = 1 + matches
        .get_many::<String>("args")
        .map_or(0, |args| args.len());
    let region = REGISTRAR.region();

    match print_results(argc, &region) {
        Ok(printed) => info!("Printed {} counters", printed),
        Err(err) => {
            error!("Failed to print counters: {}", err);
            return ExitCode::FAILURE;
        }
    }

    if matches.get_flag("summary") {
        info!("{} of {} counters hit", region.hit_count(), region.len());
    }

    ExitCode::SUCCESS
}

fn install_host_counters(len: usize, hits: &[u8]) {
    if let Some(region) = REGISTRAR.get() {
        warn!(
            "Coverage runtime already registered {} counters, not installing a host-owned table",
            region.len()
        );
        return;
    }

    let mut counters = HostCounters::new(len);
    counters.accumulate(hits);
    // A rejection is kept by the registrar and shows up in its report.
    if counters.install(&REGISTRAR).is_err() {
        debug!("Host-owned counters were not installed");
    }
}

fn print_results(argc: usize, region: &CounterRegion<'_>) -> Result<usize, Error> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Results")?;
    Probe::new(stdout).run(argc, region)
}
