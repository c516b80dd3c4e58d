//! Registration and inspection of sanitizer-coverage 8-bit counter tables.
//!
//! Code compiled with `-fsanitize-coverage=inline-8bit-counters` calls
//! `__sanitizer_cov_8bit_counters_init` once at startup with the bounds of its counter table. The
//! hooks in [`sanitizer`] store that table in [`registrar::REGISTRAR`], and [`probe::Probe`] prints
//! the counters of any [`region::CounterRegion`] it is handed.

pub mod cli;
pub mod error;
pub mod host;
pub mod log;
pub mod probe;
pub mod region;
pub mod registrar;
pub mod sanitizer;

pub use error::Error;
pub use host::HostCounters;
pub use probe::Probe;
pub use region::CounterRegion;
pub use registrar::{Registrar, REGISTRAR};

pub const GIT_REF: &str = match option_env!("GIT_REF") {
    Some(env) => env,
    None => "undefined",
};

pub const MAYBE_GIT_REF: Option<&str> = option_env!("GIT_REF");

pub const GIT_MSG: &str = match option_env!("GIT_MSG") {
    Some(env) => env,
    None => "undefined",
};
