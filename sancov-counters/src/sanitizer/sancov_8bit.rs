//! Hooks for `-fsanitize-coverage=inline-8bit-counters`.
//!
//! The symbols are only exported with the `sancov_8bit` feature. Without it the functions are
//! still callable from Rust.
//!
//! https://clang.llvm.org/docs/SanitizerCoverage.html#inline-8bit-counters

use std::io;

use libc::c_int;
use log::{debug, error};

use crate::{probe::Probe, registrar::REGISTRAR};

/// Called once per instrumented module with the bounds of its counter table.
///
/// This usually runs before `main`, when no logger is installed yet. The outcome stays in
/// [`REGISTRAR`] and is logged later through [`Registrar::report`](crate::registrar::Registrar::report).
///
/// # Safety
///
/// `[start, stop)` must stay readable until the process exits.
#[cfg_attr(feature = "sancov_8bit", no_mangle)]
pub unsafe extern "C" fn __sanitizer_cov_8bit_counters_init(start: *const u8, stop: *const u8) {
    match REGISTRAR.register(start, stop) {
        Ok(region) => debug!("Registered 8-bit counters, len: {}", region.len()),
        Err(err) => debug!("Rejected 8-bit counters: {}", err),
    }
}

/// Prints the registered counters to stdout. Returns 0, or -1 if stdout is not writable.
#[cfg_attr(feature = "sancov_8bit", no_mangle)]
pub extern "C" fn work(argc: c_int) -> c_int {
    let argc = usize::try_from(argc).unwrap_or(0);

    match Probe::new(io::stdout().lock()).run(argc, &REGISTRAR.region()) {
        Ok(_) => 0,
        Err(err) => {
            error!("Failed to print counters: {}", err);
            -1
        }
    }
}

/// Location of the registered counter table, as handed to a host reading this process' memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCounters {
    pub ptr: *const u8,
    pub len: usize,
}

/// Describes the registered table, null and 0 before registration.
#[cfg_attr(feature = "sancov_8bit", no_mangle)]
pub extern "C" fn dump_coverage_counters() -> RawCounters {
    let region = REGISTRAR.region();
    RawCounters {
        ptr: region.start(),
        len: region.len(),
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::{__sanitizer_cov_8bit_counters_init, dump_coverage_counters, work, RawCounters};
    use crate::{error::Error, probe::Probe, registrar::REGISTRAR};

    // The only test in this crate touching the global registrar.
    #[test_log::test]
    fn test_global_registration() {
        assert_eq!(
            dump_coverage_counters(),
            RawCounters {
                ptr: ptr::null(),
                len: 0
            }
        );
        assert_eq!(work(2), 0);

        let counters: &'static [u8] = Box::leak(vec![4u8, 0, 1].into_boxed_slice());
        let range = counters.as_ptr_range();
        unsafe { __sanitizer_cov_8bit_counters_init(range.start, range.end) };

        let other: &'static [u8] = Box::leak(vec![0u8; 9].into_boxed_slice());
        let other_range = other.as_ptr_range();
        unsafe { __sanitizer_cov_8bit_counters_init(other_range.start, other_range.end) };

        assert_eq!(
            dump_coverage_counters(),
            RawCounters {
                ptr: counters.as_ptr(),
                len: 3
            }
        );
        assert_eq!(
            REGISTRAR.last_rejection(),
            Some(Error::AlreadyRegistered {
                existing: 3,
                rejected: 9
            })
        );

        let mut probe = Probe::new(Vec::new());
        let printed = probe.run(2, &REGISTRAR.region()).unwrap();
        assert_eq!(printed, 3);
        assert_eq!(
            String::from_utf8(probe.into_inner()).unwrap(),
            "hit: 4\nhit: 0\nhit: 1\n"
        );
        assert_eq!(work(2), 0);
        assert_eq!(work(1), 0);
    }
}
