//! Entry points called by sanitizer-coverage instrumented code and fuzzing runtimes.

pub mod sancov_8bit;
