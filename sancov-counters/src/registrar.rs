use std::sync::Mutex;

use log::{debug, log, warn, Level};
use once_cell::sync::OnceCell;

use crate::{error::Error, region::CounterRegion};

/// The registrar fed by `__sanitizer_cov_8bit_counters_init`.
pub static REGISTRAR: Registrar = Registrar::new();

/// Write-once holder of the counter region announced by the coverage runtime.
///
/// The first registration wins. Announcing the same bounds again is accepted, any other region is
/// rejected and the first one stays in place.
///
/// The coverage runtime registers from a module constructor, before any logger exists. The
/// registrar therefore keeps the last rejection so that [`Registrar::report`] can log the outcome
/// once logging is up.
#[derive(Debug, Default)]
pub struct Registrar {
    region: OnceCell<CounterRegion<'static>>,
    rejection: Mutex<Option<Error>>,
}

impl Registrar {
    pub const fn new() -> Self {
        Self {
            region: OnceCell::new(),
            rejection: Mutex::new(None),
        }
    }

    /// Registers the counter table `[start, stop)`.
    ///
    /// # Safety
    ///
    /// Every byte in `[start, stop)` must stay readable until the process exits.
    pub unsafe fn register(
        &self,
        start: *const u8,
        stop: *const u8,
    ) -> Result<CounterRegion<'static>, Error> {
        let result = CounterRegion::from_raw(start, stop).and_then(|region| self.install(region));
        self.remember(result)
    }

    pub fn register_slice(&self, counters: &'static [u8]) -> Result<CounterRegion<'static>, Error> {
        let result = self.install(CounterRegion::from_slice(counters));
        self.remember(result)
    }

    fn remember(
        &self,
        result: Result<CounterRegion<'static>, Error>,
    ) -> Result<CounterRegion<'static>, Error> {
        if let Err(err) = &result {
            if let Ok(mut rejection) = self.rejection.lock() {
                *rejection = Some(err.clone());
            }
        }
        result
    }

    fn install(&self, region: CounterRegion<'static>) -> Result<CounterRegion<'static>, Error> {
        match self.region.set(region) {
            Ok(()) => {
                debug!("Stored counter region {:?}", region);
                Ok(region)
            }
            Err(rejected) => {
                let existing = self.region();
                if existing == rejected {
                    return Ok(existing);
                }

                warn!(
                    "Ignoring counter region {:?}, already holding {:?}",
                    rejected, existing
                );
                Err(Error::AlreadyRegistered {
                    existing: existing.len(),
                    rejected: rejected.len(),
                })
            }
        }
    }

    /// The registered region, or the empty region if nothing was registered yet.
    pub fn region(&self) -> CounterRegion<'static> {
        self.get().unwrap_or_default()
    }

    pub fn get(&self) -> Option<CounterRegion<'static>> {
        self.region.get().copied()
    }

    pub fn is_registered(&self) -> bool {
        self.region.get().is_some()
    }

    /// The error of the most recent rejected registration.
    pub fn last_rejection(&self) -> Option<Error> {
        self.rejection.lock().ok().and_then(|rejection| rejection.clone())
    }

    /// Records describing what was registered and what was rejected so far.
    pub fn outcome(&self) -> Vec<(Level, String)> {
        let mut records = Vec::new();
        if let Some(region) = self.get() {
            records.push((
                Level::Info,
                format!("Registered 8-bit counters, len: {}", region.len()),
            ));
        }
        if let Some(err) = self.last_rejection() {
            let level = match err {
                Error::AlreadyRegistered { .. } => Level::Warn,
                _ => Level::Error,
            };
            records.push((level, format!("Rejected 8-bit counters: {}", err)));
        }
        records
    }

    /// Logs [`Registrar::outcome`]. Call once the logger is initialised.
    pub fn report(&self) {
        for (level, message) in self.outcome() {
            log!(level, "{}", message);
        }
    }
}
