//! Counter tables owned by the host process.
//!
//! A harness which executes an instrumented target out of process (in a VM, over IPC, ...) keeps
//! its own table, announces it through the registrar like the coverage runtime would, and folds
//! the counters reported by each execution into it.

use std::ptr::{self, NonNull};

use log::debug;

use crate::{error::Error, region::CounterRegion, registrar::Registrar};

/// A zero-initialised counter table which lives until the process exits.
#[derive(Debug)]
pub struct HostCounters {
    start: NonNull<u8>,
    len: usize,
}

impl HostCounters {
    pub fn new(len: usize) -> Self {
        // Registered regions keep pointing into the table, so it is never freed.
        let table: &'static mut [u8] = Box::leak(vec![0u8; len].into_boxed_slice());
        Self {
            start: NonNull::from(table).cast::<u8>(),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn region(&self) -> CounterRegion<'static> {
        // SAFETY: the table is a leaked allocation of `len` bytes.
        unsafe { CounterRegion::from_raw_parts(self.start.as_ptr(), self.len) }
    }

    /// Announces this table to `registrar`.
    pub fn install(&self, registrar: &Registrar) -> Result<CounterRegion<'static>, Error> {
        let region = self.region();
        debug!("Installing {} host-owned counters", self.len);
        // SAFETY: the bounds come from `region` and the table is never freed.
        unsafe { registrar.register(region.start(), region.stop()) }
    }

    /// Adds `hits` element-wise, wrapping at 256 like inline 8-bit counters do.
    ///
    /// Values beyond the table length are ignored.
    pub fn accumulate(&mut self, hits: &[u8]) {
        for (offset, hits) in hits.iter().take(self.len).enumerate() {
            // SAFETY: `offset < len`
            unsafe {
                let counter = self.start.as_ptr().add(offset);
                ptr::write_volatile(counter, ptr::read_volatile(counter).wrapping_add(*hits));
            }
        }
    }

    pub fn reset(&mut self) {
        // SAFETY: the table spans `len` writable bytes.
        unsafe { ptr::write_bytes(self.start.as_ptr(), 0, self.len) }
    }
}
