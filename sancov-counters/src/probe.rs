//! Prints the counters of a region, one `hit: <value>` line per counter.

#[cfg(test)]
use std::cell::Cell;
use std::{hint::black_box, io::Write};

use log::trace;

use crate::{error::Error, region::CounterRegion};

/// Empty side call taken when the probe gets more than one argument.
///
/// Kept out of line so an instrumented build gives the `argc > 1` branch a counter of its own.
#[inline(never)]
pub fn auxiliary() {
    #[cfg(test)]
    AUXILIARY_CALLS.with(|calls| calls.set(calls.get() + 1));
    black_box(());
}

#[cfg(test)]
thread_local! {
    static AUXILIARY_CALLS: Cell<usize> = Cell::new(0);
}

#[derive(Debug)]
pub struct Probe<W> {
    out: W,
}

impl<W: Write> Probe<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Scans `region` from start to stop and returns the number of printed lines.
    pub fn run(&mut self, argc: usize, region: &CounterRegion<'_>) -> Result<usize, Error> {
        if argc > 1 {
            auxiliary();
        }

        trace!("Probing {:?}", region);

        let mut printed = 0;
        for hits in region {
            writeln!(self.out, "hit: {}", hits)?;
            printed += 1;
        }
        self.out.flush()?;

        Ok(printed)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
