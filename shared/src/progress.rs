//! Cosmetic per-file progress.
//!
//! The percentages are not tied to any byte transfer. Each admitted file
//! gets its own periodic ticker that advances by a random step until it
//! reaches 100, at which point the ticker is cancelled. Removing the file
//! cancels it too.

use std::collections::HashMap;

use rand::Rng;

use crate::batch::FileId;

pub const TICK_INTERVAL_MS: u32 = 300;
pub const STEP_MIN: u8 = 5;
pub const STEP_MAX: u8 = 14;
pub const COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Advanced(u8),
    /// Reached exactly 100; the ticker must stop.
    Complete,
}

impl Tick {
    pub fn percent(self) -> u8 {
        match self {
            Tick::Advanced(p) => p,
            Tick::Complete => COMPLETE,
        }
    }
}

pub fn next_percent(current: u8, step: u8) -> Tick {
    let next = current.saturating_add(step);
    if next >= COMPLETE {
        Tick::Complete
    } else {
        Tick::Advanced(next)
    }
}

pub fn step_from<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(STEP_MIN..=STEP_MAX)
}

pub fn random_step() -> u8 {
    step_from(&mut rand::thread_rng())
}

/// Running tickers keyed by file.
///
/// A handle stops its schedule when dropped, so cancelling is removing the
/// handle from the map. Both completion and file removal go through
/// [`Tickers::cancel`].
pub struct Tickers<H> {
    running: HashMap<FileId, H>,
}

impl<H> Default for Tickers<H> {
    fn default() -> Self {
        Self {
            running: HashMap::new(),
        }
    }
}

impl<H> Tickers<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, id: FileId, handle: H) {
        if self.running.insert(id, handle).is_some() {
            log::warn!("Restarted progress ticker for file {}", id);
        }
    }

    pub fn cancel(&mut self, id: FileId) -> bool {
        self.running.remove(&id).is_some()
    }

    /// Apply the outcome of one tick for `id`: the ticker keeps running while
    /// the file advances and is cancelled once it completes or the file is gone.
    ///
    /// Returns whether the batch changed.
    pub fn settle(&mut self, id: FileId, tick: Option<Tick>) -> bool {
        match tick {
            Some(Tick::Advanced(_)) => true,
            Some(Tick::Complete) => {
                self.cancel(id);
                true
            }
            None => {
                self.cancel(id);
                false
            }
        }
    }

    pub fn cancel_all(&mut self) {
        self.running.clear();
    }

    pub fn is_running(&self, id: FileId) -> bool {
        self.running.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}
