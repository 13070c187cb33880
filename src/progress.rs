use log::info;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Observer notified while the pipeline runs.
///
/// `entity_visited` is called once per entity read by the collector,
/// `key_reduced` once per postcode reduced (from the reducer's worker threads).
pub trait ProgressObserver: Sync {
    fn entity_visited(&self) {}

    fn reduction_started(&self, _nb_postcodes: usize) {}

    fn key_reduced(&self) {}
}

/// Ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Counts the progress and reports it in the logs
#[derive(Debug)]
pub struct LogProgress {
    entities: AtomicU64,
    reduced: AtomicUsize,
    nb_postcodes: AtomicUsize,
    entity_step: u64,
}

impl Default for LogProgress {
    fn default() -> Self {
        LogProgress::new(1_000_000)
    }
}

impl LogProgress {
    pub fn new(entity_step: u64) -> Self {
        LogProgress {
            entities: AtomicU64::new(0),
            reduced: AtomicUsize::new(0),
            nb_postcodes: AtomicUsize::new(0),
            entity_step: entity_step.max(1),
        }
    }

    pub fn entities(&self) -> u64 {
        self.entities.load(Ordering::Relaxed)
    }

    pub fn reduced(&self) -> usize {
        self.reduced.load(Ordering::Relaxed)
    }
}

impl ProgressObserver for LogProgress {
    fn entity_visited(&self) {
        let seen = self.entities.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % self.entity_step == 0 {
            info!("extracting postcodes: {} entities read", seen);
        }
    }

    fn reduction_started(&self, nb_postcodes: usize) {
        self.nb_postcodes.store(nb_postcodes, Ordering::Relaxed);
        info!("generating positions for {} postcodes", nb_postcodes);
    }

    fn key_reduced(&self) {
        let done = self.reduced.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.nb_postcodes.load(Ordering::Relaxed);
        // about every 10%
        let step = (total / 10).max(1);
        if done % step == 0 || done == total {
            info!("generating positions: {}/{} postcodes", done, total);
        }
    }
}
