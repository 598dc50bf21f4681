use crate::simulation_engine::vehicles::VehicleKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Live counters for the running simulation. Atomic so the generators, the
/// stepper, and the challan ledger can bump them without sharing a lock.
#[derive(Debug, Default)]
pub struct Analytics {
    total_vehicles: AtomicI64,
    emergency_vehicles: AtomicU64,
    challans_issued: AtomicU64,
    /// Whole currency units; each fine is truncated as it is added.
    total_fine_amount: AtomicU64,
    breakdowns: AtomicU64,
}

/// Immutable counter snapshot handed to external consumers on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub total_vehicles: i64,
    pub emergency_vehicles: u64,
    pub challans_issued: u64,
    pub total_fine_amount: u64,
    pub breakdowns: u64,
}

#[derive(Serialize)]
struct CounterRecord<'a> {
    counter: &'a str,
    value: i64,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_admission(&self, kind: VehicleKind) {
        self.total_vehicles.fetch_add(1, Ordering::Relaxed);
        if kind == VehicleKind::Emergency {
            self.emergency_vehicles.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Forced overflow eviction is the only path that lowers the vehicle
    /// count.
    pub fn record_eviction(&self) {
        self.total_vehicles.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_challan(&self, fine: f64) {
        self.challans_issued.fetch_add(1, Ordering::Relaxed);
        self.total_fine_amount
            .fetch_add(fine.max(0.0) as u64, Ordering::Relaxed);
    }

    pub fn record_breakdown(&self) {
        self.breakdowns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total_vehicles: self.total_vehicles.load(Ordering::Relaxed),
            emergency_vehicles: self.emergency_vehicles.load(Ordering::Relaxed),
            challans_issued: self.challans_issued.load(Ordering::Relaxed),
            total_fine_amount: self.total_fine_amount.load(Ordering::Relaxed),
            breakdowns: self.breakdowns.load(Ordering::Relaxed),
        }
    }

    /// Writes the flat counter summary, one `counter,value` row each.
    /// Called once at shutdown.
    pub fn save_summary(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let snapshot = self.snapshot();
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for (counter, value) in [
            ("total_vehicles", snapshot.total_vehicles),
            ("emergency_vehicles", snapshot.emergency_vehicles as i64),
            ("challans_issued", snapshot.challans_issued as i64),
            ("total_fine_amount", snapshot.total_fine_amount as i64),
            ("breakdowns", snapshot.breakdowns as i64),
        ] {
            wtr.serialize(CounterRecord { counter, value })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
