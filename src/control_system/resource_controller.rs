use crate::global_variables::MAX_RESOURCES;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Why an admission request was refused. The caller must not proceed as if
/// the units were debited.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDenied {
    /// More units were requested than the pool currently holds.
    #[error("requested {requested} units, only {available} available")]
    Insufficient { requested: u32, available: u32 },
    /// Granting the request would leave some holder unable to ever finish.
    #[error("granting {requested} units would leave the pool unsafe")]
    Unsafe { requested: u32 },
}

/// Releasing more than a vehicle holds is a contract violation by the
/// caller, reported rather than clamped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("released {requested} units but vehicle holds {held}")]
pub struct InvalidRelease {
    pub requested: u32,
    pub held: u32,
}

#[derive(Debug)]
struct Ledger {
    available: u32,
    allocations: HashMap<u64, u32>,
}

impl Ledger {
    /// Banker-style safety simulation for a tentative grant. The requester
    /// itself is seeded as finishable (its grant is in hand, so it can run
    /// to completion and return its units); every other holder must then be
    /// reclaimable: an allocation is finishable once its size fits in the
    /// simulated free pool, and reclaiming it grows the pool. Iterates to a
    /// fixpoint; safe iff every holder finishes.
    fn is_safe_after_grant(&self, requester: u64) -> bool {
        let mut work = self.available + self.allocations.get(&requester).copied().unwrap_or(0);
        let mut finish: HashMap<u64, bool> = self
            .allocations
            .keys()
            .map(|&id| (id, id == requester))
            .collect();

        let mut progress = true;
        while progress {
            progress = false;
            for (&id, &allocated) in &self.allocations {
                if !finish[&id] && allocated <= work {
                    work += allocated;
                    finish.insert(id, true);
                    progress = true;
                }
            }
        }

        finish.values().all(|&done| done)
    }
}

/// Grants and reclaims units of the shared capacity pool under a
/// deadlock-avoidance discipline. The whole check-then-commit sequence runs
/// under one lock, so concurrent requests serialize and no two of them can
/// commit against the same availability window.
#[derive(Debug)]
pub struct ResourceController {
    ledger: Mutex<Ledger>,
}

impl ResourceController {
    pub fn new() -> Self {
        Self::with_capacity(MAX_RESOURCES)
    }

    pub fn with_capacity(max: u32) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                available: max,
                allocations: HashMap::new(),
            }),
        }
    }

    /// Attempts to grant `amount` units to the vehicle. On any denial the
    /// ledger is left exactly as it was.
    pub fn request(&self, vehicle_id: u64, amount: u32) -> Result<(), AdmissionDenied> {
        let mut ledger = self.ledger.lock().unwrap();

        if amount > ledger.available {
            return Err(AdmissionDenied::Insufficient {
                requested: amount,
                available: ledger.available,
            });
        }

        // Tentative grant, then the safety check; roll back if unsafe.
        ledger.available -= amount;
        *ledger.allocations.entry(vehicle_id).or_insert(0) += amount;

        if ledger.is_safe_after_grant(vehicle_id) {
            Ok(())
        } else {
            ledger.available += amount;
            match ledger.allocations.get_mut(&vehicle_id) {
                Some(held) if *held > amount => *held -= amount,
                _ => {
                    ledger.allocations.remove(&vehicle_id);
                }
            }
            Err(AdmissionDenied::Unsafe { requested: amount })
        }
    }

    /// Returns `amount` units from the vehicle's allocation to the pool.
    pub fn release(&self, vehicle_id: u64, amount: u32) -> Result<(), InvalidRelease> {
        let mut ledger = self.ledger.lock().unwrap();
        let held = ledger.allocations.get(&vehicle_id).copied().unwrap_or(0);
        if amount > held {
            return Err(InvalidRelease {
                requested: amount,
                held,
            });
        }
        if held == amount {
            ledger.allocations.remove(&vehicle_id);
        } else {
            ledger.allocations.insert(vehicle_id, held - amount);
        }
        ledger.available += amount;
        Ok(())
    }

    pub fn available(&self) -> u32 {
        self.ledger.lock().unwrap().available
    }

    pub fn allocated(&self, vehicle_id: u64) -> u32 {
        self.ledger
            .lock()
            .unwrap()
            .allocations
            .get(&vehicle_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn allocated_total(&self) -> u32 {
        self.ledger.lock().unwrap().allocations.values().sum()
    }
}

impl Default for ResourceController {
    fn default() -> Self {
        Self::new()
    }
}
