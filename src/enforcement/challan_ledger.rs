use crate::global_variables::{CHALLAN_DUE_SECS, FINE_RATE, SPEED_LIMIT};
use crate::monitoring::analytics::Analytics;
use crate::simulation_engine::vehicles::Vehicle;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// A speeding citation. Plain data; the billing portal reads and settles it
/// through the ledger, nothing else touches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challan {
    pub challan_id: String,
    pub vehicle_id: u64,
    pub amount: f64,
    pub issued_at: u64,
    pub due_at: u64,
    pub paid: bool,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaymentError {
    #[error("no challan found with id {0}")]
    NotFound(String),
    #[error("insufficient payment: offered {offered:.2}, fine is {required:.2}")]
    Insufficient { offered: f64, required: f64 },
}

#[derive(Debug, Default)]
struct LedgerState {
    by_vehicle: HashMap<u64, Challan>,
    next_seq: u64,
}

/// Records speeding violations keyed by vehicle id. Issuance is idempotent
/// per vehicle and emergency vehicles are exempt.
pub struct ChallanLedger {
    state: Mutex<LedgerState>,
    analytics: Arc<Analytics>,
}

impl ChallanLedger {
    pub fn new(analytics: Arc<Analytics>) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            analytics,
        }
    }

    /// Issues a citation if the vehicle is over the limit and eligible.
    /// Re-triggering an already-cited vehicle is a no-op; the fine is a
    /// linear function of the overspeed, floored at zero.
    pub fn issue_if_speeding(&self, vehicle: &mut Vehicle, now: u64) -> Option<Challan> {
        if vehicle.challan_issued || vehicle.is_emergency() || !vehicle.is_speeding() {
            return None;
        }

        let mut state = self.state.lock().unwrap();
        if state.by_vehicle.contains_key(&vehicle.id) {
            // The stable id is authoritative; the flag on this copy lagged.
            vehicle.challan_issued = true;
            return None;
        }

        vehicle.challan_issued = true;
        let amount = (FINE_RATE * ((vehicle.speed - SPEED_LIMIT) * 100.0)).max(0.0);
        state.next_seq += 1;
        let challan = Challan {
            challan_id: format!("CH{:05}", state.next_seq),
            vehicle_id: vehicle.id,
            amount,
            issued_at: now,
            due_at: now + CHALLAN_DUE_SECS,
            paid: false,
        };
        state.by_vehicle.insert(vehicle.id, challan.clone());
        drop(state);

        self.analytics.record_challan(amount);
        info!(
            "challan {} issued to {}: fine {:.2}",
            challan.challan_id,
            vehicle.plate(),
            amount
        );
        Some(challan)
    }

    /// Portal query: the challan on record for a vehicle, if any.
    pub fn find_by_vehicle(&self, vehicle_id: u64) -> Option<Challan> {
        self.state
            .lock()
            .unwrap()
            .by_vehicle
            .get(&vehicle_id)
            .cloned()
    }

    /// Settles a challan in full. Underpayment leaves the record untouched;
    /// partial payments are not tracked.
    pub fn pay(&self, challan_id: &str, amount: f64) -> Result<Challan, PaymentError> {
        let mut state = self.state.lock().unwrap();
        let challan = state
            .by_vehicle
            .values_mut()
            .find(|c| c.challan_id == challan_id)
            .ok_or_else(|| PaymentError::NotFound(challan_id.to_string()))?;
        if amount < challan.amount {
            return Err(PaymentError::Insufficient {
                offered: amount,
                required: challan.amount,
            });
        }
        challan.paid = true;
        Ok(challan.clone())
    }

    pub fn issued_count(&self) -> usize {
        self.state.lock().unwrap().by_vehicle.len()
    }
}
