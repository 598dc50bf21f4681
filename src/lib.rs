//! Core of the smart traffic intersection simulation: per-lane bounded
//! queues, the traffic light cycle with emergency preemption, Banker-style
//! resource admission, speeding enforcement, and the per-tick stepper that
//! ties them together. Rendering, billing, and analytics consumers talk to
//! this crate only through the snapshot and record types it exposes.

pub mod control_system;
pub mod enforcement;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;
