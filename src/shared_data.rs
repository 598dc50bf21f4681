// src/shared_data.rs

use crate::control_system::traffic_light_controller::LightState;
use crate::simulation_engine::vehicles::{Direction, LaneSide, VehicleKind};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{sleep, Duration};

pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Sleeps for `duration` in short slices, returning `false` as soon as the
/// shutdown flag is observed. Tasks call this instead of a bare sleep so a
/// stop request is seen at a sleep boundary, never mid-critical-section.
pub async fn wait_or_shutdown(duration: Duration, shutdown: &AtomicBool) -> bool {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = duration;
    while !remaining.is_zero() {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(SLICE);
        sleep(step).await;
        remaining -= step;
    }
    !shutdown.load(Ordering::Relaxed)
}

/// One vehicle as the renderer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleView {
    pub id: u64,
    pub kind: VehicleKind,
    pub x: f64,
    pub y: f64,
    pub breakdown: bool,
}

/// The contents of one lane queue, in FIFO order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneView {
    pub direction: Direction,
    pub side: LaneSide,
    pub vehicles: Vec<VehicleView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightView {
    pub direction: Direction,
    pub state: LightState,
    pub emergency_priority: bool,
}

/// Read-only frame handed to the renderer. No mutation path leads back into
/// the core from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub timestamp: u64,
    pub lights: Vec<LightView>,
    pub lanes: Vec<LaneView>,
}
