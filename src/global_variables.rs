// Scene geometry (pixels). The renderer draws an 800x600 intersection; the
// core only needs these to place vehicles and decide when they leave view.
pub const WINDOW_WIDTH: f64 = 800.0;
pub const WINDOW_HEIGHT: f64 = 600.0;
pub const LANE_WIDTH: f64 = 100.0;
pub const VEHICLE_SIZE: f64 = 15.0;

// Light cycle timing (seconds).
pub const GREEN_LIGHT_SECS: u64 = 10;
pub const YELLOW_LIGHT_SECS: u64 = 3;
pub const EMERGENCY_GREEN_SECS: u64 = 2;

// Enforcement.
pub const SPEED_LIMIT: f64 = 10.0;
pub const FINE_RATE: f64 = 1.17;
pub const CHALLAN_DUE_SECS: u64 = 7 * 24 * 60 * 60;

// Queueing and admission.
pub const MAX_LANE_CAPACITY: usize = 10;
pub const MAX_RESOURCES: u32 = 10;
/// Units of the shared pool every vehicle claims on entry and returns on exit.
pub const ADMISSION_UNITS: u32 = 1;

// Arrivals.
pub const BREAKDOWN_PROBABILITY: f64 = 0.05;
pub const MIN_ARRIVAL_SECS: u64 = 1;
pub const MAX_ARRIVAL_SECS: u64 = 3;

// Stepper pacing (~20 ticks per second).
pub const TICK_INTERVAL_MS: u64 = 50;
