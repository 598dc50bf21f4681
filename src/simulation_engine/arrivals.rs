use crate::control_system::resource_controller::ResourceController;
use crate::global_variables::{
    ADMISSION_UNITS, BREAKDOWN_PROBABILITY, MAX_ARRIVAL_SECS, MIN_ARRIVAL_SECS, SPEED_LIMIT,
};
use crate::monitoring::analytics::Analytics;
use crate::shared_data::wait_or_shutdown;
use crate::simulation_engine::lanes::LaneGrid;
use crate::simulation_engine::vehicles::{Direction, LaneSide, Vehicle, VehicleKind};
use log::{info, warn};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

/// Feeds one approach of the intersection with randomly synthesized traffic.
/// Four of these run as independent tasks, one per direction.
pub struct VehicleArrivalGenerator {
    direction: Direction,
    lanes: Arc<LaneGrid>,
    resources: Arc<ResourceController>,
    analytics: Arc<Analytics>,
    next_vehicle_id: Arc<AtomicU64>,
}

impl VehicleArrivalGenerator {
    pub fn new(
        direction: Direction,
        lanes: Arc<LaneGrid>,
        resources: Arc<ResourceController>,
        analytics: Arc<Analytics>,
        next_vehicle_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            direction,
            lanes,
            resources,
            analytics,
            next_vehicle_id,
        }
    }

    /// Synthesizes one vehicle for the given side and tries to admit it.
    /// Returns the admitted vehicle's id, or None when the capacity pool
    /// refused it (backpressure, retried implicitly on the next emission).
    pub fn spawn_vehicle(&self, side: LaneSide) -> Option<u64> {
        let mut rng = rand::rng();

        // Class mix: 10% emergency, 20% heavy, 70% regular.
        let rand_val: f64 = rng.random_range(0.0..1.0);
        let kind = if rand_val < 0.10 {
            VehicleKind::Emergency
        } else if rand_val < 0.30 {
            VehicleKind::Heavy
        } else {
            VehicleKind::Regular
        };

        let speed = match kind {
            VehicleKind::Regular => rng.random_range(SPEED_LIMIT..SPEED_LIMIT + 5.0),
            VehicleKind::Heavy => rng.random_range(SPEED_LIMIT - 2.0..SPEED_LIMIT + 1.0),
            VehicleKind::Emergency => rng.random_range(SPEED_LIMIT + 5.0..SPEED_LIMIT + 10.0),
        };

        let breakdown = rng.random_bool(BREAKDOWN_PROBABILITY);
        let id = self.next_vehicle_id.fetch_add(1, Ordering::Relaxed);
        let vehicle = Vehicle::new(id, kind, self.direction, side, speed, breakdown);

        // Every vehicle claims one unit of the shared pool before it may
        // enter; a denial means the vehicle is simply not admitted.
        if let Err(denied) = self.resources.request(id, ADMISSION_UNITS) {
            info!(
                "vehicle {} not admitted to {:?}/{:?}: {}",
                vehicle.plate(),
                self.direction,
                side,
                denied
            );
            return None;
        }

        self.analytics.record_admission(kind);
        info!(
            "vehicle {} ({:?}) arrived at {:?}/{:?}, speed {:.1}",
            vehicle.plate(),
            kind,
            self.direction,
            side,
            speed
        );

        let evicted = self.lanes.lane(self.direction, side).push(vehicle);
        if let Some(evicted) = evicted {
            warn!(
                "queue overflow on {:?}/{:?}: vehicle {} evicted",
                self.direction,
                side,
                evicted.plate()
            );
            self.analytics.record_eviction();
            if let Err(err) = self.resources.release(evicted.id, ADMISSION_UNITS) {
                warn!(
                    "resource release for evicted {} failed: {}",
                    evicted.plate(),
                    err
                );
            }
        }
        Some(id)
    }

    /// Emission loop: one vehicle per side every 1-3 seconds until shutdown.
    pub async fn run(self, shutdown: Arc<AtomicBool>) {
        loop {
            let pause = {
                let mut rng = rand::rng();
                rng.random_range(MIN_ARRIVAL_SECS..=MAX_ARRIVAL_SECS)
            };
            if !wait_or_shutdown(Duration::from_secs(pause), &shutdown).await {
                break;
            }
            for side in LaneSide::ALL {
                self.spawn_vehicle(side);
            }
        }
        info!("arrival generator for {:?} stopped", self.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global_variables::MAX_RESOURCES;

    fn generator(resources: Arc<ResourceController>) -> (VehicleArrivalGenerator, Arc<LaneGrid>, Arc<Analytics>) {
        let lanes = Arc::new(LaneGrid::new());
        let analytics = Arc::new(Analytics::new());
        let generator = VehicleArrivalGenerator::new(
            Direction::West,
            Arc::clone(&lanes),
            Arc::clone(&resources),
            Arc::clone(&analytics),
            Arc::new(AtomicU64::new(1)),
        );
        (generator, lanes, analytics)
    }

    #[test]
    fn admitted_vehicle_is_queued_counted_and_allocated() {
        let resources = Arc::new(ResourceController::new());
        let (generator, lanes, analytics) = generator(Arc::clone(&resources));

        let id = generator.spawn_vehicle(LaneSide::Incoming).expect("admission");
        assert_eq!(lanes.lane(Direction::West, LaneSide::Incoming).len(), 1);
        assert_eq!(analytics.snapshot().total_vehicles, 1);
        assert_eq!(resources.allocated(id), ADMISSION_UNITS);
        assert_eq!(resources.available(), MAX_RESOURCES - ADMISSION_UNITS);
    }

    #[test]
    fn denied_admission_leaves_no_trace() {
        let resources = Arc::new(ResourceController::with_capacity(0));
        let (generator, lanes, analytics) = generator(resources);

        assert!(generator.spawn_vehicle(LaneSide::Incoming).is_none());
        assert!(lanes.lane(Direction::West, LaneSide::Incoming).is_empty());
        assert_eq!(analytics.snapshot().total_vehicles, 0);
    }

    #[test]
    fn speeds_stay_inside_the_class_bands() {
        let resources = Arc::new(ResourceController::with_capacity(1_000));
        let (generator, lanes, _) = generator(resources);

        for _ in 0..40 {
            generator.spawn_vehicle(LaneSide::Outgoing);
        }
        let queue = lanes.lane(Direction::West, LaneSide::Outgoing);
        for vehicle in queue.iter() {
            match vehicle.kind {
                VehicleKind::Regular => {
                    assert!(vehicle.speed >= SPEED_LIMIT && vehicle.speed < SPEED_LIMIT + 5.0)
                }
                VehicleKind::Heavy => {
                    assert!(vehicle.speed >= SPEED_LIMIT - 2.0 && vehicle.speed < SPEED_LIMIT + 1.0)
                }
                VehicleKind::Emergency => {
                    assert!(vehicle.speed >= SPEED_LIMIT + 5.0 && vehicle.speed < SPEED_LIMIT + 10.0)
                }
            }
        }
    }
}
