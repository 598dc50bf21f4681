use crate::control_system::resource_controller::ResourceController;
use crate::control_system::traffic_light_controller::TrafficLightController;
use crate::enforcement::challan_ledger::ChallanLedger;
use crate::global_variables::ADMISSION_UNITS;
use crate::monitoring::analytics::Analytics;
use crate::shared_data::current_timestamp;
use crate::simulation_engine::lanes::LaneGrid;
use crate::simulation_engine::vehicles::{Direction, LaneSide};
use log::{info, warn};
use std::sync::Arc;

/// Advances every queued vehicle once per tick, honoring the light state and
/// settling challans and resource releases as side effects.
pub struct IntersectionStepper {
    lanes: Arc<LaneGrid>,
    lights: Arc<TrafficLightController>,
    resources: Arc<ResourceController>,
    challans: Arc<ChallanLedger>,
    analytics: Arc<Analytics>,
}

impl IntersectionStepper {
    pub fn new(
        lanes: Arc<LaneGrid>,
        lights: Arc<TrafficLightController>,
        resources: Arc<ResourceController>,
        challans: Arc<ChallanLedger>,
        analytics: Arc<Analytics>,
    ) -> Self {
        Self {
            lanes,
            lights,
            resources,
            challans,
            analytics,
        }
    }

    pub fn step(&self) {
        for direction in Direction::ALL {
            self.step_direction(direction);
        }
    }

    fn step_direction(&self, direction: Direction) {
        let green = self.lights.is_green(direction);
        let now = current_timestamp();
        for side in LaneSide::ALL {
            let mut queue = self.lanes.lane(direction, side);
            // Drain exactly the vehicles present at the start of the tick;
            // re-enqueued ones are not processed again until the next tick.
            let queued = queue.len();
            for _ in 0..queued {
                let Some(mut vehicle) = queue.pop_front() else {
                    break;
                };

                if green {
                    vehicle.advance();
                    if vehicle.is_speeding() && !vehicle.is_emergency() {
                        self.challans.issue_if_speeding(&mut vehicle, now);
                    }
                }

                if vehicle.breakdown && !vehicle.breakdown_reported {
                    vehicle.breakdown_reported = true;
                    self.analytics.record_breakdown();
                    warn!(
                        "vehicle {} broke down in {:?}/{:?}",
                        vehicle.plate(),
                        direction,
                        side
                    );
                }

                if vehicle.in_bounds() {
                    // Back to the tail unmoved or advanced; cannot overflow
                    // because only vehicles popped this tick return.
                    queue.push(vehicle);
                } else {
                    info!("vehicle {} exited via {:?}/{:?}", vehicle.plate(), direction, side);
                    if let Err(err) = self.resources.release(vehicle.id, ADMISSION_UNITS) {
                        warn!("resource release for {} failed: {}", vehicle.plate(), err);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global_variables::{LANE_WIDTH, WINDOW_HEIGHT};
    use crate::simulation_engine::vehicles::{Vehicle, VehicleKind};

    struct Fixture {
        lanes: Arc<LaneGrid>,
        lights: Arc<TrafficLightController>,
        resources: Arc<ResourceController>,
        challans: Arc<ChallanLedger>,
        analytics: Arc<Analytics>,
        stepper: IntersectionStepper,
    }

    fn fixture() -> Fixture {
        let lanes = Arc::new(LaneGrid::new());
        let lights = Arc::new(TrafficLightController::new());
        let resources = Arc::new(ResourceController::new());
        let analytics = Arc::new(Analytics::new());
        let challans = Arc::new(ChallanLedger::new(Arc::clone(&analytics)));
        let stepper = IntersectionStepper::new(
            Arc::clone(&lanes),
            Arc::clone(&lights),
            Arc::clone(&resources),
            Arc::clone(&challans),
            Arc::clone(&analytics),
        );
        Fixture {
            lanes,
            lights,
            resources,
            challans,
            analytics,
            stepper,
        }
    }

    fn regular(id: u64, speed: f64) -> Vehicle {
        Vehicle::new(id, VehicleKind::Regular, Direction::North, LaneSide::Incoming, speed, false)
    }

    #[test]
    fn red_light_requeues_vehicles_unmoved_in_order() {
        let f = fixture();
        for id in 1..=3 {
            f.lanes
                .lane(Direction::North, LaneSide::Incoming)
                .push(regular(id, 12.0));
        }
        let y_before: Vec<f64> = f
            .lanes
            .lane(Direction::North, LaneSide::Incoming)
            .iter()
            .map(|v| v.y)
            .collect();

        // Lights start all red.
        f.stepper.step();

        let queue = f.lanes.lane(Direction::North, LaneSide::Incoming);
        let ids: Vec<u64> = queue.iter().map(|v| v.id).collect();
        let y_after: Vec<f64> = queue.iter().map(|v| v.y).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(y_before, y_after);
        assert_eq!(f.challans.issued_count(), 0);
    }

    #[test]
    fn green_light_advances_and_cites_speeders() {
        let f = fixture();
        f.lights.begin_cycle(&f.lanes); // grants North
        f.lanes
            .lane(Direction::North, LaneSide::Incoming)
            .push(regular(1, 14.0));

        f.stepper.step();

        let queue = f.lanes.lane(Direction::North, LaneSide::Incoming);
        let vehicle = queue.peek_front().unwrap();
        assert_eq!(vehicle.y, -15.0 + 14.0);
        let challan = f.challans.find_by_vehicle(1).expect("speeder must be cited");
        assert!((challan.amount - 468.0).abs() < 1e-9);
    }

    #[test]
    fn exit_releases_the_admission_units() {
        let f = fixture();
        f.lights.begin_cycle(&f.lanes);
        f.resources.request(1, ADMISSION_UNITS).unwrap();
        let mut vehicle = regular(1, 14.0);
        vehicle.y = WINDOW_HEIGHT / 2.0 + LANE_WIDTH - 1.0;
        f.lanes
            .lane(Direction::North, LaneSide::Incoming)
            .push(vehicle);

        f.stepper.step();

        assert!(f.lanes.lane(Direction::North, LaneSide::Incoming).is_empty());
        assert_eq!(f.resources.available(), crate::global_variables::MAX_RESOURCES);
        assert_eq!(f.resources.allocated(1), 0);
    }

    #[test]
    fn breakdown_is_reported_exactly_once() {
        let f = fixture();
        let mut vehicle = regular(1, 9.0);
        vehicle.breakdown = true;
        f.lanes
            .lane(Direction::North, LaneSide::Incoming)
            .push(vehicle);

        f.stepper.step();
        f.stepper.step();
        f.stepper.step();

        assert_eq!(f.analytics.snapshot().breakdowns, 1);
        let queue = f.lanes.lane(Direction::North, LaneSide::Incoming);
        assert!(queue.peek_front().unwrap().breakdown);
    }

    #[test]
    fn vehicles_requeued_this_tick_are_not_reprocessed() {
        let f = fixture();
        f.lights.begin_cycle(&f.lanes);
        f.lanes
            .lane(Direction::North, LaneSide::Incoming)
            .push(regular(1, 6.0));

        f.stepper.step();

        let queue = f.lanes.lane(Direction::North, LaneSide::Incoming);
        // Exactly one advancement per tick, not a loop until exit.
        assert_eq!(queue.peek_front().unwrap().y, -15.0 + 6.0);
    }
}
