// simulation.rs
use crate::control_system::resource_controller::ResourceController;
use crate::control_system::traffic_light_controller::TrafficLightController;
use crate::enforcement::challan_ledger::ChallanLedger;
use crate::global_variables::TICK_INTERVAL_MS;
use crate::monitoring::analytics::Analytics;
use crate::shared_data::{current_timestamp, FrameSnapshot, LaneView, LightView, VehicleView};
use crate::simulation_engine::arrivals::VehicleArrivalGenerator;
use crate::simulation_engine::lanes::LaneGrid;
use crate::simulation_engine::stepper::IntersectionStepper;
use crate::simulation_engine::vehicles::{Direction, LaneSide};
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Every shared handle a worker task needs, passed explicitly. No ambient
/// globals; each structure carries its own synchronization.
pub struct SimulationContext {
    pub lanes: Arc<LaneGrid>,
    pub lights: Arc<TrafficLightController>,
    pub resources: Arc<ResourceController>,
    pub challans: Arc<ChallanLedger>,
    pub analytics: Arc<Analytics>,
    pub next_vehicle_id: Arc<AtomicU64>,
    pub paused: Arc<AtomicBool>,
    pub shutdown: Arc<AtomicBool>,
}

impl SimulationContext {
    pub fn new() -> Self {
        let analytics = Arc::new(Analytics::new());
        Self {
            lanes: Arc::new(LaneGrid::new()),
            lights: Arc::new(TrafficLightController::new()),
            resources: Arc::new(ResourceController::new()),
            challans: Arc::new(ChallanLedger::new(Arc::clone(&analytics))),
            analytics,
            next_vehicle_id: Arc::new(AtomicU64::new(1)),
            paused: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the read-only frame the renderer consumes: every visible
/// vehicle per lane plus the light color per direction.
pub fn collect_frame_snapshot(ctx: &SimulationContext) -> FrameSnapshot {
    let states = ctx.lights.light_states();
    let flags = ctx.lights.emergency_flags();
    let lights = Direction::ALL
        .iter()
        .map(|&direction| LightView {
            direction,
            state: states[direction.index()],
            emergency_priority: flags[direction.index()],
        })
        .collect();

    let mut lanes = Vec::new();
    for direction in Direction::ALL {
        for side in LaneSide::ALL {
            let queue = ctx.lanes.lane(direction, side);
            let vehicles = queue
                .iter()
                .map(|v| VehicleView {
                    id: v.id,
                    kind: v.kind,
                    x: v.x,
                    y: v.y,
                    breakdown: v.breakdown,
                })
                .collect();
            lanes.push(LaneView {
                direction,
                side,
                vehicles,
            });
        }
    }

    FrameSnapshot {
        timestamp: current_timestamp(),
        lights,
        lanes,
    }
}

/// Spawns the light controller and the four arrival generators, then drives
/// the tick loop until shutdown. Pausing stops vehicle advancement only;
/// arrivals and the light cycle keep running. Returns once every worker
/// task has observed the shutdown flag and exited.
pub async fn run_simulation(ctx: Arc<SimulationContext>) {
    let light_task = tokio::spawn(
        Arc::clone(&ctx.lights).run(Arc::clone(&ctx.lanes), Arc::clone(&ctx.shutdown)),
    );

    let mut generator_tasks = Vec::new();
    for direction in Direction::ALL {
        let generator = VehicleArrivalGenerator::new(
            direction,
            Arc::clone(&ctx.lanes),
            Arc::clone(&ctx.resources),
            Arc::clone(&ctx.analytics),
            Arc::clone(&ctx.next_vehicle_id),
        );
        generator_tasks.push(tokio::spawn(generator.run(Arc::clone(&ctx.shutdown))));
    }

    let stepper = IntersectionStepper::new(
        Arc::clone(&ctx.lanes),
        Arc::clone(&ctx.lights),
        Arc::clone(&ctx.resources),
        Arc::clone(&ctx.challans),
        Arc::clone(&ctx.analytics),
    );

    while !ctx.shutdown.load(Ordering::Relaxed) {
        if !ctx.paused.load(Ordering::Relaxed) {
            stepper.step();
        }
        sleep(Duration::from_millis(TICK_INTERVAL_MS)).await;
    }

    let _ = light_task.await;
    for task in generator_tasks {
        let _ = task.await;
    }
    debug!("simulation tasks joined");
}
