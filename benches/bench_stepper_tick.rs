// benches/bench_stepper_tick.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smart_intersection::simulation_engine::simulation::SimulationContext;
use smart_intersection::simulation_engine::stepper::IntersectionStepper;
use smart_intersection::simulation_engine::vehicles::{Direction, LaneSide, Vehicle, VehicleKind};
use std::sync::Arc;
use std::time::Duration;

// A full tick over all eight lanes with queues at capacity. Speeds of zero
// keep every vehicle in bounds so the population is stable across ticks.
fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("stepper_tick");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));

    group.bench_function("eight_full_lanes", |b| {
        let ctx = SimulationContext::new();
        ctx.lights.begin_cycle(&ctx.lanes);
        let mut id = 0u64;
        for direction in Direction::ALL {
            for side in LaneSide::ALL {
                for _ in 0..10 {
                    id += 1;
                    ctx.lanes.lane(direction, side).push(Vehicle::new(
                        id,
                        VehicleKind::Heavy,
                        direction,
                        side,
                        0.0,
                        false,
                    ));
                }
            }
        }
        let stepper = IntersectionStepper::new(
            Arc::clone(&ctx.lanes),
            Arc::clone(&ctx.lights),
            Arc::clone(&ctx.resources),
            Arc::clone(&ctx.challans),
            Arc::clone(&ctx.analytics),
        );
        b.iter(|| {
            stepper.step();
            black_box(ctx.lanes.total_queued());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_full_tick);
criterion_main!(benches);
