// benches/bench_safety_check.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use smart_intersection::control_system::resource_controller::ResourceController;
use std::time::Duration;

// A request/release pair exercises the whole admission path: the tentative
// grant, the safety fixpoint over every outstanding holder, and the commit.
fn bench_request_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_safety_check");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &holders in [8, 64, 256].iter() {
        group.bench_function(format!("holders_{}", holders), |b| {
            let pool = ResourceController::with_capacity(holders as u32 + 1);
            for id in 0..holders {
                pool.request(id as u64, 1).expect("seed allocation");
            }
            let probe_id = holders as u64 + 1;
            b.iter(|| {
                pool.request(probe_id, 1).expect("one unit remains");
                pool.release(probe_id, 1).expect("probe holds one unit");
                black_box(pool.available());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_request_release);
criterion_main!(benches);
