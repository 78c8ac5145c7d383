use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sf_input::{
    shared, BodyPart, EventCategory, InputCoordinator, Pose, SimulatedProvider, TrackingFrame,
    Vec3,
};

fn frame(t: f32) -> TrackingFrame {
    BodyPart::ALL.iter().fold(TrackingFrame::default(), |frame, &part| {
        frame.with(part, Pose::at(Vec3::new(t, 1.0, -t)))
    })
}

fn bench_tracking_relay(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking_relay");

    for &listeners in &[1usize, 8, 64] {
        let mut coordinator = InputCoordinator::new();
        let camera = shared(SimulatedProvider::new("Camera"));
        coordinator.register_provider(camera.clone()).unwrap();
        for _ in 0..listeners {
            coordinator
                .events()
                .subscribe(EventCategory::Tracking, |event| {
                    black_box(event);
                });
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(listeners),
            &listeners,
            |b, _| {
                let mut t = 0.0f32;
                b.iter(|| {
                    t += 0.01;
                    camera.lock().push_frame(frame(t));
                    coordinator.update(Duration::from_millis(16));
                })
            },
        );
    }
    group.finish();
}

fn bench_inactive_filtering(c: &mut Criterion) {
    let mut coordinator = InputCoordinator::new();
    coordinator.set_priority_order(vec!["gamepad".to_string()]);

    let keyboard = shared(SimulatedProvider::new("Keyboard"));
    let gamepad = shared(SimulatedProvider::new("Gamepad"));
    coordinator.register_provider(keyboard.clone()).unwrap();
    coordinator.register_provider(gamepad).unwrap();
    coordinator
        .events()
        .subscribe_all(|event| {
            black_box(event);
        });

    c.bench_function("inactive_provider_event", |b| {
        b.iter(|| {
            let guard = keyboard.lock();
            guard.events().emit_tracking(frame(black_box(0.5)))
        })
    });
}

criterion_group!(benches, bench_tracking_relay, bench_inactive_filtering);
criterion_main!(benches);
