use std::hint::black_box;
use std::time::Instant;

use fractaline_common::{Rgba, gradient_position};
use fractaline_gradient::{ColorStop, Gradient, InterpolationSpace};

fn make_gradient(stop_count: usize, space: InterpolationSpace) -> Gradient {
    let mut gradient = Gradient::with_options(space, false);
    let stops = (0..stop_count).map(|i| {
        let t = gradient_position(i, stop_count);
        ColorStop::new(Rgba::new(t, 1.0 - t, (t * 7.0).fract(), 1.0), t)
    });
    gradient
        .extend_stops(stops)
        .expect("benchmark stops are valid");
    gradient
}

fn bench_resolve_many(stop_count: usize, point_count: usize, space: InterpolationSpace) {
    let gradient = make_gradient(stop_count, space);
    let positions: Vec<f32> = (0..point_count)
        .map(|i| gradient_position(i, point_count))
        .collect();
    let iterations = 10;

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(gradient.resolve_many(black_box(&positions)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  resolve_many ({space:?}, {stop_count} stops, {point_count} points): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_pack(stop_count: usize, iterations: usize) {
    let gradient = make_gradient(stop_count, InterpolationSpace::Lab);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(black_box(&gradient).pack());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  pack ({stop_count} stops, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Gradient Resolve Benchmarks ===\n");

    println!("RGB resolve_many:");
    bench_resolve_many(2, 1_000_000, InterpolationSpace::Rgb);
    bench_resolve_many(16, 1_000_000, InterpolationSpace::Rgb);
    bench_resolve_many(64, 1_000_000, InterpolationSpace::Rgb);

    println!("\nLab resolve_many:");
    bench_resolve_many(2, 1_000_000, InterpolationSpace::Lab);
    bench_resolve_many(64, 1_000_000, InterpolationSpace::Lab);

    println!("\nStop packing:");
    bench_pack(8, 10_000);
    bench_pack(64, 10_000);

    println!("\n=== Done ===");
}
