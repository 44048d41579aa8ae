//! Redraw benchmarks for travel-map-lib
//!
//! Run with: cargo bench --package travel-map-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geo::Coord;
use travel_map_lib::{Map, MapLayer, TrackPoint, TravelRoute, TravelRouteOptions, Viewport};

const MODES: [&str; 5] = ["car", "train", "flight", "bus", "walking"];

/// A trip wandering around Europe, switching transport every `run_length` points
fn generate_trip(num_points: usize, run_length: usize) -> Vec<TrackPoint> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lat = 40.0 + t * 15.0 + (t * 50.0).sin() * 0.5;
            let lon = -5.0 + t * 25.0 + (t * 30.0).cos() * 0.5;
            TrackPoint::new(lat, lon, Some(MODES[(i / run_length) % MODES.len()]))
        })
        .collect()
}

fn europe_map() -> Map {
    Map::new(Viewport::new(
        Coord { x: 8.0, y: 48.0 },
        5.0,
        Coord { x: 1920.0, y: 1080.0 },
    ))
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for num_points in [1_000, 10_000, 100_000] {
        let points = generate_trip(num_points, 100);
        group.throughput(Throughput::Elements(num_points as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_points), &points, |b, points| {
            b.iter(|| TravelRoute::new(points, &[], &TravelRouteOptions::default()));
        });
    }

    group.finish();
}

fn bench_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw");

    let points = generate_trip(50_000, 100);
    let mut map = europe_map();
    let mut route = TravelRoute::new(&points, &[], &TravelRouteOptions::default());
    route.on_attach(&mut map);

    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("static_view_50k", |b| {
        b.iter(|| route.on_redraw(&mut map));
    });

    // Alternating zoom flips glyph visibility on most segments
    let mut zoom_in = false;
    group.bench_function("zoom_toggle_50k", |b| {
        b.iter(|| {
            zoom_in = !zoom_in;
            map.set_view(Coord { x: 8.0, y: 48.0 }, if zoom_in { 7.0 } else { 3.0 });
            route.on_redraw(&mut map);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_redraw);
criterion_main!(benches);
