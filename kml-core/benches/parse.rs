//! Benchmarks for KML geometry parsing.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kml_core::scanner::Scanner;
use kml_core::tree::Document;

/// Closed ring of `n` vertices around the origin.
fn ring_coordinates(n: usize, offset: f64) -> String {
    let mut out = String::new();
    for i in 0..n {
        let angle = (i as f64) * std::f64::consts::TAU / (n as f64);
        out.push_str(&format!("{:.6},{:.6},0 ", offset + angle.cos(), offset + angle.sin()));
    }
    out.push_str(&format!("{:.6},{:.6},0", offset + 1.0, offset));
    out
}

fn polygon(vertices: usize, offset: f64) -> String {
    format!(
        "<Polygon><outerBoundaryIs><LinearRing><coordinates>{}</coordinates></LinearRing></outerBoundaryIs></Polygon>",
        ring_coordinates(vertices, offset)
    )
}

fn multi_polygon(count: usize, vertices: usize) -> String {
    let body: String = (0..count).map(|i| polygon(vertices, i as f64 * 3.0)).collect();
    format!("<MultiGeometry>{}</MultiGeometry>", body)
}

/// Benchmark simple cases for baseline measurements.
fn bench_parse_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_simple");

    let point = b"<Point><coordinates>-122.0822035,37.4222899,0</coordinates></Point>";
    group.throughput(Throughput::Bytes(point.len() as u64));
    group.bench_function("point", |b| b.iter(|| kml_core::parse(black_box(point))));

    let line = b"<LineString><coordinates>0,0 1,1 2,0 3,1 4,0</coordinates></LineString>";
    group.throughput(Throughput::Bytes(line.len() as u64));
    group.bench_function("line_string", |b| b.iter(|| kml_core::parse(black_box(line))));

    group.finish();
}

/// Stage by stage on one large document.
fn bench_stages(c: &mut Criterion) {
    let input = multi_polygon(50, 200);
    let input = input.as_bytes();

    let mut group = c.benchmark_group("stages");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("scan", |b| {
        b.iter(|| {
            let mut count = 0;
            Scanner::new(black_box(input))
                .scan(|_| {
                    count += 1;
                    Ok(())
                })
                .map(|()| count)
        })
    });

    group.bench_function("tree", |b| b.iter(|| Document::parse(black_box(input))));

    group.bench_function("full", |b| b.iter(|| kml_core::parse(black_box(input))));

    group.finish();
}

/// Scaling with ring size.
fn bench_ring_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_size");
    for vertices in [16, 256, 4096] {
        let input = polygon(vertices, 0.0);
        group.throughput(Throughput::Elements(vertices as u64));
        group.bench_with_input(BenchmarkId::from_parameter(vertices), &input, |b, doc| {
            b.iter(|| kml_core::parse(black_box(doc.as_bytes())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_simple, bench_stages, bench_ring_size);
criterion_main!(benches);
