use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use flowgraph::prelude::*;

fn bench_linear_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_pipeline");

    for size in [100i64, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("passthrough", size), size, |b, &size| {
            b.iter(|| {
                tokio::runtime::Runtime::new().unwrap().block_on(async {
                    let mut pipeline = Pipeline::new();
                    let source = pipeline.add_node(Node::new(0, 1, IterSource::new(0..size)));
                    let collect = CollectBody::new();
                    let items = collect.items();
                    let sink = pipeline.add_node(Node::new(1, 0, collect));

                    pipeline.connect(source, 0, sink, 0).unwrap();
                    pipeline.run().unwrap();
                    pipeline.wait().await;
                    black_box(items.lock().await.len());
                })
            });
        });

        group.bench_with_input(BenchmarkId::new("map", size), size, |b, &size| {
            b.iter(|| {
                tokio::runtime::Runtime::new().unwrap().block_on(async {
                    let mut pipeline = Pipeline::new();
                    let source = pipeline.add_node(Node::new(0, 1, IterSource::new(0..size)));
                    let map = pipeline
                        .add_node(Node::new(1, 1, MapBody::new(|x: i64| black_box(x * 2))));
                    let collect = CollectBody::new();
                    let items = collect.items();
                    let sink = pipeline.add_node(Node::new(1, 0, collect));

                    pipeline.connect(source, 0, map, 0).unwrap();
                    pipeline.connect(map, 0, sink, 0).unwrap();
                    pipeline.run().unwrap();
                    pipeline.wait().await;
                    black_box(items.lock().await.len());
                })
            });
        });
    }

    group.finish();
}

fn bench_edge_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_capacity");
    group.throughput(Throughput::Elements(10_000));

    for capacity in [1usize, 16, 256].iter() {
        group.bench_with_input(
            BenchmarkId::new("buffer", capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    tokio::runtime::Runtime::new().unwrap().block_on(async {
                        let mut pipeline = Pipeline::new();
                        let source = pipeline.add_node(Node::with_buffer(
                            0,
                            1,
                            capacity,
                            IterSource::new(0..10_000i64),
                        ));
                        let count = CountBody::new();
                        let handle = count.clone();
                        let sink = pipeline.add_node(Node::new(1, 0, count));

                        pipeline.connect(source, 0, sink, 0).unwrap();
                        pipeline.run().unwrap();
                        pipeline.wait().await;
                        black_box(handle.count().await);
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_linear_pipeline, bench_edge_capacity);
criterion_main!(benches);
