//! Benchmarks for value publish fan-out.
//!
//! Run with: cargo bench -p tether-core --bench publish_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use tether_core::ModelValue;

fn bench_set_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("value/set_fanout");

    for subscribers in [1usize, 8, 64] {
        group.throughput(Throughput::Elements(subscribers as u64));

        let model = ModelValue::create(format!("bench.fanout.{subscribers}"), 0u64).unwrap();
        let interfaces: Vec<_> = (0..subscribers).map(|_| model.interface_node()).collect();
        let sink = Rc::new(Cell::new(0u64));
        let _connections: Vec<_> = interfaces
            .iter()
            .map(|interface| {
                let sink = Rc::clone(&sink);
                interface.connect(move |value| sink.set(sink.get().wrapping_add(*value)))
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("interfaces", subscribers),
            &subscribers,
            |b, _| {
                let mut next = 0u64;
                b.iter(|| {
                    next = next.wrapping_add(1);
                    model.set(black_box(next));
                });
            },
        );
    }

    group.finish();
}

fn bench_interface_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("value/interface_write");

    let model = ModelValue::create("bench.write", 0u64).unwrap();
    let writer = model.interface_node();
    let observer = model.interface_node();
    let sink = Rc::new(Cell::new(0u64));
    let _connection = {
        let sink = Rc::clone(&sink);
        observer.connect(move |value| sink.set(*value))
    };

    group.bench_function("one_sibling", |b| {
        let mut next = 0u64;
        b.iter(|| {
            next = next.wrapping_add(1);
            writer.set(black_box(next));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_set_fanout, bench_interface_write);
criterion_main!(benches);
