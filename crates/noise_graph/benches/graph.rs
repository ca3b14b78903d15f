mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::UVec2;
use noise_graph::prelude::{GeneratorExt, GraphCompiler, GraphSpec, GridRequest2D, NodeSpec, Tier};

const CHAIN_LENGTHS: [usize; 4] = [1, 4, 16, 64];

/// A value-noise base followed by `len` blends that all read the base again.
fn make_chain(len: usize) -> GraphSpec {
    let mut spec = GraphSpec::default();
    spec.add("base", NodeSpec::new("Value"));

    let mut prev = "base".to_string();
    for i in 0..len {
        let id = format!("blend_{i}");
        let generator = if i % 2 == 0 { "Add" } else { "Multiply" };
        spec.add(
            &id,
            NodeSpec::new(generator)
                .with_source("lhs", &prev)
                .with_hybrid_node("rhs", "base"),
        );
        prev = id;
    }
    spec.add(
        "out",
        NodeSpec::new("Remap")
            .with_source("source", &prev)
            .with_variable("from_min", -2.0)
            .with_variable("from_max", 2.0),
    );
    spec
}

fn compile_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/compile");
    for &len in &CHAIN_LENGTHS {
        let spec = make_chain(len);
        group.throughput(common::elements_throughput(spec.nodes.len()));
        group.bench_with_input(BenchmarkId::new("chain", len), &len, |b, _| {
            b.iter(|| {
                let graph = GraphCompiler::compile(&spec, Tier::Vector256).expect("compile ok");
                black_box(graph);
            });
        });
    }
    group.finish();
}

fn evaluate_benches(c: &mut Criterion) {
    let request = GridRequest2D::new(UVec2::splat(128)).with_frequency(0.03);

    let mut group = c.benchmark_group("graph/grid_2d");
    group.throughput(common::elements_throughput(request.len()));
    for &len in &CHAIN_LENGTHS {
        let spec = make_chain(len);
        for tier in [Tier::Scalar, Tier::Vector256] {
            let out = GraphCompiler::compile(&spec, tier)
                .and_then(|g| g.output("out"))
                .expect("compile ok");
            group.bench_with_input(BenchmarkId::new(tier.name(), len), &len, |b, _| {
                b.iter(|| {
                    let buffer = out.grid_2d(black_box(&request)).expect("valid request");
                    black_box(buffer);
                });
            });
        }
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = compile_benches, evaluate_benches
}
criterion_main!(benches);
