use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nutrient_network::builder::{BuildOptions, build_graph};
use nutrient_network::config::{Config, LayoutConfig};
use nutrient_network::dataset::{Dataset, Variant};
use nutrient_network::ir::{EdgeData, InteractionGraph, Relation, Strength};
use nutrient_network::layout::compute_layout;
use nutrient_network::render::{Scene, render_svg};
use std::hint::black_box;

/// A chain of `nodes` nutrients plus `extra_edges` forward shortcuts.
fn dense_graph(nodes: usize, extra_edges: usize) -> InteractionGraph {
    let mut graph = InteractionGraph::new();
    let name = |i: usize| format!("N{i}");
    for i in 0..nodes {
        graph.add_node(&name(i), None);
    }
    for i in 0..nodes.saturating_sub(1) {
        graph.add_edge(&name(i), &name(i + 1), EdgeData::new(Relation::Boosts, None));
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            let strength = Strength::ALL[count % Strength::ALL.len()];
            graph.add_edge(&name(i), &name(j), EdgeData::new(Relation::Inhibits, Some(strength)));
            count += 1;
        }
    }
    graph
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for variant in Variant::ALL {
        let dataset = Dataset::for_variant(variant);
        let graph = build_graph(&dataset, &BuildOptions::default()).expect("build failed");
        let config = Config::for_variant(variant);
        group.bench_with_input(BenchmarkId::from_parameter(variant.name()), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &config.layout);
                black_box(layout.len());
            });
        });
    }
    group.finish();
}

fn bench_layout_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_dense");
    let config = LayoutConfig::default();
    for (nodes, extra_edges) in [(40usize, 80usize), (60, 180), (80, 320)] {
        let name = format!("dense_{nodes}_{extra_edges}");
        let graph = dense_graph(nodes, extra_edges);
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &config);
                black_box(layout.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    for variant in Variant::ALL {
        let dataset = Dataset::for_variant(variant);
        let graph = build_graph(&dataset, &BuildOptions::default()).expect("build failed");
        let config = Config::for_variant(variant);
        let layout = compute_layout(&graph, &config.layout);
        let scene = Scene::new(&dataset, &graph, &layout, &config);
        group.bench_with_input(BenchmarkId::from_parameter(variant.name()), &scene, |b, scene| {
            b.iter(|| {
                let svg = render_svg(black_box(scene));
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    for variant in Variant::ALL {
        let config = Config::for_variant(variant);
        group.bench_with_input(BenchmarkId::from_parameter(variant.name()), &variant, |b, variant| {
            b.iter(|| {
                let figure =
                    nutrient_network::build_figure(&Dataset::for_variant(*variant), &config)
                        .expect("build failed");
                black_box(figure.svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_layout_dense, bench_render, bench_end_to_end
);
criterion_main!(benches);
