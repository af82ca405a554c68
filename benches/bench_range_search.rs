#![allow(dead_code)]
use shared::*;

use criterion::{criterion_group, Criterion};
use starix::geometry::BoundingBox;
use std::hint::black_box;

fn bench_range_search_rstar_tree_2d(_c: &mut Criterion) {
    let boxes = generate_boxes_2d();
    let tree = populated_tree(&boxes, 2);
    let query = BoundingBox::new(vec![250.0, 250.0], vec![750.0, 750.0]);
    let mut cc = configure_criterion();
    cc.bench_function("range_search_2d_rstar_tree", |b| {
        b.iter(|| black_box(tree.search(black_box(&query))))
    });
}

fn bench_range_search_rstar_tree_3d(_c: &mut Criterion) {
    let boxes = generate_boxes_3d();
    let tree = populated_tree(&boxes, 3);
    let query = BoundingBox::new(vec![250.0, 250.0, 250.0], vec![750.0, 750.0, 750.0]);
    let mut cc = configure_criterion();
    cc.bench_function("range_search_3d_rstar_tree", |b| {
        b.iter(|| black_box(tree.search(black_box(&query))))
    });
}

criterion_group!(
    benches,
    bench_range_search_rstar_tree_2d,
    bench_range_search_rstar_tree_3d
);
