#![allow(dead_code)]
use shared::*;

use criterion::{criterion_group, Criterion};
use starix::geometry::BoundingBox;
use std::hint::black_box;

fn bench_delete_in_area_rstar_tree_2d(_c: &mut Criterion) {
    let boxes = generate_boxes_2d();
    let query = BoundingBox::new(vec![400.0, 400.0], vec![600.0, 600.0]);
    let mut cc = configure_criterion();
    cc.bench_function("delete_in_area_2d_rstar_tree", |b| {
        b.iter_with_setup(
            || populated_tree(&boxes, 2),
            |mut tree| {
                black_box(tree.delete_in_area(black_box(&query)));
            },
        )
    });
}

fn bench_delete_in_area_rstar_tree_3d(_c: &mut Criterion) {
    let boxes = generate_boxes_3d();
    let query = BoundingBox::new(vec![400.0, 400.0, 400.0], vec![600.0, 600.0, 600.0]);
    let mut cc = configure_criterion();
    cc.bench_function("delete_in_area_3d_rstar_tree", |b| {
        b.iter_with_setup(
            || populated_tree(&boxes, 3),
            |mut tree| {
                black_box(tree.delete_in_area(black_box(&query)));
            },
        )
    });
}

criterion_group!(
    benches,
    bench_delete_in_area_rstar_tree_2d,
    bench_delete_in_area_rstar_tree_3d
);
