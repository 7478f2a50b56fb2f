//! Benchmarks for the tree view's visible-node projection rebuild.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use vellum_ui::TreeView;

fn populated_tree(items: usize) -> TreeView {
    let mut tree = TreeView::new();
    for index in 0..items {
        let group = format!("group {}", index / 10);
        let item = format!("item {index}");
        tree.add_item(&[group.as_str(), item.as_str()], true);
    }
    tree
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_projection");
    for &items in &[100usize, 1_000, 10_000] {
        group.bench_function(format!("rebuild_{items}"), |b| {
            b.iter_batched(
                || populated_tree(items),
                |mut tree| {
                    tree.collapse_all();
                    black_box(tree.visible_count());
                    tree.expand_all();
                    black_box(tree.visible_count())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
