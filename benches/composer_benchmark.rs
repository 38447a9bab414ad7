use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strata::{BinaryLifting, DynamicRangeIndex, GhostToken, TreePathIndex};

// Naive range k-th for comparison
fn naive_range_kth(values: &[usize], l: usize, r: usize, k: usize) -> usize {
    let mut window = values[l - 1..r].to_vec();
    window.select_nth_unstable(k - 1);
    window[k - 1]
}

fn bench_dynamic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dynamic Range Index");

    let n = 20_000;
    let domain = 4096;
    let values: Vec<usize> = (0..n).map(|i| (i * 2_654_435_761) % domain + 1).collect();

    group.bench_function("set", |b| {
        GhostToken::new(|mut token| {
            let mut index = DynamicRangeIndex::from_values(&mut token, domain, &values).unwrap();
            let mut i = 0;

            b.iter(|| {
                i = (i + 7) % n;
                index.set(&mut token, i + 1, (i * 31) % domain + 1).unwrap();
            });
        });
    });

    group.bench_function("range_kth", |b| {
        GhostToken::new(|mut token| {
            let index = DynamicRangeIndex::from_values(&mut token, domain, &values).unwrap();

            b.iter(|| black_box(index.range_kth(&token, n / 4, 3 * n / 4, n / 4).unwrap()));
        });
    });

    group.bench_function("naive_range_kth", |b| {
        b.iter(|| black_box(naive_range_kth(&values, n / 4, 3 * n / 4, n / 4)));
    });

    group.finish();
}

fn bench_tree_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tree Path Index");

    let n = 50_000;
    let parents: Vec<Option<usize>> = (0..n).map(|u| if u == 0 { None } else { Some((u - 1) / 3) }).collect();
    let ranks: Vec<usize> = (0..n).map(|u| u % 1000 + 1).collect();

    group.bench_function("build", |b| {
        b.iter(|| {
            GhostToken::new(|mut token| {
                let oracle = BinaryLifting::new(&parents).unwrap();
                let index = TreePathIndex::build(&mut token, 1000, oracle, &ranks).unwrap();
                black_box(index.stats());
            });
        });
    });

    group.bench_function("tree_path_kth", |b| {
        GhostToken::new(|mut token| {
            let oracle = BinaryLifting::new(&parents).unwrap();
            let index = TreePathIndex::build(&mut token, 1000, oracle, &ranks).unwrap();
            let mut u = 1;

            b.iter(|| {
                u = (u * 17 + 5) % n;
                black_box(index.tree_path_kth(&token, u, n - 1 - u, 1).unwrap());
            });
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dynamic, bench_tree_path);
criterion_main!(benches);
