use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use strata::{GhostToken, IndexConfig, RollbackTree, VersionedIndex};

fn workload(n: usize, domain: usize) -> Vec<usize> {
    // Deterministic LCG so runs are comparable.
    let mut state = 0x2545_f491_u64;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (state >> 33) as usize % domain + 1
        })
        .collect()
}

fn bench_versioned(c: &mut Criterion) {
    let mut group = c.benchmark_group("Versioned Index");

    let n = 100_000;
    let domain = 1 << 16;
    let values = workload(n, domain);

    group.bench_function("build", |b| {
        b.iter_batched(
            || values.clone(),
            |data| {
                GhostToken::new(|mut token| {
                    let mut index = VersionedIndex::with_config(IndexConfig::for_workload(domain, data.len()));
                    index.build(&mut token, &data).unwrap();
                    black_box(index.stats());
                });
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("update_head", |b| {
        GhostToken::new(|mut token| {
            let mut index = VersionedIndex::new(domain);
            index.build(&mut token, &values).unwrap();
            let mut i = 0;

            b.iter(|| {
                i = (i + 1) % values.len();
                black_box(index.update_head(&mut token, values[i], 1).unwrap());
            });
        });
    });

    group.bench_function("range_kth", |b| {
        GhostToken::new(|mut token| {
            let mut index = VersionedIndex::new(domain);
            index.build(&mut token, &values).unwrap();
            let mut l = 1;

            b.iter(|| {
                l = (l * 7 + 13) % (n / 2) + 1;
                let r = l + n / 4;
                black_box(index.prefix_kth(&token, l, r, (r - l) / 2 + 1).unwrap());
            });
        });
    });

    group.bench_function("rollback", |b| {
        GhostToken::new(|mut token| {
            let mut index = VersionedIndex::new(domain);
            index.build(&mut token, &values).unwrap();
            let mut v = 0;

            b.iter(|| {
                v = (v + 7919) % index.versions();
                black_box(index.rollback(&mut token, v).unwrap());
            });
        });
    });

    group.finish();
}

fn bench_rollback_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rollback Tree");

    let domain = 1 << 16;
    let bits = vec![true; domain];

    group.bench_function("assign_range", |b| {
        GhostToken::new(|mut token| {
            let mut tree = RollbackTree::from_bits(&mut token, domain, &bits).unwrap();
            let mut l = 1;

            b.iter(|| {
                l = (l * 31 + 17) % (domain / 2) + 1;
                black_box(tree.assign_head(&mut token, l, l + domain / 3, l % 2 == 0).unwrap());
            });
        });
    });

    group.bench_function("kth_one", |b| {
        GhostToken::new(|mut token| {
            let mut tree = RollbackTree::from_bits(&mut token, domain, &bits).unwrap();
            for l in (1..domain).step_by(997) {
                tree.assign_head(&mut token, l, (l + 300).min(domain), false).unwrap();
            }
            let head = tree.head();
            let ones = tree.count_ones(&token, head, 1, domain).unwrap() as usize;
            let mut k = 0;

            b.iter(|| {
                k = k % ones + 1;
                black_box(tree.kth_one(&token, head, k).unwrap());
            });
        });
    });

    group.finish();
}

criterion_group!(benches, bench_versioned, bench_rollback_tree);
criterion_main!(benches);
