use crossbeam_utils::thread;
use strata::{GhostToken, VersionedIndex};

#[test]
fn readers_share_one_index_across_threads() {
    GhostToken::new(|mut token| {
        let values: Vec<usize> = (0..512).map(|i| (i * 37) % 100 + 1).collect();
        let mut index = VersionedIndex::new(100);
        index.build(&mut token, &values).unwrap();

        let index = &index;
        let values = &values;
        let token = &token;
        thread::scope(|s| {
            for worker in 0..4usize {
                s.spawn(move |_| {
                    for l in (1 + worker..values.len()).step_by(31) {
                        let r = (l + 40).min(values.len());
                        let mut window = values[l - 1..r].to_vec();
                        window.sort_unstable();
                        let k = window.len() / 2 + 1;
                        assert_eq!(index.prefix_kth(token, l, r, k).unwrap(), window[k - 1]);
                    }
                });
            }
        })
        .unwrap();
    });
}

#[test]
fn batch_queries_match_single_queries() {
    GhostToken::new(|mut token| {
        let mut index = VersionedIndex::new(16);
        index.build(&mut token, &[9, 3, 16, 1, 1, 12, 7, 5]).unwrap();
        let queries: Vec<_> = (1..=8)
            .map(|r| (index.initial(), index.version(r).unwrap(), (r + 1) / 2))
            .collect();

        let batch = index.batch_range_kth(&token, &queries);
        for (result, &(lo, hi, k)) in batch.into_iter().zip(&queries) {
            assert_eq!(result, index.range_kth(&token, lo, hi, k));
        }
    });
}
