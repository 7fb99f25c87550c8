use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use vexa_index::{
    Boundary, ErrorKind, IndexConfig, IndexError, IndexHandle, Metric, SharedIndex, SEARCH_FAILED,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_vectors(n: usize, dims: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

fn unit(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.iter().map(|x| x / norm).collect()
}

#[test]
fn test_reference_scenario() {
    init_tracing();

    let config = IndexConfig::new(4, 100)
        .with_m(16)
        .with_ef_construction(200)
        .with_ef_search(50)
        .with_seed(42)
        .with_metric(Metric::L2);
    let mut index = IndexHandle::create(config).unwrap();

    index.insert(&[1.0, 0.0, 0.0, 0.0], 1).unwrap();
    index.insert(&[0.0, 1.0, 0.0, 0.0], 2).unwrap();
    index.insert(&[0.9, 0.1, 0.0, 0.0], 3).unwrap();

    let result = index.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
    assert_eq!(result.labels(), &[1, 3]);
    assert!(result.distances()[0].abs() < 1e-6);
    assert!((result.distances()[1] - 0.02).abs() < 1e-5);

    index.destroy();
}

#[test]
fn test_capacity_exceeded_keeps_index_usable() {
    init_tracing();

    let mut index = IndexHandle::create(IndexConfig::new(2, 2)).unwrap();
    index.insert(&[0.0, 0.0], 1).unwrap();
    index.insert(&[1.0, 1.0], 2).unwrap();

    let err = index.insert(&[2.0, 2.0], 3).unwrap_err();
    assert_eq!(err, IndexError::CapacityExceeded { capacity: 2 });
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

    // Overwriting an existing label still works at capacity
    index.insert(&[5.0, 5.0], 2).unwrap();
    assert_eq!(index.len(), 2);

    let result = index.search(&[5.0, 5.0], 2).unwrap();
    assert_eq!(result.labels(), &[2, 1]);
    assert!(!index.contains(3));
}

#[test]
fn test_k_larger_than_stored() {
    let mut index = IndexHandle::create(IndexConfig::new(3, 50)).unwrap();
    for (i, v) in random_vectors(5, 3, 7).iter().enumerate() {
        index.insert(v, i as u64).unwrap();
    }

    let result = index.search(&[0.0, 0.0, 0.0], 20).unwrap();
    assert_eq!(result.len(), 5);
    assert!(result.distances().windows(2).all(|w| w[0] <= w[1]));

    let mut labels = vec![u64::MAX; 20];
    let mut distances = vec![f32::NAN; 20];
    let n = index
        .search_into(&[0.0, 0.0, 0.0], 20, &mut labels, &mut distances)
        .unwrap();
    assert_eq!(n, 5);
    assert_eq!(&labels[..n], result.labels());
    assert_eq!(labels[n], u64::MAX);
}

#[test]
fn test_round_trip_l2() {
    let vectors = random_vectors(200, 8, 11);
    let mut index = IndexHandle::create(IndexConfig::new(8, 200).with_ef_search(64)).unwrap();
    for (i, v) in vectors.iter().enumerate() {
        index.insert(v, i as u64).unwrap();
    }

    for (i, v) in vectors.iter().enumerate().step_by(17) {
        let (label, distance) = index.search(v, 1).unwrap().nearest().unwrap();
        assert_eq!(label, i as u64);
        assert!(distance.abs() < 1e-5);
    }
}

#[test]
fn test_round_trip_inner_product_unit_vectors() {
    let vectors: Vec<Vec<f32>> = random_vectors(100, 6, 13)
        .iter()
        .map(Vec::as_slice)
        .map(unit)
        .collect();
    let config = IndexConfig::new(6, 100)
        .with_metric(Metric::InnerProduct)
        .with_ef_search(64);
    let mut index = IndexHandle::create(config).unwrap();
    for (i, v) in vectors.iter().enumerate() {
        index.insert(v, i as u64).unwrap();
    }

    for (i, v) in vectors.iter().enumerate().step_by(9) {
        let (label, distance) = index.search(v, 1).unwrap().nearest().unwrap();
        assert_eq!(label, i as u64);
        assert!(distance.abs() < 1e-5);
    }
}

#[test]
fn test_cosine_scale_invariance() {
    let vectors = random_vectors(50, 5, 17);
    let config = IndexConfig::new(5, 60).with_metric(Metric::Cosine).with_seed(9);

    let mut plain = IndexHandle::create(config.clone()).unwrap();
    let mut scaled = IndexHandle::create(config).unwrap();
    for (i, v) in vectors.iter().enumerate() {
        let s: Vec<f32> = v.iter().map(|x| x * 37.5).collect();
        plain.insert(v, i as u64).unwrap();
        scaled.insert(&s, i as u64).unwrap();
    }

    let query = &vectors[4];
    let a = plain.search(query, 5).unwrap();
    let b = scaled.search(query, 5).unwrap();

    assert_eq!(a.nearest().unwrap().0, 4);
    assert_eq!(b.nearest().unwrap().0, 4);
    for (x, y) in a.distances().iter().zip(b.distances()) {
        assert!((x - y).abs() < 1e-5);
    }
}

#[test]
fn test_overwrite_replaces_vector() {
    let mut index = IndexHandle::create(IndexConfig::new(2, 10)).unwrap();
    index.insert(&[0.0, 0.0], 1).unwrap();
    index.insert(&[10.0, 10.0], 2).unwrap();

    index.insert(&[10.0, 9.0], 1).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(1), Some(vec![10.0, 9.0]));

    let result = index.search(&[0.0, 0.0], 2).unwrap();
    assert_eq!(result.labels(), &[1, 2]);
    assert!((result.distances()[0] - 181.0).abs() < 1e-3);
    assert!((result.distances()[1] - 200.0).abs() < 1e-3);
}

#[test]
fn test_same_seed_same_results() {
    let vectors = random_vectors(300, 8, 19);
    let build = || {
        let config = IndexConfig::new(8, 300).with_seed(5).with_ef_search(16);
        let mut index = IndexHandle::create(config).unwrap();
        for (i, v) in vectors.iter().enumerate() {
            index.insert(v, i as u64).unwrap();
        }
        index
    };

    let a = build();
    let b = build();
    for query in random_vectors(10, 8, 23) {
        assert_eq!(a.search(&query, 10).unwrap(), b.search(&query, 10).unwrap());
    }
}

#[test]
fn test_indices_are_independent() {
    let mut a = IndexHandle::create(IndexConfig::new(2, 4)).unwrap();
    let mut b = IndexHandle::create(IndexConfig::new(3, 4).with_metric(Metric::Cosine)).unwrap();
    assert_ne!(a.id(), b.id());

    a.insert(&[1.0, 0.0], 1).unwrap();
    b.insert(&[0.0, 0.0, 2.0], 1).unwrap();

    assert_eq!(a.get(1), Some(vec![1.0, 0.0]));
    assert_eq!(b.get(1), Some(vec![0.0, 0.0, 1.0]));

    b.destroy();
    assert_eq!(a.search(&[1.0, 0.0], 1).unwrap().labels(), &[1]);
}

#[test]
fn test_error_isolation() {
    let mut calls = Boundary::new();
    let mut index = calls
        .create_index(IndexConfig::new(3, 10).with_seed(1))
        .unwrap();

    assert!(!calls.insert(&mut index, &[1.0, 2.0], 1));
    assert!(calls.peek_error().is_some());

    // Successful search leaves the earlier failure in place until consumed
    assert!(calls.search(&index, &[0.0, 0.0, 0.0], 1).is_some());
    assert!(calls.peek_error().unwrap().contains("Dimension mismatch"));

    assert!(calls.consume_error().is_some());
    assert!(calls.search(&index, &[0.0, 0.0, 0.0], 1).is_some());
    assert!(calls.peek_error().is_none());
    assert!(calls.consume_error().is_none());

    let mut labels = [0u64; 2];
    let mut distances = [0f32; 2];
    assert_eq!(
        calls.search_into(&index, &[0.0, 0.0, 0.0], 0, &mut labels, &mut distances),
        SEARCH_FAILED
    );
    assert!(calls.consume_error().unwrap().contains("k must satisfy"));

    calls.destroy_index(index);
}

#[test]
fn test_parallel_searches() {
    let vectors = random_vectors(500, 8, 29);
    let mut index = IndexHandle::create(IndexConfig::new(8, 500).with_ef_search(64)).unwrap();
    for (i, v) in vectors.iter().enumerate() {
        index.insert(v, i as u64).unwrap();
    }

    let index = Arc::new(index);
    let vectors = Arc::new(vectors);
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let index = Arc::clone(&index);
            let vectors = Arc::clone(&vectors);
            thread::spawn(move || {
                for i in (t..vectors.len()).step_by(25) {
                    let result = index.search(&vectors[i], 5).unwrap();
                    assert_eq!(result.len(), 5);
                    assert_eq!(result.labels()[0], i as u64);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn test_shared_index_across_threads() {
    init_tracing();

    let index: SharedIndex = IndexHandle::create(IndexConfig::new(4, 200).with_seed(2))
        .unwrap()
        .into();

    let writer = {
        let index = index.clone();
        thread::spawn(move || {
            for (i, v) in random_vectors(200, 4, 31).iter().enumerate() {
                index.insert(v, i as u64).unwrap();
            }
        })
    };
    let reader = {
        let index = index.clone();
        thread::spawn(move || {
            for q in random_vectors(50, 4, 37) {
                let result = index.search(&q, 3).unwrap();
                assert!(result.len() <= 3);
                assert!(result.distances().windows(2).all(|w| w[0] <= w[1]));
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(index.len(), 200);
}

#[test]
fn test_inner_product_returns_every_label() {
    let n = 1000;
    let config = IndexConfig::new(4, n).with_metric(Metric::InnerProduct);
    let mut index = IndexHandle::create(config).unwrap();
    for (i, v) in random_vectors(n, 4, 43).iter().enumerate() {
        index.insert(v, i as u64).unwrap();
    }

    for q in random_vectors(50, 4, 47) {
        let result = index.search(&q, n).unwrap();
        assert_eq!(result.len(), n);
    }
}
