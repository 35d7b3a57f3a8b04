//! Dispatch heap ordering and keyed removal

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use traffic_signal_sim::simulation::DispatchHeap;

fn scores(pairs: &[(&'static str, u64)]) -> HashMap<&'static str, u64> {
    pairs.iter().copied().collect()
}

#[test]
fn test_extract_on_empty_heap() {
    let mut heap: DispatchHeap<&str> = DispatchHeap::new();
    assert!(heap.is_empty());
    assert_eq!(heap.extract_max(|_: &&str| 0), None);
    assert!(!heap.remove(&"missing", |_: &&str| 0));
}

#[test]
fn test_extracts_in_score_order() {
    let s = scores(&[("a", 3), ("b", 1009), ("c", 7), ("d", 0), ("e", 1001)]);
    let score = |k: &&str| s[*k];
    let mut heap = DispatchHeap::new();
    for key in ["a", "b", "c", "d", "e"] {
        heap.insert(key, score);
    }
    assert!(heap.is_valid(score));
    assert_eq!(heap.peek(), Some(&"b"));

    let order: Vec<&str> = std::iter::from_fn(|| heap.extract_max(score)).collect();
    assert_eq!(order, vec!["b", "e", "c", "a", "d"]);
}

#[test]
fn test_ties_favor_earlier_insert() {
    let score = |_: &&str| 5;
    let mut heap = DispatchHeap::new();
    heap.insert("first", score);
    heap.insert("second", score);
    heap.insert("third", score);

    assert_eq!(heap.extract_max(score), Some("first"));
}

#[test]
fn test_insert_existing_key_does_not_duplicate() {
    let s = scores(&[("a", 1), ("b", 2)]);
    let score = |k: &&str| s[*k];
    let mut heap = DispatchHeap::new();
    heap.insert("a", score);
    heap.insert("b", score);
    heap.insert("a", score);

    assert_eq!(heap.len(), 2);
    assert!(heap.is_valid(score));
}

#[test]
fn test_remove_by_key() {
    let s = scores(&[("a", 10), ("b", 8), ("c", 9), ("d", 1), ("e", 2), ("f", 7)]);
    let score = |k: &&str| s[*k];
    let mut heap = DispatchHeap::new();
    for key in ["a", "b", "c", "d", "e", "f"] {
        heap.insert(key, score);
    }

    assert!(heap.remove(&"b", score));
    assert!(!heap.contains(&"b"));
    assert!(!heap.remove(&"b", score));
    assert!(heap.is_valid(score));

    assert!(heap.remove(&"a", score));
    assert!(heap.is_valid(score));
    assert_eq!(heap.peek(), Some(&"c"));
    assert_eq!(heap.len(), 4);
}

#[test]
fn test_update_after_score_change() {
    let mut s = scores(&[("a", 5), ("b", 4), ("c", 3)]);
    let mut heap = DispatchHeap::new();
    for key in ["a", "b", "c"] {
        heap.insert(key, |k: &&str| s[*k]);
    }
    assert_eq!(heap.peek(), Some(&"a"));

    // An emergency arrives at "c"
    s.insert("c", 1003);
    heap.update("c", |k: &&str| s[*k]);
    assert_eq!(heap.peek(), Some(&"c"));
    assert!(heap.is_valid(|k: &&str| s[*k]));

    s.insert("c", 0);
    heap.update("c", |k: &&str| s[*k]);
    assert_eq!(heap.extract_max(|k: &&str| s[*k]), Some("a"));
    assert_eq!(heap.extract_max(|k: &&str| s[*k]), Some("b"));
    assert_eq!(heap.extract_max(|k: &&str| s[*k]), Some("c"));
}

#[test]
fn test_heap_invariant_under_random_operations() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut s: HashMap<u32, u64> = HashMap::new();
    let mut heap = DispatchHeap::new();

    for _ in 0..2_000 {
        let key = rng.random_range(0..40u32);
        match rng.random_range(0..4) {
            0 | 1 => {
                s.insert(key, rng.random_range(0..50) + if rng.random_bool(0.2) { 1000 } else { 0 });
                heap.update(key, |k: &u32| s[k]);
            }
            2 => {
                heap.remove(&key, |k: &u32| s[k]);
            }
            _ => {
                let expected_max = heap.iter().map(|k| s[k]).max();
                let extracted = heap.extract_max(|k: &u32| s[k]);
                assert_eq!(extracted.map(|k| s[&k]), expected_max);
            }
        }
        assert!(heap.is_valid(|k: &u32| s[k]));
        assert!(heap.len() <= 40);
    }
}
