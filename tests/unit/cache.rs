//! Tests for the content-addressed LRU disk cache

use pixelcloud::cache::{CacheKey, CacheManager};
use pixelcloud::pixel::{Rgba, Sample};
use pixelcloud::sampling::params::QualityPreset;
use pixelcloud::sampling::StrategyKind;

fn sample_list(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|i| Sample::new(i as u32, (i * 2) as u32, Rgba::new(0.5, 0.25, 0.75, 1.0)))
        .collect()
}

fn key(target: usize) -> CacheKey {
    CacheKey::derive(64, 64, target, QualityPreset::Standard, StrategyKind::Uniform)
}

fn payload_size(samples: &[Sample]) -> u64 {
    serde_json::to_vec(samples).unwrap().len() as u64
}

// Tests key derivation is deterministic and sensitive to every input
#[test]
fn test_key_derivation_separates_requests() {
    assert_eq!(key(100), key(100));
    assert_ne!(key(100), key(101));

    let base = CacheKey::derive(64, 64, 100, QualityPreset::Standard, StrategyKind::Uniform);
    assert_ne!(
        base,
        CacheKey::derive(65, 64, 100, QualityPreset::Standard, StrategyKind::Uniform)
    );
    assert_ne!(
        base,
        CacheKey::derive(64, 64, 100, QualityPreset::Ultra, StrategyKind::Uniform)
    );
    assert_ne!(
        base,
        CacheKey::derive(64, 64, 100, QualityPreset::Standard, StrategyKind::Hybrid)
    );
    assert_eq!(base.as_hex().len(), 16);
}

// Tests a stored payload reads back equal
#[test]
fn test_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();

    let samples = sample_list(25);
    cache.put(&key(25), &samples).unwrap();

    assert!(cache.contains(&key(25)));
    assert_eq!(cache.get(&key(25)), Some(samples));
    assert_eq!(cache.get(&key(26)), None);
}

// Tests the index survives reopening the cache directory
#[test]
fn test_entries_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let samples = sample_list(10);

    {
        let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();
        cache.put(&key(10), &samples).unwrap();
    }

    let reopened = CacheManager::new(dir.path(), 1 << 20).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get(&key(10)), Some(samples));
}

// Tests LRU eviction: with room for two payloads, storing a third evicts
// the least recently used entry
#[test]
fn test_lru_eviction_under_byte_budget() {
    let dir = tempfile::tempdir().unwrap();
    let samples = sample_list(20);
    let size = payload_size(&samples);
    let cache = CacheManager::new(dir.path(), size * 2 + size / 2).unwrap();

    cache.put(&key(1), &samples).unwrap();
    cache.put(&key(2), &samples).unwrap();
    cache.put(&key(3), &samples).unwrap();

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&key(1)), "oldest entry should be evicted");
    assert!(cache.contains(&key(2)));
    assert!(cache.contains(&key(3)));
    assert!(cache.total_bytes() <= cache.budget_bytes());
}

// Tests a get refreshes recency: the untouched entry is the one evicted
#[test]
fn test_get_refreshes_lru_order() {
    let dir = tempfile::tempdir().unwrap();
    let samples = sample_list(20);
    let size = payload_size(&samples);
    let cache = CacheManager::new(dir.path(), size * 2 + size / 2).unwrap();

    cache.put(&key(1), &samples).unwrap();
    cache.put(&key(2), &samples).unwrap();
    assert!(cache.get(&key(1)).is_some());
    cache.put(&key(3), &samples).unwrap();

    assert!(cache.contains(&key(1)), "recently read entry was evicted");
    assert!(!cache.contains(&key(2)));
    assert!(cache.contains(&key(3)));
}

// Tests replacing a key frees its previous payload bytes
#[test]
fn test_replacement_frees_previous_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();

    cache.put(&key(5), &sample_list(5)).unwrap();
    let small = cache.total_bytes();
    cache.put(&key(5), &sample_list(50)).unwrap();
    let large = cache.total_bytes();

    assert_eq!(cache.len(), 1);
    assert!(large > small);
    assert_eq!(large, payload_size(&sample_list(50)));
}

// Tests an oversized payload is skipped without failing the call
#[test]
fn test_oversized_payload_is_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 16).unwrap();

    cache.put(&key(100), &sample_list(100)).unwrap();

    assert!(cache.is_empty());
    assert_eq!(cache.get(&key(100)), None);
}

// Tests a corrupt payload degrades to a miss and drops the entry
#[test]
fn test_corrupt_payload_degrades_to_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();

    cache.put(&key(8), &sample_list(8)).unwrap();

    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|ext| ext == "samples") {
            std::fs::write(&path, b"not json").unwrap();
        }
    }

    assert_eq!(cache.get(&key(8)), None);
    assert!(!cache.contains(&key(8)));
}

// Tests clear removes entries and payload files
#[test]
fn test_clear_empties_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();

    cache.put(&key(1), &sample_list(4)).unwrap();
    cache.put(&key(2), &sample_list(4)).unwrap();
    cache.clear().unwrap();

    assert!(cache.is_empty());
    assert_eq!(cache.total_bytes(), 0);

    let leftover = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext == "samples")
        })
        .count();
    assert_eq!(leftover, 0);
}
