//! Tests for the generation coordinator lifecycle

use pixelcloud::GenerationError;
use pixelcloud::cache::CacheManager;
use pixelcloud::pipeline::coordinator::{GenerationCoordinator, GenerationOutcome};
use pixelcloud::pipeline::execution::SequentialExecution;
use pixelcloud::pipeline::{GenerationConfig, GenerationPipeline};

use crate::common::gradient_image;

fn coordinator(cache: Option<CacheManager>) -> GenerationCoordinator {
    GenerationCoordinator::new(GenerationPipeline::new(Box::new(SequentialExecution)), cache)
}

fn config(target: usize) -> GenerationConfig {
    GenerationConfig {
        target_particle_count: target,
        ..GenerationConfig::default()
    }
}

// Tests the happy path without a cache: particles come back, the outcome
// is recorded, and progress ends at the completed signal
#[test]
fn test_generate_without_cache_completes() {
    let coordinator = coordinator(None);
    let image = gradient_image(32, 32);
    let mut stages: Vec<(f32, String)> = Vec::new();

    let particles = coordinator
        .generate(&image, &config(120), |fraction, stage| {
            stages.push((fraction, stage.to_string()));
        })
        .unwrap();

    assert_eq!(particles.len(), 120);
    assert_eq!(coordinator.last_outcome(), Some(GenerationOutcome::Completed));
    assert!(coordinator.take_cache_error().is_none());

    let last = stages.last().unwrap();
    assert_eq!(last.1, "complete");
    assert!((last.0 - 1.0).abs() < 1e-6);
}

// Tests a cache hit short-circuits the pipeline: the second run reports
// only the completed signal and returns identical particles
#[test]
fn test_cache_hit_short_circuits_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();
    let coordinator = coordinator(Some(cache));
    let image = gradient_image(32, 32);

    let mut first_stages: Vec<String> = Vec::new();
    let first = coordinator
        .generate(&image, &config(80), |_, stage| {
            first_stages.push(stage.to_string());
        })
        .unwrap();
    assert!(first_stages.contains(&"sampling".to_string()));
    assert!(first_stages.contains(&"caching".to_string()));

    let mut second_stages: Vec<String> = Vec::new();
    let second = coordinator
        .generate(&image, &config(80), |_, stage| {
            second_stages.push(stage.to_string());
        })
        .unwrap();

    assert_eq!(second_stages, ["complete"]);
    assert_eq!(second, first);
    assert_eq!(coordinator.last_outcome(), Some(GenerationOutcome::Completed));
}

// Tests disabling caching bypasses both the lookup and the store
#[test]
fn test_caching_disabled_never_touches_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(dir.path(), 1 << 20).unwrap();
    let coordinator = coordinator(Some(cache));
    let image = gradient_image(16, 16);
    let no_cache = GenerationConfig {
        caching_enabled: false,
        target_particle_count: 40,
        ..GenerationConfig::default()
    };

    coordinator.generate(&image, &no_cache, |_, _| {}).unwrap();

    let mut stages: Vec<String> = Vec::new();
    coordinator
        .generate(&image, &no_cache, |_, stage| stages.push(stage.to_string()))
        .unwrap();
    assert!(stages.contains(&"sampling".to_string()));
    assert!(!stages.contains(&"caching".to_string()));
}

// Tests cooperative cancellation from inside the progress callback: the
// run stops at the next stage boundary with a cancelled outcome
#[test]
fn test_cancellation_mid_run() {
    let coordinator = coordinator(None);
    let image = gradient_image(32, 32);

    let result = coordinator.generate(&image, &config(100), |_, _| {
        coordinator.cancel_generation();
    });

    assert!(matches!(result, Err(GenerationError::Cancelled)));
    assert_eq!(coordinator.last_outcome(), Some(GenerationOutcome::Cancelled));
}

// Tests a follow-up request succeeds after a cancelled one: the token is
// reset when the next request begins
#[test]
fn test_token_resets_between_requests() {
    let coordinator = coordinator(None);
    let image = gradient_image(16, 16);

    let cancelled = coordinator.generate(&image, &config(50), |_, _| {
        coordinator.cancel_generation();
    });
    assert!(cancelled.is_err());

    let retried = coordinator.generate(&image, &config(50), |_, _| {});
    assert_eq!(retried.unwrap().len(), 50);
    assert_eq!(coordinator.last_outcome(), Some(GenerationOutcome::Completed));
}

// Tests the at-most-one guarantee: a request arriving while another is in
// flight is rejected without disturbing the first
#[test]
fn test_concurrent_request_is_rejected() {
    let coordinator = coordinator(None);
    let image = gradient_image(16, 16);
    let mut nested: Option<GenerationError> = None;

    let outer = coordinator.generate(&image, &config(40), |_, _| {
        if nested.is_none() {
            nested = coordinator.generate(&image, &config(40), |_, _| {}).err();
        }
    });

    assert_eq!(outer.unwrap().len(), 40);
    assert!(matches!(nested, Some(GenerationError::AlreadyGenerating)));
    assert_eq!(coordinator.last_outcome(), Some(GenerationOutcome::Completed));
}

// Tests a failed request records the failed outcome
#[test]
fn test_invalid_config_records_failure() {
    let coordinator = coordinator(None);
    let image = gradient_image(8, 8);

    let result = coordinator.generate(&image, &config(0), |_, _| {});

    assert!(matches!(
        result,
        Err(GenerationError::InvalidConfiguration { .. })
    ));
    assert_eq!(coordinator.last_outcome(), Some(GenerationOutcome::Failed));
}
