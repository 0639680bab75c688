//! Tests for error reporting, CLI argument mapping, and image I/O

use clap::Parser;

use pixelcloud::GenerationError;
use pixelcloud::io::cli::{Cli, StrategyArg};
use pixelcloud::io::image::{export_preview, load_png, write_particle_dump};
use pixelcloud::pipeline::{DisplayMode, Particle};
use pixelcloud::pixel::Rgba;
use pixelcloud::sampling::{AdvancedAlgorithm, StrategyKind};

// Tests error messages carry enough context to act on
#[test]
fn test_error_messages_name_the_failure() {
    let image_error = GenerationError::InvalidImage {
        reason: "dimensions must be non-zero".to_string(),
    };
    assert!(image_error.to_string().contains("non-zero"));

    let insufficient = GenerationError::InsufficientSamples {
        strategy: "uniform",
        produced: 3,
        requested: 10,
    };
    let message = insufficient.to_string();
    assert!(message.contains("uniform"));
    assert!(message.contains('3'));
    assert!(message.contains("10"));
}

// Tests the source chain survives wrapping
#[test]
fn test_file_system_error_exposes_its_source() {
    use std::error::Error;

    let error = GenerationError::FileSystem {
        path: "/tmp/missing".into(),
        operation: "read",
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };

    assert!(error.source().is_some());
    assert!(error.to_string().contains("read"));
}

// Tests serde_json errors convert into the cache serialization variant
#[test]
fn test_serde_error_conversion() {
    let parse_error = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
    let converted: GenerationError = parse_error.into();
    assert!(matches!(
        converted,
        GenerationError::CacheSerialization { .. }
    ));
}

// Tests CLI defaults map into the expected generation config
#[test]
fn test_cli_defaults_map_to_config() {
    let cli = Cli::parse_from(["pixelcloud", "input.png"]);
    let config = cli.generation_config();

    assert_eq!(config.target_particle_count, 10_000);
    assert_eq!(config.sampling_strategy, StrategyKind::Adaptive);
    assert!(config.caching_enabled);
    assert_eq!(config.display_mode, DisplayMode::Fit);
    assert_eq!(config.seed, 42);
    assert!(cli.skip_existing());
    assert!(cli.should_show_progress());
}

// Tests explicit CLI flags override the defaults
#[test]
fn test_cli_flags_override_defaults() {
    let cli = Cli::parse_from([
        "pixelcloud",
        "input.png",
        "-n",
        "500",
        "-t",
        "blue-noise",
        "-s",
        "7",
        "--no-cache",
        "--quiet",
    ]);
    let config = cli.generation_config();

    assert_eq!(config.target_particle_count, 500);
    assert_eq!(
        config.sampling_strategy,
        StrategyKind::Advanced(AdvancedAlgorithm::BlueNoise)
    );
    assert_eq!(config.seed, 7);
    assert!(!config.caching_enabled);
    assert!(!cli.should_show_progress());
}

// Tests every flat CLI strategy maps onto a distinct strategy kind
#[test]
fn test_strategy_arg_mapping_is_distinct() {
    let kinds = [
        StrategyArg::Uniform,
        StrategyArg::Importance,
        StrategyArg::Adaptive,
        StrategyArg::Hybrid,
        StrategyArg::BlueNoise,
        StrategyArg::VanDerCorput,
        StrategyArg::HashBased,
        StrategyArg::Stratified,
    ]
    .map(StrategyArg::to_kind);

    let tags: std::collections::HashSet<u64> = kinds.iter().map(|kind| kind.key_tag()).collect();
    assert_eq!(tags.len(), kinds.len());
}

// Tests the particle dump is valid JSON that parses back
#[test]
fn test_particle_dump_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out_particles.json");
    let particles = vec![
        Particle {
            position: [0.25, -0.5],
            color: Rgba::new(1.0, 0.0, 0.0, 1.0),
            size: 2.0,
        },
        Particle {
            position: [-1.0, 1.0],
            color: Rgba::new(0.0, 1.0, 0.0, 0.5),
            size: 1.0,
        },
    ];

    write_particle_dump(&particles, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let parsed: Vec<Particle> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, particles);
}

// Tests the preview renderer produces a loadable square PNG
#[test]
fn test_preview_round_trips_through_the_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out_preview.png");
    let particles = vec![Particle {
        position: [0.0, 0.0],
        color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        size: 1.0,
    }];

    export_preview(&particles, (2.0, 2.0), &path).unwrap();

    let image = load_png(&path).unwrap();
    assert_eq!(image.width(), 512);
    assert_eq!(image.height(), 512);
}

// Tests loading a missing file reports an image load failure
#[test]
fn test_missing_png_reports_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_png(&dir.path().join("absent.png"));
    assert!(matches!(result, Err(GenerationError::ImageLoad { .. })));
}
