//! Error types for the generation pipeline

use std::fmt;
use std::path::PathBuf;

/// Main error type for all generation operations
#[derive(Debug)]
pub enum GenerationError {
    /// Source image failed validation
    InvalidImage {
        /// Description of what is wrong with the image
        reason: String,
    },

    /// Generation configuration failed validation
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A sampling strategy produced no usable samples
    InsufficientSamples {
        /// Name of the strategy that ran
        strategy: &'static str,
        /// Number of samples actually produced
        produced: usize,
        /// Number of samples requested
        requested: usize,
    },

    /// Cache directory or index could not be created
    CacheCreationFailed {
        /// Cache root path involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Cache payload or index serialization failed
    CacheSerialization {
        /// Underlying serialization error
        source: serde_json::Error,
    },

    /// Failed to load source image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to save generated output to disk
    ImageExport {
        /// Path where the export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Generation was cancelled cooperatively
    ///
    /// A first-class outcome rather than an exceptional failure; partial
    /// work is discarded and no particle list is returned.
    Cancelled,

    /// A generation request arrived while another was in flight
    AlreadyGenerating,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage { reason } => {
                write!(f, "Invalid source image: {reason}")
            }
            Self::InvalidConfiguration {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid configuration '{parameter}' = '{value}': {reason}")
            }
            Self::InsufficientSamples {
                strategy,
                produced,
                requested,
            } => {
                write!(
                    f,
                    "Strategy '{strategy}' produced {produced} of {requested} requested samples"
                )
            }
            Self::CacheCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create cache at '{}': {source}",
                    path.display()
                )
            }
            Self::CacheSerialization { source } => {
                write!(f, "Cache serialization failed: {source}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(f, "Failed to export to '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Cancelled => write!(f, "Generation was cancelled"),
            Self::AlreadyGenerating => {
                write!(f, "A generation is already in flight for this coordinator")
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::CacheCreationFailed { source, .. } | Self::FileSystem { source, .. } => {
                Some(source)
            }
            Self::CacheSerialization { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, GenerationError>;

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::CacheSerialization { source: err }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid configuration error
pub fn invalid_configuration(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GenerationError {
    GenerationError::InvalidConfiguration {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
