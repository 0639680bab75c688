//! Input/output operations, configuration constants, and error handling

pub mod cli;
pub mod configuration;
pub mod error;
pub mod image;
pub mod progress;
