//! Mathematical utilities for hashing and low-discrepancy sequences

pub mod hash;
pub mod sequence;
