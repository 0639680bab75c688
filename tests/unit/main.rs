//! Unit test suite mirroring the crate module tree

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::indexing_slicing
)]

mod common;

mod cache;
mod io;
mod pipeline;
mod pixel;
mod sampling;
