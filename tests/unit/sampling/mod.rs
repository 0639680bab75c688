//! Sampling strategy unit tests

mod stratified;
mod validator;
