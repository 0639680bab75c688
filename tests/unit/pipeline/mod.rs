//! Pipeline, execution strategy, and coordinator unit tests

mod coordinator;
