//! Test infrastructure for the KML geometry parser
//!
//! Provides fixture loading, stochastic test generation, and assertion helpers.

#![allow(dead_code)]

mod loader;
mod harness;
mod generators;

pub use loader::{TestCase, ErrorClass, load_fixtures_by_name};
pub use harness::{outcome, run_test, run_with_variations, Outcome};
pub use generators::{Gen, Generated, Kind, Vertex};
