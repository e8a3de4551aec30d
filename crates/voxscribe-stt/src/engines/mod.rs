//! Engine implementations.
//!
//! Real backends live out of tree; the stub engine exists for pipeline
//! tests and the headless demo front end.

pub mod stub;

pub use stub::{StubConfig, StubEngine};
