//! Common test utilities and helpers
//!
//! - Collaborator stubs and request builders
//! - Log capture for asserting on severity

#![allow(dead_code)]

pub mod fixtures;
pub mod logging;

pub use fixtures::*;
pub use logging::*;
