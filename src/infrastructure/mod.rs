//! Infrastructure layer - adapters and the test-facing surface.
//!
//! This layer provides:
//! - Mocked capabilities and their builder
//! - Typed operation handles and the stub configuration builder
//! - The name-keyed operation registry (sharded map)
//! - Sequencer and reporter adapters

pub mod method;
pub mod mock;
pub mod registry;
pub mod reporter;
pub mod sequencer;

/// Test helpers.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides a capturing tracing layer and a
/// capturing reporter.
///
/// To use these helpers in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// stand-in = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
