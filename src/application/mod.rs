//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain values at runtime:
//! - Stub tables (ordered first-fit resolution)
//! - Call recorders (append-only, sequence-numbered histories)
//! - Verification expressions and the verifier
//! - Call metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement: a [`ports::Sequencer`] for the shared call
//! timeline and a [`ports::Reporter`] for surfacing failed verifications.

pub mod expression;
pub mod metrics;
pub mod ports;
pub mod recorder;
pub mod stub_table;
pub mod verifier;
