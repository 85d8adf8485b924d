//! Domain layer - pure values with no knowledge of locking or logging.
//!
//! - Operation identity and signatures
//! - Invocation records
//! - Argument matchers
//! - Response generators
//! - Verification verdicts

pub mod invocation;
pub mod matcher;
pub mod operation;
pub mod response;
pub mod verdict;
