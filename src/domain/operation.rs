//! Operation identity.
//!
//! An operation is one callable member of a mocked capability. It is named,
//! carries the type names of its argument tuple and return value, and is
//! addressed by an [`OperationId`] that is unique across every capability in
//! the process.

use std::fmt;
use std::sync::Arc;

/// Process-unique identifier of an operation.
///
/// Combines the owning capability's instance id with the operation's
/// registration index inside that capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId {
    capability: u64,
    index: u32,
}

impl OperationId {
    /// Create an identifier from a capability instance id and a registration index.
    pub fn new(capability: u64, index: u32) -> Self {
        Self { capability, index }
    }

    /// Instance id of the capability that owns this operation.
    pub fn capability(&self) -> u64 {
        self.capability
    }

    /// Registration index within the owning capability.
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Description of one operation of a capability.
///
/// Immutable once created; cloning is cheap (the capability name is shared).
#[derive(Debug, Clone)]
pub struct Operation {
    id: OperationId,
    capability: Arc<str>,
    name: &'static str,
    arguments: &'static str,
    returns: &'static str,
}

impl Operation {
    /// Describe an operation whose argument tuple is `A` and return type is `R`.
    pub fn of<A, R>(id: OperationId, capability: Arc<str>, name: &'static str) -> Self {
        Self {
            id,
            capability,
            name,
            arguments: std::any::type_name::<A>(),
            returns: std::any::type_name::<R>(),
        }
    }

    /// Identity used to match records to patterns.
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Name of the owning capability (e.g. `View`).
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Operation name (e.g. `display`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name of the argument tuple.
    pub fn argument_type(&self) -> &'static str {
        self.arguments
    }

    /// Type name of the return value.
    pub fn return_type(&self) -> &'static str {
        self.returns
    }

    /// Full signature, e.g. `View::display(i32) -> bool`.
    pub fn signature(&self) -> String {
        format!(
            "{}::{}({}) -> {}",
            self.capability, self.name, self.arguments, self.returns
        )
    }
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Operation {}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.capability, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_signature() {
        let op = Operation::of::<i32, bool>(OperationId::new(1, 0), Arc::from("View"), "display");

        assert_eq!(op.to_string(), "View::display");
        assert_eq!(op.signature(), "View::display(i32) -> bool");
        assert_eq!(op.argument_type(), "i32");
        assert_eq!(op.return_type(), "bool");
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Operation::of::<i32, bool>(OperationId::new(1, 0), Arc::from("View"), "display");
        let b = Operation::of::<i32, bool>(OperationId::new(1, 0), Arc::from("View"), "display");
        let c = Operation::of::<i32, bool>(OperationId::new(2, 0), Arc::from("View"), "display");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ids_order_by_capability_then_index() {
        let first = OperationId::new(1, 5);
        let second = OperationId::new(2, 0);
        assert!(first < second);
        assert!(OperationId::new(1, 0) < OperationId::new(1, 1));
    }
}
