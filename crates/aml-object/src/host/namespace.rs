//! Namespace resolver capability
//!
//! Handles are small, stable ids handed out by the host namespace.
//! The object layer never owns the entry behind a handle.

use crate::name::AmlName;

/// Namespace entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u32);

/// Kind of a namespace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Scope,
    Device,
    Name,
    Method,
    Alias,
    Processor,
    ThermalZone,
    PowerResource,
    OperationRegion,
    Field,
    Mutex,
    Event,
}

pub trait Namespace {
    /// Resolve `name` relative to `context`; `None` if the name is undefined.
    fn resolve(&self, context: NodeHandle, name: &AmlName) -> Option<NodeHandle>;

    /// Kind of the entry behind `node`; `None` for a handle the namespace never issued.
    fn node_kind(&self, node: NodeHandle) -> Option<NodeKind>;
}
