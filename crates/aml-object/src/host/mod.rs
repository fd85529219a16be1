//! Host collaborators
//!
//! Capabilities the embedding kernel or bootloader supplies to the object layer.

pub mod allocator;
pub mod diagnostics;
pub mod namespace;

pub use allocator::{Allocation, Allocator, SystemAllocator};
pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use namespace::{Namespace, NodeHandle, NodeKind};
