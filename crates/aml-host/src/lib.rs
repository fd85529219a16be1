//! Host crate: kernel/bootloader side collaborators for the AML object model
//!
//! Provides a reference namespace tree and an allocation budget, and wires
//! them into an `ObjectContext`. Diagnostics go through the `log` facade.

pub use aml_object::{ObjectConfig, ObjectContext, Variable};

pub mod budget;
pub mod namespace;

pub use budget::BudgetAllocator;
pub use namespace::NamespaceTree;

use std::rc::Rc;

/// Object context backed by `namespace`, with the system allocator
pub fn object_context(namespace: Rc<NamespaceTree>, config: ObjectConfig) -> ObjectContext {
    ObjectContext::new(config, namespace)
}

/// Object context whose allocations draw from `budget`
pub fn budgeted_context(
    namespace: Rc<NamespaceTree>,
    config: ObjectConfig,
    budget: Rc<BudgetAllocator>,
) -> ObjectContext {
    ObjectContext::new(config, namespace).with_allocator(budget)
}
