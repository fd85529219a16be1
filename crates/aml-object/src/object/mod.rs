pub mod access;
pub mod clone;
pub mod context;
pub mod payload;
pub mod variable;

pub use context::ObjectContext;
pub use payload::{BufferPayload, PackagePayload, Shared, StringPayload};
pub use variable::{LazyName, ObjectType, Variable};
