//! Introspection and conversion
//!
//! Type queries, typed reads, package element access and `ToBuffer`.

use crate::error::{AmlError, AmlResult};
use crate::host::{NodeHandle, NodeKind};

use super::context::ObjectContext;
use super::variable::{LazyName, ObjectType, Variable};

impl ObjectContext {
    /// Abstract type of `object`. Handles report the type of the entry they
    /// reference; lazy handles are resolved first.
    pub fn get_type(&self, object: &Variable) -> ObjectType {
        match object {
            Variable::None => ObjectType::None,
            Variable::Integer(_) => ObjectType::Integer,
            Variable::String(_) => ObjectType::String,
            Variable::Buffer(_) => ObjectType::Buffer,
            Variable::Package(_) => ObjectType::Package,
            Variable::Handle(node) => self.type_of_node(*node),
            Variable::LazyHandle(lazy) => {
                let node = self.resolve_lazy(lazy);
                self.type_of_node(node)
            }
        }
    }

    pub fn get_integer(&self, object: &Variable) -> AmlResult<u64> {
        match object {
            Variable::Integer(v) => Ok(*v),
            other => {
                self.diagnostics.warn(format_args!(
                    "get_integer() expects an integer, not a value of type {}",
                    other.kind_name()
                ));
                Err(AmlError::TypeMismatch)
            }
        }
    }

    /// Shallow copy of element `index`
    pub fn get_pkg(&self, object: &Variable, index: usize) -> AmlResult<Variable> {
        let Variable::Package(payload) = object else {
            return Err(AmlError::TypeMismatch);
        };
        payload
            .borrow()
            .get(index)
            .cloned()
            .ok_or(AmlError::OutOfBounds)
    }

    /// Shallow-assign `value` into element `index`
    pub fn pkg_store(&self, object: &Variable, index: usize, value: &Variable) -> AmlResult<()> {
        let Variable::Package(payload) = object else {
            return Err(AmlError::TypeMismatch);
        };
        payload
            .borrow_mut()
            .set(index, value.clone())
            .ok_or(AmlError::OutOfBounds)
    }

    pub fn get_handle(&self, object: &Variable) -> AmlResult<NodeHandle> {
        match object {
            Variable::Handle(node) => Ok(*node),
            Variable::LazyHandle(lazy) => Ok(self.resolve_lazy(lazy)),
            other => {
                self.diagnostics.warn(format_args!(
                    "get_handle() expects a handle type, not a value of type {}",
                    other.kind_name()
                ));
                Err(AmlError::TypeMismatch)
            }
        }
    }

    /// Convert to a buffer.
    ///
    /// Integers become their 8 little-endian bytes. A non-empty string becomes
    /// a buffer one byte longer than the string, the extra byte left zero.
    pub fn to_buffer(&self, object: &Variable) -> AmlResult<Variable> {
        match object {
            Variable::Integer(v) => {
                let payload = self.new_buffer(8)?;
                payload
                    .borrow_mut()
                    .as_bytes_mut()
                    .copy_from_slice(&v.to_le_bytes());
                Ok(Variable::Buffer(payload))
            }
            Variable::Buffer(_) => self.deep_clone(object),
            Variable::String(string) => {
                let string = string.borrow();
                let len = string.len();
                if len == 0 {
                    return self.create_buffer(0);
                }
                let payload = self.new_buffer(len + 1)?;
                payload.borrow_mut().as_bytes_mut()[..len].copy_from_slice(string.as_bytes());
                Ok(Variable::Buffer(payload))
            }
            other => {
                self.diagnostics.warn(format_args!(
                    "to_buffer() unsupported object type {}",
                    other.kind_name()
                ));
                Err(AmlError::IllegalArguments)
            }
        }
    }

    /// Resolve a lazy name. An undefined name is a table defect.
    fn resolve_lazy(&self, lazy: &LazyName) -> NodeHandle {
        let name = match lazy.name() {
            Ok(name) => name,
            Err(e) => self
                .diagnostics
                .fatal(format_args!("unparsable lazy name: {}", e)),
        };
        match self.namespace.resolve(lazy.context(), &name) {
            Some(node) => node,
            None => self
                .diagnostics
                .fatal(format_args!("undefined reference {}", name)),
        }
    }

    fn type_of_node(&self, node: NodeHandle) -> ObjectType {
        match self.namespace.node_kind(node) {
            Some(NodeKind::Device) => ObjectType::Device,
            Some(kind) => self
                .diagnostics
                .fatal(format_args!("unexpected node type {:?} in get_type()", kind)),
            None => self
                .diagnostics
                .fatal(format_args!("dangling namespace handle {}", node.0)),
        }
    }
}
