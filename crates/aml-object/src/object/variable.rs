//! Runtime Variable Representation
//!
//! `Variable` is the value every AML operator reads and writes. Cloning a
//! `Variable` is a shallow assignment: payloads are shared, not copied. Deep
//! copies go through `ObjectContext::clone_into`.

use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::error::{AmlError, AmlResult};
use crate::host::NodeHandle;
use crate::name::AmlName;

use super::payload::{BufferPayload, PackagePayload, Shared, StringPayload};

/// Runtime value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Variable {
    /// Uninitialized slot
    #[default]
    None,

    Integer(u64),

    String(Shared<StringPayload>),

    Buffer(Shared<BufferPayload>),

    Package(Shared<PackagePayload>),

    /// Non-owning reference to a resolved namespace entry
    Handle(NodeHandle),

    /// Name awaiting resolution on first use
    LazyHandle(LazyName),
}

/// Encoded name plus the scope it must be resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyName {
    aml: Rc<[u8]>,
    context: NodeHandle,
}

impl LazyName {
    pub fn new(aml: &[u8], context: NodeHandle) -> Self {
        LazyName {
            aml: Rc::from(aml),
            context,
        }
    }

    /// Raw NameString bytes as they appeared in the table
    pub fn raw(&self) -> &[u8] {
        &self.aml
    }

    pub fn context(&self) -> NodeHandle {
        self.context
    }

    pub fn name(&self) -> AmlResult<AmlName> {
        AmlName::parse(&self.aml).map(|(name, _)| name)
    }
}

/// Abstract object type, as reported by `ObjectType` queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    None,
    Integer,
    String,
    Buffer,
    Package,
    Device,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::None => "none",
            ObjectType::Integer => "integer",
            ObjectType::String => "string",
            ObjectType::Buffer => "buffer",
            ObjectType::Package => "package",
            ObjectType::Device => "device",
        };
        write!(f, "{}", name)
    }
}

impl Variable {
    pub fn lazy_handle(aml: &[u8], context: NodeHandle) -> Self {
        Variable::LazyHandle(LazyName::new(aml, context))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Variable::None)
    }

    /// Short name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Variable::None => "none",
            Variable::Integer(_) => "integer",
            Variable::String(_) => "string",
            Variable::Buffer(_) => "buffer",
            Variable::Package(_) => "package",
            Variable::Handle(_) => "handle",
            Variable::LazyHandle(_) => "lazy handle",
        }
    }

    /// Number of variables sharing this payload; `None` for kinds without one
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Variable::String(p) => Some(Rc::strong_count(p)),
            Variable::Buffer(p) => Some(Rc::strong_count(p)),
            Variable::Package(p) => Some(Rc::strong_count(p)),
            _ => None,
        }
    }

    /// Whether both variables point at the very same payload
    pub fn shares_payload_with(&self, other: &Variable) -> bool {
        match (self, other) {
            (Variable::String(a), Variable::String(b)) => Rc::ptr_eq(a, b),
            (Variable::Buffer(a), Variable::Buffer(b)) => Rc::ptr_eq(a, b),
            (Variable::Package(a), Variable::Package(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // Slot operations

    /// Shallow assignment: share `src`'s payload, releasing our previous one
    pub fn assign(&mut self, src: &Variable) {
        *self = src.clone();
    }

    /// Move out, leaving this slot empty. No reference counts change.
    pub fn take(&mut self) -> Variable {
        mem::take(self)
    }

    pub fn swap(&mut self, other: &mut Variable) {
        mem::swap(self, other);
    }

    /// Release whatever this slot holds
    pub fn finalize(&mut self) {
        *self = Variable::None;
    }

    // Typed accessors

    pub fn string_len(&self) -> AmlResult<usize> {
        match self {
            Variable::String(p) => Ok(p.borrow().len()),
            _ => Err(AmlError::TypeMismatch),
        }
    }

    pub fn string_bytes(&self) -> AmlResult<Vec<u8>> {
        match self {
            Variable::String(p) => Ok(p.borrow().as_bytes().to_vec()),
            _ => Err(AmlError::TypeMismatch),
        }
    }

    /// Run `f` over the writable string content (terminator excluded)
    pub fn with_string_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> AmlResult<R> {
        match self {
            Variable::String(p) => Ok(f(p.borrow_mut().content_mut())),
            _ => Err(AmlError::TypeMismatch),
        }
    }

    pub fn buffer_size(&self) -> AmlResult<usize> {
        match self {
            Variable::Buffer(p) => Ok(p.borrow().size()),
            _ => Err(AmlError::TypeMismatch),
        }
    }

    pub fn buffer_bytes(&self) -> AmlResult<Vec<u8>> {
        match self {
            Variable::Buffer(p) => Ok(p.borrow().as_bytes().to_vec()),
            _ => Err(AmlError::TypeMismatch),
        }
    }

    pub fn with_buffer_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> AmlResult<R> {
        match self {
            Variable::Buffer(p) => Ok(f(p.borrow_mut().as_bytes_mut())),
            _ => Err(AmlError::TypeMismatch),
        }
    }

    pub fn pkg_size(&self) -> AmlResult<usize> {
        match self {
            Variable::Package(p) => Ok(p.borrow().size()),
            _ => Err(AmlError::TypeMismatch),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::None => write!(f, "<none>"),
            Variable::Integer(v) => write!(f, "0x{:X}", v),
            Variable::String(p) => {
                write!(f, "\"{}\"", String::from_utf8_lossy(p.borrow().as_bytes()))
            }
            Variable::Buffer(p) => {
                write!(f, "Buffer {{")?;
                for (i, b) in p.borrow().as_bytes().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " 0x{:02X}", b)?;
                }
                write!(f, " }}")
            }
            Variable::Package(p) => {
                write!(f, "Package {{")?;
                for (i, elem) in p.borrow().elements().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}", elem)?;
                }
                write!(f, " }}")
            }
            Variable::Handle(h) => write!(f, "<handle {}>", h.0),
            Variable::LazyHandle(lazy) => match lazy.name() {
                Ok(name) => write!(f, "<unresolved {}>", name),
                Err(_) => write!(f, "<unresolved ?>"),
            },
        }
    }
}
