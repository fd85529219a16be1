//! Object Context
//!
//! Holds the configuration and the host collaborators, and implements
//! construction and resizing of shared payloads. Introspection, conversion
//! and cloning live in sibling modules as further `impl ObjectContext` blocks.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::config::ObjectConfig;
use crate::error::{AmlError, AmlResult};
use crate::host::{Allocation, Allocator, Diagnostics, LogDiagnostics, Namespace, SystemAllocator};

use super::payload::{BufferPayload, PackagePayload, Shared, StringPayload};
use super::variable::Variable;

/// Entry point for every object operation the executor performs
pub struct ObjectContext {
    config: ObjectConfig,
    allocator: Rc<dyn Allocator>,
    pub(crate) diagnostics: Rc<dyn Diagnostics>,
    pub(crate) namespace: Rc<dyn Namespace>,
}

impl ObjectContext {
    /// Create a context using the system allocator and `log`-based diagnostics
    pub fn new(config: ObjectConfig, namespace: Rc<dyn Namespace>) -> Self {
        ObjectContext {
            config,
            allocator: Rc::new(SystemAllocator),
            diagnostics: Rc::new(LogDiagnostics),
            namespace,
        }
    }

    pub fn with_allocator(mut self, allocator: Rc<dyn Allocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    // Allocation
    //
    // Every admitted request comes back as an `Allocation`; dropping it (on a
    // failure path, or when the payload holding it goes away) returns the
    // bytes to the host.

    fn admit(&self, size: usize) -> AmlResult<Allocation> {
        if size > self.config.max_allocation || !self.allocator.allocate(size) {
            log::debug!("allocation of {} bytes refused", size);
            return Err(AmlError::OutOfMemory);
        }
        Ok(Allocation::new(self.allocator.clone(), size))
    }

    fn admit_header<T>(&self) -> AmlResult<Allocation> {
        self.admit(mem::size_of::<RefCell<T>>())
    }

    /// Zero-filled byte content
    fn alloc_bytes(&self, size: usize) -> AmlResult<(Vec<u8>, Allocation)> {
        let charge = self.admit(size)?;
        let mut content = Vec::new();
        content
            .try_reserve_exact(size)
            .map_err(|_| AmlError::OutOfMemory)?;
        content.resize(size, 0);
        Ok((content, charge))
    }

    /// `count` empty element slots
    fn alloc_slots(&self, count: usize) -> AmlResult<(Vec<Variable>, Allocation)> {
        let bytes = count
            .checked_mul(mem::size_of::<Variable>())
            .ok_or(AmlError::OutOfMemory)?;
        let charge = self.admit(bytes)?;
        let mut elems = Vec::new();
        elems
            .try_reserve_exact(count)
            .map_err(|_| AmlError::OutOfMemory)?;
        elems.resize_with(count, Variable::default);
        Ok((elems, charge))
    }

    // A refused content allocation drops `header`, releasing it.

    pub(crate) fn new_string(&self, length: usize) -> AmlResult<Shared<StringPayload>> {
        let size = length.checked_add(1).ok_or(AmlError::OutOfMemory)?;
        let header = self.admit_header::<StringPayload>()?;
        let (content, storage) = self.alloc_bytes(size)?;
        Ok(Rc::new(RefCell::new(StringPayload::new(header, content, storage))))
    }

    pub(crate) fn new_buffer(&self, size: usize) -> AmlResult<Shared<BufferPayload>> {
        let header = self.admit_header::<BufferPayload>()?;
        let (content, storage) = self.alloc_bytes(size)?;
        Ok(Rc::new(RefCell::new(BufferPayload::new(header, content, storage))))
    }

    pub(crate) fn new_package(&self, count: usize) -> AmlResult<Shared<PackagePayload>> {
        let header = self.admit_header::<PackagePayload>()?;
        let (elems, storage) = self.alloc_slots(count)?;
        Ok(Rc::new(RefCell::new(PackagePayload::new(header, elems, storage))))
    }

    // Construction

    /// String with room for `length` characters, all zero
    pub fn create_string(&self, length: usize) -> AmlResult<Variable> {
        self.new_string(length).map(Variable::String)
    }

    /// String holding `s` up to its first NUL byte
    pub fn create_c_string(&self, s: &[u8]) -> AmlResult<Variable> {
        let n = s.iter().position(|&b| b == 0).unwrap_or(s.len());
        let payload = self.new_string(n)?;
        payload.borrow_mut().content[..n].copy_from_slice(&s[..n]);
        Ok(Variable::String(payload))
    }

    pub fn create_buffer(&self, size: usize) -> AmlResult<Variable> {
        self.new_buffer(size).map(Variable::Buffer)
    }

    /// Package of `count` uninitialized elements
    pub fn create_pkg(&self, count: usize) -> AmlResult<Variable> {
        self.new_package(count).map(Variable::Package)
    }

    // Resizing
    //
    // Payloads are shared, so a resize is visible through every variable that
    // shares it. On failure the payload is left exactly as it was.

    /// Grow the string's storage so it can hold `length` characters.
    /// Content is never reallocated smaller.
    pub fn resize_string(&self, object: &Variable, length: usize) -> AmlResult<()> {
        let Variable::String(payload) = object else {
            return Err(AmlError::TypeMismatch);
        };
        let mut string = payload.borrow_mut();
        let current = string.len();
        if length > current {
            let size = length.checked_add(1).ok_or(AmlError::OutOfMemory)?;
            let (mut content, storage) = self.alloc_bytes(size)?;
            content[..current].copy_from_slice(&string.content[..current]);
            log::trace!("string storage grown from {} to {} bytes", string.content.len(), size);
            string.content = content;
            // old charge released here
            string.storage = storage;
        }
        Ok(())
    }

    pub fn resize_buffer(&self, object: &Variable, size: usize) -> AmlResult<()> {
        let Variable::Buffer(payload) = object else {
            return Err(AmlError::TypeMismatch);
        };
        let mut buffer = payload.borrow_mut();
        let current = buffer.size();
        if size > current {
            let (mut content, storage) = self.alloc_bytes(size)?;
            content[..current].copy_from_slice(&buffer.content);
            log::trace!("buffer grown from {} to {} bytes", current, size);
            buffer.content = content;
            buffer.storage = storage;
        } else {
            buffer.content.truncate(size);
        }
        Ok(())
    }

    /// Shrinking drops the trailing elements in place; growing moves the
    /// existing elements into a fresh, larger array.
    pub fn resize_pkg(&self, object: &Variable, count: usize) -> AmlResult<()> {
        let Variable::Package(payload) = object else {
            return Err(AmlError::TypeMismatch);
        };
        let mut package = payload.borrow_mut();
        let current = package.size();
        if count <= current {
            package.elems.truncate(count);
        } else {
            let (mut elems, storage) = self.alloc_slots(count)?;
            for (slot, old) in elems.iter_mut().zip(package.elems.iter_mut()) {
                *slot = old.take();
            }
            log::trace!("package grown from {} to {} elements", current, count);
            package.elems = elems;
            package.storage = storage;
        }
        Ok(())
    }
}
