//! Shared Payloads
//!
//! Heap objects behind String, Buffer and Package variables. Each is shared
//! through `Rc<RefCell<_>>`: the strong count is the reference count, and a
//! payload is freed exactly once when the last variable lets go of it.
//!
//! Every payload holds the allocator charges for its header and its content,
//! so dropping the payload (or swapping in new content) returns them to the host.

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::Allocation;

use super::variable::Variable;

/// Shared, non-atomic, interior-mutable payload handle
pub type Shared<T> = Rc<RefCell<T>>;

/// NUL-terminated byte string.
///
/// `content` is always at least one byte longer than the logical length, so a
/// terminator is guaranteed to exist.
#[derive(Debug)]
pub struct StringPayload {
    pub(crate) content: Vec<u8>,
    pub(crate) storage: Allocation,
    header: Allocation,
}

impl StringPayload {
    pub(crate) fn new(header: Allocation, content: Vec<u8>, storage: Allocation) -> Self {
        debug_assert!(content.contains(&0));
        StringPayload {
            content,
            storage,
            header,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_content(content: Vec<u8>) -> Self {
        let size = content.len();
        Self::new(Allocation::untracked(0), content, Allocation::untracked(size))
    }

    /// Bytes currently charged to the host for this payload
    pub fn charged(&self) -> usize {
        self.header.size() + self.storage.size()
    }

    /// Logical length: offset of the first NUL
    pub fn len(&self) -> usize {
        self.content
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.content.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Longest string the current content can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.content.len() - 1
    }

    /// Bytes up to (not including) the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.content[..self.len()]
    }

    /// Writable content. The final terminator byte is not exposed.
    pub fn content_mut(&mut self) -> &mut [u8] {
        let end = self.content.len() - 1;
        &mut self.content[..end]
    }
}

impl PartialEq for StringPayload {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Eq for StringPayload {}

/// Fixed-size byte buffer
#[derive(Debug)]
pub struct BufferPayload {
    pub(crate) content: Vec<u8>,
    pub(crate) storage: Allocation,
    header: Allocation,
}

impl BufferPayload {
    pub(crate) fn new(header: Allocation, content: Vec<u8>, storage: Allocation) -> Self {
        BufferPayload {
            content,
            storage,
            header,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_content(content: Vec<u8>) -> Self {
        let size = content.len();
        Self::new(Allocation::untracked(0), content, Allocation::untracked(size))
    }

    /// Bytes currently charged to the host for this payload
    pub fn charged(&self) -> usize {
        self.header.size() + self.storage.size()
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.content
    }
}

impl PartialEq for BufferPayload {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Eq for BufferPayload {}

/// Ordered sequence of exclusively owned element variables
#[derive(Debug)]
pub struct PackagePayload {
    pub(crate) elems: Vec<Variable>,
    pub(crate) storage: Allocation,
    header: Allocation,
}

impl PackagePayload {
    pub(crate) fn new(header: Allocation, elems: Vec<Variable>, storage: Allocation) -> Self {
        PackagePayload {
            elems,
            storage,
            header,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_elems(elems: Vec<Variable>) -> Self {
        Self::new(Allocation::untracked(0), elems, Allocation::untracked(0))
    }

    /// Bytes currently charged to the host for this payload
    pub fn charged(&self) -> usize {
        self.header.size() + self.storage.size()
    }

    pub fn size(&self) -> usize {
        self.elems.len()
    }

    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.elems.get(index)
    }

    pub fn elements(&self) -> &[Variable] {
        &self.elems
    }

    /// Replace element `index`, dropping the previous occupant
    pub fn set(&mut self, index: usize, value: Variable) -> Option<()> {
        let slot = self.elems.get_mut(index)?;
        *slot = value;
        Some(())
    }
}

impl PartialEq for PackagePayload {
    fn eq(&self, other: &Self) -> bool {
        self.elems == other.elems
    }
}
