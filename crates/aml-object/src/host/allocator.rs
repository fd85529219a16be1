//! Allocation admission
//!
//! The object layer allocates through the Rust allocator with fallible
//! reservation; the host decides beforehand whether a request is admitted,
//! and is told when that memory is given back.

use std::fmt;
use std::rc::Rc;

/// Host allocation policy. A refused request surfaces as `AmlError::OutOfMemory`.
pub trait Allocator {
    /// Admit (or refuse) an allocation of `size` bytes.
    fn allocate(&self, size: usize) -> bool;

    /// Return `size` bytes previously admitted by `allocate`.
    fn free(&self, size: usize);
}

/// Admits everything; failures then only come from the system allocator itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, _size: usize) -> bool {
        true
    }

    fn free(&self, _size: usize) {}
}

/// An admitted allocation. Dropping it hands the bytes back to the allocator
/// that admitted them.
pub struct Allocation {
    allocator: Rc<dyn Allocator>,
    size: usize,
}

impl Allocation {
    pub(crate) fn new(allocator: Rc<dyn Allocator>, size: usize) -> Self {
        Allocation { allocator, size }
    }

    /// Allocation no host ever sees
    #[cfg(test)]
    pub(crate) fn untracked(size: usize) -> Self {
        Allocation::new(Rc::new(SystemAllocator), size)
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        self.allocator.free(self.size);
    }
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation").field("size", &self.size).finish()
    }
}
