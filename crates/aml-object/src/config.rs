//! Object Configuration
//!
//! Caps on what a single object operation may ask the host for. A table that
//! declares an oversized buffer or package is refused here, before the host
//! allocator is consulted.

/// Object layer configuration
#[derive(Debug, Clone)]
pub struct ObjectConfig {
    /// Largest single allocation (in bytes) any operation may request.
    /// Larger requests fail with `OutOfMemory` before reaching the allocator.
    pub max_allocation: usize,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        ObjectConfig {
            max_allocation: 16 * 1024 * 1024,
        }
    }
}

impl ObjectConfig {
    /// 16 MiB per allocation, far above anything real firmware declares
    pub fn new() -> Self {
        Self::default()
    }
}
