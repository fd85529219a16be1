use std::cell::Cell;

use aml_object::Allocator;

/// Allocation budget: admits requests until the byte budget runs out.
/// Freed bytes go back into the budget.
///
/// Bootloaders typically hand the interpreter a fixed heap; this models that
/// heap's exhaustion deterministically.
#[derive(Debug)]
pub struct BudgetAllocator {
    remaining: Cell<usize>,
    refusals: Cell<usize>,
}

impl BudgetAllocator {
    pub fn new(bytes: usize) -> Self {
        BudgetAllocator {
            remaining: Cell::new(bytes),
            refusals: Cell::new(0),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Number of requests refused so far
    pub fn refusals(&self) -> usize {
        self.refusals.get()
    }
}

impl Allocator for BudgetAllocator {
    fn allocate(&self, size: usize) -> bool {
        let remaining = self.remaining.get();
        if size > remaining {
            self.refusals.set(self.refusals.get() + 1);
            log::warn!(
                "allocation of {} bytes exceeds remaining budget of {} bytes",
                size,
                remaining
            );
            return false;
        }
        self.remaining.set(remaining - size);
        true
    }

    fn free(&self, size: usize) {
        self.remaining.set(self.remaining.get() + size);
    }
}
