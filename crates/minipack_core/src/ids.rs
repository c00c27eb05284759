use crate::types::ModuleId;

/// Hands out module ids for a single build. Owned by the graph builder, never shared.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ModuleId {
        let id = ModuleId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_contiguous_from_zero() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), ModuleId(0));
        assert_eq!(ids.allocate(), ModuleId(1));
        assert_eq!(ids.allocate(), ModuleId(2));
        assert_eq!(ids.allocated(), 3);
    }

    #[test]
    fn test_fresh_allocator_restarts() {
        let mut first = IdAllocator::new();
        first.allocate();
        first.allocate();
        let mut second = IdAllocator::new();
        assert_eq!(second.allocate(), ModuleId(0));
    }
}
