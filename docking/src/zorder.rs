//! Stacking order of floating containers
//!
//! The windowing substrate does not report the stacking order of floating
//! windows, so the engine keeps its own list, most recently raised first.

use crate::pane::ContainerId;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct FloatingOrder {
    names: Vec<ContainerId>,
}

impl FloatingOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a container on top of the stack, adding it if unknown
    pub fn raise(&mut self, container: &ContainerId) {
        self.names.retain(|name| name != container);
        self.names.insert(0, container.clone());
        trace!(container = %container, "Raised floating container");
    }

    pub fn remove(&mut self, container: &ContainerId) {
        self.names.retain(|name| name != container);
    }

    pub fn contains(&self, container: &ContainerId) -> bool {
        self.names.contains(container)
    }

    /// Front-most container, if any
    pub fn top(&self) -> Option<&ContainerId> {
        self.names.first()
    }

    /// Iterate front to back
    pub fn iter(&self) -> std::slice::Iter<'_, ContainerId> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ContainerId {
        ContainerId::new(name)
    }

    #[test]
    fn test_raise_moves_to_front() {
        let mut order = FloatingOrder::new();
        order.raise(&id("a"));
        order.raise(&id("b"));
        order.raise(&id("c"));
        assert_eq!(order.top(), Some(&id("c")));

        order.raise(&id("a"));
        let names: Vec<_> = order.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_iterates_both_ways() {
        let mut order = FloatingOrder::new();
        order.raise(&id("a"));
        order.raise(&id("b"));
        let back_to_front: Vec<_> = order.iter().rev().map(|c| c.as_str()).collect();
        assert_eq!(back_to_front, vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut order = FloatingOrder::new();
        order.raise(&id("a"));
        order.raise(&id("b"));
        order.remove(&id("a"));
        assert!(!order.contains(&id("a")));
        assert_eq!(order.len(), 1);

        // Removing an unknown container is a no-op
        order.remove(&id("zzz"));
        assert_eq!(order.len(), 1);
    }
}
