//! Deferred teardown for resources without a natural RAII owner.

/// LIFO registry of teardown closures.
///
/// Raw Vulkan handles created during engine setup register their destructor
/// here in creation order; `flush()` runs the closures in reverse so that
/// dependents are destroyed before the objects they were created from.
#[derive(Default)]
pub struct DeletionQueue {
    deletors: Vec<Box<dyn FnOnce() + Send>>,
}

impl DeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teardown closure. Closures run in reverse push order.
    pub fn push(&mut self, f: impl FnOnce() + Send + 'static) {
        self.deletors.push(Box::new(f));
    }

    /// Execute all registered closures, newest first, and clear the queue.
    pub fn flush(&mut self) {
        for deletor in self.deletors.drain(..).rev() {
            deletor();
        }
    }

    pub fn len(&self) -> usize {
        self.deletors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deletors.is_empty()
    }
}

impl Drop for DeletionQueue {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn flush_runs_in_reverse_push_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut queue = DeletionQueue::new();
        for i in 0..5 {
            let order = Arc::clone(&order);
            queue.push(move || order.lock().unwrap().push(i));
        }

        queue.flush();
        assert_eq!(*order.lock().unwrap(), vec![4, 3, 2, 1, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn flush_twice_runs_each_closure_once() {
        let count = Arc::new(Mutex::new(0));
        let mut queue = DeletionQueue::new();
        let c = Arc::clone(&count);
        queue.push(move || *c.lock().unwrap() += 1);

        queue.flush();
        queue.flush();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn drop_flushes_remaining_closures() {
        let fired = Arc::new(Mutex::new(false));
        {
            let mut queue = DeletionQueue::new();
            let fired = Arc::clone(&fired);
            queue.push(move || *fired.lock().unwrap() = true);
        }
        assert!(*fired.lock().unwrap());
    }
}
