//! Thread-keyed handoff of values into components that the front end
//! instantiates itself.
//!
//! A [`HandoffSlot`] holds at most one value per thread. Installing a value
//! returns a [`HandoffGuard`] that clears the calling thread's entry when it
//! goes out of scope, whether the guarded call returned, failed or panicked.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

/// Lock-protected single-slot registry keyed by thread identity.
#[derive(Debug)]
pub struct HandoffSlot<T> {
    slots: Mutex<HashMap<ThreadId, T>>,
}

impl<T: Clone> HandoffSlot<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ThreadId, T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` for the current thread until the guard is dropped.
    ///
    /// A value already installed on this thread is replaced.
    pub fn install(&self, value: T) -> HandoffGuard<'_, T> {
        self.lock().insert(thread::current().id(), value);
        HandoffGuard { slot: self }
    }

    /// The value installed for the current thread, if any.
    pub fn get(&self) -> Option<T> {
        self.lock().get(&thread::current().id()).cloned()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn clear(&self) {
        self.lock().remove(&thread::current().id());
    }
}

impl<T: Clone> Default for HandoffSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the current thread's slot entry on drop.
#[must_use = "the slot is cleared as soon as the guard is dropped"]
pub struct HandoffGuard<'a, T: Clone> {
    slot: &'a HandoffSlot<T>,
}

impl<T: Clone> Drop for HandoffGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{self, AssertUnwindSafe},
        sync::{Arc, Barrier},
    };

    use super::*;

    #[test]
    fn test_install_and_clear() {
        let slot = HandoffSlot::new();
        assert_eq!(slot.get(), None::<u32>);

        {
            let _guard = slot.install(7u32);
            assert_eq!(slot.get(), Some(7));
        }

        assert_eq!(slot.get(), None);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_cleared_on_panic() {
        let slot = HandoffSlot::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = slot.install("registration".to_string());
            panic!("front end blew up");
        }));

        assert!(result.is_err());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_values_are_per_thread() {
        let slot = Arc::new(HandoffSlot::new());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2u32)
            .map(|i| {
                let slot = Arc::clone(&slot);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let _guard = slot.install(i);
                    barrier.wait();
                    slot.get()
                })
            })
            .collect();

        let seen: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen, vec![Some(0), Some(1)]);
        assert!(slot.is_empty());
    }
}
