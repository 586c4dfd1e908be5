//! Observable value container
//!
//! A [`Store`] holds one immutable snapshot at a time. Writers replace the
//! snapshot (`set`) or derive the next one from the current one (`update`);
//! every listener is then called synchronously with the new snapshot.
//!
//! Writes and their notifications are serialized: listeners see snapshots in
//! the order they were stored, and the last one a listener sees is the
//! current value. Listeners may read the store with `get`, but must not
//! write to it or subscribe from inside a notification.
//!
//! # Usage
//!
//! ```
//! use playground::core::store::Store;
//! use std::sync::{Arc, Mutex};
//!
//! let store = Store::new(1);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let handle = store.subscribe(move |value: &i32| sink.lock().unwrap().push(*value));
//!
//! store.update(|value| value + 1);
//! handle.unsubscribe();
//! store.set(10);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
//! assert_eq!(*store.get(), 10);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct StoreInner<T> {
    value: RwLock<Arc<T>>,
    listeners: RwLock<Vec<(u64, Listener<T>)>>,
    next_listener_id: AtomicU64,
    /// Held from a write until its listeners have run
    notifying: Mutex<()>,
}

/// Cloneable handle to a shared, observable value
///
/// Clones share the same value and the same listeners.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                value: RwLock::new(Arc::new(initial)),
                listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                notifying: Mutex::new(()),
            }),
        }
    }

    /// Current snapshot
    pub fn get(&self) -> Arc<T> {
        self.inner
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the snapshot and notify listeners
    pub fn set(&self, value: T) {
        let _notifying = self.lock_notifications();
        let snapshot = Arc::new(value);
        *self
            .inner
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        self.notify(&snapshot);
    }

    /// Derive the next snapshot from the current one and notify listeners
    ///
    /// `transform` runs under the write lock, so concurrent updates are
    /// applied one after the other. It must not call back into this store.
    pub fn update<F>(&self, transform: F) -> Arc<T>
    where
        F: FnOnce(&T) -> T,
    {
        let _notifying = self.lock_notifications();
        let snapshot = {
            let mut guard = self
                .inner
                .value
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let next = Arc::new(transform(&**guard));
            *guard = next.clone();
            next
        };
        self.notify(&snapshot);
        snapshot
    }

    /// Register `listener`; it is called at once with the current snapshot
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener<T> = Arc::new(listener);
        let _notifying = self.lock_notifications();

        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener.clone()));

        listener(self.get().as_ref());

        Unsubscribe {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_notifications(&self) -> MutexGuard<'_, ()> {
        self.inner
            .notifying
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, snapshot: &T) {
        // Only the notification lock is held while listeners run
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Handle returned by [`Store::subscribe`]
///
/// Dropping the handle keeps the listener registered.
#[must_use = "dropping the handle makes the listener impossible to remove"]
pub struct Unsubscribe<T> {
    store: Weak<StoreInner<T>>,
    id: u64,
}

impl<T> Unsubscribe<T> {
    /// Remove the listener; a no-op once the store is gone
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            store
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
