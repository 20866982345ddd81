//! Replay-latest value holder with synchronous fan-out.
//!
//! `set` notifies every current subscriber before returning. A new subscriber is
//! called immediately with the current value. Writers are serialized through the
//! fan-out, so concurrent `set` calls reach every subscriber in write order and the
//! last value a subscriber saw is always the one `get` returns.
//!
//! Callbacks may read the observable they are attached to (and drop their own
//! `Subscription`), but must not `set` or `subscribe` on it.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
    // Held for a whole write plus its fan-out.
    notify: Arc<Mutex<()>>,
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    // A panicking subscriber never runs under the lock, so a poisoned guard still
    // holds a consistent value.
    inner
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn serialize(notify: &Mutex<()>) -> MutexGuard<'_, ()> {
    notify
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: initial,
                next_id: 0,
                subscribers: Vec::new(),
            })),
            notify: Arc::new(Mutex::new(())),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Replaces the value and notifies all current subscribers with it.
    pub fn set(&self, value: T) {
        let _writer = serialize(&self.notify);
        let (value, subscribers) = {
            let mut inner = lock(&self.inner);
            inner.value = value;
            let subscribers: Vec<Callback<T>> =
                inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect();
            (inner.value.clone(), subscribers)
        };

        for callback in subscribers {
            callback(&value);
        }
    }

    /// Registers `callback`, calls it with the current value, and returns the handle
    /// that detaches it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let _writer = serialize(&self.notify);
        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, callback.clone()));
            (id, inner.value.clone())
        };

        callback(&current);

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).subscribers.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Handle returned by [`Observable::subscribe`]. Dropping it also unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
