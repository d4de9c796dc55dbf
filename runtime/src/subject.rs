//! Reactive value holders.
//!
//! A [`Subject`] always has a current value. Subscribers receive that value
//! immediately and then every value published afterwards, synchronously and in
//! publish order. Nothing older than the current value is retained.
//!
//! ```
//! use composable_store_runtime::Subject;
//! use std::sync::{Arc, Mutex};
//!
//! let subject = Subject::new("counter", 0);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! let subscription = subject.subscribe(move |v: &i32| sink.lock().unwrap().push(*v));
//!
//! subject.publish(1);
//! drop(subscription);
//! subject.publish(2);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
//! assert_eq!(subject.value(), 2);
//! ```

use futures::Stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    name: &'static str,
    sender: watch::Sender<T>,
    observers: Mutex<Observers<T>>,
    next_id: AtomicU64,
}

struct Observers<T> {
    attached: Vec<(u64, Observer<T>)>,
    /// Set while a publish is delivering; nested publishes queue up behind it
    delivering: bool,
    pending: VecDeque<T>,
}

impl<T> Observers<T> {
    const fn new() -> Self {
        Self {
            attached: Vec::new(),
            delivering: false,
            pending: VecDeque::new(),
        }
    }
}

/// Ends the delivery round when an observer panics, dropping queued values.
struct Delivering<'a, T> {
    inner: &'a Inner<T>,
}

impl<T> Drop for Delivering<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut observers =
                self.inner.observers.lock().unwrap_or_else(PoisonError::into_inner);
            observers.delivering = false;
            observers.pending.clear();
        }
    }
}

/// Removal hook used by [`Subscription`], erased over the value type.
trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<T: Send + Sync> Detach for Inner<T> {
    fn detach(&self, id: u64) {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        observers.attached.retain(|(observer_id, _)| *observer_id != id);
        tracing::trace!(subject = self.name, id, "Observer detached");
    }
}

/// A value that can be observed
///
/// Cloning a `Subject` yields another handle to the same value and observers.
pub struct Subject<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Subject<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a subject holding `initial`
    ///
    /// `name` identifies the subject in logs and metric labels.
    #[must_use]
    pub fn new(name: &'static str, initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                name,
                sender,
                observers: Mutex::new(Observers::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Name given at construction
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Latest published value
    #[must_use]
    pub fn value(&self) -> T {
        self.inner.sender.borrow().clone()
    }

    /// Number of attached observers
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.lock_observers().attached.len()
    }

    /// Replace the current value and deliver it to every observer
    ///
    /// Observers run on the calling thread after the internal lock is
    /// released, so an observer may publish or subscribe again. A value
    /// published from inside an observer is delivered once every observer
    /// has seen the current one, keeping publish order for all of them.
    /// Until then it is not yet the subject's [`value`](Subject::value).
    pub fn publish(&self, value: T) {
        let mut next = {
            let mut observers = self.lock_observers();
            if observers.delivering {
                tracing::trace!(subject = self.inner.name, "Queueing nested publish");
                observers.pending.push_back(value);
                return;
            }
            observers.delivering = true;
            Some(value)
        };
        let _round = Delivering { inner: &self.inner };

        while let Some(value) = next.take() {
            let observers: Vec<Observer<T>> = {
                let observers = self.lock_observers();
                self.inner.sender.send_replace(value.clone());
                observers.attached.iter().map(|(_, observer)| Arc::clone(observer)).collect()
            };

            tracing::debug!(
                subject = self.inner.name,
                observers = observers.len(),
                "Publishing value"
            );
            metrics::counter!(crate::metrics::SUBJECT_PUBLISHED, "subject" => self.inner.name)
                .increment(1);

            for observer in observers {
                observer(&value);
            }

            let mut observers = self.lock_observers();
            next = observers.pending.pop_front();
            if next.is_none() {
                observers.delivering = false;
            }
        }
    }

    /// Attach an observer
    ///
    /// The observer is called with the current value before this returns,
    /// then with every published value until the returned [`Subscription`]
    /// is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let observer: Observer<T> = Arc::new(observer);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let current = {
            let mut observers = self.lock_observers();
            observers.attached.push((id, Arc::clone(&observer)));
            self.inner.sender.borrow().clone()
        };
        tracing::trace!(subject = self.inner.name, id, "Observer attached");

        observer(&current);

        let weak = Arc::downgrade(&self.inner);
        let subject: Weak<dyn Detach> = weak;
        Subscription { subject, id }
    }

    /// Receiver for async consumers
    ///
    /// A watch receiver only keeps the latest value: a slow consumer sees
    /// the newest value, not every intermediate one.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<T> {
        self.inner.sender.subscribe()
    }

    /// Stream of values: the current one first, then each observed change
    ///
    /// Ends once every handle to the subject is dropped. Has the same
    /// latest-value semantics as [`Subject::watch`].
    pub fn stream(&self) -> impl Stream<Item = T> + Send + use<T> {
        let mut rx = self.inner.sender.subscribe();
        async_stream::stream! {
            loop {
                let value = rx.borrow_and_update().clone();
                yield value;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Observers<T>> {
        self.inner.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.sender.borrow())
            .finish_non_exhaustive()
    }
}

/// Handle keeping an observer attached to a [`Subject`]
///
/// Dropping it detaches the observer.
#[must_use = "dropping a Subscription detaches the observer immediately"]
pub struct Subscription {
    subject: Weak<dyn Detach>,
    id: u64,
}

impl Subscription {
    /// Detach the observer now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subject) = self.subject.upgrade() {
            subject.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
