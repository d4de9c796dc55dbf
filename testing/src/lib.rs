//! # Composable Store Testing
//!
//! Testing utilities and helpers for composable stores.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`Recorder`], which captures every value a [`Subject`] delivers
//!
//! ## Example
//!
//! ```ignore
//! use composable_store_testing::{test_clock, SequentialIdGenerator};
//!
//! #[test]
//! fn creates_todo() {
//!     let env = TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()));
//!     let store = TodoStore::new(env);
//!
//!     store.create("Buy milk");
//!     assert_eq!(store.snapshot().len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use composable_store_core::environment::{Clock, IdGenerator};
use composable_store_runtime::{Subject, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{AtomicU64, Clock, DateTime, IdGenerator, Ordering, Utc, Uuid};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use composable_store_testing::mocks::FixedClock;
    /// use composable_store_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }

    /// Predictable identifiers: `00000000-0000-0000-0000-000000000001`, `...002`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }

        /// The id that the `n`th call (1-based) to `next_id` returns
        #[must_use]
        pub const fn nth(n: u64) -> Uuid {
            Uuid::from_u64_pair(0, n)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> Uuid {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            Self::nth(n)
        }
    }

    /// Generator that always returns the same id, for duplicate-id paths
    #[derive(Debug, Clone, Copy)]
    pub struct RepeatingIdGenerator(pub Uuid);

    impl IdGenerator for RepeatingIdGenerator {
        fn next_id(&self) -> Uuid {
            self.0
        }
    }
}

/// Captures every value delivered by a [`Subject`]
///
/// The recorder stays attached until it is dropped.
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
    _subscription: Subscription,
}

impl<T> Recorder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Subscribe to `subject`; the replayed current value is the first entry
    #[must_use]
    pub fn attach(subject: &Subject<T>) -> Self {
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&values);
        let subscription = subject.subscribe(move |value: &T| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(value.clone());
        });

        Self {
            values,
            _subscription: subscription,
        }
    }

    /// Everything received so far, in delivery order
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of deliveries so far
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Most recent delivery
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

/// Install a test-friendly tracing subscriber
///
/// Honours `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, RepeatingIdGenerator, SequentialIdGenerator, test_clock};
