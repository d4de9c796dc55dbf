//! # Composable Store Runtime
//!
//! Runtime implementation for reducer-driven reactive stores.
//!
//! ## Core Components
//!
//! - **Store**: owns state, runs the reducer, executes effects
//! - **Subject**: a reactive value holder that replays its latest value to new
//!   subscribers and then pushes every update
//!
//! ## Example
//!
//! ```ignore
//! use composable_store_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action (runs to completion before returning)
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use composable_store_core::{effect::Effect, reducer::Reducer};
use std::sync::{Arc, PoisonError, RwLock};

/// Metric names and descriptions
pub mod metrics;

/// Reactive value streams
pub mod subject;

pub use subject::{Subject, Subscription};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Dispatch effects nested deeper than the configured limit
        ///
        /// Usually a reducer that keeps dispatching the action it is handling.
        #[error("Dispatch depth limit of {0} exceeded")]
        DispatchDepthExceeded(usize),
    }
}

pub use error::StoreError;

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Capacity of the dispatched-action broadcast channel
    pub broadcast_capacity: usize,
    /// Maximum nesting of `Effect::Dispatch` chains
    pub max_dispatch_depth: usize,
}

impl StoreConfig {
    /// Set the broadcast channel capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the dispatch depth limit
    #[must_use]
    pub const fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            max_dispatch_depth: 32,
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Effect, PoisonError, Reducer, RwLock, StoreConfig, StoreError};
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (dispatch feedback loop)
    ///
    /// `send` is synchronous: when it returns, the action and every action it
    /// dispatched have been reduced. Cloning a store yields another handle to
    /// the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        /// Broadcast of every action produced by `Effect::Dispatch`.
        ///
        /// Actions passed to `send` directly are not broadcast.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        A: Clone + std::fmt::Debug,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with explicit configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                action_broadcast,
            }
        }

        /// Returns the injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the write lock, releases the lock, then
        /// executes the returned effects in order. Dispatched actions are
        /// broadcast to `subscribe_actions` receivers and reduced before this
        /// call returns.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::DispatchDepthExceeded`] if dispatch effects nest
        /// deeper than `max_dispatch_depth`. Actions reduced before the limit
        /// was hit stay applied.
        #[tracing::instrument(skip_all, name = "store_send")]
        pub fn send(&self, action: A) -> Result<(), StoreError> {
            self.send_internal(action, 0)
        }

        fn send_internal(&self, action: A, depth: usize) -> Result<(), StoreError> {
            if depth > self.config.max_dispatch_depth {
                tracing::error!(depth, "Dispatch depth limit exceeded");
                metrics::counter!(super::metrics::DISPATCH_DEPTH_EXCEEDED).increment(1);
                return Err(StoreError::DispatchDepthExceeded(self.config.max_dispatch_depth));
            }

            tracing::debug!(?action, depth, "Processing action");
            metrics::counter!(super::metrics::ACTIONS_TOTAL).increment(1);

            let effects = {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!(super::metrics::REDUCER_DURATION_SECONDS)
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                metrics::counter!(super::metrics::EFFECTS_EXECUTED, "type" => effect.kind())
                    .increment(1);

                match effect {
                    Effect::None => {
                        tracing::trace!("Executing Effect::None (no-op)");
                    },
                    Effect::Dispatch(action) => {
                        tracing::trace!("Executing Effect::Dispatch");
                        // No receivers is not an error
                        let _ = self.action_broadcast.send((*action).clone());
                        self.send_internal(*action, depth + 1)?;
                    },
                }
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&*state)
        }

        /// Subscribe to every action produced by `Effect::Dispatch`
        ///
        /// Receivers that fall more than `broadcast_capacity` actions behind
        /// observe `RecvError::Lagged`.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config,
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;
