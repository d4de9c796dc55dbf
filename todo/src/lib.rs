//! Reactive todo list store.
//!
//! The store holds an ordered list of todos and a filter, and publishes a
//! full snapshot of each on its own stream after every change. It is built
//! from:
//!
//! - domain types and actions ([`types`])
//! - a reducer that turns commands into events ([`reducer`])
//! - the [`TodoStore`] facade owning the runtime store and the two subjects
//!
//! # Quick Start
//!
//! ```
//! use todo::{Filter, TodoEnvironment, TodoStatus, TodoStore};
//! use std::sync::{Arc, Mutex};
//!
//! let store = TodoStore::new(TodoEnvironment::production());
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let _subscription = store.todos().subscribe(move |todos| {
//!     sink.lock().unwrap().push(todos.len());
//! });
//!
//! store.create("Buy milk");
//! let id = store.snapshot()[0].id;
//! store.toggle_status(id);
//! assert_eq!(store.snapshot()[0].status, TodoStatus::Complete);
//!
//! store.set_filter(Filter::Active);
//! assert!(store.visible().is_empty());
//!
//! store.remove(id);
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1, 1, 0]);
//! ```

pub mod command;
pub mod config;
pub mod policy;
pub mod reducer;
pub mod store;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use policy::TextPolicy;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use store::TodoStore;
pub use types::{Filter, Summary, Todo, TodoAction, TodoId, TodoList, TodoState, TodoStatus};
