//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of todo items that can be created,
//! toggled between active and complete, and removed, plus a filter that
//! decides which items a view shows.

use chrono::{DateTime, Utc};
use composable_store_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion status of a todo
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// Still to do
    #[default]
    Active,
    /// Done
    Complete,
}

impl TodoStatus {
    /// The other status
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Complete,
            Self::Complete => Self::Active,
        }
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Complete => "complete",
        })
    }
}

/// Which todos a view shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every todo
    #[default]
    All,
    /// Only active todos
    Active,
    /// Only complete todos
    Complete,
}

impl Filter {
    /// Whether `todo` passes this filter
    #[must_use]
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => todo.status == TodoStatus::Active,
            Self::Complete => todo.status == TodoStatus::Complete,
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Complete => "complete",
        })
    }
}

/// A filter name that is not `all`, `active` or `complete`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter {0:?} (expected all, active or complete)")]
pub struct UnknownFilter(pub String);

impl std::str::FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "complete" | "completed" => Ok(Self::Complete),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Free-form text entered by the user
    pub text: String,
    /// Active or complete
    pub status: TodoStatus,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new, active todo
    #[must_use]
    pub const fn new(id: TodoId, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            status: TodoStatus::Active,
            created_at,
        }
    }

    /// A copy of this todo with the status flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            status: self.status.toggled(),
            ..self.clone()
        }
    }

    /// Whether the todo is complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == TodoStatus::Complete
    }
}

/// Snapshot of the list, in insertion order
///
/// Entries are shared between snapshots: an entry that an operation did not
/// touch is the same allocation in the old and the new snapshot.
pub type TodoList = Vec<Arc<Todo>>;

/// The entries of `todos` that pass `filter`, order preserved
#[must_use]
pub fn visible(todos: &[Arc<Todo>], filter: Filter) -> TodoList {
    todos
        .iter()
        .filter(|todo| filter.matches(todo))
        .cloned()
        .collect()
}

/// Counts over a list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// All todos
    pub total: usize,
    /// Todos still active ("items left")
    pub active: usize,
    /// Todos complete
    pub complete: usize,
}

impl Summary {
    /// Count the entries of `todos`
    #[must_use]
    pub fn of(todos: &[Arc<Todo>]) -> Self {
        let complete = todos.iter().filter(|todo| todo.is_complete()).count();
        Self {
            total: todos.len(),
            active: todos.len() - complete,
            complete,
        }
    }
}

/// State of the todo list
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TodoState {
    /// All todos in insertion order
    pub todos: TodoList,
    /// Current filter
    pub filter: Filter,
    /// Reason the last create was rejected, cleared by the next applied event
    pub last_error: Option<String>,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Arc<Todo>> {
        self.todos.iter().find(|todo| todo.id == *id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Todos passing the current filter
    #[must_use]
    pub fn visible(&self) -> TodoList {
        visible(&self.todos, self.filter)
    }

    /// Counts over all todos
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(&self.todos)
    }
}

/// Actions representing commands and events for todos
///
/// Commands express intent and are validated by the reducer, which answers
/// with an event. Only events change state.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Create a new todo
    #[command]
    CreateTodo {
        /// Text as entered
        text: String,
    },

    /// Command: Remove a todo
    #[command]
    RemoveTodo {
        /// Todo to remove
        id: TodoId,
    },

    /// Command: Flip a todo between active and complete
    #[command]
    ToggleStatus {
        /// Todo to toggle
        id: TodoId,
    },

    /// Command: Change the filter
    #[command]
    SetFilter {
        /// New filter
        filter: Filter,
    },

    // ========== Events ==========
    /// Event: Todo was created
    #[event]
    TodoCreated {
        /// The new todo
        todo: Todo,
    },

    /// Event: Todo was removed
    #[event]
    TodoRemoved {
        /// Removed todo
        id: TodoId,
    },

    /// Event: Todo status was flipped
    #[event]
    StatusToggled {
        /// Toggled todo
        id: TodoId,
    },

    /// Event: Filter was changed
    #[event]
    FilterChanged {
        /// New filter
        filter: Filter,
    },

    /// Event: A create command was rejected
    #[event]
    CreateRejected {
        /// Why
        reason: String,
    },
}
