//! The todo store: a reducer-backed list with two observable streams.
//!
//! `TodoStore` is what views talk to. Every operation runs to completion
//! before returning and then publishes a fresh snapshot on the stream it
//! affects:
//!
//! | Operation | Stream |
//! |-----------|--------|
//! | `create`, `remove`, `toggle_status` | `todos()` |
//! | `set_filter` | `filter()` |
//!
//! New subscribers receive the current value immediately.

use crate::policy::TextPolicy;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Filter, Summary, TodoAction, TodoId, TodoList, TodoState};
use composable_store_runtime::{Store, StoreConfig, Subject};
use tokio::sync::broadcast;

/// Authoritative holder of the todo list and the current filter
///
/// Construct one in the composition root and hand out references (or clones,
/// which share the same state and streams).
#[derive(Clone)]
pub struct TodoStore {
    store: Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>,
    todos: Subject<TodoList>,
    filter: Subject<Filter>,
}

impl TodoStore {
    /// Empty store with the default runtime configuration
    #[must_use]
    pub fn new(environment: TodoEnvironment) -> Self {
        Self::with_config(environment, StoreConfig::default())
    }

    /// Empty store with explicit runtime configuration
    #[must_use]
    pub fn with_config(environment: TodoEnvironment, config: StoreConfig) -> Self {
        let state = TodoState::new();
        let todos = Subject::new("todos", state.todos.clone());
        let filter = Subject::new("filter", state.filter);

        Self {
            store: Store::with_config(state, TodoReducer::new(), environment, config),
            todos,
            filter,
        }
    }

    /// Append a new active todo and publish the list
    ///
    /// If the configured text policy refuses `text`, nothing is appended,
    /// [`TodoStore::last_error`] records why, and the unchanged list is
    /// still published.
    pub fn create(&self, text: impl Into<String>) {
        self.send(TodoAction::CreateTodo { text: text.into() });
        self.publish_todos();
    }

    /// Remove the todo with `id` and publish the list
    ///
    /// Unknown ids leave the list as it is.
    pub fn remove(&self, id: TodoId) {
        self.send(TodoAction::RemoveTodo { id });
        self.publish_todos();
    }

    /// Flip the status of the todo with `id` and publish the list
    ///
    /// Unknown ids leave the list as it is.
    pub fn toggle_status(&self, id: TodoId) {
        self.send(TodoAction::ToggleStatus { id });
        self.publish_todos();
    }

    /// Replace the filter and publish it
    pub fn set_filter(&self, filter: Filter) {
        self.send(TodoAction::SetFilter { filter });
        self.filter.publish(self.store.state(|s| s.filter));
    }

    /// Stream of list snapshots
    #[must_use]
    pub const fn todos(&self) -> &Subject<TodoList> {
        &self.todos
    }

    /// Stream of filter values
    #[must_use]
    pub const fn filter(&self) -> &Subject<Filter> {
        &self.filter
    }

    /// Current list
    #[must_use]
    pub fn snapshot(&self) -> TodoList {
        self.store.state(|s| s.todos.clone())
    }

    /// Current filter
    #[must_use]
    pub fn current_filter(&self) -> Filter {
        self.store.state(|s| s.filter)
    }

    /// Current list narrowed by the current filter
    #[must_use]
    pub fn visible(&self) -> TodoList {
        self.store.state(TodoState::visible)
    }

    /// Counts over the current list
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.store.state(TodoState::summary)
    }

    /// Why the last create was rejected, if the last event was a rejection
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.store.state(|s| s.last_error.clone())
    }

    /// Policy applied to the text of new todos
    #[must_use]
    pub fn text_policy(&self) -> TextPolicy {
        self.store.environment().text_policy
    }

    /// Receiver of every event the store applies
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    fn send(&self, action: TodoAction) {
        let name = action.action_name();
        if let Err(error) = self.store.send(action) {
            tracing::error!(%error, action = name, "Todo action failed");
        }
    }

    fn publish_todos(&self) {
        self.todos.publish(self.snapshot());
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("todos", &self.store.state(TodoState::count))
            .field("filter", &self.current_filter())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoStatus;
    use composable_store_testing::{Recorder, SequentialIdGenerator, test_clock};
    use std::sync::Arc;

    fn test_store() -> TodoStore {
        TodoStore::new(TodoEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new()),
        ))
    }

    #[test]
    fn buy_milk_lifecycle() {
        let store = test_store();

        store.create("buy milk");
        let list = store.snapshot();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].text, "buy milk");
        assert_eq!(list[0].status, TodoStatus::Active);

        let id = list[0].id;
        store.toggle_status(id);
        assert_eq!(store.snapshot()[0].status, TodoStatus::Complete);

        store.remove(id);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn every_mutation_publishes_todos() {
        let store = test_store();
        let todos = Recorder::attach(store.todos());

        store.create("a");
        let id = store.snapshot()[0].id;
        store.toggle_status(id);
        store.remove(id);

        let lengths: Vec<usize> = todos.values().iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![0, 1, 1, 0]);
    }

    #[test]
    fn filter_changes_publish_on_filter_stream_only() {
        let store = test_store();
        let todos = Recorder::attach(store.todos());
        let filters = Recorder::attach(store.filter());

        store.set_filter(Filter::Active);
        store.set_filter(Filter::Complete);

        assert_eq!(todos.count(), 1);
        assert_eq!(filters.values(), vec![Filter::All, Filter::Active, Filter::Complete]);
        assert_eq!(store.current_filter(), Filter::Complete);
    }

    #[test]
    fn todo_mutations_do_not_publish_filter() {
        let store = test_store();
        let filters = Recorder::attach(store.filter());

        store.create("a");

        assert_eq!(filters.count(), 1);
    }

    #[test]
    fn rejected_create_still_publishes() {
        let store = TodoStore::new(
            TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()))
                .with_text_policy(TextPolicy::Trim),
        );
        let todos = Recorder::attach(store.todos());
        assert_eq!(store.text_policy(), TextPolicy::Trim);

        store.create("   ");

        assert_eq!(todos.count(), 2);
        assert!(store.snapshot().is_empty());
        assert_eq!(store.last_error().as_deref(), Some("Todo text cannot be empty"));

        store.create(" ok ");
        assert_eq!(store.snapshot()[0].text, "ok");
        assert_eq!(store.last_error(), None);
    }

    #[test]
    fn visible_and_summary_follow_filter() {
        let store = test_store();
        store.create("a");
        store.create("b");
        store.toggle_status(store.snapshot()[0].id);

        store.set_filter(Filter::Active);

        let visible = store.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "b");
        assert_eq!(
            store.summary(),
            Summary {
                total: 2,
                active: 1,
                complete: 1
            }
        );
    }

    #[test]
    fn events_are_broadcast() {
        let store = test_store();
        let mut events = store.subscribe_events();

        store.create("a");
        store.remove(store.snapshot()[0].id);
        store.remove(TodoId::from_uuid(SequentialIdGenerator::nth(42)));

        let names: Vec<&str> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| event.action_name())
            .collect();
        assert_eq!(names, vec!["TodoCreated", "TodoRemoved"]);
    }

    #[test]
    fn clones_share_streams() {
        let store = test_store();
        let view = store.clone();
        let todos = Recorder::attach(view.todos());

        store.create("shared");

        assert_eq!(todos.last().map(|list| list.len()), Some(1));
        assert_eq!(view.snapshot().len(), 1);
    }
}
