//! Reducer logic for the todo list.
//!
//! Commands are validated and answered with an `Effect::Dispatch` of the
//! matching event. Events are applied to state. Commands that refer to an
//! unknown todo are no-ops and produce no event.

use crate::policy::TextPolicy;
use crate::types::{Todo, TodoAction, TodoId, TodoState};
use composable_store_core::{
    effect::Effect,
    environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock},
    reducer::Reducer,
    smallvec, SmallVec,
};
use std::sync::Arc;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for creation timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of todo ids
    pub ids: Arc<dyn IdGenerator>,
    /// Handling of new todo text
    pub text_policy: TextPolicy,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with the default text policy
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            text_policy: TextPolicy::default(),
        }
    }

    /// System clock and random ids
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIdGenerator))
    }

    /// Replace the text policy
    #[must_use]
    pub const fn with_text_policy(mut self, text_policy: TextPolicy) -> Self {
        self.text_policy = text_policy;
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("text_policy", &self.text_policy)
            .finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `CreateTodo` command and builds the todo it would create
    fn validate_create_todo(
        state: &TodoState,
        env: &TodoEnvironment,
        text: String,
    ) -> Result<Todo, String> {
        let text = env.text_policy.apply(text).map_err(|error| error.to_string())?;

        let id = TodoId::from_uuid(env.ids.next_id());
        if state.exists(&id) {
            return Err(format!("Todo with ID {id} already exists"));
        }

        Ok(Todo::new(id, text, env.clock.now()))
    }

    /// Applies an event to state
    fn apply_event(state: &mut TodoState, event: TodoAction) {
        match event {
            TodoAction::TodoCreated { todo } => {
                state.todos.push(Arc::new(todo));
                state.last_error = None;
            },
            TodoAction::TodoRemoved { id } => {
                state.todos.retain(|todo| todo.id != id);
                state.last_error = None;
            },
            TodoAction::StatusToggled { id } => {
                if let Some(slot) = state.todos.iter_mut().find(|todo| todo.id == id) {
                    *slot = Arc::new(slot.toggled());
                }
                state.last_error = None;
            },
            TodoAction::FilterChanged { filter } => {
                state.filter = filter;
                state.last_error = None;
            },
            TodoAction::CreateRejected { reason } => {
                state.last_error = Some(reason);
            },
            // Commands are not applied to state
            TodoAction::CreateTodo { .. }
            | TodoAction::RemoveTodo { .. }
            | TodoAction::ToggleStatus { .. }
            | TodoAction::SetFilter { .. } => {},
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::CreateTodo { text } => match Self::validate_create_todo(state, env, text) {
                Ok(todo) => smallvec![Effect::dispatch(TodoAction::TodoCreated { todo })],
                Err(reason) => {
                    tracing::warn!(%reason, policy = %env.text_policy, "Rejected todo creation");
                    smallvec![Effect::dispatch(TodoAction::CreateRejected { reason })]
                },
            },

            TodoAction::RemoveTodo { id } => {
                if !state.exists(&id) {
                    tracing::debug!(%id, "Remove of unknown todo ignored");
                    return SmallVec::new();
                }
                smallvec![Effect::dispatch(TodoAction::TodoRemoved { id })]
            },

            TodoAction::ToggleStatus { id } => {
                if !state.exists(&id) {
                    tracing::debug!(%id, "Toggle of unknown todo ignored");
                    return SmallVec::new();
                }
                smallvec![Effect::dispatch(TodoAction::StatusToggled { id })]
            },

            TodoAction::SetFilter { filter } => {
                smallvec![Effect::dispatch(TodoAction::FilterChanged { filter })]
            },

            // ========== Events ==========
            event @ (TodoAction::TodoCreated { .. }
            | TodoAction::TodoRemoved { .. }
            | TodoAction::StatusToggled { .. }
            | TodoAction::FilterChanged { .. }
            | TodoAction::CreateRejected { .. }) => {
                tracing::trace!(event = event.action_name(), "Applying event");
                Self::apply_event(state, event);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Filter, TodoStatus};
    use composable_store_testing::{
        RepeatingIdGenerator, ReducerTest, SequentialIdGenerator, assertions, test_clock,
    };

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()))
    }

    fn id(n: u64) -> TodoId {
        TodoId::from_uuid(SequentialIdGenerator::nth(n))
    }

    fn state_with(texts: &[&str]) -> TodoState {
        let mut state = TodoState::new();
        for (n, text) in (1..).zip(texts) {
            state.todos.push(Arc::new(Todo::new(
                id(n),
                (*text).to_string(),
                test_clock().now(),
            )));
        }
        state
    }

    #[test]
    fn test_create_todo_dispatches_created() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::CreateTodo {
                text: "Buy milk".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 0); // Nothing applied until the event arrives
            })
            .then_effects(|effects| {
                let TodoAction::TodoCreated { todo } = assertions::single_dispatch(effects) else {
                    panic!("expected TodoCreated");
                };
                assert_eq!(todo.id, id(1));
                assert_eq!(todo.text, "Buy milk");
                assert_eq!(todo.status, TodoStatus::Active);
                assert_eq!(todo.created_at, test_clock().now());
            })
            .run();
    }

    #[test]
    fn test_created_event_appends() {
        let existing = state_with(&["First"]);
        let first = Arc::clone(&existing.todos[0]);

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(existing)
            .when_action(TodoAction::TodoCreated {
                todo: Todo::new(id(2), "Second".to_string(), test_clock().now()),
            })
            .then_state(move |state| {
                assert_eq!(state.count(), 2);
                assert!(Arc::ptr_eq(&state.todos[0], &first));
                assert_eq!(state.todos[1].text, "Second");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_create_empty_text_accepted_by_default() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::CreateTodo {
                text: String::new(),
            })
            .then_effects(|effects| {
                assert!(matches!(
                    assertions::single_dispatch(effects),
                    TodoAction::TodoCreated { todo } if todo.text.is_empty()
                ));
            })
            .run();
    }

    #[test]
    fn test_create_blank_text_rejected_by_policy() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env().with_text_policy(TextPolicy::RejectBlank))
            .given_state(TodoState::new())
            .when_action(TodoAction::CreateTodo {
                text: "   ".to_string(),
            })
            .then_effects(|effects| {
                assert_eq!(
                    assertions::single_dispatch(effects),
                    &TodoAction::CreateRejected {
                        reason: "Todo text cannot be empty".to_string()
                    }
                );
            })
            .run();
    }

    #[test]
    fn test_create_rejected_records_error() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::CreateRejected {
                reason: "Todo text cannot be empty".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.count(), 0);
                assert!(state
                    .last_error
                    .as_ref()
                    .is_some_and(|error| error.contains("cannot be empty")));
            })
            .run();
    }

    #[test]
    fn test_create_duplicate_id_rejected() {
        let env = TodoEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(RepeatingIdGenerator(SequentialIdGenerator::nth(1))),
        );

        ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(state_with(&["Existing"]))
            .when_action(TodoAction::CreateTodo {
                text: "Duplicate".to_string(),
            })
            .then_effects(|effects| {
                let TodoAction::CreateRejected { reason } = assertions::single_dispatch(effects)
                else {
                    panic!("expected CreateRejected");
                };
                assert!(reason.contains("already exists"));
            })
            .run();
    }

    #[test]
    fn test_remove_known_todo() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&["Buy milk", "Walk dog"]))
            .when_actions([
                TodoAction::RemoveTodo { id: id(1) },
                TodoAction::TodoRemoved { id: id(1) },
            ])
            .then_state(|state| {
                assert_eq!(state.count(), 1);
                assert!(!state.exists(&id(1)));
                assert_eq!(state.todos[0].text, "Walk dog");
            })
            .run();
    }

    #[test]
    fn test_remove_unknown_todo_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&["Buy milk"]))
            .when_action(TodoAction::RemoveTodo { id: id(9) })
            .then_state(|state| {
                assert_eq!(state.count(), 1);
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_replaces_only_target() {
        let given = state_with(&["a", "b", "c"]);
        let untouched = [Arc::clone(&given.todos[0]), Arc::clone(&given.todos[2])];

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(given)
            .when_actions([
                TodoAction::ToggleStatus { id: id(2) },
                TodoAction::StatusToggled { id: id(2) },
            ])
            .then_state(move |state| {
                assert_eq!(state.todos[1].status, TodoStatus::Complete);
                assert!(Arc::ptr_eq(&state.todos[0], &untouched[0]));
                assert!(Arc::ptr_eq(&state.todos[2], &untouched[1]));
            })
            .run();
    }

    #[test]
    fn test_toggle_unknown_todo_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&["a"]))
            .when_action(TodoAction::ToggleStatus { id: id(5) })
            .then_state(|state| {
                assert_eq!(state.todos[0].status, TodoStatus::Active);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_set_filter() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&["a"]))
            .when_actions([
                TodoAction::SetFilter {
                    filter: Filter::Complete,
                },
                TodoAction::FilterChanged {
                    filter: Filter::Complete,
                },
            ])
            .then_state(|state| {
                assert_eq!(state.filter, Filter::Complete);
                assert!(state.visible().is_empty());
                assert_eq!(state.count(), 1);
            })
            .run();
    }
}
