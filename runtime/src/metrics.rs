//! Metric names emitted by the runtime.
//!
//! Metrics go through the `metrics` facade. Nothing is recorded until the
//! application installs a recorder; call [`describe_metrics`] once after
//! installing it so exporters carry help text.

use metrics::{Unit, describe_counter, describe_histogram};

/// Actions processed by `Store::send`, dispatched ones included
pub const ACTIONS_TOTAL: &str = "store.actions.total";

/// Effects executed, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Time spent inside `Reducer::reduce`
pub const REDUCER_DURATION_SECONDS: &str = "store.reducer.duration_seconds";

/// Sends rejected by the dispatch depth limit
pub const DISPATCH_DEPTH_EXCEEDED: &str = "store.dispatch.depth_exceeded";

/// Values published on a subject, labelled by `subject`
pub const SUBJECT_PUBLISHED: &str = "subject.published.total";

/// Register descriptions for every runtime metric.
pub fn describe_metrics() {
    describe_counter!(ACTIONS_TOTAL, "Actions processed by the store");
    describe_counter!(EFFECTS_EXECUTED, "Effects executed by the store");
    describe_histogram!(
        REDUCER_DURATION_SECONDS,
        Unit::Seconds,
        "Time spent in reducer execution"
    );
    describe_counter!(
        DISPATCH_DEPTH_EXCEEDED,
        "Sends aborted because dispatch effects nested too deep"
    );
    describe_counter!(SUBJECT_PUBLISHED, "Values published on reactive subjects");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_without_recorder_is_noop() {
        describe_metrics();
    }

    #[test]
    fn names_are_namespaced() {
        for name in [
            ACTIONS_TOTAL,
            EFFECTS_EXECUTED,
            REDUCER_DURATION_SECONDS,
            DISPATCH_DEPTH_EXCEEDED,
        ] {
            assert!(name.starts_with("store."), "{name}");
        }
        assert!(SUBJECT_PUBLISHED.starts_with("subject."));
    }
}
