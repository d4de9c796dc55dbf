//! Plain-text rendering for the shell.

use crate::types::{Filter, Summary, Todo, visible};
use std::fmt::Write;
use std::sync::Arc;

/// Usage text for `help`
pub const HELP: &str = "\
commands:
  add <text>                      create a todo
  rm <n>                          remove the todo at position n
  toggle <n>                      flip the todo at position n between active and complete
  filter <all|active|complete>    choose which todos are shown
  list                            show the list
  quit                            leave
";

/// Render the todos that pass `filter`, numbered from 1, plus a footer
#[must_use]
pub fn render_list(todos: &[Arc<Todo>], filter: Filter) -> String {
    let shown = visible(todos, filter);
    let mut out = String::new();

    if shown.is_empty() {
        out.push_str("  (nothing to show)\n");
    }
    for (position, todo) in (1..).zip(&shown) {
        let mark = if todo.is_complete() { 'x' } else { ' ' };
        let _ = writeln!(out, "{position:>3}. [{mark}] {}", todo.text);
    }

    let summary = Summary::of(todos);
    let noun = if summary.active == 1 { "item" } else { "items" };
    let _ = writeln!(out, "{} {noun} left, showing {filter}", summary.active);
    out
}
