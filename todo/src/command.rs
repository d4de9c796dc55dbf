//! Line-oriented shell commands.
//!
//! Positions are 1-based and refer to the list as currently shown, i.e.
//! after the filter is applied.

use crate::store::TodoStore;
use crate::types::{Filter, UnknownFilter};
use std::str::FromStr;
use thiserror::Error;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add <text>`
    Add(String),
    /// `rm <n>`
    Remove(usize),
    /// `toggle <n>`
    Toggle(usize),
    /// `filter <all|active|complete>`
    Filter(Filter),
    /// `list`
    List,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// What the shell should do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store changed; subscribers already rendered it
    Updated,
    /// Print the current list
    List,
    /// Print usage
    Help,
    /// Leave the shell
    Quit,
}

/// Errors from parsing or running a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank input line
    #[error("empty command")]
    Empty,
    /// First word is not a command
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),
    /// Command needs an argument
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    /// Position is not a positive number
    #[error("{0:?} is not a position (use the number shown in the list)")]
    InvalidPosition(String),
    /// No visible todo at that position
    #[error("no todo at position {0}")]
    NoSuchPosition(usize),
    /// Filter name not recognised
    #[error(transparent)]
    Filter(#[from] UnknownFilter),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" | "new" => Ok(Self::Add(rest.to_string())),
            "rm" | "remove" => parse_position(rest, "rm").map(Self::Remove),
            "toggle" | "t" => parse_position(rest, "toggle").map(Self::Toggle),
            "filter" | "f" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("filter"));
                }
                Ok(Self::Filter(rest.parse()?))
            },
            "list" | "ls" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn parse_position(arg: &str, command: &'static str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument(command));
    }
    match arg.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(CommandError::InvalidPosition(arg.to_string())),
    }
}

impl Command {
    /// Run the command against `store`
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoSuchPosition`] if a position does not name a
    /// visible todo. The store is left untouched in that case.
    pub fn apply(self, store: &TodoStore) -> Result<Outcome, CommandError> {
        match self {
            Self::Add(text) => store.create(text),
            Self::Remove(position) => store.remove(resolve(store, position)?),
            Self::Toggle(position) => store.toggle_status(resolve(store, position)?),
            Self::Filter(filter) => store.set_filter(filter),
            Self::List => return Ok(Outcome::List),
            Self::Help => return Ok(Outcome::Help),
            Self::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Updated)
    }
}

fn resolve(store: &TodoStore, position: usize) -> Result<crate::types::TodoId, CommandError> {
    position
        .checked_sub(1)
        .and_then(|index| store.visible().get(index).map(|todo| todo.id))
        .ok_or(CommandError::NoSuchPosition(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::TodoEnvironment;
    use crate::types::TodoStatus;
    use composable_store_testing::{SequentialIdGenerator, test_clock};
    use std::sync::Arc;

    fn test_store() -> TodoStore {
        TodoStore::new(TodoEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new()),
        ))
    }

    #[test]
    fn parses_commands() {
        assert_eq!("add buy milk".parse(), Ok(Command::Add("buy milk".into())));
        assert_eq!("add".parse(), Ok(Command::Add(String::new())));
        assert_eq!("  rm 2 ".parse(), Ok(Command::Remove(2)));
        assert_eq!("TOGGLE 1".parse(), Ok(Command::Toggle(1)));
        assert_eq!("filter active".parse(), Ok(Command::Filter(Filter::Active)));
        assert_eq!("ls".parse(), Ok(Command::List));
        assert_eq!("?".parse(), Ok(Command::Help));
        assert_eq!("exit".parse(), Ok(Command::Quit));
    }

    #[test]
    fn reports_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "fly away".parse::<Command>(),
            Err(CommandError::Unknown("fly".into()))
        );
        assert_eq!("rm".parse::<Command>(), Err(CommandError::MissingArgument("rm")));
        assert_eq!(
            "toggle 0".parse::<Command>(),
            Err(CommandError::InvalidPosition("0".into()))
        );
        assert_eq!(
            "filter".parse::<Command>(),
            Err(CommandError::MissingArgument("filter"))
        );
        assert!(matches!(
            "filter done".parse::<Command>(),
            Err(CommandError::Filter(_))
        ));
    }

    #[test]
    fn positions_follow_the_filter() {
        let store = test_store();
        for text in ["a", "b", "c"] {
            Command::Add(text.into()).apply(&store).unwrap();
        }
        Command::Toggle(1).apply(&store).unwrap();
        Command::Filter(Filter::Active).apply(&store).unwrap();

        // Visible: b, c
        assert_eq!(Command::Toggle(2).apply(&store), Ok(Outcome::Updated));

        let all = store.snapshot();
        assert_eq!(all[0].status, TodoStatus::Complete);
        assert_eq!(all[1].status, TodoStatus::Active);
        assert_eq!(all[2].status, TodoStatus::Complete);
    }

    #[test]
    fn bad_position_leaves_store_alone() {
        let store = test_store();
        Command::Add("a".into()).apply(&store).unwrap();

        assert_eq!(
            Command::Remove(3).apply(&store),
            Err(CommandError::NoSuchPosition(3))
        );
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn position_zero_is_no_such_position() {
        let store = test_store();
        Command::Add("a".into()).apply(&store).unwrap();

        assert_eq!(
            Command::Remove(0).apply(&store),
            Err(CommandError::NoSuchPosition(0))
        );
        assert_eq!(
            Command::Toggle(0).apply(&store),
            Err(CommandError::NoSuchPosition(0))
        );
        assert_eq!(store.snapshot()[0].status, TodoStatus::Active);
    }

    #[test]
    fn display_commands_do_not_touch_store() {
        let store = test_store();
        assert_eq!(Command::List.apply(&store), Ok(Outcome::List));
        assert_eq!(Command::Help.apply(&store), Ok(Outcome::Help));
        assert_eq!(Command::Quit.apply(&store), Ok(Outcome::Quit));
        assert!(store.snapshot().is_empty());
    }
}
