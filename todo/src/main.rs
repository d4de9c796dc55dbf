//! Interactive todo shell.
//!
//! Reads commands from stdin, one per line. The list and filter are printed
//! by subscribers of the store's streams, not by the command loop.

use anyhow::Context;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use todo::command::{Command, CommandError, Outcome};
use todo::{Config, TodoEnvironment, TodoStore, view};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    composable_store_runtime::metrics::describe_metrics();

    tracing::info!(config = %serde_json::to_string(&config)?, "Starting todo shell");

    let environment = TodoEnvironment::production().with_text_policy(config.text_policy);
    let store = TodoStore::with_config(environment, config.store_config());
    tracing::debug!(text_policy = %store.text_policy(), "Store ready");

    // Activity log
    let mut events = store.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(event = event.action_name(), "Todo event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Activity log fell behind");
                },
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Views
    let filter = store.filter().clone();
    let _list_view = store.todos().subscribe(move |todos| {
        print!("{}", view::render_list(todos, filter.value()));
    });
    let todos = store.todos().clone();
    let primed = AtomicBool::new(false);
    let _filter_view = store.filter().subscribe(move |filter| {
        // The list view already rendered the initial state
        if primed.swap(true, Ordering::Relaxed) {
            print!("{}", view::render_list(&todos.value(), *filter));
        }
    });

    println!("type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = line
            .parse::<Command>()
            .and_then(|command| command.apply(&store));

        match outcome {
            Ok(Outcome::Updated) => {},
            Ok(Outcome::List) => {
                print!("{}", view::render_list(&store.snapshot(), store.current_filter()));
            },
            Ok(Outcome::Help) => print!("{}", view::HELP),
            Ok(Outcome::Quit) => break,
            Err(CommandError::Empty) => {},
            Err(error) => println!("error: {error}"),
        }
    }

    tracing::info!(summary = ?store.summary(), "Shutting down");
    Ok(())
}
