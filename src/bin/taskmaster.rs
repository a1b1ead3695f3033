//! Command-line front end for the task tracker.
//!
//! Usage:
//!
//! ```text
//! taskmaster [--config PATH] [--data-dir DIR] [--verbose] <command>
//! ```
//!
//! Each invocation is one session: the worksheet is loaded, stale tasks
//! are promoted once, the command is applied and the resulting active list
//! is printed. Stale references and failed syncs are reported as warnings;
//! only failures to load the worksheet end with a non-zero exit status.
//!
//! The worksheet lives in `<data-dir>/<worksheet>.json`. Configuration is
//! read from `taskmaster.toml` unless `--config` (or `TASKMASTER_CONFIG`)
//! names another file.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};
use taskmaster::{
    config::{ConfigError, TrackerConfig},
    task::{
        adapters::file::FileRemoteTable,
        domain::{MoveDirection, Priority, Task, TaskDomainError, TaskId, TaskTable},
        services::{MutationOutcome, PromotionRun, SyncStatus, TaskSession, TaskSessionError},
    },
};
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "taskmaster.toml";

type Session = TaskSession<FileRemoteTable, DefaultClock>;

/// Errors that end the process with a failure status.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open worksheet in '{dir}': {source}")]
    Open {
        dir: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid task id: {0}")]
    InvalidId(#[from] TaskDomainError),
    #[error(transparent)]
    Session(#[from] TaskSessionError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Personal task tracker backed by a whole-table worksheet.
#[derive(Debug, Parser)]
#[command(name = "taskmaster", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "TASKMASTER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Directory holding the worksheet file; overrides the configuration.
    #[arg(long, env = "TASKMASTER_DATA_DIR")]
    data_dir: Option<String>,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show open tasks, highest ranked first.
    List,
    /// Show completed tasks, most recent first.
    History,
    /// Add a task at the top of the list.
    Add {
        text: String,
        #[arg(short, long, default_value = "Medium")]
        priority: Priority,
    },
    /// Mark a task done, or reopen it.
    Toggle { id: String },
    /// Replace a task's text and priority.
    Edit {
        id: String,
        text: String,
        #[arg(short, long, default_value = "Medium")]
        priority: Priority,
    },
    /// Remove a task.
    Delete { id: String },
    /// Move an open task one step up or down.
    Move { id: String, direction: MoveDirection },
    /// Rank tasks in the given order, first on top.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "taskmaster failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "taskmaster=debug"
    } else {
        "taskmaster=info"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = TrackerConfig::from_file(&Utf8PathBuf::from(cli.config))?;
    let settings = config.session_settings()?;
    let dir = Utf8PathBuf::from(cli.data_dir.unwrap_or_else(|| config.data_dir.clone()));
    let remote = FileRemoteTable::open(&dir, config.worksheet.as_str())
        .map_err(|source| CliError::Open { dir, source })?;
    debug!(worksheet = remote.worksheet(), zone = %settings.zone, "opening session");

    let mut session = TaskSession::new(Arc::new(remote), Arc::new(DefaultClock), settings);
    let mut out = io::stdout().lock();

    session.load(false).await?;
    match session.run_auto_promotion().await? {
        PromotionRun::Completed { summary, sync } if !summary.is_empty() => {
            writeln!(
                out,
                "promoted {} stale task(s), carried over {}",
                summary.promoted.len(),
                summary.carried_over.len()
            )?;
            report_sync(&mut out, &sync)?;
        }
        PromotionRun::Completed { .. } | PromotionRun::AlreadyRan => {}
    }

    let show_history = matches!(cli.command, Command::History);
    apply(&mut session, cli.command, &mut out).await?;

    let table = session.close().unwrap_or_default();
    if show_history {
        print_history(&mut out, &table)?;
    } else {
        print_active(&mut out, &table)?;
    }
    Ok(())
}

async fn apply(session: &mut Session, command: Command, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::List | Command::History => Ok(()),
        Command::Add { text, priority } => {
            let outcome = session.add(text, priority).await?;
            report(out, &outcome, |task: &Task| format!("added {}", task.id()))
        }
        Command::Toggle { id } => {
            let outcome = session.toggle(&TaskId::parse(id)?).await?;
            report(out, &outcome, |task: &Task| {
                let state = if task.is_completed() { "done" } else { "reopened" };
                format!("{state}: {}", task.text())
            })
        }
        Command::Edit { id, text, priority } => {
            let outcome = session.edit(&TaskId::parse(id)?, text, priority).await?;
            report(out, &outcome, |task: &Task| format!("edited {}", task.id()))
        }
        Command::Delete { id } => {
            let outcome = session.delete(&TaskId::parse(id)?).await?;
            report(out, &outcome, |task: &Task| format!("deleted: {}", task.text()))
        }
        Command::Move { id, direction } => {
            let outcome = session.move_task(&TaskId::parse(id)?, direction).await?;
            report(out, &outcome, |moved: &bool| {
                if *moved {
                    "moved".to_owned()
                } else {
                    "already at that end of the list".to_owned()
                }
            })
        }
        Command::Reorder { ids } => {
            let parsed = ids
                .into_iter()
                .map(TaskId::parse)
                .collect::<Result<Vec<_>, _>>()?;
            let outcome = session.reorder(&parsed).await?;
            report(out, &outcome, |count: &usize| format!("reordered {count} task(s)"))
        }
    }
}

fn report<T>(
    out: &mut impl Write,
    outcome: &MutationOutcome<T>,
    describe: impl FnOnce(&T) -> String,
) -> Result<(), CliError> {
    match outcome {
        MutationOutcome::Applied { value, sync } => {
            writeln!(out, "{}", describe(value))?;
            report_sync(out, sync)
        }
        MutationOutcome::StaleReference(id) => {
            writeln!(out, "warning: task {id} no longer exists; nothing changed")?;
            Ok(())
        }
    }
}

fn report_sync(out: &mut impl Write, sync: &SyncStatus) -> Result<(), CliError> {
    if let SyncStatus::Failed(err) = sync {
        writeln!(out, "warning: cloud sync failed ({err}); local changes kept")?;
    }
    Ok(())
}

fn print_active(out: &mut impl Write, table: &TaskTable) -> Result<(), CliError> {
    let active = table.active();
    if active.is_empty() {
        writeln!(out, "no open tasks")?;
        return Ok(());
    }
    for task in active {
        let carried = if task.was_auto_promoted() {
            " (carried over)"
        } else {
            ""
        };
        writeln!(
            out,
            "{}  [{}] {}{carried}",
            task.id(),
            task.priority(),
            task.text()
        )?;
    }
    Ok(())
}

fn print_history(out: &mut impl Write, table: &TaskTable) -> Result<(), CliError> {
    for task in table.history() {
        let when = task.completed_at().unwrap_or_else(|| task.created_date());
        writeln!(out, "{when}  {}  {}", task.id(), task.text())?;
    }
    Ok(())
}
