//! Line-oriented console front end.
//!
//! Stands in for the touch UI: each stdin line is parsed into UI events (see
//! [`parser`]) and forwarded through an [`EngineHandle`].  State changes and
//! lifecycle notifications are rendered as log lines by
//! [`spawn_status_reporter`].
//!
//! Stdin is read on a dedicated OS thread ([`spawn_stdin_reader`]) so that a
//! blocked read never holds up runtime shutdown.

pub mod parser;

use std::io::BufRead;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::{EngineError, EngineHandle};

pub use parser::{parse_line, ConsoleCommand, ConsoleError, HELP};

/// Capacity of the line channel between the stdin thread and the console.
const LINE_QUEUE_CAPACITY: usize = 16;

/// Starts a thread that forwards stdin lines until end of input.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(LINE_QUEUE_CAPACITY);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("failed to read console input: {e}");
                    break;
                }
            }
        }
        debug!("stdin reader exited");
    });
    rx
}

/// Reads commands from `lines` until `quit`, end of input, or the engine
/// stops, then asks the engine to shut down.
///
/// # Errors
///
/// Returns [`EngineError::Stopped`] if the engine exited first.
pub async fn run_console(
    mut lines: mpsc::Receiver<String>,
    handle: &EngineHandle,
) -> Result<(), EngineError> {
    loop {
        let Some(line) = lines.recv().await else {
            debug!("console input closed");
            break;
        };

        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Events(events))) => {
                for event in events {
                    match handle.input(event) {
                        Ok(()) => {}
                        Err(EngineError::QueueFull) => warn!("engine busy; input dropped"),
                        Err(e) => return Err(e),
                    }
                }
            }
            Ok(Some(ConsoleCommand::Reconnect)) => handle.request_reconnect().await?,
            Ok(Some(ConsoleCommand::Status)) => println!("{}", handle.snapshot()),
            Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
            Ok(Some(ConsoleCommand::Quit)) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    handle.shutdown().await
}

/// Logs every state change and notification until the engine stops.
pub fn spawn_status_reporter(handle: &EngineHandle) -> JoinHandle<()> {
    let mut snapshots = handle.subscribe();
    let mut notifications = handle.notifications();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *snapshots.borrow_and_update();
                    info!(connection = %snapshot.connection, auth = %snapshot.auth, "state changed");
                }
                notification = notifications.recv() => match notification {
                    Ok(notification) => info!("{notification}"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "notifications skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
