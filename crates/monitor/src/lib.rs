//! Runtime wiring for `hygrograph`.
//!
//! Two execution contexts share one [`Session`]:
//! - the blocking link reader on the runtime's blocking pool
//! - a single-threaded cooperative loop multiplexing the render ticker,
//!   console commands and Ctrl-C

pub mod console;
pub mod controller;
pub mod cycle;

pub use controller::Controller;
pub use cycle::{Cycle, CycleState, Tick};

use console::{emit, parse_command, stdin_lines};
use hygro_config::MonitorConfig;
use hygro_core::{Command, HygroError, Notice, Result};
use hygro_link::{spawn_reader, LinkError, LinkReader};
use hygro_series::Session;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, Lines};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Run the monitor until `quit` or Ctrl-C.
pub fn run(config: MonitorConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let session = Arc::new(Session::new(&config.buffer));
    runtime.block_on(event_loop(
        &config,
        Arc::clone(&session),
        stdin_lines(),
        tokio::signal::ctrl_c(),
    ));

    // The stdin reader and a reader blocked in a serial read would otherwise
    // hold the runtime open.
    runtime.shutdown_timeout(config.cycle.shutdown_grace());
    info!("Stopped");
    Ok(())
}

// ── Event loop ────────────────────────────────────────────────────────────────

/// Drive the monitor until terminated by a command or by `interrupt`.
///
/// `interrupt` is created once and polled across iterations, so a signal
/// delivered while a tick or command is being handled is not lost.
async fn event_loop<R>(
    config: &MonitorConfig,
    session: Arc<Session>,
    mut lines: Lines<R>,
    interrupt: impl Future<Output = io::Result<()>>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut reader = spawn_reader(LinkReader::new(config.link.clone(), Arc::clone(&session)));
    let mut reader_alive = true;

    let mut controller = Controller::new(config, Arc::clone(&session));
    let mut ticker = tokio::time::interval(config.cycle.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stdin_open = true;
    tokio::pin!(interrupt);
    let mut interrupt_armed = true;

    emit([Notice::info(
        "hygrograph",
        "Select a mode: humidity | temperature | both  (help for all commands)",
    )]);

    while !controller.is_terminated() {
        tokio::select! {
            _ = ticker.tick() => {
                controller.tick();
            }

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(command)) => emit(controller.handle(command)),
                    Ok(None) => {}
                    Err(e) => emit([Notice::warning("Unknown command", e.to_string())]),
                },
                Ok(None) => {
                    info!("Console closed; Ctrl-C to quit");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Console read failed: {e}");
                    stdin_open = false;
                }
            },

            result = &mut reader, if reader_alive => {
                reader_alive = false;
                match result {
                    Ok(Ok(stats)) => info!("Link reader finished: {stats:?}"),
                    Ok(Err(LinkError::Cancelled)) => {}
                    Ok(Err(e)) => {
                        emit([Notice::error("Device unavailable", HygroError::from(e).to_string())]);
                    }
                    Err(e) => error!("Link reader task failed: {e}"),
                }
            }

            signal = &mut interrupt, if interrupt_armed => {
                interrupt_armed = false;
                match signal {
                    Ok(()) => emit(controller.handle(Command::Quit)),
                    Err(e) => warn!("Cannot listen for Ctrl-C: {e}"),
                }
            }
        }
    }

    // Grace period for the reader to notice the shutdown flag.
    if reader_alive {
        match tokio::time::timeout(config.cycle.shutdown_grace(), &mut reader).await {
            Ok(Ok(Ok(stats))) => info!("Link reader finished: {stats:?}"),
            Ok(_) => {}
            Err(_) => warn!("Link reader still busy after shutdown grace period"),
        }
    }
}
