//! Worker threads for tfm.
//!
//! The app state never blocks on I/O it did not ask for synchronously. Instead
//! [AppState::handle](crate::app::AppState::handle) returns at most one [Task];
//! the terminal loop hands it to [Workers], and the outcome comes back as a
//! [Message] that goes through `handle` like any key press.
//!
//! Tasks never touch the app state. They only compute a value (a listing, the
//! output of a command) for the loop to merge.
//!
//! # Caution:
//! This module is the protocol boundary between the loop and the threads.
//! Adding or editing variants needs matching changes in the state handlers.

use crate::core::fm::{Entry, list_dir};
use crate::core::proc::{ShellOutput, run_captured};
use crate::utils::helpers::{copy_recursive, unique_dest_path};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tracing::{debug, warn};

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

/// Everything that can arrive at [AppState::handle](crate::app::AppState::handle).
#[derive(Debug)]
pub enum Message {
    /// One normalized key token, e.g. `j`, `ctrl+d`, `enter`.
    Key(String),
    Resize {
        width: u16,
        height: u16,
    },
    ChordTimeout {
        generation: u64,
    },
    DirPrefetched {
        path: PathBuf,
        show_hidden: bool,
        entries: Result<Vec<Entry>, String>,
    },
    CommandFinished {
        command: String,
        output: Result<ShellOutput, String>,
    },
    InteractiveFinished {
        command: String,
        result: Result<(), String>,
    },
    PasteFinished {
        dest: PathBuf,
        pasted: usize,
        error: Option<String>,
    },
}

/// Deferred work requested by the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Deliver [Message::ChordTimeout] after `delay`.
    ChordTimeout { generation: u64, delay: Duration },
    Prefetch { path: PathBuf, show_hidden: bool },
    RunCommand { command: String, cwd: PathBuf },
    /// Needs the terminal, so the loop runs it itself.
    RunInteractive { command: String, cwd: PathBuf },
    Paste { sources: Vec<PathBuf>, dest: PathBuf },
}

/// Runs a background task to completion on the calling thread.
///
/// Timers and interactive commands are not executed here and yield `None`.
pub fn run_task(task: Task) -> Option<Message> {
    match task {
        Task::Prefetch { path, show_hidden } => {
            let entries = list_dir(&path, show_hidden).map_err(|e| e.to_string());
            debug!(path = %path.display(), ok = entries.is_ok(), "prefetch done");
            Some(Message::DirPrefetched {
                path,
                show_hidden,
                entries,
            })
        }
        Task::RunCommand { command, cwd } => {
            let output = run_captured(&command, &cwd).map_err(|e| e.to_string());
            Some(Message::CommandFinished { command, output })
        }
        Task::Paste { sources, dest } => Some(paste(sources, dest)),
        Task::ChordTimeout { .. } | Task::RunInteractive { .. } => None,
    }
}

/// Copies every source into `dest` under a free name. Stops at the first error.
fn paste(sources: Vec<PathBuf>, dest: PathBuf) -> Message {
    let mut pasted = 0;
    let mut error = None;
    for src in &sources {
        let Some(name) = src.file_name() else {
            continue;
        };
        let target = unique_dest_path(&dest, &name.to_string_lossy());
        match copy_recursive(src, &target) {
            Ok(()) => pasted += 1,
            Err(e) => {
                warn!(src = %src.display(), error = %e, "paste failed");
                error = Some(format!("{}: {}", src.display(), e));
                break;
            }
        }
    }
    Message::PasteFinished {
        dest,
        pasted,
        error,
    }
}

/// Manages the worker threads and their channels.
///
/// Prefetches go to the I/O worker, chord timers to the timer worker, shell
/// commands and pastes to the job worker. All of them answer on one channel.
pub struct Workers {
    io_tx: Sender<Task>,
    timer_tx: Sender<Task>,
    job_tx: Sender<Task>,
    response_rx: Receiver<Message>,
}

impl Workers {
    pub fn spawn() -> Self {
        let (io_tx, io_rx) = unbounded::<Task>();
        let (timer_tx, timer_rx) = unbounded::<Task>();
        let (job_tx, job_rx) = unbounded::<Task>();
        let (res_tx, response_rx) = unbounded::<Message>();

        start_runner("tfm-io", io_rx, res_tx.clone());
        start_runner("tfm-job", job_rx, res_tx.clone());
        start_timer_worker(timer_rx, res_tx);

        Self {
            io_tx,
            timer_tx,
            job_tx,
            response_rx,
        }
    }

    /// Routes `task` to its worker. Interactive commands are refused and handed back.
    pub fn submit(&self, task: Task) -> Result<(), Task> {
        let tx = match &task {
            Task::ChordTimeout { .. } => &self.timer_tx,
            Task::Prefetch { .. } => &self.io_tx,
            Task::RunCommand { .. } | Task::Paste { .. } => &self.job_tx,
            Task::RunInteractive { .. } => return Err(task),
        };
        tx.send(task).map_err(|e| e.into_inner())
    }

    /// Accessor for the worker response receiver.
    pub fn response_rx(&self) -> &Receiver<Message> {
        &self.response_rx
    }
}

fn start_runner(name: &str, task_rx: Receiver<Task>, res_tx: Sender<Message>) {
    let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
        while let Ok(task) = task_rx.recv() {
            if let Some(msg) = run_task(task)
                && res_tx.send(msg).is_err()
            {
                break;
            }
        }
    });
    if let Err(e) = spawned {
        warn!(worker = name, error = %e, "failed to spawn worker thread");
    }
}

/// Holds the most recent chord deadline and fires it when due.
///
/// A newer schedule replaces the pending one: older generations are stale by
/// the time the newer one exists.
fn start_timer_worker(task_rx: Receiver<Task>, res_tx: Sender<Message>) {
    let spawned = thread::Builder::new()
        .name("tfm-timer".to_string())
        .spawn(move || {
            let mut pending: Option<(Instant, u64)> = None;
            loop {
                let received = match pending {
                    Some((deadline, _)) => match task_rx.recv_deadline(deadline) {
                        Ok(task) => Some(task),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    },
                    None => match task_rx.recv() {
                        Ok(task) => Some(task),
                        Err(_) => break,
                    },
                };

                if let Some(Task::ChordTimeout { generation, delay }) = received {
                    pending = Some((Instant::now() + delay, generation));
                }

                if let Some((deadline, generation)) = pending
                    && Instant::now() >= deadline
                {
                    pending = None;
                    if res_tx.send(Message::ChordTimeout { generation }).is_err() {
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "failed to spawn timer thread");
    }
}
