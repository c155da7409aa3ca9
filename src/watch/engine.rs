//! Event-driven conversion of a watched directory.
//!
//! A listener thread receives filesystem events and dispatches them one at a
//! time:
//!
//! | event              | action                                               |
//! |--------------------|------------------------------------------------------|
//! | `Created(p)`       | convert `p`                                          |
//! | `Moved(src, dest)` | delete the output of `src` if present, convert `dest` |
//! | `Deleted(p)`       | log only, outputs are never removed                   |
//! | `Modified(p)`      | nothing                                              |
//!
//! Any failure while handling an event, including a panic inside a decoder,
//! is logged and the engine keeps listening.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::image_pipeline::{ConversionError, FileConverter};
use crate::watch::error::{Result, WatchError};
use crate::watch::event::WatchEvent;

/// How often the listener and the control loop check for shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on waiting for the listener thread at shutdown.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// What handling one event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Converted(PathBuf),
    Replaced {
        removed: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    Logged,
    Ignored,
    Failed(String),
}

pub struct WatchEngine<C: FileConverter> {
    converter: C,
    root: PathBuf,
    recursive: bool,
}

impl<C: FileConverter> WatchEngine<C> {
    pub fn new(converter: C, root: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            converter,
            root: root.into(),
            recursive,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_relevant(&self, event: &WatchEvent) -> bool {
        let source = |path: &Path| self.converter.is_source(path) && !path.is_dir();
        match event {
            WatchEvent::Moved { from, to } => source(from) || source(to),
            other => source(other.path()),
        }
    }

    /// Handles one event, containing every failure.
    pub fn handle(&self, event: WatchEvent) -> Dispatch {
        if !self.is_relevant(&event) {
            debug!(?event, "Ignoring event");
            return Dispatch::Ignored;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(&event))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(at = %Utc::now().to_rfc3339(), ?event, error = %e, "Failed to handle event");
                Dispatch::Failed(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(at = %Utc::now().to_rfc3339(), ?event, panic = %message, "Conversion panicked");
                Dispatch::Failed(message)
            }
        }
    }

    fn dispatch(&self, event: &WatchEvent) -> std::result::Result<Dispatch, ConversionError> {
        match event {
            WatchEvent::Created(path) => {
                info!(path = %path.display(), "New file");
                let output = self.converter.convert_file(path)?;
                Ok(Dispatch::Converted(output))
            }
            WatchEvent::Moved { from, to } => {
                info!(from = %from.display(), to = %to.display(), "File moved");
                let removed = self.remove_output_of(from)?;
                let output = if self.converter.is_source(to) {
                    Some(self.converter.convert_file(to)?)
                } else {
                    None
                };
                Ok(Dispatch::Replaced { removed, output })
            }
            WatchEvent::Deleted(path) => {
                info!(path = %path.display(), "File deleted, its output is kept");
                Ok(Dispatch::Logged)
            }
            WatchEvent::Modified(_) => Ok(Dispatch::Ignored),
        }
    }

    fn remove_output_of(&self, source: &Path) -> std::result::Result<Option<PathBuf>, ConversionError> {
        if !self.converter.is_source(source) {
            return Ok(None);
        }
        let output = self.converter.output_path(source);
        if !output.is_file() {
            return Ok(None);
        }
        std::fs::remove_file(&output)?;
        info!(output = %output.display(), "Removed output of moved file");
        Ok(Some(output))
    }

    fn listen(&self, events: Receiver<notify::Result<notify::Event>>, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            match events.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if let Some(event) = WatchEvent::from_notify(&event) {
                        self.handle(event);
                    }
                }
                Ok(Err(e)) => warn!(at = %Utc::now().to_rfc3339(), error = %e, "Watcher reported an error"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("Listener stopped");
    }
}

impl<C: FileConverter + Send + 'static> WatchEngine<C> {
    /// Starts watching the root directory on a dedicated listener thread.
    pub fn start(self) -> Result<WatchHandle> {
        if !self.root.is_dir() {
            return Err(WatchError::NotADirectory(self.root.clone()));
        }

        let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
        let mut watcher = notify::recommended_watcher(tx)?;
        let mode = if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&self.root, mode)?;
        info!(root = %self.root.display(), recursive = self.recursive, "Watching for new files");

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let listener = thread::Builder::new()
            .name("watch-listener".to_string())
            .spawn(move || self.listen(rx, &flag))?;

        Ok(WatchHandle {
            running,
            listener,
            watcher,
        })
    }
}

/// A running engine. Dropping it without [`WatchHandle::stop`] leaves the
/// listener running until the process exits.
pub struct WatchHandle {
    running: Arc<AtomicBool>,
    listener: JoinHandle<()>,
    watcher: RecommendedWatcher,
}

impl WatchHandle {
    /// Blocks the calling thread until `interrupted` is set.
    pub fn wait_for(&self, interrupted: &AtomicBool) {
        while !interrupted.load(Ordering::SeqCst) && !self.listener.is_finished() {
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Stops the listener and waits up to `timeout` for it to finish.
    ///
    /// Returns `false` when the listener is still busy (typically inside a
    /// long conversion) once the timeout expires; it is then left detached.
    pub fn stop(self, timeout: Duration) -> bool {
        self.running.store(false, Ordering::SeqCst);
        drop(self.watcher);

        let deadline = Instant::now() + timeout;
        while !self.listener.is_finished() {
            if Instant::now() >= deadline {
                warn!("Listener did not stop within {:?}", timeout);
                return false;
            }
            thread::sleep(POLL_INTERVAL.min(timeout));
        }
        if self.listener.join().is_err() {
            warn!("Listener thread panicked");
        }
        info!("Stopped watching");
        true
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
