//! Filesystem events the engine acts on.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Moved { from: PathBuf, to: PathBuf },
    Deleted(PathBuf),
    Modified(PathBuf),
}

impl WatchEvent {
    /// Maps a raw notify event.
    ///
    /// Only renames reported with both paths become `Moved`; the separate
    /// from/to halves some backends emit in addition are dropped, as are
    /// access notifications and folder creations.
    pub fn from_notify(event: &notify::Event) -> Option<WatchEvent> {
        let first = event.paths.first().cloned();
        match &event.kind {
            EventKind::Create(notify::event::CreateKind::Folder) => None,
            EventKind::Create(_) => first.map(WatchEvent::Created),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
                [from, to] => Some(WatchEvent::Moved {
                    from: from.clone(),
                    to: to.clone(),
                }),
                _ => None,
            },
            EventKind::Modify(ModifyKind::Name(_)) => None,
            EventKind::Modify(_) => first.map(WatchEvent::Modified),
            EventKind::Remove(notify::event::RemoveKind::Folder) => None,
            EventKind::Remove(_) => first.map(WatchEvent::Deleted),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }

    /// The path whose extension decides whether the event is relevant.
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(path) | WatchEvent::Deleted(path) | WatchEvent::Modified(path) => path,
            WatchEvent::Moved { to, .. } => to,
        }
    }
}
