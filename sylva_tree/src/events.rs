// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change events fed to the tree by an ingestion source.

use crate::entry::{EntryMeta, MODIFY_COLOR};
use crate::tree::PathTree;
use crate::types::EntryId;

/// One change to the set of paths.
#[derive(Clone, Debug, PartialEq)]
pub enum PathEvent {
    /// A file appeared. Adding an existing path touches it.
    Add {
        /// Full file path.
        path: String,
        /// Colors, user, visibility.
        meta: EntryMeta,
    },
    /// A file disappeared.
    ///
    /// The tree removes it at once. A user-attributed removal run through a simulation
    /// fades the file out when the user's action completes.
    Remove {
        /// Full file path.
        path: String,
        /// User and flash color; the resting color is ignored.
        meta: EntryMeta,
    },
    /// A file changed.
    Touch {
        /// Full file path.
        path: String,
        /// Colors and user.
        meta: EntryMeta,
    },
}

impl PathEvent {
    /// An add event with default metadata.
    pub fn add(path: impl Into<String>) -> Self {
        Self::Add {
            path: path.into(),
            meta: EntryMeta::default(),
        }
    }

    /// A remove event with default metadata.
    pub fn remove(path: impl Into<String>) -> Self {
        Self::Remove {
            path: path.into(),
            meta: EntryMeta::default(),
        }
    }

    /// A touch event with default metadata.
    pub fn touch(path: impl Into<String>) -> Self {
        Self::Touch {
            path: path.into(),
            meta: EntryMeta::default(),
        }
    }

    /// The path this event concerns.
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Remove { path, .. } | Self::Touch { path, .. } => {
                path
            }
        }
    }

    /// Metadata attached to the event.
    pub fn meta(&self) -> &EntryMeta {
        match self {
            Self::Add { meta, .. } | Self::Remove { meta, .. } | Self::Touch { meta, .. } => meta,
        }
    }
}

/// Why an event could not be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventError {
    /// No entry exists at the path.
    UnknownPath(String),
    /// The path is empty or names a directory rather than a file.
    EmptyPath,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPath(path) => write!(f, "no entry at '{path}'"),
            Self::EmptyPath => write!(f, "path does not name a file"),
        }
    }
}

impl std::error::Error for EventError {}

/// Validate an entry path and give it a leading `/`.
pub(crate) fn normalize_entry_path(path: &str) -> Result<String, EventError> {
    if path.is_empty() || path.ends_with('/') {
        return Err(EventError::EmptyPath);
    }
    if path.starts_with('/') {
        Ok(path.to_owned())
    } else {
        Ok(format!("/{path}"))
    }
}

impl PathTree {
    /// Apply one event, returning the affected entry.
    ///
    /// The returned id is already stale for [`PathEvent::Remove`].
    pub fn apply(&mut self, event: &PathEvent) -> Result<EntryId, EventError> {
        match event {
            PathEvent::Add { path, meta } => self.add_entry(path, meta),
            PathEvent::Remove { path, .. } => self.remove_path(path),
            PathEvent::Touch { path, meta } => {
                let normalized = normalize_entry_path(path)?;
                let id = self
                    .entry_for_path(&normalized)
                    .ok_or(EventError::UnknownPath(normalized))?;
                self.touch_entry(id, meta.action_color.unwrap_or(MODIFY_COLOR));
                if let Some(color) = meta.color {
                    self.set_entry_color(id, color);
                }
                Ok(id)
            }
        }
    }
}
