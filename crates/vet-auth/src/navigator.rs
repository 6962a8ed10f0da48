//! Client-side history.
//!
//! The protected-route gate is the only caller that mutates history in
//! response to auth events, and it always uses [`Navigator::replace`], which
//! is a no-op when already at the target. Any number of `unauthorized`
//! signals therefore produce at most one navigation to `/login`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Whether `path` renders without a session.
#[must_use]
pub fn is_public(path: &str) -> bool {
    path == LOGIN_PATH
}

/// Current history entry. `from` records the protected path a redirect
/// interrupted, for post-login return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            from: None,
        }
    }
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    navigations: usize,
}

#[derive(Debug)]
pub struct Navigator {
    history: Mutex<History>,
}

impl Navigator {
    #[must_use]
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![Location::new(initial_path)],
                navigations: 0,
            }),
        }
    }

    #[must_use]
    pub fn current(&self) -> Location {
        self.lock()
            .entries
            .last()
            .cloned()
            .unwrap_or_else(|| Location::new("/"))
    }

    /// Append a new entry.
    pub fn push(&self, path: impl Into<String>) {
        let location = Location::new(path);
        tracing::debug!(path = %location.path, "navigate (push)");
        let mut history = self.lock();
        history.entries.push(location);
        history.navigations += 1;
    }

    /// Replace the current entry. Returns `false` without navigating when
    /// already at `path`.
    pub fn replace(&self, path: impl Into<String>, from: Option<String>) -> bool {
        let path = path.into();
        let mut history = self.lock();
        if history.entries.last().is_some_and(|l| l.path == path) {
            return false;
        }
        tracing::debug!(%path, ?from, "navigate (replace)");
        let location = Location { path, from };
        match history.entries.last_mut() {
            Some(current) => *current = location,
            None => history.entries.push(location),
        }
        history.navigations += 1;
        true
    }

    /// Navigations performed since construction.
    #[must_use]
    pub fn navigation_count(&self) -> usize {
        self.lock().navigations
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
