//! In-process event bus for auth signals.
//!
//! Two typed channels decouple whoever detects a session problem from whoever
//! navigates: `unauthorized` (no payload) and `redirect { path }`. Emission is
//! synchronous. Listeners are registered through a [`Subscription`] handle and
//! unregistered when the handle is dropped or passed to [`EventBus::off`], so
//! a listener never outlives its owner.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Unauthorized,
    Redirect { path: String },
}

impl AuthEvent {
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::Unauthorized => Channel::Unauthorized,
            Self::Redirect { .. } => Channel::Redirect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Unauthorized,
    Redirect,
}

impl Channel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Redirect => "redirect",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Channel, Listener)>,
}

/// Cloneable handle to a shared listener registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("unauthorized", &self.listener_count(Channel::Unauthorized))
            .field("redirect", &self.listener_count(Channel::Redirect))
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_unauthorized<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(
            Channel::Unauthorized,
            Arc::new(move |_: &AuthEvent| listener()),
        )
    }

    #[must_use]
    pub fn on_redirect<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.subscribe(
            Channel::Redirect,
            Arc::new(move |event: &AuthEvent| {
                if let AuthEvent::Redirect { path } = event {
                    listener(path);
                }
            }),
        )
    }

    /// Unregister a listener. Equivalent to dropping the handle.
    pub fn off(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Returns the number of listeners notified.
    pub fn emit_unauthorized(&self) -> usize {
        self.emit(&AuthEvent::Unauthorized)
    }

    /// Returns the number of listeners notified.
    pub fn emit_redirect(&self, path: impl Into<String>) -> usize {
        self.emit(&AuthEvent::Redirect { path: path.into() })
    }

    /// Deliver `event` to every listener of its channel.
    ///
    /// Listeners are snapshotted first, so they may subscribe or unsubscribe
    /// during delivery.
    pub fn emit(&self, event: &AuthEvent) -> usize {
        let channel = event.channel();
        let targets: Vec<Listener> = lock(&self.registry)
            .listeners
            .iter()
            .filter(|(_, c, _)| *c == channel)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();

        tracing::debug!(%channel, listeners = targets.len(), "emitting auth event");
        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    /// Emit `unauthorized` if `error` is a 401. Any API caller can route its
    /// failures through here. Returns whether an event was emitted.
    pub fn report(&self, error: &AuthError) -> bool {
        if error.is_unauthorized() {
            self.emit_unauthorized();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn listener_count(&self, channel: Channel) -> usize {
        lock(&self.registry)
            .listeners
            .iter()
            .filter(|(_, c, _)| *c == channel)
            .count()
    }

    fn subscribe(&self, channel: Channel, listener: Listener) -> Subscription {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, channel, listener));
        Subscription {
            id,
            channel,
            registry: Arc::downgrade(&self.registry),
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration handle. Dropping it removes the listener.
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
    id: u64,
    channel: Channel,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // The listener is dropped after the lock is released: it may own
        // another subscription on this bus.
        let removed = {
            let mut registry = lock(&registry);
            registry
                .listeners
                .iter()
                .position(|(id, _, _)| *id == self.id)
                .map(|index| registry.listeners.remove(index))
        };
        drop(removed);
    }
}
