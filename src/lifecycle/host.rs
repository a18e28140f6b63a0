//! Event plumbing: how a page context subscribes to scroll, resize and
//! frame notifications.

use std::fmt;

use crate::error::ScrollweaveError;

/// Kind of notification a listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Scroll position changed.
    Scroll,
    /// Viewport size changed.
    Resize,
    /// Animation frame.
    Frame,
}

impl ListenerKind {
    /// Every kind a mounted page listens to.
    pub const ALL: [Self; 3] = [Self::Scroll, Self::Resize, Self::Frame];
}

/// Host-assigned handle of an attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Source of scroll, resize and frame notifications.
pub trait EventHost {
    /// Subscribe to `kind`.
    fn attach(&mut self, kind: ListenerKind) -> Result<ListenerId, ScrollweaveError>;

    /// Unsubscribe. Detaching an unknown id is a no-op.
    fn detach(&mut self, id: ListenerId);
}

/// Host that only records subscriptions. Used by tests and the replay
/// binary, where events are dispatched by hand.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_id: u64,
    active: Vec<(ListenerId, ListenerKind)>,
    fail_on: Option<ListenerKind>,
    detached: usize,
}

impl RecordingHost {
    /// Host that accepts every subscription.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that refuses subscriptions of `kind`.
    #[must_use]
    pub fn failing_on(kind: ListenerKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::default()
        }
    }

    /// Number of listeners currently attached.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether a listener of `kind` is attached.
    #[must_use]
    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.active.iter().any(|&(_, k)| k == kind)
    }

    /// Number of successful detaches so far.
    #[must_use]
    pub fn detached_count(&self) -> usize {
        self.detached
    }
}

impl EventHost for RecordingHost {
    fn attach(&mut self, kind: ListenerKind) -> Result<ListenerId, ScrollweaveError> {
        if self.fail_on == Some(kind) {
            return Err(ScrollweaveError::Listener(format!(
                "{kind:?} listener refused"
            )));
        }
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.active.push((id, kind));
        Ok(id)
    }

    fn detach(&mut self, id: ListenerId) {
        let before = self.active.len();
        self.active.retain(|&(active, _)| active != id);
        if self.active.len() != before {
            self.detached += 1;
        }
    }
}

/// Listeners acquired during a mount.
///
/// Dropping the scope detaches everything it acquired; a successful mount
/// calls [`commit`](Self::commit) to take ownership instead.
pub struct MountScope<'h> {
    host: &'h mut dyn EventHost,
    acquired: Vec<ListenerId>,
}

impl<'h> MountScope<'h> {
    /// Empty scope over `host`.
    #[must_use]
    pub fn new(host: &'h mut dyn EventHost) -> Self {
        Self {
            host,
            acquired: Vec::new(),
        }
    }

    /// Attach a listener, remembering it for rollback.
    pub fn attach(&mut self, kind: ListenerKind) -> Result<ListenerId, ScrollweaveError> {
        let id = self.host.attach(kind)?;
        self.acquired.push(id);
        Ok(id)
    }

    /// Keep every acquired listener attached and hand them over.
    #[must_use]
    pub fn commit(mut self) -> Vec<ListenerId> {
        std::mem::take(&mut self.acquired)
    }
}

impl Drop for MountScope<'_> {
    fn drop(&mut self) {
        if self.acquired.is_empty() {
            return;
        }
        log::debug!("rolling back {} listener(s)", self.acquired.len());
        for id in self.acquired.drain(..) {
            self.host.detach(id);
        }
    }
}
