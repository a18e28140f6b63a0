//! Single-slot notification with an auto-dismiss timer.
//!
//! Time is whatever clock the caller drives the slot with; the lifecycle
//! manager accumulates frame deltas.

use crate::options::ToastOptions;

/// The visible notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastState {
    /// Text shown.
    pub message: String,
    /// When the notification was requested.
    pub created_at_ms: f64,
}

/// Transition reported by [`ToastSlot::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToastChange {
    /// The timer ran out and the notification was removed.
    Expired(ToastState),
}

/// Holds at most one notification. A new request preempts the old one and
/// restarts the timer.
#[derive(Debug, Clone)]
pub struct ToastSlot {
    current: Option<ToastState>,
    dismiss_after_ms: f64,
    default_message: String,
}

impl ToastSlot {
    /// Empty slot configured by `options`.
    #[must_use]
    pub fn new(options: &ToastOptions) -> Self {
        Self {
            current: None,
            dismiss_after_ms: options.dismiss_after_ms,
            default_message: options.default_message.clone(),
        }
    }

    /// Show `message` (or the default message) from `now_ms`.
    pub fn request(&mut self, message: Option<&str>, now_ms: f64) -> &ToastState {
        let message = message.unwrap_or(self.default_message.as_str()).to_owned();
        if let Some(prev) = &self.current {
            log::debug!("toast '{}' replaced by '{message}'", prev.message);
        }
        self.current.insert(ToastState {
            message,
            created_at_ms: now_ms,
        })
    }

    /// Remove the notification immediately. Returns whether one was shown.
    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Expire the notification once its timer has run out at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Option<ToastChange> {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|t| now_ms - t.created_at_ms >= self.dismiss_after_ms);
        if !expired {
            return None;
        }
        self.current.take().map(ToastChange::Expired)
    }

    /// Message currently shown.
    #[must_use]
    pub fn visible(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.message.as_str())
    }

    /// Full state of the shown notification.
    #[must_use]
    pub fn state(&self) -> Option<&ToastState> {
        self.current.as_ref()
    }
}

impl Default for ToastSlot {
    fn default() -> Self {
        Self::new(&ToastOptions::default())
    }
}
