use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Notification slot behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Toast", inline)]
#[serde(default)]
pub struct ToastOptions {
    /// How long a notification stays up.
    #[schemars(title = "Dismiss After (ms)", range(min = 500.0, max = 30000.0), extend("step" = 100.0))]
    pub dismiss_after_ms: f64,
    /// Shown when a request carries no message.
    #[schemars(title = "Default Message")]
    pub default_message: String,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            dismiss_after_ms: 3000.0,
            default_message: "Coming Soon :: System Alpha".to_owned(),
        }
    }
}
