use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How pinned elements are held in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Pinning", inline)]
#[serde(default)]
pub struct PinOptions {
    /// Property that receives the hold offset.
    #[schemars(title = "Hold Property")]
    pub hold_property: String,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            hold_property: "translateY".to_owned(),
        }
    }
}
