//! Orchestrator options with TOML preset support.
//!
//! Tweakable settings (timeline defaults, notification timing, pin hold
//! property) are consolidated here. Options serialize to/from TOML for
//! presets stored in `assets/presets/`.

mod pin;
mod timing;
mod toast;

use std::path::Path;

pub use pin::PinOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use timing::TimingOptions;
pub use toast::ToastOptions;

use crate::error::ScrollweaveError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[toast]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Timeline compilation defaults.
    pub timing: TimingOptions,
    /// Notification slot behavior.
    pub toast: ToastOptions,
    /// Pinning behavior.
    pub pin: PinOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ScrollweaveError> {
        let content =
            std::fs::read_to_string(path).map_err(ScrollweaveError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ScrollweaveError> {
        toml::from_str(content)
            .map_err(|e| ScrollweaveError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ScrollweaveError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScrollweaveError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ScrollweaveError::Io)?;
        }
        std::fs::write(path, content).map_err(ScrollweaveError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::easing::EasingFunction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let opts = Options::from_toml(
            r#"
[timing]
default_easing = "power3.out"
"#,
        )
        .unwrap();
        assert_eq!(opts.timing.default_easing, EasingFunction::PowerOut(3));
        assert_eq!(opts.timing.default_duration_ms, 500.0);
        assert_eq!(opts.toast.dismiss_after_ms, 3000.0);
        assert_eq!(opts.toast.default_message, "Coming Soon :: System Alpha");
        assert_eq!(opts.pin.hold_property, "translateY");
    }

    #[test]
    fn bad_easing_is_a_parse_error() {
        let err = Options::from_toml("[timing]\ndefault_easing = \"wobble\"")
            .unwrap_err();
        assert!(matches!(err, ScrollweaveError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!(
            "scrollweave-options-{}",
            std::process::id()
        ));
        let path = dir.join("slow.toml");
        let mut opts = Options::default();
        opts.toast.dismiss_after_ms = 5000.0;
        opts.save(&path).unwrap();

        assert_eq!(Options::load(&path).unwrap(), opts);
        assert_eq!(Options::list_presets(&dir), vec!["slow".to_owned()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Options::load(Path::new("/nonexistent/scrollweave.toml"))
            .unwrap_err();
        assert!(matches!(err, ScrollweaveError::Io(_)));
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        assert!(props.contains_key("timing"));
        assert!(props.contains_key("toast"));
        assert!(props.contains_key("pin"));

        let timing = &props["timing"]["properties"];
        assert!(timing.get("default_duration_ms").is_some());
        assert!(timing.get("default_easing").is_some());
        assert!(timing.get("stagger_seed").is_none());
    }
}
