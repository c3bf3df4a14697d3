//! App options.

use serde::{Deserialize, Serialize};

/// App options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOptions {
    /// Whether the platform offers page transitions for the async lane
    #[serde(default = "default_true")]
    pub view_transitions: bool,

    /// Whether the document starts out hidden
    #[serde(default)]
    pub hidden: bool,

    /// Upper bound of frames run by one `run_until_stalled` call
    #[serde(default = "default_max_ticks")]
    pub max_ticks_per_flush: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            view_transitions: true,
            hidden: false,
            max_ticks_per_flush: default_max_ticks(),
        }
    }
}

impl AppOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_ticks() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AppOptions::from_json("{}").unwrap();
        assert_eq!(options, AppOptions::default());
        assert!(options.view_transitions);
    }

    #[test]
    fn test_camel_case() {
        let options = AppOptions::from_json(r#"{"viewTransitions": false, "maxTicksPerFlush": 8}"#).unwrap();
        assert!(!options.view_transitions);
        assert!(!options.hidden);
        assert_eq!(options.max_ticks_per_flush, 8);
    }
}
