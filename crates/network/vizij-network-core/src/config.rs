//! Runtime configuration for network instances.

use serde::{Deserialize, Serialize};

/// Configuration for a [`NetworkInstance`](crate::network::NetworkInstance).
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compare load-generation counters of the definition handle and data
    /// interface on every `check_state`, tearing down and rebuilding the
    /// runtime graph when either changed. Disable for builds that never
    /// hot-reload content.
    pub hot_reload: bool,

    /// Initial capacity hint for the pending trigger queue.
    pub trigger_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hot_reload: true,
            trigger_capacity: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "hot_reload": false }"#).expect("config");
        assert!(!cfg.hot_reload);
        assert_eq!(cfg.trigger_capacity, Config::default().trigger_capacity);
    }
}
