//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Policy knobs for a results controller.
///
/// Deserializes with per-field defaults, so hosts can embed it in their own
/// configuration files and set only what they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Keep sections that filtering leaves empty in the visible collection.
    #[serde(default = "default_retain_empty_sections")]
    pub retain_empty_sections: bool,

    /// Ask for a full reload when data switches between flat and sectioned.
    #[serde(default = "default_reload_on_shape_change")]
    pub reload_on_shape_change: bool,

    /// Collapse batches larger than this into a reload. `None` never does.
    #[serde(default)]
    pub max_batch_changes: Option<usize>,
}

fn default_retain_empty_sections() -> bool {
    true
}

fn default_reload_on_shape_change() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            retain_empty_sections: default_retain_empty_sections(),
            reload_on_shape_change: default_reload_on_shape_change(),
            max_batch_changes: None,
        }
    }
}
