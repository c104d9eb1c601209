use serde::{Deserialize, Serialize};

/// `plans` section of the server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlansConfig {
    /// Longest accepted plan name, in characters.
    pub max_name_length: usize,
    /// Most départements a single attach call may carry.
    pub max_batch_size: usize,
}

impl Default for PlansConfig {
    fn default() -> Self {
        Self {
            max_name_length: 255,
            max_batch_size: 101,
        }
    }
}
