use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the geography snapshot is loaded from at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// The seeded reference tables.
    #[default]
    Database,
    /// The dataset compiled into the binary.
    Embedded,
    /// A JSON dataset on disk (`dataset_path`).
    File,
}

/// Geography module configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeographyConfig {
    pub source: SnapshotSource,
    /// Required when `source` is `file`.
    pub dataset_path: Option<PathBuf>,
}
