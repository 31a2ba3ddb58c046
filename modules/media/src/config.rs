use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub max_assets_per_product: usize,
    /// Report `NotFound` when a deleted product had nothing cached.
    pub strict_purge: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_assets_per_product: 16,
            strict_purge: false,
        }
    }
}
