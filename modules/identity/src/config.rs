use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub max_display_name_length: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            max_display_name_length: 100,
        }
    }
}
