use serde::{Deserialize, Serialize};

/// How a broadcast runs its handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Registration order, one at a time, stop at the first failure.
    #[default]
    Sequential,
    /// All at once, wait for every handler, then aggregate.
    Parallel,
}

impl std::str::FromStr for BroadcastMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(BroadcastMode::Sequential),
            "parallel" => Ok(BroadcastMode::Parallel),
            other => Err(format!(
                "unknown broadcast mode '{other}', expected 'sequential' or 'parallel'"
            )),
        }
    }
}

/// Bus settings, usually the `bus` section of the application config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Mode used by `publish_broadcast` when the caller does not pick one.
    #[serde(default)]
    pub broadcast_mode: BroadcastMode,
    /// Refuse to start when a request has more than one handler.
    #[serde(default)]
    pub strict_requests: bool,
    /// Handlers slower than this are logged at `warn`.
    #[serde(default)]
    pub slow_handler_threshold_ms: Option<u64>,
}
