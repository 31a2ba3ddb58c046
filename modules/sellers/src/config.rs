use modkit::bus::BroadcastMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SellersConfig {
    /// Mode for the `SellerRegistered` broadcast; the bus default when unset.
    pub announce_mode: Option<BroadcastMode>,
}
