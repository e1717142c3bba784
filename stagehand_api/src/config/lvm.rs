use serde::{Deserialize, Serialize};

use super::Payload;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LvmVolumeGroup {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Logical volumes, in creation order.
    #[serde(default)]
    pub logical_volumes: Vec<LvmLogicalVolume>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LvmLogicalVolume {
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    pub payload: Payload,
}
