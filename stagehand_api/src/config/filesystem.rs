use serde::{Deserialize, Serialize};

use crate::constants::ROOT_MOUNT_POINT_PATH;

use super::is_default;

/// A filesystem mounted somewhere in the image. This is the only kind of
/// leaf in the storage tree.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Filesystem {
    /// Filesystem type tag, e.g. `ext4` or `vfat`.
    ///
    /// The tag is not checked when loading the configuration. Tags that no
    /// mount type exists for are rejected when the mounts are generated.
    pub fs_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    /// Absolute path the filesystem is mounted on.
    pub mountpoint: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fstab_options: String,

    #[serde(default, skip_serializing_if = "is_default")]
    pub fstab_freq: u64,

    #[serde(default, skip_serializing_if = "is_default")]
    pub fstab_pass_no: u64,
}

impl Filesystem {
    /// Returns whether this filesystem is mounted on `/`.
    pub fn is_root(&self) -> bool {
        self.mountpoint == ROOT_MOUNT_POINT_PATH
    }

    /// Short description suitable for log messages.
    pub fn description(&self) -> String {
        format!("type:{} mnt:{}", self.fs_type, self.mountpoint)
    }
}
