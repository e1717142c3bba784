use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use stagehand_api::constants::{MOUNT_TYPE_BTRFS, MOUNT_TYPE_EXT4, MOUNT_TYPE_FAT, MOUNT_TYPE_XFS};

/// Filesystems the osbuild engine knows how to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MountType {
    Xfs,
    Fat,
    Ext4,
    Btrfs,
}

impl MountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountType::Xfs => MOUNT_TYPE_XFS,
            MountType::Fat => MOUNT_TYPE_FAT,
            MountType::Ext4 => MOUNT_TYPE_EXT4,
            MountType::Btrfs => MOUNT_TYPE_BTRFS,
        }
    }

    /// Filesystem type tag as used in the storage tree.
    pub fn fs_type(&self) -> &'static str {
        match self {
            MountType::Xfs => "xfs",
            MountType::Fat => "vfat",
            MountType::Ext4 => "ext4",
            MountType::Btrfs => "btrfs",
        }
    }

    /// Looks up the mount type for a filesystem type tag.
    pub fn for_filesystem(fs_type: &str) -> Option<Self> {
        Self::iter().find(|mount_type| mount_type.fs_type() == fs_type)
    }
}

impl Serialize for MountType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub name: String,

    #[serde(rename = "type")]
    pub mount_type: MountType,

    /// Name of the device to mount.
    pub source: String,

    /// Path inside the image the device is mounted on.
    pub target: String,
}

impl Mount {
    pub fn new(
        mount_type: MountType,
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mount_type,
            source: source.into(),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_for_filesystem() {
        assert_eq!(MountType::for_filesystem("xfs"), Some(MountType::Xfs));
        assert_eq!(MountType::for_filesystem("vfat"), Some(MountType::Fat));
        assert_eq!(MountType::for_filesystem("ext4"), Some(MountType::Ext4));
        assert_eq!(MountType::for_filesystem("btrfs"), Some(MountType::Btrfs));

        assert_eq!(MountType::for_filesystem("zfs"), None);
        assert_eq!(MountType::for_filesystem("fat"), None);
        assert_eq!(MountType::for_filesystem("EXT4"), None);
        assert_eq!(MountType::for_filesystem(""), None);
    }

    #[test]
    fn test_serialize() {
        let mount = Mount::new(MountType::Fat, "boot-efi", "boot-efi", "/boot/efi");
        assert_eq!(
            serde_json::to_value(&mount).unwrap(),
            json!({
                "name": "boot-efi",
                "type": "org.osbuild.fat",
                "source": "boot-efi",
                "target": "/boot/efi",
            })
        );
    }
}
