use const_format::formatcp;

// Storage constants

/// Sector size used when the partition table does not specify one.
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Mount point of the root filesystem.
pub const ROOT_MOUNT_POINT_PATH: &str = "/";

/// Prefix of the device names generated for LUKS containers.
pub const LUKS_DEVICE_NAME_PREFIX: &str = "luks-";

/// Number of UUID characters appended to `LUKS_DEVICE_NAME_PREFIX`.
pub const LUKS_DEVICE_NAME_UUID_LEN: usize = 4;

/// Key under which stages expect the device they operate on.
pub const STAGE_TARGET_DEVICE: &str = "device";

/// Key derivation function used when formatting LUKS containers.
pub const LUKS_PBKDF_METHOD: &str = "argon2id";

/// Default name of the pipeline providing the tree copied into the image.
pub const DEFAULT_INPUT_PIPELINE: &str = "os";

/// Name of the copy stage input holding the OS tree.
pub const ROOT_TREE_INPUT: &str = "root-tree";

// osbuild type names

/// Namespace shared by every osbuild stage, device and mount type.
pub const OSBUILD_NAMESPACE: &str = "org.osbuild";

pub const DEVICE_TYPE_LOOPBACK: &str = formatcp!("{OSBUILD_NAMESPACE}.loopback");
pub const DEVICE_TYPE_LUKS2: &str = formatcp!("{OSBUILD_NAMESPACE}.luks2");
pub const DEVICE_TYPE_LVM2_LV: &str = formatcp!("{OSBUILD_NAMESPACE}.lvm2.lv");

pub const STAGE_TYPE_LUKS2_FORMAT: &str = formatcp!("{OSBUILD_NAMESPACE}.luks2.format");
pub const STAGE_TYPE_LUKS2_REMOVE_KEY: &str = formatcp!("{OSBUILD_NAMESPACE}.luks2.remove-key");
pub const STAGE_TYPE_CLEVIS_LUKS_BIND: &str = formatcp!("{OSBUILD_NAMESPACE}.clevis.luks-bind");
pub const STAGE_TYPE_LVM2_CREATE: &str = formatcp!("{OSBUILD_NAMESPACE}.lvm2.create");
pub const STAGE_TYPE_LVM2_METADATA: &str = formatcp!("{OSBUILD_NAMESPACE}.lvm2.metadata");
pub const STAGE_TYPE_COPY: &str = formatcp!("{OSBUILD_NAMESPACE}.copy");

pub const MOUNT_TYPE_XFS: &str = formatcp!("{OSBUILD_NAMESPACE}.xfs");
pub const MOUNT_TYPE_FAT: &str = formatcp!("{OSBUILD_NAMESPACE}.fat");
pub const MOUNT_TYPE_EXT4: &str = formatcp!("{OSBUILD_NAMESPACE}.ext4");
pub const MOUNT_TYPE_BTRFS: &str = formatcp!("{OSBUILD_NAMESPACE}.btrfs");

pub const INPUT_TYPE_TREE: &str = formatcp!("{OSBUILD_NAMESPACE}.tree");
pub const INPUT_ORIGIN_PIPELINE: &str = formatcp!("{OSBUILD_NAMESPACE}.pipeline");
