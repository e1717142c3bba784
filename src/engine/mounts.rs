use std::collections::btree_map::Entry;

use log::{debug, trace};

use stagehand_api::{
    config::PartitionTable,
    error::{InternalError, ManifestError, ReportError, StagehandError},
};

use crate::osbuild::{Devices, Mount, MountType};

use super::{
    chain::{build_chain, DeviceChain},
    names::path_unescape,
};

/// Everything a stage needs to access the filesystems of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountsDevices {
    /// Name of the mount holding the root filesystem.
    pub root_name: String,

    /// Mounts sorted so that every mount comes after the mounts of its
    /// parent directories.
    pub mounts: Vec<Mount>,

    pub devices: Devices,
}

/// Resolves the mounts of every filesystem in `pt`, along with the devices
/// they are mounted from.
///
/// The device chains of all filesystems are merged into one map. Two chains
/// may share a device, as long as they agree on what it is.
pub fn gen_mounts_devices(
    pt: &PartitionTable,
    filename: &str,
) -> Result<MountsDevices, StagehandError> {
    let mut root_name = None;
    let mut mounts = Vec::new();

    let devices = pt
        .mountables()
        .into_iter()
        .try_fold(Devices::new(), |acc, (fs, path)| {
            let DeviceChain { devices, last } = build_chain(path.nodes(), filename, false)?;
            let name = last.structured(InternalError::EmptyDeviceChain {
                kind: path.entity().kind().into(),
                name: path.entity().describe(),
            })?;

            let mount_type = MountType::for_filesystem(&fs.fs_type).structured(
                ManifestError::UnsupportedFilesystem {
                    fs_type: fs.fs_type.clone(),
                },
            )?;
            debug!(
                "Mounting '{name}' on '{}' as {}",
                fs.mountpoint,
                mount_type.as_str()
            );

            if fs.is_root() {
                root_name = Some(name.clone());
            }
            mounts.push(Mount::new(mount_type, name.clone(), name, fs.mountpoint.clone()));

            merge_devices(acc, devices)
        })?;

    // Byte-wise ordering puts every directory before its subdirectories.
    mounts.sort_by(|a, b| a.target.cmp(&b.target));

    let root_name = root_name.structured(ManifestError::MissingRootMount)?;

    Ok(MountsDevices {
        root_name,
        mounts,
        devices,
    })
}

/// Adds the devices of a chain to `acc`.
///
/// A name already present must refer to an identical device. Anything else
/// means the naming scheme produced the same name for two distinct devices.
fn merge_devices(mut acc: Devices, chain: Devices) -> Result<Devices, StagehandError> {
    for (name, device) in chain {
        match acc.entry(name) {
            Entry::Vacant(entry) => {
                trace!("Adding device '{}'", entry.key());
                entry.insert(device);
            }
            Entry::Occupied(entry) => {
                if *entry.get() != device {
                    debug!(
                        "Device name '{}' (mountpoint '{}') is claimed by {:?} and {:?}",
                        entry.key(),
                        path_unescape(entry.key()),
                        entry.get(),
                        device
                    );
                    return Err(StagehandError::new(ManifestError::DeviceNameCollision {
                        name: entry.key().clone(),
                    }));
                }
            }
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use maplit::btreemap;

    use stagehand_api::{
        config::{
            Argon2id, Filesystem, LuksContainer, LvmLogicalVolume, LvmVolumeGroup, Partition,
            Payload,
        },
        error::ErrorKind,
    };

    use crate::osbuild::{Device, LoopbackDeviceOptions, Luks2DeviceOptions, Lvm2LvDeviceOptions};

    use super::*;

    fn fs(fs_type: &str, mountpoint: &str) -> Payload {
        Payload::Filesystem(Filesystem {
            fs_type: fs_type.into(),
            mountpoint: mountpoint.into(),
            ..Default::default()
        })
    }

    fn partition(start: u64, size: u64, payload: Payload) -> Partition {
        Partition {
            start,
            size,
            payload: Some(payload),
            ..Default::default()
        }
    }

    fn loopback(start: u64, size: u64) -> Device {
        Device::loopback(LoopbackDeviceOptions {
            filename: "disk.img".into(),
            start,
            size,
            sector_size: None,
            lock: false,
        })
    }

    fn encrypted_lvm(vg_name: &str, volumes: Vec<(&str, Payload)>) -> Payload {
        Payload::Luks(LuksContainer {
            uuid: "abcd1234-0000-0000-0000-000000000000".into(),
            passphrase: "secret".into(),
            cipher: String::new(),
            label: String::new(),
            subsystem: String::new(),
            sector_size: None,
            pbkdf: Argon2id::default(),
            clevis: None,
            payload: Box::new(Payload::Lvm(LvmVolumeGroup {
                name: vg_name.into(),
                description: String::new(),
                logical_volumes: volumes
                    .into_iter()
                    .map(|(name, payload)| LvmLogicalVolume {
                        name: name.into(),
                        size: 1073741824,
                        payload,
                    })
                    .collect(),
            })),
        })
    }

    #[test]
    fn test_plain_partitions() {
        // The ESP comes first on disk but must be mounted after the root.
        let pt = PartitionTable {
            partitions: vec![
                partition(1048576, 209715200, fs("vfat", "/boot/efi")),
                partition(210763776, 2147483648, fs("ext4", "/")),
            ],
            ..Default::default()
        };
        let resolved = gen_mounts_devices(&pt, "disk.img").unwrap();

        assert_eq!(resolved.root_name, "-");
        assert_eq!(
            resolved.mounts,
            vec![
                Mount::new(MountType::Ext4, "-", "-", "/"),
                Mount::new(MountType::Fat, "boot-efi", "boot-efi", "/boot/efi"),
            ]
        );
        assert_eq!(
            resolved.devices,
            btreemap! {
                "-".to_string() => loopback(411648, 4194304),
                "boot-efi".to_string() => loopback(2048, 409600),
            }
        );
    }

    #[test]
    fn test_shared_devices_merged() {
        let pt = PartitionTable {
            partitions: vec![
                partition(1048576, 209715200, fs("xfs", "/boot")),
                partition(
                    210763776,
                    4294967296,
                    encrypted_lvm(
                        "vg00",
                        vec![("lv_root", fs("xfs", "/")), ("lv_home", fs("btrfs", "/home"))],
                    ),
                ),
            ],
            ..Default::default()
        };
        let resolved = gen_mounts_devices(&pt, "disk.img").unwrap();

        assert_eq!(resolved.root_name, "-");
        let targets: Vec<&str> = resolved.mounts.iter().map(|m| m.target.as_str()).collect();
        assert_eq!(targets, vec!["/", "/boot", "/home"]);
        assert_eq!(
            resolved.devices,
            btreemap! {
                "boot".to_string() => loopback(2048, 409600),
                "luks-abcd".to_string() => loopback(411648, 8388608),
                "vg00".to_string() => Device::luks2(
                    Some("luks-abcd".into()),
                    Luks2DeviceOptions { passphrase: "secret".into() },
                ),
                "-".to_string() => Device::lvm2_lv(
                    Some("vg00".into()),
                    Lvm2LvDeviceOptions { volume: "lv_root".into() },
                ),
                "home".to_string() => Device::lvm2_lv(
                    Some("vg00".into()),
                    Lvm2LvDeviceOptions { volume: "lv_home".into() },
                ),
            }
        );
    }

    #[test]
    fn test_mounts_sorted_parents_first() {
        let pt = PartitionTable {
            partitions: vec![
                partition(1048576, 1048576, fs("xfs", "/var/lib")),
                partition(2097152, 1048576, fs("xfs", "/var")),
                partition(3145728, 1048576, fs("vfat", "/boot/efi")),
                partition(4194304, 1048576, fs("xfs", "/boot")),
                partition(5242880, 1048576, fs("xfs", "/")),
            ],
            ..Default::default()
        };
        let resolved = gen_mounts_devices(&pt, "disk.img").unwrap();
        let targets: Vec<&str> = resolved.mounts.iter().map(|m| m.target.as_str()).collect();
        assert_eq!(targets, vec!["/", "/boot", "/boot/efi", "/var", "/var/lib"]);

        for (i, mount) in resolved.mounts.iter().enumerate() {
            for later in &resolved.mounts[i + 1..] {
                assert!(!mount.target.starts_with(&format!("{}/", later.target)));
            }
        }
    }

    #[test]
    fn test_mount_names_map_back_to_targets() {
        let pt = PartitionTable {
            partitions: vec![
                partition(1048576, 209715200, fs("vfat", "/boot/efi")),
                partition(210763776, 1048576, fs("xfs", "/var/lib/my-app")),
                partition(211812352, 2147483648, fs("ext4", "/")),
            ],
            ..Default::default()
        };
        let resolved = gen_mounts_devices(&pt, "disk.img").unwrap();
        assert_eq!(resolved.mounts.len(), 3);
        for mount in &resolved.mounts {
            assert_eq!(mount.name, mount.source);
            assert_eq!(path_unescape(&mount.name), mount.target);
        }
    }

    #[test]
    fn test_unsupported_filesystem() {
        let pt = PartitionTable {
            partitions: vec![
                partition(1048576, 1048576, fs("xfs", "/")),
                partition(2097152, 1048576, fs("zfs", "/tank")),
            ],
            ..Default::default()
        };
        let err = gen_mounts_devices(&pt, "disk.img").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::Manifest(ManifestError::UnsupportedFilesystem {
                fs_type: "zfs".into()
            })
        );
    }

    #[test]
    fn test_missing_root_mount() {
        let pt = PartitionTable {
            partitions: vec![partition(1048576, 1048576, fs("xfs", "/data"))],
            ..Default::default()
        };
        let err = gen_mounts_devices(&pt, "disk.img").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::Manifest(ManifestError::MissingRootMount)
        );
    }

    #[test]
    fn test_device_name_collision() {
        // The volume group device and the /boot filesystem both end up named
        // "boot".
        let pt = PartitionTable {
            partitions: vec![
                partition(1048576, 1048576, fs("xfs", "/boot")),
                partition(
                    2097152,
                    4294967296,
                    encrypted_lvm("boot", vec![("lv_root", fs("xfs", "/"))]),
                ),
            ],
            ..Default::default()
        };
        let err = gen_mounts_devices(&pt, "disk.img").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::Manifest(ManifestError::DeviceNameCollision {
                name: "boot".into()
            })
        );
    }

    #[test]
    fn test_merge_devices() {
        let acc = btreemap! { "a".to_string() => loopback(0, 8) };

        let merged = merge_devices(
            acc.clone(),
            btreemap! {
                "a".to_string() => loopback(0, 8),
                "b".to_string() => loopback(8, 8),
            },
        )
        .unwrap();
        assert_eq!(merged.len(), 2);

        let err = merge_devices(acc, btreemap! { "a".to_string() => loopback(0, 16) })
            .unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::Manifest(ManifestError::DeviceNameCollision { name: "a".into() })
        );
    }
}
