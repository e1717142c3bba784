//! Device naming.
//!
//! Every device in a stage is keyed by a name derived from the entity that
//! sits on top of it. The same entity must always yield the same name, since
//! the names produced for different stages are merged into a single device
//! map.

use stagehand_api::{
    constants::{LUKS_DEVICE_NAME_PREFIX, LUKS_DEVICE_NAME_UUID_LEN, ROOT_MOUNT_POINT_PATH},
    error::{InternalError, StagehandError},
    Entity,
};

/// Returns the name of the device backing `entity`.
///
/// Only entities that can be mounted or opened as a device have a name.
/// Asking for the name of a partition table or a partition is a bug.
pub fn device_name(entity: Entity) -> Result<String, StagehandError> {
    match entity {
        Entity::Filesystem(fs) => Ok(path_escape(&fs.mountpoint)),
        Entity::Luks(luks) => Ok(format!(
            "{LUKS_DEVICE_NAME_PREFIX}{}",
            luks.uuid
                .chars()
                .take(LUKS_DEVICE_NAME_UUID_LEN)
                .collect::<String>()
        )),
        Entity::VolumeGroup(vg) => Ok(vg.name.clone()),
        Entity::LogicalVolume(lv) => Ok(lv.name.clone()),
        Entity::PartitionTable(_) | Entity::Partition(_) => {
            Err(StagehandError::new(InternalError::UnnamedEntity {
                kind: entity.kind().into(),
            }))
        }
    }
}

/// Escapes a path the way `systemd-escape --path` does, without the
/// escaping of non-ASCII characters.
///
/// Examples:
///
/// - `/` -> `-`
/// - `/boot/efi` -> `boot-efi`
/// - `/var/my-data` -> `var-my\x2ddata`
pub fn path_escape(path: &str) -> String {
    if path.is_empty() || path == ROOT_MOUNT_POINT_PATH {
        return "-".into();
    }

    // Backslashes go first so that the ones introduced by escaping dashes
    // are left alone.
    path.trim_matches('/')
        .replace('\\', r"\x5c")
        .replace('-', r"\x2d")
        .replace('/', "-")
}

/// Turns a name produced by `path_escape` back into an absolute path.
pub fn path_unescape(name: &str) -> String {
    if name == "-" {
        return ROOT_MOUNT_POINT_PATH.into();
    }

    name.split('-')
        .map(unescape_segment)
        .fold(String::new(), |mut path, segment| {
            path.push('/');
            path.push_str(&segment);
            path
        })
}

/// Decodes `\xNN` sequences, left to right. Anything that is not a valid
/// ASCII escape is kept as is.
fn unescape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find(r"\x") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match candidate
            .get(2..4)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .filter(u8::is_ascii)
        {
            Some(byte) => {
                out.push(byte as char);
                rest = &candidate[4..];
            }
            None => {
                out.push('\\');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
