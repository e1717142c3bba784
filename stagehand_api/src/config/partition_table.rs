use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::constants::DEFAULT_SECTOR_SIZE;

use super::{is_default, Filesystem, LuksContainer, LvmVolumeGroup};

#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PartitionTableType {
    #[default]
    Gpt,
    Dos,
}

/// Root of the storage tree.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartitionTable {
    /// Size of the whole image in bytes.
    #[serde(default, skip_serializing_if = "is_default")]
    pub size: u64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,

    #[serde(rename = "type", default)]
    pub pt_type: PartitionTableType,

    /// Sector size in bytes. Zero selects `DEFAULT_SECTOR_SIZE`.
    #[serde(default, skip_serializing_if = "is_default")]
    pub sector_size: u64,

    #[serde(default)]
    pub partitions: Vec<Partition>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Partition {
    /// Offset of the partition from the start of the image, in bytes.
    pub start: u64,

    /// Size of the partition in bytes.
    pub size: u64,

    /// Partition type GUID (GPT) or ID (DOS).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub part_type: String,

    #[serde(default, skip_serializing_if = "is_default")]
    pub bootable: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,

    /// Contents of the partition. Partitions such as the BIOS boot
    /// partition carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// Anything that can be placed inside a partition, a LUKS container or a
/// logical volume.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Payload {
    Filesystem(Filesystem),
    Luks(LuksContainer),
    Lvm(LvmVolumeGroup),
}

impl PartitionTable {
    /// Returns the effective sector size of the table.
    pub fn sector_size(&self) -> u64 {
        if self.sector_size == 0 {
            DEFAULT_SECTOR_SIZE
        } else {
            self.sector_size
        }
    }

    /// Converts a byte count into a number of sectors of this table.
    pub fn bytes_to_sectors(&self, bytes: u64) -> u64 {
        bytes / self.sector_size()
    }

    /// Calls `f` on every LUKS container in the tree, in tree order.
    pub(crate) fn for_each_luks_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut LuksContainer),
    {
        fn visit<F: FnMut(&mut LuksContainer)>(payload: &mut Payload, f: &mut F) {
            match payload {
                Payload::Filesystem(_) => {}
                Payload::Luks(luks) => {
                    f(&mut *luks);
                    visit(&mut luks.payload, f);
                }
                Payload::Lvm(vg) => {
                    for lv in vg.logical_volumes.iter_mut() {
                        visit(&mut lv.payload, f);
                    }
                }
            }
        }

        for payload in self.partitions.iter_mut().filter_map(|p| p.payload.as_mut()) {
            visit(payload, &mut f);
        }
    }
}
