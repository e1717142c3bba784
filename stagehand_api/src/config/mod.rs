mod build_config;
mod entity;
mod filesystem;
mod luks;
mod lvm;
mod partition_table;

pub use build_config::BuildConfiguration;
pub use entity::{Entity, EntityPath};
pub use filesystem::Filesystem;
pub use luks::{Argon2id, ClevisBind, LuksContainer};
pub use lvm::{LvmLogicalVolume, LvmVolumeGroup};
pub use partition_table::{Partition, PartitionTable, PartitionTableType, Payload};

/// Returns true if the value is equal to its default value.
pub(crate) fn is_default<T: Default + PartialEq>(t: &T) -> bool {
    t == &T::default()
}
