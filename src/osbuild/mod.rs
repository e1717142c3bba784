//! Records consumed by the osbuild engine.
//!
//! Only construction and serialization live here. The field names and
//! omission rules follow the JSON schemas of the corresponding osbuild
//! stages, devices and mounts.

mod devices;
mod mounts;
mod stages;

pub use devices::{
    Device, DeviceOptions, DeviceType, Devices, LoopbackDeviceOptions, Luks2DeviceOptions,
    Lvm2LvDeviceOptions,
};
pub use mounts::{Mount, MountType};
pub use stages::{
    Argon2idOptions, ClevisLuksBindStageOptions, CopyPath, CopyStageOptions, Inputs,
    Luks2FormatStageOptions, Luks2RemoveKeyStageOptions, Lvm2CreateStageOptions,
    Lvm2LogicalVolume, Lvm2MetadataStageOptions, Stage, StageOptions, StageType, TreeInput,
};
