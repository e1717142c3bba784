//! Translation of a storage tree into osbuild stages.
//!
//! Every function in here is a pure function of the partition table and the
//! name of the image file backing its loopback devices.

mod chain;
mod creation;
mod finish;
mod image;
mod mounts;
mod names;

pub use chain::{build_chain, stage_devices, DeviceChain};
pub use creation::gen_device_creation_stages;
pub use finish::{gen_device_finish_stages, FinishStages};
pub use image::{gen_image_stages, Manifest};
pub use mounts::{gen_mounts_devices, MountsDevices};
pub use names::{device_name, path_escape, path_unescape};
