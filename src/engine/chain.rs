use log::trace;

use stagehand_api::{
    config::{EntityPath, PartitionTable, Payload},
    constants::STAGE_TARGET_DEVICE,
    error::{InternalError, ReportError, StagehandError},
    Entity,
};

use crate::osbuild::{
    Device, Devices, LoopbackDeviceOptions, Luks2DeviceOptions, Lvm2LvDeviceOptions,
};

use super::names::device_name;

/// Devices that must be opened, in order, to reach an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChain {
    pub devices: Devices,

    /// Name of the device opened last, the one the entity sits on.
    pub last: Option<String>,
}

impl DeviceChain {
    fn push(&mut self, name: String, device: Device) {
        trace!("Chaining device '{name}' of type '{}'", device.device_type.as_str());
        self.devices.insert(name.clone(), device);
        self.last = Some(name);
    }
}

/// Builds the chain of devices needed to open every entity of `path`, from
/// the root down.
///
/// Each device is named after the entity it exposes and refers to the device
/// before it as its parent. Loopback devices are backed by `filename`.
pub fn build_chain(
    path: &[Entity],
    filename: &str,
    lock_loopback: bool,
) -> Result<DeviceChain, StagehandError> {
    let mut chain = DeviceChain::default();
    let mut table: Option<&PartitionTable> = None;

    for entity in path {
        match *entity {
            Entity::PartitionTable(pt) => table = Some(pt),
            Entity::Partition(partition) => {
                let pt = table.structured(InternalError::MissingPartitionTable)?;
                let name = payload_name(partition.payload.as_ref())?;
                let device = Device::loopback(LoopbackDeviceOptions {
                    filename: filename.into(),
                    start: pt.bytes_to_sectors(partition.start),
                    size: pt.bytes_to_sectors(partition.size),
                    sector_size: None,
                    lock: lock_loopback,
                });
                chain.push(name, device);
            }
            Entity::Luks(luks) => {
                let name = payload_name(Some(luks.payload.as_ref()))?;
                let device = Device::luks2(
                    chain.last.clone(),
                    Luks2DeviceOptions {
                        passphrase: luks.passphrase.clone(),
                    },
                );
                chain.push(name, device);
            }
            Entity::LogicalVolume(lv) => {
                let name = payload_name(Some(&lv.payload))?;
                let device = Device::lvm2_lv(
                    chain.last.clone(),
                    Lvm2LvDeviceOptions {
                        volume: lv.name.clone(),
                    },
                );
                chain.push(name, device);
            }
            Entity::VolumeGroup(_) | Entity::Filesystem(_) => {}
        }
    }

    Ok(chain)
}

fn payload_name(payload: Option<&Payload>) -> Result<String, StagehandError> {
    let payload = payload.structured(InternalError::Internal(
        "Partition on a device path has no payload",
    ))?;
    device_name(Entity::from(payload))
}

/// Returns the devices a stage operating on the entity at the end of `path`
/// needs.
///
/// The chain stops at the parent of the entity. Its last device, the one
/// the stage acts upon, is renamed to `STAGE_TARGET_DEVICE`.
pub fn stage_devices(path: &EntityPath, filename: &str) -> Result<Devices, StagehandError> {
    let DeviceChain { mut devices, last } = build_chain(path.ancestors(), filename, true)?;

    let entity = path.entity();
    let target = last
        .and_then(|name| devices.remove(&name))
        .structured(InternalError::EmptyDeviceChain {
            kind: entity.kind().into(),
            name: entity.describe(),
        })?;
    devices.insert(STAGE_TARGET_DEVICE.into(), target);

    Ok(devices)
}
