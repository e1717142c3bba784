use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use strum_macros::EnumIter;

use stagehand_api::constants::{DEVICE_TYPE_LOOPBACK, DEVICE_TYPE_LUKS2, DEVICE_TYPE_LVM2_LV};

use crate::is_default;

/// Devices keyed by the name stages and mounts refer to them with.
pub type Devices = BTreeMap<String, Device>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum DeviceType {
    Loopback,
    Luks2,
    Lvm2Lv,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Loopback => DEVICE_TYPE_LOOPBACK,
            DeviceType::Luks2 => DEVICE_TYPE_LUKS2,
            DeviceType::Lvm2Lv => DEVICE_TYPE_LVM2_LV,
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A block device opened by the osbuild engine for the duration of a stage.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Device {
    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// Name of the device this one is opened on top of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    pub options: DeviceOptions,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum DeviceOptions {
    Loopback(LoopbackDeviceOptions),
    Luks2(Luks2DeviceOptions),
    Lvm2Lv(Lvm2LvDeviceOptions),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoopbackDeviceOptions {
    pub filename: String,

    /// Offset into the file, in sectors.
    #[serde(skip_serializing_if = "is_default")]
    pub start: u64,

    /// Size of the device, in sectors.
    #[serde(skip_serializing_if = "is_default")]
    pub size: u64,

    #[serde(rename = "sector-size", skip_serializing_if = "Option::is_none")]
    pub sector_size: Option<u64>,

    /// Hold a lock on the loop device while it is open, so that udev does
    /// not probe it in the middle of a stage.
    #[serde(skip_serializing_if = "is_default")]
    pub lock: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Luks2DeviceOptions {
    pub passphrase: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Lvm2LvDeviceOptions {
    pub volume: String,
}

impl Device {
    pub fn loopback(options: LoopbackDeviceOptions) -> Self {
        Self {
            device_type: DeviceType::Loopback,
            parent: None,
            options: DeviceOptions::Loopback(options),
        }
    }

    pub fn luks2(parent: Option<String>, options: Luks2DeviceOptions) -> Self {
        Self {
            device_type: DeviceType::Luks2,
            parent,
            options: DeviceOptions::Luks2(options),
        }
    }

    pub fn lvm2_lv(parent: Option<String>, options: Lvm2LvDeviceOptions) -> Self {
        Self {
            device_type: DeviceType::Lvm2Lv,
            parent,
            options: DeviceOptions::Lvm2Lv(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use stagehand_api::constants::OSBUILD_NAMESPACE;

    use super::*;

    #[test]
    fn test_device_types_namespaced() {
        for device_type in DeviceType::iter() {
            assert!(device_type
                .as_str()
                .starts_with(&format!("{OSBUILD_NAMESPACE}.")));
        }
    }

    #[test]
    fn test_serialize_loopback() {
        let device = Device::loopback(LoopbackDeviceOptions {
            filename: "disk.img".into(),
            start: 2048,
            size: 409600,
            sector_size: None,
            lock: true,
        });
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({
                "type": "org.osbuild.loopback",
                "options": {
                    "filename": "disk.img",
                    "start": 2048,
                    "size": 409600,
                    "lock": true,
                },
            })
        );
    }

    #[test]
    fn test_serialize_unlocked_loopback_omits_lock() {
        let device = Device::loopback(LoopbackDeviceOptions {
            filename: "disk.img".into(),
            start: 0,
            size: 2048,
            sector_size: Some(4096),
            lock: false,
        });
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({
                "type": "org.osbuild.loopback",
                "options": {
                    "filename": "disk.img",
                    "size": 2048,
                    "sector-size": 4096,
                },
            })
        );
    }

    #[test]
    fn test_serialize_chained() {
        let luks = Device::luks2(
            Some("luks-abcd".into()),
            Luks2DeviceOptions {
                passphrase: "secret".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(&luks).unwrap(),
            json!({
                "type": "org.osbuild.luks2",
                "parent": "luks-abcd",
                "options": { "passphrase": "secret" },
            })
        );

        let lv = Device::lvm2_lv(
            Some("rootvg".into()),
            Lvm2LvDeviceOptions {
                volume: "rootlv".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(&lv).unwrap(),
            json!({
                "type": "org.osbuild.lvm2.lv",
                "parent": "rootvg",
                "options": { "volume": "rootlv" },
            })
        );
    }
}
