use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use stagehand_api::{
    config::{Argon2id, ClevisBind, LuksContainer, LvmVolumeGroup},
    constants::{
        INPUT_ORIGIN_PIPELINE, INPUT_TYPE_TREE, LUKS_PBKDF_METHOD, ROOT_TREE_INPUT,
        STAGE_TYPE_CLEVIS_LUKS_BIND, STAGE_TYPE_COPY, STAGE_TYPE_LUKS2_FORMAT,
        STAGE_TYPE_LUKS2_REMOVE_KEY, STAGE_TYPE_LVM2_CREATE, STAGE_TYPE_LVM2_METADATA,
    },
};

use crate::is_default;

use super::{Devices, Mount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageType {
    Luks2Format,
    Luks2RemoveKey,
    ClevisLuksBind,
    Lvm2Create,
    Lvm2Metadata,
    Copy,
}

impl StageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::Luks2Format => STAGE_TYPE_LUKS2_FORMAT,
            StageType::Luks2RemoveKey => STAGE_TYPE_LUKS2_REMOVE_KEY,
            StageType::ClevisLuksBind => STAGE_TYPE_CLEVIS_LUKS_BIND,
            StageType::Lvm2Create => STAGE_TYPE_LVM2_CREATE,
            StageType::Lvm2Metadata => STAGE_TYPE_LVM2_METADATA,
            StageType::Copy => STAGE_TYPE_COPY,
        }
    }
}

impl Serialize for StageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single step of an osbuild pipeline.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    #[serde(rename = "type")]
    pub stage_type: StageType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Inputs>,

    pub options: StageOptions,

    #[serde(skip_serializing_if = "Devices::is_empty")]
    pub devices: Devices,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<Mount>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StageOptions {
    Luks2Format(Luks2FormatStageOptions),
    Luks2RemoveKey(Luks2RemoveKeyStageOptions),
    ClevisLuksBind(ClevisLuksBindStageOptions),
    Lvm2Create(Lvm2CreateStageOptions),
    Lvm2Metadata(Lvm2MetadataStageOptions),
    Copy(CopyStageOptions),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Luks2FormatStageOptions {
    pub uuid: String,

    pub passphrase: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cipher: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub subsystem: String,

    #[serde(rename = "sector-size", skip_serializing_if = "Option::is_none")]
    pub sector_size: Option<u64>,

    pub pbkdf: Argon2idOptions,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Argon2idOptions {
    pub method: &'static str,

    #[serde(skip_serializing_if = "is_default")]
    pub iterations: u32,

    #[serde(skip_serializing_if = "is_default")]
    pub memory: u32,

    #[serde(skip_serializing_if = "is_default")]
    pub parallelism: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClevisLuksBindStageOptions {
    pub passphrase: String,
    pub pin: String,
    pub policy: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Luks2RemoveKeyStageOptions {
    pub passphrase: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Lvm2CreateStageOptions {
    pub volumes: Vec<Lvm2LogicalVolume>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Lvm2LogicalVolume {
    pub name: String,

    /// Size with an explicit unit suffix. lvcreate reads bare numbers as
    /// megabytes.
    pub size: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Lvm2MetadataStageOptions {
    pub vg_name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CopyStageOptions {
    pub paths: Vec<CopyPath>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CopyPath {
    pub from: String,
    pub to: String,
}

/// Stage inputs keyed by the name the stage refers to them with.
pub type Inputs = BTreeMap<String, TreeInput>;

/// A filesystem tree produced by another pipeline.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeInput {
    #[serde(rename = "type")]
    pub input_type: &'static str,
    pub origin: &'static str,
    pub references: Vec<String>,
}

impl TreeInput {
    pub fn from_pipeline(pipeline: &str) -> Self {
        Self {
            input_type: INPUT_TYPE_TREE,
            origin: INPUT_ORIGIN_PIPELINE,
            references: vec![format!("name:{pipeline}")],
        }
    }
}

impl From<&LuksContainer> for Luks2FormatStageOptions {
    fn from(luks: &LuksContainer) -> Self {
        Self {
            uuid: luks.uuid.clone(),
            passphrase: luks.passphrase.clone(),
            cipher: luks.cipher.clone(),
            label: luks.label.clone(),
            subsystem: luks.subsystem.clone(),
            sector_size: luks.sector_size,
            pbkdf: luks.pbkdf.into(),
        }
    }
}

impl From<Argon2id> for Argon2idOptions {
    fn from(pbkdf: Argon2id) -> Self {
        Self {
            method: LUKS_PBKDF_METHOD,
            iterations: pbkdf.iterations,
            memory: pbkdf.memory,
            parallelism: pbkdf.parallelism,
        }
    }
}

impl ClevisLuksBindStageOptions {
    pub fn new(passphrase: &str, clevis: &ClevisBind) -> Self {
        Self {
            passphrase: passphrase.into(),
            pin: clevis.pin.clone(),
            policy: clevis.policy.clone(),
        }
    }
}

impl From<&LvmVolumeGroup> for Lvm2CreateStageOptions {
    fn from(vg: &LvmVolumeGroup) -> Self {
        Self {
            volumes: vg
                .logical_volumes
                .iter()
                .map(|lv| Lvm2LogicalVolume {
                    name: lv.name.clone(),
                    size: format!("{}B", lv.size),
                })
                .collect(),
        }
    }
}

impl CopyStageOptions {
    /// Copies the whole input tree onto the filesystem mounted as
    /// `root_mount`.
    pub fn root_tree(root_mount: &str) -> Self {
        Self {
            paths: vec![CopyPath {
                from: format!("input://{ROOT_TREE_INPUT}/"),
                to: format!("mount://{root_mount}/"),
            }],
        }
    }
}

impl Stage {
    fn new(stage_type: StageType, options: StageOptions, devices: Devices) -> Self {
        Self {
            stage_type,
            inputs: None,
            options,
            devices,
            mounts: Vec::new(),
        }
    }

    pub fn luks2_format(options: Luks2FormatStageOptions, devices: Devices) -> Self {
        Self::new(
            StageType::Luks2Format,
            StageOptions::Luks2Format(options),
            devices,
        )
    }

    pub fn luks2_remove_key(options: Luks2RemoveKeyStageOptions, devices: Devices) -> Self {
        Self::new(
            StageType::Luks2RemoveKey,
            StageOptions::Luks2RemoveKey(options),
            devices,
        )
    }

    pub fn clevis_luks_bind(options: ClevisLuksBindStageOptions, devices: Devices) -> Self {
        Self::new(
            StageType::ClevisLuksBind,
            StageOptions::ClevisLuksBind(options),
            devices,
        )
    }

    pub fn lvm2_create(options: Lvm2CreateStageOptions, devices: Devices) -> Self {
        Self::new(
            StageType::Lvm2Create,
            StageOptions::Lvm2Create(options),
            devices,
        )
    }

    pub fn lvm2_metadata(options: Lvm2MetadataStageOptions, devices: Devices) -> Self {
        Self::new(
            StageType::Lvm2Metadata,
            StageOptions::Lvm2Metadata(options),
            devices,
        )
    }

    /// Copy stage reading the tree of `input_pipeline`.
    pub fn copy(
        options: CopyStageOptions,
        input_pipeline: &str,
        devices: Devices,
        mounts: Vec<Mount>,
    ) -> Self {
        Self {
            stage_type: StageType::Copy,
            inputs: Some(Inputs::from([(
                ROOT_TREE_INPUT.to_string(),
                TreeInput::from_pipeline(input_pipeline),
            )])),
            options: StageOptions::Copy(options),
            devices,
            mounts,
        }
    }
}
