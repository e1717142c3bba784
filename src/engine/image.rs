use log::info;
use serde::Serialize;

use stagehand_api::{
    config::BuildConfiguration,
    error::{InternalError, ReportError, StagehandError, StagehandResultExt},
};

use crate::osbuild::{CopyStageOptions, Stage};

use super::{
    creation::gen_device_creation_stages, finish::gen_device_finish_stages,
    mounts::gen_mounts_devices,
};

/// The stages writing a tree into a disk image, in execution order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub stages: Vec<Stage>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String, StagehandError> {
        serde_json::to_string_pretty(self).structured(InternalError::SerializeManifest)
    }

    pub fn to_yaml(&self) -> Result<String, StagehandError> {
        serde_yaml::to_string(self).structured(InternalError::SerializeManifest)
    }
}

/// Generates every stage needed to lay out the image described by `config`
/// and copy the input tree into it.
///
/// LUKS containers and volume groups are created first. The tree is then
/// copied with every filesystem mounted, and the devices are finalized last.
pub fn gen_image_stages(config: &BuildConfiguration) -> Result<Manifest, StagehandError> {
    let pt = &config.partition_table;
    let filename = config.filename.as_str();

    info!("Generating device creation stages for '{filename}'");
    let mut stages = gen_device_creation_stages(pt, filename)
        .message("Failed to generate device creation stages")?;

    info!("Resolving mounts");
    let resolved = gen_mounts_devices(pt, filename).message("Failed to resolve mounts")?;
    stages.push(Stage::copy(
        CopyStageOptions::root_tree(&resolved.root_name),
        &config.input_pipeline,
        resolved.devices,
        resolved.mounts,
    ));

    info!("Generating device finish stages");
    let finish = gen_device_finish_stages(pt, filename)
        .message("Failed to generate device finish stages")?;
    stages.extend(finish.into_stages());

    info!("Generated {} stage(s)", stages.len());
    Ok(Manifest { stages })
}
