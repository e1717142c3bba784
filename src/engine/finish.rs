use log::debug;

use stagehand_api::{config::PartitionTable, error::StagehandError, Entity};

use crate::osbuild::{Luks2RemoveKeyStageOptions, Lvm2MetadataStageOptions, Stage};

use super::chain::stage_devices;

/// Stages run once the image content is in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishStages {
    /// Stages that still need every LUKS container to open with its
    /// passphrase.
    pub immediate: Vec<Stage>,

    /// Stages removing LUKS passphrases. A container cannot be opened by
    /// later stages once its passphrase is gone.
    pub deferred: Vec<Stage>,
}

impl FinishStages {
    /// Returns every stage in execution order.
    pub fn into_stages(self) -> Vec<Stage> {
        let mut stages = self.immediate;
        stages.extend(self.deferred);
        stages
    }
}

/// Generates the stages that finalize the LUKS containers and LVM volume
/// groups of `pt`.
///
/// Volume groups get their metadata rewritten. LUKS containers bound with a
/// clevis policy asking for it get their passphrase removed.
pub fn gen_device_finish_stages(
    pt: &PartitionTable,
    filename: &str,
) -> Result<FinishStages, StagehandError> {
    let mut finish = FinishStages::default();

    for path in pt.entities() {
        match path.entity() {
            Entity::Luks(luks) => {
                let devices = stage_devices(&path, filename)?;
                if luks.removes_passphrase() {
                    debug!("Removing passphrase of {}", path.entity().describe());
                    finish.deferred.push(Stage::luks2_remove_key(
                        Luks2RemoveKeyStageOptions {
                            passphrase: luks.passphrase.clone(),
                        },
                        devices,
                    ));
                }
            }
            Entity::VolumeGroup(vg) => {
                let devices = stage_devices(&path, filename)?;
                debug!("Writing metadata of volume group '{}'", vg.name);
                finish.immediate.push(Stage::lvm2_metadata(
                    Lvm2MetadataStageOptions {
                        vg_name: vg.name.clone(),
                    },
                    devices,
                ));
            }
            Entity::PartitionTable(_)
            | Entity::Partition(_)
            | Entity::LogicalVolume(_)
            | Entity::Filesystem(_) => {}
        }
    }

    Ok(finish)
}
