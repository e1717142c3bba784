use log::debug;

use stagehand_api::{config::PartitionTable, error::StagehandError, Entity};

use crate::osbuild::{ClevisLuksBindStageOptions, Lvm2CreateStageOptions, Stage};

use super::chain::stage_devices;

/// Generates the stages that create the LUKS containers and LVM volume
/// groups of `pt`, in tree order.
///
/// A LUKS container with a clevis policy is bound right after it has been
/// formatted.
pub fn gen_device_creation_stages(
    pt: &PartitionTable,
    filename: &str,
) -> Result<Vec<Stage>, StagehandError> {
    let mut stages = Vec::new();

    for path in pt.entities() {
        match path.entity() {
            Entity::Luks(luks) => {
                let devices = stage_devices(&path, filename)?;
                debug!("Formatting {}", path.entity().describe());
                stages.push(Stage::luks2_format(luks.into(), devices.clone()));

                if let Some(clevis) = &luks.clevis {
                    debug!("Binding LUKS container with clevis pin '{}'", clevis.pin);
                    stages.push(Stage::clevis_luks_bind(
                        ClevisLuksBindStageOptions::new(&luks.passphrase, clevis),
                        devices,
                    ));
                }
            }
            Entity::VolumeGroup(vg) => {
                let devices = stage_devices(&path, filename)?;
                debug!(
                    "Creating volume group '{}' with {} logical volume(s)",
                    vg.name,
                    vg.logical_volumes.len()
                );
                stages.push(Stage::lvm2_create(Lvm2CreateStageOptions::from(vg), devices));
            }
            Entity::PartitionTable(_)
            | Entity::Partition(_)
            | Entity::LogicalVolume(_)
            | Entity::Filesystem(_) => {}
        }
    }

    Ok(stages)
}
