use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    constants::DEFAULT_INPUT_PIPELINE,
    error::{InvalidInputError, ReportError, StagehandError},
};

use super::PartitionTable;

fn default_input_pipeline() -> String {
    DEFAULT_INPUT_PIPELINE.into()
}

/// Everything needed to generate the device stages of one disk image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfiguration {
    /// Name of the image file the loopback devices are backed by.
    pub filename: String,

    /// Name of the pipeline whose tree is copied into the image.
    #[serde(default = "default_input_pipeline")]
    pub input_pipeline: String,

    /// Storage layout of the image.
    pub partition_table: PartitionTable,
}

impl BuildConfiguration {
    /// Loads the build configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StagehandError> {
        let path = path.as_ref();
        debug!("Loading build configuration from '{}'", path.display());
        let contents = std::fs::read_to_string(path).structured(
            InvalidInputError::LoadBuildConfiguration {
                path: path.to_string_lossy().to_string(),
            },
        )?;
        Self::from_yaml(&contents)
    }

    /// Parses a build configuration from a YAML document.
    ///
    /// LUKS containers without a UUID are assigned a random one.
    pub fn from_yaml(contents: &str) -> Result<Self, StagehandError> {
        let mut config: Self = serde_yaml::from_str(contents)
            .structured(InvalidInputError::ParseBuildConfiguration)?;
        config.ensure_luks_uuids();
        Ok(config)
    }

    fn ensure_luks_uuids(&mut self) {
        self.partition_table.for_each_luks_mut(|luks| {
            if luks.uuid.is_empty() {
                luks.uuid = Uuid::new_v4().to_string();
                debug!("Assigned UUID '{}' to LUKS container", luks.uuid);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::{
        config::{Payload, PartitionTableType},
        error::ErrorKind,
    };

    use super::*;

    const SAMPLE: &str = indoc! {r#"
        filename: disk.img
        partitionTable:
          uuid: D209C89E-EA5E-4FBD-B161-B461CCE297E0
          type: gpt
          partitions:
            - start: 1048576
              size: 1048576
              type: 21686148-6449-6E6F-744E-656564454649
              bootable: true
            - start: 2097152
              size: 209715200
              payload:
                type: filesystem
                fsType: vfat
                mountpoint: /boot/efi
                fstabOptions: umask=0077,shortname=winnt
                fstabPassNo: 2
            - start: 211812352
              size: 4294967296
              payload:
                type: luks
                passphrase: password
                label: crypt_root
                cipher: aes-xts-plain64
                pbkdf:
                  iterations: 4
                  memory: 32
                  parallelism: 1
                clevis:
                  pin: tpm2
                  policy: "{}"
                  removePassphrase: true
                payload:
                  type: lvm
                  name: rootvg
                  logicalVolumes:
                    - name: rootlv
                      size: 2147483648
                      payload:
                        type: filesystem
                        fsType: xfs
                        mountpoint: /
    "#};

    #[test]
    fn test_from_yaml() {
        let config = BuildConfiguration::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.filename, "disk.img");
        assert_eq!(config.input_pipeline, DEFAULT_INPUT_PIPELINE);

        let pt = &config.partition_table;
        assert_eq!(pt.pt_type, PartitionTableType::Gpt);
        assert_eq!(pt.partitions.len(), 3);
        assert!(pt.partitions[0].bootable);
        assert!(pt.partitions[0].payload.is_none());

        let Some(Payload::Filesystem(esp)) = &pt.partitions[1].payload else {
            panic!("expected a filesystem payload");
        };
        assert_eq!(esp.fs_type, "vfat");
        assert_eq!(esp.mountpoint, "/boot/efi");
        assert_eq!(esp.fstab_pass_no, 2);

        let Some(Payload::Luks(luks)) = &pt.partitions[2].payload else {
            panic!("expected a LUKS payload");
        };
        assert!(luks.removes_passphrase());
        assert_eq!(luks.pbkdf.memory, 32);
        // A missing UUID gets generated.
        Uuid::parse_str(&luks.uuid).unwrap();

        let Payload::Lvm(vg) = luks.payload.as_ref() else {
            panic!("expected a volume group payload");
        };
        assert_eq!(vg.name, "rootvg");
        assert_eq!(vg.logical_volumes[0].size, 2147483648);
    }

    #[test]
    fn test_existing_luks_uuid_kept() {
        let yaml = SAMPLE.replace(
            "passphrase: password",
            "passphrase: password\n        uuid: fc9b5a7b-3f10-4e0c-9b8e-21f11d7c1e3a",
        );
        let config = BuildConfiguration::from_yaml(&yaml).unwrap();
        let Some(Payload::Luks(luks)) = &config.partition_table.partitions[2].payload else {
            panic!("expected a LUKS payload");
        };
        assert_eq!(luks.uuid, "fc9b5a7b-3f10-4e0c-9b8e-21f11d7c1e3a");
    }

    #[test]
    fn test_from_yaml_unknown_field() {
        let yaml = SAMPLE.replace("filename: disk.img", "filename: disk.img\nsize: 10");
        let err = BuildConfiguration::from_yaml(&yaml).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidInput(InvalidInputError::ParseBuildConfiguration)
        );
    }

    #[test]
    fn test_from_file_missing() {
        let err = BuildConfiguration::from_file("/non-existent/build.yaml").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidInput(InvalidInputError::LoadBuildConfiguration {
                path: "/non-existent/build.yaml".into()
            })
        );
    }
}
