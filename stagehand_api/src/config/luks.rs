use serde::{Deserialize, Serialize};

use super::{is_default, Payload};

/// A LUKS2 container wrapping a single payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LuksContainer {
    /// UUID of the container. The first characters of it name the device the
    /// container's parent is opened as, so it must be unique across the
    /// tree in its first four characters.
    ///
    /// When left empty a random UUID is assigned on load.
    #[serde(default)]
    pub uuid: String,

    pub passphrase: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cipher: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subsystem: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_size: Option<u64>,

    /// Parameters for the Argon2id key derivation.
    #[serde(default, skip_serializing_if = "is_default")]
    pub pbkdf: Argon2id,

    /// Optional Clevis policy to bind the container to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clevis: Option<ClevisBind>,

    pub payload: Box<Payload>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Argon2id {
    pub iterations: u32,
    pub memory: u32,
    pub parallelism: u32,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClevisBind {
    /// Clevis pin, e.g. `tpm2` or `tang`.
    pub pin: String,

    /// JSON policy document handed to the pin.
    pub policy: String,

    /// Remove the build-time passphrase once the image is complete, leaving
    /// the Clevis binding as the only way to unlock the container.
    #[serde(default, skip_serializing_if = "is_default")]
    pub remove_passphrase: bool,
}

impl LuksContainer {
    /// Returns whether the passphrase should be removed at the end of the
    /// build.
    pub fn removes_passphrase(&self) -> bool {
        self.clevis
            .as_ref()
            .is_some_and(|clevis| clevis.remove_passphrase)
    }
}
