use std::path::Path;

use log::info;

use stagehand_api::{
    config::BuildConfiguration,
    error::{StagehandError, StagehandResultExt},
};

use crate::engine;

/// Loads the build configuration at `path` and checks that stages can be
/// generated from it.
pub fn validate_build_config_file(path: impl AsRef<Path>) -> Result<(), StagehandError> {
    let path = path.as_ref();
    info!("Validating build configuration file: {}", path.display());

    let config = BuildConfiguration::from_file(path)?;
    let manifest = engine::gen_image_stages(&config)
        .message(format!("Invalid build configuration: {}", path.display()))?;

    info!(
        "Build configuration is valid, {} stage(s) would be generated",
        manifest.stages.len()
    );
    Ok(())
}
