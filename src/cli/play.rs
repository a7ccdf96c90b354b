use crate::{driver::Stage, stage_config::StageConfig};
use anyhow::{anyhow, Context, Error as AnyError};
use log::info;
use mmd_resource::ResourceFile;
use std::path::Path;

pub fn play(
    resource: Option<impl AsRef<Path>>,
    config: Option<impl AsRef<Path>>,
) -> Result<(), AnyError> {
    let resource = resource.ok_or_else(|| anyhow!("the resource file is not specified"))?;
    let config = config.ok_or_else(|| anyhow!("the stage config is not specified"))?;

    let resource = resource.as_ref();
    let data = std::fs::read(resource).with_context(|| {
        format!("failed to read the resource file `{}`", resource.display())
    })?;
    let resource_file = ResourceFile::from_bytes(&data).with_context(|| {
        format!("failed to load the resource file `{}`", resource.display())
    })?;
    info!(
        "loaded resource file {} with {} resources.",
        resource_file.version(),
        resource_file.resources().len()
    );

    let config = StageConfig::load(config.as_ref())?;
    let mut stage = Stage::new(resource_file, &config).context("failed to build the stage")?;
    stage.run(config.duration, config.tick_rate)?;

    Ok(())
}
