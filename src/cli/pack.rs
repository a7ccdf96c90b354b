use anyhow::{anyhow, Context, Error as AnyError};
use log::{debug, error, info, warn};
use mmd_resource::{Resource, ResourceFile, ResourceFileVersion};
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

pub fn pack(
    input: Option<impl AsRef<Path>>,
    output: Option<impl AsRef<Path>>,
) -> Result<(), AnyError> {
    let input = resolve_input(input)?;
    let output = resolve_output(output)?;
    info!(
        "packing resources from `{}` into `{}`.",
        input.display(),
        output.display()
    );

    let resources = collect_resources(&input)?;
    info!("collected {} resources.", resources.len());

    let data = ResourceFile::new(ResourceFileVersion::V1, resources)
        .to_bytes()
        .context("failed to encode the resource file")?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }

    std::fs::write(&output, &data)
        .with_context(|| format!("failed to write `{}`", output.display()))?;
    info!("wrote {} bytes.", data.len());

    Ok(())
}

fn resolve_input(input: Option<impl AsRef<Path>>) -> Result<PathBuf, AnyError> {
    let input = match input {
        Some(input) => input.as_ref().to_owned(),
        None => return Ok(std::env::current_dir()?),
    };

    if !input.exists() {
        return Err(anyhow!("no such directory `{}`", input.display()));
    }

    let input = input
        .canonicalize()
        .with_context(|| format!("failed to resolve `{}`", input.display()))?;

    if !input.is_dir() {
        return Err(anyhow!("`{}` is not a directory", input.display()));
    }

    Ok(input)
}

fn resolve_output(output: Option<impl AsRef<Path>>) -> Result<PathBuf, AnyError> {
    let output = match output {
        Some(output) => output.as_ref().to_owned(),
        None => {
            let output = std::env::current_dir()?.join("stage.res");
            warn!("no output given; writing to `{}`.", output.display());
            output
        }
    };

    if output.exists() {
        warn!("`{}` will be replaced.", output.display());
    }

    Ok(output)
}

/// Reads every `.json` resource description under `input`, breadth first.
///
/// Files that fail to parse are logged and skipped.
pub fn collect_resources(input: &Path) -> Result<Vec<Resource>, AnyError> {
    let mut queue = VecDeque::from([input.to_owned()]);
    let mut resources = Vec::new();

    while let Some(dir) = queue.pop_front() {
        let mut paths = dir
            .read_dir()
            .with_context(|| format!("failed to list `{}`", dir.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()?;
        paths.sort();

        for path in paths {
            if path.is_dir() {
                queue.push_back(path);
                continue;
            }

            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                debug!("skipping `{}`.", path.display());
                continue;
            }

            match read_resource(&path) {
                Ok(resource) => {
                    debug!("`{}` provides resource `{}`.", path.display(), resource.name);
                    resources.push(resource);
                }
                Err(err) => {
                    let causes: Vec<String> =
                        err.chain().map(|cause| format!("- {}", cause)).collect();
                    error!("skipping `{}`:\n{}", path.display(), causes.join("\n"));
                }
            }
        }
    }

    Ok(resources)
}

fn read_resource(file: &Path) -> Result<Resource, AnyError> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read the file `{}`", file.display()))?;
    let resource = serde_json::from_str(&content).with_context(|| {
        format!(
            "failed to parse the file `{}` as a resource description",
            file.display()
        )
    })?;

    Ok(resource)
}
