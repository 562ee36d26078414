use super::classify::{Classification, classify, trim_trailing_separators};
use super::copy::{build_pool, check_arguments, copy_classified, file_name};
use crate::cli::args::{BatchPolicy, CopyOptions};
use crate::error::{CopyError, CopyResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Copies every source into the directory `destination`.
///
/// Files land as `destination/<name>`, directories as `destination/<name>/`.
/// Arguments are all checked before anything is copied. After a failing
/// source the batch either stops or carries on, depending on
/// [`CopyOptions::on_error`].
pub fn copy_all(sources: &[PathBuf], destination: &Path, options: &CopyOptions) -> CopyResult<()> {
    if destination.as_os_str().is_empty() {
        return Err(CopyError::EmptyDestination);
    }
    for source in sources {
        check_arguments(source, destination)?;
    }

    match classify(destination)? {
        Classification::File => {
            return Err(CopyError::BatchTargetNotDirectory {
                path: destination.to_path_buf(),
            });
        }
        Classification::Missing => {
            fs::create_dir_all(destination).map_err(|e| CopyError::io(destination, e))?;
            debug!("created directory '{}'", destination.display());
        }
        Classification::Directory => {}
    }

    match build_pool(options) {
        Some(pool) => pool.install(|| copy_each(sources, destination, options, true)),
        None => copy_each(sources, destination, options, false),
    }
}

fn copy_each(
    sources: &[PathBuf],
    destination: &Path,
    options: &CopyOptions,
    parallel: bool,
) -> CopyResult<()> {
    let mut errors = Vec::new();
    for source in sources {
        let Err(e) = copy_into(source, destination, options, parallel) else {
            continue;
        };
        match options.on_error {
            BatchPolicy::FailFast => return Err(e),
            BatchPolicy::ContinueOnError => {
                warn!("{}", e);
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CopyError::Batch(errors))
    }
}

fn copy_into(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
    parallel: bool,
) -> CopyResult<()> {
    let source = trim_trailing_separators(source);
    let kind = classify(source)?;
    let target = match kind {
        Classification::Directory => destination.join(file_name(source)?),
        _ => destination.to_path_buf(),
    };
    copy_classified(source, kind, &target, options, parallel)
}
