use super::classify::{
    Classification, classify, classify_prospective, trim_trailing_separators,
};
use super::fast_copy::transfer;
use crate::cli::args::{CopyOptions, OverwritePolicy};
use crate::error::{CopyError, CopyResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};

/// One pending copy step, with the source type already known.
#[derive(Debug, Clone)]
struct CopyTask {
    source: PathBuf,
    destination: PathBuf,
    kind: Classification,
}

/// Copies `source` to `destination`.
///
/// A file is copied into `destination` when that is an existing directory,
/// and to `destination` itself otherwise. A directory has its contents
/// copied into `destination`, which is created when missing. The first
/// failure aborts the copy; entries copied before it stay on disk.
pub fn copy(source: &Path, destination: &Path, options: &CopyOptions) -> CopyResult<()> {
    check_arguments(source, destination)?;
    match build_pool(options) {
        Some(pool) => pool.install(|| copy_root(source, destination, options, true)),
        None => copy_root(source, destination, options, false),
    }
}

pub(crate) fn check_arguments(source: &Path, destination: &Path) -> CopyResult<()> {
    if source.as_os_str().is_empty() {
        return Err(CopyError::EmptySource);
    }
    if destination.as_os_str().is_empty() {
        return Err(CopyError::EmptyDestination);
    }
    Ok(())
}

/// Pool for sibling copies, or `None` when running sequentially.
pub(crate) fn build_pool(options: &CopyOptions) -> Option<ThreadPool> {
    let workers = options.effective_parallel();
    if workers <= 1 {
        return None;
    }
    // Workers log through the caller's dispatcher, not a global one.
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .spawn_handler(move |thread| {
            let dispatch = dispatch.clone();
            let mut builder = std::thread::Builder::new();
            if let Some(name) = thread.name() {
                builder = builder.name(name.to_owned());
            }
            if let Some(stack_size) = thread.stack_size() {
                builder = builder.stack_size(stack_size);
            }
            builder.spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || thread.run())
            })?;
            Ok(())
        })
        .build();
    match pool {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(
                "failed to start {} copy workers, copying sequentially: {}",
                workers, e
            );
            None
        }
    }
}

/// Top-level copy of one source. Must run inside the pool when `parallel`.
pub(crate) fn copy_root(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
    parallel: bool,
) -> CopyResult<()> {
    let source = trim_trailing_separators(source);
    let kind = classify(source)?;
    copy_classified(source, kind, destination, options, parallel)
}

pub(crate) fn copy_classified(
    source: &Path,
    kind: Classification,
    destination: &Path,
    options: &CopyOptions,
    parallel: bool,
) -> CopyResult<()> {
    match kind {
        Classification::Missing => Err(CopyError::NotFound {
            path: source.to_path_buf(),
        }),
        Classification::File => {
            let target = resolve_file_target(source, destination)?;
            copy_file(source, &target, options)
        }
        Classification::Directory => {
            ensure_not_nested(source, destination)?;
            copy_directory(source, destination, options, parallel)
        }
    }
}

/// Where a file copied to `destination` ends up.
fn resolve_file_target(source: &Path, destination: &Path) -> CopyResult<PathBuf> {
    match classify(destination)? {
        Classification::Directory => Ok(destination.join(file_name(source)?)),
        Classification::File => Ok(destination.to_path_buf()),
        Classification::Missing => match classify_prospective(destination) {
            Classification::File => {
                if let Some(parent) = destination.parent()
                    && !parent.as_os_str().is_empty()
                {
                    create_dir_all(parent)?;
                }
                Ok(destination.to_path_buf())
            }
            _ => {
                create_dir_all(destination)?;
                Ok(destination.join(file_name(source)?))
            }
        },
    }
}

fn copy_file(source: &Path, target: &Path, options: &CopyOptions) -> CopyResult<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() => {
            return Err(CopyError::FileOntoDirectory {
                path: source.to_path_buf(),
                target: target.to_path_buf(),
            });
        }
        Ok(target_meta) => {
            if options.overwrite == OverwritePolicy::Error {
                return Err(CopyError::AlreadyExists {
                    path: target.to_path_buf(),
                });
            }
            if is_same_file(source, target, &target_meta)? {
                return Err(CopyError::SameFile {
                    path: source.to_path_buf(),
                    target: target.to_path_buf(),
                });
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(CopyError::io(target, e)),
    }

    let file_size = fs::metadata(source)
        .map_err(|e| CopyError::io(source, e))?
        .len();
    let copied = transfer(source, target, file_size)?;
    debug!(
        "copied '{}' -> '{}' ({} bytes)",
        source.display(),
        target.display(),
        copied
    );
    Ok(())
}

fn copy_directory(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
    parallel: bool,
) -> CopyResult<()> {
    match classify(destination)? {
        Classification::File => {
            return Err(CopyError::DirectoryOntoFile {
                path: source.to_path_buf(),
                target: destination.to_path_buf(),
            });
        }
        Classification::Missing => {
            create_dir_all(destination)?;
            debug!("created directory '{}'", destination.display());
        }
        Classification::Directory => {}
    }

    let tasks = list_tasks(source, destination)?;
    if parallel {
        tasks
            .into_par_iter()
            .try_for_each(|task| run_task(task, options, parallel))
    } else {
        tasks
            .into_iter()
            .try_for_each(|task| run_task(task, options, parallel))
    }
}

fn run_task(task: CopyTask, options: &CopyOptions, parallel: bool) -> CopyResult<()> {
    let result = match task.kind {
        Classification::File => copy_file(&task.source, &task.destination, options),
        Classification::Directory => {
            copy_directory(&task.source, &task.destination, options, parallel)
        }
        Classification::Missing => Err(CopyError::NotFound {
            path: task.source.clone(),
        }),
    };
    result.map_err(|e| CopyError::child(task.source, e))
}

/// Immediate children of `source`, sorted by name, paired with their
/// destination under `destination`. Symlinks and special files are skipped.
fn list_tasks(source: &Path, destination: &Path) -> CopyResult<Vec<CopyTask>> {
    let entries = fs::read_dir(source).map_err(|e| CopyError::io(source, e))?;
    let mut tasks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CopyError::io(source, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| CopyError::io(&path, e))?;
        let kind = if file_type.is_dir() {
            Classification::Directory
        } else if file_type.is_file() {
            Classification::File
        } else {
            warn!("skipping '{}': not a regular file or directory", path.display());
            continue;
        };
        tasks.push(CopyTask {
            destination: destination.join(entry.file_name()),
            source: path,
            kind,
        });
    }
    tasks.sort_unstable_by(|a, b| a.source.cmp(&b.source));
    trace!("listed {} entries in '{}'", tasks.len(), source.display());
    Ok(tasks)
}

pub(crate) fn file_name(path: &Path) -> CopyResult<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| CopyError::NoFileName {
        path: path.to_path_buf(),
    })
}

fn create_dir_all(path: &Path) -> CopyResult<()> {
    fs::create_dir_all(path).map_err(|e| CopyError::io(path, e))
}

/// Whether `target` is the very file behind `source`, hard links included.
/// Must be answered before the target is truncated.
#[cfg(unix)]
fn is_same_file(source: &Path, _target: &Path, target_meta: &fs::Metadata) -> CopyResult<bool> {
    use std::os::unix::fs::MetadataExt;

    let source_meta = fs::metadata(source).map_err(|e| CopyError::io(source, e))?;
    Ok(source_meta.dev() == target_meta.dev() && source_meta.ino() == target_meta.ino())
}

#[cfg(not(unix))]
fn is_same_file(source: &Path, target: &Path, _target_meta: &fs::Metadata) -> CopyResult<bool> {
    let source = source.canonicalize().map_err(|e| CopyError::io(source, e))?;
    let target = target.canonicalize().map_err(|e| CopyError::io(target, e))?;
    Ok(source == target)
}

/// Rejects copying a directory into its own subtree, which would never end.
fn ensure_not_nested(source: &Path, destination: &Path) -> CopyResult<()> {
    let source_abs = source.canonicalize().map_err(|e| CopyError::io(source, e))?;
    let destination_abs = resolve_existing_prefix(destination)?;
    if destination_abs.starts_with(&source_abs) && destination_abs != source_abs {
        return Err(CopyError::DestinationInsideSource {
            path: source.to_path_buf(),
            target: destination.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonicalizes the longest existing ancestor of `path` and appends the
/// remaining, not yet created, components.
fn resolve_existing_prefix(path: &Path) -> CopyResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| CopyError::io(path, e))?
            .join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for component in missing.iter().rev() {
                    match component {
                        Component::ParentDir => {
                            resolved.pop();
                        }
                        Component::CurDir => {}
                        other => resolved.push(other.as_os_str()),
                    }
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let Some(parent) = existing.parent() else {
                    return Ok(absolute);
                };
                if let Some(last) = existing.components().next_back() {
                    missing.push(last);
                }
                existing = parent;
            }
            Err(e) => return Err(CopyError::io(existing, e)),
        }
    }
}
