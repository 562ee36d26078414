use crate::error::{CopyError, CopyResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Copies the bytes of regular file `source` into `destination`, creating or
/// truncating it. Returns the number of bytes written.
pub fn transfer(source: &Path, destination: &Path, file_size: u64) -> CopyResult<u64> {
    #[cfg(target_os = "linux")]
    match fast_copy(source, destination, file_size)? {
        Some(copied) => return Ok(copied),
        None => {
            tracing::trace!(
                "copy_file_range unavailable for '{}', using buffered copy",
                source.display()
            );
        }
    }
    buffered_copy(source, destination, file_size)
}

/// In-kernel copy. `Ok(None)` means the filesystem refused the syscall and
/// the caller should fall back; the destination is truncated again there.
#[cfg(target_os = "linux")]
fn fast_copy(source: &Path, destination: &Path, file_size: u64) -> CopyResult<Option<u64>> {
    use nix::fcntl::copy_file_range;

    let src_file = File::open(source).map_err(|e| CopyError::io(source, e))?;
    let dest_file = File::create(destination).map_err(|e| CopyError::io(destination, e))?;

    let chunk_size = chunk_size_for(file_size);
    let mut total_copied = 0u64;
    loop {
        let remaining = file_size.saturating_sub(total_copied);
        let to_copy = usize::try_from(remaining).map_or(chunk_size, |r| r.min(chunk_size));
        if to_copy == 0 {
            break;
        }
        match copy_file_range(&src_file, None, &dest_file, None, to_copy) {
            Ok(0) => break,
            Ok(copied) => total_copied += copied as u64,
            Err(_) => return Ok(None),
        }
    }
    Ok(Some(total_copied))
}

/// Bytes per `copy_file_range` call: about 128 calls per file, at least 4 MiB.
#[cfg(target_os = "linux")]
fn chunk_size_for(file_size: u64) -> usize {
    const TARGET_CHUNKS: u64 = 128;
    const MIN_CHUNK: usize = 4 * 1024 * 1024;
    std::cmp::max(
        MIN_CHUNK,
        usize::try_from(file_size / TARGET_CHUNKS).unwrap_or(usize::MAX),
    )
}

fn buffered_copy(source: &Path, destination: &Path, file_size: u64) -> CopyResult<u64> {
    let src_file = File::open(source).map_err(|e| CopyError::io(source, e))?;
    let dest_file = File::create(destination).map_err(|e| CopyError::io(destination, e))?;

    let buffer_size = buffer_size_for(file_size);
    let mut reader = BufReader::with_capacity(buffer_size, src_file);
    let mut writer = BufWriter::with_capacity(buffer_size, dest_file);
    let mut buffer = vec![0u8; buffer_size];
    let mut total_copied = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| CopyError::io(source, e))?;
        if bytes_read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| CopyError::io(destination, e))?;
        total_copied += bytes_read as u64;
    }
    writer.flush().map_err(|e| CopyError::io(destination, e))?;
    Ok(total_copied)
}

fn buffer_size_for(file_size: u64) -> usize {
    if file_size < 1024 * 1024 {
        64 * 1024
    } else if file_size < 8 * 1024 * 1024 {
        256 * 1024
    } else if file_size < 64 * 1024 * 1024 {
        512 * 1024
    } else if file_size < 512 * 1024 * 1024 {
        1024 * 1024
    } else {
        2 * 1024 * 1024
    }
}
