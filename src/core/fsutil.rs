// Filesystem helpers shared by the build and copy steps; every failure carries its path.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::error::{Error, ErrorKind, io_error};

/// Removes `dir` and its contents; a directory that is already gone is fine.
pub fn remove_dir_if_exists(dir: &Path) -> Result<(), Error> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_error("failed to remove directory", dir, err)),
    }
}

pub fn create_dir_all(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir).map_err(|err| io_error("failed to create directory", dir, err))
}

/// Deletes and recreates `dir` so no artifact from an earlier run survives.
pub fn reset_dir(dir: &Path) -> Result<(), Error> {
    remove_dir_if_exists(dir)?;
    create_dir_all(dir)
}

/// Copies `src` to `dst`, replacing `dst` if it exists.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), Error> {
    tracing::debug!(from = %src.display(), to = %dst.display(), "copy");
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|err| io_error(format!("failed to copy to {}", dst.display()), src, err))
}

/// Copies `src` into directory `dst_dir`, keeping the file name.
pub fn copy_into(src: &Path, dst_dir: &Path) -> Result<PathBuf, Error> {
    let name = src.file_name().ok_or_else(|| {
        Error::new(ErrorKind::Internal)
            .with_message("copy source has no file name")
            .with_path(src)
    })?;
    let dst = dst_dir.join(name);
    copy_file(src, &dst)?;
    Ok(dst)
}

/// Recursively copies the tree at `src` to `dst`; `dst` must not exist yet.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, Error> {
    if !src.is_dir() {
        return Err(Error::new(ErrorKind::NotFound)
            .with_message("source directory not found")
            .with_path(src));
    }
    if dst.exists() {
        return Err(Error::new(ErrorKind::Io)
            .with_message("copy destination already exists")
            .with_path(dst));
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| src.into());
            Error::new(ErrorKind::Io)
                .with_message("failed to walk directory")
                .with_path(path)
                .with_source(err)
        })?;
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            Error::new(ErrorKind::Internal)
                .with_message("walked entry escaped its root")
                .with_path(entry.path())
        })?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|err| {
                io_error(
                    format!("failed to copy to {}", target.display()),
                    entry.path(),
                    err,
                )
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Files in `dir` whose names start with `stem.`; a missing directory yields nothing.
pub fn files_with_stem(dir: &Path, stem: &str) -> Result<Vec<PathBuf>, Error> {
    let pattern = format!(
        "{}/{}.*",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(stem)
    );
    let entries = glob::glob(&pattern).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("invalid glob pattern: {pattern}"))
            .with_source(err)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            io_error("failed to read glob match", path, err.into_error())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
