//! Creation of destination directory trees with rollback.
//!
//! [`materialize`] walks a relative path one segment at a time, creating any
//! segment that does not exist yet. Every directory it creates is pushed onto
//! a [`CreationLedger`]; if a later segment cannot be created the ledger is
//! unwound in reverse and the filesystem is left as it was before the call.
//!
//! Existence is probed before creating, so a directory made by another
//! process between the probe and `create_dir` is simply treated as
//! pre-existing. The tool runs single-threaded and does not guard against
//! concurrent writers beyond that.

use crate::rule;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest relative destination path, in bytes (`PATH_MAX` on Linux).
pub const MAX_PATH_LEN: usize = 4096;
/// Most segments a destination path may have.
pub const MAX_DEPTH: usize = 256;

/// What a successful [`materialize`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialized {
    /// At least one segment was created.
    Created,
    /// Every segment was already present.
    AlreadyExisted,
}

/// Errors that can occur while materializing a directory path.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("directory path '{path}' has no segments")]
    Empty { path: String },

    #[error("directory path '{path}' is longer than {limit} bytes")]
    TooLong { path: String, limit: usize },

    #[error("directory path '{path}' has {depth} segments, limit is {limit}")]
    TooDeep {
        path: String,
        depth: usize,
        limit: usize,
    },

    #[error("{} exists and is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directories created during one [`materialize`] call.
///
/// Dropping a ledger that still holds entries removes them, most recent
/// first. [`CreationLedger::commit`] empties it once the whole path exists.
#[derive(Debug, Default)]
struct CreationLedger {
    created: Vec<PathBuf>,
}

impl CreationLedger {
    fn record(&mut self, path: PathBuf) {
        self.created.push(path);
    }

    /// Keeps everything created so far and returns how many directories that was.
    fn commit(mut self) -> usize {
        std::mem::take(&mut self.created).len()
    }

    fn rollback(&mut self) {
        while let Some(path) = self.created.pop() {
            match fs::remove_dir(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "rolled back directory"),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not roll back directory"
                ),
            }
        }
    }
}

impl Drop for CreationLedger {
    fn drop(&mut self) {
        self.rollback();
    }
}

/// Ensures that `dir`, relative to `base`, exists as a directory tree.
///
/// Segments are taken from `dir` split on `/` with empty segments skipped,
/// so `"/a/b/"` materializes `base/a/b`. The path is checked against
/// [`MAX_PATH_LEN`] and [`MAX_DEPTH`] before anything is created.
///
/// # Returns
///
/// [`Materialized::Created`] if at least one directory was made,
/// [`Materialized::AlreadyExisted`] if the whole path was already there.
///
/// # Errors
///
/// On any failure every directory created by this call is removed again
/// before the error is returned.
///
/// # Examples
///
/// ```no_run
/// use extmove::materializer::{Materialized, materialize};
/// use std::path::Path;
///
/// let outcome = materialize(Path::new("."), "media/images").unwrap();
/// assert_eq!(outcome, Materialized::Created);
/// ```
pub fn materialize(base: &Path, dir: &str) -> Result<Materialized, MaterializeError> {
    let segments: Vec<&str> = rule::segments(dir).collect();
    check_limits(dir, &segments)?;

    let mut ledger = CreationLedger::default();
    let mut current = base.to_path_buf();

    for segment in segments {
        current.push(segment);
        if ensure_dir(&current)? {
            tracing::debug!(path = %current.display(), "created directory");
            ledger.record(current.clone());
        }
    }

    if ledger.commit() > 0 {
        Ok(Materialized::Created)
    } else {
        Ok(Materialized::AlreadyExisted)
    }
}

/// Checks, without creating anything, whether [`materialize`] could build
/// `dir` under `base`.
///
/// The limits are applied as in [`materialize`] and the existing prefix of
/// the path is walked until the first missing segment. Failures that only
/// creation can reveal (permissions, a full disk) are not detected.
pub fn check(base: &Path, dir: &str) -> Result<(), MaterializeError> {
    let segments: Vec<&str> = rule::segments(dir).collect();
    check_limits(dir, &segments)?;

    let mut current = base.to_path_buf();
    for segment in segments {
        current.push(segment);
        match fs::metadata(&current) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(MaterializeError::NotADirectory {
                    path: current.clone(),
                });
            }
            Err(_) => break,
        }
    }
    Ok(())
}

fn check_limits(dir: &str, segments: &[&str]) -> Result<(), MaterializeError> {
    if segments.is_empty() {
        return Err(MaterializeError::Empty {
            path: dir.to_string(),
        });
    }
    if segments.len() > MAX_DEPTH {
        return Err(MaterializeError::TooDeep {
            path: dir.to_string(),
            depth: segments.len(),
            limit: MAX_DEPTH,
        });
    }

    // Joined length, one separator between each pair of segments.
    let joined_len = segments.iter().map(|s| s.len()).sum::<usize>() + segments.len() - 1;
    if joined_len >= MAX_PATH_LEN {
        return Err(MaterializeError::TooLong {
            path: dir.to_string(),
            limit: MAX_PATH_LEN,
        });
    }
    Ok(())
}

/// Makes sure `path` is a directory. Returns true if this call created it.
fn ensure_dir(path: &Path) -> Result<bool, MaterializeError> {
    if let Ok(metadata) = fs::metadata(path) {
        return if metadata.is_dir() {
            Ok(false)
        } else {
            Err(MaterializeError::NotADirectory {
                path: path.to_path_buf(),
            })
        };
    }

    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(false),
        Err(e) => Err(MaterializeError::CreateFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
