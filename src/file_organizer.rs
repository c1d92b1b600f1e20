/// Moving matched files into their rule's destination directory.
///
/// This module provides the per-file move (materialize the destination,
/// refuse to overwrite, rename) and the batch driver that runs every rule
/// over the working directory. A failure on one file is reported and the
/// batch carries on; only resource exhaustion aborts the run.
use crate::config::CompiledFilters;
use crate::materializer::{self, MaterializeError, Materialized};
use crate::report::{Diagnostics, FileOutcome, RunReport, Status};
use crate::rule::RuleSet;
use crate::scanner::{self, MatchedFile};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents a single completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moved {
    /// The original path of the file.
    pub source: PathBuf,
    /// Where the file is now.
    pub destination: PathBuf,
    /// Whether the destination directory had to be created.
    pub directory: Materialized,
}

/// Errors that can occur while moving one file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The destination directory could not be materialized. The source file is untouched.
    #[error("destination '{directory}' is unavailable: {source}")]
    DestinationUnavailable {
        directory: String,
        #[source]
        source: MaterializeError,
    },

    /// Something already exists at the destination path. Nothing was moved.
    #[error("{} already exists", .destination.display())]
    DestinationConflict { destination: PathBuf },

    /// The rename failed. The source file is left in place.
    #[error("failed to move {} to {}: {source}", .file.display(), .destination.display())]
    MoveFailed {
        file: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The system ran out of memory during the move. Fatal for the run.
    #[error("out of resources while moving {}: {source}", .file.display())]
    ResourceExhausted {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MoveError {
    /// The report status for this error. `None` for fatal errors.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::DestinationUnavailable { .. } => Some(Status::DestinationUnavailable),
            Self::DestinationConflict { .. } => Some(Status::DestinationConflict),
            Self::MoveFailed { .. } => Some(Status::MoveFailed),
            Self::ResourceExhausted { .. } => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}

/// Result type for single-file moves.
pub type MoveResult<T> = Result<T, MoveError>;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read directory {}: {source}", .path.display())]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    ResourceExhausted(MoveError),
}

/// Moves files into the directories named by their rules.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves one matched file from `base` into its rule's directory.
    ///
    /// Steps:
    /// 1. Materialize the rule's directory under `base`
    /// 2. Build the destination `base/<directory>/<file name>`
    /// 3. Refuse if anything already exists there (the directory created in
    ///    step 1 is kept)
    /// 4. Rename the file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extmove::file_organizer::FileOrganizer;
    /// use extmove::rule::Rule;
    /// use extmove::scanner::MatchedFile;
    /// use std::path::Path;
    ///
    /// let file = MatchedFile {
    ///     name: "photo.jpg".to_string(),
    ///     rule: Rule::new("jpg", "images").unwrap(),
    /// };
    /// match FileOrganizer::move_file(Path::new("."), &file) {
    ///     Ok(moved) => println!("Moved to {}", moved.destination.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn move_file(base: &Path, file: &MatchedFile) -> MoveResult<Moved> {
        let directory = materializer::materialize(base, file.rule.directory()).map_err(|e| {
            MoveError::DestinationUnavailable {
                directory: file.rule.directory().to_string(),
                source: e,
            }
        })?;

        let source = base.join(&file.name);
        let destination = Self::destination_path(base, file);
        Self::check_conflict(&destination)?;

        fs::rename(&source, &destination).map_err(|e| {
            if e.kind() == io::ErrorKind::OutOfMemory {
                MoveError::ResourceExhausted {
                    file: source.clone(),
                    source: e,
                }
            } else {
                MoveError::MoveFailed {
                    file: source.clone(),
                    destination: destination.clone(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "moved file"
        );

        Ok(Moved {
            source,
            destination,
            directory,
        })
    }

    /// Checks what [`FileOrganizer::move_file`] would do without touching the
    /// filesystem. Detects an unusable destination directory and destination
    /// conflicts.
    pub fn plan_move(base: &Path, file: &MatchedFile) -> MoveResult<PathBuf> {
        materializer::check(base, file.rule.directory()).map_err(|e| {
            MoveError::DestinationUnavailable {
                directory: file.rule.directory().to_string(),
                source: e,
            }
        })?;

        let destination = Self::destination_path(base, file);
        Self::check_conflict(&destination)?;
        Ok(destination)
    }

    /// Runs every rule in order over the files directly inside `base`.
    ///
    /// Each rule scans the directory afresh, so files moved by an earlier rule
    /// are not seen by later ones. Per-file failures are recorded in the
    /// report and passed to `sink`; the batch continues.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] if `base` cannot be read or a move runs out of
    /// resources. Work done before that point is not undone.
    pub fn run(
        base: &Path,
        rules: &RuleSet,
        filters: &CompiledFilters,
        dry_run: bool,
        sink: &mut dyn Diagnostics,
    ) -> Result<RunReport, RunError> {
        let mut report = RunReport::new(dry_run);
        // Names a dry run already planned; later rules must not see them again.
        let mut planned: HashSet<String> = HashSet::new();

        for rule in rules {
            let mut files =
                scanner::scan(base, rule, filters).map_err(|source| RunError::ScanFailed {
                    path: base.to_path_buf(),
                    source,
                })?;
            files.retain(|file| !planned.contains(&file.name));

            if files.is_empty() {
                sink.no_matches(rule);
                report.unmatched.push(rule.clone());
                continue;
            }

            sink.rule_started(rule, files.len());
            for file in &files {
                let outcome = Self::process(base, file, dry_run)?;
                if dry_run && outcome.status == Status::WouldMove {
                    planned.insert(file.name.clone());
                }
                sink.outcome(&outcome);
                report.outcomes.push(outcome);
            }
            sink.rule_finished(rule);
        }

        Ok(report)
    }

    fn process(base: &Path, file: &MatchedFile, dry_run: bool) -> Result<FileOutcome, RunError> {
        let result = if dry_run {
            Self::plan_move(base, file).map(|_| Status::WouldMove)
        } else {
            Self::move_file(base, file).map(|_| Status::Moved)
        };

        let (status, message) = match result {
            Ok(status) => (status, None),
            Err(e) => match e.status() {
                Some(status) => (status, Some(e.to_string())),
                None => return Err(RunError::ResourceExhausted(e)),
            },
        };

        Ok(FileOutcome {
            file: file.name.clone(),
            rule: file.rule.clone(),
            destination: file
                .rule
                .relative_dir()
                .join(&file.name)
                .display()
                .to_string(),
            status,
            message,
        })
    }

    fn destination_path(base: &Path, file: &MatchedFile) -> PathBuf {
        base.join(file.rule.relative_dir()).join(&file.name)
    }

    fn check_conflict(destination: &Path) -> MoveResult<()> {
        // symlink_metadata so that a dangling symlink still counts as taken
        if fs::symlink_metadata(destination).is_ok() {
            return Err(MoveError::DestinationConflict {
                destination: destination.to_path_buf(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullDiagnostics;
    use crate::rule::Rule;
    use tempfile::TempDir;

    fn matched(name: &str, ext: &str, dir: &str) -> MatchedFile {
        MatchedFile {
            name: name.to_string(),
            rule: Rule::new(ext, dir).unwrap(),
        }
    }

    #[test]
    fn test_move_file_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("test.txt"), "test content").expect("Failed to write test file");

        let moved = FileOrganizer::move_file(base, &matched("test.txt", "txt", "docs/text"))
            .expect("Failed to move file");

        assert_eq!(moved.directory, Materialized::Created);
        assert_eq!(moved.destination, base.join("docs/text/test.txt"));
        assert!(!base.join("test.txt").exists());
        assert_eq!(
            fs::read_to_string(base.join("docs/text/test.txt")).unwrap(),
            "test content"
        );
    }

    #[test]
    fn test_move_file_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("images")).expect("Failed to create directory");
        fs::write(base.join("test.png"), "png").expect("Failed to write test file");

        let moved = FileOrganizer::move_file(base, &matched("test.png", "png", "/images/"))
            .expect("Failed to move file");

        assert_eq!(moved.directory, Materialized::AlreadyExisted);
        assert!(base.join("images/test.png").exists());
    }

    #[test]
    fn test_move_file_conflict_leaves_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("docs")).expect("Failed to create directory");
        fs::write(base.join("docs/a.txt"), "old").expect("Failed to write file");
        fs::write(base.join("a.txt"), "new").expect("Failed to write file");

        let result = FileOrganizer::move_file(base, &matched("a.txt", "txt", "docs"));

        assert!(matches!(
            result,
            Err(MoveError::DestinationConflict { .. })
        ));
        assert_eq!(fs::read_to_string(base.join("a.txt")).unwrap(), "new");
        assert_eq!(fs::read_to_string(base.join("docs/a.txt")).unwrap(), "old");
    }

    #[test]
    fn test_directory_at_destination_is_conflict() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "x").expect("Failed to write file");
        fs::create_dir(base.join("docs")).expect("Failed to create directory");
        fs::create_dir(base.join("docs/a.txt")).expect("Failed to create directory");

        let result = FileOrganizer::move_file(base, &matched("a.txt", "txt", "docs"));

        assert!(matches!(result, Err(MoveError::DestinationConflict { .. })));
        assert!(base.join("a.txt").is_file());
    }

    #[test]
    fn test_unavailable_destination_leaves_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "x").expect("Failed to write file");
        fs::write(base.join("blocked"), "file").expect("Failed to write file");

        let result = FileOrganizer::move_file(base, &matched("a.txt", "txt", "blocked/docs"));

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(Status::DestinationUnavailable));
        assert!(!err.is_fatal());
        assert!(base.join("a.txt").is_file());
    }

    #[test]
    fn test_missing_source_is_move_failed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let result = FileOrganizer::move_file(base, &matched("gone.txt", "txt", "docs"));

        assert!(matches!(result, Err(MoveError::MoveFailed { .. })));
        // The directory was materialized before the rename failed and is kept.
        assert!(base.join("docs").is_dir());
    }

    #[test]
    fn test_plan_move_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "x").expect("Failed to write file");

        let destination = FileOrganizer::plan_move(base, &matched("a.txt", "txt", "docs"))
            .expect("Failed to plan move");

        assert_eq!(destination, base.join("docs/a.txt"));
        assert!(!base.join("docs").exists());
        assert!(base.join("a.txt").exists());
    }

    #[test]
    fn test_run_continues_after_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(base.join(name), name).expect("Failed to write file");
        }
        fs::create_dir(base.join("docs")).expect("Failed to create directory");
        fs::write(base.join("docs/b.txt"), "taken").expect("Failed to write file");

        let rules = RuleSet::single(Rule::new("txt", "docs").unwrap());
        let report = FileOrganizer::run(
            base,
            &rules,
            &CompiledFilters::default(),
            false,
            &mut NullDiagnostics,
        )
        .expect("Run failed");

        let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            [Status::Moved, Status::DestinationConflict, Status::Moved]
        );
        assert!(report.is_success());
        assert!(base.join("docs/a.txt").exists());
        assert!(base.join("docs/c.txt").exists());
        assert!(base.join("b.txt").exists());
    }

    #[test]
    fn test_run_records_unmatched_rules() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let rules = RuleSet::single(Rule::new("jpg", "images").unwrap());

        let report = FileOrganizer::run(
            temp_dir.path(),
            &rules,
            &CompiledFilters::default(),
            false,
            &mut NullDiagnostics,
        )
        .expect("Run failed");

        assert!(report.outcomes.is_empty());
        assert_eq!(report.unmatched.len(), 1);
        assert!(report.is_success());
        assert!(!temp_dir.path().join("images").exists());
    }

    #[test]
    fn test_run_missing_base_is_fatal() {
        let rules = RuleSet::single(Rule::new("jpg", "images").unwrap());
        let result = FileOrganizer::run(
            Path::new("/non/existent/path"),
            &rules,
            &CompiledFilters::default(),
            false,
            &mut NullDiagnostics,
        );
        assert!(matches!(result, Err(RunError::ScanFailed { .. })));
    }
}
