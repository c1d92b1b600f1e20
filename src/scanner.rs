//! Listing of the working directory by extension.

use crate::config::CompiledFilters;
use crate::rule::Rule;
use std::fs;
use std::io;
use std::path::Path;

/// A file in the working directory paired with the rule it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// Bare file name, relative to the working directory.
    pub name: String,
    /// Owned copy of the matching rule.
    pub rule: Rule,
}

/// Returns the extension of a file name: the text after the last `.`.
///
/// Names ending in `.`, names without a `.`, and names whose only `.` is the
/// leading one (such as `.bashrc`) have no extension.
///
/// ```
/// use extmove::scanner::file_extension;
///
/// assert_eq!(file_extension("photo.tar.gz"), Some("gz"));
/// assert_eq!(file_extension(".bashrc"), None);
/// assert_eq!(file_extension("notes."), None);
/// ```
pub fn file_extension(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => Some(&name[dot + 1..]),
        _ => None,
    }
}

/// Lists regular files directly inside `base` whose extension equals the
/// rule's extension (case-sensitive) and which pass `filters`.
///
/// Symlinks are followed, so a link to a regular file counts as one. The
/// result is sorted by name and is empty, not an error, when nothing matches.
///
/// # Errors
///
/// Returns an error only if `base` itself cannot be read.
pub fn scan(base: &Path, rule: &Rule, filters: &CompiledFilters) -> io::Result<Vec<MatchedFile>> {
    let mut matched = Vec::new();

    for entry in fs::read_dir(base)?.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!(name = ?entry.file_name(), "skipping non UTF-8 file name");
            continue;
        };

        if file_extension(&name) != Some(rule.extension()) {
            continue;
        }

        let is_file = fs::metadata(entry.path()).is_ok_and(|m| m.is_file());
        if is_file && filters.should_include(&name) {
            matched.push(MatchedFile {
                name,
                rule: rule.clone(),
            });
        }
    }

    matched.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(rule = %rule, count = matched.len(), "scanned directory");
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(files: &[MatchedFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.txt"), Some("txt"));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(file_extension(".hidden.txt"), Some("txt"));
        assert_eq!(file_extension(".txt"), None);
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
        assert_eq!(file_extension(""), None);
    }

    #[test]
    fn test_scan_matches_extension_case_sensitively() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        for name in ["b.txt", "a.txt", "c.TXT", "d.md", "txt", ".txt"] {
            fs::write(base.join(name), "x").expect("Failed to write file");
        }

        let rule = Rule::new("txt", "docs").unwrap();
        let files = scan(base, &rule, &CompiledFilters::default()).expect("Failed to scan");

        assert_eq!(names(&files), ["a.txt", "b.txt"]);
        assert!(files.iter().all(|f| f.rule == rule));
    }

    #[test]
    fn test_scan_skips_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("folder.txt")).expect("Failed to create directory");
        fs::write(base.join("file.txt"), "x").expect("Failed to write file");

        let rule = Rule::new("txt", "docs").unwrap();
        let files = scan(base, &rule, &CompiledFilters::default()).expect("Failed to scan");

        assert_eq!(names(&files), ["file.txt"]);
    }

    #[test]
    fn test_scan_no_matches_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let rule = Rule::new("jpg", "images").unwrap();

        let files =
            scan(temp_dir.path(), &rule, &CompiledFilters::default()).expect("Failed to scan");

        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let rule = Rule::new("jpg", "images").unwrap();
        let result = scan(
            Path::new("/non/existent/path"),
            &rule,
            &CompiledFilters::default(),
        );
        assert!(result.is_err());
    }
}
