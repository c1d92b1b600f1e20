//! Extension-to-directory rules and the validators that guard them.
//!
//! A [`Rule`] can only be built from an extension and a directory that both
//! pass validation, so every rule that reaches the filesystem code is known
//! to be well formed.
//!
//! # Examples
//!
//! ```
//! use extmove::rule::{Rule, validate_directory, validate_extension};
//!
//! assert!(validate_extension("jpg"));
//! assert!(!validate_extension(".jpg"));
//! assert!(validate_directory("media/images/"));
//! assert!(!validate_directory("../images"));
//!
//! let rule = Rule::new("jpg", "media/images").expect("valid rule");
//! assert_eq!(rule.extension(), "jpg");
//! ```

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Longest allowed name for a single path segment (`NAME_MAX` on Linux).
pub const MAX_SEGMENT_LEN: usize = 255;

/// Returns true if `ext` is a bare extension: non-empty, ASCII letters and digits only.
///
/// Matching is case-sensitive elsewhere in the crate, so `"JPG"` and `"jpg"`
/// are both valid and are different extensions.
pub fn validate_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Returns true if `dir` is an acceptable relative destination path.
///
/// Rejected:
/// - empty or whitespace-only strings
/// - `"."`, `".."` and `"/"`
/// - anything starting with `"./"` or containing `"//"`
/// - any segment equal to `.` or `..`
/// - any segment of [`MAX_SEGMENT_LEN`] bytes or more
///
/// A single leading `/` is tolerated and anchors the path at the working
/// directory. A trailing `/` is allowed.
pub fn validate_directory(dir: &str) -> bool {
    if dir.trim().is_empty() {
        return false;
    }
    if matches!(dir, "." | ".." | "/") || dir.starts_with("./") || dir.contains("//") {
        return false;
    }

    let mut segments = dir.split('/').peekable();
    if segments.peek() == Some(&"") {
        segments.next();
    }

    segments
        .filter(|segment| !segment.is_empty())
        .all(|segment| !is_dot_segment(segment) && segment.len() < MAX_SEGMENT_LEN)
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

/// Splits a validated directory string into its non-empty segments.
pub(crate) fn segments(dir: &str) -> impl Iterator<Item = &str> {
    dir.split('/').filter(|segment| !segment.is_empty())
}

/// Why a rule could not be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRule {
    /// The extension failed [`validate_extension`].
    Extension,
    /// The directory failed [`validate_directory`].
    Directory,
}

/// A validated `extension → directory` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    extension: String,
    directory: String,
}

impl Rule {
    /// Builds a rule, validating both halves.
    ///
    /// The extension is checked first, so a rule with two bad halves reports
    /// [`InvalidRule::Extension`].
    pub fn new(extension: &str, directory: &str) -> Result<Self, InvalidRule> {
        if !validate_extension(extension) {
            return Err(InvalidRule::Extension);
        }
        if !validate_directory(directory) {
            return Err(InvalidRule::Directory);
        }
        Ok(Self {
            extension: extension.to_string(),
            directory: directory.to_string(),
        })
    }

    /// The extension this rule matches, without a leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The destination directory exactly as it was given.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// The destination directory as a relative path built from its segments.
    ///
    /// A leading or trailing `/` in [`Rule::directory`] has no effect here.
    pub fn relative_dir(&self) -> PathBuf {
        segments(&self.directory).collect()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*.{} → {}", self.extension, self.directory)
    }
}

/// An ordered, non-empty collection of rules.
///
/// Built all at once: callers either get every rule or an error, never a
/// partially filled set. Duplicate extensions are kept in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// A set holding exactly one rule.
    pub fn single(rule: Rule) -> Self {
        Self { rules: vec![rule] }
    }

    /// Wraps already validated rules. Returns `None` for an empty list.
    pub fn from_rules(rules: Vec<Rule>) -> Option<Self> {
        if rules.is_empty() {
            None
        } else {
            Some(Self { rules })
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// A `RuleSet` always holds at least one rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
