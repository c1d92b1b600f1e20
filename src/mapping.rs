//! Parser for `-m` mappings of the form `"ext1=dir1;ext2=dir2;..."`.

use crate::rule::{InvalidRule, Rule, RuleSet};
use thiserror::Error;

/// Separates rules inside a mapping.
pub const RULE_DELIMITER: char = ';';
/// Separates the extension from the directory inside one rule.
pub const KEY_VALUE_DELIMITER: char = '=';

/// Errors returned by [`parse_mapping`].
///
/// Positions are 1-based indexes of the `;`-separated rule that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("mapping is empty")]
    Empty,

    #[error("rule {position} ('{rule}') is missing '='")]
    MissingSeparator { position: usize, rule: String },

    #[error("rule {position} has an invalid extension '{extension}'")]
    BadExtension { position: usize, extension: String },

    #[error("rule {position} has an invalid directory '{directory}'")]
    BadDirectory { position: usize, directory: String },
}

impl MappingError {
    /// True when the mapping as a whole was empty rather than one rule being malformed.
    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Parses a mapping string into a [`RuleSet`].
///
/// Each `;`-separated token is split on its first `=`; the left half must be
/// a valid extension and the right half a valid directory. The parse is
/// all-or-nothing: the first bad token fails the whole mapping and none of
/// the rules before it are returned. An empty token (for example from a
/// trailing `;`) is a malformed rule. Duplicate extensions are preserved in
/// input order.
///
/// # Examples
///
/// ```
/// use extmove::mapping::parse_mapping;
///
/// let rules = parse_mapping("jpg=images;mp4=video").unwrap();
/// assert_eq!(rules.len(), 2);
/// assert!(parse_mapping("jpg=images;mp4").is_err());
/// ```
pub fn parse_mapping(mapping: &str) -> Result<RuleSet, MappingError> {
    if mapping.is_empty() {
        return Err(MappingError::Empty);
    }

    let rules = mapping
        .split(RULE_DELIMITER)
        .enumerate()
        .map(|(index, token)| parse_rule(index + 1, token))
        .collect::<Result<Vec<_>, _>>()?;

    RuleSet::from_rules(rules).ok_or(MappingError::Empty)
}

fn parse_rule(position: usize, token: &str) -> Result<Rule, MappingError> {
    let (extension, directory) =
        token
            .split_once(KEY_VALUE_DELIMITER)
            .ok_or_else(|| MappingError::MissingSeparator {
                position,
                rule: token.to_string(),
            })?;

    Rule::new(extension, directory).map_err(|invalid| match invalid {
        InvalidRule::Extension => MappingError::BadExtension {
            position,
            extension: extension.to_string(),
        },
        InvalidRule::Directory => MappingError::BadDirectory {
            position,
            directory: directory.to_string(),
        },
    })
}
