//! Command-line interface module for extmove.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing (clap)
//! - Resolving `-e`/`-d` or `-m` into a rule set
//! - The confirmation prompt
//! - Run orchestration and report rendering

use crate::config::{Config, ConfigError};
use crate::file_organizer::{FileOrganizer, RunError};
use crate::mapping::{MappingError, parse_mapping};
use crate::output::{ConsoleDiagnostics, OutputFormatter};
use crate::report::{Diagnostics, NullDiagnostics, RunReport};
use crate::rule::{InvalidRule, Rule, RuleSet};
use clap::Parser;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Move files into per-extension directories.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "extmove",
    version,
    about = "Move files into per-extension destination directories",
    after_help = "Examples:\n  extmove -e jpg -d images\n  extmove -m \"jpg=images;mp4=videos\" -f\n  extmove ~/Downloads -m \"pdf=docs/pdf\" --dry-run"
)]
pub struct Args {
    /// Working directory whose files are moved
    #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub directory: PathBuf,

    /// Extension of the files to move, without the dot (used with -d)
    #[arg(short = 'e', long = "ext", value_name = "EXTENSION")]
    pub extension: Option<String>,

    /// Destination directory, relative to the working directory (used with -e)
    #[arg(short = 'd', long = "dest", value_name = "DIRECTORY")]
    pub destination: Option<String>,

    /// Several rules at once, e.g. "jpg=images;mp4=videos" (takes precedence over -e/-d)
    #[arg(short = 'm', long = "map", value_name = "MAP")]
    pub mapping: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,

    /// Only report what would be moved
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the run report as JSON instead of styled text
    #[arg(long)]
    pub json: bool,

    /// Path to a configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The rule-related flags, borrowed.
    pub fn rule_args(&self) -> RuleArgs<'_> {
        RuleArgs {
            extension: self.extension.as_deref(),
            directory: self.destination.as_deref(),
            mapping: self.mapping.as_deref(),
        }
    }
}

/// The flags that define rules, independent of how they were parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleArgs<'a> {
    pub extension: Option<&'a str>,
    pub directory: Option<&'a str>,
    pub mapping: Option<&'a str>,
}

/// A rule-defining command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Extension,
    Directory,
    Mapping,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = match self {
            Flag::Extension => "-e",
            Flag::Directory => "-d",
            Flag::Mapping => "-m",
        };
        f.write_str(flag)
    }
}

/// Errors produced while turning flags into rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid extension '{0}': use letters and digits only, without a dot")]
    BadExtension(String),

    #[error("invalid directory '{0}': use a relative path without '.', '..' or '//'")]
    BadDirectory(String),

    #[error("invalid mapping: {0}")]
    BadMapping(#[from] MappingError),

    #[error("missing {flag}: -e and -d must be given together")]
    MissingArgument { flag: Flag },

    #[error("no rules given: use -e with -d, or -m")]
    NoRules,
}

impl ResolveError {
    /// The flag to blame in diagnostics. `None` when no rule flag was given at all.
    pub fn flag(&self) -> Option<Flag> {
        match self {
            Self::BadExtension(_) => Some(Flag::Extension),
            Self::BadDirectory(_) => Some(Flag::Directory),
            Self::BadMapping(_) => Some(Flag::Mapping),
            Self::MissingArgument { flag } => Some(*flag),
            Self::NoRules => None,
        }
    }
}

/// Resolves command-line flags into the rules for this run.
///
/// `-m` takes precedence: when it is present `-e` and `-d` are ignored.
/// Otherwise `-e` and `-d` must both be present and valid and produce a
/// single rule.
///
/// # Examples
///
/// ```
/// use extmove::cli::{RuleArgs, resolve_rules};
///
/// let rules = resolve_rules(RuleArgs {
///     extension: Some("jpg"),
///     directory: Some("images"),
///     mapping: None,
/// })
/// .unwrap();
/// assert_eq!(rules.len(), 1);
/// ```
pub fn resolve_rules(args: RuleArgs<'_>) -> Result<RuleSet, ResolveError> {
    if let Some(mapping) = args.mapping {
        if args.extension.is_some() || args.directory.is_some() {
            tracing::warn!("-m given, ignoring -e/-d");
        }
        return Ok(parse_mapping(mapping)?);
    }

    match (args.extension, args.directory) {
        (Some(extension), Some(directory)) => Rule::new(extension, directory)
            .map(RuleSet::single)
            .map_err(|invalid| match invalid {
                InvalidRule::Extension => ResolveError::BadExtension(extension.to_string()),
                InvalidRule::Directory => ResolveError::BadDirectory(directory.to_string()),
            }),
        (Some(extension), None) => {
            if crate::rule::validate_extension(extension) {
                Err(ResolveError::MissingArgument {
                    flag: Flag::Directory,
                })
            } else {
                Err(ResolveError::BadExtension(extension.to_string()))
            }
        }
        (None, Some(directory)) => {
            if crate::rule::validate_directory(directory) {
                Err(ResolveError::MissingArgument {
                    flag: Flag::Extension,
                })
            } else {
                Err(ResolveError::BadDirectory(directory.to_string()))
            }
        }
        (None, None) => Err(ResolveError::NoRules),
    }
}

/// Everything that can stop the CLI before or during a run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("error loading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Usage errors exit with 2, like clap's own argument errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Resolve(_) => 2,
            _ => 1,
        }
    }
}

/// Asks the user to confirm the rules. Only `y` or `yes` (any case) confirms.
pub fn confirm(rules: &RuleSet, input: &mut dyn BufRead) -> io::Result<bool> {
    OutputFormatter::rule_list(rules);
    print!("\nProceed? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Runs the CLI, reading confirmation from stdin.
///
/// Returns `Ok(None)` when the user declined the confirmation prompt.
pub fn run_cli(args: &Args) -> Result<Option<RunReport>, CliError> {
    let stdin = io::stdin();
    run_cli_with_input(args, &mut stdin.lock())
}

/// Runs the CLI, reading confirmation from `input`.
///
/// This function:
/// 1. Resolves the rules from the flags
/// 2. Loads configuration and compiles filters
/// 3. Asks for confirmation unless forced, dry-running or printing JSON
/// 4. Moves the files, rule by rule
/// 5. Prints the summary or the JSON report
pub fn run_cli_with_input(
    args: &Args,
    input: &mut dyn BufRead,
) -> Result<Option<RunReport>, CliError> {
    let rules = resolve_rules(args.rule_args())?;
    tracing::debug!(count = rules.len(), "resolved rules");

    let config = Config::load(args.config.as_deref(), &args.directory)?;
    let filters = config.compile_filters()?;

    let skip_prompt = args.force || config.settings.force || args.dry_run || args.json;
    if !skip_prompt && !confirm(&rules, input).map_err(CliError::Prompt)? {
        OutputFormatter::warning("Aborted, nothing was moved.");
        return Ok(None);
    }

    let mut console = ConsoleDiagnostics::new();
    let mut null = NullDiagnostics;
    let sink: &mut dyn Diagnostics = if args.json { &mut null } else { &mut console };

    if !args.json {
        if args.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Analyzing contents of: {}",
                args.directory.display()
            ));
        } else {
            OutputFormatter::info(&format!(
                "Moving files in: {}",
                args.directory.display()
            ));
        }
    }

    let report = FileOrganizer::run(&args.directory, &rules, &filters, args.dry_run, sink)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        OutputFormatter::summary_table(&report);
        if args.dry_run {
            OutputFormatter::plain("\nDry run complete. No files were modified.");
        } else if !report.is_success() {
            OutputFormatter::error("No file could be moved. Please review errors above.");
        } else if report.failed() > 0 {
            OutputFormatter::warning("Some files could not be moved. Please review errors above.");
        }
    }

    Ok(Some(report))
}
