//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables. [`ConsoleDiagnostics`] renders the
//! events of a run through it.

use crate::report::{Diagnostics, FileOutcome, RunReport, Status};
use crate::rule::{Rule, RuleSet};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use extmove::output::OutputFormatter;
    /// OutputFormatter::success("photo.jpg → images/photo.jpg");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates and returns a progress bar for file operations.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of items to process
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the rules that are about to be applied.
    pub fn rule_list(rules: &RuleSet) {
        Self::header("RULES");
        for rule in rules {
            println!("  {}", rule);
        }
    }

    /// Prints a summary table with moved file counts by destination directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use extmove::output::OutputFormatter;
    /// use extmove::report::RunReport;
    ///
    /// OutputFormatter::summary_table(&RunReport::new(false));
    /// ```
    pub fn summary_table(report: &RunReport) {
        Self::header("SUMMARY");

        let counts = report.counts_by_directory();
        let max_dir_len = counts
            .keys()
            .map(|dir| dir.len())
            .max()
            .unwrap_or(0)
            .max(9); // At least "Directory" width

        println!(
            "{:<width$} | {}",
            "Directory".bold(),
            "Files".bold(),
            width = max_dir_len
        );
        println!("{}", "-".repeat(max_dir_len + 10));

        for (dir, count) in &counts {
            println!(
                "{:<width$} | {} {}",
                dir,
                count.to_string().green(),
                file_word(*count),
                width = max_dir_len
            );
        }

        println!("{}", "-".repeat(max_dir_len + 10));
        let succeeded = report.succeeded();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            succeeded.to_string().green().bold(),
            file_word(succeeded),
            width = max_dir_len
        );

        let failed = report.failed();
        if failed > 0 {
            println!(
                "{:<width$} | {} {}",
                "Failed".bold(),
                failed.to_string().red().bold(),
                file_word(failed),
                width = max_dir_len
            );
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Renders run events on the terminal, one progress bar per rule.
#[derive(Default)]
pub struct ConsoleDiagnostics {
    progress: Option<ProgressBar>,
}

impl ConsoleDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints through the active progress bar, if any, so lines don't tear it.
    fn print(&self, print: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(print),
            None => print(),
        }
    }
}

impl Diagnostics for ConsoleDiagnostics {
    fn rule_started(&mut self, rule: &Rule, matched: usize) {
        OutputFormatter::info(&format!("{} ({} {})", rule, matched, file_word(matched)));
        let pb = OutputFormatter::create_progress_bar(matched as u64);
        pb.set_message(rule.extension().to_string());
        self.progress = Some(pb);
    }

    fn no_matches(&mut self, rule: &Rule) {
        OutputFormatter::warning(&format!(
            "No files with extension '{}' found",
            rule.extension()
        ));
    }

    fn outcome(&mut self, outcome: &FileOutcome) {
        self.print(|| match outcome.status {
            Status::Moved => {
                OutputFormatter::success(&format!("{} → {}", outcome.file, outcome.destination));
            }
            Status::WouldMove => OutputFormatter::dry_run_notice(&format!(
                "{} → {}",
                outcome.file, outcome.destination
            )),
            _ => {
                let reason = outcome.message.as_deref().unwrap_or("unknown error");
                OutputFormatter::error(&format!("{}: {}", outcome.file, reason));
            }
        });
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn rule_finished(&mut self, _rule: &Rule) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
    }
}
