//! Rendering of command results.
//!
//! Every command result can be printed as an aligned table for people or
//! as pretty JSON for scripts, selected with `--format`.

use std::io::Write;

use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Writes command results in the format chosen on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Creates a writer for `format`.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Renders `value` into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding or the underlying write fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        if self.format == Format::Table {
            return value.write_table(writer);
        }

        serde_json::to_writer_pretty(&mut *writer, value)
            .map_err(|e| CliError::Format(format!("cannot encode result as JSON: {e}")))?;
        writeln!(writer)?;
        Ok(())
    }
}

/// A command result with a human-readable layout.
pub trait TableDisplay {
    /// Writes `self` as aligned text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Summary of one release archive.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseSummary {
    /// Archive path.
    pub path: String,
    /// Release name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Commit hash, `+` marks uncommitted changes.
    pub commit_hash: String,
    /// Number of jobs.
    pub jobs: usize,
    /// Number of source packages.
    pub packages: usize,
    /// Number of compiled packages.
    pub compiled_packages: usize,
    /// Whether a license is bundled.
    pub license: bool,
}

/// List of release summaries for display.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseList {
    /// Releases, sorted by archive path.
    pub releases: Vec<ReleaseSummary>,
}

impl TableDisplay for ReleaseList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.releases.is_empty() {
            writeln!(writer, "No releases")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<32}  {:<20}  {:<12}  {:<10}  {:>4}  {:>8}  {:>8}",
            "ARCHIVE", "NAME", "VERSION", "COMMIT", "JOBS", "PACKAGES", "COMPILED"
        )?;
        writeln!(writer, "{}", "─".repeat(108))?;

        for release in &self.releases {
            writeln!(
                writer,
                "{:<32}  {:<20}  {:<12}  {:<10}  {:>4}  {:>8}  {:>8}",
                truncate(&release.path, 32),
                truncate(&release.name, 20),
                truncate(&release.version, 12),
                truncate(&release.commit_hash, 10),
                release.jobs,
                release.packages,
                release.compiled_packages
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} release(s)", self.releases.len())?;
        Ok(())
    }
}

/// Result of merging two releases.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    /// Release name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Commit hash of the first release.
    pub commit_hash: String,
    /// Jobs in the merged release.
    pub jobs: usize,
    /// Compiled packages in the merged release.
    pub compiled_packages: usize,
    /// Whether a license is bundled.
    pub license: bool,
    /// Path of the written archive.
    pub output: String,
}

impl TableDisplay for MergeSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Merged Release")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Name:               {}", self.name)?;
        writeln!(writer, "Version:            {}", self.version)?;
        writeln!(writer, "Commit Hash:        {}", self.commit_hash)?;
        writeln!(writer, "Jobs:               {}", self.jobs)?;
        writeln!(writer, "Compiled Packages:  {}", self.compiled_packages)?;
        writeln!(
            writer,
            "License:            {}",
            if self.license { "yes" } else { "none" }
        )?;
        writeln!(writer)?;
        writeln!(writer, "✓ Wrote {}", self.output)?;
        Ok(())
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_chars).collect()
    }
}
