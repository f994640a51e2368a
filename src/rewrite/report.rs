//! Rewrite report types.
//!
//! A rewrite never aborts on a bad record. Skips and policy outcomes are
//! collected here so the caller can see exactly what was left out.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::ir::ClassIndex;
use crate::remap::UnmappedPolicy;

/// Issues listed individually before the text report summarizes the rest.
const MAX_LISTED_ISSUES: usize = 20;

/// Which rewriter pass produced the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteMode {
    /// Raw annotations to label files.
    #[default]
    FreshBuild,
    /// Existing label files to a new index scheme.
    Reindex,
}

impl RewriteMode {
    pub fn name(&self) -> &'static str {
        match self {
            RewriteMode::FreshBuild => "fresh build",
            RewriteMode::Reindex => "re-index",
        }
    }
}

/// Summary of one rewriter pass.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RewriteReport {
    pub mode: RewriteMode,
    /// Annotations (fresh build) or non-blank label lines (re-index) seen.
    pub records_in: usize,
    pub lines_written: usize,
    pub files_written: usize,
    /// Set for re-index passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmapped_policy: Option<UnmappedPolicy>,
    /// Lines per old index that had no mapping.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unmapped: BTreeMap<ClassIndex, usize>,
    /// Image file names that pointed outside the output directory and were
    /// written below it instead.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relocated: Vec<String>,
    /// Records skipped as unusable.
    pub issues: Vec<RewriteIssue>,
}

impl RewriteReport {
    pub fn new(mode: RewriteMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: RewriteIssue) {
        log::debug!("skipping {}: {}", issue.context, issue.message);
        self.issues.push(issue);
    }

    pub fn record_relocated(&mut self, image_file_name: &str) {
        log::warn!(
            "image '{image_file_name}' points outside the labels directory; writing its labels inside it"
        );
        self.relocated.push(image_file_name.to_string());
    }

    pub fn record_unmapped(&mut self, index: ClassIndex) {
        *self.unmapped.entry(index).or_insert(0) += 1;
    }

    pub fn skipped_count(&self) -> usize {
        self.issues.len()
    }

    pub fn count_of(&self, code: RewriteIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// Total lines whose index had no mapping, dropped or kept.
    pub fn unmapped_lines(&self) -> usize {
        self.unmapped.values().sum()
    }

    /// Returns true if nothing was skipped, relocated or left unmapped.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.unmapped.is_empty() && self.relocated.is_empty()
    }
}

impl fmt::Display for RewriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} record(s) in, {} line(s) written to {} file(s)",
            self.mode.name(),
            self.records_in,
            self.lines_written,
            self.files_written
        )?;

        if !self.unmapped.is_empty() {
            let verb = match self.unmapped_policy {
                Some(UnmappedPolicy::Keep) => "kept with their old index",
                _ => "dropped",
            };
            writeln!(
                f,
                "  {} line(s) with unmapped class(es) {}:",
                self.unmapped_lines(),
                verb
            )?;
            for (index, count) in &self.unmapped {
                writeln!(f, "    class {index}: {count} line(s)")?;
            }
        }

        if !self.relocated.is_empty() {
            writeln!(
                f,
                "  {} image path(s) pointed outside the labels directory:",
                self.relocated.len()
            )?;
            for name in self.relocated.iter().take(MAX_LISTED_ISSUES) {
                writeln!(f, "    {name}")?;
            }
            if self.relocated.len() > MAX_LISTED_ISSUES {
                writeln!(f, "    ... and {} more", self.relocated.len() - MAX_LISTED_ISSUES)?;
            }
        }

        if !self.issues.is_empty() {
            writeln!(f, "  {} record(s) skipped:", self.issues.len())?;
            for issue in self.issues.iter().take(MAX_LISTED_ISSUES) {
                writeln!(f, "    {issue}")?;
            }
            if self.issues.len() > MAX_LISTED_ISSUES {
                writeln!(f, "    ... and {} more", self.issues.len() - MAX_LISTED_ISSUES)?;
            }
        }

        Ok(())
    }
}

/// One skipped record.
#[derive(Clone, Debug, Serialize)]
pub struct RewriteIssue {
    pub code: RewriteIssueCode,
    pub message: String,
    /// Where it happened: an annotation, or `file:line`.
    pub context: String,
}

impl RewriteIssue {
    pub fn new(code: RewriteIssueCode, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for RewriteIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.code, self.context, self.message)
    }
}

/// Stable codes for skipped records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RewriteIssueCode {
    /// An annotation references an image id the source does not list.
    MissingImageRef,
    /// An annotation references a category id the source does not list.
    MissingCategoryRef,
    /// The annotation's image has a zero width or height.
    InvalidImageDimensions,
    /// The image file name has no usable path component.
    UnusableImagePath,
    /// The box has a NaN or infinite coordinate.
    NonFiniteBox,
    /// A label line has the wrong field count or non-numeric fields.
    MalformedLabelLine,
}
