//! Outcome of comparing a submitted tree against a fresh generation.
//!
//! Violations are data rather than errors: reviewers need the complete list,
//! not just the first difference.

use std::fmt;

/// A hashable file whose content differs between the two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Path relative to the tree root, using `/` separators.
    pub path: String,
    /// Line diff between the submitted and the generated file.
    pub diff: String,
}

/// Every difference found between a submitted and a reference tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    /// Files present in both trees with different content.
    pub mismatched: Vec<Mismatch>,
    /// Files the generator produces that the submission lacks.
    pub missing: Vec<String>,
    /// Hashable files in the submission that the generator does not produce.
    pub unexpected: Vec<String>,
}

impl Violations {
    /// Returns true if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Total number of recorded violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mismatched.len() + self.missing.len() + self.unexpected.len()
    }

    /// Convert into an outcome, collapsing an empty set to `Equal`.
    #[must_use]
    pub fn into_outcome(self) -> VerificationOutcome {
        if self.is_empty() {
            VerificationOutcome::Equal
        } else {
            VerificationOutcome::Violations(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mismatch in &self.mismatched {
            writeln!(f, "file not equal: {}", mismatch.path)?;
            for line in mismatch.diff.lines() {
                writeln!(f, "    {line}")?;
            }
        }
        for path in &self.missing {
            writeln!(f, "missing file: {path}")?;
        }
        for path in &self.unexpected {
            writeln!(f, "unexpected file: {path}")?;
        }
        Ok(())
    }
}

/// Result of a tree comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Both trees hold the same hashable files with identical content.
    Equal,
    /// At least one difference was found.
    Violations(Violations),
}

impl VerificationOutcome {
    /// Returns true when the trees matched.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    /// Return the violations, if any.
    #[must_use]
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Equal => None,
            Self::Violations(violations) => Some(violations),
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "generated output matches"),
            Self::Violations(violations) => write!(f, "{violations}"),
        }
    }
}
