//! Structured diagnostics collection for reference binding and symbol resolution.
//!
//! This module provides types for collecting and reporting diagnostic conditions
//! during reference binding, override resolution, and well-known entity lookup.
//! Resolution is lenient by design: a missing or ambiguous entity is recorded
//! here and replaced by a placeholder symbol so that binding can continue and
//! report as many problems as possible in one pass.
//!
//! # Architecture
//!
//! The diagnostics system is shared across the resolution pipeline:
//! - **Reference binder**: Reports identity conflicts, unification, missing assemblies
//! - **Well-known lookup**: Reports ambiguous or missing library entities
//! - **Attribute protocol**: Reports duplicate/misapplied attributes
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for thread-safe, lock-free
//! append operations, allowing diagnostics to be collected from parallel binding
//! operations without synchronization overhead.
//!
//! Entries carry a structured [`DiagnosticCode`] plus pre-rendered argument
//! strings (symbol display names, assembly identities). The core never formats
//! final user-facing text; presentation is a consumer concern.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual entry with severity, code, and arguments
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning, Error)
//! - [`DiagnosticCode`] - Structured condition code
//!
//! # Usage Examples
//!
//! ```rust
//! use bindscope::semantics::diagnostics::{Diagnostics, DiagnosticCode};
//! use std::sync::Arc;
//!
//! let diagnostics = Arc::new(Diagnostics::new());
//!
//! diagnostics.error(
//!     DiagnosticCode::CultureMismatch,
//!     ["MyLib", "neutral", "de-DE"],
//! );
//!
//! if diagnostics.has_errors() {
//!     for entry in diagnostics.iter() {
//!         println!("[{}] {}: {:?}", entry.severity, entry.code, entry.args);
//!     }
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`]. Multiple threads can
//! safely add diagnostics simultaneously without coordination.

use std::fmt;

/// Severity level of a diagnostic entry.
///
/// Determines how the diagnostic should be treated and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for noting unusual but valid resolutions, such as a version
    /// unification that picked a compatible higher version.
    Info,

    /// Warning about a resolution that succeeded with caveats.
    ///
    /// Binding continues with a deterministic choice; some entity may behave
    /// differently than the author expected.
    Warning,

    /// Error indicating a resolution that could not be completed.
    ///
    /// The affected entity is replaced by a placeholder symbol and binding
    /// continues, but consumers must treat the entity as unavailable.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured condition code of a diagnostic entry.
///
/// Every data-shape failure in the resolution core maps to exactly one code;
/// there is no generic "binding failed" catch-all. The arguments carried by
/// the [`Diagnostic`] identify the concrete symbols and identities involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A well-known type was found in more than one referenced assembly.
    ///
    /// Arguments: type name, first candidate assembly, second candidate assembly.
    AmbiguousWellKnownType,

    /// A type forwarder chain loops back onto an assembly already visited.
    ///
    /// Arguments: type name, assembly where the cycle was detected.
    CircularTypeForwarding,

    /// An attribute was applied more than once without `AllowMultiple`.
    ///
    /// Arguments: attribute type name, symbol it was applied to.
    DuplicateAttribute,

    /// An attribute was applied to a target its usage declaration forbids.
    ///
    /// Arguments: attribute type name, actual target, allowed targets.
    InvalidAttributeTarget,

    /// A security attribute was applied to a target outside the restricted set.
    ///
    /// Arguments: attribute type name, symbol it was applied to.
    SecurityAttributeMisuse,

    /// Two references to the same assembly disagree on reference properties.
    ///
    /// Typical case: conflicting embed-interop-types flags. The primary
    /// reference wins deterministically. Arguments: assembly identity,
    /// conflicting property.
    ReferencePropertyConflict,

    /// Two same-named weak (unversioned) references carry different cultures.
    ///
    /// This is a hard conflict; neither reference is silently preferred.
    /// Arguments: simple name, first culture, second culture.
    CultureMismatch,

    /// A strong reference was version-coerced onto a different resolved version.
    ///
    /// Arguments: requested identity, chosen identity.
    UnifiedReference,

    /// A declared or transitively required assembly could not be resolved.
    ///
    /// Arguments: missing assembly identity, referencing assembly.
    MissingAssembly,

    /// A signature references a shape the symbol model cannot represent.
    ///
    /// Examples: unsupported calling convention, malformed custom modifier.
    /// Arguments: member display name.
    UnsupportedMetadata,

    /// Override resolution found more than one equally good candidate.
    ///
    /// Arguments: member display name, candidate display names.
    AmbiguousOverride,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::AmbiguousWellKnownType => write!(f, "AmbiguousWellKnownType"),
            DiagnosticCode::CircularTypeForwarding => write!(f, "CircularTypeForwarding"),
            DiagnosticCode::DuplicateAttribute => write!(f, "DuplicateAttribute"),
            DiagnosticCode::InvalidAttributeTarget => write!(f, "InvalidAttributeTarget"),
            DiagnosticCode::SecurityAttributeMisuse => write!(f, "SecurityAttributeMisuse"),
            DiagnosticCode::ReferencePropertyConflict => write!(f, "ReferencePropertyConflict"),
            DiagnosticCode::CultureMismatch => write!(f, "CultureMismatch"),
            DiagnosticCode::UnifiedReference => write!(f, "UnifiedReference"),
            DiagnosticCode::MissingAssembly => write!(f, "MissingAssembly"),
            DiagnosticCode::UnsupportedMetadata => write!(f, "UnsupportedMetadata"),
            DiagnosticCode::AmbiguousOverride => write!(f, "AmbiguousOverride"),
        }
    }
}

/// A single diagnostic entry.
///
/// Contains the severity, structured code, and the argument list identifying
/// the concrete symbols and identities involved in the condition.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Structured condition code.
    pub code: DiagnosticCode,

    /// Pre-rendered arguments (symbol display names, assembly identities).
    ///
    /// Ordering is fixed per code; see the code's documentation.
    pub args: Vec<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `code` - Structured condition code
    /// * `args` - Argument list identifying the involved entities
    pub fn new<I, S>(severity: DiagnosticSeverity, code: DiagnosticCode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            severity,
            code,
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.code)?;
        if !self.args.is_empty() {
            write!(f, ": {}", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
/// Multiple threads can safely add diagnostics simultaneously.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info<I, S>(&self, code: DiagnosticCode, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, code, args));
    }

    /// Adds a warning diagnostic.
    pub fn warning<I, S>(&self, code: DiagnosticCode, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Diagnostic::new(DiagnosticSeverity::Warning, code, args));
    }

    /// Adds an error diagnostic.
    pub fn error<I, S>(&self, code: DiagnosticCode, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Diagnostic::new(DiagnosticSeverity::Error, code, args));
    }

    /// Adds a diagnostic entry directly.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Returns an iterator over all collected diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all diagnostics matching the given code.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.code == code).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_query() {
        let diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_any());

        diagnostics.warning(DiagnosticCode::UnifiedReference, ["Lib, Version=1.0.0.0", "Lib, Version=2.0.0.0"]);
        diagnostics.error(DiagnosticCode::MissingAssembly, ["Absent", "Main"]);

        assert_eq!(diagnostics.count(), 2);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.with_code(DiagnosticCode::MissingAssembly).len(), 1);
    }

    #[test]
    fn test_display_format() {
        let d = Diagnostic::new(
            DiagnosticSeverity::Error,
            DiagnosticCode::CultureMismatch,
            ["MyLib", "neutral", "de-DE"],
        );
        assert_eq!(d.to_string(), "[ERROR] CultureMismatch: MyLib, neutral, de-DE");
    }

    #[test]
    fn test_concurrent_append() {
        use std::sync::Arc;

        let diagnostics = Arc::new(Diagnostics::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let shared = Arc::clone(&diagnostics);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    shared.info(DiagnosticCode::UnifiedReference, ["a", "b"]);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(diagnostics.count(), 400);
    }
}
