//! Placeholder symbols for unresolved, ambiguous and cyclic types.

use crate::semantics::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
use crate::semantics::symbols::{SymbolKind, TypeSymbol};

/// Why an error type exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTypeKind {
    /// The type (or its assembly) could not be found
    Missing,
    /// Two or more equally valid candidates were found
    Ambiguous,
    /// A forwarding or inheritance cycle was detected
    Cycle,
    /// The metadata shape cannot be represented in the symbol model
    Unsupported,
}

/// A placeholder for a type that failed to resolve.
///
/// Error types are values, not exceptions: every lookup that cannot produce
/// a real type produces one of these instead, carrying the diagnostic that
/// explains the failure and, for ambiguities, the candidate symbols that
/// were in conflict. Member lookups on an error type return empty results,
/// never fault, so downstream binding proceeds and reports diagnostics
/// rather than crashing.
#[derive(Debug)]
pub struct ErrorTypeSymbol {
    name: String,
    kind: ErrorTypeKind,
    diagnostic: Option<Diagnostic>,
    candidates: Vec<TypeSymbol>,
}

impl ErrorTypeSymbol {
    /// A missing type, optionally recording the assembly it was expected in.
    #[must_use]
    pub fn missing(name: impl Into<String>, expected_in: Option<&str>) -> Self {
        let name = name.into();
        let mut args = vec![name.clone()];
        if let Some(assembly) = expected_in {
            args.push(assembly.to_string());
        }
        Self {
            diagnostic: Some(Diagnostic::new(
                DiagnosticSeverity::Error,
                DiagnosticCode::MissingAssembly,
                args,
            )),
            name,
            kind: ErrorTypeKind::Missing,
            candidates: Vec::new(),
        }
    }

    /// An ambiguous type, carrying every conflicting candidate.
    ///
    /// The ambiguity is a result for the caller to inspect, never an
    /// arbitrary silent pick.
    #[must_use]
    pub fn ambiguous(name: impl Into<String>, candidates: Vec<TypeSymbol>) -> Self {
        let name = name.into();
        let mut args = vec![name.clone()];
        args.extend(candidates.iter().map(TypeSymbol::display_name));
        Self {
            diagnostic: Some(Diagnostic::new(
                DiagnosticSeverity::Error,
                DiagnosticCode::AmbiguousWellKnownType,
                args,
            )),
            name,
            kind: ErrorTypeKind::Ambiguous,
            candidates,
        }
    }

    /// A type whose forwarding chain loops.
    #[must_use]
    pub fn forwarding_cycle(name: impl Into<String>, assembly: &str) -> Self {
        let name = name.into();
        Self {
            diagnostic: Some(Diagnostic::new(
                DiagnosticSeverity::Error,
                DiagnosticCode::CircularTypeForwarding,
                [name.clone(), assembly.to_string()],
            )),
            name,
            kind: ErrorTypeKind::Cycle,
            candidates: Vec::new(),
        }
    }

    /// A type whose metadata shape is unsupported.
    #[must_use]
    pub fn unsupported(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            diagnostic: Some(Diagnostic::new(
                DiagnosticSeverity::Error,
                DiagnosticCode::UnsupportedMetadata,
                [name.clone()],
            )),
            name,
            kind: ErrorTypeKind::Unsupported,
            candidates: Vec::new(),
        }
    }

    /// The name the failed lookup asked for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind (always [`SymbolKind::ErrorType`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::ErrorType
    }

    /// Why this error type exists.
    #[must_use]
    pub fn error_kind(&self) -> ErrorTypeKind {
        self.kind
    }

    /// The diagnostic explaining the failure.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    /// Candidate symbols for an ambiguous resolution; empty otherwise.
    #[must_use]
    pub fn candidates(&self) -> &[TypeSymbol] {
        &self.candidates
    }
}
