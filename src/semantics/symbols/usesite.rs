//! Deferred per-symbol diagnostics, surfaced when a symbol is used.
//!
//! A use-site diagnostic records that a symbol's signature depends on
//! something that failed to load or resolve correctly. It is computed at
//! most once per symbol by recursively inspecting the signature's
//! constituent types and custom modifiers, short-circuits on the
//! highest-priority condition, and is re-derived for constructed symbols by
//! delegating to the original definition (substitution never introduces new
//! use-site errors), plus a separate walk against the containing module's
//! version-unification records.

use std::sync::Arc;

use crate::semantics::annotations::TypeWithAnnotation;
use crate::semantics::diagnostics::{DiagnosticCode, DiagnosticSeverity};
use crate::semantics::symbols::{
    ErrorTypeKind, EventSymbol, FieldSymbol, MethodSymbol, NamedTypeRc, NamedTypeSymbol,
    PropertySymbol, TypeSymbol,
};

/// Maximum recursion depth for signature walks.
const MAX_RECURSION_DEPTH: usize = 100;

/// A diagnostic attached to a symbol, reported when the symbol is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseSiteDiagnostic {
    /// The structured condition code
    pub code: DiagnosticCode,
    /// Severity of the condition
    pub severity: DiagnosticSeverity,
    /// Pre-rendered arguments identifying the involved entities
    pub args: Vec<String>,
}

impl UseSiteDiagnostic {
    /// Priority used for short-circuiting: higher suppresses lower.
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self.code {
            DiagnosticCode::UnsupportedMetadata => 3,
            DiagnosticCode::MissingAssembly | DiagnosticCode::CircularTypeForwarding => 2,
            DiagnosticCode::UnifiedReference => 1,
            _ => 0,
        }
    }

    fn unsupported(name: &str) -> Self {
        Self {
            code: DiagnosticCode::UnsupportedMetadata,
            severity: DiagnosticSeverity::Error,
            args: vec![name.to_string()],
        }
    }

    fn missing(name: &str) -> Self {
        Self {
            code: DiagnosticCode::MissingAssembly,
            severity: DiagnosticSeverity::Error,
            args: vec![name.to_string()],
        }
    }

    fn unified(requested: &str, resolved: &str) -> Self {
        Self {
            code: DiagnosticCode::UnifiedReference,
            severity: DiagnosticSeverity::Info,
            args: vec![requested.to_string(), resolved.to_string()],
        }
    }
}

/// Keep whichever diagnostic has the higher priority.
fn worst(
    current: Option<UseSiteDiagnostic>,
    candidate: Option<UseSiteDiagnostic>,
) -> Option<UseSiteDiagnostic> {
    match (current, candidate) {
        (None, next) => next,
        (prev, None) => prev,
        (Some(prev), Some(next)) => {
            if next.priority() > prev.priority() {
                Some(next)
            } else {
                Some(prev)
            }
        }
    }
}

/// True once the walk found the highest-priority condition; nothing can
/// supersede it, so the walk stops.
fn is_terminal(diagnostic: &Option<UseSiteDiagnostic>) -> bool {
    diagnostic.as_ref().is_some_and(|d| d.priority() >= 3)
}

fn walk_annotated(reference: &TypeWithAnnotation, depth: usize) -> Option<UseSiteDiagnostic> {
    if depth >= MAX_RECURSION_DEPTH {
        return Some(UseSiteDiagnostic::unsupported("<signature too deep>"));
    }
    if reference.is_unset() {
        return None;
    }

    let mut result = walk_type(&reference.ty(), depth + 1);
    if is_terminal(&result) {
        return result;
    }

    for modifier in reference.custom_modifiers() {
        let candidate = walk_type(&TypeSymbol::Named(modifier.modifier.clone()), depth + 1);
        result = worst(result, candidate);
        if is_terminal(&result) {
            return result;
        }
    }
    result
}

fn walk_type(ty: &TypeSymbol, depth: usize) -> Option<UseSiteDiagnostic> {
    if depth >= MAX_RECURSION_DEPTH {
        return Some(UseSiteDiagnostic::unsupported("<signature too deep>"));
    }

    match ty {
        TypeSymbol::Error(error) => Some(match error.error_kind() {
            ErrorTypeKind::Unsupported => UseSiteDiagnostic::unsupported(error.name()),
            _ => UseSiteDiagnostic::missing(error.name()),
        }),
        TypeSymbol::Named(named) => {
            let mut result = None;
            for argument in named.type_arguments() {
                result = worst(result, walk_annotated(argument, depth + 1));
                if is_terminal(&result) {
                    break;
                }
            }
            result
        }
        TypeSymbol::Array(array) => walk_annotated(&array.element, depth + 1),
        TypeSymbol::Pointer(pointer) => walk_annotated(&pointer.pointee, depth + 1),
        TypeSymbol::TypeParameter(_) => None,
    }
}

/// Check a signature type against the containing module's unification records.
fn unification_info(
    containing: &Option<NamedTypeRc>,
    reference: &TypeWithAnnotation,
) -> Option<UseSiteDiagnostic> {
    let containing = containing.as_ref()?;
    let assembly = containing.containing_assembly()?;
    let module = assembly.manifest_module();

    let mentioned_assembly = if reference.is_unset() {
        return None;
    } else {
        reference.ty().containing_assembly()?
    };

    for unified in module.unified_references() {
        if unified.resolved == *mentioned_assembly.identity() {
            return Some(UseSiteDiagnostic::unified(
                &unified.requested.display_name(),
                &unified.resolved.display_name(),
            ));
        }
    }
    None
}

pub(crate) fn for_method(method: &Arc<MethodSymbol>) -> Option<UseSiteDiagnostic> {
    // Substitution never introduces new use-site errors beyond those of the
    // unsubstituted shape, so constructed methods delegate to the original
    // definition before running the unification walk.
    let original = method.original_definition();
    let mut result = if Arc::ptr_eq(&original, method) {
        let mut result = walk_annotated(&method.return_type(), 0);
        if !is_terminal(&result) {
            for parameter in method.parameters() {
                result = worst(result, walk_annotated(parameter.parameter_type(), 0));
                if is_terminal(&result) {
                    break;
                }
            }
        }
        result
    } else {
        original.use_site_diagnostic()
    };

    if !is_terminal(&result) {
        let containing = method.containing_type();
        result = worst(result, unification_info(&containing, &method.return_type()));
        for parameter in method.parameters() {
            result = worst(
                result,
                unification_info(&containing, parameter.parameter_type()),
            );
        }
    }
    result
}

pub(crate) fn for_field(field: &Arc<FieldSymbol>) -> Option<UseSiteDiagnostic> {
    let original = field.original_definition();
    let mut result = if Arc::ptr_eq(&original, field) {
        walk_annotated(&field.field_type(), 0)
    } else {
        original.use_site_diagnostic()
    };
    if !is_terminal(&result) {
        result = worst(
            result,
            unification_info(&field.containing_type(), &field.field_type()),
        );
    }
    result
}

pub(crate) fn for_property(property: &Arc<PropertySymbol>) -> Option<UseSiteDiagnostic> {
    let original = property.original_definition();
    let mut result = if Arc::ptr_eq(&original, property) {
        let mut result = walk_annotated(&property.property_type(), 0);
        if !is_terminal(&result) {
            for parameter in property.parameters() {
                result = worst(result, walk_annotated(parameter.parameter_type(), 0));
                if is_terminal(&result) {
                    break;
                }
            }
        }
        result
    } else {
        original.use_site_diagnostic()
    };
    if !is_terminal(&result) {
        result = worst(
            result,
            unification_info(&property.containing_type(), &property.property_type()),
        );
    }
    result
}

pub(crate) fn for_event(event: &Arc<EventSymbol>) -> Option<UseSiteDiagnostic> {
    let original = event.original_definition();
    let mut result = if Arc::ptr_eq(&original, event) {
        walk_annotated(&event.event_type(), 0)
    } else {
        original.use_site_diagnostic()
    };
    if !is_terminal(&result) {
        result = worst(
            result,
            unification_info(&event.containing_type(), &event.event_type()),
        );
    }
    result
}

pub(crate) fn for_named_type(ty: &Arc<NamedTypeSymbol>) -> Option<UseSiteDiagnostic> {
    let original = ty.original_definition();
    if Arc::ptr_eq(&original, ty) {
        let mut result = None;
        if let Some(base) = ty.base_type() {
            result = walk_annotated(&base, 0);
        }
        result
    } else {
        let mut result = original.use_site_diagnostic();
        if !is_terminal(&result) {
            for argument in ty.type_arguments() {
                result = worst(result, walk_annotated(argument, 0));
                if is_terminal(&result) {
                    break;
                }
            }
        }
        result
    }
}
