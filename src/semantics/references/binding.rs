//! Reference-set resolution: materialization, identity matching, unification.

use std::sync::Arc;

use crate::semantics::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::references::{DeclaredType, ReferenceSource};
use crate::semantics::symbols::{
    AssemblyRc, AssemblySymbol, NamedTypeBuilder, NamedTypeRc, TypeKind, UnifiedReference,
};
use crate::semantics::wellknown::SpecialType;

/// How version differences between a strong reference and its candidate are
/// reconciled.
///
/// The single fixed policy picks the highest compatible version and records
/// the substitution for diagnostics; an exact-match-only mode is not
/// offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnificationPolicy {
    /// Bind to the highest version that satisfies the requirement
    UnifyToHighest,
}

/// The published result of binding one reference set.
///
/// Immutable after publication. Compilations that declared the identical
/// reference set share one instance; a binding with a circular reference is
/// private to its compilation and never cached.
#[derive(Debug)]
pub struct ReferenceBinding {
    referenced_identities: Vec<AssemblyIdentity>,
    referenced_assemblies: Vec<AssemblyRc>,
    cor_library: AssemblyRc,
    unified: Vec<UnifiedReference>,
    has_circular_reference: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ReferenceBinding {
    pub(crate) fn new(
        referenced_identities: Vec<AssemblyIdentity>,
        referenced_assemblies: Vec<AssemblyRc>,
        cor_library: AssemblyRc,
        unified: Vec<UnifiedReference>,
        has_circular_reference: bool,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            referenced_identities,
            referenced_assemblies,
            cor_library,
            unified,
            has_circular_reference,
            diagnostics,
        }
    }

    /// The declared reference identities, in declaration order.
    #[must_use]
    pub fn referenced_identities(&self) -> &[AssemblyIdentity] {
        &self.referenced_identities
    }

    /// The resolved assembly symbols, parallel to
    /// [`referenced_identities`](Self::referenced_identities); unresolved
    /// entries are missing-assembly sentinels.
    #[must_use]
    pub fn referenced_assemblies(&self) -> &[AssemblyRc] {
        &self.referenced_assemblies
    }

    /// The designated core library (possibly the missing sentinel, never absent).
    #[must_use]
    pub fn cor_library(&self) -> &AssemblyRc {
        &self.cor_library
    }

    /// Version unifications applied while binding.
    #[must_use]
    pub fn unified_references(&self) -> &[UnifiedReference] {
        &self.unified
    }

    /// True when the reference graph loops back to the compiled assembly.
    ///
    /// Such a binding cannot be shared with sibling compilations.
    #[must_use]
    pub fn has_circular_reference(&self) -> bool {
        self.has_circular_reference
    }

    /// Diagnostics produced while binding; replayed into every compilation
    /// that adopts this binding.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Materialize an assembly symbol graph from a metadata source.
///
/// Builds the namespace tree and declared types (including nested types)
/// and records primitive-type classifications by canonical name. Type
/// forwarders are wired later, once the full candidate set is resolved.
pub(crate) fn materialize_assembly(source: &Arc<dyn ReferenceSource>) -> AssemblyRc {
    let assembly = AssemblySymbol::new_metadata(source.identity(), source.module_names());
    for declared in source.declared_types() {
        let ty = build_declared_type(&assembly, &declared);
        for nested in &declared.nested {
            build_nested_type(&assembly, &ty, nested);
        }
    }
    assembly
}

fn build_declared_type(assembly: &AssemblyRc, declared: &DeclaredType) -> NamedTypeRc {
    NamedTypeBuilder::new(assembly)
        .namespace(declared.namespace.clone())
        .name(declared.name.clone())
        .arity(declared.arity)
        .kind(effective_kind(declared))
        .accessibility(declared.accessibility)
        .from_metadata()
        .build()
}

/// The kind to materialize a declared type with.
///
/// Metadata readers report primitives structurally; when the canonical
/// classification of a special type disagrees (the numeric primitives and
/// the nullable wrapper are value types), the canonical kind wins.
fn effective_kind(declared: &DeclaredType) -> TypeKind {
    let metadata_name = if declared.arity == 0 {
        declared.name.clone()
    } else {
        format!("{}`{}", declared.name, declared.arity)
    };
    match SpecialType::from_metadata_name(&declared.namespace, &metadata_name) {
        Some(special) => canonical_kind(special),
        None => declared.type_kind,
    }
}

fn build_nested_type(assembly: &AssemblyRc, containing: &NamedTypeRc, declared: &DeclaredType) {
    // Nested types are reachable through their container, not the namespace
    // tree, so they bypass the builder's namespace registration.
    let nested = NamedTypeBuilder::new(assembly)
        .namespace(containing.namespace().to_string())
        .name(declared.name.clone())
        .arity(declared.arity)
        .kind(declared.type_kind)
        .accessibility(declared.accessibility)
        .from_metadata()
        .build_unregistered();
    containing.add_nested_type(nested.clone());
    for inner in &declared.nested {
        build_nested_type(assembly, &nested, inner);
    }
}

/// The outcome of matching one requested identity against the candidate set.
pub(crate) enum IdentityMatch {
    /// An exact or unified candidate was found
    Bound {
        /// Index into the candidate list
        index: usize,
        /// The unification applied, when the versions differed
        unified: Option<UnifiedReference>,
    },
    /// No candidate satisfies the requested identity
    Missing,
}

/// Bind one requested identity against the candidate identities.
///
/// Weak (unversioned) requests bind by simple name with an exact culture
/// match; strong requests additionally require the key token and a
/// compatible version, unified to the highest available under
/// [`UnificationPolicy::UnifyToHighest`].
pub(crate) fn bind_identity(
    requested: &AssemblyIdentity,
    candidates: &[AssemblyIdentity],
    policy: UnificationPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> IdentityMatch {
    let UnificationPolicy::UnifyToHighest = policy;

    let mut best: Option<(usize, &AssemblyIdentity)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.name.eq_ignore_ascii_case(&requested.name) {
            continue;
        }

        if candidate.culture != requested.culture {
            // Same simple name with a different culture is a hard conflict,
            // not a silently-skipped candidate.
            diagnostics.push(Diagnostic::new(
                DiagnosticSeverity::Error,
                DiagnosticCode::CultureMismatch,
                [
                    requested.simple_name().to_string(),
                    requested.culture.clone().unwrap_or_else(|| "neutral".to_string()),
                    candidate.culture.clone().unwrap_or_else(|| "neutral".to_string()),
                ],
            ));
            continue;
        }

        if !candidate.satisfies(requested) {
            continue;
        }

        match best {
            Some((_, current)) if current.version >= candidate.version => {}
            _ => best = Some((index, candidate)),
        }
    }

    match best {
        Some((index, candidate)) => {
            let unified = if !requested.version.is_unknown()
                && candidate.version != requested.version
            {
                Some(UnifiedReference {
                    requested: requested.clone(),
                    resolved: candidate.clone(),
                })
            } else {
                None
            };
            IdentityMatch::Bound { index, unified }
        }
        None => IdentityMatch::Missing,
    }
}

/// Designate the core library for a compilation.
///
/// The compiled assembly itself wins if it declares the primitive types;
/// otherwise the first successfully bound reference that does; otherwise the
/// missing-core-library sentinel. Never `None`: all consumers treat the
/// sentinel's lookups as always-missing.
pub(crate) fn designate_cor_library(
    own_assembly: &AssemblyRc,
    bound_references: &[AssemblyRc],
) -> AssemblyRc {
    if declares_core_types(own_assembly) {
        return own_assembly.clone();
    }
    for reference in bound_references {
        if !reference.is_missing() && declares_core_types(reference) {
            return reference.clone();
        }
    }
    AssemblySymbol::missing(AssemblyIdentity::simple("<Missing Core Assembly>"))
}

fn declares_core_types(assembly: &AssemblyRc) -> bool {
    assembly
        .lookup_declared_top_level_metadata_type("System.Object")
        .is_some()
}

/// True for special types whose canonical classification is a value type.
fn is_value_special(special: SpecialType) -> bool {
    matches!(
        special,
        SpecialType::Boolean
            | SpecialType::Char
            | SpecialType::SByte
            | SpecialType::Byte
            | SpecialType::Int16
            | SpecialType::UInt16
            | SpecialType::Int32
            | SpecialType::UInt32
            | SpecialType::Int64
            | SpecialType::UInt64
            | SpecialType::Single
            | SpecialType::Double
            | SpecialType::Decimal
            | SpecialType::NullableT
    )
}

/// `TypeKind` correction for a special type, when the metadata reader's
/// report disagrees with the canonical classification.
fn canonical_kind(special: SpecialType) -> TypeKind {
    if is_value_special(special) {
        TypeKind::Struct
    } else {
        TypeKind::Class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::identity::AssemblyVersion;
    use crate::semantics::references::MetadataFixture;

    fn identities(specs: &[&str]) -> Vec<AssemblyIdentity> {
        specs.iter().map(|s| AssemblyIdentity::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_weak_reference_binds_by_name() {
        let mut diagnostics = Vec::new();
        let candidates = identities(&["Lib, Version=3.0.0.0"]);
        let requested = AssemblyIdentity::simple("Lib");

        match bind_identity(&requested, &candidates, UnificationPolicy::UnifyToHighest, &mut diagnostics) {
            IdentityMatch::Bound { index, unified } => {
                assert_eq!(index, 0);
                assert!(unified.is_none());
            }
            IdentityMatch::Missing => panic!("weak reference should bind"),
        }
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_version_unification_picks_highest() {
        let mut diagnostics = Vec::new();
        let candidates = identities(&["Dep, Version=1.0.0.0", "Dep, Version=2.0.0.0"]);
        let requested = AssemblyIdentity::parse("Dep, Version=1.0.0.0").unwrap();

        match bind_identity(&requested, &candidates, UnificationPolicy::UnifyToHighest, &mut diagnostics) {
            IdentityMatch::Bound { index, unified } => {
                assert_eq!(index, 1);
                let unified = unified.expect("version coercion must be recorded");
                assert_eq!(unified.requested.version, AssemblyVersion::new(1, 0, 0, 0));
                assert_eq!(unified.resolved.version, AssemblyVersion::new(2, 0, 0, 0));
            }
            IdentityMatch::Missing => panic!("unifiable reference should bind"),
        }
    }

    #[test]
    fn test_higher_request_does_not_bind_down() {
        let mut diagnostics = Vec::new();
        let candidates = identities(&["Dep, Version=1.0.0.0"]);
        let requested = AssemblyIdentity::parse("Dep, Version=2.0.0.0").unwrap();

        assert!(matches!(
            bind_identity(&requested, &candidates, UnificationPolicy::UnifyToHighest, &mut diagnostics),
            IdentityMatch::Missing
        ));
    }

    #[test]
    fn test_culture_conflict_is_reported() {
        let mut diagnostics = Vec::new();
        let candidates = vec![AssemblyIdentity::new(
            "Res",
            AssemblyVersion::UNKNOWN,
            Some("de-DE".to_string()),
            None,
        )];
        let requested = AssemblyIdentity::simple("Res");

        assert!(matches!(
            bind_identity(&requested, &candidates, UnificationPolicy::UnifyToHighest, &mut diagnostics),
            IdentityMatch::Missing
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::CultureMismatch);
    }

    #[test]
    fn test_materialize_builds_nested_types() {
        let fixture: Arc<dyn ReferenceSource> = Arc::new(
            MetadataFixture::new(AssemblyIdentity::simple("Lib")).with_type(
                DeclaredType::generic_class("NS", "Outer", 1)
                    .with_nested(DeclaredType::class("NS", "Inner")),
            ),
        );
        let assembly = materialize_assembly(&fixture);
        assert!(assembly
            .lookup_declared_top_level_metadata_type("NS.Outer`1+Inner")
            .is_some());
    }

    #[test]
    fn test_designate_cor_library_prefers_own_assembly() {
        let fixture: Arc<dyn ReferenceSource> = Arc::new(
            MetadataFixture::new(AssemblyIdentity::simple("corlib")).declaring_corlib_types(),
        );
        let corlib = materialize_assembly(&fixture);

        let own = AssemblySymbol::new_source(AssemblyIdentity::simple("App"));
        let designated = designate_cor_library(&own, &[corlib.clone()]);
        assert!(Arc::ptr_eq(&designated, &corlib));

        // An assembly that itself declares System.Object wins outright
        let self_hosting: Arc<dyn ReferenceSource> = Arc::new(
            MetadataFixture::new(AssemblyIdentity::simple("SelfCor")).declaring_corlib_types(),
        );
        let self_hosting = materialize_assembly(&self_hosting);
        let designated = designate_cor_library(&self_hosting, &[corlib]);
        assert!(Arc::ptr_eq(&designated, &self_hosting));
    }

    #[test]
    fn test_designate_cor_library_missing_sentinel() {
        let own = AssemblySymbol::new_source(AssemblyIdentity::simple("App"));
        let designated = designate_cor_library(&own, &[]);
        assert!(designated.is_missing());
    }
}
