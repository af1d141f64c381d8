//! The configurable member signature comparer and its policy catalog.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::semantics::annotations::{CustomModifier, NullableAnnotation, TypeWithAnnotation};
use crate::semantics::symbols::{
    CallingConvention, Member, RefKind, SymbolKind, TypeCompareKind, TypeSubstitution, TypeSymbol,
};
use crate::semantics::wellknown::SpecialType;

/// How by-reference kinds participate in signature comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKindCompareMode {
    /// Ref kinds are not compared at all
    Ignore,
    /// Ref kinds must match exactly
    Exact,
    /// Exact, except a declared read-only reference parameter matches an
    /// input parameter (the documented calling-convention equivalence)
    AllowRefReadOnlyVsIn,
    /// The runtime view: all by-ref kinds are one kind, distinct from by-value
    CollapseByRef,
}

fn ref_kinds_match(a: RefKind, b: RefKind, mode: RefKindCompareMode) -> bool {
    match mode {
        RefKindCompareMode::Ignore => true,
        RefKindCompareMode::Exact => a == b,
        RefKindCompareMode::AllowRefReadOnlyVsIn => {
            a == b
                || matches!(
                    (a, b),
                    (RefKind::RefReadOnly, RefKind::In) | (RefKind::In, RefKind::RefReadOnly)
                )
        }
        RefKindCompareMode::CollapseByRef => a.is_by_ref() == b.is_by_ref(),
    }
}

/// The signature calling convention of a member.
///
/// Only methods have one; asking for any other kind is a missing case in
/// the caller's logic, not a data error.
fn calling_convention_of(member: &Member) -> CallingConvention {
    match member {
        Member::Method(m) => m.calling_convention(),
        other => unreachable!(
            "calling convention requested for symbol kind {:?}",
            other.kind()
        ),
    }
}

/// A configurable equality and hash over member signatures.
///
/// A comparer is a fixed tuple of toggles with no mutable state; the named
/// singletons below are safe to share across all threads. Members of
/// different kinds never compare equal and never fault; the only fault in
/// this module is the calling-convention lookup on a non-method, which is a
/// programmer error by contract.
///
/// # Positional Type Parameters
///
/// Generic methods compare their signatures under a positional substitution:
/// type parameter `i` of one method matches type parameter `i` of the other
/// regardless of name, by mapping the right side's parameters onto the
/// left's before any type comparison.
#[derive(Debug, Clone, Copy)]
pub struct MemberSignatureComparer {
    consider_name: bool,
    consider_explicit_interfaces: bool,
    consider_return_type: bool,
    consider_arity: bool,
    consider_calling_convention: bool,
    ref_kind_mode: RefKindCompareMode,
    type_comparison: TypeCompareKind,
}

impl MemberSignatureComparer {
    /// Explicit interface implementation matching: name-independent,
    /// modifier-exact, calling convention significant.
    pub const EXPLICIT_IMPL: Self = Self {
        consider_name: false,
        consider_explicit_interfaces: false,
        consider_return_type: true,
        consider_arity: true,
        consider_calling_convention: true,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::CONSIDER_EVERYTHING,
    };

    /// Relaxed explicit-implementation lookup used only to produce better
    /// diagnostics for near misses.
    pub const EXPLICIT_IMPL_LOOKUP: Self = Self {
        consider_name: false,
        consider_explicit_interfaces: false,
        consider_return_type: true,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Ignore,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS
            .union(TypeCompareKind::IGNORE_NULLABILITY),
    };

    /// Implicit interface implementation matching: name-dependent, custom
    /// modifiers ignored.
    pub const IMPLICIT_IMPL: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: true,
        consider_return_type: true,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS
            .union(TypeCompareKind::IGNORE_NULLABILITY)
            .union(TypeCompareKind::OBLIVIOUS_MATCHES_ANY),
    };

    /// "Close but not quite" implicit-implementation check for near-miss
    /// diagnostics.
    pub const IMPLICIT_IMPL_LOOSE: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: true,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Ignore,
        type_comparison: TypeCompareKind::ALL_IGNORE_OPTIONS,
    };

    /// Source duplicate detection: name, arity and parameter types only.
    pub const DUPLICATE_SOURCE: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: false,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Ignore,
        type_comparison: TypeCompareKind::ALL_IGNORE_OPTIONS,
    };

    /// Partial method definition/implementation matching.
    pub const PARTIAL_METHOD: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: true,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: true,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS
            .union(TypeCompareKind::IGNORE_NULLABILITY)
            .union(TypeCompareKind::OBLIVIOUS_MATCHES_ANY),
    };

    /// Strict partial matching: return type significant, nullability compared.
    pub const PARTIAL_METHOD_STRICT: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: true,
        consider_return_type: true,
        consider_arity: true,
        consider_calling_convention: true,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS,
    };

    /// Interceptor applicability: name-independent, loosest useful check.
    pub const INTERCEPTOR: Self = Self {
        consider_name: false,
        consider_explicit_interfaces: false,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::AllowRefReadOnlyVsIn,
        type_comparison: TypeCompareKind::ALL_IGNORE_OPTIONS,
    };

    /// Strict interceptor matching: return type and convention significant.
    pub const INTERCEPTOR_STRICT: Self = Self {
        consider_name: false,
        consider_explicit_interfaces: false,
        consider_return_type: true,
        consider_arity: true,
        consider_calling_convention: true,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS
            .union(TypeCompareKind::OBLIVIOUS_MATCHES_ANY),
    };

    /// Override matching: return type not compared (covariant returns),
    /// custom modifiers ignored.
    pub const OVERRIDE: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: true,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS
            .union(TypeCompareKind::IGNORE_NULLABILITY)
            .union(TypeCompareKind::OBLIVIOUS_MATCHES_ANY),
    };

    /// Override matching with exact custom modifiers; preferred over
    /// [`Self::OVERRIDE`] when several candidates tie.
    pub const OVERRIDE_EXACT_MODIFIERS: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: true,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_NULLABILITY,
    };

    /// Accessor override matching: like [`Self::OVERRIDE`] but name-independent,
    /// since accessor names derive from differently-named owners.
    pub const ACCESSOR_OVERRIDE: Self = Self {
        consider_name: false,
        consider_explicit_interfaces: false,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Exact,
        type_comparison: TypeCompareKind::IGNORE_CUSTOM_MODIFIERS
            .union(TypeCompareKind::IGNORE_NULLABILITY)
            .union(TypeCompareKind::OBLIVIOUS_MATCHES_ANY),
    };

    /// The runtime's own signature matching: the `ref`/`out` distinction is
    /// invisible to the execution engine, while return type and custom
    /// modifiers are fully significant.
    pub const RUNTIME: Self = Self {
        consider_name: true,
        consider_explicit_interfaces: false,
        consider_return_type: true,
        consider_arity: true,
        consider_calling_convention: true,
        ref_kind_mode: RefKindCompareMode::CollapseByRef,
        type_comparison: TypeCompareKind::IGNORE_NULLABILITY,
    };

    /// Documentation-reference overload disambiguation: the loosest policy.
    pub const CREF: Self = Self {
        consider_name: false,
        consider_explicit_interfaces: false,
        consider_return_type: false,
        consider_arity: true,
        consider_calling_convention: false,
        ref_kind_mode: RefKindCompareMode::Ignore,
        type_comparison: TypeCompareKind::ALL_IGNORE_OPTIONS,
    };

    /// Decide signature equivalence of two members under this policy.
    ///
    /// Members of different kinds are never equal; no input faults this
    /// method. Symmetric for every policy.
    #[must_use]
    pub fn equals(&self, a: &Member, b: &Member) -> bool {
        if Member::ptr_eq(a, b) {
            return true;
        }

        if a.kind() != b.kind() {
            return false;
        }

        if self.consider_name && a.name() != b.name() {
            return false;
        }

        if self.consider_arity && a.arity() != b.arity() {
            return false;
        }

        let a_params = a.parameters();
        let b_params = b.parameters();
        if a_params.len() != b_params.len() {
            return false;
        }

        // Vararg-ness is always significant, even when the calling
        // convention as a whole is not compared.
        if a.is_vararg() != b.is_vararg() {
            return false;
        }

        if self.consider_calling_convention
            && a.kind() == SymbolKind::Method
            && calling_convention_of(a) != calling_convention_of(b)
        {
            return false;
        }

        // Positional type-parameter substitution: map b's method type
        // parameters onto a's so nominal differences disappear.
        let substitution = self.positional_substitution(a, b);

        for (pa, pb) in a_params.iter().zip(b_params.iter()) {
            if !ref_kinds_match(pa.ref_kind(), pb.ref_kind(), self.ref_kind_mode) {
                return false;
            }
            let b_type = Self::maybe_substitute(pb.parameter_type(), &substitution);
            if !pa.parameter_type().equals(&b_type, self.type_comparison) {
                return false;
            }
        }

        if self.consider_return_type {
            if !ref_kinds_match(a.return_ref_kind(), b.return_ref_kind(), self.ref_kind_mode) {
                return false;
            }
            let a_return = a.return_type();
            let b_return = Self::maybe_substitute(&b.return_type(), &substitution);
            if Self::is_void(&a_return) && Self::is_void(&b_return) {
                // Void short-circuits unless the custom modifiers differ.
                if !self
                    .type_comparison
                    .contains(TypeCompareKind::IGNORE_CUSTOM_MODIFIERS)
                    && !CustomModifier::lists_equal(
                        &a_return.custom_modifiers(),
                        &b_return.custom_modifiers(),
                    )
                {
                    return false;
                }
            } else if !a_return.equals(&b_return, self.type_comparison) {
                return false;
            }
        }

        if self.consider_explicit_interfaces {
            let a_qualified = a.has_explicit_interface_qualification();
            let b_qualified = b.has_explicit_interface_qualification();
            if a_qualified != b_qualified {
                return false;
            }
            if a_qualified && !Self::explicit_interface_sets_equal(a, b) {
                return false;
            }
        }

        true
    }

    /// Produce a hash consistent with [`equals`](Self::equals) under this policy.
    #[must_use]
    pub fn hash(&self, member: &Member) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        member.kind().hash(&mut hasher);
        if self.consider_name {
            member.name().hash(&mut hasher);
        }
        if self.consider_arity {
            member.arity().hash(&mut hasher);
        }
        let parameters = member.parameters();
        parameters.len().hash(&mut hasher);
        member.is_vararg().hash(&mut hasher);
        for parameter in &parameters {
            parameter.parameter_type().hash_into(&mut hasher);
        }
        if self.consider_return_type {
            member.return_type().hash_into(&mut hasher);
        }
        hasher.finish()
    }

    fn positional_substitution(&self, a: &Member, b: &Member) -> Option<Arc<TypeSubstitution>> {
        let (Member::Method(ma), Member::Method(mb)) = (a, b) else {
            return None;
        };
        let a_params = ma.type_parameters();
        let b_params = mb.type_parameters();
        if a_params.is_empty() || a_params.len() != b_params.len() {
            return None;
        }
        let arguments: Vec<TypeWithAnnotation> = a_params
            .iter()
            .map(|p| {
                TypeWithAnnotation::new(
                    TypeSymbol::TypeParameter(p.clone()),
                    NullableAnnotation::NotAnnotated,
                )
            })
            .collect();
        Some(Arc::new(TypeSubstitution::new(b_params, &arguments)))
    }

    fn maybe_substitute(
        reference: &TypeWithAnnotation,
        substitution: &Option<Arc<TypeSubstitution>>,
    ) -> TypeWithAnnotation {
        match substitution {
            Some(map) => reference.substitute(map),
            None => reference.clone(),
        }
    }

    fn is_void(reference: &TypeWithAnnotation) -> bool {
        if reference.is_unset() {
            return false;
        }
        match reference.ty() {
            TypeSymbol::Named(t) => t.special_type() == Some(SpecialType::Void),
            _ => false,
        }
    }

    fn explicit_interface_sets_equal(a: &Member, b: &Member) -> bool {
        let a_set = a.explicit_interface_members();
        let b_set = b.explicit_interface_members();
        if a_set.len() != b_set.len() {
            return false;
        }
        // Order-independent: every implemented member on one side must be
        // the same symbol (by original definition) on the other.
        a_set.iter().all(|x| {
            let x_original = x.original_definition();
            b_set
                .iter()
                .any(|y| Member::ptr_eq(&x_original, &y.original_definition()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::symbols::{Member, RefKind};
    use crate::test::factories;

    #[test]
    fn test_kind_mismatch_is_false_not_fault() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));
        let method = factories::method(&class, "M", &[arg], factories::void_type(&corlib));
        let field = factories::field(&class, "M", factories::annotated(class.clone()));

        assert!(!MemberSignatureComparer::OVERRIDE.equals(
            &Member::Method(method),
            &Member::Field(field)
        ));
    }

    #[test]
    fn test_symmetry_across_policies() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));
        let m1 = Member::Method(factories::method(
            &class,
            "M",
            &[arg.clone()],
            factories::void_type(&corlib),
        ));
        let m2 = Member::Method(factories::method(
            &class,
            "M",
            &[arg.clone()],
            factories::void_type(&corlib),
        ));
        let m3 = Member::Method(factories::method(
            &class,
            "Other",
            &[arg],
            factories::void_type(&corlib),
        ));

        let policies = [
            MemberSignatureComparer::EXPLICIT_IMPL,
            MemberSignatureComparer::EXPLICIT_IMPL_LOOKUP,
            MemberSignatureComparer::IMPLICIT_IMPL,
            MemberSignatureComparer::IMPLICIT_IMPL_LOOSE,
            MemberSignatureComparer::DUPLICATE_SOURCE,
            MemberSignatureComparer::PARTIAL_METHOD,
            MemberSignatureComparer::PARTIAL_METHOD_STRICT,
            MemberSignatureComparer::INTERCEPTOR,
            MemberSignatureComparer::INTERCEPTOR_STRICT,
            MemberSignatureComparer::OVERRIDE,
            MemberSignatureComparer::OVERRIDE_EXACT_MODIFIERS,
            MemberSignatureComparer::ACCESSOR_OVERRIDE,
            MemberSignatureComparer::RUNTIME,
            MemberSignatureComparer::CREF,
        ];
        for policy in policies {
            assert_eq!(policy.equals(&m1, &m2), policy.equals(&m2, &m1));
            assert_eq!(policy.equals(&m1, &m3), policy.equals(&m3, &m1));
        }
    }

    #[test]
    fn test_equal_members_have_equal_hashes() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));
        let m1 = Member::Method(factories::method(
            &class,
            "M",
            &[arg.clone()],
            factories::void_type(&corlib),
        ));
        let m2 = Member::Method(factories::method(
            &class,
            "M",
            &[arg],
            factories::void_type(&corlib),
        ));

        let policy = MemberSignatureComparer::OVERRIDE;
        assert!(policy.equals(&m1, &m2));
        assert_eq!(policy.hash(&m1), policy.hash(&m2));
    }

    #[test]
    fn test_ref_kind_modes() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));

        let by_ref = Member::Method(factories::method_with_ref_kinds(
            &class,
            "M",
            &[(arg.clone(), RefKind::Ref)],
            factories::void_type(&corlib),
        ));
        let by_out = Member::Method(factories::method_with_ref_kinds(
            &class,
            "M",
            &[(arg.clone(), RefKind::Out)],
            factories::void_type(&corlib),
        ));
        let by_value = Member::Method(factories::method_with_ref_kinds(
            &class,
            "M",
            &[(arg, RefKind::None)],
            factories::void_type(&corlib),
        ));

        // Exact mode distinguishes ref from out
        assert!(!MemberSignatureComparer::OVERRIDE.equals(&by_ref, &by_out));
        // The runtime cannot tell ref from out
        assert!(MemberSignatureComparer::RUNTIME.equals(&by_ref, &by_out));
        // But it can tell by-ref from by-value
        assert!(!MemberSignatureComparer::RUNTIME.equals(&by_ref, &by_value));
    }

    #[test]
    fn test_ref_readonly_matches_in() {
        assert!(ref_kinds_match(
            RefKind::RefReadOnly,
            RefKind::In,
            RefKindCompareMode::AllowRefReadOnlyVsIn
        ));
        assert!(!ref_kinds_match(
            RefKind::RefReadOnly,
            RefKind::In,
            RefKindCompareMode::Exact
        ));
    }

    #[test]
    fn test_generic_methods_compare_positionally() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");

        // M<TA>(TA) and M<TB>(TB) have the same signature positionally
        let m1 = factories::generic_method_identity(&class, "M", "TA", &corlib);
        let m2 = factories::generic_method_identity(&class, "M", "TB", &corlib);

        assert!(MemberSignatureComparer::OVERRIDE
            .equals(&Member::Method(m1.clone()), &Member::Method(m2.clone())));
        assert_eq!(
            MemberSignatureComparer::OVERRIDE.hash(&Member::Method(m1)),
            MemberSignatureComparer::OVERRIDE.hash(&Member::Method(m2))
        );
    }

    #[test]
    fn test_name_ignored_by_explicit_impl_policy() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));
        let m1 = Member::Method(factories::method(
            &class,
            "Alpha",
            &[arg.clone()],
            factories::void_type(&corlib),
        ));
        let m2 = Member::Method(factories::method(
            &class,
            "Beta",
            &[arg],
            factories::void_type(&corlib),
        ));

        assert!(MemberSignatureComparer::EXPLICIT_IMPL.equals(&m1, &m2));
        assert!(!MemberSignatureComparer::OVERRIDE.equals(&m1, &m2));
    }

    #[test]
    fn test_vararg_always_significant() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));
        let plain = Member::Method(factories::method(
            &class,
            "M",
            &[arg.clone()],
            factories::void_type(&corlib),
        ));
        let vararg = Member::Method(factories::vararg_method(
            &class,
            "M",
            &[arg],
            factories::void_type(&corlib),
        ));

        // CREF ignores the calling convention, but never vararg-ness
        assert!(!MemberSignatureComparer::CREF.equals(&plain, &vararg));
    }
}
