//! Annotated type references: a type identity paired with nullability state.
//!
//! A [`TypeWithAnnotation`] represents "a type, as referenced at this
//! particular position", distinct from the type's own identity. The same
//! [`NamedTypeSymbol`](crate::semantics::symbols::NamedTypeSymbol) may be
//! referenced as nullable in one signature and non-nullable in another; the
//! annotation travels with the reference, never with the type.
//!
//! # Annotation States
//!
//! The annotation is three-state, not boolean: [`NullableAnnotation::Oblivious`]
//! captures "no information" (legacy code compiled without nullability
//! tracking) and interacts with merging and comparison differently from an
//! explicit [`NullableAnnotation::NotAnnotated`].
//!
//! # Lazy Resolution
//!
//! Annotating a bare (unconstrained) generic type parameter poses a chicken
//! and egg problem: whether `T?` means "wrap in `Nullable<T>`" or "mark the
//! reference type as nullable" depends on the parameter's constraints, which
//! may still be under computation when the reference is created. The lazy
//! variant stores the un-annotated parameter and defers the decision to the
//! first operation that truly needs the concrete type; resolution executes at
//! most once and is guarded by
//! [`TypeWithAnnotation::is_safe_to_resolve`] to avoid re-entering
//! override checking for the declaring method.
//!
//! # Immutability
//!
//! All operations (`as_annotated`, `substitute`, `merge_equivalent`, ...)
//! return new references; a `TypeWithAnnotation` never changes after
//! creation, so references can be freely shared across threads.

mod lazy;

pub use lazy::LazyNullableTypeParameter;

use std::sync::Arc;

use crate::semantics::symbols::{
    NamedTypeRc, TypeCompareKind, TypeParameterRc, TypeSubstitution, TypeSymbol, Variance,
};

/// Three-state nullability annotation attached to a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullableAnnotation {
    /// No nullability information (legacy code, unannotated contexts)
    Oblivious,
    /// Explicitly not annotated; the reference is non-nullable
    NotAnnotated,
    /// Explicitly annotated; the reference is nullable
    Annotated,
}

impl NullableAnnotation {
    /// Annotation merge used during substitution.
    ///
    /// If either side carries `Annotated` the result is `Annotated`; an
    /// oblivious original defers to the substituted side, and vice versa.
    #[must_use]
    pub fn merge_for_substitution(original: Self, substituted: Self) -> Self {
        match (original, substituted) {
            (NullableAnnotation::Annotated, _) | (_, NullableAnnotation::Annotated) => {
                NullableAnnotation::Annotated
            }
            (NullableAnnotation::Oblivious, other) => other,
            (other, NullableAnnotation::Oblivious) => other,
            _ => NullableAnnotation::NotAnnotated,
        }
    }
}

/// A single custom modifier attached to a type reference.
///
/// Custom modifiers carry metadata-level information (e.g. `volatile`,
/// calling-convention markers) that participates in exact signature
/// comparison but is ignored by most language-level policies.
#[derive(Debug, Clone)]
pub struct CustomModifier {
    /// Required (`modreq`) vs optional (`modopt`) modifier
    pub required: bool,
    /// The modifier type itself
    pub modifier: NamedTypeRc,
}

impl CustomModifier {
    /// Structural equality of two modifiers.
    #[must_use]
    pub fn equals(&self, other: &CustomModifier) -> bool {
        self.required == other.required
            && TypeSymbol::Named(self.modifier.clone()).equals(
                &TypeSymbol::Named(other.modifier.clone()),
                TypeCompareKind::CONSIDER_EVERYTHING,
            )
    }

    /// Structural equality of two ordered modifier lists.
    #[must_use]
    pub fn lists_equal(a: &[CustomModifier], b: &[CustomModifier]) -> bool {
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
    }
}

/// Result of merging two equivalent annotated references.
pub struct MergeOutcome {
    /// The merged reference
    pub merged: TypeWithAnnotation,
    /// True when an invariant-position annotation mismatch was observed.
    ///
    /// The mismatch is reported to the caller as a flag, never thrown; the
    /// merged reference is still usable.
    pub conflict: bool,
}

#[derive(Debug)]
struct EagerRepr {
    ty: TypeSymbol,
    annotation: NullableAnnotation,
    modifiers: Vec<CustomModifier>,
}

#[derive(Debug, Clone)]
enum Repr {
    /// The default-value sentinel; carries no type
    Unset,
    Eager(Arc<EagerRepr>),
    Lazy(Arc<LazyNullableTypeParameter>),
}

/// An immutable type reference with nullability annotation and custom modifiers.
///
/// See the [module documentation](self) for the identity-vs-reference
/// distinction and the lazy resolution protocol.
#[derive(Debug, Clone)]
pub struct TypeWithAnnotation {
    repr: Repr,
}

impl TypeWithAnnotation {
    /// The default-value sentinel: a reference that does not yet denote a type.
    ///
    /// Passing an unset reference where a real type argument is required is
    /// rejected with [`Error::InvalidArgument`](crate::Error::InvalidArgument).
    #[must_use]
    pub fn unset() -> Self {
        Self { repr: Repr::Unset }
    }

    /// Create a reference from a type identity and an explicit annotation.
    ///
    /// Normalizes: when the underlying type is the value-type nullable
    /// wrapper, the annotation is forced to `Annotated` - an un-annotated
    /// `Nullable<T>` cannot exist at the top level.
    #[must_use]
    pub fn new(ty: TypeSymbol, annotation: NullableAnnotation) -> Self {
        let annotation = if ty.is_nullable_wrapper() {
            NullableAnnotation::Annotated
        } else {
            annotation
        };
        Self {
            repr: Repr::Eager(Arc::new(EagerRepr {
                ty,
                annotation,
                modifiers: Vec::new(),
            })),
        }
    }

    /// Create a reference from a syntactic position.
    ///
    /// `is_annotated` reflects whether the position carried a nullable
    /// marker; `non_null_context` reflects whether the surrounding scope
    /// treats reference types as non-null by default. An unmarked position
    /// in a legacy scope yields `Oblivious`.
    #[must_use]
    pub fn from_position(ty: TypeSymbol, is_annotated: bool, non_null_context: bool) -> Self {
        let annotation = if is_annotated {
            NullableAnnotation::Annotated
        } else if non_null_context {
            NullableAnnotation::NotAnnotated
        } else {
            NullableAnnotation::Oblivious
        };
        Self::new(ty, annotation)
    }

    /// Create a lazily-resolved annotated reference to an unconstrained
    /// generic type parameter.
    ///
    /// The decision between wrapping in `Nullable<T>` and marking a
    /// reference type nullable is deferred until the parameter's constraints
    /// are known; `nullable_definition` is the wrapper definition to use if
    /// the value-type path is taken.
    #[must_use]
    pub fn lazy_nullable(type_parameter: TypeParameterRc, nullable_definition: NamedTypeRc) -> Self {
        Self {
            repr: Repr::Lazy(Arc::new(LazyNullableTypeParameter::new(
                type_parameter,
                nullable_definition,
            ))),
        }
    }

    pub(crate) fn with_parts(
        ty: TypeSymbol,
        annotation: NullableAnnotation,
        modifiers: Vec<CustomModifier>,
    ) -> Self {
        let annotation = if ty.is_nullable_wrapper() {
            NullableAnnotation::Annotated
        } else {
            annotation
        };
        Self {
            repr: Repr::Eager(Arc::new(EagerRepr {
                ty,
                annotation,
                modifiers,
            })),
        }
    }

    /// True for the default-value sentinel.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self.repr, Repr::Unset)
    }

    /// True when this reference defers nullable resolution.
    #[must_use]
    pub fn is_lazy(&self) -> bool {
        matches!(self.repr, Repr::Lazy(_))
    }

    /// The underlying type identity.
    ///
    /// For an unresolved lazy reference this is the bare type parameter; the
    /// concrete wrapped form only becomes visible once resolution has run.
    ///
    /// # Panics
    /// Faults on the unset sentinel - callers must check
    /// [`is_unset`](Self::is_unset) first; reaching this state is a missing
    /// validation in this crate's own logic.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        match &self.repr {
            Repr::Unset => unreachable!("underlying type requested from an unset reference"),
            Repr::Eager(inner) => inner.ty.clone(),
            Repr::Lazy(lazy) => {
                if let Some(resolved) = lazy.try_resolved() {
                    return resolved.ty();
                }
                if lazy.is_safe_to_resolve() {
                    lazy.resolve().ty()
                } else {
                    TypeSymbol::TypeParameter(lazy.type_parameter().clone())
                }
            }
        }
    }

    /// The nullability annotation of this reference.
    #[must_use]
    pub fn annotation(&self) -> NullableAnnotation {
        match &self.repr {
            Repr::Unset => NullableAnnotation::Oblivious,
            Repr::Eager(inner) => inner.annotation,
            Repr::Lazy(lazy) => match lazy.try_resolved() {
                Some(resolved) => resolved.annotation(),
                None => NullableAnnotation::Annotated,
            },
        }
    }

    /// The ordered custom modifier list of this reference.
    #[must_use]
    pub fn custom_modifiers(&self) -> Vec<CustomModifier> {
        match &self.repr {
            Repr::Eager(inner) => inner.modifiers.clone(),
            _ => Vec::new(),
        }
    }

    /// Whether forcing lazy resolution is currently allowed.
    ///
    /// Always true for eager references. For a lazy reference this is false
    /// while the declaring method's override/explicit-implementation
    /// resolution is still in progress - forcing at that point would recurse
    /// into the very computation that produces the constraints.
    #[must_use]
    pub fn is_safe_to_resolve(&self) -> bool {
        match &self.repr {
            Repr::Lazy(lazy) => lazy.try_resolved().is_some() || lazy.is_safe_to_resolve(),
            _ => true,
        }
    }

    /// Force lazy resolution, returning the concrete reference.
    ///
    /// Idempotent: the first caller resolves and memoizes; later callers get
    /// the memoized result. Eager references return themselves.
    #[must_use]
    pub fn resolved(&self) -> TypeWithAnnotation {
        match &self.repr {
            Repr::Lazy(lazy) => lazy.resolve(),
            _ => self.clone(),
        }
    }

    /// Produce a reference to the same type with a nullable annotation.
    ///
    /// No-op when already annotated, or when the type is a value type other
    /// than the nullable wrapper (a plain struct reference cannot be made
    /// nullable by annotation alone).
    #[must_use]
    pub fn as_annotated(&self) -> TypeWithAnnotation {
        match &self.repr {
            Repr::Unset => self.clone(),
            Repr::Lazy(_) => self.clone(),
            Repr::Eager(inner) => {
                if inner.annotation == NullableAnnotation::Annotated {
                    return self.clone();
                }
                if inner.ty.is_value_type() && !inner.ty.is_nullable_wrapper() {
                    return self.clone();
                }
                Self::with_parts(
                    inner.ty.clone(),
                    NullableAnnotation::Annotated,
                    inner.modifiers.clone(),
                )
            }
        }
    }

    /// Produce a reference to the same type without a nullable annotation.
    ///
    /// No-op when already in that state or when the type is the nullable
    /// wrapper, which cannot exist un-annotated.
    #[must_use]
    pub fn as_not_annotated(&self) -> TypeWithAnnotation {
        match &self.repr {
            Repr::Unset => self.clone(),
            Repr::Lazy(lazy) => match lazy.try_resolved() {
                Some(resolved) => resolved.as_not_annotated(),
                None => Self::with_parts(
                    TypeSymbol::TypeParameter(lazy.type_parameter().clone()),
                    NullableAnnotation::NotAnnotated,
                    Vec::new(),
                ),
            },
            Repr::Eager(inner) => {
                if inner.annotation == NullableAnnotation::NotAnnotated
                    || inner.ty.is_nullable_wrapper()
                {
                    return self.clone();
                }
                Self::with_parts(
                    inner.ty.clone(),
                    NullableAnnotation::NotAnnotated,
                    inner.modifiers.clone(),
                )
            }
        }
    }

    /// Replace the custom modifier list, keeping type and annotation.
    #[must_use]
    pub fn with_modifiers(&self, modifiers: Vec<CustomModifier>) -> TypeWithAnnotation {
        match &self.repr {
            Repr::Unset => self.clone(),
            Repr::Lazy(lazy) => {
                let base = if lazy.is_safe_to_resolve() {
                    lazy.resolve()
                } else {
                    Self::with_parts(
                        TypeSymbol::TypeParameter(lazy.type_parameter().clone()),
                        NullableAnnotation::Annotated,
                        Vec::new(),
                    )
                };
                base.with_modifiers(modifiers)
            }
            Repr::Eager(inner) => {
                Self::with_parts(inner.ty.clone(), inner.annotation, modifiers)
            }
        }
    }

    /// Apply a type-parameter substitution to this reference.
    ///
    /// Annotations merge: if either the original reference or the
    /// substituted-in argument is annotated, the result is annotated; an
    /// oblivious original defers to the argument's annotation.
    #[must_use]
    pub fn substitute(&self, substitution: &TypeSubstitution) -> TypeWithAnnotation {
        match &self.repr {
            Repr::Unset => self.clone(),
            Repr::Lazy(lazy) => {
                if let Some(resolved) = lazy.try_resolved() {
                    return resolved.substitute(substitution);
                }
                match substitution.lookup(lazy.type_parameter()) {
                    Some(replacement) => lazy.apply_to(&replacement),
                    None => self.clone(),
                }
            }
            Repr::Eager(inner) => match &inner.ty {
                TypeSymbol::TypeParameter(p) => match substitution.lookup(p) {
                    Some(replacement) => {
                        let annotation = NullableAnnotation::merge_for_substitution(
                            inner.annotation,
                            replacement.annotation(),
                        );
                        let mut modifiers = inner.modifiers.clone();
                        modifiers.extend(replacement.custom_modifiers());
                        Self::with_parts(replacement.ty(), annotation, modifiers)
                    }
                    None => self.clone(),
                },
                TypeSymbol::Named(t) => {
                    let substituted = substitution.substitute_named(t);
                    if Arc::ptr_eq(&substituted, t) {
                        self.clone()
                    } else {
                        Self::with_parts(
                            TypeSymbol::Named(substituted),
                            inner.annotation,
                            inner.modifiers.clone(),
                        )
                    }
                }
                TypeSymbol::Array(a) => {
                    let element = a.element.substitute(substitution);
                    Self::with_parts(
                        TypeSymbol::Array(Arc::new(crate::semantics::symbols::ArrayType {
                            element,
                            rank: a.rank,
                        })),
                        inner.annotation,
                        inner.modifiers.clone(),
                    )
                }
                TypeSymbol::Pointer(p) => {
                    let pointee = p.pointee.substitute(substitution);
                    Self::with_parts(
                        TypeSymbol::Pointer(Arc::new(crate::semantics::symbols::PointerType {
                            pointee,
                        })),
                        inner.annotation,
                        inner.modifiers.clone(),
                    )
                }
                TypeSymbol::Error(_) => self.clone(),
            },
        }
    }

    /// Merge two references believed to denote the same type.
    ///
    /// Used to reconcile the results of independent analysis paths (e.g. the
    /// two branches of a conditional). In covariant positions an annotated
    /// side wins; in contravariant positions a not-annotated side wins; in
    /// invariant positions a mismatch between explicit annotations is
    /// reported through [`MergeOutcome::conflict`], never thrown. Oblivious
    /// always defers to the informative side.
    #[must_use]
    pub fn merge_equivalent(&self, other: &TypeWithAnnotation, variance: Variance) -> MergeOutcome {
        let a = self.annotation();
        let b = other.annotation();

        let (annotation, mut conflict) = match variance {
            Variance::Covariant => (
                match (a, b) {
                    (NullableAnnotation::Annotated, _) | (_, NullableAnnotation::Annotated) => {
                        NullableAnnotation::Annotated
                    }
                    (NullableAnnotation::NotAnnotated, _)
                    | (_, NullableAnnotation::NotAnnotated) => NullableAnnotation::NotAnnotated,
                    _ => NullableAnnotation::Oblivious,
                },
                false,
            ),
            Variance::Contravariant => (
                match (a, b) {
                    (NullableAnnotation::NotAnnotated, _)
                    | (_, NullableAnnotation::NotAnnotated) => NullableAnnotation::NotAnnotated,
                    (NullableAnnotation::Annotated, _) | (_, NullableAnnotation::Annotated) => {
                        NullableAnnotation::Annotated
                    }
                    _ => NullableAnnotation::Oblivious,
                },
                false,
            ),
            Variance::Invariant => match (a, b) {
                _ if a == b => (a, false),
                (NullableAnnotation::Oblivious, other) => (other, false),
                (other, NullableAnnotation::Oblivious) => (other, false),
                // Explicit disagreement in an invariant position: surface the
                // conflict and carry the non-nullable view forward.
                _ => (NullableAnnotation::NotAnnotated, true),
            },
        };

        let merged_ty = match (self.ty(), other.ty()) {
            (TypeSymbol::Named(x), TypeSymbol::Named(y))
                if !x.type_arguments().is_empty() && x.type_arguments().len() == y.type_arguments().len() =>
            {
                let definition = x.original_definition();
                let params = definition.type_parameters().to_vec();
                let mut merged_args = Vec::with_capacity(x.type_arguments().len());
                for (i, (xa, ya)) in x
                    .type_arguments()
                    .iter()
                    .zip(y.type_arguments().iter())
                    .enumerate()
                {
                    let v = params.get(i).map_or(Variance::Invariant, |p| p.variance());
                    let outcome = xa.merge_equivalent(ya, v);
                    conflict |= outcome.conflict;
                    merged_args.push(outcome.merged);
                }
                match definition.construct(merged_args) {
                    Ok(t) => TypeSymbol::Named(t),
                    Err(_) => self.ty(),
                }
            }
            _ => self.ty(),
        };

        MergeOutcome {
            merged: Self::with_parts(merged_ty, annotation, self.custom_modifiers()),
            conflict,
        }
    }

    /// Structural equality under the given comparison strictness.
    #[must_use]
    pub fn equals(&self, other: &TypeWithAnnotation, compare: TypeCompareKind) -> bool {
        if self.is_unset() || other.is_unset() {
            return self.is_unset() && other.is_unset();
        }

        if !self.ty().equals(&other.ty(), compare) {
            return false;
        }

        if !compare.contains(TypeCompareKind::IGNORE_CUSTOM_MODIFIERS)
            && !CustomModifier::lists_equal(&self.custom_modifiers(), &other.custom_modifiers())
        {
            return false;
        }

        if compare.contains(TypeCompareKind::IGNORE_NULLABILITY) {
            return true;
        }

        let a = self.annotation();
        let b = other.annotation();
        if a == b {
            return true;
        }
        compare.contains(TypeCompareKind::OBLIVIOUS_MATCHES_ANY)
            && (a == NullableAnnotation::Oblivious || b == NullableAnnotation::Oblivious)
    }

    /// Folds a hash consistent with [`equals`](Self::equals) under every
    /// comparison strictness (only the underlying type shape is folded).
    pub fn hash_into<H: std::hash::Hasher>(&self, state: &mut H) {
        if !self.is_unset() {
            self.ty().hash_into(state);
        }
    }

    /// Display name for diagnostics; annotated references carry a `?` suffix.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.is_unset() {
            return "<unset>".to_string();
        }
        let ty = self.ty();
        let base = ty.display_name();
        if self.annotation() == NullableAnnotation::Annotated && !ty.is_nullable_wrapper() {
            format!("{}?", base)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories;

    #[test]
    fn test_annotation_merge_for_substitution() {
        use NullableAnnotation::*;
        assert_eq!(NullableAnnotation::merge_for_substitution(Annotated, NotAnnotated), Annotated);
        assert_eq!(NullableAnnotation::merge_for_substitution(NotAnnotated, Annotated), Annotated);
        assert_eq!(NullableAnnotation::merge_for_substitution(Oblivious, NotAnnotated), NotAnnotated);
        assert_eq!(NullableAnnotation::merge_for_substitution(NotAnnotated, Oblivious), NotAnnotated);
        assert_eq!(NullableAnnotation::merge_for_substitution(Oblivious, Oblivious), Oblivious);
    }

    #[test]
    fn test_as_annotated_round_trip() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let reference = TypeWithAnnotation::new(
            TypeSymbol::Named(class),
            NullableAnnotation::NotAnnotated,
        );

        let annotated = reference.as_annotated();
        assert_eq!(annotated.annotation(), NullableAnnotation::Annotated);

        let back = annotated.as_not_annotated();
        assert_eq!(back.annotation(), NullableAnnotation::NotAnnotated);
    }

    #[test]
    fn test_as_annotated_value_type_is_noop() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let s = factories::struct_in(&corlib, "NS", "S");
        let reference =
            TypeWithAnnotation::new(TypeSymbol::Named(s), NullableAnnotation::NotAnnotated);
        let annotated = reference.as_annotated();
        assert_eq!(annotated.annotation(), NullableAnnotation::NotAnnotated);
    }

    #[test]
    fn test_nullable_wrapper_forces_annotated() {
        let (compilation, _) = factories::compilation_with_corlib("lib");
        let nullable = factories::nullable_of_int(&compilation);
        let reference =
            TypeWithAnnotation::new(nullable, NullableAnnotation::NotAnnotated);
        assert_eq!(reference.annotation(), NullableAnnotation::Annotated);
    }

    #[test]
    fn test_merge_invariant_never_invents_annotated() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let a = TypeWithAnnotation::new(
            TypeSymbol::Named(class.clone()),
            NullableAnnotation::Oblivious,
        );
        let b = TypeWithAnnotation::new(
            TypeSymbol::Named(class),
            NullableAnnotation::NotAnnotated,
        );

        let outcome = a.merge_equivalent(&b, Variance::Invariant);
        assert!(!outcome.conflict);
        assert_ne!(outcome.merged.annotation(), NullableAnnotation::Annotated);
    }

    #[test]
    fn test_merge_invariant_conflict_reported() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let a = TypeWithAnnotation::new(
            TypeSymbol::Named(class.clone()),
            NullableAnnotation::Annotated,
        );
        let b = TypeWithAnnotation::new(
            TypeSymbol::Named(class),
            NullableAnnotation::NotAnnotated,
        );

        let outcome = a.merge_equivalent(&b, Variance::Invariant);
        assert!(outcome.conflict);
    }

    #[test]
    fn test_merge_covariant_annotated_wins() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let a = TypeWithAnnotation::new(
            TypeSymbol::Named(class.clone()),
            NullableAnnotation::Annotated,
        );
        let b = TypeWithAnnotation::new(
            TypeSymbol::Named(class),
            NullableAnnotation::NotAnnotated,
        );

        let outcome = a.merge_equivalent(&b, Variance::Covariant);
        assert!(!outcome.conflict);
        assert_eq!(outcome.merged.annotation(), NullableAnnotation::Annotated);
    }

    #[test]
    fn test_equals_oblivious_matches_any() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::class_in(&corlib, "NS", "C");
        let oblivious = TypeWithAnnotation::new(
            TypeSymbol::Named(class.clone()),
            NullableAnnotation::Oblivious,
        );
        let annotated = TypeWithAnnotation::new(
            TypeSymbol::Named(class),
            NullableAnnotation::Annotated,
        );

        assert!(!oblivious.equals(&annotated, TypeCompareKind::CONSIDER_EVERYTHING));
        assert!(oblivious.equals(&annotated, TypeCompareKind::OBLIVIOUS_MATCHES_ANY));
        assert!(oblivious.equals(&annotated, TypeCompareKind::IGNORE_NULLABILITY));
    }
}
