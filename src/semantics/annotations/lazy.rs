//! Deferred resolution for annotated references to unconstrained type parameters.

use std::sync::OnceLock;

use crate::semantics::annotations::{NullableAnnotation, TypeWithAnnotation};
use crate::semantics::symbols::{
    NamedTypeRc, TypeParameterOwner, TypeParameterRc, TypeSymbol,
};

/// The memoizing resolution cell behind a lazy annotated type-parameter reference.
///
/// Stores the un-annotated type parameter plus the nullable-wrapper
/// definition needed for the value-type path, and resolves on first real
/// demand. Resolution executes at most once: the cell transitions from
/// unresolved to resolved exactly one time and the result never changes
/// afterwards.
///
/// # Resolution Safety
///
/// Resolution consults the type parameter's constraints. While the declaring
/// method's override or explicit-interface-implementation resolution is in
/// progress those constraints may themselves be under computation, and
/// forcing resolution would recurse into that computation. Callers observe
/// [`is_safe_to_resolve`](Self::is_safe_to_resolve) before forcing; unsafe
/// callers operate on the unresolved type-parameter view instead.
#[derive(Debug)]
pub struct LazyNullableTypeParameter {
    type_parameter: TypeParameterRc,
    nullable_definition: NamedTypeRc,
    resolved: OnceLock<TypeWithAnnotation>,
}

impl LazyNullableTypeParameter {
    pub(crate) fn new(type_parameter: TypeParameterRc, nullable_definition: NamedTypeRc) -> Self {
        Self {
            type_parameter,
            nullable_definition,
            resolved: OnceLock::new(),
        }
    }

    /// The un-annotated type parameter this reference annotates.
    #[must_use]
    pub fn type_parameter(&self) -> &TypeParameterRc {
        &self.type_parameter
    }

    /// The already-memoized resolution, if any.
    #[must_use]
    pub fn try_resolved(&self) -> Option<TypeWithAnnotation> {
        self.resolved.get().cloned()
    }

    /// Whether forcing resolution is currently allowed.
    ///
    /// True unless the declaring method is an unresolved override or explicit
    /// interface implementation still being checked.
    #[must_use]
    pub fn is_safe_to_resolve(&self) -> bool {
        match self.type_parameter.owner() {
            TypeParameterOwner::Method(method) => match method.upgrade() {
                Some(method) => !method.override_resolution_active(),
                None => true,
            },
            TypeParameterOwner::Type(_) => true,
        }
    }

    /// Resolve the annotated reference, memoizing the result.
    ///
    /// A value-type-constrained parameter resolves to the nullable wrapper
    /// constructed over the parameter; anything else resolves to the
    /// parameter marked as a nullable reference.
    #[must_use]
    pub fn resolve(&self) -> TypeWithAnnotation {
        self.resolved
            .get_or_init(|| {
                let param = TypeSymbol::TypeParameter(self.type_parameter.clone());
                if self.type_parameter.is_value_type() {
                    let argument =
                        TypeWithAnnotation::new(param.clone(), NullableAnnotation::NotAnnotated);
                    match self.nullable_definition.construct(vec![argument]) {
                        Ok(wrapped) => TypeWithAnnotation::new(
                            TypeSymbol::Named(wrapped),
                            NullableAnnotation::Annotated,
                        ),
                        // A malformed wrapper definition degrades to the
                        // reference-annotation view rather than faulting.
                        Err(_) => TypeWithAnnotation::new(param, NullableAnnotation::Annotated),
                    }
                } else {
                    TypeWithAnnotation::new(param, NullableAnnotation::Annotated)
                }
            })
            .clone()
    }

    /// Apply the deferred decision to a concrete replacement type.
    ///
    /// Used when substitution replaces the lazy parameter before resolution
    /// ran: a value-type replacement takes the wrapping path, anything else
    /// takes the annotation path.
    #[must_use]
    pub(crate) fn apply_to(&self, replacement: &TypeWithAnnotation) -> TypeWithAnnotation {
        let ty = replacement.ty();
        if ty.is_value_type() && !ty.is_nullable_wrapper() {
            let argument = replacement.as_not_annotated();
            match self.nullable_definition.construct(vec![argument]) {
                Ok(wrapped) => TypeWithAnnotation::new(
                    TypeSymbol::Named(wrapped),
                    NullableAnnotation::Annotated,
                ),
                Err(_) => replacement.as_annotated(),
            }
        } else {
            replacement.as_annotated()
        }
    }
}
