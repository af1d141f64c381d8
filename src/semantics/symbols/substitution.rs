//! Type-parameter to type-argument substitution maps.

use std::sync::Arc;

use crate::semantics::annotations::TypeWithAnnotation;
use crate::semantics::symbols::{NamedTypeRc, TypeParameterRc};

/// An ordered type-parameter substitution.
///
/// Maps each type parameter of a generic definition to the annotated type
/// argument supplied for it. Lookup is by symbol identity, so a substitution
/// built for one definition never accidentally applies to another
/// definition's same-ordinal parameters.
///
/// Substitutions compose through
/// [`TypeWithAnnotation::substitute`](crate::semantics::annotations::TypeWithAnnotation::substitute):
/// applying a map to an already-constructed type re-substitutes its type
/// arguments recursively.
#[derive(Debug)]
pub struct TypeSubstitution {
    pairs: Vec<(TypeParameterRc, TypeWithAnnotation)>,
}

impl TypeSubstitution {
    /// Build a substitution from explicit parameter/argument pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(TypeParameterRc, TypeWithAnnotation)>) -> Self {
        Self { pairs }
    }

    /// Build the substitution mapping `parameters[i]` to `arguments[i]`.
    ///
    /// Callers validate lengths; mismatched inputs are truncated to the
    /// shorter list.
    #[must_use]
    pub fn new(parameters: &[TypeParameterRc], arguments: &[TypeWithAnnotation]) -> Self {
        Self {
            pairs: parameters
                .iter()
                .cloned()
                .zip(arguments.iter().cloned())
                .collect(),
        }
    }

    /// Number of mapped parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no parameters are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The argument substituted for `parameter`, if mapped.
    ///
    /// Identity lookup: parameter lists are small, so a linear scan over
    /// pointer comparisons beats hashing here.
    #[must_use]
    pub fn lookup(&self, parameter: &TypeParameterRc) -> Option<TypeWithAnnotation> {
        self.pairs
            .iter()
            .find(|(p, _)| Arc::ptr_eq(p, parameter))
            .map(|(_, a)| a.clone())
    }

    /// The mapped pairs, in parameter order.
    #[must_use]
    pub fn pairs(&self) -> &[(TypeParameterRc, TypeWithAnnotation)] {
        &self.pairs
    }

    /// Apply this substitution to a named type.
    ///
    /// A constructed type has its arguments re-substituted; a generic
    /// definition referenced through its own parameters is reconstructed
    /// over the mapped arguments. Types untouched by the map are returned
    /// as the same symbol instance.
    #[must_use]
    pub fn substitute_named(&self, ty: &NamedTypeRc) -> NamedTypeRc {
        let args = ty.type_arguments();
        if args.is_empty() {
            return ty.clone();
        }

        let substituted: Vec<TypeWithAnnotation> =
            args.iter().map(|a| a.substitute(self)).collect();

        // Nothing changed: preserve the existing symbol instance so identity
        // caching keeps working.
        let unchanged = args
            .iter()
            .zip(substituted.iter())
            .all(|(old, new)| old.equals(new, crate::semantics::symbols::TypeCompareKind::CONSIDER_EVERYTHING));
        if unchanged {
            return ty.clone();
        }

        match ty.original_definition().construct(substituted) {
            Ok(constructed) => constructed,
            // Arity cannot change under substitution; a failure here would be
            // a logic error in this crate.
            Err(_) => unreachable!("substitution changed the arity of a constructed type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::annotations::NullableAnnotation;
    use crate::semantics::symbols::{TypeCompareKind, TypeSymbol};
    use crate::test::factories;

    #[test]
    fn test_lookup_by_identity() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let g1 = factories::generic_class_in(&corlib, "NS", "G1", 1);
        let g2 = factories::generic_class_in(&corlib, "NS", "G2", 1);
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));

        let substitution = TypeSubstitution::new(g1.type_parameters(), &[arg.clone()]);

        assert!(substitution.lookup(&g1.type_parameters()[0]).is_some());
        // Same ordinal on a different definition does not match
        assert!(substitution.lookup(&g2.type_parameters()[0]).is_none());
    }

    #[test]
    fn test_substitute_named_recurses_into_arguments() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let outer = factories::generic_class_in(&corlib, "NS", "Outer", 1);
        let inner = factories::generic_class_in(&corlib, "NS", "Inner", 1);
        let concrete = factories::class_in(&corlib, "NS", "Concrete");

        // Outer<Inner<T>> where T is Outer's own parameter
        let t_param = TypeWithAnnotation::new(
            TypeSymbol::TypeParameter(outer.type_parameters()[0].clone()),
            NullableAnnotation::NotAnnotated,
        );
        let inner_of_t = inner.construct(vec![t_param]).unwrap();
        let outer_of_inner = outer
            .construct(vec![factories::annotated(inner_of_t)])
            .unwrap();

        let substitution = TypeSubstitution::new(
            outer.type_parameters(),
            &[factories::annotated(concrete.clone())],
        );
        let result = substitution.substitute_named(&outer_of_inner);

        // Result is Outer<Inner<Concrete>>
        let arg = &result.type_arguments()[0];
        match arg.ty() {
            TypeSymbol::Named(inner_constructed) => {
                let nested = &inner_constructed.type_arguments()[0];
                assert!(nested.ty().equals(
                    &TypeSymbol::Named(concrete),
                    TypeCompareKind::CONSIDER_EVERYTHING
                ));
            }
            other => panic!("expected constructed Inner, got {}", other.display_name()),
        }
    }
}
