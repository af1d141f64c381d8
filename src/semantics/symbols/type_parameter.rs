//! Generic type parameter symbols and their lazily-published constraints.

use std::sync::{OnceLock, Weak};

use crate::semantics::annotations::TypeWithAnnotation;
use crate::semantics::symbols::{MethodSymbol, NamedTypeSymbol, SymbolKind, Variance};

/// The declaring entity of a type parameter.
#[derive(Debug, Clone)]
pub enum TypeParameterOwner {
    /// Declared on a named type
    Type(Weak<NamedTypeSymbol>),
    /// Declared on a method
    Method(Weak<MethodSymbol>),
}

/// The resolved constraint set of a type parameter.
///
/// Constraints are computed by the declaration binder after the parameter
/// symbol exists (constraint types can mention the parameter itself), so
/// they live behind a publish-once cell on the symbol.
#[derive(Debug)]
pub struct TypeParameterConstraints {
    /// Explicit constraint types (`where T : SomeType`)
    pub constraint_types: Vec<TypeWithAnnotation>,
    /// `where T : struct`
    pub has_value_type_constraint: bool,
    /// `where T : class`
    pub has_reference_type_constraint: bool,
    /// `where T : new()`
    pub has_constructor_constraint: bool,
}

/// A generic type parameter declared on a type or method.
///
/// Parameters are compared positionally in signature comparison (ordinal
/// against ordinal under substitution) and by identity everywhere else.
#[derive(Debug)]
pub struct TypeParameterSymbol {
    name: String,
    ordinal: u32,
    variance: Variance,
    owner: TypeParameterOwner,
    constraints: OnceLock<TypeParameterConstraints>,
}

impl TypeParameterSymbol {
    /// Create a new type parameter.
    ///
    /// # Arguments
    /// * `name` - Declared name ("T", "TKey", ...)
    /// * `ordinal` - Zero-based position in the owner's parameter list
    /// * `variance` - Declared variance; `Invariant` for classes and methods
    /// * `owner` - The declaring type or method
    pub fn new(
        name: impl Into<String>,
        ordinal: u32,
        variance: Variance,
        owner: TypeParameterOwner,
    ) -> Self {
        Self {
            name: name.into(),
            ordinal,
            variance,
            owner,
            constraints: OnceLock::new(),
        }
    }

    /// The declared name of this parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind (always [`SymbolKind::TypeParameter`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::TypeParameter
    }

    /// Zero-based position in the owner's type parameter list.
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Declared variance of this parameter.
    #[must_use]
    pub fn variance(&self) -> Variance {
        self.variance
    }

    /// The declaring type or method.
    #[must_use]
    pub fn owner(&self) -> &TypeParameterOwner {
        &self.owner
    }

    /// Publish the resolved constraint set. Idempotent; the first writer wins.
    pub fn set_constraints(&self, constraints: TypeParameterConstraints) {
        let _ = self.constraints.set(constraints);
    }

    /// The resolved constraint set, if published yet.
    #[must_use]
    pub fn constraints(&self) -> Option<&TypeParameterConstraints> {
        self.constraints.get()
    }

    /// True when the parameter is known to be satisfied only by value types.
    ///
    /// False both for reference-constrained parameters and for parameters
    /// whose constraints have not been published yet.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.constraints
            .get()
            .is_some_and(|c| c.has_value_type_constraint)
    }

    /// True when the parameter is known to be satisfied only by reference types.
    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        self.constraints
            .get()
            .is_some_and(|c| c.has_reference_type_constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories;

    #[test]
    fn test_constraints_publish_once() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let class = factories::generic_class_in(&corlib, "NS", "Holder", 1);
        let param = class.type_parameters()[0].clone();

        assert!(param.constraints().is_none());
        assert!(!param.is_value_type());

        param.set_constraints(TypeParameterConstraints {
            constraint_types: Vec::new(),
            has_value_type_constraint: true,
            has_reference_type_constraint: false,
            has_constructor_constraint: false,
        });
        assert!(param.is_value_type());

        // Second publish is silently dropped
        param.set_constraints(TypeParameterConstraints {
            constraint_types: Vec::new(),
            has_value_type_constraint: false,
            has_reference_type_constraint: true,
            has_constructor_constraint: false,
        });
        assert!(param.is_value_type());
        assert!(!param.is_reference_type());
    }
}
