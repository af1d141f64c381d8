//! Symbol identity model for the resolution core.
//!
//! This module provides the representation of every named program entity the
//! binder works with: assemblies, modules, namespaces, named types, members,
//! and type parameters. It bridges the gap between collaborator-supplied
//! declarations (source binder, metadata reader) and a usable symbol graph
//! for override resolution and signature comparison.
//!
//! # Key Components
//!
//! - [`AssemblySymbol`] / [`ModuleSymbol`]: assembly-level entities and reference wiring
//! - [`NamespaceSymbol`]: namespace tree with deterministic type storage
//! - [`NamedTypeSymbol`]: core type representation across all provenances
//! - [`MethodSymbol`] and the other member symbols, unified by [`Member`]
//! - [`TypeParameterSymbol`]: generic parameters with lazily-set constraints
//! - [`TypeSubstitution`]: type-parameter to type-argument mapping
//! - [`ErrorTypeSymbol`]: placeholder for missing/ambiguous/cyclic entities
//!
//! # Identity Model
//!
//! Every symbol exposes an *original definition*: the canonical unsubstituted
//! form used as the identity key for equality and caching. A symbol declared
//! in source or read from metadata is its own original definition; a
//! constructed generic symbol points back at the definition it was built
//! from. The operation is idempotent by construction.
//!
//! Provenance is a closed set - source, metadata, retargeting, constructed,
//! error - and is exhaustively matched everywhere; adding a provenance is a
//! deliberate, crate-wide decision.
//!
//! # Thread Safety
//!
//! Symbols are immutable after their declaration phase; the only mutable
//! state is held in publish-once cells (`OnceLock`) and lock-free append
//! containers (`boxcar::Vec`), so fully-declared graphs can be shared and
//! queried from any number of threads.

mod assembly;
mod error_type;
mod member;
mod method;
mod named_type;
mod namespace;
mod retargeting;
mod substitution;
mod type_parameter;
mod usesite;

use std::sync::{Arc, Weak};

pub use assembly::{AssemblyProvenance, AssemblySymbol, ModuleSymbol, UnifiedReference};
pub use error_type::{ErrorTypeKind, ErrorTypeSymbol};
pub use member::{
    EventSymbol, FieldSymbol, Member, ParameterSymbol, PropertySymbol,
};
pub use method::{AssociatedMember, CallingConvention, MethodKind, MethodSymbol};
pub use named_type::{NamedTypeBuilder, NamedTypeSymbol, TypeKind, TypeProvenance};
pub use namespace::NamespaceSymbol;
pub use retargeting::{retarget_assembly, RetargetingMap};
pub use substitution::TypeSubstitution;
pub use type_parameter::{TypeParameterConstraints, TypeParameterOwner, TypeParameterSymbol};
pub use usesite::UseSiteDiagnostic;

use crate::semantics::annotations::TypeWithAnnotation;

/// Reference to an `AssemblySymbol`
pub type AssemblyRc = Arc<AssemblySymbol>;
/// Reference to a `ModuleSymbol`
pub type ModuleRc = Arc<ModuleSymbol>;
/// Reference to a `NamespaceSymbol`
pub type NamespaceRc = Arc<NamespaceSymbol>;
/// Reference to a `NamedTypeSymbol`
pub type NamedTypeRc = Arc<NamedTypeSymbol>;
/// Reference to a `MethodSymbol`
pub type MethodRc = Arc<MethodSymbol>;
/// Reference to a `FieldSymbol`
pub type FieldRc = Arc<FieldSymbol>;
/// Reference to a `PropertySymbol`
pub type PropertyRc = Arc<PropertySymbol>;
/// Reference to an `EventSymbol`
pub type EventRc = Arc<EventSymbol>;
/// Reference to a `ParameterSymbol`
pub type ParameterRc = Arc<ParameterSymbol>;
/// Reference to a `TypeParameterSymbol`
pub type TypeParameterRc = Arc<TypeParameterSymbol>;
/// Reference to an `ErrorTypeSymbol`
pub type ErrorTypeRc = Arc<ErrorTypeSymbol>;
/// Weak back-reference to a `NamedTypeSymbol`
pub type NamedTypeWeak = Weak<NamedTypeSymbol>;
/// Weak back-reference to an `AssemblySymbol`
pub type AssemblyWeak = Weak<AssemblySymbol>;

/// Classification of a symbol by the entity kind it represents.
///
/// The kind is the first thing every polymorphic algorithm checks; signature
/// comparison rejects mismatched kinds before looking at anything else, and
/// hiding rules depend on the kind pair involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// An assembly (unit of deployment and identity)
    Assembly,
    /// A module within an assembly
    Module,
    /// A namespace
    Namespace,
    /// A named type (class, struct, interface, enum, delegate)
    NamedType,
    /// A method, including accessors, constructors and operators
    Method,
    /// A field
    Field,
    /// A property, including indexers
    Property,
    /// An event
    Event,
    /// A parameter of a method or indexer
    Parameter,
    /// A generic type parameter
    TypeParameter,
    /// A placeholder for an unresolved, ambiguous or missing type
    ErrorType,
}

/// Declared accessibility of a symbol.
///
/// Ordering is not meaningful; accessibility checks go through
/// [`Member::is_accessible_for_override`](crate::semantics::symbols::Member)
/// and related helpers rather than comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    /// Accessibility is not applicable to this symbol kind
    NotApplicable,
    /// Accessible only within the containing type
    Private,
    /// Accessible within derived types inside the containing assembly
    ProtectedAndInternal,
    /// Accessible within the containing type and derived types
    Protected,
    /// Accessible within the containing assembly
    Internal,
    /// Accessible within derived types or the containing assembly
    ProtectedOrInternal,
    /// Accessible everywhere
    Public,
}

/// Variance of a generic type parameter or a merge position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// No variance; both sides must agree exactly
    Invariant,
    /// Output position; the more permissive annotation wins
    Covariant,
    /// Input position; the more restrictive annotation wins
    Contravariant,
}

/// By-reference passing mode of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// Passed by value
    None,
    /// Passed by reference, readable and writable
    Ref,
    /// Passed by reference, must be assigned by the callee
    Out,
    /// Passed by read-only reference, supplied by the caller
    In,
    /// Declared as a read-only reference parameter
    ///
    /// Distinct from [`RefKind::In`] at the declaration level, but treated as
    /// matching it under the documented calling-convention equivalence used
    /// by some signature-comparison policies.
    RefReadOnly,
}

impl RefKind {
    /// True for any by-reference kind (everything except [`RefKind::None`]).
    #[must_use]
    pub fn is_by_ref(self) -> bool {
        self != RefKind::None
    }
}

bitflags::bitflags! {
    /// Declaration-level modifier flags shared by all member symbols.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolModifiers: u16 {
        /// Member is static
        const STATIC = 0x0001;
        /// Member is abstract
        const ABSTRACT = 0x0002;
        /// Type or member is sealed
        const SEALED = 0x0004;
        /// Member is virtual
        const VIRTUAL = 0x0008;
        /// Member is declared as an override
        const OVERRIDE = 0x0010;
        /// Member is extern
        const EXTERN = 0x0020;
        /// Member introduces a new slot, shadowing any inherited member
        const NEW_SLOT = 0x0040;
    }
}

bitflags::bitflags! {
    /// Strictness flags for structural type comparison.
    ///
    /// The empty set means "consider everything": custom modifiers,
    /// nullability annotations and object/dynamic distinctions all matter.
    /// Each flag relaxes one dimension.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeCompareKind: u8 {
        /// Ignore custom modifiers when comparing types
        const IGNORE_CUSTOM_MODIFIERS = 0x01;
        /// Ignore top-level and nested nullability annotations
        const IGNORE_NULLABILITY = 0x02;
        /// An oblivious annotation matches any annotation on the other side
        const OBLIVIOUS_MATCHES_ANY = 0x04;
    }
}

impl TypeCompareKind {
    /// The strictest comparison: everything is significant.
    pub const CONSIDER_EVERYTHING: TypeCompareKind = TypeCompareKind::empty();

    /// The comparison used by the runtime: modifiers matter, annotations do not.
    pub const RUNTIME: TypeCompareKind = TypeCompareKind::IGNORE_NULLABILITY;

    /// The loosest comparison used by documentation-reference matching.
    pub const ALL_IGNORE_OPTIONS: TypeCompareKind = TypeCompareKind::all();
}

/// A type identity, as used in signatures and annotated references.
///
/// This is the closed set of shapes a type reference can take. Named types
/// cover classes, structs, interfaces, enums and delegates across all
/// provenances; arrays and pointers are structural compositions over an
/// element type; error types stand in for anything that failed to resolve.
#[derive(Debug, Clone)]
pub enum TypeSymbol {
    /// A named type (possibly generic, possibly constructed)
    Named(NamedTypeRc),
    /// A generic type parameter
    TypeParameter(TypeParameterRc),
    /// A single- or multi-dimensional array
    Array(Arc<ArrayType>),
    /// An unmanaged pointer
    Pointer(Arc<PointerType>),
    /// A placeholder for an unresolved, ambiguous or missing type
    Error(ErrorTypeRc),
}

/// Structural identity of an array type.
#[derive(Debug)]
pub struct ArrayType {
    /// Element type, with its own annotation
    pub element: TypeWithAnnotation,
    /// Number of dimensions; 1 for a vector
    pub rank: u32,
}

/// Structural identity of a pointer type.
#[derive(Debug)]
pub struct PointerType {
    /// The pointed-at type, with its own annotation
    pub pointee: TypeWithAnnotation,
}

impl TypeSymbol {
    /// The symbol kind of this type.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            TypeSymbol::Named(_) => SymbolKind::NamedType,
            TypeSymbol::TypeParameter(_) => SymbolKind::TypeParameter,
            TypeSymbol::Array(_) | TypeSymbol::Pointer(_) => SymbolKind::NamedType,
            TypeSymbol::Error(_) => SymbolKind::ErrorType,
        }
    }

    /// True when this identity is (or contains at top level) an error type.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, TypeSymbol::Error(_))
    }

    /// True when this is a value type (struct or enum).
    ///
    /// Type parameters answer true only when constrained to value types.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeSymbol::Named(t) => t.is_value_type(),
            TypeSymbol::TypeParameter(p) => p.is_value_type(),
            _ => false,
        }
    }

    /// True when this is the value-type nullable wrapper (`Nullable<T>`) or
    /// a construction of it.
    #[must_use]
    pub fn is_nullable_wrapper(&self) -> bool {
        match self {
            TypeSymbol::Named(t) => t.is_nullable_wrapper(),
            _ => false,
        }
    }

    /// Structural equality under the given comparison strictness.
    ///
    /// Named types are equal when their original definitions are the same
    /// symbol (retargeting wrappers are peeled first) and their type
    /// arguments are pairwise equal. Type parameters compare by identity.
    #[must_use]
    pub fn equals(&self, other: &TypeSymbol, compare: TypeCompareKind) -> bool {
        match (self, other) {
            (TypeSymbol::Named(a), TypeSymbol::Named(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let a_def = a.peel_retargeting().original_definition();
                let b_def = b.peel_retargeting().original_definition();
                if !Arc::ptr_eq(&a_def.peel_retargeting(), &b_def.peel_retargeting()) {
                    return false;
                }
                let a_args = a.type_arguments();
                let b_args = b.type_arguments();
                if a_args.len() != b_args.len() {
                    return false;
                }
                a_args
                    .iter()
                    .zip(b_args.iter())
                    .all(|(x, y)| x.equals(y, compare))
            }
            (TypeSymbol::TypeParameter(a), TypeSymbol::TypeParameter(b)) => Arc::ptr_eq(a, b),
            (TypeSymbol::Array(a), TypeSymbol::Array(b)) => {
                a.rank == b.rank && a.element.equals(&b.element, compare)
            }
            (TypeSymbol::Pointer(a), TypeSymbol::Pointer(b)) => {
                a.pointee.equals(&b.pointee, compare)
            }
            (TypeSymbol::Error(a), TypeSymbol::Error(b)) => {
                Arc::ptr_eq(a, b) || a.name() == b.name()
            }
            _ => false,
        }
    }

    /// Folds a hash of this type consistent with [`TypeSymbol::equals`].
    ///
    /// Only shape that every comparison strictness considers is folded in, so
    /// one hash serves all policies: equal types always produce equal hashes,
    /// at the cost of some collisions between near-identical types.
    pub fn hash_into<H: std::hash::Hasher>(&self, state: &mut H) {
        use std::hash::Hash;
        match self {
            TypeSymbol::Named(t) => {
                let def = t.peel_retargeting().original_definition();
                0u8.hash(state);
                def.namespace().hash(state);
                def.name().hash(state);
                def.arity().hash(state);
            }
            TypeSymbol::TypeParameter(p) => {
                1u8.hash(state);
                p.ordinal().hash(state);
            }
            TypeSymbol::Array(a) => {
                2u8.hash(state);
                a.rank.hash(state);
                a.element.hash_into(state);
            }
            TypeSymbol::Pointer(p) => {
                3u8.hash(state);
                p.pointee.hash_into(state);
            }
            TypeSymbol::Error(e) => {
                4u8.hash(state);
                e.name().hash(state);
            }
        }
    }

    /// Display name for diagnostics ("NS.Name<...>", "T", "A[]", "B*").
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            TypeSymbol::Named(t) => t.display_name(),
            TypeSymbol::TypeParameter(p) => p.name().to_string(),
            TypeSymbol::Array(a) => {
                let commas = ",".repeat((a.rank.saturating_sub(1)) as usize);
                format!("{}[{}]", a.element.display_name(), commas)
            }
            TypeSymbol::Pointer(p) => format!("{}*", p.pointee.display_name()),
            TypeSymbol::Error(e) => e.name().to_string(),
        }
    }

    /// The containing assembly of this type, when it has one.
    ///
    /// Arrays and pointers delegate to their element; error types and
    /// unowned type parameters have none.
    #[must_use]
    pub fn containing_assembly(&self) -> Option<AssemblyRc> {
        match self {
            TypeSymbol::Named(t) => t.containing_assembly(),
            TypeSymbol::Array(a) => a.element.ty().containing_assembly(),
            TypeSymbol::Pointer(p) => p.pointee.ty().containing_assembly(),
            TypeSymbol::TypeParameter(_) | TypeSymbol::Error(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories;

    #[test]
    fn test_type_symbol_equals_named() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let a = factories::class_in(&corlib, "NS", "A");
        let b = factories::class_in(&corlib, "NS", "B");

        let ta = TypeSymbol::Named(a.clone());
        let ta2 = TypeSymbol::Named(a);
        let tb = TypeSymbol::Named(b);

        assert!(ta.equals(&ta2, TypeCompareKind::CONSIDER_EVERYTHING));
        assert!(!ta.equals(&tb, TypeCompareKind::CONSIDER_EVERYTHING));
    }

    #[test]
    fn test_array_structural_equality() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let elem = factories::class_in(&corlib, "NS", "Elem");

        let a1 = factories::array_of(factories::annotated(elem.clone()), 1);
        let a2 = factories::array_of(factories::annotated(elem.clone()), 1);
        let a3 = factories::array_of(factories::annotated(elem), 2);

        assert!(a1.equals(&a2, TypeCompareKind::CONSIDER_EVERYTHING));
        assert!(!a1.equals(&a3, TypeCompareKind::CONSIDER_EVERYTHING));
    }

    #[test]
    fn test_hash_consistent_with_equals() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher;

        let (_, corlib) = factories::compilation_with_corlib("lib");
        let elem = factories::class_in(&corlib, "NS", "Elem");
        let a1 = factories::array_of(factories::annotated(elem.clone()), 1);
        let a2 = factories::array_of(factories::annotated(elem), 1);

        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        a1.hash_into(&mut h1);
        a2.hash_into(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }
}
