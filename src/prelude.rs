//! Convenient re-exports of the most commonly used types and traits.
//!
//! # Example
//!
//! ```rust
//! use bindscope::prelude::*;
//! use std::sync::Arc;
//!
//! let corlib = MetadataFixture::new(AssemblyIdentity::simple("corlib"))
//!     .declaring_corlib_types();
//! let compilation = Compilation::new("app", vec![Reference::metadata(Arc::new(corlib))]);
//! let manager = ReferenceManager::new();
//! let _binding = compilation.bind(&manager);
//! ```

pub use crate::semantics::annotations::{
    CustomModifier, NullableAnnotation, TypeWithAnnotation,
};
pub use crate::semantics::compilation::Compilation;
pub use crate::semantics::diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics,
};
pub use crate::semantics::identity::{AssemblyIdentity, AssemblyVersion};
pub use crate::semantics::inheritance::{
    overridden_or_hidden_members, OverriddenOrHiddenMembersResult,
};
pub use crate::semantics::references::{
    DeclaredType, MetadataFixture, Reference, ReferenceBinding, ReferenceManager,
    ReferenceProperties, ReferenceSource, SymbolCache,
};
pub use crate::semantics::signatures::MemberSignatureComparer;
pub use crate::semantics::symbols::{
    Accessibility, AssemblyRc, AssemblySymbol, Member, MethodKind, MethodRc, MethodSymbol,
    NamedTypeBuilder, NamedTypeRc, NamedTypeSymbol, NamespaceSymbol, RefKind, SymbolKind,
    SymbolModifiers, TypeCompareKind, TypeKind, TypeSymbol, Variance,
};
pub use crate::semantics::wellknown::{SpecialType, WellKnownMember, WellKnownType};
pub use crate::{Error, Result};
