//! Special and well-known entity lookup.
//!
//! The compiler needs a fixed catalog of library entities by canonical name:
//! **special types** are the always-needed primitives (`System.Object`,
//! `System.Int32`, the nullable wrapper) resolved directly and only from the
//! designated core library; **well-known types** are feature-specific
//! (attribute types, collection types) and searched more widely - the
//! compiled assembly first, then the core library, then the full reference
//! set.
//!
//! # Duplicate Policy
//!
//! A well-known type found in more than one reference is ambiguous. For the
//! historical legacy subset a warning is reported and the first candidate
//! wins; for every other type the result is *missing*, reported with both
//! conflicting candidates named. The core library's candidate can be
//! excluded from duplicate resolution via a flag, used when a type migrates
//! between libraries.
//!
//! # Caching
//!
//! Lookups memoize per compilation in dense arrays indexed by enum
//! discriminant; entries publish at most once and racing computations are
//! debug-asserted equal. Missing optional entities degrade gracefully:
//! dependent features skip rather than fault.

use std::sync::Arc;

use strum::{EnumCount, EnumIter, FromRepr};

use crate::semantics::compilation::Compilation;
use crate::semantics::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
use crate::semantics::symbols::{ErrorTypeSymbol, Member, NamedTypeRc, SymbolKind, TypeSymbol};

/// The always-needed library types, resolved only from the core library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, FromRepr)]
pub enum SpecialType {
    /// `System.Object`
    Object,
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    SByte,
    /// `System.Byte`
    Byte,
    /// `System.Int16`
    Int16,
    /// `System.UInt16`
    UInt16,
    /// `System.Int32`
    Int32,
    /// `System.UInt32`
    UInt32,
    /// `System.Int64`
    Int64,
    /// `System.UInt64`
    UInt64,
    /// `System.Single`
    Single,
    /// `System.Double`
    Double,
    /// `System.Decimal`
    Decimal,
    /// `System.String`
    String,
    /// `System.IntPtr`
    IntPtr,
    /// `System.UIntPtr`
    UIntPtr,
    /// `` System.Nullable`1 ``
    NullableT,
    /// `System.Enum`
    Enum,
    /// `System.ValueType`
    ValueType,
    /// `System.Delegate`
    Delegate,
    /// `System.Array`
    Array,
}

impl SpecialType {
    /// The metadata name within the `System` namespace.
    #[must_use]
    pub fn metadata_name(&self) -> &'static str {
        match self {
            SpecialType::Object => "Object",
            SpecialType::Void => "Void",
            SpecialType::Boolean => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::SByte => "SByte",
            SpecialType::Byte => "Byte",
            SpecialType::Int16 => "Int16",
            SpecialType::UInt16 => "UInt16",
            SpecialType::Int32 => "Int32",
            SpecialType::UInt32 => "UInt32",
            SpecialType::Int64 => "Int64",
            SpecialType::UInt64 => "UInt64",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::Decimal => "Decimal",
            SpecialType::String => "String",
            SpecialType::IntPtr => "IntPtr",
            SpecialType::UIntPtr => "UIntPtr",
            SpecialType::NullableT => "Nullable`1",
            SpecialType::Enum => "Enum",
            SpecialType::ValueType => "ValueType",
            SpecialType::Delegate => "Delegate",
            SpecialType::Array => "Array",
        }
    }

    /// The full metadata name (`System.` prefix included).
    #[must_use]
    pub fn full_metadata_name(&self) -> String {
        format!("System.{}", self.metadata_name())
    }

    /// Classify a declared type by canonical name, if it is special.
    #[must_use]
    pub fn from_metadata_name(namespace: &str, metadata_name: &str) -> Option<SpecialType> {
        if namespace != "System" {
            return None;
        }
        use strum::IntoEnumIterator;
        SpecialType::iter().find(|s| s.metadata_name() == metadata_name)
    }
}

/// Feature-specific library types, searched across the full reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, FromRepr)]
pub enum WellKnownType {
    /// `System.ObsoleteAttribute`
    ObsoleteAttribute,
    /// `System.AttributeUsageAttribute`
    AttributeUsageAttribute,
    /// `System.Attribute`
    Attribute,
    /// `System.CLSCompliantAttribute`
    CLSCompliantAttribute,
    /// `System.ParamArrayAttribute`
    ParamArrayAttribute,
    /// `System.Diagnostics.ConditionalAttribute`
    ConditionalAttribute,
    /// `System.Runtime.CompilerServices.ExtensionAttribute`
    ExtensionAttribute,
    /// `System.Security.Permissions.SecurityPermissionAttribute`
    SecurityPermissionAttribute,
    /// `` System.Collections.Generic.IEnumerable`1 ``
    IEnumerableT,
    /// `` System.Collections.Generic.List`1 ``
    ListT,
    /// `` System.Collections.Generic.Dictionary`2 ``
    DictionaryKV,
    /// `System.Threading.Tasks.Task`
    Task,
    /// `` System.Threading.Tasks.Task`1 ``
    TaskT,
}

impl WellKnownType {
    /// The declaring namespace.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            WellKnownType::ObsoleteAttribute
            | WellKnownType::AttributeUsageAttribute
            | WellKnownType::Attribute
            | WellKnownType::CLSCompliantAttribute
            | WellKnownType::ParamArrayAttribute => "System",
            WellKnownType::ConditionalAttribute => "System.Diagnostics",
            WellKnownType::ExtensionAttribute => "System.Runtime.CompilerServices",
            WellKnownType::SecurityPermissionAttribute => "System.Security.Permissions",
            WellKnownType::IEnumerableT | WellKnownType::ListT | WellKnownType::DictionaryKV => {
                "System.Collections.Generic"
            }
            WellKnownType::Task | WellKnownType::TaskT => "System.Threading.Tasks",
        }
    }

    /// The metadata name within the declaring namespace.
    #[must_use]
    pub fn metadata_name(&self) -> &'static str {
        match self {
            WellKnownType::ObsoleteAttribute => "ObsoleteAttribute",
            WellKnownType::AttributeUsageAttribute => "AttributeUsageAttribute",
            WellKnownType::Attribute => "Attribute",
            WellKnownType::CLSCompliantAttribute => "CLSCompliantAttribute",
            WellKnownType::ParamArrayAttribute => "ParamArrayAttribute",
            WellKnownType::ConditionalAttribute => "ConditionalAttribute",
            WellKnownType::ExtensionAttribute => "ExtensionAttribute",
            WellKnownType::SecurityPermissionAttribute => "SecurityPermissionAttribute",
            WellKnownType::IEnumerableT => "IEnumerable`1",
            WellKnownType::ListT => "List`1",
            WellKnownType::DictionaryKV => "Dictionary`2",
            WellKnownType::Task => "Task",
            WellKnownType::TaskT => "Task`1",
        }
    }

    /// The full metadata name.
    #[must_use]
    pub fn full_metadata_name(&self) -> String {
        format!("{}.{}", self.namespace(), self.metadata_name())
    }

    /// True for the historical subset whose duplicates warn and pick the
    /// first candidate instead of going missing.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            WellKnownType::ExtensionAttribute | WellKnownType::ParamArrayAttribute
        )
    }

    /// True for entities whose absence degrades the dependent feature
    /// silently rather than producing a diagnostic.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        !matches!(self, WellKnownType::Attribute)
    }
}

/// The parent catalog a well-known member's declaring type lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownMemberParent {
    /// Declared on a special type
    Special(SpecialType),
    /// Declared on a well-known type
    WellKnown(WellKnownType),
}

/// Feature-specific library members, resolved by shape against their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, FromRepr)]
pub enum WellKnownMember {
    /// `` Nullable`1.HasValue `` property
    NullableHasValue,
    /// `` Nullable`1.Value `` property
    NullableValue,
    /// `AttributeUsageAttribute..ctor(AttributeTargets)`
    AttributeUsageConstructor,
    /// `ObsoleteAttribute..ctor(string)`
    ObsoleteAttributeConstructor,
    /// `ExtensionAttribute..ctor()`
    ExtensionAttributeConstructor,
}

impl WellKnownMember {
    /// The declaring type.
    #[must_use]
    pub fn parent(&self) -> WellKnownMemberParent {
        match self {
            WellKnownMember::NullableHasValue | WellKnownMember::NullableValue => {
                WellKnownMemberParent::Special(SpecialType::NullableT)
            }
            WellKnownMember::AttributeUsageConstructor => {
                WellKnownMemberParent::WellKnown(WellKnownType::AttributeUsageAttribute)
            }
            WellKnownMember::ObsoleteAttributeConstructor => {
                WellKnownMemberParent::WellKnown(WellKnownType::ObsoleteAttribute)
            }
            WellKnownMember::ExtensionAttributeConstructor => {
                WellKnownMemberParent::WellKnown(WellKnownType::ExtensionAttribute)
            }
        }
    }

    /// The member name searched for.
    #[must_use]
    pub fn member_name(&self) -> &'static str {
        match self {
            WellKnownMember::NullableHasValue => "HasValue",
            WellKnownMember::NullableValue => "Value",
            WellKnownMember::AttributeUsageConstructor
            | WellKnownMember::ObsoleteAttributeConstructor
            | WellKnownMember::ExtensionAttributeConstructor => ".ctor",
        }
    }

    /// The expected symbol kind.
    #[must_use]
    pub fn member_kind(&self) -> SymbolKind {
        match self {
            WellKnownMember::NullableHasValue | WellKnownMember::NullableValue => {
                SymbolKind::Property
            }
            _ => SymbolKind::Method,
        }
    }

    /// The expected parameter count.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        match self {
            WellKnownMember::AttributeUsageConstructor
            | WellKnownMember::ObsoleteAttributeConstructor => 1,
            _ => 0,
        }
    }
}

/// Resolve a special type from the compilation's designated core library.
///
/// Special types never search other references; an undesignated or missing
/// core library yields a missing error type.
pub(crate) fn resolve_special_type(compilation: &Compilation, special: SpecialType) -> TypeSymbol {
    let name = special.full_metadata_name();
    let Some(cor_library) = compilation.assembly().cor_library() else {
        return missing(&name, None);
    };
    if cor_library.is_missing() {
        return missing(&name, Some(&cor_library.identity().display_name()));
    }
    match cor_library.lookup_declared_top_level_metadata_type(&name) {
        Some(found) => {
            found.set_special_type(special);
            TypeSymbol::Named(found)
        }
        None => missing(&name, Some(&cor_library.identity().display_name())),
    }
}

/// Resolve a well-known type against the compiled assembly, the core
/// library, and the full reference set, in that order.
///
/// `ignore_cor_library` excludes the core library's candidate from
/// duplicate resolution (used while a type migrates between libraries).
pub(crate) fn resolve_well_known_type(
    compilation: &Compilation,
    well_known: WellKnownType,
    ignore_cor_library: bool,
) -> TypeSymbol {
    let name = well_known.full_metadata_name();

    // The compiled assembly wins outright.
    if let Some(found) = compilation
        .assembly()
        .lookup_declared_top_level_metadata_type(&name)
    {
        return TypeSymbol::Named(found);
    }

    let cor_library = compilation.assembly().cor_library();
    if !ignore_cor_library {
        if let Some(cor_library) = &cor_library {
            if let Some(found) = cor_library.lookup_declared_top_level_metadata_type(&name) {
                return TypeSymbol::Named(found);
            }
        }
    }

    // The transitive reference set; first match wins unless duplicated.
    let mut candidates: Vec<NamedTypeRc> = Vec::new();
    for reference in compilation.referenced_assemblies() {
        if reference.is_missing() {
            continue;
        }
        if let Some(cor_library) = &cor_library {
            if Arc::ptr_eq(&reference, cor_library) {
                continue;
            }
        }
        if let Some(found) = reference.lookup_declared_top_level_metadata_type(&name) {
            candidates.push(found);
        }
    }

    match candidates.len() {
        0 => {
            if !well_known.is_optional() {
                compilation.diagnostics().push(Diagnostic::new(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::MissingAssembly,
                    [name.clone()],
                ));
            }
            missing(&name, None)
        }
        1 => TypeSymbol::Named(candidates.remove(0)),
        _ => {
            if well_known.is_legacy() {
                // Historical behavior: warn and pick the first candidate.
                compilation.diagnostics().push(Diagnostic::new(
                    DiagnosticSeverity::Warning,
                    DiagnosticCode::AmbiguousWellKnownType,
                    ambiguity_args(&name, &candidates),
                ));
                TypeSymbol::Named(candidates.remove(0))
            } else {
                compilation.diagnostics().push(Diagnostic::new(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::AmbiguousWellKnownType,
                    ambiguity_args(&name, &candidates),
                ));
                TypeSymbol::Error(Arc::new(ErrorTypeSymbol::ambiguous(
                    name,
                    candidates.into_iter().map(TypeSymbol::Named).collect(),
                )))
            }
        }
    }
}

/// Resolve a well-known member by shape against its resolved parent type.
///
/// Returns `None` when the parent or member is absent; dependent features
/// degrade rather than fault.
pub(crate) fn resolve_well_known_member(
    compilation: &Compilation,
    member: WellKnownMember,
) -> Option<Member> {
    let parent = match member.parent() {
        WellKnownMemberParent::Special(special) => compilation.special_type(special),
        WellKnownMemberParent::WellKnown(well_known) => {
            compilation.well_known_type(well_known)
        }
    };
    let TypeSymbol::Named(parent) = parent else {
        return None;
    };

    parent
        .members_named(member.member_name())
        .into_iter()
        .find(|candidate| {
            candidate.kind() == member.member_kind()
                && candidate.parameters().len() == member.parameter_count()
        })
}

fn missing(name: &str, expected_in: Option<&str>) -> TypeSymbol {
    TypeSymbol::Error(Arc::new(ErrorTypeSymbol::missing(name, expected_in)))
}

fn ambiguity_args(name: &str, candidates: &[NamedTypeRc]) -> Vec<String> {
    let mut args = vec![name.to_string()];
    args.extend(candidates.iter().map(|c| {
        c.containing_assembly()
            .map(|a| a.identity().display_name())
            .unwrap_or_else(|| c.display_name())
    }));
    args
}
