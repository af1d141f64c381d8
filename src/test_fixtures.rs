//! Factory helpers for building symbol graphs in tests.
//!
//! These helpers construct small, fully-wired graphs - a compilation bound
//! against an in-memory core library, classes with members, generic
//! definitions - so unit and integration tests exercise resolution without
//! hand-wiring every cell. They are plain public API compositions; nothing
//! here bypasses the crate's own construction rules.

use std::sync::Arc;

use crate::semantics::annotations::{NullableAnnotation, TypeWithAnnotation};
use crate::semantics::compilation::Compilation;
use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::references::{MetadataFixture, Reference, ReferenceManager, ReferenceSource};
use crate::semantics::symbols::{
    Accessibility, ArrayType, AssemblyRc, CallingConvention, FieldRc, FieldSymbol, Member,
    MethodKind, MethodRc, MethodSymbol, NamedTypeBuilder, NamedTypeRc, ParameterRc,
    ParameterSymbol, PropertyRc, PropertySymbol, RefKind, SymbolModifiers, TypeKind,
    TypeParameterConstraints, TypeParameterRc, TypeSymbol,
};
use crate::semantics::wellknown::SpecialType;

/// A compilation bound against an in-memory core library.
///
/// Returns the compilation and the materialized core library assembly; most
/// tests declare their types directly into the core library so everything
/// shares one assembly.
#[must_use]
pub fn compilation_with_corlib(name: &str) -> (Arc<Compilation>, AssemblyRc) {
    let corlib: Arc<dyn ReferenceSource> = Arc::new(
        MetadataFixture::new(
            AssemblyIdentity::parse("corlib, Version=4.0.0.0").expect("fixture identity"),
        )
        .declaring_corlib_types(),
    );
    let compilation = Compilation::new(name, vec![Reference::metadata(corlib)]);
    let manager = ReferenceManager::new();
    let _ = compilation.bind(&manager);
    let cor_library = compilation
        .cor_library()
        .expect("binding designates a core library");
    (compilation, cor_library)
}

/// A public non-generic class declared in `assembly`.
#[must_use]
pub fn class_in(assembly: &AssemblyRc, namespace: &str, name: &str) -> NamedTypeRc {
    NamedTypeBuilder::new(assembly)
        .namespace(namespace)
        .name(name)
        .kind(TypeKind::Class)
        .build()
}

/// A public struct declared in `assembly`.
#[must_use]
pub fn struct_in(assembly: &AssemblyRc, namespace: &str, name: &str) -> NamedTypeRc {
    NamedTypeBuilder::new(assembly)
        .namespace(namespace)
        .name(name)
        .kind(TypeKind::Struct)
        .build()
}

/// A public interface declared in `assembly`.
#[must_use]
pub fn interface_in(assembly: &AssemblyRc, namespace: &str, name: &str) -> NamedTypeRc {
    NamedTypeBuilder::new(assembly)
        .namespace(namespace)
        .name(name)
        .kind(TypeKind::Interface)
        .build()
}

/// A public generic class of the given arity declared in `assembly`.
#[must_use]
pub fn generic_class_in(
    assembly: &AssemblyRc,
    namespace: &str,
    name: &str,
    arity: u32,
) -> NamedTypeRc {
    NamedTypeBuilder::new(assembly)
        .namespace(namespace)
        .name(name)
        .arity(arity)
        .kind(TypeKind::Class)
        .build()
}

/// A non-generic class nested in `outer`.
#[must_use]
pub fn nested_class(outer: &NamedTypeRc, name: &str) -> NamedTypeRc {
    let assembly = outer
        .containing_assembly()
        .expect("outer type must have an assembly");
    let nested = NamedTypeBuilder::new(&assembly)
        .namespace(outer.namespace())
        .name(name)
        .kind(TypeKind::Class)
        .build_unregistered();
    outer.add_nested_type(nested.clone());
    nested
}

/// A plain (not-annotated) reference to a named type.
#[must_use]
pub fn annotated(ty: NamedTypeRc) -> TypeWithAnnotation {
    TypeWithAnnotation::new(TypeSymbol::Named(ty), NullableAnnotation::NotAnnotated)
}

/// An array type over `element` with the given rank.
#[must_use]
pub fn array_of(element: TypeWithAnnotation, rank: u32) -> TypeSymbol {
    TypeSymbol::Array(Arc::new(ArrayType { element, rank }))
}

/// A reference to `System.Void` in `assembly`.
#[must_use]
pub fn void_type(assembly: &AssemblyRc) -> TypeWithAnnotation {
    let void = assembly
        .lookup_declared_top_level_metadata_type("System.Void")
        .expect("assembly must declare System.Void");
    TypeWithAnnotation::new(TypeSymbol::Named(void), NullableAnnotation::Oblivious)
}

/// The nullable wrapper definition resolved through `compilation`.
#[must_use]
pub fn nullable_definition(compilation: &Compilation) -> NamedTypeRc {
    match compilation.special_type(SpecialType::NullableT) {
        TypeSymbol::Named(nullable) => nullable,
        other => panic!("nullable wrapper missing: {}", other.display_name()),
    }
}

/// `Nullable<Int32>` constructed through `compilation`.
#[must_use]
pub fn nullable_of_int(compilation: &Compilation) -> TypeSymbol {
    let nullable = nullable_definition(compilation);
    let int32 = match compilation.special_type(SpecialType::Int32) {
        TypeSymbol::Named(int32) => int32,
        other => panic!("Int32 missing: {}", other.display_name()),
    };
    TypeSymbol::Named(
        nullable
            .construct(vec![annotated(int32)])
            .expect("arity matches"),
    )
}

/// Publish a `where T : class` constraint on `parameter`.
pub fn set_reference_constraint(parameter: &TypeParameterRc) {
    parameter.set_constraints(TypeParameterConstraints {
        constraint_types: Vec::new(),
        has_value_type_constraint: false,
        has_reference_type_constraint: true,
        has_constructor_constraint: false,
    });
}

/// Publish a `where T : struct` constraint on `parameter`.
pub fn set_value_constraint(parameter: &TypeParameterRc) {
    parameter.set_constraints(TypeParameterConstraints {
        constraint_types: Vec::new(),
        has_value_type_constraint: true,
        has_reference_type_constraint: false,
        has_constructor_constraint: false,
    });
}

/// An ordinary public instance method with by-value parameters.
#[must_use]
pub fn method(
    class: &NamedTypeRc,
    name: &str,
    parameter_types: &[TypeWithAnnotation],
    return_type: TypeWithAnnotation,
) -> MethodRc {
    let pairs: Vec<(TypeWithAnnotation, RefKind)> = parameter_types
        .iter()
        .map(|t| (t.clone(), RefKind::None))
        .collect();
    method_with_modifiers(class, name, &pairs, return_type, SymbolModifiers::empty())
}

/// An ordinary public instance method with explicit parameter ref kinds.
#[must_use]
pub fn method_with_ref_kinds(
    class: &NamedTypeRc,
    name: &str,
    parameters: &[(TypeWithAnnotation, RefKind)],
    return_type: TypeWithAnnotation,
) -> MethodRc {
    method_with_modifiers(class, name, parameters, return_type, SymbolModifiers::empty())
}

/// An ordinary public instance method with explicit modifiers.
#[must_use]
pub fn method_with_modifiers(
    class: &NamedTypeRc,
    name: &str,
    parameters: &[(TypeWithAnnotation, RefKind)],
    return_type: TypeWithAnnotation,
    modifiers: SymbolModifiers,
) -> MethodRc {
    let method = Arc::new(MethodSymbol::new(
        name,
        MethodKind::Ordinary,
        Accessibility::Public,
        modifiers,
        class,
        CallingConvention::HAS_THIS,
        RefKind::None,
    ));
    method.set_parameters(build_parameters(parameters));
    method.set_return_type(return_type);
    method
}

/// A vararg variant of [`method`].
#[must_use]
pub fn vararg_method(
    class: &NamedTypeRc,
    name: &str,
    parameter_types: &[TypeWithAnnotation],
    return_type: TypeWithAnnotation,
) -> MethodRc {
    let method = Arc::new(MethodSymbol::new(
        name,
        MethodKind::Ordinary,
        Accessibility::Public,
        SymbolModifiers::empty(),
        class,
        CallingConvention::HAS_THIS.union(CallingConvention::VARARG),
        RefKind::None,
    ));
    let pairs: Vec<(TypeWithAnnotation, RefKind)> = parameter_types
        .iter()
        .map(|t| (t.clone(), RefKind::None))
        .collect();
    method.set_parameters(build_parameters(&pairs));
    method.set_return_type(return_type);
    method
}

/// A generic method `name<param>(param)` returning void.
#[must_use]
pub fn generic_method_identity(
    class: &NamedTypeRc,
    name: &str,
    parameter_name: &str,
    void_source: &AssemblyRc,
) -> MethodRc {
    let method = Arc::new(MethodSymbol::new(
        name,
        MethodKind::Ordinary,
        Accessibility::Public,
        SymbolModifiers::empty(),
        class,
        CallingConvention::HAS_THIS.union(CallingConvention::GENERIC),
        RefKind::None,
    ));
    let type_parameter = method.new_type_parameter(parameter_name, 0);
    method.set_type_parameters(vec![type_parameter.clone()]);
    method.set_parameters(vec![Arc::new(ParameterSymbol::new(
        "value",
        0,
        TypeWithAnnotation::new(
            TypeSymbol::TypeParameter(type_parameter),
            NullableAnnotation::NotAnnotated,
        ),
        RefKind::None,
    ))]);
    method.set_return_type(void_type(void_source));
    method
}

/// A public field.
#[must_use]
pub fn field(class: &NamedTypeRc, name: &str, field_type: TypeWithAnnotation) -> FieldRc {
    let field = Arc::new(FieldSymbol::new(
        name,
        Accessibility::Public,
        SymbolModifiers::empty(),
        class,
    ));
    field.set_field_type(field_type);
    field
}

/// A public property with optional get/set accessors, registered on `class`.
#[must_use]
pub fn property_with_accessors(
    class: &NamedTypeRc,
    name: &str,
    property_type: TypeWithAnnotation,
    has_get: bool,
    has_set: bool,
    modifiers: SymbolModifiers,
) -> PropertyRc {
    let property = Arc::new(PropertySymbol::new(
        name,
        Accessibility::Public,
        modifiers,
        class,
        false,
        RefKind::None,
    ));
    property.set_property_type(property_type.clone());
    property.set_parameters(Vec::new());

    if has_get {
        let get = Arc::new(MethodSymbol::new(
            format!("get_{}", name),
            MethodKind::PropertyGet,
            Accessibility::Public,
            modifiers,
            class,
            CallingConvention::HAS_THIS,
            RefKind::None,
        ));
        get.set_parameters(Vec::new());
        get.set_return_type(property_type.clone());
        property.set_get_method(get);
    }
    if has_set {
        let set = Arc::new(MethodSymbol::new(
            format!("set_{}", name),
            MethodKind::PropertySet,
            Accessibility::Public,
            modifiers,
            class,
            CallingConvention::HAS_THIS,
            RefKind::None,
        ));
        set.set_parameters(vec![Arc::new(ParameterSymbol::new(
            "value",
            0,
            property_type.clone(),
            RefKind::None,
        ))]);
        if let Some(assembly) = class.containing_assembly() {
            if assembly
                .lookup_declared_top_level_metadata_type("System.Void")
                .is_some()
            {
                set.set_return_type(void_type(&assembly));
            }
        }
        property.set_set_method(set);
    }

    class.add_member(Member::Property(property.clone()));
    property
}

fn build_parameters(parameters: &[(TypeWithAnnotation, RefKind)]) -> Vec<ParameterRc> {
    parameters
        .iter()
        .enumerate()
        .map(|(ordinal, (ty, ref_kind))| {
            Arc::new(ParameterSymbol::new(
                format!("p{}", ordinal),
                ordinal as u32,
                ty.clone(),
                *ref_kind,
            ))
        })
        .collect()
}
