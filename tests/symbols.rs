//! Symbol identity: original definitions, construction, retargeting.

use std::sync::Arc;

use bindscope::prelude::*;
use bindscope::semantics::symbols::retarget_assembly;
use bindscope::test_fixtures as fx;

#[test]
fn original_definition_is_idempotent_across_shapes() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let plain = fx::class_in(&corlib, "NS", "Plain");
    let generic = fx::generic_class_in(&corlib, "NS", "Generic", 1);
    let constructed = generic.construct(vec![fx::annotated(plain.clone())]).unwrap();

    for symbol in [plain, generic.clone(), constructed] {
        let original = symbol.original_definition();
        assert!(Arc::ptr_eq(&original.original_definition(), &original));
    }

    // The constructed symbol's original is the generic definition itself
    let constructed = generic
        .construct(vec![fx::annotated(fx::class_in(&corlib, "NS", "Other"))])
        .unwrap();
    assert!(Arc::ptr_eq(&constructed.original_definition(), &generic));
}

#[test]
fn constructing_with_own_parameters_returns_the_definition() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let generic = fx::generic_class_in(&corlib, "NS", "Generic", 2);

    let own_arguments: Vec<TypeWithAnnotation> = generic
        .type_parameters()
        .iter()
        .map(|parameter| {
            TypeWithAnnotation::new(
                TypeSymbol::TypeParameter(parameter.clone()),
                NullableAnnotation::NotAnnotated,
            )
        })
        .collect();

    let result = generic.construct(own_arguments).unwrap();
    assert!(Arc::ptr_eq(&result, &generic));
}

#[test]
fn construction_validates_arity_and_arguments() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let generic = fx::generic_class_in(&corlib, "NS", "Generic", 1);

    assert!(matches!(
        generic.construct(Vec::new()),
        Err(Error::ArgumentMismatch { expected: 1, actual: 0 })
    ));
    assert!(matches!(
        generic.construct(vec![TypeWithAnnotation::unset()]),
        Err(Error::InvalidArgument(_))
    ));

    // Constructed symbols cannot be constructed again
    let constructed = generic
        .construct(vec![fx::annotated(fx::class_in(&corlib, "NS", "Arg"))])
        .unwrap();
    assert!(matches!(
        constructed.construct(vec![fx::annotated(fx::class_in(&corlib, "NS", "Arg2"))]),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn constructed_members_substitute_and_memoize() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let generic = fx::generic_class_in(&corlib, "NS", "Holder", 1);
    let t = TypeWithAnnotation::new(
        TypeSymbol::TypeParameter(generic.type_parameters()[0].clone()),
        NullableAnnotation::NotAnnotated,
    );
    let method = fx::method_with_ref_kinds(
        &generic,
        "Store",
        &[(t, RefKind::None)],
        fx::void_type(&corlib),
    );
    generic.add_member(Member::Method(method));

    let concrete = fx::class_in(&corlib, "NS", "Concrete");
    let constructed = generic.construct(vec![fx::annotated(concrete.clone())]).unwrap();

    let members_once = constructed.members();
    let members_again = constructed.members();
    assert_eq!(members_once.len(), 1);
    assert!(Member::ptr_eq(&members_once[0], &members_again[0]));

    // The substituted parameter type is the concrete argument
    let parameter_type = members_once[0].parameters()[0].parameter_type().ty();
    assert!(parameter_type.equals(
        &TypeSymbol::Named(concrete),
        TypeCompareKind::CONSIDER_EVERYTHING
    ));
}

#[test]
fn generic_method_instantiation_follows_the_same_rules() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let class = fx::class_in(&corlib, "NS", "C");
    let method = fx::generic_method_identity(&class, "M", "T", &corlib);

    // Identity instantiation returns the definition
    let own_argument = TypeWithAnnotation::new(
        TypeSymbol::TypeParameter(method.type_parameters()[0].clone()),
        NullableAnnotation::NotAnnotated,
    );
    let identity = method.construct(vec![own_argument]).unwrap();
    assert!(Arc::ptr_eq(&identity, &method));

    // Real instantiation substitutes the parameter type
    let concrete = fx::class_in(&corlib, "NS", "Concrete");
    let instantiated = method.construct(vec![fx::annotated(concrete.clone())]).unwrap();
    assert!(!Arc::ptr_eq(&instantiated, &method));
    assert!(Arc::ptr_eq(&instantiated.original_definition(), &method));
    assert!(instantiated.parameters()[0].parameter_type().ty().equals(
        &TypeSymbol::Named(concrete),
        TypeCompareKind::CONSIDER_EVERYTHING
    ));
}

#[test]
fn retargeted_symbols_report_the_new_identity() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let widget = fx::class_in(&corlib, "NS", "Widget");

    let new_identity = AssemblyIdentity::parse("corlib, Version=9.0.0.0").unwrap();
    let retargeted = retarget_assembly(&corlib, new_identity.clone(), Vec::new());

    let wrapped = retargeted
        .lookup_declared_top_level_metadata_type("NS.Widget")
        .unwrap();
    assert_eq!(wrapped.containing_assembly().unwrap().identity(), &new_identity);

    // Identity-wise the wrapper is still the same type
    assert!(TypeSymbol::Named(wrapped).equals(
        &TypeSymbol::Named(widget),
        TypeCompareKind::CONSIDER_EVERYTHING
    ));
}

#[test]
fn use_site_diagnostics_surface_missing_constituents() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let class = fx::class_in(&corlib, "NS", "C");

    let missing = TypeWithAnnotation::new(
        TypeSymbol::Error(Arc::new(
            bindscope::semantics::symbols::ErrorTypeSymbol::missing("NS.Gone", None),
        )),
        NullableAnnotation::Oblivious,
    );
    let method = fx::method_with_ref_kinds(
        &class,
        "Broken",
        &[(missing, RefKind::None)],
        fx::void_type(&corlib),
    );

    let diagnostic = method.use_site_diagnostic().expect("must surface");
    assert_eq!(diagnostic.code, DiagnosticCode::MissingAssembly);

    // Computed once and stable
    let again = method.use_site_diagnostic().unwrap();
    assert_eq!(diagnostic, again);
}
