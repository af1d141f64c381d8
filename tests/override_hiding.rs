//! Override and hiding resolution over class and interface hierarchies.

use std::sync::Arc;

use bindscope::prelude::*;
use bindscope::test_fixtures as fx;

#[test]
fn override_finds_base_virtual_method() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let base_method = fx::method_with_modifiers(
        &base,
        "M",
        &[],
        fx::void_type(&corlib),
        SymbolModifiers::VIRTUAL,
    );
    base.add_member(Member::Method(base_method.clone()));

    let derived_method = fx::method_with_modifiers(
        &derived,
        "M",
        &[],
        fx::void_type(&corlib),
        SymbolModifiers::OVERRIDE,
    );
    derived.add_member(Member::Method(derived_method.clone()));

    let result = overridden_or_hidden_members(&Member::Method(derived_method));
    assert_eq!(result.overridden_members().len(), 1);
    assert!(Member::ptr_eq(
        &result.overridden_members()[0],
        &Member::Method(base_method)
    ));
    assert!(result.hidden_members().is_empty());
}

#[test]
fn non_override_same_signature_hides() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let base_method = fx::method(&base, "M", &[], fx::void_type(&corlib));
    base.add_member(Member::Method(base_method.clone()));

    // Same signature, but not declared override: shadows instead
    let derived_method = fx::method(&derived, "M", &[], fx::void_type(&corlib));
    derived.add_member(Member::Method(derived_method.clone()));

    let result = overridden_or_hidden_members(&Member::Method(derived_method));
    assert!(result.overridden_members().is_empty());
    assert_eq!(result.hidden_members().len(), 1);
    assert!(Member::ptr_eq(
        &result.hidden_members()[0],
        &Member::Method(base_method)
    ));
}

#[test]
fn different_kind_same_name_hides_unconditionally() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let payload = fx::class_in(&corlib, "NS", "Payload");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let base_field = fx::field(&base, "Thing", fx::annotated(payload.clone()));
    base.add_member(Member::Field(base_field.clone()));

    let derived_method = fx::method(&derived, "Thing", &[], fx::void_type(&corlib));
    derived.add_member(Member::Method(derived_method.clone()));

    let result = overridden_or_hidden_members(&Member::Method(derived_method));
    assert!(result.overridden_members().is_empty());
    assert_eq!(result.hidden_members().len(), 1);
    assert!(Member::ptr_eq(
        &result.hidden_members()[0],
        &Member::Field(base_field)
    ));
}

#[test]
fn new_member_yields_empty_result() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let fresh = fx::method(&derived, "OnlyHere", &[], fx::void_type(&corlib));
    derived.add_member(Member::Method(fresh.clone()));

    let result = overridden_or_hidden_members(&Member::Method(fresh));
    assert!(result.is_empty());
}

#[test]
fn resolution_is_deterministic_and_cached() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let base_method = fx::method_with_modifiers(
        &base,
        "M",
        &[],
        fx::void_type(&corlib),
        SymbolModifiers::VIRTUAL,
    );
    base.add_member(Member::Method(base_method));
    let derived_method = fx::method_with_modifiers(
        &derived,
        "M",
        &[],
        fx::void_type(&corlib),
        SymbolModifiers::OVERRIDE,
    );
    derived.add_member(Member::Method(derived_method.clone()));

    let first = overridden_or_hidden_members(&Member::Method(derived_method.clone()));
    let second = overridden_or_hidden_members(&Member::Method(derived_method));
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.equals_by_value(&second));
}

#[test]
fn diamond_interface_hiding_reports_nearest_only() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let i0 = fx::interface_in(&corlib, "NS", "I0");
    let i1 = fx::interface_in(&corlib, "NS", "I1");
    let i2 = fx::interface_in(&corlib, "NS", "I2");
    i1.add_interface(fx::annotated(i0.clone()));
    i2.add_interface(fx::annotated(i0.clone()));
    i2.add_interface(fx::annotated(i1.clone()));

    let m0 = fx::method(&i0, "M", &[], fx::void_type(&corlib));
    i0.add_member(Member::Method(m0.clone()));
    let m1 = fx::method(&i1, "M", &[], fx::void_type(&corlib));
    i1.add_member(Member::Method(m1.clone()));
    let m2 = fx::method(&i2, "M", &[], fx::void_type(&corlib));
    i2.add_member(Member::Method(m2.clone()));

    let result = overridden_or_hidden_members(&Member::Method(m2));

    // I1.M is hidden directly; I0.M is hidden through I1, not independently
    assert_eq!(result.hidden_members().len(), 1);
    assert!(Member::ptr_eq(
        &result.hidden_members()[0],
        &Member::Method(m1)
    ));
    assert!(!result
        .hidden_members()
        .iter()
        .any(|h| Member::ptr_eq(h, &Member::Method(m0.clone()))));
}

#[test]
fn unrelated_sibling_interfaces_both_hidden() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let left = fx::interface_in(&corlib, "NS", "Left");
    let right = fx::interface_in(&corlib, "NS", "Right");
    let joined = fx::interface_in(&corlib, "NS", "Joined");
    joined.add_interface(fx::annotated(left.clone()));
    joined.add_interface(fx::annotated(right.clone()));

    let left_m = fx::method(&left, "M", &[], fx::void_type(&corlib));
    left.add_member(Member::Method(left_m.clone()));
    let right_m = fx::method(&right, "M", &[], fx::void_type(&corlib));
    right.add_member(Member::Method(right_m.clone()));
    let joined_m = fx::method(&joined, "M", &[], fx::void_type(&corlib));
    joined.add_member(Member::Method(joined_m.clone()));

    // Two independent paths: both members reported
    let result = overridden_or_hidden_members(&Member::Method(joined_m));
    assert_eq!(result.hidden_members().len(), 2);
}

#[test]
fn accessor_override_skips_absent_intermediate_accessor() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let payload = fx::class_in(&corlib, "NS", "Payload");
    let a = fx::class_in(&corlib, "NS", "A");
    let b = fx::class_in(&corlib, "NS", "B");
    let c = fx::class_in(&corlib, "NS", "C");
    b.set_base_type(Some(fx::annotated(a.clone())));
    c.set_base_type(Some(fx::annotated(b.clone())));

    // A declares P { get; set; }, B overrides with get only, C with set only
    let pa = fx::property_with_accessors(
        &a,
        "P",
        fx::annotated(payload.clone()),
        true,
        true,
        SymbolModifiers::VIRTUAL,
    );
    let _pb = fx::property_with_accessors(
        &b,
        "P",
        fx::annotated(payload.clone()),
        true,
        false,
        SymbolModifiers::OVERRIDE,
    );
    let pc = fx::property_with_accessors(
        &c,
        "P",
        fx::annotated(payload),
        false,
        true,
        SymbolModifiers::OVERRIDE,
    );

    let setter = pc.set_method().expect("C.P declares a setter");
    let result = overridden_or_hidden_members(&Member::Method(setter));

    // B.P has no setter, so C.P's setter overrides A.P's setter
    let expected = pa.set_method().expect("A.P declares a setter");
    assert_eq!(result.overridden_members().len(), 1);
    assert!(Member::ptr_eq(
        &result.overridden_members()[0],
        &Member::Method(expected)
    ));
}

#[test]
fn runtime_match_ignores_ref_out_distinction() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let payload = fx::class_in(&corlib, "NS", "Payload");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let base_method = fx::method_with_ref_kinds(
        &base,
        "M",
        &[(fx::annotated(payload.clone()), RefKind::Ref)],
        fx::void_type(&corlib),
    );
    base.add_member(Member::Method(base_method.clone()));

    let derived_method = fx::method_with_ref_kinds(
        &derived,
        "M",
        &[(fx::annotated(payload), RefKind::Out)],
        fx::void_type(&corlib),
    );
    derived.add_member(Member::Method(derived_method.clone()));

    let result = overridden_or_hidden_members(&Member::Method(derived_method));

    // The language sees different signatures; the runtime does not
    assert!(result.overridden_members().is_empty());
    assert!(result.hidden_members().is_empty());
    assert_eq!(result.runtime_overridden_members().len(), 1);
    assert!(Member::ptr_eq(
        &result.runtime_overridden_members()[0],
        &Member::Method(base_method)
    ));
}

#[test]
fn private_base_member_is_not_a_candidate() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let base = fx::class_in(&corlib, "NS", "Base");
    let derived = fx::class_in(&corlib, "NS", "Derived");
    derived.set_base_type(Some(fx::annotated(base.clone())));

    let hidden_private = Arc::new(MethodSymbol::new(
        "M",
        MethodKind::Ordinary,
        Accessibility::Private,
        SymbolModifiers::empty(),
        &base,
        bindscope::semantics::symbols::CallingConvention::HAS_THIS,
        RefKind::None,
    ));
    hidden_private.set_parameters(Vec::new());
    hidden_private.set_return_type(fx::void_type(&corlib));
    base.add_member(Member::Method(hidden_private));

    let derived_method = fx::method(&derived, "M", &[], fx::void_type(&corlib));
    derived.add_member(Member::Method(derived_method.clone()));

    let result = overridden_or_hidden_members(&Member::Method(derived_method));
    assert!(result.is_empty());
}

#[test]
fn override_in_constructed_base_reports_substituted_member() {
    let (_compilation, corlib) = fx::compilation_with_corlib("app");
    let concrete = fx::class_in(&corlib, "NS", "Concrete");

    // Base<T> { virtual void M(T) }, Derived : Base<Concrete> { override void M(Concrete) }
    let base = fx::generic_class_in(&corlib, "NS", "GenericBase", 1);
    let t = TypeWithAnnotation::new(
        TypeSymbol::TypeParameter(base.type_parameters()[0].clone()),
        NullableAnnotation::NotAnnotated,
    );
    let base_method = fx::method_with_modifiers(
        &base,
        "M",
        &[(t, RefKind::None)],
        fx::void_type(&corlib),
        SymbolModifiers::VIRTUAL,
    );
    base.add_member(Member::Method(base_method.clone()));

    let derived = fx::class_in(&corlib, "NS", "DerivedOfConcrete");
    let constructed_base = base
        .construct(vec![fx::annotated(concrete.clone())])
        .unwrap();
    derived.set_base_type(Some(fx::annotated(constructed_base)));

    let derived_method = fx::method_with_modifiers(
        &derived,
        "M",
        &[(fx::annotated(concrete), RefKind::None)],
        fx::void_type(&corlib),
        SymbolModifiers::OVERRIDE,
    );
    derived.add_member(Member::Method(derived_method.clone()));

    let result = overridden_or_hidden_members(&Member::Method(derived_method));
    assert_eq!(result.overridden_members().len(), 1);

    // The reported member is the substituted one; its original definition
    // is the generic declaration
    let found = &result.overridden_members()[0];
    assert!(Member::ptr_eq(
        &found.original_definition(),
        &Member::Method(base_method)
    ));
}
