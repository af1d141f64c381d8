//! Reference binding: sharing, degradation, unification, circularity.

use std::sync::Arc;

use bindscope::prelude::*;

fn corlib_fixture() -> Arc<MetadataFixture> {
    Arc::new(
        MetadataFixture::new(AssemblyIdentity::parse("corlib, Version=4.0.0.0").unwrap())
            .declaring_corlib_types(),
    )
}

#[test]
fn binding_designates_cor_library() {
    let compilation = Compilation::new("app", vec![Reference::metadata(corlib_fixture())]);
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    assert!(!binding.cor_library().is_missing());
    assert_eq!(binding.cor_library().identity().simple_name(), "corlib");
    assert!(Arc::ptr_eq(
        &compilation.cor_library().unwrap(),
        binding.cor_library()
    ));
}

#[test]
fn compilation_declaring_primitives_is_its_own_cor_library() {
    let compilation = Compilation::new("selfcor", vec![Reference::metadata(corlib_fixture())]);
    // The compiled assembly declares System.Object itself
    NamedTypeBuilder::new(compilation.assembly())
        .namespace("System")
        .name("Object")
        .kind(TypeKind::Class)
        .build();

    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);
    assert!(Arc::ptr_eq(binding.cor_library(), compilation.assembly()));
}

#[test]
fn missing_cor_library_is_a_sentinel_not_a_fault() {
    let compilation = Compilation::new("bare", Vec::new());
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    assert!(binding.cor_library().is_missing());
    // Every special type degrades to an error type
    match compilation.special_type(SpecialType::Object) {
        TypeSymbol::Error(_) => {}
        other => panic!("expected error type, got {}", other.display_name()),
    }
}

#[test]
fn identical_reference_sets_share_one_published_binding() {
    let corlib = corlib_fixture();
    let manager = Arc::new(ReferenceManager::new());

    let mut handles = Vec::new();
    for index in 0..8 {
        let corlib = corlib.clone();
        let manager = Arc::clone(&manager);
        handles.push(std::thread::spawn(move || {
            let compilation = Compilation::new(
                format!("sibling{}", index),
                vec![Reference::metadata(corlib)],
            );
            compilation.bind(&manager)
        }));
    }

    let bindings: Vec<Arc<ReferenceBinding>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Exactly one published graph; every caller sees identical symbols
    assert_eq!(manager.binding_count(), 1);
    for window in bindings.windows(2) {
        assert!(Arc::ptr_eq(&window[0], &window[1]));
        assert!(Arc::ptr_eq(
            &window[0].referenced_assemblies()[0],
            &window[1].referenced_assemblies()[0]
        ));
    }
}

#[test]
fn missing_reference_degrades_to_placeholder() {
    let absent = AssemblyIdentity::parse("Absent, Version=1.0.0.0").unwrap();
    let lib = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Lib"))
            .with_reference(absent.clone())
            .with_type(DeclaredType::class("Lib", "Widget")),
    );

    let compilation = Compilation::new("app", vec![Reference::metadata(lib)]);
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    // The unresolved dependency is a placeholder on Lib's module
    let lib_symbol = &binding.referenced_assemblies()[0];
    let dependency = &lib_symbol.manifest_module().referenced_symbols()[0];
    assert!(dependency.is_missing());
    assert_eq!(dependency.identity(), &absent);

    // Type lookups on the placeholder produce error types, never faults
    let mut visited = Vec::new();
    match dependency.resolve_top_level_metadata_type("Absent.Thing", &mut visited) {
        TypeSymbol::Error(_) => {}
        other => panic!("expected error type, got {}", other.display_name()),
    }

    assert!(!compilation
        .diagnostics()
        .with_code(DiagnosticCode::MissingAssembly)
        .is_empty());
}

#[test]
fn version_unification_records_substitution() {
    // X references L and Dep v2 directly; L references Dep v1
    let dep_v1 = AssemblyIdentity::parse("Dep, Version=1.0.0.0").unwrap();
    let dep_v2 = AssemblyIdentity::parse("Dep, Version=2.0.0.0").unwrap();

    let lib = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("L")).with_reference(dep_v1.clone()),
    );
    let dep = Arc::new(
        MetadataFixture::new(dep_v2.clone()).with_type(DeclaredType::class("Dep", "Api")),
    );

    let compilation = Compilation::new(
        "x",
        vec![Reference::metadata(lib), Reference::metadata(dep)],
    );
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    // One consistent Dep symbol, not two conflicting same-name symbols
    let lib_symbol = &binding.referenced_assemblies()[0];
    let dep_symbol = &binding.referenced_assemblies()[1];
    let lib_view_of_dep = &lib_symbol.manifest_module().referenced_symbols()[0];
    assert!(Arc::ptr_eq(lib_view_of_dep, dep_symbol));

    // The coercion is recorded on the requesting module and the binding
    let unified = &binding.unified_references()[0];
    assert_eq!(unified.requested, dep_v1);
    assert_eq!(unified.resolved, dep_v2);
    assert_eq!(lib_symbol.manifest_module().unified_references().len(), 1);
    assert!(!compilation
        .diagnostics()
        .with_code(DiagnosticCode::UnifiedReference)
        .is_empty());
}

#[test]
fn nested_metadata_names_resolve_arity_correctly() {
    let lib = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Lib")).with_type(
            DeclaredType::generic_class("NS", "Outer", 1)
                .with_nested(DeclaredType::class("NS", "Inner")),
        ),
    );
    let compilation = Compilation::new("app", vec![Reference::metadata(lib)]);
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    let lib_symbol = &binding.referenced_assemblies()[0];
    let inner = lib_symbol
        .lookup_declared_top_level_metadata_type("NS.Outer`1+Inner")
        .expect("nested lookup must resolve");
    assert_eq!(inner.name(), "Inner");
    assert_eq!(inner.arity(), 0);

    let outer = inner.containing_type().expect("Inner is nested");
    assert_eq!(outer.arity(), 1);
    assert_eq!(outer.metadata_name(), "Outer`1");

    // The wrong-arity path does not resolve
    assert!(lib_symbol
        .lookup_declared_top_level_metadata_type("NS.Outer`2+Inner")
        .is_none());
}

#[test]
fn circular_compilation_references_stay_private() {
    let a = Compilation::new("A", Vec::new());
    let b = Compilation::new("B", vec![Reference::compilation(a.clone())]);
    a.add_reference(Reference::compilation(b.clone()));

    let manager = ReferenceManager::new();
    let binding_a = a.bind(&manager);
    let binding_b = b.bind(&manager);

    assert!(binding_a.has_circular_reference());
    assert!(binding_b.has_circular_reference());
    // Circular bindings never enter the shared cache
    assert_eq!(manager.binding_count(), 0);

    // The referenced source assemblies are still wired consistently
    assert!(Arc::ptr_eq(
        &binding_a.referenced_assemblies()[0],
        b.assembly()
    ));
    assert!(Arc::ptr_eq(
        &binding_b.referenced_assemblies()[0],
        a.assembly()
    ));
}

#[test]
fn duplicate_reference_with_conflicting_interop_flag_is_reported() {
    let interop = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Interop"))
            .with_type(DeclaredType::class("Interop", "ComThing")),
    );

    let compilation = Compilation::new(
        "app",
        vec![
            Reference::metadata_linked(interop.clone()),
            Reference::metadata(interop),
        ],
    );
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    // The primary (first) reference wins deterministically
    assert_eq!(binding.referenced_assemblies().len(), 1);
    assert!(binding.referenced_assemblies()[0].is_linked());
    assert!(!compilation
        .diagnostics()
        .with_code(DiagnosticCode::ReferencePropertyConflict)
        .is_empty());
}

#[test]
fn type_forwarders_resolve_through_target_assembly() {
    let actual_home = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("NewHome"))
            .with_type(DeclaredType::class("NS", "Moved")),
    );
    let forwarder = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("OldHome"))
            .with_forwarder("NS.Moved", AssemblyIdentity::simple("NewHome")),
    );

    let compilation = Compilation::new(
        "app",
        vec![
            Reference::metadata(forwarder),
            Reference::metadata(actual_home),
        ],
    );
    let manager = ReferenceManager::new();
    let binding = compilation.bind(&manager);

    let old_home = &binding.referenced_assemblies()[0];
    let mut visited = Vec::new();
    match old_home.resolve_top_level_metadata_type("NS.Moved", &mut visited) {
        TypeSymbol::Named(found) => {
            assert_eq!(found.name(), "Moved");
            assert_eq!(
                found.containing_assembly().unwrap().identity().simple_name(),
                "NewHome"
            );
        }
        other => panic!("expected forwarded type, got {}", other.display_name()),
    }
}

#[test]
fn rebinding_returns_the_published_binding() {
    let compilation = Compilation::new("app", vec![Reference::metadata(corlib_fixture())]);
    let manager = ReferenceManager::new();

    let first = compilation.bind(&manager);
    let second = compilation.bind(&manager);
    assert!(Arc::ptr_eq(&first, &second));
}
