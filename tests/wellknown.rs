//! Special and well-known entity lookup across the reference set.

use std::sync::Arc;

use bindscope::prelude::*;
use bindscope::test_fixtures as fx;

fn corlib_fixture() -> Arc<MetadataFixture> {
    Arc::new(
        MetadataFixture::new(AssemblyIdentity::parse("corlib, Version=4.0.0.0").unwrap())
            .declaring_corlib_types(),
    )
}

#[test]
fn special_types_resolve_only_from_cor_library() {
    // A second reference also declares System.Int32; it must be ignored
    let impostor = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Impostor"))
            .with_type(DeclaredType::class("System", "Int32")),
    );
    let compilation = Compilation::new(
        "app",
        vec![
            Reference::metadata(corlib_fixture()),
            Reference::metadata(impostor),
        ],
    );
    let manager = ReferenceManager::new();
    let _ = compilation.bind(&manager);

    match compilation.special_type(SpecialType::Int32) {
        TypeSymbol::Named(int32) => {
            assert_eq!(
                int32.containing_assembly().unwrap().identity().simple_name(),
                "corlib"
            );
            assert_eq!(int32.special_type(), Some(SpecialType::Int32));
        }
        other => panic!("expected Int32, got {}", other.display_name()),
    }
}

#[test]
fn special_type_lookups_memoize() {
    let (compilation, _corlib) = fx::compilation_with_corlib("app");

    let first = compilation.special_type(SpecialType::String);
    let second = compilation.special_type(SpecialType::String);
    match (first, second) {
        (TypeSymbol::Named(a), TypeSymbol::Named(b)) => assert!(Arc::ptr_eq(&a, &b)),
        _ => panic!("String must resolve"),
    }
}

#[test]
fn well_known_type_prefers_compiled_assembly() {
    let other = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Other"))
            .with_type(DeclaredType::class("System", "ObsoleteAttribute")),
    );
    let compilation = Compilation::new(
        "app",
        vec![
            Reference::metadata(corlib_fixture()),
            Reference::metadata(other),
        ],
    );
    // The compiled assembly declares the attribute itself
    NamedTypeBuilder::new(compilation.assembly())
        .namespace("System")
        .name("ObsoleteAttribute")
        .kind(TypeKind::Class)
        .build();

    let manager = ReferenceManager::new();
    let _ = compilation.bind(&manager);

    match compilation.well_known_type(WellKnownType::ObsoleteAttribute) {
        TypeSymbol::Named(found) => {
            assert!(Arc::ptr_eq(
                &found.containing_assembly().unwrap(),
                compilation.assembly()
            ));
        }
        other => panic!("expected attribute type, got {}", other.display_name()),
    }
    // No ambiguity is reported: the compiled assembly wins outright
    assert!(compilation
        .diagnostics()
        .with_code(DiagnosticCode::AmbiguousWellKnownType)
        .is_empty());
}

#[test]
fn ambiguous_well_known_type_reports_both_candidates() {
    let first = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("First"))
            .with_type(DeclaredType::class("System", "ObsoleteAttribute")),
    );
    let second = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Second"))
            .with_type(DeclaredType::class("System", "ObsoleteAttribute")),
    );
    let compilation = Compilation::new(
        "app",
        vec![
            Reference::metadata(corlib_fixture()),
            Reference::metadata(first),
            Reference::metadata(second),
        ],
    );
    let manager = ReferenceManager::new();
    let _ = compilation.bind(&manager);

    match compilation.well_known_type(WellKnownType::ObsoleteAttribute) {
        TypeSymbol::Error(error) => {
            assert_eq!(error.candidates().len(), 2);
        }
        other => panic!("expected ambiguity, got {}", other.display_name()),
    }

    let reported = compilation
        .diagnostics()
        .with_code(DiagnosticCode::AmbiguousWellKnownType);
    assert_eq!(reported.len(), 1);
    assert!(reported[0].args.iter().any(|a| a.contains("First")));
    assert!(reported[0].args.iter().any(|a| a.contains("Second")));
}

#[test]
fn legacy_well_known_duplicate_warns_and_picks_first() {
    let first = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("First")).with_type(DeclaredType::class(
            "System.Runtime.CompilerServices",
            "ExtensionAttribute",
        )),
    );
    let second = Arc::new(
        MetadataFixture::new(AssemblyIdentity::simple("Second")).with_type(DeclaredType::class(
            "System.Runtime.CompilerServices",
            "ExtensionAttribute",
        )),
    );
    let compilation = Compilation::new(
        "app",
        vec![
            Reference::metadata(corlib_fixture()),
            Reference::metadata(first),
            Reference::metadata(second),
        ],
    );
    let manager = ReferenceManager::new();
    let _ = compilation.bind(&manager);

    match compilation.well_known_type(WellKnownType::ExtensionAttribute) {
        TypeSymbol::Named(found) => {
            assert_eq!(
                found.containing_assembly().unwrap().identity().simple_name(),
                "First"
            );
        }
        other => panic!("expected legacy pick, got {}", other.display_name()),
    }

    let reported = compilation
        .diagnostics()
        .with_code(DiagnosticCode::AmbiguousWellKnownType);
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].severity, DiagnosticSeverity::Warning);
}

#[test]
fn missing_optional_well_known_type_degrades_silently() {
    let (compilation, _corlib) = fx::compilation_with_corlib("app");

    match compilation.well_known_type(WellKnownType::TaskT) {
        TypeSymbol::Error(_) => {}
        other => panic!("expected missing, got {}", other.display_name()),
    }
    // Optional entities produce no diagnostic; dependent features skip
    assert!(compilation
        .diagnostics()
        .with_code(DiagnosticCode::MissingAssembly)
        .is_empty());
}

#[test]
fn well_known_member_resolves_by_shape() {
    let (compilation, _corlib) = fx::compilation_with_corlib("app");

    // Give the nullable wrapper its HasValue property
    let nullable = fx::nullable_definition(&compilation);
    let boolean = match compilation.special_type(SpecialType::Boolean) {
        TypeSymbol::Named(boolean) => boolean,
        other => panic!("Boolean missing: {}", other.display_name()),
    };
    let _has_value = fx::property_with_accessors(
        &nullable,
        "HasValue",
        fx::annotated(boolean),
        true,
        false,
        SymbolModifiers::empty(),
    );

    let member = compilation
        .well_known_member(WellKnownMember::NullableHasValue)
        .expect("HasValue must resolve");
    assert_eq!(member.kind(), SymbolKind::Property);
    assert_eq!(member.name(), "HasValue");
}

#[test]
fn absent_well_known_member_degrades_to_none() {
    let (compilation, _corlib) = fx::compilation_with_corlib("app");
    // Nullable`1 exists but declares no members in the fixture
    assert!(compilation
        .well_known_member(WellKnownMember::NullableValue)
        .is_none());
}
