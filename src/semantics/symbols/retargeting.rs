//! Retargeting wrappers: symbols re-exposed under a different assembly identity.
//!
//! When the same logical library is reachable at two different resolved
//! versions (one directly, one through an in-memory compilation reference),
//! the binder cannot hand out the underlying symbols as-is: their containing
//! assembly identity would contradict the reference that imported them.
//! A retargeting wrapper forwards most properties of the underlying symbol
//! while translating every nested type and assembly reference through a
//! [`RetargetingMap`].

use std::sync::Arc;

use crate::semantics::annotations::TypeWithAnnotation;
use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::symbols::{
    ArrayType, AssemblyRc, AssemblySymbol, Member, NamedTypeRc, NamedTypeSymbol, PointerType,
    TypeProvenance, TypeSymbol,
};

/// The assembly translation map shared by all wrappers of one retargeting.
///
/// `translations` maps assembly identities that must be re-resolved onto the
/// replacement assembly symbols; the identity of the retargeted assembly
/// itself maps onto the wrapper assembly created by
/// [`retarget_assembly`].
#[derive(Debug)]
pub struct RetargetingMap {
    retargeted_identity: AssemblyIdentity,
    translations: Vec<(AssemblyIdentity, AssemblyRc)>,
    target_assembly: std::sync::OnceLock<std::sync::Weak<AssemblySymbol>>,
}

impl RetargetingMap {
    fn new(
        retargeted_identity: AssemblyIdentity,
        translations: Vec<(AssemblyIdentity, AssemblyRc)>,
    ) -> Self {
        Self {
            retargeted_identity,
            translations,
            target_assembly: std::sync::OnceLock::new(),
        }
    }

    /// The identity the wrapper assembly reports.
    #[must_use]
    pub fn retargeted_identity(&self) -> &AssemblyIdentity {
        &self.retargeted_identity
    }

    fn target_assembly(&self) -> Option<AssemblyRc> {
        self.target_assembly.get().and_then(std::sync::Weak::upgrade)
    }

    fn translation_for(&self, identity: &AssemblyIdentity) -> Option<AssemblyRc> {
        self.translations
            .iter()
            .find(|(from, _)| from == identity)
            .map(|(_, to)| to.clone())
    }

    /// Translate a named type through this map.
    ///
    /// Types from a translated assembly are re-resolved by metadata name in
    /// the replacement assembly; types from the retargeted assembly itself
    /// are wrapped; everything else passes through unchanged. Constructed
    /// types translate their definition and arguments and are rebuilt.
    #[must_use]
    pub fn translate_named_type(self: &Arc<Self>, ty: &NamedTypeRc) -> NamedTypeRc {
        if let TypeProvenance::Constructed { definition, type_arguments, .. } = ty.provenance() {
            let new_definition = self.translate_named_type(definition);
            let new_arguments: Vec<TypeWithAnnotation> = type_arguments
                .iter()
                .map(|a| self.translate_annotated(a))
                .collect();
            return match new_definition.construct(new_arguments) {
                Ok(constructed) => constructed,
                Err(_) => ty.clone(),
            };
        }

        let Some(assembly) = ty.containing_assembly() else {
            return ty.clone();
        };

        if let Some(replacement) = self.translation_for(assembly.identity()) {
            if let Some(resolved) =
                replacement.lookup_declared_top_level_metadata_type(&full_metadata_path(ty))
            {
                return resolved;
            }
            // The replacement version lacks the type; keep the underlying
            // symbol so a use-site diagnostic can surface later.
            return ty.clone();
        }

        if *assembly.identity() == self.retargeted_identity {
            if let Some(target) = self.target_assembly() {
                let wrapper = Arc::new(NamedTypeSymbol::new(
                    ty.name().to_string(),
                    ty.namespace().to_string(),
                    ty.arity(),
                    ty.type_kind(),
                    TypeProvenance::Retargeting {
                        underlying: ty.clone(),
                        map: self.clone(),
                    },
                    ty.accessibility(),
                    ty.modifiers(),
                    Arc::downgrade(&target),
                ));
                wrapper.set_type_parameters(ty.type_parameters().to_vec());
                if let Some(special) = ty.special_type() {
                    wrapper.set_special_type(special);
                }
                return wrapper;
            }
        }

        ty.clone()
    }

    /// Translate an annotated type reference, preserving annotation and modifiers.
    #[must_use]
    pub fn translate_annotated(self: &Arc<Self>, reference: &TypeWithAnnotation) -> TypeWithAnnotation {
        if reference.is_unset() {
            return reference.clone();
        }
        let translated = match reference.ty() {
            TypeSymbol::Named(t) => TypeSymbol::Named(self.translate_named_type(&t)),
            TypeSymbol::Array(a) => TypeSymbol::Array(Arc::new(ArrayType {
                element: self.translate_annotated(&a.element),
                rank: a.rank,
            })),
            TypeSymbol::Pointer(p) => TypeSymbol::Pointer(Arc::new(PointerType {
                pointee: self.translate_annotated(&p.pointee),
            })),
            other => other,
        };
        TypeWithAnnotation::with_parts(translated, reference.annotation(), reference.custom_modifiers())
    }

    /// Translate a member into a retargeted containing type.
    ///
    /// Methods are substituted with an empty map so their signature types
    /// re-resolve through this translation; fields, properties and events
    /// translate through the same path on access.
    #[must_use]
    pub fn translate_member(self: &Arc<Self>, member: &Member, new_container: &NamedTypeRc) -> Member {
        let empty = Arc::new(crate::semantics::symbols::TypeSubstitution::from_pairs(Vec::new()));
        let substituted = member.substitute(&empty, new_container);
        match &substituted {
            Member::Method(m) => {
                // Re-publish the signature through the translation map.
                let translated = Arc::new(crate::semantics::symbols::MethodSymbol::new(
                    m.name(),
                    m.method_kind(),
                    m.accessibility(),
                    m.modifiers(),
                    new_container,
                    m.calling_convention(),
                    m.return_ref_kind(),
                ));
                translated.set_type_parameters(m.type_parameters().to_vec());
                translated.set_parameters(
                    m.parameters()
                        .iter()
                        .map(|p| {
                            Arc::new(crate::semantics::symbols::ParameterSymbol::new(
                                p.name(),
                                p.ordinal(),
                                self.translate_annotated(p.parameter_type()),
                                p.ref_kind(),
                            ))
                        })
                        .collect(),
                );
                translated.set_return_type(self.translate_annotated(&m.return_type()));
                Member::Method(translated)
            }
            _ => substituted,
        }
    }
}

/// The full metadata path of a type, including nested segments
/// (`` NS.Outer`1+Inner ``).
fn full_metadata_path(ty: &NamedTypeRc) -> String {
    let mut segments = vec![ty.metadata_name()];
    let mut current = ty.containing_type();
    let mut namespace = ty.namespace().to_string();
    while let Some(containing) = current {
        segments.push(containing.metadata_name());
        namespace = containing.namespace().to_string();
        current = containing.containing_type();
    }
    segments.reverse();
    let nested = segments.join("+");
    if namespace.is_empty() {
        nested
    } else {
        format!("{}.{}", namespace, nested)
    }
}

/// Create a retargeting assembly reporting `underlying` under `new_identity`.
///
/// `translations` maps further assembly identities (typically transitive
/// references of the underlying assembly) onto their replacement symbols.
#[must_use]
pub fn retarget_assembly(
    underlying: &AssemblyRc,
    new_identity: AssemblyIdentity,
    translations: Vec<(AssemblyIdentity, AssemblyRc)>,
) -> AssemblyRc {
    let map = Arc::new(RetargetingMap::new(
        underlying.identity().clone(),
        translations,
    ));
    let assembly = AssemblySymbol::new_retargeting(new_identity, underlying.clone(), map.clone());
    let _ = map.target_assembly.set(Arc::downgrade(&assembly));
    assembly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::identity::AssemblyVersion;
    use crate::test::factories;

    #[test]
    fn test_retargeted_type_reports_new_assembly() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let underlying_type = factories::class_in(&corlib, "NS", "Widget");

        let new_identity = AssemblyIdentity::new(
            corlib.identity().simple_name(),
            AssemblyVersion::new(9, 0, 0, 0),
            None,
            None,
        );
        let retargeted = retarget_assembly(&corlib, new_identity.clone(), Vec::new());

        let found = retargeted
            .lookup_declared_top_level_metadata_type("NS.Widget")
            .unwrap();
        assert_eq!(found.name(), "Widget");
        assert!(!Arc::ptr_eq(&found, &underlying_type));
        assert_eq!(
            found.containing_assembly().unwrap().identity(),
            &new_identity
        );
        // The wrapper is its own original definition
        assert!(Arc::ptr_eq(&found.original_definition(), &found));
    }

    #[test]
    fn test_retargeted_equality_peels_to_underlying() {
        use crate::semantics::symbols::TypeCompareKind;

        let (_, corlib) = factories::compilation_with_corlib("lib");
        let underlying_type = factories::class_in(&corlib, "NS", "Widget");

        let retargeted = retarget_assembly(
            &corlib,
            AssemblyIdentity::new(
                corlib.identity().simple_name(),
                AssemblyVersion::new(9, 0, 0, 0),
                None,
                None,
            ),
            Vec::new(),
        );
        let wrapped = retargeted
            .lookup_declared_top_level_metadata_type("NS.Widget")
            .unwrap();

        assert!(TypeSymbol::Named(wrapped).equals(
            &TypeSymbol::Named(underlying_type),
            TypeCompareKind::CONSIDER_EVERYTHING
        ));
    }
}
