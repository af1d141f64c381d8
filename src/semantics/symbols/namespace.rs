//! Namespace symbols with deterministic type storage.

use std::sync::{Arc, Weak};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::semantics::symbols::{AssemblySymbol, NamedTypeRc, NamespaceRc, SymbolKind};

/// A namespace within an assembly.
///
/// Types are stored under their metadata name (`` Name`arity `` form) in a
/// `SkipMap`, which keeps iteration ordered and deterministic while allowing
/// lock-free concurrent inserts during the declaration phase. Child
/// namespaces live in a `DashMap` keyed by segment name.
#[derive(Debug)]
pub struct NamespaceSymbol {
    name: String,
    parent: Option<Weak<NamespaceSymbol>>,
    containing_assembly: Weak<AssemblySymbol>,
    children: DashMap<String, NamespaceRc>,
    types: SkipMap<String, NamedTypeRc>,
}

impl NamespaceSymbol {
    /// Create the global (root) namespace of an assembly.
    pub(crate) fn global(containing_assembly: Weak<AssemblySymbol>) -> NamespaceRc {
        Arc::new(Self {
            name: String::new(),
            parent: None,
            containing_assembly,
            children: DashMap::new(),
            types: SkipMap::new(),
        })
    }

    /// The simple segment name; empty for the global namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind (always [`SymbolKind::Namespace`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Namespace
    }

    /// True for the global (root) namespace.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    /// The parent namespace; `None` for the global namespace.
    #[must_use]
    pub fn parent(&self) -> Option<NamespaceRc> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// The dotted path from the global namespace; empty for the root.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self.parent() {
            Some(parent) if !parent.is_global() => {
                format!("{}.{}", parent.qualified_name(), self.name)
            }
            _ => self.name.clone(),
        }
    }

    /// Get or create the namespace at `dotted_path` below this one.
    ///
    /// An empty path returns this namespace itself.
    #[must_use]
    pub fn ensure_namespace(self: &Arc<Self>, dotted_path: &str) -> NamespaceRc {
        if dotted_path.is_empty() {
            return self.clone();
        }

        let mut current = self.clone();
        for segment in dotted_path.split('.') {
            let next = match current.children.get(segment) {
                Some(existing) => existing.value().clone(),
                None => {
                    let child = Arc::new(NamespaceSymbol {
                        name: segment.to_string(),
                        parent: Some(Arc::downgrade(&current)),
                        containing_assembly: current.containing_assembly.clone(),
                        children: DashMap::new(),
                        types: SkipMap::new(),
                    });
                    // A racing declaration may have inserted the same segment;
                    // keep whichever won.
                    current
                        .children
                        .entry(segment.to_string())
                        .or_insert(child)
                        .value()
                        .clone()
                }
            };
            current = next;
        }
        current
    }

    /// Look up the namespace at `dotted_path` below this one, without creating.
    #[must_use]
    pub fn lookup_namespace(self: &Arc<Self>, dotted_path: &str) -> Option<NamespaceRc> {
        if dotted_path.is_empty() {
            return Some(self.clone());
        }

        let mut current = self.clone();
        for segment in dotted_path.split('.') {
            let next = current.children.get(segment)?.value().clone();
            current = next;
        }
        Some(current)
    }

    /// Register a type under its metadata name.
    pub fn add_type(&self, ty: NamedTypeRc) {
        self.types.insert(ty.metadata_name(), ty);
    }

    /// Look up a type by metadata name (`` Name`arity `` form).
    #[must_use]
    pub fn get_type(&self, metadata_name: &str) -> Option<NamedTypeRc> {
        self.types.get(metadata_name).map(|e| e.value().clone())
    }

    /// All types in this namespace, ordered by metadata name.
    #[must_use]
    pub fn types(&self) -> Vec<NamedTypeRc> {
        self.types.iter().map(|e| e.value().clone()).collect()
    }

    /// All direct child namespaces.
    #[must_use]
    pub fn namespaces(&self) -> Vec<NamespaceRc> {
        self.children.iter().map(|e| e.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories;

    #[test]
    fn test_ensure_and_lookup_namespace() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let global = corlib.global_namespace();

        let nested = global.ensure_namespace("Alpha.Beta.Gamma");
        assert_eq!(nested.qualified_name(), "Alpha.Beta.Gamma");

        let found = global.lookup_namespace("Alpha.Beta.Gamma").unwrap();
        assert!(Arc::ptr_eq(&nested, &found));
        assert!(global.lookup_namespace("Alpha.Missing").is_none());
    }

    #[test]
    fn test_type_storage_is_ordered() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        factories::class_in(&corlib, "Order", "Zeta");
        factories::class_in(&corlib, "Order", "Alpha");
        factories::class_in(&corlib, "Order", "Mu");

        let ns = corlib
            .global_namespace()
            .lookup_namespace("Order")
            .unwrap();
        let names: Vec<String> = ns.types().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["Alpha", "Mu", "Zeta"]);
    }

    #[test]
    fn test_metadata_name_disambiguates_arity() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        factories::class_in(&corlib, "Arity", "Thing");
        factories::generic_class_in(&corlib, "Arity", "Thing", 1);

        let ns = corlib
            .global_namespace()
            .lookup_namespace("Arity")
            .unwrap();
        assert!(ns.get_type("Thing").is_some());
        assert!(ns.get_type("Thing`1").is_some());
        assert_eq!(ns.types().len(), 2);
    }
}
