//! Assembly and module symbols.
//!
//! An [`AssemblySymbol`] is the root of a symbol graph for one referenced or
//! compiled assembly. It owns an ordered, non-empty module list (the first
//! module is the manifest module), a namespace tree, and the designation of
//! the core library that supplies primitive types.
//!
//! Missing assemblies are represented by a sentinel symbol whose lookups
//! produce error types rather than faulting, so one unresolved reference
//! never aborts binding of the rest of the graph.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock, Weak,
};

use dashmap::DashMap;

use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::symbols::{
    AssemblyRc, ErrorTypeSymbol, ModuleRc, NamedTypeRc, NamespaceRc, NamespaceSymbol,
    RetargetingMap, SymbolKind, TypeSymbol,
};

/// Where an assembly symbol came from.
#[derive(Debug)]
pub enum AssemblyProvenance {
    /// The assembly being compiled from source
    Source,
    /// An assembly imported from a referenced binary
    Metadata,
    /// A wrapper reporting `underlying` under a different identity
    Retargeting {
        /// The wrapped assembly
        underlying: AssemblyRc,
        /// The assembly translation map
        map: Arc<RetargetingMap>,
    },
    /// A sentinel for a reference that could not be resolved
    Missing,
}

/// A reference that was version-coerced onto a different resolved identity.
///
/// Recorded on the module whose reference table required the coercion;
/// surfaced later as `UnifiedReference` diagnostics and use-site
/// information.
#[derive(Debug, Clone)]
pub struct UnifiedReference {
    /// The identity the reference asked for
    pub requested: AssemblyIdentity,
    /// The identity it was bound to
    pub resolved: AssemblyIdentity,
}

/// A module within an assembly.
///
/// Modules carry the assembly-reference table: the ordered identities the
/// module declared, and (after binding) the resolved assembly symbols those
/// identities were bound to, including missing placeholders.
#[derive(Debug)]
pub struct ModuleSymbol {
    name: String,
    ordinal: u32,
    containing_assembly: Weak<AssemblySymbol>,
    referenced_identities: OnceLock<Vec<AssemblyIdentity>>,
    referenced_symbols: OnceLock<Vec<AssemblyRc>>,
    unified: boxcar::Vec<UnifiedReference>,
}

impl ModuleSymbol {
    fn new(name: String, ordinal: u32, containing_assembly: Weak<AssemblySymbol>) -> Self {
        Self {
            name,
            ordinal,
            containing_assembly,
            referenced_identities: OnceLock::new(),
            referenced_symbols: OnceLock::new(),
            unified: boxcar::Vec::new(),
        }
    }

    /// The module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind (always [`SymbolKind::Module`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Module
    }

    /// Zero-based position; the manifest module is ordinal 0.
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// The owning assembly.
    #[must_use]
    pub fn containing_assembly(&self) -> Option<AssemblyRc> {
        self.containing_assembly.upgrade()
    }

    /// Wire this module's reference table to its resolved symbols.
    ///
    /// Published exactly once by the reference binder; identities and
    /// symbols are parallel lists.
    pub fn set_references(
        &self,
        identities: Vec<AssemblyIdentity>,
        symbols: Vec<AssemblyRc>,
    ) {
        debug_assert_eq!(identities.len(), symbols.len());
        let _ = self.referenced_identities.set(identities);
        let _ = self.referenced_symbols.set(symbols);
    }

    /// True once the binder has wired this module's reference table.
    #[must_use]
    pub fn references_wired(&self) -> bool {
        self.referenced_symbols.get().is_some()
    }

    /// The identities this module's reference table declared.
    #[must_use]
    pub fn referenced_identities(&self) -> &[AssemblyIdentity] {
        self.referenced_identities.get().map_or(&[], Vec::as_slice)
    }

    /// The resolved assembly symbols, parallel to
    /// [`referenced_identities`](Self::referenced_identities).
    #[must_use]
    pub fn referenced_symbols(&self) -> &[AssemblyRc] {
        self.referenced_symbols.get().map_or(&[], Vec::as_slice)
    }

    /// Record a version unification applied to one of this module's references.
    ///
    /// Idempotent: sibling bindings that reuse this module record the same
    /// coercion; duplicates are dropped.
    pub fn add_unified_reference(&self, unified: UnifiedReference) {
        let exists = self.unified.iter().any(|(_, existing)| {
            existing.requested == unified.requested && existing.resolved == unified.resolved
        });
        if !exists {
            self.unified.push(unified);
        }
    }

    /// All unifications recorded for this module.
    #[must_use]
    pub fn unified_references(&self) -> Vec<UnifiedReference> {
        self.unified.iter().map(|(_, u)| u.clone()).collect()
    }
}

/// An assembly symbol: identity, modules, namespace tree, corlib designation.
#[derive(Debug)]
pub struct AssemblySymbol {
    identity: AssemblyIdentity,
    provenance: AssemblyProvenance,
    modules: Vec<ModuleRc>,
    global_namespace: NamespaceRc,
    cor_library: OnceLock<Weak<AssemblySymbol>>,
    is_linked: AtomicBool,
    forwarders: DashMap<String, Weak<AssemblySymbol>>,
}

impl AssemblySymbol {
    fn build(
        identity: AssemblyIdentity,
        provenance: AssemblyProvenance,
        module_names: Vec<String>,
    ) -> AssemblyRc {
        debug_assert!(!module_names.is_empty(), "module list must be non-empty");
        Arc::new_cyclic(|weak: &Weak<AssemblySymbol>| {
            let modules = module_names
                .into_iter()
                .enumerate()
                .map(|(ordinal, name)| {
                    Arc::new(ModuleSymbol::new(name, ordinal as u32, weak.clone()))
                })
                .collect();
            AssemblySymbol {
                identity,
                provenance,
                modules,
                global_namespace: NamespaceSymbol::global(weak.clone()),
                cor_library: OnceLock::new(),
                is_linked: AtomicBool::new(false),
                forwarders: DashMap::new(),
            }
        })
    }

    /// Create the source assembly for a compilation.
    ///
    /// A single manifest module named `<name>.dll` is created.
    #[must_use]
    pub fn new_source(identity: AssemblyIdentity) -> AssemblyRc {
        let manifest = format!("{}.dll", identity.simple_name());
        Self::build(identity, AssemblyProvenance::Source, vec![manifest])
    }

    /// Create an assembly imported from metadata.
    #[must_use]
    pub fn new_metadata(identity: AssemblyIdentity, module_names: Vec<String>) -> AssemblyRc {
        let module_names = if module_names.is_empty() {
            vec![format!("{}.dll", identity.simple_name())]
        } else {
            module_names
        };
        Self::build(identity, AssemblyProvenance::Metadata, module_names)
    }

    pub(crate) fn new_retargeting(
        identity: AssemblyIdentity,
        underlying: AssemblyRc,
        map: Arc<RetargetingMap>,
    ) -> AssemblyRc {
        let manifest = format!("{}.dll", identity.simple_name());
        Self::build(
            identity,
            AssemblyProvenance::Retargeting { underlying, map },
            vec![manifest],
        )
    }

    /// Create the missing-assembly sentinel for an unresolved identity.
    ///
    /// All type lookups on the sentinel produce error types; none fault.
    #[must_use]
    pub fn missing(identity: AssemblyIdentity) -> AssemblyRc {
        let manifest = format!("{}.dll", identity.simple_name());
        Self::build(identity, AssemblyProvenance::Missing, vec![manifest])
    }

    /// This assembly's identity.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.identity
    }

    /// The symbol kind (always [`SymbolKind::Assembly`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Assembly
    }

    /// Where this assembly symbol came from.
    #[must_use]
    pub fn provenance(&self) -> &AssemblyProvenance {
        &self.provenance
    }

    /// True for the missing-assembly sentinel.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self.provenance, AssemblyProvenance::Missing)
    }

    /// True when this assembly was referenced with embed-interop-types.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.is_linked.load(Ordering::Acquire)
    }

    /// Mark this assembly as linked (embed-interop-types).
    pub fn mark_linked(&self) {
        self.is_linked.store(true, Ordering::Release);
    }

    /// The ordered module list; the first module is the manifest module.
    #[must_use]
    pub fn modules(&self) -> &[ModuleRc] {
        &self.modules
    }

    /// The manifest module.
    #[must_use]
    pub fn manifest_module(&self) -> &ModuleRc {
        &self.modules[0]
    }

    /// The root of this assembly's namespace tree.
    #[must_use]
    pub fn global_namespace(&self) -> &NamespaceRc {
        match &self.provenance {
            AssemblyProvenance::Retargeting { underlying, .. } => underlying.global_namespace(),
            _ => &self.global_namespace,
        }
    }

    /// Designate the core library supplying primitive types.
    ///
    /// Set exactly once by the reference binder before any primitive-type
    /// query succeeds. A second designation is a logic error.
    pub fn set_cor_library(&self, cor_library: &AssemblyRc) {
        let result = self.cor_library.set(Arc::downgrade(cor_library));
        debug_assert!(
            result.is_ok(),
            "core library designated twice for {}",
            self.identity
        );
    }

    /// The designated core library, if the binder has run.
    #[must_use]
    pub fn cor_library(&self) -> Option<AssemblyRc> {
        self.cor_library.get().and_then(Weak::upgrade)
    }

    /// Register a type forwarder from this assembly to `target`.
    pub fn add_type_forwarder(&self, metadata_name: impl Into<String>, target: &AssemblyRc) {
        self.forwarders
            .insert(metadata_name.into(), Arc::downgrade(target));
    }

    /// Look up a top-level type declared in this assembly by metadata name.
    ///
    /// The name uses metadata conventions: dotted namespace, `` `arity ``
    /// suffixes, and `+` separators for nested types
    /// (`` NS.Outer`1+Inner ``). Arity is resolved per segment: `` Outer`1 ``
    /// finds the arity-1 definition, then `Inner` resolves as declared
    /// relative to it.
    #[must_use]
    pub fn lookup_declared_top_level_metadata_type(&self, metadata_name: &str) -> Option<NamedTypeRc> {
        if let AssemblyProvenance::Retargeting { underlying, map } = &self.provenance {
            return underlying
                .lookup_declared_top_level_metadata_type(metadata_name)
                .map(|t| map.translate_named_type(&t));
        }
        if self.is_missing() {
            return None;
        }

        let mut nested_segments = metadata_name.split('+');
        let top_level = nested_segments.next()?;

        let (namespace_path, type_name) = match top_level.rfind('.') {
            Some(split) => (&top_level[..split], &top_level[split + 1..]),
            None => ("", top_level),
        };

        let namespace = self.global_namespace.lookup_namespace(namespace_path)?;
        let mut current = namespace.get_type(type_name)?;

        for segment in nested_segments {
            current = current.get_nested_type(segment)?;
        }
        Some(current)
    }

    /// Resolve a top-level type by metadata name, following type forwarders.
    ///
    /// Forwarder chains are walked with an explicit visited set; a cycle
    /// produces an error type carrying the circular-forwarding diagnostic,
    /// never a stack overflow. Missing assemblies and absent types produce
    /// missing error types.
    #[must_use]
    pub fn resolve_top_level_metadata_type(
        self: &Arc<Self>,
        metadata_name: &str,
        visited: &mut Vec<AssemblyIdentity>,
    ) -> TypeSymbol {
        if let Some(found) = self.lookup_declared_top_level_metadata_type(metadata_name) {
            return TypeSymbol::Named(found);
        }

        if let Some(target) = self
            .forwarders
            .get(metadata_name)
            .and_then(|w| w.value().upgrade())
        {
            if visited.iter().any(|v| *v == self.identity) {
                return TypeSymbol::Error(Arc::new(ErrorTypeSymbol::forwarding_cycle(
                    metadata_name,
                    &self.identity.display_name(),
                )));
            }
            visited.push(self.identity.clone());
            return target.resolve_top_level_metadata_type(metadata_name, visited);
        }

        TypeSymbol::Error(Arc::new(ErrorTypeSymbol::missing(
            metadata_name,
            Some(&self.identity.display_name()),
        )))
    }
}
