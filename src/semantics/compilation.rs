//! The per-compilation root object.
//!
//! A [`Compilation`] ties one source assembly to its declared references and
//! hosts the per-compilation caches: the published reference binding and the
//! dense special/well-known entity tables. It owns no binding logic itself;
//! binding happens through a
//! [`ReferenceManager`](crate::semantics::references::ReferenceManager)
//! passed in by the caller.
//!
//! # Thread Safety
//!
//! A compilation is shareable across threads from creation. Every cache is a
//! publish-once cell: racing lookups may compute redundantly, but exactly
//! one result is published and debug builds assert the discarded results
//! were equal to the winner's.

use std::sync::{Arc, OnceLock, RwLock};

use strum::EnumCount;

use crate::semantics::diagnostics::Diagnostics;
use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::references::{Reference, ReferenceBinding, ReferenceManager};
use crate::semantics::symbols::{AssemblyRc, AssemblySymbol, Member, NamespaceRc, TypeSymbol};
use crate::semantics::wellknown::{
    self, SpecialType, WellKnownMember, WellKnownType,
};

/// One compilation: a source assembly, its references, and its caches.
pub struct Compilation {
    name: String,
    assembly: AssemblyRc,
    references: RwLock<Vec<Reference>>,
    binding: OnceLock<Arc<ReferenceBinding>>,
    special_types: Vec<OnceLock<TypeSymbol>>,
    well_known_types: Vec<OnceLock<TypeSymbol>>,
    well_known_members: Vec<OnceLock<Option<Member>>>,
    diagnostics: Diagnostics,
}

impl Compilation {
    /// Create a compilation named `name` with the given references.
    ///
    /// The source assembly symbol is created immediately with a weak
    /// (unversioned) identity derived from the name.
    #[must_use]
    pub fn new(name: impl Into<String>, references: Vec<Reference>) -> Arc<Self> {
        let name = name.into();
        Self::with_identity(AssemblyIdentity::simple(name), references)
    }

    /// Create a compilation with an explicit assembly identity.
    #[must_use]
    pub fn with_identity(identity: AssemblyIdentity, references: Vec<Reference>) -> Arc<Self> {
        let name = identity.simple_name().to_string();
        Arc::new(Self {
            name,
            assembly: AssemblySymbol::new_source(identity),
            references: RwLock::new(references),
            binding: OnceLock::new(),
            special_types: (0..SpecialType::COUNT).map(|_| OnceLock::new()).collect(),
            well_known_types: (0..WellKnownType::COUNT).map(|_| OnceLock::new()).collect(),
            well_known_members: (0..WellKnownMember::COUNT)
                .map(|_| OnceLock::new())
                .collect(),
            diagnostics: Diagnostics::new(),
        })
    }

    /// The compilation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source assembly symbol being compiled.
    #[must_use]
    pub fn assembly(&self) -> &AssemblyRc {
        &self.assembly
    }

    /// The source assembly's global namespace.
    #[must_use]
    pub fn global_namespace(&self) -> NamespaceRc {
        self.assembly.global_namespace().clone()
    }

    /// The declared references, in declaration order.
    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        read_lock!(self.references).clone()
    }

    /// Declare an additional reference.
    ///
    /// Only valid before binding; references added after the binding is
    /// published are ignored by that binding.
    pub fn add_reference(&self, reference: Reference) {
        write_lock!(self.references).push(reference);
    }

    /// Bind this compilation's references through `manager`.
    ///
    /// Idempotent: later calls return the already-published binding.
    #[must_use]
    pub fn bind(self: &Arc<Self>, manager: &ReferenceManager) -> Arc<ReferenceBinding> {
        manager.bind(self)
    }

    /// The published reference binding, if binding has run.
    #[must_use]
    pub fn binding(&self) -> Option<Arc<ReferenceBinding>> {
        self.binding.get().cloned()
    }

    /// Publish a binding; the first writer wins.
    ///
    /// Returns the published binding plus whether this caller was the first
    /// writer (and therefore responsible for per-compilation wiring).
    pub(crate) fn publish_binding(
        &self,
        binding: Arc<ReferenceBinding>,
    ) -> (Arc<ReferenceBinding>, bool) {
        match self.binding.set(binding.clone()) {
            Ok(()) => (binding, true),
            // A racing bind finished first; adopt its result and drop ours.
            Err(_) => (
                self.binding
                    .get()
                    .expect("published binding must exist")
                    .clone(),
                false,
            ),
        }
    }

    /// The resolved reference assemblies, in declaration order.
    ///
    /// Empty before binding.
    #[must_use]
    pub fn referenced_assemblies(&self) -> Vec<AssemblyRc> {
        self.assembly
            .manifest_module()
            .referenced_symbols()
            .to_vec()
    }

    /// The designated core library, if binding has run.
    #[must_use]
    pub fn cor_library(&self) -> Option<AssemblyRc> {
        self.assembly.cor_library()
    }

    /// This compilation's diagnostics sink.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Resolve a special type from the core library, memoized.
    ///
    /// Before binding designates a core library, every special type is a
    /// missing error type (and is not cached as such).
    #[must_use]
    pub fn special_type(&self, special: SpecialType) -> TypeSymbol {
        if self.assembly.cor_library().is_none() {
            return wellknown::resolve_special_type(self, special);
        }
        Self::memoize(&self.special_types[special as usize], || {
            wellknown::resolve_special_type(self, special)
        })
    }

    /// Resolve a well-known type across the reference set, memoized.
    #[must_use]
    pub fn well_known_type(&self, well_known: WellKnownType) -> TypeSymbol {
        Self::memoize(&self.well_known_types[well_known as usize], || {
            wellknown::resolve_well_known_type(self, well_known, false)
        })
    }

    /// Resolve a well-known type, excluding the core library's candidate
    /// from duplicate resolution. Uncached; used during library migrations.
    #[must_use]
    pub fn well_known_type_ignoring_cor_library(&self, well_known: WellKnownType) -> TypeSymbol {
        wellknown::resolve_well_known_type(self, well_known, true)
    }

    /// Resolve a well-known member by shape, memoized.
    ///
    /// `None` means the member (or its parent type) is absent; dependent
    /// features degrade silently.
    #[must_use]
    pub fn well_known_member(&self, member: WellKnownMember) -> Option<Member> {
        self.well_known_members[member as usize]
            .get_or_init(|| wellknown::resolve_well_known_member(self, member))
            .clone()
    }

    /// First-writer-wins memoization with a debug-build equality assertion
    /// on discarded results.
    fn memoize(cell: &OnceLock<TypeSymbol>, compute: impl FnOnce() -> TypeSymbol) -> TypeSymbol {
        if let Some(existing) = cell.get() {
            return existing.clone();
        }
        let computed = compute();
        match cell.set(computed.clone()) {
            Ok(()) => computed,
            Err(_) => {
                let winner = cell.get().expect("published entry must exist").clone();
                debug_assert!(
                    winner.equals(
                        &computed,
                        crate::semantics::symbols::TypeCompareKind::ALL_IGNORE_OPTIONS
                    ),
                    "racing well-known resolutions disagreed"
                );
                winner
            }
        }
    }
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("name", &self.name)
            .field("identity", &self.assembly.identity().display_name())
            .field("bound", &self.binding.get().is_some())
            .finish()
    }
}
