//! The reference manager: one consistent symbol graph per reference set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rayon::prelude::*;

use crate::semantics::compilation::Compilation;
use crate::semantics::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::references::binding::{
    bind_identity, designate_cor_library, materialize_assembly, IdentityMatch, ReferenceBinding,
    UnificationPolicy,
};
use crate::semantics::references::{Reference, SymbolCache};
use crate::semantics::symbols::{
    retarget_assembly, AssemblyProvenance, AssemblyRc, AssemblySymbol, UnifiedReference,
};

/// Cache key for one reference set: sorted (identity, embed-interop) pairs.
type ReferenceSetKey = Vec<(String, bool)>;

/// The cross-module reference binder.
///
/// Executes the binding protocol once per distinct reference set and shares
/// the published result across compilations declaring the identical set.
/// All expensive work (collection, matching, materialization) runs outside
/// the publish lock; racing binders are safe and merely wasteful - the
/// first to publish wins and the losers adopt the published graph.
///
/// This is an explicit cache service object: callers create one and pass it
/// wherever binding happens, rather than relying on hidden global state.
#[derive(Default)]
pub struct ReferenceManager {
    binding_cache: DashMap<ReferenceSetKey, Arc<ReferenceBinding>>,
    symbol_cache: SymbolCache,
    publish_lock: Mutex<()>,
}

impl ReferenceManager {
    /// Create a new reference manager with empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binding_cache: DashMap::new(),
            symbol_cache: SymbolCache::new(),
            publish_lock: Mutex::new(()),
        }
    }

    /// The process-wide weak symbol cache this manager populates.
    #[must_use]
    pub fn symbol_cache(&self) -> &SymbolCache {
        &self.symbol_cache
    }

    /// Number of published (shared) bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.binding_cache.len()
    }

    /// Bind `compilation`'s references into a consistent symbol graph.
    ///
    /// Idempotent per compilation: the first call computes (or adopts a
    /// shared) binding; later calls return the published one. A binding
    /// whose reference graph loops back onto the compilation itself is
    /// private and never enters the shared cache.
    #[must_use]
    pub fn bind(&self, compilation: &Arc<Compilation>) -> Arc<ReferenceBinding> {
        if let Some(existing) = compilation.binding() {
            return existing;
        }

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let references = self.deduplicate(compilation.references(), &mut diagnostics);

        let has_circular = references
            .iter()
            .any(|reference| references_back_to(reference, compilation));

        let key = Self::reference_set_key(&references);
        if !has_circular {
            if let Some(shared) = self.binding_cache.get(&key) {
                let (adopted, is_first) = compilation.publish_binding(shared.clone());
                if is_first {
                    Self::finalize(compilation, &adopted);
                }
                return adopted;
            }
        }

        let binding = self.compute_binding(compilation, &references, has_circular, diagnostics);

        // Circular bindings stay private to this compilation; correctness
        // over reuse.
        if has_circular {
            let (adopted, is_first) = compilation.publish_binding(binding);
            if is_first {
                Self::finalize(compilation, &adopted);
            }
            return adopted;
        }

        // Publication is the only serialized step. A racing binder that
        // finished first wins; our redundant graph is dropped undamaged
        // because nothing global mutated before this point.
        let shared = {
            let _guard = lock!(self.publish_lock);
            match self.binding_cache.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    self.binding_cache.insert(key, binding.clone());
                    binding
                }
            }
        };
        let (adopted, is_first) = compilation.publish_binding(shared);
        if is_first {
            Self::finalize(compilation, &adopted);
        }
        adopted
    }

    /// Drop duplicate references; the primary (first) reference wins, and
    /// conflicting embed-interop flags on a duplicate are reported.
    fn deduplicate(
        &self,
        references: Vec<Reference>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Reference> {
        let mut deduped: Vec<Reference> = Vec::new();
        for reference in references {
            if let Some(primary) = deduped
                .iter()
                .find(|existing| existing.identity() == reference.identity())
            {
                if primary.properties().embed_interop_types
                    != reference.properties().embed_interop_types
                {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        DiagnosticCode::ReferencePropertyConflict,
                        [
                            reference.identity().display_name(),
                            "embed_interop_types".to_string(),
                        ],
                    ));
                }
                continue;
            }
            deduped.push(reference);
        }
        deduped
    }

    fn reference_set_key(references: &[Reference]) -> ReferenceSetKey {
        let mut key: ReferenceSetKey = references
            .iter()
            .map(|r| {
                (
                    r.identity().display_name(),
                    r.properties().embed_interop_types,
                )
            })
            .collect();
        key.sort();
        key
    }

    fn compute_binding(
        &self,
        compilation: &Arc<Compilation>,
        references: &[Reference],
        has_circular: bool,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Arc<ReferenceBinding> {
        // Collect every reference's own table without creating symbols yet;
        // per-reference collection is independent, so it fans out.
        let requested_tables: Vec<Vec<AssemblyIdentity>> = references
            .par_iter()
            .map(Reference::referenced_identities)
            .collect();

        // Materialize or reuse one symbol per reference.
        let mut bound: Vec<AssemblyRc> = references
            .iter()
            .map(|reference| match reference {
                Reference::Metadata { source, properties } => {
                    let symbol = self.symbol_cache.get_or_create(
                        &source.identity(),
                        properties.embed_interop_types,
                        || materialize_assembly(source),
                    );
                    if properties.embed_interop_types {
                        symbol.mark_linked();
                    }
                    symbol
                }
                Reference::Compilation {
                    compilation: referenced,
                    ..
                } => referenced.assembly().clone(),
            })
            .collect();

        // A reused symbol whose reference table was wired by an earlier,
        // different binding cannot be shared; give this binding a fresh,
        // private materialization instead.
        for (index, reference) in references.iter().enumerate() {
            if let Reference::Metadata { source, .. } = reference {
                let module = bound[index].manifest_module();
                if module.references_wired()
                    && module.referenced_identities() != requested_tables[index].as_slice()
                {
                    bound[index] = materialize_assembly(source);
                }
            }
        }

        // The assembly under compilation is itself a candidate: a reference
        // table that points back at it (the circular case) binds to the
        // source assembly rather than a missing placeholder.
        let mut candidate_symbols: Vec<AssemblyRc> = bound.clone();
        candidate_symbols.push(compilation.assembly().clone());
        let candidate_identities: Vec<AssemblyIdentity> = candidate_symbols
            .iter()
            .map(|a| a.identity().clone())
            .collect();

        let mut unified_all: Vec<UnifiedReference> = Vec::new();
        let mut missing_placeholders: HashMap<String, AssemblyRc> = HashMap::new();
        let mut retarget_wrappers: HashMap<(String, String), AssemblyRc> = HashMap::new();

        // Bind each reference's own assembly-reference table against the
        // full candidate set and wire its manifest module.
        for (index, reference) in references.iter().enumerate() {
            let requested_table = &requested_tables[index];
            let mut module_symbols: Vec<AssemblyRc> = Vec::with_capacity(requested_table.len());

            for requested in requested_table {
                match bind_identity(
                    requested,
                    &candidate_identities,
                    UnificationPolicy::UnifyToHighest,
                    &mut diagnostics,
                ) {
                    IdentityMatch::Bound {
                        index: candidate_index,
                        unified,
                    } => {
                        let mut target = candidate_symbols[candidate_index].clone();
                        if let Some(unified) = unified {
                            // An in-memory source assembly viewed under a
                            // different requested version gets a retargeting
                            // wrapper; metadata symbols record the coercion
                            // and stay shared.
                            if matches!(target.provenance(), AssemblyProvenance::Source) {
                                let wrapper_key = (
                                    target.identity().display_name(),
                                    requested.display_name(),
                                );
                                let wrapper = retarget_wrappers
                                    .entry(wrapper_key)
                                    .or_insert_with(|| {
                                        retarget_assembly(
                                            &target,
                                            requested.clone(),
                                            Vec::new(),
                                        )
                                    })
                                    .clone();
                                target = wrapper;
                            }
                            diagnostics.push(Diagnostic::new(
                                DiagnosticSeverity::Warning,
                                DiagnosticCode::UnifiedReference,
                                [
                                    unified.requested.display_name(),
                                    unified.resolved.display_name(),
                                ],
                            ));
                            bound[index]
                                .manifest_module()
                                .add_unified_reference(unified.clone());
                            unified_all.push(unified);
                        }
                        module_symbols.push(target);
                    }
                    IdentityMatch::Missing => {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticSeverity::Error,
                            DiagnosticCode::MissingAssembly,
                            [
                                requested.display_name(),
                                candidate_identities
                                    .get(index)
                                    .map(AssemblyIdentity::display_name)
                                    .unwrap_or_default(),
                            ],
                        ));
                        let placeholder = missing_placeholders
                            .entry(requested.display_name())
                            .or_insert_with(|| AssemblySymbol::missing(requested.clone()))
                            .clone();
                        module_symbols.push(placeholder);
                    }
                }
            }

            let module = bound[index].manifest_module();
            if !module.references_wired() {
                module.set_references(requested_table.clone(), module_symbols);
            }
        }

        // Wire type forwarders now that every candidate exists.
        for (index, reference) in references.iter().enumerate() {
            if let Reference::Metadata { source, .. } = reference {
                for forwarder in source.type_forwarders() {
                    let target = bound
                        .iter()
                        .find(|a| {
                            a.identity()
                                .simple_name()
                                .eq_ignore_ascii_case(forwarder.target.simple_name())
                        })
                        .cloned()
                        .unwrap_or_else(|| {
                            missing_placeholders
                                .entry(forwarder.target.display_name())
                                .or_insert_with(|| {
                                    AssemblySymbol::missing(forwarder.target.clone())
                                })
                                .clone()
                        });
                    bound[index].add_type_forwarder(forwarder.metadata_name, &target);
                }
            }
        }

        // Propagate linked-ness to assemblies only reachable through linked
        // references.
        for assembly in &bound {
            if assembly.is_linked() {
                for dependency in assembly.manifest_module().referenced_symbols() {
                    let direct = candidate_identities
                        .iter()
                        .any(|identity| identity == dependency.identity());
                    if !direct && !dependency.is_missing() {
                        dependency.mark_linked();
                    }
                }
            }
        }

        let cor_library = designate_cor_library(compilation.assembly(), &bound);
        for assembly in &bound {
            if !assembly.is_missing() {
                assembly.set_cor_library(&cor_library);
            }
        }

        // The published lists are parallel: one identity per resolved
        // reference, in declaration order. The own-assembly candidate was
        // only ever a binding-time candidate, never a reference.
        let referenced_identities: Vec<AssemblyIdentity> =
            bound.iter().map(|a| a.identity().clone()).collect();

        Arc::new(ReferenceBinding::new(
            referenced_identities,
            bound,
            cor_library,
            unified_all,
            has_circular,
            diagnostics,
        ))
    }

    /// Per-compilation wiring after a binding is adopted (fresh or shared).
    fn finalize(compilation: &Arc<Compilation>, binding: &Arc<ReferenceBinding>) {
        let assembly = compilation.assembly();
        assembly.set_cor_library(binding.cor_library());
        let module = assembly.manifest_module();
        if !module.references_wired() {
            module.set_references(
                binding.referenced_identities().to_vec(),
                binding.referenced_assemblies().to_vec(),
            );
        }
        for diagnostic in binding.diagnostics() {
            compilation.diagnostics().push(diagnostic.clone());
        }
    }
}

/// True when `reference` transitively leads back to `target` through
/// compilation references. Walked with an explicit visited set; metadata
/// references terminate a path.
fn references_back_to(reference: &Reference, target: &Arc<Compilation>) -> bool {
    fn walk(
        current: &Arc<Compilation>,
        target: &Arc<Compilation>,
        visited: &mut Vec<*const Compilation>,
    ) -> bool {
        if Arc::ptr_eq(current, target) {
            return true;
        }
        let pointer = Arc::as_ptr(current);
        if visited.contains(&pointer) {
            return false;
        }
        visited.push(pointer);
        for reference in current.references() {
            if let Reference::Compilation { compilation, .. } = &reference {
                if walk(compilation, target, visited) {
                    return true;
                }
            }
        }
        false
    }

    match reference {
        Reference::Compilation { compilation, .. } => {
            walk(compilation, target, &mut Vec::new())
        }
        Reference::Metadata { .. } => false,
    }
}
