//! Cross-module reference binding.
//!
//! Given one compilation's declared references plus transitively required
//! assemblies, this module produces a single consistent assembly-symbol
//! graph: one symbol per distinct referenced identity, modules wired to
//! their resolved reference tables, exactly one designated core library, and
//! circular source-reference situations detected and handled without
//! infinite recursion.
//!
//! # Key Components
//!
//! - [`ReferenceSource`] - the collaborator surface a binary metadata reader implements
//! - [`MetadataFixture`] - an in-memory `ReferenceSource` for tests and tooling
//! - [`Reference`] - a declared reference (metadata source or sibling compilation)
//! - [`ReferenceManager`] - the binder; caches bindings per reference set
//! - [`ReferenceBinding`] - the published result of one binding
//! - [`SymbolCache`] - process-wide weak cache of materialized assembly symbols
//!
//! # Concurrency
//!
//! Binding work is safe to run twice: all expensive steps (collection,
//! identity matching, symbol materialization) happen outside any lock, and
//! only the final publication is serialized. Racing compilations binding the
//! identical reference set produce one shared result; the losers' graphs are
//! discarded, which is expected and harmless because no global state mutates
//! before the publish step.

mod binding;
mod cache;
mod manager;
mod sources;

pub use binding::{ReferenceBinding, UnificationPolicy};
pub use cache::SymbolCache;
pub use manager::ReferenceManager;
pub use sources::{DeclaredType, MetadataFixture, Reference, ReferenceProperties, ReferenceSource, TypeForwarder};
