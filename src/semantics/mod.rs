//! The semantic model: symbols, annotations, signatures, resolution.
//!
//! This is the domain module of the crate, mirroring the flow of a
//! compilation's semantic phase:
//!
//! 1. [`references`] binds the compilation's declared references into a
//!    consistent assembly-symbol graph ([`symbols`]), caching and reusing
//!    symbols across sibling compilations.
//! 2. [`symbols`] represents every named entity, with substitution-based
//!    generic instantiation and the original-definition identity model.
//! 3. [`annotations`] attaches nullability and custom-modifier metadata to
//!    type references without touching type identity.
//! 4. [`signatures`] decides member signature equivalence under the named
//!    policy catalog.
//! 5. [`inheritance`] classifies members against their ancestors as
//!    overriding, hiding, or runtime-matched, using [`signatures`].
//! 6. [`wellknown`] resolves the special and well-known library entities
//!    language features depend on.
//!
//! [`compilation`] ties these together per compilation; [`diagnostics`]
//! collects structured codes everywhere; [`attributes`] fixes the
//! cycle-free attribute decode ordering other compiler layers follow.

pub mod annotations;
pub mod attributes;
pub mod compilation;
pub mod diagnostics;
pub mod identity;
pub mod inheritance;
pub mod references;
pub mod signatures;
pub mod symbols;
pub mod wellknown;
