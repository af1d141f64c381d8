// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]
#![deny(unsafe_code)]

//! # bindscope
//!
//! A thread-safe symbol resolution and type identity core for .NET-family
//! language compilers. Built in pure Rust, `bindscope` provides the semantic
//! backbone a compiler front end builds on: a symbol graph for every named
//! program entity, cross-module reference binding with caching and reuse,
//! override/hide resolution under precise tie-break rules, a configurable
//! member-signature comparison catalog, and nullability tracking attached to
//! type references rather than type identities.
//!
//! ## Features
//!
//! - **Symbol identity model** - assemblies, modules, namespaces, types and
//!   members across four provenances (source, metadata, retargeting,
//!   constructed), unified by the original-definition identity rule
//! - **Reference binding** - one consistent, cycle-safe assembly graph per
//!   reference set, shared across sibling compilations with first-writer-wins
//!   publication
//! - **Override/hide resolution** - base-chain and diamond-safe interface
//!   walks with accessor derivation and related-member expansion
//! - **Signature comparison** - fourteen named policies covering explicit and
//!   implicit interface implementation, overrides, partial methods,
//!   interceptors, runtime matching and documentation references
//! - **Annotated type references** - three-state nullability with merge,
//!   substitution, and lazy cycle-breaking resolution
//! - **Well-known entity lookup** - memoized special and well-known type and
//!   member resolution with explicit ambiguity handling
//!
//! ## Quick Start
//!
//! Add `bindscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bindscope = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use bindscope::prelude::*;
//! use std::sync::Arc;
//!
//! // Describe a referenced binary (normally supplied by a metadata reader)
//! let corlib = MetadataFixture::new(AssemblyIdentity::parse("mscorlib, Version=4.0.0.0")?)
//!     .declaring_corlib_types();
//!
//! // Bind a compilation against it
//! let compilation = Compilation::new("app", vec![Reference::metadata(Arc::new(corlib))]);
//! let manager = ReferenceManager::new();
//! let binding = compilation.bind(&manager);
//!
//! assert!(!binding.cor_library().is_missing());
//! # Ok::<(), bindscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `bindscope` is organized around one domain module:
//!
//! - [`semantics`] - the semantic model: symbols, annotations, signatures,
//!   inheritance, references, well-known entities
//! - [`prelude`] - convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - error handling for construction contracts
//!
//! Data-shape failures (missing references, ambiguous entities, cycles) are
//! never errors: they become placeholder symbols and structured diagnostics
//! so binding can continue and report everything in one pass. [`Error`] is
//! reserved for caller contract violations, such as constructing a generic
//! with the wrong arity.
//!
//! ## Thread Safety
//!
//! The core provides thread safety through idempotent publish-once caching,
//! not through its own scheduling: any number of threads may bind sibling
//! compilations or query symbols concurrently, and every lazily-computed
//! value (bindings, well-known entities, use-site diagnostics, override
//! resolutions) is published exactly once with racing computations safely
//! discarded.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the bindscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use bindscope::prelude::*;
///
/// let identity = AssemblyIdentity::parse("mscorlib, Version=4.0.0.0")?;
/// assert!(identity.is_culture_neutral());
/// # Ok::<(), bindscope::Error>(())
/// ```
pub mod prelude;

/// The semantic model: symbols, annotations, signatures, resolution.
///
/// See the [module documentation](semantics) for the component map and data
/// flow between the submodules.
pub mod semantics;

/// Public test fixtures for downstream crates' integration tests.
///
/// Exposes the same factory helpers the crate's own tests use.
pub mod test_fixtures;

/// Represents the result of most of the operations of this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for construction-contract violations.
///
/// See [`error::Error`] for the taxonomy; data-shape problems are reported
/// through placeholder symbols and diagnostics instead.
pub use error::Error;
