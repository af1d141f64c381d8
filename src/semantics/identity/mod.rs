//! Assembly identity system for cross-module reference binding.
//!
//! This module provides assembly identification and version management for the
//! reference binder. It is the foundation for matching a compilation's declared
//! references against candidate assemblies, for version unification, and for
//! keying the process-wide symbol caches.
//!
//! # Key Components
//!
//! - [`AssemblyIdentity`] - Complete assembly identification with name, version, culture, and key token
//! - [`AssemblyVersion`] - Four-part version numbering (major.minor.build.revision)
//!
//! # Identity Components
//!
//! Assemblies are uniquely identified by the combination of:
//! - **Simple Name**: The primary assembly name (e.g., "mscorlib", "System.Core")
//! - **Version**: Four-part version number for binding and unification decisions
//! - **Culture**: Localization culture (None for culture-neutral assemblies)
//! - **Public Key Token**: Strong-name token for verified identity matching
//!
//! A reference without a public key token is a **weak** reference: it binds by
//! simple name, and its culture must match the candidate exactly. A reference
//! carrying a token is a **strong** reference: it binds by name, culture and
//! token, with version differences subject to the binder's unification policy.
//!
//! # Thread Safety
//!
//! All types in this module are thread-safe and implement [`Send`] and [`Sync`].
//! Assembly identities can be safely shared across threads and used as keys in
//! concurrent collections like `DashMap` and `HashMap`.

mod assembly;

pub use assembly::{AssemblyIdentity, AssemblyVersion};
