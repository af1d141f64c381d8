//! Member signature comparison under named policies.
//!
//! One equality notion does not fit every language rule: explicit interface
//! implementation matching must be name-independent and modifier-exact,
//! override matching tolerates custom-modifier differences, the runtime's
//! own view collapses the `ref`/`out` distinction, and documentation
//! references use the loosest comparison of all. This module provides the
//! configurable comparer and the fixed catalog of named policy singletons
//! each of those rules uses.
//!
//! # Key Components
//!
//! - [`MemberSignatureComparer`] - the policy object; stateless and shareable
//! - [`RefKindCompareMode`] - the three-plus-one ways to compare by-ref kinds
//!
//! All policies are `const` singletons on [`MemberSignatureComparer`]; no
//! mutable state exists anywhere in this module.

mod comparer;

pub use comparer::{MemberSignatureComparer, RefKindCompareMode};
