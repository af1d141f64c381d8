//! The cached result of one member's override/hide resolution.

use std::sync::{Arc, OnceLock};

use crate::semantics::symbols::Member;

/// The classified ancestors of one member, immutable after creation.
///
/// Three ordered sets:
/// - `overridden`: ancestor members with the same signature that this member
///   overrides, by the language's own definition
/// - `hidden`: ancestor members shadowed because a differently-shaped (or
///   non-override same-shaped) entity occupies the name
/// - `runtime_overridden`: ancestor methods the execution engine would
///   consider overridden under its laxer matching, which cannot see the
///   `ref`/`out` distinction
///
/// More than one entry per set is possible and meaningful: constructed
/// generic types and same-signature indexers can produce several
/// simultaneously overridden or hidden members; ambiguity is a result, not
/// an error.
#[derive(Debug)]
pub struct OverriddenOrHiddenMembersResult {
    overridden: Vec<Member>,
    hidden: Vec<Member>,
    runtime_overridden: Vec<Member>,
}

impl OverriddenOrHiddenMembersResult {
    pub(crate) fn new(
        overridden: Vec<Member>,
        hidden: Vec<Member>,
        runtime_overridden: Vec<Member>,
    ) -> Arc<Self> {
        if overridden.is_empty() && hidden.is_empty() && runtime_overridden.is_empty() {
            return Self::empty();
        }
        Arc::new(Self {
            overridden,
            hidden,
            runtime_overridden,
        })
    }

    /// The shared empty result: this member introduces a new slot and
    /// neither overrides nor hides anything.
    #[must_use]
    pub fn empty() -> Arc<Self> {
        static EMPTY: OnceLock<Arc<OverriddenOrHiddenMembersResult>> = OnceLock::new();
        EMPTY
            .get_or_init(|| {
                Arc::new(OverriddenOrHiddenMembersResult {
                    overridden: Vec::new(),
                    hidden: Vec::new(),
                    runtime_overridden: Vec::new(),
                })
            })
            .clone()
    }

    /// Ancestor members this member overrides, in discovery order.
    #[must_use]
    pub fn overridden_members(&self) -> &[Member] {
        &self.overridden
    }

    /// Ancestor members this member hides, in discovery order.
    #[must_use]
    pub fn hidden_members(&self) -> &[Member] {
        &self.hidden
    }

    /// Ancestor methods overridden under the runtime's signature rules.
    #[must_use]
    pub fn runtime_overridden_members(&self) -> &[Member] {
        &self.runtime_overridden
    }

    /// True when every set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overridden.is_empty() && self.hidden.is_empty() && self.runtime_overridden.is_empty()
    }

    /// By-value equality: same members, in the same order, in every set.
    #[must_use]
    pub fn equals_by_value(&self, other: &OverriddenOrHiddenMembersResult) -> bool {
        fn lists_equal(a: &[Member], b: &[Member]) -> bool {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Member::ptr_eq(x, y))
        }
        lists_equal(&self.overridden, &other.overridden)
            && lists_equal(&self.hidden, &other.hidden)
            && lists_equal(&self.runtime_overridden, &other.runtime_overridden)
    }
}
