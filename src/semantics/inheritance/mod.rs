//! Override and hiding resolution over type hierarchies.
//!
//! For a member declared in a derived type, this module walks the base-type
//! chain (classes) or the topologically-sorted transitive interface set
//! (interfaces) and classifies every related ancestor member as overridden,
//! hidden, or matched only under the runtime's laxer signature rules.
//!
//! # Key Components
//!
//! - [`OverriddenOrHiddenMembersResult`] - the immutable, cached per-member result
//! - [`overridden_or_hidden_members`] - the resolution entry point
//!
//! # Resolution Shape
//!
//! The walk is a state machine over the hierarchy, not the member: each
//! ancestor either terminates the search (exact match found, or name-based
//! hiding found), weakens it (a same-kind non-match stops further hiding but
//! not override search), or passes it upward unchanged. Empty results are
//! valid terminal states meaning "introduces a new member"; no outcome of
//! the walk faults.
//!
//! Accessors never walk the hierarchy themselves: their results derive from
//! the owning property or event, locating the same-kinded accessor on
//! whatever that resolution found and skipping ancestors whose member lacks
//! the accessor.

mod resolver;
mod result;

pub use resolver::overridden_or_hidden_members;
pub use result::OverriddenOrHiddenMembersResult;
