//! The override/hide resolution walk.

use std::sync::Arc;

use crate::semantics::inheritance::OverriddenOrHiddenMembersResult;
use crate::semantics::signatures::MemberSignatureComparer;
use crate::semantics::symbols::{
    Accessibility, AssociatedMember, Member, MethodKind, MethodRc, NamedTypeRc, TypeCompareKind,
    TypeProvenance, TypeSymbol,
};

/// Resolve which ancestor members `member` overrides, hides, or matches
/// under runtime signature rules.
///
/// Computed lazily once per member and cached on the member; the result is
/// immutable and identical (by value) for every caller. Fields neither
/// override nor hide and always yield the empty result.
#[must_use]
pub fn overridden_or_hidden_members(member: &Member) -> Arc<OverriddenOrHiddenMembersResult> {
    match member.overridden_or_hidden_cell() {
        None => OverriddenOrHiddenMembersResult::empty(),
        Some(cell) => cell.get_or_init(|| compute(member)).clone(),
    }
}

fn compute(member: &Member) -> Arc<OverriddenOrHiddenMembersResult> {
    if let Member::Method(method) = member {
        if method.method_kind().is_accessor() {
            return resolve_accessor(method);
        }
        if matches!(
            method.method_kind(),
            MethodKind::Constructor | MethodKind::StaticConstructor
        ) {
            return OverriddenOrHiddenMembersResult::empty();
        }

        // Guard lazy nullable-type-parameter resolution against re-entering
        // this method's own constraint computation.
        method.begin_override_resolution();
        let result = walk(member);
        method.end_override_resolution();
        return result;
    }
    walk(member)
}

fn walk(member: &Member) -> Arc<OverriddenOrHiddenMembersResult> {
    let Some(container) = member.containing_type() else {
        return OverriddenOrHiddenMembersResult::empty();
    };
    if container.is_interface() {
        interface_walk(member, &container)
    } else {
        class_walk(member, &container)
    }
}

/// Result of scanning one ancestor type for candidates.
struct AncestorScan {
    /// The best same-kind signature match, when one exists
    best: Option<Member>,
    /// Same-kind candidates matching under runtime signature rules
    runtime_matches: Vec<Member>,
    /// Differently-kinded same-name members hidden unconditionally
    hidden_here: Vec<Member>,
    /// A same-kind candidate with a different signature was seen
    has_same_kind_non_match: bool,
}

fn scan_ancestor(
    member: &Member,
    ancestor: &NamedTypeRc,
    within: &NamedTypeRc,
    member_is_from_source: bool,
) -> AncestorScan {
    // (candidate, custom-modifier distance); declaration order preserved
    let mut exact: Vec<(Member, usize)> = Vec::new();
    let mut relaxed: Vec<(Member, usize)> = Vec::new();
    let mut runtime_matches: Vec<Member> = Vec::new();
    let mut hidden_here: Vec<Member> = Vec::new();
    let mut has_same_kind_non_match = false;

    let member_modifier_count = custom_modifier_count(member);

    for candidate in ancestor.members_named(member.name()) {
        if !is_accessible_for_override(&candidate, within) {
            continue;
        }

        if candidate.kind() == member.kind() {
            if matches!(member, Member::Method(_))
                && MemberSignatureComparer::RUNTIME.equals(member, &candidate)
            {
                runtime_matches.push(candidate.clone());
            }

            if MemberSignatureComparer::OVERRIDE_EXACT_MODIFIERS.equals(member, &candidate) {
                let distance = custom_modifier_count(&candidate).abs_diff(member_modifier_count);
                exact.push((candidate, distance));
            } else if MemberSignatureComparer::OVERRIDE.equals(member, &candidate) {
                // Source members are not modifier-finalized yet: allow the
                // position-insensitive match, preferring fewest modifiers.
                if member_is_from_source {
                    relaxed.push((candidate.clone(), custom_modifier_count(&candidate)));
                } else {
                    has_same_kind_non_match = true;
                }
            } else {
                has_same_kind_non_match = true;
            }
        } else if !member.is_hiding_exempt()
            && !candidate.is_hiding_exempt()
            && arity_compatible(member, &candidate)
        {
            // A differently-shaped entity occupying the name hides
            // unconditionally.
            hidden_here.push(candidate);
        }
    }

    // Exact match with the least custom-modifier difference wins; among
    // equal distances, declaration order (first found) wins. Relaxed
    // matches are consulted only when no exact match exists.
    let best = pick_minimal(exact).or_else(|| pick_minimal(relaxed));

    AncestorScan {
        best,
        runtime_matches,
        hidden_here,
        has_same_kind_non_match,
    }
}

fn pick_minimal(candidates: Vec<(Member, usize)>) -> Option<Member> {
    let minimum = candidates.iter().map(|(_, d)| *d).min()?;
    candidates
        .into_iter()
        .find(|(_, d)| *d == minimum)
        .map(|(m, _)| m)
}

fn class_walk(member: &Member, container: &NamedTypeRc) -> Arc<OverriddenOrHiddenMembersResult> {
    let from_source = is_from_source(member);
    let mut allow_hiding = true;
    let mut runtime: Vec<Member> = Vec::new();

    for ancestor in container.base_chain() {
        let scan = scan_ancestor(member, &ancestor, container, from_source);

        if runtime.is_empty() && !scan.runtime_matches.is_empty() {
            runtime = scan.runtime_matches;
        }

        if let Some(best) = scan.best {
            let related = find_related_members(&best, &ancestor, member.is_override());
            let (overridden, hidden) = if member.is_override() {
                (related, Vec::new())
            } else {
                (Vec::new(), related)
            };
            return OverriddenOrHiddenMembersResult::new(overridden, hidden, runtime);
        }

        if allow_hiding && !scan.hidden_here.is_empty() {
            return OverriddenOrHiddenMembersResult::new(Vec::new(), scan.hidden_here, runtime);
        }

        if scan.has_same_kind_non_match {
            // A same-kind non-match stops the hiding search past this
            // ancestor; the override search continues upward.
            allow_hiding = false;
        }
    }

    OverriddenOrHiddenMembersResult::new(Vec::new(), Vec::new(), runtime)
}

fn interface_walk(
    member: &Member,
    container: &NamedTypeRc,
) -> Arc<OverriddenOrHiddenMembersResult> {
    let from_source = is_from_source(member);
    let mut overridden: Vec<Member> = Vec::new();
    let mut hidden: Vec<Member> = Vec::new();
    let mut runtime: Vec<Member> = Vec::new();
    // Interfaces whose transitive set is already accounted for along a
    // matched path; shared across the whole topological walk.
    let mut covered: Vec<NamedTypeRc> = Vec::new();

    for interface in container.all_interfaces() {
        if covered
            .iter()
            .any(|c| types_equivalent(c, &interface))
        {
            continue;
        }

        let scan = scan_ancestor(member, &interface, container, from_source);

        if runtime.is_empty() && !scan.runtime_matches.is_empty() {
            runtime = scan.runtime_matches;
        }

        let mut found_here = false;
        if let Some(best) = scan.best {
            let related = find_related_members(&best, &interface, member.is_override());
            if member.is_override() {
                overridden.extend(related);
            } else {
                hidden.extend(related);
            }
            found_here = true;
        } else if !scan.hidden_here.is_empty() {
            hidden.extend(scan.hidden_here);
            found_here = true;
        }

        if found_here {
            // Everything this interface extends is hidden through it; do
            // not rediscover those members along deeper paths.
            covered.extend(interface.all_interfaces());
            covered.push(interface);
        }
    }

    OverriddenOrHiddenMembersResult::new(overridden, hidden, runtime)
}

/// Locate every other member of `ancestor` with a signature identical to
/// `found` - identical by language rules for override, identical including
/// custom modifiers for hiding.
///
/// Constructed generic types and same-signature indexers can make this set
/// larger than one; all entries are reported.
fn find_related_members(found: &Member, ancestor: &NamedTypeRc, for_override: bool) -> Vec<Member> {
    let comparer = if for_override {
        MemberSignatureComparer::OVERRIDE
    } else {
        MemberSignatureComparer::OVERRIDE_EXACT_MODIFIERS
    };
    let mut related: Vec<Member> = ancestor
        .members_named(found.name())
        .into_iter()
        .filter(|candidate| candidate.kind() == found.kind() && comparer.equals(found, candidate))
        .collect();
    if related.is_empty() {
        related.push(found.clone());
    }
    related
}

fn resolve_accessor(accessor: &MethodRc) -> Arc<OverriddenOrHiddenMembersResult> {
    let Some(associated) = accessor.associated_member() else {
        return OverriddenOrHiddenMembersResult::empty();
    };
    let owner = match associated {
        AssociatedMember::Property(weak) => match weak.upgrade() {
            Some(property) => Member::Property(property),
            None => return OverriddenOrHiddenMembersResult::empty(),
        },
        AssociatedMember::Event(weak) => match weak.upgrade() {
            Some(event) => Member::Event(event),
            None => return OverriddenOrHiddenMembersResult::empty(),
        },
    };

    let owner_result = overridden_or_hidden_members(&owner);
    let kind = accessor.method_kind();

    let mut overridden: Vec<Member> = Vec::new();
    for candidate in owner_result.overridden_members() {
        if let Some(found) = own_or_inherited_accessor(candidate, kind) {
            overridden.push(Member::Method(found));
        }
    }

    let mut hidden: Vec<Member> = Vec::new();
    for candidate in owner_result.hidden_members() {
        if let Some(found) = own_or_inherited_accessor(candidate, kind) {
            hidden.push(Member::Method(found));
        }
    }

    let runtime = overridden.clone();
    OverriddenOrHiddenMembersResult::new(overridden, hidden, runtime)
}

/// The accessor of the given kind on `member`, or on whatever `member`'s own
/// resolution found, transitively.
///
/// This is what lets a derived accessor skip an intermediate override that
/// re-declared only the other accessor.
fn own_or_inherited_accessor(member: &Member, kind: MethodKind) -> Option<MethodRc> {
    if let Some(own) = member.accessor(kind) {
        return Some(own);
    }
    let result = overridden_or_hidden_members(member);
    for next in result.overridden_members() {
        if let Some(inherited) = own_or_inherited_accessor(next, kind) {
            return Some(inherited);
        }
    }
    None
}

/// Accessibility gating for override/hide candidates, computed on original
/// definitions so generic substitution cannot leak accessibility.
fn is_accessible_for_override(candidate: &Member, within: &NamedTypeRc) -> bool {
    let candidate = candidate.original_definition();
    let within = within.original_definition();
    match candidate.accessibility() {
        Accessibility::Public
        | Accessibility::Protected
        | Accessibility::ProtectedOrInternal
        | Accessibility::NotApplicable => true,
        Accessibility::Private => false,
        Accessibility::Internal | Accessibility::ProtectedAndInternal => {
            same_assembly(&candidate, &within)
        }
    }
}

fn same_assembly(candidate: &Member, within: &NamedTypeRc) -> bool {
    let candidate_assembly = candidate
        .containing_type()
        .and_then(|t| t.containing_assembly());
    let within_assembly = within.containing_assembly();
    match (candidate_assembly, within_assembly) {
        (Some(a), Some(b)) => Arc::ptr_eq(&a, &b) || a.identity() == b.identity(),
        _ => false,
    }
}

fn arity_compatible(member: &Member, candidate: &Member) -> bool {
    member.arity() == candidate.arity() || member.arity() == 0 || candidate.arity() == 0
}

fn is_from_source(member: &Member) -> bool {
    member
        .original_definition()
        .containing_type()
        .is_some_and(|t| matches!(t.provenance(), TypeProvenance::Source))
}

fn types_equivalent(a: &NamedTypeRc, b: &NamedTypeRc) -> bool {
    TypeSymbol::Named(a.clone()).equals(
        &TypeSymbol::Named(b.clone()),
        TypeCompareKind::ALL_IGNORE_OPTIONS,
    )
}

/// Total custom-modifier count across a member's signature.
fn custom_modifier_count(member: &Member) -> usize {
    let mut count = member.return_type().custom_modifiers().len();
    for parameter in member.parameters() {
        count += parameter.parameter_type().custom_modifiers().len();
        count += parameter.ref_custom_modifiers().len();
    }
    count
}
