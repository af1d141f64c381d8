//! The multi-phase attribute decode protocol.
//!
//! Attribute binding is cycle-prone: decoding an attribute's arguments can
//! require symbols whose own attributes are still being bound. The protocol
//! here fixes a phase order every attribute consumer must follow:
//!
//! 1. **Merge and filter** attribute applications by target
//! 2. **Bind attribute types** only (no constructors)
//! 3. **Early-decode** a fixed small set of well-known attributes from
//!    type and target alone
//! 4. **Bind full arguments**
//! 5. **Decode and validate** usage (duplicates without `AllowMultiple`,
//!    wrong targets, security-attribute restrictions)
//! 6. **Publish** the bound list exactly once; post-validation that queries
//!    other symbols' attributes is safe only after this point
//!
//! Phase order is a hard contract: driving a pipeline out of order is a
//! programmer error and faults, while every data problem (duplicate,
//! misapplied, unresolvable attribute) is reported as a diagnostic and
//! binding continues.

use std::sync::{Arc, OnceLock};

use crate::semantics::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity, Diagnostics};
use crate::semantics::symbols::{TypeCompareKind, TypeSymbol};

bitflags::bitflags! {
    /// Targets an attribute application can attach to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeTargets: u16 {
        /// An assembly
        const ASSEMBLY = 0x0001;
        /// A module
        const MODULE = 0x0002;
        /// A class, struct, interface, enum or delegate
        const TYPE = 0x0004;
        /// A constructor
        const CONSTRUCTOR = 0x0008;
        /// A method
        const METHOD = 0x0010;
        /// A property
        const PROPERTY = 0x0020;
        /// A field
        const FIELD = 0x0040;
        /// An event
        const EVENT = 0x0080;
        /// A parameter
        const PARAMETER = 0x0100;
        /// A return value
        const RETURN_VALUE = 0x0200;
        /// A generic type parameter
        const GENERIC_PARAMETER = 0x0400;
    }
}

impl AttributeTargets {
    /// The restricted target set security attributes are limited to.
    pub const SECURITY_ALLOWED: AttributeTargets = AttributeTargets::ASSEMBLY
        .union(AttributeTargets::TYPE)
        .union(AttributeTargets::METHOD);
}

/// Usage constraints declared by an attribute type.
#[derive(Debug, Clone)]
pub struct AttributeUsage {
    /// Targets the attribute may attach to
    pub valid_targets: AttributeTargets,
    /// Whether repeated application to one target is allowed
    pub allow_multiple: bool,
}

impl Default for AttributeUsage {
    fn default() -> Self {
        Self {
            valid_targets: AttributeTargets::all(),
            allow_multiple: false,
        }
    }
}

/// One attribute application, as merged from syntax.
#[derive(Debug, Clone)]
pub struct AttributeApplication {
    /// The attribute type name as written
    pub name: String,
    /// The target this application attaches to
    pub target: AttributeTargets,
    /// The bound attribute type; unresolved until phase 2
    pub attribute_type: Option<TypeSymbol>,
    /// Bound constructor arguments; empty until phase 4
    pub arguments: Vec<String>,
    /// Whether the attribute type is security-critical
    pub is_security_attribute: bool,
}

impl AttributeApplication {
    /// A new application of `name` to `target`.
    #[must_use]
    pub fn new(name: impl Into<String>, target: AttributeTargets) -> Self {
        Self {
            name: name.into(),
            target,
            attribute_type: None,
            arguments: Vec::new(),
            is_security_attribute: false,
        }
    }

    /// Mark this application as a security attribute.
    #[must_use]
    pub fn security(mut self) -> Self {
        self.is_security_attribute = true;
        self
    }
}

/// A fully bound and validated attribute.
#[derive(Debug, Clone)]
pub struct BoundAttribute {
    /// The bound attribute type
    pub attribute_type: TypeSymbol,
    /// The target it attaches to
    pub target: AttributeTargets,
    /// The bound constructor arguments
    pub arguments: Vec<String>,
}

/// The published per-symbol attribute list.
pub type BoundAttributeList = Arc<Vec<BoundAttribute>>;

/// The fixed small set decodable before constructor binding.
///
/// Early decoding reads only the attribute type and target, so it cannot
/// recurse into argument binding and is safe during declaration.
#[derive(Debug, Clone, Default)]
pub struct EarlyDecodedAttributes {
    /// An obsolete marker was applied
    pub is_obsolete: bool,
    /// A conditional marker was applied
    pub is_conditional: bool,
    /// An attribute-usage declaration was applied
    pub has_usage_declaration: bool,
}

/// The protocol phases, in mandatory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttributePhase {
    /// Phase 1: merge and filter by target
    MergeAndFilter,
    /// Phase 2: bind attribute types only
    BindTypes,
    /// Phase 3: early-decode well-known attributes
    EarlyDecode,
    /// Phase 4: bind full constructor arguments
    BindArguments,
    /// Phase 5: decode remaining attributes and validate usage
    DecodeAndValidate,
    /// Phase 6: the bound list is published
    Published,
}

/// Drives one symbol's attribute applications through the phase protocol.
///
/// The pipeline is single-owner: one binder drives it to publication, and
/// only the published [`BoundAttributeList`] is shared.
#[derive(Debug)]
pub struct AttributePipeline {
    phase: AttributePhase,
    applications: Vec<AttributeApplication>,
}

impl AttributePipeline {
    /// Start a pipeline over raw applications.
    #[must_use]
    pub fn new(applications: Vec<AttributeApplication>) -> Self {
        Self {
            phase: AttributePhase::MergeAndFilter,
            applications,
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> AttributePhase {
        self.phase
    }

    fn advance(&mut self, expected: AttributePhase, next: AttributePhase) {
        if self.phase != expected {
            unreachable!(
                "attribute pipeline driven out of order: in {:?}, expected {:?}",
                self.phase, expected
            );
        }
        self.phase = next;
    }

    /// Phase 1: keep only applications attaching to `target`.
    pub fn merge_and_filter(&mut self, target: AttributeTargets) {
        self.advance(AttributePhase::MergeAndFilter, AttributePhase::BindTypes);
        self.applications
            .retain(|application| target.intersects(application.target));
    }

    /// Phase 2: bind attribute types only, first pass.
    ///
    /// `resolve` maps a written name to a type; unresolvable names become
    /// error types and stay in the list so later phases can report them.
    pub fn bind_types(&mut self, resolve: impl Fn(&str) -> TypeSymbol) {
        self.advance(AttributePhase::BindTypes, AttributePhase::EarlyDecode);
        for application in &mut self.applications {
            application.attribute_type = Some(resolve(&application.name));
        }
    }

    /// Phase 3: decode the fixed early set from type and target alone.
    ///
    /// No constructor binding happens here; that is the point.
    #[must_use]
    pub fn early_decode(&mut self) -> EarlyDecodedAttributes {
        self.advance(AttributePhase::EarlyDecode, AttributePhase::BindArguments);
        let mut early = EarlyDecodedAttributes::default();
        for application in &self.applications {
            match short_name(&application.name) {
                "ObsoleteAttribute" | "Obsolete" => early.is_obsolete = true,
                "ConditionalAttribute" | "Conditional" => early.is_conditional = true,
                "AttributeUsageAttribute" | "AttributeUsage" => {
                    early.has_usage_declaration = true;
                }
                _ => {}
            }
        }
        early
    }

    /// Phase 4: bind full constructor arguments.
    pub fn bind_arguments(&mut self, bind: impl Fn(&AttributeApplication) -> Vec<String>) {
        self.advance(
            AttributePhase::BindArguments,
            AttributePhase::DecodeAndValidate,
        );
        for application in &mut self.applications {
            application.arguments = bind(application);
        }
    }

    /// Phase 5: validate usage and drop invalid applications.
    ///
    /// Reports duplicate application without `AllowMultiple`, applications
    /// to disallowed targets, and security attributes outside the
    /// restricted target set. Invalid applications are removed; the rest
    /// proceed to publication.
    pub fn decode_and_validate(
        &mut self,
        usage_of: impl Fn(&TypeSymbol) -> AttributeUsage,
        diagnostics: &Diagnostics,
    ) {
        self.advance(
            AttributePhase::DecodeAndValidate,
            AttributePhase::Published,
        );

        let mut valid: Vec<AttributeApplication> = Vec::new();
        for application in self.applications.drain(..) {
            let Some(attribute_type) = application.attribute_type.clone() else {
                continue;
            };
            let usage = usage_of(&attribute_type);

            if !usage.valid_targets.intersects(application.target) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::InvalidAttributeTarget,
                    [
                        application.name.clone(),
                        format!("{:?}", application.target),
                        format!("{:?}", usage.valid_targets),
                    ],
                ));
                continue;
            }

            if application.is_security_attribute
                && !AttributeTargets::SECURITY_ALLOWED.intersects(application.target)
            {
                diagnostics.push(Diagnostic::new(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::SecurityAttributeMisuse,
                    [application.name.clone()],
                ));
                continue;
            }

            let duplicate = valid.iter().any(|existing| {
                existing
                    .attribute_type
                    .as_ref()
                    .is_some_and(|t| t.equals(&attribute_type, TypeCompareKind::ALL_IGNORE_OPTIONS))
            });
            if duplicate && !usage.allow_multiple {
                diagnostics.push(Diagnostic::new(
                    DiagnosticSeverity::Error,
                    DiagnosticCode::DuplicateAttribute,
                    [application.name.clone()],
                ));
                continue;
            }

            valid.push(application);
        }
        self.applications = valid;
    }

    /// Phase 6: publish the bound list into `cell`, exactly once.
    ///
    /// Under a race the first publisher wins and this pipeline's redundant
    /// list is dropped; every caller observes the published list.
    /// Post-validation that needs other symbols' attributes must run only
    /// on the returned list.
    #[must_use]
    pub fn publish(self, cell: &OnceLock<BoundAttributeList>) -> BoundAttributeList {
        if self.phase != AttributePhase::Published {
            unreachable!(
                "attribute pipeline published from phase {:?}",
                self.phase
            );
        }
        let bound: BoundAttributeList = Arc::new(
            self.applications
                .into_iter()
                .filter_map(|application| {
                    Some(BoundAttribute {
                        attribute_type: application.attribute_type?,
                        target: application.target,
                        arguments: application.arguments,
                    })
                })
                .collect(),
        );
        match cell.set(bound.clone()) {
            Ok(()) => bound,
            Err(_) => cell.get().expect("published list must exist").clone(),
        }
    }
}

fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::symbols::ErrorTypeSymbol;
    use crate::test::factories;

    fn drive_to_validate(
        applications: Vec<AttributeApplication>,
        target: AttributeTargets,
    ) -> (AttributePipeline, Diagnostics) {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let mut pipeline = AttributePipeline::new(applications);
        pipeline.merge_and_filter(target);
        // The same written name must bind to the same type symbol
        pipeline.bind_types(|name| {
            let existing = corlib
                .global_namespace()
                .lookup_namespace("Attrs")
                .and_then(|ns| ns.get_type(name));
            TypeSymbol::Named(
                existing.unwrap_or_else(|| factories::class_in(&corlib, "Attrs", name)),
            )
        });
        let _ = pipeline.early_decode();
        pipeline.bind_arguments(|_| Vec::new());
        (pipeline, Diagnostics::new())
    }

    #[test]
    fn test_duplicate_without_allow_multiple() {
        let applications = vec![
            AttributeApplication::new("OnceAttribute", AttributeTargets::METHOD),
            AttributeApplication::new("OnceAttribute", AttributeTargets::METHOD),
        ];
        let (mut pipeline, diagnostics) = drive_to_validate(applications, AttributeTargets::METHOD);

        pipeline.decode_and_validate(|_| AttributeUsage::default(), &diagnostics);
        assert_eq!(
            diagnostics.with_code(DiagnosticCode::DuplicateAttribute).len(),
            1
        );

        let cell = OnceLock::new();
        let bound = pipeline.publish(&cell);
        assert_eq!(bound.len(), 1);
    }

    #[test]
    fn test_allow_multiple_permits_duplicates() {
        let applications = vec![
            AttributeApplication::new("ManyAttribute", AttributeTargets::METHOD),
            AttributeApplication::new("ManyAttribute", AttributeTargets::METHOD),
        ];
        let (mut pipeline, diagnostics) = drive_to_validate(applications, AttributeTargets::METHOD);

        pipeline.decode_and_validate(
            |_| AttributeUsage {
                valid_targets: AttributeTargets::all(),
                allow_multiple: true,
            },
            &diagnostics,
        );
        assert!(!diagnostics.has_errors());

        let cell = OnceLock::new();
        assert_eq!(pipeline.publish(&cell).len(), 2);
    }

    #[test]
    fn test_invalid_target_reported_and_dropped() {
        let applications = vec![AttributeApplication::new(
            "MethodOnlyAttribute",
            AttributeTargets::FIELD,
        )];
        let (mut pipeline, diagnostics) = drive_to_validate(applications, AttributeTargets::FIELD);

        pipeline.decode_and_validate(
            |_| AttributeUsage {
                valid_targets: AttributeTargets::METHOD,
                allow_multiple: false,
            },
            &diagnostics,
        );
        assert_eq!(
            diagnostics
                .with_code(DiagnosticCode::InvalidAttributeTarget)
                .len(),
            1
        );

        let cell = OnceLock::new();
        assert!(pipeline.publish(&cell).is_empty());
    }

    #[test]
    fn test_security_attribute_target_restriction() {
        let applications = vec![
            AttributeApplication::new("PermissionAttribute", AttributeTargets::FIELD).security(),
        ];
        let (mut pipeline, diagnostics) = drive_to_validate(applications, AttributeTargets::FIELD);

        pipeline.decode_and_validate(|_| AttributeUsage::default(), &diagnostics);
        assert_eq!(
            diagnostics
                .with_code(DiagnosticCode::SecurityAttributeMisuse)
                .len(),
            1
        );
    }

    #[test]
    fn test_early_decode_reads_names_only() {
        let mut pipeline = AttributePipeline::new(vec![
            AttributeApplication::new("System.ObsoleteAttribute", AttributeTargets::METHOD),
            AttributeApplication::new("Whatever", AttributeTargets::METHOD),
        ]);
        pipeline.merge_and_filter(AttributeTargets::METHOD);
        // Unresolvable names stay in the list as error types
        pipeline.bind_types(|name| {
            TypeSymbol::Error(std::sync::Arc::new(ErrorTypeSymbol::missing(name, None)))
        });

        let early = pipeline.early_decode();
        assert!(early.is_obsolete);
        assert!(!early.is_conditional);
    }

    #[test]
    #[should_panic(expected = "attribute pipeline driven out of order")]
    fn test_out_of_order_phase_faults() {
        let mut pipeline = AttributePipeline::new(Vec::new());
        // Skipping merge_and_filter violates the protocol
        pipeline.bind_types(|_| {
            TypeSymbol::Error(std::sync::Arc::new(ErrorTypeSymbol::missing("x", None)))
        });
    }
}
