//! Named type symbols across all provenances.
//!
//! A [`NamedTypeSymbol`] represents a class, struct, interface, enum or
//! delegate. One struct covers all five provenances through the
//! [`TypeProvenance`] discriminant; algorithms switch on it exhaustively, so
//! a new provenance is a crate-wide decision rather than an open extension
//! point.
//!
//! # Construction
//!
//! Generic instantiation goes through [`NamedTypeSymbol::construct`]. The
//! arity is validated eagerly, unset arguments are rejected, and the
//! identity-preserving no-op case (a definition constructed with its own
//! type parameters) returns the definition itself rather than a new wrapper;
//! caching throughout the crate depends on that.

use std::sync::{Arc, OnceLock, Weak};

use crate::semantics::annotations::TypeWithAnnotation;
use crate::semantics::symbols::{
    Accessibility, AssemblyRc, AssemblySymbol, Member, NamedTypeRc, RetargetingMap, SymbolKind,
    SymbolModifiers, TypeCompareKind, TypeParameterOwner, TypeParameterRc, TypeParameterSymbol,
    TypeSubstitution, TypeSymbol, UseSiteDiagnostic, Variance,
};
use crate::semantics::wellknown::SpecialType;
use crate::{Error, Result};

/// The language-level kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A reference type with single inheritance
    Class,
    /// A value type
    Struct,
    /// An interface (multiple inheritance of contracts)
    Interface,
    /// An enumeration
    Enum,
    /// A delegate type
    Delegate,
}

/// Where a named type symbol came from.
///
/// This is the closed provenance set of the symbol model: source-declared,
/// metadata-imported, retargeted onto a different assembly identity, or
/// constructed by generic substitution. Error placeholders live in
/// [`TypeSymbol::Error`](crate::semantics::symbols::TypeSymbol) instead.
#[derive(Debug)]
pub enum TypeProvenance {
    /// Declared in the current compilation
    Source,
    /// Imported from a referenced binary
    Metadata,
    /// A wrapper reporting `underlying` as if declared against a different
    /// assembly identity; nested references translate through `map`
    Retargeting {
        /// The wrapped type
        underlying: NamedTypeRc,
        /// The assembly translation map
        map: Arc<RetargetingMap>,
    },
    /// A generic definition with type arguments substituted in
    Constructed {
        /// The unsubstituted generic definition
        definition: NamedTypeRc,
        /// The parameter-to-argument map
        substitution: Arc<TypeSubstitution>,
        /// The supplied type arguments, in declaration order
        type_arguments: Vec<TypeWithAnnotation>,
    },
}

/// A named type symbol.
///
/// Declaration-phase mutation happens through publish-once cells and
/// append-only member lists; a fully-declared type is immutable and can be
/// shared freely across threads.
#[derive(Debug)]
pub struct NamedTypeSymbol {
    name: String,
    namespace: String,
    arity: u32,
    type_kind: TypeKind,
    provenance: TypeProvenance,
    accessibility: Accessibility,
    modifiers: SymbolModifiers,
    special: OnceLock<SpecialType>,
    containing_assembly: Weak<AssemblySymbol>,
    containing_type: OnceLock<Weak<NamedTypeSymbol>>,
    type_parameters: OnceLock<Vec<TypeParameterRc>>,
    base_type: OnceLock<Option<TypeWithAnnotation>>,
    interfaces: boxcar::Vec<TypeWithAnnotation>,
    members: boxcar::Vec<Member>,
    nested_types: boxcar::Vec<NamedTypeRc>,
    constructed_members: OnceLock<Vec<Member>>,
    all_interfaces_cache: OnceLock<Vec<NamedTypeRc>>,
    use_site: OnceLock<Option<UseSiteDiagnostic>>,
}

impl NamedTypeSymbol {
    pub(crate) fn new(
        name: String,
        namespace: String,
        arity: u32,
        type_kind: TypeKind,
        provenance: TypeProvenance,
        accessibility: Accessibility,
        modifiers: SymbolModifiers,
        containing_assembly: Weak<AssemblySymbol>,
    ) -> Self {
        Self {
            name,
            namespace,
            arity,
            type_kind,
            provenance,
            accessibility,
            modifiers,
            special: OnceLock::new(),
            containing_assembly,
            containing_type: OnceLock::new(),
            type_parameters: OnceLock::new(),
            base_type: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            members: boxcar::Vec::new(),
            nested_types: boxcar::Vec::new(),
            constructed_members: OnceLock::new(),
            all_interfaces_cache: OnceLock::new(),
            use_site: OnceLock::new(),
        }
    }

    /// The simple name of this type (no namespace, no arity suffix).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaring namespace; empty for the global namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The symbol kind (always [`SymbolKind::NamedType`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::NamedType
    }

    /// Number of generic type parameters.
    #[must_use]
    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// The language-level kind of this type.
    #[must_use]
    pub fn type_kind(&self) -> TypeKind {
        self.type_kind
    }

    /// Where this symbol came from.
    #[must_use]
    pub fn provenance(&self) -> &TypeProvenance {
        &self.provenance
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// Declaration modifiers.
    #[must_use]
    pub fn modifiers(&self) -> SymbolModifiers {
        self.modifiers
    }

    /// The metadata name: `Name` for non-generic types, `` Name`arity `` otherwise.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        if self.arity == 0 {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.arity)
        }
    }

    /// Qualified display name, including type arguments for constructed types.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        };
        if let TypeProvenance::Constructed { type_arguments, .. } = &self.provenance {
            let args: Vec<String> = type_arguments
                .iter()
                .map(TypeWithAnnotation::display_name)
                .collect();
            result.push('<');
            result.push_str(&args.join(", "));
            result.push('>');
        }
        result
    }

    /// True for interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.type_kind == TypeKind::Interface
    }

    /// True for structs and enums.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(self.type_kind, TypeKind::Struct | TypeKind::Enum)
    }

    /// True when this is the value-type nullable wrapper or a construction of it.
    #[must_use]
    pub fn is_nullable_wrapper(&self) -> bool {
        match &self.provenance {
            TypeProvenance::Constructed { definition, .. } => definition.is_nullable_wrapper(),
            _ => self.special.get().copied() == Some(SpecialType::NullableT),
        }
    }

    /// The special-type classification, if this type is one.
    #[must_use]
    pub fn special_type(&self) -> Option<SpecialType> {
        self.special.get().copied()
    }

    /// Record the special-type classification. Idempotent; first writer wins.
    pub fn set_special_type(&self, special: SpecialType) {
        let _ = self.special.set(special);
    }

    /// The assembly this type belongs to.
    #[must_use]
    pub fn containing_assembly(&self) -> Option<AssemblyRc> {
        self.containing_assembly.upgrade()
    }

    /// The enclosing type for nested types.
    #[must_use]
    pub fn containing_type(&self) -> Option<NamedTypeRc> {
        self.containing_type.get().and_then(Weak::upgrade)
    }

    pub(crate) fn set_containing_type(&self, containing: &NamedTypeRc) {
        let _ = self.containing_type.set(Arc::downgrade(containing));
    }

    /// Publish the type parameter list. Idempotent; first writer wins.
    pub fn set_type_parameters(&self, parameters: Vec<TypeParameterRc>) {
        let _ = self.type_parameters.set(parameters);
    }

    /// The generic type parameters, in declaration order.
    #[must_use]
    pub fn type_parameters(&self) -> &[TypeParameterRc] {
        self.type_parameters.get().map_or(&[], Vec::as_slice)
    }

    /// The supplied type arguments of a constructed type; empty for definitions.
    #[must_use]
    pub fn type_arguments(&self) -> &[TypeWithAnnotation] {
        match &self.provenance {
            TypeProvenance::Constructed { type_arguments, .. } => type_arguments,
            _ => &[],
        }
    }

    /// The parameter-to-argument map of a constructed type.
    #[must_use]
    pub fn substitution(&self) -> Option<&Arc<TypeSubstitution>> {
        match &self.provenance {
            TypeProvenance::Constructed { substitution, .. } => Some(substitution),
            _ => None,
        }
    }

    /// True for unsubstituted definitions (including retargeting wrappers).
    #[must_use]
    pub fn is_definition(&self) -> bool {
        !matches!(self.provenance, TypeProvenance::Constructed { .. })
    }

    /// The canonical unsubstituted form of this symbol.
    ///
    /// Idempotent: the original definition of an original definition is
    /// itself.
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> NamedTypeRc {
        match &self.provenance {
            TypeProvenance::Constructed { definition, .. } => definition.original_definition(),
            _ => self.clone(),
        }
    }

    /// Unwrap retargeting wrappers down to the underlying symbol.
    #[must_use]
    pub fn peel_retargeting(self: &Arc<Self>) -> NamedTypeRc {
        match &self.provenance {
            TypeProvenance::Retargeting { underlying, .. } => underlying.peel_retargeting(),
            _ => self.clone(),
        }
    }

    /// Publish the base type. Idempotent; first writer wins.
    pub fn set_base_type(&self, base: Option<TypeWithAnnotation>) {
        let _ = self.base_type.set(base);
    }

    /// The base type of this type, substituted/translated per provenance.
    #[must_use]
    pub fn base_type(self: &Arc<Self>) -> Option<TypeWithAnnotation> {
        match &self.provenance {
            TypeProvenance::Constructed {
                definition,
                substitution,
                ..
            } => definition.base_type().map(|b| b.substitute(substitution)),
            TypeProvenance::Retargeting { underlying, map } => {
                underlying.base_type().map(|b| map.translate_annotated(&b))
            }
            _ => self.base_type.get().cloned().flatten(),
        }
    }

    /// The base type as a named type, when it is one.
    #[must_use]
    pub fn base_named(self: &Arc<Self>) -> Option<NamedTypeRc> {
        match self.base_type()?.ty() {
            TypeSymbol::Named(t) => Some(t),
            _ => None,
        }
    }

    /// Declare a directly implemented interface.
    pub fn add_interface(&self, interface: TypeWithAnnotation) {
        self.interfaces.push(interface);
    }

    /// The directly implemented interfaces, substituted/translated per provenance.
    #[must_use]
    pub fn interfaces(self: &Arc<Self>) -> Vec<TypeWithAnnotation> {
        match &self.provenance {
            TypeProvenance::Constructed {
                definition,
                substitution,
                ..
            } => definition
                .interfaces()
                .iter()
                .map(|i| i.substitute(substitution))
                .collect(),
            TypeProvenance::Retargeting { underlying, map } => underlying
                .interfaces()
                .iter()
                .map(|i| map.translate_annotated(i))
                .collect(),
            _ => self.interfaces.iter().map(|(_, i)| i.clone()).collect(),
        }
    }

    /// Declare a member on this type. Declaration order is preserved and is
    /// the tie-break for ambiguous matches.
    pub fn add_member(&self, member: Member) {
        self.members.push(member);
    }

    /// All members, in declaration order, substituted per provenance.
    #[must_use]
    pub fn members(self: &Arc<Self>) -> Vec<Member> {
        match &self.provenance {
            TypeProvenance::Constructed {
                definition,
                substitution,
                ..
            } => self
                .constructed_members
                .get_or_init(|| {
                    definition
                        .members()
                        .iter()
                        .map(|m| m.substitute(substitution, self))
                        .collect()
                })
                .clone(),
            TypeProvenance::Retargeting { underlying, map } => underlying
                .members()
                .iter()
                .map(|m| map.translate_member(m, self))
                .collect(),
            _ => self.members.iter().map(|(_, m)| m.clone()).collect(),
        }
    }

    /// Members with the given name, in declaration order.
    #[must_use]
    pub fn members_named(self: &Arc<Self>, name: &str) -> Vec<Member> {
        self.members()
            .into_iter()
            .filter(|m| m.name() == name)
            .collect()
    }

    /// Declare a nested type.
    pub fn add_nested_type(self: &Arc<Self>, nested: NamedTypeRc) {
        nested.set_containing_type(self);
        self.nested_types.push(nested);
    }

    /// All nested types, in declaration order.
    #[must_use]
    pub fn nested_types(&self) -> Vec<NamedTypeRc> {
        self.nested_types.iter().map(|(_, t)| t.clone()).collect()
    }

    /// Look up a nested type by metadata name (`` Name`arity `` form).
    ///
    /// Nested lookup is relative to this type; for a constructed enclosing
    /// type the nested definition is returned as declared (its references to
    /// the enclosing parameters resolve through the enclosing substitution
    /// on member access).
    #[must_use]
    pub fn get_nested_type(&self, metadata_name: &str) -> Option<NamedTypeRc> {
        self.nested_types
            .iter()
            .map(|(_, t)| t)
            .find(|t| t.metadata_name() == metadata_name)
            .cloned()
    }

    /// Construct this generic definition with the given type arguments.
    ///
    /// # Errors
    /// - [`Error::ArgumentMismatch`] when the argument count differs from the
    ///   declared arity
    /// - [`Error::InvalidArgument`] when an argument is the unset sentinel,
    ///   or when called on a symbol that is not a definition
    ///
    /// Constructing a definition with exactly its own type parameters is a
    /// no-op and returns the definition itself, reference-identically.
    pub fn construct(self: &Arc<Self>, args: Vec<TypeWithAnnotation>) -> Result<NamedTypeRc> {
        if !self.is_definition() {
            return Err(Error::InvalidArgument(
                "only generic definitions can be constructed".to_string(),
            ));
        }

        if args.len() as u32 != self.arity {
            return Err(Error::ArgumentMismatch {
                expected: self.arity,
                actual: args.len() as u32,
            });
        }

        if args.iter().any(TypeWithAnnotation::is_unset) {
            return Err(Error::InvalidArgument(
                "type argument is unset".to_string(),
            ));
        }

        // Identity-preserving optimization: substituting a definition's own
        // type parameters (without extra annotation) is a no-op and must
        // return the same symbol instance for caching to work.
        let parameters = self.type_parameters();
        if parameters.len() == args.len() {
            let is_identity = parameters.iter().zip(args.iter()).all(|(p, a)| {
                if a.annotation() == crate::semantics::annotations::NullableAnnotation::Annotated
                    || !a.custom_modifiers().is_empty()
                {
                    return false;
                }
                matches!(a.ty(), TypeSymbol::TypeParameter(ref ap) if Arc::ptr_eq(ap, p))
            });
            if is_identity {
                return Ok(self.clone());
            }
        }

        let substitution = Arc::new(TypeSubstitution::new(parameters, &args));
        let constructed = Arc::new(NamedTypeSymbol::new(
            self.name.clone(),
            self.namespace.clone(),
            self.arity,
            self.type_kind,
            TypeProvenance::Constructed {
                definition: self.clone(),
                substitution,
                type_arguments: args,
            },
            self.accessibility,
            self.modifiers,
            self.containing_assembly.clone(),
        ));
        constructed.set_type_parameters(parameters.to_vec());
        if let Some(containing) = self.containing_type.get() {
            let _ = constructed.containing_type.set(containing.clone());
        }
        Ok(constructed)
    }

    /// The base-type chain of this type, nearest ancestor first.
    ///
    /// Cycle-guarded by an explicit visited set; a malformed cyclic
    /// hierarchy terminates the walk instead of overflowing the stack.
    #[must_use]
    pub fn base_chain(self: &Arc<Self>) -> Vec<NamedTypeRc> {
        let mut chain = Vec::new();
        let mut visited: Vec<NamedTypeRc> = vec![self.clone()];
        let mut current = self.base_named();
        while let Some(base) = current {
            if visited
                .iter()
                .any(|v| TypeSymbol::Named(v.clone()).equals(
                    &TypeSymbol::Named(base.clone()),
                    TypeCompareKind::ALL_IGNORE_OPTIONS,
                ))
            {
                break;
            }
            visited.push(base.clone());
            current = base.base_named();
            chain.push(base);
        }
        chain
    }

    /// The transitive interface set, topologically ordered so that every
    /// interface appears before the interfaces it extends.
    ///
    /// This is the walk order for interface hiding: finding a member on a
    /// derived interface marks its whole transitive set as covered, so
    /// base-interface members are not re-discovered along that path.
    #[must_use]
    pub fn all_interfaces(self: &Arc<Self>) -> Vec<NamedTypeRc> {
        self.all_interfaces_cache
            .get_or_init(|| {
                // Reversed post-order over a reversed sibling walk: every
                // interface lands before its own bases, and unrelated
                // siblings keep their declaration order.
                let mut post_order: Vec<NamedTypeRc> = Vec::new();
                let mut visited: Vec<NamedTypeRc> = Vec::new();
                for interface in self.direct_interface_types().iter().rev() {
                    Self::interface_dfs(interface, &mut visited, &mut post_order);
                }
                post_order.reverse();
                post_order
            })
            .clone()
    }

    fn interface_dfs(
        interface: &NamedTypeRc,
        visited: &mut Vec<NamedTypeRc>,
        post_order: &mut Vec<NamedTypeRc>,
    ) {
        if visited.iter().any(|v| {
            TypeSymbol::Named(v.clone()).equals(
                &TypeSymbol::Named(interface.clone()),
                TypeCompareKind::ALL_IGNORE_OPTIONS,
            )
        }) {
            return;
        }
        visited.push(interface.clone());
        for base in interface.direct_interface_types().iter().rev() {
            Self::interface_dfs(base, visited, post_order);
        }
        post_order.push(interface.clone());
    }

    fn direct_interface_types(self: &Arc<Self>) -> Vec<NamedTypeRc> {
        self.interfaces()
            .iter()
            .filter_map(|i| match i.ty() {
                TypeSymbol::Named(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// The lazily-computed use-site diagnostic for this type.
    #[must_use]
    pub fn use_site_diagnostic(self: &Arc<Self>) -> Option<UseSiteDiagnostic> {
        self.use_site
            .get_or_init(|| crate::semantics::symbols::usesite::for_named_type(self))
            .clone()
    }
}

/// Builder for declaring named type symbols.
///
/// Used by the declaration binder (and tests) to create types with their
/// type parameters wired to the right owner. The built type is registered
/// in its assembly's namespace tree.
pub struct NamedTypeBuilder {
    assembly: AssemblyRc,
    namespace: String,
    name: String,
    arity: u32,
    type_kind: TypeKind,
    provenance: TypeProvenance,
    accessibility: Accessibility,
    modifiers: SymbolModifiers,
    variances: Vec<Variance>,
}

impl NamedTypeBuilder {
    /// Start building a type declared in `assembly`.
    #[must_use]
    pub fn new(assembly: &AssemblyRc) -> Self {
        Self {
            assembly: assembly.clone(),
            namespace: String::new(),
            name: String::new(),
            arity: 0,
            type_kind: TypeKind::Class,
            provenance: TypeProvenance::Source,
            accessibility: Accessibility::Public,
            modifiers: SymbolModifiers::empty(),
            variances: Vec::new(),
        }
    }

    /// Set the declaring namespace (dotted path; empty for global).
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the simple name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the generic arity; parameters are created as `T0`, `T1`, ...
    #[must_use]
    pub fn arity(mut self, arity: u32) -> Self {
        self.arity = arity;
        self
    }

    /// Set the language-level kind.
    #[must_use]
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.type_kind = kind;
        self
    }

    /// Mark this type as imported from metadata rather than source.
    #[must_use]
    pub fn from_metadata(mut self) -> Self {
        self.provenance = TypeProvenance::Metadata;
        self
    }

    /// Set the declared accessibility.
    #[must_use]
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Set the declaration modifiers.
    #[must_use]
    pub fn modifiers(mut self, modifiers: SymbolModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set per-parameter variances (interfaces/delegates only).
    #[must_use]
    pub fn variances(mut self, variances: Vec<Variance>) -> Self {
        self.variances = variances;
        self
    }

    /// Build the type, create its parameters, and register it in the
    /// assembly's namespace tree.
    #[must_use]
    pub fn build(self) -> NamedTypeRc {
        let assembly = self.assembly.clone();
        let namespace = self.namespace.clone();
        let symbol = self.build_unregistered();
        assembly
            .global_namespace()
            .ensure_namespace(&namespace)
            .add_type(symbol.clone());
        symbol
    }

    /// Build the type without registering it in the namespace tree.
    ///
    /// Used for nested types, which are reachable through their container
    /// rather than the namespace.
    #[must_use]
    pub fn build_unregistered(self) -> NamedTypeRc {
        let symbol = Arc::new(NamedTypeSymbol::new(
            self.name,
            self.namespace.clone(),
            self.arity,
            self.type_kind,
            self.provenance,
            self.accessibility,
            self.modifiers,
            Arc::downgrade(&self.assembly),
        ));

        let parameters: Vec<TypeParameterRc> = (0..self.arity)
            .map(|ordinal| {
                let variance = self
                    .variances
                    .get(ordinal as usize)
                    .copied()
                    .unwrap_or(Variance::Invariant);
                Arc::new(TypeParameterSymbol::new(
                    format!("T{}", ordinal),
                    ordinal,
                    variance,
                    TypeParameterOwner::Type(Arc::downgrade(&symbol)),
                ))
            })
            .collect();
        symbol.set_type_parameters(parameters);

        if let Some(special) = SpecialType::from_metadata_name(&self.namespace, &symbol.metadata_name()) {
            symbol.set_special_type(special);
        }

        symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::factories;

    #[test]
    fn test_original_definition_idempotent() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let generic = factories::generic_class_in(&corlib, "NS", "G", 1);
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));
        let constructed = generic.construct(vec![arg]).unwrap();

        let original = constructed.original_definition();
        assert!(Arc::ptr_eq(&original, &generic));
        assert!(Arc::ptr_eq(&original.original_definition(), &original));
    }

    #[test]
    fn test_construct_identity_optimization() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let generic = factories::generic_class_in(&corlib, "NS", "G", 1);

        let own_param = TypeWithAnnotation::new(
            TypeSymbol::TypeParameter(generic.type_parameters()[0].clone()),
            crate::semantics::annotations::NullableAnnotation::NotAnnotated,
        );
        let result = generic.construct(vec![own_param]).unwrap();
        assert!(Arc::ptr_eq(&result, &generic));
    }

    #[test]
    fn test_construct_arity_mismatch() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let generic = factories::generic_class_in(&corlib, "NS", "G", 2);
        let arg = factories::annotated(factories::class_in(&corlib, "NS", "Arg"));

        match generic.construct(vec![arg]) {
            Err(Error::ArgumentMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            _ => panic!("expected arity mismatch"),
        }
    }

    #[test]
    fn test_construct_unset_argument() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let generic = factories::generic_class_in(&corlib, "NS", "G", 1);

        match generic.construct(vec![TypeWithAnnotation::unset()]) {
            Err(Error::InvalidArgument(_)) => {}
            _ => panic!("expected invalid argument"),
        }
    }

    #[test]
    fn test_constructed_base_is_substituted() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        // Base<T> and Derived<T> : Base<T>
        let base = factories::generic_class_in(&corlib, "NS", "Base", 1);
        let derived = factories::generic_class_in(&corlib, "NS", "Derived", 1);
        let t = TypeWithAnnotation::new(
            TypeSymbol::TypeParameter(derived.type_parameters()[0].clone()),
            crate::semantics::annotations::NullableAnnotation::NotAnnotated,
        );
        let base_of_t = base.construct(vec![t]).unwrap();
        derived.set_base_type(Some(factories::annotated(base_of_t)));

        let concrete = factories::class_in(&corlib, "NS", "Concrete");
        let derived_of_concrete = derived
            .construct(vec![factories::annotated(concrete.clone())])
            .unwrap();

        let substituted_base = derived_of_concrete.base_named().unwrap();
        assert!(Arc::ptr_eq(&substituted_base.original_definition(), &base));
        assert!(substituted_base.type_arguments()[0].ty().equals(
            &TypeSymbol::Named(concrete),
            TypeCompareKind::CONSIDER_EVERYTHING
        ));
    }

    #[test]
    fn test_metadata_name_arity_suffix() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let generic = factories::generic_class_in(&corlib, "NS", "Outer", 1);
        let plain = factories::class_in(&corlib, "NS", "Plain");
        assert_eq!(generic.metadata_name(), "Outer`1");
        assert_eq!(plain.metadata_name(), "Plain");
    }

    #[test]
    fn test_base_chain_cycle_guard() {
        let (_, corlib) = factories::compilation_with_corlib("lib");
        let a = factories::class_in(&corlib, "NS", "CycleA");
        let b = factories::class_in(&corlib, "NS", "CycleB");
        a.set_base_type(Some(factories::annotated(b.clone())));
        b.set_base_type(Some(factories::annotated(a.clone())));

        // Malformed cycle terminates instead of overflowing
        let chain = a.base_chain();
        assert_eq!(chain.len(), 1);
        assert!(Arc::ptr_eq(&chain[0], &b));
    }
}
