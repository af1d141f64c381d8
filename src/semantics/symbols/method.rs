//! Method symbols, including accessors, constructors and operators.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock, Weak,
};

use crate::semantics::annotations::{CustomModifier, TypeWithAnnotation};
use crate::semantics::attributes::BoundAttributeList;
use crate::semantics::inheritance::OverriddenOrHiddenMembersResult;
use crate::semantics::symbols::{
    Accessibility, EventSymbol, MethodRc, NamedTypeRc, NamedTypeSymbol, ParameterRc,
    PropertySymbol, RefKind, SymbolKind, SymbolModifiers, TypeParameterOwner, TypeParameterRc,
    TypeParameterSymbol, TypeSubstitution, TypeSymbol, UseSiteDiagnostic,
};
use crate::{Error, Result};

bitflags::bitflags! {
    /// Calling-convention bits of a method signature.
    ///
    /// The empty set is the default managed static convention. Vararg-ness is
    /// always significant in signature comparison, even under policies that
    /// otherwise ignore the calling convention.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CallingConvention: u8 {
        /// Instance method (`this` parameter present)
        const HAS_THIS = 0x01;
        /// `this` is explicit in the signature
        const EXPLICIT_THIS = 0x02;
        /// Variable-argument method
        const VARARG = 0x04;
        /// Generic method (carries a type-parameter count)
        const GENERIC = 0x08;
    }
}

impl CallingConvention {
    /// The default managed convention.
    pub const DEFAULT: CallingConvention = CallingConvention::empty();
}

/// Fine-grained classification of a method symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// An ordinary method
    Ordinary,
    /// An instance constructor
    Constructor,
    /// A static constructor
    StaticConstructor,
    /// A finalizer/destructor
    Destructor,
    /// A property get accessor
    PropertyGet,
    /// A property set accessor
    PropertySet,
    /// An event add accessor
    EventAdd,
    /// An event remove accessor
    EventRemove,
    /// A user-defined operator
    Operator,
    /// A user-defined conversion
    Conversion,
}

impl MethodKind {
    /// True for property and event accessors.
    #[must_use]
    pub fn is_accessor(self) -> bool {
        matches!(
            self,
            MethodKind::PropertyGet
                | MethodKind::PropertySet
                | MethodKind::EventAdd
                | MethodKind::EventRemove
        )
    }

    /// True for kinds that can never be hidden by an ordinary member.
    ///
    /// Constructors, destructors, operators, conversions and accessors are
    /// exempt from name-based hiding.
    #[must_use]
    pub fn is_hiding_exempt(self) -> bool {
        !matches!(self, MethodKind::Ordinary)
    }
}

/// The property or event a method accessor belongs to.
#[derive(Debug, Clone)]
pub enum AssociatedMember {
    /// Accessor of a property
    Property(Weak<PropertySymbol>),
    /// Accessor of an event
    Event(Weak<EventSymbol>),
}

#[derive(Debug)]
struct ConstructedFrom {
    original: MethodRc,
    #[allow(dead_code)]
    substitution: Arc<TypeSubstitution>,
}

/// A method symbol.
///
/// Covers ordinary methods, constructors, destructors, operators,
/// conversions and accessors; the [`MethodKind`] discriminant drives the
/// kind-specific rules in override resolution and signature comparison.
#[derive(Debug)]
pub struct MethodSymbol {
    name: String,
    method_kind: MethodKind,
    accessibility: Accessibility,
    modifiers: SymbolModifiers,
    containing_type: Weak<NamedTypeSymbol>,
    type_parameters: OnceLock<Vec<TypeParameterRc>>,
    parameters: OnceLock<Vec<ParameterRc>>,
    return_type: OnceLock<TypeWithAnnotation>,
    return_ref_kind: RefKind,
    ref_custom_modifiers: Vec<CustomModifier>,
    calling_convention: CallingConvention,
    explicit_impls: boxcar::Vec<MethodRc>,
    associated: OnceLock<AssociatedMember>,
    constructed_from: Option<ConstructedFrom>,
    overridden_or_hidden: OnceLock<Arc<OverriddenOrHiddenMembersResult>>,
    override_resolution_active: AtomicBool,
    attributes: OnceLock<BoundAttributeList>,
    use_site: OnceLock<Option<UseSiteDiagnostic>>,
}

impl MethodSymbol {
    /// Create a new method declared on `containing`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        method_kind: MethodKind,
        accessibility: Accessibility,
        modifiers: SymbolModifiers,
        containing: &NamedTypeRc,
        calling_convention: CallingConvention,
        return_ref_kind: RefKind,
    ) -> Self {
        Self {
            name: name.into(),
            method_kind,
            accessibility,
            modifiers,
            containing_type: Arc::downgrade(containing),
            type_parameters: OnceLock::new(),
            parameters: OnceLock::new(),
            return_type: OnceLock::new(),
            return_ref_kind,
            ref_custom_modifiers: Vec::new(),
            calling_convention,
            explicit_impls: boxcar::Vec::new(),
            associated: OnceLock::new(),
            constructed_from: None,
            overridden_or_hidden: OnceLock::new(),
            override_resolution_active: AtomicBool::new(false),
            attributes: OnceLock::new(),
            use_site: OnceLock::new(),
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind (always [`SymbolKind::Method`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Method
    }

    /// The fine-grained method kind.
    #[must_use]
    pub fn method_kind(&self) -> MethodKind {
        self.method_kind
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

    /// The declaring type.
    #[must_use]
    pub fn containing_type(&self) -> Option<NamedTypeRc> {
        self.containing_type.upgrade()
    }

    /// Number of generic type parameters.
    #[must_use]
    pub fn arity(&self) -> u32 {
        self.type_parameters() .len() as u32
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

    /// Publish the parameter list. Idempotent; first writer wins.
    pub fn set_parameters(&self, parameters: Vec<ParameterRc>) {
        let _ = self.parameters.set(parameters);
    }

    /// The parameters, in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterRc] {
        self.parameters.get().map_or(&[], Vec::as_slice)
    }

    /// Publish the return type. Idempotent; first writer wins.
    pub fn set_return_type(&self, return_type: TypeWithAnnotation) {
        let _ = self.return_type.set(return_type);
    }

    /// The annotated return type; the unset sentinel when not yet published.
    #[must_use]
    pub fn return_type(&self) -> TypeWithAnnotation {
        self.return_type
            .get()
            .cloned()
            .unwrap_or_else(TypeWithAnnotation::unset)
    }

    /// The by-reference kind of the return value.
    #[must_use]
    pub fn return_ref_kind(&self) -> RefKind {
        self.return_ref_kind
    }

    /// Custom modifiers on the return's `ref` position.
    #[must_use]
    pub fn ref_custom_modifiers(&self) -> &[CustomModifier] {
        &self.ref_custom_modifiers
    }

    /// The signature calling convention.
    #[must_use]
    pub fn calling_convention(&self) -> CallingConvention {
        self.calling_convention
    }

    /// True for variable-argument methods.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        self.calling_convention.contains(CallingConvention::VARARG)
    }

    /// Declare an explicitly implemented interface method.
    pub fn add_explicit_interface_implementation(&self, implemented: MethodRc) {
        self.explicit_impls.push(implemented);
    }

    /// The explicitly implemented interface methods.
    #[must_use]
    pub fn explicit_interface_implementations(&self) -> Vec<MethodRc> {
        self.explicit_impls.iter().map(|(_, m)| m.clone()).collect()
    }

    /// Associate this accessor with its property or event. First writer wins.
    pub fn set_associated(&self, associated: AssociatedMember) {
        let _ = self.associated.set(associated);
    }

    /// The property or event this accessor belongs to.
    #[must_use]
    pub fn associated_member(&self) -> Option<&AssociatedMember> {
        self.associated.get()
    }

    /// The canonical unsubstituted form of this symbol.
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> MethodRc {
        match &self.constructed_from {
            Some(constructed) => constructed.original.original_definition(),
            None => self.clone(),
        }
    }

    /// True for unsubstituted definitions.
    #[must_use]
    pub fn is_definition(&self) -> bool {
        self.constructed_from.is_none()
    }

    /// Instantiate this generic method with the given type arguments.
    ///
    /// # Errors
    /// Same contract as
    /// [`NamedTypeSymbol::construct`](crate::semantics::symbols::NamedTypeSymbol::construct):
    /// arity mismatches and unset arguments are rejected; instantiating with
    /// the method's own type parameters returns the method itself.
    pub fn construct(self: &Arc<Self>, args: Vec<TypeWithAnnotation>) -> Result<MethodRc> {
        let parameters = self.type_parameters();

        if args.len() != parameters.len() {
            return Err(Error::ArgumentMismatch {
                expected: parameters.len() as u32,
                actual: args.len() as u32,
            });
        }

        if args.iter().any(TypeWithAnnotation::is_unset) {
            return Err(Error::InvalidArgument(
                "type argument is unset".to_string(),
            ));
        }

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

        let substitution = Arc::new(TypeSubstitution::new(parameters, &args));
        let container = match self.containing_type() {
            Some(container) => container,
            None => {
                return Err(Error::InvalidArgument(
                    "method has no containing type".to_string(),
                ))
            }
        };
        Ok(self.substitute_with_association(&substitution, &container, None))
    }

    /// Create a substituted copy of this method under `new_container`.
    pub(crate) fn substitute_with_association(
        self: &Arc<Self>,
        substitution: &Arc<TypeSubstitution>,
        new_container: &NamedTypeRc,
        associated: Option<AssociatedMember>,
    ) -> MethodRc {
        let substituted = Arc::new(MethodSymbol {
            name: self.name.clone(),
            method_kind: self.method_kind,
            accessibility: self.accessibility,
            modifiers: self.modifiers,
            containing_type: Arc::downgrade(new_container),
            type_parameters: OnceLock::new(),
            parameters: OnceLock::new(),
            return_type: OnceLock::new(),
            return_ref_kind: self.return_ref_kind,
            ref_custom_modifiers: self.ref_custom_modifiers.clone(),
            calling_convention: self.calling_convention,
            explicit_impls: boxcar::Vec::new(),
            associated: OnceLock::new(),
            constructed_from: Some(ConstructedFrom {
                original: self.clone(),
                substitution: substitution.clone(),
            }),
            overridden_or_hidden: OnceLock::new(),
            override_resolution_active: AtomicBool::new(false),
            attributes: OnceLock::new(),
            use_site: OnceLock::new(),
        });

        // Type parameters stay those of the definition; positional
        // comparison under substitution makes nominal renaming unnecessary.
        substituted.set_type_parameters(self.type_parameters().to_vec());
        substituted.set_parameters(
            self.parameters()
                .iter()
                .map(|p| Arc::new(p.substitute(substitution)))
                .collect(),
        );
        substituted.set_return_type(self.return_type().substitute(substitution));
        for implemented in self.explicit_interface_implementations() {
            substituted.add_explicit_interface_implementation(implemented);
        }
        if let Some(associated) = associated {
            substituted.set_associated(associated);
        } else if let Some(existing) = self.associated.get() {
            substituted.set_associated(existing.clone());
        }
        substituted
    }

    /// Create a fresh type parameter owned by this method.
    ///
    /// Helper for declaration binders; the parameter must afterwards be
    /// included in the list passed to [`set_type_parameters`](Self::set_type_parameters).
    #[must_use]
    pub fn new_type_parameter(self: &Arc<Self>, name: impl Into<String>, ordinal: u32) -> TypeParameterRc {
        Arc::new(TypeParameterSymbol::new(
            name,
            ordinal,
            crate::semantics::symbols::Variance::Invariant,
            TypeParameterOwner::Method(Arc::downgrade(self)),
        ))
    }

    /// True while this method's override resolution is running.
    ///
    /// Lazy nullable-type-parameter references consult this before forcing
    /// resolution; see the annotations module.
    #[must_use]
    pub fn override_resolution_active(&self) -> bool {
        self.override_resolution_active.load(Ordering::Acquire)
    }

    pub(crate) fn begin_override_resolution(&self) {
        self.override_resolution_active
            .store(true, Ordering::Release);
    }

    pub(crate) fn end_override_resolution(&self) {
        self.override_resolution_active
            .store(false, Ordering::Release);
    }

    pub(crate) fn overridden_or_hidden_cell(
        &self,
    ) -> &OnceLock<Arc<OverriddenOrHiddenMembersResult>> {
        &self.overridden_or_hidden
    }

    /// The published bound-attribute list, if the attribute pipeline ran.
    #[must_use]
    pub fn attributes(&self) -> Option<&BoundAttributeList> {
        self.attributes.get()
    }

    pub(crate) fn attributes_cell(&self) -> &OnceLock<BoundAttributeList> {
        &self.attributes
    }

    /// The lazily-computed use-site diagnostic for this method.
    #[must_use]
    pub fn use_site_diagnostic(self: &Arc<Self>) -> Option<UseSiteDiagnostic> {
        self.use_site
            .get_or_init(|| crate::semantics::symbols::usesite::for_method(self))
            .clone()
    }

    /// Display name for diagnostics: `Type.Name(param, ...)`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let container = self
            .containing_type()
            .map(|t| t.display_name())
            .unwrap_or_default();
        let params: Vec<String> = self
            .parameters()
            .iter()
            .map(|p| p.parameter_type().display_name())
            .collect();
        format!("{}.{}({})", container, self.name, params.join(", "))
    }
}
