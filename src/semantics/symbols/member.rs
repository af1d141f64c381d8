//! Field, property, event and parameter symbols, unified by [`Member`].
//!
//! Property and event accessors are reachable only through their owning
//! member (`get_method`/`set_method`, `add_method`/`remove_method`); they do
//! not appear in type member lists. Override resolution for accessors always
//! derives from the owning member's resolution, so hierarchy walks never
//! need to find accessors by name.

use std::sync::{Arc, OnceLock, Weak};

use crate::semantics::annotations::{CustomModifier, TypeWithAnnotation};
use crate::semantics::inheritance::OverriddenOrHiddenMembersResult;
use crate::semantics::symbols::{
    Accessibility, AssociatedMember, EventRc, FieldRc, MethodKind, MethodRc, NamedTypeRc,
    NamedTypeSymbol, ParameterRc, PropertyRc, RefKind, SymbolKind, SymbolModifiers,
    TypeSubstitution, UseSiteDiagnostic,
};

/// A parameter of a method or indexer.
#[derive(Debug)]
pub struct ParameterSymbol {
    name: String,
    ordinal: u32,
    parameter_type: TypeWithAnnotation,
    ref_kind: RefKind,
    ref_custom_modifiers: Vec<CustomModifier>,
}

impl ParameterSymbol {
    /// Create a new parameter.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ordinal: u32,
        parameter_type: TypeWithAnnotation,
        ref_kind: RefKind,
    ) -> Self {
        Self {
            name: name.into(),
            ordinal,
            parameter_type,
            ref_kind,
            ref_custom_modifiers: Vec::new(),
        }
    }

    /// Attach custom modifiers to the `ref` position.
    #[must_use]
    pub fn with_ref_custom_modifiers(mut self, modifiers: Vec<CustomModifier>) -> Self {
        self.ref_custom_modifiers = modifiers;
        self
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind (always [`SymbolKind::Parameter`]).
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Parameter
    }

    /// Zero-based position.
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// The annotated parameter type.
    #[must_use]
    pub fn parameter_type(&self) -> &TypeWithAnnotation {
        &self.parameter_type
    }

    /// The by-reference kind.
    #[must_use]
    pub fn ref_kind(&self) -> RefKind {
        self.ref_kind
    }

    /// Custom modifiers on the `ref` position.
    #[must_use]
    pub fn ref_custom_modifiers(&self) -> &[CustomModifier] {
        &self.ref_custom_modifiers
    }

    /// Substituted copy of this parameter.
    #[must_use]
    pub(crate) fn substitute(&self, substitution: &TypeSubstitution) -> ParameterSymbol {
        ParameterSymbol {
            name: self.name.clone(),
            ordinal: self.ordinal,
            parameter_type: self.parameter_type.substitute(substitution),
            ref_kind: self.ref_kind,
            ref_custom_modifiers: self.ref_custom_modifiers.clone(),
        }
    }
}

/// A field symbol.
#[derive(Debug)]
pub struct FieldSymbol {
    name: String,
    accessibility: Accessibility,
    modifiers: SymbolModifiers,
    containing_type: Weak<NamedTypeSymbol>,
    field_type: OnceLock<TypeWithAnnotation>,
    constructed_from: Option<FieldRc>,
    use_site: OnceLock<Option<UseSiteDiagnostic>>,
}

impl FieldSymbol {
    /// Create a new field declared on `containing`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        accessibility: Accessibility,
        modifiers: SymbolModifiers,
        containing: &NamedTypeRc,
    ) -> Self {
        Self {
            name: name.into(),
            accessibility,
            modifiers,
            containing_type: Arc::downgrade(containing),
            field_type: OnceLock::new(),
            constructed_from: None,
            use_site: OnceLock::new(),
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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

    /// Publish the field type. Idempotent; first writer wins.
    pub fn set_field_type(&self, field_type: TypeWithAnnotation) {
        let _ = self.field_type.set(field_type);
    }

    /// The annotated field type; the unset sentinel when not yet published.
    #[must_use]
    pub fn field_type(&self) -> TypeWithAnnotation {
        self.field_type
            .get()
            .cloned()
            .unwrap_or_else(TypeWithAnnotation::unset)
    }

    /// The canonical unsubstituted form of this symbol.
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> FieldRc {
        match &self.constructed_from {
            Some(original) => original.original_definition(),
            None => self.clone(),
        }
    }

    fn substitute(
        self: &Arc<Self>,
        substitution: &Arc<TypeSubstitution>,
        new_container: &NamedTypeRc,
    ) -> FieldRc {
        let substituted = Arc::new(FieldSymbol {
            name: self.name.clone(),
            accessibility: self.accessibility,
            modifiers: self.modifiers,
            containing_type: Arc::downgrade(new_container),
            field_type: OnceLock::new(),
            constructed_from: Some(self.clone()),
            use_site: OnceLock::new(),
        });
        substituted.set_field_type(self.field_type().substitute(substitution));
        substituted
    }

    /// The lazily-computed use-site diagnostic for this field.
    #[must_use]
    pub fn use_site_diagnostic(self: &Arc<Self>) -> Option<UseSiteDiagnostic> {
        self.use_site
            .get_or_init(|| crate::semantics::symbols::usesite::for_field(self))
            .clone()
    }
}

/// A property symbol, including indexers.
#[derive(Debug)]
pub struct PropertySymbol {
    name: String,
    accessibility: Accessibility,
    modifiers: SymbolModifiers,
    containing_type: Weak<NamedTypeSymbol>,
    property_type: OnceLock<TypeWithAnnotation>,
    parameters: OnceLock<Vec<ParameterRc>>,
    ref_kind: RefKind,
    is_indexer: bool,
    get_method: OnceLock<MethodRc>,
    set_method: OnceLock<MethodRc>,
    explicit_impls: boxcar::Vec<PropertyRc>,
    constructed_from: Option<PropertyRc>,
    overridden_or_hidden: OnceLock<Arc<OverriddenOrHiddenMembersResult>>,
    use_site: OnceLock<Option<UseSiteDiagnostic>>,
}

impl PropertySymbol {
    /// Create a new property declared on `containing`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        accessibility: Accessibility,
        modifiers: SymbolModifiers,
        containing: &NamedTypeRc,
        is_indexer: bool,
        ref_kind: RefKind,
    ) -> Self {
        Self {
            name: name.into(),
            accessibility,
            modifiers,
            containing_type: Arc::downgrade(containing),
            property_type: OnceLock::new(),
            parameters: OnceLock::new(),
            ref_kind,
            is_indexer,
            get_method: OnceLock::new(),
            set_method: OnceLock::new(),
            explicit_impls: boxcar::Vec::new(),
            constructed_from: None,
            overridden_or_hidden: OnceLock::new(),
            use_site: OnceLock::new(),
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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

    /// True for indexers.
    #[must_use]
    pub fn is_indexer(&self) -> bool {
        self.is_indexer
    }

    /// The by-reference kind of the property value.
    #[must_use]
    pub fn ref_kind(&self) -> RefKind {
        self.ref_kind
    }

    /// Publish the property type. Idempotent; first writer wins.
    pub fn set_property_type(&self, property_type: TypeWithAnnotation) {
        let _ = self.property_type.set(property_type);
    }

    /// The annotated property type; the unset sentinel when not yet published.
    #[must_use]
    pub fn property_type(&self) -> TypeWithAnnotation {
        self.property_type
            .get()
            .cloned()
            .unwrap_or_else(TypeWithAnnotation::unset)
    }

    /// Publish the indexer parameter list. Idempotent; first writer wins.
    pub fn set_parameters(&self, parameters: Vec<ParameterRc>) {
        let _ = self.parameters.set(parameters);
    }

    /// Indexer parameters; empty for ordinary properties.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterRc] {
        self.parameters.get().map_or(&[], Vec::as_slice)
    }

    /// Attach the get accessor and associate it back to this property.
    pub fn set_get_method(self: &Arc<Self>, method: MethodRc) {
        method.set_associated(AssociatedMember::Property(Arc::downgrade(self)));
        let _ = self.get_method.set(method);
    }

    /// Attach the set accessor and associate it back to this property.
    pub fn set_set_method(self: &Arc<Self>, method: MethodRc) {
        method.set_associated(AssociatedMember::Property(Arc::downgrade(self)));
        let _ = self.set_method.set(method);
    }

    /// The get accessor, if declared.
    #[must_use]
    pub fn get_method(&self) -> Option<MethodRc> {
        self.get_method.get().cloned()
    }

    /// The set accessor, if declared.
    #[must_use]
    pub fn set_method(&self) -> Option<MethodRc> {
        self.set_method.get().cloned()
    }

    /// The accessor of the given kind, if declared.
    #[must_use]
    pub fn accessor(&self, kind: MethodKind) -> Option<MethodRc> {
        match kind {
            MethodKind::PropertyGet => self.get_method(),
            MethodKind::PropertySet => self.set_method(),
            _ => None,
        }
    }

    /// Declare an explicitly implemented interface property.
    pub fn add_explicit_interface_implementation(&self, implemented: PropertyRc) {
        self.explicit_impls.push(implemented);
    }

    /// The explicitly implemented interface properties.
    #[must_use]
    pub fn explicit_interface_implementations(&self) -> Vec<PropertyRc> {
        self.explicit_impls.iter().map(|(_, p)| p.clone()).collect()
    }

    /// The canonical unsubstituted form of this symbol.
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> PropertyRc {
        match &self.constructed_from {
            Some(original) => original.original_definition(),
            None => self.clone(),
        }
    }

    fn substitute(
        self: &Arc<Self>,
        substitution: &Arc<TypeSubstitution>,
        new_container: &NamedTypeRc,
    ) -> PropertyRc {
        let substituted = Arc::new(PropertySymbol {
            name: self.name.clone(),
            accessibility: self.accessibility,
            modifiers: self.modifiers,
            containing_type: Arc::downgrade(new_container),
            property_type: OnceLock::new(),
            parameters: OnceLock::new(),
            ref_kind: self.ref_kind,
            is_indexer: self.is_indexer,
            get_method: OnceLock::new(),
            set_method: OnceLock::new(),
            explicit_impls: boxcar::Vec::new(),
            constructed_from: Some(self.clone()),
            overridden_or_hidden: OnceLock::new(),
            use_site: OnceLock::new(),
        });
        substituted.set_property_type(self.property_type().substitute(substitution));
        substituted.set_parameters(
            self.parameters()
                .iter()
                .map(|p| Arc::new(p.substitute(substitution)))
                .collect(),
        );
        // Accessors substitute together with their property so the
        // association stays within the constructed type.
        if let Some(get) = self.get_method() {
            substituted.set_get_method(get.substitute_with_association(
                substitution,
                new_container,
                Some(AssociatedMember::Property(Arc::downgrade(&substituted))),
            ));
        }
        if let Some(set) = self.set_method() {
            substituted.set_set_method(set.substitute_with_association(
                substitution,
                new_container,
                Some(AssociatedMember::Property(Arc::downgrade(&substituted))),
            ));
        }
        for implemented in self.explicit_interface_implementations() {
            substituted.add_explicit_interface_implementation(implemented);
        }
        substituted
    }

    pub(crate) fn overridden_or_hidden_cell(
        &self,
    ) -> &OnceLock<Arc<OverriddenOrHiddenMembersResult>> {
        &self.overridden_or_hidden
    }

    /// The lazily-computed use-site diagnostic for this property.
    #[must_use]
    pub fn use_site_diagnostic(self: &Arc<Self>) -> Option<UseSiteDiagnostic> {
        self.use_site
            .get_or_init(|| crate::semantics::symbols::usesite::for_property(self))
            .clone()
    }
}

/// An event symbol.
#[derive(Debug)]
pub struct EventSymbol {
    name: String,
    accessibility: Accessibility,
    modifiers: SymbolModifiers,
    containing_type: Weak<NamedTypeSymbol>,
    event_type: OnceLock<TypeWithAnnotation>,
    add_method: OnceLock<MethodRc>,
    remove_method: OnceLock<MethodRc>,
    explicit_impls: boxcar::Vec<EventRc>,
    constructed_from: Option<EventRc>,
    overridden_or_hidden: OnceLock<Arc<OverriddenOrHiddenMembersResult>>,
    use_site: OnceLock<Option<UseSiteDiagnostic>>,
}

impl EventSymbol {
    /// Create a new event declared on `containing`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        accessibility: Accessibility,
        modifiers: SymbolModifiers,
        containing: &NamedTypeRc,
    ) -> Self {
        Self {
            name: name.into(),
            accessibility,
            modifiers,
            containing_type: Arc::downgrade(containing),
            event_type: OnceLock::new(),
            add_method: OnceLock::new(),
            remove_method: OnceLock::new(),
            explicit_impls: boxcar::Vec::new(),
            constructed_from: None,
            overridden_or_hidden: OnceLock::new(),
            use_site: OnceLock::new(),
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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

    /// Publish the event (delegate) type. Idempotent; first writer wins.
    pub fn set_event_type(&self, event_type: TypeWithAnnotation) {
        let _ = self.event_type.set(event_type);
    }

    /// The annotated event type; the unset sentinel when not yet published.
    #[must_use]
    pub fn event_type(&self) -> TypeWithAnnotation {
        self.event_type
            .get()
            .cloned()
            .unwrap_or_else(TypeWithAnnotation::unset)
    }

    /// Attach the add accessor and associate it back to this event.
    pub fn set_add_method(self: &Arc<Self>, method: MethodRc) {
        method.set_associated(AssociatedMember::Event(Arc::downgrade(self)));
        let _ = self.add_method.set(method);
    }

    /// Attach the remove accessor and associate it back to this event.
    pub fn set_remove_method(self: &Arc<Self>, method: MethodRc) {
        method.set_associated(AssociatedMember::Event(Arc::downgrade(self)));
        let _ = self.remove_method.set(method);
    }

    /// The accessor of the given kind, if declared.
    #[must_use]
    pub fn accessor(&self, kind: MethodKind) -> Option<MethodRc> {
        match kind {
            MethodKind::EventAdd => self.add_method.get().cloned(),
            MethodKind::EventRemove => self.remove_method.get().cloned(),
            _ => None,
        }
    }

    /// Declare an explicitly implemented interface event.
    pub fn add_explicit_interface_implementation(&self, implemented: EventRc) {
        self.explicit_impls.push(implemented);
    }

    /// The explicitly implemented interface events.
    #[must_use]
    pub fn explicit_interface_implementations(&self) -> Vec<EventRc> {
        self.explicit_impls.iter().map(|(_, e)| e.clone()).collect()
    }

    /// The canonical unsubstituted form of this symbol.
    #[must_use]
    pub fn original_definition(self: &Arc<Self>) -> EventRc {
        match &self.constructed_from {
            Some(original) => original.original_definition(),
            None => self.clone(),
        }
    }

    fn substitute(
        self: &Arc<Self>,
        substitution: &Arc<TypeSubstitution>,
        new_container: &NamedTypeRc,
    ) -> EventRc {
        let substituted = Arc::new(EventSymbol {
            name: self.name.clone(),
            accessibility: self.accessibility,
            modifiers: self.modifiers,
            containing_type: Arc::downgrade(new_container),
            event_type: OnceLock::new(),
            add_method: OnceLock::new(),
            remove_method: OnceLock::new(),
            explicit_impls: boxcar::Vec::new(),
            constructed_from: Some(self.clone()),
            overridden_or_hidden: OnceLock::new(),
            use_site: OnceLock::new(),
        });
        substituted.set_event_type(self.event_type().substitute(substitution));
        if let Some(add) = self.add_method.get() {
            substituted.set_add_method(add.substitute_with_association(
                substitution,
                new_container,
                Some(AssociatedMember::Event(Arc::downgrade(&substituted))),
            ));
        }
        if let Some(remove) = self.remove_method.get() {
            substituted.set_remove_method(remove.substitute_with_association(
                substitution,
                new_container,
                Some(AssociatedMember::Event(Arc::downgrade(&substituted))),
            ));
        }
        for implemented in self.explicit_interface_implementations() {
            substituted.add_explicit_interface_implementation(implemented);
        }
        substituted
    }

    pub(crate) fn overridden_or_hidden_cell(
        &self,
    ) -> &OnceLock<Arc<OverriddenOrHiddenMembersResult>> {
        &self.overridden_or_hidden
    }

    /// The lazily-computed use-site diagnostic for this event.
    #[must_use]
    pub fn use_site_diagnostic(self: &Arc<Self>) -> Option<UseSiteDiagnostic> {
        self.use_site
            .get_or_init(|| crate::semantics::symbols::usesite::for_event(self))
            .clone()
    }
}

/// A member symbol of any kind, as stored in type member lists.
///
/// Accessor methods are not members in this sense; they hang off their
/// owning property or event.
#[derive(Debug, Clone)]
pub enum Member {
    /// A method (ordinary, constructor, operator, ...)
    Method(MethodRc),
    /// A field
    Field(FieldRc),
    /// A property or indexer
    Property(PropertyRc),
    /// An event
    Event(EventRc),
}

impl Member {
    /// The symbol kind of this member.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Member::Method(_) => SymbolKind::Method,
            Member::Field(_) => SymbolKind::Field,
            Member::Property(_) => SymbolKind::Property,
            Member::Event(_) => SymbolKind::Event,
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Member::Method(m) => m.name(),
            Member::Field(f) => f.name(),
            Member::Property(p) => p.name(),
            Member::Event(e) => e.name(),
        }
    }

    /// Generic arity; nonzero only for generic methods.
    #[must_use]
    pub fn arity(&self) -> u32 {
        match self {
            Member::Method(m) => m.arity(),
            _ => 0,
        }
    }

    /// The signature parameters (method parameters, indexer parameters).
    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterRc> {
        match self {
            Member::Method(m) => m.parameters().to_vec(),
            Member::Property(p) => p.parameters().to_vec(),
            _ => Vec::new(),
        }
    }

    /// The "return" position type: method return, field/property/event type.
    #[must_use]
    pub fn return_type(&self) -> TypeWithAnnotation {
        match self {
            Member::Method(m) => m.return_type(),
            Member::Field(f) => f.field_type(),
            Member::Property(p) => p.property_type(),
            Member::Event(e) => e.event_type(),
        }
    }

    /// The by-reference kind of the return position.
    #[must_use]
    pub fn return_ref_kind(&self) -> RefKind {
        match self {
            Member::Method(m) => m.return_ref_kind(),
            Member::Property(p) => p.ref_kind(),
            _ => RefKind::None,
        }
    }

    /// True for variable-argument methods.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        match self {
            Member::Method(m) => m.is_vararg(),
            _ => false,
        }
    }

    /// True when the member carries an explicit interface qualification.
    #[must_use]
    pub fn has_explicit_interface_qualification(&self) -> bool {
        match self {
            Member::Method(m) => !m.explicit_interface_implementations().is_empty(),
            Member::Property(p) => !p.explicit_interface_implementations().is_empty(),
            Member::Event(e) => !e.explicit_interface_implementations().is_empty(),
            Member::Field(_) => false,
        }
    }

    /// The explicitly implemented interface members, as members.
    #[must_use]
    pub fn explicit_interface_members(&self) -> Vec<Member> {
        match self {
            Member::Method(m) => m
                .explicit_interface_implementations()
                .into_iter()
                .map(Member::Method)
                .collect(),
            Member::Property(p) => p
                .explicit_interface_implementations()
                .into_iter()
                .map(Member::Property)
                .collect(),
            Member::Event(e) => e
                .explicit_interface_implementations()
                .into_iter()
                .map(Member::Event)
                .collect(),
            Member::Field(_) => Vec::new(),
        }
    }

    /// The declaring type.
    #[must_use]
    pub fn containing_type(&self) -> Option<NamedTypeRc> {
        match self {
            Member::Method(m) => m.containing_type(),
            Member::Field(f) => f.containing_type(),
            Member::Property(p) => p.containing_type(),
            Member::Event(e) => e.containing_type(),
        }
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        match self {
            Member::Method(m) => m.accessibility(),
            Member::Field(f) => f.accessibility(),
            Member::Property(p) => p.accessibility(),
            Member::Event(e) => e.accessibility(),
        }
    }

    /// Declaration modifiers.
    #[must_use]
    pub fn modifiers(&self) -> SymbolModifiers {
        match self {
            Member::Method(m) => m.modifiers(),
            Member::Field(f) => f.modifiers(),
            Member::Property(p) => p.modifiers(),
            Member::Event(e) => e.modifiers(),
        }
    }

    /// True for static members.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers().contains(SymbolModifiers::STATIC)
    }

    /// True for members declared `override`.
    #[must_use]
    pub fn is_override(&self) -> bool {
        self.modifiers().contains(SymbolModifiers::OVERRIDE)
    }

    /// True for members that can never be hidden by an ordinary member.
    #[must_use]
    pub fn is_hiding_exempt(&self) -> bool {
        match self {
            Member::Method(m) => m.method_kind().is_hiding_exempt(),
            _ => false,
        }
    }

    /// The canonical unsubstituted form of this member.
    #[must_use]
    pub fn original_definition(&self) -> Member {
        match self {
            Member::Method(m) => Member::Method(m.original_definition()),
            Member::Field(f) => Member::Field(f.original_definition()),
            Member::Property(p) => Member::Property(p.original_definition()),
            Member::Event(e) => Member::Event(e.original_definition()),
        }
    }

    /// Reference identity of two members.
    #[must_use]
    pub fn ptr_eq(a: &Member, b: &Member) -> bool {
        match (a, b) {
            (Member::Method(x), Member::Method(y)) => Arc::ptr_eq(x, y),
            (Member::Field(x), Member::Field(y)) => Arc::ptr_eq(x, y),
            (Member::Property(x), Member::Property(y)) => Arc::ptr_eq(x, y),
            (Member::Event(x), Member::Event(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Substituted copy of this member under `new_container`.
    #[must_use]
    pub fn substitute(
        &self,
        substitution: &Arc<TypeSubstitution>,
        new_container: &NamedTypeRc,
    ) -> Member {
        match self {
            Member::Method(m) => Member::Method(m.substitute_with_association(
                substitution,
                new_container,
                None,
            )),
            Member::Field(f) => Member::Field(f.substitute(substitution, new_container)),
            Member::Property(p) => Member::Property(p.substitute(substitution, new_container)),
            Member::Event(e) => Member::Event(e.substitute(substitution, new_container)),
        }
    }

    /// The override/hide resolution cache cell, for kinds that participate.
    #[must_use]
    pub(crate) fn overridden_or_hidden_cell(
        &self,
    ) -> Option<&OnceLock<Arc<OverriddenOrHiddenMembersResult>>> {
        match self {
            Member::Method(m) => Some(m.overridden_or_hidden_cell()),
            Member::Property(p) => Some(p.overridden_or_hidden_cell()),
            Member::Event(e) => Some(e.overridden_or_hidden_cell()),
            Member::Field(_) => None,
        }
    }

    /// The accessor of the given kind, for properties and events.
    #[must_use]
    pub fn accessor(&self, kind: MethodKind) -> Option<MethodRc> {
        match self {
            Member::Property(p) => p.accessor(kind),
            Member::Event(e) => e.accessor(kind),
            _ => None,
        }
    }

    /// Display name for diagnostics.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Member::Method(m) => m.display_name(),
            _ => {
                let container = self
                    .containing_type()
                    .map(|t| t.display_name())
                    .unwrap_or_default();
                format!("{}.{}", container, self.name())
            }
        }
    }

    /// The lazily-computed use-site diagnostic for this member.
    #[must_use]
    pub fn use_site_diagnostic(&self) -> Option<UseSiteDiagnostic> {
        match self {
            Member::Method(m) => m.use_site_diagnostic(),
            Member::Field(f) => f.use_site_diagnostic(),
            Member::Property(p) => p.use_site_diagnostic(),
            Member::Event(e) => e.use_site_diagnostic(),
        }
    }
}
