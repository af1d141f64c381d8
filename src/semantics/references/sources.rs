//! The collaborator surface supplying per-reference metadata.
//!
//! The core never parses binary formats itself: a [`ReferenceSource`]
//! supplies, per referenced binary, its identity, assembly-reference table,
//! declared types by name, and module names. [`MetadataFixture`] is the
//! in-memory implementation used by tests and tooling.

use std::sync::Arc;

use crate::semantics::compilation::Compilation;
use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::symbols::{Accessibility, TypeKind};

/// A type declared by a reference, as the metadata reader reports it.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    /// Dotted namespace path; empty for the global namespace
    pub namespace: String,
    /// Simple name, without arity suffix
    pub name: String,
    /// Generic arity
    pub arity: u32,
    /// Language-level kind
    pub type_kind: TypeKind,
    /// Declared accessibility
    pub accessibility: Accessibility,
    /// Types nested within this one
    pub nested: Vec<DeclaredType>,
}

impl DeclaredType {
    /// A public, non-generic class declaration.
    #[must_use]
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            arity: 0,
            type_kind: TypeKind::Class,
            accessibility: Accessibility::Public,
            nested: Vec::new(),
        }
    }

    /// A public generic class declaration.
    #[must_use]
    pub fn generic_class(
        namespace: impl Into<String>,
        name: impl Into<String>,
        arity: u32,
    ) -> Self {
        Self {
            arity,
            ..Self::class(namespace, name)
        }
    }

    /// Override the language-level kind.
    #[must_use]
    pub fn of_kind(mut self, type_kind: TypeKind) -> Self {
        self.type_kind = type_kind;
        self
    }

    /// Attach a nested type declaration.
    #[must_use]
    pub fn with_nested(mut self, nested: DeclaredType) -> Self {
        self.nested.push(nested);
        self
    }
}

/// A type forwarder entry: a name this assembly re-exports from another.
#[derive(Debug, Clone)]
pub struct TypeForwarder {
    /// Full metadata name of the forwarded type
    pub metadata_name: String,
    /// The assembly the type actually lives in
    pub target: AssemblyIdentity,
}

/// The per-binary surface the reference binder consumes.
///
/// Implementations enumerate; the binder resolves. No method of this trait
/// is expected to fault on malformed input: unrepresentable shapes surface
/// later as per-symbol use-site diagnostics.
pub trait ReferenceSource: Send + Sync {
    /// This binary's own identity.
    fn identity(&self) -> AssemblyIdentity;

    /// The identities in this binary's assembly-reference table, in order.
    fn referenced_assemblies(&self) -> Vec<AssemblyIdentity>;

    /// Module names; the first is the manifest module. An empty list is
    /// treated as a single default module.
    fn module_names(&self) -> Vec<String>;

    /// Top-level types declared by this binary.
    fn declared_types(&self) -> Vec<DeclaredType>;

    /// Type forwarder entries, if any.
    fn type_forwarders(&self) -> Vec<TypeForwarder> {
        Vec::new()
    }
}

/// In-memory [`ReferenceSource`] for tests and tooling.
///
/// # Examples
///
/// ```rust
/// use bindscope::semantics::references::{DeclaredType, MetadataFixture};
/// use bindscope::semantics::identity::AssemblyIdentity;
///
/// let fixture = MetadataFixture::new(AssemblyIdentity::parse("Lib, Version=1.0.0.0")?)
///     .with_reference(AssemblyIdentity::parse("mscorlib, Version=4.0.0.0")?)
///     .with_type(DeclaredType::class("Lib", "Widget"));
/// # Ok::<(), bindscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MetadataFixture {
    identity: AssemblyIdentity,
    references: Vec<AssemblyIdentity>,
    modules: Vec<String>,
    types: Vec<DeclaredType>,
    forwarders: Vec<TypeForwarder>,
}

impl MetadataFixture {
    /// Start a fixture for the given identity.
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> Self {
        Self {
            identity,
            references: Vec::new(),
            modules: Vec::new(),
            types: Vec::new(),
            forwarders: Vec::new(),
        }
    }

    /// Declare an assembly reference.
    #[must_use]
    pub fn with_reference(mut self, identity: AssemblyIdentity) -> Self {
        self.references.push(identity);
        self
    }

    /// Declare a module name.
    #[must_use]
    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.modules.push(name.into());
        self
    }

    /// Declare a top-level type.
    #[must_use]
    pub fn with_type(mut self, declared: DeclaredType) -> Self {
        self.types.push(declared);
        self
    }

    /// Declare a type forwarder.
    #[must_use]
    pub fn with_forwarder(
        mut self,
        metadata_name: impl Into<String>,
        target: AssemblyIdentity,
    ) -> Self {
        self.forwarders.push(TypeForwarder {
            metadata_name: metadata_name.into(),
            target,
        });
        self
    }

    /// Declare the core-library primitive types (`System.Object`,
    /// `System.Void`, the numeric primitives, `System.String`,
    /// `` System.Nullable`1 `` and the inheritance roots).
    #[must_use]
    pub fn declaring_corlib_types(mut self) -> Self {
        for name in [
            "Object", "Void", "Boolean", "Char", "SByte", "Byte", "Int16", "UInt16", "Int32",
            "UInt32", "Int64", "UInt64", "Single", "Double", "Decimal", "String", "IntPtr",
            "UIntPtr", "Enum", "ValueType", "Delegate", "Array",
        ] {
            self.types.push(DeclaredType::class("System", name));
        }
        self.types
            .push(DeclaredType::generic_class("System", "Nullable", 1).of_kind(TypeKind::Struct));
        self
    }
}

impl ReferenceSource for MetadataFixture {
    fn identity(&self) -> AssemblyIdentity {
        self.identity.clone()
    }

    fn referenced_assemblies(&self) -> Vec<AssemblyIdentity> {
        self.references.clone()
    }

    fn module_names(&self) -> Vec<String> {
        self.modules.clone()
    }

    fn declared_types(&self) -> Vec<DeclaredType> {
        self.types.clone()
    }

    fn type_forwarders(&self) -> Vec<TypeForwarder> {
        self.forwarders.clone()
    }
}

/// Properties attached to one declared reference.
#[derive(Debug, Clone, Default)]
pub struct ReferenceProperties {
    /// Embed interop types from this reference instead of linking to it
    pub embed_interop_types: bool,
    /// Extern alias, if declared
    pub alias: Option<String>,
}

/// One declared reference of a compilation.
#[derive(Clone)]
pub enum Reference {
    /// A reference to binary metadata
    Metadata {
        /// The metadata surface
        source: Arc<dyn ReferenceSource>,
        /// Reference properties
        properties: ReferenceProperties,
    },
    /// A reference to a sibling in-memory compilation
    Compilation {
        /// The referenced compilation
        compilation: Arc<Compilation>,
        /// Reference properties
        properties: ReferenceProperties,
    },
}

impl Reference {
    /// A metadata reference with default properties.
    #[must_use]
    pub fn metadata(source: Arc<dyn ReferenceSource>) -> Self {
        Reference::Metadata {
            source,
            properties: ReferenceProperties::default(),
        }
    }

    /// A metadata reference with embed-interop-types set.
    #[must_use]
    pub fn metadata_linked(source: Arc<dyn ReferenceSource>) -> Self {
        Reference::Metadata {
            source,
            properties: ReferenceProperties {
                embed_interop_types: true,
                alias: None,
            },
        }
    }

    /// A compilation reference with default properties.
    #[must_use]
    pub fn compilation(compilation: Arc<Compilation>) -> Self {
        Reference::Compilation {
            compilation,
            properties: ReferenceProperties::default(),
        }
    }

    /// The identity this reference resolves under.
    #[must_use]
    pub fn identity(&self) -> AssemblyIdentity {
        match self {
            Reference::Metadata { source, .. } => source.identity(),
            Reference::Compilation { compilation, .. } => {
                compilation.assembly().identity().clone()
            }
        }
    }

    /// The reference properties.
    #[must_use]
    pub fn properties(&self) -> &ReferenceProperties {
        match self {
            Reference::Metadata { properties, .. } | Reference::Compilation { properties, .. } => {
                properties
            }
        }
    }

    /// The identities this reference's own assembly-reference table declares.
    #[must_use]
    pub fn referenced_identities(&self) -> Vec<AssemblyIdentity> {
        match self {
            Reference::Metadata { source, .. } => source.referenced_assemblies(),
            Reference::Compilation { compilation, .. } => compilation
                .references()
                .iter()
                .map(Reference::identity)
                .collect(),
        }
    }
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Metadata { source, properties } => f
                .debug_struct("Metadata")
                .field("identity", &source.identity().display_name())
                .field("embed_interop_types", &properties.embed_interop_types)
                .finish(),
            Reference::Compilation {
                compilation,
                properties,
            } => f
                .debug_struct("Compilation")
                .field("name", &compilation.name())
                .field("embed_interop_types", &properties.embed_interop_types)
                .finish(),
        }
    }
}
