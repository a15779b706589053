//! Code-element model: namespaces, types and type members.
//!
//! This is the read-only view of reflected API metadata the addressing
//! engine consumes. Elements link upward only (member -> declaring type ->
//! outer type), so shared ownership through [`Arc`] is enough.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

/// A namespace. The empty name is the global namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(Arc<str>);

impl Namespace {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref().trim()))
    }

    /// The global (unnamed) namespace.
    pub fn global() -> Self {
        Self(Arc::from(""))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    /// Documentation id (`N:Foo.Bar`).
    pub fn signature(&self) -> String {
        format!("N:{}", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

/// Kind of a code element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Type(TypeKind),
    Constructor,
    Method,
    Property,
    Field,
    Event,
    Operator,
}

impl ElementKind {
    /// Documentation-id prefix letter.
    pub const fn prefix(self) -> char {
        match self {
            Self::Type(_) => 'T',
            Self::Constructor | Self::Method | Self::Operator => 'M',
            Self::Property => 'P',
            Self::Field => 'F',
            Self::Event => 'E',
        }
    }
}

bitflags! {
    /// Declaration flags reported by the metadata reader.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u8 {
        /// Inherited from a base type rather than declared here.
        const INHERITED = 1;
        /// Emitted by the compiler (backing fields, closures, ...).
        const COMPILER_GENERATED = 1 << 1;
        /// Explicit interface implementation (`IDisposable.Dispose`).
        const EXPLICIT_INTERFACE_IMPL = 1 << 2;
    }
}

/// A type or a type member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeElement {
    kind: ElementKind,
    name: String,
    namespace: Namespace,
    declaring_type: Option<Arc<CodeElement>>,
    parameters: Option<String>,
    flags: ElementFlags,
}

impl CodeElement {
    /// A top-level type.
    pub fn new_type(namespace: impl Into<Namespace>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            kind: ElementKind::Type(kind),
            name: name.into(),
            namespace: namespace.into(),
            declaring_type: None,
            parameters: None,
            flags: ElementFlags::empty(),
        }
    }

    /// A type nested in `outer`.
    pub fn nested_type(outer: &Arc<CodeElement>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            kind: ElementKind::Type(kind),
            name: name.into(),
            namespace: outer.namespace.clone(),
            declaring_type: Some(Arc::clone(outer)),
            parameters: None,
            flags: ElementFlags::empty(),
        }
    }

    /// A member declared by `declaring_type`.
    ///
    /// Explicit interface implementations are named by their qualified
    /// interface member (`System.IDisposable.Dispose`).
    pub fn member(declaring_type: &Arc<CodeElement>, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: declaring_type.namespace.clone(),
            declaring_type: Some(Arc::clone(declaring_type)),
            parameters: None,
            flags: ElementFlags::empty(),
        }
    }

    /// Set the parameter list used in the signature (`System.Int32,System.String`).
    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    #[inline]
    pub fn declaring_type(&self) -> Option<&Arc<CodeElement>> {
        self.declaring_type.as_ref()
    }

    #[inline]
    pub fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }

    #[inline]
    pub const fn flags(&self) -> ElementFlags {
        self.flags
    }

    #[inline]
    pub const fn is_type(&self) -> bool {
        matches!(self.kind, ElementKind::Type(_))
    }

    /// Declared by this type rather than inherited.
    #[inline]
    pub const fn is_direct_declaration(&self) -> bool {
        !self.flags.contains(ElementFlags::INHERITED)
    }

    #[inline]
    pub const fn is_compiler_generated(&self) -> bool {
        self.flags.contains(ElementFlags::COMPILER_GENERATED)
    }

    #[inline]
    pub const fn is_explicit_interface_impl(&self) -> bool {
        self.flags.contains(ElementFlags::EXPLICIT_INTERFACE_IMPL)
    }

    /// A field of an enum type (`Color.Red`).
    pub fn is_enum_value(&self) -> bool {
        self.kind == ElementKind::Field
            && self
                .declaring_type
                .as_ref()
                .is_some_and(|t| t.kind == ElementKind::Type(TypeKind::Enum))
    }

    /// The type itself, or the declaring type for members.
    pub fn owning_type(&self) -> Option<&CodeElement> {
        if self.is_type() {
            Some(self)
        } else {
            self.declaring_type.as_deref()
        }
    }

    /// Type name including outer types (`Outer.Inner`), for types and members.
    pub fn type_name(&self) -> String {
        let Some(ty) = self.owning_type() else {
            return String::new();
        };
        match &ty.declaring_type {
            Some(outer) => format!("{}.{}", outer.type_name(), ty.name),
            None => ty.name.clone(),
        }
    }

    /// Namespace-qualified type name (`Foo.Bar.Outer.Inner`).
    pub fn full_type_name(&self) -> String {
        qualify(&self.namespace, &self.type_name())
    }

    /// Member part of the documentation id, relative to the declaring type.
    ///
    /// `Qux`, `Qux(System.Int32)`, `#ctor`, `System#IDisposable#Dispose`.
    /// Empty for types.
    pub fn member_id(&self) -> String {
        if self.is_type() {
            return String::new();
        }
        let mut id = match self.kind {
            ElementKind::Constructor => "#ctor".to_string(),
            _ if self.is_explicit_interface_impl() => self.name.replace('.', "#"),
            _ => self.name.clone(),
        };
        if let Some(parameters) = &self.parameters {
            id.push('(');
            id.push_str(parameters);
            id.push(')');
        }
        id
    }

    /// Canonical documentation id (`T:Foo.Bar.Baz`, `M:Foo.Bar.Baz.Qux`).
    pub fn signature(&self) -> String {
        let ty = self.full_type_name();
        if self.is_type() {
            format!("{}:{}", self.kind.prefix(), ty)
        } else {
            format!("{}:{}.{}", self.kind.prefix(), ty, self.member_id())
        }
    }
}

/// Join a namespace and a dotted name.
fn qualify(namespace: &Namespace, name: &str) -> String {
    if namespace.is_global() {
        name.to_string()
    } else {
        format!("{}.{}", namespace.name(), name)
    }
}

impl fmt::Display for CodeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}
