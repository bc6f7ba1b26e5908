//! Type shape definitions.
//!
//! This module contains the structural description of types as handed over by
//! the front end: named type identities, basic kinds, and the composite shapes
//! built from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key for a named type: defining package path plus type name.
///
/// Builtin named types (such as `error`) use an empty package path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIdentity {
    /// Defining package path.
    pub package: String,
    /// Type name.
    pub name: String,
}

impl TypeIdentity {
    /// Creates a new type identity.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns true if this identity names a builtin (package-less) type.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.package.is_empty()
    }

    /// Parses a `path.Name` string, splitting at the last dot.
    ///
    /// A string without a dot yields `None`.
    #[must_use]
    pub fn parse_qualified(s: &str) -> Option<Self> {
        let (package, name) = s.rsplit_once('.')?;
        if package.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(package, name))
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    /// Boolean.
    Bool,
    /// Platform sized signed integer.
    Int,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer (also `rune`).
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Platform sized unsigned integer.
    Uint,
    /// Unsigned 8-bit integer (also `byte`).
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// Integer large enough to hold a pointer.
    Uintptr,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// 64-bit complex number.
    Complex64,
    /// 128-bit complex number.
    Complex128,
    /// String.
    String,
    /// Untyped raw pointer.
    #[serde(rename = "unsafe.Pointer")]
    UnsafePointer,
}

impl BasicKind {
    /// Returns the source-level name of the basic type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UnsafePointer => "unsafe.Pointer",
        }
    }

    /// Parses a basic type from its source-level name, accepting the
    /// `byte` and `rune` aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "int8" => Some(Self::Int8),
            "int16" => Some(Self::Int16),
            "int32" | "rune" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            "uint" => Some(Self::Uint),
            "uint8" | "byte" => Some(Self::Uint8),
            "uint16" => Some(Self::Uint16),
            "uint32" => Some(Self::Uint32),
            "uint64" => Some(Self::Uint64),
            "uintptr" => Some(Self::Uintptr),
            "float32" => Some(Self::Float32),
            "float64" => Some(Self::Float64),
            "complex64" => Some(Self::Complex64),
            "complex128" => Some(Self::Complex128),
            "string" => Some(Self::String),
            "unsafe.Pointer" => Some(Self::UnsafePointer),
            _ => None,
        }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    /// Bidirectional channel.
    #[default]
    Both,
    /// Send-only channel.
    Send,
    /// Receive-only channel.
    Recv,
}

impl ChanDir {
    /// Parses a channel direction attribute.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "both" | "" => Some(Self::Both),
            "send" => Some(Self::Send),
            "recv" => Some(Self::Recv),
            _ => None,
        }
    }
}

/// Structural shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    /// Predeclared basic type.
    Basic {
        /// Basic kind.
        basic: BasicKind,
    },
    /// Reference to a declared named type.
    Named(TypeIdentity),
    /// Pointer to the element type.
    Pointer {
        /// Pointee.
        elem: Box<TypeShape>,
    },
    /// Slice of the element type.
    Slice {
        /// Element type.
        elem: Box<TypeShape>,
    },
    /// Fixed length array.
    Array {
        /// Array length.
        len: u64,
        /// Element type.
        elem: Box<TypeShape>,
    },
    /// Channel of the element type.
    Chan {
        /// Direction.
        dir: ChanDir,
        /// Element type.
        elem: Box<TypeShape>,
    },
    /// Map from key to value.
    Map {
        /// Key type.
        key: Box<TypeShape>,
        /// Value type.
        value: Box<TypeShape>,
    },
    /// Struct literal.
    Struct(StructShape),
    /// Interface literal.
    Interface(InterfaceShape),
    /// Function signature.
    Signature(Signature),
    /// Ordered variable list (parameters or results).
    Tuple(Tuple),
    /// Generic type parameter.
    TypeParam {
        /// Parameter name.
        name: String,
    },
    /// Constraint union of terms.
    Union {
        /// Union terms.
        terms: Vec<TypeShape>,
    },
}

impl TypeShape {
    /// Creates a basic type shape.
    #[must_use]
    pub const fn basic(basic: BasicKind) -> Self {
        Self::Basic { basic }
    }

    /// Creates a named type shape.
    #[must_use]
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(TypeIdentity::new(package, name))
    }

    /// Creates a pointer shape over `elem`.
    #[must_use]
    pub fn pointer(elem: TypeShape) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
        }
    }

    /// Creates a slice shape over `elem`.
    #[must_use]
    pub fn slice(elem: TypeShape) -> Self {
        Self::Slice {
            elem: Box::new(elem),
        }
    }

    /// Creates an array shape of `len` elements.
    #[must_use]
    pub fn array(len: u64, elem: TypeShape) -> Self {
        Self::Array {
            len,
            elem: Box::new(elem),
        }
    }

    /// Creates a bidirectional channel shape.
    #[must_use]
    pub fn chan(elem: TypeShape) -> Self {
        Self::Chan {
            dir: ChanDir::Both,
            elem: Box::new(elem),
        }
    }

    /// Creates a map shape.
    #[must_use]
    pub fn map(key: TypeShape, value: TypeShape) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Returns the named identity if this is a named type.
    #[must_use]
    pub fn as_named(&self) -> Option<&TypeIdentity> {
        match self {
            Self::Named(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the element type of pointer, slice, array, channel, and map
    /// (value) shapes.
    #[must_use]
    pub fn elem(&self) -> Option<&TypeShape> {
        match self {
            Self::Pointer { elem }
            | Self::Slice { elem }
            | Self::Array { elem, .. }
            | Self::Chan { elem, .. } => Some(elem),
            Self::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns a short description of the shape variant.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Named(_) => "named",
            Self::Pointer { .. } => "pointer",
            Self::Slice { .. } => "slice",
            Self::Array { .. } => "array",
            Self::Chan { .. } => "chan",
            Self::Map { .. } => "map",
            Self::Struct(_) => "struct",
            Self::Interface(_) => "interface",
            Self::Signature(_) => "signature",
            Self::Tuple(_) => "tuple",
            Self::TypeParam { .. } => "type parameter",
            Self::Union { .. } => "union",
        }
    }
}

/// Struct literal shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructShape {
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl StructShape {
    /// Creates a struct shape from its fields.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Looks up a directly declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Struct field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name (the type name for embedded fields).
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeShape,
    /// Whether the field is embedded.
    #[serde(default)]
    pub embedded: bool,
    /// Raw tag string.
    #[serde(default)]
    pub tag: String,
}

impl Field {
    /// Creates a plain, untagged field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeShape) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
            tag: String::new(),
        }
    }

    /// Marks the field as embedded.
    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Sets the raw tag string.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Returns true if the field name is exported.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// Interface literal shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceShape {
    /// Embedded interfaces.
    #[serde(default)]
    pub embedded: Vec<TypeShape>,
    /// Explicitly declared methods.
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl InterfaceShape {
    /// Returns true for the empty interface.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.embedded.is_empty() && self.methods.is_empty()
    }
}

/// Method name plus signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Method signature (receiver excluded).
    pub signature: Signature,
}

impl Method {
    /// Creates a new method.
    #[must_use]
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

/// Function signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Parameters.
    pub params: Tuple,
    /// Results.
    pub results: Tuple,
    /// Whether the last parameter is variadic.
    #[serde(default)]
    pub variadic: bool,
}

impl Signature {
    /// Creates a signature from parameter and result tuples.
    #[must_use]
    pub fn new(params: Tuple, results: Tuple) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }

    /// Compares two signatures ignoring parameter and result names.
    #[must_use]
    pub fn same_shape(&self, other: &Signature) -> bool {
        self.variadic == other.variadic
            && self.params.same_shape(&other.params)
            && self.results.same_shape(&other.results)
    }
}

/// Ordered list of (optionally named) variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuple {
    /// Members in order.
    pub vars: Vec<Var>,
}

impl Tuple {
    /// Creates a tuple of unnamed members.
    #[must_use]
    pub fn of(types: impl IntoIterator<Item = TypeShape>) -> Self {
        Self {
            vars: types
                .into_iter()
                .map(|ty| Var { name: None, ty })
                .collect(),
        }
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if the tuple has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Compares member types pairwise, ignoring names.
    #[must_use]
    pub fn same_shape(&self, other: &Tuple) -> bool {
        self.vars.len() == other.vars.len()
            && self.vars.iter().zip(&other.vars).all(|(a, b)| a.ty == b.ty)
    }
}

/// Tuple member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var {
    /// Optional name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Member type.
    #[serde(rename = "type")]
    pub ty: TypeShape,
}

/// Returns true if `name` is exported (starts with an uppercase letter).
#[must_use]
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
