//! Runtime type descriptions for user callables.
//!
//! Rust has no universal runtime reflection, so the host describes each
//! callable once, at registration time, as a [`Callable`]: a debug name, a
//! [`TypeDesc`] of the callable itself and (optionally) the function value.
//! The classifier only ever looks at these descriptions.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::core::reflect::Reflect;

/// Shared handle to a type description. Equality is structural.
pub type TypeRef = Arc<TypeDesc>;

/// The opaque function value carried alongside a description.
pub type OpaqueFn = Arc<dyn Any + Send + Sync>;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::String => "String",
            Primitive::Bytes => "Bytes",
        }
    }
}

/// Pipeline container shapes understood by the type oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompositeKind {
    /// Key/value pair.
    Kv,
    /// Key with one or more grouped value streams.
    CoGbk,
    /// A value with windowing metadata attached.
    WindowedValue,
}

impl CompositeKind {
    pub fn name(self) -> &'static str {
        match self {
            CompositeKind::Kv => "KV",
            CompositeKind::CoGbk => "CoGBK",
            CompositeKind::WindowedValue => "WindowedValue",
        }
    }

    /// Whether a composite of this kind may hold `n` components.
    pub fn accepts_arity(self, n: usize) -> bool {
        match self {
            CompositeKind::Kv => n == 2,
            CompositeKind::CoGbk => n >= 2,
            CompositeKind::WindowedValue => n == 1,
        }
    }
}

/// Description of a single runtime type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeDesc {
    Prim(Primitive),
    /// A nominal type, identified by its name.
    Named(String),
    /// A generic placeholder such as `T`.
    Universal(String),
    Slice(TypeRef),
    Map(TypeRef, TypeRef),
    /// A pointer-like, write-through reference.
    Ref(TypeRef),
    Chan(TypeRef),
    Composite(CompositeKind, Vec<TypeRef>),
    Func(FnType),
}

impl TypeDesc {
    /// Describes the Rust type `T`.
    pub fn of<T: Reflect + ?Sized>() -> TypeDesc {
        T::type_desc()
    }

    pub fn named(name: impl Into<String>) -> TypeDesc {
        TypeDesc::Named(name.into())
    }

    pub fn universal(name: impl Into<String>) -> TypeDesc {
        TypeDesc::Universal(name.into())
    }

    pub fn slice(elem: impl Into<TypeRef>) -> TypeDesc {
        TypeDesc::Slice(elem.into())
    }

    pub fn map(key: impl Into<TypeRef>, value: impl Into<TypeRef>) -> TypeDesc {
        TypeDesc::Map(key.into(), value.into())
    }

    pub fn ref_to(target: impl Into<TypeRef>) -> TypeDesc {
        TypeDesc::Ref(target.into())
    }

    pub fn chan(elem: impl Into<TypeRef>) -> TypeDesc {
        TypeDesc::Chan(elem.into())
    }

    pub fn kv(key: impl Into<TypeRef>, value: impl Into<TypeRef>) -> TypeDesc {
        TypeDesc::Composite(CompositeKind::Kv, vec![key.into(), value.into()])
    }

    pub fn func(sig: FnType) -> TypeDesc {
        TypeDesc::Func(sig)
    }

    pub fn is_func(&self) -> bool {
        matches!(self, TypeDesc::Func(_))
    }

    pub fn as_func(&self) -> Option<&FnType> {
        match self {
            TypeDesc::Func(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TypeDesc::Prim(Primitive::Bool))
    }

    /// Short name of the type's shape, used when a callable is rejected outright.
    pub fn shape_name(&self) -> &'static str {
        match self {
            TypeDesc::Prim(_) => "primitive",
            TypeDesc::Named(_) => "named",
            TypeDesc::Universal(_) => "universal",
            TypeDesc::Slice(_) => "slice",
            TypeDesc::Map(..) => "map",
            TypeDesc::Ref(_) => "ref",
            TypeDesc::Chan(_) => "chan",
            TypeDesc::Composite(..) => "composite",
            TypeDesc::Func(_) => "func",
        }
    }
}

impl From<Primitive> for TypeDesc {
    fn from(p: Primitive) -> Self {
        TypeDesc::Prim(p)
    }
}

impl From<FnType> for TypeDesc {
    fn from(sig: FnType) -> Self {
        TypeDesc::Func(sig)
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        Arc::new(TypeDesc::Prim(p))
    }
}

impl From<FnType> for TypeRef {
    fn from(sig: FnType) -> Self {
        Arc::new(TypeDesc::Func(sig))
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeRef]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Prim(p) => write!(f, "{}", p.name()),
            TypeDesc::Named(name) | TypeDesc::Universal(name) => write!(f, "{}", name),
            TypeDesc::Slice(elem) => write!(f, "Vec<{}>", elem),
            TypeDesc::Map(k, v) => write!(f, "HashMap<{}, {}>", k, v),
            TypeDesc::Ref(target) => write!(f, "&mut {}", target),
            TypeDesc::Chan(elem) => write!(f, "chan {}", elem),
            TypeDesc::Composite(kind, parts) => {
                write!(f, "{}<", kind.name())?;
                write_list(f, parts)?;
                write!(f, ">")
            }
            TypeDesc::Func(sig) => write!(f, "{}", sig),
        }
    }
}

/// Parameter and return lists of a callable type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FnType {
    pub params: Vec<TypeRef>,
    pub returns: Vec<TypeRef>,
}

impl FnType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn param(mut self, ty: impl Into<TypeRef>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Appends a return value.
    pub fn ret(mut self, ty: impl Into<TypeRef>) -> Self {
        self.returns.push(ty.into());
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for FnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        write_list(f, &self.params)?;
        write!(f, ")")?;
        match self.returns.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single),
            many => {
                write!(f, " -> (")?;
                write_list(f, many)?;
                write!(f, ")")
            }
        }
    }
}

/// A user callable as handed over by the host for classification.
#[derive(Clone)]
pub struct Callable {
    name: String,
    ty: TypeRef,
    func: Option<OpaqueFn>,
}

impl Callable {
    /// Describes a value named `name` of type `ty`. The value need not be a function;
    /// the classifier rejects anything else.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            func: None,
        }
    }

    /// Describes the function `func` with signature `sig`.
    pub fn from_fn<F: Any + Send + Sync>(name: impl Into<String>, sig: FnType, func: F) -> Self {
        Self::new(name, TypeDesc::Func(sig)).with_fn(func)
    }

    /// Attaches the function value that downstream executors will invoke.
    pub fn with_fn<F: Any + Send + Sync>(mut self, func: F) -> Self {
        self.func = Some(Arc::new(func));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn func(&self) -> Option<&OpaqueFn> {
        self.func.as_ref()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("func", &self.func.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
