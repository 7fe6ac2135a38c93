//! Mapping from Rust types to [`TypeDesc`] values.
//!
//! This covers element types and write-through references. Callable types are
//! described explicitly with [`FnType`](crate::FnType).

use std::collections::{BTreeMap, HashMap};

use crate::core::types::{Primitive, TypeDesc};

/// A Rust type with a known runtime description.
pub trait Reflect {
    fn type_desc() -> TypeDesc;
}

macro_rules! reflect_primitive {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Prim(Primitive::$prim)
                }
            }
        )*
    };
}

reflect_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    str => String,
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::slice(T::type_desc())
    }
}

impl<T: Reflect> Reflect for [T] {
    fn type_desc() -> TypeDesc {
        TypeDesc::slice(T::type_desc())
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn type_desc() -> TypeDesc {
        TypeDesc::map(K::type_desc(), V::type_desc())
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::map(K::type_desc(), V::type_desc())
    }
}

impl<T: Reflect + ?Sized> Reflect for &mut T {
    fn type_desc() -> TypeDesc {
        TypeDesc::ref_to(T::type_desc())
    }
}
