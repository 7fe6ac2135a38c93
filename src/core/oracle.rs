//! The type-classification oracle.
//!
//! The classifier never decides on its own whether a type is valid pipeline
//! data; it asks a [`TypeOracle`]. The oracle also owns the canonical handles
//! (context, event time, error, type token) that are recognised by identity.

use std::sync::Arc;

use crate::core::types::{TypeDesc, TypeRef};

pub const CONTEXT_TYPE_NAME: &str = "Context";
pub const EVENT_TIME_TYPE_NAME: &str = "EventTime";
pub const ERROR_TYPE_NAME: &str = "Error";
pub const TYPE_TOKEN_TYPE_NAME: &str = "TypeToken";

/// The standard context carrier type.
pub fn context_type() -> TypeRef {
    Arc::new(TypeDesc::named(CONTEXT_TYPE_NAME))
}

/// The standard event timestamp type.
pub fn event_time_type() -> TypeRef {
    Arc::new(TypeDesc::named(EVENT_TIME_TYPE_NAME))
}

/// The standard error type.
pub fn error_type() -> TypeRef {
    Arc::new(TypeDesc::named(ERROR_TYPE_NAME))
}

/// The standard type token, handed to coder functions.
pub fn type_token_type() -> TypeRef {
    Arc::new(TypeDesc::named(TYPE_TOKEN_TYPE_NAME))
}

/// Types the classifier recognises by exact match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTypes {
    pub context: TypeRef,
    pub event_time: TypeRef,
    pub error: TypeRef,
    pub type_token: TypeRef,
}

impl CanonicalTypes {
    pub fn contains(&self, ty: &TypeDesc) -> bool {
        [&self.context, &self.event_time, &self.error, &self.type_token]
            .into_iter()
            .any(|c| **c == *ty)
    }
}

impl Default for CanonicalTypes {
    fn default() -> Self {
        Self {
            context: context_type(),
            event_time: event_time_type(),
            error: error_type(),
            type_token: type_token_type(),
        }
    }
}

/// Decides which types are valid pipeline element values.
pub trait TypeOracle {
    /// The canonical handles compared by identity.
    fn canonical(&self) -> &CanonicalTypes;

    /// A container of element types, such as a key/value pair or a `Vec<T>`.
    fn is_container(&self, ty: &TypeDesc) -> bool;

    /// A fully concrete data type.
    fn is_concrete(&self, ty: &TypeDesc) -> bool;

    /// A generic placeholder type.
    fn is_universal(&self, ty: &TypeDesc) -> bool;

    /// Any element-value type: container, concrete or universal.
    fn is_element(&self, ty: &TypeDesc) -> bool {
        self.is_container(ty) || self.is_concrete(ty) || self.is_universal(ty)
    }
}

impl<O: TypeOracle + ?Sized> TypeOracle for &O {
    fn canonical(&self) -> &CanonicalTypes {
        (**self).canonical()
    }

    fn is_container(&self, ty: &TypeDesc) -> bool {
        (**self).is_container(ty)
    }

    fn is_concrete(&self, ty: &TypeDesc) -> bool {
        (**self).is_concrete(ty)
    }

    fn is_universal(&self, ty: &TypeDesc) -> bool {
        (**self).is_universal(ty)
    }

    fn is_element(&self, ty: &TypeDesc) -> bool {
        (**self).is_element(ty)
    }
}

/// Default oracle over [`TypeDesc`].
///
/// - universal: `Universal(_)`
/// - container: composites of element types, and slices of universal or container types
/// - concrete: primitives, non-canonical named types, slices and maps of concrete types
///
/// References, channels and functions are never element values.
#[derive(Debug, Clone, Default)]
pub struct StandardOracle {
    canonical: CanonicalTypes,
}

impl StandardOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `canonical` instead of the standard handles.
    pub fn with_canonical(canonical: CanonicalTypes) -> Self {
        Self { canonical }
    }
}

impl TypeOracle for StandardOracle {
    fn canonical(&self) -> &CanonicalTypes {
        &self.canonical
    }

    fn is_container(&self, ty: &TypeDesc) -> bool {
        match ty {
            TypeDesc::Composite(kind, parts) => {
                kind.accepts_arity(parts.len()) && parts.iter().all(|p| self.is_element(p))
            }
            TypeDesc::Slice(elem) => self.is_universal(elem) || self.is_container(elem),
            _ => false,
        }
    }

    fn is_concrete(&self, ty: &TypeDesc) -> bool {
        match ty {
            TypeDesc::Prim(_) => true,
            TypeDesc::Named(_) => !self.canonical.contains(ty),
            TypeDesc::Slice(elem) => self.is_concrete(elem),
            TypeDesc::Map(k, v) => self.is_concrete(k) && self.is_concrete(v),
            _ => false,
        }
    }

    fn is_universal(&self, ty: &TypeDesc) -> bool {
        matches!(ty, TypeDesc::Universal(_))
    }
}
