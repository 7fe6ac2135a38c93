use thiserror::Error;

use crate::core::kind::{ParamKind, ReturnKind};
use crate::core::types::TypeRef;

/// Reasons a callable cannot be turned into a [`UserFn`](crate::UserFn).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserFnError {
    #[error("not a function or method: {name} has {} type {found}", .found.shape_name())]
    NotAFunction { name: String, found: TypeRef },

    #[error("bad parameter type for {name}: parameter {index} has type {ty}")]
    UnsupportedParameterType {
        name: String,
        index: usize,
        ty: TypeRef,
    },

    #[error("bad return type for {name}: return value {index} has type {ty}")]
    UnsupportedReturnType {
        name: String,
        index: usize,
        ty: TypeRef,
    },

    #[error("duplicate {kind} parameter for {name}: at {first} and {second}")]
    DuplicateParam {
        name: String,
        kind: ParamKind,
        first: usize,
        second: usize,
    },

    #[error("duplicate {kind} return value for {name}: at {first} and {second}")]
    DuplicateReturn {
        name: String,
        kind: ReturnKind,
        first: usize,
        second: usize,
    },
}

pub type UserFnResult<T> = std::result::Result<T, UserFnError>;
