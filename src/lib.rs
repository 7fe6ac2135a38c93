//! # userfn
//!
//! Classifies user-supplied pipeline callbacks. Given a description of a
//! callable, every parameter and return value is assigned a semantic kind, so
//! graph construction and execution know how to call the function and what each
//! slot means without re-deriving it.
//!
//! ## Kinds
//!
//! - Parameters: [`ParamKind::Context`], [`ParamKind::EventTime`], [`ParamKind::Value`],
//!   [`ParamKind::Iter`], [`ParamKind::ReIter`], [`ParamKind::Emit`], [`ParamKind::TypeToken`]
//! - Returns: [`ReturnKind::EventTime`], [`ReturnKind::Value`], [`ReturnKind::Error`]
//!
//! ## Quick Start
//!
//! ```rust
//! use userfn::prelude::*;
//!
//! // fn(ctx: Context, word: String, emit: fn(String, i64)) -> Result<(), Error>
//! let sig = FnType::new()
//!     .param(context_type())
//!     .param(Primitive::String)
//!     .param(FnType::new().param(Primitive::String).param(Primitive::I64))
//!     .ret(error_type());
//!
//! let user_fn = classify(&Callable::new("count_words", sig)).unwrap();
//! assert_eq!(user_fn.find_context(), Some(0));
//! assert_eq!(user_fn.filter_params(ParamKind::Emit), vec![2]);
//! assert_eq!(user_fn.find_error(), Some(0));
//! ```
//!
//! ## Module Organization
//!
//! - [`shape`]: emitter, iterator and re-iterator matchers
//! - [`prelude`]: commonly used types (import with `use userfn::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Type descriptions
pub use crate::core::reflect::Reflect;
pub use crate::core::types::{Callable, CompositeKind, FnType, OpaqueFn, Primitive, TypeDesc, TypeRef};

// Type oracle
pub use crate::core::oracle::{
    context_type, error_type, event_time_type, type_token_type, CanonicalTypes, StandardOracle,
    TypeOracle, CONTEXT_TYPE_NAME, ERROR_TYPE_NAME, EVENT_TIME_TYPE_NAME, TYPE_TOKEN_TYPE_NAME,
};

// Kinds and masks
pub use crate::core::kind::{ParamKind, ParamKindSet, ReturnKind, ReturnKindSet};

// Classification
pub use crate::core::config::ClassifyOptions;
pub use crate::core::error::{UserFnError, UserFnResult};
pub use crate::core::userfn::{
    classify, sub_params, sub_returns, Classifier, FnParam, ReturnParam, UserFn,
};

/// Structural matchers for callback-shaped parameters.
pub mod shape {
    pub use crate::core::shape::{
        is_emit, is_iter, is_reiter, unfold_emit, unfold_iter, unfold_reiter, EmitShape,
    };
}

// ============================================================================
// Prelude
// ============================================================================

/// Everything needed to describe and classify a callable.
///
/// # Example
/// ```rust
/// use userfn::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        classify, context_type, error_type, event_time_type, type_token_type, Callable,
        CanonicalTypes, Classifier, ClassifyOptions, FnParam, FnType, ParamKind, ParamKindSet, Primitive,
        Reflect, ReturnKind, ReturnKindSet, ReturnParam, StandardOracle, TypeDesc, TypeOracle,
        TypeRef, UserFn, UserFnError, UserFnResult,
    };
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
