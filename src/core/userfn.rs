//! Classified user functions.
//!
//! A [`UserFn`] is built once per user callable by a [`Classifier`] and then
//! only read. Graph construction and execution use it to find out how to call
//! the function and what each parameter and return value means.

use std::any::Any;
use std::fmt;

use serde_json::json;

use crate::core::config::ClassifyOptions;
use crate::core::error::{UserFnError, UserFnResult};
use crate::core::kind::{ParamKind, ParamKindSet, ReturnKind, ReturnKindSet};
use crate::core::oracle::{StandardOracle, TypeOracle};
use crate::core::shape::{is_emit, is_iter, is_reiter};
use crate::core::types::{Callable, OpaqueFn, TypeDesc, TypeRef};

/// The kind and type of a single user function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnParam {
    pub kind: ParamKind,
    pub ty: TypeRef,
}

impl fmt::Display for FnParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.ty)
    }
}

/// The kind and type of a single user function return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnParam {
    pub kind: ReturnKind,
    pub ty: TypeRef,
}

impl fmt::Display for ReturnParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.ty)
    }
}

/// A user function with every parameter and return value classified.
#[derive(Clone)]
pub struct UserFn {
    name: String,
    func: Option<OpaqueFn>,
    params: Vec<FnParam>,
    returns: Vec<ReturnParam>,
}

impl UserFn {
    /// Classifies `callable` with the standard oracle and default options.
    pub fn new(callable: &Callable) -> UserFnResult<UserFn> {
        classify(callable)
    }

    /// Debug name of the callable. Not unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn func(&self) -> Option<&OpaqueFn> {
        self.func.as_ref()
    }

    /// The function value, if it was registered with type `F`.
    pub fn downcast_fn<F: Any>(&self) -> Option<&F> {
        self.func.as_deref()?.downcast_ref::<F>()
    }

    pub fn params(&self) -> &[FnParam] {
        &self.params
    }

    pub fn returns(&self) -> &[ReturnParam] {
        &self.returns
    }

    pub fn param_kinds(&self) -> Vec<ParamKind> {
        self.params.iter().map(|p| p.kind).collect()
    }

    pub fn return_kinds(&self) -> Vec<ReturnKind> {
        self.returns.iter().map(|r| r.kind).collect()
    }

    fn find_param(&self, kind: ParamKind) -> Option<usize> {
        self.params.iter().position(|p| p.kind == kind)
    }

    fn find_return(&self, kind: ReturnKind) -> Option<usize> {
        self.returns.iter().position(|r| r.kind == kind)
    }

    /// Index of the context parameter. By convention it comes first.
    pub fn find_context(&self) -> Option<usize> {
        self.find_param(ParamKind::Context)
    }

    pub fn find_type_token(&self) -> Option<usize> {
        self.find_param(ParamKind::TypeToken)
    }

    pub fn find_event_time(&self) -> Option<usize> {
        self.find_param(ParamKind::EventTime)
    }

    pub fn find_error(&self) -> Option<usize> {
        self.find_return(ReturnKind::Error)
    }

    /// Index of the returned event timestamp, if any.
    pub fn find_out_event_time(&self) -> Option<usize> {
        self.find_return(ReturnKind::EventTime)
    }

    /// Indices of the parameters whose kind is in `mask`, ascending.
    pub fn filter_params(&self, mask: impl Into<ParamKindSet>) -> Vec<usize> {
        let mask = mask.into();
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| mask.contains(p.kind))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the return values whose kind is in `mask`, ascending.
    pub fn filter_returns(&self, mask: impl Into<ReturnKindSet>) -> Vec<usize> {
        let mask = mask.into();
        self.returns
            .iter()
            .enumerate()
            .filter(|(_, r)| mask.contains(r.kind))
            .map(|(i, _)| i)
            .collect()
    }

    /// The parameters at `indices`, in the order given.
    pub fn select_params(&self, indices: &[usize]) -> Option<Vec<FnParam>> {
        sub_params(&self.params, indices)
    }

    /// The return values at `indices`, in the order given.
    pub fn select_returns(&self, indices: &[usize]) -> Option<Vec<ReturnParam>> {
        sub_returns(&self.returns, indices)
    }

    /// A JSON dump of the classified signature, for logs and debugging.
    pub fn describe(&self) -> serde_json::Value {
        let params: Vec<_> = self
            .params
            .iter()
            .map(|p| json!({ "kind": p.kind.name(), "type": p.ty.to_string() }))
            .collect();
        let returns: Vec<_> = self
            .returns
            .iter()
            .map(|r| json!({ "kind": r.kind.name(), "type": r.ty.to_string() }))
            .collect();

        json!({
            "name": self.name,
            "params": params,
            "returns": returns,
        })
    }
}

impl fmt::Debug for UserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFn")
            .field("name", &self.name)
            .field("func", &self.func.as_ref().map(|_| "<fn>"))
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

impl fmt::Display for UserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")?;
        if !self.returns.is_empty() {
            write!(f, " -> (")?;
            for (i, r) in self.returns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", r)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// The subsequence of `list` at `indices`, or `None` if an index is out of range.
pub fn sub_params(list: &[FnParam], indices: &[usize]) -> Option<Vec<FnParam>> {
    indices.iter().map(|&i| list.get(i).cloned()).collect()
}

/// The subsequence of `list` at `indices`, or `None` if an index is out of range.
pub fn sub_returns(list: &[ReturnParam], indices: &[usize]) -> Option<Vec<ReturnParam>> {
    indices.iter().map(|&i| list.get(i).cloned()).collect()
}

/// Classifies `callable` with the standard oracle and default options.
pub fn classify(callable: &Callable) -> UserFnResult<UserFn> {
    Classifier::<StandardOracle>::default().classify(callable)
}

/// Turns [`Callable`]s into [`UserFn`]s.
#[derive(Debug, Clone, Default)]
pub struct Classifier<O = StandardOracle> {
    oracle: O,
    options: ClassifyOptions,
}

impl<O: TypeOracle> Classifier<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            options: ClassifyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn options(&self) -> ClassifyOptions {
        self.options
    }

    /// The kind of a parameter of type `ty`, if it has one.
    ///
    /// Rules are tried in order: canonical context, event time and type token,
    /// then element values, then emitter, iterator and re-iterator shapes.
    pub fn param_kind(&self, ty: &TypeDesc) -> Option<ParamKind> {
        let canonical = self.oracle.canonical();
        let kind = if *ty == *canonical.context {
            ParamKind::Context
        } else if *ty == *canonical.event_time {
            ParamKind::EventTime
        } else if *ty == *canonical.type_token {
            ParamKind::TypeToken
        } else if self.oracle.is_element(ty) {
            ParamKind::Value
        } else if is_emit(&self.oracle, ty) {
            ParamKind::Emit
        } else if is_iter(&self.oracle, ty) {
            ParamKind::Iter
        } else if is_reiter(&self.oracle, ty) {
            ParamKind::ReIter
        } else {
            return None;
        };
        Some(kind)
    }

    /// The kind of a return value of type `ty`, if it has one.
    pub fn return_kind(&self, ty: &TypeDesc) -> Option<ReturnKind> {
        let canonical = self.oracle.canonical();
        if *ty == *canonical.error {
            Some(ReturnKind::Error)
        } else if *ty == *canonical.event_time {
            Some(ReturnKind::EventTime)
        } else if self.oracle.is_element(ty) {
            Some(ReturnKind::Value)
        } else {
            None
        }
    }

    /// Classifies every parameter and return value of `callable`.
    ///
    /// Fails on the first slot that matches no kind; no partial descriptor is
    /// ever produced.
    pub fn classify(&self, callable: &Callable) -> UserFnResult<UserFn> {
        let name = callable.name();
        let Some(sig) = callable.ty().as_func() else {
            return Err(UserFnError::NotAFunction {
                name: name.to_string(),
                found: callable.ty().clone(),
            });
        };

        let mut params = Vec::with_capacity(sig.params.len());
        for (index, ty) in sig.params.iter().enumerate() {
            let kind = self.param_kind(ty).ok_or_else(|| {
                UserFnError::UnsupportedParameterType {
                    name: name.to_string(),
                    index,
                    ty: ty.clone(),
                }
            })?;
            log::trace!("{}: parameter {} ({}) is {}", name, index, ty, kind);
            params.push(FnParam {
                kind,
                ty: ty.clone(),
            });
        }

        let mut returns = Vec::with_capacity(sig.returns.len());
        for (index, ty) in sig.returns.iter().enumerate() {
            let kind = self.return_kind(ty).ok_or_else(|| {
                UserFnError::UnsupportedReturnType {
                    name: name.to_string(),
                    index,
                    ty: ty.clone(),
                }
            })?;
            log::trace!("{}: return value {} ({}) is {}", name, index, ty, kind);
            returns.push(ReturnParam {
                kind,
                ty: ty.clone(),
            });
        }

        self.check_singletons(name, &params, &returns)?;

        let user_fn = UserFn {
            name: name.to_string(),
            func: callable.func().cloned(),
            params,
            returns,
        };
        log::debug!("Classified {}", user_fn);
        Ok(user_fn)
    }

    fn check_singletons(
        &self,
        name: &str,
        params: &[FnParam],
        returns: &[ReturnParam],
    ) -> UserFnResult<()> {
        let param_dups = repeated(params.iter().map(|p| p.kind), ParamKind::is_singleton);
        let return_dups = repeated(returns.iter().map(|r| r.kind), ReturnKind::is_singleton);

        if self.options.strict_singletons {
            if let Some(&(kind, first, second)) = param_dups.first() {
                return Err(UserFnError::DuplicateParam {
                    name: name.to_string(),
                    kind,
                    first,
                    second,
                });
            }
            if let Some(&(kind, first, second)) = return_dups.first() {
                return Err(UserFnError::DuplicateReturn {
                    name: name.to_string(),
                    kind,
                    first,
                    second,
                });
            }
            return Ok(());
        }

        for (kind, first, second) in param_dups {
            log::warn!(
                "{} declares more than one {} parameter (at {} and {}); only the first is used",
                name,
                kind,
                first,
                second
            );
        }
        for (kind, first, second) in return_dups {
            log::warn!(
                "{} declares more than one {} return value (at {} and {}); only the first is used",
                name,
                kind,
                first,
                second
            );
        }
        Ok(())
    }
}

/// Every later occurrence of a singleton kind, paired with its first index.
fn repeated<K: Copy + PartialEq>(
    kinds: impl Iterator<Item = K>,
    singleton: impl Fn(K) -> bool,
) -> Vec<(K, usize, usize)> {
    let mut seen: Vec<(K, usize)> = Vec::new();
    let mut dups = Vec::new();
    for (index, kind) in kinds.enumerate() {
        if !singleton(kind) {
            continue;
        }
        match seen.iter().find(|(k, _)| *k == kind) {
            Some(&(_, first)) => dups.push((kind, first, index)),
            None => seen.push((kind, index)),
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle::{context_type, error_type, event_time_type, type_token_type};
    use crate::core::types::{FnType, Primitive};

    fn callable(sig: FnType) -> Callable {
        Callable::new("test_fn", sig)
    }

    fn iter_i64() -> TypeDesc {
        FnType::new()
            .param(TypeDesc::ref_to(Primitive::I64))
            .ret(Primitive::Bool)
            .into()
    }

    #[test]
    fn test_context_value_signature() {
        let sig = FnType::new()
            .param(context_type())
            .param(Primitive::String)
            .param(Primitive::I64)
            .ret(Primitive::I64);
        let user_fn = classify(&callable(sig)).unwrap();

        assert_eq!(
            user_fn.param_kinds(),
            vec![ParamKind::Context, ParamKind::Value, ParamKind::Value]
        );
        assert_eq!(user_fn.return_kinds(), vec![ReturnKind::Value]);
        assert_eq!(user_fn.find_context(), Some(0));
        assert_eq!(user_fn.find_event_time(), None);
        assert_eq!(user_fn.find_error(), None);
    }

    #[test]
    fn test_all_param_kinds() {
        let reiter: TypeDesc = FnType::new().ret(iter_i64()).into();
        let sig = FnType::new()
            .param(context_type())
            .param(event_time_type())
            .param(type_token_type())
            .param(TypeDesc::universal("T"))
            .param(FnType::new().param(Primitive::I64))
            .param(iter_i64())
            .param(reiter);
        let user_fn = classify(&callable(sig)).unwrap();

        assert_eq!(
            user_fn.param_kinds(),
            vec![
                ParamKind::Context,
                ParamKind::EventTime,
                ParamKind::TypeToken,
                ParamKind::Value,
                ParamKind::Emit,
                ParamKind::Iter,
                ParamKind::ReIter,
            ]
        );
        assert_eq!(user_fn.find_type_token(), Some(2));
        assert_eq!(user_fn.find_event_time(), Some(1));
    }

    #[test]
    fn test_return_kinds() {
        let sig = FnType::new()
            .ret(event_time_type())
            .ret(Primitive::I32)
            .ret(Primitive::I32)
            .ret(error_type());
        let user_fn = classify(&callable(sig)).unwrap();

        assert_eq!(
            user_fn.return_kinds(),
            vec![
                ReturnKind::EventTime,
                ReturnKind::Value,
                ReturnKind::Value,
                ReturnKind::Error
            ]
        );
        assert_eq!(user_fn.find_out_event_time(), Some(0));
        assert_eq!(user_fn.find_error(), Some(3));
        assert_eq!(user_fn.filter_returns(ReturnKind::Value), vec![1, 2]);
    }

    #[test]
    fn test_not_a_function() {
        let err = classify(&Callable::new("answer", Primitive::I32)).unwrap_err();
        assert!(matches!(err, UserFnError::NotAFunction { ref name, .. } if name == "answer"));
        assert_eq!(
            err.to_string(),
            "not a function or method: answer has primitive type i32"
        );
    }

    #[test]
    fn test_unsupported_parameter() {
        let sig = FnType::new()
            .param(Primitive::I64)
            .param(TypeDesc::chan(Primitive::I64));
        let err = classify(&callable(sig)).unwrap_err();
        match &err {
            UserFnError::UnsupportedParameterType { name, index, ty } => {
                assert_eq!(name, "test_fn");
                assert_eq!(*index, 1);
                assert_eq!(ty.to_string(), "chan i64");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "bad parameter type for test_fn: parameter 1 has type chan i64"
        );
    }

    #[test]
    fn test_unsupported_return() {
        let sig = FnType::new().ret(Primitive::I64).ret(iter_i64());
        let err = classify(&callable(sig)).unwrap_err();
        assert!(matches!(
            err,
            UserFnError::UnsupportedReturnType { index: 1, .. }
        ));

        // a context is never a return value
        let sig = FnType::new().ret(context_type());
        assert!(classify(&callable(sig)).is_err());
    }

    #[test]
    fn test_error_is_not_a_parameter() {
        let sig = FnType::new().param(error_type());
        let err = classify(&callable(sig)).unwrap_err();
        assert!(matches!(
            err,
            UserFnError::UnsupportedParameterType { index: 0, .. }
        ));
    }

    #[test]
    fn test_mask_filtering() {
        let sig = FnType::new()
            .param(context_type())
            .param(Primitive::String)
            .param(iter_i64())
            .param(Primitive::I64)
            .param(FnType::new().param(Primitive::I64));
        let user_fn = classify(&callable(sig)).unwrap();

        assert_eq!(user_fn.filter_params(ParamKind::Value), vec![1, 3]);
        assert_eq!(
            user_fn.filter_params(ParamKind::Value | ParamKind::Iter),
            vec![1, 2, 3]
        );
        assert_eq!(
            user_fn.filter_params(ParamKind::Emit | ParamKind::Context),
            vec![0, 4]
        );
        assert!(user_fn.filter_params(ParamKindSet::empty()).is_empty());
        assert_eq!(user_fn.filter_params(ParamKindSet::all()).len(), 5);
        assert!(user_fn.filter_returns(ReturnKindSet::all()).is_empty());
    }

    #[test]
    fn test_select_preserves_given_order() {
        let sig = FnType::new()
            .param(Primitive::String)
            .param(Primitive::I64)
            .param(Primitive::Bool)
            .ret(Primitive::I32)
            .ret(error_type());
        let user_fn = classify(&callable(sig)).unwrap();

        let picked = user_fn.select_params(&[2, 0]).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], user_fn.params()[2]);
        assert_eq!(picked[1], user_fn.params()[0]);

        let rets = user_fn.select_returns(&[1]).unwrap();
        assert_eq!(rets[0].kind, ReturnKind::Error);

        assert!(user_fn.select_params(&[0, 3]).is_none());
        assert_eq!(user_fn.select_params(&[]), Some(vec![]));
    }

    #[test]
    fn test_values_after_key() {
        // keyed function: the first value is the key, the rest are values
        let sig = FnType::new()
            .param(context_type())
            .param(Primitive::String)
            .param(Primitive::I64)
            .param(Primitive::F64);
        let user_fn = classify(&callable(sig)).unwrap();

        let values = user_fn.filter_params(ParamKind::Value);
        let rest = sub_params(user_fn.params(), &values[1..]).unwrap();
        assert_eq!(
            rest.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>(),
            vec!["i64", "f64"]
        );
    }

    #[test]
    fn test_duplicate_singletons_lenient() {
        let sig = FnType::new()
            .param(context_type())
            .param(context_type())
            .ret(error_type())
            .ret(error_type());
        let user_fn = classify(&callable(sig)).unwrap();

        assert_eq!(user_fn.find_context(), Some(0));
        assert_eq!(user_fn.find_error(), Some(0));
    }

    #[test]
    fn test_duplicate_singletons_strict() {
        let strict = Classifier::new(StandardOracle::new()).with_options(ClassifyOptions::strict());

        let sig = FnType::new()
            .param(event_time_type())
            .param(Primitive::I64)
            .param(event_time_type());
        assert_eq!(
            strict.classify(&callable(sig)).unwrap_err(),
            UserFnError::DuplicateParam {
                name: "test_fn".to_string(),
                kind: ParamKind::EventTime,
                first: 0,
                second: 2,
            }
        );

        let sig = FnType::new().ret(error_type()).ret(error_type());
        assert!(matches!(
            strict.classify(&callable(sig)).unwrap_err(),
            UserFnError::DuplicateReturn {
                kind: ReturnKind::Error,
                first: 0,
                second: 1,
                ..
            }
        ));

        // repeated values are fine
        let sig = FnType::new().param(Primitive::I64).param(Primitive::I64);
        assert!(strict.classify(&callable(sig)).is_ok());
    }

    #[test]
    fn test_function_value_is_carried() {
        fn add(a: i64, b: i64) -> i64 {
            a + b
        }
        let sig = FnType::new()
            .param(Primitive::I64)
            .param(Primitive::I64)
            .ret(Primitive::I64);
        let user_fn = UserFn::new(&Callable::from_fn(
            "add",
            sig,
            add as fn(i64, i64) -> i64,
        ))
        .unwrap();

        assert_eq!(user_fn.name(), "add");
        assert!(user_fn.func().is_some());
        let add = user_fn.downcast_fn::<fn(i64, i64) -> i64>().unwrap();
        assert_eq!(add(2, 3), 5);
        assert!(user_fn.downcast_fn::<fn(i64) -> i64>().is_none());
    }

    #[test]
    fn test_display_and_describe() {
        let sig = FnType::new()
            .param(context_type())
            .param(Primitive::String)
            .ret(Primitive::I64)
            .ret(error_type());
        let user_fn = classify(&Callable::new("count", sig)).unwrap();

        assert_eq!(
            user_fn.to_string(),
            "count(Context Context, Value String) -> (Value i64, Error Error)"
        );

        let described = user_fn.describe();
        assert_eq!(described["name"], "count");
        assert_eq!(described["params"][1]["kind"], "Value");
        assert_eq!(described["params"][1]["type"], "String");
        assert_eq!(described["returns"][1]["kind"], "Error");
    }

    #[test]
    fn test_repeated_helper() {
        let kinds = [
            ParamKind::Value,
            ParamKind::Context,
            ParamKind::Value,
            ParamKind::Context,
            ParamKind::Context,
        ];
        let dups = repeated(kinds.into_iter(), ParamKind::is_singleton);
        assert_eq!(
            dups,
            vec![(ParamKind::Context, 1, 3), (ParamKind::Context, 1, 4)]
        );
    }
}
