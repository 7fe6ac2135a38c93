//! Structural matchers for callback-shaped parameters.
//!
//! Emitters and iterators can both take one or two parameters, so every matcher
//! looks at the return list first: emitters return nothing, iterators return a
//! single `bool`, re-iterators take nothing and return an iterator.

use crate::core::oracle::TypeOracle;
use crate::core::types::{TypeDesc, TypeRef};

/// The element types pushed through an emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitShape {
    /// Whether the first parameter is the event timestamp.
    pub event_time: bool,
    /// One value, or a key and a value.
    pub values: Vec<TypeRef>,
}

impl EmitShape {
    pub fn is_kv(&self) -> bool {
        self.values.len() == 2
    }
}

/// Matches `fn(V)`, `fn(K, V)`, `fn(EventTime, V)` and `fn(EventTime, K, V)`
/// where every `K`/`V` is an element type.
pub fn unfold_emit<O: TypeOracle + ?Sized>(oracle: &O, ty: &TypeDesc) -> Option<EmitShape> {
    let sig = ty.as_func()?;
    if !sig.returns.is_empty() {
        return None;
    }

    let event_time = &oracle.canonical().event_time;
    let elem = |t: &TypeRef| oracle.is_element(t);

    let (has_time, values) = match sig.params.as_slice() {
        [v] if elem(v) => (false, vec![v.clone()]),
        [t, v] if t == event_time && elem(v) => (true, vec![v.clone()]),
        [k, v] if elem(k) && elem(v) => (false, vec![k.clone(), v.clone()]),
        [t, k, v] if t == event_time && elem(k) && elem(v) => (true, vec![k.clone(), v.clone()]),
        _ => return None,
    };

    Some(EmitShape {
        event_time: has_time,
        values,
    })
}

/// Matches `fn(&mut V) -> bool` and `fn(&mut K, &mut V) -> bool`, returning the
/// pointed-to element types.
pub fn unfold_iter<O: TypeOracle + ?Sized>(oracle: &O, ty: &TypeDesc) -> Option<Vec<TypeRef>> {
    let sig = ty.as_func()?;
    match sig.returns.as_slice() {
        [more] if more.is_bool() => {}
        _ => return None,
    }
    if !(1..=2).contains(&sig.params.len()) {
        return None;
    }

    sig.params
        .iter()
        .map(|p| match &**p {
            TypeDesc::Ref(target) if oracle.is_element(target) => Some(target.clone()),
            _ => None,
        })
        .collect()
}

/// Matches `fn() -> I` where `I` is an iterator, returning the iterator's element types.
pub fn unfold_reiter<O: TypeOracle + ?Sized>(oracle: &O, ty: &TypeDesc) -> Option<Vec<TypeRef>> {
    let sig = ty.as_func()?;
    if !sig.params.is_empty() {
        return None;
    }
    match sig.returns.as_slice() {
        [iter] => unfold_iter(oracle, iter),
        _ => None,
    }
}

pub fn is_emit<O: TypeOracle + ?Sized>(oracle: &O, ty: &TypeDesc) -> bool {
    unfold_emit(oracle, ty).is_some()
}

pub fn is_iter<O: TypeOracle + ?Sized>(oracle: &O, ty: &TypeDesc) -> bool {
    unfold_iter(oracle, ty).is_some()
}

pub fn is_reiter<O: TypeOracle + ?Sized>(oracle: &O, ty: &TypeDesc) -> bool {
    unfold_reiter(oracle, ty).is_some()
}
