//! Describing and classifying a handful of pipeline callbacks.
//!
//! This example demonstrates:
//! - Describing a callable with `FnType` and `Reflect`
//! - Classifying it into a `UserFn`
//! - Querying the descriptor the way an executor would
//! - What a rejected signature looks like

use std::collections::HashMap;
use userfn::prelude::*;

// ============================================================================
// Step 1: A word-count callback
// ============================================================================

/// fn(ctx, line, emit) -> Result<(), Error>
fn split_words(
    _ctx: &(),
    line: String,
    emit: &mut dyn FnMut(String, i64),
) -> Result<(), String> {
    for word in line.split_whitespace() {
        emit(word.to_string(), 1);
    }
    Ok(())
}

type SplitWords = fn(&(), String, &mut dyn FnMut(String, i64)) -> Result<(), String>;

fn split_words_callable() -> Callable {
    let emit = FnType::new()
        .param(TypeDesc::of::<String>())
        .param(TypeDesc::of::<i64>());
    let sig = FnType::new()
        .param(context_type())
        .param(TypeDesc::of::<String>())
        .param(emit)
        .ret(error_type());
    Callable::from_fn("demos::split_words", sig, split_words as SplitWords)
}

// ============================================================================
// Step 2: A per-key sum over a re-iterable input
// ============================================================================

fn sum_per_key_callable() -> Callable {
    let iter = FnType::new()
        .param(TypeDesc::of::<&mut i64>())
        .ret(Primitive::Bool);
    let sig = FnType::new()
        .param(TypeDesc::of::<String>())
        .param(FnType::new().ret(iter))
        .ret(TypeDesc::of::<String>())
        .ret(TypeDesc::of::<i64>());
    Callable::new("demos::sum_per_key", sig)
}

// ============================================================================
// Step 3: Something that is not a valid callback
// ============================================================================

fn lookup_callable() -> Callable {
    let sig = FnType::new()
        .param(TypeDesc::of::<HashMap<String, i64>>())
        .param(TypeDesc::chan(Primitive::String))
        .ret(Primitive::I64);
    Callable::new("demos::lookup", sig)
}

fn main() {
    let classifier = Classifier::new(StandardOracle::new());

    for callable in [
        split_words_callable(),
        sum_per_key_callable(),
        lookup_callable(),
    ] {
        match classifier.classify(&callable) {
            Ok(user_fn) => {
                println!("✅ {}", user_fn);
                if let Some(pos) = user_fn.find_context() {
                    println!("   context at {}", pos);
                }
                let inputs =
                    user_fn.filter_params(ParamKind::Value | ParamKind::Iter | ParamKind::ReIter);
                println!("   main inputs at {:?}", inputs);
                println!("   outputs: {}", user_fn.describe()["returns"]);
            }
            Err(err) => println!("❌ {}", err),
        }
    }

    // Executors hold on to the function value and call it directly.
    if let Ok(user_fn) = classifier.classify(&split_words_callable()) {
        if let Some(f) = user_fn.downcast_fn::<SplitWords>() {
            let mut counts: HashMap<String, i64> = HashMap::new();
            let mut emit = |word: String, n: i64| *counts.entry(word).or_default() += n;
            if let Err(err) = f(&(), "the quick the lazy".to_string(), &mut emit) {
                println!("split_words failed: {}", err);
            }
            println!("counts: {:?}", counts);
        }
    }
}
