//! Parameter and return kinds, and the masks used to query them.
//!
//! Each kind owns one independent bit, so a set of kinds is a small bit mask.
//! The kinds themselves stay closed enums; there is no "illegal" kind, only the
//! empty set.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kinds of parameters a user function may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamKind {
    /// The canonical context carrier. By convention the first parameter.
    Context,
    /// The canonical event timestamp.
    EventTime,
    /// An ordinary element value.
    Value,
    /// A pull-based iterator: `fn(&mut V) -> bool` or `fn(&mut K, &mut V) -> bool`.
    /// Two parameters imply a key/value input.
    Iter,
    /// A factory returning a fresh iterator: `fn() -> fn(&mut V) -> bool`.
    ReIter,
    /// An emitter: `fn(V)`, `fn(K, V)`, `fn(EventTime, V)` or `fn(EventTime, K, V)`.
    /// Emitters cannot fail.
    Emit,
    /// The canonical type token. Only valid for coders.
    TypeToken,
}

impl ParamKind {
    pub const ALL: [ParamKind; 7] = [
        ParamKind::Context,
        ParamKind::EventTime,
        ParamKind::Value,
        ParamKind::Iter,
        ParamKind::ReIter,
        ParamKind::Emit,
        ParamKind::TypeToken,
    ];

    pub const fn bit(self) -> u8 {
        match self {
            ParamKind::Context => 0x01,
            ParamKind::EventTime => 0x02,
            ParamKind::Value => 0x04,
            ParamKind::Iter => 0x08,
            ParamKind::ReIter => 0x10,
            ParamKind::Emit => 0x20,
            ParamKind::TypeToken => 0x40,
        }
    }

    /// Kinds expected at most once per signature.
    pub const fn is_singleton(self) -> bool {
        matches!(
            self,
            ParamKind::Context | ParamKind::EventTime | ParamKind::TypeToken
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Context => "Context",
            ParamKind::EventTime => "EventTime",
            ParamKind::Value => "Value",
            ParamKind::Iter => "Iter",
            ParamKind::ReIter => "ReIter",
            ParamKind::Emit => "Emit",
            ParamKind::TypeToken => "TypeToken",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kinds of return values a user function may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReturnKind {
    EventTime,
    Value,
    Error,
}

impl ReturnKind {
    pub const ALL: [ReturnKind; 3] = [ReturnKind::EventTime, ReturnKind::Value, ReturnKind::Error];

    pub const fn bit(self) -> u8 {
        match self {
            ReturnKind::EventTime => 0x01,
            ReturnKind::Value => 0x02,
            ReturnKind::Error => 0x04,
        }
    }

    pub const fn is_singleton(self) -> bool {
        matches!(self, ReturnKind::EventTime | ReturnKind::Error)
    }

    pub fn name(self) -> &'static str {
        match self {
            ReturnKind::EventTime => "EventTime",
            ReturnKind::Value => "Value",
            ReturnKind::Error => "Error",
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generates a bit-set mask type over a kind enum with `ALL` and `bit()`.
macro_rules! kind_set {
    ($(#[$meta:meta])* $set:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $set(u8);

        impl $set {
            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn all() -> Self {
                let mut bits = 0;
                let mut i = 0;
                while i < $kind::ALL.len() {
                    bits |= $kind::ALL[i].bit();
                    i += 1;
                }
                Self(bits)
            }

            pub const fn of(kind: $kind) -> Self {
                Self(kind.bit())
            }

            pub const fn bits(self) -> u8 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, kind: $kind) -> bool {
                self.0 & kind.bit() != 0
            }

            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn with(self, kind: $kind) -> Self {
                Self(self.0 | kind.bit())
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub fn insert(&mut self, kind: $kind) {
                self.0 |= kind.bit();
            }

            /// Member kinds, in declaration order of the enum.
            pub fn iter(self) -> impl Iterator<Item = $kind> {
                $kind::ALL.into_iter().filter(move |k| self.contains(*k))
            }
        }

        impl From<$kind> for $set {
            fn from(kind: $kind) -> Self {
                Self::of(kind)
            }
        }

        impl BitOr for $set {
            type Output = $set;

            fn bitor(self, rhs: $set) -> $set {
                self.union(rhs)
            }
        }

        impl BitOr<$kind> for $set {
            type Output = $set;

            fn bitor(self, rhs: $kind) -> $set {
                self.with(rhs)
            }
        }

        impl BitOr for $kind {
            type Output = $set;

            fn bitor(self, rhs: $kind) -> $set {
                $set::of(self).with(rhs)
            }
        }

        impl BitOr<$set> for $kind {
            type Output = $set;

            fn bitor(self, rhs: $set) -> $set {
                rhs.with(self)
            }
        }

        impl BitOrAssign<$kind> for $set {
            fn bitor_assign(&mut self, rhs: $kind) {
                self.insert(rhs);
            }
        }

        impl FromIterator<$kind> for $set {
            fn from_iter<I: IntoIterator<Item = $kind>>(iter: I) -> Self {
                iter.into_iter().fold(Self::empty(), Self::with)
            }
        }

        impl fmt::Debug for $set {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_set().entries(self.iter()).finish()
            }
        }
    };
}

kind_set!(
    /// A mask over [`ParamKind`]s.
    ParamKindSet,
    ParamKind
);

kind_set!(
    /// A mask over [`ReturnKind`]s.
    ReturnKindSet,
    ReturnKind
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_independent() {
        let mut seen = 0u8;
        for kind in ParamKind::ALL {
            assert_eq!(kind.bit().count_ones(), 1, "{kind} is not a single bit");
            assert_eq!(seen & kind.bit(), 0, "{kind} overlaps another kind");
            seen |= kind.bit();
        }
        assert_eq!(ParamKindSet::all().bits(), seen);

        let mut seen = 0u8;
        for kind in ReturnKind::ALL {
            assert_eq!(kind.bit().count_ones(), 1);
            assert_eq!(seen & kind.bit(), 0);
            seen |= kind.bit();
        }
        assert_eq!(ReturnKindSet::all().bits(), seen);
    }

    #[test]
    fn test_mask_operators() {
        let mask = ParamKind::Value | ParamKind::Iter;
        assert!(mask.contains(ParamKind::Value));
        assert!(mask.contains(ParamKind::Iter));
        assert!(!mask.contains(ParamKind::Emit));

        let wider = mask | ParamKind::Emit;
        assert_eq!(wider.iter().count(), 3);
        assert!(wider.intersects(ParamKindSet::of(ParamKind::Emit)));
        assert!(!mask.intersects(ParamKind::Context | ParamKind::TypeToken));

        let mut errors = ReturnKindSet::empty();
        assert!(errors.is_empty());
        errors |= ReturnKind::Error;
        assert_eq!(errors, ReturnKindSet::from(ReturnKind::Error));
    }

    #[test]
    fn test_set_from_iter_and_debug() {
        let set: ReturnKindSet = [ReturnKind::Value, ReturnKind::EventTime].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{EventTime, Value}");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ReturnKind::EventTime, ReturnKind::Value]
        );
    }

    #[test]
    fn test_singletons() {
        assert!(ParamKind::Context.is_singleton());
        assert!(ParamKind::TypeToken.is_singleton());
        assert!(!ParamKind::Value.is_singleton());
        assert!(!ParamKind::Emit.is_singleton());
        assert!(ReturnKind::Error.is_singleton());
        assert!(!ReturnKind::Value.is_singleton());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ParamKind::ReIter.to_string(), "ReIter");
        assert_eq!(ReturnKind::EventTime.to_string(), "EventTime");
    }
}
