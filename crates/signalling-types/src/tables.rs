//! Fixed-size tables keyed by the game's enumerations.
//!
//! Payoff tensors and prior weights are small dense tables indexed by
//! player type, signal, or response. Naming every slot as a field lets
//! lookups go through an exhaustive `match` rather than slice indexing, so
//! an out-of-range key is a compile error instead of a runtime panic.

use serde::{Deserialize, Serialize};

use crate::enums::{PlayerType, Response, Signal};

/// Generates a table with one named field per enum variant.
macro_rules! define_table {
    (
        $(#[$meta:meta])*
        $name:ident<$key:ident> { $($field:ident => $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        pub struct $name<T> {
            $(
                #[doc = concat!("Entry for `", stringify!($key), "::", stringify!($variant), "`.")]
                pub $field: T,
            )+
        }

        impl<T> $name<T> {
            /// Build a table by evaluating `f` once per key, in enumeration order.
            pub fn from_fn(mut f: impl FnMut($key) -> T) -> Self {
                Self {
                    $($field: f($key::$variant),)+
                }
            }

            /// Borrow the entry for `key`.
            pub const fn get(&self, key: $key) -> &T {
                match key {
                    $($key::$variant => &self.$field,)+
                }
            }

            /// Mutably borrow the entry for `key`.
            pub const fn get_mut(&mut self, key: $key) -> &mut T {
                match key {
                    $($key::$variant => &mut self.$field,)+
                }
            }

            /// Iterate `(key, entry)` pairs in enumeration order.
            pub fn iter(&self) -> impl Iterator<Item = ($key, &T)> {
                [$(($key::$variant, &self.$field)),+].into_iter()
            }

            /// Iterate the entries in enumeration order.
            pub fn values(&self) -> impl Iterator<Item = &T> {
                [$(&self.$field),+].into_iter()
            }

            /// Transform every entry, keeping the keys.
            pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> $name<U> {
                $name {
                    $($field: f(self.$field),)+
                }
            }
        }

        impl<T: Clone> $name<T> {
            /// A table holding `value` under every key.
            pub fn uniform(value: T) -> Self {
                Self::from_fn(|_| value.clone())
            }
        }
    };
}

define_table! {
    /// A value for each [`PlayerType`].
    PerType<PlayerType> { low => Low, middle => Middle, high => High }
}

define_table! {
    /// A value for each [`Signal`].
    PerSignal<Signal> { light => Light, moderate => Moderate, heavy => Heavy }
}

define_table! {
    /// A value for each [`Response`].
    PerResponse<Response> { no_action => NoAction, refer => Refer }
}

impl PerType<f64> {
    /// Sum of the three weights.
    pub fn total(&self) -> f64 {
        self.low + self.middle + self.high
    }
}
