//! Approximate Value Sizing
//!
//! The cache never measures memory itself. It asks a [`SizeEstimator`] for a
//! byte count when a value is stored and uses that number for the
//! `max_memory` budget. Estimators must be deterministic and side-effect
//! free; one that cannot cost a value returns
//! [`CacheError::UnestimableValue`] and the store is left untouched.
//!
//! # Cost Model
//!
//! [`ApproxSize`] and [`JsonSizeEstimator`] share one rough model:
//!
//! | Value | Bytes |
//! |-------|-------|
//! | `bool` | 4 |
//! | any integer or float | 8 |
//! | `char` | 2 per UTF-16 unit |
//! | string | 2 per UTF-16 unit |
//! | sequence / map | sum of elements (map keys are free) |
//! | `None`, `()`, JSON `null` | 0 |
//!
//! This deliberately ignores allocation overhead and container headers:
//! it is a budget unit, not a heap profile.
//!
//! # Choosing an Estimator
//!
//! ```
//! use unified_cache::size::{ApproxSizeEstimator, JsonSizeEstimator, SizeEstimator};
//!
//! // Types implementing ApproxSize
//! assert_eq!(ApproxSizeEstimator.estimate(&String::from("data1")).unwrap(), 10);
//!
//! // Anything Serialize
//! #[derive(serde::Serialize)]
//! struct User { name: String, age: u32 }
//! let user = User { name: "ab".into(), age: 7 };
//! assert_eq!(JsonSizeEstimator.estimate(&user).unwrap(), 12);
//!
//! // A plain closure
//! let fixed = |_: &Vec<u8>| 1024u64;
//! assert_eq!(fixed.estimate(&vec![0u8; 3]).unwrap(), 1024);
//! ```

use crate::error::{CacheError, Result};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

const BOOL_BYTES: u64 = 4;
const NUMBER_BYTES: u64 = 8;
const UTF16_UNIT_BYTES: u64 = 2;

/// Computes the approximate byte footprint of a value.
pub trait SizeEstimator<V: ?Sized> {
    /// Returns the estimated size of `value` in bytes.
    fn estimate(&self, value: &V) -> Result<u64>;
}

/// Any `Fn(&V) -> u64` is a total estimator.
impl<V: ?Sized, F> SizeEstimator<V> for F
where
    F: Fn(&V) -> u64,
{
    #[inline]
    fn estimate(&self, value: &V) -> Result<u64> {
        Ok(self(value))
    }
}

/// Types that can report their own approximate size.
pub trait ApproxSize {
    /// Estimated size in bytes under the crate's cost model.
    fn approx_size(&self) -> u64;
}

/// Estimator for types implementing [`ApproxSize`]. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxSizeEstimator;

impl<V: ApproxSize + ?Sized> SizeEstimator<V> for ApproxSizeEstimator {
    #[inline]
    fn estimate(&self, value: &V) -> Result<u64> {
        Ok(value.approx_size())
    }
}

/// Estimator for any `Serialize` value, costed through `serde_json::Value`.
///
/// Fails with [`CacheError::UnestimableValue`] when the value cannot be
/// represented as JSON, for example a map whose keys are not strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSizeEstimator;

impl<V: Serialize + ?Sized> SizeEstimator<V> for JsonSizeEstimator {
    fn estimate(&self, value: &V) -> Result<u64> {
        let json = serde_json::to_value(value).map_err(|e| CacheError::unestimable(e.to_string()))?;
        Ok(json.approx_size())
    }
}

#[inline]
fn utf16_bytes(s: &str) -> u64 {
    s.encode_utf16().count() as u64 * UTF16_UNIT_BYTES
}

impl ApproxSize for bool {
    #[inline]
    fn approx_size(&self) -> u64 {
        BOOL_BYTES
    }
}

macro_rules! number_size {
    ($($t:ty),* $(,)?) => {
        $(
            impl ApproxSize for $t {
                #[inline]
                fn approx_size(&self) -> u64 {
                    NUMBER_BYTES
                }
            }
        )*
    };
}

number_size!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl ApproxSize for char {
    #[inline]
    fn approx_size(&self) -> u64 {
        self.len_utf16() as u64 * UTF16_UNIT_BYTES
    }
}

impl ApproxSize for str {
    #[inline]
    fn approx_size(&self) -> u64 {
        utf16_bytes(self)
    }
}

impl ApproxSize for String {
    #[inline]
    fn approx_size(&self) -> u64 {
        utf16_bytes(self)
    }
}

impl ApproxSize for () {
    #[inline]
    fn approx_size(&self) -> u64 {
        0
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for &T {
    #[inline]
    fn approx_size(&self) -> u64 {
        (**self).approx_size()
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Box<T> {
    #[inline]
    fn approx_size(&self) -> u64 {
        (**self).approx_size()
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Rc<T> {
    #[inline]
    fn approx_size(&self) -> u64 {
        (**self).approx_size()
    }
}

impl<T: ApproxSize + ?Sized> ApproxSize for Arc<T> {
    #[inline]
    fn approx_size(&self) -> u64 {
        (**self).approx_size()
    }
}

impl<T: ApproxSize + ToOwned + ?Sized> ApproxSize for Cow<'_, T> {
    #[inline]
    fn approx_size(&self) -> u64 {
        (**self).approx_size()
    }
}

impl<T: ApproxSize> ApproxSize for Option<T> {
    #[inline]
    fn approx_size(&self) -> u64 {
        self.as_ref().map_or(0, ApproxSize::approx_size)
    }
}

impl<T: ApproxSize> ApproxSize for [T] {
    fn approx_size(&self) -> u64 {
        self.iter().map(ApproxSize::approx_size).sum()
    }
}

impl<T: ApproxSize, const N: usize> ApproxSize for [T; N] {
    fn approx_size(&self) -> u64 {
        self.as_slice().approx_size()
    }
}

impl<T: ApproxSize> ApproxSize for Vec<T> {
    fn approx_size(&self) -> u64 {
        self.as_slice().approx_size()
    }
}

impl<T: ApproxSize> ApproxSize for VecDeque<T> {
    fn approx_size(&self) -> u64 {
        self.iter().map(ApproxSize::approx_size).sum()
    }
}

impl<T: ApproxSize, S> ApproxSize for HashSet<T, S> {
    fn approx_size(&self) -> u64 {
        self.iter().map(ApproxSize::approx_size).sum()
    }
}

impl<T: ApproxSize> ApproxSize for BTreeSet<T> {
    fn approx_size(&self) -> u64 {
        self.iter().map(ApproxSize::approx_size).sum()
    }
}

impl<K, T: ApproxSize, S> ApproxSize for HashMap<K, T, S> {
    fn approx_size(&self) -> u64 {
        self.values().map(ApproxSize::approx_size).sum()
    }
}

impl<K, T: ApproxSize> ApproxSize for BTreeMap<K, T> {
    fn approx_size(&self) -> u64 {
        self.values().map(ApproxSize::approx_size).sum()
    }
}

macro_rules! tuple_size {
    ($($name:ident)+) => {
        impl<$($name: ApproxSize),+> ApproxSize for ($($name,)+) {
            #[allow(non_snake_case)]
            fn approx_size(&self) -> u64 {
                let ($($name,)+) = self;
                0 $(+ $name.approx_size())+
            }
        }
    };
}

tuple_size!(A);
tuple_size!(A B);
tuple_size!(A B C);
tuple_size!(A B C D);

impl ApproxSize for serde_json::Value {
    fn approx_size(&self) -> u64 {
        use serde_json::Value;

        // Explicit stack, nesting depth is unbounded.
        let mut bytes = 0;
        let mut stack = vec![self];
        while let Some(value) = stack.pop() {
            match value {
                Value::Null => {}
                Value::Bool(_) => bytes += BOOL_BYTES,
                Value::Number(_) => bytes += NUMBER_BYTES,
                Value::String(s) => bytes += utf16_bytes(s),
                Value::Array(items) => stack.extend(items),
                Value::Object(map) => stack.extend(map.values()),
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(true.approx_size(), 4);
        assert_eq!(7u8.approx_size(), 8);
        assert_eq!(1.5f64.approx_size(), 8);
        assert_eq!('a'.approx_size(), 2);
        assert_eq!('😀'.approx_size(), 4);
        assert_eq!(().approx_size(), 0);
        assert_eq!(None::<u32>.approx_size(), 0);
        assert_eq!(Some(1u32).approx_size(), 8);
    }

    #[test]
    fn test_strings_count_utf16_units() {
        assert_eq!("data1".approx_size(), 10);
        assert_eq!(String::from("data212345678").approx_size(), 26);
        assert_eq!("é".approx_size(), 2);
        assert_eq!("😀".approx_size(), 4);
    }

    #[test]
    fn test_containers_sum_elements() {
        assert_eq!(vec![0u8; 100].approx_size(), 800);
        assert_eq!([1u32, 2, 3].approx_size(), 24);
        assert_eq!(vec!["ab", "cd"].approx_size(), 8);
        assert_eq!(("ab", 1u8, true).approx_size(), 16);

        let mut map = BTreeMap::new();
        map.insert("a very long key that is not costed", 1u64);
        assert_eq!(map.approx_size(), 8);
    }

    #[test]
    fn test_json_value() {
        let value = json!({"name": "ab", "tags": ["x", "y"], "ok": true, "n": 1, "none": null});
        assert_eq!(value.approx_size(), 4 + 4 + 4 + 8);
    }

    #[test]
    fn test_json_estimator_costs_serialize_types() {
        #[derive(Serialize)]
        struct Point {
            x: f64,
            y: f64,
            label: &'static str,
        }
        let p = Point {
            x: 1.0,
            y: 2.0,
            label: "p",
        };
        assert_eq!(JsonSizeEstimator.estimate(&p).unwrap(), 18);
    }

    #[test]
    fn test_json_estimator_rejects_unrepresentable_values() {
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "tuple keys cannot be JSON object keys");
        let err = JsonSizeEstimator.estimate(&map).unwrap_err();
        assert!(matches!(err, CacheError::UnestimableValue(_)));
    }

    #[test]
    fn test_closure_estimator() {
        let by_len = |v: &Vec<u8>| v.len() as u64;
        assert_eq!(by_len.estimate(&vec![1, 2, 3]).unwrap(), 3);
    }
}
