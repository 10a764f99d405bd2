// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parameter values.
//!
//! A [`Value`] is whatever a caller stored with [`Scope::put`](crate::scope::Scope::put).
//! The sink only ever sees strings: [`Value::to_sink_string`] renders every variant
//! through [`Display`], except [`Value::Null`], which has no sink representation and
//! makes the sink drop the key.

use std::fmt::Display;

/// A context parameter value.
///
/// Values are converted from the usual primitive types with [`From`]:
///
/// ```rust
/// use logwise_mdc::Value;
///
/// assert_eq!(Value::from(42), Value::Int(42));
/// assert_eq!(Value::from("user-7"), Value::Str("user-7".to_string()));
/// assert_eq!(Value::from(None::<u32>), Value::Null);
/// ```
///
/// For anything else that implements [`Display`], use [`Value::display`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.  The sink holds no entry for a key whose value is `Null`.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Captures the [`Display`] rendering of `value`.
    ///
    /// ```rust
    /// use logwise_mdc::Value;
    /// use std::net::Ipv4Addr;
    ///
    /// let v = Value::display(Ipv4Addr::LOCALHOST);
    /// assert_eq!(v, Value::Str("127.0.0.1".to_string()));
    /// ```
    pub fn display(value: impl Display) -> Value {
        Value::Str(value.to_string())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string handed to the sink, or `None` for [`Value::Null`].
    pub fn to_sink_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Str(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! value_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Value {
                #[inline]
                fn from(value: $source) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )*
    };
}

value_from!(Int as i64: i8, i16, i32, i64, isize);
value_from!(UInt as u64: u8, u16, u32, u64, usize);
value_from!(Float as f64: f32, f64);

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    #[inline]
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    #[inline]
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

/**
`None` is [`Value::Null`]; `Some` converts the inner value.
*/
impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
