//! # Typed Values
//!
//! The closed set of value kinds a stream can carry, and a dynamic [`Value`]
//! wrapper for callers that dispatch on kind at runtime. The typed
//! `write_*`/`read_*` session methods are the primary surface; [`Value`] and
//! [`ValueKind`] exist for the single-value facade and for callers driven by
//! external schemas.

use crate::error::BincryptError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Kind tag for the supported value set.
///
/// Stream frames are not self-describing: the reader must already know the
/// kind of the next value, either statically (typed `read_*` calls) or via
/// an external schema carried alongside the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Char,
    Str,
    Timestamp,
    Bytes,
    StrArray,
}

impl ValueKind {
    /// All supported kinds, in declaration order.
    pub const ALL: [ValueKind; 17] = [
        ValueKind::Bool,
        ValueKind::I8,
        ValueKind::U8,
        ValueKind::I16,
        ValueKind::U16,
        ValueKind::I32,
        ValueKind::U32,
        ValueKind::I64,
        ValueKind::U64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::Decimal,
        ValueKind::Char,
        ValueKind::Str,
        ValueKind::Timestamp,
        ValueKind::Bytes,
        ValueKind::StrArray,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::U8 => "u8",
            ValueKind::I16 => "i16",
            ValueKind::U16 => "u16",
            ValueKind::I32 => "i32",
            ValueKind::U32 => "u32",
            ValueKind::I64 => "i64",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Decimal => "decimal",
            ValueKind::Char => "char",
            ValueKind::Str => "string",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Bytes => "bytes",
            ValueKind::StrArray => "string-array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = BincryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" => Ok(ValueKind::Bool),
            "i8" => Ok(ValueKind::I8),
            "u8" => Ok(ValueKind::U8),
            "i16" => Ok(ValueKind::I16),
            "u16" => Ok(ValueKind::U16),
            "i32" => Ok(ValueKind::I32),
            "u32" => Ok(ValueKind::U32),
            "i64" => Ok(ValueKind::I64),
            "u64" => Ok(ValueKind::U64),
            "f32" => Ok(ValueKind::F32),
            "f64" => Ok(ValueKind::F64),
            "decimal" => Ok(ValueKind::Decimal),
            "char" => Ok(ValueKind::Char),
            "string" => Ok(ValueKind::Str),
            "timestamp" => Ok(ValueKind::Timestamp),
            "bytes" => Ok(ValueKind::Bytes),
            "string-array" => Ok(ValueKind::StrArray),
            other => Err(BincryptError::UnsupportedType(other.to_string())),
        }
    }
}

/// A dynamically-typed value, one variant per [`ValueKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    Str(String),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    StrArray(Vec<String>),
}

impl Value {
    /// The kind tag of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::U8(_) => ValueKind::U8,
            Value::I16(_) => ValueKind::I16,
            Value::U16(_) => ValueKind::U16,
            Value::I32(_) => ValueKind::I32,
            Value::U32(_) => ValueKind::U32,
            Value::I64(_) => ValueKind::I64,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Char(_) => ValueKind::Char,
            Value::Str(_) => ValueKind::Str,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::StrArray(_) => ValueKind::StrArray,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    char => Char,
    String => Str,
    DateTime<Utc> => Timestamp,
    Vec<u8> => Bytes,
    Vec<String> => StrArray,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<&[String]> for Value {
    fn from(v: &[String]) -> Self {
        Value::StrArray(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in ValueKind::ALL {
            let parsed: ValueKind = kind.name().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn kind_parsing_is_case_insensitive() {
        assert_eq!("STRING".parse::<ValueKind>().unwrap(), ValueKind::Str);
        assert_eq!("Timestamp".parse::<ValueKind>().unwrap(), ValueKind::Timestamp);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "guid".parse::<ValueKind>().unwrap_err();
        assert!(matches!(err, BincryptError::UnsupportedType(name) if name == "guid"));
    }

    #[test]
    fn value_reports_its_kind() {
        assert_eq!(Value::from(55i32).kind(), ValueKind::I32);
        assert_eq!(Value::from("text").kind(), ValueKind::Str);
        assert_eq!(Value::from(vec![1u8, 2, 3]).kind(), ValueKind::Bytes);
        assert_eq!(
            Value::from(vec!["a".to_string(), "b".to_string()]).kind(),
            ValueKind::StrArray
        );
    }

    #[test]
    fn conversions_preserve_payload() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(3.25f64), Value::F64(3.25));
        assert_eq!(Value::from('é'), Value::Char('é'));
        assert_eq!(
            Value::from("owned".to_string()),
            Value::Str("owned".to_string())
        );
    }
}
