//! Cell and parameter values
//!
//! This module contains the dialect-neutral `Value` type held in store cells and
//! command parameters, plus coercion between declared types.

mod conversions;

pub use conversions::FromValue;

use crate::error::{Result, TabulaError};
use core::hash::{Hash, Hasher};
use tabula_types::DbType;

//------------------------------------------------------------------------------
// Value Definition
//------------------------------------------------------------------------------

/// A single cell or parameter value
#[derive(Debug, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    #[cfg(feature = "chrono")]
    Timestamp(chrono::NaiveDateTime),
}

impl Value {
    /// Returns true if this value is NULL.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer value if this is an INTEGER.
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the real value if this is a REAL.
    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text value if this is TEXT.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// The natural declared type of this value. NULL has no type.
    pub const fn db_type(&self) -> DbType {
        match self {
            Value::Null => DbType::Unknown,
            Value::Bool(_) => DbType::Boolean,
            Value::Integer(_) => DbType::BigInt,
            Value::Real(_) => DbType::Double,
            Value::Text(_) => DbType::Text,
            Value::Blob(_) => DbType::Binary,
            #[cfg(feature = "uuid")]
            Value::Uuid(_) => DbType::Guid,
            #[cfg(feature = "chrono")]
            Value::Timestamp(_) => DbType::Timestamp,
        }
    }

    /// Returns true when this value is a minimum/maximum sentinel of its type.
    ///
    /// Sentinels stand for "never assigned" and are left out of generated INSERT
    /// lists so that a column default applies.
    pub fn is_sentinel(&self) -> bool {
        match self {
            Value::Integer(v) => *v == i64::MIN || *v == i64::MAX,
            Value::Real(v) => *v == f64::MIN || *v == f64::MAX,
            #[cfg(feature = "chrono")]
            Value::Timestamp(v) => *v == chrono::NaiveDateTime::MIN || *v == chrono::NaiveDateTime::MAX,
            _ => false,
        }
    }

    /// Coerce this value into the representation of `target`.
    ///
    /// NULL stays NULL. Values already of a compatible representation are returned
    /// unchanged; everything else goes through the conversion rules below.
    pub fn coerce(&self, target: DbType) -> Result<Value> {
        let fail = || TabulaError::Conversion {
            from: self.db_type(),
            to: target,
        };

        if self.is_null() || matches!(target, DbType::Unknown) {
            return Ok(self.clone());
        }

        match (target, self) {
            (DbType::Boolean, Value::Bool(_)) => Ok(self.clone()),
            (DbType::Boolean, Value::Integer(v)) => Ok(Value::Bool(*v != 0)),
            (DbType::Boolean, Value::Text(s)) => match s.trim() {
                t if t.eq_ignore_ascii_case("true") || t == "1" => Ok(Value::Bool(true)),
                t if t.eq_ignore_ascii_case("false") || t == "0" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },

            (t, Value::Integer(_)) if t.is_integer() => Ok(self.clone()),
            (t, Value::Bool(b)) if t.is_integer() => Ok(Value::Integer(i64::from(*b))),
            (t, Value::Real(v)) if t.is_integer() => {
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 {
                    Ok(Value::Integer(*v as i64))
                } else {
                    Err(fail())
                }
            }
            (t, Value::Text(s)) if t.is_integer() => {
                s.trim().parse().map(Value::Integer).map_err(|_| fail())
            }

            (DbType::Real | DbType::Double | DbType::Decimal, Value::Real(_)) => Ok(self.clone()),
            (DbType::Real | DbType::Double | DbType::Decimal, Value::Integer(v)) => {
                Ok(Value::Real(*v as f64))
            }
            (DbType::Real | DbType::Double | DbType::Decimal, Value::Text(s)) => {
                s.trim().parse().map(Value::Real).map_err(|_| fail())
            }

            (DbType::Text, Value::Text(_)) => Ok(self.clone()),
            (DbType::Text, Value::Blob(b)) => String::from_utf8(b.clone())
                .map(Value::Text)
                .map_err(|_| fail()),
            (DbType::Text, other) => Ok(Value::Text(other.to_string())),

            (DbType::Binary, Value::Blob(_)) => Ok(self.clone()),
            (DbType::Binary, Value::Text(s)) => Ok(Value::Blob(s.as_bytes().to_vec())),

            #[cfg(feature = "uuid")]
            (DbType::Guid, Value::Uuid(_)) => Ok(self.clone()),
            #[cfg(feature = "uuid")]
            (DbType::Guid, Value::Text(s)) => {
                uuid::Uuid::parse_str(s.trim()).map(Value::Uuid).map_err(|_| fail())
            }
            #[cfg(feature = "uuid")]
            (DbType::Guid, Value::Blob(b)) => {
                uuid::Uuid::from_slice(b).map(Value::Uuid).map_err(|_| fail())
            }

            #[cfg(feature = "chrono")]
            (DbType::Timestamp, Value::Timestamp(_)) => Ok(self.clone()),
            #[cfg(feature = "chrono")]
            (DbType::Timestamp, Value::Text(s)) => s
                .trim()
                .parse::<chrono::NaiveDateTime>()
                .map(Value::Timestamp)
                .map_err(|_| fail()),

            _ => Err(fail()),
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
            #[cfg(feature = "uuid")]
            Value::Uuid(u) => write!(f, "{u}"),
            #[cfg(feature = "chrono")]
            Value::Timestamp(t) => write!(f, "{t}"),
        }
    }
}

// Floats hash by bit pattern so checksums are stable for identical cells.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Real(r) => r.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Blob(b) => b.hash(state),
            #[cfg(feature = "uuid")]
            Value::Uuid(u) => u.hash(state),
            #[cfg(feature = "chrono")]
            Value::Timestamp(t) => t.hash(state),
        }
    }
}
