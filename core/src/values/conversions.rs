//! Conversions between Rust types and [`Value`].

use super::Value;
use crate::error::{Result, TabulaError};
use tabula_types::DbType;

/// Typed extraction from a [`Value`].
///
/// `DB_TYPE` is the representation this type reads from; the projection layer
/// coerces a stored value only when its type differs from `DB_TYPE`.
pub trait FromValue: Sized {
    const DB_TYPE: DbType;

    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T: FromValue>(value: &Value) -> TabulaError {
    TabulaError::Conversion {
        from: value.db_type(),
        to: T::DB_TYPE,
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $db:expr),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const DB_TYPE: DbType = $db;

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Integer(v) => <$ty>::try_from(v).map_err(|_| TabulaError::Conversion {
                            from: DbType::BigInt,
                            to: $db,
                        }),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_integer! {
    i16 => DbType::SmallInt,
    i32 => DbType::Integer,
    i64 => DbType::BigInt,
    u8 => DbType::SmallInt,
    u16 => DbType::Integer,
    u32 => DbType::BigInt,
}

impl FromValue for f64 {
    const DB_TYPE: DbType = DbType::Double;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for f32 {
    const DB_TYPE: DbType = DbType::Real;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for bool {
    const DB_TYPE: DbType = DbType::Boolean;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for String {
    const DB_TYPE: DbType = DbType::Text;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Vec<u8> {
    const DB_TYPE: DbType = DbType::Binary;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Value {
    const DB_TYPE: DbType = DbType::Unknown;

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const DB_TYPE: DbType = T::DB_TYPE;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(feature = "uuid")]
impl FromValue for uuid::Uuid {
    const DB_TYPE: DbType = DbType::Guid;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(feature = "chrono")]
impl FromValue for chrono::NaiveDateTime {
    const DB_TYPE: DbType = DbType::Timestamp;

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

//------------------------------------------------------------------------------
// Into Value
//------------------------------------------------------------------------------

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for Value {
    fn from(value: uuid::Uuid) -> Self {
        Value::Uuid(value)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::NaiveDateTime> for Value {
    fn from(value: chrono::NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}
