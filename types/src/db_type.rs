//! Declared value types of columns and parameters.

/// The declared type of a column or command parameter.
///
/// This is the logical type the store and compiler reason about; each dialect
/// maps it to its own storage type at execution time.
///
/// # Examples
///
/// ```
/// use tabula_types::DbType;
///
/// assert!(DbType::BigInt.is_integer());
/// assert!(DbType::Decimal.is_numeric());
/// assert!(!DbType::Text.is_numeric());
/// assert_eq!(DbType::parse("guid"), Some(DbType::Guid));
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DbType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Text,
    Binary,
    Guid,
    Timestamp,
    /// A to-many relation column; never stored or bound.
    Relation,
    #[default]
    Unknown,
}

impl DbType {
    /// Returns `true` for the integer family.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, DbType::SmallInt | DbType::Integer | DbType::BigInt)
    }

    /// Returns `true` for integer and floating point types.
    #[inline]
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, DbType::Real | DbType::Double | DbType::Decimal)
    }

    /// Parse a type name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        const NAMES: [(&str, DbType); 16] = [
            ("boolean", DbType::Boolean),
            ("bool", DbType::Boolean),
            ("smallint", DbType::SmallInt),
            ("integer", DbType::Integer),
            ("int", DbType::Integer),
            ("bigint", DbType::BigInt),
            ("real", DbType::Real),
            ("double", DbType::Double),
            ("decimal", DbType::Decimal),
            ("text", DbType::Text),
            ("binary", DbType::Binary),
            ("blob", DbType::Binary),
            ("guid", DbType::Guid),
            ("uuid", DbType::Guid),
            ("timestamp", DbType::Timestamp),
            ("relation", DbType::Relation),
        ];
        NAMES
            .iter()
            .find(|(name, _)| s.eq_ignore_ascii_case(name))
            .map(|(_, ty)| *ty)
    }

    /// Get the type name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DbType::Boolean => "boolean",
            DbType::SmallInt => "smallint",
            DbType::Integer => "integer",
            DbType::BigInt => "bigint",
            DbType::Real => "real",
            DbType::Double => "double",
            DbType::Decimal => "decimal",
            DbType::Text => "text",
            DbType::Binary => "binary",
            DbType::Guid => "guid",
            DbType::Timestamp => "timestamp",
            DbType::Relation => "relation",
            DbType::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for DbType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
