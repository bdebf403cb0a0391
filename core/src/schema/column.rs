use crate::values::Value;
use compact_str::CompactString;
use core::fmt;
use core::ops::{BitOr, BitOrAssign};
use tabula_types::DbType;

/// Column flag set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnFlags(u16);

impl ColumnFlags {
    pub const NONE: Self = Self(0);
    /// Part of the row's unique key
    pub const IDENTIFIER: Self = Self(1 << 0);
    /// Value generated by the database (identity or sequence)
    pub const AUTO_GENERATED: Self = Self(1 << 1);
    pub const COMPUTED: Self = Self(1 << 2);
    pub const READ_ONLY: Self = Self(1 << 3);
    pub const NULLABLE: Self = Self(1 << 4);
    pub const HAS_DEFAULT: Self = Self(1 << 5);
    /// Holds a lazily loaded child collection instead of a stored value
    pub const TO_MANY: Self = Self(1 << 6);
    /// Writes do not mark the row modified
    pub const UNTRACKED: Self = Self(1 << 7);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ColumnFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ColumnFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for ColumnFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ColumnFlags, &str); 8] = [
            (ColumnFlags::IDENTIFIER, "IDENTIFIER"),
            (ColumnFlags::AUTO_GENERATED, "AUTO_GENERATED"),
            (ColumnFlags::COMPUTED, "COMPUTED"),
            (ColumnFlags::READ_ONLY, "READ_ONLY"),
            (ColumnFlags::NULLABLE, "NULLABLE"),
            (ColumnFlags::HAS_DEFAULT, "HAS_DEFAULT"),
            (ColumnFlags::TO_MANY, "TO_MANY"),
            (ColumnFlags::UNTRACKED, "UNTRACKED"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// Describes how a to-many relation column is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Table holding the child rows
    pub target: CompactString,
    /// Child column referencing the owner
    pub foreign_key: CompactString,
    /// Owner column the foreign key points at
    pub local_key: CompactString,
}

/// A column of a tabular store, also used to declare entity metadata.
///
/// ```
/// use tabula_core::schema::Column;
/// use tabula_core::DbType;
///
/// let id = Column::new("Id", DbType::BigInt).identifier().auto_generated();
/// assert!(id.is_identifier());
/// assert!(!id.is_insertable());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: CompactString,
    field: Option<CompactString>,
    db_type: DbType,
    flags: ColumnFlags,
    size: Option<u32>,
    sequence: Option<CompactString>,
    default: Option<Value>,
    relation: Option<Relation>,
    ordinal: usize,
}

impl Column {
    pub fn new(name: impl Into<CompactString>, db_type: DbType) -> Self {
        Self {
            name: name.into(),
            field: None,
            db_type,
            flags: ColumnFlags::NONE,
            size: None,
            sequence: None,
            default: None,
            relation: None,
            ordinal: 0,
        }
    }

    /// A to-many relation column. It is never persisted and writes to it are
    /// not change-tracked.
    pub fn to_many(name: impl Into<CompactString>, relation: Relation) -> Self {
        let mut column = Self::new(name, DbType::Relation);
        column.flags = ColumnFlags::TO_MANY | ColumnFlags::UNTRACKED;
        column.relation = Some(relation);
        column
    }

    // ==================== declaration builders ====================

    /// Maps this column to a differently named property.
    pub fn field(mut self, field: impl Into<CompactString>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn identifier(mut self) -> Self {
        self.flags |= ColumnFlags::IDENTIFIER;
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.flags |= ColumnFlags::AUTO_GENERATED;
        self
    }

    pub fn computed(mut self) -> Self {
        self.flags |= ColumnFlags::COMPUTED;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.flags |= ColumnFlags::READ_ONLY;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.flags |= ColumnFlags::NULLABLE;
        self
    }

    pub fn untracked(mut self) -> Self {
        self.flags |= ColumnFlags::UNTRACKED;
        self
    }

    /// Declares a database default. INSERT omits the column while the cell
    /// still holds this value (or a sentinel).
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.flags |= ColumnFlags::HAS_DEFAULT;
        self.default = Some(value.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Generator used for this column's value on dialects with sequences.
    pub fn sequence(mut self, name: impl Into<CompactString>) -> Self {
        self.sequence = Some(name.into());
        self.flags |= ColumnFlags::AUTO_GENERATED;
        self
    }

    pub(crate) fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    // ==================== accessors ====================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property this column backs; the column name when not remapped.
    #[inline]
    pub fn field_name(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub const fn db_type(&self) -> DbType {
        self.db_type
    }

    #[inline]
    pub const fn flags(&self) -> ColumnFlags {
        self.flags
    }

    /// Declared maximum length, if any.
    #[inline]
    pub const fn max_size(&self) -> Option<u32> {
        self.size
    }

    #[inline]
    pub fn sequence_name(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    #[inline]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[inline]
    pub fn relation(&self) -> Option<&Relation> {
        self.relation.as_ref()
    }

    /// Position of this column within its store.
    #[inline]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline]
    pub const fn is_identifier(&self) -> bool {
        self.flags.contains(ColumnFlags::IDENTIFIER)
    }

    #[inline]
    pub const fn is_auto_generated(&self) -> bool {
        self.flags.contains(ColumnFlags::AUTO_GENERATED)
    }

    #[inline]
    pub const fn is_to_many(&self) -> bool {
        self.flags.contains(ColumnFlags::TO_MANY)
    }

    #[inline]
    pub const fn is_tracked(&self) -> bool {
        !self.flags.contains(ColumnFlags::UNTRACKED)
    }

    /// Columns that are stored at all: everything except to-many relations.
    #[inline]
    pub const fn is_persisted(&self) -> bool {
        !self.is_to_many()
    }

    /// Eligible for an INSERT column list, before looking at the cell value.
    pub const fn is_insertable(&self) -> bool {
        !self.flags.intersects(
            ColumnFlags::COMPUTED
                .union(ColumnFlags::READ_ONLY)
                .union(ColumnFlags::TO_MANY)
                .union(ColumnFlags::AUTO_GENERATED),
        )
    }

    /// Eligible for an UPDATE SET list.
    pub const fn is_updatable(&self) -> bool {
        !self.flags.intersects(
            ColumnFlags::IDENTIFIER
                .union(ColumnFlags::AUTO_GENERATED)
                .union(ColumnFlags::COMPUTED)
                .union(ColumnFlags::READ_ONLY)
                .union(ColumnFlags::TO_MANY),
        )
    }

    /// Whether an INSERT should carry `value` for this column. A column with a
    /// declared default is skipped while its value is the default, NULL, or a
    /// min/max sentinel.
    pub fn carries_value(&self, value: &Value) -> bool {
        if !self.flags.contains(ColumnFlags::HAS_DEFAULT) {
            return true;
        }
        !(value.is_null() || value.is_sentinel() || self.default.as_ref() == Some(value))
    }
}
