use super::RowId;

/// Notification raised by a [`Store`](super::Store) to its observers.
///
/// Events carry row ids and column positions rather than references, so an
/// observer never holds a borrow into the store it watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A row was attached at `index`
    Added { row: RowId, index: usize },
    /// A cell is about to be written
    Changing { row: RowId, column: usize },
    /// A cell was written
    Updated { row: RowId, column: usize },
    /// A row left the live row list
    Deleted { row: RowId },
    /// Every live row was removed at once
    Cleared,
}

impl StoreEvent {
    /// The row this event concerns, if it concerns a single row.
    pub const fn row(&self) -> Option<RowId> {
        match self {
            StoreEvent::Added { row, .. }
            | StoreEvent::Changing { row, .. }
            | StoreEvent::Updated { row, .. }
            | StoreEvent::Deleted { row } => Some(*row),
            StoreEvent::Cleared => None,
        }
    }
}
