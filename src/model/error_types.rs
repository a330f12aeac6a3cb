use crate::model::SlotId;
use thiserror::Error;

/// Error type returned by the linked storage, its hash tables and the
/// owning [`SparseModel`](crate::model::SparseModel).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A resize asked for less room than is currently in use
    #[error("Requested capacity {requested} is below current occupancy {occupied}")]
    CapacityBelowOccupancy { requested: usize, occupied: usize },
    /// A major index that was never added, or has no chain in this view
    #[error("Major index {index} out of range (number of majors {number_major})")]
    MajorOutOfRange { index: usize, number_major: usize },
    /// A row or column coordinate outside the permitted range
    #[error("Index {index} out of range (limit {limit})")]
    IndexOutOfRange { index: usize, limit: usize },
    /// A pool slot that is vacant, stale or beyond the pool
    #[error("Invalid slot {0}")]
    InvalidSlot(SlotId),
    /// The (row, column) pair is already stored
    #[error("Duplicate entry at row {row}, column {column}")]
    DuplicateEntry { row: usize, column: usize },
    /// The name is already registered under another index
    #[error("Duplicate name \"{0}\"")]
    DuplicateName(String),
    /// A name is already registered at this index
    #[error("Name slot {0} already occupied")]
    NameSlotOccupied(usize),
    /// Index and value arrays of different lengths
    #[error("Length mismatch: {indices} indices but {elements} elements")]
    LengthMismatch { indices: usize, elements: usize },
    /// The two orientation views disagree about a slot
    #[error("Views out of step at slot {0}")]
    ChainMismatch(SlotId),
    /// Position propagation between two views of the same orientation
    #[error("Propagation requires views of opposite orientation")]
    OrientationMismatch,
    /// A string-valued entry was found where a number is required
    #[error("Unresolved string value at row {row}, column {column}")]
    UnresolvedString { row: usize, column: usize },
}
