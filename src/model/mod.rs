//! Incremental sparse model storage.
//!
//! A [`SparseModel`] keeps its coefficients in a single [`TriplePool`] and
//! threads two [`LinkedList`] views through it, one ordered by row and one
//! by column.  A [`PairHash`] maps each (row, column) pair to its pool slot
//! and [`NameHash`] tables resolve row and column names.
//!
//! The lower level types are public so that an owner with its own edit
//! choreography can drive the views directly.

mod error_types;
pub use error_types::*;
mod triples;
pub use triples::*;
pub mod hashing;
pub use hashing::{HashLink, NameHash, PairHash};
mod linkedlist;
pub use linkedlist::*;
mod cursor;
pub use cursor::*;
mod settings;
pub use settings::*;
mod sparsemodel;
pub use sparsemodel::*;
