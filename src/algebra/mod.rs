//! Numeric types and packed sparse formats shared by the model storage.
//!
//! The linked storage in [`model`](crate::model) is the editable form of a
//! constraint matrix.  The types here describe the values it holds and the
//! packed [`CscMatrix`] format it exports to.

mod error_types;
pub use error_types::*;
mod floats;
pub use floats::*;
mod csc;
pub use csc::*;
