//! __sparse-model__ is incremental storage for the constraint matrix of an
//! optimization model.  The matrix is built element by element, a row or a
//! column at a time, and stays traversable in both orientations after every
//! edit without being rebuilt.
//!
//! The storage consists of
//!
//! * a pool of (row, column, value) triples whose slot numbers never change,
//! * two doubly linked views threading one chain per row, or per column,
//!   through that pool, each with a chain of free slots reused before the
//!   pool grows,
//! * a (row, column) → slot hash used to detect duplicate coefficients and
//!   to carry edits from one view into the other,
//! * name → index hashes for row and column names.
//!
//! [`SparseModel`](model::SparseModel) owns all of these and keeps the two
//! views in step.  The packed [`CscMatrix`](algebra::CscMatrix) form is
//! produced on demand.
//!
//! ```no_run
//! use sparse_model::model::*;
//!
//! let mut model = SparseModel::<f64>::new(ModelSettings::default());
//! model.add_row(&[0, 1], &[1.0, 1.0], Some("budget")).unwrap();
//! model.add_row(&[1, 2], &[2.0, -1.0], Some("balance")).unwrap();
//! model.delete_row(0).unwrap();
//!
//! let A = model.to_csc().unwrap();
//! assert_eq!(A.nnz(), 2);
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

pub mod algebra;
pub mod model;
