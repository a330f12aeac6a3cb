use crate::algebra::{CscMatrix, FloatT};
use crate::model::*;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::iter::zip;

/// Editable constraint matrix kept in both row and column order.
///
/// The model owns the triple pool, one [`LinkedList`] per orientation, the
/// [`PairHash`] used to find existing coefficients, and [`NameHash`] tables
/// for row names, column names and string-valued coefficients.  Every edit
/// is applied to the view matching its orientation and then carried into
/// the other view, so both stay traversable after each call.
///
/// __Example usage__ :
///
/// ```no_run
/// use sparse_model::model::*;
///
/// let mut model: SparseModel<f64> = SparseModel::new(ModelSettings::default());
/// let r = model.add_row(&[2, 5], &[1.0, 2.0], Some("supply")).unwrap();
/// model.add_column(&[0, 1], &[3.0, 4.0], None).unwrap();
///
/// assert_eq!(model.element(r, 5), Some(2.0));
/// for link in model.column(2) {
///     println!("row {} value {:?}", link.row(), link.value());
/// }
///
/// let A = model.to_csc().unwrap();
/// assert_eq!(A.nnz(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct SparseModel<T: FloatT = f64> {
    settings: ModelSettings,
    triples: TriplePool<T>,
    rows: LinkedList,
    columns: LinkedList,
    pairs: PairHash,
    row_names: NameHash,
    column_names: NameHash,
    strings: NameHash,
    number_rows: usize,
    number_columns: usize,
}

impl<T> SparseModel<T>
where
    T: FloatT,
{
    pub fn new(settings: ModelSettings) -> Self {
        SparseModel {
            triples: TriplePool::with_capacity(settings.initial_elements),
            rows: LinkedList::with_capacity(
                Orientation::Row,
                settings.initial_rows,
                settings.initial_elements,
            ),
            columns: LinkedList::with_capacity(
                Orientation::Column,
                settings.initial_columns,
                settings.initial_elements,
            ),
            pairs: PairHash::with_capacity(settings.initial_elements),
            row_names: NameHash::with_capacity(settings.initial_rows),
            column_names: NameHash::with_capacity(settings.initial_columns),
            strings: NameHash::new(),
            number_rows: 0,
            number_columns: 0,
            settings,
        }
    }

    /// Bulk-builds an `m` x `n` model from `(row, column, value)` entries in
    /// a single pass per view.  Repeated pairs are rejected.
    pub fn from_triplets(
        m: usize,
        n: usize,
        triplets: &[(usize, usize, T)],
        settings: ModelSettings,
    ) -> Result<Self, ModelError> {
        if m > MAX_ROW + 1 {
            return Err(ModelError::IndexOutOfRange {
                index: m,
                limit: MAX_ROW + 1,
            });
        }
        if n > MAX_COLUMN + 1 {
            return Err(ModelError::IndexOutOfRange {
                index: n,
                limit: MAX_COLUMN + 1,
            });
        }
        let triples = TriplePool::from_triples(
            triplets
                .iter()
                .map(|&(row, column, value)| Triple::new(row, column, value)),
        );
        let nnz = triples.len();
        let rows = LinkedList::create(
            settings.initial_rows,
            settings.initial_elements,
            m,
            n,
            Orientation::Row,
            nnz,
            &triples,
        )?;
        let columns = LinkedList::create(
            settings.initial_columns,
            settings.initial_elements,
            n,
            m,
            Orientation::Column,
            nnz,
            &triples,
        )?;
        let pairs = PairHash::from_triples(&triples)?;

        Ok(SparseModel {
            triples,
            rows,
            columns,
            pairs,
            row_names: NameHash::with_capacity(settings.initial_rows.max(m)),
            column_names: NameHash::with_capacity(settings.initial_columns.max(n)),
            strings: NameHash::new(),
            number_rows: m,
            number_columns: n,
            settings,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn number_rows(&self) -> usize {
        self.number_rows
    }

    pub fn number_columns(&self) -> usize {
        self.number_columns
    }

    /// number of stored coefficients
    pub fn number_elements(&self) -> usize {
        self.pairs.number_items()
    }

    pub fn triples(&self) -> &TriplePool<T> {
        &self.triples
    }

    /// row-ordered view
    pub fn row_list(&self) -> &LinkedList {
        &self.rows
    }

    /// column-ordered view
    pub fn column_list(&self) -> &LinkedList {
        &self.columns
    }

    pub fn pair_hash(&self) -> &PairHash {
        &self.pairs
    }

    pub fn row_names(&self) -> &NameHash {
        &self.row_names
    }

    pub fn column_names(&self) -> &NameHash {
        &self.column_names
    }

    /// Appends a row with coefficients `values` in `columns`, returning its
    /// index.  Columns past the current count extend the model.  A column
    /// repeated within `columns` is handled by the
    /// [`DuplicatePolicy`] of the settings.
    pub fn add_row(
        &mut self,
        columns: &[usize],
        values: &[T],
        name: Option<&str>,
    ) -> Result<usize, ModelError> {
        let row = self.number_rows;
        if let Some(name) = name {
            if self.row_names.hash(name).is_some() {
                return Err(ModelError::DuplicateName(name.to_string()));
            }
        }
        self.insert_line(Orientation::Row, row, columns, values)?;
        if let Some(name) = name {
            self.row_names.add_hash(row, name)?;
        }
        Ok(row)
    }

    /// Appends a column with coefficients `values` in `rows`, returning its
    /// index.  Rows past the current count extend the model.
    pub fn add_column(
        &mut self,
        rows: &[usize],
        values: &[T],
        name: Option<&str>,
    ) -> Result<usize, ModelError> {
        let column = self.number_columns;
        if let Some(name) = name {
            if self.column_names.hash(name).is_some() {
                return Err(ModelError::DuplicateName(name.to_string()));
            }
        }
        self.insert_line(Orientation::Column, column, rows, values)?;
        if let Some(name) = name {
            self.column_names.add_hash(column, name)?;
        }
        Ok(column)
    }

    /// Removes every coefficient of `row` and its name.  Row numbering is
    /// unchanged; the row stays in the model empty.
    ///
    /// Returns the number of coefficients removed.
    pub fn delete_row(&mut self, row: usize) -> Result<usize, ModelError> {
        if row >= self.number_rows {
            return Err(ModelError::MajorOutOfRange {
                index: row,
                number_major: self.number_rows,
            });
        }
        let count = self.unlink_line(Orientation::Row, row)?;
        self.row_names.delete_hash(row);
        Ok(count)
    }

    /// Removes every coefficient of `column` and its name.  Column numbering
    /// is unchanged.
    ///
    /// Returns the number of coefficients removed.
    pub fn delete_column(&mut self, column: usize) -> Result<usize, ModelError> {
        if column >= self.number_columns {
            return Err(ModelError::MajorOutOfRange {
                index: column,
                number_major: self.number_columns,
            });
        }
        let count = self.unlink_line(Orientation::Column, column)?;
        self.column_names.delete_hash(column);
        Ok(count)
    }

    /// Stores `value` at (`row`, `column`), replacing whatever is there.
    pub fn set_element(&mut self, row: usize, column: usize, value: T) -> Result<SlotId, ModelError> {
        self.set_payload(row, column, Payload::Value(value))
    }

    /// Stores a string-valued coefficient at (`row`, `column`).  Equal
    /// strings share one entry of the string table.
    pub fn set_element_string(
        &mut self,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<SlotId, ModelError> {
        let index = match self.strings.hash(value) {
            Some(index) => index,
            None => {
                let index = self.strings.number_items();
                self.strings.add_hash(index, value)?;
                index
            }
        };
        self.set_payload(row, column, Payload::String(index))
    }

    /// numeric coefficient at (`row`, `column`)
    pub fn element(&self, row: usize, column: usize) -> Option<T> {
        self.payload(row, column).and_then(|p| p.value())
    }

    /// string coefficient at (`row`, `column`)
    pub fn element_string(&self, row: usize, column: usize) -> Option<&str> {
        match self.payload(row, column)? {
            Payload::String(index) => self.strings.name(index),
            Payload::Value(_) => None,
        }
    }

    pub fn payload(&self, row: usize, column: usize) -> Option<Payload<T>> {
        let slot = self.pairs.hash(row, column, &self.triples)?;
        self.triples.get(slot).map(|t| t.payload)
    }

    /// entry `index` of the string table
    pub fn string(&self, index: usize) -> Option<&str> {
        self.strings.name(index)
    }

    pub fn set_row_name(&mut self, row: usize, name: &str) -> Result<(), ModelError> {
        if row >= self.number_rows {
            return Err(ModelError::IndexOutOfRange {
                index: row,
                limit: self.number_rows,
            });
        }
        rename(&mut self.row_names, row, name)
    }

    pub fn set_column_name(&mut self, column: usize, name: &str) -> Result<(), ModelError> {
        if column >= self.number_columns {
            return Err(ModelError::IndexOutOfRange {
                index: column,
                limit: self.number_columns,
            });
        }
        rename(&mut self.column_names, column, name)
    }

    pub fn row_name(&self, row: usize) -> Option<&str> {
        self.row_names.name(row)
    }

    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.column_names.name(column)
    }

    /// row registered under `name`
    pub fn row_index(&self, name: &str) -> Option<usize> {
        self.row_names.hash(name)
    }

    /// column registered under `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.hash(name)
    }

    /// coefficients of `row`, in insertion order
    pub fn row(&self, row: usize) -> ChainCursor<'_, T> {
        ChainCursor::new(&self.rows, row, &self.triples)
    }

    /// coefficients of `column`, in insertion order
    pub fn column(&self, column: usize) -> ChainCursor<'_, T> {
        ChainCursor::new(&self.columns, column, &self.triples)
    }

    /// Packs the model into CSC form with rows sorted within each column.
    /// Fails if a string-valued coefficient is still present.
    pub fn to_csc(&self) -> Result<CscMatrix<T>, ModelError> {
        let n = self.number_columns;
        let nnz = self.number_elements();
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);
        let mut entries = Vec::new();

        colptr.push(0);
        for col in 0..n {
            entries.clear();
            for link in self.column(col) {
                let value = link.value().ok_or(ModelError::UnresolvedString {
                    row: link.row(),
                    column: col,
                })?;
                entries.push((link.row(), value));
            }
            entries.sort_by_key(|&(row, _)| row);
            for &(row, value) in &entries {
                rowval.push(row);
                nzval.push(value);
            }
            colptr.push(rowval.len());
        }
        Ok(CscMatrix::new(self.number_rows, n, colptr, rowval, nzval))
    }

    /// Verifies both views and the pair hash against the pool: chains
    /// partition the slots, every stored triple is linked in both views at
    /// its own row and column and registered in the hash, and every free
    /// slot is vacant.
    pub fn check_consistency(&self) -> Result<(), ModelError> {
        self.rows.check_consistency(&self.triples)?;
        self.columns.check_consistency(&self.triples)?;

        for (slot, t) in self.triples.iter() {
            if self.rows.membership(slot) != Some(Membership::Major(t.row))
                || self.columns.membership(slot) != Some(Membership::Major(t.column))
                || self.pairs.hash(t.row, t.column, &self.triples) != Some(slot)
            {
                return Err(ModelError::ChainMismatch(slot));
            }
        }
        for slot in self.rows.free_chain().chain(self.columns.free_chain()) {
            if !self.triples.is_vacant(slot) {
                return Err(ModelError::ChainMismatch(slot));
            }
        }
        if let Some(slot) = self.pairs.slots().find(|&s| self.triples.is_vacant(s)) {
            return Err(ModelError::ChainMismatch(slot));
        }
        Ok(())
    }

    // ---------------------------------------------------------
    // edit choreography
    // ---------------------------------------------------------

    // Collapses repeated indices of one incoming line under the duplicate
    // policy, then links the result.
    fn insert_line(
        &mut self,
        orientation: Orientation,
        major: usize,
        indices: &[usize],
        values: &[T],
    ) -> Result<(), ModelError> {
        if indices.len() != values.len() {
            return Err(ModelError::LengthMismatch {
                indices: indices.len(),
                elements: values.len(),
            });
        }

        let policy = self.settings.duplicate_policy;
        let mut merged: Vec<(usize, T)> = Vec::with_capacity(indices.len());
        let mut seen = FxHashMap::default();
        for (&minor, &value) in zip(indices, values) {
            match seen.entry(minor) {
                Entry::Vacant(e) => {
                    e.insert(merged.len());
                    merged.push((minor, value));
                }
                Entry::Occupied(e) => {
                    let (row, column) = orientation.coordinates(major, minor);
                    let entry = &mut merged[*e.get()].1;
                    match policy {
                        DuplicatePolicy::Reject => {
                            return Err(ModelError::DuplicateEntry { row, column });
                        }
                        DuplicatePolicy::Overwrite => *entry = value,
                        DuplicatePolicy::Sum => *entry += value,
                    }
                    log::warn!(
                        "duplicate coefficient at row {}, column {} ({:?})",
                        row,
                        column,
                        policy
                    );
                }
            }
        }

        let (indices, values): (Vec<_>, Vec<_>) = merged.into_iter().unzip();
        self.link_line(orientation, major, &indices, &values)?;
        Ok(())
    }

    // Easy half on the view matching `orientation`, hard half on the other.
    fn link_line(
        &mut self,
        orientation: Orientation,
        major: usize,
        indices: &[usize],
        values: &[T],
    ) -> Result<Option<SlotId>, ModelError> {
        let SparseModel {
            settings,
            triples,
            rows,
            columns,
            pairs,
            ..
        } = self;
        let (easy, hard) = match orientation {
            Orientation::Row => (rows, columns),
            Orientation::Column => (columns, rows),
        };

        let first = easy.add_easy(major, indices, values, triples, pairs)?;
        if settings.propagate_positions {
            hard.add_hard_propagated(first, triples, easy)?;
        } else {
            hard.add_hard(major, indices, values, triples, pairs)?;
        }

        let extent = indices.iter().max().map_or(0, |&m| m + 1);
        match orientation {
            Orientation::Row => {
                self.number_rows = self.number_rows.max(major + 1);
                self.number_columns = self.number_columns.max(extent);
            }
            Orientation::Column => {
                self.number_columns = self.number_columns.max(major + 1);
                self.number_rows = self.number_rows.max(extent);
            }
        }
        Ok(first)
    }

    fn unlink_line(&mut self, orientation: Orientation, major: usize) -> Result<usize, ModelError> {
        let SparseModel {
            settings,
            triples,
            rows,
            columns,
            pairs,
            ..
        } = self;
        let (same, other) = match orientation {
            Orientation::Row => (rows, columns),
            Orientation::Column => (columns, rows),
        };
        // a line that never received a coefficient has no chain yet
        if major >= same.number_major() {
            return Ok(0);
        }

        let count = same.delete_same(major, triples, pairs)?;
        if settings.propagate_positions {
            other.update_deleted(major, triples, same)?;
        } else {
            other.delete_other(major, triples, pairs)?;
        }
        Ok(count)
    }

    fn set_payload(
        &mut self,
        row: usize,
        column: usize,
        payload: Payload<T>,
    ) -> Result<SlotId, ModelError> {
        let slot = match self.pairs.hash(row, column, &self.triples) {
            Some(slot) => slot,
            None => self
                .link_line(Orientation::Row, row, &[column], &[T::zero()])?
                .ok_or(ModelError::DuplicateEntry { row, column })?,
        };
        let t = self
            .triples
            .get_mut(slot)
            .ok_or(ModelError::InvalidSlot(slot))?;
        t.payload = payload;
        Ok(slot)
    }
}

fn rename(names: &mut NameHash, index: usize, name: &str) -> Result<(), ModelError> {
    match names.hash(name) {
        Some(i) if i == index => return Ok(()),
        Some(_) => return Err(ModelError::DuplicateName(name.to_string())),
        None => {}
    }
    names.delete_hash(index);
    names.add_hash(index, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(propagate: bool) -> SparseModel<f64> {
        let settings = ModelSettingsBuilder::default()
            .propagate_positions(propagate)
            .build()
            .unwrap();
        SparseModel::new(settings)
    }

    #[test]
    fn set_element_inserts_then_overwrites() {
        for propagate in [true, false] {
            let mut m = model(propagate);
            let slot = m.set_element(2, 3, 1.0).unwrap();
            assert_eq!(m.number_rows(), 3);
            assert_eq!(m.number_columns(), 4);
            assert_eq!(m.set_element(2, 3, 7.0).unwrap(), slot);
            assert_eq!(m.element(2, 3), Some(7.0));
            assert_eq!(m.number_elements(), 1);
            m.check_consistency().unwrap();
        }
    }

    #[test]
    fn string_elements() {
        let mut m = model(true);
        m.set_element_string(0, 0, "2*alpha").unwrap();
        m.set_element_string(1, 0, "2*alpha").unwrap();
        m.set_element(1, 1, 4.0).unwrap();

        assert_eq!(m.element_string(0, 0), Some("2*alpha"));
        assert_eq!(m.element(0, 0), None);
        assert_eq!(m.payload(1, 0), Some(Payload::String(0)));
        assert_eq!(m.string(0), Some("2*alpha"));
        assert_eq!(m.element_string(1, 1), None);
        assert_eq!(
            m.to_csc(),
            Err(ModelError::UnresolvedString { row: 0, column: 0 })
        );

        // resolving the strings makes the model exportable
        m.set_element(0, 0, 2.0).unwrap();
        m.set_element(1, 0, 2.0).unwrap();
        assert_eq!(m.to_csc().unwrap().nnz(), 3);
    }

    #[test]
    fn rename_rows_and_columns() {
        let mut m = model(true);
        m.add_row(&[0], &[1.0], Some("a")).unwrap();
        m.add_row(&[0], &[1.0], None).unwrap();

        m.set_row_name(1, "b").unwrap();
        assert_eq!(m.row_index("b"), Some(1));
        assert_eq!(
            m.set_row_name(0, "b"),
            Err(ModelError::DuplicateName("b".to_string()))
        );
        m.set_row_name(0, "a").unwrap();
        m.set_row_name(0, "c").unwrap();
        assert_eq!(m.row_index("a"), None);
        assert_eq!(m.row_name(0), Some("c"));

        assert_eq!(
            m.set_column_name(1, "x"),
            Err(ModelError::IndexOutOfRange { index: 1, limit: 1 })
        );
        m.set_column_name(0, "x").unwrap();
        assert_eq!(m.column_index("x"), Some(0));
        assert_eq!(m.column_name(0), Some("x"));
    }

    #[test]
    fn repeated_indices_follow_policy() {
        let mut m = model(true);
        assert_eq!(
            m.add_row(&[1, 4, 1], &[1.0, 2.0, 3.0], Some("r")),
            Err(ModelError::DuplicateEntry { row: 0, column: 1 })
        );
        // a rejected add leaves nothing behind
        assert_eq!(m.number_rows(), 0);
        assert_eq!(m.row_index("r"), None);
        m.check_consistency().unwrap();

        for (policy, expected) in [(DuplicatePolicy::Overwrite, 3.0), (DuplicatePolicy::Sum, 4.0)] {
            let settings = ModelSettingsBuilder::default()
                .duplicate_policy(policy)
                .build()
                .unwrap();
            let mut m = SparseModel::<f64>::new(settings);
            m.add_column(&[2, 0, 2], &[1.0, 5.0, 3.0], None).unwrap();
            assert_eq!(m.element(2, 0), Some(expected));
            assert_eq!(m.element(0, 0), Some(5.0));
            assert_eq!(m.number_elements(), 2);
            m.check_consistency().unwrap();
        }
    }
}
