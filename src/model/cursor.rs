use crate::model::{ChainIter, LinkedList, Orientation, Payload, SlotId, TriplePool};

/// Snapshot of one position while walking a row or a column.
///
/// A `ModelLink` is a read projection only; it holds no reference into the
/// model and stays valid as a value after the model changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelLink<T = f64> {
    row: usize,
    column: usize,
    payload: Payload<T>,
    position: SlotId,
    on_row: bool,
}

impl<T: Copy> ModelLink<T> {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// numeric value, `None` if the entry holds a string
    pub fn value(&self) -> Option<T> {
        self.payload.value()
    }

    pub fn payload(&self) -> Payload<T> {
        self.payload
    }

    /// pool slot of the entry
    pub fn position(&self) -> SlotId {
        self.position
    }

    /// true if produced by walking a row
    pub fn on_row(&self) -> bool {
        self.on_row
    }
}

/// Walks one chain of a [`LinkedList`], yielding a [`ModelLink`] per entry.
#[derive(Debug, Clone)]
pub struct ChainCursor<'a, T> {
    slots: ChainIter<'a>,
    triples: &'a TriplePool<T>,
    on_row: bool,
}

impl<'a, T: Copy> ChainCursor<'a, T> {
    pub fn new(list: &'a LinkedList, which: usize, triples: &'a TriplePool<T>) -> Self {
        ChainCursor {
            slots: list.chain(which),
            triples,
            on_row: list.orientation() == Orientation::Row,
        }
    }
}

impl<T: Copy> Iterator for ChainCursor<'_, T> {
    type Item = ModelLink<T>;

    fn next(&mut self) -> Option<ModelLink<T>> {
        let position = self.slots.next()?;
        // a vacant member means the views are out of step; stop there
        let t = self.triples.get(position)?;
        Some(ModelLink {
            row: t.row,
            column: t.column,
            payload: t.payload,
            position,
            on_row: self.on_row,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PairHash;

    #[test]
    fn cursor_reports_both_orientations() {
        let mut triples = TriplePool::new();
        let mut hash = PairHash::new();
        let mut rows = LinkedList::new(Orientation::Row);
        let mut columns = LinkedList::new(Orientation::Column);

        let first = rows
            .add_easy(1, &[0, 3], &[1.5, -2.0], &mut triples, &mut hash)
            .unwrap();
        columns.add_hard_propagated(first, &triples, &rows).unwrap();

        let row = ChainCursor::new(&rows, 1, &triples).collect::<Vec<_>>();
        assert_eq!(row.len(), 2);
        assert!(row.iter().all(|l| l.on_row() && l.row() == 1));
        assert_eq!(row[0].column(), 0);
        assert_eq!(row[0].value(), Some(1.5));
        assert_eq!(row[1].column(), 3);
        assert_eq!(row[1].position(), SlotId::new(1));

        let column = ChainCursor::new(&columns, 3, &triples).collect::<Vec<_>>();
        assert_eq!(column.len(), 1);
        assert!(!column[0].on_row());
        assert_eq!(column[0].row(), 1);
        assert_eq!(column[0].value(), Some(-2.0));
        assert_eq!(column[0].payload(), Payload::Value(-2.0));

        assert_eq!(ChainCursor::new(&columns, 9, &triples).count(), 0);
    }
}
