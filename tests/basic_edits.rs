#![allow(non_snake_case)]

use itertools::Itertools;
use sparse_model::{algebra::*, model::*};

fn settings(propagate: bool) -> ModelSettings {
    ModelSettingsBuilder::default()
        .propagate_positions(propagate)
        .build()
        .unwrap()
}

#[test]
fn test_add_row_to_empty_model() {
    for propagate in [true, false] {
        let mut model = SparseModel::<f64>::new(settings(propagate));
        let r = model.add_row(&[2, 5], &[1.0, 2.0], None).unwrap();
        assert_eq!(r, 0);
        assert_eq!(model.number_rows(), 1);
        assert_eq!(model.number_columns(), 6);
        assert_eq!(model.number_elements(), 2);

        let row = model.row(0).collect_vec();
        assert_eq!(row.len(), 2);
        assert!(row.iter().all(|l| l.on_row() && l.row() == 0));
        assert_eq!((row[0].column(), row[0].value()), (2, Some(1.0)));
        assert_eq!((row[1].column(), row[1].value()), (5, Some(2.0)));

        let col2 = model.column(2).collect_vec();
        assert_eq!(col2.len(), 1);
        assert!(!col2[0].on_row());
        assert_eq!(col2[0].row(), 0);
        assert_eq!(col2[0].position(), row[0].position());
        assert_eq!(model.column(5).count(), 1);
        assert_eq!(model.column(3).count(), 0);

        assert_eq!(
            model.pair_hash().hash(0, 5, model.triples()),
            Some(row[1].position())
        );
        model.check_consistency().unwrap();
    }
}

#[test]
fn test_delete_row_frees_both_views() {
    for propagate in [true, false] {
        let mut model = SparseModel::<f64>::new(settings(propagate));
        model.add_row(&[2, 5], &[1.0, 2.0], None).unwrap();
        let slots = model.row(0).map(|l| l.position()).collect_vec();

        assert_eq!(model.delete_row(0).unwrap(), 2);
        model.check_consistency().unwrap();

        // numbering is kept, the row is just empty
        assert_eq!(model.number_rows(), 1);
        assert_eq!(model.number_elements(), 0);
        assert_eq!(model.row(0).count(), 0);
        assert_eq!(model.column(2).count(), 0);
        assert_eq!(model.column(5).count(), 0);
        assert_eq!(model.element(0, 2), None);
        assert_eq!(model.pair_hash().hash(0, 5, model.triples()), None);

        assert_eq!(model.row_list().free_chain().count(), 2);
        assert_eq!(model.column_list().free_chain().count(), 2);
        for slot in slots {
            assert!(model.triples().is_vacant(slot));
        }

        // the next add reuses the freed slots instead of growing the pool
        model.add_row(&[1, 3], &[3.0, 4.0], None).unwrap();
        assert_eq!(model.triples().len(), 2);
        assert_eq!(model.row_list().first_free(), None);
        assert_eq!(model.column_list().first_free(), None);
        model.check_consistency().unwrap();
    }
}

#[test]
fn test_mixed_rows_and_columns() {
    for propagate in [true, false] {
        let mut model = SparseModel::<f64>::new(settings(propagate));
        assert_eq!(model.add_column(&[0, 1], &[1.0, 2.0], None).unwrap(), 0);
        assert_eq!(model.add_row(&[0, 1], &[3.0, 4.0], None).unwrap(), 2);
        model.check_consistency().unwrap();

        let col0 = model.column(0).map(|l| (l.row(), l.value())).collect_vec();
        assert_eq!(col0, vec![(0, Some(1.0)), (1, Some(2.0)), (2, Some(3.0))]);
        let row2 = model.row(2).map(|l| l.column()).collect_vec();
        assert_eq!(row2, vec![0, 1]);
        assert_eq!(model.row(0).count(), 1);

        let A = model.to_csc().unwrap();
        assert_eq!((A.nrows(), A.ncols()), (3, 2));
        assert_eq!(A.colptr, vec![0, 3, 4]);
        assert_eq!(A.rowval, vec![0, 1, 2, 2]);
        assert_eq!(A.nzval, vec![1.0, 2.0, 3.0, 4.0]);
    }
}

#[test]
fn test_delete_column() {
    for propagate in [true, false] {
        let mut model = SparseModel::<f64>::new(settings(propagate));
        model.add_row(&[0, 1, 2], &[1.0, 2.0, 3.0], None).unwrap();
        model.add_row(&[1, 2], &[4.0, 5.0], None).unwrap();

        assert_eq!(model.delete_column(1).unwrap(), 2);
        model.check_consistency().unwrap();

        assert_eq!(model.number_columns(), 3);
        assert_eq!(model.row(0).map(|l| l.column()).collect_vec(), vec![0, 2]);
        assert_eq!(model.row(1).map(|l| l.column()).collect_vec(), vec![2]);
        assert_eq!(model.element(0, 1), None);
        assert_eq!(model.element(1, 2), Some(5.0));

        assert_eq!(
            model.delete_column(7),
            Err(ModelError::MajorOutOfRange {
                index: 7,
                number_major: 3
            })
        );
    }
}

#[test]
fn test_both_update_paths_agree() {
    let mut a = SparseModel::<f64>::new(settings(true));
    let mut b = SparseModel::<f64>::new(settings(false));

    for model in [&mut a, &mut b] {
        model.add_row(&[0, 3], &[1.0, 2.0], None).unwrap();
        model.add_column(&[0, 2, 4], &[3.0, 4.0, 5.0], None).unwrap();
        model.add_row(&[1, 4], &[6.0, 7.0], None).unwrap();
        model.delete_row(0).unwrap();
        model.set_element(3, 2, 8.0).unwrap();
        model.delete_column(4).unwrap();
        model.add_column(&[1, 3], &[9.0, 10.0], None).unwrap();
        model.check_consistency().unwrap();
    }

    let (A, B) = (a.to_csc().unwrap(), b.to_csc().unwrap());
    assert!(A.check_format().is_ok());
    assert_eq!(A, B);
    assert_eq!(a.number_elements(), b.number_elements());
}

#[test]
fn test_empty_lines() {
    let mut model = SparseModel::<f64>::new(ModelSettings::default());
    assert_eq!(model.add_row(&[], &[], Some("empty")).unwrap(), 0);
    assert_eq!(model.add_column(&[], &[], None).unwrap(), 0);
    assert_eq!(model.number_rows(), 1);
    assert_eq!(model.number_columns(), 1);
    assert_eq!(model.delete_row(0).unwrap(), 0);
    assert_eq!(model.delete_column(0).unwrap(), 0);
    model.check_consistency().unwrap();

    let A = model.to_csc().unwrap();
    assert_eq!(A.nnz(), 0);
    assert_eq!(A.colptr, vec![0, 0]);
}

#[test]
fn test_oversized_column_is_rejected() {
    for propagate in [true, false] {
        let mut model = SparseModel::<f64>::new(settings(propagate));
        model.add_row(&[0], &[1.0], None).unwrap();

        for column in [MAX_COLUMN + 1, usize::MAX] {
            let err = ModelError::IndexOutOfRange {
                index: column,
                limit: MAX_COLUMN + 1,
            };
            assert_eq!(model.add_row(&[column], &[1.0], None), Err(err.clone()));
            assert_eq!(model.set_element(0, column, 1.0).err(), Some(err));
        }
        assert_eq!(
            SparseModel::<f64>::from_triplets(1, MAX_COLUMN + 2, &[], settings(propagate)).err(),
            Some(ModelError::IndexOutOfRange {
                index: MAX_COLUMN + 2,
                limit: MAX_COLUMN + 1
            })
        );

        // both views are untouched
        assert_eq!(model.number_rows(), 1);
        assert_eq!(model.number_columns(), 1);
        assert_eq!(model.number_elements(), 1);
        model.check_consistency().unwrap();
    }
}

#[test]
fn test_bad_input_is_rejected() {
    let mut model = SparseModel::<f64>::new(ModelSettings::default());
    assert_eq!(
        model.add_row(&[0, 1], &[1.0], None),
        Err(ModelError::LengthMismatch {
            indices: 2,
            elements: 1
        })
    );
    assert_eq!(
        model.add_column(&[MAX_ROW + 1], &[1.0], None),
        Err(ModelError::IndexOutOfRange {
            index: MAX_ROW + 1,
            limit: MAX_ROW + 1
        })
    );
    assert_eq!(
        model.delete_row(0),
        Err(ModelError::MajorOutOfRange {
            index: 0,
            number_major: 0
        })
    );
    assert_eq!(model.number_rows(), 0);
    assert_eq!(model.number_columns(), 0);
    model.check_consistency().unwrap();
}
