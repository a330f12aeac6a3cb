#![allow(non_snake_case)]

use sparse_model::{algebra::*, model::*};

// 3 x 3 example
//  A = [1.  3.  5.]
//      [2.  0.  6.]
//      [0.  4.  7.]
fn triplet_data() -> Vec<(usize, usize, f64)> {
    vec![
        (2, 2, 7.0),
        (0, 0, 1.0),
        (1, 2, 6.0),
        (0, 1, 3.0),
        (1, 0, 2.0),
        (2, 1, 4.0),
        (0, 2, 5.0),
    ]
}

fn reference() -> CscMatrix<f64> {
    CscMatrix::new(
        3,
        3,
        vec![0, 2, 4, 7],
        vec![0, 1, 0, 2, 0, 1, 2],
        vec![1., 2., 3., 4., 5., 6., 7.],
    )
}

#[test]
fn test_from_triplets_to_csc() {
    let model = SparseModel::from_triplets(3, 3, &triplet_data(), ModelSettings::default()).unwrap();
    model.check_consistency().unwrap();
    assert_eq!(model.number_elements(), 7);

    let A = model.to_csc().unwrap();
    assert!(A.check_format().is_ok());
    assert_eq!(A, reference());
    assert_eq!(model.element(1, 2), Some(6.0));
    assert_eq!(model.element(2, 0), None);
}

#[test]
fn test_bulk_matches_incremental() {
    for propagate in [true, false] {
        let settings = ModelSettingsBuilder::default()
            .propagate_positions(propagate)
            .build()
            .unwrap();
        let mut model = SparseModel::<f64>::new(settings);
        for (r, c, v) in triplet_data() {
            model.set_element(r, c, v).unwrap();
        }
        model.check_consistency().unwrap();
        assert_eq!(model.to_csc().unwrap(), reference());
    }
}

#[test]
fn test_from_triplets_then_edit() {
    let mut model =
        SparseModel::from_triplets(3, 3, &triplet_data(), ModelSettings::default()).unwrap();
    model.delete_row(1).unwrap();
    model.add_row(&[1], &[8.0], Some("extra")).unwrap();
    model.check_consistency().unwrap();

    let A = model.to_csc().unwrap();
    assert_eq!((A.nrows(), A.ncols()), (4, 3));
    assert_eq!(A.colptr, vec![0, 1, 4, 6]);
    assert_eq!(A.rowval, vec![0, 0, 2, 3, 0, 2]);
    assert_eq!(A.nzval, vec![1., 3., 4., 8., 5., 7.]);
    // the freed slots were reused
    assert_eq!(model.triples().len(), 7);
}

#[test]
fn test_from_triplets_rejects_bad_data() {
    let settings = ModelSettings::default();
    assert_eq!(
        SparseModel::from_triplets(2, 3, &triplet_data(), settings.clone()).err(),
        Some(ModelError::IndexOutOfRange { index: 2, limit: 2 })
    );
    assert_eq!(
        SparseModel::from_triplets(3, 3, &[(0, 1, 1.0), (0, 1, 2.0)], settings).err(),
        Some(ModelError::DuplicateEntry { row: 0, column: 1 })
    );
}

#[test]
fn test_unresolved_string_blocks_export() {
    let mut model = SparseModel::<f64>::new(ModelSettings::default());
    model.add_row(&[0, 1], &[1.0, 2.0], None).unwrap();
    model.set_element_string(0, 1, "a+b").unwrap();
    assert_eq!(
        model.to_csc(),
        Err(ModelError::UnresolvedString { row: 0, column: 1 })
    );
}
