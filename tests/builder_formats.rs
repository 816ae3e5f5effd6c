//! Construction through the public builder: interchange formats, arrays and
//! the shape errors users see.

use approx::assert_abs_diff_eq;
use linalg_core::{LinalgError, StorageKind, build};

#[test]
fn duplicate_entries_are_summed_in_every_compressed_format() {
    let b = build::<f64>();
    let coo = b
        .sparse_from_coordinate_format(2, 2, &[0, 0, 1], &[1, 1, 0], &[1.0, 2.0, 5.0])
        .unwrap();
    let csr = b
        .sparse_from_compressed_sparse_row_format(2, 2, &[0, 2, 3], &[1, 1, 0], &[1.0, 2.0, 5.0])
        .unwrap();
    let csc = b
        .sparse_from_compressed_sparse_column_format(2, 2, &[1, 0, 0], &[0, 1, 3], &[5.0, 1.0, 2.0])
        .unwrap();
    for m in [&coo, &csr, &csc] {
        assert_eq!(m.kind(), StorageKind::Sparse);
        assert_eq!(m.at(0, 1).unwrap(), 3.0);
        assert_eq!(m.at(1, 0).unwrap(), 5.0);
        assert_eq!(m.at(0, 0).unwrap(), 0.0);
    }
    assert_eq!(coo, csr);
    assert_eq!(csr, csc);
}

#[test]
fn malformed_compressed_input_is_rejected() {
    let b = build::<f64>();
    assert!(b.sparse_from_coordinate_format(2, 2, &[0, 2], &[0, 0], &[1.0, 1.0]).is_err());
    assert!(b.sparse_from_coordinate_format(2, 2, &[0], &[0, 1], &[1.0]).is_err());
    assert!(b.sparse_from_compressed_sparse_row_format(2, 2, &[0, 1], &[0], &[1.0]).is_err());
}

#[test]
fn indexed_construction_differs_on_duplicates() {
    let b = build::<f64>();
    let entries = [(0, 0, 1.0), (0, 0, 4.0), (1, 1, 2.0)];
    let dense = b.dense_of_indexed(2, 2, entries).unwrap();
    let sparse = b.sparse_of_indexed(2, 2, entries).unwrap();
    assert_eq!(dense.at(0, 0).unwrap(), 4.0);
    assert_eq!(sparse.at(0, 0).unwrap(), 5.0);
    assert_eq!(dense.at(1, 1).unwrap(), sparse.at(1, 1).unwrap());
    assert!(matches!(
        b.dense_of_indexed(2, 2, [(2, 0, 1.0)]),
        Err(LinalgError::IndexOutOfRange { .. })
    ));
}

#[test]
fn ragged_rows_are_invalid() {
    let b = build::<f64>();
    let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(matches!(
        b.dense_of_row_arrays(&rows),
        Err(LinalgError::InvalidArgument { .. })
    ));
}

#[test]
fn scalar_division_of_a_scaled_identity() {
    let b = build::<f64>();
    let two = b.dense_of_array(&[[2.0, 0.0], [0.0, 2.0]]);
    assert_eq!(two.divide_scalar(2.0).unwrap(), b.dense_identity(2));
    assert!(matches!(two.divide_scalar(0.0), Err(LinalgError::DivideByZero)));
}

#[test]
fn shape_mismatch_message_names_both_shapes() {
    let b = build::<f64>();
    let left = b.dense(2, 3);
    let right = b.dense(3, 2);
    let err = left.add(&right).unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch { .. }));
    let message = err.to_string();
    assert!(message.contains("2x3"), "{message}");
    assert!(message.contains("3x2"), "{message}");
}

#[test]
fn representations_follow_the_operands() {
    let b = build::<f64>();
    let d = b.diagonal_of_diagonal_array(3, 3, vec![1.0, 2.0, 3.0]).unwrap();
    let s = b.sparse_identity(3);
    assert_eq!(b.same_as(&d, &d, 3, 3).kind(), StorageKind::Diagonal);
    assert_eq!(b.same_as(&d, &s, 3, 3).kind(), StorageKind::Sparse);
    assert_eq!(d.multiply(&s).unwrap().to_column_major(), d.to_column_major());

    let product = d.multiply(&b.dense_filled(3, 2, 1.0)).unwrap();
    assert_eq!(product.kind(), StorageKind::Dense);
    assert_abs_diff_eq!(product.at(2, 1).unwrap(), 3.0);
}
