use super::*;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn test_cosine_identical_vectors() {
    let v = vec![0.3, -0.2, 0.9];
    assert!(approx_eq(cosine_similarity(&v, &v), 1.0));
}

#[test]
fn test_cosine_opposite_vectors() {
    let a = vec![1.0, 2.0, 3.0];
    let b: Vec<f32> = a.iter().map(|x| -x).collect();
    assert!(approx_eq(cosine_similarity(&a, &b), -1.0));
}

#[test]
fn test_cosine_orthogonal_vectors() {
    assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
}

#[test]
fn test_cosine_is_scale_invariant() {
    let a = vec![1.0, 2.0, 2.0];
    let b = vec![10.0, 20.0, 20.0];
    assert!(approx_eq(cosine_similarity(&a, &b), 1.0));
}

#[test]
fn test_cosine_degenerate_inputs() {
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
}

#[test]
fn test_matrix_shape_and_values() {
    let queries = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
    let contents = vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, -1.0]];
    let matrix = SimilarityMatrix::compute(&queries, &contents);

    assert_eq!(matrix.rows(), 2);
    assert_eq!(matrix.cols(), 3);
    assert!(!matrix.is_empty());

    let first = matrix.row(0).expect("row 0");
    assert!(approx_eq(first[0], 1.0));
    assert!(approx_eq(first[1], std::f32::consts::FRAC_1_SQRT_2));
    assert!(approx_eq(first[2], 0.0));

    assert!(approx_eq(matrix.get(1, 2).expect("cell"), -1.0));
    assert!(matrix.row(2).is_none());
    assert!(matrix.get(0, 3).is_none());
}

#[test]
fn test_matrix_values_in_range() {
    let queries = vec![vec![0.5, -1.5, 2.0], vec![3.0, 0.1, -0.4]];
    let contents = vec![vec![-2.0, 1.0, 0.3], vec![0.0, 0.0, 0.0], vec![9.0, 9.0, 9.0]];
    let matrix = SimilarityMatrix::compute(&queries, &contents);
    for row in matrix.iter_rows() {
        assert_eq!(row.len(), 3);
        assert!(row.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
    assert_eq!(matrix.iter_rows().count(), 2);
}

#[test]
fn test_matrix_empty_inputs() {
    let v = vec![vec![1.0, 0.0]];
    assert!(SimilarityMatrix::compute(&[], &v).is_empty());
    assert!(SimilarityMatrix::compute(&v, &[]).is_empty());
    let empty = SimilarityMatrix::compute(&[], &[]);
    assert_eq!(empty.rows(), 0);
    assert_eq!(empty.iter_rows().count(), 0);
}

#[test]
fn test_top_k_orders_and_filters() {
    let row = [0.05, 0.8, 0.3, 0.9, 0.1];
    assert_eq!(top_k(&row, 3, 0.1), vec![(3, 0.9), (1, 0.8), (2, 0.3)]);
}

#[test]
fn test_top_k_threshold_is_exclusive() {
    let row = [0.1, 0.1, 0.2];
    assert_eq!(top_k(&row, 3, 0.1), vec![(2, 0.2)]);
}

#[test]
fn test_top_k_ties_prefer_lower_index() {
    let row = [0.5, 0.7, 0.5, 0.7, 0.5];
    assert_eq!(top_k(&row, 3, 0.0), vec![(1, 0.7), (3, 0.7), (0, 0.5)]);
}

#[test]
fn test_top_k_fewer_than_k() {
    assert_eq!(top_k(&[0.9], 3, 0.1), vec![(0, 0.9)]);
    assert!(top_k(&[], 3, 0.1).is_empty());
    assert!(top_k(&[0.9, 0.8], 0, 0.1).is_empty());
}

#[test]
fn test_argmax_first_maximum() {
    assert_eq!(argmax(&[0.2, 0.9, 0.4, 0.9]), Some(1));
    assert_eq!(argmax(&[-0.5, -0.1, -0.3]), Some(1));
    assert_eq!(argmax(&[]), None);
}

#[test]
fn test_row_max() {
    assert!(approx_eq(row_max(&[0.2, 0.75, 0.4]), 0.75));
    assert_eq!(row_max(&[]), 0.0);
}
