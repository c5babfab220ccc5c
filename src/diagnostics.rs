// src/diagnostics.rs

use crate::field::PcaFloat;
use crate::results::VectorFieldPcaResults;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Numerical health metrics of one PCA run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KernelPcaDiagnostics {
    pub k_matrix_dims: Option<(usize, usize)>,
    pub k_matrix_fro_norm: Option<f64>,          // Frobenius norm of raw K
    pub centered_k_fro_norm: Option<f64>,        // Frobenius norm of K0
    pub centered_k_symmetry_error: Option<f64>,  // max |K0[i][j] - K0[j][i]|
    pub centered_k_max_abs_row_sum: Option<f64>, // max_i |sum_j K0[i][j]|
    pub num_negative_raw_eigenvalues: usize,
    // ||I - V0^T K0 V0||_F over the well-conditioned components
    pub feature_space_orthonormality_error: Option<f64>,
    pub notes: String,
}

fn to_f64<T: PcaFloat>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// Computes the Frobenius norm of a matrix in f64.
pub fn compute_frob_norm<T: PcaFloat>(matrix: &ArrayView2<T>) -> f64 {
    if matrix.is_empty() {
        return 0.0;
    }
    matrix.iter().map(|&x| to_f64(x) * to_f64(x)).sum::<f64>().sqrt()
}

/// Largest absolute difference between a square matrix and its transpose.
pub fn compute_symmetry_error<T: PcaFloat>(matrix: &ArrayView2<T>) -> Option<f64> {
    if matrix.nrows() != matrix.ncols() {
        return None;
    }
    let n = matrix.nrows();
    let mut max_err = 0.0f64;
    for i in 0..n {
        for j in (i + 1)..n {
            max_err = max_err.max((to_f64(matrix[[i, j]]) - to_f64(matrix[[j, i]])).abs());
        }
    }
    Some(max_err)
}

/// Largest absolute row sum. Zero for an exactly double-centered matrix.
pub fn compute_max_abs_row_sum<T: PcaFloat>(matrix: &ArrayView2<T>) -> f64 {
    matrix
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&x| to_f64(x)).sum::<f64>().abs())
        .fold(0.0, f64::max)
}

/// Computes orthogonality error ||I - G||_F for a Gram matrix `G`.
pub fn compute_orthogonality_error(gram: &ArrayView2<f64>) -> Option<f64> {
    if gram.nrows() == 0 || gram.nrows() != gram.ncols() {
        return None;
    }
    let identity = Array2::<f64>::eye(gram.nrows());
    let diff = identity - gram;
    Some(compute_frob_norm(&diff.view()))
}

/// Measures how far the loading columns are from orthonormal in the feature
/// space induced by the centered K matrix, i.e. ||I - V0^T K0 V0||_F.
///
/// Components whose eigenvalue is below `relative_cutoff * lambda_max` are
/// skipped: the epsilon guard shrinks their norm on purpose.
pub fn compute_feature_space_orthonormality_error<T: PcaFloat>(
    centered_k: &ArrayView2<T>,
    loadings: &ArrayView2<T>,
    raw_eigen_values: &ArrayView1<T>,
    relative_cutoff: f64,
) -> Option<f64> {
    let lambda_max = raw_eigen_values.iter().map(|&v| to_f64(v)).fold(0.0, f64::max);
    if lambda_max <= 0.0 {
        return None;
    }
    let kept = raw_eigen_values
        .iter()
        .take(loadings.ncols())
        .take_while(|&&v| to_f64(v) > relative_cutoff * lambda_max)
        .count();
    if kept == 0 {
        return None;
    }
    let k0 = centered_k.mapv(to_f64);
    let v0 = loadings.slice(ndarray::s![.., ..kept]).mapv(to_f64);
    let gram = v0.t().dot(&k0).dot(&v0);
    compute_orthogonality_error(&gram.view())
}

impl KernelPcaDiagnostics {
    pub fn from_results<T: PcaFloat>(results: &VectorFieldPcaResults<T>) -> Self {
        let k = results.k_matrix().view();
        let k0 = results.centered_k_matrix().view();
        let raw = results.raw_eigen_values().view();
        let num_negative_raw_eigenvalues = raw.iter().filter(|&&v| v < T::zero()).count();
        let feature_space_orthonormality_error = compute_feature_space_orthonormality_error(
            &k0,
            &results.loadings().view(),
            &raw,
            1e-6,
        );

        let mut notes = Vec::new();
        if num_negative_raw_eigenvalues > 0 {
            let most_negative = raw.iter().map(|&v| to_f64(v)).fold(0.0, f64::min);
            notes.push(format!(
                "{} negative raw eigenvalue(s) reported as zero magnitude (most negative {:e}).",
                num_negative_raw_eigenvalues, most_negative
            ));
        }
        if feature_space_orthonormality_error.is_none() {
            notes.push("No well-conditioned component; orthonormality not measured.".to_string());
        }

        Self {
            k_matrix_dims: Some(k.dim()),
            k_matrix_fro_norm: Some(compute_frob_norm(&k)),
            centered_k_fro_norm: Some(compute_frob_norm(&k0)),
            centered_k_symmetry_error: compute_symmetry_error(&k0),
            centered_k_max_abs_row_sum: Some(compute_max_abs_row_sum(&k0)),
            num_negative_raw_eigenvalues,
            feature_space_orthonormality_error,
            notes: notes.join(" "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn frob_norm_and_symmetry() {
        let m = array![[3.0, 0.0], [4.0, 0.0]];
        assert_abs_diff_eq!(compute_frob_norm(&m.view()), 5.0);
        assert_abs_diff_eq!(compute_symmetry_error(&m.view()).unwrap(), 4.0);
        let rect = array![[1.0, 2.0, 3.0]];
        assert!(compute_symmetry_error(&rect.view()).is_none());
    }

    #[test]
    fn row_sum_of_centered_matrix() {
        let m = array![[1.0, -1.0], [-1.0, 1.0]];
        assert_eq!(compute_max_abs_row_sum(&m.view()), 0.0);
        let m = array![[1.0, 2.0], [-1.0, 0.5]];
        assert_abs_diff_eq!(compute_max_abs_row_sum(&m.view()), 3.0);
    }

    #[test]
    fn orthogonality_error_of_identity_is_zero() {
        let eye = Array2::<f64>::eye(3);
        assert_eq!(compute_orthogonality_error(&eye.view()), Some(0.0));
        assert!(compute_orthogonality_error(&Array2::<f64>::zeros((0, 0)).view()).is_none());
    }

    // K0 has eigenpair (4, [1, -1] / sqrt(2)); the loading is that vector / sqrt(4).
    fn results_with_raw_eigen_values(raw: ndarray::Array1<f64>) -> VectorFieldPcaResults<f64> {
        let l = std::f64::consts::FRAC_1_SQRT_2 / 2.0;
        VectorFieldPcaResults {
            eigen_values: array![1.0],
            raw_eigen_values: raw,
            basis_vectors: vec![array![[0.5, -0.5]]],
            loadings: array![[l], [-l]],
            ave_vector_field: array![[1.0, 1.0]],
            k_matrix: array![[2.0, -2.0], [-2.0, 2.0]],
            centered_k_matrix: array![[2.0, -2.0], [-2.0, 2.0]],
            set_size: 2,
            point_count: 1,
            vector_dim: 2,
        }
    }

    #[test]
    fn notes_report_negative_raw_eigenvalues() {
        let diag = KernelPcaDiagnostics::from_results(&results_with_raw_eigen_values(array![4.0, -1e-12]));
        assert_eq!(diag.num_negative_raw_eigenvalues, 1);
        assert!(diag.notes.contains("1 negative raw eigenvalue(s)"), "{}", diag.notes);
        assert!(diag.notes.contains("-1e-12"), "{}", diag.notes);
        assert_abs_diff_eq!(diag.feature_space_orthonormality_error.unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn notes_are_empty_for_healthy_results() {
        let diag = KernelPcaDiagnostics::from_results(&results_with_raw_eigen_values(array![4.0, 0.0]));
        assert_eq!(diag.num_negative_raw_eigenvalues, 0);
        assert!(diag.notes.is_empty(), "{}", diag.notes);
    }

    #[test]
    fn notes_flag_unmeasured_orthonormality() {
        let diag = KernelPcaDiagnostics::from_results(&results_with_raw_eigen_values(array![0.0, 0.0]));
        assert!(diag.feature_space_orthonormality_error.is_none());
        assert!(diag.notes.contains("orthonormality not measured"), "{}", diag.notes);
    }

    #[test]
    fn feature_space_error_for_exact_decomposition() {
        // K0 = diag(4, 1); eigenvectors e1, e2; loadings scaled by 1/sqrt(lambda).
        let k0 = array![[4.0, 0.0], [0.0, 1.0]];
        let loadings = array![[0.5, 0.0], [0.0, 1.0]];
        let raw = array![4.0, 1.0];
        let err = compute_feature_space_orthonormality_error(&k0.view(), &loadings.view(), &raw.view(), 1e-6);
        assert_abs_diff_eq!(err.unwrap(), 0.0, epsilon = 1e-12);
    }
}
