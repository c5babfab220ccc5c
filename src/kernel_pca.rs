// src/kernel_pca.rs

use crate::error::{Result, VectorFieldPcaError};
use crate::field::PcaFloat;
use crate::linalg_backends::BackendEigh;
use log::{debug, trace, warn};
use ndarray::{s, Array1, Array2, Axis};

/// Default guard added to eigenvalues before taking `1 / sqrt(lambda)`.
pub const DEFAULT_EIGENVALUE_EPSILON: f64 = 1.0e-10;

/// Eigen-decomposition of the double-centered K matrix.
#[derive(Debug, Clone)]
pub struct KernelPcaDecomposition<T> {
    /// K after double centering (K0).
    pub centered_k: Array2<T>,
    /// All N eigenvalues of K0, largest first.
    pub eigen_values: Array1<T>,
    /// N x N loading matrix V0: column k is the k-th eigenvector (same order as
    /// `eigen_values`) scaled by `1 / sqrt(lambda_k + epsilon)`.
    pub loadings: Array2<T>,
}

fn mean_of<T: PcaFloat>(values: impl Iterator<Item = T>, count: usize) -> T {
    let n = T::from_usize(count.max(1)).unwrap_or_else(T::one);
    values.fold(T::zero(), |acc, v| acc + v) / n
}

/// Double-centers a square matrix.
///
/// Two passes: the grand mean (mean of the row means) is subtracted from every
/// entry, then `rowMean[k] + rowMean[l]` is subtracted from entry (k, l). For a
/// K built from mean-centered samples the row means are zero up to round-off.
pub fn double_center<T: PcaFloat>(k_matrix: &Array2<T>) -> Array2<T> {
    let n = k_matrix.nrows();
    let row_means: Array1<T> = k_matrix
        .axis_iter(Axis(0))
        .map(|row| mean_of(row.iter().copied(), n))
        .collect();
    let mean_of_means = mean_of(row_means.iter().copied(), n);

    let mut k0 = k_matrix.mapv(|v| v - mean_of_means);
    for ((k, l), value) in k0.indexed_iter_mut() {
        *value -= row_means[k] + row_means[l];
    }
    k0
}

/// Runs kernel PCA on a symmetric N x N K matrix.
///
/// The backend's ascending eigen-pairs are flipped to descending order, and each
/// eigenvector column is rescaled by `1 / sqrt(lambda + epsilon)` so that
/// weighting the original samples by a column yields a unit-norm direction in the
/// induced feature space. Eigenvalues at or below `-epsilon` are scaled by
/// `1 / sqrt(epsilon)` instead (machine epsilon when `epsilon` is zero).
///
/// # Errors
/// `NumericalFailure` if K holds non-finite values, the backend fails, or the
/// backend returns a decomposition of the wrong shape or with non-finite
/// eigenvalues.
pub fn kernel_pca<T, B>(
    k_matrix: &Array2<T>,
    backend: &B,
    eigenvalue_epsilon: T,
) -> Result<KernelPcaDecomposition<T>>
where
    T: PcaFloat,
    B: BackendEigh<T> + ?Sized,
{
    let n = k_matrix.nrows();
    if k_matrix.iter().any(|v| !v.is_finite()) {
        return Err(VectorFieldPcaError::NumericalFailure(
            "K matrix contains non-finite (NaN or infinite) entries.".to_string(),
        ));
    }

    let centered_k = double_center(k_matrix);

    let eig = backend.eigh_upper(&centered_k).map_err(|e| {
        VectorFieldPcaError::NumericalFailure(format!(
            "Eigen decomposition of the centered {}x{} K matrix failed: {}",
            n, n, e
        ))
    })?;
    if eig.eigenvalues.len() != n || eig.eigenvectors.dim() != (n, n) {
        return Err(VectorFieldPcaError::NumericalFailure(format!(
            "Eigensolver returned {} eigenvalues and a {:?} eigenvector matrix for a {}x{} input.",
            eig.eigenvalues.len(),
            eig.eigenvectors.dim(),
            n,
            n
        )));
    }
    if eig.eigenvalues.iter().any(|v| !v.is_finite()) {
        return Err(VectorFieldPcaError::NumericalFailure(
            "Eigensolver returned non-finite eigenvalues.".to_string(),
        ));
    }

    // Eigenvalues come out ascending; reverse them and the eigenvector columns.
    let eigen_values = eig.eigenvalues.slice(s![..;-1]).to_owned();
    let mut loadings = eig.eigenvectors.slice(s![.., ..;-1]).to_owned();

    let largest = eigen_values.iter().fold(T::zero(), |acc, v| acc.max(v.abs()));
    // Stands in for lambda + epsilon when that sum is not positive.
    let floor = if eigenvalue_epsilon > T::zero() {
        eigenvalue_epsilon
    } else {
        T::epsilon()
    };
    let mut floored = 0usize;
    for (k, (mut column, &lambda)) in loadings
        .axis_iter_mut(Axis(1))
        .zip(eigen_values.iter())
        .enumerate()
    {
        let mut guarded = lambda + eigenvalue_epsilon;
        if guarded <= T::zero() {
            floored += 1;
            guarded = floor;
        }
        let scale = T::one() / guarded.sqrt();
        column.mapv_inplace(|v| v * scale);
        trace!("Component {}: eigenvalue {}, loading scale {}.", k, lambda, scale);
    }

    let negative = eigen_values.iter().filter(|&&v| v < T::zero()).count();
    if negative > 0 {
        let most_negative = eigen_values.iter().fold(T::zero(), |acc, &v| acc.min(v));
        let tolerance = T::from_f64(1e-8).unwrap_or_else(T::epsilon) * largest.max(T::one());
        if -most_negative > tolerance {
            warn!(
                "{} negative eigenvalue(s) of the centered K matrix (most negative {}), {} below -epsilon; K may not be positive semi-definite.",
                negative, most_negative, floored
            );
        } else {
            debug!(
                "{} round-off negative eigenvalue(s), {} below -epsilon.",
                negative, floored
            );
        }
    }

    Ok(KernelPcaDecomposition {
        centered_k,
        eigen_values,
        loadings,
    })
}
