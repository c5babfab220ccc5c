// src/basis.rs

use crate::field::PcaFloat;
use log::trace;
use ndarray::{Array1, Array2, ArrayView2};

/// Superposes the samples into `component_count` basis fields.
///
/// Basis field k is `sum_j loadings[j][k] * sample_j`, accumulated as a sequence
/// of scaled adds over the flattened (P x D) arrays in sample order. Each basis
/// field therefore lies in the span of the input samples.
pub fn reconstruct_basis<T: PcaFloat>(
    samples: &[Array2<T>],
    loadings: ArrayView2<T>,
    component_count: usize,
) -> Vec<Array2<T>> {
    let dim = samples.first().map_or((0, 0), |s| s.dim());
    debug_assert!(
        component_count <= loadings.ncols() && samples.len() == loadings.nrows(),
        "loadings {:?} cannot produce {} components from {} samples",
        loadings.dim(),
        component_count,
        samples.len()
    );

    (0..component_count)
        .map(|k| {
            let mut accum = Array2::<T>::zeros(dim);
            for (j, sample) in samples.iter().enumerate() {
                accum.scaled_add(loadings[[j, k]], sample);
            }
            trace!("Basis vector field {} reconstructed from {} samples.", k, samples.len());
            accum
        })
        .collect()
}

/// Converts the leading raw eigenvalues into standard-deviation units:
/// `sqrt(max(lambda, 0) / N)` for each of the first `component_count` values.
pub fn eigenvalues_to_std_units<T: PcaFloat>(
    raw_eigen_values: &Array1<T>,
    component_count: usize,
    set_size: usize,
) -> Array1<T> {
    let n = T::from_usize(set_size.max(1)).unwrap_or_else(T::one);
    raw_eigen_values
        .iter()
        .take(component_count)
        .map(|&lambda| (lambda.max(T::zero()) / n).sqrt())
        .collect()
}
