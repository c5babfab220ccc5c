// src/momentum.rs

use crate::field::PcaFloat;
use log::{debug, trace};
use ndarray::{Array2, ArrayView2};
use std::borrow::Cow;

/// Mean field of a sample set and the N x N structural matrix K built from it.
#[derive(Debug, Clone)]
pub struct MomentumMatrix<T> {
    /// Elementwise mean of the samples, shape (P, D).
    pub ave_vector_field: Array2<T>,
    /// Symmetric N x N matrix of (optionally kernel weighted) inner products
    /// between mean-centered samples.
    pub k_matrix: Array2<T>,
}

/// Elementwise mean of a non-empty set of equally shaped fields.
pub fn average_field<T: PcaFloat>(samples: &[Array2<T>]) -> Array2<T> {
    let dim = samples.first().map_or((0, 0), |s| s.dim());
    let mut accum = Array2::<T>::zeros(dim);
    for sample in samples {
        accum += sample;
    }
    let n = T::from_usize(samples.len().max(1)).unwrap_or_else(T::one);
    accum.mapv_inplace(|v| v / n);
    accum
}

/// Flattened inner product over every entry of two equally shaped fields,
/// accumulated in row-major order.
pub fn field_dot<T: PcaFloat>(a: ArrayView2<T>, b: ArrayView2<T>) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// Computes the mean field and the K matrix.
///
/// `K[k][l] = dot(W * (x_l - mean), x_k - mean)` where `W` is the (P x P) kernel
/// matrix when one is given and the identity otherwise. Only the upper triangle
/// is computed; the lower triangle is mirrored.
pub fn compute_momentum_scp<T: PcaFloat>(
    samples: &[Array2<T>],
    kernel_m: Option<&Array2<T>>,
) -> MomentumMatrix<T> {
    let set_size = samples.len();
    let ave_vector_field = average_field(samples);

    let centered: Vec<Array2<T>> = samples.iter().map(|s| s - &ave_vector_field).collect();

    // Kernel weighting only depends on l, so it is applied once per sample.
    let weighted: Vec<Cow<'_, Array2<T>>> = match kernel_m {
        Some(km) => {
            debug!(
                "Applying {}x{} point kernel to {} centered samples.",
                km.nrows(),
                km.ncols(),
                set_size
            );
            centered.iter().map(|c| Cow::Owned(km.dot(c))).collect()
        }
        None => centered.iter().map(Cow::Borrowed).collect(),
    };

    let mut k_matrix = Array2::<T>::zeros((set_size, set_size));
    for k in 0..set_size {
        for l in k..set_size {
            let value = field_dot(weighted[l].view(), centered[k].view());
            k_matrix[[k, l]] = value;
            k_matrix[[l, k]] = value;
        }
        trace!("K row {} computed.", k);
    }

    MomentumMatrix {
        ave_vector_field,
        k_matrix,
    }
}
