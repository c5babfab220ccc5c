// src/kernel.rs

use crate::error::{Result, VectorFieldPcaError};
use crate::field::{PcaFloat, PointSet};
use ndarray::Array2;

/// Similarity between two points as a function of their squared distance.
///
/// Any `Fn(f64) -> f64` is a kernel function, so a closure can be passed
/// wherever a kernel is expected. Implementations must be pure and should
/// return non-negative weights.
pub trait KernelFunction {
    fn evaluate(&self, squared_distance: f64) -> f64;
}

impl<F> KernelFunction for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, squared_distance: f64) -> f64 {
        self(squared_distance)
    }
}

/// Gaussian kernel on squared distances: `exp(-d^2 / (2 sigma^2))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianDistanceKernel {
    kernel_sigma: f64,
    // -1 / (2 sigma^2)
    factor: f64,
}

impl GaussianDistanceKernel {
    /// Creates a Gaussian kernel of width `kernel_sigma`.
    ///
    /// # Errors
    /// Returns a configuration error if `kernel_sigma` is not finite or not
    /// strictly positive.
    pub fn new(kernel_sigma: f64) -> Result<Self> {
        if !kernel_sigma.is_finite() || kernel_sigma <= 0.0 {
            return Err(VectorFieldPcaError::InvalidKernelSigma(kernel_sigma));
        }
        Ok(Self {
            kernel_sigma,
            factor: -1.0 / (2.0 * kernel_sigma * kernel_sigma),
        })
    }

    pub fn kernel_sigma(&self) -> f64 {
        self.kernel_sigma
    }
}

impl KernelFunction for GaussianDistanceKernel {
    fn evaluate(&self, squared_distance: f64) -> f64 {
        (self.factor * squared_distance).exp()
    }
}

/// Builds the symmetric (P x P) kernel matrix over a point set.
///
/// Only the upper triangle is evaluated; the lower triangle is mirrored so the
/// result is exactly symmetric.
pub fn kernel_matrix<T, K>(points: &dyn PointSet, kernel: &K) -> Array2<T>
where
    T: PcaFloat,
    K: KernelFunction + ?Sized,
{
    let n_points = points.num_points();
    let mut kernel_m = Array2::<T>::zeros((n_points, n_points));
    for a in 0..n_points {
        for b in a..n_points {
            let weight = kernel.evaluate(points.squared_distance(a, b));
            let weight = T::from_f64(weight).unwrap_or_else(T::nan);
            kernel_m[[a, b]] = weight;
            kernel_m[[b, a]] = weight;
        }
    }
    kernel_m
}
