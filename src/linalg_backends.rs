// src/linalg_backends.rs

use ndarray::{Array1, Array2};
use std::error::Error;
use std::marker::PhantomData;

/// A thread-safe wrapper for standard dynamic errors,
/// so they implement `Send` and `Sync`.
pub type ThreadSafeStdError = Box<dyn Error + Send + Sync + 'static>;

/// Output of a symmetric eigendecomposition.
#[derive(Debug)]
pub struct EighOutput<F: 'static> {
    /// Eigenvalues, sorted in ascending order.
    pub eigenvalues: Array1<F>,
    /// Eigenvectors as columns of the matrix.
    /// eigenvector_matrix.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<F>,
}

/// Trait for symmetric eigendecomposition (similar to LAPACK's DSYEVR or DSYEVD).
///
/// Implementers may read only the upper triangle of `matrix`. The contract the
/// PCA solver relies on: eigenvalues ascending, orthonormal eigenvector columns,
/// and column `i` paired with eigenvalue `i`.
pub trait BackendEigh<F: 'static + Copy + Send + Sync> {
    fn eigh_upper(&self, matrix: &Array2<F>) -> Result<EighOutput<F>, ThreadSafeStdError>;
}

impl<F, B> BackendEigh<F> for &B
where
    F: 'static + Copy + Send + Sync,
    B: BackendEigh<F> + ?Sized,
{
    fn eigh_upper(&self, matrix: &Array2<F>) -> Result<EighOutput<F>, ThreadSafeStdError> {
        (**self).eigh_upper(matrix)
    }
}

// --- NdarrayLinAlgBackend (ndarray-linalg / LAPACK) ---
use ndarray_linalg::{Eigh as NdLinalgEigh, UPLO};

#[derive(Debug, Default, Copy, Clone)]
pub struct NdarrayLinAlgBackend;

fn to_dyn_error<E: Error + Send + Sync + 'static>(e: E) -> ThreadSafeStdError {
    Box::new(e)
}

impl BackendEigh<f64> for NdarrayLinAlgBackend {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput<f64>, ThreadSafeStdError> {
        if matrix.is_empty() {
            return Ok(EighOutput { eigenvalues: Array1::zeros(0), eigenvectors: Array2::zeros((0, 0)) });
        }
        let (eigenvalues, eigenvectors) = matrix.eigh(UPLO::Upper).map_err(to_dyn_error)?;
        Ok(EighOutput { eigenvalues, eigenvectors })
    }
}

impl BackendEigh<f32> for NdarrayLinAlgBackend {
    fn eigh_upper(&self, matrix: &Array2<f32>) -> Result<EighOutput<f32>, ThreadSafeStdError> {
        if matrix.is_empty() {
            return Ok(EighOutput { eigenvalues: Array1::zeros(0), eigenvectors: Array2::zeros((0, 0)) });
        }
        let (eigenvalues, eigenvectors) = matrix.eigh(UPLO::Upper).map_err(to_dyn_error)?;
        Ok(EighOutput { eigenvalues, eigenvectors })
    }
}

// --- FaerLinAlgBackend (pure Rust) ---
#[cfg(feature = "backend_faer")]
mod faer_specific_code {
    use super::{BackendEigh, EighOutput, ThreadSafeStdError};
    use faer::{Mat, Side};
    use ndarray::{Array1, Array2};

    fn to_dyn_error_faer(msg: String) -> ThreadSafeStdError {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, msg))
    }

    #[derive(Debug, Default, Copy, Clone)]
    pub struct FaerLinAlgBackend;

    macro_rules! impl_faer_eigh {
        ($t:ty) => {
            impl BackendEigh<$t> for FaerLinAlgBackend {
                fn eigh_upper(&self, matrix: &Array2<$t>) -> Result<EighOutput<$t>, ThreadSafeStdError> {
                    let (nrows, ncols) = matrix.dim();
                    if nrows != ncols {
                        return Err(to_dyn_error_faer(format!(
                            "Matrix must be square for eigendecomposition, got {}x{}.",
                            nrows, ncols
                        )));
                    }
                    if matrix.is_empty() {
                        return Ok(EighOutput { eigenvalues: Array1::zeros(0), eigenvectors: Array2::zeros((0, 0)) });
                    }
                    // Copying handles any ndarray memory layout.
                    let faer_mat = Mat::<$t>::from_fn(nrows, ncols, |i, j| matrix[[i, j]]);
                    let eig = faer_mat
                        .as_ref()
                        .self_adjoint_eigen(Side::Upper)
                        .map_err(|e| to_dyn_error_faer(format!("Faer self-adjoint eigendecomposition failed: {:?}", e)))?;
                    let diag = eig.S();
                    let basis = eig.U();
                    let eigenvalues = Array1::from_shape_fn(nrows, |i| diag[i]);
                    let eigenvectors = Array2::from_shape_fn((nrows, nrows), |(i, j)| basis[(i, j)]);
                    Ok(EighOutput { eigenvalues, eigenvectors })
                }
            }
        };
    }

    impl_faer_eigh!(f64);
    impl_faer_eigh!(f32);
}

#[cfg(feature = "backend_faer")]
pub use faer_specific_code::FaerLinAlgBackend;

// --- LinAlgBackendProvider Dispatch ---

/// A provider struct that dispatches to the selected linear algebra backend
/// based on compile-time feature flags.
#[derive(Debug, Default, Copy, Clone)]
pub struct LinAlgBackendProvider<F: 'static + Copy + Send + Sync> {
    _phantom: PhantomData<F>,
}

impl<F: 'static + Copy + Send + Sync> LinAlgBackendProvider<F> {
    pub fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

#[cfg(not(feature = "backend_faer"))]
impl<F> BackendEigh<F> for LinAlgBackendProvider<F>
where
    F: 'static + Copy + Send + Sync,
    NdarrayLinAlgBackend: BackendEigh<F>,
{
    fn eigh_upper(&self, matrix: &Array2<F>) -> Result<EighOutput<F>, ThreadSafeStdError> {
        NdarrayLinAlgBackend.eigh_upper(matrix)
    }
}

#[cfg(feature = "backend_faer")]
impl<F> BackendEigh<F> for LinAlgBackendProvider<F>
where
    F: 'static + Copy + Send + Sync,
    faer_specific_code::FaerLinAlgBackend: BackendEigh<F>,
{
    fn eigh_upper(&self, matrix: &Array2<F>) -> Result<EighOutput<F>, ThreadSafeStdError> {
        faer_specific_code::FaerLinAlgBackend.eigh_upper(matrix)
    }
}
