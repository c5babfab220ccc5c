// Principal components of vector field sets

use crate::basis::{eigenvalues_to_std_units, reconstruct_basis};
use crate::diagnostics::KernelPcaDiagnostics;
use crate::error::{Result, VectorFieldPcaError};
use crate::field::{cast_field, PcaFloat, PointSet, VectorField};
use crate::kernel::{kernel_matrix, KernelFunction};
use crate::kernel_pca::{kernel_pca, DEFAULT_EIGENVALUE_EPSILON};
use crate::linalg_backends::{BackendEigh, LinAlgBackendProvider};
use crate::momentum::compute_momentum_scp;
use crate::results::VectorFieldPcaResults;
use crate::validation::validate_inputs;
use log::{debug, info};
use ndarray::{s, Array1, Array2};
use num_traits::AsPrimitive;
use std::fmt;
use std::time::Instant;

/// Lifecycle of a [`VectorFieldPCA`] calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcaState {
    /// No vector field set supplied yet.
    Uninitialized,
    /// Inputs supplied; no successful computation since the last change.
    Configured,
    /// The last `compute` succeeded and its results are available.
    Computed,
    /// The last `compute` failed; no results are available.
    Failed,
}

/// (Kernel) principal component analysis of a set of vector fields.
///
/// The calculator borrows the caller's samples, point set and kernel for its
/// lifetime `'a` and never mutates them. Samples are stored as `S` and the
/// computation runs in `T`. Eigen-decomposition is delegated to `B`.
///
/// Without a kernel function this is standard PCA of the samples, computed
/// through the N x N Gram matrix of the mean-centered samples. With a kernel,
/// the inner products are weighted by the P x P point similarity matrix.
///
/// # Examples
///
/// ```no_run
/// use ndarray::array;
/// use vector_field_pca::VectorFieldPCA;
///
/// let fields = vec![array![[1.0]], array![[2.0]], array![[3.0]]];
/// let mut pca: VectorFieldPCA<f64> = VectorFieldPCA::new();
/// pca.set_vector_field_set(&fields);
/// pca.set_component_count(1);
/// pca.compute().unwrap();
/// assert_eq!(pca.basis_vectors().unwrap().len(), 1);
/// ```
pub struct VectorFieldPCA<'a, S, T = f64, B = LinAlgBackendProvider<T>>
where
    T: PcaFloat,
{
    vector_field_set: Option<&'a [VectorField<S>]>,
    point_set: Option<&'a dyn PointSet>,
    kernel_function: Option<Box<dyn KernelFunction + 'a>>,
    component_count: usize,
    eigenvalue_epsilon: f64,
    backend: B,
    state: PcaState,
    results: Option<VectorFieldPcaResults<T>>,
}

impl<'a, S, T: PcaFloat> VectorFieldPCA<'a, S, T, LinAlgBackendProvider<T>> {
    /// Creates a calculator using the backend selected by cargo features.
    pub fn new() -> Self {
        Self::with_backend(LinAlgBackendProvider::new())
    }
}

impl<'a, S, T: PcaFloat> Default for VectorFieldPCA<'a, S, T, LinAlgBackendProvider<T>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S, T: PcaFloat, B> VectorFieldPCA<'a, S, T, B> {
    /// Creates a calculator that solves its eigenproblem with `backend`.
    pub fn with_backend(backend: B) -> Self {
        Self {
            vector_field_set: None,
            point_set: None,
            kernel_function: None,
            component_count: 0,
            eigenvalue_epsilon: DEFAULT_EIGENVALUE_EPSILON,
            backend,
            state: PcaState::Uninitialized,
            results: None,
        }
    }

    fn invalidate(&mut self) {
        self.results = None;
        self.state = if self.vector_field_set.is_some() {
            PcaState::Configured
        } else {
            PcaState::Uninitialized
        };
    }

    pub fn set_vector_field_set(&mut self, fields: &'a [VectorField<S>]) {
        self.vector_field_set = Some(fields);
        self.invalidate();
    }

    /// Sets the points the vector fields are sampled on. Only used together
    /// with a kernel function.
    pub fn set_point_set(&mut self, points: &'a dyn PointSet) {
        self.point_set = Some(points);
        self.invalidate();
    }

    pub fn clear_point_set(&mut self) {
        self.point_set = None;
        self.invalidate();
    }

    /// Switches to kernel PCA with the given point similarity function.
    pub fn set_kernel_function<K: KernelFunction + 'a>(&mut self, kernel: K) {
        self.kernel_function = Some(Box::new(kernel));
        self.invalidate();
    }

    /// Switches back to standard PCA.
    pub fn clear_kernel_function(&mut self) {
        self.kernel_function = None;
        self.invalidate();
    }

    /// Number of leading components to reconstruct; must be in `1..=N`.
    pub fn set_component_count(&mut self, component_count: usize) {
        self.component_count = component_count;
        self.invalidate();
    }

    /// Guard added to eigenvalues before the `1 / sqrt(lambda)` scaling.
    /// Defaults to `1.0e-10`.
    pub fn set_eigenvalue_epsilon(&mut self, eigenvalue_epsilon: f64) {
        self.eigenvalue_epsilon = eigenvalue_epsilon;
        self.invalidate();
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn eigenvalue_epsilon(&self) -> f64 {
        self.eigenvalue_epsilon
    }

    pub fn state(&self) -> PcaState {
        self.state
    }

    pub fn is_calculated(&self) -> bool {
        self.state == PcaState::Computed
    }

    pub fn has_kernel_function(&self) -> bool {
        self.kernel_function.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Results of the last successful computation.
    pub fn results(&self) -> Option<&VectorFieldPcaResults<T>> {
        self.results.as_ref()
    }

    /// Consumes the calculator, returning the last successful results.
    pub fn into_results(self) -> Option<VectorFieldPcaResults<T>> {
        self.results
    }

    /// Basis vector fields, largest eigenvalue first. Each has the shape of
    /// the input samples.
    pub fn basis_vectors(&self) -> Option<&[Array2<T>]> {
        self.results.as_ref().map(|r| r.basis_vectors())
    }

    /// Per-component magnitudes `sqrt(lambda_k / N)`, in the units of the
    /// input vector fields, largest first.
    pub fn pca_eigen_values(&self) -> Option<&Array1<T>> {
        self.results.as_ref().map(|r| r.eigen_values())
    }

    pub fn ave_vector_field(&self) -> Option<&Array2<T>> {
        self.results.as_ref().map(|r| r.ave_vector_field())
    }

    /// The raw N x N K matrix, before double centering.
    pub fn k_matrix(&self) -> Option<&Array2<T>> {
        self.results.as_ref().map(|r| r.k_matrix())
    }

    pub fn centered_k_matrix(&self) -> Option<&Array2<T>> {
        self.results.as_ref().map(|r| r.centered_k_matrix())
    }

    pub fn diagnostics(&self) -> Option<KernelPcaDiagnostics> {
        self.results.as_ref().map(KernelPcaDiagnostics::from_results)
    }
}

impl<'a, S, T, B> VectorFieldPCA<'a, S, T, B>
where
    S: AsPrimitive<T>,
    T: PcaFloat,
    B: BackendEigh<T>,
{
    /// Computes the principal components.
    ///
    /// On success every derived quantity is replaced and the state becomes
    /// [`PcaState::Computed`]. On failure no results remain available and the
    /// state becomes [`PcaState::Failed`].
    ///
    /// # Errors
    /// Configuration errors (missing field set or point set, component count
    /// outside `1..=N`, bad epsilon), shape mismatches between samples or
    /// between samples and the point set, and numerical failures of the
    /// eigensolver.
    pub fn compute(&mut self) -> Result<()> {
        self.results = None;
        let outcome = run_pipeline(
            self.vector_field_set,
            self.component_count,
            self.point_set,
            self.kernel_function.as_deref(),
            &self.backend,
            self.eigenvalue_epsilon,
        );
        match outcome {
            Ok(results) => {
                self.results = Some(results);
                self.state = PcaState::Computed;
                Ok(())
            }
            Err(e) => {
                debug!("Vector field PCA failed: {}", e);
                self.state = PcaState::Failed;
                Err(e)
            }
        }
    }
}

/// Runs the whole pipeline once and returns a fresh result set.
///
/// Stateless counterpart of [`VectorFieldPCA::compute`].
pub fn compute_vector_field_pca<S, T, B>(
    fields: &[VectorField<S>],
    component_count: usize,
    points: Option<&dyn PointSet>,
    kernel: Option<&dyn KernelFunction>,
    backend: &B,
    eigenvalue_epsilon: f64,
) -> Result<VectorFieldPcaResults<T>>
where
    S: AsPrimitive<T>,
    T: PcaFloat,
    B: BackendEigh<T> + ?Sized,
{
    run_pipeline(
        Some(fields),
        component_count,
        points,
        kernel,
        backend,
        eigenvalue_epsilon,
    )
}

fn run_pipeline<S, T, B>(
    fields: Option<&[VectorField<S>]>,
    component_count: usize,
    points: Option<&dyn PointSet>,
    kernel: Option<&dyn KernelFunction>,
    backend: &B,
    eigenvalue_epsilon: f64,
) -> Result<VectorFieldPcaResults<T>>
where
    S: AsPrimitive<T>,
    T: PcaFloat,
    B: BackendEigh<T> + ?Sized,
{
    let pipeline_start_time = Instant::now();
    let shape = validate_inputs(fields, component_count, points, kernel.is_some())?;
    let fields = fields.unwrap_or(&[]);

    let epsilon = match T::from_f64(eigenvalue_epsilon) {
        Some(eps) if eigenvalue_epsilon.is_finite() && eigenvalue_epsilon >= 0.0 => eps,
        _ => return Err(VectorFieldPcaError::InvalidEigenvalueEpsilon(eigenvalue_epsilon)),
    };

    let samples: Vec<Array2<T>> = fields.iter().map(cast_field).collect();

    let kernel_m = match (kernel, points) {
        (Some(kernel), Some(points)) => {
            let kernel_start_time = Instant::now();
            let km: Array2<T> = kernel_matrix(points, kernel);
            info!(
                "Built {}x{} point kernel matrix in {:?}",
                km.nrows(),
                km.ncols(),
                kernel_start_time.elapsed()
            );
            Some(km)
        }
        _ => None,
    };

    let momentum_start_time = Instant::now();
    let momentum = compute_momentum_scp(&samples, kernel_m.as_ref());
    info!(
        "Computed {}x{} K matrix in {:?}",
        shape.set_size,
        shape.set_size,
        momentum_start_time.elapsed()
    );

    let eigen_start_time = Instant::now();
    let decomposition = kernel_pca(&momentum.k_matrix, backend, epsilon)?;
    info!(
        "Double-centered and decomposed K matrix in {:?}",
        eigen_start_time.elapsed()
    );

    let loadings = decomposition
        .loadings
        .slice(s![.., ..component_count])
        .to_owned();
    let basis_vectors = reconstruct_basis(&samples, loadings.view(), component_count);
    let eigen_values =
        eigenvalues_to_std_units(&decomposition.eigen_values, component_count, shape.set_size);

    info!(
        "Computed {} basis vector fields of shape {}x{} from {} samples in {:?}",
        component_count,
        shape.point_count,
        shape.vector_dim,
        shape.set_size,
        pipeline_start_time.elapsed()
    );

    Ok(VectorFieldPcaResults {
        eigen_values,
        raw_eigen_values: decomposition.eigen_values,
        basis_vectors,
        loadings,
        ave_vector_field: momentum.ave_vector_field,
        k_matrix: momentum.k_matrix,
        centered_k_matrix: decomposition.centered_k,
        set_size: shape.set_size,
        point_count: shape.point_count,
        vector_dim: shape.vector_dim,
    })
}

impl<S, T: PcaFloat, B> fmt::Display for VectorFieldPCA<'_, S, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vector_field_set {
            Some(set) => writeln!(f, "Vector Field Set Count:  {}", set.len())?,
            None => writeln!(f, "Vector Field Set Empty")?,
        }
        writeln!(f, "Component Count:  {}", self.component_count)?;
        writeln!(f, "State:  {:?}", self.state)?;
        match &self.results {
            Some(results) => {
                writeln!(f, "Eigenvalues: {}", results.eigen_values())?;
                writeln!(f, "Basis Vector Count:  {}", results.component_count())?;
                writeln!(
                    f,
                    "Basis Vector Dimensions:  {}x{}",
                    results.point_count(),
                    results.vector_dim()
                )?;
            }
            None => writeln!(f, "Basis Vector Empty")?,
        }
        match self.point_set {
            Some(points) => writeln!(
                f,
                "PointSet is {}x{}",
                points.num_points(),
                points.point_dimension()
            )?,
            None => writeln!(f, "PointSet Empty")?,
        }
        if self.kernel_function.is_some() {
            writeln!(f, "KernelFunction is set.")?;
        } else {
            writeln!(f, "Kernel Function not set")?;
        }
        if let Some(results) = &self.results {
            writeln!(f, "K Matrix ({0}x{0}):", results.set_size())?;
            writeln!(f, "{}", results.k_matrix())?;
        }
        Ok(())
    }
}
