// In tests/vector_field_pca_tests.rs

use ndarray::{Array, Array2, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;
use vector_field_pca::{
    compute_vector_field_pca, ErrorKind, GaussianDistanceKernel, KernelFunction,
    KernelPcaDiagnostics, LinAlgBackendProvider, PcaState, PointSet, VectorFieldPCA,
    VectorFieldPcaError, VectorFieldPcaResults, DEFAULT_EIGENVALUE_EPSILON,
};

const DEFAULT_FLOAT_TOLERANCE_F64: f64 = 1e-8;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Samples on a regular grid: a shared base field plus two deformation modes
/// with random per-sample weights and a little noise.
fn generate_deformation_fields(n_samples: usize, grid: usize, seed: u64) -> (Array2<f64>, Vec<Array2<f64>>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n_points = grid * grid;
    let points = Array2::from_shape_fn((n_points, 3), |(i, c)| match c {
        0 => (i % grid) as f64,
        1 => (i / grid) as f64,
        _ => 0.0,
    });
    let base = Array2::from_shape_fn((n_points, 3), |(i, c)| 0.1 * (i + c) as f64);
    let stretch = Array2::from_shape_fn((n_points, 3), |(i, c)| if c == 0 { points[[i, 0]] } else { 0.0 });
    let shear = Array2::from_shape_fn((n_points, 3), |(i, c)| if c == 1 { points[[i, 0]] } else { 0.0 });

    let weights = Array::random_using((n_samples, 2), Uniform::new(-1.0, 1.0), &mut rng);
    let fields = (0..n_samples)
        .map(|s| {
            let noise = Array::random_using((n_points, 3), Uniform::new(-1e-3, 1e-3), &mut rng);
            &base + &(&stretch * weights[[s, 0]] * 2.0) + &(&shear * weights[[s, 1]]) + &noise
        })
        .collect();
    (points, fields)
}

// Basis fields are defined up to sign; compare with the better of both.
fn assert_fields_close_up_to_sign(a: ArrayView2<f64>, b: ArrayView2<f64>, tolerance: f64, context: &str) {
    assert_eq!(a.dim(), b.dim(), "Field dimensions differ for {}", context);
    let direct = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max);
    let flipped = a.iter().zip(b.iter()).map(|(x, y)| (x + y).abs()).fold(0.0, f64::max);
    assert!(
        direct.min(flipped) < tolerance,
        "Fields differ for {}: direct diff {}, flipped diff {}",
        context,
        direct,
        flipped
    );
}

#[test]
fn two_mode_deformation_is_recovered() {
    init_logging();
    let (_, fields) = generate_deformation_fields(20, 5, 7);
    let mut pca: VectorFieldPCA<f64> = VectorFieldPCA::new();
    pca.set_vector_field_set(&fields);
    pca.set_component_count(4);
    pca.compute().expect("standard PCA should succeed");

    let eig = pca.pca_eigen_values().unwrap();
    assert!(eig[0] > 0.1 && eig[1] > 0.1, "two dominant modes expected: {:?}", eig);
    assert!(eig[2] < 1e-2 * eig[1], "third mode should be noise: {:?}", eig);

    let diagnostics = pca.diagnostics().unwrap();
    assert!(diagnostics.feature_space_orthonormality_error.unwrap() < 1e-6);
    assert_eq!(diagnostics.k_matrix_dims, Some((20, 20)));
}

#[test]
fn gaussian_kernel_pipeline_end_to_end() {
    init_logging();
    let (points, fields) = generate_deformation_fields(12, 4, 11);
    let kernel = GaussianDistanceKernel::new(1.5).unwrap();

    let mut pca: VectorFieldPCA<f64> = VectorFieldPCA::new();
    pca.set_vector_field_set(&fields);
    pca.set_point_set(&points);
    pca.set_kernel_function(kernel);
    pca.set_component_count(3);
    pca.compute().unwrap();
    assert_eq!(pca.state(), PcaState::Computed);
    assert!(pca.has_kernel_function());

    let results = pca.results().unwrap();
    assert_eq!(results.set_size(), 12);
    assert_eq!(results.point_count(), 16);
    assert_eq!(results.vector_dim(), 3);
    assert_eq!(results.component_count(), 3);
    results.validate().unwrap();

    // Dropping the kernel falls back to standard PCA with different magnitudes.
    let kernelized = pca.pca_eigen_values().unwrap().clone();
    pca.clear_kernel_function();
    assert!(pca.results().is_none());
    pca.compute().unwrap();
    assert_ne!(&kernelized, pca.pca_eigen_values().unwrap());
}

#[test]
fn closure_kernel_matches_gaussian_kernel() {
    let (points, fields) = generate_deformation_fields(8, 3, 13);
    let sigma = 2.0;
    let closure = move |d2: f64| (-d2 / (2.0 * sigma * sigma)).exp();
    let gaussian = GaussianDistanceKernel::new(sigma).unwrap();
    let backend = LinAlgBackendProvider::<f64>::new();

    let from_closure = compute_vector_field_pca::<f64, f64, _>(
        &fields,
        2,
        Some(&points as &dyn PointSet),
        Some(&closure as &dyn KernelFunction),
        &backend,
        DEFAULT_EIGENVALUE_EPSILON,
    )
    .unwrap();
    let from_gaussian = compute_vector_field_pca::<f64, f64, _>(
        &fields,
        2,
        Some(&points as &dyn PointSet),
        Some(&gaussian as &dyn KernelFunction),
        &backend,
        DEFAULT_EIGENVALUE_EPSILON,
    )
    .unwrap();

    for (a, b) in from_closure.eigen_values().iter().zip(from_gaussian.eigen_values().iter()) {
        assert!((a - b).abs() < DEFAULT_FLOAT_TOLERANCE_F64, "{} vs {}", a, b);
    }
    for (k, (a, b)) in from_closure
        .basis_vectors()
        .iter()
        .zip(from_gaussian.basis_vectors().iter())
        .enumerate()
    {
        assert_fields_close_up_to_sign(a.view(), b.view(), 1e-6, &format!("basis {}", k));
    }
}

#[test]
fn saved_results_reload_identically() {
    let (points, fields) = generate_deformation_fields(6, 3, 17);
    let mut pca: VectorFieldPCA<f64> = VectorFieldPCA::new();
    pca.set_vector_field_set(&fields);
    pca.set_point_set(&points);
    pca.set_kernel_function(GaussianDistanceKernel::new(1.0).unwrap());
    pca.set_component_count(2);
    pca.compute().unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("vector_field_pca.bin");
    pca.results().unwrap().save(&path).unwrap();

    let loaded = VectorFieldPcaResults::<f64>::load(&path).unwrap();
    assert_eq!(&loaded, pca.results().unwrap());
    let summary = KernelPcaDiagnostics::from_results(&loaded);
    assert_eq!(summary.num_negative_raw_eigenvalues, pca.diagnostics().unwrap().num_negative_raw_eigenvalues);
}

#[test]
fn loading_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = VectorFieldPcaResults::<f64>::load(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Persistence));
}

#[test]
fn kernel_sigma_must_be_positive() {
    for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = GaussianDistanceKernel::new(sigma).unwrap_err();
        assert!(matches!(err, VectorFieldPcaError::InvalidKernelSigma(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[test]
fn point_set_from_coordinate_arrays() {
    let fields: Vec<Array2<f64>> = (0..4)
        .map(|s| Array2::from_shape_fn((3, 2), |(i, c)| (s * 3 + i + c) as f64 * 0.5))
        .collect();
    let points: Vec<[f64; 2]> = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    let mut pca: VectorFieldPCA<f64> = VectorFieldPCA::new();
    pca.set_vector_field_set(&fields);
    pca.set_point_set(&points);
    pca.set_kernel_function(GaussianDistanceKernel::new(1.0).unwrap());
    pca.set_component_count(1);
    pca.compute().unwrap();
    assert!(pca.to_string().contains("PointSet is 3x2"));
}
