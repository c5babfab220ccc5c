use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::env;
use vector_field_pca::{GaussianDistanceKernel, VectorFieldPCA, VectorFieldPcaResults};

// Usage: synthetic_deformation [sigma] [component_count] [output_file]
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let sigma: f64 = args.get(1).map(|s| s.parse().expect("sigma must be a number")).unwrap_or(2.0);
    let component_count: usize = args
        .get(2)
        .map(|s| s.parse().expect("component count must be an integer"))
        .unwrap_or(3);

    // 10x10 grid of points, 3D displacement at each.
    let grid = 10;
    let points = Array2::from_shape_fn((grid * grid, 3), |(i, c)| match c {
        0 => (i % grid) as f64,
        1 => (i / grid) as f64,
        _ => 0.0,
    });

    // Each sample mixes a bulge centered on the grid and a global twist.
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let center = (grid as f64 - 1.0) / 2.0;
    let fields: Vec<Array2<f64>> = (0..25)
        .map(|_| {
            let bulge: f64 = rng.gen_range(-1.0..1.0);
            let twist: f64 = rng.gen_range(-0.5..0.5);
            Array2::from_shape_fn((grid * grid, 3), |(i, c)| {
                let x = points[[i, 0]] - center;
                let y = points[[i, 1]] - center;
                let falloff = (-(x * x + y * y) / 8.0).exp();
                match c {
                    0 => bulge * x * falloff - twist * y,
                    1 => bulge * y * falloff + twist * x,
                    _ => bulge * falloff,
                }
            })
        })
        .collect();

    let mut pca: VectorFieldPCA<f64> = VectorFieldPCA::new();
    pca.set_vector_field_set(&fields);
    pca.set_point_set(&points);
    pca.set_kernel_function(GaussianDistanceKernel::new(sigma).expect("invalid sigma"));
    pca.set_component_count(component_count);
    pca.compute().expect("vector field PCA failed");

    println!("{}", pca);
    for (k, basis) in pca.basis_vectors().unwrap().iter().enumerate() {
        let norm = basis.iter().map(|v| v * v).sum::<f64>().sqrt();
        println!("basis {}: |b| = {:.4}", k, norm);
    }

    if let Some(path) = args.get(3) {
        let results = pca.into_results().unwrap();
        results.save(path).expect("failed to save results");
        let reloaded = VectorFieldPcaResults::<f64>::load(path).expect("failed to reload results");
        println!("Saved results to {}:\n{}", path, reloaded);
    }
}
