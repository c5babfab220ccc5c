// Principal component analysis (PCA) of vector field sets

#![doc = include_str!("../README.md")]

pub mod basis;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod kernel;
pub mod kernel_pca;
pub mod linalg_backends;
pub mod momentum;
pub mod pca;
pub mod results;
pub mod validation;


pub use diagnostics::KernelPcaDiagnostics;
pub use error::{ErrorKind, VectorFieldPcaError};
pub use field::{PcaFloat, PointSet, VectorField, VectorFieldSet};
pub use kernel::{GaussianDistanceKernel, KernelFunction};
pub use kernel_pca::DEFAULT_EIGENVALUE_EPSILON;
pub use linalg_backends::{BackendEigh, EighOutput, LinAlgBackendProvider, NdarrayLinAlgBackend};
pub use pca::{compute_vector_field_pca, PcaState, VectorFieldPCA};
pub use results::VectorFieldPcaResults;
pub use validation::FieldSetShape;

#[cfg(feature = "backend_faer")]
pub use linalg_backends::FaerLinAlgBackend;
