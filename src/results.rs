// src/results.rs

use crate::error::{Result, VectorFieldPcaError};
use crate::field::PcaFloat;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Everything one successful PCA computation produces.
///
/// Instances are immutable snapshots: a new computation produces a new value
/// rather than updating an existing one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VectorFieldPcaResults<T> {
    /// Per-component magnitudes `sqrt(lambda_k / N)`, largest first.
    /// Shape: (component_count)
    pub(crate) eigen_values: Array1<T>,
    /// All N raw eigenvalues of the centered K matrix, largest first.
    pub(crate) raw_eigen_values: Array1<T>,
    /// Basis vector fields, each of shape (P, D), in eigenvalue order.
    pub(crate) basis_vectors: Vec<Array2<T>>,
    /// Scaled eigenvectors used to superpose the samples into the basis.
    /// Shape: (N, component_count)
    pub(crate) loadings: Array2<T>,
    /// Elementwise mean of the input samples. Shape: (P, D)
    pub(crate) ave_vector_field: Array2<T>,
    /// Raw K matrix before centering. Shape: (N, N)
    pub(crate) k_matrix: Array2<T>,
    /// K after double centering. Shape: (N, N)
    pub(crate) centered_k_matrix: Array2<T>,
    pub(crate) set_size: usize,
    pub(crate) point_count: usize,
    pub(crate) vector_dim: usize,
}

impl<T: PcaFloat> VectorFieldPcaResults<T> {
    pub fn eigen_values(&self) -> &Array1<T> {
        &self.eigen_values
    }

    pub fn raw_eigen_values(&self) -> &Array1<T> {
        &self.raw_eigen_values
    }

    pub fn basis_vectors(&self) -> &[Array2<T>] {
        &self.basis_vectors
    }

    /// Sample weights of each basis field; column k produced `basis_vectors()[k]`.
    pub fn loadings(&self) -> &Array2<T> {
        &self.loadings
    }

    pub fn ave_vector_field(&self) -> &Array2<T> {
        &self.ave_vector_field
    }

    pub fn k_matrix(&self) -> &Array2<T> {
        &self.k_matrix
    }

    pub fn centered_k_matrix(&self) -> &Array2<T> {
        &self.centered_k_matrix
    }

    pub fn component_count(&self) -> usize {
        self.basis_vectors.len()
    }

    /// Number of samples (N) the results were computed from.
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Points per field (P).
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Vector components per point (D).
    pub fn vector_dim(&self) -> usize {
        self.vector_dim
    }

    /// Saves the results to a file using bincode.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or serialization fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref()).map_err(|e| {
            VectorFieldPcaError::Persistence(format!(
                "Failed to create file at {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        let mut writer = BufWriter::new(file);
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())
            .map_err(|e| {
                VectorFieldPcaError::Persistence(format!("Failed to serialize PCA results: {}", e))
            })?;
        Ok(())
    }

    /// Loads results previously written by [`save`](Self::save).
    ///
    /// # Errors
    /// Returns an error if file I/O or deserialization fails, or if the loaded
    /// results are internally inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            VectorFieldPcaError::Persistence(format!(
                "Failed to open file at {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        let mut reader = BufReader::new(file);
        let results: Self =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
                .map_err(|e| {
                    VectorFieldPcaError::Persistence(format!(
                        "Failed to deserialize PCA results: {}",
                        e
                    ))
                })?;
        results.validate()?;
        Ok(results)
    }

    /// Checks the shape and value invariants every computed result satisfies.
    pub fn validate(&self) -> Result<()> {
        let inconsistent = |msg: String| Err(VectorFieldPcaError::Persistence(msg));
        let n = self.set_size;
        let field_dim = (self.point_count, self.vector_dim);

        if n == 0 {
            return inconsistent("PCA results have a set size of 0.".to_string());
        }
        if self.k_matrix.dim() != (n, n) || self.centered_k_matrix.dim() != (n, n) {
            return inconsistent(format!(
                "K matrices have shapes {:?} and {:?}, expected ({}, {}).",
                self.k_matrix.dim(),
                self.centered_k_matrix.dim(),
                n,
                n
            ));
        }
        if self.raw_eigen_values.len() != n {
            return inconsistent(format!(
                "{} raw eigenvalues stored for a set of size {}.",
                self.raw_eigen_values.len(),
                n
            ));
        }
        let components = self.basis_vectors.len();
        if components == 0 || components > n || self.eigen_values.len() != components {
            return inconsistent(format!(
                "{} eigenvalues and {} basis vectors stored for a set of size {}.",
                self.eigen_values.len(),
                components,
                n
            ));
        }
        if self.loadings.dim() != (n, components) {
            return inconsistent(format!(
                "Loading matrix has shape {:?}, expected ({}, {}).",
                self.loadings.dim(),
                n,
                components
            ));
        }
        if self.ave_vector_field.dim() != field_dim {
            return inconsistent(format!(
                "Average field has shape {:?}, expected {:?}.",
                self.ave_vector_field.dim(),
                field_dim
            ));
        }
        if let Some((k, b)) = self
            .basis_vectors
            .iter()
            .enumerate()
            .find(|(_, b)| b.dim() != field_dim)
        {
            return inconsistent(format!(
                "Basis vector {} has shape {:?}, expected {:?}.",
                k,
                b.dim(),
                field_dim
            ));
        }
        if self
            .eigen_values
            .iter()
            .any(|v| !v.is_finite() || *v < T::zero())
        {
            return inconsistent(
                "Eigenvalues contain non-finite or negative values.".to_string(),
            );
        }
        Ok(())
    }
}

impl<T: PcaFloat> fmt::Display for VectorFieldPcaResults<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vector Field Set Count:  {}", self.set_size)?;
        writeln!(f, "Component Count:  {}", self.component_count())?;
        writeln!(f, "Eigenvalues: {}", self.eigen_values)?;
        writeln!(
            f,
            "Basis Vector Dimensions:  {}x{}",
            self.point_count, self.vector_dim
        )?;
        writeln!(f, "K Matrix ({}x{}):", self.set_size, self.set_size)?;
        writeln!(f, "{}", self.k_matrix)
    }
}
