// src/field.rs

use ndarray::{Array2, ArrayView2, LinalgScalar, ScalarOperand};
use num_traits::{Float, FromPrimitive, NumAssign};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};

/// One sample: a (points x vector components) matrix of per-point vectors.
/// Row `p` holds the vector attached to spatial point `p`.
pub type VectorField<S> = Array2<S>;

/// An ordered collection of samples sharing one (points x components) shape.
pub type VectorFieldSet<S> = [VectorField<S>];

/// Floating point type the PCA computation runs in.
///
/// Implemented for `f32` and `f64`.
pub trait PcaFloat:
    Float
    + FromPrimitive
    + NumAssign
    + LinalgScalar
    + ScalarOperand
    + Debug
    + Display
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
}

impl<T> PcaFloat for T where
    T: Float
        + FromPrimitive
        + NumAssign
        + LinalgScalar
        + ScalarOperand
        + Debug
        + Display
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + 'static
{
}

/// Read access to the spatial points the vector fields are sampled on.
///
/// Only needed for kernel PCA, where the similarity of two points is a
/// function of their squared Euclidean distance.
pub trait PointSet {
    /// Number of points; must equal the row count of every vector field.
    fn num_points(&self) -> usize;

    /// Spatial dimension of each point, reported in the summary dump.
    fn point_dimension(&self) -> usize;

    /// Squared Euclidean distance between points `a` and `b`.
    fn squared_distance(&self, a: usize, b: usize) -> f64;
}

impl PointSet for ArrayView2<'_, f64> {
    fn num_points(&self) -> usize {
        self.nrows()
    }

    fn point_dimension(&self) -> usize {
        self.ncols()
    }

    fn squared_distance(&self, a: usize, b: usize) -> f64 {
        self.row(a)
            .iter()
            .zip(self.row(b).iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum()
    }
}

impl PointSet for Array2<f64> {
    fn num_points(&self) -> usize {
        self.nrows()
    }

    fn point_dimension(&self) -> usize {
        self.ncols()
    }

    fn squared_distance(&self, a: usize, b: usize) -> f64 {
        self.view().squared_distance(a, b)
    }
}

impl<const D: usize> PointSet for [[f64; D]] {
    fn num_points(&self) -> usize {
        self.len()
    }

    fn point_dimension(&self) -> usize {
        D
    }

    fn squared_distance(&self, a: usize, b: usize) -> f64 {
        self[a]
            .iter()
            .zip(self[b].iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum()
    }
}

impl<const D: usize> PointSet for Vec<[f64; D]> {
    fn num_points(&self) -> usize {
        self.len()
    }

    fn point_dimension(&self) -> usize {
        D
    }

    fn squared_distance(&self, a: usize, b: usize) -> f64 {
        self.as_slice().squared_distance(a, b)
    }
}

/// Casts a sample elementwise into the computation type.
pub(crate) fn cast_field<S, T>(field: &VectorField<S>) -> Array2<T>
where
    S: num_traits::AsPrimitive<T>,
    T: PcaFloat,
{
    field.mapv(|v| v.as_())
}
