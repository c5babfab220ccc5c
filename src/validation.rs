// src/validation.rs

use crate::error::{Result, VectorFieldPcaError};
use crate::field::{PointSet, VectorField};
use log::debug;

/// Dimensions of a validated vector field set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSetShape {
    /// Number of samples (N).
    pub set_size: usize,
    /// Points per sample, i.e. rows of each field (P).
    pub point_count: usize,
    /// Vector components per point, i.e. columns of each field (D).
    pub vector_dim: usize,
}

/// Checks that the inputs describe a well-posed PCA problem.
///
/// Performs no numerical work. Checks run in a fixed order: the field set must
/// be non-empty, the component count must lie in `1..=N`, all samples must
/// share the first sample's shape, and, when a kernel is in use, a point set
/// with exactly one point per field row must be present.
pub fn validate_inputs<S>(
    fields: Option<&[VectorField<S>]>,
    component_count: usize,
    points: Option<&dyn PointSet>,
    kernel_configured: bool,
) -> Result<FieldSetShape> {
    let fields = match fields {
        Some(f) if !f.is_empty() => f,
        _ => return Err(VectorFieldPcaError::EmptyFieldSet),
    };

    let set_size = fields.len();
    if component_count == 0 || component_count > set_size {
        return Err(VectorFieldPcaError::InvalidComponentCount {
            requested: component_count,
            set_size,
        });
    }

    let expected = fields[0].dim();
    for (index, field) in fields.iter().enumerate().skip(1) {
        if field.dim() != expected {
            return Err(VectorFieldPcaError::FieldShapeMismatch {
                index,
                found: field.dim(),
                expected,
            });
        }
    }
    let (point_count, vector_dim) = expected;

    if kernel_configured {
        let points = points.ok_or(VectorFieldPcaError::MissingPointSet)?;
        if points.num_points() != point_count {
            return Err(VectorFieldPcaError::PointCountMismatch {
                points: points.num_points(),
                rows: point_count,
            });
        }
    }

    debug!(
        "Validated vector field set: N={} samples, P={} points, D={} components.",
        set_size, point_count, vector_dim
    );
    Ok(FieldSetShape {
        set_size,
        point_count,
        vector_dim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use ndarray::{array, Array2};

    fn fields(n: usize, rows: usize, cols: usize) -> Vec<Array2<f64>> {
        (0..n)
            .map(|i| Array2::from_elem((rows, cols), i as f64))
            .collect()
    }

    #[test]
    fn accepts_consistent_set() {
        let set = fields(4, 5, 3);
        let shape = validate_inputs(Some(set.as_slice()), 4, None, false).unwrap();
        assert_eq!(
            shape,
            FieldSetShape { set_size: 4, point_count: 5, vector_dim: 3 }
        );
    }

    #[test]
    fn rejects_missing_and_empty_sets() {
        let err = validate_inputs::<f64>(None, 1, None, false).unwrap_err();
        assert!(matches!(err, VectorFieldPcaError::EmptyFieldSet));
        let empty: Vec<Array2<f64>> = Vec::new();
        let err = validate_inputs(Some(empty.as_slice()), 1, None, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn component_count_bounds() {
        let set = fields(3, 2, 2);
        for bad in [0usize, 4] {
            let err = validate_inputs(Some(set.as_slice()), bad, None, false).unwrap_err();
            assert!(matches!(
                err,
                VectorFieldPcaError::InvalidComponentCount { requested, set_size: 3 } if requested == bad
            ));
        }
        assert!(validate_inputs(Some(set.as_slice()), 3, None, false).is_ok());
    }

    #[test]
    fn reports_first_mismatching_sample() {
        let mut set = fields(4, 5, 3);
        set[2] = Array2::zeros((5, 2));
        set[3] = Array2::zeros((4, 3));
        let err = validate_inputs(Some(set.as_slice()), 2, None, false).unwrap_err();
        match err {
            VectorFieldPcaError::FieldShapeMismatch { index, found, expected } => {
                assert_eq!(index, 2);
                assert_eq!(found, (5, 2));
                assert_eq!(expected, (5, 3));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn kernel_requires_matching_point_set() {
        let set = fields(3, 3, 2);
        let err = validate_inputs(Some(set.as_slice()), 1, None, true).unwrap_err();
        assert!(matches!(err, VectorFieldPcaError::MissingPointSet));

        let pts = array![[0.0, 0.0], [1.0, 1.0]];
        let err = validate_inputs(Some(set.as_slice()), 1, Some(&pts), true).unwrap_err();
        assert!(matches!(
            err,
            VectorFieldPcaError::PointCountMismatch { points: 2, rows: 3 }
        ));

        let pts = array![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]];
        assert!(validate_inputs(Some(set.as_slice()), 1, Some(&pts), true).is_ok());
    }

    #[test]
    fn point_set_ignored_without_kernel() {
        let set = fields(2, 3, 1);
        let pts = array![[0.0], [1.0]];
        assert!(validate_inputs(Some(set.as_slice()), 1, Some(&pts), false).is_ok());
    }
}
