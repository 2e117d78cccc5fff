//! Attribute matrices and weight vectors.
//!
//! See the [crate] documentation for how these flow through donation, splitting and aggregation.

use std::slice::Iter;

use derive_more::{AsRef, From, Into};
use ndarray::{Array2, ArrayView1};
use thiserror::Error;

/// Absolute tolerance under which a value counts as exactly `0` or `1`.
pub const MEMBERSHIP_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
/// Errors related to the shapes of matrices, masks, shares and weights.
pub enum DimensionError {
    #[error("shape mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("weight vector has {actual} entries but there are {expected} categories")]
    WeightsMismatch { expected: usize, actual: usize },

    #[error("cannot generate a {rows}x{cols} mask: both dimensions must be positive")]
    Degenerate { rows: usize, cols: usize },

    #[error("a {rows}x{cols} matrix exceeds the addressable size")]
    Oversized { rows: usize, cols: usize },

    #[error("category {category} does not exist, there are {categories} categories")]
    CategoryOutOfRange { category: usize, categories: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
/// Errors related to malformed donated data.
pub enum InvalidInputError {
    #[error("row {row} has {actual} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("value {value} at row {row}, column {col} is neither 0 nor 1")]
    NonBinary { row: usize, col: usize, value: f64 },

    #[error("row {row} sums to {sum}, a one-hot row must sum to 1")]
    NotOneHot { row: usize, sum: f64 },
}

/// Checks that the `actual` shape equals the `expected` one.
///
/// # Errors
/// Fails with [`DimensionError::ShapeMismatch`] otherwise.
pub(crate) fn check_shape(
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), DimensionError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DimensionError::ShapeMismatch { expected, actual })
    }
}

/// Gets the number of elements of a `rows x cols` array, if it is addressable.
pub(crate) fn element_count(rows: usize, cols: usize) -> Option<usize> {
    rows.checked_mul(cols)
        .filter(|&count| count <= isize::MAX as usize)
}

#[derive(Debug, Clone, PartialEq, AsRef, Into)]
/// An `N x K` matrix of category memberships, one row per individual and one column per
/// category.
///
/// Attribute matrices built from donated data only hold `0` and `1`. The rows are meant to be
/// one-hot, which is checked on request via [`AttributeMatrix::check_one_hot`].
pub struct AttributeMatrix(Array2<f64>);

impl AttributeMatrix {
    /// Creates an attribute matrix from a list of rows.
    ///
    /// An empty list yields a population of zero over zero categories.
    ///
    /// # Errors
    /// Fails if the rows are ragged or hold values other than `0` and `1`.
    pub fn new<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, InvalidInputError> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.as_ref().len() != cols)
        {
            return Err(InvalidInputError::Ragged {
                row: i,
                expected: cols,
                actual: row.as_ref().len(),
            });
        }
        let array = Array2::from_shape_fn((rows.len(), cols), |(i, j)| rows[i].as_ref()[j]);
        Self::try_from_array(array)
    }

    /// Creates an attribute matrix from a two-dimensional array.
    ///
    /// # Errors
    /// Fails if the array holds values other than `0` and `1`.
    pub fn try_from_array(array: Array2<f64>) -> Result<Self, InvalidInputError> {
        if let Some(((row, col), &value)) = array
            .indexed_iter()
            .find(|&(_, &value)| value != 0.0 && value != 1.0)
        {
            return Err(InvalidInputError::NonBinary { row, col, value });
        }
        Ok(Self(array))
    }

    /// Creates an attribute matrix for an empty population over `categories` categories.
    pub fn empty(categories: usize) -> Self {
        Self(Array2::zeros((0, categories)))
    }

    /// Wraps a reconstructed array, whose elements are only binary up to rounding.
    pub(crate) fn from_reconstruction(array: Array2<f64>) -> Self {
        Self(array)
    }

    /// Gets the population size `N`.
    pub fn population(&self) -> usize {
        self.0.nrows()
    }

    /// Gets the number of categories `K`.
    pub fn categories(&self) -> usize {
        self.0.ncols()
    }

    /// Gets the `(N, K)` shape.
    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Gets the underlying array.
    pub fn array(&self) -> &Array2<f64> {
        &self.0
    }

    /// Checks that every row has exactly one membership.
    ///
    /// # Errors
    /// Fails for the first row whose sum differs from `1`.
    pub fn check_one_hot(&self) -> Result<(), InvalidInputError> {
        for (i, row) in self.0.outer_iter().enumerate() {
            let sum = row.sum();
            if (sum - 1.0).abs() > MEMBERSHIP_TOLERANCE {
                return Err(InvalidInputError::NotOneHot { row: i, sum });
            }
        }
        Ok(())
    }

    /// Checks whether every element is within `tolerance` of `other`.
    pub fn approx_eq(&self, other: &AttributeMatrix, tolerance: f64) -> bool {
        self.dim() == other.dim()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

#[derive(Debug, Clone, PartialEq, From, Into, AsRef)]
/// Importance weights, one per category.
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// Gets the number of weights.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether there are no weights at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Creates an iterator over the weights.
    pub fn iter(&self) -> Iter<f64> {
        self.0.iter()
    }

    /// Gets a one-dimensional array view of the weights.
    pub fn view(&self) -> ArrayView1<f64> {
        ArrayView1::from(self.0.as_slice())
    }

    /// Checks that there is one weight per category.
    ///
    /// # Errors
    /// Fails with [`DimensionError::WeightsMismatch`] otherwise.
    pub fn check_categories(&self, categories: usize) -> Result<(), DimensionError> {
        if self.len() == categories {
            Ok(())
        } else {
            Err(DimensionError::WeightsMismatch {
                expected: categories,
                actual: self.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Axis};

    use super::*;

    #[test]
    fn test_new() {
        let attribute = AttributeMatrix::new(&[[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]]).unwrap();
        assert_eq!(attribute.dim(), (3, 2));
        assert_eq!(
            attribute.array(),
            &array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]]
        );
        assert_eq!(attribute.array().sum_axis(Axis(0)), array![2.0, 1.0]);

        let empty = AttributeMatrix::new::<Vec<f64>>(&[]).unwrap();
        assert_eq!(empty.dim(), (0, 0));
    }

    #[test]
    fn test_new_ragged() {
        let rows = vec![vec![1.0, 0.0], vec![0.0]];
        assert_eq!(
            AttributeMatrix::new(&rows).unwrap_err(),
            InvalidInputError::Ragged {
                row: 1,
                expected: 2,
                actual: 1
            },
        );
    }

    #[test]
    fn test_non_binary() {
        let err = AttributeMatrix::new(&[[1.0, 0.0], [0.0, 0.5]]).unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::NonBinary {
                row: 1,
                col: 1,
                value: 0.5
            },
        );
        assert!(AttributeMatrix::new(&[[1.0, 0.0], [0.0, -1.0]]).is_err());
        assert!(AttributeMatrix::try_from_array(array![[0.0, 2.0]]).is_err());
        assert!(AttributeMatrix::try_from_array(array![[0.0, 1.0]]).is_ok());
    }

    #[test]
    fn test_one_hot() {
        let one_hot = AttributeMatrix::new(&[[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
        assert!(one_hot.check_one_hot().is_ok());
        assert_eq!(one_hot.population(), 2);
        assert_eq!(one_hot.categories(), 3);

        let two_hot = AttributeMatrix::new(&[[1.0, 0.0, 0.0], [0.0, 1.0, 1.0]]).unwrap();
        assert_eq!(
            two_hot.check_one_hot().unwrap_err(),
            InvalidInputError::NotOneHot { row: 1, sum: 2.0 },
        );

        let no_hot = AttributeMatrix::new(&[[0.0, 0.0]]).unwrap();
        assert!(no_hot.check_one_hot().is_err());
    }

    #[test]
    fn test_empty_population() {
        let empty = AttributeMatrix::empty(3);
        assert_eq!(empty.population(), 0);
        assert_eq!(empty.categories(), 3);
        assert_eq!(empty.array().sum_axis(Axis(0)), array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_approx_eq() {
        let attribute = AttributeMatrix::new(&[[1.0, 0.0]]).unwrap();
        let close = AttributeMatrix::from_reconstruction(array![[1.0 + 1e-12, -1e-12]]);
        assert!(attribute.approx_eq(&close, 1e-9));
        assert!(!attribute.approx_eq(&close, 1e-13));
        assert!(!attribute.approx_eq(&AttributeMatrix::empty(2), 1e-9));
    }

    #[test]
    fn test_check_shape() {
        assert!(check_shape((2, 3), (2, 3)).is_ok());
        assert_eq!(
            check_shape((2, 3), (3, 2)).unwrap_err(),
            DimensionError::ShapeMismatch {
                expected: (2, 3),
                actual: (3, 2),
            },
        );
    }

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(3, 4), Some(12));
        assert_eq!(element_count(usize::MAX, 2), None);
        assert_eq!(element_count(usize::MAX, 1), None);
    }

    #[test]
    fn test_weights() {
        let weights = WeightVector::from(vec![1.0, 2.0, 3.0]);
        assert!(!weights.is_empty());
        assert_eq!(weights.view(), array![1.0, 2.0, 3.0]);
        assert!(weights.check_categories(3).is_ok());
        assert_eq!(
            weights.check_categories(2).unwrap_err(),
            DimensionError::WeightsMismatch {
                expected: 2,
                actual: 3
            },
        );
    }
}
