//! Aggregation of fairness statistics.
//!
//! # Statistics
//! - The diversity of a category `k` is the fraction of the population which belongs to it:
//!   `Σ_i A[i,k] / N`.
//! - The diversity profile lists the diversity of every category.
//! - The coverage is the population-wide normalized sum `Σ_i Σ_k A[i,k] / N`, which is `1` for
//!   one-hot data.
//! - The expectation is the weighted count of category memberships: every membership of an
//!   individual in category `k` contributes the weight `w[k]`.
//!
//! # Modes
//! Statistics are computed via the [`Aggregate`] trait in one of two modes:
//! - [`PlaintextAggregation`] works on a donated or reconstructed [`AttributeMatrix`].
//! - [`ShareAggregation`] works on the shares without reconstructing any row. Each holder sums
//!   the columns of its own share into [`HolderTotals`] and only these two length `K` vectors are
//!   combined as `(TTR + MO) / 2`, which is exact because the shares add up to twice the
//!   plaintext and summation is linear. Only linear, population-level statistics are available
//!   this way.
//!
//! Both modes agree up to floating point rounding on binary attribute data.
//!
//! ```
//! # use fairshare::{aggregation::{Aggregate, PlaintextAggregation, ShareAggregation}, mask::Mask, matrix::{AttributeMatrix, WeightVector}, share::split};
//! let attribute = AttributeMatrix::new(&[[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]]).unwrap();
//! let weights = WeightVector::from(vec![1., 2., 3.]);
//! let shares = split(&attribute, Mask::new(3, 3, vec![0.25; 9]).unwrap()).unwrap();
//!
//! let plain = PlaintextAggregation::new(&attribute);
//! let masked = ShareAggregation::from_shares(&shares);
//! assert_eq!(plain.expectation(&weights).unwrap(), 6.);
//! assert!((masked.expectation(&weights).unwrap() - 6.).abs() < 1e-9);
//! ```

use ndarray::{Array1, Array2, ArrayView1, Axis};
use thiserror::Error;

use crate::{
    matrix::{AttributeMatrix, DimensionError, WeightVector, MEMBERSHIP_TOLERANCE},
    share::SharePair,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot aggregate over an empty population")]
/// An aggregation was requested over zero individuals.
pub struct DivisionByZeroError;

#[derive(Debug, Error, Clone, PartialEq)]
/// Errors related to the aggregation of statistics.
pub enum AggregationError {
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The column totals of one share, computed locally by its holder.
pub struct HolderTotals {
    population: usize,
    columns: Vec<f64>,
}

impl HolderTotals {
    pub(crate) fn from_array(array: &Array2<f64>) -> Self {
        Self {
            population: array.nrows(),
            columns: array.sum_axis(Axis(0)).to_vec(),
        }
    }

    /// Gets the number of rows the totals were summed over.
    pub fn population(&self) -> usize {
        self.population
    }

    /// Gets the total of every column.
    pub fn columns(&self) -> &[f64] {
        &self.columns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A summary of all statistics for one category and one weight vector.
pub struct Statistics {
    pub population: usize,
    pub categories: usize,
    pub category: usize,
    pub diversity: f64,
    pub diversity_profile: Vec<f64>,
    pub coverage: f64,
    pub expectation: f64,
}

/// An interface to compute fairness statistics from column totals.
pub trait Aggregate {
    /// Gets the population size `N`.
    fn population(&self) -> usize;

    /// Gets the number of categories `K`.
    fn categories(&self) -> usize;

    /// Gets the plaintext total of every category column.
    fn column_totals(&self) -> Array1<f64>;

    /// Computes the fraction of the population which belongs to `category`.
    ///
    /// # Errors
    /// Fails if the population is empty or the category does not exist.
    fn diversity(&self, category: usize) -> Result<f64, AggregationError> {
        let population = self.check_population()?;
        let categories = self.categories();
        if category >= categories {
            return Err(DimensionError::CategoryOutOfRange {
                category,
                categories,
            }
            .into());
        }
        Ok(self.column_totals()[category] / population)
    }

    /// Computes the diversity of every category.
    ///
    /// # Errors
    /// Fails if the population is empty.
    fn diversity_profile(&self) -> Result<Vec<f64>, AggregationError> {
        let population = self.check_population()?;
        Ok((self.column_totals() / population).to_vec())
    }

    /// Computes the population-wide normalized sum of all memberships.
    ///
    /// # Errors
    /// Fails if the population is empty.
    fn coverage(&self) -> Result<f64, AggregationError> {
        let population = self.check_population()?;
        Ok(self.column_totals().sum() / population)
    }

    /// Computes the weighted count of category memberships.
    ///
    /// # Errors
    /// Fails if the population is empty or if there isn't exactly one weight per category.
    fn expectation(&self, weights: &WeightVector) -> Result<f64, AggregationError> {
        self.check_population()?;
        weights.check_categories(self.categories())?;
        Ok(self.column_totals().dot(&weights.view()))
    }

    /// Computes all statistics for the given `category` and `weights`.
    ///
    /// # Errors
    /// Fails if any of the single statistics fails.
    fn statistics(
        &self,
        category: usize,
        weights: &WeightVector,
    ) -> Result<Statistics, AggregationError> {
        let statistics = Statistics {
            population: self.population(),
            categories: self.categories(),
            category,
            diversity: self.diversity(category)?,
            diversity_profile: self.diversity_profile()?,
            coverage: self.coverage()?,
            expectation: self.expectation(weights)?,
        };
        debug!(
            population = statistics.population,
            categories = statistics.categories,
            "aggregated statistics"
        );
        Ok(statistics)
    }

    #[doc(hidden)]
    /// Gets the population size as a divisor.
    ///
    /// # Errors
    /// Fails if the population is empty.
    fn check_population(&self) -> Result<f64, DivisionByZeroError> {
        match self.population() {
            0 => Err(DivisionByZeroError),
            population => Ok(population as f64),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Aggregation over plaintext attributes.
pub struct PlaintextAggregation<'a> {
    attribute: &'a AttributeMatrix,
}

impl<'a> PlaintextAggregation<'a> {
    /// Creates an aggregation over the given `attribute` matrix.
    pub fn new(attribute: &'a AttributeMatrix) -> Self {
        Self { attribute }
    }
}

impl Aggregate for PlaintextAggregation<'_> {
    fn population(&self) -> usize {
        self.attribute.population()
    }

    fn categories(&self) -> usize {
        self.attribute.categories()
    }

    fn column_totals(&self) -> Array1<f64> {
        self.attribute.array().sum_axis(Axis(0))
    }

    /// Counts every membership, i.e. every element equal to `1`, with the weight of its
    /// category. Elements of reconstructed matrices count as memberships within a tolerance of
    /// rounding errors.
    fn expectation(&self, weights: &WeightVector) -> Result<f64, AggregationError> {
        self.check_population()?;
        weights.check_categories(self.categories())?;
        let weights = weights.view();
        Ok(self
            .attribute
            .array()
            .indexed_iter()
            .filter(|(_, value)| (*value - 1.0).abs() <= MEMBERSHIP_TOLERANCE)
            .map(|((_, category), _)| weights[category])
            .sum())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Aggregation over the column totals of both shares, without reconstructing any row.
pub struct ShareAggregation {
    ttr: HolderTotals,
    mo: HolderTotals,
}

impl ShareAggregation {
    /// Creates an aggregation from the totals each holder computed on its own share.
    ///
    /// # Errors
    /// Fails if the totals weren't computed over shares of the same shape.
    pub fn from_totals(ttr: HolderTotals, mo: HolderTotals) -> Result<Self, DimensionError> {
        let expected = (ttr.population, ttr.columns.len());
        let actual = (mo.population, mo.columns.len());
        if expected != actual {
            return Err(DimensionError::ShapeMismatch { expected, actual });
        }
        Ok(Self { ttr, mo })
    }

    /// Creates an aggregation from a share pair.
    pub fn from_shares(shares: &SharePair) -> Self {
        Self {
            ttr: shares.ttr().totals(),
            mo: shares.mo().totals(),
        }
    }
}

impl Aggregate for ShareAggregation {
    fn population(&self) -> usize {
        self.ttr.population
    }

    fn categories(&self) -> usize {
        self.ttr.columns.len()
    }

    fn column_totals(&self) -> Array1<f64> {
        let ttr = ArrayView1::from(self.ttr.columns.as_slice());
        let mo = ArrayView1::from(self.mo.columns.as_slice());
        (&ttr + &mo) / 2.0
    }
}
