//! Splitting of attribute matrices into additive shares.
//!
//! An [`AttributeMatrix`] `A` is split with a [`Mask`] `M` of the same shape into two shares:
//! - the TTR share `A + M`, handed to the trusted third party holder,
//! - the MO share `A - M`, handed to the marketplace operator holder.
//!
//! Hence `TTR + MO = 2A` and `TTR - MO = 2M` elementwise. Each share on its own is the plaintext
//! shifted by a uniform mask, so neither holder learns `A` unilaterally.

use std::fmt;

use derive_more::{AsRef, From, Into};
use ndarray::{Array2, Zip};

use crate::{
    aggregation::HolderTotals,
    mask::Mask,
    matrix::{check_shape, AttributeMatrix, DimensionError},
};

#[derive(Debug, Clone, PartialEq, AsRef, From, Into)]
/// The share `attribute + mask` held by the trusted third party.
pub struct ShareTtr(Array2<f64>);

#[derive(Debug, Clone, PartialEq, AsRef, From, Into)]
/// The share `attribute - mask` held by the marketplace operator.
pub struct ShareMo(Array2<f64>);

impl ShareTtr {
    /// Gets the underlying array.
    pub fn array(&self) -> &Array2<f64> {
        &self.0
    }

    /// Computes the column totals of this share, which is all a holder contributes to share-mode
    /// aggregation.
    pub fn totals(&self) -> HolderTotals {
        HolderTotals::from_array(&self.0)
    }
}

impl ShareMo {
    /// Gets the underlying array.
    pub fn array(&self) -> &Array2<f64> {
        &self.0
    }

    /// Computes the column totals of this share, which is all a holder contributes to share-mode
    /// aggregation.
    pub fn totals(&self) -> HolderTotals {
        HolderTotals::from_array(&self.0)
    }
}

#[derive(Clone, PartialEq)]
/// The two shares of one donation.
///
/// Both shares together reveal the mask and the attributes, so the `Debug` output of a pair only
/// shows its shape.
pub struct SharePair {
    ttr: ShareTtr,
    mo: ShareMo,
}

impl SharePair {
    /// Pairs two shares.
    ///
    /// # Errors
    /// Fails if the shares don't have the same shape.
    pub fn new(ttr: ShareTtr, mo: ShareMo) -> Result<Self, DimensionError> {
        check_shape(ttr.array().dim(), mo.array().dim())?;
        Ok(Self { ttr, mo })
    }

    /// Gets the share of the trusted third party.
    pub fn ttr(&self) -> &ShareTtr {
        &self.ttr
    }

    /// Gets the share of the marketplace operator.
    pub fn mo(&self) -> &ShareMo {
        &self.mo
    }

    /// Gets the population size `N`.
    pub fn population(&self) -> usize {
        self.ttr.array().nrows()
    }

    /// Gets the number of categories `K`.
    pub fn categories(&self) -> usize {
        self.ttr.array().ncols()
    }

    /// Splits this pair into its shares.
    pub fn into_parts(self) -> (ShareTtr, ShareMo) {
        (self.ttr, self.mo)
    }
}

impl fmt::Debug for SharePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharePair")
            .field("population", &self.population())
            .field("categories", &self.categories())
            .finish_non_exhaustive()
    }
}

/// Splits the `attribute` matrix into a TTR share and an MO share with the given `mask`.
///
/// The mask is consumed, so it is wiped as soon as this returns, whether the split succeeded or
/// not.
///
/// # Errors
/// Fails if the `attribute` matrix and the `mask` don't have the same shape.
pub fn split(attribute: &AttributeMatrix, mask: Mask) -> Result<SharePair, DimensionError> {
    let plain = attribute.array();
    check_shape(plain.dim(), mask.shape())?;

    let ttr = Zip::from(plain)
        .and(mask.array())
        .par_map_collect(|&a, &m| a + m);
    let mo = Zip::from(plain)
        .and(mask.array())
        .par_map_collect(|&a, &m| a - m);

    Ok(SharePair {
        ttr: ShareTtr(ttr),
        mo: ShareMo(mo),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> AttributeMatrix {
        AttributeMatrix::new(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_split_identities() {
        let mask_values = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
        let mask = Mask::new(3, 3, mask_values.clone()).unwrap();
        let attribute = scenario();

        let shares = split(&attribute, mask).unwrap();
        assert_eq!(shares.population(), 3);
        assert_eq!(shares.categories(), 3);

        let mask = Array2::from_shape_vec((3, 3), mask_values).unwrap();
        let sum = shares.ttr().array() + shares.mo().array();
        let difference = shares.ttr().array() - shares.mo().array();
        Zip::from(&sum)
            .and(attribute.array())
            .for_each(|s, a| assert!((s - 2.0 * a).abs() < 1e-12));
        Zip::from(&difference)
            .and(&mask)
            .for_each(|d, m| assert!((d - 2.0 * m).abs() < 1e-12));
    }

    #[test]
    fn test_split_hides_plaintext() {
        let mask = Mask::new(3, 3, vec![0.5; 9]).unwrap();
        let attribute = scenario();
        let shares = split(&attribute, mask).unwrap();
        assert_ne!(shares.ttr().array(), attribute.array());
        assert_ne!(shares.mo().array(), attribute.array());
    }

    #[test]
    fn test_split_shape_mismatch() {
        let mask = Mask::new(2, 3, vec![0.5; 6]).unwrap();
        assert_eq!(
            split(&scenario(), mask).unwrap_err(),
            DimensionError::ShapeMismatch {
                expected: (3, 3),
                actual: (2, 3),
            },
        );

        let mask = Mask::new(3, 2, vec![0.5; 6]).unwrap();
        assert!(split(&scenario(), mask).is_err());
    }

    #[test]
    fn test_pair_shape_mismatch() {
        let ttr = ShareTtr::from(Array2::zeros((2, 2)));
        let mo = ShareMo::from(Array2::zeros((2, 3)));
        assert!(SharePair::new(ttr.clone(), mo).is_err());
        assert!(SharePair::new(ttr, ShareMo::from(Array2::zeros((2, 2)))).is_ok());
    }

    #[test]
    fn test_pair_debug_is_redacted() {
        let mask = Mask::new(1, 2, vec![0.123, 0.456]).unwrap();
        let attribute = AttributeMatrix::new(&[[1.0, 0.0]]).unwrap();
        let debug = format!("{:?}", split(&attribute, mask).unwrap());
        assert!(debug.contains("population: 1"));
        assert!(!debug.contains("0.123"));
        assert!(!debug.contains("1.123"));
    }
}
