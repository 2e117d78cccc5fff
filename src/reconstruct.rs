//! Reconstruction of attribute matrices from both shares.
//!
//! Reconstruction computes `(TTR + MO) / 2` and is the only path from shares back to individual
//! plaintext rows. It needs both shares, which in a deployment means both holders cooperate, so it
//! is never invoked implicitly by aggregation.

use ndarray::{Array2, Zip};

use crate::{
    matrix::{check_shape, AttributeMatrix, DimensionError},
    share::{ShareMo, SharePair, ShareTtr},
};

/// Recombines the two shares into the attribute matrix they were split from.
///
/// The result equals the original attribute matrix up to floating point rounding.
///
/// # Errors
/// Fails if the shares don't have the same shape.
pub fn reconstruct(ttr: &ShareTtr, mo: &ShareMo) -> Result<AttributeMatrix, DimensionError> {
    check_shape(ttr.array().dim(), mo.array().dim())?;
    Ok(recombine(ttr.array(), mo.array()))
}

/// Recombines the shares of a pair into the attribute matrix they were split from.
pub fn reconstruct_pair(shares: &SharePair) -> AttributeMatrix {
    // shapes of a pair always coincide
    recombine(shares.ttr().array(), shares.mo().array())
}

fn recombine(ttr: &Array2<f64>, mo: &Array2<f64>) -> AttributeMatrix {
    let (rows, cols) = ttr.dim();
    let plain = Zip::from(ttr)
        .and(mo)
        .par_map_collect(|&t, &m| (t + m) / 2.0);
    debug!(rows, cols, "reconstructed attribute matrix from both shares");
    AttributeMatrix::from_reconstruction(plain)
}
