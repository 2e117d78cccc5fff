//! Mask generation.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use std::fmt;

use ndarray::Array2;
use rand::{
    distributions::{Distribution, Uniform},
    CryptoRng,
    RngCore,
    SeedableRng,
};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

use crate::{
    mask::{
        config::{InvalidMaskConfigError, MaskConfig},
        seed::MaskSeed,
    },
    matrix::{element_count, DimensionError},
};

/// An ephemeral `N x K` matrix of uniform random values used for exactly one split.
///
/// A mask is neither cloneable nor serializable, its `Debug` output only shows its shape and its
/// elements are zeroed out when it goes out of scope.
pub struct Mask(Array2<f64>);

impl Mask {
    /// Creates a mask from row-major `data`.
    ///
    /// Masks are normally drawn by a [`MaskGenerator`]. This constructor is meant for callers
    /// that bring their own randomness.
    ///
    /// # Errors
    /// Fails if `data` does not hold exactly `rows * cols` elements.
    pub fn new(rows: usize, cols: usize, mut data: Vec<f64>) -> Result<Self, DimensionError> {
        let actual = data.len();
        match element_count(rows, cols) {
            Some(expected) if expected == actual => {
                Array2::from_shape_vec((rows, cols), data)
                    .map(Self)
                    .map_err(|_| DimensionError::Oversized { rows, cols })
            }
            expected => {
                data.zeroize();
                Err(DimensionError::LengthMismatch {
                    expected: expected.unwrap_or(usize::MAX),
                    actual,
                })
            }
        }
    }

    /// Gets the number of rows.
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    /// Gets the number of columns.
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// Gets the `(rows, cols)` shape.
    pub fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }

    pub(crate) fn array(&self) -> &Array2<f64> {
        &self.0
    }
}

impl Drop for Mask {
    fn drop(&mut self) {
        // masks are always contiguous, they are built in standard layout
        if let Some(data) = self.0.as_slice_memory_order_mut() {
            data.zeroize();
        }
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .finish_non_exhaustive()
    }
}

/// A generator of masks over an explicit randomness source.
///
/// Each call to [`generate()`] draws fresh elements from the advancing PRNG, so no two masks
/// share a draw.
///
/// [`generate()`]: MaskGenerator::generate
pub struct MaskGenerator<R = ChaCha20Rng> {
    config: MaskConfig,
    distribution: Uniform<f64>,
    rng: R,
}

impl<R> MaskGenerator<R>
where
    R: RngCore + CryptoRng,
{
    /// Creates a new mask generator for the masking `config`uration drawing from `rng`.
    ///
    /// # Errors
    /// Fails if the masking configuration is invalid.
    pub fn new(config: MaskConfig, rng: R) -> Result<Self, InvalidMaskConfigError> {
        let distribution = config.distribution()?;
        Ok(Self {
            config,
            distribution,
            rng,
        })
    }

    /// Gets the masking configuration.
    pub fn config(&self) -> MaskConfig {
        self.config
    }

    /// Draws a fresh `rows x cols` mask.
    ///
    /// # Errors
    /// Fails if either dimension is zero or if the mask would not be addressable.
    pub fn generate(&mut self, rows: usize, cols: usize) -> Result<Mask, DimensionError> {
        if rows == 0 || cols == 0 {
            return Err(DimensionError::Degenerate { rows, cols });
        }
        if element_count(rows, cols).is_none() {
            return Err(DimensionError::Oversized { rows, cols });
        }
        let distribution = &self.distribution;
        let rng = &mut self.rng;
        let data = Array2::from_shape_simple_fn((rows, cols), || distribution.sample(&mut *rng));
        trace!(rows, cols, "generated mask");
        Ok(Mask(data))
    }
}

impl MaskGenerator<ChaCha20Rng> {
    /// Creates a new mask generator with a `ChaCha20` PRNG seeded from the operating system.
    ///
    /// # Errors
    /// Fails if the masking configuration is invalid.
    pub fn from_entropy(config: MaskConfig) -> Result<Self, InvalidMaskConfigError> {
        Self::new(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new mask generator with a `ChaCha20` PRNG seeded from `seed`.
    ///
    /// Two generators built from the same seed draw the same masks, which is only ever wanted in
    /// tests.
    ///
    /// # Errors
    /// Fails if the masking configuration is invalid.
    pub fn from_seed(config: MaskConfig, seed: &MaskSeed) -> Result<Self, InvalidMaskConfigError> {
        Self::new(config, seed.prng())
    }
}

impl<R> fmt::Debug for MaskGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
