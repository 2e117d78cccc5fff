//! Masking configuration.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use rand::distributions::Uniform;
use thiserror::Error;

/// The largest absolute value a mask bound may have.
///
/// Shares of binary attributes then stay within `2^20 + 1`, where the rounding of `a ± m` is far
/// below [`MEMBERSHIP_TOLERANCE`], so reconstruction recovers every membership.
///
/// [`MEMBERSHIP_TOLERANCE`]: crate::matrix::MEMBERSHIP_TOLERANCE
pub const MAX_MASK_MAGNITUDE: f64 = 1_048_576.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid masking configuration: the range [{low}, {high}) must be non-empty and within [-2^20, 2^20]")]
/// Errors related to invalid masking configurations.
pub struct InvalidMaskConfigError {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// The range `[low, high)` from which every mask element is drawn uniformly.
///
/// A range which excludes `0` guarantees that no share ever equals the plaintext it hides.
pub struct MaskConfig {
    pub low: f64,
    pub high: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }
}

impl MaskConfig {
    /// Creates a masking configuration for the range `[low, high)`.
    ///
    /// # Errors
    /// Fails if a bound is not finite, exceeds [`MAX_MASK_MAGNITUDE`] or if `low >= high`.
    pub fn new(low: f64, high: f64) -> Result<Self, InvalidMaskConfigError> {
        let config = Self { low, high };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the range is non-empty and bounded by [`MAX_MASK_MAGNITUDE`].
    ///
    /// # Errors
    /// Fails if a bound is not finite, exceeds the maximum magnitude or if `low >= high`.
    pub fn validate(&self) -> Result<(), InvalidMaskConfigError> {
        let bounded = |bound: f64| bound.is_finite() && bound.abs() <= MAX_MASK_MAGNITUDE;
        if bounded(self.low) && bounded(self.high) && self.low < self.high {
            Ok(())
        } else {
            Err(InvalidMaskConfigError {
                low: self.low,
                high: self.high,
            })
        }
    }

    /// Gets the expected value of a mask element.
    pub fn mean(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Checks whether `value` lies within the masking range.
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value < self.high
    }

    /// Gets the uniform distribution over the masking range.
    ///
    /// # Errors
    /// Fails if the configuration is invalid, in which case no distribution exists.
    pub(crate) fn distribution(&self) -> Result<Uniform<f64>, InvalidMaskConfigError> {
        self.validate()?;
        Ok(Uniform::new(self.low, self.high))
    }
}
