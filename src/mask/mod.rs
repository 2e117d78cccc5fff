//! Generation of ephemeral masks.
//!
//! # Masks
//! A [`Mask`] is an `N x K` matrix whose elements are drawn independently and uniformly from the
//! range configured via a [`MaskConfig`] (by default `[0, 1)`). A mask hides an
//! [`AttributeMatrix`] of the same shape when it is split into shares and must be discarded right
//! afterwards: it is neither cloneable nor serializable, its `Debug` output only reveals its shape
//! and its memory is zeroed out when it is dropped.
//!
//! # Randomness
//! Masks are drawn by a [`MaskGenerator`], which owns an explicit randomness source. The default
//! source is a `ChaCha20` PRNG seeded from the operating system, alternatively it may be seeded
//! from a [`MaskSeed`] for reproducible draws.
//!
//! ```
//! # use fairshare::mask::{MaskConfig, MaskGenerator};
//! let mut generator = MaskGenerator::from_entropy(MaskConfig::default()).unwrap();
//! let mask = generator.generate(3, 2).unwrap();
//! assert_eq!(mask.shape(), (3, 2));
//! ```
//!
//! [`AttributeMatrix`]: crate::matrix::AttributeMatrix

pub(crate) mod config;
pub(crate) mod generator;
pub(crate) mod seed;

pub use self::{
    config::{InvalidMaskConfigError, MaskConfig, MAX_MASK_MAGNITUDE},
    generator::{Mask, MaskGenerator},
    seed::{MaskSeed, SEED_LENGTH},
};
