//! Storage of the shares of a donation batch.
//!
//! A [`ShareStore`] holds the latest [`Donation`] of one population snapshot. Donating draws a
//! fresh mask, splits the attributes and replaces the stored shares atomically:
//! - donations are serialized by a mutex which owns the mask generator, so the whole
//!   generate, split and store sequence is a critical section,
//! - readers load an immutable snapshot, so they observe either the old or the new shares but
//!   never a pair built from two different masks.
//!
//! The mask lives only inside [`ShareStore::donate()`] and is wiped when the call returns.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use arc_swap::ArcSwapOption;
use rand::{CryptoRng, RngCore};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::{
    aggregation::ShareAggregation,
    mask::{InvalidMaskConfigError, MaskConfig, MaskGenerator},
    matrix::{AttributeMatrix, DimensionError},
    reconstruct::reconstruct_pair,
    share::{split, SharePair},
};

#[derive(Debug, Error, Clone, PartialEq)]
/// Errors related to donations.
pub enum DonationError {
    #[error("donation rejected: {0}")]
    Dimension(#[from] DimensionError),
}

/// The shares of one donation.
///
/// The `Debug` output only reveals the revision and the shape, never the shares.
pub struct Donation {
    revision: u64,
    shares: SharePair,
}

impl Donation {
    /// Gets the revision of this donation. The first donation to a store has revision `1`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Gets the shares of this donation.
    pub fn shares(&self) -> &SharePair {
        &self.shares
    }

    /// Creates a share-mode aggregation over this donation.
    pub fn aggregation(&self) -> ShareAggregation {
        ShareAggregation::from_shares(&self.shares)
    }

    /// Reconstructs the donated attribute matrix.
    ///
    /// This needs both shares and must only be invoked when an explicit reconstruction is
    /// authorized, e.g. for an audit.
    pub fn reconstruct(&self) -> AttributeMatrix {
        info!(revision = self.revision, "reconstructing donation");
        reconstruct_pair(&self.shares)
    }
}

impl fmt::Debug for Donation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Donation")
            .field("revision", &self.revision)
            .field("population", &self.shares.population())
            .field("categories", &self.shares.categories())
            .finish_non_exhaustive()
    }
}

/// A store for the shares of one donation batch.
pub struct ShareStore<R = ChaCha20Rng> {
    generator: Mutex<MaskGenerator<R>>,
    donation: ArcSwapOption<Donation>,
}

impl ShareStore<ChaCha20Rng> {
    /// Creates an empty store which draws masks wrt the masking `config`uration from a PRNG
    /// seeded by the operating system.
    ///
    /// # Errors
    /// Fails if the masking configuration is invalid.
    pub fn new(config: MaskConfig) -> Result<Self, InvalidMaskConfigError> {
        Ok(Self::with_generator(MaskGenerator::from_entropy(config)?))
    }
}

impl<R> ShareStore<R>
where
    R: RngCore + CryptoRng,
{
    /// Creates an empty store which draws masks from the given `generator`.
    pub fn with_generator(generator: MaskGenerator<R>) -> Self {
        Self {
            generator: Mutex::new(generator),
            donation: ArcSwapOption::from(None),
        }
    }

    /// Donates the `attribute` matrix.
    ///
    /// A fresh mask is drawn, the attributes are split into shares and the shares replace any
    /// previously stored ones. Concurrent donations are serialized.
    ///
    /// Returns the revision of the new donation.
    ///
    /// # Errors
    /// Fails if the attribute matrix is empty, in which case the stored shares are unchanged.
    pub fn donate(&self, attribute: &AttributeMatrix) -> Result<u64, DonationError> {
        // a panic can't leave the generator in an inconsistent state, it only owns a PRNG
        let mut generator = self
            .generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (rows, cols) = attribute.dim();
        let mask = generator.generate(rows, cols)?;
        let shares = split(attribute, mask)?;

        let revision = self
            .donation
            .load_full()
            .map_or(1, |donation| donation.revision + 1);
        self.donation
            .store(Some(Arc::new(Donation { revision, shares })));
        info!(revision, rows, cols, "stored donation");
        Ok(revision)
    }

    /// Gets a snapshot of the latest donation, if any.
    pub fn snapshot(&self) -> Option<Arc<Donation>> {
        self.donation.load_full()
    }

    /// Gets the revision of the latest donation, if any.
    pub fn revision(&self) -> Option<u64> {
        self.donation.load_full().map(|donation| donation.revision)
    }
}

impl<R> fmt::Debug for ShareStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareStore")
            .field(
                "revision",
                &self.donation.load_full().map(|donation| donation.revision),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::AtomicBool, sync::atomic::Ordering, thread};

    use super::*;
    use crate::{
        aggregation::Aggregate,
        mask::{MaskSeed, SEED_LENGTH},
        matrix::WeightVector,
    };

    const EPSILON: f64 = 1e-9;

    fn store() -> ShareStore {
        let seed = MaskSeed::from_array([3_u8; SEED_LENGTH]);
        ShareStore::with_generator(MaskGenerator::from_seed(MaskConfig::default(), &seed).unwrap())
    }

    fn first() -> AttributeMatrix {
        AttributeMatrix::new(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).unwrap()
    }

    fn second() -> AttributeMatrix {
        AttributeMatrix::new(&[[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let store = store();
        assert!(store.snapshot().is_none());
        assert_eq!(store.revision(), None);
    }

    #[test]
    fn test_donate() {
        let store = store();
        assert_eq!(store.donate(&first()).unwrap(), 1);

        let donation = store.snapshot().unwrap();
        assert_eq!(donation.revision(), 1);
        assert_eq!(donation.shares().population(), 3);
        assert!(donation.reconstruct().approx_eq(&first(), EPSILON));

        let weights = WeightVector::from(vec![1.0, 2.0, 3.0]);
        let expectation = donation.aggregation().expectation(&weights).unwrap();
        assert!((expectation - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_donation_debug_is_redacted() {
        let store = store();
        store.donate(&first()).unwrap();
        let donation = store.snapshot().unwrap();
        let ttr = donation.shares().ttr().array()[[0, 0]];

        let debug = format!("{:?}", donation);
        assert!(debug.contains("revision: 1"));
        assert!(debug.contains("population: 3"));
        assert!(!debug.contains(&ttr.to_string()));
    }

    #[test]
    fn test_redonate_replaces_shares() {
        let store = store();
        store.donate(&first()).unwrap();
        let old = store.snapshot().unwrap();
        assert_eq!(store.donate(&second()).unwrap(), 2);

        let new = store.snapshot().unwrap();
        assert_eq!(new.revision(), 2);
        assert!(new.reconstruct().approx_eq(&second(), EPSILON));
        assert!(!new.reconstruct().approx_eq(&first(), EPSILON));
        // a snapshot taken earlier stays consistent
        assert!(old.reconstruct().approx_eq(&first(), EPSILON));
    }

    #[test]
    fn test_redonate_uses_fresh_mask() {
        let store = store();
        store.donate(&first()).unwrap();
        let old = store.snapshot().unwrap();
        store.donate(&first()).unwrap();
        let new = store.snapshot().unwrap();
        assert_ne!(old.shares().ttr(), new.shares().ttr());
    }

    #[test]
    fn test_failed_donation_keeps_shares() {
        let store = store();
        store.donate(&first()).unwrap();
        assert_eq!(
            store.donate(&AttributeMatrix::empty(3)).unwrap_err(),
            DonationError::Dimension(DimensionError::Degenerate { rows: 0, cols: 3 }),
        );
        assert_eq!(store.revision(), Some(1));
        assert!(store
            .snapshot()
            .unwrap()
            .reconstruct()
            .approx_eq(&first(), EPSILON));
    }

    #[test]
    fn test_concurrent_donations() {
        let store = Arc::new(store());
        let done = Arc::new(AtomicBool::new(false));
        store.donate(&first()).unwrap();

        let readers = (0..4)
            .map(|_| {
                let store = store.clone();
                let done = done.clone();
                thread::spawn(move || {
                    while !done.load(Ordering::SeqCst) {
                        let reconstructed = store.snapshot().unwrap().reconstruct();
                        assert!(
                            reconstructed.approx_eq(&first(), EPSILON)
                                || reconstructed.approx_eq(&second(), EPSILON)
                        );
                    }
                })
            })
            .collect::<Vec<_>>();

        let writers = (0..4)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let attribute = if i % 2 == 0 { first() } else { second() };
                        store.donate(&attribute).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();

        for writer in writers {
            writer.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.revision(), Some(101));
    }
}
