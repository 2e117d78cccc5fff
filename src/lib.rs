//! `fairshare` computes fairness statistics over sensitive attribute data without any single
//! party seeing the individual rows.
//!
//! # Protocol
//! A donated [`AttributeMatrix`] `A` with `N` individuals and `K` categories is split with a
//! fresh uniform [`Mask`] `M` into two additive shares:
//! - the TTR share `A + M`, held by a trusted third party,
//! - the MO share `A - M`, held by a marketplace operator.
//!
//! Each holder sums the columns of its own share. Combining both column totals as
//! `(TTR + MO) / 2` yields the plaintext column totals, from which the population-level
//! statistics (diversity, coverage and expectation) follow. Individual rows are only recovered
//! by an explicit [`reconstruct`](reconstruct::reconstruct) of both shares.
//!
//! # Modules
//! - [`matrix`]: attribute matrices, weight vectors and their validation.
//! - [`mask`]: mask configuration, seeds and generation.
//! - [`share`]: splitting of attribute matrices into shares.
//! - [`reconstruct`]: recombination of both shares.
//! - [`aggregation`]: statistics in plaintext and share mode.
//! - [`store`]: a thread safe store for the shares of the latest donation.
//! - [`loader`]: reading attribute matrices from delimited files.
//! - [`settings`]: configuration of the `fairshare` binary.
//!
//! [`AttributeMatrix`]: matrix::AttributeMatrix
//! [`Mask`]: mask::Mask

#[macro_use]
extern crate serde;
#[macro_use]
extern crate tracing;

pub mod aggregation;
pub mod loader;
pub mod mask;
pub mod matrix;
pub mod reconstruct;
pub mod settings;
pub mod share;
pub mod store;
