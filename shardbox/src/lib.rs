#![deny(missing_docs)]

//! shardbox - secret splitting and hybrid encryption toolkit.
//!
//! Re-exports both cores for convenient single-crate usage:
//! Shamir secret sharing over GF(2^8), and authenticated streaming
//! ECIES on NIST P-521.

pub use shardbox_ecies as ecies;
pub use shardbox_shamir as shamir;
