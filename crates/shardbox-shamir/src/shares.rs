//! Splitting secrets into shares and combining shares back.

use std::collections::HashMap;

use crate::error::ShamirError;
use crate::polynomial::{self, Point};

/// Split `secret` into `count` shares, of which any `threshold` recover it.
///
/// Shares are keyed in the map by their x coordinate, 1 to `count`. The
/// key/value pairing matters: the key is the x value at which the share
/// polynomial was evaluated, so swapping two values corrupts recovery.
/// x = 0 is never used, as that is where the secret lies.
///
/// [`combine`] cannot tell whether enough shares were supplied. If that
/// matters, embed redundancy the combining side can check, for example a
/// fixed prefix of eight zero bytes; with fewer than `threshold` shares
/// the prefix survives with probability 2^-64.
///
/// Constraints: `2 <= threshold <= count <= 255`. Violations return
/// [`ShamirError::InvalidThreshold`]; a CSPRNG failure returns
/// [`ShamirError::RandomSource`] with no partial output.
pub fn split(secret: &[u8], count: u8, threshold: u8) -> Result<HashMap<u8, Vec<u8>>, ShamirError> {
    if threshold < 2 {
        return Err(ShamirError::InvalidThreshold(format!(
            "threshold {threshold} must be at least 2"
        )));
    }
    if count < threshold {
        return Err(ShamirError::InvalidThreshold(format!(
            "count {count} must not be less than threshold {threshold}"
        )));
    }

    let degree = threshold - 1;

    // One row per share; row i holds the y values for x = i + 1.
    let mut rows = vec![vec![0u8; secret.len()]; count as usize];
    for (i, &secret_byte) in secret.iter().enumerate() {
        // A fresh random polynomial per byte, hiding it in the constant term.
        let coefficients = polynomial::make_polynomial(secret_byte, degree)?;
        for (row, x) in rows.iter_mut().zip(1u8..) {
            row[i] = polynomial::evaluate(&coefficients, x);
        }
    }

    Ok((1u8..).zip(rows).collect())
}

/// Combine the available shares back into the original secret.
///
/// At least `threshold` of the original shares must be present; with fewer,
/// the output is deterministic but meaningless garbage, and this function
/// cannot detect it (see [`split`]).
///
/// All shares must be of equal length, with x values as produced by
/// [`split`] (non-zero, pairwise distinct). An empty map yields an empty
/// secret.
pub fn combine(shares: &HashMap<u8, Vec<u8>>) -> Vec<u8> {
    let secret_length = shares.values().next().map_or(0, Vec::len);

    let mut samples = Vec::with_capacity(shares.len());
    let mut secret = vec![0u8; secret_length];
    for (i, secret_byte) in secret.iter_mut().enumerate() {
        samples.clear();
        for (&x, share) in shares {
            samples.push(Point { x, y: share[i] });
        }
        *secret_byte = polynomial::interpolate(&samples, 0);
    }

    secret
}
