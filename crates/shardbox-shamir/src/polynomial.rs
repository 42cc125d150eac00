//! Polynomial construction, evaluation, and interpolation over GF(2^8).

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::ShamirError;
use crate::gf;

/// A sample of a polynomial: `y = P(x)`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Point {
    pub x: u8,
    pub y: u8,
}

/// Build a random polynomial of the given degree whose constant term is
/// `intercept`. The remaining coefficients are drawn from the OS CSPRNG,
/// so this fails only when the random source does.
///
/// Coefficients are stored in increasing degree order (x^0 first) and
/// zeroized on drop, since the constant term is a byte of the secret.
pub(crate) fn make_polynomial(
    intercept: u8,
    degree: u8,
) -> Result<Zeroizing<Vec<u8>>, ShamirError> {
    let mut coefficients = Zeroizing::new(vec![0u8; degree as usize + 1]);
    coefficients[0] = intercept;
    OsRng
        .try_fill_bytes(&mut coefficients[1..])
        .map_err(|err| ShamirError::RandomSource(err.to_string()))?;
    Ok(coefficients)
}

/// Evaluate the polynomial at `x` using Horner's method.
pub(crate) fn evaluate(coefficients: &[u8], x: u8) -> u8 {
    coefficients
        .iter()
        .rev()
        .fold(0, |acc, &coefficient| gf::add(gf::mul(acc, x), coefficient))
}

/// Interpolate the unique polynomial through `samples` and evaluate it
/// at `x` (Lagrange form).
///
/// In GF(2^8) negation is the identity and subtraction is XOR, so each
/// basis term reduces to `(x ⊕ x_m) / (x_j ⊕ x_m)`. Sample x values must
/// be pairwise distinct and non-zero; a duplicate x divides by zero.
pub(crate) fn interpolate(samples: &[Point], x: u8) -> u8 {
    let mut result = 0;
    for (j, sample) in samples.iter().enumerate() {
        let mut basis = 1;
        for (m, other) in samples.iter().enumerate() {
            if m == j {
                continue;
            }
            basis = gf::mul(
                basis,
                gf::div(gf::add(x, other.x), gf::add(sample.x, other.x)),
            );
        }
        result = gf::add(result, gf::mul(basis, sample.y));
    }
    result
}
