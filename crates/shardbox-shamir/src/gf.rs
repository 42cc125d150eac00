//! GF(2^8) field arithmetic.
//!
//! Elements are bytes under the Rijndael reducing polynomial
//! x^8 + x^4 + x^3 + x + 1. Multiplication and division go through
//! precomputed exp/log tables built once at first use; the tables are
//! read-only afterwards, so unsynchronized concurrent reads are safe.
//!
//! Table lookups are not constant time (a cache-timing side channel).
//! This is an accepted limitation for a library aimed at non-interactive
//! data at rest.

use std::sync::LazyLock;

/// Low byte of the Rijndael polynomial 0x11B, XORed in on reduction.
const REDUCING_BYTE: u8 = 0x1B;

/// Generator of the multiplicative group used to walk out the tables.
const GENERATOR: u8 = 3;

struct Tables {
    exp: [u8; 256],
    log: [u8; 256],
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];

    let mut x = 1u8;
    for i in 0..255u8 {
        exp[i as usize] = x;
        log[x as usize] = i;
        x = shift_mul(x, GENERATOR);
    }
    // The multiplicative group has order 255, so the walk wraps here.
    exp[255] = exp[0];

    Tables { exp, log }
});

/// Schoolbook carry-and-reduce multiplication, used only to build the tables.
fn shift_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= REDUCING_BYTE;
        }
        b >>= 1;
    }
    product
}

/// Add two field elements.
///
/// Addition in GF(2^8) is XOR, and doubles as subtraction.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiply two field elements.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let tables = &*TABLES;
    let sum = (tables.log[a as usize] as usize + tables.log[b as usize] as usize) % 255;
    tables.exp[sum]
}

/// Divide `a` by `b`.
///
/// # Panics
/// Panics when `b` is zero; passing a zero divisor is a caller bug.
#[inline]
pub fn div(a: u8, b: u8) -> u8 {
    assert!(b != 0, "division by zero in GF(2^8)");
    if a == 0 {
        return 0;
    }
    let tables = &*TABLES;
    let diff = (tables.log[a as usize] as usize + 255 - tables.log[b as usize] as usize) % 255;
    tables.exp[diff]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The first few powers of the generator are fixed by the table build.
    #[test]
    fn test_generator_powers() {
        let tables = &*TABLES;
        assert_eq!(tables.exp[0], 1);
        assert_eq!(tables.exp[1], 3);
        assert_eq!(tables.exp[2], 5);
        assert_eq!(tables.log[1], 0);
        assert_eq!(tables.log[3], 1);
    }

    /// 0x53 * 0xCA = 1 is the classic inverse pair in the Rijndael field.
    #[test]
    fn test_known_inverse_pair() {
        assert_eq!(mul(0x53, 0xCA), 0x01);
        assert_eq!(div(1, 0x53), 0xCA);
    }

    #[test]
    fn test_add_is_xor() {
        assert_eq!(add(0x53, 0xCA), 0x53 ^ 0xCA);
        assert_eq!(add(0xFF, 0xFF), 0);
    }

    #[test]
    fn test_mul_commutes_exhaustively() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(mul(a, b), mul(b, a), "a={a} b={b}");
            }
        }
    }

    #[test]
    fn test_mul_identities() {
        for a in 0..=255u8 {
            assert_eq!(mul(a, 0), 0);
            assert_eq!(mul(a, 1), a);
        }
    }

    #[test]
    fn test_div_inverts_mul_exhaustively() {
        for a in 0..=255u8 {
            for b in 1..=255u8 {
                assert_eq!(div(mul(a, b), b), a, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn test_every_nonzero_element_has_an_inverse() {
        for a in 1..=255u8 {
            assert_eq!(mul(a, div(1, a)), 1, "a={a}");
        }
    }

    #[test]
    fn test_distributivity_over_addition() {
        for a in [0u8, 1, 2, 0x53, 0x80, 0xFF] {
            for b in 0..=255u8 {
                for c in [0u8, 7, 0xAA, 0xFF] {
                    assert_eq!(mul(a, add(b, c)), add(mul(a, b), mul(a, c)));
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn test_div_by_zero_panics() {
        div(1, 0);
    }
}
