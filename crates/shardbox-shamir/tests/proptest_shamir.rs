use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::subsequence;

use shardbox_shamir::{combine, gf, split};

/// Strategy: a threshold, a share count at least as large, and the subset
/// of share x values kept for recovery.
fn split_params() -> impl Strategy<Value = (u8, u8, Vec<u8>)> {
    (2u8..=6, 0u8..=4).prop_flat_map(|(threshold, extra)| {
        let count = threshold + extra;
        subsequence((1..=count).collect::<Vec<u8>>(), threshold as usize)
            .prop_map(move |keep| (count, threshold, keep))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_threshold_subset_recovers(
        secret in vec(any::<u8>(), 0..128),
        (count, threshold, keep) in split_params(),
    ) {
        let mut shares = split(&secret, count, threshold).unwrap();
        shares.retain(|x, _| keep.contains(x));
        prop_assert_eq!(combine(&shares), secret);
    }

    #[test]
    fn too_few_shares_yield_garbage(
        secret in vec(any::<u8>(), 8..64),
        threshold in 3u8..=6,
    ) {
        let mut shares = split(&secret, threshold, threshold).unwrap();
        shares.remove(&1);
        // With 8+ random bytes, an accidental match is a 2^-64 event.
        prop_assert_ne!(combine(&shares), secret);
    }

    #[test]
    fn shares_do_not_leak_the_secret_byte(secret_byte: u8) {
        // A share value equal to the secret byte everywhere would be a
        // catastrophic polynomial bug; a single position proves nothing,
        // so check the whole share map is not a copy of the secret.
        let secret = [secret_byte; 32];
        let shares = split(&secret, 3, 2).unwrap();
        prop_assert!(shares.values().all(|share| share.as_slice() != secret));
    }

    #[test]
    fn field_multiplication_commutes(a: u8, b: u8) {
        prop_assert_eq!(gf::mul(a, b), gf::mul(b, a));
    }

    #[test]
    fn field_inverses_round_trip(a in 1u8..=255) {
        prop_assert_eq!(gf::mul(a, gf::div(1, a)), 1);
    }

    #[test]
    fn field_division_inverts_multiplication(a: u8, b in 1u8..=255) {
        prop_assert_eq!(gf::div(gf::mul(a, b), b), a);
    }
}
