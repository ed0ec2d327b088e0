use alloc::vec::Vec;
use group::{ff::Field, Group};
use irmaseal_curve::{Gt, Scalar};
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use tiny_keccak::Hasher;

/// Size of a serialized scalar.
pub(crate) const SCALAR_BYTES: usize = 32;

/// Size of a compressed G1 group element.
pub(crate) const G1_BYTES: usize = 48;

/// Size of a compressed G2 group element.
pub(crate) const G2_BYTES: usize = 96;

/// Size of a compressed target group element.
pub(crate) const GT_BYTES: usize = 288;

/// Size of an uncompressed target group element.
pub(crate) const GT_UNCOMPRESSED_BYTES: usize = 576;

#[inline(always)]
pub(crate) fn rand_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(rng)
}

#[inline(always)]
pub(crate) fn rand_gt<R: RngCore + CryptoRng>(rng: &mut R) -> Gt {
    Gt::random(rng)
}

pub(crate) fn shake256<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut digest = tiny_keccak::Shake::v256();
    digest.update(slice);

    let mut buf = [0u8; N];
    digest.finalize(&mut buf);

    buf
}

/// Expand caller-supplied seed bytes into a deterministic RNG.
///
/// The seed is the only entropy source; two equal seeds yield equal draws.
pub(crate) fn seeded_rng(seed: &[u8]) -> StdRng {
    StdRng::from_seed(shake256::<32>(seed))
}

/// Interpret a big-endian byte string as a scalar, reduced mod the group order.
///
/// Folds 32-byte limbs through `Scalar::from_bytes_wide` so labels of any width
/// reduce correctly.
pub(crate) fn scalar_from_be_bytes(bytes: &[u8]) -> Scalar {
    let mut acc = Scalar::zero();

    for limb in bytes.chunks(32) {
        // Shift the accumulator left by the limb width.
        let mut radix = [0u8; 64];
        radix[limb.len()] = 1;

        let mut wide = [0u8; 64];
        for (dst, src) in wide.iter_mut().zip(limb.iter().rev()) {
            *dst = *src;
        }

        acc = acc * Scalar::from_bytes_wide(&radix) + Scalar::from_bytes_wide(&wide);
    }

    acc
}

/// A hierarchical identity: a sequence of fixed-width labels, one per level.
///
/// Each label is interpreted as a big-endian integer and reduced mod the group
/// order; the scheme only ever sees the resulting scalars.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity(pub(crate) Vec<Scalar>);

impl Identity {
    /// Split `labels` into labels of `label_len` bytes each, one per hierarchy
    /// level.
    ///
    /// Returns `None` for an empty hierarchy or when `labels` is not a whole
    /// number of labels.
    pub fn from_labels(labels: &[u8], label_len: usize) -> Option<Self> {
        if label_len == 0 || labels.is_empty() || labels.len() % label_len != 0 {
            return None;
        }

        Some(Identity(
            labels
                .chunks_exact(label_len)
                .map(scalar_from_be_bytes)
                .collect(),
        ))
    }

    /// Depth of this identity in the hierarchy.
    pub fn level(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_reduction_is_big_endian() {
        let id = Identity::from_labels(&[0, 0, 0, 1], 4).unwrap();
        assert_eq!(id.0[0], Scalar::one());

        // A wide label reduces the same way as a narrow one with equal value.
        let mut wide = [0u8; 40];
        wide[39] = 1;
        let id = Identity::from_labels(&wide, 40).unwrap();
        assert_eq!(id.0[0], Scalar::one());
    }

    #[test]
    fn label_reduction_folds_limbs() {
        // 2^256 spans two limbs; the fold must shift the first limb correctly.
        let mut label = [0u8; 33];
        label[0] = 1;
        let id = Identity::from_labels(&label, 33).unwrap();

        let mut radix = [0u8; 64];
        radix[32] = 1;
        assert_eq!(id.0[0], Scalar::from_bytes_wide(&radix));
    }

    #[test]
    fn rejects_malformed_hierarchies() {
        assert!(Identity::from_labels(&[], 4).is_none());
        assert!(Identity::from_labels(&[1, 2, 3], 0).is_none());
        assert!(Identity::from_labels(&[1, 2, 3], 2).is_none());
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = seeded_rng(b"some seed");
        let mut b = seeded_rng(b"some seed");
        assert_eq!(rand_scalar(&mut a), rand_scalar(&mut b));

        let mut c = seeded_rng(b"another seed");
        assert_ne!(rand_scalar(&mut a), rand_scalar(&mut c));
    }
}
