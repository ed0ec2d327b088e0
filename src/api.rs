//! Byte-oriented interface to the Lewko-Waters HIBE.
//!
//! Every entry point consumes and produces plain byte buffers in the
//! fixed-width encodings of the scheme artifacts, which makes this surface
//! suitable for crossing a foreign-function boundary. Randomized operations
//! take caller-supplied seed bytes and are fully deterministic in their inputs
//! and seed; the caller is responsible for supplying high-entropy seeds, as no
//! internal entropy source is mixed in.
//!
//! Any failure (malformed buffers, mismatched levels, an exhausted setup
//! retry budget) is reported as `None`.

use alloc::vec::Vec;

use crate::hibe::lewko_waters::{
    self as lw, ciphertext_bytes, secret_key_bytes, CipherText, Gt, MasterSecretKey,
    PublicParameter, SecretKey,
};
use crate::util::{
    rand_gt, seeded_rng, G1_BYTES, G2_BYTES, GT_BYTES, GT_UNCOMPRESSED_BYTES, SCALAR_BYTES,
};
use crate::{Compress, Identity};
use arrayref::array_ref;

/// Width of an encoded scalar in bytes.
pub const fn size_of_scalar() -> usize {
    SCALAR_BYTES
}

/// Width of a compressed G1 point in bytes.
pub const fn size_of_g1() -> usize {
    G1_BYTES
}

/// Width of a compressed G2 point in bytes.
pub const fn size_of_g2() -> usize {
    G2_BYTES
}

/// Width of a compressed target group element in bytes.
pub const fn size_of_gt_compressed() -> usize {
    GT_BYTES
}

/// Width of an uncompressed target group element in bytes.
pub const fn size_of_gt_uncompressed() -> usize {
    GT_UNCOMPRESSED_BYTES
}

/// Width of the encoded public parameter in bytes.
pub const fn size_of_public_parameter() -> usize {
    lw::PP_BYTES
}

/// Width of the encoded master secret key in bytes.
pub const fn size_of_master_secret_key() -> usize {
    lw::MSK_BYTES
}

/// Width of an encoded secret key at `level` in bytes.
pub const fn size_of_secret_key(level: usize) -> usize {
    secret_key_bytes(level)
}

/// Width of an encoded ciphertext at `level` in bytes.
pub const fn size_of_ciphertext(level: usize) -> usize {
    ciphertext_bytes(level)
}

/// Sample a uniformly distributed target group element, compressed.
///
/// This is the message space of [`encrypt`]: callers encrypt such an element
/// and typically hash its bytes into a symmetric key.
pub fn random_gt_element(seed: &[u8]) -> Vec<u8> {
    let mut rng = seeded_rng(seed);
    rand_gt(&mut rng).to_compressed().to_vec()
}

fn parse_identity(identity: &[u8], label_len: usize, level: usize) -> Option<Identity> {
    if level == 0 || label_len == 0 {
        return None;
    }
    let len = label_len.checked_mul(level)?;
    Identity::from_labels(identity.get(..len)?, label_len)
}

/// Create a fresh HIBE instance rooted at a single-label identity.
///
/// Performs setup followed by extraction for the one label in
/// `identity[..label_len]`, and returns the encoded public parameter followed
/// by the encoded level-1 secret key. The master secret key is discarded, so
/// the instance can only grow downward by [`delegate`]-ing from the returned
/// key.
pub fn setup(identity: &[u8], label_len: usize, seed: &[u8]) -> Option<Vec<u8>> {
    let id = parse_identity(identity, label_len, 1)?;
    let mut rng = seeded_rng(seed);

    let (pp, msk) = lw::setup(&mut rng)?;
    let sk = lw::keygen(&msk, &id, &mut rng);

    let mut out = Vec::with_capacity(lw::PP_BYTES + secret_key_bytes(1));
    out.extend_from_slice(pp.to_bytes().as_ref());
    out.extend_from_slice(&sk.to_bytes());
    Some(out)
}

/// Encrypt a compressed target group element toward the hierarchy formed by
/// the first `level` labels of `identity`.
pub fn encrypt(
    pp: &[u8],
    message: &[u8],
    identity: &[u8],
    label_len: usize,
    level: usize,
    seed: &[u8],
) -> Option<Vec<u8>> {
    let id = parse_identity(identity, label_len, level)?;
    if pp.len() != lw::PP_BYTES || message.len() != GT_BYTES {
        return None;
    }

    let pp = Option::from(PublicParameter::from_bytes(array_ref![pp, 0, lw::PP_BYTES]))?;
    let m = Option::from(Gt::from_compressed(array_ref![message, 0, GT_BYTES]))?;

    let mut rng = seeded_rng(seed);
    Some(lw::encrypt(&pp, &m, &id, &mut rng).to_bytes())
}

/// Decrypt a ciphertext with a secret key of the same level, returning the
/// compressed target group element.
///
/// Decryption always yields an element; a key for the wrong hierarchy yields a
/// uniformly distributed one. Callers compare the result against the element
/// they encrypted, or feed it into an authenticated layer.
pub fn decrypt(sk: &[u8], ct: &[u8], level: usize) -> Option<Vec<u8>> {
    if level == 0 || sk.len() != secret_key_bytes(level) || ct.len() != ciphertext_bytes(level) {
        return None;
    }

    let sk = Option::from(SecretKey::from_bytes(sk))?;
    let ct = Option::from(CipherText::from_bytes(ct))?;

    Some(lw::decrypt(&sk, &ct).to_compressed().to_vec())
}

/// Derive a key one level deeper from `parent_sk`, without the master secret.
///
/// The `identity` buffer carries all `new_level` labels of the delegated key;
/// the first `new_level - 1` must be the labels `parent_sk` was issued for.
/// The prefix is not verified; a mismatched prefix produces a key that fails
/// to decrypt.
pub fn delegate(
    parent_sk: &[u8],
    identity: &[u8],
    label_len: usize,
    new_level: usize,
    seed: &[u8],
) -> Option<Vec<u8>> {
    if new_level < 2 || parent_sk.len() != secret_key_bytes(new_level - 1) {
        return None;
    }
    let id = parse_identity(identity, label_len, new_level)?;

    let parent = Option::from(SecretKey::from_bytes(parent_sk))?;
    let mut rng = seeded_rng(seed);

    Some(lw::delegate(&parent, &id, &mut rng)?.to_bytes())
}

/// Extract a key at any depth directly from an encoded master secret key.
///
/// This is the root authority's counterpart to [`delegate`]: it requires the
/// master secret produced by [`lw::setup`] rather than a parent key.
pub fn keygen(
    msk: &[u8],
    identity: &[u8],
    label_len: usize,
    level: usize,
    seed: &[u8],
) -> Option<Vec<u8>> {
    if msk.len() != lw::MSK_BYTES {
        return None;
    }
    let id = parse_identity(identity, label_len, level)?;

    let msk = Option::from(MasterSecretKey::from_bytes(array_ref![
        msk,
        0,
        lw::MSK_BYTES
    ]))?;
    let mut rng = seeded_rng(seed);

    Some(lw::keygen(&msk, &id, &mut rng).to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_single_level_roundtrip() {
        let identity = [0u8, 0, 0, 1];
        let m = random_gt_element(&[0x11; 32]);

        let bundle = setup(&identity, 4, &[0x01; 32]).unwrap();
        assert_eq!(
            bundle.len(),
            size_of_public_parameter() + size_of_secret_key(1)
        );
        let (pp, sk) = bundle.split_at(size_of_public_parameter());

        let c = encrypt(pp, &m, &identity, 4, 1, &[0x02; 32]).unwrap();
        assert_eq!(c.len(), size_of_ciphertext(1));

        assert_eq!(m, decrypt(sk, &c, 1).unwrap());
    }

    #[test]
    fn eq_delegated_roundtrip() {
        let mut identity = [0u8; 32];
        identity[..5].copy_from_slice(b"alice");
        identity[16..19].copy_from_slice(b"bob");

        let bundle = setup(&identity, 16, &[0x01; 32]).unwrap();
        let (pp, sk1) = bundle.split_at(size_of_public_parameter());

        let sk2 = delegate(sk1, &identity, 16, 2, &[0x03; 32]).unwrap();
        assert_eq!(sk2.len(), size_of_secret_key(2));

        let m = random_gt_element(&[0x11; 32]);
        let c = encrypt(pp, &m, &identity, 16, 2, &[0x02; 32]).unwrap();
        assert_eq!(m, decrypt(&sk2, &c, 2).unwrap());

        // The same two labels in the other order address a different hierarchy.
        let mut swapped = [0u8; 32];
        swapped[..16].copy_from_slice(&identity[16..]);
        swapped[16..].copy_from_slice(&identity[..16]);
        let c = encrypt(pp, &m, &swapped, 16, 2, &[0x02; 32]).unwrap();
        assert_ne!(m, decrypt(&sk2, &c, 2).unwrap());
    }

    #[test]
    fn eq_keygen_from_master() {
        let mut identity = [0u8; 96];
        identity[..5].copy_from_slice(b"alice");
        identity[32..35].copy_from_slice(b"bob");
        identity[64..69].copy_from_slice(b"carol");

        let mut rng = crate::util::seeded_rng(&[0x01; 32]);
        let (pp, msk) = lw::setup(&mut rng).unwrap();

        let sk = keygen(&msk.to_bytes(), &identity, 32, 3, &[0x04; 32]).unwrap();
        assert_eq!(sk.len(), size_of_secret_key(3));

        let m = random_gt_element(&[0x11; 32]);
        let c = encrypt(&pp.to_bytes(), &m, &identity, 32, 3, &[0x02; 32]).unwrap();
        assert_eq!(m, decrypt(&sk, &c, 3).unwrap());
    }

    #[test]
    fn eq_seeded_outputs() {
        let identity = [0u8, 0, 0, 1];

        let a = setup(&identity, 4, &[0x07; 16]).unwrap();
        let b = setup(&identity, 4, &[0x07; 16]).unwrap();
        assert_eq!(a, b);

        let c = setup(&identity, 4, &[0x08; 16]).unwrap();
        assert_ne!(a, c);

        assert_eq!(
            random_gt_element(b"seed"),
            random_gt_element(b"seed")
        );
    }

    #[test]
    fn eq_predicted_sizes() {
        assert_eq!(size_of_scalar(), 32);
        assert_eq!(size_of_g1(), 48);
        assert_eq!(size_of_g2(), 96);
        assert_eq!(size_of_gt_compressed(), 288);
        assert_eq!(size_of_gt_uncompressed(), 576);

        assert_eq!(size_of_public_parameter(), 36 * 48 + 2 * 288);
        assert_eq!(size_of_master_secret_key(), 48 * 96 + 2 * 32);
        assert_eq!(size_of_secret_key(2), (36 + 12) * 96);
        assert_eq!(size_of_ciphertext(2), 576 + 12 * 48);
    }

    #[test]
    fn rejects_bad_arguments() {
        let identity = [0u8, 0, 0, 1];
        let bundle = setup(&identity, 4, &[0x01; 32]).unwrap();
        let (pp, sk) = bundle.split_at(size_of_public_parameter());
        let m = random_gt_element(&[0x11; 32]);
        let c = encrypt(pp, &m, &identity, 4, 1, &[0x02; 32]).unwrap();

        // Zero-sized arguments.
        assert!(setup(&identity, 0, &[0x01; 32]).is_none());
        assert!(encrypt(pp, &m, &identity, 4, 0, &[0x02; 32]).is_none());
        assert!(decrypt(sk, &c, 0).is_none());

        // Identity buffer shorter than label_len * level.
        assert!(encrypt(pp, &m, &identity, 4, 2, &[0x02; 32]).is_none());

        // Truncated or mismatched buffers.
        assert!(encrypt(&pp[1..], &m, &identity, 4, 1, &[0x02; 32]).is_none());
        assert!(decrypt(sk, &c, 2).is_none());
        assert!(decrypt(&sk[1..], &c, 1).is_none());
        assert!(delegate(sk, &identity, 4, 1, &[0x03; 32]).is_none());
        assert!(delegate(sk, &identity, 4, 3, &[0x03; 32]).is_none());
    }
}
