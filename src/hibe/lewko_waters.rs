//! IND-ID-CPA secure unbounded HIBE from the Lewko-Waters dual system construction,
//! translated to prime-order asymmetric pairing groups via dual pairing vector spaces.
//! * From: "[Unbounded HIBE and Attribute-Based Encryption](https://eprint.iacr.org/2011/049.pdf)"
//! * Published in: EUROCRYPT, 2011
//!
//! Secret keys and ciphertexts consist of one block of six group elements per
//! hierarchy level; the public parameter and master secret key are of fixed size.
//! Decryption performs no integrity check: a key for the wrong hierarchy yields a
//! uniformly distributed target group element.
//!
//! The structure of the byte serialisation of the various datastructures is not guaranteed
//! to remain constant between releases of this library.

use alloc::vec::Vec;

use crate::dpvs::{sample_dual_bases, DIM};
use crate::util::*;
use crate::{Compress, Identity};
use arrayref::{array_mut_ref, array_ref};
use irmaseal_curve::{
    multi_miller_loop, G1Affine, G1Projective, G2Affine, G2Prepared, G2Projective, Scalar,
};
use rand::{CryptoRng, Rng};
use subtle::{Choice, CtOption};

#[allow(unused_imports)]
use group::Group;

pub use irmaseal_curve::Gt;

/// Size of the compressed message in bytes.
pub const MSG_BYTES: usize = GT_BYTES;

/// Size of the encoded public parameter in bytes.
pub const PP_BYTES: usize = DIM * DIM * G1_BYTES + 2 * GT_BYTES;

/// Size of the encoded master secret key in bytes.
pub const MSK_BYTES: usize = DIM * (DIM + 2) * G2_BYTES + 2 * SCALAR_BYTES;

/// Size of an encoded secret key for a hierarchy at depth `level`.
pub const fn secret_key_bytes(level: usize) -> usize {
    (DIM * DIM + level * DIM) * G2_BYTES
}

/// Size of an encoded ciphertext toward a hierarchy at depth `level`.
pub const fn ciphertext_bytes(level: usize) -> usize {
    GT_UNCOMPRESSED_BYTES + level * DIM * G1_BYTES
}

/// A message that can be encrypted toward a hierarchy: a point in the target group.
///
/// You can use the byte representation to derive an AES key.
pub type Msg = Gt;

/// The six dual basis vectors blinded by the setup scalars, carried along with
/// every secret key. [`delegate`] consumes them to extend a key by one level.
///
/// In order: d1*·γ, d2*·ε, d3*·θ, d4*·θ, d5*·σ, d6*·σ.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DelegationVectors([[G2Affine; DIM]; 6]);

/// Public parameter generated by the root authority, used to encrypt messages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PublicParameter {
    e1: Gt,
    e2: Gt,
    /// The G1 side of the dual bases; row i is the basis vector d_{i+1}.
    d: [[G1Affine; DIM]; DIM],
}

/// Master secret key generated by the root authority, used to extract secret
/// keys at any depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MasterSecretKey {
    alpha1: Scalar,
    alpha2: Scalar,
    b1: [G2Affine; DIM],
    b2: [G2Affine; DIM],
    dv: DelegationVectors,
}

/// Secret key for a hierarchical identity.
///
/// Holds one block of six G2 points per hierarchy level plus the delegation
/// vectors; across the blocks, the d1*/d2* coordinates sum to the master
/// scalars (α₁, α₂), which is what makes every key of an instance open the
/// same c₀ mask.
#[derive(Clone, Debug, PartialEq)]
pub struct SecretKey {
    dv: DelegationVectors,
    k: Vec<G2Affine>,
}

/// Encrypted message. Can only be decrypted with a secret key for the same
/// hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct CipherText {
    c0: Gt,
    c: Vec<G1Affine>,
}

impl SecretKey {
    /// Depth of the identity this key was issued for.
    pub fn level(&self) -> usize {
        self.k.len() / DIM
    }
}

impl CipherText {
    /// Depth of the hierarchy this ciphertext was encrypted toward.
    pub fn level(&self) -> usize {
        self.c.len() / DIM
    }
}

fn normalize_g1(v: &[G1Projective]) -> Vec<G1Affine> {
    let mut out = alloc::vec![G1Affine::identity(); v.len()];
    G1Projective::batch_normalize(v, &mut out);
    out
}

fn normalize_g2(v: &[G2Projective]) -> Vec<G2Affine> {
    let mut out = alloc::vec![G2Affine::identity(); v.len()];
    G2Projective::batch_normalize(v, &mut out);
    out
}

fn scale_g2(v: &[G2Affine; DIM], s: &Scalar) -> [G2Affine; DIM] {
    let prods: Vec<G2Projective> = v.iter().map(|p| p * s).collect();
    let mut out = [G2Affine::identity(); DIM];
    G2Projective::batch_normalize(&prods, &mut out);
    out
}

/// Σ_j e(b[j], bstar[j]) in the target group.
fn dual_pairing_sum(b: &[G1Affine; DIM], bstar: &[G2Affine; DIM]) -> Gt {
    let prepared: Vec<G2Prepared> = bstar.iter().map(|p| G2Prepared::from(*p)).collect();
    let terms: Vec<(&G1Affine, &G2Prepared)> = b.iter().zip(prepared.iter()).collect();

    multi_miller_loop(&terms).final_exponentiation()
}

/// Generate the public parameter and master secret key of a fresh instance.
///
/// Fails only when the dual basis sampler exhausts its retry budget for
/// singular matrix draws, which a uniform draw essentially never hits.
pub fn setup<R: Rng + CryptoRng>(rng: &mut R) -> Option<(PublicParameter, MasterSecretKey)> {
    let bases = sample_dual_bases(rng)?;

    let alpha1 = rand_scalar(rng);
    let alpha2 = rand_scalar(rng);
    let gamma = rand_scalar(rng);
    let epsilon = rand_scalar(rng);
    let theta = rand_scalar(rng);
    let sigma = rand_scalar(rng);

    // By dual orthonormality these are e(g1, g2)^α₁ and e(g1, g2)^α₂, the masks
    // that blind c₀ during encryption.
    let e1 = dual_pairing_sum(&bases.b[0], &bases.bstar[0]) * alpha1;
    let e2 = dual_pairing_sum(&bases.b[1], &bases.bstar[1]) * alpha2;

    let dv = DelegationVectors([
        scale_g2(&bases.bstar[0], &gamma),
        scale_g2(&bases.bstar[1], &epsilon),
        scale_g2(&bases.bstar[2], &theta),
        scale_g2(&bases.bstar[3], &theta),
        scale_g2(&bases.bstar[4], &sigma),
        scale_g2(&bases.bstar[5], &sigma),
    ]);

    Some((
        PublicParameter {
            e1,
            e2,
            d: bases.b,
        },
        MasterSecretKey {
            alpha1,
            alpha2,
            b1: bases.bstar[0],
            b2: bases.bstar[1],
            dv,
        },
    ))
}

/// Extract a secret key for a hierarchical identity directly from the master
/// secret key.
pub fn keygen<R: Rng + CryptoRng>(
    msk: &MasterSecretKey,
    id: &Identity,
    rng: &mut R,
) -> SecretKey {
    let level = id.level();

    let mut ysum = Scalar::zero();
    let mut wsum = Scalar::zero();
    let mut blocks: Vec<G2Projective> = Vec::with_capacity(level * DIM);

    for (j, id_j) in id.0.iter().enumerate() {
        // The last block completes the masks so that the blocks sum to
        // (α₁, α₂) in the d1*/d2* coordinates.
        let (y, w) = if j == level - 1 {
            (msk.alpha1 - ysum, msk.alpha2 - wsum)
        } else {
            let y = rand_scalar(rng);
            let w = rand_scalar(rng);
            ysum += y;
            wsum += w;
            (y, w)
        };
        let r1 = rand_scalar(rng);
        let r2 = rand_scalar(rng);

        let dv = &msk.dv.0;
        for i in 0..DIM {
            blocks.push(
                msk.b1[i] * y + msk.b2[i] * w + dv[2][i] * (id_j * r1) - dv[3][i] * r1
                    + dv[4][i] * (id_j * r2)
                    - dv[5][i] * r2,
            );
        }
    }

    SecretKey {
        dv: msk.dv,
        k: normalize_g2(&blocks),
    }
}

/// Extend a secret key by one hierarchy level, without the master secret key.
///
/// `id` carries the full identity of the delegated key; its first
/// `parent.level()` labels must be the ones the parent was issued for. The
/// algorithm does not verify the prefix; a key derived under a different
/// prefix simply fails to decrypt. Returns `None` when `id` is not exactly one
/// level deeper than the parent.
pub fn delegate<R: Rng + CryptoRng>(
    parent: &SecretKey,
    id: &Identity,
    rng: &mut R,
) -> Option<SecretKey> {
    let level = id.level();
    if level != parent.level() + 1 {
        return None;
    }

    let dv = &parent.dv.0;
    let mut ysum = Scalar::zero();
    let mut wsum = Scalar::zero();
    let mut blocks: Vec<G2Projective> = Vec::with_capacity(level * DIM);

    for (j, id_j) in id.0.iter().enumerate() {
        let last = j == level - 1;
        // The fresh masks sum to zero across the blocks, so the (α₁, α₂) sum
        // carried by the parent blocks is preserved.
        let (y, w) = if last {
            (-ysum, -wsum)
        } else {
            let y = rand_scalar(rng);
            let w = rand_scalar(rng);
            ysum += y;
            wsum += w;
            (y, w)
        };
        let r1 = rand_scalar(rng);
        let r2 = rand_scalar(rng);

        for i in 0..DIM {
            let mut acc = dv[0][i] * y + dv[1][i] * w + dv[2][i] * (id_j * r1) - dv[3][i] * r1
                + dv[4][i] * (id_j * r2)
                - dv[5][i] * r2;
            if !last {
                acc += parent.k[j * DIM + i];
            }
            blocks.push(acc);
        }
    }

    Some(SecretKey {
        dv: parent.dv,
        k: normalize_g2(&blocks),
    })
}

/// Encrypt a target group element toward a hierarchical identity.
pub fn encrypt<R: Rng + CryptoRng>(
    pp: &PublicParameter,
    m: &Msg,
    id: &Identity,
    rng: &mut R,
) -> CipherText {
    let s1 = rand_scalar(rng);
    let s2 = rand_scalar(rng);

    let c0 = pp.e1 * s1 + pp.e2 * s2 + m;

    // The same s₁, s₂ appear in every block; this binds the blocks to a common
    // randomness so that decryption is a single product of pairings.
    let mut body: Vec<G1Projective> = Vec::with_capacity(id.level() * DIM);
    for id_j in id.0.iter() {
        let t1 = rand_scalar(rng);
        let t2 = rand_scalar(rng);

        for i in 0..DIM {
            body.push(
                pp.d[0][i] * s1
                    + pp.d[1][i] * s2
                    + pp.d[2][i] * t1
                    + pp.d[3][i] * (id_j * t1)
                    + pp.d[4][i] * t2
                    + pp.d[5][i] * (id_j * t2),
            );
        }
    }

    CipherText {
        c0,
        c: normalize_g1(&body),
    }
}

/// Decrypt a ciphertext with a secret key of the same level.
///
/// A key for a different hierarchy of the same depth decrypts without error to
/// a uniformly distributed target group element; callers that need integrity
/// must layer an authenticated construction on top.
pub fn decrypt(sk: &SecretKey, ct: &CipherText) -> Msg {
    let prepared: Vec<G2Prepared> = sk.k.iter().map(|p| G2Prepared::from(*p)).collect();
    let terms: Vec<(&G1Affine, &G2Prepared)> = ct.c.iter().zip(prepared.iter()).collect();

    ct.c0 - multi_miller_loop(&terms).final_exponentiation()
}

impl Compress for PublicParameter {
    const OUTPUT_SIZE: usize = PP_BYTES;
    type Output = [u8; Self::OUTPUT_SIZE];

    fn to_bytes(&self) -> Self::Output {
        let mut res = [0u8; PP_BYTES];

        *array_mut_ref![&mut res, 0, GT_BYTES] = self.e1.to_compressed();
        *array_mut_ref![&mut res, GT_BYTES, GT_BYTES] = self.e2.to_compressed();

        let mut off = 2 * GT_BYTES;
        for j in 0..DIM {
            for i in 0..DIM {
                *array_mut_ref![&mut res, off, G1_BYTES] = self.d[i][j].to_compressed();
                off += G1_BYTES;
            }
        }

        res
    }

    fn from_bytes(bytes: &Self::Output) -> CtOption<Self> {
        // An attacker able to substitute points in the public parameter could
        // just as well hand out a parameter they generated themselves, so the
        // subgroup checks are skipped.
        let e1 = Gt::from_compressed_unchecked(array_ref![bytes, 0, GT_BYTES]);
        let e2 = Gt::from_compressed_unchecked(array_ref![bytes, GT_BYTES, GT_BYTES]);

        let mut is_some = e1.is_some() & e2.is_some();
        let mut d = [[G1Affine::identity(); DIM]; DIM];
        let mut off = 2 * GT_BYTES;
        for j in 0..DIM {
            for i in 0..DIM {
                is_some &= G1Affine::from_compressed_unchecked(array_ref![bytes, off, G1_BYTES])
                    .map(|p| d[i][j] = p)
                    .is_some();
                off += G1_BYTES;
            }
        }

        CtOption::new(
            PublicParameter {
                e1: e1.unwrap_or(Gt::identity()),
                e2: e2.unwrap_or(Gt::identity()),
                d,
            },
            is_some,
        )
    }
}

impl Compress for MasterSecretKey {
    const OUTPUT_SIZE: usize = MSK_BYTES;
    type Output = [u8; Self::OUTPUT_SIZE];

    fn to_bytes(&self) -> Self::Output {
        let mut res = [0u8; MSK_BYTES];

        *array_mut_ref![&mut res, 0, SCALAR_BYTES] = self.alpha1.to_bytes();
        *array_mut_ref![&mut res, SCALAR_BYTES, SCALAR_BYTES] = self.alpha2.to_bytes();

        let mut off = 2 * SCALAR_BYTES;
        for j in 0..DIM {
            *array_mut_ref![&mut res, off, G2_BYTES] = self.b1[j].to_compressed();
            off += G2_BYTES;
            *array_mut_ref![&mut res, off, G2_BYTES] = self.b2[j].to_compressed();
            off += G2_BYTES;
            for v in self.dv.0.iter() {
                *array_mut_ref![&mut res, off, G2_BYTES] = v[j].to_compressed();
                off += G2_BYTES;
            }
        }

        res
    }

    fn from_bytes(bytes: &Self::Output) -> CtOption<Self> {
        let alpha1 = Scalar::from_bytes(array_ref![bytes, 0, SCALAR_BYTES]);
        let alpha2 = Scalar::from_bytes(array_ref![bytes, SCALAR_BYTES, SCALAR_BYTES]);

        let mut is_some = alpha1.is_some() & alpha2.is_some();
        let mut b1 = [G2Affine::identity(); DIM];
        let mut b2 = [G2Affine::identity(); DIM];
        let mut dv = [[G2Affine::identity(); DIM]; 6];
        let mut off = 2 * SCALAR_BYTES;
        for j in 0..DIM {
            is_some &= G2Affine::from_compressed(array_ref![bytes, off, G2_BYTES])
                .map(|p| b1[j] = p)
                .is_some();
            off += G2_BYTES;
            is_some &= G2Affine::from_compressed(array_ref![bytes, off, G2_BYTES])
                .map(|p| b2[j] = p)
                .is_some();
            off += G2_BYTES;
            for v in dv.iter_mut() {
                is_some &= G2Affine::from_compressed(array_ref![bytes, off, G2_BYTES])
                    .map(|p| v[j] = p)
                    .is_some();
                off += G2_BYTES;
            }
        }

        CtOption::new(
            MasterSecretKey {
                alpha1: alpha1.unwrap_or(Scalar::zero()),
                alpha2: alpha2.unwrap_or(Scalar::zero()),
                b1,
                b2,
                dv: DelegationVectors(dv),
            },
            is_some,
        )
    }
}

impl SecretKey {
    /// Serialize to `secret_key_bytes(self.level())` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(secret_key_bytes(self.level()));

        for j in 0..DIM {
            for v in self.dv.0.iter() {
                res.extend_from_slice(&v[j].to_compressed());
            }
        }
        for p in self.k.iter() {
            res.extend_from_slice(&p.to_compressed());
        }

        res
    }

    /// Deserialize a secret key, recovering the level from the buffer length.
    /// Buffers whose length matches no level at all are rejected.
    pub fn from_bytes(bytes: &[u8]) -> CtOption<Self> {
        let body = bytes.len().wrapping_sub(secret_key_bytes(0));
        if bytes.len() < secret_key_bytes(1) || body % (DIM * G2_BYTES) != 0 {
            return CtOption::new(
                SecretKey {
                    dv: DelegationVectors([[G2Affine::identity(); DIM]; 6]),
                    k: Vec::new(),
                },
                Choice::from(0u8),
            );
        }
        let level = body / (DIM * G2_BYTES);

        let mut is_some = Choice::from(1u8);
        let mut dv = [[G2Affine::identity(); DIM]; 6];
        let mut off = 0;
        for j in 0..DIM {
            for v in dv.iter_mut() {
                is_some &= G2Affine::from_compressed(array_ref![bytes, off, G2_BYTES])
                    .map(|p| v[j] = p)
                    .is_some();
                off += G2_BYTES;
            }
        }

        let mut k = alloc::vec![G2Affine::identity(); level * DIM];
        for p in k.iter_mut() {
            is_some &= G2Affine::from_compressed(array_ref![bytes, off, G2_BYTES])
                .map(|q| *p = q)
                .is_some();
            off += G2_BYTES;
        }

        CtOption::new(
            SecretKey {
                dv: DelegationVectors(dv),
                k,
            },
            is_some,
        )
    }
}

impl CipherText {
    /// Serialize to `ciphertext_bytes(self.level())` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(ciphertext_bytes(self.level()));

        res.extend_from_slice(&self.c0.to_uncompressed());
        for p in self.c.iter() {
            res.extend_from_slice(&p.to_compressed());
        }

        res
    }

    /// Deserialize a ciphertext, recovering the level from the buffer length.
    /// Buffers whose length matches no level at all are rejected.
    pub fn from_bytes(bytes: &[u8]) -> CtOption<Self> {
        let body = bytes.len().wrapping_sub(GT_UNCOMPRESSED_BYTES);
        if bytes.len() < ciphertext_bytes(1) || body % (DIM * G1_BYTES) != 0 {
            return CtOption::new(
                CipherText {
                    c0: Gt::identity(),
                    c: Vec::new(),
                },
                Choice::from(0u8),
            );
        }
        let level = body / (DIM * G1_BYTES);

        let c0 = Gt::from_uncompressed(array_ref![bytes, 0, GT_UNCOMPRESSED_BYTES]);

        let mut is_some = c0.is_some();
        let mut c = alloc::vec![G1Affine::identity(); level * DIM];
        let mut off = GT_UNCOMPRESSED_BYTES;
        for p in c.iter_mut() {
            is_some &= G1Affine::from_compressed(array_ref![bytes, off, G1_BYTES])
                .map(|q| *p = q)
                .is_some();
            off += G1_BYTES;
        }

        CtOption::new(
            CipherText {
                c0: c0.unwrap_or(Gt::identity()),
                c,
            },
            is_some,
        )
    }
}
