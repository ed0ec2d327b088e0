//! Dual pairing vector spaces (DPVS) over BLS12-381.
//!
//! A pair of bases (B, B*) for six-dimensional vector spaces over G1 and G2 is
//! sampled from a uniform invertible matrix X over the scalar field and its
//! inverse transpose Y, applied to the canonical bases. The bases are dual
//! orthonormal: Σ_j e(B_i[j], B*_k[j]) equals e(g1, g2) when i = k and the
//! identity of the target group otherwise.

use alloc::vec::Vec;
use group::{WnafBase, WnafScalar};
use irmaseal_curve::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use rand::{CryptoRng, Rng};

use crate::util::rand_scalar;

/// Dimension of the vector spaces.
pub(crate) const DIM: usize = 6;

/// A uniform draw is singular with probability on the order of 2^-250, so a
/// handful of retries is already unreachable in practice.
pub(crate) const MAX_SAMPLE_ATTEMPTS: usize = 8;

const WINDOW_SIZE: usize = 4;

/// A square matrix over the scalar field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Matrix(pub(crate) [[Scalar; DIM]; DIM]);

impl Matrix {
    pub(crate) fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut m = [[Scalar::zero(); DIM]; DIM];
        for row in m.iter_mut() {
            for entry in row.iter_mut() {
                *entry = rand_scalar(rng);
            }
        }
        Matrix(m)
    }

    /// Invert by Gauss-Jordan elimination without pivoting; any zero pivot is
    /// treated as singular.
    pub(crate) fn invert(&self) -> Option<Matrix> {
        let mut a = self.0;
        let mut inv = [[Scalar::zero(); DIM]; DIM];
        for (i, row) in inv.iter_mut().enumerate() {
            row[i] = Scalar::one();
        }

        for col in 0..DIM {
            let pivot_inv = Option::<Scalar>::from(a[col][col].invert())?;

            for j in 0..DIM {
                a[col][j] *= pivot_inv;
                inv[col][j] *= pivot_inv;
            }

            for row in 0..DIM {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                for j in 0..DIM {
                    let t = a[col][j] * factor;
                    a[row][j] -= t;
                    let t = inv[col][j] * factor;
                    inv[row][j] -= t;
                }
            }
        }

        Some(Matrix(inv))
    }

    pub(crate) fn transpose(&self) -> Matrix {
        let mut m = [[Scalar::zero(); DIM]; DIM];
        for (i, row) in self.0.iter().enumerate() {
            for (j, entry) in row.iter().enumerate() {
                m[j][i] = *entry;
            }
        }
        Matrix(m)
    }
}

/// A sampled pair of dual orthonormal bases: `b` spans G1^6, `bstar` spans G2^6.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DualBases {
    pub(crate) b: [[G1Affine; DIM]; DIM],
    pub(crate) bstar: [[G2Affine; DIM]; DIM],
}

/// Sample dual orthonormal bases, retrying singular matrix draws.
pub(crate) fn sample_dual_bases<R: Rng + CryptoRng>(rng: &mut R) -> Option<DualBases> {
    sample_dual_bases_with(|| Matrix::random(rng))
}

/// As [`sample_dual_bases`], with the matrix sampler split out so tests can
/// drive the retry path.
pub(crate) fn sample_dual_bases_with<S: FnMut() -> Matrix>(mut sample: S) -> Option<DualBases> {
    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let x = sample();
        if let Some(x_inv) = x.invert() {
            return Some(expand(&x, &x_inv.transpose()));
        }
    }

    None
}

/// Apply the matrix rows to the canonical bases. The canonical basis vector
/// A_i[j] is the generator at position j and the identity elsewhere, so the
/// componentwise sum collapses to B_i[j] = g1 * X[i][j] (and likewise for B*).
fn expand(x: &Matrix, y: &Matrix) -> DualBases {
    let base1 = WnafBase::<_, WINDOW_SIZE>::new(G1Projective::generator());
    let batch: Vec<G1Projective> = x
        .0
        .iter()
        .flatten()
        .map(|s| &base1 * &WnafScalar::<_, WINDOW_SIZE>::new(s))
        .collect();
    let mut flat = [G1Affine::identity(); DIM * DIM];
    G1Projective::batch_normalize(&batch, &mut flat);

    let mut b = [[G1Affine::identity(); DIM]; DIM];
    for (i, row) in b.iter_mut().enumerate() {
        row.copy_from_slice(&flat[i * DIM..(i + 1) * DIM]);
    }

    let base2 = WnafBase::<_, WINDOW_SIZE>::new(G2Projective::generator());
    let batch: Vec<G2Projective> = y
        .0
        .iter()
        .flatten()
        .map(|s| &base2 * &WnafScalar::<_, WINDOW_SIZE>::new(s))
        .collect();
    let mut flat = [G2Affine::identity(); DIM * DIM];
    G2Projective::batch_normalize(&batch, &mut flat);

    let mut bstar = [[G2Affine::identity(); DIM]; DIM];
    for (i, row) in bstar.iter_mut().enumerate() {
        row.copy_from_slice(&flat[i * DIM..(i + 1) * DIM]);
    }

    DualBases { b, bstar }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irmaseal_curve::{pairing, Gt};

    fn mul(a: &Matrix, b: &Matrix) -> Matrix {
        let mut m = [[Scalar::zero(); DIM]; DIM];
        for i in 0..DIM {
            for j in 0..DIM {
                for k in 0..DIM {
                    m[i][j] += a.0[i][k] * b.0[k][j];
                }
            }
        }
        Matrix(m)
    }

    fn identity() -> Matrix {
        let mut m = [[Scalar::zero(); DIM]; DIM];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = Scalar::one();
        }
        Matrix(m)
    }

    #[test]
    fn eq_invert_mul_identity() {
        let mut rng = rand::thread_rng();
        let x = Matrix::random(&mut rng);
        let x_inv = x.invert().unwrap();

        assert_eq!(mul(&x, &x_inv), identity());
        assert_eq!(mul(&x_inv, &x), identity());
    }

    #[test]
    fn zero_pivot_is_singular() {
        // A row swap of the identity is invertible, but elimination performs no
        // pivoting, so the zero on the diagonal must reject it.
        let mut m = identity();
        m.0[0].swap(0, 1);
        m.0[1].swap(0, 1);

        assert!(m.invert().is_none());
    }

    #[test]
    fn eq_dual_orthonormal() {
        let mut rng = rand::thread_rng();
        let bases = sample_dual_bases(&mut rng).unwrap();

        let gt = pairing(&G1Affine::generator(), &G2Affine::generator());

        for i in 0..DIM {
            for k in 0..DIM {
                let mut acc = Gt::identity();
                for j in 0..DIM {
                    acc += pairing(&bases.b[i][j], &bases.bstar[k][j]);
                }
                if i == k {
                    assert_eq!(acc, gt);
                } else {
                    assert_eq!(acc, Gt::identity());
                }
            }
        }
    }

    #[test]
    fn retries_singular_draws() {
        let mut rng = rand::thread_rng();
        let invertible = Matrix::random(&mut rng);
        assert!(invertible.invert().is_some());

        let mut draws = 0;
        let bases = sample_dual_bases_with(|| {
            draws += 1;
            if draws == 1 {
                Matrix([[Scalar::zero(); DIM]; DIM])
            } else {
                invertible
            }
        });

        assert!(bases.is_some());
        assert_eq!(draws, 2);
    }

    #[test]
    fn exhausts_retry_budget() {
        let mut draws = 0;
        let bases = sample_dual_bases_with(|| {
            draws += 1;
            Matrix([[Scalar::zero(); DIM]; DIM])
        });

        assert!(bases.is_none());
        assert_eq!(draws, MAX_SAMPLE_ATTEMPTS);
    }
}
