//! Unbounded hierarchical identity-based encryption (HIBE) on the [BLS12-381 pairing-friendly elliptic curve](https://github.com/zkcrypto/bls12_381) in Rust.
//!
//! A root authority publishes a public parameter and keeps a master secret key.
//! Identities are hierarchies of fixed-width labels; a secret key issued for a
//! hierarchy at depth ℓ can delegate keys for any of its extensions at depth
//! ℓ + 1, and a message (a point in the pairing target group) encrypted toward a
//! hierarchy can be decrypted by a key for that hierarchy. Keys and ciphertexts
//! grow linearly with the depth, see [the hibe module](`crate::hibe`).
//!
//! A byte-oriented surface suitable for crossing a foreign-function boundary is
//! provided by [the api module](`crate::api`).
//!
//! # Examples
//!
//! ```
//! use group::Group;
//! use hibe::hibe::lewko_waters as lw;
//! use hibe::Identity;
//!
//! let mut rng = rand::thread_rng();
//!
//! // Two hierarchies of 4-byte labels: (1) and its extension (1, 2).
//! let parent = Identity::from_labels(&[0, 0, 0, 1], 4).unwrap();
//! let child = Identity::from_labels(&[0, 0, 0, 1, 0, 0, 0, 2], 4).unwrap();
//!
//! // Generate a public parameter and master secret key for a root authority.
//! let (pp, msk) = lw::setup(&mut rng).unwrap();
//!
//! // Extract a key for the parent, then delegate one for the child.
//! let sk1 = lw::keygen(&msk, &parent, &mut rng);
//! let sk2 = lw::delegate(&sk1, &child, &mut rng).unwrap();
//!
//! // Encrypt a random target group element toward the child hierarchy.
//! let m = lw::Msg::random(&mut rng);
//! let c = lw::encrypt(&pp, &m, &child, &mut rng);
//!
//! assert_eq!(lw::decrypt(&sk2, &c), m);
//! ```

#![no_std]
#![deny(missing_debug_implementations, rust_2018_idioms, missing_docs)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

use core::fmt::Debug;

mod dpvs;
mod util;

pub mod api;
pub mod hibe;

pub use util::Identity;

/// Artifacts of the system with a fixed-width serialization should implement this.
///
/// Secret artifacts such as the master secret key should implement this in
/// constant time. The level-sized artifacts (secret keys, ciphertexts) carry
/// inherent `to_bytes`/`from_bytes` instead, since their width depends on the
/// hierarchy depth.
pub trait Compress: Debug + Sized + Clone {
    /// The size of the serialized output.
    const OUTPUT_SIZE: usize;

    /// The type of the output.
    type Output: Sized + AsRef<[u8]>;

    /// Serializes this artifact to its fixed-width byte representation.
    fn to_bytes(&self) -> Self::Output;

    /// Deserializes an artifact.
    fn from_bytes(output: &Self::Output) -> subtle::CtOption<Self>;
}
