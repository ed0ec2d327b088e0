//! Hierarchical identity-based encryption schemes.
//!
//! Identities are hierarchies of fixed-width labels (see [`crate::Identity`]);
//! secret keys exist per hierarchy and extend by one level through delegation,
//! without involving the root authority.
//!
//! Currently contains one scheme:
//!
//! - Lewko-Waters (unbounded depth, prime-order translation).

pub mod lewko_waters;
