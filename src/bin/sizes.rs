//! This file produces a binary that prints the sizes of the scheme artifacts:
//! the public parameter, the master secret key, and the per-level secret keys
//! and ciphertexts.

use hibe::api;

fn main() {
    println!("lewko_waters sizes in bytes:\n");
    println!("PP:\t{}", api::size_of_public_parameter());
    println!("MSK:\t{}", api::size_of_master_secret_key());
    println!("MSG:\t{}", api::size_of_gt_compressed());
    for level in 1..=4 {
        println!(
            "SK_{}:\t{}\tCT_{}:\t{}",
            level,
            api::size_of_secret_key(level),
            level,
            api::size_of_ciphertext(level)
        );
    }
}
