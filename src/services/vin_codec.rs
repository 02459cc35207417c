//! Vehicle identification numbers: generation and format checks.
//!
//! A VIN is exactly 17 characters drawn from digits and uppercase letters,
//! excluding `I`, `O` and `Q`. Generated VINs come from the same alphabet, so
//! they never need to pass through [`is_valid`].

use rand::Rng;

/// Number of characters in a VIN.
pub const VIN_LEN: usize = 17;

/// Legal VIN characters: ten digits followed by 23 letters (no I, O, Q).
pub const ALPHABET: &[u8; 33] = b"0123456789ABCDEFGHJKLMNPRSTUVWXYZ";

/// Generate a random VIN using the thread-local RNG.
///
/// Uniqueness is not guaranteed here; the store checks it on insert.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generate a random VIN from the supplied RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..VIN_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true iff `candidate` matches `^[A-HJ-NPR-Z0-9]{17}$`.
pub fn is_valid(candidate: &str) -> bool {
    candidate.len() == VIN_LEN && candidate.bytes().all(is_vin_byte)
}

fn is_vin_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'A'..=b'H' | b'J'..=b'N' | b'P' | b'R'..=b'Z')
}
