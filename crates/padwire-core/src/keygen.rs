//! Key sequence generation.

use rand::Rng;

use crate::cipher::ALPHABET;

/// Generate `len` symbols sampled uniformly from Alphabet-27.
///
/// A key must be at least as long as the message it encrypts and should be
/// used for one exchange only.
pub fn generate_key<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<u8> {
    (0..len).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())]).collect()
}
