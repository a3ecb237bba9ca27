//! One-time code alphabet, generation and typo-tolerant sanitization.
//!
//! Codes are [`CODE_LENGTH`] characters drawn from [`CODE_ALPHABET`], which
//! omits `I`, `L`, `O` and `U`. Submitted codes are uppercased, the common
//! mistypes `O -> 0` and `I`/`L -> 1` are folded back into the alphabet, and
//! everything else outside the alphabet is dropped.

use rand::Rng;

pub const CODE_LENGTH: usize = 6;
pub const CODE_ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Produces candidate codes for issuance.
pub trait CodeSource: Send + Sync {
    fn candidate(&self) -> String;
}

/// Uniform draw from [`CODE_ALPHABET`] using the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn candidate(&self) -> String {
        let alphabet = CODE_ALPHABET.as_bytes();
        let mut rng = rand::rng();
        (0..CODE_LENGTH)
            .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
            .collect()
    }
}

#[must_use]
pub fn in_alphabet(c: char) -> bool {
    CODE_ALPHABET.contains(c)
}

/// Canonicalizes a user-submitted code. May return an empty string.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| match c.to_ascii_uppercase() {
            'O' => '0',
            'I' | 'L' => '1',
            other => other,
        })
        .filter(|c| in_alphabet(*c))
        .collect()
}
