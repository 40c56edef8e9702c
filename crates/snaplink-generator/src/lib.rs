//! Short code generators.
//!
//! Every generator honors a caller-preferred code when it is free and
//! otherwise produces a 5 character code over `[a-z0-9]` that is not in
//! the caller's exclusion set.

pub mod random;
pub mod seq;

use snaplink_core::Shortcode;
use std::collections::HashSet;
use thiserror::Error;

pub use random::{RandomGenerator, RandomGeneratorSettings};
pub use seq::SeqGenerator;

/// Symbols a generated code is drawn from.
pub const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";
/// Length of every generated code.
pub const CODE_LENGTH: usize = 5;
/// Number of distinct generated codes, `36^5`.
pub const CODE_SPACE: u64 = 60_466_176;

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("no free short code left after {attempts} attempts")]
    Exhausted { attempts: u64 },
}

/// Trait for generating short codes.
///
/// Implementations are pure with respect to storage: uniqueness is judged
/// only against `existing`. Callers submitting several links at once must
/// add each returned code to `existing` before the next call.
pub trait CodeGenerator: Send + Sync + 'static {
    /// Returns `preferred` unchanged when it is non-empty and not in
    /// `existing`, otherwise a fresh code absent from `existing`.
    fn generate(
        &self,
        existing: &HashSet<Shortcode>,
        preferred: Option<&Shortcode>,
    ) -> Result<Shortcode>;
}

/// Returns the preferred code if the caller may use it as is.
pub(crate) fn free_preferred(
    existing: &HashSet<Shortcode>,
    preferred: Option<&Shortcode>,
) -> Option<Shortcode> {
    preferred
        .filter(|code| !code.as_str().is_empty() && !existing.contains(*code))
        .cloned()
}

/// Encodes `index` (taken modulo [`CODE_SPACE`]) as a fixed-width code.
pub(crate) fn encode_index(index: u64) -> Shortcode {
    let mut value = index % CODE_SPACE;
    let mut buf = [ALPHABET[0]; CODE_LENGTH];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    // The alphabet is ASCII, so every byte maps to one char.
    Shortcode::new_unchecked(buf.iter().map(|&b| char::from(b)).collect::<String>())
}

/// Walks the whole code space once starting at `start`, returning the first
/// code not in `existing`.
pub(crate) fn scan_from(start: u64, existing: &HashSet<Shortcode>) -> Option<Shortcode> {
    (0..CODE_SPACE)
        .map(|offset| encode_index(start.wrapping_add(offset) % CODE_SPACE))
        .find(|code| !existing.contains(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_space_matches_alphabet() {
        assert_eq!(ALPHABET.len(), 36);
        assert_eq!(CODE_SPACE, 36_u64.pow(CODE_LENGTH as u32));

        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), ALPHABET.len());
    }

    #[test]
    fn encode_index_is_fixed_width() {
        assert_eq!(encode_index(0).as_str(), "aaaaa");
        assert_eq!(encode_index(1).as_str(), "aaaab");
        assert_eq!(encode_index(35).as_str(), "aaaa9");
        assert_eq!(encode_index(36).as_str(), "aaaba");
        assert_eq!(encode_index(CODE_SPACE - 1).as_str(), "99999");
        assert_eq!(encode_index(CODE_SPACE).as_str(), "aaaaa");
    }

    #[test]
    fn scan_skips_taken_codes() {
        let existing: HashSet<_> = [encode_index(10), encode_index(11)].into();
        assert_eq!(scan_from(10, &existing), Some(encode_index(12)));
    }

    #[test]
    fn scan_wraps_around_the_end() {
        let existing: HashSet<_> = [encode_index(CODE_SPACE - 1)].into();
        assert_eq!(scan_from(CODE_SPACE - 1, &existing), Some(encode_index(0)));
    }

    #[test]
    fn preferred_ignored_when_empty_or_taken() {
        let taken = Shortcode::new_unchecked("mine");
        let existing: HashSet<_> = [taken.clone()].into();

        assert_eq!(free_preferred(&existing, Some(&taken)), None);
        assert_eq!(
            free_preferred(&existing, Some(&Shortcode::new_unchecked(""))),
            None
        );
        assert_eq!(free_preferred(&existing, None), None);

        let free = Shortcode::new_unchecked("yours");
        assert_eq!(free_preferred(&existing, Some(&free)), Some(free));
    }
}
