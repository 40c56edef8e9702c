use crate::{encode_index, free_preferred, CodeGenerator, GeneratorError, Result, CODE_SPACE};
use snaplink_core::Shortcode;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic code generator walking the code space in order.
///
/// This generator produces codes like "aaaaa", "aaaab", etc., skipping any
/// that are already in the exclusion set. Useful wherever reproducible
/// codes matter more than unpredictability (tests, demos, imports).
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator whose first candidate is the code at `offset`.
    ///
    /// Useful for resuming from a known state.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for SeqGenerator {
    fn generate(
        &self,
        existing: &HashSet<Shortcode>,
        preferred: Option<&Shortcode>,
    ) -> Result<Shortcode> {
        if let Some(code) = free_preferred(existing, preferred) {
            return Ok(code);
        }

        for _ in 0..CODE_SPACE {
            let code = encode_index(self.counter.fetch_add(1, Ordering::SeqCst));
            if !existing.contains(&code) {
                return Ok(code);
            }
        }

        Err(GeneratorError::Exhausted {
            attempts: CODE_SPACE,
        })
    }
}
