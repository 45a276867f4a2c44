use crate::Generator;
use snip_core::shortcode::{ALPHABET, CODE_LENGTH};
use snip_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

const CODE_SPACE: u64 = 62 * 62 * 62 * 62;

/// A deterministic generator walking the code space in base62 order.
///
/// Produces "AAAA", "AAAB", ... and wraps around after 62^4 codes. Useful
/// for reproducible runs and tests where random codes get in the way.
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

    /// Creates a generator starting from a specific counter value.
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

fn encode(mut value: u64) -> String {
    let base = ALPHABET.len() as u64;
    let mut digits = [ALPHABET[0]; CODE_LENGTH];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % base) as usize];
        value /= base;
    }
    digits.iter().map(|&b| b as char).collect()
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(encode(count % CODE_SPACE))
    }
}
