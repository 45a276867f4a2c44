use crate::Generator;
use rand::Rng;
use snip_core::shortcode::{ALPHABET, CODE_LENGTH};
use snip_core::ShortCode;

/// Draws every character uniformly and independently from the 62-symbol
/// alphanumeric alphabet.
///
/// The code space is 62^4 (about 14.7M). Collisions are expected well before
/// it fills up; callers own the retry policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..CODE_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_generated_form() {
        let generator = RandomGenerator::new();
        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), 4);
            assert!(code.is_generated_form(), "unexpected code {code}");
        }
    }

    #[test]
    fn codes_vary() {
        let generator = RandomGenerator::new();
        let codes: HashSet<_> = (0..100).map(|_| generator.generate()).collect();
        // 100 draws from 14.7M codes; more than a couple of repeats means the
        // generator is broken, not unlucky.
        assert!(codes.len() >= 98);
    }

    #[test]
    fn every_symbol_is_reachable() {
        let generator = RandomGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            seen.extend(generator.generate().as_str().bytes());
        }
        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
