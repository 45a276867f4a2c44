//! Short code generators.

pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use snip_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage;
/// the shortening service checks candidates for collisions and retries.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Produces the next candidate code.
    fn generate(&self) -> Self::Output;
}
