//! Short token generation.
//!
//! Tokens are drawn uniformly and independently per position from the
//! 62-character alphanumeric alphabet (`A-Z`, `a-z`, `0-9`). They identify
//! records but are not secrets, so a fast thread-local RNG is sufficient.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated tokens.
pub const TOKEN_LENGTH: usize = 8;

/// Generates a random alphanumeric token of exactly `length` characters.
///
/// # Examples
///
/// ```
/// use linkgate::utils::token_generator::generate_token;
///
/// let token = generate_token(8);
/// assert_eq!(token.len(), 8);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Returns true if `candidate` has the shape of a generated token.
pub fn is_token_shaped(candidate: &str, length: usize) -> bool {
    candidate.len() == length && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}
