//! Random string generation for throwaway secrets and canary values.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the throwaway password sent by passive OAuth2 enumeration.
pub const THROWAWAY_SECRET_LEN: usize = 10;

/// Length of the anti-CSRF canary sent to the credential-type endpoint.
pub const CANARY_LEN: usize = 248;

/// Generate a random alphanumeric string of `len` characters.
#[must_use]
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
