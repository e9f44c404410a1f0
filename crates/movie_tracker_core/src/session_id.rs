//! crates/movie_tracker_core/src/session_id.rs
//!
//! Generates the short, URL-safe identifiers used as session ids and storage
//! partition keys.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

/// Length of a generated session id in characters.
pub const SESSION_ID_LEN: usize = 7;

const RAW_BYTES: usize = 5;

/// Produces a 7-character identifier from cryptographically secure random
/// bytes.
///
/// The result must be safe as a URL path segment and a partition key, so the
/// base64 alphabet's `/` and `+` are substituted and any id that would still
/// carry a substituted character is regenerated from scratch. The surviving
/// alphabet is plain `[A-Za-z0-9]`. Each call is independent; no shared
/// state, so concurrent callers need no coordination.
pub fn generate_session_id() -> String {
    loop {
        let mut bytes = [0u8; RAW_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let id = STANDARD
            .encode(bytes)
            .trim_end_matches('=')
            .replace('/', "~")
            .replace('+', "-");
        if !id.contains('-') && !id.contains('~') {
            return id;
        }
    }
}
