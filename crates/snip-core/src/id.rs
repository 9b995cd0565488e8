//! Snippet ID derivation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Minimum length of a generated ID.
const MIN_ID_LEN: usize = 5;

/// Derive a short, URL-safe ID from snippet content.
///
/// A wall-clock salt is hashed together with the content, so two
/// submissions of identical content still get distinct IDs. The
/// SHA-256 digest is rendered with the URL-safe base64 alphabet and
/// cut to five characters, extending the cut one character at a time
/// while the character before it is `_`, so an ID never ends in the
/// visually ambiguous filler character.
///
/// No uniqueness check is made against the store; the truncated digest
/// keeps collisions vanishingly rare at the expected volume.
pub fn generate_id(content: &[u8]) -> String {
    let salt = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(content);
    let encoded = URL_SAFE.encode(hasher.finalize());

    let mut len = MIN_ID_LEN;
    while len <= encoded.len() && encoded.as_bytes()[len - 1] == b'_' {
        len += 1;
    }
    encoded[..len].to_string()
}
