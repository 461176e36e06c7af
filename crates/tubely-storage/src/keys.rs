//! Storage key generation.
//!
//! Keys look like `<orientation>/<32 hex chars>-processed.<ext>`. The hex part
//! carries 128 bits from the thread-local CSPRNG, so keys never collide in
//! practice and are never reused.

use rand::Rng;

use tubely_models::{MediaType, OrientationCategory, StorageKey, STORAGE_KEY_RANDOM_BYTES};

/// Lowercase hex encoding of fresh random bytes.
pub fn random_suffix() -> String {
    let mut bytes = [0u8; STORAGE_KEY_RANDOM_BYTES];
    rand::rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

/// Generate a fresh key for a processed video.
pub fn generate_storage_key(orientation: OrientationCategory, media_type: MediaType) -> StorageKey {
    StorageKey::compose(orientation, random_suffix(), media_type.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_layout() {
        let key = generate_storage_key(OrientationCategory::Portrait, MediaType::Mp4);
        let s = key.as_str();

        let rest = s.strip_prefix("portrait/").unwrap();
        let hex_part = rest.strip_suffix("-processed.mp4").unwrap();
        assert_eq!(hex_part.len(), STORAGE_KEY_RANDOM_BYTES * 2);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_other_prefix_has_separator() {
        let key = generate_storage_key(OrientationCategory::Other, MediaType::Mp4);
        assert!(key.as_str().starts_with("other/"));
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<String> = (0..10_000)
            .map(|_| generate_storage_key(OrientationCategory::Landscape, MediaType::Mp4).to_string())
            .collect();
        assert_eq!(keys.len(), 10_000);
    }
}
