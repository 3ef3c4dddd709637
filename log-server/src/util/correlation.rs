//! Correlation id generation.
//!
//! A correlation id is the application's prefix joined to a short random
//! identifier. It doubles as the blob store key for the dump.

use rand::prelude::*;

/// URL-safe alphabet used for short ids (64 symbols, same as nanoid).
pub const ID_ALPHABET: &[u8; 64] =
    b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Length of the random part of a correlation id.
pub const SHORT_ID_LEN: usize = 6;

/// Generate a random identifier of `len` characters from [`ID_ALPHABET`].
///
/// The alphabet has exactly 64 symbols, so masking a random byte with `63`
/// samples it uniformly.
pub fn short_id(len: usize) -> String {
    let mut rng = thread_rng();
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);

    bytes
        .into_iter()
        .map(|b| ID_ALPHABET[(b & 63) as usize] as char)
        .collect()
}

/// Build a correlation id: `prefix` + `separator` + a fresh short id.
pub fn correlation_id(prefix: &str, separator: char) -> String {
    let id = short_id(SHORT_ID_LEN);
    let mut out = String::with_capacity(prefix.len() + 1 + id.len());
    out.push_str(prefix);
    out.push(separator);
    out.push_str(&id);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_has_no_duplicates() {
        let unique: HashSet<_> = ID_ALPHABET.iter().collect();
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn test_short_id_length_and_charset() {
        let id = short_id(SHORT_ID_LEN);
        assert_eq!(id.len(), 6);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_correlation_id_shape() {
        let id = correlation_id("foo", '_');
        assert!(id.starts_with("foo_"));
        assert_eq!(id.len(), "foo_".len() + SHORT_ID_LEN);

        let id = correlation_id("foo", '/');
        assert!(id.starts_with("foo/"));
        assert!(!id["foo/".len()..].contains('/'));
    }

    #[test]
    fn test_correlation_ids_do_not_collide() {
        let ids: HashSet<String> = (0..10_000).map(|_| correlation_id("foo", '_')).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
