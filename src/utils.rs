use md5::Context as Md5;

/// Computes an MD5 hash ID with a prefix for a given string.
/// Used for deterministic message and issue identifiers.
///
/// # Arguments
/// * `content` - The string to hash
/// * `prefix` - Prefix to add to the hash (e.g., "msg-", "issue-")
///
/// # Returns
/// A string containing the prefixed MD5 hash
pub fn compute_hash_id(content: &str, prefix: &str) -> String {
    let mut hasher = Md5::new();
    hasher.consume(content.as_bytes());
    format!("{}{:x}", prefix, hasher.compute())
}
