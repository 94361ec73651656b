//! Key layout for persisted fields
//!
//! Every derived field of a resource lives in its own namespace:
//! - `link_basic`: classification record (mime, handler type, encoded body)
//! - `link_{field}`: any other computed field (`link_meta`, `link_images`, ...)
//!
//! The key inside a namespace is the resource cache key (hex SHA-256 of the URL).
//! Backends that need a flat key space join the two as `{namespace}:{key}`.

pub const NAMESPACE_PREFIX: &str = "link_";

pub const BASIC_FIELD: &str = "basic";

/// Namespace holding the value of `field`: link_{field}
pub fn field_namespace(field: &str) -> String {
    format!("{}{}", NAMESPACE_PREFIX, field)
}

/// Encode a flat entry key: {namespace}:{key}
pub fn encode_entry_key(namespace: &str, key: &str) -> Vec<u8> {
    format!("{}:{}", namespace, key).into_bytes()
}

/// Decode a flat entry key: {namespace}:{key} -> (namespace, key)
pub fn decode_entry_key(raw: &[u8]) -> Option<(String, String)> {
    let raw = std::str::from_utf8(raw).ok()?;
    let (namespace, key) = raw.split_once(':')?;
    if namespace.is_empty() || key.is_empty() {
        return None;
    }
    Some((namespace.to_string(), key.to_string()))
}
