use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Bumped whenever the on-disk shape changes in a way old readers can't ignore.
/// Additive fields on `CacheEntry` do not require a bump.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Opaque `Last-Modified` header value, echoed back verbatim on revalidation.
    pub last_modified: String,
    /// zlib-compressed body bytes. Never stored decompressed.
    pub body: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OnDiskCache {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

/// Serializes `entries` into the versioned on-disk representation.
pub fn encode(entries: &HashMap<String, CacheEntry>) -> Vec<u8> {
    let on_disk = OnDiskCache {
        version: CACHE_FORMAT_VERSION,
        entries: entries.clone(),
    };
    // bincode encoding never fails for owned, non-cyclic data like this.
    bincode::serialize(&on_disk).expect("cache serialization is infallible")
}

/// Deserializes bytes written by `encode`. Empty input decodes to an empty map, per
/// the "missing/empty file is an empty cache" contract.
pub fn decode(bytes: &[u8]) -> anyhow::Result<HashMap<String, CacheEntry>> {
    if bytes.is_empty() {
        return Ok(HashMap::new());
    }
    let on_disk: OnDiskCache = bincode::deserialize(bytes)?;
    Ok(on_disk.entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bytes_decode_to_empty_map() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn round_trips_a_populated_map() {
        let mut entries = HashMap::new();
        entries.insert(
            "/g/".to_string(),
            CacheEntry {
                last_modified: "Wed, 01 Jan 2020 00:00:00 GMT".to_string(),
                body: vec![1, 2, 3, 4],
            },
        );
        let bytes = encode(&entries);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, entries);
    }
}
