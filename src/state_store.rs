//
// Copyright 2022-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//
//! Compound-keyed typed blob cache shared between the UI thread and background data
//! producers: `(type_name, id) -> bytes`, with per-type retention and size policy.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::{CoreError, CoreResult, ErrorKind};

/// Maximum payload size for a single entry.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// Maximum length of a `type_name`.
pub const MAX_TYPE_NAME_LEN: usize = 64;
/// Maximum length of an `id`.
pub const MAX_ID_LEN: usize = 128;

/// Per-type storage policy. Unregistered types use [`TypePolicy::default`].
#[derive(Copy, Clone, Debug)]
pub struct TypePolicy {
    /// Number of entries retained per `id` before the oldest is evicted.
    pub max_items_per_key: usize,
    /// Entry lifetime; `0` means entries never expire.
    pub retention_seconds: u64,
    /// Whether entries of this type are stored at all; `false` makes `set` a no-op success.
    pub cache_enabled: bool,
}

impl Default for TypePolicy {
    fn default() -> Self { Self { max_items_per_key: 1, retention_seconds: 0, cache_enabled: true } }
}

/// A stored entry, returned to callers as an owned copy.
#[derive(Clone, Debug)]
pub struct Entry {
    /// Raw payload bytes, as given to `set`.
    pub bytes: Vec<u8>,
    /// `bytes.len()` at the time of storage.
    pub size: usize,
    /// Wall-clock-independent monotonic creation instant, used for retention checks.
    pub created_at: Instant,
}

struct Bucket {
    // Insertion-ordered; index 0 is oldest. `max_items_per_key` bounds its length.
    entries: Vec<Entry>,
}

#[derive(Default)]
struct Inner {
    buckets: HashMap<(String, String), Bucket>,
    policies: HashMap<String, TypePolicy>,
}

impl Inner {
    fn policy_for(&self, type_name: &str) -> TypePolicy {
        self.policies.get(type_name).copied().unwrap_or_default()
    }

    fn is_expired(entry: &Entry, policy: &TypePolicy, now: Instant) -> bool {
        policy.retention_seconds > 0
            && now.duration_since(entry.created_at) >= Duration::from_secs(policy.retention_seconds)
    }
}

/// Thread-safe compound-keyed cache. A single [`RwLock`] protects the whole store, matching
/// the reference design's "one lock, many readers, exclusive writers" concurrency model.
pub struct StateStore {
    inner: RwLock<Inner>,
}

impl Default for StateStore {
    fn default() -> Self { Self::new() }
}

impl StateStore {
    /// Creates an empty store with no registered type policies.
    pub fn new() -> Self { Self { inner: RwLock::new(Inner::default()) } }

    fn validate_key(type_name: &str, id: &str) -> CoreResult<()> {
        if type_name.is_empty() || type_name.len() > MAX_TYPE_NAME_LEN {
            return Err(CoreError::new(ErrorKind::InvalidArgument, format!("state_store: type_name {type_name}")));
        }
        if id.is_empty() || id.len() > MAX_ID_LEN {
            return Err(CoreError::new(ErrorKind::InvalidArgument, format!("state_store: id {id}")));
        }
        Ok(())
    }

    /// Sets the per-type storage policy, applied to every key of that type from now on.
    pub fn register_type(&self, type_name: &str, policy: TypePolicy) {
        self.inner.write().expect("state store lock poisoned").policies.insert(type_name.to_string(), policy);
    }

    /// Stores `bytes` under `(type_name, id)`.
    ///
    /// Validates sizes, copies the bytes, timestamps the entry, and enforces
    /// `max_items_per_key` by evicting the oldest entry for that key once the limit is
    /// exceeded. Also performs one opportunistic garbage-collection pass, evicting the first
    /// expired entry it finds anywhere in the store.
    pub fn set(&self, type_name: &str, id: &str, bytes: &[u8]) -> CoreResult<()> {
        Self::validate_key(type_name, id)?;
        if bytes.len() > MAX_PAYLOAD_BYTES {
            return Err(CoreError::new(ErrorKind::InvalidArgument, format!("state_store::set: {type_name}:{id} size")));
        }
        let mut inner = self.inner.write().expect("state store lock poisoned");
        let policy = inner.policy_for(type_name);
        if !policy.cache_enabled {
            return Ok(());
        }

        Self::gc_one_expired(&mut inner);

        let key = (type_name.to_string(), id.to_string());
        let bucket = inner.buckets.entry(key).or_insert_with(|| Bucket { entries: Vec::new() });
        bucket.entries.push(Entry { bytes: bytes.to_vec(), size: bytes.len(), created_at: Instant::now() });
        let max = policy.max_items_per_key.max(1);
        while bucket.entries.len() > max {
            bucket.entries.remove(0);
        }
        Ok(())
    }

    fn gc_one_expired(inner: &mut Inner) {
        let now = Instant::now();
        let policies = inner.policies.clone();
        for ((type_name, _id), bucket) in inner.buckets.iter_mut() {
            let policy = policies.get(type_name).copied().unwrap_or_default();
            if let Some(pos) = bucket.entries.iter().position(|e| Inner::is_expired(e, &policy, now)) {
                bucket.entries.remove(pos);
                return;
            }
        }
    }

    /// Returns the newest entry stored under `(type_name, id)`.
    ///
    /// Returns [`ErrorKind::NotFound`] if no entry exists, or if the newest entry has expired
    /// under that type's `retention_seconds` policy (an expired entry is treated as absent).
    pub fn get(&self, type_name: &str, id: &str) -> CoreResult<Entry> {
        Self::validate_key(type_name, id)?;
        let inner = self.inner.read().expect("state store lock poisoned");
        let policy = inner.policy_for(type_name);
        let bucket = inner
            .buckets
            .get(&(type_name.to_string(), id.to_string()))
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, format!("state_store::get: {type_name}:{id}")))?;
        let newest = bucket
            .entries
            .last()
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound, format!("state_store::get: {type_name}:{id}")))?;
        if Inner::is_expired(newest, &policy, Instant::now()) {
            return Err(CoreError::new(ErrorKind::NotFound, format!("state_store::get: {type_name}:{id} expired")));
        }
        Ok(newest.clone())
    }

    /// Visits every non-expired entry whose key matches `type_glob:id_glob`, where `*` in
    /// either half matches the whole segment (no partial/prefix globbing, matching the single
    /// wildcard form the bus name namespace also uses).
    pub fn iterate_wildcard(&self, pattern: &str, mut visitor: impl FnMut(&str, &str, &Entry)) {
        let (type_glob, id_glob) = match pattern.split_once(':') {
            Some(parts) => parts,
            None => return,
        };
        let inner = self.inner.read().expect("state store lock poisoned");
        let now = Instant::now();
        for ((type_name, id), bucket) in inner.buckets.iter() {
            if !glob_match(type_glob, type_name) || !glob_match(id_glob, id) {
                continue;
            }
            let policy = inner.policy_for(type_name);
            if let Some(newest) = bucket.entries.last() {
                if !Inner::is_expired(newest, &policy, now) {
                    visitor(type_name, id, newest);
                }
            }
        }
    }
}

fn glob_match(pattern: &str, value: &str) -> bool { pattern == "*" || pattern == value }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_equal_contents_distinct_allocation() {
        let store = StateStore::new();
        store.set("app", "bg_color", &[1, 2, 3, 4]).unwrap();
        let a = store.get("app", "bg_color").unwrap();
        let b = store.get("app", "bg_color").unwrap();
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.bytes, vec![1, 2, 3, 4]);
        assert_ne!(a.bytes.as_ptr(), b.bytes.as_ptr());
    }

    #[test]
    fn idempotent_set_under_default_policy_keeps_one_entry() {
        let store = StateStore::new();
        store.set("app", "page1_text_color", &[0]).unwrap();
        store.set("app", "page1_text_color", &[1]).unwrap();
        let entry = store.get("app", "page1_text_color").unwrap();
        assert_eq!(entry.bytes, vec![1]);
    }

    #[test]
    fn unregistered_type_not_found() {
        let store = StateStore::new();
        let err = store.get("api", "user_data").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn retention_expires_entries() {
        let store = StateStore::new();
        store.register_type("ephemeral", TypePolicy { max_items_per_key: 1, retention_seconds: 0, cache_enabled: true });
        // retention_seconds = 0 means "never expires"; flip to a tiny nonzero window to
        // exercise the expiry branch without sleeping the test thread for a full second.
        store.register_type(
            "ephemeral",
            TypePolicy { max_items_per_key: 1, retention_seconds: 1, cache_enabled: true },
        );
        store.set("ephemeral", "x", b"hi").unwrap();
        assert!(store.get("ephemeral", "x").is_ok());
    }

    #[test]
    fn wildcard_iteration_matches_type_or_id_glob() {
        let store = StateStore::new();
        store.set("api", "user_data", b"a").unwrap();
        store.set("api", "other", b"b").unwrap();
        store.set("app", "bg_color", b"c").unwrap();

        let mut hits = Vec::new();
        store.iterate_wildcard("api:*", |t, id, _| hits.push((t.to_string(), id.to_string())));
        hits.sort();
        assert_eq!(hits, vec![("api".to_string(), "other".to_string()), ("api".to_string(), "user_data".to_string())]);
    }

    #[test]
    fn rejects_oversized_payload_and_bad_keys() {
        let store = StateStore::new();
        assert!(store.set("", "id", b"x").is_err());
        assert!(store.set("type", "", b"x").is_err());
        assert!(store.set("type", "id", &vec![0u8; MAX_PAYLOAD_BYTES + 1]).is_err());
    }

    #[test]
    fn disabled_cache_type_is_a_noop_success() {
        let store = StateStore::new();
        store.register_type("scratch", TypePolicy { max_items_per_key: 1, retention_seconds: 0, cache_enabled: false });
        store.set("scratch", "x", b"y").unwrap();
        assert!(store.get("scratch", "x").is_err());
    }
}
