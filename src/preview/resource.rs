use base64::Engine;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// MIME type of every registered image.
pub const IMAGE_MIME: &str = "image/jpeg";

/// Revocable reference to a registered image, displayed as a `blob:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:arsnap/{}", self.0)
    }
}

/// Owns image bytes behind revocable handles.
///
/// Bytes stay alive until their handle is revoked; revoking twice is a
/// no-op.
pub struct BlobRegistry {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<u64, Arc<[u8]>>>,
    revoked: AtomicU64,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            blobs: Mutex::new(HashMap::new()),
            revoked: AtomicU64::new(0),
        }
    }

    /// Register bytes and hand out a fresh handle.
    pub fn register(&self, bytes: Vec<u8>) -> ResourceHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.blobs.lock().insert(id, Arc::from(bytes));
        ResourceHandle(id)
    }

    /// Release the bytes behind `handle`. Returns `false` if it was already
    /// revoked or never registered.
    pub fn revoke(&self, handle: &ResourceHandle) -> bool {
        let removed = self.blobs.lock().remove(&handle.0).is_some();
        if removed {
            self.revoked.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    pub fn fetch(&self, handle: &ResourceHandle) -> Option<Arc<[u8]>> {
        self.blobs.lock().get(&handle.0).cloned()
    }

    /// Inline `data:` URL for hosts that cannot resolve `blob:` URLs.
    pub fn data_url(&self, handle: &ResourceHandle) -> Option<String> {
        let bytes = self.fetch(handle)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Some(format!("data:{IMAGE_MIME};base64,{encoded}"))
    }

    /// Number of handles currently registered.
    pub fn live_count(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Number of successful revocations so far.
    pub fn revoke_count(&self) -> u64 {
        self.revoked.load(Ordering::Relaxed)
    }
}

impl Default for BlobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_blob_urls() {
        let registry = BlobRegistry::new();
        let a = registry.register(vec![1]);
        let b = registry.register(vec![2]);
        assert_ne!(a, b);
        assert!(a.url().starts_with("blob:arsnap/"));
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn fetch_returns_registered_bytes() {
        let registry = BlobRegistry::new();
        let handle = registry.register(vec![0xFF, 0xD8]);
        assert_eq!(&*registry.fetch(&handle).unwrap(), &[0xFF, 0xD8]);
    }

    #[test]
    fn revoke_is_idempotent() {
        let registry = BlobRegistry::new();
        let handle = registry.register(vec![1, 2, 3]);

        assert!(registry.revoke(&handle));
        assert!(!registry.revoke(&handle));
        assert_eq!(registry.revoke_count(), 1);
        assert!(registry.fetch(&handle).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn data_url_is_base64_jpeg() {
        let registry = BlobRegistry::new();
        let handle = registry.register(vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(
            registry.data_url(&handle).unwrap(),
            "data:image/jpeg;base64,/9j/"
        );

        registry.revoke(&handle);
        assert!(registry.data_url(&handle).is_none());
    }

    #[test]
    fn handle_serialises_as_id() {
        let registry = BlobRegistry::new();
        let handle = registry.register(vec![]);
        assert_eq!(serde_json::to_value(&handle).unwrap(), handle.id());
    }
}
