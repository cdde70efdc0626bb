//! # Metadata Store
//!
//! Owns the metadata URI per event. A URI, once set, is always non-empty;
//! absence means the event's metadata has never been set. Writes overwrite
//! unconditionally (idempotent) — manager authorization for updates lives
//! in the façade.

use std::collections::HashMap;
use std::sync::RwLock;

use tixr_core::{EventId, RegistryError};

use crate::lock;
use crate::snapshot::UriRecord;

/// Metadata URIs keyed by event id.
#[derive(Debug, Default)]
pub struct MetadataStore {
    uris: RwLock<HashMap<EventId, String>>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URI for `event`, overwriting any prior value.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UriEmpty`] if `uri` is empty; the prior value (if
    /// any) is left unchanged.
    pub fn set_uri(&self, event: EventId, uri: &str) -> Result<(), RegistryError> {
        if uri.is_empty() {
            return Err(RegistryError::UriEmpty { event });
        }
        lock::write(&self.uris).insert(event, uri.to_owned());
        Ok(())
    }

    /// The URI for `event`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventDoesNotExist`] if no URI has ever been set for
    /// `event`.
    pub fn uri(&self, event: EventId) -> Result<String, RegistryError> {
        lock::read(&self.uris)
            .get(&event)
            .cloned()
            .ok_or(RegistryError::EventDoesNotExist { event })
    }

    /// Export all records, sorted by event id.
    pub(crate) fn export(&self) -> Vec<UriRecord> {
        let uris = lock::read(&self.uris);
        let mut records: Vec<UriRecord> = uris
            .iter()
            .map(|(event, uri)| UriRecord {
                event: *event,
                uri: uri.clone(),
            })
            .collect();
        records.sort_by_key(|r| r.event);
        records
    }

    /// Rebuild the store from exported records.
    pub(crate) fn restore(records: &[UriRecord]) -> Self {
        let uris = records
            .iter()
            .map(|r| (r.event, r.uri.clone()))
            .collect::<HashMap<_, _>>();
        Self {
            uris: RwLock::new(uris),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let store = MetadataStore::new();
        store.set_uri(EventId(1), "ipfs://a").unwrap();
        assert_eq!(store.uri(EventId(1)).unwrap(), "ipfs://a");
    }

    #[test]
    fn test_unset_event_fails() {
        let store = MetadataStore::new();
        match store.uri(EventId(9)).unwrap_err() {
            RegistryError::EventDoesNotExist { event } => assert_eq!(event, EventId(9)),
            other => panic!("Expected EventDoesNotExist, got: {other:?}"),
        }
    }

    #[test]
    fn test_overwrite_is_unconditional() {
        let store = MetadataStore::new();
        store.set_uri(EventId(1), "ipfs://a").unwrap();
        store.set_uri(EventId(1), "ipfs://b").unwrap();
        assert_eq!(store.uri(EventId(1)).unwrap(), "ipfs://b");
    }

    #[test]
    fn test_empty_uri_rejected_and_prior_kept() {
        let store = MetadataStore::new();
        store.set_uri(EventId(1), "ipfs://a").unwrap();
        let result = store.set_uri(EventId(1), "");
        assert!(matches!(
            result,
            Err(RegistryError::UriEmpty { event: EventId(1) })
        ));
        assert_eq!(store.uri(EventId(1)).unwrap(), "ipfs://a");
    }

    #[test]
    fn test_export_restore_roundtrip() {
        let store = MetadataStore::new();
        store.set_uri(EventId(1), "ipfs://a").unwrap();
        store.set_uri(EventId(2), "ipfs://b").unwrap();

        let restored = MetadataStore::restore(&store.export());
        assert_eq!(restored.uri(EventId(1)).unwrap(), "ipfs://a");
        assert_eq!(restored.uri(EventId(2)).unwrap(), "ipfs://b");
    }
}
