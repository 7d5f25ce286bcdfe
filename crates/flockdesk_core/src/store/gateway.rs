//! Sync gateway between in-memory state and the active backend.
//!
//! # Responsibility
//! - Select the backend once at construction time.
//! - Seal values on save and run the staged decode fallback on load.
//!
//! # Invariants
//! - Selection is permanent for the gateway lifetime: a remote backend that
//!   becomes unreachable mid-session fails loudly per call, it is never
//!   demoted to local.
//! - `load_value` never fails because of legacy payload shapes; the
//!   fallback chain (envelope, plain JSON, raw string) absorbs them.

use crate::config::AppConfig;
use crate::crypto::{EnvelopeCipher, SealedEnvelope};
use crate::store::backend::SliceBackend;
use crate::store::local::{open_store, SqliteSliceBackend};
use crate::store::remote::RemoteSliceBackend;
use crate::store::slice::SliceName;
use crate::store::StoreResult;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

const LOCAL_DB_FILE: &str = "flockdesk.db";

/// Which backend the gateway selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

/// Mediates between application state and the selected slice backend.
pub struct SyncGateway {
    backend: Box<dyn SliceBackend>,
    cipher: EnvelopeCipher,
    kind: BackendKind,
}

impl SyncGateway {
    /// Wires an explicit backend; used by tests and embedded callers.
    pub fn with_backend(
        backend: Box<dyn SliceBackend>,
        cipher: EnvelopeCipher,
        kind: BackendKind,
    ) -> Self {
        Self {
            backend,
            cipher,
            kind,
        }
    }

    /// Selects a backend from configuration, once.
    ///
    /// Remote wins only when the endpoint is fully configured and the
    /// startup handshake succeeds; any handshake failure silently pins the
    /// whole session to local storage (logged, not surfaced).
    pub fn connect(config: &AppConfig) -> StoreResult<Self> {
        let cipher = match &config.envelope_key_b64 {
            Some(encoded) => EnvelopeCipher::from_key_b64(encoded)?,
            None => EnvelopeCipher::embedded(),
        };

        if let Some(remote) = &config.remote {
            if remote.is_configured() {
                match connect_remote(remote) {
                    Ok(backend) => {
                        debug!("event=backend_select module=store status=ok kind=remote");
                        return Ok(Self::with_backend(
                            Box::new(backend),
                            cipher,
                            BackendKind::Remote,
                        ));
                    }
                    Err(err) => {
                        warn!(
                            "event=backend_select module=store status=fallback kind=local reason={err}"
                        );
                    }
                }
            }
        }

        let conn = open_store(config.data_dir.join(LOCAL_DB_FILE))?;
        debug!("event=backend_select module=store status=ok kind=local");
        Ok(Self::with_backend(
            Box::new(SqliteSliceBackend::new(conn)),
            cipher,
            BackendKind::Local,
        ))
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    /// Serializes, seals and upserts one slice value wholesale.
    pub fn save<T: Serialize>(&self, slice: &SliceName, value: &T) -> StoreResult<()> {
        let plaintext = serde_json::to_string(value)?;
        let envelope = self.cipher.seal(&plaintext)?;
        let payload = serde_json::to_string(&envelope)?;
        self.backend.upsert(slice, &payload)?;
        debug!("event=slice_save module=store status=ok slice={slice}");
        Ok(())
    }

    /// Loads one slice as a JSON value.
    ///
    /// Returns `None` for a never-written slice. Legacy payloads (written
    /// before sealing existed, or sealed under a rotated key) degrade
    /// through the fallback chain instead of failing.
    pub fn load_value(&self, slice: &SliceName) -> StoreResult<Option<serde_json::Value>> {
        let Some(payload) = self.backend.fetch(slice)? else {
            return Ok(None);
        };
        Ok(Some(self.decode_payload(slice, &payload)))
    }

    /// Typed wrapper over [`Self::load_value`].
    ///
    /// A shape mismatch between the stored value and `T` is a real error
    /// here; only the payload-decoding stages degrade silently.
    pub fn load<T: DeserializeOwned>(&self, slice: &SliceName) -> StoreResult<Option<T>> {
        match self.load_value(slice)? {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn decode_payload(&self, slice: &SliceName, payload: &str) -> serde_json::Value {
        if let Ok(envelope) = serde_json::from_str::<SealedEnvelope>(payload) {
            match self.cipher.open(&envelope) {
                Ok(plaintext) => {
                    return serde_json::from_str(&plaintext).unwrap_or_else(|_| {
                        warn!(
                            "event=slice_load module=store status=fallback slice={slice} stage=plaintext_not_json"
                        );
                        serde_json::Value::String(plaintext)
                    });
                }
                Err(err) => {
                    warn!(
                        "event=slice_load module=store status=fallback slice={slice} stage=open_failed reason={err}"
                    );
                }
            }
        }

        match serde_json::from_str(payload) {
            Ok(value) => {
                warn!(
                    "event=slice_load module=store status=fallback slice={slice} stage=legacy_plain_json"
                );
                value
            }
            Err(_) => {
                warn!(
                    "event=slice_load module=store status=fallback slice={slice} stage=raw_string"
                );
                serde_json::Value::String(payload.to_string())
            }
        }
    }
}

fn connect_remote(remote: &crate::config::RemoteEndpoint) -> StoreResult<RemoteSliceBackend> {
    let backend = RemoteSliceBackend::connect(&remote.url, &remote.access_token)?;
    backend.handshake()?;
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, SyncGateway};
    use crate::crypto::EnvelopeCipher;
    use crate::store::backend::MemoryBackend;
    use crate::store::slice::SliceName;

    fn memory_gateway() -> (SyncGateway, SliceName) {
        let gateway = SyncGateway::with_backend(
            Box::new(MemoryBackend::new()),
            EnvelopeCipher::embedded(),
            BackendKind::Local,
        );
        (gateway, SliceName::new("members").unwrap())
    }

    #[test]
    fn load_of_unwritten_slice_is_none() {
        let (gateway, slice) = memory_gateway();
        assert!(gateway.load_value(&slice).unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips_typed_values() {
        let (gateway, slice) = memory_gateway();
        let names = vec!["Ana Silva".to_string(), "Rui Costa".to_string()];
        gateway.save(&slice, &names).unwrap();

        let loaded: Vec<String> = gateway.load(&slice).unwrap().unwrap();
        assert_eq!(loaded, names);
    }
}
