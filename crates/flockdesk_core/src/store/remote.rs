//! Remote row-store slice backend.
//!
//! # Responsibility
//! - Map the slice contract onto one logical HTTP table keyed by name.
//! - Probe reachability once at startup via `handshake`.
//!
//! # Invariants
//! - Every request carries the configured bearer access token.
//! - 404 on fetch means "never written", not an error.
//! - Mid-session transport failures surface to the caller; there is no
//!   retry or demotion to another backend at this layer.

use crate::store::backend::SliceBackend;
use crate::store::slice::SliceName;
use crate::store::{StoreError, StoreResult};
use log::info;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for a per-key row store.
pub struct RemoteSliceBackend {
    endpoint: String,
    access_token: String,
    client: Client,
}

impl RemoteSliceBackend {
    /// Builds a client for the endpoint; does not touch the network.
    pub fn connect(endpoint: &str, access_token: &str) -> StoreResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            client,
        })
    }

    /// One-shot startup reachability probe.
    pub fn handshake(&self) -> StoreResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoint))
            .bearer_auth(&self.access_token)
            .send()?;
        if !response.status().is_success() {
            return Err(StoreError::RemoteRejected {
                status: response.status().as_u16(),
            });
        }
        info!("event=remote_handshake module=store status=ok endpoint={}", self.endpoint);
        Ok(())
    }

    fn slice_url(&self, slice: &SliceName) -> String {
        format!("{}/slices/{}", self.endpoint, slice.as_str())
    }
}

impl SliceBackend for RemoteSliceBackend {
    fn fetch(&self, slice: &SliceName) -> StoreResult<Option<String>> {
        let response = self
            .client
            .get(self.slice_url(slice))
            .bearer_auth(&self.access_token)
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::RemoteRejected {
                status: response.status().as_u16(),
            });
        }
        Ok(Some(response.text()?))
    }

    fn upsert(&self, slice: &SliceName, payload: &str) -> StoreResult<()> {
        let response = self
            .client
            .put(self.slice_url(slice))
            .bearer_auth(&self.access_token)
            .body(payload.to_string())
            .send()?;

        if !response.status().is_success() {
            return Err(StoreError::RemoteRejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
