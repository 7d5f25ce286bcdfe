//! Backend seam for slice persistence.
//!
//! # Responsibility
//! - Define the key-to-opaque-string contract every backend implements.
//! - Provide the in-memory fake used to substitute real storage in tests.
//!
//! # Invariants
//! - `fetch` returns `None` for a never-written slice; absence is not an
//!   error.
//! - `upsert` fully replaces any prior payload for the name.

use crate::store::slice::SliceName;
use crate::store::StoreResult;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Key-value contract between the gateway and a backing store.
///
/// Payloads are opaque strings; sealing and JSON concerns live above this
/// seam. The execution model is single-threaded (one logical writer per
/// slice), so implementations may use interior mutability freely.
pub trait SliceBackend {
    fn fetch(&self, slice: &SliceName) -> StoreResult<Option<String>>;
    fn upsert(&self, slice: &SliceName, payload: &str) -> StoreResult<()>;
}

/// In-process map backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: RefCell<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw payload, bypassing the gateway's sealing path. Used to
    /// model rows written before envelope encryption existed.
    pub fn seed_raw(&self, slice: &SliceName, payload: impl Into<String>) {
        self.rows
            .borrow_mut()
            .insert(slice.as_str().to_string(), payload.into());
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }
}

impl<B: SliceBackend + ?Sized> SliceBackend for std::rc::Rc<B> {
    fn fetch(&self, slice: &SliceName) -> StoreResult<Option<String>> {
        (**self).fetch(slice)
    }

    fn upsert(&self, slice: &SliceName, payload: &str) -> StoreResult<()> {
        (**self).upsert(slice, payload)
    }
}

impl SliceBackend for MemoryBackend {
    fn fetch(&self, slice: &SliceName) -> StoreResult<Option<String>> {
        Ok(self.rows.borrow().get(slice.as_str()).cloned())
    }

    fn upsert(&self, slice: &SliceName, payload: &str) -> StoreResult<()> {
        self.rows
            .borrow_mut()
            .insert(slice.as_str().to_string(), payload.to_string());
        Ok(())
    }
}
