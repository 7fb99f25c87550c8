//! Thread-shared index.

use crate::collector::SearchResult;
use crate::handle::IndexHandle;
use crate::Result;
use parking_lot::{RwLock, RwLockReadGuard};
use std::fmt;
use std::sync::Arc;
use vexa_hnsw::HnswIndex;
use vexa_vector::{AnnEngine, Label};

/// An [`IndexHandle`] behind a reader-writer lock.
///
/// Searches take the read lock and run in parallel; inserts and width
/// changes take the write lock and exclude everything else. Cloning shares
/// the same index.
pub struct SharedIndex<E: AnnEngine = HnswIndex> {
    inner: Arc<RwLock<IndexHandle<E>>>,
}

impl<E: AnnEngine> Clone for SharedIndex<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: AnnEngine> SharedIndex<E> {
    pub fn new(handle: IndexHandle<E>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(handle)),
        }
    }

    pub fn insert(&self, vector: &[f32], label: Label) -> Result<()> {
        self.inner.write().insert(vector, label)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResult> {
        self.inner.read().search(query, k)
    }

    pub fn set_search_width(&self, width: usize) -> Result<()> {
        self.inner.write().set_search_width(width)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Hold the read lock for several calls in a row.
    pub fn read(&self) -> RwLockReadGuard<'_, IndexHandle<E>> {
        self.inner.read()
    }

    /// Recover the handle if this is the last clone.
    pub fn into_inner(self) -> std::result::Result<IndexHandle<E>, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<E: AnnEngine> fmt::Debug for SharedIndex<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedIndex")
            .field("handle", &*self.inner.read())
            .finish()
    }
}

impl<E: AnnEngine> From<IndexHandle<E>> for SharedIndex<E> {
    fn from(handle: IndexHandle<E>) -> Self {
        Self::new(handle)
    }
}
