//! Sentinel-style call surface with an explicit error slot.
//!
//! Some callers want the flat surface of a C-style binding: a handle or
//! nothing, a count or `-1`, and the last failure message fetched
//! separately. [`Boundary`] provides that on top of [`IndexHandle`]. Each
//! `Boundary` owns its own [`ErrorSlot`], so two callers never see each
//! other's failures; nothing is kept in thread-local or global state.
//!
//! # Example
//!
//! ```
//! use vexa_index::{Boundary, IndexConfig};
//!
//! let mut calls = Boundary::new();
//! let mut index = calls.create_index(IndexConfig::new(2, 10)).unwrap();
//!
//! assert!(!calls.insert(&mut index, &[1.0, 2.0, 3.0], 1));
//! assert!(calls.peek_error().unwrap().contains("Dimension mismatch"));
//!
//! let msg = calls.consume_error();
//! assert!(msg.is_some());
//! assert!(calls.peek_error().is_none());
//! ```

use crate::collector::SearchResult;
use crate::config::IndexConfig;
use crate::handle::IndexHandle;
use crate::{IndexError, Result};
use vexa_vector::{AnnEngine, Label};

/// Count returned by [`Boundary::search_into`] when the call failed.
pub const SEARCH_FAILED: i32 = -1;

/// Holds the most recent failure message.
///
/// A new failure replaces the previous message. Successful calls leave the
/// slot alone; only [`consume`](Self::consume) or [`clear`](Self::clear)
/// empties it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSlot {
    message: Option<String>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Read the message without clearing it.
    pub fn peek(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Read the message and clear the slot.
    pub fn consume(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn is_set(&self) -> bool {
        self.message.is_some()
    }
}

/// Per-caller call context translating `Result`s into sentinels.
#[derive(Debug, Default)]
pub struct Boundary {
    slot: ErrorSlot,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure, if any, and hand back the success value.
    fn capture<T>(&mut self, op: &'static str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(op, error = %e, "Captured index error");
                self.slot.set(format!("{}: {}", op, e));
                None
            }
        }
    }

    /// Create an HNSW index; `None` on failure.
    pub fn create_index(&mut self, config: IndexConfig) -> Option<IndexHandle> {
        self.capture("create_index", IndexHandle::create(config))
    }

    /// Release an index.
    pub fn destroy_index<E: AnnEngine>(&mut self, handle: IndexHandle<E>) {
        handle.destroy();
    }

    /// Insert a vector; `false` on failure. The handle stays usable either way.
    pub fn insert<E: AnnEngine>(
        &mut self,
        handle: &mut IndexHandle<E>,
        vector: &[f32],
        label: Label,
    ) -> bool {
        let result = handle.insert(vector, label);
        self.capture("insert", result).is_some()
    }

    /// Search into caller buffers.
    ///
    /// Returns the number of matches `n >= 0` (only the first `n` entries
    /// are meaningful) or [`SEARCH_FAILED`].
    pub fn search_into<E: AnnEngine>(
        &mut self,
        handle: &IndexHandle<E>,
        query: &[f32],
        k: usize,
        labels: &mut [Label],
        distances: &mut [f32],
    ) -> i32 {
        let result = handle
            .search_into(query, k, labels, distances)
            .and_then(|n| {
                i32::try_from(n).map_err(|_| {
                    IndexError::InvalidArgument(format!("result count {} does not fit in i32", n))
                })
            });
        self.capture("search", result).unwrap_or(SEARCH_FAILED)
    }

    /// Search returning owned arrays; `None` on failure.
    pub fn search<E: AnnEngine>(
        &mut self,
        handle: &IndexHandle<E>,
        query: &[f32],
        k: usize,
    ) -> Option<SearchResult> {
        let result = handle.search(query, k);
        self.capture("search", result)
    }

    /// Change the search width; `false` on failure.
    pub fn set_search_width<E: AnnEngine>(
        &mut self,
        handle: &mut IndexHandle<E>,
        width: usize,
    ) -> bool {
        let result = handle.set_search_width(width);
        self.capture("set_search_width", result).is_some()
    }

    /// Most recent failure, without clearing it.
    pub fn peek_error(&self) -> Option<&str> {
        self.slot.peek()
    }

    /// Most recent failure, clearing it.
    pub fn consume_error(&mut self) -> Option<String> {
        self.slot.consume()
    }

    pub fn clear_error(&mut self) {
        self.slot.clear();
    }

    pub fn slot(&self) -> &ErrorSlot {
        &self.slot
    }
}
