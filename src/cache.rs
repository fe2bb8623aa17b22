use crate::{Downsample, ReducedReading};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Entry = Arc<Vec<ReducedReading>>;

/// Holds one result; locked while the result is being computed
type Slot = Arc<Mutex<Option<Entry>>>;

/// Cache of downsampling results, keyed by request.
///
/// At most one computation runs per key at any time, concurrent callers of
/// the same key wait for it and share its result. Failed computations are
/// not cached. Entries must be invalidated whenever readings of their tag
/// are written.
///
/// The cache is unbounded: entries are only dropped by [`ReductionCache::invalidate`]
/// and [`ReductionCache::clear`].
#[derive(Default)]
pub struct ReductionCache {
    slots: Mutex<crate::HashMap<Downsample, Slot>>,
}

impl ReductionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, crate::HashMap<Downsample, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached result of `request`, running `compute` if there is none.
    ///
    /// # Errors
    ///
    /// Returns the error of `compute`.
    pub fn get_or_compute<F>(&self, request: &Downsample, compute: F) -> crate::Result<Entry>
    where
        F: FnOnce() -> crate::Result<Vec<ReducedReading>>,
    {
        // NOTE: Do not hold the map lock while computing
        let slot = Arc::clone(self.slots().entry(request.clone()).or_default());

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = guard.as_ref() {
            log::trace!("cache hit for {request:?}");
            return Ok(Arc::clone(entry));
        }

        log::trace!("cache miss for {request:?}");

        match compute() {
            Ok(series) => {
                let entry = Arc::new(series);
                *guard = Some(Arc::clone(&entry));
                Ok(entry)
            }
            Err(e) => {
                // NOTE: The slot is still locked and empty, so nobody can fill it meanwhile
                let mut slots = self.slots();
                if slots
                    .get(request)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot))
                {
                    slots.remove(request);
                }
                Err(e)
            }
        }
    }

    /// Drops every entry of a tag.
    pub fn invalidate(&self, tag_id: &str) {
        let mut slots = self.slots();
        let before = slots.len();

        slots.retain(|request, _| request.tag_id != tag_id);

        log::trace!(
            "invalidated {} cache entries of tag {tag_id:?}",
            before - slots.len()
        );
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.slots().clear();
    }

    /// Number of cached requests, including ones still being computed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
