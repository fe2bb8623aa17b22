use crate::{
    merge::group, Cadence, CancelToken, Downsample, MergedSample, Method, Reading, ReadingStore,
    ReducedReading, ReductionCache, Tag, Timestamp, WritableStore,
};
use std::num::NonZeroUsize;

/// Builder for [`Engine`].
pub struct Builder<S> {
    store: S,
    parallelism: usize,
    cache: bool,
}

impl<S: ReadingStore> Builder<S> {
    fn new(store: S) -> Self {
        Self {
            store,
            parallelism: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            cache: false,
        }
    }

    /// Sets how many tags of a merge are downsampled at the same time.
    ///
    /// Default = available parallelism
    #[must_use]
    pub fn parallelism(mut self, n: usize) -> Self {
        self.parallelism = n.max(1);
        self
    }

    /// If `true`, downsampling results are cached until readings of their
    /// tag are written through [`Engine::record`] or [`Engine::invalidate`]
    /// is called.
    ///
    /// Default = false
    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Creates the engine.
    #[must_use]
    pub fn build(self) -> Engine<S> {
        Engine {
            store: self.store,
            cache: self.cache.then(ReductionCache::new),
            parallelism: self.parallelism,
        }
    }
}

/// Request surface of the downsampling engine.
///
/// Validates requests, checks that tags exist and are active, and runs
/// downsampling and merging against a [`ReadingStore`].
pub struct Engine<S> {
    store: S,
    cache: Option<ReductionCache>,
    parallelism: usize,
}

impl<S: ReadingStore> Engine<S> {
    /// Creates an engine with default settings.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::builder(store).build()
    }

    /// Returns a builder to configure an engine.
    #[must_use]
    pub fn builder(store: S) -> Builder<S> {
        Builder::new(store)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the result cache, if enabled.
    pub fn cache(&self) -> Option<&ReductionCache> {
        self.cache.as_ref()
    }

    /// Drops cached results of a tag.
    ///
    /// Must be called after writing readings of that tag without going
    /// through [`Engine::record`].
    pub fn invalidate(&self, tag_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(tag_id);
        }
    }

    /// Resolves a tag, treating deactivated tags as unknown.
    fn resolve_active(&self, tag_id: &str) -> crate::Result<Tag> {
        if tag_id.is_empty() {
            return Err(crate::Error::invalid_argument("tag_id", "tag id is not set"));
        }

        let tag = self.store.resolve_tag(tag_id)?;

        if tag.deactivated {
            log::debug!("refusing to downsample deactivated tag {tag_id:?}");
            return Err(crate::Error::not_found(tag_id));
        }

        Ok(tag)
    }

    /// Runs a downsampling request.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tag does not exist or is deactivated, and
    /// any error of [`Downsample::run`].
    pub fn downsample(&self, request: &Downsample) -> crate::Result<Vec<ReducedReading>> {
        self.resolve_active(request.tag_id())?;

        let (start, end) = request.window();
        log::debug!(
            "downsampling {:?} [{start}..{end}] into {} points using {}",
            request.tag_id,
            request.cadence,
            request.method,
        );

        let compute = || -> crate::Result<Vec<ReducedReading>> {
            let reduced = request.run(&self.store)?;
            log::trace!("{:?} reduced to {} points", request.tag_id, reduced.len());
            Ok(reduced)
        };

        match &self.cache {
            Some(cache) => cache
                .get_or_compute(request, compute)
                .map(|entry| Vec::clone(&entry)),
            None => compute(),
        }
    }

    /// Downsamples one tag.
    ///
    /// `cadence` must be positive, `method` must be a [`Method`] code (1-12).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty tag id, a non-positive cadence
    /// or an unknown method, `InvalidRange` if `end < start`, `NotFound` for
    /// unknown or deactivated tags, and `Domain` if the method is undefined
    /// for a bucket.
    pub fn downsample_one(
        &self,
        tag_id: &str,
        start: Timestamp,
        end: Timestamp,
        cadence: i64,
        method: i64,
    ) -> crate::Result<Vec<ReducedReading>> {
        let cadence = Cadence::try_from(cadence)?;
        let method = Method::try_from(method)?;

        self.downsample(&Downsample::new(tag_id, cadence, method).start(start).end(end))
    }

    /// Downsamples several tags and joins them by device timestamp.
    ///
    /// Tags are downsampled in parallel. Samples are ordered by first
    /// appearance of their device timestamp, walking the tags in the given
    /// order.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::downsample_one`] for any of the tags, and
    /// `Cancelled` if `cancel` fires before all tags are done. No partial
    /// result is returned.
    pub fn downsample_many<T: AsRef<str> + Sync>(
        &self,
        tag_ids: &[T],
        start: Timestamp,
        end: Timestamp,
        cadence: i64,
        method: i64,
        cancel: &CancelToken,
    ) -> crate::Result<Vec<MergedSample>> {
        let cadence = Cadence::try_from(cadence)?;
        let method = Method::try_from(method)?;

        let requests = tag_ids
            .iter()
            .map(|tag_id| {
                Downsample::new(tag_id.as_ref(), cadence, method)
                    .start(start)
                    .end(end)
            })
            .collect::<Vec<_>>();

        let mut series = Vec::with_capacity(requests.len());

        for chunk in requests.chunks(self.parallelism) {
            cancel.check()?;

            if let [request] = chunk {
                series.push(self.downsample_cancellable(request, cancel)?);
                continue;
            }

            let results = std::thread::scope(|scope| {
                let handles = chunk
                    .iter()
                    .map(|request| {
                        scope.spawn(move || self.downsample_cancellable(request, cancel))
                    })
                    .collect::<Vec<_>>();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect::<Vec<_>>()
            });

            for result in results {
                series.push(result?);
            }
        }

        cancel.check()?;

        let samples = group(series);
        log::debug!("merged {} tags into {} samples", tag_ids.len(), samples.len());

        Ok(samples)
    }

    fn downsample_cancellable(
        &self,
        request: &Downsample,
        cancel: &CancelToken,
    ) -> crate::Result<Vec<ReducedReading>> {
        cancel.check()?;
        let reduced = self.downsample(request)?;
        cancel.check()?;
        Ok(reduced)
    }
}

impl<S: WritableStore> Engine<S> {
    /// Writes a reading and drops cached results of its tag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reading's tag does not exist.
    pub fn record(&self, reading: Reading) -> crate::Result<()> {
        let tag_id = reading.tag_id.clone();
        self.store.insert_reading(reading)?;
        self.invalidate(&tag_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, TagStore};
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    fn engine(cache: bool) -> crate::Result<Engine<MemoryStore>> {
        let store = MemoryStore::new();
        store.create_tag(Tag::new("a", "Pressure", "hPa", "A"))?;
        store.create_tag(Tag::new("b", "Humidity", "%", "B"))?;

        let engine = Engine::builder(store).parallelism(2).cache(cache).build();

        for idx in 0..8_i64 {
            #[allow(clippy::cast_precision_loss)]
            let device_ts = idx as f64;
            #[allow(clippy::cast_precision_loss)]
            let value = (idx + 1) as f64;

            engine.record(Reading::new(format!("a-{idx}"), "a", value, idx, device_ts, "dev"))?;
            engine.record(Reading::new(
                format!("b-{idx}"),
                "b",
                value * 10.0,
                idx,
                device_ts,
                "dev",
            ))?;
        }

        Ok(engine)
    }

    fn values(series: &[ReducedReading]) -> Vec<f64> {
        series.iter().map(|r| r.value).collect()
    }

    #[test_log::test]
    fn engine_downsample_one() -> crate::Result<()> {
        let engine = engine(false)?;

        let series = engine.downsample_one("a", 0, 7, 4, Method::Average.code())?;
        assert_eq!(vec![1.5, 3.5, 5.5, 7.5], values(&series));

        // Widened to [1, 6]: values 2..=7
        let series = engine.downsample_one("a", 2, 5, 2, Method::Sum.code())?;
        assert_eq!(vec![9.0, 18.0], values(&series));

        Ok(())
    }

    #[test_log::test]
    fn engine_rejects_bad_requests() -> crate::Result<()> {
        let engine = engine(false)?;

        assert!(matches!(
            engine.downsample_one("a", 0, 7, 0, 1),
            Err(crate::Error::InvalidArgument {
                param: "cadence",
                ..
            })
        ));
        assert!(matches!(
            engine.downsample_one("a", 0, 7, -2, 1),
            Err(crate::Error::InvalidArgument {
                param: "cadence",
                ..
            })
        ));
        assert!(matches!(
            engine.downsample_one("a", 0, 7, 2, 13),
            Err(crate::Error::InvalidArgument {
                param: "method",
                ..
            })
        ));
        assert!(matches!(
            engine.downsample_one("", 0, 7, 2, 1),
            Err(crate::Error::InvalidArgument {
                param: "tag_id",
                ..
            })
        ));
        assert!(matches!(
            engine.downsample_one("a", 10, 5, 2, 1),
            Err(crate::Error::InvalidRange { start: 10, end: 5 })
        ));
        assert!(matches!(
            engine.downsample_one("zzz", 0, 7, 2, 1),
            Err(crate::Error::NotFound { .. })
        ));

        Ok(())
    }

    #[test_log::test]
    fn engine_deactivated_tag() -> crate::Result<()> {
        let engine = engine(false)?;
        engine.store().deactivate_tag("a")?;

        assert!(matches!(
            engine.downsample_one("a", 0, 7, 2, 1),
            Err(crate::Error::NotFound { tag_id }) if tag_id == "a"
        ));

        // Readings of a deactivated tag are still stored
        assert_eq!(8, engine.store().all_readings("a")?.len());

        Ok(())
    }

    #[test_log::test]
    fn engine_downsample_many() -> crate::Result<()> {
        let engine = engine(false)?;

        let samples =
            engine.downsample_many(&["a", "b"], 0, 7, 2, Method::Max.code(), &CancelToken::new())?;

        assert_eq!(2, samples.len());
        assert_eq!(0.0, samples[0].measured_at_device);
        assert_eq!(4.0, samples[0].tag_values["A"].value);
        assert_eq!(40.0, samples[0].tag_values["B"].value);
        assert_eq!(4.0, samples[1].measured_at_device);
        assert_eq!(8.0, samples[1].tag_values["A"].value);
        assert_eq!(80.0, samples[1].tag_values["B"].value);

        Ok(())
    }

    #[test_log::test]
    fn engine_downsample_many_matches_sequential_merge() -> crate::Result<()> {
        let engine = engine(false)?;
        let tags = ["b", "a", "b"];

        for method in Method::ALL {
            let parallel =
                engine.downsample_many(&tags, 1, 6, 3, method.code(), &CancelToken::new())?;
            let sequential = crate::merge(
                engine.store(),
                &tags,
                1,
                6,
                Cadence::try_from(3_i64)?,
                method,
            )?;
            assert_eq!(sequential, parallel, "{method}");
        }

        Ok(())
    }

    #[test_log::test]
    fn engine_downsample_many_empty() -> crate::Result<()> {
        let engine = engine(false)?;
        let tags: [&str; 0] = [];

        assert!(engine
            .downsample_many(&tags, 0, 7, 2, 1, &CancelToken::new())?
            .is_empty());

        Ok(())
    }

    #[test_log::test]
    fn engine_downsample_many_unknown_tag() -> crate::Result<()> {
        let engine = engine(false)?;

        assert!(matches!(
            engine.downsample_many(&["a", "b", "c"], 0, 7, 2, 1, &CancelToken::new()),
            Err(crate::Error::NotFound { tag_id }) if tag_id == "c"
        ));

        Ok(())
    }

    #[test_log::test]
    fn engine_downsample_many_cancelled() -> crate::Result<()> {
        let engine = engine(false)?;

        let cancel = CancelToken::new();
        cancel.cancel();

        assert!(matches!(
            engine.downsample_many(&["a", "b"], 0, 7, 2, 1, &cancel),
            Err(crate::Error::Cancelled)
        ));

        assert!(matches!(
            engine.downsample_many(
                &["a", "b"],
                0,
                7,
                2,
                1,
                &CancelToken::with_timeout(Duration::ZERO)
            ),
            Err(crate::Error::Cancelled)
        ));

        Ok(())
    }

    /// Cancels the token as soon as it is queried
    struct CancellingStore {
        inner: MemoryStore,
        cancel: CancelToken,
        fetches: AtomicUsize,
    }

    impl ReadingStore for CancellingStore {
        fn fetch_readings(
            &self,
            tag_id: &str,
            from: Timestamp,
            to: Timestamp,
        ) -> crate::Result<Vec<Reading>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.cancel.cancel();
            self.inner.fetch_readings(tag_id, from, to)
        }

        fn resolve_tag(&self, tag_id: &str) -> crate::Result<Tag> {
            self.inner.resolve_tag(tag_id)
        }
    }

    #[test_log::test]
    fn engine_cancel_mid_merge() -> crate::Result<()> {
        let inner = MemoryStore::new();
        for id in ["a", "b", "c"] {
            inner.create_tag(Tag::new(id, id, "x", id))?;
        }

        let cancel = CancelToken::new();
        let engine = Engine::builder(CancellingStore {
            inner,
            cancel: cancel.clone(),
            fetches: AtomicUsize::new(0),
        })
        .parallelism(1)
        .build();

        assert!(matches!(
            engine.downsample_many(&["a", "b", "c"], 0, 7, 2, 1, &cancel),
            Err(crate::Error::Cancelled)
        ));

        // Remaining tags are abandoned
        assert_eq!(1, engine.store().fetches.load(Ordering::SeqCst));

        Ok(())
    }

    #[test_log::test]
    fn engine_cache_invalidated_on_record() -> crate::Result<()> {
        let engine = engine(true)?;

        let before = engine.downsample_one("a", 0, 100, 1, Method::Count.code())?;
        assert_eq!(vec![8.0], values(&before));
        assert_eq!(Some(1), engine.cache().map(ReductionCache::len));

        // Served from cache
        assert_eq!(before, engine.downsample_one("a", 0, 100, 1, Method::Count.code())?);

        engine.record(Reading::new("a-8", "a", 9.0, 8, 8.0, "dev"))?;
        assert_eq!(Some(0), engine.cache().map(ReductionCache::len));

        let after = engine.downsample_one("a", 0, 100, 1, Method::Count.code())?;
        assert_eq!(vec![9.0], values(&after));

        Ok(())
    }

    #[test_log::test]
    fn engine_cache_respects_deactivation() -> crate::Result<()> {
        let engine = engine(true)?;

        engine.downsample_one("a", 0, 7, 2, 1)?;
        engine.store().deactivate_tag("a")?;

        assert!(matches!(
            engine.downsample_one("a", 0, 7, 2, 1),
            Err(crate::Error::NotFound { .. })
        ));

        Ok(())
    }
}
