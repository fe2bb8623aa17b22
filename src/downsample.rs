use crate::{Bucketizer, Cadence, Method, Reading, ReadingStore, ReducedReading, Timestamp};

/// A downsampling request for one tag.
///
/// Also serves as the key of the [`crate::ReductionCache`].
#[derive(Clone, Debug, PartialEq, Eq, std::hash::Hash)]
pub struct Downsample {
    /// Tag to read
    pub(crate) tag_id: String,

    /// Start of the time window (inclusive)
    pub(crate) start: Timestamp,

    /// End of the time window (inclusive)
    pub(crate) end: Timestamp,

    /// Requested number of output points
    pub(crate) cadence: Cadence,

    /// Statistic computed per bucket
    pub(crate) method: Method,
}

impl Downsample {
    /// Creates a request spanning the whole history of the tag.
    pub fn new<T: Into<String>>(tag_id: T, cadence: Cadence, method: Method) -> Self {
        Self {
            tag_id: tag_id.into(),
            start: Timestamp::MIN,
            end: Timestamp::MAX,
            cadence,
            method,
        }
    }

    /// Sets the start of the time window.
    #[must_use]
    pub fn start(mut self, ts: Timestamp) -> Self {
        self.start = ts;
        self
    }

    /// Sets the end of the time window.
    #[must_use]
    pub fn end(mut self, ts: Timestamp) -> Self {
        self.end = ts;
        self
    }

    /// Returns the tag id.
    #[must_use]
    pub fn tag_id(&self) -> &str {
        &self.tag_id
    }

    /// Returns the time window as requested, before widening.
    #[must_use]
    pub fn window(&self) -> (Timestamp, Timestamp) {
        (self.start, self.end)
    }

    /// Checks the request, returning the widened window that is queried.
    ///
    /// The window grows by one on each side so that readings sitting exactly
    /// on a boundary are included even by stores with exclusive bounds.
    pub(crate) fn query_window(&self) -> crate::Result<(Timestamp, Timestamp)> {
        if self.tag_id.is_empty() {
            return Err(crate::Error::invalid_argument("tag_id", "tag id is not set"));
        }

        if self.end < self.start {
            return Err(crate::Error::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }

        Ok((self.start.saturating_sub(1), self.end.saturating_add(1)))
    }

    /// Fetches the readings of the window and reduces them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty tag id, `InvalidRange` if the
    /// window ends before it starts, and any error of the store or reducer.
    pub fn run<S: ReadingStore + ?Sized>(&self, store: &S) -> crate::Result<Vec<ReducedReading>> {
        let (from, to) = self.query_window()?;
        let readings = store.fetch_readings(&self.tag_id, from, to)?;
        reduce_series(&readings, self.cadence, self.method)
    }
}

/// Downsamples the readings of one tag in `[start, end]`.
///
/// # Errors
///
/// See [`Downsample::run`].
pub fn downsample<S: ReadingStore + ?Sized>(
    store: &S,
    tag_id: &str,
    start: Timestamp,
    end: Timestamp,
    cadence: Cadence,
    method: Method,
) -> crate::Result<Vec<ReducedReading>> {
    Downsample::new(tag_id, cadence, method)
        .start(start)
        .end(end)
        .run(store)
}

/// Reduces every bucket of an ordered series to one reading.
///
/// The first reading of a bucket is its representative: all fields but
/// `value` are copied from it.
pub(crate) fn reduce_series(
    readings: &[Reading],
    cadence: Cadence,
    method: Method,
) -> crate::Result<Vec<ReducedReading>> {
    let buckets = Bucketizer::new(readings, cadence);

    let mut reduced = Vec::with_capacity(buckets.len());
    let mut values = Vec::with_capacity(buckets.items_per_group());

    for bucket in buckets {
        let Some(first) = bucket.first() else {
            continue;
        };

        values.clear();
        values.extend(bucket.iter().map(|r| r.value));

        reduced.push(first.with_value(method.reduce(&values)?));
    }

    Ok(reduced)
}
