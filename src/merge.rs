use crate::{Cadence, Downsample, Method, ReadingStore, ReducedReading, Timestamp};
use std::collections::BTreeMap;

/// The reduced readings of several tags sharing one device sample timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedSample {
    /// Device timestamp shared by all readings of this sample
    pub measured_at_device: f64,

    /// Reduced reading per tag label
    pub tag_values: BTreeMap<String, ReducedReading>,
}

/// Join key of a device timestamp.
///
/// Device timestamps are compared for exact equality: `-0.0` and `0.0` are
/// different samples, all NaNs are the same one. Device clocks that are not
/// perfectly in sync will therefore not join.
fn join_key(measured_at_device: f64) -> u64 {
    if measured_at_device.is_nan() {
        f64::NAN.to_bits()
    } else {
        measured_at_device.to_bits()
    }
}

/// Groups several reduced series by device timestamp.
///
/// Samples are emitted in order of first appearance, walking the series in
/// the given order. A later reading replaces an earlier one with the same
/// device timestamp and tag label.
pub(crate) fn group<I>(series: I) -> Vec<MergedSample>
where
    I: IntoIterator<Item = Vec<ReducedReading>>,
{
    let mut samples: Vec<MergedSample> = Vec::new();
    let mut index: crate::HashMap<u64, usize> = crate::HashMap::default();

    for reading in series.into_iter().flatten() {
        let key = join_key(reading.measured_at_device);

        let idx = *index.entry(key).or_insert_with(|| {
            samples.push(MergedSample {
                measured_at_device: reading.measured_at_device,
                tag_values: BTreeMap::new(),
            });
            samples.len() - 1
        });

        if let Some(sample) = samples.get_mut(idx) {
            sample.tag_values.insert(reading.tag_label.clone(), reading);
        }
    }

    samples
}

/// Downsamples every tag and joins the results by device timestamp.
///
/// Tags are processed one after another, in the given order. See
/// [`crate::Engine::downsample_many`] for a parallel, cancellable variant.
///
/// # Errors
///
/// Fails with the first error of any tag's downsampling. No partial result
/// is returned.
pub fn merge<S, T>(
    store: &S,
    tag_ids: &[T],
    start: Timestamp,
    end: Timestamp,
    cadence: Cadence,
    method: Method,
) -> crate::Result<Vec<MergedSample>>
where
    S: ReadingStore + ?Sized,
    T: AsRef<str>,
{
    let series = tag_ids
        .iter()
        .map(|tag_id| {
            Downsample::new(tag_id.as_ref(), cadence, method)
                .start(start)
                .end(end)
                .run(store)
        })
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(group(series))
}
