use crate::{Cadence, Reading};

/// Splits an ordered series of readings into contiguous buckets.
///
/// Every bucket holds `max(1, len / cadence)` readings, except the last one,
/// which holds whatever remains. Readings are never reordered.
pub struct Bucketizer<'a> {
    readings: &'a [Reading],
    items_per_group: usize,
}

impl<'a> Bucketizer<'a> {
    /// Creates a bucketizer over `readings`.
    #[must_use]
    pub fn new(readings: &'a [Reading], cadence: Cadence) -> Self {
        Self {
            readings,
            items_per_group: cadence.items_per_group(readings.len()),
        }
    }

    /// Number of readings per (full) bucket.
    #[must_use]
    pub fn items_per_group(&self) -> usize {
        self.items_per_group
    }
}

impl<'a> Iterator for Bucketizer<'a> {
    type Item = &'a [Reading];

    fn next(&mut self) -> Option<Self::Item> {
        if self.readings.is_empty() {
            return None;
        }

        let end = self.items_per_group.min(self.readings.len());
        let (bucket, rest) = self.readings.split_at(end);
        self.readings = rest;

        Some(bucket)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.readings.len().div_ceil(self.items_per_group);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bucketizer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn readings(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading::new(format!("r-{i}"), "t", i as f64, i as i64, i as f64, "d"))
            .collect()
    }

    fn lengths(readings: &[Reading], cadence: i64) -> crate::Result<Vec<usize>> {
        let cadence = Cadence::try_from(cadence)?;
        Ok(Bucketizer::new(readings, cadence).map(<[Reading]>::len).collect())
    }

    #[test_log::test]
    fn bucketize_even() -> crate::Result<()> {
        assert_eq!(vec![2, 2], lengths(&readings(4), 2)?);
        Ok(())
    }

    #[test_log::test]
    fn bucketize_remainder() -> crate::Result<()> {
        // 10 / 3 = 3 per bucket, the 10th reading lands in a bucket of its own
        assert_eq!(vec![3, 3, 3, 1], lengths(&readings(10), 3)?);
        Ok(())
    }

    #[test_log::test]
    fn bucketize_cadence_exceeds_len() -> crate::Result<()> {
        assert_eq!(vec![1; 5], lengths(&readings(5), 5)?);
        assert_eq!(vec![1; 5], lengths(&readings(5), 50)?);
        Ok(())
    }

    #[test_log::test]
    fn bucketize_empty() -> crate::Result<()> {
        assert!(lengths(&[], 4)?.is_empty());
        Ok(())
    }

    #[test_log::test]
    fn bucketize_keeps_order() -> crate::Result<()> {
        let readings = readings(6);
        let buckets = Bucketizer::new(&readings, Cadence::try_from(3_i64)?).collect::<Vec<_>>();

        assert_eq!(3, buckets.len());
        assert_eq!(
            vec!["r-0", "r-2", "r-4"],
            buckets
                .iter()
                .filter_map(|b| b.first())
                .map(|r| r.id.as_str())
                .collect::<Vec<_>>()
        );

        Ok(())
    }

    #[test_log::test]
    fn bucketize_size_hint() -> crate::Result<()> {
        let readings = readings(10);
        let buckets = Bucketizer::new(&readings, Cadence::try_from(3_i64)?);
        assert_eq!(4, buckets.len());
        Ok(())
    }
}
