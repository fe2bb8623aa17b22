use super::{ReadingStore, TagStore, WritableStore};
use crate::{timestamp, Reading, Tag, TagChanges, Timestamp};
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

struct Series {
    tag: Tag,

    /// Sorted by `(measured_at, id)`
    readings: Vec<Reading>,
}

/// In-memory store, mainly for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    series: RwLock<BTreeMap<String, Series>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Series>> {
        self.series.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Series>> {
        self.series.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReadingStore for MemoryStore {
    fn fetch_readings(
        &self,
        tag_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> crate::Result<Vec<Reading>> {
        let lock = self.read();
        let series = lock.get(tag_id).ok_or_else(|| crate::Error::not_found(tag_id))?;

        let lo = series.readings.partition_point(|r| r.measured_at < from);
        let hi = series.readings.partition_point(|r| r.measured_at <= to);

        Ok(series
            .readings
            .get(lo..hi)
            .map(<[Reading]>::to_vec)
            .unwrap_or_default())
    }

    fn resolve_tag(&self, tag_id: &str) -> crate::Result<Tag> {
        self.read()
            .get(tag_id)
            .map(|series| series.tag.clone())
            .ok_or_else(|| crate::Error::not_found(tag_id))
    }
}

impl WritableStore for MemoryStore {
    fn insert_reading(&self, mut reading: Reading) -> crate::Result<()> {
        let mut lock = self.write();
        let series = lock
            .get_mut(&reading.tag_id)
            .ok_or_else(|| crate::Error::not_found(&reading.tag_id))?;

        reading.tag_label.clone_from(&series.tag.tag_label);

        // NOTE: Same order and overwrite rule as the keys of `Database`
        match series.readings.binary_search_by(|r| {
            (r.measured_at, r.id.as_str()).cmp(&(reading.measured_at, reading.id.as_str()))
        }) {
            Ok(idx) => {
                if let Some(slot) = series.readings.get_mut(idx) {
                    *slot = reading;
                }
            }
            Err(idx) => series.readings.insert(idx, reading),
        }

        Ok(())
    }
}

impl TagStore for MemoryStore {
    fn create_tag(&self, mut tag: Tag) -> crate::Result<Tag> {
        tag.validate()?;

        let mut lock = self.write();

        if lock.contains_key(&tag.id) {
            return Err(crate::Error::invalid_argument(
                "tag_id",
                format!("tag {:?} already exists", tag.id),
            ));
        }

        tag.created_at = timestamp();
        tag.deactivated = false;

        lock.insert(
            tag.id.clone(),
            Series {
                tag: tag.clone(),
                readings: Vec::new(),
            },
        );

        Ok(tag)
    }

    fn list_tags(&self) -> crate::Result<Vec<Tag>> {
        Ok(self.read().values().map(|series| series.tag.clone()).collect())
    }

    fn update_tag(&self, tag_id: &str, changes: TagChanges) -> crate::Result<Tag> {
        let mut lock = self.write();
        let series = lock
            .get_mut(tag_id)
            .ok_or_else(|| crate::Error::not_found(tag_id))?;

        let mut tag = series.tag.clone();
        tag.apply(changes);
        tag.validate()?;

        series.tag = tag.clone();
        Ok(tag)
    }

    fn deactivate_tag(&self, tag_id: &str) -> crate::Result<Tag> {
        let mut lock = self.write();
        let series = lock
            .get_mut(tag_id)
            .ok_or_else(|| crate::Error::not_found(tag_id))?;

        series.tag.deactivated = true;
        Ok(series.tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> crate::Result<MemoryStore> {
        let store = MemoryStore::new();
        store.create_tag(Tag::new("t-1", "Temperature", "°C", "temp"))?;
        Ok(store)
    }

    #[test_log::test]
    fn memory_fetch_inclusive_and_ordered() -> crate::Result<()> {
        let store = store()?;

        for (id, ts) in [("c", 30), ("a", 10), ("b", 20), ("d", 40)] {
            store.insert_reading(Reading::new(id, "t-1", 1.0, ts, 0.0, "dev"))?;
        }

        let ids = |readings: Vec<Reading>| readings.into_iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(vec!["a", "b", "c", "d"], ids(store.all_readings("t-1")?));
        assert_eq!(vec!["b", "c"], ids(store.fetch_readings("t-1", 20, 30)?));
        assert!(store.fetch_readings("t-1", 31, 39)?.is_empty());
        assert!(store.fetch_readings("t-1", 50, 10)?.is_empty());

        Ok(())
    }

    #[test_log::test]
    fn memory_equal_timestamps_ordered_by_id() -> crate::Result<()> {
        let store = store()?;

        for (id, value) in [("r-2", 2.0), ("r-3", 3.0), ("r-1", 1.0)] {
            store.insert_reading(Reading::new(id, "t-1", value, 5, value, "dev"))?;
        }

        // Same key replaces the reading
        store.insert_reading(Reading::new("r-3", "t-1", 30.0, 5, 3.0, "dev"))?;

        let readings = store.all_readings("t-1")?;
        assert_eq!(
            vec![("r-1", 1.0), ("r-2", 2.0), ("r-3", 30.0)],
            readings
                .iter()
                .map(|r| (r.id.as_str(), r.value))
                .collect::<Vec<_>>()
        );

        Ok(())
    }

    #[test_log::test]
    fn memory_insert_copies_label() -> crate::Result<()> {
        let store = store()?;

        let mut reading = Reading::new("a", "t-1", 1.0, 1, 0.0, "dev");
        reading.tag_label = "stale".into();
        store.insert_reading(reading)?;

        assert_eq!("temp", store.all_readings("t-1")?[0].tag_label);

        Ok(())
    }

    #[test_log::test]
    fn memory_unknown_tag() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.fetch_readings("nope", 0, 10),
            Err(crate::Error::NotFound { tag_id }) if tag_id == "nope"
        ));
        assert!(matches!(
            store.insert_reading(Reading::new("a", "nope", 1.0, 1, 0.0, "dev")),
            Err(crate::Error::NotFound { .. })
        ));
    }

    #[test_log::test]
    fn memory_tag_crud() -> crate::Result<()> {
        let store = store()?;

        assert!(store
            .create_tag(Tag::new("t-1", "Again", "x", "again"))
            .is_err());
        assert!(store.create_tag(Tag::new("t-2", "", "x", "x")).is_err());

        let tag = store.update_tag(
            "t-1",
            TagChanges {
                name: Some("Room temperature".into()),
                ..Default::default()
            },
        )?;
        assert_eq!("Room temperature", tag.name);
        assert_eq!("°C", tag.unit);

        assert!(store
            .update_tag(
                "t-1",
                TagChanges {
                    unit: Some(String::new()),
                    ..Default::default()
                },
            )
            .is_err());

        assert!(store.deactivate_tag("t-1")?.deactivated);
        assert!(store.resolve_tag("t-1")?.deactivated);
        assert_eq!(1, store.list_tags()?.len());

        Ok(())
    }
}
