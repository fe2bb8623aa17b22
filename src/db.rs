use crate::{
    codec, db_builder::Builder, timestamp, Reading, ReadingStore, Tag, TagChanges, TagStore,
    Timestamp, WritableStore,
};
use fjall::{CompressionType, PartitionCreateOptions, PersistMode, TxKeyspace, TxPartition};
use std::path::Path;

const TAGS_PARTITION: &str = "_tagstat#v1#tags";
const READINGS_PARTITION: &str = "_tagstat#v1#readings";

/// Persistent store of tags and readings.
///
/// Readings of a tag are kept sorted by `measured_at`, so a time window is
/// a single range scan.
pub struct Database {
    keyspace: TxKeyspace,
    tags: TxPartition,
    readings: TxPartition,
}

impl Database {
    /// Returns a builder to configure and open a database.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Opens or recovers a database with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::builder().open(path)
    }

    pub(crate) fn from_keyspace(keyspace: TxKeyspace) -> crate::Result<Self> {
        let tags = keyspace.open_partition(
            TAGS_PARTITION,
            PartitionCreateOptions::default()
                .block_size(4_096)
                .compression(CompressionType::Lz4)
                .max_memtable_size(8_000_000),
        )?;

        let readings = keyspace.open_partition(
            READINGS_PARTITION,
            PartitionCreateOptions::default()
                .block_size(64_000)
                .compression(CompressionType::Lz4),
        )?;

        Ok(Self {
            keyspace,
            tags,
            readings,
        })
    }

    /// Flushes all writes to disk.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn persist(&self) -> crate::Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn get_tag(&self, tag_id: &str) -> crate::Result<Option<Tag>> {
        self.tags
            .get(tag_id)?
            .map(|bytes| codec::decode_tag(tag_id.as_bytes(), &bytes))
            .transpose()
    }

    /// Reads, changes and writes back a tag in one transaction.
    fn modify_tag<F>(&self, tag_id: &str, f: F) -> crate::Result<Tag>
    where
        F: FnOnce(&mut Tag) -> crate::Result<()>,
    {
        let mut tx = self.keyspace.write_tx();

        let mut tag = tx
            .get(&self.tags, tag_id)?
            .map(|bytes| codec::decode_tag(tag_id.as_bytes(), &bytes))
            .transpose()?
            .ok_or_else(|| crate::Error::not_found(tag_id))?;

        f(&mut tag)?;

        tx.insert(&self.tags, tag_id, codec::tag_value(&tag)?);
        tx.commit()?;

        Ok(tag)
    }
}

impl ReadingStore for Database {
    fn fetch_readings(
        &self,
        tag_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> crate::Result<Vec<Reading>> {
        if self.get_tag(tag_id)?.is_none() {
            return Err(crate::Error::not_found(tag_id));
        }

        log::trace!("scanning readings of {tag_id:?} [{from}..={to}]");

        let mut readings = Vec::new();

        if to < from {
            return Ok(readings);
        }

        let prefix = codec::reading_prefix(tag_id)?;
        let lower_bound = codec::reading_lower_bound(tag_id, from)?;

        for kv in self.readings.inner().range(lower_bound..) {
            let (key, value) = kv?;

            if !key.starts_with(&prefix) {
                break;
            }
            if codec::reading_key_timestamp(&key, &prefix)? > to {
                break;
            }

            readings.push(codec::decode_reading(&key, &value)?);
        }

        log::trace!("scanned {} readings of {tag_id:?}", readings.len());

        Ok(readings)
    }

    fn resolve_tag(&self, tag_id: &str) -> crate::Result<Tag> {
        self.get_tag(tag_id)?
            .ok_or_else(|| crate::Error::not_found(tag_id))
    }
}

impl WritableStore for Database {
    fn insert_reading(&self, mut reading: Reading) -> crate::Result<()> {
        let tag = self.resolve_tag(&reading.tag_id)?;
        reading.tag_label = tag.tag_label;

        let key = codec::reading_key(&reading)?;
        let value = codec::reading_value(&reading)?;

        // NOTE: Readings are append-only, no need for a transactional context
        self.readings.inner().insert(key, value)?;

        Ok(())
    }
}

impl TagStore for Database {
    fn create_tag(&self, mut tag: Tag) -> crate::Result<Tag> {
        tag.validate()?;

        let mut tx = self.keyspace.write_tx();

        if tx.get(&self.tags, tag.id.as_str())?.is_some() {
            return Err(crate::Error::invalid_argument(
                "tag_id",
                format!("tag {:?} already exists", tag.id),
            ));
        }

        tag.created_at = timestamp();
        tag.deactivated = false;

        log::trace!("creating tag {:?} ({})", tag.id, tag.name);

        tx.insert(&self.tags, tag.id.as_str(), codec::tag_value(&tag)?);
        tx.commit()?;

        Ok(tag)
    }

    fn list_tags(&self) -> crate::Result<Vec<Tag>> {
        self.tags
            .inner()
            .iter()
            .map(|kv| {
                let (key, value) = kv?;
                codec::decode_tag(&key, &value)
            })
            .collect()
    }

    fn update_tag(&self, tag_id: &str, changes: TagChanges) -> crate::Result<Tag> {
        self.modify_tag(tag_id, |tag| {
            tag.apply(changes);
            tag.validate()
        })
    }

    fn deactivate_tag(&self, tag_id: &str) -> crate::Result<Tag> {
        log::debug!("deactivating tag {tag_id:?}");

        self.modify_tag(tag_id, |tag| {
            tag.deactivated = true;
            Ok(())
        })
    }
}
