//! Collaborators that hold readings and tags.

mod memory;

pub use memory::MemoryStore;

use crate::{Reading, Tag, TagChanges, Timestamp};
use std::sync::Arc;

/// Source of raw readings.
pub trait ReadingStore: Send + Sync {
    /// Returns the readings of a tag with `from <= measured_at <= to`,
    /// ordered ascending by `measured_at`.
    ///
    /// An existing tag without readings in range yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tag does not exist.
    fn fetch_readings(
        &self,
        tag_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> crate::Result<Vec<Reading>>;

    /// Looks up a tag, including deactivated ones.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tag does not exist.
    fn resolve_tag(&self, tag_id: &str) -> crate::Result<Tag>;

    /// Returns the whole history of a tag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tag does not exist.
    fn all_readings(&self, tag_id: &str) -> crate::Result<Vec<Reading>> {
        self.fetch_readings(tag_id, Timestamp::MIN, Timestamp::MAX)
    }
}

/// A [`ReadingStore`] that accepts new readings.
pub trait WritableStore: ReadingStore {
    /// Stores a reading, copying the owning tag's label into it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reading's tag does not exist.
    fn insert_reading(&self, reading: Reading) -> crate::Result<()>;
}

/// Tag management.
pub trait TagStore {
    /// Stores a new tag, stamping its creation time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the tag has no id, name or unit, or if
    /// its id is already taken.
    fn create_tag(&self, tag: Tag) -> crate::Result<Tag>;

    /// Returns all tags, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying storage fails.
    fn list_tags(&self) -> crate::Result<Vec<Tag>>;

    /// Applies a partial update to a tag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tag does not exist, and `InvalidArgument`
    /// if the update would leave it without name or unit.
    fn update_tag(&self, tag_id: &str, changes: TagChanges) -> crate::Result<Tag>;

    /// Soft-deletes a tag. Its readings are kept.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tag does not exist.
    fn deactivate_tag(&self, tag_id: &str) -> crate::Result<Tag>;
}

impl<S: ReadingStore + ?Sized> ReadingStore for Arc<S> {
    fn fetch_readings(
        &self,
        tag_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> crate::Result<Vec<Reading>> {
        (**self).fetch_readings(tag_id, from, to)
    }

    fn resolve_tag(&self, tag_id: &str) -> crate::Result<Tag> {
        (**self).resolve_tag(tag_id)
    }
}

impl<S: WritableStore + ?Sized> WritableStore for Arc<S> {
    fn insert_reading(&self, reading: Reading) -> crate::Result<()> {
        (**self).insert_reading(reading)
    }
}
