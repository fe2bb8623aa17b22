use crate::{Timestamp, Value};

/// A single timestamped measurement of a tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    /// Unique identifier of the reading
    pub id: String,

    /// Id of the tag the reading belongs to
    pub tag_id: String,

    /// Measured value
    pub value: Value,

    /// Timestamp assigned by the ingesting service (epoch millis)
    pub measured_at: Timestamp,

    /// Timestamp assigned by the originating device clock
    ///
    /// Used as the join key when merging several tags.
    pub measured_at_device: f64,

    /// Soft-delete flag, readings are never removed
    pub deactivated: bool,

    /// Id of the originating device
    pub device_id: String,

    /// Human-readable tag name, copied from the tag when the reading was written
    pub tag_label: String,
}

/// Output of downsampling.
///
/// `value` holds the statistic of a bucket, every other field is copied
/// from the first raw reading of that bucket.
pub type ReducedReading = Reading;

impl Reading {
    /// Creates an active reading with an empty tag label.
    ///
    /// The label is filled in by the store when the reading is written.
    #[must_use]
    pub fn new<I: Into<String>, T: Into<String>, D: Into<String>>(
        id: I,
        tag_id: T,
        value: Value,
        measured_at: Timestamp,
        measured_at_device: f64,
        device_id: D,
    ) -> Self {
        Self {
            id: id.into(),
            tag_id: tag_id.into(),
            value,
            measured_at,
            measured_at_device,
            deactivated: false,
            device_id: device_id.into(),
            tag_label: String::new(),
        }
    }

    /// Returns a copy of this reading carrying another value.
    #[must_use]
    pub fn with_value(&self, value: Value) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}
