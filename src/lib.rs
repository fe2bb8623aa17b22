//! Downsampling and statistical reduction of tagged sensor readings.
//!
//! Devices produce readings, each belonging to a tag (a measurement channel).
//! Given a tag, a time window, a cadence (number of output points) and a
//! reduction method, the readings in the window are split into contiguous
//! buckets and every bucket is reduced to one reading carrying the statistic.
//!
//! Reductions of several tags can be joined into one record per device
//! sample timestamp.
//!
//! Readings come from a [`ReadingStore`]. An in-memory store ([`MemoryStore`])
//! and a persistent one built on <https://github.com/fjall-rs/fjall> ([`Database`])
//! are included.
//!
//! ```
//! use tagstat::{CancelToken, Engine, MemoryStore, Method, Reading, Tag, TagStore};
//!
//! let store = MemoryStore::new();
//! store.create_tag(Tag::new("t-1", "Temperature", "°C", "temp"))?;
//! store.create_tag(Tag::new("t-2", "Humidity", "%", "hum"))?;
//!
//! let engine = Engine::new(store);
//!
//! for (idx, value) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
//!     let ts = idx as i64;
//!     engine.record(Reading::new(format!("a-{idx}"), "t-1", value, ts, ts as f64, "dev-1"))?;
//!     engine.record(Reading::new(format!("b-{idx}"), "t-2", value * 10.0, ts, ts as f64, "dev-1"))?;
//! }
//!
//! // 4 readings, 2 output points => buckets [1, 2] and [3, 4]
//! let series = engine.downsample_one("t-1", 0, 3, 2, Method::Average.code())?;
//! let values = series.iter().map(|r| r.value).collect::<Vec<_>>();
//! assert_eq!(vec![1.5, 3.5], values);
//!
//! let merged = engine.downsample_many(
//!     &["t-1", "t-2"],
//!     0,
//!     3,
//!     2,
//!     Method::Max.code(),
//!     &CancelToken::new(),
//! )?;
//!
//! assert_eq!(2, merged.len());
//! assert_eq!(0.0, merged[0].measured_at_device);
//! assert_eq!(2.0, merged[0].tag_values["temp"].value);
//! assert_eq!(20.0, merged[0].tag_values["hum"].value);
//!
//! # Ok::<(), tagstat::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod agg;
mod bucket;
mod cache;
mod cadence;
mod cancel;
mod codec;
mod csv;
mod db;
mod db_builder;
mod downsample;
mod engine;
mod error;
mod merge;
mod reading;
mod store;
mod tag;
mod time;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use agg::{reduce, Method};
pub use bucket::Bucketizer;
pub use cache::ReductionCache;
pub use cadence::Cadence;
pub use cancel::CancelToken;
pub use csv::{to_csv, write_csv};
pub use db::Database;
pub use db_builder::Builder as DatabaseBuilder;
pub use downsample::{downsample, Downsample};
pub use engine::{Builder as EngineBuilder, Engine};
pub use error::{Error, Result};
pub use merge::{merge, MergedSample};
pub use reading::{Reading, ReducedReading};
pub use store::{MemoryStore, ReadingStore, TagStore, WritableStore};
pub use tag::{Tag, TagChanges};
pub use time::timestamp;

/// Timestamp in epoch milliseconds
pub type Timestamp = i64;

/// Value of a reading
pub type Value = f64;
