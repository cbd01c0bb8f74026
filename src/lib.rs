//! labstats — label-keyed statistics accumulator.
//!
//! Callers record numeric observations tagged with a set of string-keyed
//! metadata labels; the store groups them by canonical label identity and
//! reports aggregate sum, average, or median per distinct label combination.
//!
//! Provides:
//! - `labels` — label values, label sets, canonical group keys
//! - `store` — the observation store and its aggregation queries
//! - `error` — validation errors (`InvalidArgument`)
//!
//! ```
//! use labstats::{LabelSet, LabeledObservationStore};
//!
//! let mut stats = LabeledObservationStore::new();
//! let labels = LabelSet::new().with("method", "GET").with("status", 200);
//! stats.observe(labels.clone(), 12.0)?;
//! stats.observe(labels, 30.0)?;
//!
//! for (labels, avg) in stats.average(None)? {
//!     println!("{labels:?}: {avg}");
//! }
//! # Ok::<(), labstats::Error>(())
//! ```

pub mod error;
pub mod labels;
pub mod store;

pub use error::{Error, Result};
pub use labels::{GroupKey, LabelSet, LabelValue};
pub use store::LabeledObservationStore;
