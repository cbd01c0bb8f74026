//! Append-only observation store with per-group aggregation.
//!
//! Observations arrive as `(labels, value)` pairs and are grouped by the
//! label set's [`GroupKey`]. Each group keeps its values in arrival order,
//! which `sum`/`average` rely on for "most recent N" semantics. The store
//! never expires groups or values; callers reset by dropping the store (or
//! calling [`LabeledObservationStore::clear`]).

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::labels::{GroupKey, LabelSet};

/// One group: the representative label set (the first one observed for this
/// key) plus the arrival-ordered value history.
#[derive(Debug)]
struct ObservationGroup {
    labels: LabelSet,
    values: Vec<f64>,
}

/// Groups numeric observations by label-set identity and reports per-group
/// sum, average, and median.
///
/// Mutation goes through `&mut self`, queries through `&self`; there is no
/// internal locking. Callers that share a store across threads wrap it in a
/// mutex themselves.
#[derive(Debug, Default)]
pub struct LabeledObservationStore {
    groups: HashMap<GroupKey, ObservationGroup>,
}

impl LabeledObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` under the group identified by `labels`.
    ///
    /// The first observation for a key creates the group and keeps `labels`
    /// as its representative; later observations append to the history.
    /// A non-finite `value` fails with [`Error::InvalidArgument`] before any
    /// state is touched.
    pub fn observe(&mut self, labels: LabelSet, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::invalid(format!(
                "observation value must be finite, got {value}"
            )));
        }
        let key = labels.group_key()?;
        let group = self.groups.entry(key).or_insert_with(|| {
            debug!(group = %key, labels = ?labels, "new observation group");
            ObservationGroup {
                labels,
                values: Vec::new(),
            }
        });
        group.values.push(value);
        trace!(group = %key, value, n = group.values.len(), "observed");
        Ok(())
    }

    /// Per-group sum of the most recently observed `count` values, or of the
    /// whole history when `count` is `None`.
    ///
    /// A group with fewer than `count` observations contributes the sum of
    /// everything it has. `Some(0)` fails with [`Error::InvalidArgument`].
    /// Group order in the result is unspecified.
    pub fn sum(&self, count: Option<usize>) -> Result<Vec<(LabelSet, f64)>> {
        let take = Self::check_count(count)?;
        Ok(self
            .groups
            .values()
            .map(|g| (g.labels.clone(), tail_sum(&g.values, take)))
            .collect())
    }

    /// Per-group average of the most recently observed `count` values, or of
    /// the whole history when `count` is `None`.
    ///
    /// The divisor is the number of values actually summed, so a group with
    /// fewer than `count` observations is averaged over its real size.
    pub fn average(&self, count: Option<usize>) -> Result<Vec<(LabelSet, f64)>> {
        let take = Self::check_count(count)?;
        Ok(self
            .groups
            .values()
            .map(|g| {
                let n = match take {
                    Some(c) => c.min(g.values.len()),
                    None => g.values.len(),
                };
                (g.labels.clone(), tail_sum(&g.values, take) / n as f64)
            })
            .collect())
    }

    /// Per-group median over the whole history.
    ///
    /// Values are copied and sorted numerically; the stored arrival order is
    /// untouched. Odd-length groups yield the lower-middle element,
    /// even-length groups the mean of the two middle elements.
    pub fn median(&self) -> Vec<(LabelSet, f64)> {
        self.groups
            .values()
            .map(|g| (g.labels.clone(), median_of(&g.values)))
            .collect()
    }

    /// Number of distinct label combinations observed so far.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of observations recorded for one label combination
    /// (0 if the combination was never observed).
    pub fn observation_count(&self, labels: &LabelSet) -> Result<usize> {
        let key = labels.group_key()?;
        Ok(self.groups.get(&key).map_or(0, |g| g.values.len()))
    }

    /// Drops all groups and their histories.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.groups.shrink_to_fit();
    }

    /// `None` means "all values"; an explicit count must be positive.
    fn check_count(count: Option<usize>) -> Result<Option<usize>> {
        match count {
            Some(0) => Err(Error::invalid("count must be a positive number")),
            other => Ok(other),
        }
    }
}

/// Sums the last `take` values (all of them when `take` is `None`), walking
/// back from the tail of the arrival-ordered history.
fn tail_sum(values: &[f64], take: Option<usize>) -> f64 {
    let n = take.unwrap_or(values.len());
    values.iter().rev().take(n).sum()
}

/// Median of a non-empty history; sorts a copy with a numeric ordering.
fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
