//! Time-indexed coefficient storage.

use crate::error::{check_sizes, CurveError, Result};
use crate::util::Interval;
use crate::{CoefficientKey, Time, Values};
use log::{debug, trace};
use ordered_float::OrderedFloat;
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};

/// What to do when a coefficient is inserted at an already occupied time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicateTimePolicy {
    /// Overwrite the stored value, keeping its key.
    #[default]
    Replace,
    /// Fail with [CurveError::DuplicateTimeConflict].
    Reject,
}

/// The first time that occurs more than once in `times`.
pub(crate) fn repeated_time(times: &[Time]) -> Option<Time> {
    let mut seen = BTreeSet::new();
    times.iter().copied().find(|&time| !seen.insert(OrderedFloat(time)))
}

/// A stored coefficient along with its time and key.
#[derive(Debug)]
pub struct Entry<'a, C> {
    pub time: Time,
    pub key: CoefficientKey,
    pub coefficient: &'a C,
}

impl<C> Clone for Entry<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Entry<'_, C> {}

/// The two stored coefficients surrounding a query time.
///
/// When only one coefficient is stored, `a` and `b` are the same entry.
#[derive(Debug)]
pub struct Bracket<'a, C> {
    pub a: Entry<'a, C>,
    pub b: Entry<'a, C>,
}

impl<C> Clone for Bracket<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Bracket<'_, C> {}

impl<C> Bracket<'_, C> {
    /// The fractional position of `time` between `a` and `b`.
    pub fn alpha(&self, time: Time) -> f64 {
        Interval::new(self.a.time, self.b.time).inv_lerp(time)
    }
}

/// Coefficients ordered by time and addressable by a stable key.
///
/// The manager owns every coefficient. An optimizer only ever holds
/// [CoefficientKey]s, which stay valid until the coefficient is removed
/// and are never reused afterwards.
#[derive(Clone)]
pub struct CoefficientManager<C> {
    /// The coefficients, by key.
    slots: SlotMap<CoefficientKey, Slot<C>>,
    /// The keys of the coefficients, by time.
    timeline: BTreeMap<OrderedFloat<Time>, CoefficientKey>,
    /// How insertions at an occupied time are handled.
    duplicates: DuplicateTimePolicy,
}

#[derive(Clone)]
struct Slot<C> {
    time: Time,
    coefficient: C,
}

impl<C> Default for CoefficientManager<C> {
    fn default() -> Self {
        Self::with_policy(DuplicateTimePolicy::default())
    }
}

impl<C> CoefficientManager<C> {
    /// Creates an empty manager which replaces coefficients on duplicate times.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty manager with the given duplicate time policy.
    pub fn with_policy(duplicates: DuplicateTimePolicy) -> Self {
        Self {
            slots: SlotMap::with_key(),
            timeline: BTreeMap::new(),
            duplicates,
        }
    }

    pub fn duplicate_policy(&self) -> DuplicateTimePolicy {
        self.duplicates
    }

    /// Inserts a coefficient at the given time and returns its key.
    ///
    /// If a coefficient is already stored at `time`, it is either replaced
    /// (and its key returned) or the insertion fails, depending on the policy.
    pub fn insert(&mut self, time: Time, coefficient: C) -> Result<CoefficientKey> {
        if let Some(&key) = self.timeline.get(&OrderedFloat(time)) {
            if self.duplicates == DuplicateTimePolicy::Reject {
                return Err(CurveError::DuplicateTimeConflict { time });
            }
            debug!("replacing the coefficient at {}", time);
            self.slots[key].coefficient = coefficient;
            return Ok(key);
        }
        let key = self.slots.insert(Slot { time, coefficient });
        self.timeline.insert(OrderedFloat(time), key);
        Ok(key)
    }

    /// Inserts several coefficients, returning one key per element in input order.
    ///
    /// Nothing is inserted if the slices differ in length or, under
    /// [DuplicateTimePolicy::Reject], if any time is already taken.
    pub fn insert_many(&mut self, times: &[Time], coefficients: &[C]) -> Result<Vec<CoefficientKey>>
    where
        C: Clone,
    {
        check_sizes(times, coefficients)?;
        if self.duplicates == DuplicateTimePolicy::Reject {
            let taken = times.iter().find(|&&time| self.timeline.contains_key(&OrderedFloat(time)));
            if let Some(time) = taken.copied().or_else(|| repeated_time(times)) {
                return Err(CurveError::DuplicateTimeConflict { time });
            }
        }
        times
            .iter()
            .zip(coefficients)
            .map(|(&time, coefficient)| self.insert(time, coefficient.clone()))
            .collect()
    }

    /// Removes the coefficient stored at exactly `time`.
    pub fn remove_at_time(&mut self, time: Time) -> Option<(CoefficientKey, C)> {
        let key = self.timeline.remove(&OrderedFloat(time))?;
        let slot = self.slots.remove(key)?;
        Some((key, slot.coefficient))
    }

    /// Finds the pair of adjacent coefficients whose times bound `time`.
    ///
    /// At the final time, the last two coefficients are returned so that
    /// `alpha` evaluates to one.
    pub fn bracket_at(&self, time: Time) -> Result<Bracket<'_, C>> {
        let (first, last) = match (self.first(), self.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CurveError::NotFound),
        };
        let out_of_bounds = || CurveError::TimeOutOfBounds {
            time,
            min: first.time,
            max: last.time,
        };
        if !(time >= first.time && time <= last.time) {
            return Err(out_of_bounds());
        }

        let bracket = if first.key == last.key {
            Bracket { a: first, b: first }
        } else if time == last.time {
            let (_, &a) = self
                .timeline
                .range(..OrderedFloat(time))
                .next_back()
                .ok_or_else(out_of_bounds)?;
            Bracket {
                a: self.entry_of(a),
                b: last,
            }
        } else {
            let (_, &a) = self
                .timeline
                .range(..=OrderedFloat(time))
                .next_back()
                .ok_or_else(out_of_bounds)?;
            let (_, &b) = self
                .timeline
                .range((Excluded(OrderedFloat(time)), Unbounded))
                .next()
                .ok_or_else(out_of_bounds)?;
            Bracket {
                a: self.entry_of(a),
                b: self.entry_of(b),
            }
        };

        trace!("bracket for {} is [{}, {}]", time, bracket.a.time, bracket.b.time);
        Ok(bracket)
    }

    /// Gets the entry stored under `key`.
    pub fn entry(&self, key: CoefficientKey) -> Result<Entry<'_, C>> {
        if !self.slots.contains_key(key) {
            return Err(CurveError::UnknownKey(key));
        }
        Ok(self.entry_of(key))
    }

    /// Gets the time of the coefficient stored under `key`.
    pub fn time_of(&self, key: CoefficientKey) -> Result<Time> {
        self.entry(key).map(|entry| entry.time)
    }

    /// Gets the coefficient stored under `key`.
    pub fn coefficient(&self, key: CoefficientKey) -> Option<&C> {
        self.slots.get(key).map(|slot| &slot.coefficient)
    }

    /// Overwrites the value stored under `key`. Its time is unchanged.
    pub fn set_coefficient(&mut self, key: CoefficientKey, coefficient: C) -> Result<()> {
        let slot = self.slots.get_mut(key).ok_or(CurveError::UnknownKey(key))?;
        slot.coefficient = coefficient;
        Ok(())
    }

    /// Iterates over the entries in time order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Entry<'_, C>> + '_ {
        self.timeline.values().map(|key| self.entry_of(*key))
    }

    /// The keys in time order.
    pub fn keys(&self) -> Vec<CoefficientKey> {
        self.timeline.values().copied().collect()
    }

    /// The times in increasing order.
    pub fn times(&self) -> Vec<Time> {
        self.timeline.keys().map(|time| time.0).collect()
    }

    pub fn first(&self) -> Option<Entry<'_, C>> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<Entry<'_, C>> {
        self.iter().next_back()
    }

    pub fn min_time(&self) -> Option<Time> {
        self.timeline.keys().next().map(|time| time.0)
    }

    pub fn max_time(&self) -> Option<Time> {
        self.timeline.keys().next_back().map(|time| time.0)
    }

    /// The interval between the first and last times, if not empty.
    pub fn time_range(&self) -> Option<Interval<Time>> {
        Some(Interval::new(self.min_time()?, self.max_time()?))
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Removes all coefficients. Keys handed out before are not reused.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.timeline.clear();
    }

    /// Copies the coefficients stored under `keys` into `values`.
    pub fn initialize_values(&self, keys: &[CoefficientKey], values: &mut Values<C>) -> Result<()>
    where
        C: Clone,
    {
        for &key in keys {
            let coefficient = self.coefficient(key).ok_or(CurveError::UnknownKey(key))?;
            values.insert(key, coefficient.clone());
        }
        Ok(())
    }

    /// Copies every stored coefficient into `values`.
    pub fn initialize_all_values(&self, values: &mut Values<C>)
    where
        C: Clone,
    {
        for (key, slot) in &self.slots {
            values.insert(key, slot.coefficient.clone());
        }
    }

    /// Overwrites stored coefficients with the values an optimizer refined.
    /// Values for keys this manager does not hold are ignored.
    pub fn update_from_values(&mut self, values: &Values<C>)
    where
        C: Clone,
    {
        for (key, slot) in &mut self.slots {
            if let Some(value) = values.get(key) {
                slot.coefficient = value.clone();
            }
        }
    }

    fn entry_of(&self, key: CoefficientKey) -> Entry<'_, C> {
        let slot = &self.slots[key];
        Entry {
            time: slot.time,
            key,
            coefficient: &slot.coefficient,
        }
    }
}
