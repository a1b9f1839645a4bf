use crate::collections::Set;
use crate::display::SetDisplay;

use std::cmp::{max, min, Ordering};
use std::fmt::{self, Display, Formatter};
use std::mem::take;
use std::ops::RangeInclusive;

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single value or an inclusive range of values. This is what gets added to a [`SparseSet`],
/// and what a finished set is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Value(u32),
    Range {
        first: u32,
        // Inclusive
        last: u32,
    },
}

impl Element {
    pub fn first(&self) -> u32 {
        match self {
            Element::Value(value) => *value,
            Element::Range { first, .. } => *first,
        }
    }

    pub fn last(&self) -> u32 {
        match self {
            Element::Value(value) => *value,
            Element::Range { last, .. } => *last,
        }
    }

    /// Number of integers covered by the element.
    pub fn len(&self) -> u64 {
        u64::from(self.last() - self.first()) + 1
    }

    pub fn contains(&self, value: u32) -> bool {
        self.first() <= value && value <= self.last()
    }

    fn from_bounds(first: u32, last: u32) -> Element {
        if first == last {
            Element::Value(first)
        } else {
            Element::Range { first, last }
        }
    }
}

impl From<u32> for Element {
    fn from(value: u32) -> Self {
        Element::Value(value)
    }
}

impl From<(u32, u32)> for Element {
    fn from((first, last): (u32, u32)) -> Self {
        Element::Range { first, last }
    }
}

impl From<RangeInclusive<u32>> for Element {
    fn from(range: RangeInclusive<u32>) -> Self {
        Element::Range {
            first: *range.start(),
            last: *range.end(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetError {
    #[error("finish() has already been called")]
    AlreadyFinished,

    #[error("reverse ranges are not allowed ({first:#X} > {last:#X})")]
    ReversedRange { first: u32, last: u32 },
}

/// A set of integers stored as sorted singletons and inclusive ranges.
///
/// The set is built in two phases: values and ranges are added in any order (duplicates and
/// overlaps allowed), then [`finish`](SparseSet::finish) normalizes them into a sorted list of
/// non-overlapping, non-adjacent elements. A finished set is read-only; reading an unfinished set
/// is a programming error and panics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseSet {
    // Working state, drained by `finish`
    values: Set<u32>,
    ranges: Vec<(u32, u32)>,

    finished: Option<Finished>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Finished {
    // NB. sorted, no two elements overlap or touch
    elements: Vec<Element>,
    len: u64,
    sparse_value_count: usize,
    contiguous_subrange_count: usize,
}

impl Finished {
    fn from_sorted_disjoint(elements: Vec<Element>) -> Finished {
        #[cfg(debug_assertions)]
        for pair in elements.windows(2) {
            assert!(u64::from(pair[0].last()) + 1 < u64::from(pair[1].first()));
        }

        let len = elements.iter().map(Element::len).sum();
        let sparse_value_count = elements
            .iter()
            .filter(|element| matches!(element, Element::Value(_)))
            .count();

        Finished {
            contiguous_subrange_count: elements.len() - sparse_value_count,
            elements,
            len,
            sparse_value_count,
        }
    }
}

impl SparseSet {
    pub fn new() -> SparseSet {
        Default::default()
    }

    /// Create an unfinished set with the given initial contents.
    pub fn from_elements<I, E>(elements: I) -> Result<SparseSet, SetError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        let mut set = SparseSet::new();
        for element in elements {
            set.add(element)?;
        }
        Ok(set)
    }

    /// Create a finished set from elements that are already sorted, non-overlapping and
    /// non-adjacent. These properties are checked in debug mode but not in release mode.
    fn from_sorted_disjoint(elements: Vec<Element>) -> SparseSet {
        SparseSet {
            values: Default::default(),
            ranges: vec![],
            finished: Some(Finished::from_sorted_disjoint(elements)),
        }
    }

    pub fn add<E: Into<Element>>(&mut self, element: E) -> Result<(), SetError> {
        if self.finished.is_some() {
            return Err(SetError::AlreadyFinished);
        }

        match element.into() {
            Element::Value(value) => {
                self.values.insert(value);
            }
            Element::Range { first, last } => match first.cmp(&last) {
                Ordering::Greater => return Err(SetError::ReversedRange { first, last }),
                Ordering::Equal => {
                    self.values.insert(first);
                }
                Ordering::Less => self.ranges.push((first, last)),
            },
        }

        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Normalize the added values and ranges. Can only be called once.
    ///
    /// Runs of consecutive values become ranges, values inside or next to a range are absorbed by
    /// it, and overlapping or adjacent ranges are merged.
    pub fn finish(&mut self) -> Result<(), SetError> {
        if self.finished.is_some() {
            return Err(SetError::AlreadyFinished);
        }

        let mut spans: Vec<(u32, u32)> = take(&mut self.ranges);
        spans.extend(take(&mut self.values).into_iter().map(|value| (value, value)));
        spans.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
        for (first, last) in spans {
            match merged.last_mut() {
                Some(prev) if first <= prev.1.saturating_add(1) => prev.1 = max(prev.1, last),
                _ => merged.push((first, last)),
            }
        }

        let elements = merged
            .into_iter()
            .map(|(first, last)| Element::from_bounds(first, last))
            .collect();

        self.finished = Some(Finished::from_sorted_disjoint(elements));
        Ok(())
    }

    fn finished(&self) -> &Finished {
        match &self.finished {
            Some(finished) => finished,
            None => panic!("finish() has not been called"),
        }
    }

    /// Total number of integers in the set.
    pub fn len(&self) -> u64 {
        self.finished().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<u32> {
        self.finished().elements.first().map(Element::first)
    }

    pub fn last(&self) -> Option<u32> {
        self.finished().elements.last().map(Element::last)
    }

    /// `(first, last)`, or `None` for an empty set.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let elements = &self.finished().elements;
        match (elements.first(), elements.last()) {
            (Some(first), Some(last)) => Some((first.first(), last.last())),
            _ => None,
        }
    }

    /// O(log n) where n is the number of elements.
    pub fn contains(&self, value: u32) -> bool {
        match self.bounds() {
            Some((first, last)) if first <= value && value <= last => self
                .finished()
                .elements
                .binary_search_by(|element| {
                    if element.last() < value {
                        Ordering::Less
                    } else if element.first() > value {
                        Ordering::Greater
                    } else {
                        Ordering::Equal
                    }
                })
                .is_ok(),
            _ => false,
        }
    }

    /// Whether the set is a single non-empty run of consecutive integers.
    pub fn is_contiguous(&self) -> bool {
        self.finished().elements.len() == 1
    }

    pub fn sparse_value_count(&self) -> usize {
        self.finished().sparse_value_count
    }

    pub fn contiguous_subrange_count(&self) -> usize {
        self.finished().contiguous_subrange_count
    }

    /// Sorted elements of the set.
    pub fn elements(&self) -> &[Element] {
        &self.finished().elements
    }

    /// Singleton elements, ascending.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements().iter().filter_map(|element| match element {
            Element::Value(value) => Some(*value),
            Element::Range { .. } => None,
        })
    }

    /// Range elements as `(first, last)`, ascending.
    pub fn ranges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.elements().iter().filter_map(|element| match element {
            Element::Value(_) => None,
            Element::Range { first, last } => Some((*first, *last)),
        })
    }

    /// Every integer in the set, ascending. Each call starts a new iteration.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements()
            .iter()
            .flat_map(|element| element.first()..=element.last())
    }

    /// The integers in `[min, max]` that are not in this set, as a finished set.
    pub fn inverse(&self, min_value: u32, max_value: u32) -> SparseSet {
        assert!(min_value <= max_value, "inverse bounds are reversed");

        let elements = self.elements();
        let mut gaps: Vec<Element> = Vec::with_capacity(elements.len() + 1);
        let mut push_gap = |first: u32, last: u32| {
            let first = max(first, min_value);
            let last = min(last, max_value);
            if first <= last {
                gaps.push(Element::from_bounds(first, last));
            }
        };

        match (elements.first(), elements.last()) {
            (Some(lowest), Some(highest)) => {
                if lowest.first() > min_value {
                    push_gap(min_value, lowest.first() - 1);
                }
                for pair in elements.windows(2) {
                    push_gap(pair[0].last() + 1, pair[1].first() - 1);
                }
                if highest.last() < max_value {
                    push_gap(highest.last() + 1, max_value);
                }
            }
            _ => push_gap(min_value, max_value),
        }

        SparseSet::from_sorted_disjoint(gaps)
    }

    /// The members of this set within `[first, last]`, as a finished set.
    pub fn subset(&self, first: u32, last: u32) -> SparseSet {
        let elements = self.elements();
        let start = elements.partition_point(|element| element.last() < first);

        let clipped = elements[start..]
            .iter()
            .take_while(|element| element.first() <= last)
            .map(|element| {
                Element::from_bounds(max(element.first(), first), min(element.last(), last))
            })
            .collect();

        SparseSet::from_sorted_disjoint(clipped)
    }

    /// Display the set with a custom formatter for the values, e.g. a code unit literal
    /// formatter.
    pub fn display_with<F>(&self, format: F) -> SetDisplay<'_, F>
    where
        F: Fn(u32) -> String,
    {
        SetDisplay::new(self.elements(), format)
    }
}

impl Display for SparseSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.finished {
            Some(finished) => {
                SetDisplay::new(&finished.elements, |value: u32| value.to_string()).fmt(f)
            }
            None => write!(f, "<unfinished>"),
        }
    }
}

impl Serialize for SparseSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.finished {
            Some(finished) => finished.elements.serialize(serializer),
            None => Err(ser::Error::custom("finish() has not been called")),
        }
    }
}

impl<'de> Deserialize<'de> for SparseSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements: Vec<Element> = Vec::deserialize(deserializer)?;
        let mut set = SparseSet::from_elements(elements).map_err(de::Error::custom)?;
        set.finish().map_err(de::Error::custom)?;
        Ok(set)
    }
}

#[cfg(test)]
fn finished<E: Into<Element>>(elements: impl IntoIterator<Item = E>) -> SparseSet {
    let mut set = SparseSet::from_elements(elements).unwrap();
    set.finish().unwrap();
    set
}

#[test]
fn merge_runs_of_values() {
    let set = finished([3u32, 1, 2, 7, 5, 6, 10]);
    assert_eq!(
        set.elements(),
        &[
            Element::Range { first: 1, last: 3 },
            Element::Range { first: 5, last: 7 },
            Element::Value(10),
        ]
    );
    assert_eq!(set.len(), 7);
    assert_eq!(set.sparse_value_count(), 1);
    assert_eq!(set.contiguous_subrange_count(), 2);
    assert_eq!(set.bounds(), Some((1, 10)));
}

#[test]
fn values_absorbed_by_ranges() {
    let mut set = SparseSet::new();
    set.add((10, 20)).unwrap();
    set.add(9).unwrap();
    set.add(15).unwrap();
    set.add(21).unwrap();
    set.add(23).unwrap();
    set.finish().unwrap();

    assert_eq!(
        set.elements(),
        &[Element::Range { first: 9, last: 21 }, Element::Value(23)]
    );
}

#[test]
fn overlapping_and_adjacent_ranges() {
    let set = finished([(30u32, 40u32), (10, 20), (15, 25), (26, 28), (42, 50)]);
    assert_eq!(
        set.elements(),
        &[
            Element::Range { first: 10, last: 28 },
            Element::Range { first: 30, last: 40 },
            Element::Range { first: 42, last: 50 },
        ]
    );
}

#[test]
fn value_bridges_two_ranges() {
    let set = finished([Element::from((1, 3)), Element::from((5, 7)), Element::Value(4)]);
    assert_eq!(set.elements(), &[Element::Range { first: 1, last: 7 }]);
    assert!(set.is_contiguous());
}

#[test]
fn range_at_integer_limit() {
    let set = finished([(u32::MAX - 3, u32::MAX), (u32::MAX - 10, u32::MAX - 4)]);
    assert_eq!(
        set.elements(),
        &[Element::Range {
            first: u32::MAX - 10,
            last: u32::MAX
        }]
    );
    assert_eq!(set.len(), 11);
}

#[test]
fn finish_twice() {
    let mut set = SparseSet::new();
    set.finish().unwrap();
    assert_eq!(set.finish(), Err(SetError::AlreadyFinished));
}

#[test]
fn add_after_finish() {
    let mut set = SparseSet::new();
    set.finish().unwrap();
    assert_eq!(set.add(1), Err(SetError::AlreadyFinished));
}

#[test]
fn reversed_range() {
    let mut set = SparseSet::new();
    assert_eq!(
        set.add((5, 3)),
        Err(SetError::ReversedRange { first: 5, last: 3 })
    );
}

#[test]
#[should_panic(expected = "finish() has not been called")]
fn read_before_finish() {
    let set = SparseSet::from_elements([1u32]).unwrap();
    set.contains(1);
}

#[test]
fn contains() {
    let set = finished([Element::Value(2), Element::from((10, 12)), Element::Value(40)]);
    for value in 0..50 {
        let expected = value == 2 || (10..=12).contains(&value) || value == 40;
        assert_eq!(set.contains(value), expected, "value = {}", value);
    }
}

#[test]
fn iteration_is_restartable() {
    let set = finished([Element::Value(2), Element::from((4, 6))]);
    let first: Vec<u32> = set.iter().collect();
    let second: Vec<u32> = set.iter().collect();
    assert_eq!(first, vec![2, 4, 5, 6]);
    assert_eq!(first, second);
}

#[test]
fn inverse() {
    let set = finished([Element::Value(2), Element::from((4, 6)), Element::Value(9)]);
    let inverse = set.inverse(0, 12);
    assert_eq!(
        inverse.elements(),
        &[
            Element::Range { first: 0, last: 1 },
            Element::Value(3),
            Element::Range { first: 7, last: 8 },
            Element::Range { first: 10, last: 12 },
        ]
    );
    assert!(inverse.is_finished());

    let empty = finished(Vec::<u32>::new());
    assert_eq!(
        empty.inverse(5, 9).elements(),
        &[Element::Range { first: 5, last: 9 }]
    );

    let full = finished([(0u32, 10u32)]);
    assert!(full.inverse(0, 10).is_empty());
}

#[test]
fn subset() {
    let set = finished([Element::from((0, 9)), Element::Value(15), Element::from((20, 30))]);
    assert_eq!(
        set.subset(5, 25).elements(),
        &[
            Element::Range { first: 5, last: 9 },
            Element::Value(15),
            Element::Range { first: 20, last: 25 },
        ]
    );
    assert_eq!(set.subset(30, 40).elements(), &[Element::Value(30)]);
    assert!(set.subset(10, 14).is_empty());
}

#[test]
fn display() {
    let set = finished([Element::Value(2), Element::from((4, 6))]);
    assert_eq!(set.to_string(), "2, 4 - 6");
    assert_eq!(
        set.display_with(|value| format!("{:#X}", value)).to_string(),
        "0x2, 0x4 - 0x6"
    );
}

#[test]
fn serde_roundtrip_keeps_structure() {
    let set = finished([Element::Value(2), Element::from((4, 6))]);
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"[2,{"first":4,"last":6}]"#);
    let back: SparseSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back.elements(), set.elements());
}
