//! Arrays addressed by their true index rather than from zero

use std::ops::{Index, IndexMut, RangeInclusive};

use crate::ledger::{Ledger, Tracked};

#[cfg(test)]
mod test;

/// A contiguous run of values covering indices `first..first + len`.
///
/// Reads and writes use the real index; the offset is subtracted
/// internally, so the backing buffer never has to be shifted back before
/// it is released.
#[derive(Debug)]
pub struct OffsetArray<T> {
    first: usize,
    values: Tracked<T>,
}

impl<T: Clone> OffsetArray<T> {
    /// Cover `range` with copies of `fill`.
    pub fn filled(ledger: &Ledger, range: RangeInclusive<usize>, fill: T) -> Self {
        let (first, last) = range.into_inner();
        assert!(first <= last, "empty range {first}..={last}");
        Self {
            first,
            values: ledger.filled(last - first + 1, fill),
        }
    }
}

impl<T> OffsetArray<T> {
    /// Cover `first..first + values.len()`.
    pub fn from_vec(ledger: &Ledger, first: usize, values: Vec<T>) -> Self {
        Self {
            first,
            values: ledger.track(values),
        }
    }

    /// Smallest stored index.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Largest stored index, `None` when nothing is stored.
    pub fn last(&self) -> Option<usize> {
        (!self.values.is_empty()).then(|| self.first + self.values.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.first && index - self.first < self.values.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index.checked_sub(self.first)?)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.values.get_mut(index.checked_sub(self.first)?)
    }

    /// Pairs of (true index, value).
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.first + i, v))
    }
}

impl<T> Index<usize> for OffsetArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("index out of bounds")
    }
}

impl<T> IndexMut<usize> for OffsetArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.get_mut(index).expect("index out of bounds")
    }
}
