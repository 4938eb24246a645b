//! Distance-class partitioned DP matrices
//!
//! For two reference structures every interval holds a jagged table of
//! values indexed by (k, l), the base pair distances of a substructure to
//! reference 1 and reference 2. Only a window of classes is stored:
//!
//! - k runs over `k_min..=k_max` of the interval,
//! - for each k, l runs over `l_min(k)..=l_max(k)` in steps of two, since
//!   k + l has a fixed parity on any interval,
//! - everything outside the window is folded into one remainder value.
//!
//! A family is absent (`None`) when it was not requested, a cell without a
//! k range has no feasible class, and a row without an l range has no
//! feasible class for that k. Consumers must check all three.
//!
//! Outer scaffolding (one cell and one remainder per slot) is allocated with
//! the family. The per-cell rows are allocated by the filling recurrence
//! through [`DistanceFamily::prepare`] and released with the cell.

use std::ops::RangeInclusive;

use tracing::debug;

use crate::{
    error::{FoldError, FoldResult},
    index::TriIndex,
    ledger::{Ledger, Tracked},
    offset::OffsetArray,
    options::AllocationPlan,
    params::INF,
};


/// A value that can be stored per distance class and aggregated into a remainder.
pub trait DistanceValue: Copy + PartialEq + std::fmt::Debug {
    /// Value of a class nothing has been folded into.
    const EMPTY: Self;

    /// Fold `other` into `self`.
    fn combine(self, other: Self) -> Self;
}

/// MFE energies keep the lowest value.
impl DistanceValue for i32 {
    const EMPTY: Self = INF;

    fn combine(self, other: Self) -> Self {
        self.min(other)
    }
}

/// Boltzmann weights add up.
impl DistanceValue for f64 {
    const EMPTY: Self = 0.0;

    fn combine(self, other: Self) -> Self {
        self + other
    }
}

/// Whether a family has one slot per position or one per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// n + 2 slots, addressed by position
    Linear,
    /// (n + 1)(n + 2)/2 slots, addressed by [`TriIndex::row_major`]
    Triangular,
}

impl Layout {
    pub fn slots(self, index: &TriIndex) -> usize {
        match self {
            Layout::Linear => index.linear_size(),
            Layout::Triangular => index.triangular_size(),
        }
    }
}

/// The l classes of one k: `l_min, l_min + 2, ..., l_max`.
#[derive(Debug)]
pub struct DistanceRow<T> {
    l_min: usize,
    l_max: usize,
    /// - values: slot l / 2 holds class l
    values: OffsetArray<T>,
}

impl<T: DistanceValue> DistanceRow<T> {
    fn new(ledger: &Ledger, l_range: RangeInclusive<usize>) -> Self {
        let (l_min, mut l_max) = l_range.into_inner();
        // only classes with the parity of l_min exist
        l_max -= (l_max - l_min) % 2;
        Self {
            l_min,
            l_max,
            values: OffsetArray::filled(ledger, l_min / 2..=l_max / 2, T::EMPTY),
        }
    }
}

impl<T> DistanceRow<T> {
    pub fn l_range(&self) -> RangeInclusive<usize> {
        self.l_min..=self.l_max
    }

    fn holds(&self, l: usize) -> bool {
        (self.l_min..=self.l_max).contains(&l) && (l - self.l_min) % 2 == 0
    }

    pub fn get(&self, l: usize) -> Option<&T> {
        if self.holds(l) { self.values.get(l / 2) } else { None }
    }

    pub fn get_mut(&mut self, l: usize) -> Option<&mut T> {
        if self.holds(l) {
            self.values.get_mut(l / 2)
        } else {
            None
        }
    }

    /// Pairs of (l, value).
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.values.iter().map(|(half, v)| (half * 2 + self.l_min % 2, v))
    }
}

/// Stored distance classes of one interval.
#[derive(Debug)]
pub struct DistanceCell<T> {
    /// - rows: indexed by k, `None` for a k without feasible l
    rows: Option<OffsetArray<Option<DistanceRow<T>>>>,
}

impl<T> Default for DistanceCell<T> {
    fn default() -> Self {
        Self { rows: None }
    }
}

impl<T: DistanceValue> DistanceCell<T> {
    /// Allocate the window, replacing (and releasing) any previous one.
    ///
    /// # Args
    ///
    /// - ledger: Counts the row buffers
    /// - k_range: Classes of reference 1 to store
    /// - l_bounds: Classes of reference 2 to store for a given k, `None` if none
    ///
    /// An empty `k_range` leaves the cell without a window.
    pub fn prepare<F>(&mut self, ledger: &Ledger, k_range: RangeInclusive<usize>, mut l_bounds: F)
    where
        F: FnMut(usize) -> Option<RangeInclusive<usize>>,
    {
        let (k_min, k_max) = k_range.into_inner();
        if k_min > k_max {
            self.rows = None;
            return;
        }

        let rows = (k_min..=k_max)
            .map(|k| {
                l_bounds(k)
                    .filter(|l| l.start() <= l.end())
                    .map(|l| DistanceRow::new(ledger, l))
            })
            .collect();
        self.rows = Some(OffsetArray::from_vec(ledger, k_min, rows));
    }

    /// Fold `value` into class (k, l) if it is stored, else into `remainder`.
    ///
    /// # Returns
    ///
    /// - [`bool`]: whether the class was inside the window
    pub fn accumulate(&mut self, k: usize, l: usize, value: T, remainder: &mut T) -> bool {
        match self.get_mut(k, l) {
            Some(slot) => {
                *slot = slot.combine(value);
                true
            }
            None => {
                *remainder = remainder.combine(value);
                false
            }
        }
    }

    /// Overwrite a stored class.
    pub fn set(&mut self, k: usize, l: usize, value: T) -> FoldResult<()> {
        let slot = self.get_mut(k, l).ok_or(FoldError::OutsideWindow { k, l })?;
        *slot = value;
        Ok(())
    }
}

impl<T> DistanceCell<T> {
    /// Whether a window has been allocated.
    pub fn is_feasible(&self) -> bool {
        self.rows.is_some()
    }

    /// `k_min..=k_max`, `None` when no class is feasible.
    pub fn k_range(&self) -> Option<RangeInclusive<usize>> {
        let rows = self.rows.as_ref()?;
        Some(rows.first()..=rows.last()?)
    }

    /// `l_min(k)..=l_max(k)`, `None` when k has no feasible class.
    pub fn l_range(&self, k: usize) -> Option<RangeInclusive<usize>> {
        self.row(k).map(DistanceRow::l_range)
    }

    pub fn row(&self, k: usize) -> Option<&DistanceRow<T>> {
        self.rows.as_ref()?.get(k)?.as_ref()
    }

    pub fn get(&self, k: usize, l: usize) -> Option<&T> {
        self.row(k)?.get(l)
    }

    pub fn get_mut(&mut self, k: usize, l: usize) -> Option<&mut T> {
        self.rows.as_mut()?.get_mut(k)?.as_mut()?.get_mut(l)
    }

    /// Every stored class as (k, l, value).
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.rows
            .iter()
            .flat_map(|rows| rows.iter())
            .filter_map(|(k, row)| row.as_ref().map(|row| (k, row)))
            .flat_map(|(k, row)| row.iter().map(move |(l, v)| (k, l, v)))
    }

    /// Release the window.
    pub fn clear(&mut self) {
        self.rows = None;
    }
}

/// One distance-partitioned matrix: a cell and a remainder per slot.
#[derive(Debug)]
pub struct DistanceFamily<T> {
    layout: Layout,
    cells: Tracked<DistanceCell<T>>,
    remainder: Tracked<T>,
    ledger: Ledger,
}

impl<T: DistanceValue> DistanceFamily<T> {
    /// Allocate the outer scaffolding with every remainder empty.
    pub fn allocate(layout: Layout, index: &TriIndex, ledger: &Ledger) -> Self {
        let slots = layout.slots(index);
        Self {
            layout,
            cells: ledger.track((0..slots).map(|_| DistanceCell::default()).collect()),
            remainder: ledger.filled(slots, T::EMPTY),
            ledger: ledger.clone(),
        }
    }

    /// Allocate the window of one slot. See [`DistanceCell::prepare`].
    pub fn prepare<F>(&mut self, slot: usize, k_range: RangeInclusive<usize>, l_bounds: F)
    where
        F: FnMut(usize) -> Option<RangeInclusive<usize>>,
    {
        self.cells[slot].prepare(&self.ledger, k_range, l_bounds);
    }

    /// Fold `value` into (k, l) of `slot`, or into its remainder outside the window.
    pub fn accumulate(&mut self, slot: usize, k: usize, l: usize, value: T) -> bool {
        self.cells[slot].accumulate(k, l, value, &mut self.remainder[slot])
    }

    /// Overwrite a stored class of `slot`.
    pub fn set(&mut self, slot: usize, k: usize, l: usize, value: T) -> FoldResult<()> {
        self.cells[slot].set(k, l, value)
    }
}

impl<T> DistanceFamily<T> {
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, slot: usize) -> &DistanceCell<T> {
        &self.cells[slot]
    }

    pub fn cell_mut(&mut self, slot: usize) -> &mut DistanceCell<T> {
        &mut self.cells[slot]
    }

    pub fn get(&self, slot: usize, k: usize, l: usize) -> Option<&T> {
        self.cells.get(slot)?.get(k, l)
    }

    pub fn get_mut(&mut self, slot: usize, k: usize, l: usize) -> Option<&mut T> {
        self.cells.get_mut(slot)?.get_mut(k, l)
    }

    pub fn remainder(&self, slot: usize) -> &T {
        &self.remainder[slot]
    }

    pub fn remainder_mut(&mut self, slot: usize) -> &mut T {
        &mut self.remainder[slot]
    }

    /// Release the window of one slot, keeping its remainder.
    pub fn clear(&mut self, slot: usize) {
        self.cells[slot].clear();
    }

    /// Slots that currently hold a window.
    pub fn feasible_slots(&self) -> usize {
        self.cells.iter().filter(|c| c.is_feasible()).count()
    }
}

/// A single distance-partitioned value, used for the circular exterior loop.
#[derive(Debug)]
pub struct DistanceScalar<T> {
    pub cell: DistanceCell<T>,
    pub remainder: T,
    ledger: Ledger,
}

impl<T: DistanceValue> DistanceScalar<T> {
    /// No window and an empty remainder.
    pub fn new(ledger: &Ledger) -> Self {
        Self {
            cell: DistanceCell::default(),
            remainder: T::EMPTY,
            ledger: ledger.clone(),
        }
    }

    pub fn prepare<F>(&mut self, k_range: RangeInclusive<usize>, l_bounds: F)
    where
        F: FnMut(usize) -> Option<RangeInclusive<usize>>,
    {
        self.cell.prepare(&self.ledger, k_range, l_bounds);
    }

    pub fn accumulate(&mut self, k: usize, l: usize, value: T) -> bool {
        self.cell.accumulate(k, l, value, &mut self.remainder)
    }
}

/// Allocate a family only when its flag is set.
fn family_if<T: DistanceValue>(
    enabled: bool,
    layout: Layout,
    index: &TriIndex,
    ledger: &Ledger,
) -> Option<DistanceFamily<T>> {
    enabled.then(|| DistanceFamily::allocate(layout, index, ledger))
}

/// Distance-partitioned MFE matrices.
#[derive(Debug)]
pub struct DistanceMfe {
    pub f5: Option<DistanceFamily<i32>>,
    pub f3: Option<DistanceFamily<i32>>,
    pub c: Option<DistanceFamily<i32>>,
    pub fml: Option<DistanceFamily<i32>>,
    pub fm1: Option<DistanceFamily<i32>>,
    pub fm2: Option<DistanceFamily<i32>>,
    pub fc_total: DistanceScalar<i32>,
    pub fc_hairpin: DistanceScalar<i32>,
    pub fc_interior: DistanceScalar<i32>,
    pub fc_multi: DistanceScalar<i32>,
}

impl DistanceMfe {
    pub fn allocate(index: &TriIndex, plan: &AllocationPlan, ledger: &Ledger) -> Self {
        use Layout::{Linear, Triangular};

        let this = Self {
            f5: family_if(plan.f5, Linear, index, ledger),
            f3: family_if(plan.f3, Linear, index, ledger),
            c: family_if(plan.closed, Triangular, index, ledger),
            fml: family_if(plan.multi, Triangular, index, ledger),
            fm1: family_if(plan.uniq, Triangular, index, ledger),
            fm2: family_if(plan.circ, Linear, index, ledger),
            fc_total: DistanceScalar::new(ledger),
            fc_hairpin: DistanceScalar::new(ledger),
            fc_interior: DistanceScalar::new(ledger),
            fc_multi: DistanceScalar::new(ledger),
        };
        debug!(n = index.len(), families = this.families(), "allocated distance MFE matrices");
        this
    }

    /// Number of allocated families.
    pub fn families(&self) -> usize {
        [&self.f5, &self.f3, &self.c, &self.fml, &self.fm1, &self.fm2]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// Distance-partitioned partition function matrices.
#[derive(Debug)]
pub struct DistancePf {
    pub q: Option<DistanceFamily<f64>>,
    pub qb: Option<DistanceFamily<f64>>,
    pub qm: Option<DistanceFamily<f64>>,
    pub qm1: Option<DistanceFamily<f64>>,
    pub qm2: Option<DistanceFamily<f64>>,
    pub qc_total: DistanceScalar<f64>,
    pub qc_hairpin: DistanceScalar<f64>,
    pub qc_interior: DistanceScalar<f64>,
    pub qc_multi: DistanceScalar<f64>,
}

impl DistancePf {
    pub fn allocate(index: &TriIndex, plan: &AllocationPlan, ledger: &Ledger) -> Self {
        use Layout::{Linear, Triangular};

        let this = Self {
            q: family_if(plan.pf, Triangular, index, ledger),
            qb: family_if(plan.closed, Triangular, index, ledger),
            qm: family_if(plan.multi, Triangular, index, ledger),
            qm1: family_if(plan.uniq, Triangular, index, ledger),
            qm2: family_if(plan.circ, Linear, index, ledger),
            qc_total: DistanceScalar::new(ledger),
            qc_hairpin: DistanceScalar::new(ledger),
            qc_interior: DistanceScalar::new(ledger),
            qc_multi: DistanceScalar::new(ledger),
        };
        debug!(n = index.len(), families = this.families(), "allocated distance PF matrices");
        this
    }

    /// Number of allocated families.
    pub fn families(&self) -> usize {
        [&self.q, &self.qb, &self.qm, &self.qm1, &self.qm2]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}
