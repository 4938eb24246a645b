//! Count matrix buffers as they are allocated and released

use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Shared allocation counters for one fold compound.
///
/// Every matrix buffer is created through [`Ledger::track`] and reports back
/// when it is dropped, so after teardown `live() == 0` and
/// `live_cells() == 0` must hold.
#[derive(Debug, Clone, Default)]
pub struct Ledger(Arc<Counts>);

#[derive(Debug, Default)]
struct Counts {
    allocated: AtomicUsize,
    released: AtomicUsize,
    live_cells: AtomicUsize,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a buffer and count it as allocated.
    pub fn track<T>(&self, values: Vec<T>) -> Tracked<T> {
        self.0.allocated.fetch_add(1, Ordering::Relaxed);
        self.0.live_cells.fetch_add(values.len(), Ordering::Relaxed);
        Tracked {
            values: values.into_boxed_slice(),
            ledger: self.clone(),
        }
    }

    /// A tracked buffer of `len` copies of `value`.
    pub fn filled<T: Clone>(&self, len: usize, value: T) -> Tracked<T> {
        self.track(vec![value; len])
    }

    /// Buffers handed out so far.
    pub fn allocated(&self) -> usize {
        self.0.allocated.load(Ordering::Relaxed)
    }

    /// Buffers dropped so far.
    pub fn released(&self) -> usize {
        self.0.released.load(Ordering::Relaxed)
    }

    /// Buffers currently alive.
    pub fn live(&self) -> usize {
        self.allocated() - self.released()
    }

    /// Slots held by the buffers currently alive.
    pub fn live_cells(&self) -> usize {
        self.0.live_cells.load(Ordering::Relaxed)
    }

    fn release(&self, cells: usize) {
        self.0.released.fetch_add(1, Ordering::Relaxed);
        self.0.live_cells.fetch_sub(cells, Ordering::Relaxed);
    }
}

/// A boxed slice that reports its release to the [`Ledger`] it came from.
pub struct Tracked<T> {
    values: Box<[T]>,
    ledger: Ledger,
}

impl<T> Deref for Tracked<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.ledger.release(self.values.len());
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}
