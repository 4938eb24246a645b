//! Flat DP matrices, one value per interval or position

use tracing::debug;

use crate::{
    index::TriIndex,
    ledger::{Ledger, Tracked},
    options::AllocationPlan,
    params::INF,
};


/// Allocate a buffer only when its flag is set.
fn alloc_if<T: Clone>(enabled: bool, ledger: &Ledger, len: usize, fill: T) -> Option<Tracked<T>> {
    enabled.then(|| ledger.filled(len, fill))
}

/// MFE matrices, energies in dcal/mol.
///
/// Triangular arrays are addressed with [`TriIndex::row_major`], linear
/// arrays by position 0..=n+1. A field is `None` when its family was not
/// requested.
#[derive(Debug)]
pub struct DenseMfe {
    /// - f5: best energy of the prefix 1..=i
    pub f5: Option<Tracked<i32>>,
    /// - f3: best energy of the suffix i..=n
    pub f3: Option<Tracked<i32>>,
    /// - fc: exterior energies across the cut point of a hybrid
    pub fc: Option<Tracked<i32>>,
    /// - c: best energy of (i, j) given i and j pair
    pub c: Option<Tracked<i32>>,
    /// - fml: best multiloop component on (i, j)
    pub fml: Option<Tracked<i32>>,
    /// - fm1: multiloop component with exactly one branch starting at i
    pub fm1: Option<Tracked<i32>>,
    /// - fm2: two or more branches, circular folding only
    pub fm2: Option<Tracked<i32>>,
    /// Circular exterior loop: total, hairpin, interior and multiloop case.
    pub fc_total: i32,
    pub fc_hairpin: i32,
    pub fc_interior: i32,
    pub fc_multi: i32,
}

impl DenseMfe {
    pub fn allocate(index: &TriIndex, plan: &AllocationPlan, ledger: &Ledger) -> Self {
        let (size, lin) = (index.triangular_size(), index.linear_size());
        let this = Self {
            f5: alloc_if(plan.f5, ledger, lin, INF),
            f3: alloc_if(plan.f3, ledger, lin, INF),
            fc: alloc_if(plan.hybrid, ledger, lin, INF),
            c: alloc_if(plan.closed, ledger, size, INF),
            fml: alloc_if(plan.multi, ledger, size, INF),
            fm1: alloc_if(plan.uniq, ledger, size, INF),
            fm2: alloc_if(plan.circ, ledger, lin, INF),
            fc_total: INF,
            fc_hairpin: INF,
            fc_interior: INF,
            fc_multi: INF,
        };
        debug!(n = index.len(), buffers = this.buffers(), "allocated dense MFE matrices");
        this
    }

    /// Number of allocated buffers.
    pub fn buffers(&self) -> usize {
        [&self.f5, &self.f3, &self.fc, &self.c, &self.fml, &self.fm1, &self.fm2]
            .iter()
            .filter(|m| m.is_some())
            .count()
    }
}

/// Partition function matrices, Boltzmann weights scaled by `scale[j - i + 1]`.
#[derive(Debug)]
pub struct DensePf {
    /// - q: partition function of (i, j)
    pub q: Option<Tracked<f64>>,
    /// - qb: partition function of (i, j) given i and j pair
    pub qb: Option<Tracked<f64>>,
    /// - qm: multiloop components on (i, j)
    pub qm: Option<Tracked<f64>>,
    /// - qm1: multiloop components with exactly one branch starting at i
    pub qm1: Option<Tracked<f64>>,
    /// - qm2: two or more branches, circular folding only
    pub qm2: Option<Tracked<f64>>,
    /// - probs: base pair probabilities
    pub probs: Option<Tracked<f64>>,
    /// - q1k: exterior prefix partition functions
    pub q1k: Option<Tracked<f64>>,
    /// - qln: exterior suffix partition functions
    pub qln: Option<Tracked<f64>>,
}

impl DensePf {
    pub fn allocate(index: &TriIndex, plan: &AllocationPlan, ledger: &Ledger) -> Self {
        let (size, lin) = (index.triangular_size(), index.linear_size());
        let this = Self {
            q: alloc_if(plan.pf, ledger, size, 0.0),
            qb: alloc_if(plan.closed, ledger, size, 0.0),
            qm: alloc_if(plan.multi, ledger, size, 0.0),
            qm1: alloc_if(plan.uniq, ledger, size, 0.0),
            qm2: alloc_if(plan.circ, ledger, lin, 0.0),
            probs: alloc_if(plan.probs, ledger, size, 0.0),
            q1k: alloc_if(plan.aux, ledger, lin, 0.0),
            qln: alloc_if(plan.aux, ledger, lin, 0.0),
        };
        debug!(n = index.len(), buffers = this.buffers(), "allocated dense PF matrices");
        this
    }

    /// Number of allocated buffers.
    pub fn buffers(&self) -> usize {
        [
            &self.q, &self.qb, &self.qm, &self.qm1, &self.qm2, &self.probs, &self.q1k, &self.qln,
        ]
        .iter()
        .filter(|m| m.is_some())
        .count()
    }
}
