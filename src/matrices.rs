//! The MFE and partition function matrix sets owned by a fold compound

use tracing::trace;

use crate::{
    dense::{DenseMfe, DensePf},
    index::TriIndex,
    ledger::{Ledger, Tracked},
    options::AllocationPlan,
    params::ExpParams,
    sparse::{DistanceMfe, DistancePf},
};


/// How the matrices are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    /// One value per interval
    Dense,
    /// Values partitioned by base pair distance to two references
    Distance,
}

/// MFE matrices of either kind.
#[derive(Debug)]
pub enum MfeMatrices {
    Dense(DenseMfe),
    Distance(DistanceMfe),
}

impl MfeMatrices {
    pub fn allocate(kind: MatrixKind, index: &TriIndex, plan: &AllocationPlan, ledger: &Ledger) -> Self {
        match kind {
            MatrixKind::Dense => Self::Dense(DenseMfe::allocate(index, plan, ledger)),
            MatrixKind::Distance => Self::Distance(DistanceMfe::allocate(index, plan, ledger)),
        }
    }

    pub fn kind(&self) -> MatrixKind {
        match self {
            Self::Dense(_) => MatrixKind::Dense,
            Self::Distance(_) => MatrixKind::Distance,
        }
    }

    pub fn dense(&self) -> Option<&DenseMfe> {
        match self {
            Self::Dense(m) => Some(m),
            Self::Distance(_) => None,
        }
    }

    pub fn dense_mut(&mut self) -> Option<&mut DenseMfe> {
        match self {
            Self::Dense(m) => Some(m),
            Self::Distance(_) => None,
        }
    }

    pub fn distance(&self) -> Option<&DistanceMfe> {
        match self {
            Self::Distance(m) => Some(m),
            Self::Dense(_) => None,
        }
    }

    pub fn distance_mut(&mut self) -> Option<&mut DistanceMfe> {
        match self {
            Self::Distance(m) => Some(m),
            Self::Dense(_) => None,
        }
    }
}

/// Partition function matrices of either kind.
#[derive(Debug)]
pub enum PfStore {
    Dense(DensePf),
    Distance(DistancePf),
}

/// Partition function matrices plus the scaling tables every kind needs.
#[derive(Debug)]
pub struct PfMatrices {
    /// - scale: scale[l] is the factor applied to a segment of l nucleotides
    pub scale: Tracked<f64>,
    /// - exp_ml_base: Boltzmann weight of l unpaired multiloop bases, scaled
    pub exp_ml_base: Tracked<f64>,
    pub store: PfStore,
}

impl PfMatrices {
    pub fn allocate(kind: MatrixKind, index: &TriIndex, plan: &AllocationPlan, ledger: &Ledger) -> Self {
        let store = match kind {
            MatrixKind::Dense => PfStore::Dense(DensePf::allocate(index, plan, ledger)),
            MatrixKind::Distance => PfStore::Distance(DistancePf::allocate(index, plan, ledger)),
        };
        Self {
            scale: ledger.filled(index.linear_size(), 0.0),
            exp_ml_base: ledger.filled(index.linear_size(), 0.0),
            store,
        }
    }

    pub fn kind(&self) -> MatrixKind {
        match self.store {
            PfStore::Dense(_) => MatrixKind::Dense,
            PfStore::Distance(_) => MatrixKind::Distance,
        }
    }

    pub fn dense(&self) -> Option<&DensePf> {
        match &self.store {
            PfStore::Dense(m) => Some(m),
            PfStore::Distance(_) => None,
        }
    }

    pub fn dense_mut(&mut self) -> Option<&mut DensePf> {
        match &mut self.store {
            PfStore::Dense(m) => Some(m),
            PfStore::Distance(_) => None,
        }
    }

    pub fn distance(&self) -> Option<&DistancePf> {
        match &self.store {
            PfStore::Distance(m) => Some(m),
            PfStore::Dense(_) => None,
        }
    }

    pub fn distance_mut(&mut self) -> Option<&mut DistancePf> {
        match &mut self.store {
            PfStore::Distance(m) => Some(m),
            PfStore::Dense(_) => None,
        }
    }

    /// Refill the scaling tables from `exp.pf_scale`.
    ///
    /// Invariant afterwards: scale[i] == scale[i / 2] * scale[i - i / 2]
    /// for 2 <= i <= n.
    ///
    /// # Args
    ///
    /// - exp: Boltzmann factors with an estimated `pf_scale`
    /// - n: The sequence length
    pub fn rescale(&mut self, exp: &ExpParams, n: usize) {
        let (scale, ml) = (&mut self.scale, &mut self.exp_ml_base);

        scale[0] = 1.0;
        scale[1] = 1.0 / exp.pf_scale;
        ml[0] = 1.0;
        ml[1] = exp.exp_ml_base / exp.pf_scale;

        for i in 2..=n {
            scale[i] = scale[i / 2] * scale[i - i / 2];
            ml[i] = exp.exp_ml_base.powi(i as i32) * scale[i];
        }
        trace!(n, pf_scale = exp.pf_scale, "rescaled partition function tables");
    }
}
