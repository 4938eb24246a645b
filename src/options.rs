//! Which computations a fold compound is prepared for, and which matrices that needs

use crate::params::ModelDetails;


/// Requested computation modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldOptions {
    /// - mfe: minimum free energy matrices and parameters
    pub mfe: bool,
    /// - pf: partition function matrices and Boltzmann factors
    pub pf: bool,
    /// - hybrid: co-folding exterior array
    pub hybrid: bool,
    /// - eval_only: energy evaluation only, no pair types and no matrices
    pub eval_only: bool,
}

impl FoldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mfe(mut self) -> Self {
        self.mfe = true;
        self
    }

    pub fn pf(mut self) -> Self {
        self.pf = true;
        self
    }

    pub fn hybrid(mut self) -> Self {
        self.hybrid = true;
        self
    }

    pub fn eval_only(mut self) -> Self {
        self.eval_only = true;
        self
    }
}

/// One flag per matrix family.
///
/// MFE and PF share the flags: `closed` gates both the MFE pair array and the
/// PF pair array, `multi` both multiloop arrays and so on. The MFE allocator
/// ignores `pf`, `probs` and `aux`; the PF allocator ignores `f5`, `f3` and
/// `hybrid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    /// - pf: partition function of every interval (q)
    pub pf: bool,
    /// - f5: 5' exterior loop array
    pub f5: bool,
    /// - f3: 3' exterior loop array
    pub f3: bool,
    /// - closed: intervals closed by a base pair (c / qb)
    pub closed: bool,
    /// - multi: multiloop components (fML / qm)
    pub multi: bool,
    /// - probs: base pair probabilities
    pub probs: bool,
    /// - aux: auxiliary exterior arrays q1k, qln
    pub aux: bool,
    /// - circ: circular multiloop arrays (fM2 / qm2)
    pub circ: bool,
    /// - hybrid: co-folding exterior array
    pub hybrid: bool,
    /// - uniq: unique multiloop decomposition (fM1 / qm1)
    pub uniq: bool,
}

impl AllocationPlan {
    /// Matrices needed for the MFE recurrences.
    pub const MFE_DEFAULT: Self = Self {
        pf: false,
        f5: true,
        f3: false,
        closed: true,
        multi: true,
        probs: false,
        aux: false,
        circ: false,
        hybrid: false,
        uniq: false,
    };

    /// Matrices needed for the partition function without probabilities.
    pub const PF_WITHOUT_PROBS: Self = Self {
        pf: true,
        f5: false,
        f3: false,
        closed: true,
        multi: true,
        probs: false,
        aux: false,
        circ: false,
        hybrid: false,
        uniq: false,
    };

    /// Matrices needed for the partition function and base pair probabilities.
    pub const PF_DEFAULT: Self = Self {
        probs: true,
        aux: true,
        ..Self::PF_WITHOUT_PROBS
    };

    /// Decide which matrices to allocate.
    ///
    /// Circular folding needs the unique multiloop decomposition, so
    /// `model.uniq_ml` is switched on when `model.circ` is set. This is the
    /// only change made to `model`, and applying it twice changes nothing.
    ///
    /// # Args
    ///
    /// - model: Model details, normalised in place
    /// - options: The requested computations
    ///
    /// # Returns
    ///
    /// - [`AllocationPlan`]: the union of everything the options require
    pub fn decide(model: &mut ModelDetails, options: &FoldOptions) -> Self {
        let mut plan = Self::default();

        if options.mfe {
            plan = plan.union(Self::MFE_DEFAULT);
        }

        if options.pf {
            plan = plan.union(if model.compute_bpp {
                Self::PF_DEFAULT
            } else {
                Self::PF_WITHOUT_PROBS
            });
        }

        plan.hybrid |= options.hybrid;

        if model.circ {
            model.uniq_ml = true;
            plan.circ = true;
        }

        plan.uniq |= model.uniq_ml;
        plan
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            pf: self.pf | other.pf,
            f5: self.f5 | other.f5,
            f3: self.f3 | other.f3,
            closed: self.closed | other.closed,
            multi: self.multi | other.multi,
            probs: self.probs | other.probs,
            aux: self.aux | other.aux,
            circ: self.circ | other.circ,
            hybrid: self.hybrid | other.hybrid,
            uniq: self.uniq | other.uniq,
        }
    }

    /// Nothing is allocated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
