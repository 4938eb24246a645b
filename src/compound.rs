//! The fold compound: a sequence or alignment together with its encodings,
//! energy parameters and DP matrices

use tracing::debug;

use crate::{
    error::{FoldError, FoldResult},
    index::{Order, TriIndex},
    ledger::Ledger,
    matrices::{MatrixKind, MfeMatrices, PfMatrices},
    options::{AllocationPlan, FoldOptions},
    params::{ExpParams, ModelDetails, Params, TURN},
    pscore::{SubstitutionMatrix, apply_structure_constraint, make_pscores},
    sequence::{AlignedSequence, consensus, encode_sequence, encode_simple, pair_types, split_cutpoint},
    structure::ReferenceTables,
};

#[cfg(test)]
mod test;

/// Whether a compound holds one sequence or an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    Single,
    Alignment,
}

/// A single (possibly co-folded) sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSequence {
    /// - sequence: the sequence with the strand separator removed
    pub sequence: Vec<u8>,
    /// - encoding: see [`encode_sequence`]
    pub encoding: Vec<i16>,
    /// - encoding2: see [`encode_simple`]
    pub encoding2: Vec<i16>,
    /// - cutpoint: 1-based start of the second strand
    pub cutpoint: Option<usize>,
}

/// An alignment and its covariance scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub rows: Vec<AlignedSequence>,
    /// - consensus: most frequent symbol per column
    pub consensus: Vec<u8>,
    /// - s_cons: encoding of the consensus, see [`encode_simple`]
    pub s_cons: Vec<i16>,
    /// - pscore: covariance score per column pair, keyed by [`TriIndex::col_major`]
    pub pscore: Vec<i32>,
}

#[derive(Debug)]
enum Input {
    Single(SingleSequence),
    Alignment(Alignment),
}

/// Everything the folding recurrences need for one sequence or alignment.
///
/// Matrices are only present for the computations requested through
/// [`FoldOptions`]. All of them are released when the compound is dropped,
/// which [`FoldCompound::ledger`] can confirm.
#[derive(Debug)]
pub struct FoldCompound {
    input: Input,
    model: ModelDetails,
    index: TriIndex,
    ptype: Option<Vec<u8>>,
    ptype_pf_compat: Option<Vec<u8>>,
    params: Option<Params>,
    exp_params: Option<ExpParams>,
    matrices: Option<MfeMatrices>,
    exp_matrices: Option<PfMatrices>,
    references: Option<ReferenceTables>,
    ledger: Ledger,
}

impl FoldCompound {
    /// Prepare a single sequence for folding.
    ///
    /// A `&` in the sequence separates two strands that are folded together.
    ///
    /// # Args
    ///
    /// - seq: The sequence to fold
    /// - model: Model details, copied into the compound
    /// - options: Which computations to prepare for
    ///
    /// # Returns
    ///
    /// - [`FoldCompound`]: ready for the MFE and/or PF recurrences
    pub fn new(seq: &[u8], model: &ModelDetails, options: FoldOptions) -> Self {
        Self::try_new(seq, model, options).expect("Invalid Sequence Inputted")
    }

    /// A non-panicing version of [`FoldCompound::new`]
    pub fn try_new(seq: &[u8], model: &ModelDetails, options: FoldOptions) -> FoldResult<Self> {
        let (sequence, cutpoint) = split_cutpoint(seq);
        if sequence.is_empty() {
            return Err(FoldError::EmptySequence);
        }
        let index = TriIndex::new(sequence.len())?;

        let mut model = model.clone();
        let plan = AllocationPlan::decide(&mut model, &options);
        if cutpoint.is_some() && model.min_loop_size == TURN {
            model.min_loop_size = 0;
        }

        let single = SingleSequence::new(sequence, cutpoint);
        Ok(Self::with_single(single, model, index, plan, options, MatrixKind::Dense, None))
    }

    /// Prepare an alignment for folding.
    ///
    /// # Args
    ///
    /// - sequences: The aligned rows, all of the same length
    /// - model: Model details, copied into the compound
    /// - options: Which computations to prepare for
    pub fn new_alignment<S: AsRef<[u8]>>(sequences: &[S], model: &ModelDetails, options: FoldOptions) -> Self {
        Self::try_new_alignment(sequences, model, options).expect("Invalid Alignment Inputted")
    }

    /// A non-panicing version of [`FoldCompound::new_alignment`]
    pub fn try_new_alignment<S: AsRef<[u8]>>(
        sequences: &[S],
        model: &ModelDetails,
        options: FoldOptions,
    ) -> FoldResult<Self> {
        let n = sequences.first().map_or(0, |s| s.as_ref().len());
        if n == 0 {
            return Err(FoldError::EmptySequence);
        }
        if let Some((s, row)) = sequences.iter().enumerate().find(|(_, row)| row.as_ref().len() != n) {
            return Err(FoldError::length_mismatch(
                format!("alignment row {}", s + 1),
                n,
                row.as_ref().len(),
            ));
        }

        let index = TriIndex::new(n)?;
        let mut model = model.clone();
        let plan = AllocationPlan::decide(&mut model, &options);

        let rows: Vec<_> = sequences.iter().map(|s| AlignedSequence::new(s.as_ref())).collect();
        let consensus = consensus(sequences);
        let s_cons = encode_simple(&consensus);
        let pscore = make_pscores(&rows, &model, &index, &SubstitutionMatrix::hamming());

        let alignment = Alignment {
            rows,
            consensus,
            s_cons,
            pscore,
        };

        let mut this = Self::bare(Input::Alignment(alignment), model, index);
        this.finish(plan, options, MatrixKind::Dense);
        Ok(this)
    }

    /// Prepare a sequence for folding in classes of base pair distance to two
    /// reference structures.
    ///
    /// The unique multiloop decomposition is always switched on and the
    /// matrices are partitioned by distance class. As with
    /// [`FoldCompound::new`], a `&` separates two strands; the references
    /// cover the sequence without it.
    ///
    /// # Args
    ///
    /// - seq: The sequence to fold
    /// - s1: First reference structure in dot-bracket notation
    /// - s2: Second reference structure in dot-bracket notation
    /// - model: Model details, copied into the compound
    /// - options: Which computations to prepare for
    pub fn new_two_reference(
        seq: &[u8],
        s1: &[u8],
        s2: &[u8],
        model: &ModelDetails,
        options: FoldOptions,
    ) -> Self {
        Self::try_new_two_reference(seq, s1, s2, model, options).expect("Invalid Sequence Inputted")
    }

    /// A non-panicing version of [`FoldCompound::new_two_reference`]
    pub fn try_new_two_reference(
        seq: &[u8],
        s1: &[u8],
        s2: &[u8],
        model: &ModelDetails,
        options: FoldOptions,
    ) -> FoldResult<Self> {
        let (sequence, cutpoint) = split_cutpoint(seq);
        if sequence.is_empty() {
            return Err(FoldError::EmptySequence);
        }
        let index = TriIndex::new(sequence.len())?;

        let mut model = model.clone().with_uniq_ml(true);
        let plan = AllocationPlan::decide(&mut model, &options);
        if cutpoint.is_some() && model.min_loop_size == TURN {
            model.min_loop_size = 0;
        }

        let single = SingleSequence::new(sequence, cutpoint);
        let references = ReferenceTables::new(&single.encoding, s1, s2, &model, &index)?;

        Ok(Self::with_single(
            single,
            model,
            index,
            plan,
            options,
            MatrixKind::Distance,
            Some(references),
        ))
    }

    fn with_single(
        single: SingleSequence,
        model: ModelDetails,
        index: TriIndex,
        plan: AllocationPlan,
        options: FoldOptions,
        kind: MatrixKind,
        references: Option<ReferenceTables>,
    ) -> Self {
        let (ptype, ptype_pf_compat) = if options.eval_only {
            (None, None)
        } else {
            let ptype = pair_types(&single.encoding2, &model, &index, Order::ColMajor);
            let compat = (options.pf || kind == MatrixKind::Distance)
                .then(|| pair_types(&single.encoding2, &model, &index, Order::RowMajor));
            (Some(ptype), compat)
        };

        let mut this = Self::bare(Input::Single(single), model, index);
        this.ptype = ptype;
        this.ptype_pf_compat = ptype_pf_compat;
        this.references = references;
        this.finish(plan, options, kind);
        this
    }

    fn bare(input: Input, model: ModelDetails, index: TriIndex) -> Self {
        Self {
            input,
            model,
            index,
            ptype: None,
            ptype_pf_compat: None,
            params: None,
            exp_params: None,
            matrices: None,
            exp_matrices: None,
            references: None,
            ledger: Ledger::new(),
        }
    }

    /// Energy parameters, then matrices, then the PF scaling tables.
    fn finish(&mut self, plan: AllocationPlan, options: FoldOptions, kind: MatrixKind) {
        if options.mfe {
            self.params = Some(Params::new(&self.model));
        }
        if options.pf {
            self.exp_params = Some(self.default_exp_params());
        }

        if !options.eval_only {
            if options.mfe {
                self.matrices = Some(MfeMatrices::allocate(kind, &self.index, &plan, &self.ledger));
            }
            if options.pf {
                self.exp_matrices = Some(PfMatrices::allocate(kind, &self.index, &plan, &self.ledger));
                self.rescale(None);
            }
        }

        debug!(
            n = self.length(),
            n_seq = self.n_seq(),
            kind = ?kind,
            buffers = self.ledger.live(),
            "created fold compound"
        );
    }

    fn default_exp_params(&self) -> ExpParams {
        match &self.input {
            Input::Single(single) if single.cutpoint.is_some() => {
                let model = ModelDetails {
                    min_loop_size: 0,
                    ..self.model.clone()
                };
                ExpParams::new(&model)
            }
            Input::Single(_) => ExpParams::new(&self.model),
            Input::Alignment(alignment) => ExpParams::for_alignment(alignment.rows.len(), &self.model),
        }
    }

    /// Replace the MFE energy parameters.
    ///
    /// With `None` they are rebuilt from the compound's model details.
    pub fn update_params(&mut self, params: Option<&Params>) {
        self.params = Some(match params {
            Some(params) => params.clone(),
            None => Params::new(&self.model),
        });
    }

    /// Replace the Boltzmann factors and refill the scaling tables.
    ///
    /// With `None` they are rebuilt from the compound's model details.
    pub fn update_exp_params(&mut self, params: Option<&ExpParams>) {
        self.exp_params = Some(match params {
            Some(params) => params.clone(),
            None => self.default_exp_params(),
        });
        self.rescale(None);
    }

    /// Estimate the PF scaling factor and refill the scaling tables.
    ///
    /// Without Boltzmann factors this does nothing.
    ///
    /// # Args
    ///
    /// - mfe: Minimum free energy in kcal/mol. Without it a mean energy per
    ///   nucleotide of random sequences is assumed, unless `pf_scale` was
    ///   already set.
    pub fn rescale(&mut self, mfe: Option<f64>) {
        let n = self.length();
        let n_seq = self.n_seq() as f64;
        let Some(exp) = self.exp_params.as_mut() else {
            return;
        };

        let kt = exp.kt / n_seq;
        if let Some(mfe) = mfe {
            exp.pf_scale = (-(exp.model.sfact * mfe) / (kt / 1000.0) / n as f64).exp();
        } else if exp.pf_scale < 1.0 {
            // random sequences average -185 cal/mol per nucleotide at 37 °C
            let pf_scale = (-(-185.0 + (exp.temperature - 37.0) * 7.27) / kt).exp();
            exp.pf_scale = pf_scale.max(1.0);
        }

        if let Some(matrices) = self.exp_matrices.as_mut() {
            matrices.rescale(exp, n);
        }
    }

    /// Restrict the covariance scores of an alignment with a constraint
    /// string, see [`apply_structure_constraint`].
    ///
    /// Single sequence compounds are left untouched.
    pub fn constrain_alignment(&mut self, structure: &[u8]) -> FoldResult<()> {
        let turn = self.model.min_loop_size;
        match &mut self.input {
            Input::Alignment(alignment) => {
                apply_structure_constraint(&mut alignment.pscore, structure, &self.index, turn)
            }
            Input::Single(_) => Ok(()),
        }
    }

    pub fn kind(&self) -> CompoundKind {
        match self.input {
            Input::Single(_) => CompoundKind::Single,
            Input::Alignment(_) => CompoundKind::Alignment,
        }
    }

    /// Sequence (alignment) length.
    pub fn length(&self) -> usize {
        self.index.len()
    }

    /// Number of sequences, 1 for a single sequence.
    pub fn n_seq(&self) -> usize {
        match &self.input {
            Input::Single(_) => 1,
            Input::Alignment(alignment) => alignment.rows.len(),
        }
    }

    pub fn single(&self) -> Option<&SingleSequence> {
        match &self.input {
            Input::Single(single) => Some(single),
            Input::Alignment(_) => None,
        }
    }

    pub fn alignment(&self) -> Option<&Alignment> {
        match &self.input {
            Input::Alignment(alignment) => Some(alignment),
            Input::Single(_) => None,
        }
    }

    pub fn cutpoint(&self) -> Option<usize> {
        self.single().and_then(|s| s.cutpoint)
    }

    pub fn pscore(&self) -> Option<&[i32]> {
        self.alignment().map(|a| a.pscore.as_slice())
    }

    /// Model details after normalisation (unique ML, cut point).
    pub fn model(&self) -> &ModelDetails {
        &self.model
    }

    pub fn index(&self) -> &TriIndex {
        &self.index
    }

    /// Pair types keyed by [`TriIndex::col_major`].
    pub fn ptype(&self) -> Option<&[u8]> {
        self.ptype.as_deref()
    }

    /// Pair types keyed by [`TriIndex::row_major`].
    pub fn ptype_pf_compat(&self) -> Option<&[u8]> {
        self.ptype_pf_compat.as_deref()
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn exp_params(&self) -> Option<&ExpParams> {
        self.exp_params.as_ref()
    }

    pub fn matrices(&self) -> Option<&MfeMatrices> {
        self.matrices.as_ref()
    }

    pub fn matrices_mut(&mut self) -> Option<&mut MfeMatrices> {
        self.matrices.as_mut()
    }

    pub fn exp_matrices(&self) -> Option<&PfMatrices> {
        self.exp_matrices.as_ref()
    }

    pub fn exp_matrices_mut(&mut self) -> Option<&mut PfMatrices> {
        self.exp_matrices.as_mut()
    }

    /// Tables derived from the reference structures of a two-reference compound.
    pub fn references(&self) -> Option<&ReferenceTables> {
        self.references.as_ref()
    }

    /// Largest possible base pair distance to the first reference.
    pub fn max_d1(&self) -> Option<usize> {
        self.references.as_ref().map(|r| r.max_d1)
    }

    /// Largest possible base pair distance to the second reference.
    pub fn max_d2(&self) -> Option<usize> {
        self.references.as_ref().map(|r| r.max_d2)
    }

    /// Counts the matrix buffers this compound allocated and released.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

impl Drop for FoldCompound {
    fn drop(&mut self) {
        debug!(
            n = self.length(),
            buffers = self.ledger.live(),
            cells = self.ledger.live_cells(),
            "releasing fold compound"
        );
    }
}

impl SingleSequence {
    fn new(sequence: Vec<u8>, cutpoint: Option<usize>) -> Self {
        let encoding = encode_sequence(&sequence);
        let encoding2 = encode_simple(&sequence);
        Self {
            sequence,
            encoding,
            encoding2,
            cutpoint,
        }
    }
}
