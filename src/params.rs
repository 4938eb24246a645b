//! Model details and the energy parameter blocks derived from them


/// Minimum number of unpaired bases enclosed by a hairpin.
pub const TURN: usize = 3;

/// Energy of an impossible structure, in dcal/mol.
pub const INF: i32 = 10_000_000;

/// 0 °C in Kelvin.
pub const K0: f64 = 273.15;

/// Gas constant in cal / (mol K).
pub const GASCONST: f64 = 1.98717;

/// Settings that decide which structures are considered and how they are scored.
///
/// Every constructor takes these explicitly; [`ModelDetails::default`] is
/// the one documented default configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDetails {
    /// - temperature: folding temperature in Celsius
    pub temperature: f64,
    /// - circ: the RNA is circular
    pub circ: bool,
    /// - uniq_ml: keep unique multiloop decomposition matrices
    pub uniq_ml: bool,
    /// - compute_bpp: base pair probabilities will be computed
    pub compute_bpp: bool,
    /// - min_loop_size: minimum hairpin size
    pub min_loop_size: usize,
    /// - max_bp_span: maximum distance between paired bases, `None` for unlimited
    pub max_bp_span: Option<usize>,
    /// - no_lp: forbid lonely (isolated) pairs
    pub no_lp: bool,
    /// - no_gu: forbid GU wobble pairs
    pub no_gu: bool,
    /// - cv_fact: weight of covariance scores in alignment folding
    pub cv_fact: f64,
    /// - nc_fact: penalty for non-compatible sequences in alignment folding
    pub nc_fact: f64,
    /// - sfact: scaling factor applied to an MFE estimate when rescaling
    pub sfact: f64,
}

impl Default for ModelDetails {
    fn default() -> Self {
        Self {
            temperature: 37.0,
            circ: false,
            uniq_ml: false,
            compute_bpp: true,
            min_loop_size: TURN,
            max_bp_span: None,
            no_lp: false,
            no_gu: false,
            cv_fact: 1.0,
            nc_fact: 1.0,
            sfact: 1.07,
        }
    }
}

impl ModelDetails {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_circ(mut self, circ: bool) -> Self {
        self.circ = circ;
        self
    }

    pub fn with_uniq_ml(mut self, uniq_ml: bool) -> Self {
        self.uniq_ml = uniq_ml;
        self
    }

    pub fn with_compute_bpp(mut self, compute_bpp: bool) -> Self {
        self.compute_bpp = compute_bpp;
        self
    }

    pub fn with_min_loop_size(mut self, min_loop_size: usize) -> Self {
        self.min_loop_size = min_loop_size;
        self
    }

    pub fn with_max_bp_span(mut self, max_bp_span: Option<usize>) -> Self {
        self.max_bp_span = max_bp_span;
        self
    }

    pub fn with_no_lp(mut self, no_lp: bool) -> Self {
        self.no_lp = no_lp;
        self
    }

    pub fn with_no_gu(mut self, no_gu: bool) -> Self {
        self.no_gu = no_gu;
        self
    }

    /// The temperature in Kelvin.
    pub fn kelvin(&self) -> f64 {
        self.temperature + K0
    }

    /// Pair type of two encoded bases (see [`crate::sequence::encode_base`]).
    ///
    /// 1 = CG, 2 = GC, 3 = GU, 4 = UG, 5 = AU, 6 = UA, 0 = no pair.
    pub fn pair_type(&self, a: i16, b: i16) -> u8 {
        match (a, b) {
            (2, 3) => 1,
            (3, 2) => 2,
            (3, 4) if !self.no_gu => 3,
            (4, 3) if !self.no_gu => 4,
            (1, 4) => 5,
            (4, 1) => 6,
            _ => 0,
        }
    }

    /// Largest allowed span j - i + 1 for a sequence of length n.
    pub fn span_limit(&self, n: usize) -> usize {
        match self.max_bp_span {
            Some(span) if span >= self.min_loop_size + 2 && span <= n => span,
            _ => n,
        }
    }
}

/// Free energy and enthalpy at 37 °C of one loop term, in dcal/mol.
#[derive(Debug, Clone, Copy)]
struct Term {
    g37: i32,
    h: i32,
}

/// Multiloop terms and the terminal AU penalty (Turner 2004).
const ML_BASE: Term = Term { g37: 0, h: 0 };
const ML_CLOSING: Term = Term { g37: 930, h: 3000 };
const ML_INTERN: Term = Term { g37: -90, h: -220 };
const TERMINAL_AU: Term = Term { g37: 50, h: 370 };

impl Term {
    /// dG at `temp` Kelvin: dH - T * dS, with dS taken from dG at 37 °C.
    fn at(self, temp: f64) -> i32 {
        let t37 = 37.0 + K0;
        (self.h as f64 - (self.h - self.g37) as f64 * temp / t37).round() as i32
    }
}

/// Loop energies (dcal/mol) used by the MFE recurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub model: ModelDetails,
    /// - temperature: in Celsius
    pub temperature: f64,
    pub ml_base: i32,
    pub ml_closing: i32,
    pub ml_intern: i32,
    pub terminal_au: i32,
}

impl Params {
    pub fn new(model: &ModelDetails) -> Self {
        let temp = model.kelvin();
        Self {
            model: model.clone(),
            temperature: model.temperature,
            ml_base: ML_BASE.at(temp),
            ml_closing: ML_CLOSING.at(temp),
            ml_intern: ML_INTERN.at(temp),
            terminal_au: TERMINAL_AU.at(temp),
        }
    }
}

/// Boltzmann factors used by the partition function recurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpParams {
    pub model: ModelDetails,
    /// - temperature: in Celsius
    pub temperature: f64,
    /// - kt: RT in cal/mol, multiplied by the number of sequences for alignments
    pub kt: f64,
    /// - pf_scale: per-nucleotide scaling factor, below 1 means "not yet estimated"
    pub pf_scale: f64,
    pub exp_ml_base: f64,
    pub exp_ml_closing: f64,
    pub exp_ml_intern: f64,
    pub exp_terminal_au: f64,
}

impl ExpParams {
    /// Boltzmann factors for a single sequence.
    pub fn new(model: &ModelDetails) -> Self {
        Self::for_alignment(1, model)
    }

    /// Boltzmann factors for an alignment of `n_seq` sequences.
    pub fn for_alignment(n_seq: usize, model: &ModelDetails) -> Self {
        let temp = model.kelvin();
        let n_seq = n_seq.max(1) as f64;
        let kt = n_seq * temp * GASCONST;
        let boltzmann = |term: Term| (-10.0 * n_seq * term.at(temp) as f64 / kt).exp();

        Self {
            model: model.clone(),
            temperature: model.temperature,
            kt,
            pf_scale: -1.0,
            exp_ml_base: boltzmann(ML_BASE),
            exp_ml_closing: boltzmann(ML_CLOSING),
            exp_ml_intern: boltzmann(ML_INTERN),
            exp_terminal_au: boltzmann(TERMINAL_AU),
        }
    }
}
