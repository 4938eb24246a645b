//! Covariance pair scores for alignments
//!
//! Every column pair (i, j) gets a score rewarding compensatory and
//! consistent mutations and penalising sequences that cannot pair. The table
//! is keyed by [`TriIndex::col_major`] and sized like a triangular matrix.

use crate::{
    error::{FoldError, FoldResult},
    index::TriIndex,
    params::ModelDetails,
    sequence::AlignedSequence,
};

#[cfg(test)]
mod test;

/// Score of a pair that must not form.
pub const FORBIDDEN_PAIR_SCORE: i32 = -10_000;

/// Below this score (times `cv_fact`) a neighbouring pair cannot stack.
pub const MIN_PSCORE: i32 = -200;

/// Scores are kept in dcal/mol.
const UNIT: f64 = 100.0;

/// Pair type counted for gap-gap columns and `~` symbols.
const GAP_PAIR: usize = 7;

/// Similarity of two pair types.
pub trait PairScorer {
    /// Score for pair types `a` and `b`, both in 1..=6.
    fn score(&self, a: usize, b: usize) -> f64;
}

/// A symmetric 7x7 table over pair types, row and column 0 unused.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionMatrix(pub [[f64; 7]; 7]);

impl SubstitutionMatrix {
    /// Hamming distance between the two pairs, e.g. CG vs GU differ in one base.
    pub fn hamming() -> Self {
        const DM: [[u8; 7]; 7] = [
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 2, 2, 1, 2, 2], // CG
            [0, 2, 0, 1, 2, 2, 2], // GC
            [0, 2, 1, 0, 2, 1, 2], // GU
            [0, 1, 2, 2, 0, 2, 1], // UG
            [0, 2, 2, 1, 2, 0, 2], // AU
            [0, 2, 2, 2, 1, 2, 0], // UA
        ];
        Self(DM.map(|row| row.map(f64::from)))
    }
}

impl Default for SubstitutionMatrix {
    fn default() -> Self {
        Self::hamming()
    }
}

impl PairScorer for SubstitutionMatrix {
    fn score(&self, a: usize, b: usize) -> f64 {
        self.0[a][b]
    }
}

/// Compute the covariance score of every column pair.
///
/// # Args
///
/// - rows: The aligned sequences
/// - md: Model details (min loop size, span, cv/nc factors, noLP)
/// - index: Triangular index of the alignment length
/// - scorer: Similarity of pair types
///
/// # Returns
///
/// - [`Vec<i32>`]: scores keyed by [`TriIndex::col_major`]
pub fn make_pscores<P: PairScorer + ?Sized>(
    rows: &[AlignedSequence],
    md: &ModelDetails,
    index: &TriIndex,
    scorer: &P,
) -> Vec<i32> {
    let n = index.len();
    let n_seq = rows.len();
    let turn = md.min_loop_size;
    let span = md.span_limit(n);
    let mut pscore = vec![0; index.triangular_size()];

    for i in 1..n {
        for j in i + 1..=(i + turn).min(n) {
            pscore[index.col_major(i, j)] = FORBIDDEN_PAIR_SCORE;
        }

        for j in i + turn + 1..=n {
            let mut pfreq = [0usize; 8];
            for row in rows {
                let pair = if row.s[i] == 0 && row.s[j] == 0 {
                    GAP_PAIR
                } else if row.gapped[i - 1] == b'~' || row.gapped[j - 1] == b'~' {
                    GAP_PAIR
                } else {
                    md.pair_type(row.s[i], row.s[j]) as usize
                };
                pfreq[pair] += 1;
            }

            let ij = index.col_major(i, j);
            if pfreq[0] * 2 + pfreq[GAP_PAIR] > n_seq || j - i + 1 > span {
                pscore[ij] = FORBIDDEN_PAIR_SCORE;
                continue;
            }

            let mut score = 0.0;
            for k in 1..=6 {
                for l in k..=6 {
                    score += (pfreq[k] * pfreq[l]) as f64 * scorer.score(k, l);
                }
            }

            // counter examples score -1, gap-gap -0.25
            let penalty = md.nc_fact * UNIT * (pfreq[0] as f64 + pfreq[GAP_PAIR] as f64 * 0.25);
            pscore[ij] = (md.cv_fact * ((UNIT * score) / n_seq as f64 - penalty)) as i32;
        }
    }

    if md.no_lp {
        remove_lonely_pairs(&mut pscore, md, index);
    }
    pscore
}

/// Forbid pairs whose inner and outer neighbours both score too low to stack.
fn remove_lonely_pairs(pscore: &mut [i32], md: &ModelDetails, index: &TriIndex) {
    let n = index.len();
    let turn = md.min_loop_size;
    let threshold = md.cv_fact * MIN_PSCORE as f64;

    for k in 1..n.saturating_sub(turn + 1) {
        for l in 1..=2 {
            let (mut i, mut j) = (k, k + turn + l);
            let mut inner = 0;
            let mut current = pscore[index.col_major(i, j)];

            while i >= 1 && j <= n {
                let outer = if i > 1 && j < n {
                    pscore[index.col_major(i - 1, j + 1)]
                } else {
                    0
                };
                if (inner as f64) < threshold && (outer as f64) < threshold {
                    pscore[index.col_major(i, j)] = FORBIDDEN_PAIR_SCORE;
                }
                inner = current;
                current = outer;
                i -= 1;
                j += 1;
            }
        }
    }
}

/// Overwrite scores according to a constraint string.
///
/// - `x`: the base stays unpaired
/// - `<` / `>`: the base pairs downstream / upstream only
/// - `(` ... `)`: the two bases pair with each other
/// - `[` ... `]`: the base pairs downstream only, and not with the matching `]`
/// - anything else: no constraint
///
/// # Returns
///
/// - [`FoldError::UnbalancedBrackets`] if `(`/`)` or `[`/`]` do not match
pub fn apply_structure_constraint(
    pscore: &mut [i32],
    structure: &[u8],
    index: &TriIndex,
    turn: usize,
) -> FoldResult<()> {
    let n = index.len();
    if structure.len() != n {
        return Err(FoldError::length_mismatch("constraint", n, structure.len()));
    }

    let mut round = Vec::new();
    let mut square = Vec::new();
    let forbid = |pscore: &mut [i32], i: usize, j: usize| {
        pscore[index.col_major(i, j)] = FORBIDDEN_PAIR_SCORE;
    };

    for j in 1..=n {
        match structure[j - 1] {
            b'x' => {
                (1..j.saturating_sub(turn)).for_each(|l| forbid(pscore, l, j));
                (j + turn + 1..=n).for_each(|l| forbid(pscore, j, l));
            }
            symbol @ (b'(' | b'[' | b'<') => {
                match symbol {
                    b'(' => round.push(j),
                    b'[' => square.push(j),
                    _ => {}
                }
                (1..j.saturating_sub(turn)).for_each(|l| forbid(pscore, l, j));
            }
            b']' => {
                let i = square.pop().ok_or_else(unbalanced)?;
                forbid(pscore, i, j);
            }
            symbol @ (b')' | b'>') => {
                if symbol == b')' {
                    let i = round.pop().ok_or_else(unbalanced)?;
                    let kept = pscore[index.col_major(i, j)].max(0);

                    // nothing may cross the pair (i, j) or pair i or j elsewhere
                    for k in j..=n {
                        (i..=j).for_each(|l| forbid(pscore, l, k));
                    }
                    for l in i..=j {
                        (1..=i).for_each(|k| forbid(pscore, k, l));
                    }
                    for k in i + 1..j {
                        forbid(pscore, i, k);
                        forbid(pscore, k, j);
                    }
                    pscore[index.col_major(i, j)] = kept;
                }
                (j + turn + 1..=n).for_each(|l| forbid(pscore, j, l));
            }
            _ => {}
        }
    }

    if !round.is_empty() || !square.is_empty() {
        return Err(unbalanced());
    }
    Ok(())
}

fn unbalanced() -> FoldError {
    FoldError::UnbalancedBrackets("constraint".to_owned())
}
