//! Reference structures and the tables derived from them
//!
//! Interval tables are keyed by [`TriIndex::row_major`] and sized with
//! [`TriIndex::triangular_size`].

use crate::{
    error::{FoldError, FoldResult},
    index::TriIndex,
    params::ModelDetails,
};

#[cfg(test)]
mod test;

/// Parse a dot-bracket string into a pair table.
///
/// `pt[0]` holds n, `pt[i]` the partner of i or 0 if i is unpaired.
///
/// # Args
///
/// - structure: `(`, `)` and `.` only
///
/// # Returns
///
/// - [`FoldError::UnbalancedBrackets`] if the brackets do not match
/// - [`FoldError::UnknownStructureSymbol`] on any other symbol
pub fn pair_table(structure: &[u8]) -> FoldResult<Vec<usize>> {
    let n = structure.len();
    let mut pt = vec![0; n + 1];
    pt[0] = n;

    let mut open = Vec::new();
    for (i, &symbol) in structure.iter().enumerate().map(|(i, s)| (i + 1, s)) {
        match symbol {
            b'(' => open.push(i),
            b')' => {
                let j = open
                    .pop()
                    .ok_or_else(|| FoldError::UnbalancedBrackets("structure".to_owned()))?;
                pt[i] = j;
                pt[j] = i;
            }
            b'.' => {}
            _ => {
                return Err(FoldError::UnknownStructureSymbol {
                    symbol: symbol as char,
                    position: i,
                });
            }
        }
    }

    if !open.is_empty() {
        return Err(FoldError::UnbalancedBrackets("structure".to_owned()));
    }
    Ok(pt)
}

/// Number of pairs of `pt` inside each interval (i, j).
pub fn reference_bp_counts(pt: &[usize], index: &TriIndex) -> Vec<u32> {
    let n = index.len();
    let mut counts = vec![0; index.triangular_size()];

    for i in (1..n).rev() {
        for j in i + 1..=n {
            let closes_inside = pt[i] > i && pt[i] <= j;
            counts[index.row_major(i, j)] = counts[index.row_major(i + 1, j)] + closes_inside as u32;
        }
    }
    counts
}

/// Base pair distance between `pt1` and `pt2` restricted to each interval (i, j).
pub fn bp_distances(pt1: &[usize], pt2: &[usize], index: &TriIndex) -> Vec<u32> {
    let n = index.len();
    let mut dist = vec![0; index.triangular_size()];

    for i in (1..n).rev() {
        for j in i + 1..=n {
            let mut d = dist[index.row_major(i + 1, j)];
            if pt1[i] != pt2[i] {
                d += (pt1[i] > i && pt1[i] <= j) as u32;
                d += (pt2[i] > i && pt2[i] <= j) as u32;
            }
            dist[index.row_major(i, j)] = d;
        }
    }
    dist
}

/// Maximum number of pairs in each interval when the pairs of `pt` are
/// forbidden.
///
/// # Args
///
/// - s: Sequence encoding, slot 0 holds n
/// - pt: Pair table of the forbidden pairs
/// - md: Model details (min loop size, noGU)
/// - index: Triangular index of the sequence length
pub fn maximum_matching(s: &[i16], pt: &[usize], md: &ModelDetails, index: &TriIndex) -> Vec<u32> {
    let n = index.len();
    let turn = md.min_loop_size;
    let mut mm = vec![0; index.triangular_size()];

    for d in turn + 1..n {
        for i in 1..=n - d {
            let j = i + d;
            let mut best = mm[index.row_major(i, j - 1)];

            for l in i..j - turn {
                if md.pair_type(s[l], s[j]) == 0 || pt[l] == j {
                    continue;
                }
                let left = if l > i { mm[index.row_major(i, l - 1)] } else { 0 };
                let inner = if l + 1 < j { mm[index.row_major(l + 1, j - 1)] } else { 0 };
                best = best.max(left + 1 + inner);
            }
            mm[index.row_major(i, j)] = best;
        }
    }
    mm
}

/// Tables a two-reference compound derives from its reference structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTables {
    pub pt1: Vec<usize>,
    pub pt2: Vec<usize>,
    /// - bps1: pairs of reference 1 per interval
    pub bps1: Vec<u32>,
    pub bps2: Vec<u32>,
    /// - bpdist: distance between the references per interval
    pub bpdist: Vec<u32>,
    /// - mm1: maximum matching avoiding the pairs of reference 1
    pub mm1: Vec<u32>,
    pub mm2: Vec<u32>,
    /// - max_d1: largest possible distance to reference 1
    pub max_d1: usize,
    pub max_d2: usize,
}

impl ReferenceTables {
    /// Derive every table for the encoded sequence `s` and two references.
    ///
    /// # Returns
    ///
    /// - [`FoldError::LengthMismatch`] if a reference differs in length from the sequence
    /// - any error of [`pair_table`]
    pub fn new(
        s: &[i16],
        s1: &[u8],
        s2: &[u8],
        md: &ModelDetails,
        index: &TriIndex,
    ) -> FoldResult<Self> {
        let n = index.len();
        if s1.len() != n {
            return Err(FoldError::length_mismatch("reference structure 1", n, s1.len()));
        }
        if s2.len() != n {
            return Err(FoldError::length_mismatch("reference structure 2", n, s2.len()));
        }

        let pt1 = pair_table(s1)?;
        let pt2 = pair_table(s2)?;
        let bps1 = reference_bp_counts(&pt1, index);
        let bps2 = reference_bp_counts(&pt2, index);
        let bpdist = bp_distances(&pt1, &pt2, index);
        let mm1 = maximum_matching(s, &pt1, md, index);
        let mm2 = maximum_matching(s, &pt2, md, index);

        let whole = index.row_major(1, n);
        let max_d1 = (mm1[whole] + bps1[whole]) as usize;
        let max_d2 = (mm2[whole] + bps2[whole]) as usize;

        Ok(Self {
            pt1,
            pt2,
            bps1,
            bps2,
            bpdist,
            mm1,
            mm2,
            max_d1,
            max_d2,
        })
    }

    /// Base pair distance between the two references.
    pub fn distance(&self) -> u32 {
        // distances only grow with the interval, (1, n) holds the maximum
        self.bpdist.iter().copied().max().unwrap_or(0)
    }
}
