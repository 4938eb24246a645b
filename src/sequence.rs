//! Nucleotide encodings, pair type tables and alignment encodings

use std::cmp::Reverse;

use rustc_hash::FxHashMap as HashMap;

use crate::{
    index::{Order, TriIndex},
    params::ModelDetails,
};


/// Symbols treated as alignment gaps.
pub const GAPS: &[u8] = b"-._~";

/// A=1, C=2, G=3, U/T=4, anything else 0.
pub fn encode_base(b: u8) -> i16 {
    match b.to_ascii_uppercase() {
        b'A' => 1,
        b'C' => 2,
        b'G' => 3,
        b'U' | b'T' => 4,
        _ => 0,
    }
}

/// Remove the strand separator `&` of a co-folded sequence.
///
/// # Returns
///
/// - [`Vec<u8>`]: the concatenated strands
/// - [`Option<usize>`]: 1-based position of the first base of the second strand
pub fn split_cutpoint(seq: &[u8]) -> (Vec<u8>, Option<usize>) {
    let cut = seq.iter().position(|&b| b == b'&').map(|p| p + 1);
    let joined = seq.iter().copied().filter(|&b| b != b'&').collect();
    (joined, cut)
}

/// Encoding with the length in slot 0 and slot 1 mirrored into slot n + 1.
///
/// Lengths beyond `i16::MAX` are stored as `i16::MAX`.
pub fn encode_sequence(seq: &[u8]) -> Vec<i16> {
    let n = seq.len();
    let mut s = Vec::with_capacity(n + 2);
    s.push(i16::try_from(n).unwrap_or(i16::MAX));
    s.extend(seq.iter().map(|&b| encode_base(b)));
    s.push(if n > 0 { s[1] } else { 0 });
    s
}

/// Encoding with circular neighbours: slot 0 holds base n, slot n + 1 base 1.
pub fn encode_simple(seq: &[u8]) -> Vec<i16> {
    let mut s = encode_sequence(seq);
    let n = seq.len();
    s[0] = if n > 0 { s[n] } else { 0 };
    s
}

/// Pair type of every interval, 0 where no pair is allowed.
///
/// Pairs closer than `min_loop_size` or spanning more than
/// [`ModelDetails::span_limit`] are excluded. With `no_lp` a pair that has
/// no possible stacking neighbour (i - 1, j + 1) or (i + 1, j - 1) is
/// excluded as well.
///
/// # Args
///
/// - s: Encoded sequence, see [`encode_simple`]
/// - md: Model details
/// - index: Triangular index of the sequence
/// - order: Which offsets the returned table is keyed by
pub fn pair_types(s: &[i16], md: &ModelDetails, index: &TriIndex, order: Order) -> Vec<u8> {
    let n = index.len();
    let turn = md.min_loop_size;
    let span = md.span_limit(n);
    let pair = |i: usize, j: usize| md.pair_type(s[i], s[j]);

    let mut ptype = vec![0; index.cells()];

    // walk every diagonal i + j = const outwards, so the inner pair is known
    for k in 1..n.saturating_sub(turn) {
        for l in 1..=2 {
            let (mut i, mut j) = (k, k + turn + l);
            let mut inner = 0;
            let mut current = if j <= n { pair(i, j) } else { 0 };

            while i >= 1 && j <= n {
                let outer = if i > 1 && j < n { pair(i - 1, j + 1) } else { 0 };
                if md.no_lp && inner == 0 && outer == 0 {
                    current = 0;
                }
                if j - i < span {
                    ptype[index.offset(order, i, j)] = current;
                }
                inner = current;
                current = outer;
                i -= 1;
                j += 1;
            }
        }
    }
    ptype
}

/// One row of an alignment with its derived encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedSequence {
    /// - gapped: the row as given
    pub gapped: Vec<u8>,
    /// - s: encoding per column, gaps are 0, slot 0 holds n (at most `i16::MAX`)
    pub s: Vec<i16>,
    /// - s5: encoding of the nearest non-gap base 5' of each column
    pub s5: Vec<i16>,
    /// - s3: encoding of the nearest non-gap base 3' of each column
    pub s3: Vec<i16>,
    /// - ungapped: the row without gaps
    pub ungapped: Vec<u8>,
    /// - a2s: number of bases in columns 1..=i, i.e. column to sequence position
    pub a2s: Vec<usize>,
}

impl AlignedSequence {
    pub fn new(gapped: &[u8]) -> Self {
        let n = gapped.len();
        let s = encode_sequence(gapped);

        let mut s5 = vec![0; n + 2];
        let mut last = 0;
        for i in 1..=n {
            s5[i] = last;
            if !GAPS.contains(&gapped[i - 1]) {
                last = s[i];
            }
        }

        let mut s3 = vec![0; n + 2];
        let mut next = 0;
        for i in (1..=n).rev() {
            s3[i] = next;
            if !GAPS.contains(&gapped[i - 1]) {
                next = s[i];
            }
        }

        let mut a2s = vec![0; n + 1];
        for i in 1..=n {
            a2s[i] = a2s[i - 1] + usize::from(!GAPS.contains(&gapped[i - 1]));
        }

        Self {
            gapped: gapped.to_vec(),
            s,
            s5,
            s3,
            ungapped: gapped.iter().copied().filter(|b| !GAPS.contains(b)).collect(),
            a2s,
        }
    }

    /// Whether column i (1-based) is a gap.
    pub fn is_gap(&self, i: usize) -> bool {
        GAPS.contains(&self.gapped[i - 1])
    }
}

impl std::fmt::Display for AlignedSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.gapped))
    }
}

/// Most frequent symbol of every column; gaps count as '-'.
///
/// Ties go to the earlier symbol of `-ACGUT`, then to the smaller byte.
pub fn consensus<S: AsRef<[u8]>>(sequences: &[S]) -> Vec<u8> {
    let n = sequences.first().map_or(0, |s| s.as_ref().len());
    let rank = |b: u8| b"-ACGUT".iter().position(|&c| c == b).unwrap_or(6);

    (0..n)
        .map(|i| {
            let mut counts: HashMap<u8, usize> = HashMap::default();
            for s in sequences {
                let b = s.as_ref()[i].to_ascii_uppercase();
                let b = if GAPS.contains(&b) { b'-' } else { b };
                *counts.entry(b).or_default() += 1;
            }
            counts
                .into_iter()
                .max_by_key(|&(b, c)| (c, Reverse((rank(b), b))))
                .map_or(b'-', |(b, _)| b)
        })
        .collect()
}
