use super::*;

fn rows(seqs: &[&str]) -> Vec<AlignedSequence> {
    seqs.iter().map(|s| AlignedSequence::new(s.as_bytes())).collect()
}

fn scores(seqs: &[&str], md: &ModelDetails) -> (Vec<i32>, TriIndex) {
    let index = TriIndex::new(seqs[0].len()).unwrap();
    let pscore = make_pscores(&rows(seqs), md, &index, &SubstitutionMatrix::hamming());
    (pscore, index)
}

#[test]
fn test_hamming_is_symmetric() {
    let dm = SubstitutionMatrix::hamming();
    for a in 1..=6 {
        assert_eq!(dm.score(a, a), 0.0);
        for b in 1..=6 {
            assert_eq!(dm.score(a, b), dm.score(b, a));
        }
    }
    // CG vs GU differ in one base
    assert_eq!(dm.score(1, 4), 1.0);
}

#[test]
fn test_conserved_and_compensatory() {
    let md = ModelDetails::default();

    let (ps, index) = scores(&["GGGAAACCC", "GGGAAACCC"], &md);
    assert_eq!(ps[index.col_major(1, 9)], 0);

    let (ps, index) = scores(&["GGGAAACCC", "CGGAAACCG"], &md);
    assert_eq!(ps[index.col_major(1, 9)], 100);
    assert_eq!(ps[index.col_major(2, 8)], 0);
}

#[test]
fn test_counter_examples() {
    let md = ModelDetails::default();

    let (ps, index) = scores(&["GGGAAACCC", "AGGAAACCC"], &md);
    assert_eq!(ps[index.col_major(1, 9)], -100);

    // no sequence can pair G with A
    assert_eq!(ps[index.col_major(1, 4)], FORBIDDEN_PAIR_SCORE);

    let md = md.with_no_gu(true);
    let (ps, index) = scores(&["GGGAAAUCC", "GGGAAAUCC"], &md);
    assert_eq!(ps[index.col_major(3, 7)], FORBIDDEN_PAIR_SCORE);
}

#[test]
fn test_short_and_long_pairs() {
    let md = ModelDetails::default().with_max_bp_span(Some(7));
    let (ps, index) = scores(&["GGGAAACCC"], &md);

    for i in 1..9 {
        for j in i + 1..=(i + 3).min(9) {
            assert_eq!(ps[index.col_major(i, j)], FORBIDDEN_PAIR_SCORE);
        }
    }
    assert_eq!(ps[index.col_major(1, 9)], FORBIDDEN_PAIR_SCORE);
    assert_eq!(ps[index.col_major(2, 8)], 0);
}

#[test]
fn test_lonely_pairs() {
    let (ps, index) = scores(&["AAGAAAAACAAA"], &ModelDetails::default());
    assert_eq!(ps[index.col_major(3, 9)], 0);

    let (ps, index) = scores(&["AAGAAAAACAAA"], &ModelDetails::default().with_no_lp(true));
    assert_eq!(ps[index.col_major(3, 9)], FORBIDDEN_PAIR_SCORE);

    // stacked pairs survive
    let (ps, index) = scores(&["GGAAAACC"], &ModelDetails::default().with_no_lp(true));
    assert_eq!(ps[index.col_major(1, 8)], 0);
    assert_eq!(ps[index.col_major(2, 7)], 0);
}

#[test]
fn test_custom_scorer() {
    struct Flat;
    impl PairScorer for Flat {
        fn score(&self, _: usize, _: usize) -> f64 {
            1.0
        }
    }

    let md = ModelDetails::default();
    let index = TriIndex::new(9).unwrap();
    let ps = make_pscores(&rows(&["GGGAAACCC", "CGGAAACCG"]), &md, &index, &Flat);
    // CG*CG, CG*GC, GC*GC
    assert_eq!(ps[index.col_major(1, 9)], 150);
}

#[test]
fn test_constraint_pairs() {
    let md = ModelDetails::default();
    let (mut ps, index) = scores(&["GGGAAACCC", "CGGAAACCG"], &md);

    apply_structure_constraint(&mut ps, b"(((...)))", &index, md.min_loop_size).unwrap();
    assert_eq!(ps[index.col_major(1, 9)], 100);
    assert_eq!(ps[index.col_major(2, 8)], 0);
    assert_eq!(ps[index.col_major(3, 7)], 0);
    assert_eq!(ps[index.col_major(1, 8)], FORBIDDEN_PAIR_SCORE);
    assert_eq!(ps[index.col_major(2, 9)], FORBIDDEN_PAIR_SCORE);
    assert_eq!(ps[index.col_major(3, 8)], FORBIDDEN_PAIR_SCORE);
}

#[test]
fn test_constraint_unpaired() {
    let md = ModelDetails::default();
    let (mut ps, index) = scores(&["GGGAAACCC"], &md);

    apply_structure_constraint(&mut ps, b"x........", &index, md.min_loop_size).unwrap();
    for j in 5..=9 {
        assert_eq!(ps[index.col_major(1, j)], FORBIDDEN_PAIR_SCORE);
    }
    assert_eq!(ps[index.col_major(2, 8)], 0);
}

#[test]
fn test_constraint_errors() {
    let md = ModelDetails::default();
    let (mut ps, index) = scores(&["GGGAAACCC"], &md);

    for bad in [&b"((......)"[..], b")........", b"[........"] {
        let err = apply_structure_constraint(&mut ps, bad, &index, 3).unwrap_err();
        assert_eq!(err, FoldError::UnbalancedBrackets("constraint".to_owned()));
    }

    let err = apply_structure_constraint(&mut ps, b"...", &index, 3).unwrap_err();
    assert!(err.is_validation());
}
