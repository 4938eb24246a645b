//! Test fold compound construction, updates and teardown.

use approx::assert_relative_eq;

use super::*;
use crate::{index::INDEX_LIMIT, params::GASCONST};

const SEQ: &[u8] = b"GGGAAACCC";

fn mfe() -> FoldOptions {
    FoldOptions::new().mfe()
}

#[test]
fn test_single_mfe() {
    let fc = FoldCompound::new(SEQ, &ModelDetails::default(), mfe());

    assert_eq!(fc.kind(), CompoundKind::Single);
    assert_eq!(fc.length(), 9);
    assert_eq!(fc.n_seq(), 1);
    assert_eq!(fc.cutpoint(), None);
    assert!(fc.params().is_some());
    assert!(fc.exp_params().is_none());
    assert!(fc.exp_matrices().is_none());
    assert!(fc.ptype().is_some());
    assert!(fc.ptype_pf_compat().is_none());
    assert!(fc.references().is_none());

    let dense = fc.matrices().and_then(|m| m.dense()).unwrap();
    assert!(dense.f5.is_some() && dense.c.is_some() && dense.fml.is_some());
    assert!(dense.fm1.is_none() && dense.fm2.is_none() && dense.fc.is_none());

    let single = fc.single().unwrap();
    assert_eq!(single.sequence, SEQ);
    assert_eq!(single.encoding[0], 9);
    assert_eq!(single.encoding2[0], 2);

    let ptype = fc.ptype().unwrap();
    assert_eq!(ptype[fc.index().col_major(1, 9)], 2);
}

#[test]
fn test_single_pf() {
    let fc = FoldCompound::new(SEQ, &ModelDetails::default(), FoldOptions::new().pf());

    assert!(fc.matrices().is_none());
    assert!(fc.ptype_pf_compat().is_some());

    let exp = fc.exp_params().unwrap();
    assert!(exp.pf_scale >= 1.0);

    let pf = fc.exp_matrices().unwrap();
    let dense = pf.dense().unwrap();
    assert!(dense.q.is_some() && dense.probs.is_some() && dense.q1k.is_some());
    assert_eq!(pf.scale[0], 1.0);
    assert_relative_eq!(pf.scale[1], 1.0 / exp.pf_scale);
    for i in 2..=fc.length() {
        assert_relative_eq!(pf.scale[i], pf.scale[i / 2] * pf.scale[i - i / 2], max_relative = 1e-12);
    }
}

#[test]
fn test_pf_without_probabilities() {
    let md = ModelDetails::default().with_compute_bpp(false);
    let fc = FoldCompound::new(SEQ, &md, FoldOptions::new().mfe().pf());

    let dense = fc.exp_matrices().and_then(|m| m.dense()).unwrap();
    assert!(dense.q.is_some() && dense.qb.is_some());
    assert!(dense.probs.is_none() && dense.q1k.is_none());
    assert!(fc.matrices().is_some());
}

#[test]
fn test_cutpoint() {
    let fc = FoldCompound::new(b"GGGA&AACCC", &ModelDetails::default(), mfe());

    assert_eq!(fc.length(), 9);
    assert_eq!(fc.cutpoint(), Some(5));
    assert_eq!(fc.model().min_loop_size, 0);
    assert_eq!(fc.single().unwrap().sequence, SEQ);

    // a non-default loop size is kept
    let md = ModelDetails::default().with_min_loop_size(2);
    let fc = FoldCompound::new(b"GGGA&AACCC", &md, FoldOptions::new().pf());
    assert_eq!(fc.model().min_loop_size, 2);
    assert_eq!(fc.exp_params().unwrap().model.min_loop_size, 0);
}

#[test]
fn test_eval_only() {
    let fc = FoldCompound::new(SEQ, &ModelDetails::default(), mfe().pf().eval_only());

    assert!(fc.params().is_some() && fc.exp_params().is_some());
    assert!(fc.ptype().is_none() && fc.ptype_pf_compat().is_none());
    assert!(fc.matrices().is_none() && fc.exp_matrices().is_none());
    assert_eq!(fc.ledger().allocated(), 0);
}

#[test]
fn test_circular() {
    let md = ModelDetails::default().with_circ(true);
    let fc = FoldCompound::new(SEQ, &md, mfe());

    assert!(fc.model().uniq_ml);
    let dense = fc.matrices().and_then(|m| m.dense()).unwrap();
    assert!(dense.fm1.is_some() && dense.fm2.is_some());
    assert_eq!(dense.fc_total, crate::params::INF);
}

#[test]
fn test_errors() {
    let md = ModelDetails::default();

    let err = FoldCompound::try_new(b"", &md, mfe()).unwrap_err();
    assert_eq!(err, FoldError::EmptySequence);
    assert!(err.is_validation());

    let err = FoldCompound::try_new(b"&", &md, mfe()).unwrap_err();
    assert_eq!(err, FoldError::EmptySequence);

    let long = vec![b'A'; INDEX_LIMIT];
    let err = FoldCompound::try_new(&long, &md, mfe()).unwrap_err();
    assert!(err.is_size_limit());

    let err = FoldCompound::try_new_alignment(&["GGAAC", "GGAAC", "GGAACC"], &md, mfe()).unwrap_err();
    assert_eq!(err, FoldError::length_mismatch("alignment row 3", 5, 6));

    let err = FoldCompound::try_new_alignment::<&str>(&[], &md, mfe()).unwrap_err();
    assert_eq!(err, FoldError::EmptySequence);

    let err = FoldCompound::try_new_two_reference(SEQ, b"(((...)))", b"....", &md, mfe()).unwrap_err();
    assert_eq!(err, FoldError::length_mismatch("reference structure 2", 9, 4));

    let err = FoldCompound::try_new_two_reference(SEQ, b"((....)))", b".........", &md, mfe()).unwrap_err();
    assert_eq!(err, FoldError::UnbalancedBrackets("structure".to_owned()));
}

#[test]
#[should_panic]
fn test_new_panics() {
    FoldCompound::new(b"", &ModelDetails::default(), mfe());
}

#[test]
fn test_alignment() {
    let rows = ["GGGAAACCC", "GGGAAACCC", "AGGAAACCU"];
    let md = ModelDetails::default();
    let fc = FoldCompound::new_alignment(&rows, &md, mfe().pf());

    assert_eq!(fc.kind(), CompoundKind::Alignment);
    assert_eq!(fc.n_seq(), 3);
    assert!(fc.single().is_none() && fc.ptype().is_none());

    let alignment = fc.alignment().unwrap();
    assert_eq!(alignment.consensus, SEQ);
    assert_eq!(alignment.s_cons[1], 3);
    assert_eq!(alignment.rows.len(), 3);

    let pscore = fc.pscore().unwrap();
    assert_eq!(pscore.len(), fc.index().triangular_size());
    assert_eq!(pscore[fc.index().col_major(1, 2)], crate::pscore::FORBIDDEN_PAIR_SCORE);

    let exp = fc.exp_params().unwrap();
    assert_relative_eq!(exp.kt, 3.0 * md.kelvin() * GASCONST);
}

#[test]
fn test_constrain_alignment() {
    let rows = ["GGGAAACCC", "CGGAAACCG"];
    let mut fc = FoldCompound::new_alignment(&rows, &ModelDetails::default(), mfe());

    fc.constrain_alignment(b"(((...)))").unwrap();
    let at = fc.index().col_major(1, 8);
    assert_eq!(fc.pscore().unwrap()[at], crate::pscore::FORBIDDEN_PAIR_SCORE);

    assert!(fc.constrain_alignment(b"((.......").is_err());

    let mut single = FoldCompound::new(SEQ, &ModelDetails::default(), mfe());
    assert_eq!(single.constrain_alignment(b"((......."), Ok(()));
}

#[test]
fn test_two_reference() {
    let md = ModelDetails::default();
    let fc = FoldCompound::new_two_reference(SEQ, b"(((...)))", b".........", &md, mfe().pf());

    assert_eq!(fc.max_d1(), Some(5));
    assert_eq!(fc.max_d2(), Some(3));
    assert!(fc.model().uniq_ml);
    assert!(fc.ptype_pf_compat().is_some());

    let mfe = fc.matrices().and_then(|m| m.distance()).unwrap();
    assert_eq!(mfe.families(), 4);
    assert!(mfe.fm1.is_some());
    assert_eq!(mfe.fc_total.remainder, crate::params::INF);

    let pf = fc.exp_matrices().unwrap();
    assert_eq!(pf.kind(), MatrixKind::Distance);
    assert!(pf.distance().unwrap().qm1.is_some());
    assert_eq!(pf.scale.len(), 11);
}

#[test]
fn test_two_reference_cutpoint() {
    let md = ModelDetails::default();
    let fc = FoldCompound::new_two_reference(b"GGGA&AACCC", b"(((...)))", b".........", &md, mfe());

    assert_eq!(fc.length(), 9);
    assert_eq!(fc.cutpoint(), Some(5));
    assert_eq!(fc.model().min_loop_size, 0);
    assert_eq!(fc.single().unwrap().sequence, SEQ);
    assert!(fc.single().unwrap().encoding[1..=9].iter().all(|&b| b != 0));
    assert_eq!(fc.max_d2(), Some(3));

    // the references must match the sequence without the separator
    let err = FoldCompound::try_new_two_reference(b"GGGA&AACCC", b"((((...))))", b"..........", &md, mfe())
        .unwrap_err();
    assert_eq!(err, FoldError::length_mismatch("reference structure 1", 9, 11));
}

#[test]
fn test_teardown() {
    let md = ModelDetails::default();
    let mut fc = FoldCompound::new_two_reference(SEQ, b"(((...)))", b".........", &md, mfe().pf());

    let c = fc.matrices_mut().and_then(|m| m.distance_mut()).and_then(|m| m.c.as_mut()).unwrap();
    let slot = fc_slot();
    c.prepare(slot, 0..=3, |k| Some(k % 2..=3));
    c.set(slot, 1, 1, -120).unwrap();

    let ledger = fc.ledger().clone();
    assert!(ledger.live() > 0);
    assert!(ledger.live_cells() > 0);

    drop(fc);
    assert_eq!(ledger.live(), 0);
    assert_eq!(ledger.live_cells(), 0);
    assert_eq!(ledger.allocated(), ledger.released());
}

fn fc_slot() -> usize {
    TriIndex::new(9).unwrap().row_major(1, 9)
}

#[test]
fn test_update_params() {
    let md = ModelDetails::default();
    let mut fc = FoldCompound::new(SEQ, &md, FoldOptions::new().pf());
    assert!(fc.params().is_none());

    fc.update_params(None);
    assert_eq!(fc.params(), Some(&Params::new(&md)));

    let warm = Params::new(&md.clone().with_temperature(50.0));
    fc.update_params(Some(&warm));
    assert_eq!(fc.params(), Some(&warm));

    let mut exp = ExpParams::new(&md);
    exp.pf_scale = 2.0;
    fc.update_exp_params(Some(&exp));
    assert_eq!(fc.exp_params().unwrap().pf_scale, 2.0);
    assert_relative_eq!(fc.exp_matrices().unwrap().scale[1], 0.5);

    fc.update_exp_params(None);
    assert!(fc.exp_params().unwrap().pf_scale >= 1.0);
}

#[test]
fn test_rescale_from_mfe() {
    let md = ModelDetails::default();
    let mut fc = FoldCompound::new(SEQ, &md, FoldOptions::new().pf());

    fc.rescale(Some(-5.0));
    let exp = fc.exp_params().unwrap();
    let expected = (-(md.sfact * -5.0) / (exp.kt / 1000.0) / 9.0).exp();
    assert_relative_eq!(exp.pf_scale, expected);
    assert_relative_eq!(fc.exp_matrices().unwrap().scale[9], expected.powi(-9), max_relative = 1e-12);

    // without Boltzmann factors nothing happens
    let mut fc = FoldCompound::new(SEQ, &md, mfe());
    fc.rescale(Some(-5.0));
    assert!(fc.exp_params().is_none());
}

#[test]
fn test_send() {
    fn assert_send<T: Send>() {}
    assert_send::<FoldCompound>();
}
