use super::*;
use crate::sequence::encode_sequence;

#[test]
fn test_pair_table() {
    assert_eq!(
        pair_table(b"(((...)))").unwrap(),
        vec![9, 9, 8, 7, 0, 0, 0, 3, 2, 1]
    );
    assert_eq!(pair_table(b"....").unwrap(), vec![4, 0, 0, 0, 0]);
    assert_eq!(pair_table(b"").unwrap(), vec![0]);
}

#[test]
fn test_pair_table_errors() {
    for bad in [&b"(()"[..], b"())", b")("] {
        assert_eq!(
            pair_table(bad).unwrap_err(),
            FoldError::UnbalancedBrackets("structure".to_owned())
        );
    }
    assert_eq!(
        pair_table(b"((x))").unwrap_err(),
        FoldError::UnknownStructureSymbol {
            symbol: 'x',
            position: 3
        }
    );
}

#[test]
fn test_reference_bp_counts() {
    let index = TriIndex::new(9).unwrap();
    let pt = pair_table(b"(((...)))").unwrap();
    let bps = reference_bp_counts(&pt, &index);

    assert_eq!(bps[index.row_major(1, 9)], 3);
    assert_eq!(bps[index.row_major(2, 8)], 2);
    assert_eq!(bps[index.row_major(1, 8)], 2);
    assert_eq!(bps[index.row_major(3, 9)], 1);
    assert_eq!(bps[index.row_major(4, 9)], 0);
    assert_eq!(bps[index.row_major(5, 5)], 0);
}

#[test]
fn test_bp_distances() {
    let index = TriIndex::new(9).unwrap();
    let pt1 = pair_table(b"((....)).").unwrap();
    let pt2 = pair_table(b".((....))").unwrap();

    let dist = bp_distances(&pt1, &pt2, &index);
    assert_eq!(dist[index.row_major(1, 9)], 4);
    assert_eq!(dist[index.row_major(2, 9)], 3);
    assert_eq!(dist[index.row_major(1, 8)], 3);

    let same = bp_distances(&pt1, &pt1, &index);
    assert!(same.iter().all(|&d| d == 0));
}

#[test]
fn test_maximum_matching() {
    let md = ModelDetails::default();
    let index = TriIndex::new(9).unwrap();
    let s = encode_sequence(b"GGGAAACCC");

    let open = pair_table(b".........").unwrap();
    let mm = maximum_matching(&s, &open, &md, &index);
    assert_eq!(mm[index.row_major(1, 9)], 3);
    assert_eq!(mm[index.row_major(3, 7)], 1);
    // hairpins need more than 3 unpaired bases
    assert_eq!(mm[index.row_major(3, 6)], 0);

    let stem = pair_table(b"(((...)))").unwrap();
    let mm = maximum_matching(&s, &stem, &md, &index);
    assert_eq!(mm[index.row_major(1, 9)], 2);
}

#[test]
fn test_reference_tables() {
    let md = ModelDetails::default();
    let index = TriIndex::new(9).unwrap();
    let s = encode_sequence(b"GGGAAACCC");

    let tables = ReferenceTables::new(&s, b"(((...)))", b".........", &md, &index).unwrap();
    assert_eq!(tables.max_d1, 5);
    assert_eq!(tables.max_d2, 3);
    assert_eq!(tables.distance(), 3);

    let err = ReferenceTables::new(&s, b"(((...)))", b"....", &md, &index).unwrap_err();
    assert_eq!(err, FoldError::length_mismatch("reference structure 2", 9, 4));
}
