//! Test offset addressing.

use super::OffsetArray;
use crate::ledger::Ledger;

#[test]
fn test_true_index() {
    let ledger = Ledger::new();
    let mut array = OffsetArray::filled(&ledger, 4..=7, 0);

    array[4] = 10;
    array[7] = 13;
    *array.get_mut(5).unwrap() = 11;

    assert_eq!(array.first(), 4);
    assert_eq!(array.last(), Some(7));
    assert_eq!(array.len(), 4);
    assert_eq!(array.get(3), None);
    assert_eq!(array.get(8), None);
    assert!(!array.contains(0));
    assert_eq!(
        array.iter().map(|(k, &v)| (k, v)).collect::<Vec<_>>(),
        [(4, 10), (5, 11), (6, 0), (7, 13)]
    );
}

#[test]
#[should_panic]
fn test_below_offset() {
    let ledger = Ledger::new();
    let array = OffsetArray::filled(&ledger, 2..=3, 1.0);
    let _ = array[1];
}

/// Dropping the array releases its single buffer.
#[test]
fn test_release() {
    let ledger = Ledger::new();
    {
        let _array = OffsetArray::from_vec(&ledger, 9, vec![1u8, 2, 3]);
        assert_eq!(ledger.live(), 1);
        assert_eq!(ledger.live_cells(), 3);
    }
    assert_eq!(ledger.allocated(), 1);
    assert_eq!(ledger.released(), 1);
    assert_eq!(ledger.live_cells(), 0);
}
