use banyan_core_safety::BlockStore;
use banyan_core_types::{BlockId, Height};

use crate::utils::block;

#[test]
fn insert_is_idempotent() {
    let mut store = BlockStore::new();
    let b1 = block(1, 0, BlockId::genesis());

    store.insert(b1.clone());
    store.insert(b1.clone());

    assert!(store.exists(&b1.id));
    let (committed, forked) = store.commit(&b1.id, Height::new(1));
    assert_eq!(committed.len(), 1);
    assert!(forked.is_empty());
}

#[test]
fn commit_returns_the_uncommitted_prefix_in_height_order() {
    let mut store = BlockStore::new();
    let b1 = block(1, 0, BlockId::genesis());
    let b2 = block(2, 0, b1.id);
    let b3 = block(3, 0, b2.id);

    store.insert(b1.clone());
    store.insert(b2.clone());
    store.insert(b3.clone());

    let (committed, forked) = store.commit(&b3.id, Height::new(3));
    assert_eq!(
        committed.iter().map(|b| b.height.as_u64()).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(forked.is_empty());
    assert_eq!(store.committed_height(), Height::new(3));

    // Committing again walks no further back.
    let b4 = block(4, 0, b3.id);
    store.insert(b4.clone());
    let (committed, _) = store.commit(&b4.id, Height::new(4));
    assert_eq!(committed.iter().map(|b| b.id).collect::<Vec<_>>(), vec![b4.id]);
}

#[test]
fn commit_sweeps_bypassed_blocks_as_forked() {
    let mut store = BlockStore::new();
    let b1 = block(1, 0, BlockId::genesis());
    let b1_alt = block(1, 1, BlockId::genesis());
    let b2 = block(2, 0, b1.id);

    store.insert(b1.clone());
    store.insert(b1_alt.clone());
    store.insert(b2.clone());

    let (committed, forked) = store.commit(&b2.id, Height::new(2));
    assert_eq!(committed.iter().map(|b| b.id).collect::<Vec<_>>(), vec![b1.id, b2.id]);
    assert_eq!(forked.iter().map(|b| b.id).collect::<Vec<_>>(), vec![b1_alt.id]);

    // The graph itself grows monotonically: forked blocks stay readable.
    assert!(store.exists(&b1_alt.id));
}

#[test]
fn blocks_below_the_committed_height_are_not_live() {
    let mut store = BlockStore::new();
    let b1 = block(1, 0, BlockId::genesis());
    let b2 = block(2, 0, b1.id);

    store.insert(b1.clone());
    store.insert(b2.clone());
    store.commit(&b2.id, Height::new(2));

    // A straggler at an already-committed height is stored but never
    // surfaces as forked.
    let b1_alt = block(1, 1, BlockId::genesis());
    store.insert(b1_alt.clone());

    let b3 = block(3, 0, b2.id);
    store.insert(b3.clone());
    let (_, forked) = store.commit(&b3.id, Height::new(3));
    assert!(forked.is_empty());
    assert!(store.exists(&b1_alt.id));
}
