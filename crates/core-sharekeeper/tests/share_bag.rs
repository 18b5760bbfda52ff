use banyan_core_sharekeeper::ShareBag;
use banyan_core_types::{
    BlockId, FinalizationShare, Height, NodeId, Rank, Signature, ThresholdParams,
};

fn share(voter: u32, block_id: BlockId) -> FinalizationShare {
    FinalizationShare {
        height: Height::new(1),
        rank: Rank::ZERO,
        voter: NodeId::new(voter),
        block_id,
        signature: Signature::test(),
    }
}

#[test]
fn reports_the_supermajority_transition_once() {
    let mut bag = ShareBag::new(ThresholdParams::new(4, 1, 1));
    let block = BlockId::hash(b"b1");

    assert!(!bag.add(share(1, block)));
    assert!(!bag.add(share(2, block)));

    // Third distinct voter crosses 2n/3.
    assert!(bag.add(share(3, block)));
    assert!(bag.quorum_reached(&block));

    // Past the threshold the transition is not reported again.
    assert!(!bag.add(share(4, block)));
    assert_eq!(bag.voters(&block), 4);
}

#[test]
fn same_voter_does_not_double_count() {
    let mut bag = ShareBag::new(ThresholdParams::new(4, 1, 1));
    let block = BlockId::hash(b"b1");

    assert!(!bag.add(share(1, block)));
    assert!(!bag.add(share(1, block)));
    assert!(!bag.add(share(2, block)));
    assert!(!bag.add(share(2, block)));
    assert_eq!(bag.voters(&block), 2);

    assert!(bag.add(share(3, block)));
}

#[test]
fn blocks_are_tallied_independently() {
    let mut bag = ShareBag::new(ThresholdParams::new(4, 1, 1));
    let block_a = BlockId::hash(b"a");
    let block_b = BlockId::hash(b"b");

    bag.add(share(1, block_a));
    bag.add(share(2, block_a));
    bag.add(share(3, block_b));

    assert_eq!(bag.voters(&block_a), 2);
    assert_eq!(bag.voters(&block_b), 1);
    assert!(!bag.quorum_reached(&block_a));
    assert!(!bag.quorum_reached(&block_b));
}
