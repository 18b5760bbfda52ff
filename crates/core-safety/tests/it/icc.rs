use banyan_core_safety::Algorithm;
use banyan_core_types::{BlockId, Height, Rank, ShareRank};

use crate::utils::*;

fn icc(id: u32) -> banyan_core_safety::Safety {
    engine(Algorithm::Icc, id)
}

#[test]
fn votes_for_every_block_above_the_head() {
    let mut engine = icc(4);
    let b0 = block(1, 0, BlockId::genesis());
    let b1 = block(1, 1, BlockId::genesis());

    let out = engine.process_block(b0).unwrap();
    let shares = notarization_broadcasts(&out);
    assert_eq!(shares.len(), 1);
    // No fast path: even a first vote for a rank-0 block carries its rank.
    assert_eq!(shares[0].rank, ShareRank::Rank(Rank::ZERO));

    // No rank rule either: the rank-1 fall-back gets a vote too.
    let out = engine.process_block(b1).unwrap();
    let shares = notarization_broadcasts(&out);
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].rank, ShareRank::Rank(Rank::new(1)));
}

#[test]
fn notarization_and_slow_finalization_commit() {
    let mut engine = icc(4);
    let b = block(1, 0, BlockId::genesis());

    // Own share plus two remote shares reach the supermajority.
    let out = engine.process_block(b.clone()).unwrap();
    assert_eq!(finalization_broadcasts(&out).len(), 0);

    engine.process_notarization_share(n_share(1, ShareRank::Rank(Rank::ZERO), &b));
    let out = engine.process_notarization_share(n_share(2, ShareRank::Rank(Rank::ZERO), &b));
    assert_eq!(opened_heights(&out), vec![Height::new(2)]);

    // Having voted once, for this very block, the replica contributes a
    // finalization share of its own.
    assert_eq!(finalization_broadcasts(&out).len(), 1);

    // Two remote finalization shares complete the slow path.
    engine.process_finalization_share(f_share(1, &b));
    let out = engine.process_finalization_share(f_share(2, &b));
    assert_eq!(committed(&out).iter().map(|b| b.id).collect::<Vec<_>>(), vec![b.id]);
}

#[test]
fn shares_for_a_notarized_block_are_ignored() {
    let mut engine = icc(4);
    let b = block(1, 0, BlockId::genesis());

    engine.process_block(b.clone()).unwrap();
    engine.process_notarization_share(n_share(1, ShareRank::Rank(Rank::ZERO), &b));
    engine.process_notarization_share(n_share(2, ShareRank::Rank(Rank::ZERO), &b));

    let out = engine.process_notarization_share(n_share(3, ShareRank::Rank(Rank::ZERO), &b));
    assert!(out.is_empty());
}

#[test]
fn two_votes_at_a_height_suppress_the_finalization_share() {
    let mut engine = icc(4);
    let b0 = block(1, 0, BlockId::genesis());
    let b1 = block(1, 1, BlockId::genesis());

    engine.process_block(b0.clone()).unwrap();
    engine.process_block(b1).unwrap();

    // The replica voted twice at height 1, so notarization of the rank-0
    // block must not yield a finalization share.
    engine.process_notarization_share(n_share(1, ShareRank::Rank(Rank::ZERO), &b0));
    let out = engine.process_notarization_share(n_share(2, ShareRank::Rank(Rank::ZERO), &b0));
    assert_eq!(opened_heights(&out), vec![Height::new(2)]);
    assert!(finalization_broadcasts(&out).is_empty());
}
