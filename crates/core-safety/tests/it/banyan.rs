use bytes::Bytes;
use pretty_assertions::assert_eq;

use banyan_core_safety::{Algorithm, Error};
use banyan_core_types::{Block, BlockId, Height, NodeId, Rank, ShareRank, Signature};

use crate::utils::*;

fn banyan(id: u32) -> banyan_core_safety::Safety {
    engine(Algorithm::Banyan, id)
}

#[test]
fn happy_path_fast_finalizes_in_one_round() {
    let mut engines: Vec<_> = (1..=4).map(banyan).collect();

    let proposal = engines[0].make_proposal(Height::new(1), Rank::ZERO);

    let mut shares = Vec::new();
    for engine in engines.iter_mut() {
        let out = engine.process_block(proposal.clone()).unwrap();
        shares.extend(notarization_broadcasts(&out));
    }

    // All four replicas vote, all with the fast-path sentinel.
    assert_eq!(shares.len(), 4);
    assert!(shares.iter().all(|s| s.rank.is_fast_path()));

    for (i, engine) in engines.iter_mut().enumerate() {
        let self_id = NodeId::new(i as u32 + 1);

        let mut commits = 0;
        for share in shares.iter().filter(|s| s.voter != self_id) {
            let out = engine.process_notarization_share(share.clone());
            commits += committed(&out)
                .iter()
                .filter(|b| b.id == proposal.id)
                .count();
        }

        assert_eq!(commits, 1, "replica {self_id} must commit exactly once");
    }
}

#[test]
fn notarizes_exactly_at_the_quorum() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());

    // Own share is the first of three needed.
    let out = engine.process_block(b.clone()).unwrap();
    assert!(opened_heights(&out).is_empty());

    let out = engine.process_notarization_share(n_share(1, ShareRank::FastPath, &b));
    assert!(opened_heights(&out).is_empty());

    // Third distinct voter notarizes and, with three fast-path shares,
    // also fast-finalizes.
    let out = engine.process_notarization_share(n_share(2, ShareRank::FastPath, &b));
    assert_eq!(opened_heights(&out), vec![Height::new(2)]);
    assert_eq!(committed(&out).len(), 1);
}

#[test]
fn mixed_ranks_still_reach_the_fast_quorum() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());

    // Own fast-path share.
    engine.process_block(b.clone()).unwrap();

    // One fast-path share and one plain rank-0 share: notarized (three
    // voters) but only two fast-path voters.
    engine.process_notarization_share(n_share(1, ShareRank::FastPath, &b));
    let out = engine.process_notarization_share(n_share(3, ShareRank::Rank(Rank::ZERO), &b));
    assert_eq!(opened_heights(&out), vec![Height::new(2)]);
    assert!(committed(&out).is_empty());

    // A late fast-path share for the already-notarized block must still be
    // tallied; it completes the fast quorum.
    let out = engine.process_notarization_share(n_share(2, ShareRank::FastPath, &b));
    assert_eq!(committed(&out).len(), 1);
}

#[test]
fn slow_path_commits_without_the_fast_quorum() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());

    // Shares arrive before the block; only one is fast-path, so the fast
    // quorum is never reached.
    engine.process_notarization_share(n_share(1, ShareRank::FastPath, &b));
    engine.process_notarization_share(n_share(2, ShareRank::Rank(Rank::ZERO), &b));
    let out = engine.process_notarization_share(n_share(3, ShareRank::Rank(Rank::ZERO), &b));
    assert_eq!(opened_heights(&out), vec![Height::new(2)]);
    assert!(committed(&out).is_empty());

    // Slow path: a finalization quorum arrives; the block itself is still
    // missing, so it is parked in the ship queue.
    engine.process_finalization_share(f_share(1, &b));
    engine.process_finalization_share(f_share(2, &b));
    let out = engine.process_finalization_share(f_share(3, &b));
    assert!(committed(&out).is_empty());

    // The block materializes and ships.
    let out = engine.process_block(b.clone()).unwrap();
    assert_eq!(committed(&out).iter().map(|b| b.id).collect::<Vec<_>>(), vec![b.id]);
}

#[test]
fn rank_rule_blocks_revote_at_a_higher_rank() {
    let mut engine = banyan(4);
    let b0 = block(1, 0, BlockId::genesis());
    let b1 = block(1, 1, BlockId::genesis());

    let out = engine.process_block(b0).unwrap();
    assert_eq!(notarization_broadcasts(&out).len(), 1);

    // Voted rank 0 already: the rank-1 fall-back gets no share, but is
    // still echoed.
    let out = engine.process_block(b1.clone()).unwrap();
    assert!(notarization_broadcasts(&out).is_empty());
    assert_eq!(block_broadcasts(&out).len(), 1);
}

#[test]
fn lower_rank_after_higher_gets_a_second_vote() {
    let mut engine = banyan(3);
    let b1 = block(1, 1, BlockId::genesis());
    let b0 = block(1, 0, BlockId::genesis());

    let out = engine.process_block(b1).unwrap();
    let shares = notarization_broadcasts(&out);
    assert_eq!(shares[0].rank, ShareRank::Rank(Rank::new(1)));

    // The rank-0 block undercuts the rank voted so far, so a second share
    // is emitted; it is not fast-path eligible since it is not the first.
    let out = engine.process_block(b0).unwrap();
    let shares = notarization_broadcasts(&out);
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].rank, ShareRank::Rank(Rank::ZERO));
}

#[test]
fn out_of_order_finalizations_commit_in_a_burst() {
    let mut engine = banyan(4);

    let b1 = block(1, 0, BlockId::genesis());
    let b2 = block(2, 0, b1.id);
    let b3 = block(3, 0, b2.id);
    let b4 = block(4, 0, b3.id);
    let b5 = block(5, 0, b4.id);
    let chain = [&b1, &b2, &b3, &b4, &b5];

    // Finalization quorums for every height arrive before any block.
    for b in chain.iter().rev() {
        for voter in 1..=3 {
            let out = engine.process_finalization_share(f_share(voter, b));
            assert!(committed(&out).is_empty());
        }
    }

    // Blocks arrive top-down; nothing can ship until the chain reaches
    // back to genesis.
    for b in chain.iter().rev().take(4) {
        let out = engine.process_block((*b).clone()).unwrap();
        assert!(committed(&out).is_empty());
    }

    // The first block completes the prefix: one burst, in height order.
    let out = engine.process_block(b1.clone()).unwrap();
    let burst = committed(&out);
    assert_eq!(
        burst.iter().map(|b| b.height.as_u64()).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );

    // Commit chain totality: each block extends the previous one.
    let mut prev = BlockId::genesis();
    for b in &burst {
        assert_eq!(b.prev_id, prev);
        prev = b.id;
    }
}

#[test]
fn invalid_share_signature_leaves_the_tally_unchanged() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());
    engine.process_block(b.clone()).unwrap();

    let mut bad = n_share(2, ShareRank::FastPath, &b);
    bad.signature = Signature::test();
    assert!(engine.process_notarization_share(bad).is_empty());

    // Two valid shares are still required to reach the quorum.
    let out = engine.process_notarization_share(n_share(1, ShareRank::FastPath, &b));
    assert!(opened_heights(&out).is_empty());

    let out = engine.process_notarization_share(n_share(3, ShareRank::FastPath, &b));
    assert_eq!(opened_heights(&out), vec![Height::new(2)]);
}

#[test]
fn duplicate_block_is_a_no_op() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());

    let out = engine.process_block(b.clone()).unwrap();
    assert_eq!(block_broadcasts(&out).len(), 1);
    assert_eq!(notarization_broadcasts(&out).len(), 1);

    // No second echo, no second share.
    let out = engine.process_block(b).unwrap();
    assert!(out.is_empty());
}

#[test]
fn rejects_a_block_from_the_wrong_leader() {
    let mut engine = banyan(4);

    // Height 1, rank 0 belongs to replica 1.
    let bad = Block::new(
        Height::new(1),
        Rank::ZERO,
        NodeId::new(2),
        BlockId::genesis(),
        Bytes::from_static(b"payload"),
        &key(2),
    );

    assert!(matches!(
        engine.process_block(bad),
        Err(Error::InvalidLeader { .. })
    ));
}

#[test]
fn rejects_a_block_with_a_tampered_signature() {
    let mut engine = banyan(4);

    let mut tampered = block(1, 0, BlockId::genesis());
    tampered.signature = Signature::test();

    assert!(matches!(
        engine.process_block(tampered),
        Err(Error::InvalidBlockSignature { .. })
    ));
}

#[test]
fn at_most_one_finalization_share_per_height() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());

    let mut f_broadcasts = 0;

    let out = engine.process_block(b.clone()).unwrap();
    f_broadcasts += finalization_broadcasts(&out).len();

    for voter in 1..=3 {
        let out = engine.process_notarization_share(n_share(voter, ShareRank::FastPath, &b));
        f_broadcasts += finalization_broadcasts(&out).len();
    }

    // Notarization triggered exactly one finalization share, and the
    // fast-path finalization that followed did not add another.
    assert_eq!(f_broadcasts, 1);
}

#[test]
fn replayed_messages_change_nothing() {
    let mut engine = banyan(4);
    let b = block(1, 0, BlockId::genesis());

    engine.process_block(b.clone()).unwrap();
    for voter in 1..=3 {
        engine.process_notarization_share(n_share(voter, ShareRank::FastPath, &b));
    }

    // The block is committed; replaying any message is absorbed silently.
    assert!(engine
        .process_notarization_share(n_share(1, ShareRank::FastPath, &b))
        .is_empty());
    assert!(engine.process_finalization_share(f_share(1, &b)).is_empty());
    assert!(engine.process_block(b).unwrap().is_empty());
}

#[test]
fn bypassed_blocks_surface_on_the_forked_output() {
    let mut engine = banyan(4);
    let b0 = block(1, 0, BlockId::genesis());
    let b1 = block(1, 1, BlockId::genesis());

    engine.process_block(b0.clone()).unwrap();
    engine.process_block(b1.clone()).unwrap();

    // The rank-1 fall-back gathers a finalization quorum; committing it
    // sweeps the bypassed rank-0 block onto the forked output.
    engine.process_finalization_share(f_share(1, &b1));
    engine.process_finalization_share(f_share(2, &b1));
    let out = engine.process_finalization_share(f_share(3, &b1));

    assert_eq!(committed(&out).iter().map(|b| b.id).collect::<Vec<_>>(), vec![b1.id]);
    assert_eq!(forked(&out).iter().map(|b| b.id).collect::<Vec<_>>(), vec![b0.id]);
}
