use serde::{Deserialize, Serialize};

/// Quorum parameters for a replica group of size `n`, tolerating up to `f`
/// byzantine replicas, with fast-path parameter `p`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdParams {
    /// Total number of replicas.
    pub n: usize,

    /// Maximum tolerated byzantine replicas.
    pub f: usize,

    /// Fast-path parameter; the fast-path quorum is `n - p`.
    pub p: usize,
}

impl ThresholdParams {
    /// Create new threshold parameters.
    pub fn new(n: usize, f: usize, p: usize) -> Self {
        Self { n, f, p }
    }

    /// Whether `voters` distinct notarization voters meet the notarization
    /// quorum: strictly more than `(n + f) / 2`.
    pub fn notarization_met(&self, voters: usize) -> bool {
        voters * 2 > self.n + self.f
    }

    /// The number of distinct fast-path voters required to fast-finalize
    /// a rank-0 block.
    pub fn fast_path_quorum(&self) -> usize {
        self.n.saturating_sub(self.p)
    }

    /// Whether `voters` distinct fast-path voters meet the fast-path quorum.
    pub fn fast_path_met(&self, voters: usize) -> bool {
        voters >= self.fast_path_quorum()
    }

    /// Whether `voters` distinct voters form a supermajority: strictly more
    /// than two thirds of `n`. Used for slow-path finalization and for the
    /// icc notarization rule.
    pub fn supermajority_met(&self, voters: usize) -> bool {
        voters * 3 > self.n * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorums_for_n4_f1_p1() {
        let params = ThresholdParams::new(4, 1, 1);

        assert!(!params.notarization_met(2));
        assert!(params.notarization_met(3));

        assert_eq!(params.fast_path_quorum(), 3);
        assert!(!params.fast_path_met(2));
        assert!(params.fast_path_met(3));

        assert!(!params.supermajority_met(2));
        assert!(params.supermajority_met(3));
    }

    #[test]
    fn supermajority_is_strict() {
        // 2n/3 is exact for n = 6: four voters are not enough.
        let params = ThresholdParams::new(6, 1, 1);
        assert!(!params.supermajority_met(4));
        assert!(params.supermajority_met(5));
    }
}
